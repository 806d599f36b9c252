//! Mobile device diagnosis

use serde::{Deserialize, Serialize};

use crate::knowledge::{match_diagnosis, Catalog};

pub const LOCAL_SCHEMATIC_FOCUS: &str = "Etapa de carga y Boot primario";

/// Board-level diagnosis for a phone or tablet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MobileDiagnosis {
    pub likely_issue: String,
    pub schematic_focus: String,
    pub difficulty: String,
    pub required_tools: Vec<String>,
    pub repair_steps: Vec<String>,
    pub micro_soldering_required: bool,
}

/// Symptoms that point at the charging stage or the board itself
fn needs_micro_soldering(symptoms: &str) -> bool {
    let lowered = symptoms.to_lowercase();
    lowered.contains("carga") || lowered.contains("placa")
}

/// Catalog-based diagnosis used when the AI backend is unavailable
///
/// The device model does not influence the local answer.
pub fn diagnose_locally(catalog: &Catalog, _model: &str, symptoms: &str) -> MobileDiagnosis {
    let local = match_diagnosis(catalog, symptoms);
    MobileDiagnosis {
        likely_issue: local.summary,
        schematic_focus: LOCAL_SCHEMATIC_FOCUS.to_string(),
        difficulty: local.difficulty,
        required_tools: local.recommended_tools,
        repair_steps: local.steps,
        micro_soldering_required: needs_micro_soldering(symptoms),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::matcher::FALLBACK_SUMMARY;

    #[test]
    fn test_micro_soldering_detection() {
        assert!(needs_micro_soldering("No CARGA la batería"));
        assert!(needs_micro_soldering("placa mojada"));
        assert!(!needs_micro_soldering("pantalla rota"));
    }

    #[test]
    fn test_local_diagnosis_uses_matcher() {
        let catalog = Catalog::embedded().unwrap();
        let d = diagnose_locally(&catalog, "Galaxy S21", "microsd ilegible, pide formato");
        let st05 = catalog.get("st-05").unwrap();

        assert_eq!(d.likely_issue, st05.description);
        assert_eq!(d.repair_steps, st05.remediation_steps);
        assert_eq!(d.schematic_focus, LOCAL_SCHEMATIC_FOCUS);
        assert!(!d.micro_soldering_required);
    }

    #[test]
    fn test_local_diagnosis_without_match() {
        let catalog = Catalog::embedded().unwrap();
        let d = diagnose_locally(&catalog, "iPhone 12", "no carga");
        assert_eq!(d.likely_issue, FALLBACK_SUMMARY);
        assert_eq!(d.difficulty, "Alta / Investigación");
        assert!(d.micro_soldering_required);
    }
}
