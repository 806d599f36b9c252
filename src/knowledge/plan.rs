//! Repair plan builder
//!
//! Turns short risk labels into an ordered list of repair tasks drawn from
//! the catalog. Label matching is looser than diagnosis matching: a label
//! token matches an entry when it is a substring of the entry name or equals
//! one of its tags exactly.

use serde::{Deserialize, Serialize};

use crate::knowledge::catalog::Catalog;
use crate::knowledge::entry::KnowledgeEntry;

pub const GENERIC_TASK_ID: &str = "fix-generic-0";
pub const GENERIC_TASK_TITLE: &str = "Mantenimiento General";
pub const GENERIC_TASK_COMMAND: &str = "sfc /scannow & dism /online /cleanup-image /restorehealth";
pub const GENERIC_TASK_DESCRIPTION: &str = "Reparación estándar de archivos de sistema.";

/// A single actionable remediation item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepairTask {
    pub id: String,
    pub title: String,
    pub command: String,
    pub description: String,
}

impl RepairTask {
    /// The maintenance task used when no label matches anything
    pub fn generic() -> Self {
        Self {
            id: GENERIC_TASK_ID.to_string(),
            title: GENERIC_TASK_TITLE.to_string(),
            command: GENERIC_TASK_COMMAND.to_string(),
            description: GENERIC_TASK_DESCRIPTION.to_string(),
        }
    }

    fn from_entry(entry: &KnowledgeEntry, label_idx: usize, match_idx: usize) -> Self {
        Self {
            id: format!("local-{}-{}", label_idx, match_idx),
            title: entry.name.clone(),
            command: entry.primary_command().to_string(),
            description: entry.remediation_steps.first().cloned().unwrap_or_default(),
        }
    }
}

/// Entries matching one risk label, most dangerous first
///
/// The label is split on runs of whitespace, so doubled or padded spaces
/// never yield an empty token; an empty token would be a substring of every
/// name. The sort is stable, so entries of equal danger keep catalog order.
pub fn matches_for_label<'a>(catalog: &'a Catalog, label: &str) -> Vec<&'a KnowledgeEntry> {
    let lowered = label.to_lowercase();
    let tokens: Vec<&str> = lowered.split_whitespace().collect();

    let mut matches: Vec<&KnowledgeEntry> = catalog
        .iter()
        .filter(|entry| {
            let name = entry.name.to_lowercase();
            tokens
                .iter()
                .any(|t| name.contains(t) || entry.tags.iter().any(|tag| tag == t))
        })
        .collect();

    matches.sort_by(|a, b| b.danger_level.rank().cmp(&a.danger_level.rank()));
    matches
}

/// Build a repair plan for a list of risk labels; never empty
pub fn build_repair_plan<S: AsRef<str>>(catalog: &Catalog, risk_labels: &[S]) -> Vec<RepairTask> {
    let mut plan = Vec::new();

    for (i, label) in risk_labels.iter().enumerate() {
        let matches = matches_for_label(catalog, label.as_ref());
        tracing::debug!(label = label.as_ref(), matches = matches.len(), "matched risk label");
        plan.extend(
            matches
                .into_iter()
                .enumerate()
                .map(|(j, entry)| RepairTask::from_entry(entry, i, j)),
        );
    }

    if plan.is_empty() {
        plan.push(RepairTask::generic());
    }

    plan
}

/// Render a plan as a Windows batch script
pub fn render_batch_script(plan: &[RepairTask]) -> String {
    let mut script = String::from("@echo off\r\necho OmniFix Script de Reparacion\r\n");
    for task in plan {
        script.push_str(&format!("echo [{}] {}\r\n", task.id, task.title));
        script.push_str(&task.command);
        script.push_str("\r\n");
    }
    script.push_str("pause\r\n");
    script
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::entry::{Category, DangerLevel};

    fn seed() -> Catalog {
        Catalog::embedded().unwrap()
    }

    fn entry(id: &str, name: &str, level: DangerLevel, tags: &[&str]) -> KnowledgeEntry {
        KnowledgeEntry {
            id: id.to_string(),
            name: name.to_string(),
            category: Category::System,
            symptom_examples: vec![],
            description: String::new(),
            danger_level: level,
            remediation_steps: vec![format!("First step for {}", id)],
            terminal_commands: vec![format!("cmd-{}", id)],
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    #[test]
    fn test_empty_labels_yield_generic_task() {
        let plan = build_repair_plan::<&str>(&seed(), &[]);
        assert_eq!(plan, vec![RepairTask::generic()]);
        assert_eq!(plan[0].id, "fix-generic-0");
        assert_eq!(plan[0].title, "Mantenimiento General");
    }

    #[test]
    fn test_unmatched_labels_yield_generic_task() {
        let plan = build_repair_plan(&seed(), &["zzzz qqqq"]);
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].id, GENERIC_TASK_ID);
    }

    #[test]
    fn test_disco_sin_letra() {
        let plan = build_repair_plan(&seed(), &["disco sin letra"]);

        let task = plan
            .iter()
            .find(|t| t.title == "Disco Invisible (Pérdida de Letra/Ruta)")
            .expect("st-03 task missing");
        assert_eq!(task.command, "diskpart");
        assert_eq!(task.description, "Abrir Administrador de Discos (diskmgmt.msc).");

        // st-04 (Critical) also matches "disco" and ranks first
        assert_eq!(plan[0].title, "Disco No Inicializado / I/O Error");
        assert_eq!(plan[0].id, "local-0-0");
        assert_eq!(task.id, "local-0-1");
    }

    #[test]
    fn test_critical_before_high() {
        let catalog = Catalog::new(vec![
            entry("h-1", "Virus Residente", DangerLevel::High, &["virus"]),
            entry("c-1", "Virus de Arranque", DangerLevel::Critical, &["virus"]),
        ])
        .unwrap();

        let plan = build_repair_plan(&catalog, &["virus"]);
        let titles: Vec<&str> = plan.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["Virus de Arranque", "Virus Residente"]);
        assert_eq!(plan[0].command, "cmd-c-1");
    }

    #[test]
    fn test_equal_danger_keeps_catalog_order() {
        let catalog = Catalog::new(vec![
            entry("a", "Red Lenta", DangerLevel::Low, &["red"]),
            entry("b", "Red Caida", DangerLevel::Low, &["red"]),
            entry("c", "Red Bloqueada", DangerLevel::Medium, &["red"]),
        ])
        .unwrap();

        let ids: Vec<&str> = matches_for_label(&catalog, "red")
            .iter()
            .map(|e| e.id.as_str())
            .collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_tags_require_exact_match() {
        let catalog = Catalog::new(vec![entry("t", "Sin Nombre", DangerLevel::Low, &["malware"])]).unwrap();

        // substring of a tag is not enough
        assert!(matches_for_label(&catalog, "malw").is_empty());
        assert_eq!(matches_for_label(&catalog, "MALWARE").len(), 1);
        // but substring of the name is
        assert_eq!(matches_for_label(&catalog, "nom").len(), 1);
    }

    #[test]
    fn test_labels_concatenate_in_order() {
        let plan = build_repair_plan(&seed(), &["bsod", "raw"]);
        let ids: Vec<&str> = plan.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["local-0-0", "local-1-0"]);
        assert_eq!(plan[0].title, "Conflicto de Driver (BSOD)");
        assert_eq!(plan[0].command, "pnputil /enum-drivers");
        assert_eq!(plan[1].title, "Reparación de Sistema de Archivos RAW");
    }

    #[test]
    fn test_missing_command_uses_default() {
        let mut e = entry("x", "Registro Roto", DangerLevel::Medium, &["registro"]);
        e.terminal_commands.clear();
        let catalog = Catalog::new(vec![e]).unwrap();

        let plan = build_repair_plan(&catalog, &["registro"]);
        assert_eq!(plan[0].command, "sfc /scannow");
    }

    #[test]
    fn test_blank_label_matches_nothing() {
        let plan = build_repair_plan(&seed(), &["   "]);
        assert_eq!(plan, vec![RepairTask::generic()]);
    }

    #[test]
    fn test_doubled_spaces_do_not_widen_match() {
        let catalog = seed();
        let spaced = matches_for_label(&catalog, "  bsod   driver ");
        let ids: Vec<&str> = spaced.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["dr-01"]);
    }

    #[test]
    fn test_batch_script() {
        let script = render_batch_script(&[RepairTask::generic()]);
        assert!(script.starts_with("@echo off\r\n"));
        assert!(script.contains("echo [fix-generic-0] Mantenimiento General\r\n"));
        assert!(script.contains(GENERIC_TASK_COMMAND));
        assert!(script.ends_with("pause\r\n"));
    }
}
