//! Local knowledge matcher
//!
//! Scores every catalog entry against a free-text problem description with a
//! bag-of-words overlap and maps the best entry to a [`DiagnosticResult`].
//! Matching never fails: when nothing scores, a generic investigation result
//! is returned instead.

use serde::{Deserialize, Serialize};

use crate::knowledge::catalog::Catalog;
use crate::knowledge::entry::{Category, KnowledgeEntry};

/// Tokens shorter than this (in characters) are treated as noise
pub const MIN_TOKEN_LEN: usize = 3;

const HAYSTACK_BONUS: u32 = 1;
const TAG_BONUS: u32 = 2;
const NAME_BONUS: u32 = 3;

/// Tools recommended for every locally matched entry
pub const LOCAL_TOOLS: [&str; 3] = ["OmniFix Local Scanner", "CMD Admin", "Toolbox"];

pub const FALLBACK_SUMMARY: &str = "No se encontró coincidencia exacta en la base local amplia. El problema puede ser nuevo o requiere análisis de logs crudos.";
pub const FALLBACK_STEPS: [&str; 3] = [
    "Analizar visor de eventos (eventvwr.msc)",
    "Revisar procesos activos en Administrador de Tareas",
    "Escanear con herramientas de la Toolbox (Victoria/MemTest)",
];
pub const FALLBACK_TOOLS: [&str; 3] = ["HWiNFO64", "Victoria HDD", "Process Explorer"];
pub const UNKNOWN_SEVERITY: &str = "Desconocida";
pub const FALLBACK_DIFFICULTY: &str = "Alta / Investigación";

const MOBILE_DIFFICULTY: &str = "Intermedio (Hardware)";
const MANUAL_DIFFICULTY: &str = "Técnico Manual";

/// Diagnostic shown to the user, whether it came from the AI backend or the
/// local catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticResult {
    pub summary: String,
    pub steps: Vec<String>,
    pub recommended_tools: Vec<String>,
    pub severity: String,
    pub difficulty: String,
}

impl DiagnosticResult {
    /// The catalog-independent result used when no entry matches
    pub fn fallback() -> Self {
        Self {
            summary: FALLBACK_SUMMARY.to_string(),
            steps: FALLBACK_STEPS.iter().map(|s| s.to_string()).collect(),
            recommended_tools: FALLBACK_TOOLS.iter().map(|s| s.to_string()).collect(),
            severity: UNKNOWN_SEVERITY.to_string(),
            difficulty: FALLBACK_DIFFICULTY.to_string(),
        }
    }

    /// Map a matched entry to a result
    pub fn from_entry(entry: &KnowledgeEntry) -> Self {
        let difficulty = if entry.category == Category::Mobile {
            MOBILE_DIFFICULTY
        } else {
            MANUAL_DIFFICULTY
        };

        Self {
            summary: entry.description.clone(),
            steps: entry.remediation_steps.clone(),
            recommended_tools: LOCAL_TOOLS.iter().map(|s| s.to_string()).collect(),
            severity: entry.danger_level.to_string(),
            difficulty: difficulty.to_string(),
        }
    }

    /// True when this is the generic no-match result
    pub fn is_fallback(&self) -> bool {
        self.severity == UNKNOWN_SEVERITY && self.summary == FALLBACK_SUMMARY
    }
}

/// A catalog entry with its score for one query
#[derive(Debug, Clone, Copy)]
pub struct ScoredEntry<'a> {
    pub entry: &'a KnowledgeEntry,
    pub score: u32,
}

/// Split a query into lower-case tokens
///
/// Separators are runs of space, comma, period, semicolon and slash. Other
/// whitespace (tabs, newlines) is kept inside tokens.
pub fn tokenize(query: &str) -> Vec<String> {
    query
        .to_lowercase()
        .split(|c: char| matches!(c, ' ' | ',' | '.' | ';' | '/'))
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Score one entry against already-tokenized input
pub fn score_entry(entry: &KnowledgeEntry, tokens: &[String]) -> u32 {
    let haystack = entry.haystack();
    let name = entry.name.to_lowercase();

    tokens
        .iter()
        .filter(|t| t.chars().count() >= MIN_TOKEN_LEN)
        .map(|token| {
            let mut score = 0;
            if haystack.contains(token.as_str()) {
                score += HAYSTACK_BONUS;
            }
            if entry.tags.iter().any(|tag| tag.contains(token.as_str())) {
                score += TAG_BONUS;
            }
            if name.contains(token.as_str()) {
                score += NAME_BONUS;
            }
            score
        })
        .sum()
}

/// Score every entry, in catalog order
pub fn score_entries<'a>(catalog: &'a Catalog, query: &str) -> Vec<ScoredEntry<'a>> {
    let tokens = tokenize(query);
    catalog
        .iter()
        .map(|entry| ScoredEntry {
            entry,
            score: score_entry(entry, &tokens),
        })
        .collect()
}

/// Best-scoring entry, if any scored above zero
///
/// Ties go to the entry that comes first in the catalog.
pub fn best_match<'a>(catalog: &'a Catalog, query: &str) -> Option<ScoredEntry<'a>> {
    let mut best: Option<ScoredEntry<'a>> = None;
    for scored in score_entries(catalog, query) {
        tracing::debug!(id = %scored.entry.id, score = scored.score, "scored entry");
        if scored.score > best.map_or(0, |b| b.score) {
            best = Some(scored);
        }
    }
    best
}

/// Diagnose a problem description against the catalog
pub fn match_diagnosis(catalog: &Catalog, query: &str) -> DiagnosticResult {
    match best_match(catalog, query) {
        Some(best) => DiagnosticResult::from_entry(best.entry),
        None => DiagnosticResult::fallback(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::entry::DangerLevel;

    fn seed() -> Catalog {
        Catalog::embedded().unwrap()
    }

    fn entry(id: &str, name: &str, category: Category, tags: &[&str]) -> KnowledgeEntry {
        KnowledgeEntry {
            id: id.to_string(),
            name: name.to_string(),
            category,
            symptom_examples: vec!["ignored symptom text".to_string()],
            description: format!("Description of {}", name),
            danger_level: DangerLevel::Medium,
            remediation_steps: vec![format!("Fix {}", name)],
            terminal_commands: vec![],
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    #[test]
    fn test_tokenize_separators() {
        assert_eq!(
            tokenize("Disco RAW, sin letra; C:/datos.bak"),
            vec!["disco", "raw", "sin", "letra", "c:", "datos", "bak"]
        );
        assert!(tokenize("").is_empty());
        assert!(tokenize(" ,.;/ ").is_empty());
    }

    #[test]
    fn test_tokenize_keeps_other_whitespace() {
        assert_eq!(tokenize("disco\tduro"), vec!["disco\tduro"]);
    }

    #[test]
    fn test_score_bonuses_accumulate() {
        let e = entry("x-1", "Pantalla Negra", Category::System, &["pantalla", "video"]);
        // haystack +1, tag +2, name +3
        assert_eq!(score_entry(&e, &tokenize("pantalla")), 6);
        // haystack +1, tag +2
        assert_eq!(score_entry(&e, &tokenize("video")), 3);
        // category only appears in the haystack
        assert_eq!(score_entry(&e, &tokenize("system")), 1);
        // symptom examples are never scored
        assert_eq!(score_entry(&e, &tokenize("ignored")), 0);
        // tokens add up
        assert_eq!(score_entry(&e, &tokenize("pantalla video")), 9);
    }

    #[test]
    fn test_results_are_never_empty() {
        let catalog = seed();
        for q in ["", "to", "disco", "BSOD pantallazo", "zzzz qqqq", "  ;;;  "] {
            let r = match_diagnosis(&catalog, q);
            assert!(!r.summary.is_empty(), "summary empty for {:?}", q);
            assert!(!r.steps.is_empty());
            assert!(!r.recommended_tools.is_empty());
            assert!(!r.severity.is_empty());
            assert!(!r.difficulty.is_empty());
        }
    }

    #[test]
    fn test_short_tokens_never_score() {
        let catalog = seed();
        assert_eq!(match_diagnosis(&catalog, "to"), DiagnosticResult::fallback());
        assert_eq!(match_diagnosis(&catalog, "at"), DiagnosticResult::fallback());
        assert_eq!(match_diagnosis(&catalog, "io de mb c: d:"), DiagnosticResult::fallback());
    }

    #[test]
    fn test_empty_query_falls_back() {
        let r = match_diagnosis(&seed(), "");
        assert!(r.is_fallback());
        assert_eq!(r.severity, "Desconocida");
        assert_eq!(r.difficulty, "Alta / Investigación");
        assert_eq!(r.steps.len(), 3);
        assert_eq!(r.recommended_tools, vec!["HWiNFO64", "Victoria HDD", "Process Explorer"]);
    }

    #[test]
    fn test_empty_catalog_falls_back() {
        let catalog = Catalog::default();
        assert!(match_diagnosis(&catalog, "disco raw").is_fallback());
    }

    #[test]
    fn test_full_name_in_query_wins() {
        let catalog = seed();
        for e in catalog.iter() {
            let query = format!("mi equipo tiene {} desde ayer", e.name);
            let r = match_diagnosis(&catalog, &query);
            assert_eq!(r.summary, e.description, "entry {} did not win", e.id);
        }
    }

    #[test]
    fn test_matched_entry_mapping() {
        let catalog = seed();
        let r = match_diagnosis(&catalog, "pantallazo bsod driver");
        let dr01 = catalog.get("dr-01").unwrap();
        assert_eq!(r.summary, dr01.description);
        assert_eq!(r.steps, dr01.remediation_steps);
        assert_eq!(r.recommended_tools, vec!["OmniFix Local Scanner", "CMD Admin", "Toolbox"]);
        assert_eq!(r.severity, "High");
        assert_eq!(r.difficulty, "Técnico Manual");
    }

    #[test]
    fn test_mobile_difficulty() {
        let catalog = Catalog::new(vec![
            entry("pc-1", "Fuente Quemada", Category::Hardware, &["fuente"]),
            entry("mb-1", "Puerto de Carga", Category::Mobile, &["carga", "usb"]),
        ])
        .unwrap();

        assert_eq!(match_diagnosis(&catalog, "no carga").difficulty, "Intermedio (Hardware)");
        assert_eq!(match_diagnosis(&catalog, "fuente").difficulty, "Técnico Manual");
    }

    #[test]
    fn test_tie_goes_to_first_entry() {
        let catalog = Catalog::new(vec![
            entry("a-1", "Disco Lento", Category::Storage, &["disco"]),
            entry("a-2", "Disco Ruidoso", Category::Storage, &["disco"]),
        ])
        .unwrap();

        let best = best_match(&catalog, "disco").unwrap();
        assert_eq!(best.entry.id, "a-1");

        // "disco raw" ties st-03, st-04 and st-05 in the seed catalog
        let seed = seed();
        let best = best_match(&seed, "disco raw").unwrap();
        assert_eq!(best.entry.id, "st-03");
    }

    #[test]
    fn test_case_insensitive() {
        let catalog = seed();
        assert_eq!(
            match_diagnosis(&catalog, "DISCO RAW"),
            match_diagnosis(&catalog, "disco raw")
        );
    }

    #[test]
    fn test_idempotent() {
        let catalog = seed();
        let q = "El disco pide inicializar, error de I/O en MBR";
        assert_eq!(match_diagnosis(&catalog, q), match_diagnosis(&catalog, q));
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_value(DiagnosticResult::fallback()).unwrap();
        assert!(json.get("recommendedTools").is_some());
        assert!(json.get("recommended_tools").is_none());
    }
}
