//! Knowledge catalog - the fixed set of entries used for local matching
//!
//! The seed catalog is compiled into the binary. A user-provided YAML file of
//! the same shape can replace it at startup. Once loaded the catalog is never
//! mutated.

use miette::Diagnostic;
use rust_embed::RustEmbed;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::knowledge::entry::KnowledgeEntry;

/// File name of the seed catalog inside `catalog/`
const SEED_FILE: &str = "knowledge.yaml";

#[derive(RustEmbed)]
#[folder = "catalog/"]
pub(crate) struct SeedAssets;

/// Errors raised while loading a catalog
#[derive(Debug, Error, Diagnostic)]
pub enum CatalogError {
    #[error("Embedded catalog '{0}' is missing from the binary")]
    #[diagnostic(code(omnifix::catalog::missing_seed))]
    MissingSeed(String),

    #[error("Failed to read catalog {path}")]
    #[diagnostic(code(omnifix::catalog::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse catalog {origin}: {message}")]
    #[diagnostic(
        code(omnifix::catalog::parse),
        help("The catalog must be a YAML list of entries")
    )]
    Parse { origin: String, message: String },

    #[error("Duplicate catalog id '{0}'")]
    #[diagnostic(code(omnifix::catalog::duplicate_id))]
    DuplicateId(String),

    #[error("Catalog entry '{0}' has no remediation steps")]
    #[diagnostic(code(omnifix::catalog::no_remediation))]
    NoRemediation(String),
}

/// Immutable, ordered collection of knowledge entries
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<KnowledgeEntry>,
}

impl Catalog {
    /// Build a catalog from entries, checking id uniqueness
    pub fn new(entries: Vec<KnowledgeEntry>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for entry in &entries {
            if !seen.insert(entry.id.as_str()) {
                return Err(CatalogError::DuplicateId(entry.id.clone()));
            }
            if entry.remediation_steps.is_empty() {
                return Err(CatalogError::NoRemediation(entry.id.clone()));
            }
        }
        Ok(Self { entries })
    }

    /// Load the catalog compiled into the binary
    pub fn embedded() -> Result<Self, CatalogError> {
        let file = SeedAssets::get(SEED_FILE)
            .ok_or_else(|| CatalogError::MissingSeed(SEED_FILE.to_string()))?;
        let content = String::from_utf8_lossy(&file.data);
        Self::from_yaml(&content, SEED_FILE)
    }

    /// Load a catalog from a YAML file
    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content, &path.display().to_string())
    }

    /// Parse a catalog from YAML text; `origin` names the source in errors
    pub fn from_yaml(content: &str, origin: &str) -> Result<Self, CatalogError> {
        let entries: Vec<KnowledgeEntry> =
            serde_yml::from_str(content).map_err(|e| CatalogError::Parse {
                origin: origin.to_string(),
                message: e.to_string(),
            })?;
        let catalog = Self::new(entries)?;
        tracing::info!(origin, entries = catalog.len(), "loaded knowledge catalog");
        Ok(catalog)
    }

    /// Load from `path` when given, otherwise the embedded catalog
    pub fn load(path: Option<&Path>) -> Result<Self, CatalogError> {
        match path {
            Some(p) => Self::from_path(p),
            None => Self::embedded(),
        }
    }

    pub fn entries(&self) -> &[KnowledgeEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &KnowledgeEntry> {
        self.entries.iter()
    }

    /// Look up an entry by id (case-insensitive)
    pub fn get(&self, id: &str) -> Option<&KnowledgeEntry> {
        self.entries.iter().find(|e| e.id.eq_ignore_ascii_case(id))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
