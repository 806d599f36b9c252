//! Knowledge module - local catalog, matcher, repair planner and download library

pub mod catalog;
pub mod entry;
pub mod library;
pub mod matcher;
pub mod plan;

pub use catalog::{Catalog, CatalogError};
pub use entry::{Category, DangerLevel, KnowledgeEntry};
pub use library::{Library, LibraryItem, Shelf};
pub use matcher::{match_diagnosis, score_entries, DiagnosticResult, ScoredEntry};
pub use plan::{build_repair_plan, render_batch_script, RepairTask};
