//! Download library - ISO images, installers and mobile firmware
//!
//! Two shelves ship with the binary: the ISO/software library that staged
//! items refer to, and a short list of mobile firmware. Items suggested by
//! the AI backend are merged into a shelf without duplicating what it
//! already holds.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::knowledge::catalog::{CatalogError, SeedAssets};

/// One downloadable item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryItem {
    pub id: String,
    pub name: String,
    pub version: String,
    pub size: String,
    /// Windows, Rescue, Software, ROM, Stock...
    #[serde(rename = "type")]
    pub kind: String,
    pub status: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
}

impl LibraryItem {
    /// True when `other` names the same item (same id, or same name ignoring case)
    pub fn same_as(&self, other: &LibraryItem) -> bool {
        self.id == other.id || self.name.to_lowercase() == other.name.to_lowercase()
    }
}

/// Which built-in list to load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shelf {
    Iso,
    Firmware,
}

impl Shelf {
    fn file_name(self) -> &'static str {
        match self {
            Shelf::Iso => "library.yaml",
            Shelf::Firmware => "firmware.yaml",
        }
    }
}

/// Ordered list of library items
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Library {
    items: Vec<LibraryItem>,
}

impl Library {
    /// Build a library, rejecting repeated ids
    pub fn new(items: Vec<LibraryItem>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for item in &items {
            if !seen.insert(item.id.as_str()) {
                return Err(CatalogError::DuplicateId(item.id.clone()));
            }
        }
        Ok(Self { items })
    }

    /// Load a shelf compiled into the binary
    pub fn embedded(shelf: Shelf) -> Result<Self, CatalogError> {
        let name = shelf.file_name();
        let file = SeedAssets::get(name).ok_or_else(|| CatalogError::MissingSeed(name.to_string()))?;
        Self::from_yaml(&String::from_utf8_lossy(&file.data), name)
    }

    /// Parse a library from YAML text; `origin` names the source in errors
    pub fn from_yaml(content: &str, origin: &str) -> Result<Self, CatalogError> {
        let items: Vec<LibraryItem> =
            serde_yml::from_str(content).map_err(|e| CatalogError::Parse {
                origin: origin.to_string(),
                message: e.to_string(),
            })?;
        Self::new(items)
    }

    /// Append items that are not already present; returns how many were added
    ///
    /// An incoming item is skipped when its id matches, or its name matches
    /// case-insensitively, any item already in the library, including items
    /// appended earlier in the same call.
    pub fn merge(&mut self, incoming: Vec<LibraryItem>) -> usize {
        let before = self.items.len();
        for item in incoming {
            if !self.items.iter().any(|existing| existing.same_as(&item)) {
                self.items.push(item);
            }
        }
        self.items.len() - before
    }

    pub fn items(&self) -> &[LibraryItem] {
        &self.items
    }

    pub fn iter(&self) -> impl Iterator<Item = &LibraryItem> {
        self.items.iter()
    }

    /// Look up an item by id (case-insensitive)
    pub fn get(&self, id: &str) -> Option<&LibraryItem> {
        self.items.iter().find(|i| i.id.eq_ignore_ascii_case(id))
    }

    /// Items of one type (case-insensitive), in library order
    pub fn of_kind<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a LibraryItem> + 'a {
        self.items.iter().filter(move |i| i.kind.eq_ignore_ascii_case(kind))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
