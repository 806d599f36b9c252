//! Core module - configuration and local persistence

pub mod config;
pub mod staged;
pub mod store;

pub use config::Config;
pub use staged::{StagedItems, STAGED_KEY};
pub use store::{JsonFileStore, KeyValueStore, MemoryStore, StoreError};
