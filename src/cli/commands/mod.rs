//! CLI command implementations

pub mod utils;

pub mod catalog;
pub mod completions;
pub mod config;
pub mod diagnose;
pub mod library;
pub mod mobile;
pub mod plan;
pub mod recover;
pub mod scan;
pub mod secure;
pub mod staged;
