//! Shared utilities for CLI commands

use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

use crate::assistant::{CommandClient, CompletionClient, OfflineClient, Source};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{Config, JsonFileStore, StagedItems};
use crate::knowledge::{Catalog, Library, Shelf};

/// Load the catalog named in config, or the built-in one
pub fn load_catalog(config: &Config) -> Result<Catalog> {
    Ok(Catalog::load(config.catalog.as_deref())?)
}

/// Load one of the built-in library shelves
pub fn load_shelf(shelf: Shelf) -> Result<Library> {
    Ok(Library::embedded(shelf)?)
}

/// Pick the completion backend for this invocation
pub fn completion_client(config: &Config, global: &GlobalOpts) -> Box<dyn CompletionClient> {
    if global.offline {
        return Box::new(OfflineClient);
    }
    match CommandClient::from_config(config) {
        Some(client) => Box::new(client),
        None => Box::new(OfflineClient),
    }
}

/// Open the staged list in the configured data directory
pub fn open_staged(config: &Config) -> Result<StagedItems<JsonFileStore>> {
    let dir = config
        .data_dir()
        .ok_or_else(|| miette::miette!("Could not determine data directory (set data_dir)"))?;
    let store = JsonFileStore::open(&dir).into_diagnostic()?;
    StagedItems::load(store).into_diagnostic()
}

/// Output format for this invocation
pub fn output_format(config: &Config, global: &GlobalOpts) -> OutputFormat {
    global.resolved_format(config.default_format.as_deref())
}

/// Print a value as JSON or YAML; returns false for other formats
pub fn print_structured<T: Serialize>(value: &T, format: OutputFormat) -> Result<bool> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(value).into_diagnostic()?);
            Ok(true)
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(value).into_diagnostic()?);
            Ok(true)
        }
        _ => Ok(false),
    }
}

/// Tell the user on stderr when any part of an answer came from local data
pub fn note_source(sources: &[Source], global: &GlobalOpts) {
    if global.quiet || !sources.contains(&Source::Local) {
        return;
    }
    eprintln!(
        "{} {}",
        style("i").dim(),
        style("answered from the local knowledge catalog").dim()
    );
}

/// Join free-text words given as separate arguments
pub fn join_words(words: &[String]) -> String {
    words.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offline_flag_wins_over_config() {
        let config = Config {
            ai_command: Some("cat".to_string()),
            api_key: Some("k".to_string()),
            ..Default::default()
        };
        let global = GlobalOpts {
            offline: true,
            ..Default::default()
        };
        assert!(completion_client(&config, &global).complete("{}").is_err());
    }

    #[test]
    fn test_join_words() {
        assert_eq!(join_words(&["disco".to_string(), "raw".to_string()]), "disco raw");
        assert_eq!(join_words(&[]), "");
    }
}
