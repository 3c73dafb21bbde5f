//! CLI support for dftly
//!
//! Provides programmatic access to the dftly CLI so other tools can embed
//! resolution without shelling out.

mod kinds;
mod resolve;

pub use kinds::get_kinds_overview;
pub use resolve::{ParseOptions, ResolveCommandOptions, execute_parse, execute_resolve, parse_document};

use std::io;

/// Errors that can occur during CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Resolution failed
    #[error("{0}")]
    Resolve(#[from] crate::ResolveError),
    /// Input was not valid JSON
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// Input was not valid YAML
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    /// Nothing on `--input` and nothing piped in
    #[error("no input provided. Use --input or pipe a document to stdin.")]
    NoInput,
    /// Isolated resolution finished with failed entries
    #[error("{failed} of {total} entries failed to resolve")]
    Incomplete { failed: usize, total: usize },
}
