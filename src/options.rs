use serde::{Deserialize, Serialize};

/// What happens to sibling entries when one entry fails to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureMode {
    /// The first failing entry aborts the whole mapping
    #[default]
    FailFast,
    /// Each entry stands alone; failures are collected
    Isolate,
}

/// Mapping-level resolution settings.
///
/// Deserializes with defaults, so a host configuration can embed it as
/// `{failure_mode: isolate}` or leave it out entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResolveOptions {
    pub failure_mode: FailureMode,
    /// Check every column against the schema after resolution
    pub validate_columns: bool,
}

impl ResolveOptions {
    pub fn isolate(mut self) -> Self {
        self.failure_mode = FailureMode::Isolate;
        self
    }

    pub fn with_column_validation(mut self) -> Self {
        self.validate_columns = true;
        self
    }
}
