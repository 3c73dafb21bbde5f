//! JSON output for resolved mappings.
//!
//! Output is deterministic: entries and keyword arguments are `BTreeMap`s, so
//! keys always come out sorted.
//!
//! # Examples
//!
//! ```
//! use std::collections::BTreeMap;
//! use dftly::Node;
//! use dftly::output::to_json;
//!
//! let mut entries = BTreeMap::new();
//! entries.insert("answer".to_string(), Node::literal(42));
//!
//! assert_eq!(to_json(&entries).unwrap(), r#"{"answer":{"literal":42}}"#);
//! ```

use std::collections::BTreeMap;

use crate::error::ResolveError;
use crate::node::Node;

/// Compact JSON of resolved entries.
pub fn to_json(entries: &BTreeMap<String, Node>) -> Result<String, serde_json::Error> {
    serde_json::to_string(entries)
}

/// Pretty JSON of resolved entries, 2-space indented.
pub fn to_json_pretty(entries: &BTreeMap<String, Node>) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(entries)
}

/// One line per failed entry: `name: error`.
pub fn failure_report(failures: &BTreeMap<String, ResolveError>) -> String {
    failures
        .iter()
        .map(|(name, error)| format!("{}: {}\n", name, error))
        .collect()
}
