//! Resolve simplified-form documents and single expressions

use serde_json::Value;

use super::CliError;
use crate::{Context, Node, Resolution, ResolveOptions, Resolver, Schema, resolve_mapping};

/// Options for the resolve command
#[derive(Debug, Clone, Default)]
pub struct ResolveCommandOptions {
    /// Simplified-form document
    pub input: Option<String>,
    /// Schema document mapping column names to types
    pub schema: Option<String>,
    /// Read documents as YAML instead of JSON
    pub yaml: bool,
    pub options: ResolveOptions,
}

/// Options for the parse command
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// The expression to parse
    pub expression: String,
    pub schema: Option<String>,
    pub yaml: bool,
}

/// Parse a JSON or YAML document into a serde value.
pub fn parse_document<T: serde::de::DeserializeOwned>(text: &str, yaml: bool) -> Result<T, CliError> {
    if yaml {
        Ok(serde_yaml::from_str(text)?)
    } else {
        Ok(serde_json::from_str(text)?)
    }
}

fn load_schema(text: Option<&str>, yaml: bool) -> Result<Option<Schema>, CliError> {
    text.map(|text| parse_document(text, yaml)).transpose()
}

/// Resolve a whole document
pub fn execute_resolve(options: &ResolveCommandOptions) -> Result<Resolution, CliError> {
    let text = options.input.as_deref().ok_or(CliError::NoInput)?;
    let input: Value = parse_document(text, options.yaml)?;
    let schema = load_schema(options.schema.as_deref(), options.yaml)?;
    Ok(resolve_mapping(&input, schema.as_ref(), &options.options)?)
}

/// Strictly parse one expression and lower it to a node
pub fn execute_parse(options: &ParseOptions) -> Result<Node, CliError> {
    let schema = load_schema(options.schema.as_deref(), options.yaml)?;
    let node = Resolver::new().resolve_expression(&options.expression, Context::new(schema.as_ref()))?;
    Ok(node)
}
