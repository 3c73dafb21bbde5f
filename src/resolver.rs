//! Structural resolver.
//!
//! Converts simplified-form values into canonical [`Node`]s by dispatching on
//! shape. A [`Context`] travels down the recursion and decides how each value
//! is read.
//!
//! # Examples
//!
//! ```
//! use dftly::{Context, Resolver, Schema};
//! use serde_json::json;
//!
//! let schema: Schema = [("col1".to_string(), None), ("col2".to_string(), None)]
//!     .into_iter()
//!     .collect();
//! let node = Resolver::new()
//!     .resolve(&json!("@col1 + @col2"), Context::new(Some(&schema)))
//!     .unwrap();
//! assert_eq!(node.to_string(), "ADD(@col1, @col2)");
//! ```

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};
use tracing::{debug, info, trace, warn};

use crate::catalogue::{self, Alias, ArgShape, ExprKind, FieldContext};
use crate::error::{Path, ResolveError, ResolveResult};
use crate::lower;
use crate::node::{Arguments, Node};
use crate::options::{FailureMode, ResolveOptions};
use crate::parser;
use crate::validation;

/// Column name to declared type. A `None` type means the column exists but
/// its type is unknown.
pub type Schema = BTreeMap<String, Option<String>>;

/// Flags controlling how one value is read. Derived, never mutated.
#[derive(Debug, Clone, Copy, Default)]
pub struct Context<'s> {
    /// Every value becomes a Literal regardless of shape
    pub literal: bool,
    /// Children, not this value, become Literals
    pub recurse_to_literal: bool,
    /// A list is a sequence of independent nodes
    pub recursive_list: bool,
    pub input_schema: Option<&'s Schema>,
}

impl<'s> Context<'s> {
    /// Fresh context for a top-level entry.
    pub fn new(input_schema: Option<&'s Schema>) -> Self {
        Context {
            literal: false,
            recurse_to_literal: false,
            recursive_list: false,
            input_schema,
        }
    }

    /// Context for the children of the current value.
    pub fn descend(&self) -> Self {
        Context {
            literal: self.literal || self.recurse_to_literal,
            recurse_to_literal: false,
            recursive_list: false,
            input_schema: self.input_schema,
        }
    }

    /// Context for an argument whose catalogue entry declares `field` flags.
    pub fn with_field(&self, field: FieldContext) -> Self {
        let base = self.descend();
        Context {
            literal: base.literal || field.literal,
            recurse_to_literal: field.recurse_to_literal,
            recursive_list: field.recursive_list,
            input_schema: self.input_schema,
        }
    }

    /// A Column for `name` if the schema declares it.
    pub fn declared_column(&self, name: &str) -> Option<Node> {
        let ty = self.input_schema?.get(name)?;
        Some(Node::column(name, ty.clone()))
    }

    /// A Column for `name`, typed from the schema when known.
    pub fn column_node(&self, name: &str) -> Node {
        self.declared_column(name)
            .unwrap_or_else(|| Node::column(name, None))
    }
}

/// Result of resolving a value that may be a list under `recursive_list`.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    Node(Node),
    Sequence(Vec<Node>),
}

/// Build, normalise and validate one expression.
pub(crate) fn build_expression(
    kind: ExprKind,
    arguments: Arguments,
    path: &Path,
) -> ResolveResult<Node> {
    let expr = catalogue::finish(kind, arguments);
    validation::validate(&expr, path)?;
    Ok(Node::Expression(expr))
}

/// Named `{placeholder}`, or a doubled brace escape.
static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{|\}\}|\{([^{}]+)\}").expect("valid placeholder regex"));

type Pairs<'v> = Vec<(String, Cow<'v, Value>)>;

/// Shape-dispatching resolver. Stateless; one instance can serve many threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct Resolver;

impl Resolver {
    pub fn new() -> Self {
        Resolver
    }

    /// Resolve a value to a single node.
    pub fn resolve(&self, value: &Value, ctx: Context<'_>) -> ResolveResult<Node> {
        self.resolve_node(value, ctx, &Path::root())
    }

    /// Parse `text` strictly as an expression.
    ///
    /// Unlike [`resolve`](Self::resolve), a malformed expression is a syntax
    /// error rather than a string literal.
    pub fn resolve_expression(&self, text: &str, ctx: Context<'_>) -> ResolveResult<Node> {
        let path = Path::root();
        if let Some(column) = ctx.declared_column(text) {
            return Ok(column);
        }
        let syntax = parser::parse(text).map_err(|e| ResolveError::syntax(&path, e))?;
        lower::lower(&syntax, ctx, &path)
    }

    /// Resolve one top-level entry, reporting errors under its key.
    #[tracing::instrument(level = "debug", skip(self, value, schema, options))]
    pub fn resolve_entry(
        &self,
        name: &str,
        value: &Value,
        schema: Option<&Schema>,
        options: &ResolveOptions,
    ) -> ResolveResult<Node> {
        let path = Path::root().key(name);
        let node = self.resolve_node(value, Context::new(schema), &path)?;
        if options.validate_columns
            && let Some(schema) = schema
        {
            validation::validate_columns(&node, schema, &path)?;
        }
        Ok(node)
    }

    pub fn resolve_node(&self, value: &Value, ctx: Context<'_>, path: &Path) -> ResolveResult<Node> {
        match self.resolve_value(value, ctx, path)? {
            Resolved::Node(node) => Ok(node),
            Resolved::Sequence(_) => Err(ResolveError::structural(
                path,
                "a list of arguments cannot stand alone here",
            )),
        }
    }

    /// Full dispatch, in order: already resolved, literal-forced, scalar,
    /// string, list, map.
    pub fn resolve_value(
        &self,
        value: &Value,
        ctx: Context<'_>,
        path: &Path,
    ) -> ResolveResult<Resolved> {
        if let Some(node) = Node::from_resolved(value) {
            trace!(path = %path, "already resolved");
            check_resolved(&node, path)?;
            return Ok(Resolved::Node(node));
        }
        if ctx.literal {
            return Ok(Resolved::Node(Node::literal(value.clone())));
        }
        match value {
            Value::Null | Value::Bool(_) | Value::Number(_) => {
                Ok(Resolved::Node(Node::literal(value.clone())))
            }
            Value::String(text) => self.resolve_string(text, ctx, path).map(Resolved::Node),
            Value::Array(items) => self.resolve_list(items, ctx, path),
            Value::Object(map) => self.resolve_map(map, ctx, path).map(Resolved::Node),
        }
    }

    fn resolve_string(&self, text: &str, ctx: Context<'_>, path: &Path) -> ResolveResult<Node> {
        if let Some(column) = ctx.declared_column(text) {
            trace!(path = %path, column = text, "schema column");
            return Ok(column);
        }
        match parser::parse(text) {
            Ok(syntax) => match lower::lower(&syntax, ctx, path) {
                // Plain prose like "n/a" or "yes or no" parses, but its words are no columns
                Err(error) if error.is_validation() && lower::has_unknown_names(&syntax, ctx) => {
                    debug!(path = %path, text, %error, "bare words are not an expression, trying interpolation");
                }
                result => return result,
            },
            Err(error) => {
                debug!(path = %path, text, %error, "not an expression, trying interpolation");
            }
        }
        if let Some(node) = self.interpolate(text, None, ctx, path)? {
            return Ok(node);
        }
        debug!(path = %path, text, "string literal");
        Ok(Node::literal(text))
    }

    fn resolve_list(&self, items: &[Value], ctx: Context<'_>, path: &Path) -> ResolveResult<Resolved> {
        let child = ctx.descend();
        if ctx.recursive_list {
            let nodes = items
                .iter()
                .enumerate()
                .map(|(idx, item)| self.resolve_node(item, child, &path.index(idx)))
                .collect::<ResolveResult<Vec<_>>>()?;
            return Ok(Resolved::Sequence(nodes));
        }
        if items.is_empty() {
            debug!(path = %path, "empty list resolved as null");
            return Ok(Resolved::Node(Node::null()));
        }
        if let Some(node) = self.resolve_chain(items, child, path)? {
            return Ok(Resolved::Node(node));
        }
        let args = items
            .iter()
            .enumerate()
            .map(|(idx, item)| self.resolve_node(item, child, &path.index(idx)))
            .collect::<ResolveResult<Vec<_>>>()?;
        debug!(path = %path, count = args.len(), "list resolved as coalesce");
        build_expression(ExprKind::Coalesce, Arguments::Positional(args), path).map(Resolved::Node)
    }

    /// `[{if: P1, then: A1}, {when: P2, then: A2}, B]` → nested CONDITIONALs.
    fn resolve_chain(&self, items: &[Value], ctx: Context<'_>, path: &Path) -> ResolveResult<Option<Node>> {
        let Some((last, leading)) = items.split_last() else {
            return Ok(None);
        };
        let mut links = Vec::with_capacity(items.len());
        for item in leading {
            match chain_link(item) {
                Some(link) => links.push(link),
                None => return Ok(None),
            }
        }
        let mut otherwise = match chain_link(last) {
            Some(link) => {
                links.push(link);
                Node::null()
            }
            None if links.is_empty() => return Ok(None),
            None => self.resolve_node(last, ctx, &path.index(items.len() - 1))?,
        };
        debug!(path = %path, links = links.len(), "list resolved as conditional chain");

        for (idx, (condition_key, condition, then)) in links.into_iter().enumerate().rev() {
            let link_path = path.index(idx);
            let condition = self.resolve_node(condition, ctx, &link_path.key(condition_key))?;
            let then = self.resolve_node(then, ctx, &link_path.key("then"))?;
            let mut args = BTreeMap::new();
            args.insert("if".to_string(), condition);
            args.insert("then".to_string(), then);
            args.insert("else".to_string(), otherwise);
            otherwise = build_expression(ExprKind::Conditional, Arguments::Keyword(args), &link_path)?;
        }
        Ok(Some(otherwise))
    }

    fn resolve_map(&self, map: &Map<String, Value>, ctx: Context<'_>, path: &Path) -> ResolveResult<Node> {
        if map.is_empty() {
            return Err(ResolveError::structural(path, "an empty mapping describes no value"));
        }
        if map.len() == 1
            && let Some((key, payload)) = map.iter().next()
        {
            if let Some(alias) = catalogue::lookup(key) {
                return self.resolve_shorthand(alias, payload, ctx, &path.key(key));
            }
            match (key.as_str(), payload) {
                ("column", Value::String(name)) => return Ok(ctx.column_node(name)),
                ("expression", Value::Object(inner)) => {
                    return self.resolve_loose_expression(inner, ctx, &path.key(key));
                }
                _ => {}
            }
            if let Some(node) = self.resolve_compressed_parse(key, payload, ctx, path)? {
                return Ok(node);
            }
        }

        let keys: BTreeSet<&str> = map.keys().map(String::as_str).collect();
        match catalogue::match_field_set(&keys).as_slice() {
            [] => Err(ResolveError::structural(
                path,
                format!(
                    "no expression matches the keys {{{}}}",
                    keys.into_iter().collect::<Vec<_>>().join(", ")
                ),
            )),
            [ExprKind::StringInterpolate] => self.resolve_interpolate_map(map, ctx, path),
            [kind] => {
                debug!(path = %path, kind = %kind, "matched field set");
                let pairs = map
                    .iter()
                    .map(|(key, value)| (key.clone(), Cow::Borrowed(value)))
                    .collect();
                self.resolve_keyword(*kind, None, pairs, ctx, path)
            }
            candidates => Err(ResolveError::structural(
                path,
                format!(
                    "ambiguous mapping: keys match {}",
                    candidates
                        .iter()
                        .map(|kind| kind.name())
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            )),
        }
    }

    /// `{alias: payload}` where the alias names a catalogue kind.
    fn resolve_shorthand(&self, alias: Alias, payload: &Value, ctx: Context<'_>, path: &Path) -> ResolveResult<Node> {
        trace!(path = %path, kind = %alias.kind, "shorthand");
        match &alias.kind.spec().shape {
            ArgShape::Positional { .. } if alias.kind == ExprKind::StringInterpolate => {
                self.resolve_interpolate_payload(payload, ctx, path)
            }
            ArgShape::Positional { context, .. } => {
                let args = match payload {
                    Value::Null => Vec::new(),
                    Value::Array(_) => match self.resolve_value(payload, ctx.with_field(*context), path)? {
                        Resolved::Sequence(nodes) => nodes,
                        Resolved::Node(node) => vec![node],
                    },
                    other => vec![self.resolve_node(other, ctx.descend(), path)?],
                };
                build_expression(alias.kind, Arguments::Positional(args), path)
            }
            ArgShape::Keyword { fields } => {
                let pairs: Pairs<'_> = match payload {
                    Value::Object(map) => map
                        .iter()
                        .map(|(key, value)| (key.clone(), Cow::Borrowed(value)))
                        .collect(),
                    Value::Array(items) => {
                        let open: Vec<_> = fields
                            .iter()
                            .filter(|f| alias.preset.is_none_or(|(preset, _)| preset != f.name))
                            .collect();
                        if items.len() > open.len() {
                            return Err(ResolveError::structural(
                                path,
                                format!(
                                    "`{}` takes at most {} arguments, got {}",
                                    alias.name,
                                    open.len(),
                                    items.len()
                                ),
                            ));
                        }
                        open.into_iter()
                            .zip(items)
                            .map(|(field, value)| (field.name.to_string(), Cow::Borrowed(value)))
                            .collect()
                    }
                    Value::Null => Vec::new(),
                    _ => {
                        return Err(ResolveError::structural(
                            path,
                            format!("`{}` expects a mapping of its fields or a list of arguments", alias.name),
                        ));
                    }
                };
                self.resolve_keyword(alias.kind, alias.preset, pairs, ctx, path)
            }
        }
    }

    /// Resolve keyword arguments for `kind`, accepting field aliases.
    fn resolve_keyword(
        &self,
        kind: ExprKind,
        preset: Option<(&'static str, &'static str)>,
        pairs: Pairs<'_>,
        ctx: Context<'_>,
        path: &Path,
    ) -> ResolveResult<Node> {
        let spec = kind.spec();
        let mut supplied: BTreeMap<&'static str, (String, Cow<'_, Value>)> = BTreeMap::new();
        let mut unknown = Vec::new();
        let mut supply = |field: &'static str, key: String, value| -> ResolveResult<()> {
            if supplied.contains_key(field) {
                return Err(ResolveError::structural(
                    path,
                    format!("{} field `{}` given more than once", kind, field),
                ));
            }
            supplied.insert(field, (key, value));
            Ok(())
        };

        for (key, value) in pairs {
            if kind == ExprKind::ParseWithFormatString
                && let Some(ty) = catalogue::format_key_type(&key)
            {
                supply("output_type", key.clone(), Cow::Owned(Value::String(ty.to_string())))?;
                supply("format", key, value)?;
                continue;
            }
            match spec.field(&key) {
                Some(field) => supply(field.name, key, value)?,
                None => unknown.push(key),
            }
        }
        if !unknown.is_empty() {
            let expected: Vec<&str> = spec.fields().iter().map(|f| f.name).collect();
            return Err(ResolveError::structural(
                path,
                format!(
                    "unknown field(s) {} for {}; expected {}",
                    unknown.join(", "),
                    kind,
                    expected.join(", ")
                ),
            ));
        }
        if let Some((field, value)) = preset {
            let conflicting = supplied.get(field).is_some_and(|(_, given)| {
                !matches!(given.as_ref(), Value::String(given) if given.eq_ignore_ascii_case(value))
            });
            if conflicting {
                return Err(ResolveError::structural(
                    path,
                    format!("this alias fixes `{}` to {}", field, value),
                ));
            }
            supplied
                .entry(field)
                .or_insert_with(|| (field.to_string(), Cow::Owned(Value::String(value.to_string()))));
        }

        let mut args = BTreeMap::new();
        for field in spec.fields() {
            let Some((key, value)) = supplied.remove(field.name) else {
                continue;
            };
            let field_path = path.key(key);
            let node = match self.resolve_value(&value, ctx.with_field(field.context), &field_path)? {
                Resolved::Node(node) => node,
                Resolved::Sequence(nodes) => collapse_literals(nodes, kind, field.name, &field_path)?,
            };
            args.insert(field.name.to_string(), node);
        }
        build_expression(kind, Arguments::Keyword(args), path)
    }

    /// `{expression: {type: KIND, arguments: ...}}` whose arguments are still simplified.
    fn resolve_loose_expression(&self, inner: &Map<String, Value>, ctx: Context<'_>, path: &Path) -> ResolveResult<Node> {
        let Some(Value::String(name)) = inner.get("type") else {
            return Err(ResolveError::structural(path, "expression is missing its `type`"));
        };
        let kind = ExprKind::from_name(name).ok_or_else(|| {
            ResolveError::structural(path, format!("unknown expression type `{}`", name))
        })?;
        if let Some(extra) = inner.keys().find(|key| !matches!(key.as_str(), "type" | "arguments")) {
            return Err(ResolveError::structural(
                path,
                format!("unexpected key `{}` in expression", extra),
            ));
        }
        let alias = Alias {
            name: kind.name(),
            kind,
            preset: None,
        };
        let payload = inner.get("arguments").unwrap_or(&Value::Null);
        self.resolve_shorthand(alias, payload, ctx, &path.key("arguments"))
    }

    /// `{<input>: {<type>_format: pattern}}`
    fn resolve_compressed_parse(
        &self,
        input: &str,
        payload: &Value,
        ctx: Context<'_>,
        path: &Path,
    ) -> ResolveResult<Option<Node>> {
        let Value::Object(inner) = payload else {
            return Ok(None);
        };
        let Some((format_key, pattern)) = inner.iter().next() else {
            return Ok(None);
        };
        let Some(ty) = catalogue::format_key_type(format_key).filter(|_| inner.len() == 1) else {
            return Ok(None);
        };
        debug!(path = %path, input, "compressed parse form");

        // The key names a column outright; it is never parsed as an expression
        let path = path.key(input);
        let format = self.resolve_node(pattern, ctx.with_field(FieldContext::LITERAL), &path.key(format_key))?;
        let mut args = BTreeMap::new();
        args.insert("input".to_string(), ctx.column_node(input));
        args.insert("format".to_string(), format);
        args.insert("output_type".to_string(), Node::literal(ty.to_ascii_lowercase()));
        build_expression(ExprKind::ParseWithFormatString, Arguments::Keyword(args), &path).map(Some)
    }

    fn resolve_interpolate_payload(&self, payload: &Value, ctx: Context<'_>, path: &Path) -> ResolveResult<Node> {
        match payload {
            Value::String(pattern) => match self.interpolate(pattern, None, ctx, path)? {
                Some(node) => Ok(node),
                None => build_expression(
                    ExprKind::StringInterpolate,
                    Arguments::Positional(vec![Node::literal(pattern.as_str())]),
                    path,
                ),
            },
            Value::Object(map) => self.resolve_interpolate_map(map, ctx, path),
            Value::Array(items) => {
                let mut args = Vec::with_capacity(items.len());
                for (idx, item) in items.iter().enumerate() {
                    let item_ctx = if idx == 0 {
                        ctx.with_field(FieldContext::LITERAL)
                    } else {
                        ctx.descend()
                    };
                    args.push(self.resolve_node(item, item_ctx, &path.index(idx))?);
                }
                build_expression(ExprKind::StringInterpolate, Arguments::Positional(args), path)
            }
            _ => Err(ResolveError::structural(
                path,
                "string interpolation expects a pattern, a {pattern, inputs} mapping or a list",
            )),
        }
    }

    /// `{pattern: "{a} and {b}", inputs: {a: .., b: ..}}` or `inputs: [..]` for `{}` slots.
    fn resolve_interpolate_map(&self, map: &Map<String, Value>, ctx: Context<'_>, path: &Path) -> ResolveResult<Node> {
        if let Some(extra) = map.keys().find(|key| !matches!(key.as_str(), "pattern" | "inputs")) {
            return Err(ResolveError::structural(
                path,
                format!("unexpected key `{}` in string interpolation", extra),
            ));
        }
        let Some(Value::String(pattern)) = map.get("pattern") else {
            return Err(ResolveError::structural(
                &path.key("pattern"),
                "interpolation pattern must be a string",
            ));
        };
        let inputs_path = path.key("inputs");
        match map.get("inputs") {
            Some(Value::Array(items)) => {
                let mut args = vec![Node::literal(pattern.as_str())];
                for (idx, item) in items.iter().enumerate() {
                    args.push(self.resolve_node(item, ctx.descend(), &inputs_path.index(idx))?);
                }
                build_expression(ExprKind::StringInterpolate, Arguments::Positional(args), path)
            }
            Some(Value::Object(inputs)) => self
                .interpolate(pattern, Some(inputs), ctx, &inputs_path)?
                .map_or_else(
                    || {
                        build_expression(
                            ExprKind::StringInterpolate,
                            Arguments::Positional(vec![Node::literal(pattern.as_str())]),
                            path,
                        )
                    },
                    Ok,
                ),
            None => self.resolve_interpolate_payload(&Value::String(pattern.clone()), ctx, path),
            Some(_) => Err(ResolveError::structural(
                &inputs_path,
                "interpolation inputs must be a list or a mapping",
            )),
        }
    }

    /// Rewrite `{name}` placeholders into `{}` slots with one input per slot.
    ///
    /// Returns `None` when the pattern has no named placeholders. Inputs not
    /// given explicitly are resolved from the placeholder name itself.
    fn interpolate(
        &self,
        pattern: &str,
        inputs: Option<&Map<String, Value>>,
        ctx: Context<'_>,
        path: &Path,
    ) -> ResolveResult<Option<Node>> {
        let mut template = String::with_capacity(pattern.len());
        let mut names = Vec::new();
        let mut last = 0;
        for captures in PLACEHOLDER_RE.captures_iter(pattern) {
            let Some(whole) = captures.get(0) else {
                continue;
            };
            template.push_str(&pattern[last..whole.start()]);
            match captures.get(1) {
                Some(name) => {
                    template.push_str("{}");
                    names.push(name.as_str().trim());
                }
                None => template.push_str(whole.as_str()),
            }
            last = whole.end();
        }
        template.push_str(&pattern[last..]);
        if names.is_empty() {
            return Ok(None);
        }

        let child = ctx.descend();
        let mut args = vec![Node::literal(template)];
        for name in names {
            let node = match inputs.and_then(|inputs| inputs.get(name)) {
                Some(value) => self.resolve_node(value, child, &path.key(name))?,
                None => self.resolve_string(name, child, &path.key(name))?,
            };
            args.push(node);
        }
        debug!(path = %path, inputs = args.len() - 1, "string interpolation");
        build_expression(ExprKind::StringInterpolate, Arguments::Positional(args), path).map(Some)
    }
}

/// A two-key `{if|when: P, then: A}` link.
fn chain_link(value: &Value) -> Option<(&str, &Value, &Value)> {
    let map = value.as_object()?;
    if map.len() != 2 {
        return None;
    }
    let (key, condition) = map
        .iter()
        .find(|(key, _)| matches!(key.as_str(), "if" | "when"))?;
    let then = map.get("then")?;
    Some((key.as_str(), condition, then))
}

/// Collapse an all-literal sequence into one list Literal.
fn collapse_literals(nodes: Vec<Node>, kind: ExprKind, field: &str, path: &Path) -> ResolveResult<Node> {
    let mut values = Vec::with_capacity(nodes.len());
    for node in nodes {
        match node {
            Node::Literal(lit) => values.push(Value::from(lit)),
            other => {
                return Err(ResolveError::validation(
                    path,
                    kind,
                    field,
                    format!("expected literal values, found {}", other),
                ));
            }
        }
    }
    Ok(Node::literal(Value::Array(values)))
}

/// Validate every expression inside an already-resolved tree.
fn check_resolved(node: &Node, path: &Path) -> ResolveResult<()> {
    let mut result = Ok(());
    node.walk(&mut |child| {
        if result.is_ok()
            && let Node::Expression(expr) = child
        {
            result = validation::validate(expr, path);
        }
    });
    result
}

/// Every entry's outcome, keyed by entry name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    pub entries: BTreeMap<String, Node>,
    pub failures: BTreeMap<String, ResolveError>,
}

impl Resolution {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Resolve a simplified-form mapping of output names to values.
///
/// Under [`FailureMode::FailFast`] the first failing entry aborts the whole
/// mapping; under [`FailureMode::Isolate`] each failure is collected in
/// [`Resolution::failures`] and the remaining entries still resolve.
#[tracing::instrument(level = "info", skip_all)]
pub fn resolve_mapping(
    input: &Value,
    schema: Option<&Schema>,
    options: &ResolveOptions,
) -> ResolveResult<Resolution> {
    let Value::Object(map) = input else {
        return Err(ResolveError::structural(
            &Path::root(),
            format!(
                "expected a mapping of output names to values, got {}",
                crate::value::LiteralType::of(input)
            ),
        ));
    };

    let resolver = Resolver::new();
    let mut resolution = Resolution::default();
    for (name, value) in map {
        match resolver.resolve_entry(name, value, schema, options) {
            Ok(node) => {
                resolution.entries.insert(name.clone(), node);
            }
            Err(error) => match options.failure_mode {
                FailureMode::FailFast => return Err(error),
                FailureMode::Isolate => {
                    warn!(entry = %name, %error, "entry failed to resolve");
                    resolution.failures.insert(name.clone(), error);
                }
            },
        }
    }
    info!(
        resolved = resolution.entries.len(),
        failed = resolution.failures.len(),
        "mapping resolved"
    );
    Ok(resolution)
}
