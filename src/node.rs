//! Canonical resolved form.
//!
//! Every resolved value is one of three templates:
//!
//! ```text
//! {literal: <value>}
//! {column: {name: <string>, type: <string|null>}}
//! {expression: {type: <KIND>, arguments: [<node>...] | {<name>: <node>...}}}
//! ```
//!
//! The serde representation of [`Node`] is exactly these templates, so a
//! resolved tree round-trips through JSON or YAML unchanged.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::catalogue::ExprKind;
use crate::value::{self, LiteralType};

/// A resolved value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Node {
    Literal(Literal),
    Column(Column),
    Expression(Expression),
}

impl Node {
    pub fn literal(value: impl Into<Value>) -> Self {
        Node::Literal(Literal::new(value.into()))
    }

    pub fn null() -> Self {
        Node::Literal(Literal::new(Value::Null))
    }

    pub fn column(name: impl Into<String>, ty: Option<String>) -> Self {
        Node::Column(Column {
            name: name.into(),
            ty,
        })
    }

    pub fn expression(kind: ExprKind, arguments: Arguments) -> Self {
        Node::Expression(Expression { kind, arguments })
    }

    /// Recognise a value already in canonical form.
    ///
    /// Only single-key maps keyed `literal`, `column` or `expression` whose
    /// payload fits the template qualify; everything else is simplified form.
    pub fn from_resolved(value: &Value) -> Option<Node> {
        let map = value.as_object()?;
        if map.len() != 1 {
            return None;
        }
        let key = map.keys().next()?;
        if !matches!(key.as_str(), "literal" | "column" | "expression") {
            return None;
        }
        Node::deserialize(value).ok()
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Node::Literal(lit) => Some(lit),
            _ => None,
        }
    }

    pub fn as_column(&self) -> Option<&Column> {
        match self {
            Node::Column(col) => Some(col),
            _ => None,
        }
    }

    pub fn as_expression(&self) -> Option<&Expression> {
        match self {
            Node::Expression(expr) => Some(expr),
            _ => None,
        }
    }

    pub fn is_null_literal(&self) -> bool {
        matches!(self, Node::Literal(lit) if lit.value.is_null())
    }

    /// Visit this node and every node beneath it, depth first.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Node)) {
        visit(self);
        if let Node::Expression(expr) = self {
            for child in expr.arguments.nodes() {
                child.walk(visit);
            }
        }
    }

    /// Serialize to the canonical JSON template.
    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Literal(lit) => write!(f, "{}", lit.value),
            Node::Column(col) => write!(f, "@{}", col.name),
            Node::Expression(expr) => write!(f, "{}", expr),
        }
    }
}

/// A typed constant. The type never changes after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub struct Literal {
    value: Value,
    ty: LiteralType,
}

impl Literal {
    pub fn new(value: Value) -> Self {
        let ty = LiteralType::of(&value);
        Literal { value, ty }
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn ty(&self) -> LiteralType {
        self.ty
    }

    pub fn as_str(&self) -> Option<&str> {
        self.value.as_str()
    }

    pub fn as_bool(&self) -> Option<bool> {
        self.value.as_bool()
    }

    pub fn as_int(&self) -> Option<i64> {
        value::as_int(&self.value)
    }
}

impl From<Value> for Literal {
    fn from(value: Value) -> Self {
        Literal::new(value)
    }
}

impl From<Literal> for Value {
    fn from(lit: Literal) -> Self {
        lit.value
    }
}

/// A reference to an input column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Column {
    pub name: String,
    /// Declared type, `None` when unknown.
    #[serde(rename = "type")]
    pub ty: Option<String>,
}

/// A catalogue operation applied to resolved arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Expression {
    #[serde(rename = "type")]
    pub kind: ExprKind,
    pub arguments: Arguments,
}

impl Expression {
    /// Keyword argument by name. Always `None` for positional kinds.
    pub fn arg(&self, name: &str) -> Option<&Node> {
        match &self.arguments {
            Arguments::Keyword(args) => args.get(name),
            Arguments::Positional(_) => None,
        }
    }

    /// Positional arguments. Always `None` for keyword kinds.
    pub fn positional(&self) -> Option<&[Node]> {
        match &self.arguments {
            Arguments::Positional(args) => Some(args),
            Arguments::Keyword(_) => None,
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.kind)?;
        match &self.arguments {
            Arguments::Positional(args) => {
                for (idx, arg) in args.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
            }
            Arguments::Keyword(args) => {
                for (idx, (name, arg)) in args.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}={}", name, arg)?;
                }
            }
        }
        f.write_str(")")
    }
}

/// Expression arguments, shaped by the kind's catalogue entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Arguments {
    Positional(Vec<Node>),
    Keyword(BTreeMap<String, Node>),
}

impl Arguments {
    pub fn len(&self) -> usize {
        match self {
            Arguments::Positional(args) => args.len(),
            Arguments::Keyword(args) => args.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn nodes(&self) -> Box<dyn Iterator<Item = &Node> + '_> {
        match self {
            Arguments::Positional(args) => Box::new(args.iter()),
            Arguments::Keyword(args) => Box::new(args.values()),
        }
    }
}
