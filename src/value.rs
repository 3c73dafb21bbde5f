use std::fmt;

use serde_json::{Number, Value};

/// The type of a [`Literal`](crate::node::Literal), inferred once from its value.
///
/// JSON only has one number type; dftly keeps integers and floats apart:
/// - `1234` → [`LiteralType::Int`]
/// - `12.34` → [`LiteralType::Float`]
/// - `"1234"` → [`LiteralType::String`] (no coercion)
///
/// # Examples
///
/// ```
/// use dftly::value::LiteralType;
/// use serde_json::json;
///
/// assert_eq!(LiteralType::of(&json!(1234)), LiteralType::Int);
/// assert_eq!(LiteralType::of(&json!(12.34)), LiteralType::Float);
/// assert_eq!(LiteralType::of(&json!([1, 2])), LiteralType::List);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LiteralType {
    Null,
    Bool,
    Int,
    Float,
    String,
    List,
    Map,
}

impl LiteralType {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => LiteralType::Null,
            Value::Bool(_) => LiteralType::Bool,
            Value::Number(n) if n.is_f64() => LiteralType::Float,
            Value::Number(_) => LiteralType::Int,
            Value::String(_) => LiteralType::String,
            Value::Array(_) => LiteralType::List,
            Value::Object(_) => LiteralType::Map,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            LiteralType::Null => "null",
            LiteralType::Bool => "bool",
            LiteralType::Int => "int",
            LiteralType::Float => "float",
            LiteralType::String => "string",
            LiteralType::List => "list",
            LiteralType::Map => "map",
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, LiteralType::Int | LiteralType::Float)
    }
}

impl fmt::Display for LiteralType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Build a JSON number from a float, rejecting NaN and infinities.
pub fn float(n: f64) -> Option<Value> {
    Number::from_f64(n).map(Value::Number)
}

/// Get as integer (floats are not truncated)
pub fn as_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        _ => None,
    }
}

/// Render a value the way it reads in an expression, strings unquoted.
pub fn display_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
