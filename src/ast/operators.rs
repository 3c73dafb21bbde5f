use std::fmt;

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    // Comparison
    /// Equal (`==`)
    Equal,
    /// Not equal (`!=`)
    NotEqual,
    /// Less than (`<`)
    LessThan,
    /// Greater than (`>`)
    GreaterThan,
    /// Less than or equal (`<=`)
    LessEqual,
    /// Greater than or equal (`>=`)
    GreaterEqual,

    // Arithmetic
    /// Addition (`+`)
    Add,
    /// Subtraction (`-`)
    Subtract,
    /// Multiplication (`*`)
    Multiply,
    /// Division (`/`)
    Divide,
    /// Timestamp resolution (`@`)
    ///
    /// Resolves a lower-resolution temporal value (a date) against a
    /// higher-resolution component (a time of day or a duration).
    ResolveTimestamp,

    // Logical
    /// Logical AND (`and`, `&&`)
    And,
    /// Logical OR (`or`, `||`)
    Or,
}

impl BinOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Equal => "==",
            BinOp::NotEqual => "!=",
            BinOp::LessThan => "<",
            BinOp::GreaterThan => ">",
            BinOp::LessEqual => "<=",
            BinOp::GreaterEqual => ">=",
            BinOp::Add => "+",
            BinOp::Subtract => "-",
            BinOp::Multiply => "*",
            BinOp::Divide => "/",
            BinOp::ResolveTimestamp => "@",
            BinOp::And => "and",
            BinOp::Or => "or",
        }
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Which ends of a range literal are closed.
///
/// `[a, b]` closes both ends, `(a, b)` opens both, and the mixed forms
/// `[a, b)` and `(a, b]` are distinct operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeBounds {
    pub min_inclusive: bool,
    pub max_inclusive: bool,
}

/// What a regular expression clause does with its pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegexAction {
    /// `extract [group N of] R from E`
    Extract,
    /// `match R against E`
    Match,
    /// `not match R against E`
    NotMatch,
}

impl RegexAction {
    pub fn as_str(self) -> &'static str {
        match self {
            RegexAction::Extract => "EXTRACT",
            RegexAction::Match => "MATCH",
            RegexAction::NotMatch => "NOT_MATCH",
        }
    }

    /// Parses an action name, ignoring case.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "EXTRACT" => Some(RegexAction::Extract),
            "MATCH" => Some(RegexAction::Match),
            "NOT_MATCH" => Some(RegexAction::NotMatch),
            _ => None,
        }
    }
}

impl fmt::Display for RegexAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
