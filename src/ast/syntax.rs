use std::fmt;

use crate::ast::{BinOp, RangeBounds, RegexAction};

/// Raw syntax tree produced by the [`Parser`](crate::parser::Parser).
///
/// Node kinds mirror the grammar productions one-to-one. The parser never
/// consults a schema, so bare names stay unresolved here; lowering decides
/// whether they are columns or string literals.
#[derive(Debug, Clone, PartialEq)]
pub enum Syntax {
    // Literals
    /// Integer literal
    ///
    /// # Example
    /// ```text
    /// 42
    /// ```
    Integer(i64),

    /// Floating point literal
    Float(f64),

    /// Quoted string literal
    ///
    /// # Example
    /// ```text
    /// "hello"
    /// 'hello'
    /// ```
    String(String),

    /// Boolean literal
    Boolean(bool),

    /// Null literal
    Null,

    /// Time-of-day literal
    ///
    /// # Example
    /// ```text
    /// 11:59:59 p.m.
    /// ```
    Time(TimeOfDay),

    // References
    /// Bare name (`foo`), a column if the schema declares it
    Name(String),

    /// Explicit column reference (`@foo`)
    ColumnRef(String),

    // Operations
    /// Binary operation (arithmetic, comparison, logical, timestamp resolution)
    BinaryOp {
        op: BinOp,
        left: Box<Syntax>,
        right: Box<Syntax>,
    },

    /// Logical negation (`not x`, `!x`)
    Not(Box<Syntax>),

    /// Arithmetic negation (`-x`)
    Negate(Box<Syntax>),

    /// Function call
    ///
    /// # Example
    /// ```text
    /// coalesce(@a, @b, 0)
    /// ```
    Call { name: String, args: Vec<Syntax> },

    /// Cast to a type or parse with a format string
    ///
    /// # Examples
    /// ```text
    /// @x as float
    /// @ts as "%Y-%m-%d %H:%M"
    /// ```
    Cast {
        input: Box<Syntax>,
        target: CastTarget,
    },

    /// `then if condition else otherwise`
    Conditional {
        then: Box<Syntax>,
        condition: Box<Syntax>,
        otherwise: Box<Syntax>,
    },

    /// `value in {a, b, c}`
    InSet {
        value: Box<Syntax>,
        items: Vec<Syntax>,
    },

    /// `value in [min, max)` and the other bound combinations
    InRange {
        value: Box<Syntax>,
        min: Box<Syntax>,
        max: Box<Syntax>,
        bounds: RangeBounds,
    },

    /// Standalone set literal `{a, b, c}`
    Set(Vec<Syntax>),

    /// Regular expression clause
    ///
    /// # Examples
    /// ```text
    /// extract group 1 of /(\d+)\/(\d+)/ from @bp
    /// match foo against @name
    /// not match "^\s*$" against @name
    /// ```
    Regex {
        action: RegexAction,
        pattern: String,
        group: Option<i64>,
        input: Box<Syntax>,
    },

    /// Parenthesized group `(expr)`
    Group(Box<Syntax>),
}

/// Right-hand side of an `as` cast.
#[derive(Debug, Clone, PartialEq)]
pub enum CastTarget {
    /// Bare type name: `as int`
    Type(String),
    /// Quoted format string: `as "%Y-%m-%d"`
    Format(String),
}

/// A wall-clock time with microsecond resolution, already normalised to 24 hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeOfDay {
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    pub microsecond: u32,
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hour, self.minute, self.second)?;
        if self.microsecond > 0 {
            write!(f, ".{:06}", self.microsecond)?;
        }
        Ok(())
    }
}
