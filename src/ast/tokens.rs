use std::fmt;

use crate::ast::TimeOfDay;

/// A lexical token produced by the [`Lexer`](crate::lexer::Lexer).
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    /// Integer literal, written without leading zeros
    ///
    /// # Examples
    /// ```text
    /// 0
    /// 42
    /// ```
    Integer(i64),

    /// Floating-point literal
    ///
    /// # Examples
    /// ```text
    /// 3.14
    /// 1e-3
    /// ```
    Float(f64),

    /// String literal in single or double quotes, escapes already applied
    String(String),

    /// `true` / `false`, case-insensitive
    Boolean(bool),

    /// `null`, case-insensitive
    Null,

    /// Time-of-day literal
    ///
    /// # Examples
    /// ```text
    /// 11:59
    /// 11:59:59 p.m.
    /// 07:30:00.250 am
    /// ```
    Time(TimeOfDay),

    // Names
    /// Bare name; becomes a column or a string literal during lowering
    Identifier(String),

    /// Explicit column reference
    ///
    /// # Examples
    /// ```text
    /// @col1
    /// @"admission time"
    /// ```
    ColumnRef(String),

    /// Regular expression body, only produced in regex mode
    ///
    /// # Examples
    /// ```text
    /// /(\d+)\/(\d+)/
    /// (\d+ mg)
    /// "\d+"
    /// ```
    Regex(String),

    // Keywords
    /// `and` or `&&`
    And,
    /// `or` or `||`
    Or,
    /// `not` or `!`
    Not,
    /// `in`
    In,
    /// `as`
    As,
    /// `if`
    If,
    /// `else`
    Else,
    /// `extract`
    Extract,
    /// `group`, only recognised in `extract group N of`
    Group,
    /// `of`
    Of,
    /// `from`
    From,
    /// `match`
    Match,
    /// `not match`, lexed as a single token
    NotMatch,
    /// `against`
    Against,

    // Comparison
    /// `==`
    EqEq,
    /// `!=`
    NotEq,
    /// `<`
    Lt,
    /// `<=`
    LtEq,
    /// `>`
    Gt,
    /// `>=`
    GtEq,

    // Arithmetic
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// `@` between two operands: resolve a timestamp
    At,

    // Delimiters
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `,`
    Comma,

    /// End of input
    Eof,
}

/// Payload-free discriminant of a [`Token`].
///
/// Used to report which tokens a parser would have accepted at a failure point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TokenKind {
    Integer,
    Float,
    String,
    Boolean,
    Null,
    Time,
    Identifier,
    ColumnRef,
    Regex,
    And,
    Or,
    Not,
    In,
    As,
    If,
    Else,
    Extract,
    Group,
    Of,
    From,
    Match,
    NotMatch,
    Against,
    EqEq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Plus,
    Minus,
    Star,
    Slash,
    At,
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Eof,
}

impl Token {
    pub fn kind(&self) -> TokenKind {
        match self {
            Token::Integer(_) => TokenKind::Integer,
            Token::Float(_) => TokenKind::Float,
            Token::String(_) => TokenKind::String,
            Token::Boolean(_) => TokenKind::Boolean,
            Token::Null => TokenKind::Null,
            Token::Time(_) => TokenKind::Time,
            Token::Identifier(_) => TokenKind::Identifier,
            Token::ColumnRef(_) => TokenKind::ColumnRef,
            Token::Regex(_) => TokenKind::Regex,
            Token::And => TokenKind::And,
            Token::Or => TokenKind::Or,
            Token::Not => TokenKind::Not,
            Token::In => TokenKind::In,
            Token::As => TokenKind::As,
            Token::If => TokenKind::If,
            Token::Else => TokenKind::Else,
            Token::Extract => TokenKind::Extract,
            Token::Group => TokenKind::Group,
            Token::Of => TokenKind::Of,
            Token::From => TokenKind::From,
            Token::Match => TokenKind::Match,
            Token::NotMatch => TokenKind::NotMatch,
            Token::Against => TokenKind::Against,
            Token::EqEq => TokenKind::EqEq,
            Token::NotEq => TokenKind::NotEq,
            Token::Lt => TokenKind::Lt,
            Token::LtEq => TokenKind::LtEq,
            Token::Gt => TokenKind::Gt,
            Token::GtEq => TokenKind::GtEq,
            Token::Plus => TokenKind::Plus,
            Token::Minus => TokenKind::Minus,
            Token::Star => TokenKind::Star,
            Token::Slash => TokenKind::Slash,
            Token::At => TokenKind::At,
            Token::LParen => TokenKind::LParen,
            Token::RParen => TokenKind::RParen,
            Token::LBracket => TokenKind::LBracket,
            Token::RBracket => TokenKind::RBracket,
            Token::LBrace => TokenKind::LBrace,
            Token::RBrace => TokenKind::RBrace,
            Token::Comma => TokenKind::Comma,
            Token::Eof => TokenKind::Eof,
        }
    }

    /// The source spelling of a keyword token, if this token is one.
    ///
    /// Keywords found where only a name is allowed are read back as identifiers.
    pub fn keyword_text(&self) -> Option<&'static str> {
        let text = match self {
            Token::And => "and",
            Token::Or => "or",
            Token::In => "in",
            Token::As => "as",
            Token::If => "if",
            Token::Else => "else",
            Token::Group => "group",
            Token::Of => "of",
            Token::From => "from",
            Token::Against => "against",
            _ => return None,
        };
        Some(text)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TokenKind::Integer => "integer",
            TokenKind::Float => "float",
            TokenKind::String => "string",
            TokenKind::Boolean => "boolean",
            TokenKind::Null => "null",
            TokenKind::Time => "time literal",
            TokenKind::Identifier => "name",
            TokenKind::ColumnRef => "column reference",
            TokenKind::Regex => "regular expression",
            TokenKind::And => "`and`",
            TokenKind::Or => "`or`",
            TokenKind::Not => "`not`",
            TokenKind::In => "`in`",
            TokenKind::As => "`as`",
            TokenKind::If => "`if`",
            TokenKind::Else => "`else`",
            TokenKind::Extract => "`extract`",
            TokenKind::Group => "`group`",
            TokenKind::Of => "`of`",
            TokenKind::From => "`from`",
            TokenKind::Match => "`match`",
            TokenKind::NotMatch => "`not match`",
            TokenKind::Against => "`against`",
            TokenKind::EqEq => "`==`",
            TokenKind::NotEq => "`!=`",
            TokenKind::Lt => "`<`",
            TokenKind::LtEq => "`<=`",
            TokenKind::Gt => "`>`",
            TokenKind::GtEq => "`>=`",
            TokenKind::Plus => "`+`",
            TokenKind::Minus => "`-`",
            TokenKind::Star => "`*`",
            TokenKind::Slash => "`/`",
            TokenKind::At => "`@`",
            TokenKind::LParen => "`(`",
            TokenKind::RParen => "`)`",
            TokenKind::LBracket => "`[`",
            TokenKind::RBracket => "`]`",
            TokenKind::LBrace => "`{`",
            TokenKind::RBrace => "`}`",
            TokenKind::Comma => "`,`",
            TokenKind::Eof => "end of input",
        };
        f.write_str(text)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Integer(n) => write!(f, "integer {}", n),
            Token::Float(n) => write!(f, "float {}", n),
            Token::String(s) => write!(f, "string {:?}", s),
            Token::Boolean(b) => write!(f, "boolean {}", b),
            Token::Time(t) => write!(f, "time {}", t),
            Token::Identifier(name) => write!(f, "name `{}`", name),
            Token::ColumnRef(name) => write!(f, "column reference `@{}`", name),
            Token::Regex(body) => write!(f, "regular expression `{}`", body),
            other => write!(f, "{}", other.kind()),
        }
    }
}
