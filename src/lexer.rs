//! Maximal-munch lexer with an explicit priority table.
//!
//! At every position each rule of the active table is tried. The longest match
//! wins; when two rules match the same span the higher priority wins. That is
//! how `not match` beats `not`, keywords beat identifiers, `@name` beats `@`
//! and `11:59` beats `11`.
//!
//! The parser switches the lexer into regex mode right after `extract`, `of`,
//! `match` and `not match`, where a different table recognises regex bodies.

use std::{fmt, sync::LazyLock};

use regex::Regex;

use crate::ast::{TimeOfDay, Token, TokenKind};

/// Location of a token in the source string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    /// Byte offset into the input
    pub offset: usize,
    /// 1-based character column
    pub column: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "column {}", self.column)
    }
}

/// An unrecognised or malformed lexeme.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message} at {position}")]
pub struct LexError {
    pub position: Position,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lexeme {
    Token(TokenKind),
    QuotedRegex,
    SlashRegex,
    ParenRegex,
    BareRegex,
}

enum Matcher {
    Pattern(Regex),
    BalancedParens,
}

struct Rule {
    lexeme: Lexeme,
    priority: u8,
    matcher: Matcher,
}

impl Rule {
    fn pattern(lexeme: Lexeme, priority: u8, pattern: &str) -> Self {
        Rule {
            lexeme,
            priority,
            matcher: Matcher::Pattern(Regex::new(pattern).expect("token pattern must compile")),
        }
    }

    fn token(kind: TokenKind, priority: u8, pattern: &str) -> Self {
        Rule::pattern(Lexeme::Token(kind), priority, pattern)
    }

    fn match_len(&self, rest: &str) -> Option<usize> {
        match &self.matcher {
            Matcher::Pattern(re) => re.find(rest).map(|m| m.end()).filter(|len| *len > 0),
            Matcher::BalancedParens => balanced_parens_len(rest),
        }
    }
}

const TIME_PATTERN: &str = r"^(\d{1,2}):(\d{2})(?::(\d{2})(?:\.(\d{1,6}))?)?(?:\s*(?i:([ap])(?:m\b|\.m\.)))?";
const QUOTED_DOUBLE: &str = r#"^"(?:[^"\\]|\\.)*""#;
const QUOTED_SINGLE: &str = r"^'(?:[^'\\]|\\.)*'";

static TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(TIME_PATTERN).expect("time pattern must compile"));

static GROUP_CLAUSE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^group\s+\d+\s+of\b").expect("group pattern must compile"));

static EXPRESSION_RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    use TokenKind as K;
    vec![
        // compound keyword
        Rule::token(K::NotMatch, 3, r"(?i)^not\s+match\b"),
        // keywords
        Rule::token(K::And, 2, r"(?i)^and\b"),
        Rule::token(K::Or, 2, r"(?i)^or\b"),
        Rule::token(K::Not, 2, r"(?i)^not\b"),
        Rule::token(K::In, 2, r"(?i)^in\b"),
        Rule::token(K::As, 2, r"(?i)^as\b"),
        Rule::token(K::If, 2, r"(?i)^if\b"),
        Rule::token(K::Else, 2, r"(?i)^else\b"),
        Rule::token(K::Extract, 2, r"(?i)^extract\b"),
        Rule::token(K::Group, 2, r"(?i)^group\b"),
        Rule::token(K::Of, 2, r"(?i)^of\b"),
        Rule::token(K::From, 2, r"(?i)^from\b"),
        Rule::token(K::Match, 2, r"(?i)^match\b"),
        Rule::token(K::Against, 2, r"(?i)^against\b"),
        Rule::token(K::Boolean, 2, r"(?i)^(?:true|false)\b"),
        Rule::token(K::Null, 2, r"(?i)^null\b"),
        // literals
        Rule::token(K::Time, 2, TIME_PATTERN),
        Rule::token(K::Float, 1, r"^(?:\d+\.\d+(?:[eE][+-]?\d+)?|\d+[eE][+-]?\d+)"),
        Rule::token(K::Integer, 1, r"^(?:0|[1-9]\d*)"),
        Rule::token(K::String, 1, QUOTED_DOUBLE),
        Rule::token(K::String, 1, QUOTED_SINGLE),
        // names
        Rule::token(
            K::ColumnRef,
            1,
            r#"^@(?:[A-Za-z_][A-Za-z0-9_]*|"(?:[^"\\]|\\.)*"|'(?:[^'\\]|\\.)*')"#,
        ),
        Rule::token(K::Identifier, 1, r"^[A-Za-z_][A-Za-z0-9_]*"),
        // symbols
        Rule::token(K::Or, 1, r"^\|\|"),
        Rule::token(K::And, 1, r"^&&"),
        Rule::token(K::EqEq, 1, r"^=="),
        Rule::token(K::NotEq, 1, r"^!="),
        Rule::token(K::LtEq, 1, r"^<="),
        Rule::token(K::GtEq, 1, r"^>="),
        Rule::token(K::Lt, 1, r"^<"),
        Rule::token(K::Gt, 1, r"^>"),
        Rule::token(K::Not, 1, r"^!"),
        Rule::token(K::Plus, 1, r"^\+"),
        Rule::token(K::Minus, 1, r"^-"),
        Rule::token(K::Star, 1, r"^\*"),
        Rule::token(K::Slash, 1, r"^/"),
        Rule::token(K::At, 1, r"^@"),
        Rule::token(K::LParen, 1, r"^\("),
        Rule::token(K::RParen, 1, r"^\)"),
        Rule::token(K::LBracket, 1, r"^\["),
        Rule::token(K::RBracket, 1, r"^\]"),
        Rule::token(K::LBrace, 1, r"^\{"),
        Rule::token(K::RBrace, 1, r"^\}"),
        Rule::token(K::Comma, 1, r"^,"),
    ]
});

static REGEX_RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    vec![
        Rule::pattern(Lexeme::QuotedRegex, 3, QUOTED_DOUBLE),
        Rule::pattern(Lexeme::QuotedRegex, 3, QUOTED_SINGLE),
        Rule::pattern(Lexeme::SlashRegex, 2, r"^/(?:[^/\\]|\\.)*/"),
        Rule {
            lexeme: Lexeme::ParenRegex,
            priority: 2,
            matcher: Matcher::BalancedParens,
        },
        Rule::pattern(Lexeme::BareRegex, 1, r"^\S+"),
    ]
});

/// Length of a parenthesized run starting at `(` and ending at its matching `)`.
fn balanced_parens_len(rest: &str) -> Option<usize> {
    if !rest.starts_with('(') {
        return None;
    }
    let mut depth = 0usize;
    let mut escaped = false;
    for (idx, ch) in rest.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' => escaped = true,
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(idx + 1);
                }
            }
            _ => {}
        }
    }
    None
}

pub struct Lexer<'a> {
    input: &'a str,
    position: usize,
    token_start: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer {
            input,
            position: 0,
            token_start: 0,
        }
    }

    /// Position of the first character of the most recently returned token.
    pub fn token_start(&self) -> Position {
        self.position_at(self.token_start)
    }

    fn position_at(&self, offset: usize) -> Position {
        Position {
            offset,
            column: self.input[..offset].chars().count() + 1,
        }
    }

    fn error(&self, offset: usize, message: impl Into<String>) -> LexError {
        LexError {
            position: self.position_at(offset),
            message: message.into(),
        }
    }

    fn skip_whitespace(&mut self) {
        let rest = &self.input[self.position..];
        let trimmed = rest.trim_start();
        self.position += rest.len() - trimmed.len();
    }

    /// Picks the longest match in `rules`, breaking ties by priority.
    fn longest_match(&self, rules: &[Rule]) -> Option<(Lexeme, usize)> {
        let rest = &self.input[self.position..];
        let mut best: Option<(Lexeme, usize, u8)> = None;
        for rule in rules {
            let Some(len) = rule.match_len(rest) else {
                continue;
            };
            let better = match best {
                None => true,
                Some((_, best_len, best_priority)) => {
                    len > best_len || (len == best_len && rule.priority > best_priority)
                }
            };
            if better {
                best = Some((rule.lexeme, len, rule.priority));
            }
        }
        best.map(|(lexeme, len, _)| (lexeme, len))
    }

    /// Returns the next token of an expression.
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_whitespace();
        self.token_start = self.position;

        if self.position >= self.input.len() {
            return Ok(Token::Eof);
        }

        let Some((lexeme, len)) = self.longest_match(&EXPRESSION_RULES) else {
            return Err(self.unrecognised());
        };

        let start = self.position;
        let text = &self.input[start..start + len];
        self.position += len;

        match lexeme {
            Lexeme::Token(kind) => self.build_token(kind, text, start),
            _ => unreachable!("regex lexemes only exist in regex mode"),
        }
    }

    /// Returns the next regular-expression body.
    ///
    /// With `allow_group`, a leading `group N of` clause is recognised and the
    /// `group` keyword is returned instead; the parser then reads `N` and `of`
    /// as ordinary tokens and asks for the regex again.
    pub fn next_regex(&mut self, allow_group: bool) -> Result<Token, LexError> {
        self.skip_whitespace();
        self.token_start = self.position;

        if self.position >= self.input.len() {
            return Ok(Token::Eof);
        }

        let rest = &self.input[self.position..];
        if allow_group && GROUP_CLAUSE_RE.is_match(rest) {
            self.position += "group".len();
            return Ok(Token::Group);
        }

        let Some((lexeme, len)) = self.longest_match(&REGEX_RULES) else {
            return Err(self.unrecognised());
        };

        let text = &rest[..len];
        self.position += len;

        let body = match lexeme {
            Lexeme::QuotedRegex => {
                let quote = text.chars().next().unwrap_or('"');
                unescape_quote_only(&text[1..text.len() - 1], quote)
            }
            Lexeme::SlashRegex => text[1..text.len() - 1].to_string(),
            Lexeme::ParenRegex | Lexeme::BareRegex => text.to_string(),
            Lexeme::Token(_) => unreachable!("token lexemes only exist in expression mode"),
        };
        Ok(Token::Regex(body))
    }

    fn unrecognised(&self) -> LexError {
        let ch = self.input[self.position..].chars().next().unwrap_or(' ');
        if ch == '"' || ch == '\'' {
            self.error(self.position, "unterminated string")
        } else {
            self.error(self.position, format!("unexpected character '{}'", ch))
        }
    }

    fn build_token(&self, kind: TokenKind, text: &str, start: usize) -> Result<Token, LexError> {
        use TokenKind as K;
        let token = match kind {
            K::Integer => Token::Integer(
                text.parse::<i64>()
                    .map_err(|_| self.error(start, format!("integer {} out of range", text)))?,
            ),
            K::Float => Token::Float(
                text.parse::<f64>()
                    .map_err(|_| self.error(start, format!("invalid float {}", text)))?,
            ),
            K::String => Token::String(unescape(&text[1..text.len() - 1])),
            K::Boolean => Token::Boolean(text.eq_ignore_ascii_case("true")),
            K::Null => Token::Null,
            K::Time => Token::Time(self.parse_time(text, start)?),
            K::Identifier => Token::Identifier(text.to_string()),
            K::ColumnRef => {
                let name = &text[1..];
                if name.starts_with('"') || name.starts_with('\'') {
                    Token::ColumnRef(unescape(&name[1..name.len() - 1]))
                } else {
                    Token::ColumnRef(name.to_string())
                }
            }
            K::And => Token::And,
            K::Or => Token::Or,
            K::Not => Token::Not,
            K::In => Token::In,
            K::As => Token::As,
            K::If => Token::If,
            K::Else => Token::Else,
            K::Extract => Token::Extract,
            K::Group => Token::Group,
            K::Of => Token::Of,
            K::From => Token::From,
            K::Match => Token::Match,
            K::NotMatch => Token::NotMatch,
            K::Against => Token::Against,
            K::EqEq => Token::EqEq,
            K::NotEq => Token::NotEq,
            K::Lt => Token::Lt,
            K::LtEq => Token::LtEq,
            K::Gt => Token::Gt,
            K::GtEq => Token::GtEq,
            K::Plus => Token::Plus,
            K::Minus => Token::Minus,
            K::Star => Token::Star,
            K::Slash => Token::Slash,
            K::At => Token::At,
            K::LParen => Token::LParen,
            K::RParen => Token::RParen,
            K::LBracket => Token::LBracket,
            K::RBracket => Token::RBracket,
            K::LBrace => Token::LBrace,
            K::RBrace => Token::RBrace,
            K::Comma => Token::Comma,
            K::Regex | K::Eof => unreachable!("no expression rule produces {:?}", kind),
        };
        Ok(token)
    }

    fn parse_time(&self, text: &str, start: usize) -> Result<TimeOfDay, LexError> {
        let caps = TIME_RE
            .captures(text)
            .ok_or_else(|| self.error(start, format!("invalid time {}", text)))?;
        let number = |idx: usize| -> u32 {
            caps.get(idx)
                .and_then(|m| m.as_str().parse::<u32>().ok())
                .unwrap_or(0)
        };

        let mut hour = number(1);
        let minute = number(2);
        let second = number(3);
        let microsecond = caps
            .get(4)
            .map(|m| {
                let digits = format!("{:0<6}", m.as_str());
                digits.parse::<u32>().unwrap_or(0)
            })
            .unwrap_or(0);

        match caps.get(5).map(|m| m.as_str().to_ascii_lowercase()) {
            Some(meridiem) => {
                if !(1..=12).contains(&hour) {
                    return Err(self.error(start, format!("invalid 12-hour clock time {}", text)));
                }
                hour %= 12;
                if meridiem == "p" {
                    hour += 12;
                }
            }
            None if hour > 23 => {
                return Err(self.error(start, format!("invalid hour in time {}", text)));
            }
            None => {}
        }

        if minute > 59 || second > 59 {
            return Err(self.error(start, format!("invalid time {}", text)));
        }

        Ok(TimeOfDay {
            hour,
            minute,
            second,
            microsecond,
        })
    }
}

/// Tokenizes a whole expression in expression mode.
///
/// Regex bodies are context dependent and are only produced by the parser, so
/// this is mostly useful for inspecting how an expression is split.
pub fn tokenize(input: &str) -> Result<Vec<Token>, LexError> {
    let mut lexer = Lexer::new(input);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token()?;
        if token == Token::Eof {
            break;
        }
        tokens.push(token);
    }
    Ok(tokens)
}

/// Applies string escapes. Unknown escapes keep their backslash so that
/// regex-like content such as `\d` survives quoting.
fn unescape(body: &str) -> String {
    let mut result = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            result.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => result.push('\n'),
            Some('t') => result.push('\t'),
            Some('r') => result.push('\r'),
            Some('"') => result.push('"'),
            Some('\'') => result.push('\''),
            Some('\\') => result.push('\\'),
            Some(other) => {
                result.push('\\');
                result.push(other);
            }
            None => result.push('\\'),
        }
    }
    result
}

/// Only an escaped closing quote is rewritten inside a quoted regex body.
fn unescape_quote_only(body: &str, quote: char) -> String {
    let escaped = format!("\\{}", quote);
    body.replace(&escaped, &quote.to_string())
}

#[test]
fn test_keywords() {
    let mut lexer = Lexer::new("and OR Not in AS if else");
    assert_eq!(lexer.next_token().unwrap(), Token::And);
    assert_eq!(lexer.next_token().unwrap(), Token::Or);
    assert_eq!(lexer.next_token().unwrap(), Token::Not);
    assert_eq!(lexer.next_token().unwrap(), Token::In);
    assert_eq!(lexer.next_token().unwrap(), Token::As);
    assert_eq!(lexer.next_token().unwrap(), Token::If);
    assert_eq!(lexer.next_token().unwrap(), Token::Else);
    assert_eq!(lexer.next_token().unwrap(), Token::Eof);
}

#[test]
fn test_not_match_outranks_not() {
    let mut lexer = Lexer::new("not  match");
    assert_eq!(lexer.next_token().unwrap(), Token::NotMatch);
    assert_eq!(lexer.next_token().unwrap(), Token::Eof);

    let mut lexer = Lexer::new("not matches");
    assert_eq!(lexer.next_token().unwrap(), Token::Not);
    assert_eq!(lexer.next_token().unwrap(), Token::Identifier("matches".to_string()));
}

#[test]
fn test_expression() {
    let mut lexer = Lexer::new("@col1 > (@col2 - 3) * 3");
    assert_eq!(lexer.next_token().unwrap(), Token::ColumnRef("col1".to_string()));
    assert_eq!(lexer.next_token().unwrap(), Token::Gt);
    assert_eq!(lexer.next_token().unwrap(), Token::LParen);
    assert_eq!(lexer.next_token().unwrap(), Token::ColumnRef("col2".to_string()));
    assert_eq!(lexer.next_token().unwrap(), Token::Minus);
    assert_eq!(lexer.next_token().unwrap(), Token::Integer(3));
    assert_eq!(lexer.next_token().unwrap(), Token::RParen);
    assert_eq!(lexer.next_token().unwrap(), Token::Star);
    assert_eq!(lexer.next_token().unwrap(), Token::Integer(3));
}
