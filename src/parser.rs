use std::{collections::BTreeSet, mem};

use crate::{
    ast::{BinOp, CastTarget, RangeBounds, RegexAction, Syntax, Token, TokenKind},
    lexer::{LexError, Lexer, Position},
};

/// A malformed expression.
///
/// There is no recovery: the first error aborts the parse of that string.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    /// The lexer could not produce a token.
    #[error(transparent)]
    Lex(#[from] LexError),

    /// A token appeared where the grammar does not allow it.
    #[error("unexpected {found} at {position}, expected {}", list_kinds(.expected))]
    Unexpected {
        position: Position,
        found: String,
        expected: BTreeSet<TokenKind>,
    },
}

impl ParseError {
    pub fn position(&self) -> Position {
        match self {
            ParseError::Lex(e) => e.position,
            ParseError::Unexpected { position, .. } => *position,
        }
    }
}

fn list_kinds(kinds: &BTreeSet<TokenKind>) -> String {
    if kinds.is_empty() {
        return "nothing".to_string();
    }
    kinds
        .iter()
        .map(|k| k.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Token kinds that can start a primary expression.
const PRIMARY_START: &[TokenKind] = &[
    TokenKind::Integer,
    TokenKind::Float,
    TokenKind::String,
    TokenKind::Boolean,
    TokenKind::Null,
    TokenKind::Time,
    TokenKind::Identifier,
    TokenKind::ColumnRef,
    TokenKind::LParen,
    TokenKind::LBrace,
    TokenKind::Minus,
    TokenKind::Not,
    TokenKind::Extract,
    TokenKind::Match,
    TokenKind::NotMatch,
];

pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current_token: Token,
    current_position: Position,
    /// Kinds checked against the current token since the last advance.
    expected: BTreeSet<TokenKind>,
}

impl<'a> Parser<'a> {
    pub fn new(mut lexer: Lexer<'a>) -> Result<Self, ParseError> {
        let current_token = lexer.next_token()?;
        let current_position = lexer.token_start();
        Ok(Parser {
            lexer,
            current_token,
            current_position,
            expected: BTreeSet::new(),
        })
    }

    fn advance(&mut self) -> Result<(), ParseError> {
        self.current_token = self.lexer.next_token()?;
        self.current_position = self.lexer.token_start();
        self.expected.clear();
        Ok(())
    }

    /// Advances in regex mode; the next token is a regex body (or `group`).
    fn advance_regex(&mut self, allow_group: bool) -> Result<(), ParseError> {
        self.current_token = self.lexer.next_regex(allow_group)?;
        self.current_position = self.lexer.token_start();
        self.expected.clear();
        Ok(())
    }

    fn check(&mut self, kind: TokenKind) -> bool {
        if self.current_token.kind() == kind {
            true
        } else {
            self.expected.insert(kind);
            false
        }
    }

    fn eat(&mut self, kind: TokenKind) -> Result<bool, ParseError> {
        if self.check(kind) {
            self.advance()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<(), ParseError> {
        if self.check(kind) {
            self.advance()
        } else {
            Err(self.unexpected())
        }
    }

    fn unexpected(&self) -> ParseError {
        ParseError::Unexpected {
            position: self.current_position,
            found: self.current_token.to_string(),
            expected: self.expected.clone(),
        }
    }

    /// Parse a complete expression; trailing input is an error.
    pub fn parse(&mut self) -> Result<Syntax, ParseError> {
        let expr = self.parse_expression()?;
        self.expect(TokenKind::Eof)?;
        Ok(expr)
    }

    pub fn parse_expression(&mut self) -> Result<Syntax, ParseError> {
        self.parse_conditional()
    }

    /// `then if condition else otherwise`, right-recursive on the else branch
    fn parse_conditional(&mut self) -> Result<Syntax, ParseError> {
        let then = self.parse_or()?;

        if !self.eat(TokenKind::If)? {
            return Ok(then);
        }

        let condition = self.parse_or()?;
        self.expect(TokenKind::Else)?;
        let otherwise = self.parse_conditional()?;

        Ok(Syntax::Conditional {
            then: Box::new(then),
            condition: Box::new(condition),
            otherwise: Box::new(otherwise),
        })
    }

    fn parse_or(&mut self) -> Result<Syntax, ParseError> {
        let mut left = self.parse_and()?;

        while self.eat(TokenKind::Or)? {
            let right = self.parse_and()?;
            left = Syntax::BinaryOp {
                op: BinOp::Or,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Syntax, ParseError> {
        let mut left = self.parse_not()?;

        while self.eat(TokenKind::And)? {
            let right = self.parse_not()?;
            left = Syntax::BinaryOp {
                op: BinOp::And,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> Result<Syntax, ParseError> {
        if self.eat(TokenKind::Not)? {
            let operand = self.parse_not()?;
            return Ok(Syntax::Not(Box::new(operand)));
        }
        self.parse_membership()
    }

    /// Membership (`in`) and comparison; neither chains.
    fn parse_membership(&mut self) -> Result<Syntax, ParseError> {
        let left = self.parse_additive()?;

        if self.eat(TokenKind::In)? {
            return self.parse_membership_target(left);
        }

        let op = if self.check(TokenKind::EqEq) {
            BinOp::Equal
        } else if self.check(TokenKind::NotEq) {
            BinOp::NotEqual
        } else if self.check(TokenKind::LtEq) {
            BinOp::LessEqual
        } else if self.check(TokenKind::GtEq) {
            BinOp::GreaterEqual
        } else if self.check(TokenKind::Lt) {
            BinOp::LessThan
        } else if self.check(TokenKind::Gt) {
            BinOp::GreaterThan
        } else {
            return Ok(left);
        };

        self.advance()?;
        let right = self.parse_additive()?;

        Ok(Syntax::BinaryOp {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    fn parse_membership_target(&mut self, value: Syntax) -> Result<Syntax, ParseError> {
        if self.eat(TokenKind::LBrace)? {
            let items = self.parse_set_items()?;
            return Ok(Syntax::InSet {
                value: Box::new(value),
                items,
            });
        }

        let min_inclusive = if self.check(TokenKind::LBracket) {
            true
        } else if self.check(TokenKind::LParen) {
            false
        } else {
            return Err(self.unexpected());
        };
        self.advance()?;

        let min = self.parse_additive()?;
        self.expect(TokenKind::Comma)?;
        let max = self.parse_additive()?;

        let max_inclusive = if self.check(TokenKind::RBracket) {
            true
        } else if self.check(TokenKind::RParen) {
            false
        } else {
            return Err(self.unexpected());
        };
        self.advance()?;

        Ok(Syntax::InRange {
            value: Box::new(value),
            min: Box::new(min),
            max: Box::new(max),
            bounds: RangeBounds {
                min_inclusive,
                max_inclusive,
            },
        })
    }

    /// Items of `{a, b, c}` after the opening brace; consumes the closing brace.
    fn parse_set_items(&mut self) -> Result<Vec<Syntax>, ParseError> {
        let mut items = vec![];

        while !self.check(TokenKind::RBrace) {
            items.push(self.parse_expression()?);

            if !self.check(TokenKind::RBrace) {
                self.expect(TokenKind::Comma)?;
            }
        }

        self.expect(TokenKind::RBrace)?;
        Ok(items)
    }

    fn parse_additive(&mut self) -> Result<Syntax, ParseError> {
        let mut left = self.parse_multiplicative()?;

        loop {
            let op = if self.check(TokenKind::Plus) {
                BinOp::Add
            } else if self.check(TokenKind::Minus) {
                BinOp::Subtract
            } else {
                break;
            };

            self.advance()?;
            let right = self.parse_multiplicative()?;

            left = Syntax::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    /// `*`, `/` and the timestamp-resolve `@`
    fn parse_multiplicative(&mut self) -> Result<Syntax, ParseError> {
        let mut left = self.parse_unary()?;

        loop {
            let op = if self.check(TokenKind::Star) {
                BinOp::Multiply
            } else if self.check(TokenKind::Slash) {
                BinOp::Divide
            } else if self.check(TokenKind::At) {
                BinOp::ResolveTimestamp
            } else {
                break;
            };

            self.advance()?;
            let right = self.parse_unary()?;

            left = Syntax::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Syntax, ParseError> {
        if self.eat(TokenKind::Minus)? {
            let operand = self.parse_unary()?;
            return Ok(Syntax::Negate(Box::new(operand)));
        }
        self.parse_cast()
    }

    /// `primary as TYPE` / `primary as "format"`
    fn parse_cast(&mut self) -> Result<Syntax, ParseError> {
        let mut expr = self.parse_primary()?;

        while self.eat(TokenKind::As)? {
            let target = match mem::replace(&mut self.current_token, Token::Eof) {
                Token::Identifier(name) => CastTarget::Type(name),
                Token::String(format) => CastTarget::Format(format),
                other => {
                    self.current_token = other;
                    self.expected.insert(TokenKind::Identifier);
                    self.expected.insert(TokenKind::String);
                    return Err(self.unexpected());
                }
            };
            self.advance()?;

            expr = Syntax::Cast {
                input: Box::new(expr),
                target,
            };
        }
        Ok(expr)
    }

    /// Parse primary expressions: literals, names, calls, groups, sets and regex clauses
    fn parse_primary(&mut self) -> Result<Syntax, ParseError> {
        let token = mem::replace(&mut self.current_token, Token::Eof);
        let expr = match token {
            // Literals
            Token::Integer(n) => Syntax::Integer(n),
            Token::Float(n) => Syntax::Float(n),
            Token::String(s) => Syntax::String(s),
            Token::Boolean(b) => Syntax::Boolean(b),
            Token::Null => Syntax::Null,
            Token::Time(t) => Syntax::Time(t),

            // References
            Token::ColumnRef(name) => Syntax::ColumnRef(name),
            Token::Identifier(name) => {
                self.advance()?;
                return self.parse_name_or_call(name);
            }

            Token::LParen => {
                self.advance()?;
                let expr = self.parse_expression()?;
                self.expect(TokenKind::RParen)?;
                return Ok(Syntax::Group(Box::new(expr)));
            }

            Token::LBrace => {
                self.advance()?;
                let items = self.parse_set_items()?;
                return Ok(Syntax::Set(items));
            }

            // Regex clauses
            Token::Extract => return self.parse_extract(),
            Token::Match => return self.parse_match(RegexAction::Match),
            Token::NotMatch => return self.parse_match(RegexAction::NotMatch),

            // Keywords in name position are names
            keyword if keyword.keyword_text().is_some() => {
                let name = keyword.keyword_text().unwrap_or_default().to_string();
                self.advance()?;
                return self.parse_name_or_call(name);
            }

            other => {
                self.current_token = other;
                self.expected.extend(PRIMARY_START.iter().copied());
                return Err(self.unexpected());
            }
        };

        self.advance()?;
        Ok(expr)
    }

    fn parse_name_or_call(&mut self, name: String) -> Result<Syntax, ParseError> {
        if !self.eat(TokenKind::LParen)? {
            return Ok(Syntax::Name(name));
        }

        let mut args = vec![];
        while !self.check(TokenKind::RParen) {
            args.push(self.parse_expression()?);

            if !self.check(TokenKind::RParen) {
                self.expect(TokenKind::Comma)?;
            }
        }
        self.expect(TokenKind::RParen)?;

        Ok(Syntax::Call { name, args })
    }

    /// `extract [group N of] REGEX from EXPR`; the current token is `extract`
    fn parse_extract(&mut self) -> Result<Syntax, ParseError> {
        self.advance_regex(true)?;

        let mut group = None;
        if self.eat(TokenKind::Group)? {
            let index = match self.current_token {
                Token::Integer(n) => n,
                _ => {
                    self.expected.insert(TokenKind::Integer);
                    return Err(self.unexpected());
                }
            };
            self.advance()?;
            if !self.check(TokenKind::Of) {
                return Err(self.unexpected());
            }
            self.advance_regex(false)?;
            group = Some(index);
        }

        let pattern = self.expect_regex()?;
        self.expect(TokenKind::From)?;
        let input = self.parse_unary()?;

        Ok(Syntax::Regex {
            action: RegexAction::Extract,
            pattern,
            group,
            input: Box::new(input),
        })
    }

    /// `[not] match REGEX against EXPR`; the current token is the keyword
    fn parse_match(&mut self, action: RegexAction) -> Result<Syntax, ParseError> {
        self.advance_regex(false)?;

        let pattern = self.expect_regex()?;
        self.expect(TokenKind::Against)?;
        let input = self.parse_unary()?;

        Ok(Syntax::Regex {
            action,
            pattern,
            group: None,
            input: Box::new(input),
        })
    }

    fn expect_regex(&mut self) -> Result<String, ParseError> {
        match mem::replace(&mut self.current_token, Token::Eof) {
            Token::Regex(body) => {
                self.advance()?;
                Ok(body)
            }
            other => {
                self.current_token = other;
                self.expected.insert(TokenKind::Regex);
                Err(self.unexpected())
            }
        }
    }
}

/// Parses one expression string into a raw syntax tree.
pub fn parse(input: &str) -> Result<Syntax, ParseError> {
    let lexer = Lexer::new(input);
    let mut parser = Parser::new(lexer)?;
    parser.parse()
}
