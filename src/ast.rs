//! # dftly expression language - syntax layer
//!
//! This module defines the tokens and raw syntax tree of the dftly expression
//! language, the small human-readable language embedded in string leaves of a
//! dftly configuration.
//!
//! ## Architecture Overview
//!
//! - **[tokens]** - Lexical tokens produced by the lexer
//! - **[syntax]** - Raw syntax nodes produced by the parser
//! - **[operators]** - Binary operators, range bounds and regex actions
//!
//! The syntax tree is an intermediate form only. It is lowered into the
//! canonical [`Node`](crate::node::Node) tree by [`lower`](crate::lower).
//!
//! ## Precedence (lowest to highest)
//!
//! ```text
//! A if B else C                 conditional, right-recursive on else
//! or, ||                        left-associative
//! and, &&                       left-associative
//! not, !                        prefix, stacks
//! in {..}, in [..), == < ...    membership and comparison
//! + -                           left-associative
//! * / @                         left-associative
//! -x, calls, casts, literals, names, (..), {..}, regex clauses
//! ```
//!
//! ## Examples
//!
//! ```text
//! @col1 + @col2
//! @col1 > (@col2 - 3) * 3
//! @a if @flag else @b
//! @dose in [0, 10)
//! charttime @ 11:59:59 p.m.
//! extract group 1 of /(\d+)\/(\d+)/ from @bp
//! not match "^\s*$" against @note
//! @ts as "%Y-%m-%d"
//! ```
pub mod operators;
pub mod syntax;
pub mod tokens;

pub use operators::{BinOp, RangeBounds, RegexAction};
pub use syntax::{CastTarget, Syntax, TimeOfDay};
pub use tokens::{Token, TokenKind};
