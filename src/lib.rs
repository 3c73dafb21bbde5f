//! dftly: a small configuration language for dataframe expressions.
//!
//! Authors write loosely typed YAML or JSON ("simplified form"): plain
//! scalars, expression strings like `"@col1 + @col2"`, shorthand maps like
//! `{add: [a, b]}` and conditional lists. The resolver turns that into a
//! fully typed tree of Literal, Column and Expression nodes ("resolved form").
//!
//! # Examples
//!
//! ```
//! use dftly::{resolve_mapping, ResolveOptions, Schema};
//! use serde_json::json;
//!
//! let schema: Schema = [("dose".to_string(), Some("float".to_string()))]
//!     .into_iter()
//!     .collect();
//! let input = json!({"doubled": "dose * 2", "flag": {"in_range": {"value": "dose", "min": 0}}});
//!
//! let resolution = resolve_mapping(&input, Some(&schema), &ResolveOptions::default()).unwrap();
//! assert_eq!(resolution.entries["doubled"].to_string(), "MULTIPLY(@dose, 2)");
//! ```
pub mod ast;
pub mod catalogue;
#[cfg(feature = "cli")]
pub mod cli;
pub mod error;
pub mod lexer;
pub mod lower;
pub mod node;
pub mod options;
pub mod output;
pub mod parser;
pub mod resolver;
pub mod validation;
pub mod value;

pub use ast::{BinOp, Syntax, Token};
pub use catalogue::{ExprKind, lookup};
pub use error::{ErrorKind, Path, PathSegment, ResolveError, ResolveResult};
pub use lexer::{LexError, Lexer, Position};
pub use node::{Arguments, Column, Expression, Literal, Node};
pub use options::{FailureMode, ResolveOptions};
pub use output::{to_json, to_json_pretty};
pub use parser::{ParseError, Parser, parse};
pub use resolver::{Context, Resolution, Resolved, Resolver, Schema, resolve_mapping};
pub use value::LiteralType;
