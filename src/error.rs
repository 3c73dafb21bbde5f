use std::fmt;

use crate::{catalogue::ExprKind, parser::ParseError};

/// Convenience result type used across the resolver.
pub type ResolveResult<T> = Result<T, ResolveError>;

/// One step from a top-level entry down to the offending subtree.
///
/// # Examples
/// - `{a: {add: [1, "x"]}}` failing on `"x"` → `[Key("a"), Key("add"), Index(1)]`
/// - `{a: [{if: p, then: 1}]}` failing on `p` → `[Key("a"), Index(0), Key("if")]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// Mapping key or argument name
    Key(String),
    /// Sequence position
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(key) => f.write_str(key),
            PathSegment::Index(idx) => write!(f, "{}", idx),
        }
    }
}

/// Location of a subtree within its top-level entry. Starts with the entry key.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Path(Vec<PathSegment>);

impl Path {
    pub fn root() -> Self {
        Path(Vec::new())
    }

    /// A child path one mapping key deeper.
    pub fn key(&self, key: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Key(key.into()));
        Path(segments)
    }

    /// A child path one sequence position deeper.
    pub fn index(&self, idx: usize) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Index(idx));
        Path(segments)
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("<root>");
        }
        for (idx, segment) in self.0.iter().enumerate() {
            if idx > 0 {
                f.write_str(" -> ")?;
            }
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}

/// The three error families, plus optional column checking.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ErrorKind {
    /// Malformed expression string.
    #[error("syntax error: {0}")]
    Syntax(#[from] ParseError),

    /// A list or map matches no recognised template, or has the wrong arity.
    #[error("structural error: {0}")]
    Structural(String),

    /// A recognised shape carries semantically invalid arguments.
    #[error("validation error in {kind} field `{field}`: {message}")]
    Validation {
        kind: ExprKind,
        field: String,
        message: String,
    },

    /// A column reference disagrees with the input schema.
    #[error("schema error: {0}")]
    Schema(String),
}

/// Error raised while resolving a value, located by its path.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{kind} (at {path})")]
pub struct ResolveError {
    pub path: Path,
    pub kind: ErrorKind,
}

impl ResolveError {
    pub fn syntax(path: &Path, error: ParseError) -> Self {
        ResolveError {
            path: path.clone(),
            kind: ErrorKind::Syntax(error),
        }
    }

    pub fn structural(path: &Path, message: impl Into<String>) -> Self {
        ResolveError {
            path: path.clone(),
            kind: ErrorKind::Structural(message.into()),
        }
    }

    pub fn validation(
        path: &Path,
        kind: ExprKind,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        ResolveError {
            path: path.clone(),
            kind: ErrorKind::Validation {
                kind,
                field: field.into(),
                message: message.into(),
            },
        }
    }

    pub fn schema(path: &Path, message: impl Into<String>) -> Self {
        ResolveError {
            path: path.clone(),
            kind: ErrorKind::Schema(message.into()),
        }
    }

    pub fn is_syntax(&self) -> bool {
        matches!(self.kind, ErrorKind::Syntax(_))
    }

    pub fn is_structural(&self) -> bool {
        matches!(self.kind, ErrorKind::Structural(_))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self.kind, ErrorKind::Validation { .. })
    }
}
