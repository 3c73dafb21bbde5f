//! Syntax-to-node lowering.
//!
//! Turns a parsed [`Syntax`] tree into canonical [`Node`]s. Lowering is
//! one-to-one: every operator, call, cast, regex clause and membership test
//! becomes one catalogue expression, and every expression is validated
//! exactly as if it had been written in map form.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::ast::{BinOp, CastTarget, Syntax, TimeOfDay};
use crate::catalogue::{self, ArgShape, ExprKind};
use crate::error::{Path, ResolveError, ResolveResult};
use crate::node::{Arguments, Node};
use crate::resolver::{Context, build_expression};
use crate::value;

/// Lower a parsed expression under `ctx`. Errors are reported at `path`.
pub fn lower(syntax: &Syntax, ctx: Context<'_>, path: &Path) -> ResolveResult<Node> {
    Lowerer { ctx, path }.lower(syntax)
}

/// True when an operand of `syntax` is a bare name the schema does not declare.
///
/// Set members are skipped since they are always literal.
pub(crate) fn has_unknown_names(syntax: &Syntax, ctx: Context<'_>) -> bool {
    match syntax {
        Syntax::Name(name) => ctx.declared_column(name).is_none(),
        Syntax::BinaryOp { left, right, .. } => {
            has_unknown_names(left, ctx) || has_unknown_names(right, ctx)
        }
        Syntax::Not(inner) | Syntax::Negate(inner) | Syntax::Group(inner) => {
            has_unknown_names(inner, ctx)
        }
        Syntax::Cast { input, .. } | Syntax::Regex { input, .. } => has_unknown_names(input, ctx),
        Syntax::InSet { value, .. } => has_unknown_names(value, ctx),
        Syntax::InRange { value, min, max, .. } => {
            has_unknown_names(value, ctx) || has_unknown_names(min, ctx) || has_unknown_names(max, ctx)
        }
        Syntax::Conditional {
            then,
            condition,
            otherwise,
        } => {
            has_unknown_names(then, ctx)
                || has_unknown_names(condition, ctx)
                || has_unknown_names(otherwise, ctx)
        }
        Syntax::Call { args, .. } => args.iter().any(|arg| has_unknown_names(arg, ctx)),
        _ => false,
    }
}

struct Lowerer<'a, 's> {
    ctx: Context<'s>,
    path: &'a Path,
}

fn keyword<const N: usize>(pairs: [(&str, Node); N]) -> Arguments {
    Arguments::Keyword(
        pairs
            .into_iter()
            .map(|(name, node)| (name.to_string(), node))
            .collect(),
    )
}

impl<'a, 's> Lowerer<'a, 's> {
    /// Same lowerer with literal context switched on or off.
    fn literal(&self, literal: bool) -> Lowerer<'a, 's> {
        Lowerer {
            ctx: Context {
                literal,
                ..self.ctx
            },
            path: self.path,
        }
    }

    fn build(&self, kind: ExprKind, arguments: Arguments) -> ResolveResult<Node> {
        build_expression(kind, arguments, self.path)
    }

    fn lower(&self, syntax: &Syntax) -> ResolveResult<Node> {
        match syntax {
            Syntax::Integer(n) => Ok(Node::literal(*n)),
            Syntax::Float(f) => self.float(*f),
            Syntax::String(s) => Ok(Node::literal(s.as_str())),
            Syntax::Boolean(b) => Ok(Node::literal(*b)),
            Syntax::Null => Ok(Node::null()),
            Syntax::Time(time) => self.build(
                ExprKind::TypeCast,
                keyword([
                    ("input", Node::literal(time.to_string())),
                    ("output_type", Node::literal("time")),
                ]),
            ),

            Syntax::Name(name) => Ok(self.name(name)),
            Syntax::ColumnRef(name) => Ok(self.ctx.column_node(name)),

            Syntax::BinaryOp { op, left, right } => self.binary(*op, left, right),
            Syntax::Not(inner) => self.build(
                ExprKind::Not,
                Arguments::Positional(vec![self.lower(inner)?]),
            ),
            Syntax::Negate(inner) => self.negate(inner),
            Syntax::Call { name, args } => self.call(name, args),

            Syntax::Cast { input, target } => {
                let input = self.lower(input)?;
                match target {
                    CastTarget::Type(ty) => self.build(
                        ExprKind::TypeCast,
                        keyword([
                            ("input", input),
                            ("output_type", Node::literal(ty.to_ascii_lowercase())),
                        ]),
                    ),
                    CastTarget::Format(format) => self.build(
                        ExprKind::ParseWithFormatString,
                        keyword([("input", input), ("format", Node::literal(format.as_str()))]),
                    ),
                }
            }

            Syntax::Conditional {
                then,
                condition,
                otherwise,
            } => self.build(
                ExprKind::Conditional,
                keyword([
                    ("if", self.lower(condition)?),
                    ("then", self.lower(then)?),
                    ("else", self.lower(otherwise)?),
                ]),
            ),

            Syntax::InSet { value, items } => self.build(
                ExprKind::ValueInLiteralSet,
                keyword([("value", self.lower(value)?), ("set", self.literal_list(items)?)]),
            ),

            Syntax::InRange {
                value,
                min,
                max,
                bounds,
            } => self.build(
                ExprKind::ValueInRange,
                keyword([
                    ("value", self.lower(value)?),
                    ("min", self.lower(min)?),
                    ("max", self.lower(max)?),
                    ("min_inclusive", Node::literal(bounds.min_inclusive)),
                    ("max_inclusive", Node::literal(bounds.max_inclusive)),
                ]),
            ),

            Syntax::Set(items) => self.literal_list(items),

            Syntax::Regex {
                action,
                pattern,
                group,
                input,
            } => {
                let mut args = BTreeMap::new();
                args.insert("action".to_string(), Node::literal(action.as_str()));
                args.insert("pattern".to_string(), Node::literal(pattern.as_str()));
                args.insert("input".to_string(), self.lower(input)?);
                if let Some(group) = group {
                    args.insert("group".to_string(), Node::literal(*group));
                }
                self.build(ExprKind::Regex, Arguments::Keyword(args))
            }

            Syntax::Group(inner) => self.lower(inner),
        }
    }

    fn float(&self, n: f64) -> ResolveResult<Node> {
        value::float(n)
            .map(Node::literal)
            .ok_or_else(|| ResolveError::structural(self.path, format!("float literal {} is out of range", n)))
    }

    /// A bare name is a column only when the schema declares it.
    fn name(&self, name: &str) -> Node {
        if self.ctx.literal {
            return Node::literal(name);
        }
        self.ctx
            .declared_column(name)
            .unwrap_or_else(|| Node::literal(name))
    }

    fn binary(&self, op: BinOp, left: &Syntax, right: &Syntax) -> ResolveResult<Node> {
        let kind = match op {
            BinOp::Add => ExprKind::Add,
            BinOp::Subtract => ExprKind::Subtract,
            BinOp::Multiply => ExprKind::Multiply,
            BinOp::Divide => ExprKind::Divide,
            BinOp::Equal => ExprKind::Equal,
            BinOp::NotEqual => ExprKind::NotEqual,
            BinOp::LessThan => ExprKind::LessThan,
            BinOp::LessEqual => ExprKind::LessThanOrEqual,
            BinOp::GreaterThan => ExprKind::GreaterThan,
            BinOp::GreaterEqual => ExprKind::GreaterThanOrEqual,
            BinOp::And => ExprKind::And,
            BinOp::Or => ExprKind::Or,
            BinOp::ResolveTimestamp => return self.timestamp(left, right),
        };
        self.build(
            kind,
            Arguments::Positional(vec![self.lower(left)?, self.lower(right)?]),
        )
    }

    /// `d @ 11:59 pm` spells out the time components; `d @ t` passes `t` whole.
    fn timestamp(&self, date: &Syntax, time: &Syntax) -> ResolveResult<Node> {
        let mut args = BTreeMap::new();
        args.insert("input".to_string(), self.lower(date)?);
        match time {
            Syntax::Time(TimeOfDay {
                hour,
                minute,
                second,
                microsecond,
            }) => {
                args.insert("hour".to_string(), Node::literal(*hour));
                args.insert("minute".to_string(), Node::literal(*minute));
                args.insert("second".to_string(), Node::literal(*second));
                if *microsecond > 0 {
                    args.insert("microsecond".to_string(), Node::literal(*microsecond));
                }
            }
            other => {
                args.insert("time".to_string(), self.lower(other)?);
            }
        }
        self.build(ExprKind::ResolveTimestamp, Arguments::Keyword(args))
    }

    fn negate(&self, inner: &Syntax) -> ResolveResult<Node> {
        match inner {
            Syntax::Integer(n) => Ok(Node::literal(-*n)),
            Syntax::Float(f) => self.float(-*f),
            other => self.build(
                ExprKind::Subtract,
                Arguments::Positional(vec![Node::literal(0), self.lower(other)?]),
            ),
        }
    }

    /// Function call by catalogue alias. Keyword kinds take their arguments
    /// in declared field order, skipping any field the alias presets.
    fn call(&self, name: &str, args: &[Syntax]) -> ResolveResult<Node> {
        let alias = catalogue::lookup(name).ok_or_else(|| {
            ResolveError::structural(self.path, format!("unknown function `{}`", name))
        })?;
        let spec = alias.kind.spec();
        match &spec.shape {
            ArgShape::Positional { .. } => {
                let mut lowered = Vec::with_capacity(args.len());
                for (idx, arg) in args.iter().enumerate() {
                    // A string interpolation pattern is always taken literally
                    let literal = alias.kind == ExprKind::StringInterpolate && idx == 0;
                    lowered.push(self.literal(literal || self.ctx.literal).lower(arg)?);
                }
                self.build(alias.kind, Arguments::Positional(lowered))
            }
            ArgShape::Keyword { fields } => {
                let mut named = BTreeMap::new();
                if let Some((field, value)) = alias.preset {
                    named.insert(field.to_string(), Node::literal(value));
                }
                let open: Vec<_> = fields
                    .iter()
                    .filter(|f| !named.contains_key(f.name))
                    .collect();
                if args.len() > open.len() {
                    return Err(ResolveError::structural(
                        self.path,
                        format!(
                            "`{}` takes at most {} arguments, got {}",
                            name,
                            open.len(),
                            args.len()
                        ),
                    ));
                }
                for (field, arg) in open.into_iter().zip(args) {
                    let lowered = self.literal(field.context.literal || self.ctx.literal).lower(arg)?;
                    named.insert(field.name.to_string(), lowered);
                }
                self.build(alias.kind, Arguments::Keyword(named))
            }
        }
    }

    /// Lower set members under literal context and collapse them into one list Literal.
    fn literal_list(&self, items: &[Syntax]) -> ResolveResult<Node> {
        let literal = self.literal(true);
        let mut values = Vec::with_capacity(items.len());
        for item in items {
            match literal.lower(item)? {
                Node::Literal(lit) => values.push(Value::from(lit)),
                other => {
                    return Err(ResolveError::structural(
                        self.path,
                        format!("set members must be literal values, found {}", other),
                    ));
                }
            }
        }
        Ok(Node::literal(Value::Array(values)))
    }
}
