//! Semantic checks on built expressions.
//!
//! Every [`Expression`] produced by the resolver or by lowering passes
//! through [`validate`] before it is returned, so a resolved tree never holds
//! an expression with the wrong arity or impossible arguments.

use std::collections::BTreeMap;

use regex::Regex;

use crate::ast::RegexAction;
use crate::catalogue::{self, ArgShape, ExprKind};
use crate::error::{Path, ResolveError, ResolveResult};
use crate::node::{Arguments, Expression, Literal, Node};
use crate::resolver::Schema;
use crate::value::LiteralType;

/// Check arity and per-kind argument rules.
pub fn validate(expr: &Expression, path: &Path) -> ResolveResult<()> {
    check_shape(expr, path)?;
    match expr.kind {
        kind if kind.is_arithmetic() => check_arithmetic(expr, path),
        kind if kind.is_logical() => check_logical(expr, path),
        ExprKind::Conditional => check_conditional(expr, path),
        ExprKind::TypeCast | ExprKind::ParseWithFormatString => check_cast(expr, path),
        ExprKind::ResolveTimestamp => check_timestamp(expr, path),
        ExprKind::ValueInLiteralSet => check_set(expr, path),
        ExprKind::ValueInRange => check_range(expr, path),
        ExprKind::Regex => check_regex(expr, path),
        ExprKind::StringInterpolate => check_interpolate(expr, path),
        _ => Ok(()),
    }
}

fn check_shape(expr: &Expression, path: &Path) -> ResolveResult<()> {
    let spec = expr.kind.spec();
    match (&spec.shape, &expr.arguments) {
        (ArgShape::Positional { min, max, .. }, Arguments::Positional(args)) => {
            let count = args.len();
            if count < *min {
                return Err(ResolveError::structural(
                    path,
                    format!(
                        "{} expects at least {} argument{}, got {}",
                        expr.kind,
                        min,
                        if *min == 1 { "" } else { "s" },
                        count
                    ),
                ));
            }
            if let Some(max) = max
                && count > *max
            {
                return Err(ResolveError::structural(
                    path,
                    format!("{} expects at most {} arguments, got {}", expr.kind, max, count),
                ));
            }
            Ok(())
        }
        (ArgShape::Keyword { fields }, Arguments::Keyword(args)) => {
            if let Some(unknown) = args
                .keys()
                .find(|key| !fields.iter().any(|f| f.name == key.as_str()))
            {
                return Err(ResolveError::structural(
                    path,
                    format!("{} has no field `{}`", expr.kind, unknown),
                ));
            }
            let missing: Vec<&str> = fields
                .iter()
                .filter(|f| f.required && !args.contains_key(f.name))
                .map(|f| f.name)
                .collect();
            if !missing.is_empty() {
                return Err(ResolveError::structural(
                    path,
                    format!("{} is missing required field(s): {}", expr.kind, missing.join(", ")),
                ));
            }
            Ok(())
        }
        (ArgShape::Positional { .. }, Arguments::Keyword(_)) => Err(ResolveError::structural(
            path,
            format!("{} takes positional arguments", expr.kind),
        )),
        (ArgShape::Keyword { .. }, Arguments::Positional(_)) => Err(ResolveError::structural(
            path,
            format!("{} takes keyword arguments", expr.kind),
        )),
    }
}

fn literal_arg<'a>(expr: &'a Expression, field: &str) -> Option<&'a Literal> {
    expr.arg(field).and_then(Node::as_literal)
}

fn check_arithmetic(expr: &Expression, path: &Path) -> ResolveResult<()> {
    // ADD concatenates strings; MIN and MAX order them
    let strings_allowed = matches!(expr.kind, ExprKind::Add | ExprKind::Min | ExprKind::Max);
    for (idx, arg) in expr.positional().unwrap_or_default().iter().enumerate() {
        if let Node::Literal(lit) = arg
            && (matches!(lit.ty(), LiteralType::Bool | LiteralType::List | LiteralType::Map)
                || (lit.ty() == LiteralType::String && !strings_allowed))
        {
            return Err(ResolveError::validation(
                path,
                expr.kind,
                idx.to_string(),
                format!("cannot do arithmetic on a {} literal", lit.ty()),
            ));
        }
    }
    Ok(())
}

fn require_bool(lit: &Literal) -> Result<(), String> {
    match lit.ty() {
        LiteralType::Bool | LiteralType::Null => Ok(()),
        other => Err(format!("expected a boolean, got a {} literal", other)),
    }
}

fn check_logical(expr: &Expression, path: &Path) -> ResolveResult<()> {
    for (idx, arg) in expr.positional().unwrap_or_default().iter().enumerate() {
        if let Node::Literal(lit) = arg {
            require_bool(lit).map_err(|message| {
                ResolveError::validation(path, expr.kind, idx.to_string(), message)
            })?;
        }
    }
    Ok(())
}

fn check_conditional(expr: &Expression, path: &Path) -> ResolveResult<()> {
    if let Some(lit) = literal_arg(expr, "if") {
        require_bool(lit)
            .map_err(|message| ResolveError::validation(path, expr.kind, "if", message))?;
    }
    Ok(())
}

fn check_cast(expr: &Expression, path: &Path) -> ResolveResult<()> {
    if let Some(node) = expr.arg("output_type") {
        match node.as_literal().and_then(Literal::as_str) {
            Some(ty) if catalogue::is_type_name(ty) => {}
            Some(ty) => {
                return Err(ResolveError::validation(
                    path,
                    expr.kind,
                    "output_type",
                    format!("unknown type `{}`", ty),
                ));
            }
            None => {
                return Err(ResolveError::validation(
                    path,
                    expr.kind,
                    "output_type",
                    "expected a type name",
                ));
            }
        }
    }
    if expr.kind == ExprKind::ParseWithFormatString
        && literal_arg(expr, "format").and_then(Literal::as_str).is_none()
    {
        return Err(ResolveError::validation(
            path,
            expr.kind,
            "format",
            "expected a format string",
        ));
    }
    Ok(())
}

const UNITS: [&str; 7] = [
    "year",
    "month",
    "day",
    "hour",
    "minute",
    "second",
    "microsecond",
];

const DATE_BITS: u8 = 0b000_0111;
const TIME_BITS: u8 = 0b111_1000;
const ALL_BITS: u8 = DATE_BITS | TIME_BITS;

/// Components a timestamp field supplies, one bit per unit from `year` up.
fn field_bits(field: &str) -> Option<u8> {
    match field {
        "datetime" => Some(ALL_BITS),
        "date" => Some(DATE_BITS),
        "time" => Some(TIME_BITS),
        unit => UNITS.iter().position(|u| *u == unit).map(|idx| 1 << idx),
    }
}

fn type_bits(ty: &str) -> Option<u8> {
    match ty.to_ascii_lowercase().as_str() {
        "date" => Some(DATE_BITS),
        "time" => Some(TIME_BITS),
        "datetime" | "timestamp" => Some(ALL_BITS),
        _ => None,
    }
}

/// What the `input` of a timestamp already resolves, when knowable.
fn input_bits(input: &Node) -> Option<u8> {
    match input {
        Node::Column(col) => col.ty.as_deref().and_then(type_bits),
        Node::Expression(expr) => match expr.kind {
            ExprKind::ResolveTimestamp => Some(ALL_BITS),
            ExprKind::TypeCast | ExprKind::ParseWithFormatString => {
                literal_arg(expr, "output_type")
                    .and_then(Literal::as_str)
                    .and_then(type_bits)
            }
            _ => None,
        },
        Node::Literal(_) => None,
    }
}

fn unit_names(bits: u8) -> String {
    UNITS
        .iter()
        .enumerate()
        .filter(|(idx, _)| bits & (1 << idx) != 0)
        .map(|(_, unit)| *unit)
        .collect::<Vec<_>>()
        .join(", ")
}

fn check_timestamp(expr: &Expression, path: &Path) -> ResolveResult<()> {
    let Arguments::Keyword(args) = &expr.arguments else {
        return Ok(());
    };
    let supplied: Vec<(&str, u8)> = args
        .keys()
        .filter_map(|key| field_bits(key).map(|bits| (key.as_str(), bits)))
        .collect();
    if supplied.is_empty() {
        return Err(ResolveError::validation(
            path,
            expr.kind,
            "input",
            "no date or time components supplied",
        ));
    }

    for (idx, (left, left_bits)) in supplied.iter().enumerate() {
        for (right, right_bits) in &supplied[idx + 1..] {
            let overlap = left_bits & right_bits;
            if overlap != 0 {
                return Err(ResolveError::validation(
                    path,
                    expr.kind,
                    format!("{}, {}", left, right),
                    format!(
                        "`{}` and `{}` are incompatible: both supply {}",
                        left,
                        right,
                        unit_names(overlap)
                    ),
                ));
            }
        }
    }

    let union = supplied.iter().fold(0u8, |acc, (_, bits)| acc | bits);
    let deepest = 7 - union.leading_zeros() as usize;
    let input_cover = match args.get("input") {
        Some(input) => input_bits(input).unwrap_or_else(|| {
            // An untyped input stands for a date: at most the date units above the shallowest component
            DATE_BITS & ((1u8 << union.trailing_zeros()) - 1)
        }),
        None => 0,
    };
    let required = ((1u16 << deepest) - 1) as u8;
    let missing = required & !(union | input_cover);
    if missing != 0 {
        return Err(ResolveError::validation(
            path,
            expr.kind,
            unit_names(missing),
            format!("incomplete timestamp: missing {}", unit_names(missing)),
        ));
    }
    Ok(())
}

fn check_set(expr: &Expression, path: &Path) -> ResolveResult<()> {
    match literal_arg(expr, "set") {
        Some(lit) if lit.ty() == LiteralType::List => Ok(()),
        _ => Err(ResolveError::validation(
            path,
            expr.kind,
            "set",
            "expected a literal list of values",
        )),
    }
}

fn check_range(expr: &Expression, path: &Path) -> ResolveResult<()> {
    let Arguments::Keyword(args) = &expr.arguments else {
        return Ok(());
    };
    if !args.contains_key("min") && !args.contains_key("max") {
        return Err(ResolveError::validation(
            path,
            expr.kind,
            "min, max",
            "at least one bound is required",
        ));
    }
    for (flag, bound) in [("min_inclusive", "min"), ("max_inclusive", "max")] {
        let Some(node) = args.get(flag) else {
            continue;
        };
        if !args.contains_key(bound) {
            return Err(ResolveError::validation(
                path,
                expr.kind,
                flag,
                format!("`{}` given without `{}`", flag, bound),
            ));
        }
        if node.as_literal().and_then(Literal::as_bool).is_none() {
            return Err(ResolveError::validation(
                path,
                expr.kind,
                flag,
                "expected a boolean literal",
            ));
        }
    }
    Ok(())
}

fn check_regex(expr: &Expression, path: &Path) -> ResolveResult<()> {
    let action = literal_arg(expr, "action")
        .and_then(Literal::as_str)
        .and_then(RegexAction::from_name)
        .ok_or_else(|| {
            ResolveError::validation(
                path,
                expr.kind,
                "action",
                "expected one of EXTRACT, MATCH, NOT_MATCH",
            )
        })?;

    let pattern = literal_arg(expr, "pattern")
        .and_then(Literal::as_str)
        .ok_or_else(|| {
            ResolveError::validation(path, expr.kind, "pattern", "expected a pattern string")
        })?;
    let compiled = Regex::new(pattern).map_err(|e| {
        ResolveError::validation(path, expr.kind, "pattern", format!("invalid regex: {}", e))
    })?;

    let Some(group) = expr.arg("group") else {
        return Ok(());
    };
    if action != RegexAction::Extract {
        return Err(ResolveError::validation(
            path,
            expr.kind,
            "group",
            format!("`group` only applies to EXTRACT, not {}", action),
        ));
    }
    let groups = compiled.captures_len() - 1;
    match group.as_literal().and_then(Literal::as_int) {
        Some(n) if n >= 0 && (n as usize) <= groups => Ok(()),
        Some(n) => Err(ResolveError::validation(
            path,
            expr.kind,
            "group",
            format!("group {} out of range; pattern has {} capture group(s)", n, groups),
        )),
        None => Err(ResolveError::validation(
            path,
            expr.kind,
            "group",
            "expected a non-negative integer",
        )),
    }
}

/// Count `{}` slots, skipping `{{` and `}}` escapes.
pub fn count_slots(pattern: &str) -> usize {
    let bytes = pattern.as_bytes();
    let mut idx = 0;
    let mut slots = 0;
    while idx < bytes.len() {
        match &bytes[idx..] {
            [b'{', b'{', ..] | [b'}', b'}', ..] => idx += 2,
            [b'{', b'}', ..] => {
                slots += 1;
                idx += 2;
            }
            _ => idx += 1,
        }
    }
    slots
}

fn check_interpolate(expr: &Expression, path: &Path) -> ResolveResult<()> {
    let args = expr.positional().unwrap_or_default();
    let Some(pattern) = args.first().and_then(Node::as_literal).and_then(Literal::as_str) else {
        return Err(ResolveError::validation(
            path,
            expr.kind,
            "0",
            "expected a pattern string",
        ));
    };
    let slots = count_slots(pattern);
    if slots != args.len() - 1 {
        return Err(ResolveError::validation(
            path,
            expr.kind,
            "0",
            format!(
                "pattern has {} slot(s) but {} input(s) were given",
                slots,
                args.len() - 1
            ),
        ));
    }
    Ok(())
}

/// Check every column in `node` against `schema`.
///
/// A column must be declared, and a column carrying a type must agree with
/// the schema's type when both are known.
pub fn validate_columns(node: &Node, schema: &Schema, path: &Path) -> ResolveResult<()> {
    let mut columns = BTreeMap::new();
    node.walk(&mut |child| {
        if let Node::Column(col) = child {
            columns.entry(col.name.as_str()).or_insert(col.ty.as_deref());
        }
    });
    for (name, ty) in columns {
        let Some(declared) = schema.get(name) else {
            return Err(ResolveError::schema(
                path,
                format!("unknown column `{}`", name),
            ));
        };
        if let (Some(ty), Some(declared)) = (ty, declared.as_deref())
            && !ty.eq_ignore_ascii_case(declared)
        {
            return Err(ResolveError::schema(
                path,
                format!(
                    "column `{}` has type `{}` but the schema declares `{}`",
                    name, ty, declared
                ),
            ));
        }
    }
    Ok(())
}
