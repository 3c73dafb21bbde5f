//! Expression catalogue.
//!
//! A closed registry of expression kinds. Each entry declares the kind's
//! argument shape, the aliases accepted as shorthand keys and function names,
//! and the context flags applied when resolving each argument.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::ast::RegexAction;
use crate::node::{Arguments, Expression, Node};

/// Every operation dftly knows.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExprKind {
    // Arithmetic
    Add,
    Subtract,
    Multiply,
    Divide,
    Mean,
    Min,
    Max,
    // Comparison
    Equal,
    NotEqual,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
    // Logical
    And,
    Or,
    Not,
    // Control flow
    Coalesce,
    Conditional,
    // Types and time
    TypeCast,
    ParseWithFormatString,
    ResolveTimestamp,
    // Membership
    ValueInLiteralSet,
    ValueInRange,
    // Strings
    Regex,
    StringInterpolate,
}

impl ExprKind {
    pub fn name(self) -> &'static str {
        match self {
            ExprKind::Add => "ADD",
            ExprKind::Subtract => "SUBTRACT",
            ExprKind::Multiply => "MULTIPLY",
            ExprKind::Divide => "DIVIDE",
            ExprKind::Mean => "MEAN",
            ExprKind::Min => "MIN",
            ExprKind::Max => "MAX",
            ExprKind::Equal => "EQUAL",
            ExprKind::NotEqual => "NOT_EQUAL",
            ExprKind::GreaterThan => "GREATER_THAN",
            ExprKind::GreaterThanOrEqual => "GREATER_THAN_OR_EQUAL",
            ExprKind::LessThan => "LESS_THAN",
            ExprKind::LessThanOrEqual => "LESS_THAN_OR_EQUAL",
            ExprKind::And => "AND",
            ExprKind::Or => "OR",
            ExprKind::Not => "NOT",
            ExprKind::Coalesce => "COALESCE",
            ExprKind::Conditional => "CONDITIONAL",
            ExprKind::TypeCast => "TYPE_CAST",
            ExprKind::ParseWithFormatString => "PARSE_WITH_FORMAT_STRING",
            ExprKind::ResolveTimestamp => "RESOLVE_TIMESTAMP",
            ExprKind::ValueInLiteralSet => "VALUE_IN_LITERAL_SET",
            ExprKind::ValueInRange => "VALUE_IN_RANGE",
            ExprKind::Regex => "REGEX",
            ExprKind::StringInterpolate => "STRING_INTERPOLATE",
        }
    }

    /// Look up a kind by its canonical name, ignoring case.
    pub fn from_name(name: &str) -> Option<Self> {
        KINDS
            .iter()
            .map(|spec| spec.kind)
            .find(|kind| kind.name().eq_ignore_ascii_case(name))
    }

    pub fn spec(self) -> &'static KindSpec {
        // KINDS is declared in enum order
        &KINDS[self as usize]
    }

    pub fn all() -> impl Iterator<Item = ExprKind> {
        KINDS.iter().map(|spec| spec.kind)
    }

    pub fn is_arithmetic(self) -> bool {
        matches!(
            self,
            ExprKind::Add
                | ExprKind::Subtract
                | ExprKind::Multiply
                | ExprKind::Divide
                | ExprKind::Mean
                | ExprKind::Min
                | ExprKind::Max
        )
    }

    pub fn is_logical(self) -> bool {
        matches!(self, ExprKind::And | ExprKind::Or | ExprKind::Not)
    }
}

impl fmt::Display for ExprKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Context flags a kind applies to one of its arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FieldContext {
    pub literal: bool,
    pub recurse_to_literal: bool,
    pub recursive_list: bool,
}

impl FieldContext {
    pub const AMBIENT: FieldContext = FieldContext {
        literal: false,
        recurse_to_literal: false,
        recursive_list: false,
    };
    pub const LITERAL: FieldContext = FieldContext {
        literal: true,
        recurse_to_literal: false,
        recursive_list: false,
    };
    pub const LIST: FieldContext = FieldContext {
        literal: false,
        recurse_to_literal: false,
        recursive_list: true,
    };
    pub const LITERAL_LIST: FieldContext = FieldContext {
        literal: false,
        recurse_to_literal: true,
        recursive_list: true,
    };
}

/// One keyword argument.
#[derive(Debug)]
pub struct FieldSpec {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub required: bool,
    pub context: FieldContext,
}

impl FieldSpec {
    pub fn accepts(&self, key: &str) -> bool {
        self.name == key || self.aliases.contains(&key)
    }
}

const fn field(name: &'static str, required: bool, context: FieldContext) -> FieldSpec {
    FieldSpec {
        name,
        aliases: &[],
        required,
        context,
    }
}

const fn aliased(
    name: &'static str,
    aliases: &'static [&'static str],
    required: bool,
    context: FieldContext,
) -> FieldSpec {
    FieldSpec {
        name,
        aliases,
        required,
        context,
    }
}

#[derive(Debug)]
pub enum ArgShape {
    /// Ordered arguments; `max` of `None` means unbounded.
    Positional {
        min: usize,
        max: Option<usize>,
        context: FieldContext,
    },
    /// Named arguments in declared order.
    Keyword { fields: &'static [FieldSpec] },
}

#[derive(Debug)]
pub struct KindSpec {
    pub kind: ExprKind,
    pub aliases: &'static [&'static str],
    pub shape: ArgShape,
    pub summary: &'static str,
}

impl KindSpec {
    pub fn fields(&self) -> &'static [FieldSpec] {
        match self.shape {
            ArgShape::Keyword { fields } => fields,
            ArgShape::Positional { .. } => &[],
        }
    }

    /// The field accepting `key`, by name or alias.
    pub fn field(&self, key: &str) -> Option<&'static FieldSpec> {
        self.fields().iter().find(|f| f.accepts(key))
    }

    pub fn is_keyword(&self) -> bool {
        matches!(self.shape, ArgShape::Keyword { .. })
    }
}

const fn positional(min: usize, max: Option<usize>) -> ArgShape {
    ArgShape::Positional {
        min,
        max,
        context: FieldContext::LIST,
    }
}

const CONDITIONAL_FIELDS: &[FieldSpec] = &[
    aliased("if", &["when"], true, FieldContext::AMBIENT),
    field("then", true, FieldContext::AMBIENT),
    aliased("else", &["otherwise"], false, FieldContext::AMBIENT),
];

const TYPE_CAST_FIELDS: &[FieldSpec] = &[
    field("input", true, FieldContext::AMBIENT),
    field("output_type", true, FieldContext::LITERAL),
];

const PARSE_FIELDS: &[FieldSpec] = &[
    field("input", true, FieldContext::AMBIENT),
    field("format", true, FieldContext::LITERAL),
    field("output_type", false, FieldContext::LITERAL),
];

const TIMESTAMP_FIELDS: &[FieldSpec] = &[
    field("date", false, FieldContext::AMBIENT),
    field("time", false, FieldContext::AMBIENT),
    field("input", false, FieldContext::AMBIENT),
    field("datetime", false, FieldContext::AMBIENT),
    field("year", false, FieldContext::AMBIENT),
    field("month", false, FieldContext::AMBIENT),
    field("day", false, FieldContext::AMBIENT),
    field("hour", false, FieldContext::AMBIENT),
    field("minute", false, FieldContext::AMBIENT),
    field("second", false, FieldContext::AMBIENT),
    field("microsecond", false, FieldContext::AMBIENT),
];

const SET_FIELDS: &[FieldSpec] = &[
    field("value", true, FieldContext::AMBIENT),
    field("set", true, FieldContext::LITERAL_LIST),
];

const RANGE_FIELDS: &[FieldSpec] = &[
    field("value", true, FieldContext::AMBIENT),
    field("min", false, FieldContext::AMBIENT),
    field("max", false, FieldContext::AMBIENT),
    field("min_inclusive", false, FieldContext::LITERAL),
    field("max_inclusive", false, FieldContext::LITERAL),
];

const REGEX_FIELDS: &[FieldSpec] = &[
    field("action", true, FieldContext::LITERAL),
    field("pattern", true, FieldContext::LITERAL),
    field("input", true, FieldContext::AMBIENT),
    field("group", false, FieldContext::LITERAL),
];

/// The registry, in [`ExprKind`] declaration order.
pub static KINDS: [KindSpec; 25] = [
    KindSpec {
        kind: ExprKind::Add,
        aliases: &["add", "sum", "plus"],
        shape: positional(2, None),
        summary: "sum of two or more values",
    },
    KindSpec {
        kind: ExprKind::Subtract,
        aliases: &["subtract", "minus", "sub"],
        shape: positional(2, Some(2)),
        summary: "first value minus the second",
    },
    KindSpec {
        kind: ExprKind::Multiply,
        aliases: &["multiply", "mul", "times"],
        shape: positional(2, None),
        summary: "product of two or more values",
    },
    KindSpec {
        kind: ExprKind::Divide,
        aliases: &["divide", "div"],
        shape: positional(2, Some(2)),
        summary: "first value divided by the second",
    },
    KindSpec {
        kind: ExprKind::Mean,
        aliases: &["mean", "avg"],
        shape: positional(1, None),
        summary: "arithmetic mean",
    },
    KindSpec {
        kind: ExprKind::Min,
        aliases: &["min"],
        shape: positional(1, None),
        summary: "smallest value",
    },
    KindSpec {
        kind: ExprKind::Max,
        aliases: &["max"],
        shape: positional(1, None),
        summary: "largest value",
    },
    KindSpec {
        kind: ExprKind::Equal,
        aliases: &["equal", "eq"],
        shape: positional(2, Some(2)),
        summary: "a == b",
    },
    KindSpec {
        kind: ExprKind::NotEqual,
        aliases: &["not_equal", "ne"],
        shape: positional(2, Some(2)),
        summary: "a != b",
    },
    KindSpec {
        kind: ExprKind::GreaterThan,
        aliases: &["greater_than", "gt"],
        shape: positional(2, Some(2)),
        summary: "a > b",
    },
    KindSpec {
        kind: ExprKind::GreaterThanOrEqual,
        aliases: &["greater_than_or_equal", "ge"],
        shape: positional(2, Some(2)),
        summary: "a >= b",
    },
    KindSpec {
        kind: ExprKind::LessThan,
        aliases: &["less_than", "lt"],
        shape: positional(2, Some(2)),
        summary: "a < b",
    },
    KindSpec {
        kind: ExprKind::LessThanOrEqual,
        aliases: &["less_than_or_equal", "le"],
        shape: positional(2, Some(2)),
        summary: "a <= b",
    },
    KindSpec {
        kind: ExprKind::And,
        aliases: &["and"],
        shape: positional(2, None),
        summary: "logical conjunction",
    },
    KindSpec {
        kind: ExprKind::Or,
        aliases: &["or"],
        shape: positional(2, None),
        summary: "logical disjunction",
    },
    KindSpec {
        kind: ExprKind::Not,
        aliases: &["not"],
        shape: positional(1, Some(1)),
        summary: "logical negation",
    },
    KindSpec {
        kind: ExprKind::Coalesce,
        aliases: &["coalesce"],
        shape: positional(1, None),
        summary: "first non-null value",
    },
    KindSpec {
        kind: ExprKind::Conditional,
        aliases: &["conditional", "if"],
        shape: ArgShape::Keyword {
            fields: CONDITIONAL_FIELDS,
        },
        summary: "`then` when `if` holds, otherwise `else` (null by default)",
    },
    KindSpec {
        kind: ExprKind::TypeCast,
        aliases: &["type_cast", "cast"],
        shape: ArgShape::Keyword {
            fields: TYPE_CAST_FIELDS,
        },
        summary: "convert `input` to `output_type`",
    },
    KindSpec {
        kind: ExprKind::ParseWithFormatString,
        aliases: &["parse_with_format_string", "parse"],
        shape: ArgShape::Keyword {
            fields: PARSE_FIELDS,
        },
        summary: "parse a string `input` with a strftime `format`",
    },
    KindSpec {
        kind: ExprKind::ResolveTimestamp,
        aliases: &["resolve_timestamp", "timestamp"],
        shape: ArgShape::Keyword {
            fields: TIMESTAMP_FIELDS,
        },
        summary: "assemble a timestamp from date and time components",
    },
    KindSpec {
        kind: ExprKind::ValueInLiteralSet,
        aliases: &["value_in_literal_set", "in_set", "is_in"],
        shape: ArgShape::Keyword { fields: SET_FIELDS },
        summary: "membership of `value` in a literal `set`",
    },
    KindSpec {
        kind: ExprKind::ValueInRange,
        aliases: &["value_in_range", "in_range", "between"],
        shape: ArgShape::Keyword {
            fields: RANGE_FIELDS,
        },
        summary: "`value` within `min`/`max` bounds",
    },
    KindSpec {
        kind: ExprKind::Regex,
        aliases: &["regex"],
        shape: ArgShape::Keyword {
            fields: REGEX_FIELDS,
        },
        summary: "extract, match or not-match a regular expression",
    },
    KindSpec {
        kind: ExprKind::StringInterpolate,
        aliases: &["string_interpolate", "format", "f"],
        shape: ArgShape::Positional {
            min: 1,
            max: None,
            context: FieldContext::LIST,
        },
        summary: "fill `{}` slots in a pattern with input values",
    },
];

/// A name that selects a kind, possibly fixing one of its fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Alias {
    pub name: &'static str,
    pub kind: ExprKind,
    /// Field pinned by the alias, e.g. `regex_extract` fixes `action`.
    pub preset: Option<(&'static str, &'static str)>,
}

const PRESET_ALIASES: &[Alias] = &[
    Alias {
        name: "regex_extract",
        kind: ExprKind::Regex,
        preset: Some(("action", "EXTRACT")),
    },
    Alias {
        name: "regex_match",
        kind: ExprKind::Regex,
        preset: Some(("action", "MATCH")),
    },
    Alias {
        name: "regex_not_match",
        kind: ExprKind::Regex,
        preset: Some(("action", "NOT_MATCH")),
    },
];

static ALIASES: LazyLock<HashMap<&'static str, Alias>> = LazyLock::new(|| {
    let mut table = HashMap::new();
    for spec in KINDS.iter() {
        for name in spec.aliases {
            table.insert(
                *name,
                Alias {
                    name: *name,
                    kind: spec.kind,
                    preset: None,
                },
            );
        }
    }
    for alias in PRESET_ALIASES {
        table.insert(alias.name, *alias);
    }
    table
});

/// Resolve an alias or canonical kind name, ignoring case.
///
/// # Examples
///
/// ```
/// use dftly::catalogue::{lookup, ExprKind};
///
/// assert_eq!(lookup("sum").map(|a| a.kind), Some(ExprKind::Add));
/// assert_eq!(lookup("VALUE_IN_RANGE").map(|a| a.kind), Some(ExprKind::ValueInRange));
/// assert!(lookup("frobnicate").is_none());
/// ```
pub fn lookup(name: &str) -> Option<Alias> {
    let lowered = name.to_ascii_lowercase();
    ALIASES.get(lowered.as_str()).copied()
}

/// Every alias, sorted by name.
pub fn aliases() -> Vec<Alias> {
    let mut all: Vec<Alias> = ALIASES.values().copied().collect();
    all.sort_by_key(|alias| alias.name);
    all
}

/// Output types accepted by `TYPE_CAST` and `PARSE_WITH_FORMAT_STRING`.
pub const TYPE_NAMES: &[&str] = &[
    "int8", "int16", "int32", "int64", "uint8", "uint16", "uint32", "uint64", "int", "float32",
    "float64", "float", "bool", "boolean", "str", "string", "utf8", "date", "datetime", "time",
    "duration", "categorical",
];

pub fn is_type_name(name: &str) -> bool {
    TYPE_NAMES.iter().any(|t| t.eq_ignore_ascii_case(name))
}

/// Split a `<type>_format` key into its type, e.g. `datetime_format` → `datetime`.
pub fn format_key_type(key: &str) -> Option<&str> {
    key.strip_suffix("_format").filter(|ty| is_type_name(ty))
}

/// Infer a parse output type from strftime directives.
pub fn infer_format_type(format: &str) -> &'static str {
    const TIME_DIRECTIVES: &[char] = &['H', 'I', 'M', 'S', 'f', 'p', 'T', 'R', 'X', 'c', 's', 'k', 'l'];
    let mut chars = format.chars();
    while let Some(c) = chars.next() {
        if c != '%' {
            continue;
        }
        // Skip width and precision modifiers like %3f or %-H
        let directive = chars
            .by_ref()
            .find(|d| !d.is_ascii_digit() && !matches!(*d, '-' | '_' | '.'));
        match directive {
            Some(d) if TIME_DIRECTIVES.contains(&d) => return "datetime",
            _ => {}
        }
    }
    "date"
}

/// Kinds whose field sets accept exactly these keys.
///
/// A kind matches when every key is one of its fields (or aliases) and every
/// required field is present. `STRING_INTERPOLATE` also matches
/// `{pattern, inputs}`.
pub fn match_field_set(keys: &BTreeSet<&str>) -> Vec<ExprKind> {
    let mut matches = Vec::new();
    for spec in KINDS.iter().filter(|spec| spec.is_keyword()) {
        let format_type_key = spec.kind == ExprKind::ParseWithFormatString
            && keys.iter().any(|key| format_key_type(key).is_some());
        let known = keys.iter().all(|key| {
            spec.field(key).is_some()
                || (spec.kind == ExprKind::ParseWithFormatString
                    && format_key_type(key).is_some())
        });
        let complete = spec.fields().iter().filter(|f| f.required).all(|f| {
            keys.iter().any(|key| f.accepts(key)) || (format_type_key && f.name == "format")
        });
        if known && complete {
            matches.push(spec.kind);
        }
    }
    if keys.contains("pattern") && keys.iter().all(|key| matches!(*key, "pattern" | "inputs")) {
        matches.push(ExprKind::StringInterpolate);
    }
    matches
}

/// Fill defaulted fields and normalise literal spellings.
///
/// - `CONDITIONAL` without `else` gets a null `else`
/// - `REGEX` actions are upper-cased; `EXTRACT` defaults to group 0
/// - `VALUE_IN_RANGE` bounds default to inclusive
/// - type names are lower-cased
pub fn finish(kind: ExprKind, arguments: Arguments) -> Expression {
    let arguments = match arguments {
        Arguments::Keyword(mut args) => {
            apply_defaults(kind, &mut args);
            Arguments::Keyword(args)
        }
        positional => positional,
    };
    Expression { kind, arguments }
}

fn apply_defaults(kind: ExprKind, args: &mut BTreeMap<String, Node>) {
    match kind {
        ExprKind::Conditional => {
            args.entry("else".to_string()).or_insert_with(Node::null);
        }
        ExprKind::Regex => {
            let action = args
                .get("action")
                .and_then(|node| node.as_literal())
                .and_then(|lit| lit.as_str())
                .and_then(RegexAction::from_name);
            if let Some(action) = action {
                args.insert("action".to_string(), Node::literal(action.as_str()));
                if action == RegexAction::Extract {
                    args.entry("group".to_string())
                        .or_insert_with(|| Node::literal(0));
                }
            }
        }
        ExprKind::ValueInRange => {
            if args.contains_key("min") {
                args.entry("min_inclusive".to_string())
                    .or_insert_with(|| Node::literal(true));
            }
            if args.contains_key("max") {
                args.entry("max_inclusive".to_string())
                    .or_insert_with(|| Node::literal(true));
            }
        }
        ExprKind::TypeCast | ExprKind::ParseWithFormatString => {
            let inferred = match (args.get("output_type"), args.get("format")) {
                (None, Some(Node::Literal(format))) => {
                    format.as_str().map(|f| infer_format_type(f).to_string())
                }
                (Some(Node::Literal(ty)), _) => ty.as_str().map(str::to_ascii_lowercase),
                _ => None,
            };
            if let Some(ty) = inferred {
                args.insert("output_type".to_string(), Node::literal(ty));
            }
        }
        _ => {}
    }
}
