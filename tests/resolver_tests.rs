// tests/resolver_tests.rs

use std::collections::BTreeMap;

use dftly::{
    Arguments, Context, ErrorKind, ExprKind, FailureMode, LiteralType, Node, ResolveError,
    ResolveOptions, ResolveResult, Resolver, Schema, resolve_mapping,
};
use serde_json::{Value, json};

fn schema(columns: &[(&str, Option<&str>)]) -> Schema {
    columns
        .iter()
        .map(|(name, ty)| (name.to_string(), ty.map(str::to_string)))
        .collect()
}

fn yaml(text: &str) -> Value {
    serde_yaml::from_str(text).unwrap()
}

fn resolve(value: Value, schema: Option<&Schema>) -> ResolveResult<Node> {
    Resolver::new().resolve(&value, Context::new(schema))
}

fn column(name: &str) -> Node {
    Node::column(name, None)
}

fn expression(node: &Node) -> (ExprKind, &Arguments) {
    match node {
        Node::Expression(expr) => (expr.kind, &expr.arguments),
        other => panic!("Expected expression, got {:?}", other),
    }
}

fn positional(kind: ExprKind, args: Vec<Node>) -> Node {
    Node::expression(kind, Arguments::Positional(args))
}

fn keyword(kind: ExprKind, args: Vec<(&str, Node)>) -> Node {
    Node::expression(
        kind,
        Arguments::Keyword(
            args.into_iter()
                .map(|(name, node)| (name.to_string(), node))
                .collect(),
        ),
    )
}

// ============================================================================
// Scalars and strings
// ============================================================================

#[test]
fn test_scalar_literals() {
    let test_cases = vec![
        (json!(1234), LiteralType::Int),
        (json!(12.34), LiteralType::Float),
        (json!(true), LiteralType::Bool),
        (json!(null), LiteralType::Null),
    ];

    for (value, ty) in test_cases {
        let node = resolve(value.clone(), None).unwrap();
        let literal = node.as_literal().expect("literal");
        assert_eq!(literal.ty(), ty, "Failed for value: {}", value);
        assert_eq!(literal.value(), &value);
    }
}

#[test]
fn test_schema_columns() {
    let schema = schema(&[("foobar123", None), ("bar", Some("string"))]);

    assert_eq!(resolve(json!("foobar123"), Some(&schema)).unwrap(), column("foobar123"));
    assert_eq!(
        resolve(json!("bar"), Some(&schema)).unwrap(),
        Node::column("bar", Some("string".to_string()))
    );
    assert_eq!(resolve(json!("qux"), Some(&schema)).unwrap(), Node::literal("qux"));
}

#[test]
fn test_column_name_with_spaces() {
    let schema = schema(&[("heart rate", Some("float"))]);
    assert_eq!(
        resolve(json!("heart rate"), Some(&schema)).unwrap(),
        Node::column("heart rate", Some("float".to_string()))
    );
}

#[test]
fn test_string_fallbacks() {
    assert_eq!(resolve(json!("hello world"), None).unwrap(), Node::literal("hello world"));
    assert_eq!(resolve(json!("2024-01-01"), None).unwrap(), Node::literal("2024-01-01"));
    assert_eq!(resolve(json!("1 +"), None).unwrap(), Node::literal("1 +"));
    assert_eq!(resolve(json!(""), None).unwrap(), Node::literal(""));
}

#[test]
fn test_expression_strings() {
    let node = resolve(json!("@col1 + @col2"), None).unwrap();
    assert_eq!(node, positional(ExprKind::Add, vec![column("col1"), column("col2")]));

    let node = resolve(json!("@col1 > (@col2 - 3) * 3"), None).unwrap();
    assert_eq!(
        node,
        positional(
            ExprKind::GreaterThan,
            vec![
                column("col1"),
                positional(
                    ExprKind::Multiply,
                    vec![
                        positional(ExprKind::Subtract, vec![column("col2"), Node::literal(3)]),
                        Node::literal(3),
                    ]
                ),
            ]
        )
    );
}

#[test]
fn test_bare_names_need_schema() {
    let schema = schema(&[("dose", None)]);

    let node = resolve(json!("dose * 2"), Some(&schema)).unwrap();
    assert_eq!(node, positional(ExprKind::Multiply, vec![column("dose"), Node::literal(2)]));

    // Without a schema `dose` is a word, and a word times two is no expression
    let node = resolve(json!("dose * 2"), None).unwrap();
    assert_eq!(node, Node::literal("dose * 2"));

    let node = resolve(json!("first + last"), None).unwrap();
    assert_eq!(
        node,
        positional(ExprKind::Add, vec![Node::literal("first"), Node::literal("last")])
    );
}

#[test]
fn test_prose_strings_stay_literal() {
    let test_cases = vec!["n/a", "not applicable", "yes or no", "high - low", "-x"];

    for input in test_cases {
        assert_eq!(
            resolve(json!(input), None).unwrap(),
            Node::literal(input),
            "Failed for input: {}",
            input
        );
    }

    // A declared column keeps the expression reading
    let schema = schema(&[("n", None), ("a", None)]);
    assert_eq!(
        resolve(json!("n/a"), Some(&schema)).unwrap(),
        positional(ExprKind::Divide, vec![column("n"), column("a")])
    );
}

#[test]
fn test_prose_strings_do_not_abort_mapping() {
    let input = json!({"status": "n/a", "answer": "yes or no", "sum": "@a + 1"});
    let resolution = resolve_mapping(&input, None, &ResolveOptions::default()).unwrap();
    assert!(resolution.is_complete());
    assert_eq!(resolution.entries["status"], Node::literal("n/a"));
    assert_eq!(resolution.entries["answer"], Node::literal("yes or no"));
    assert_eq!(expression(&resolution.entries["sum"]).0, ExprKind::Add);
}

#[test]
fn test_explicit_operand_errors_still_raise() {
    assert!(resolve(json!("@a and 5"), None).unwrap_err().is_validation());
    assert!(resolve(json!("@a - 'x'"), None).unwrap_err().is_validation());
}

#[test]
fn test_column_refs_take_schema_type() {
    let schema = schema(&[("hr", Some("float"))]);
    let node = resolve(json!("@hr + @other"), Some(&schema)).unwrap();
    assert_eq!(
        node,
        positional(
            ExprKind::Add,
            vec![Node::column("hr", Some("float".to_string())), column("other")]
        )
    );
}

#[test]
fn test_string_interpolation() {
    let schema = schema(&[("col1", None)]);
    let node = resolve(json!("hey {col1}!"), Some(&schema)).unwrap();
    assert_eq!(
        node,
        positional(
            ExprKind::StringInterpolate,
            vec![Node::literal("hey {}!"), column("col1")]
        )
    );
}

#[test]
fn test_interpolation_keeps_brace_escapes() {
    let schema = schema(&[("a", None)]);
    let node = resolve(json!("{{literal}} {a} rest"), Some(&schema)).unwrap();
    assert_eq!(
        node,
        positional(
            ExprKind::StringInterpolate,
            vec![Node::literal("{{literal}} {} rest"), column("a")]
        )
    );
}

#[test]
fn test_negative_literals_fold() {
    assert_eq!(resolve(json!("-5"), None).unwrap(), Node::literal(-5));
    assert_eq!(resolve(json!("-2.5"), None).unwrap(), Node::literal(-2.5));
    assert_eq!(
        resolve(json!("-@x"), None).unwrap(),
        positional(ExprKind::Subtract, vec![Node::literal(0), column("x")])
    );
}

// ============================================================================
// Lists
// ============================================================================

#[test]
fn test_list_is_coalesce() {
    let node = resolve(json!(["@a", "@b", 0]), None).unwrap();
    assert_eq!(
        node,
        positional(ExprKind::Coalesce, vec![column("a"), column("b"), Node::literal(0)])
    );
}

#[test]
fn test_conditional_chain() {
    let value = yaml(
        r#"
- if: "@a > 0"
  then: positive
- when: "@a < 0"
  then: negative
- zero
"#,
    );
    let node = resolve(value, None).unwrap();

    let outer = node.as_expression().expect("expression");
    assert_eq!(outer.kind, ExprKind::Conditional);
    assert_eq!(outer.arg("then"), Some(&Node::literal("positive")));
    assert_eq!(
        outer.arg("if"),
        Some(&positional(ExprKind::GreaterThan, vec![column("a"), Node::literal(0)]))
    );

    let inner = outer.arg("else").and_then(Node::as_expression).expect("nested conditional");
    assert_eq!(inner.kind, ExprKind::Conditional);
    assert_eq!(inner.arg("then"), Some(&Node::literal("negative")));
    assert_eq!(inner.arg("else"), Some(&Node::literal("zero")));
}

#[test]
fn test_conditional_chain_default_else() {
    let node = resolve(json!([{"if": "@p", "then": "@a"}]), None).unwrap();
    assert_eq!(
        node,
        keyword(
            ExprKind::Conditional,
            vec![("if", column("p")), ("then", column("a")), ("else", Node::null())]
        )
    );
}

#[test]
fn test_conditional_chain_terminal() {
    let node = resolve(json!([{"if": "@p", "then": "@a"}, "@b"]), None).unwrap();
    assert_eq!(
        node,
        keyword(
            ExprKind::Conditional,
            vec![("if", column("p")), ("then", column("a")), ("else", column("b"))]
        )
    );
}

#[test]
fn test_empty_list_is_null() {
    assert_eq!(resolve(json!([]), None).unwrap(), Node::null());

    let node = resolve(json!({"if": "@p", "then": []}), None).unwrap();
    assert_eq!(node.as_expression().and_then(|e| e.arg("then")), Some(&Node::null()));
}

#[test]
fn test_non_chain_list_with_link_is_coalesce() {
    let node = resolve(json!(["@b", {"if": "@p", "then": "@a"}]), None).unwrap();
    let (kind, args) = expression(&node);
    assert_eq!(kind, ExprKind::Coalesce);
    assert_eq!(args.len(), 2);
}

// ============================================================================
// Maps
// ============================================================================

#[test]
fn test_positional_shorthand() {
    let node = resolve(json!({"add": ["@a", 1]}), None).unwrap();
    assert_eq!(node, positional(ExprKind::Add, vec![column("a"), Node::literal(1)]));

    let node = resolve(json!({"SUM": ["@a", 1]}), None).unwrap();
    assert_eq!(expression(&node).0, ExprKind::Add);

    let node = resolve(json!({"not": "@flag"}), None).unwrap();
    assert_eq!(node, positional(ExprKind::Not, vec![column("flag")]));
}

#[test]
fn test_positional_elements_resolve_independently() {
    let node = resolve(json!({"max": ["@a", ["@b", 0], {"if": "@p", "then": 1}]}), None).unwrap();
    let (kind, args) = expression(&node);
    assert_eq!(kind, ExprKind::Max);
    match args {
        Arguments::Positional(args) => {
            assert_eq!(args[0], column("a"));
            assert_eq!(expression(&args[1]).0, ExprKind::Coalesce);
            assert_eq!(expression(&args[2]).0, ExprKind::Conditional);
        }
        other => panic!("Expected positional arguments, got {:?}", other),
    }
}

#[test]
fn test_keyword_shorthand() {
    let node = resolve(json!({"cast": {"input": "@x", "output_type": "float"}}), None).unwrap();
    assert_eq!(
        node,
        keyword(
            ExprKind::TypeCast,
            vec![("input", column("x")), ("output_type", Node::literal("float"))]
        )
    );

    let node = resolve(json!({"cast": ["@x", "INT"]}), None).unwrap();
    assert_eq!(
        node,
        keyword(
            ExprKind::TypeCast,
            vec![("input", column("x")), ("output_type", Node::literal("int"))]
        )
    );
}

#[test]
fn test_literal_field_ignores_schema() {
    let schema = schema(&[("x", None), ("float", None)]);
    let node = resolve(json!({"cast": {"input": "x", "output_type": "float"}}), Some(&schema)).unwrap();
    assert_eq!(
        node,
        keyword(
            ExprKind::TypeCast,
            vec![("input", column("x")), ("output_type", Node::literal("float"))]
        )
    );
}

#[test]
fn test_field_set_matching() {
    let node = resolve(json!({"if": "@a > 1", "then": 1, "else": 0}), None).unwrap();
    assert_eq!(expression(&node).0, ExprKind::Conditional);

    let node = resolve(json!({"when": "@a", "then": 1, "otherwise": 0}), None).unwrap();
    assert_eq!(
        node,
        keyword(
            ExprKind::Conditional,
            vec![("if", column("a")), ("then", Node::literal(1)), ("else", Node::literal(0))]
        )
    );

    let node = resolve(json!({"value": "@x", "set": [1, 2, 3]}), None).unwrap();
    assert_eq!(
        node,
        keyword(
            ExprKind::ValueInLiteralSet,
            vec![("value", column("x")), ("set", Node::literal(json!([1, 2, 3])))]
        )
    );
}

#[test]
fn test_set_members_stay_literal() {
    let node = resolve(json!({"in_set": {"value": "@x", "set": ["a + b", "@c", [1, 2]]}}), None).unwrap();
    let expr = node.as_expression().expect("expression");
    assert_eq!(
        expr.arg("set"),
        Some(&Node::literal(json!(["a + b", "@c", [1, 2]])))
    );
}

#[test]
fn test_range_defaults_inclusive() {
    let node = resolve(json!({"between": {"value": "@x", "min": 0, "max": 10}}), None).unwrap();
    let expr = node.as_expression().expect("expression");
    assert_eq!(expr.kind, ExprKind::ValueInRange);
    assert_eq!(expr.arg("min_inclusive"), Some(&Node::literal(true)));
    assert_eq!(expr.arg("max_inclusive"), Some(&Node::literal(true)));

    let node = resolve(json!({"value": "@x", "max": 10, "max_inclusive": false}), None).unwrap();
    let expr = node.as_expression().expect("expression");
    assert_eq!(expr.arg("min_inclusive"), None);
    assert_eq!(expr.arg("max_inclusive"), Some(&Node::literal(false)));
}

#[test]
fn test_column_shorthand() {
    let schema = schema(&[("hr", Some("float"))]);
    assert_eq!(
        resolve(json!({"column": "hr"}), Some(&schema)).unwrap(),
        Node::column("hr", Some("float".to_string()))
    );
    assert_eq!(resolve(json!({"column": "other"}), Some(&schema)).unwrap(), column("other"));
}

#[test]
fn test_loose_expression_form() {
    let node = resolve(
        json!({"expression": {"type": "ADD", "arguments": ["@a", 2]}}),
        None,
    )
    .unwrap();
    assert_eq!(node, positional(ExprKind::Add, vec![column("a"), Node::literal(2)]));
}

#[test]
fn test_unknown_expression_type() {
    let err = resolve(json!({"expression": {"type": "FROBNICATE", "arguments": []}}), None).unwrap_err();
    assert!(err.is_structural());
    assert!(err.to_string().contains("FROBNICATE"));
}

#[test]
fn test_unmatched_keys() {
    let err = resolve(json!({"foo": 1, "bar": 2}), None).unwrap_err();
    match &err.kind {
        ErrorKind::Structural(message) => assert!(message.contains("bar, foo"), "message: {}", message),
        other => panic!("Expected structural error, got {:?}", other),
    }
}

#[test]
fn test_empty_mapping() {
    assert!(resolve(json!({}), None).unwrap_err().is_structural());
}

#[test]
fn test_unknown_field_for_alias() {
    let err = resolve(json!({"cast": {"input": "@x", "typo": 1}}), None).unwrap_err();
    assert!(err.is_structural());
    assert!(err.to_string().contains("typo"));
}

#[test]
fn test_duplicate_field_via_alias() {
    let err = resolve(json!({"if": "@a", "when": "@b", "then": 1}), None).unwrap_err();
    assert!(err.is_structural());
}

// ============================================================================
// Parsing with format strings
// ============================================================================

#[test]
fn test_compressed_parse_form() {
    let schema = schema(&[("charttime", Some("string"))]);
    let node = resolve(
        json!({"charttime": {"datetime_format": "%Y-%m-%d %H:%M"}}),
        Some(&schema),
    )
    .unwrap();
    assert_eq!(
        node,
        keyword(
            ExprKind::ParseWithFormatString,
            vec![
                ("input", Node::column("charttime", Some("string".to_string()))),
                ("format", Node::literal("%Y-%m-%d %H:%M")),
                ("output_type", Node::literal("datetime")),
            ]
        )
    );
}

#[test]
fn test_compressed_parse_key_is_always_a_column() {
    let expected = |name: &str| {
        keyword(
            ExprKind::ParseWithFormatString,
            vec![
                ("input", column(name)),
                ("format", Node::literal("%Y-%m-%d")),
                ("output_type", Node::literal("date")),
            ],
        )
    };

    let node = resolve(json!({"charttime": {"date_format": "%Y-%m-%d"}}), None).unwrap();
    assert_eq!(node, expected("charttime"));

    let node = resolve(json!({"chart-time": {"date_format": "%Y-%m-%d"}}), None).unwrap();
    assert_eq!(node, expected("chart-time"));

    let other = schema(&[("other", Some("int"))]);
    let node = resolve(json!({"charttime": {"date_format": "%Y-%m-%d"}}), Some(&other)).unwrap();
    assert_eq!(node, expected("charttime"));
}

#[test]
fn test_type_format_key() {
    let node = resolve(json!({"input": "@ts", "date_format": "%Y"}), None).unwrap();
    let expr = node.as_expression().expect("expression");
    assert_eq!(expr.kind, ExprKind::ParseWithFormatString);
    assert_eq!(expr.arg("output_type"), Some(&Node::literal("date")));
    assert_eq!(expr.arg("format"), Some(&Node::literal("%Y")));
}

#[test]
fn test_parse_alias_infers_type() {
    let node = resolve(json!({"parse": {"input": "@ts", "format": "%H:%M"}}), None).unwrap();
    let expr = node.as_expression().expect("expression");
    assert_eq!(expr.arg("output_type"), Some(&Node::literal("datetime")));
}

#[test]
fn test_cast_with_format_string() {
    let node = resolve(json!(r#"@ts as "%Y-%m-%d""#), None).unwrap();
    assert_eq!(
        node,
        keyword(
            ExprKind::ParseWithFormatString,
            vec![
                ("input", column("ts")),
                ("format", Node::literal("%Y-%m-%d")),
                ("output_type", Node::literal("date")),
            ]
        )
    );
}

// ============================================================================
// Timestamps
// ============================================================================

#[test]
fn test_timestamp_with_time_literal() {
    let schema = schema(&[("charttime", Some("date"))]);
    let node = resolve(json!("charttime @ 11:59:59 p.m."), Some(&schema)).unwrap();
    assert_eq!(
        node,
        keyword(
            ExprKind::ResolveTimestamp,
            vec![
                ("input", Node::column("charttime", Some("date".to_string()))),
                ("hour", Node::literal(23)),
                ("minute", Node::literal(59)),
                ("second", Node::literal(59)),
            ]
        )
    );
}

#[test]
fn test_timestamp_with_time_column() {
    let node = resolve(json!("@d @ @t"), None).unwrap();
    assert_eq!(
        node,
        keyword(
            ExprKind::ResolveTimestamp,
            vec![("input", column("d")), ("time", column("t"))]
        )
    );
}

#[test]
fn test_standalone_time_literal() {
    let node = resolve(json!("08:30"), None).unwrap();
    assert_eq!(
        node,
        keyword(
            ExprKind::TypeCast,
            vec![("input", Node::literal("08:30:00")), ("output_type", Node::literal("time"))]
        )
    );
}

#[test]
fn test_timestamp_map_form() {
    let node = resolve(json!({"date": "@d", "time": "@t"}), None).unwrap();
    assert_eq!(
        node,
        keyword(
            ExprKind::ResolveTimestamp,
            vec![("date", column("d")), ("time", column("t"))]
        )
    );
}

// ============================================================================
// Regex
// ============================================================================

#[test]
fn test_extract_expression() {
    let node = resolve(json!(r"extract group 1 of /(\d+)\/(\d+)/ from @bp"), None).unwrap();
    assert_eq!(
        node,
        keyword(
            ExprKind::Regex,
            vec![
                ("action", Node::literal("EXTRACT")),
                ("pattern", Node::literal(r"(\d+)\/(\d+)")),
                ("group", Node::literal(1)),
                ("input", column("bp")),
            ]
        )
    );
}

#[test]
fn test_extract_defaults_group_zero() {
    let node = resolve(json!({"regex_extract": [r"\d+", "@x"]}), None).unwrap();
    let expr = node.as_expression().expect("expression");
    assert_eq!(expr.arg("action"), Some(&Node::literal("EXTRACT")));
    assert_eq!(expr.arg("group"), Some(&Node::literal(0)));
    assert_eq!(expr.arg("pattern"), Some(&Node::literal(r"\d+")));
}

#[test]
fn test_match_shorthand() {
    let node = resolve(json!({"regex_match": {"pattern": "^a", "input": "@x"}}), None).unwrap();
    assert_eq!(
        node,
        keyword(
            ExprKind::Regex,
            vec![
                ("action", Node::literal("MATCH")),
                ("pattern", Node::literal("^a")),
                ("input", column("x")),
            ]
        )
    );

    let node = resolve(json!({"regex": {"action": "not_match", "pattern": "^a", "input": "@x"}}), None).unwrap();
    let expr = node.as_expression().expect("expression");
    assert_eq!(expr.arg("action"), Some(&Node::literal("NOT_MATCH")));
}

#[test]
fn test_match_expression() {
    let node = resolve(json!("match foo against @name"), None).unwrap();
    let expr = node.as_expression().expect("expression");
    assert_eq!(expr.arg("action"), Some(&Node::literal("MATCH")));
    assert_eq!(expr.arg("group"), None);
}

// ============================================================================
// Grammar lowering
// ============================================================================

#[test]
fn test_membership_lowering() {
    let node = resolve(json!("@x in {1, 2, foo}"), None).unwrap();
    assert_eq!(
        node,
        keyword(
            ExprKind::ValueInLiteralSet,
            vec![("value", column("x")), ("set", Node::literal(json!([1, 2, "foo"])))]
        )
    );

    let node = resolve(json!("@x in [0, 10)"), None).unwrap();
    assert_eq!(
        node,
        keyword(
            ExprKind::ValueInRange,
            vec![
                ("value", column("x")),
                ("min", Node::literal(0)),
                ("max", Node::literal(10)),
                ("min_inclusive", Node::literal(true)),
                ("max_inclusive", Node::literal(false)),
            ]
        )
    );
}

#[test]
fn test_set_member_must_be_literal() {
    let err = resolve(json!("@x in {@y}"), None).unwrap_err();
    assert!(err.is_structural());
}

#[test]
fn test_conditional_lowering() {
    let node = resolve(json!("@a if @flag else @b"), None).unwrap();
    assert_eq!(
        node,
        keyword(
            ExprKind::Conditional,
            vec![("if", column("flag")), ("then", column("a")), ("else", column("b"))]
        )
    );
}

#[test]
fn test_function_calls() {
    let node = resolve(json!("coalesce(@a, @b)"), None).unwrap();
    assert_eq!(node, positional(ExprKind::Coalesce, vec![column("a"), column("b")]));

    let node = resolve(json!("in_range(@x, 0, 10)"), None).unwrap();
    let expr = node.as_expression().expect("expression");
    assert_eq!(expr.kind, ExprKind::ValueInRange);
    assert_eq!(expr.arg("max"), Some(&Node::literal(10)));

    let node = resolve(json!("cast(@x, float)"), None).unwrap();
    assert_eq!(
        node,
        keyword(
            ExprKind::TypeCast,
            vec![("input", column("x")), ("output_type", Node::literal("float"))]
        )
    );

    let node = resolve(json!(r#"format("{} mg", @dose)"#), None).unwrap();
    assert_eq!(
        node,
        positional(ExprKind::StringInterpolate, vec![Node::literal("{} mg"), column("dose")])
    );
}

#[test]
fn test_unknown_function() {
    let err = resolve(json!("frobnicate(1)"), None).unwrap_err();
    assert!(err.to_string().contains("unknown function `frobnicate`"));
}

#[test]
fn test_logical_lowering() {
    let node = resolve(json!("@a and not @b"), None).unwrap();
    assert_eq!(
        node,
        positional(
            ExprKind::And,
            vec![column("a"), positional(ExprKind::Not, vec![column("b")])]
        )
    );
}

// ============================================================================
// Strict parsing
// ============================================================================

#[test]
fn test_resolve_expression_is_strict() {
    let resolver = Resolver::new();
    let err = resolver.resolve_expression("1 +", Context::new(None)).unwrap_err();
    assert!(err.is_syntax());

    let node = resolver.resolve_expression("@a * 2", Context::new(None)).unwrap();
    assert_eq!(node, positional(ExprKind::Multiply, vec![column("a"), Node::literal(2)]));
}

// ============================================================================
// Mappings and error paths
// ============================================================================

#[test]
fn test_resolve_mapping() {
    let input = yaml(
        r#"
total: "@a + @b"
label: "patient {id}"
flag:
  value: "@a"
  set: [1, 2]
"#,
    );
    let schema = schema(&[("a", None), ("b", None), ("id", Some("int"))]);
    let resolution = resolve_mapping(&input, Some(&schema), &ResolveOptions::default()).unwrap();

    assert!(resolution.is_complete());
    assert_eq!(resolution.entries.len(), 3);
    assert_eq!(expression(&resolution.entries["total"]).0, ExprKind::Add);
    assert_eq!(expression(&resolution.entries["label"]).0, ExprKind::StringInterpolate);
    assert_eq!(expression(&resolution.entries["flag"]).0, ExprKind::ValueInLiteralSet);
}

#[test]
fn test_mapping_must_be_mapping() {
    let err = resolve_mapping(&json!([1, 2]), None, &ResolveOptions::default()).unwrap_err();
    assert!(err.is_structural());
    assert!(err.path.is_root());
}

#[test]
fn test_error_path_through_arguments() {
    let input = json!({"a": {"add": [1, {"foo": 1, "bar": 2}]}});
    let err = resolve_mapping(&input, None, &ResolveOptions::default()).unwrap_err();
    assert_eq!(err.path.to_string(), "a -> add -> 1");
}

#[test]
fn test_error_path_through_chain() {
    let input = json!({"a": [{"if": {"foo": 1, "bar": 2}, "then": 1}]});
    let err = resolve_mapping(&input, None, &ResolveOptions::default()).unwrap_err();
    assert_eq!(err.path.to_string(), "a -> 0 -> if");
}

#[test]
fn test_fail_fast_stops_at_first_failure() {
    let input = json!({"a": {"foo": 1, "bar": 2}, "b": 1});
    let err = resolve_mapping(&input, None, &ResolveOptions::default()).unwrap_err();
    assert_eq!(err.path.to_string(), "a");
}

#[test]
fn test_isolate_collects_failures() {
    let input = json!({"a": {"foo": 1, "bar": 2}, "b": 1, "c": {"sub": [1]}});
    let options = ResolveOptions::default().isolate();
    assert_eq!(options.failure_mode, FailureMode::Isolate);

    let resolution = resolve_mapping(&input, None, &options).unwrap();
    assert!(!resolution.is_complete());
    assert_eq!(resolution.entries.keys().map(String::as_str).collect::<Vec<_>>(), vec!["b"]);
    assert_eq!(resolution.failures.keys().map(String::as_str).collect::<Vec<_>>(), vec!["a", "c"]);
    assert!(resolution.failures.values().all(ResolveError::is_structural));
}

#[test]
fn test_validate_columns_option() {
    let schema = schema(&[("a", Some("int"))]);
    let input = json!({"x": "@a + @missing"});

    let resolution = resolve_mapping(&input, Some(&schema), &ResolveOptions::default()).unwrap();
    assert_eq!(resolution.entries.len(), 1);

    let options = ResolveOptions::default().with_column_validation();
    let err = resolve_mapping(&input, Some(&schema), &options).unwrap_err();
    match &err.kind {
        ErrorKind::Schema(message) => assert!(message.contains("missing")),
        other => panic!("Expected schema error, got {:?}", other),
    }
}

#[test]
fn test_options_from_yaml() {
    let options: ResolveOptions = serde_yaml::from_str("failure_mode: isolate\nvalidate_columns: true").unwrap();
    assert_eq!(options.failure_mode, FailureMode::Isolate);
    assert!(options.validate_columns);

    let options: ResolveOptions = serde_yaml::from_str("{}").unwrap();
    assert_eq!(options, ResolveOptions::default());

    assert!(serde_yaml::from_str::<ResolveOptions>("mode: isolate").is_err());
}

#[test]
fn test_output_is_deterministic() {
    let mut entries = BTreeMap::new();
    entries.insert("b".to_string(), column("x"));
    entries.insert("a".to_string(), Node::literal(1));
    assert_eq!(
        dftly::to_json(&entries).unwrap(),
        r#"{"a":{"literal":1},"b":{"column":{"name":"x","type":null}}}"#
    );
}
