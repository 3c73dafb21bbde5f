// tests/lexer_tests.rs

use dftly::ast::{TimeOfDay, Token};
use dftly::lexer::{Lexer, tokenize};

fn single(input: &str) -> Token {
    let mut lexer = Lexer::new(input);
    let token = lexer.next_token().unwrap();
    assert_eq!(lexer.next_token().unwrap(), Token::Eof, "trailing input in {:?}", input);
    token
}

fn time(hour: u32, minute: u32, second: u32, microsecond: u32) -> Token {
    Token::Time(TimeOfDay {
        hour,
        minute,
        second,
        microsecond,
    })
}

// ============================================================================
// Symbols
// ============================================================================

#[test]
fn test_symbol_tokens() {
    let test_cases = vec![
        ("||", Token::Or),
        ("&&", Token::And),
        ("!", Token::Not),
        ("==", Token::EqEq),
        ("!=", Token::NotEq),
        ("<", Token::Lt),
        ("<=", Token::LtEq),
        (">", Token::Gt),
        (">=", Token::GtEq),
        ("+", Token::Plus),
        ("-", Token::Minus),
        ("*", Token::Star),
        ("/", Token::Slash),
        ("@", Token::At),
        ("(", Token::LParen),
        (")", Token::RParen),
        ("[", Token::LBracket),
        ("]", Token::RBracket),
        ("{", Token::LBrace),
        ("}", Token::RBrace),
        (",", Token::Comma),
    ];

    for (input, expected) in test_cases {
        assert_eq!(single(input), expected, "Failed for input: {}", input);
    }
}

#[test]
fn test_longest_symbol_wins() {
    assert_eq!(
        tokenize("<=<>=>").unwrap(),
        vec![Token::LtEq, Token::Lt, Token::GtEq, Token::Gt]
    );
    assert_eq!(tokenize("!!=").unwrap(), vec![Token::Not, Token::NotEq]);
}

// ============================================================================
// Keywords
// ============================================================================

#[test]
fn test_keywords_case_insensitive() {
    let test_cases = vec![
        ("AND", Token::And),
        ("Or", Token::Or),
        ("NOT", Token::Not),
        ("In", Token::In),
        ("as", Token::As),
        ("IF", Token::If),
        ("Else", Token::Else),
        ("EXTRACT", Token::Extract),
        ("group", Token::Group),
        ("OF", Token::Of),
        ("From", Token::From),
        ("match", Token::Match),
        ("Against", Token::Against),
        ("TRUE", Token::Boolean(true)),
        ("false", Token::Boolean(false)),
        ("NULL", Token::Null),
    ];

    for (input, expected) in test_cases {
        assert_eq!(single(input), expected, "Failed for input: {}", input);
    }
}

#[test]
fn test_keyword_prefixes_are_identifiers() {
    let test_cases = vec!["android", "order", "iffy", "notable", "inner", "asset", "nullable", "truely"];

    for input in test_cases {
        assert_eq!(single(input), Token::Identifier(input.to_string()), "Failed for input: {}", input);
    }
}

#[test]
fn test_not_match_compound() {
    assert_eq!(single("not match"), Token::NotMatch);
    assert_eq!(single("NOT\tMATCH"), Token::NotMatch);
    assert_eq!(
        tokenize("not matched").unwrap(),
        vec![Token::Not, Token::Identifier("matched".to_string())]
    );
}

// ============================================================================
// Numbers
// ============================================================================

#[test]
fn test_integers() {
    assert_eq!(single("42"), Token::Integer(42));
    assert_eq!(single("0"), Token::Integer(0));
    assert_eq!(single("9223372036854775807"), Token::Integer(i64::MAX));
}

#[test]
fn test_integer_overflow_is_error() {
    let mut lexer = Lexer::new("99999999999999999999");
    let err = lexer.next_token().unwrap_err();
    assert!(err.message.contains("out of range"));
}

#[test]
fn test_no_leading_zeros() {
    assert_eq!(
        tokenize("007").unwrap(),
        vec![Token::Integer(0), Token::Integer(0), Token::Integer(7)]
    );
}

#[test]
fn test_floats() {
    assert_eq!(single("3.14"), Token::Float(3.14));
    assert_eq!(single("1e3"), Token::Float(1000.0));
    assert_eq!(single("2.5E-1"), Token::Float(0.25));
}

// ============================================================================
// Strings
// ============================================================================

#[test]
fn test_strings() {
    assert_eq!(single(r#""hello""#), Token::String("hello".to_string()));
    assert_eq!(single("'hello'"), Token::String("hello".to_string()));
    assert_eq!(single(r#""""#), Token::String(String::new()));
}

#[test]
fn test_string_escapes() {
    assert_eq!(single(r#""a\nb""#), Token::String("a\nb".to_string()));
    assert_eq!(single(r#""say \"hi\"""#), Token::String("say \"hi\"".to_string()));
    assert_eq!(single(r"'it\'s'"), Token::String("it's".to_string()));
    // Unknown escapes keep their backslash
    assert_eq!(single(r#""\d+""#), Token::String(r"\d+".to_string()));
}

#[test]
fn test_unterminated_string() {
    let mut lexer = Lexer::new(r#"@a == "open"#);
    lexer.next_token().unwrap();
    lexer.next_token().unwrap();
    let err = lexer.next_token().unwrap_err();
    assert!(err.message.contains("unterminated"));
    assert_eq!(err.position.column, 7);
}

// ============================================================================
// Time literals
// ============================================================================

#[test]
fn test_time_literals() {
    assert_eq!(single("11:59"), time(11, 59, 0, 0));
    assert_eq!(single("11:59:59"), time(11, 59, 59, 0));
    assert_eq!(single("08:30:15.25"), time(8, 30, 15, 250_000));
    assert_eq!(single("11:59:59 p.m."), time(23, 59, 59, 0));
    assert_eq!(single("11:59 pm"), time(23, 59, 0, 0));
    assert_eq!(single("7:05AM"), time(7, 5, 0, 0));
    assert_eq!(single("12:00 am"), time(0, 0, 0, 0));
    assert_eq!(single("12:00 p.m."), time(12, 0, 0, 0));
}

#[test]
fn test_time_outranks_integer() {
    assert_eq!(
        tokenize("d @ 11:59").unwrap(),
        vec![Token::Identifier("d".to_string()), Token::At, time(11, 59, 0, 0)]
    );
}

#[test]
fn test_invalid_times() {
    for input in ["24:00", "13:00 pm", "0:30 am", "10:60", "10:30:61"] {
        let mut lexer = Lexer::new(input);
        assert!(lexer.next_token().is_err(), "Expected error for input: {}", input);
    }
}

// ============================================================================
// Names
// ============================================================================

#[test]
fn test_column_refs() {
    assert_eq!(single("@col1"), Token::ColumnRef("col1".to_string()));
    assert_eq!(single(r#"@"my col""#), Token::ColumnRef("my col".to_string()));
    assert_eq!(single("@'dose (mg)'"), Token::ColumnRef("dose (mg)".to_string()));
}

#[test]
fn test_bare_at_is_symbol() {
    assert_eq!(
        tokenize("@ x").unwrap(),
        vec![Token::At, Token::Identifier("x".to_string())]
    );
}

// ============================================================================
// Regex mode
// ============================================================================

#[test]
fn test_regex_slash_delimited() {
    let mut lexer = Lexer::new(r"/(\d+)\/(\d+)/ from @bp");
    assert_eq!(
        lexer.next_regex(false).unwrap(),
        Token::Regex(r"(\d+)\/(\d+)".to_string())
    );
    assert_eq!(lexer.next_token().unwrap(), Token::From);
    assert_eq!(lexer.next_token().unwrap(), Token::ColumnRef("bp".to_string()));
}

#[test]
fn test_regex_quoted() {
    let mut lexer = Lexer::new(r#""^\s*$" against @note"#);
    assert_eq!(lexer.next_regex(false).unwrap(), Token::Regex(r"^\s*$".to_string()));
    assert_eq!(lexer.next_token().unwrap(), Token::Against);

    let mut lexer = Lexer::new(r#"'a\'b'"#);
    assert_eq!(lexer.next_regex(false).unwrap(), Token::Regex("a'b".to_string()));
}

#[test]
fn test_regex_parenthesized() {
    let mut lexer = Lexer::new("(a b) against x");
    assert_eq!(lexer.next_regex(false).unwrap(), Token::Regex("(a b)".to_string()));
    assert_eq!(lexer.next_token().unwrap(), Token::Against);
}

#[test]
fn test_regex_bare_takes_longest() {
    // The bare form is longer than the balanced group, so it wins
    let mut lexer = Lexer::new("(a|b)+ against x");
    assert_eq!(lexer.next_regex(false).unwrap(), Token::Regex("(a|b)+".to_string()));

    let mut lexer = Lexer::new("foo against x");
    assert_eq!(lexer.next_regex(false).unwrap(), Token::Regex("foo".to_string()));
}

#[test]
fn test_regex_group_clause() {
    let mut lexer = Lexer::new("group 1 of /(a)(b)/ from x");
    assert_eq!(lexer.next_regex(true).unwrap(), Token::Group);
    assert_eq!(lexer.next_token().unwrap(), Token::Integer(1));
    assert_eq!(lexer.next_token().unwrap(), Token::Of);
    assert_eq!(lexer.next_regex(false).unwrap(), Token::Regex("(a)(b)".to_string()));
}

#[test]
fn test_regex_group_only_with_clause() {
    let mut lexer = Lexer::new("group from x");
    assert_eq!(lexer.next_regex(true).unwrap(), Token::Regex("group".to_string()));

    let mut lexer = Lexer::new("group 1 of x");
    assert_eq!(lexer.next_regex(false).unwrap(), Token::Regex("group".to_string()));
}

// ============================================================================
// Whole expressions and positions
// ============================================================================

#[test]
fn test_tokenize_expression() {
    let tokens = tokenize("@a if @flag else coalesce(@b, 0)").unwrap();
    assert_eq!(
        tokens,
        vec![
            Token::ColumnRef("a".to_string()),
            Token::If,
            Token::ColumnRef("flag".to_string()),
            Token::Else,
            Token::Identifier("coalesce".to_string()),
            Token::LParen,
            Token::ColumnRef("b".to_string()),
            Token::Comma,
            Token::Integer(0),
            Token::RParen,
        ]
    );
}

#[test]
fn test_unexpected_character_position() {
    let err = tokenize("a + $").unwrap_err();
    assert_eq!(err.position.offset, 4);
    assert_eq!(err.position.column, 5);
    assert!(err.message.contains('$'));
}

#[test]
fn test_token_start_tracks_tokens() {
    let mut lexer = Lexer::new("  ab  +");
    lexer.next_token().unwrap();
    assert_eq!(lexer.token_start().column, 3);
    lexer.next_token().unwrap();
    assert_eq!(lexer.token_start().column, 7);
}
