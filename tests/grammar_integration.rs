//! Integration tests for grammar construction
//!
//! These tests cover the builder, JSON grammar descriptions, validation and
//! the chart printer.

use chartparse::earley::{
    grammar::ACCEPT, Action, ChartPrinter, EarleyParser, Grammar, GrammarBuilder, GrammarSpec,
    ParseError, Token, Value,
};

// ============================================================================
// Builder
// ============================================================================

#[test]
fn test_builder_defaults_start_to_first_rule() {
    let grammar = GrammarBuilder::new()
        .terminals(["x"])
        .rule("outer", ["inner"])
        .rule("inner", ["x"])
        .build()
        .unwrap();
    assert_eq!(grammar.name(grammar.start()), "outer");
    assert_eq!(grammar.productions().len(), 2);
}

#[test]
fn test_explicit_start() {
    let grammar = GrammarBuilder::new()
        .terminals(["x"])
        .start("inner")
        .rule("outer", ["inner", "inner"])
        .rule("inner", ["x"])
        .build()
        .unwrap();
    let parser = EarleyParser::new(&grammar);
    assert!(parser.parse(vec![Token::new("x", "x", 1, 1, 0)]).is_ok());
}

#[test]
fn test_alternative_start_productions_are_all_tried() {
    let grammar = GrammarBuilder::new()
        .terminals(["x", "y"])
        .rule_with("s", ["x"], Action::Constant { value: Value::Int(1) })
        .rule_with("s", ["y"], Action::Constant { value: Value::Int(2) })
        .build()
        .unwrap();
    assert_eq!(grammar.name(grammar.production(grammar.start_production()).lhs), ACCEPT);

    let parser = EarleyParser::new(&grammar);
    assert_eq!(parser.parse(vec![Token::new("y", "y", 1, 1, 0)]).unwrap(), Value::Int(2));
}

#[test]
fn test_custom_reducer_closure() {
    let grammar = GrammarBuilder::new()
        .terminals(["word"])
        .rule_fn("phrase", ["word", "word"], |children| {
            let words: Vec<&str> = children
                .iter()
                .filter_map(|c| c.as_token().map(|t| t.text.as_str()))
                .collect();
            Value::string(words.join(" "))
        })
        .build()
        .unwrap();
    let value = EarleyParser::new(&grammar)
        .parse(vec![
            Token::new("word", "hello", 1, 1, 0),
            Token::new("word", "world", 1, 7, 6),
        ])
        .unwrap();
    assert_eq!(value, Value::string("hello world"));
}

// ============================================================================
// Validation
// ============================================================================

#[test]
fn test_rejects_undefined_nonterminal() {
    let err = GrammarBuilder::new()
        .terminals(["x"])
        .rule("s", ["x", "tail"])
        .build()
        .unwrap_err();
    assert_eq!(
        err,
        ParseError::InvalidGrammar {
            reason: "nonterminal `tail` has no productions (used by `s`)".to_string()
        }
    );
}

#[test]
fn test_rejects_start_without_productions() {
    let err = GrammarBuilder::new()
        .terminals(["x"])
        .start("missing")
        .rule("s", ["x"])
        .build()
        .unwrap_err();
    assert!(err.to_string().contains("start symbol `missing`"));
}

#[test]
fn test_rejects_terminal_start() {
    let err = GrammarBuilder::new()
        .terminals(["x"])
        .start("x")
        .rule("s", ["x"])
        .build()
        .unwrap_err();
    assert!(matches!(err, ParseError::InvalidGrammar { .. }));
}

// ============================================================================
// JSON Descriptions
// ============================================================================

#[test]
fn test_spec_round_trip_through_serde() {
    let spec: GrammarSpec = serde_json::from_str(
        r#"{
            "terminals": ["n"],
            "productions": [
                { "lhs": "e", "rhs": ["n"], "action": { "kind": "number", "index": 0 } },
                { "lhs": "e", "rhs": [] , "action": { "kind": "empty_list" } }
            ]
        }"#,
    )
    .unwrap();
    let json = serde_json::to_string(&spec).unwrap();
    let again: GrammarSpec = serde_json::from_str(&json).unwrap();
    assert_eq!(spec, again);

    let grammar = again.build().unwrap();
    let parser = EarleyParser::new(&grammar);
    assert_eq!(parser.parse(Vec::new()).unwrap(), Value::Array(Vec::new()));
    assert_eq!(
        parser.parse(vec![Token::new("n", "7", 1, 1, 0)]).unwrap(),
        Value::Int(7)
    );
}

#[test]
fn test_unknown_action_kind() {
    let err = Grammar::from_json(
        r#"{ "terminals": [], "productions": [
            { "lhs": "s", "rhs": [], "action": { "kind": "explode" } } ] }"#,
    )
    .unwrap_err();
    assert!(err.to_string().contains("malformed grammar JSON"));
}

// ============================================================================
// Chart Printer
// ============================================================================

#[test]
fn test_chart_printer_tags() {
    let grammar = GrammarBuilder::new()
        .terminals(["a", "b"])
        .rule("s", ["a", "b"])
        .build()
        .unwrap();
    let parser = EarleyParser::new(&grammar);
    let chart = parser.recognize_chart(vec![
        Token::new("a", "a", 1, 1, 0),
        Token::new("b", "b", 1, 2, 1),
    ]);
    let out = ChartPrinter::new().indent("    ").print(&chart, &grammar);
    assert_eq!(
        out,
        "S0:\n    s → • a b, 0 [predicted]\n\
         S1: `a`\n    s → a • b, 0 [in progress]\n\
         S2: `b`\n    s → a b •, 0 [complete]\n"
    );
}
