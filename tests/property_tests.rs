//! Property-based tests using proptest
//!
//! These tests generate JSON documents and check the chart parser against
//! serde_json and the recursive-descent parser, plus failure properties on
//! truncated inputs.

use chartparse::earley::{json, recursive, EarleyParser, ParseError, Value};
use proptest::prelude::*;

// =============================================================================
// Strategies
// =============================================================================

fn json_leaf() -> impl Strategy<Value = serde_json::Value> {
    prop_oneof![
        Just(serde_json::Value::Null),
        any::<bool>().prop_map(serde_json::Value::Bool),
        any::<i32>().prop_map(|n| serde_json::Value::from(n as i64)),
        text().prop_map(serde_json::Value::String),
    ]
}

/// Arbitrary text, including quotes, backslashes, control characters and
/// characters outside the basic multilingual plane
fn text() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            3 => any::<char>(),
            1 => prop::sample::select(vec!['"', '\\', '\n', '\t', '\u{1}', '/', 'é', '😀']),
        ],
        0..12,
    )
    .prop_map(|chars| chars.into_iter().collect())
}

/// Quote `s` as a JSON string using only ASCII, writing everything else as
/// `\u` escapes (surrogate pairs outside the basic plane)
fn ascii_quoted(s: &str) -> String {
    let mut out = String::from("\"");
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            c if c.is_ascii() && !c.is_ascii_control() => out.push(c),
            c => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units).iter() {
                    out.push_str(&format!("\\u{:04x}", unit));
                }
            }
        }
    }
    out.push('"');
    out
}

fn json_document() -> impl Strategy<Value = serde_json::Value> {
    json_leaf().prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(serde_json::Value::Array),
            prop::collection::btree_map(text(), inner, 0..6)
                .prop_map(|m| serde_json::Value::Object(m.into_iter().collect())),
        ]
    })
}

// =============================================================================
// Agreement
// =============================================================================

proptest! {
    /// Generated documents parse to the value serde_json describes
    #[test]
    fn test_chart_parse_matches_serde(doc in json_document()) {
        let text = serde_json::to_string(&doc).unwrap();
        let parsed = json::parse_json(&text).unwrap();
        prop_assert_eq!(parsed, Value::from(doc));
    }

    /// Pretty-printed documents parse to the same value as compact ones
    #[test]
    fn test_whitespace_is_insignificant(doc in json_document()) {
        let compact = serde_json::to_string(&doc).unwrap();
        let pretty = serde_json::to_string_pretty(&doc).unwrap();
        prop_assert_eq!(json::parse_json(&compact).unwrap(), json::parse_json(&pretty).unwrap());
    }

    /// Strings written entirely with `\u` escapes decode to the original text
    #[test]
    fn test_unicode_escapes_round_trip(s in text()) {
        let quoted = ascii_quoted(&s);
        prop_assert_eq!(json::parse_json(&quoted).unwrap(), Value::String(s.clone()));
        let expected: String = serde_json::from_str(&quoted).unwrap();
        prop_assert_eq!(expected, s);
    }

    /// The chart parser and the recursive-descent parser agree
    #[test]
    fn test_chart_matches_recursive_descent(doc in json_document()) {
        let text = serde_json::to_string(&doc).unwrap();
        prop_assert_eq!(json::parse_json(&text).unwrap(), recursive::parse_json(&text).unwrap());
    }

    /// Repeated parses of the same input give identical results
    #[test]
    fn test_parse_is_deterministic(doc in json_document()) {
        let text = serde_json::to_string(&doc).unwrap();
        let tokens = json::lexer().unwrap().tokenize(&text).unwrap();
        let parser = EarleyParser::new(json::grammar().unwrap());
        let first = parser.parse_with_stats(tokens.clone()).unwrap();
        let second = parser.parse_with_stats(tokens).unwrap();
        prop_assert_eq!(first, second);
    }
}

// =============================================================================
// Failures
// =============================================================================

proptest! {
    /// Every strict token prefix of a document ends too early, and the
    /// reported terminals each label an item in the failing column
    #[test]
    fn test_truncated_documents_fail_at_end(doc in json_document(), cut in any::<prop::sample::Index>()) {
        let text = serde_json::to_string(&doc).unwrap();
        let tokens = json::lexer().unwrap().tokenize(&text).unwrap();
        let len = cut.index(tokens.len());
        let prefix = tokens[..len].to_vec();

        let grammar = json::grammar().unwrap();
        let run = EarleyParser::new(grammar).run(prefix.clone());
        let err = run.result.unwrap_err();
        prop_assert!(
            matches!(err, ParseError::UnexpectedEndOfInput { .. }),
            "unexpected error kind: {:?}",
            err
        );
        prop_assert!(!err.expected().is_empty());

        let column = run.chart.column(err.diagnosis().unwrap().column).unwrap();
        for name in err.expected() {
            let predicted = column.items().iter().any(|item| {
                item.next_symbol(grammar)
                    .map_or(false, |s| grammar.is_terminal(s) && grammar.name(s) == name)
            });
            prop_assert!(predicted);
        }

        prop_assert!(recursive::parse_tokens(prefix).is_err());
    }

    /// A stray closing bracket after a complete document is rejected
    #[test]
    fn test_stray_bracket_is_rejected(doc in json_document()) {
        let text = serde_json::to_string(&doc).unwrap();
        let broken = format!("{}]", text);
        let err = json::parse_json(&broken).unwrap_err();
        prop_assert!(matches!(err, ParseError::UnexpectedToken { .. }), "got {:?}", err);
    }
}
