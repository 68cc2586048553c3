//! Integration tests for the tokenizer
//!
//! These tests cover the JSON token definitions, position tracking, and
//! lexers loaded from JSON descriptions.

use chartparse::earley::{json, token::KEYWORD_KIND, Lexer, ParseError, TokenDef};

fn kinds(input: &str) -> Vec<String> {
    json::lexer()
        .unwrap()
        .tokenize(input)
        .unwrap()
        .iter()
        .map(|t| t.canonical_name().to_string())
        .collect()
}

// ============================================================================
// JSON Tokens
// ============================================================================

#[test]
fn test_punctuation() {
    assert_eq!(
        kinds("{ } [ ] : ,"),
        vec!["left_brace", "right_brace", "left_bracket", "right_bracket", "colon", "comma"]
    );
}

#[test]
fn test_keywords() {
    let tokens = json::lexer().unwrap().tokenize("true false null").unwrap();
    assert!(tokens.iter().all(|t| t.kind == KEYWORD_KIND));
    assert_eq!(kinds("true false null"), vec!["true", "false", "null"]);
}

#[test]
fn test_numbers() {
    for text in ["0", "-0", "42", "-3.25", "1e10", "2.5E-3", "6.02e+23"] {
        let tokens = json::lexer().unwrap().tokenize(text).unwrap();
        assert_eq!(tokens.len(), 1, "{text}");
        assert_eq!(tokens[0].kind, "number");
        assert_eq!(tokens[0].text, text);
    }
}

#[test]
fn test_leading_zero_splits() {
    // `01` is two numbers; the grammar rejects it, not the lexer.
    assert_eq!(kinds("01"), vec!["number", "number"]);
}

#[test]
fn test_strings_with_escapes() {
    let tokens = json::lexer().unwrap().tokenize(r#""a\"b" "c\\""#).unwrap();
    assert_eq!(tokens.len(), 2);
    assert_eq!(tokens[0].text, r#""a\"b""#);
    assert_eq!(tokens[1].text, r#""c\\""#);
}

#[test]
fn test_whitespace_is_skipped() {
    assert_eq!(kinds(" \t\r\n[ \n]\n"), vec!["left_bracket", "right_bracket"]);
}

#[test]
fn test_positions() {
    let tokens = json::lexer().unwrap().tokenize("{\n  \"é\": 1\n}").unwrap();
    let positions: Vec<(usize, usize, usize)> =
        tokens.iter().map(|t| (t.line, t.column, t.offset)).collect();
    assert_eq!(
        positions,
        vec![(1, 1, 0), (2, 3, 4), (2, 6, 8), (2, 8, 10), (3, 1, 12)]
    );
}

#[test]
fn test_unterminated_string() {
    let err = json::lexer().unwrap().tokenize(r#"["abc"#).unwrap_err();
    assert!(matches!(
        err,
        ParseError::Lex {
            found: '"',
            offset: 1,
            ..
        }
    ));
}

#[test]
fn test_lazy_iteration_stops_after_error() {
    let lexer = json::lexer().unwrap();
    let results: Vec<_> = lexer.tokens("1 ? 2").collect();
    assert_eq!(results.len(), 2);
    assert!(results[0].is_ok());
    assert!(results[1].is_err());
}

// ============================================================================
// Custom Lexers
// ============================================================================

#[test]
fn test_lexer_from_json() {
    let lexer = Lexer::from_json(
        r#"[
            { "name": "ws", "pattern": "[ \\t]+", "ignore": true },
            { "name": "ident", "pattern": "[a-z]+" },
            { "name": "keyword", "pattern": "let|in", "priority": 10 },
            { "name": "eq", "pattern": "=" }
        ]"#,
    )
    .unwrap();
    let tokens = lexer.tokenize("let x = inner in x").unwrap();
    let names: Vec<&str> = tokens.iter().map(|t| t.canonical_name()).collect();
    assert_eq!(names, vec!["let", "ident", "eq", "ident", "in", "ident"]);
}

#[test]
fn test_malformed_definitions() {
    assert!(Lexer::from_json("{").is_err());
    assert!(Lexer::new(Vec::new()).is_err());
    assert!(Lexer::new(vec![TokenDef::new("bad", "[")]).is_err());
}
