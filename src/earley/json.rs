//! JSON-like language
//!
//! Token definitions and grammar for a small JSON dialect, used by the CLI
//! and as the reference grammar in tests. Numbers reduce to `Int` when they
//! are integral and to `Float` otherwise; strings are unescaped; objects
//! become [`Value::Map`] and arrays [`Value::Array`].
//!
//! # Example
//!
//! ```rust
//! use chartparse::earley::{json, Value};
//!
//! let value = json::parse_json(r#"{"a": [1, 2.5, null]}"#).unwrap();
//! assert_eq!(value.get("a").and_then(|a| a.get_index(1)), Some(&Value::Float(2.5)));
//! ```

use once_cell::sync::Lazy;

use super::action::Action;
use super::error::ParseError;
use super::grammar::{Grammar, GrammarBuilder};
use super::lexer::{Lexer, TokenDef};
use super::parser::{EarleyParser, ParserConfig};
use super::token::KEYWORD_KIND;
use super::value::Value;

/// Regex for JSON numbers
pub const NUMBER_PATTERN: &str = r"-?(?:0|[1-9][0-9]*)(?:\.[0-9]+)?(?:[eE][+-]?[0-9]+)?";

/// Regex for double-quoted strings with backslash escapes
pub const STRING_PATTERN: &str = r#""(?:[^"\\]|\\.)*""#;

/// Terminal names of the JSON grammar
pub const TERMINALS: [&str; 11] = [
    "number",
    "string",
    "true",
    "false",
    "null",
    "left_brace",
    "right_brace",
    "left_bracket",
    "right_bracket",
    "colon",
    "comma",
];

static JSON_LEXER: Lazy<Result<Lexer, ParseError>> = Lazy::new(|| Lexer::new(token_defs()));

static JSON_GRAMMAR: Lazy<Result<Grammar, ParseError>> = Lazy::new(build_grammar);

/// Token definitions of the JSON dialect
pub fn token_defs() -> Vec<TokenDef> {
    vec![
        TokenDef::ignored("whitespace", r"[ \t\r\n]+"),
        TokenDef::new("number", NUMBER_PATTERN),
        TokenDef::new("string", STRING_PATTERN),
        TokenDef::new("left_brace", r"\{"),
        TokenDef::new("right_brace", r"\}"),
        TokenDef::new("left_bracket", r"\["),
        TokenDef::new("right_bracket", r"\]"),
        TokenDef::new("colon", ":"),
        TokenDef::new("comma", ","),
        TokenDef::new(KEYWORD_KIND, "true|false|null"),
    ]
}

/// Shared, compiled JSON lexer
pub fn lexer() -> Result<&'static Lexer, ParseError> {
    JSON_LEXER.as_ref().map_err(Clone::clone)
}

/// Shared JSON grammar
pub fn grammar() -> Result<&'static Grammar, ParseError> {
    JSON_GRAMMAR.as_ref().map_err(Clone::clone)
}

/// Build a fresh copy of the JSON grammar
pub fn build_grammar() -> Result<Grammar, ParseError> {
    GrammarBuilder::new()
        .terminals(TERMINALS)
        .start("start")
        .rule("start", ["expr"])
        .rule("expr", ["array"])
        .rule("expr", ["object"])
        .rule("expr", ["boolean"])
        .rule_with("expr", ["number"], Action::Number { index: 0 })
        .rule_with("expr", ["string"], Action::Unquote { index: 0 })
        .rule_with("expr", ["null"], Action::Constant { value: Value::Nil })
        .rule_with("boolean", ["true"], Action::Constant { value: Value::Bool(true) })
        .rule_with("boolean", ["false"], Action::Constant { value: Value::Bool(false) })
        .rule_with(
            "object",
            ["left_brace", "object_entry_list", "right_brace"],
            Action::Entries { index: 1 },
        )
        .rule_with("object", ["left_brace", "right_brace"], Action::EmptyMap)
        .rule_with(
            "object_entry_list",
            ["object_entry", "comma", "object_entry_list"],
            Action::Cons { head: 0, tail: 2 },
        )
        .rule_with("object_entry_list", ["object_entry"], Action::Singleton { index: 0 })
        .rule_with(
            "object_entry",
            ["string", "colon", "expr"],
            Action::Pair { key: 0, value: 2 },
        )
        .rule_with(
            "array",
            ["left_bracket", "array_items", "right_bracket"],
            Action::Pick { index: 1 },
        )
        .rule_with("array", ["left_bracket", "right_bracket"], Action::EmptyList)
        .rule_with(
            "array_items",
            ["expr", "comma", "array_items"],
            Action::Cons { head: 0, tail: 2 },
        )
        .rule_with("array_items", ["expr"], Action::Singleton { index: 0 })
        .build()
}

/// Parse a JSON document with the chart parser
pub fn parse_json(input: &str) -> Result<Value, ParseError> {
    parse_json_with_config(input, ParserConfig::default())
}

/// Parse a JSON document with custom limits
pub fn parse_json_with_config(input: &str, config: ParserConfig) -> Result<Value, ParseError> {
    EarleyParser::with_config(grammar()?, config).parse_source(lexer()?, input)
}
