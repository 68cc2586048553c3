//! Batch parsing
//!
//! Parses many independent inputs against one shared grammar. Every input
//! gets its own chart; the grammar and lexer are only read.
//!
//! # Feature Flag
//!
//! With the `parallel` feature the batch is spread over the rayon thread
//! pool; without it the same functions run sequentially.
//!
//! ```toml
//! [dependencies]
//! chartparse = { version = "0.1", features = ["parallel"] }
//! ```
//!
//! # Example
//!
//! ```rust
//! use chartparse::earley::{json, parallel::parse_batch, EarleyParser};
//!
//! let parser = EarleyParser::new(json::grammar().unwrap());
//! let results = parse_batch(&parser, json::lexer().unwrap(), &["[1]", "{", "null"]);
//!
//! // Results are in same order as inputs
//! assert!(results[0].is_ok());
//! assert!(results[1].is_err());
//! ```

use super::error::ParseError;
use super::lexer::Lexer;
use super::parser::EarleyParser;
use super::token::Token;
use super::value::Value;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Tokenize and parse multiple inputs, in parallel when available
///
/// Results are returned in the same order as `inputs`.
#[cfg(feature = "parallel")]
pub fn parse_batch(parser: &EarleyParser<'_>, lexer: &Lexer, inputs: &[&str]) -> Vec<Result<Value, ParseError>> {
    inputs
        .par_iter()
        .map(|input| parser.parse_source(lexer, input))
        .collect()
}

/// Tokenize and parse multiple inputs sequentially (fallback when rayon is
/// not available)
#[cfg(not(feature = "parallel"))]
pub fn parse_batch(parser: &EarleyParser<'_>, lexer: &Lexer, inputs: &[&str]) -> Vec<Result<Value, ParseError>> {
    inputs
        .iter()
        .map(|input| parser.parse_source(lexer, input))
        .collect()
}

/// Parse multiple pre-tokenized inputs, in parallel when available
#[cfg(feature = "parallel")]
pub fn parse_token_batch(parser: &EarleyParser<'_>, inputs: Vec<Vec<Token>>) -> Vec<Result<Value, ParseError>> {
    inputs
        .into_par_iter()
        .map(|tokens| parser.parse(tokens))
        .collect()
}

/// Parse multiple pre-tokenized inputs sequentially (fallback)
#[cfg(not(feature = "parallel"))]
pub fn parse_token_batch(parser: &EarleyParser<'_>, inputs: Vec<Vec<Token>>) -> Vec<Result<Value, ParseError>> {
    inputs.into_iter().map(|tokens| parser.parse(tokens)).collect()
}
