//! Chartparse - Earley Chart Parser with Derivation-Level Diagnostics
//!
//! A parser for arbitrary context-free grammars. It provides:
//! - Earley recognition with predict/scan/complete over interned symbols
//! - Left recursion, ambiguity and empty productions without rewriting
//! - Semantic reductions, built in or as closures
//! - Failure diagnosis: the expected tokens plus every partial derivation
//!   that could have continued, anchored to source spans
//! - A regex-driven lexer configured by token definitions
//! - Grammars and lexers loadable from JSON
//!
//! ## Quick Start
//!
//! ```rust
//! use chartparse::earley::{EarleyParser, GrammarBuilder, Lexer, TokenDef};
//!
//! let grammar = GrammarBuilder::new()
//!     .terminals(["n", "plus"])
//!     .rule("sum", ["sum", "plus", "n"])
//!     .rule("sum", ["n"])
//!     .build()
//!     .unwrap();
//! let lexer = Lexer::new(vec![
//!     TokenDef::new("n", "[0-9]+"),
//!     TokenDef::new("plus", r"\+"),
//!     TokenDef::ignored("ws", " +"),
//! ])
//! .unwrap();
//!
//! let parser = EarleyParser::new(&grammar);
//! assert!(parser.parse_source(&lexer, "1 + 2 + 3").is_ok());
//!
//! let err = parser.parse_source(&lexer, "1 + + 3").unwrap_err();
//! assert_eq!(err.expected(), ["n".to_string()]);
//! ```
//!
//! ## JSON
//!
//! ```rust
//! use chartparse::earley::json::parse_json;
//!
//! let value = parse_json(r#"{"a": [1, 2, 3]}"#).unwrap();
//! assert_eq!(value.get("a").and_then(|a| a.as_array()).map(|a| a.len()), Some(3));
//! ```
//!
//! ## Feature Flags
//!
//! - `logging` - Enable debug logging using the `log` crate
//! - `parallel` - Parse batches on the rayon thread pool

// Lint configuration for production quality
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(clippy::all)]
#![allow(clippy::new_without_default)]

// Prelude module for convenient imports
pub mod prelude;

// Engine core
pub mod earley;

/// Re-export commonly used types for convenience
pub use earley::{
    // Debug tools
    debug::ChartPrinter,
    // Diagnostics
    diagnosis::{DerivationTrace, Diagnosis, TraceStep},
    // Input
    lexer::{Lexer, TokenDef},
    source_location::{SourcePosition, SourceSpan},
    Action,
    EarleyParser,
    Grammar,
    GrammarBuilder,
    ParseError,
    ParseStats,
    ParserConfig,
    Token,
    Value,
};
