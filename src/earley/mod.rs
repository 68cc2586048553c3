//! Earley chart parsing core
//!
//! # Module Organization
//!
//! ## Grammar
//! - [`grammar`] - Symbol interning, productions, builder, JSON loading
//! - [`action`] - Built-in and custom semantic reductions
//! - [`value`] - Semantic values produced by reductions
//!
//! ## Input
//! - [`token`] - Token records and the end-of-input sentinel
//! - [`lexer`] - Regex-driven tokenizer
//! - [`source_location`] - Line/column tracking and highlighting
//!
//! ## Engine
//! - [`chart`] - Columns, items and provenance links
//! - [`parser`] - Predict/scan/complete driver and parser limits
//! - [`diagnosis`] - Failure explanation from the last reached column
//! - [`error`] - The parse error type
//!
//! ## Tools
//! - [`debug`] - Chart pretty-printing
//! - [`json`] - JSON-like reference grammar
//! - [`recursive`] - Recursive-descent parser for the same language
//! - [`parallel`] - Batch parsing

// ============================================================================
// Module Declarations
// ============================================================================

pub mod action;
pub mod chart;
pub mod debug;
pub mod diagnosis;
pub mod error;
pub mod grammar;
pub mod json;
pub mod lexer;
pub mod parser;
pub mod recursive;
pub mod source_location;
pub mod token;
pub mod value;

// Batch parsing (always available, uses rayon when feature is enabled)
pub mod parallel;

// ============================================================================
// Core Types
// ============================================================================

pub use action::{default_reduce, unquote, Action, Reducer};
pub use chart::{Chart, Column, Item, ItemKey, ItemRef, Payload, Provenance};
pub use debug::ChartPrinter;
pub use diagnosis::{DerivationTrace, Diagnosis, TraceStep};
pub use error::ParseError;
pub use grammar::{Grammar, GrammarBuilder, GrammarSpec, Production, ProductionId, ProductionSpec, SymbolId};
pub use lexer::{Lexer, TokenDef};
pub use parser::{EarleyParser, ParseRun, ParseStats, ParserConfig};
pub use source_location::{SourcePosition, SourceSpan};
pub use token::Token;
pub use value::Value;
