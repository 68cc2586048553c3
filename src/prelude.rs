//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types from chartparse.
//! Importing this module with a wildcard import brings the core types into scope:
//!
//! ```
//! use chartparse::prelude::*;
//! ```
//!
//! # Re-exported Items
//!
//! ## Core Types
//! - [`Grammar`] - Immutable context-free grammar
//! - [`GrammarBuilder`] - Builder for constructing grammars
//! - [`EarleyParser`] - Main parser type
//! - [`ParserConfig`] - Parser resource limits
//! - [`Token`] - Lexical token
//! - [`Lexer`] / [`TokenDef`] - Tokenizer and its definitions
//!
//! ## Reductions
//! - [`Action`] - Built-in reductions
//! - [`Reducer`] - Built-in or closure reduction
//! - [`Value`] - Dynamic value type
//!
//! ## Error Handling
//! - [`ParseError`] - Parse error type
//! - [`Diagnosis`] - Explanation of a failed parse

// ============================================================================
// Core Types
// ============================================================================

pub use crate::earley::{EarleyParser, Grammar, GrammarBuilder, Lexer, ParserConfig, Token, TokenDef};

// ============================================================================
// Reductions
// ============================================================================

pub use crate::earley::{Action, Reducer, Value};

// ============================================================================
// Error Handling
// ============================================================================

pub use crate::earley::{Diagnosis, ParseError};
