//! Parse errors
//!
//! A failed parse yields exactly one [`ParseError`]. The two syntax errors
//! carry a full [`Diagnosis`]: the expectation set plus the derivation
//! traces of every partial parse that could have continued.
//!
//! # Example Output
//!
//! ```text
//! error: unexpected token `1` at line 1, column 2
//! expected one of: right_brace, string
//!
//!    1 | {1:2}
//!      |  ^
//! ```

use std::fmt;

use super::diagnosis::Diagnosis;
use super::token::Token;

/// Error produced by grammar construction, lexing or parsing
#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    /// No item in the current column accepts the incoming token
    UnexpectedToken {
        /// The offending token
        token: Token,
        /// Terminal names that would have allowed progress
        expected: Vec<String>,
        /// Derivation-level explanation
        diagnosis: Box<Diagnosis>,
    },

    /// Input ended before the start symbol was complete
    UnexpectedEndOfInput {
        /// End-of-input sentinel, positioned after the last token
        token: Token,
        /// Terminal names that would have allowed progress
        expected: Vec<String>,
        /// Derivation-level explanation
        diagnosis: Box<Diagnosis>,
    },

    /// The tokenizer met a character no token definition matches
    Lex {
        /// Byte offset of the character
        offset: usize,
        /// Line number (1-based)
        line: usize,
        /// Column number (1-based)
        column: usize,
        /// The unmatched character
        found: char,
    },

    /// Invalid grammar or token definitions
    InvalidGrammar {
        /// Reason why the grammar is invalid
        reason: String,
    },

    /// More tokens than [`ParserConfig::max_tokens`](super::ParserConfig)
    InputTooLarge {
        /// Number of tokens seen
        tokens: usize,
        /// Configured limit
        max_tokens: usize,
    },

    /// A column grew past [`ParserConfig::max_items_per_column`](super::ParserConfig)
    ColumnLimitExceeded {
        /// Column index
        column: usize,
        /// Item count reached
        items: usize,
        /// Configured limit
        max_items: usize,
    },

    /// Engine invariant violated (a bug, never an input problem)
    Internal {
        /// Error message describing the internal error
        message: String,
    },
}

impl ParseError {
    /// Expectation set of a syntax error, most recently discovered first
    pub fn expected(&self) -> &[String] {
        match self {
            ParseError::UnexpectedToken { expected, .. }
            | ParseError::UnexpectedEndOfInput { expected, .. } => expected,
            _ => &[],
        }
    }

    /// Diagnosis of a syntax error
    pub fn diagnosis(&self) -> Option<&Diagnosis> {
        match self {
            ParseError::UnexpectedToken { diagnosis, .. }
            | ParseError::UnexpectedEndOfInput { diagnosis, .. } => Some(diagnosis),
            _ => None,
        }
    }

    /// Whether this is one of the two syntax errors
    pub fn is_syntax_error(&self) -> bool {
        self.diagnosis().is_some()
    }

    /// Render the error against the source it came from: message, the
    /// highlighted source line and, for syntax errors, the derivation traces.
    pub fn format_with_source(&self, source: &str) -> String {
        match self {
            ParseError::UnexpectedToken { diagnosis, .. }
            | ParseError::UnexpectedEndOfInput { diagnosis, .. } => {
                format!("error: {}\n{}", self, diagnosis.render(Some(source)))
            }
            ParseError::Lex {
                offset,
                line,
                column,
                ..
            } => {
                let pos = super::source_location::SourcePosition::new(*offset, *line, *column);
                let span = super::source_location::SourceSpan::point(pos);
                format!(
                    "error: {}\n\n{}",
                    self,
                    super::source_location::highlight(source, span)
                )
            }
            other => format!("error: {}\n", other),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::UnexpectedToken { token, .. } => {
                write!(
                    f,
                    "unexpected token {} at line {}, column {}",
                    token, token.line, token.column
                )
            }
            ParseError::UnexpectedEndOfInput { token, .. } => {
                write!(
                    f,
                    "unexpected end of input at line {}, column {}",
                    token.line, token.column
                )
            }
            ParseError::Lex {
                line, column, found, ..
            } => {
                write!(
                    f,
                    "unrecognized character {:?} at line {}, column {}",
                    found, line, column
                )
            }
            ParseError::InvalidGrammar { reason } => {
                write!(f, "invalid grammar: {}", reason)
            }
            ParseError::InputTooLarge { tokens, max_tokens } => {
                write!(
                    f,
                    "input too large: {} tokens exceeds limit of {}",
                    tokens, max_tokens
                )
            }
            ParseError::ColumnLimitExceeded {
                column,
                items,
                max_items,
            } => {
                write!(
                    f,
                    "column {} holds {} items, exceeding the limit of {}",
                    column, items, max_items
                )
            }
            ParseError::Internal { message } => {
                write!(f, "internal error: {}", message)
            }
        }
    }
}

impl std::error::Error for ParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_non_syntax() {
        let err = ParseError::InputTooLarge {
            tokens: 11,
            max_tokens: 10,
        };
        assert_eq!(err.to_string(), "input too large: 11 tokens exceeds limit of 10");
        assert!(err.expected().is_empty());
        assert!(!err.is_syntax_error());
    }

    #[test]
    fn test_lex_format_with_source() {
        let err = ParseError::Lex {
            offset: 3,
            line: 1,
            column: 4,
            found: '@',
        };
        let out = err.format_with_source("[1,@]");
        assert!(out.starts_with("error: unrecognized character '@' at line 1, column 4"));
        assert!(out.contains("   1 | [1,@]"));
        assert!(out.contains("     |    ^"));
    }
}
