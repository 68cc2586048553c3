//! Token records consumed by the chart parser
//!
//! Tokens come from the [`lexer`](super::lexer) (or any other tokenizer that
//! honours the same contract). The engine only ever looks at a token's
//! [canonical name](Token::canonical_name); the position fields exist for
//! diagnostics.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::source_location::{SourcePosition, SourceSpan};

/// Token kind whose canonical name is its literal text
pub const KEYWORD_KIND: &str = "keyword";

/// Kind (and canonical name) of the end-of-input sentinel
pub const END_OF_INPUT: &str = "$end";

/// A lexical token with its source position
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    /// Token kind, as named by the token definition that produced it
    #[serde(rename = "type")]
    pub kind: String,
    /// Matched source text
    pub text: String,
    /// Line number (1-based)
    pub line: usize,
    /// Column number (1-based, counted in chars)
    pub column: usize,
    /// Byte offset into the source (0-based)
    pub offset: usize,
}

impl Token {
    /// Create a new token
    pub fn new(
        kind: impl Into<String>,
        text: impl Into<String>,
        line: usize,
        column: usize,
        offset: usize,
    ) -> Self {
        Self {
            kind: kind.into(),
            text: text.into(),
            line,
            column,
            offset,
        }
    }

    /// The name grammars use to refer to this token.
    ///
    /// Keywords are matched by their text (`true`, `null`, ...), every other
    /// token by its kind.
    #[inline]
    pub fn canonical_name(&self) -> &str {
        if self.kind == KEYWORD_KIND {
            &self.text
        } else {
            &self.kind
        }
    }

    /// Synthesize the end-of-input sentinel, placed just past `last`
    /// (or at the very start of the source when there were no tokens).
    pub fn end_of_input(last: Option<&Token>) -> Self {
        let end = match last {
            Some(token) => token.end_position(),
            None => SourcePosition::start(),
        };
        Self {
            kind: END_OF_INPUT.to_string(),
            text: String::new(),
            line: end.line,
            column: end.column,
            offset: end.offset,
        }
    }

    /// Whether this is the end-of-input sentinel
    #[inline]
    pub fn is_end_of_input(&self) -> bool {
        self.kind == END_OF_INPUT
    }

    /// Position of the first character of the token
    #[inline]
    pub fn start_position(&self) -> SourcePosition {
        SourcePosition::new(self.offset, self.line, self.column)
    }

    /// Position just past the last character of the token
    pub fn end_position(&self) -> SourcePosition {
        let mut line = self.line;
        let mut column = self.column;
        for ch in self.text.chars() {
            if ch == '\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
        }
        SourcePosition::new(self.offset + self.text.len(), line, column)
    }

    /// Source span covered by the token
    #[inline]
    pub fn span(&self) -> SourceSpan {
        SourceSpan::new(self.start_position(), self.end_position())
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_end_of_input() {
            write!(f, "end of input")
        } else {
            write!(f, "`{}`", self.text)
        }
    }
}
