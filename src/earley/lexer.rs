//! Regex-driven tokenizer
//!
//! A [`Lexer`] is configured by an ordered list of [`TokenDef`]s. At every
//! position all definitions are tried at once through a [`RegexSet`]; among
//! the ones that match, the longest match wins, then the higher priority,
//! then the earlier definition. Definitions flagged `ignore` (whitespace,
//! comments) consume input without producing tokens.
//!
//! Token definitions are plain serde records, so a lexer can be loaded from
//! JSON alongside its grammar:
//!
//! ```json
//! [
//!   { "name": "ws", "pattern": "[ \\t\\r\\n]+", "ignore": true },
//!   { "name": "number", "pattern": "[0-9]+" },
//!   { "name": "keyword", "pattern": "let|in", "priority": 10 }
//! ]
//! ```

use memchr::memchr_iter;
use regex::{Regex, RegexSet};
use serde::{Deserialize, Serialize};

use super::error::ParseError;
use super::token::Token;

/// Token definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenDef {
    /// Token kind (e.g., "number", "string", "keyword")
    pub name: String,
    /// Regex pattern string
    pub pattern: String,
    /// Priority for resolving equal-length matches (higher = preferred)
    #[serde(default)]
    pub priority: i32,
    /// Whether matches are skipped (e.g., whitespace)
    #[serde(default)]
    pub ignore: bool,
}

impl TokenDef {
    /// Definition producing tokens of kind `name`
    pub fn new(name: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pattern: pattern.into(),
            priority: 0,
            ignore: false,
        }
    }

    /// Definition whose matches are skipped
    pub fn ignored(name: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            ignore: true,
            ..Self::new(name, pattern)
        }
    }

    /// Set the priority
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

/// Compiled token pattern
#[derive(Debug, Clone)]
struct CompiledToken {
    name: String,
    regex: Regex,
    priority: i32,
    ignore: bool,
}

/// Tokenizer with pre-compiled, anchored patterns
#[derive(Debug, Clone)]
pub struct Lexer {
    tokens: Vec<CompiledToken>,
    set: RegexSet,
}

impl Lexer {
    /// Compile token definitions
    pub fn new(definitions: Vec<TokenDef>) -> Result<Self, ParseError> {
        if definitions.is_empty() {
            return Err(ParseError::InvalidGrammar {
                reason: "lexer has no token definitions".to_string(),
            });
        }

        let anchored: Vec<String> = definitions
            .iter()
            .map(|def| format!("^(?:{})", def.pattern))
            .collect();

        let mut tokens = Vec::with_capacity(definitions.len());
        for (def, pattern) in definitions.into_iter().zip(&anchored) {
            let regex = Regex::new(pattern).map_err(|e| ParseError::InvalidGrammar {
                reason: format!("invalid regex for token `{}`: {}", def.name, e),
            })?;
            tokens.push(CompiledToken {
                name: def.name,
                regex,
                priority: def.priority,
                ignore: def.ignore,
            });
        }
        let set = RegexSet::new(&anchored).map_err(|e| ParseError::InvalidGrammar {
            reason: format!("invalid token patterns: {}", e),
        })?;

        Ok(Lexer { tokens, set })
    }

    /// Load token definitions from a JSON array
    pub fn from_json(json: &str) -> Result<Self, ParseError> {
        let defs: Vec<TokenDef> = serde_json::from_str(json).map_err(|e| ParseError::InvalidGrammar {
            reason: format!("malformed token definitions: {}", e),
        })?;
        Self::new(defs)
    }

    /// Lazily tokenize `input`
    pub fn tokens<'a>(&'a self, input: &'a str) -> Tokens<'a> {
        Tokens {
            lexer: self,
            input,
            pos: 0,
            line: 1,
            column: 1,
            failed: false,
        }
    }

    /// Tokenize all of `input`
    pub fn tokenize(&self, input: &str) -> Result<Vec<Token>, ParseError> {
        self.tokens(input).collect()
    }

    /// Best definition matching at the start of `rest`, as `(index, length)`
    fn best_match(&self, rest: &str) -> Option<(usize, usize)> {
        let mut best: Option<(usize, usize)> = None;
        for idx in self.set.matches(rest).iter() {
            let token = &self.tokens[idx];
            let len = match token.regex.find(rest) {
                Some(m) if m.end() > 0 => m.end(),
                _ => continue,
            };
            let better = match best {
                None => true,
                Some((best_idx, best_len)) => {
                    len > best_len || (len == best_len && token.priority > self.tokens[best_idx].priority)
                }
            };
            if better {
                best = Some((idx, len));
            }
        }
        best
    }
}

/// Iterator over the tokens of one input; yields at most one error, then stops
#[derive(Debug)]
pub struct Tokens<'a> {
    lexer: &'a Lexer,
    input: &'a str,
    pos: usize,
    line: usize,
    column: usize,
    failed: bool,
}

impl Tokens<'_> {
    fn advance(&mut self, text: &str) {
        let bytes = text.as_bytes();
        match memchr_iter(b'\n', bytes).last() {
            Some(nl) => {
                self.line += memchr_iter(b'\n', bytes).count();
                self.column = text[nl + 1..].chars().count() + 1;
            }
            None => self.column += text.chars().count(),
        }
        self.pos += text.len();
    }
}

impl Iterator for Tokens<'_> {
    type Item = Result<Token, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        let (lexer, input) = (self.lexer, self.input);
        while !self.failed && self.pos < input.len() {
            let rest = &input[self.pos..];
            let Some((idx, len)) = lexer.best_match(rest) else {
                self.failed = true;
                return rest.chars().next().map(|found| {
                    Err(ParseError::Lex {
                        offset: self.pos,
                        line: self.line,
                        column: self.column,
                        found,
                    })
                });
            };

            let def = &lexer.tokens[idx];
            let text = &rest[..len];
            let token = (!def.ignore)
                .then(|| Token::new(def.name.as_str(), text, self.line, self.column, self.pos));
            self.advance(text);
            if let Some(token) = token {
                return Some(Ok(token));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arithmetic() -> Lexer {
        Lexer::new(vec![
            TokenDef::new("number", r"[0-9]+"),
            TokenDef::new("plus", r"\+"),
            TokenDef::ignored("whitespace", r"\s+"),
        ])
        .unwrap()
    }

    #[test]
    fn test_simple_lexer() {
        let tokens = arithmetic().tokenize("1 + 2 + 3").unwrap();
        assert_eq!(tokens.len(), 5);
        assert_eq!(tokens[0].kind, "number");
        assert_eq!(tokens[0].text, "1");
        assert_eq!(tokens[1].kind, "plus");
        assert_eq!(tokens[2].text, "2");
        assert_eq!(tokens[2].offset, 4);
    }

    #[test]
    fn test_priority() {
        let lexer = Lexer::new(vec![
            TokenDef::new("identifier", r"[a-zA-Z_][a-zA-Z0-9_]*"),
            TokenDef::new("keyword", r"if|else|while").with_priority(100),
            TokenDef::ignored("ws", r" +"),
        ])
        .unwrap();
        let tokens = lexer.tokenize("if elsewhere x").unwrap();
        let kinds: Vec<&str> = tokens.iter().map(|t| t.kind.as_str()).collect();
        // `elsewhere` is longer than `else`, so length beats priority.
        assert_eq!(kinds, vec!["keyword", "identifier", "identifier"]);
    }

    #[test]
    fn test_earlier_definition_breaks_ties() {
        let lexer = Lexer::new(vec![
            TokenDef::new("first", r"ab"),
            TokenDef::new("second", r"a[b]"),
        ])
        .unwrap();
        assert_eq!(lexer.tokenize("ab").unwrap()[0].kind, "first");
    }

    #[test]
    fn test_longest_match() {
        let lexer = Lexer::new(vec![
            TokenDef::new("quote", r#"""#),
            TokenDef::new("string", r#""[^"]*""#),
        ])
        .unwrap();
        let tokens = lexer.tokenize(r#""hello""#).unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, "string");
    }

    #[test]
    fn test_location_tracking() {
        let lexer = Lexer::new(vec![
            TokenDef::new("word", r"[a-zé]+"),
            TokenDef::ignored("newline", r"\n"),
            TokenDef::ignored("space", r" "),
        ])
        .unwrap();
        let tokens = lexer.tokenize("oné\ntwo three").unwrap();
        assert_eq!((tokens[0].line, tokens[0].column), (1, 1));
        assert_eq!((tokens[1].line, tokens[1].column, tokens[1].offset), (2, 1, 5));
        assert_eq!((tokens[2].line, tokens[2].column), (2, 5));
    }

    #[test]
    fn test_unrecognized_character() {
        let err = arithmetic().tokenize("1 +\n @").unwrap_err();
        assert_eq!(
            err,
            ParseError::Lex {
                offset: 5,
                line: 2,
                column: 2,
                found: '@'
            }
        );
    }

    #[test]
    fn test_empty_matches_are_ignored() {
        let lexer = Lexer::new(vec![TokenDef::new("maybe", r"a*")]).unwrap();
        assert!(lexer.tokenize("b").is_err());
    }

    #[test]
    fn test_invalid_regex() {
        let err = Lexer::new(vec![TokenDef::new("bad", r"(")]).unwrap_err();
        assert!(err.to_string().contains("bad"));
    }

    #[test]
    fn test_from_json() {
        let lexer = Lexer::from_json(
            r#"[{ "name": "n", "pattern": "[0-9]+" },
                { "name": "ws", "pattern": " +", "ignore": true }]"#,
        )
        .unwrap();
        assert_eq!(lexer.tokenize("1 22").unwrap().len(), 2);
    }
}
