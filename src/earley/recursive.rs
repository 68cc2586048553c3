//! Recursive-descent JSON parser
//!
//! A hand-written predictive parser for the same language as
//! [`json`](super::json), over the same tokens and producing the same
//! values. It shares nothing with the chart engine beyond the lexer and the
//! value model, which makes it a useful cross-check for the chart parser.
//!
//! Failures carry a [`Diagnosis`] with the expectation set only; derivation
//! traces need a chart.

use std::collections::BTreeMap;
use std::iter::Peekable;
use std::vec::IntoIter;

use super::action::{unquote, Action};
use super::diagnosis::Diagnosis;
use super::error::ParseError;
use super::json;
use super::token::Token;
use super::value::Value;

const VALUE_START: [&str; 7] = [
    "number",
    "string",
    "left_brace",
    "left_bracket",
    "true",
    "false",
    "null",
];

/// Parse a JSON document by recursive descent
pub fn parse_json(input: &str) -> Result<Value, ParseError> {
    let tokens = json::lexer()?.tokenize(input)?;
    parse_tokens(tokens)
}

/// Parse an already tokenized JSON document
pub fn parse_tokens(tokens: Vec<Token>) -> Result<Value, ParseError> {
    let mut parser = Descent {
        tokens: tokens.into_iter().peekable(),
        consumed: 0,
        last: None,
    };
    let value = parser.value()?;
    match parser.tokens.next() {
        None => Ok(value),
        Some(extra) => Err(parser.unexpected(extra, &[])),
    }
}

struct Descent {
    tokens: Peekable<IntoIter<Token>>,
    consumed: usize,
    last: Option<Token>,
}

impl Descent {
    fn next(&mut self, expected: &[&str]) -> Result<Token, ParseError> {
        match self.tokens.next() {
            Some(token) => {
                self.consumed += 1;
                self.last = Some(token.clone());
                Ok(token)
            }
            None => Err(self.end_of_input(expected)),
        }
    }

    fn peek_is(&mut self, name: &str) -> bool {
        self.tokens.peek().map_or(false, |t| t.canonical_name() == name)
    }

    fn expect(&mut self, name: &str) -> Result<Token, ParseError> {
        let token = self.next(&[name])?;
        if token.canonical_name() == name {
            Ok(token)
        } else {
            Err(self.unexpected(token, &[name]))
        }
    }

    fn value(&mut self) -> Result<Value, ParseError> {
        let token = self.next(&VALUE_START)?;
        match token.canonical_name() {
            "number" => Ok(Action::Number { index: 0 }.apply(vec![Value::Token(token)])),
            "string" => Ok(Value::String(unquote(&token.text))),
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            "null" => Ok(Value::Nil),
            "left_bracket" => self.array(),
            "left_brace" => self.object(),
            _ => Err(self.unexpected(token, &VALUE_START)),
        }
    }

    fn array(&mut self) -> Result<Value, ParseError> {
        let mut items = Vec::new();
        if self.peek_is("right_bracket") {
            self.next(&["right_bracket"])?;
            return Ok(Value::Array(items));
        }
        loop {
            items.push(self.value()?);
            let token = self.next(&["comma", "right_bracket"])?;
            match token.canonical_name() {
                "comma" => continue,
                "right_bracket" => return Ok(Value::Array(items)),
                _ => return Err(self.unexpected(token, &["comma", "right_bracket"])),
            }
        }
    }

    fn object(&mut self) -> Result<Value, ParseError> {
        let mut entries = BTreeMap::new();
        if self.peek_is("right_brace") {
            self.next(&["right_brace"])?;
            return Ok(Value::Map(entries));
        }
        loop {
            let key = self.expect_key()?;
            self.expect("colon")?;
            let value = self.value()?;
            entries.insert(key, value);
            let token = self.next(&["comma", "right_brace"])?;
            match token.canonical_name() {
                "comma" => continue,
                "right_brace" => return Ok(Value::Map(entries)),
                _ => return Err(self.unexpected(token, &["comma", "right_brace"])),
            }
        }
    }

    fn expect_key(&mut self) -> Result<String, ParseError> {
        let expected: &[&str] = if self.last_is("left_brace") {
            &["string", "right_brace"]
        } else {
            &["string"]
        };
        let token = self.next(expected)?;
        if token.canonical_name() == "string" {
            Ok(unquote(&token.text))
        } else {
            Err(self.unexpected(token, expected))
        }
    }

    fn last_is(&self, name: &str) -> bool {
        self.last.as_ref().map_or(false, |t| t.canonical_name() == name)
    }

    fn diagnosis(&self, token: Token, expected: &[&str]) -> Diagnosis {
        Diagnosis {
            token,
            column: self.consumed,
            expected: expected.iter().map(|s| s.to_string()).collect(),
            traces: Vec::new(),
            omitted: 0,
        }
    }

    fn unexpected(&self, token: Token, expected: &[&str]) -> ParseError {
        let diagnosis = self.diagnosis(token, expected);
        ParseError::UnexpectedToken {
            token: diagnosis.token.clone(),
            expected: diagnosis.expected.clone(),
            diagnosis: Box::new(diagnosis),
        }
    }

    fn end_of_input(&self, expected: &[&str]) -> ParseError {
        let diagnosis = self.diagnosis(Token::end_of_input(self.last.as_ref()), expected);
        ParseError::UnexpectedEndOfInput {
            token: diagnosis.token.clone(),
            expected: diagnosis.expected.clone(),
            diagnosis: Box::new(diagnosis),
        }
    }
}
