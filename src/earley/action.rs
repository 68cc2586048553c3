//! Semantic reductions
//!
//! A production may carry a [`Reducer`] that folds the values matched by its
//! right-hand side into one value. Reducers are either built-in [`Action`]s,
//! which can be loaded from JSON grammar descriptions, or arbitrary closures.
//! A production without a reducer follows [`default_reduce`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::Chars;
use std::sync::Arc;

use super::value::Value;

/// Closure signature for custom reductions
pub type ReduceFn = dyn Fn(Vec<Value>) -> Value + Send + Sync;

/// Built-in reductions. Indices refer to positions in the production's
/// right-hand side; an out-of-range index yields [`Value::Nil`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Action {
    /// The child at `index`, unchanged
    Pick {
        /// Child index
        index: usize,
    },
    /// A fixed value, ignoring all children
    Constant {
        /// Value to produce
        value: Value,
    },
    /// Parse the token at `index` as a number (`Int` when integral)
    Number {
        /// Child index
        index: usize,
    },
    /// Strip the quotes off the string token at `index` and resolve escapes
    Unquote {
        /// Child index
        index: usize,
    },
    /// The raw text of the token at `index`
    Text {
        /// Child index
        index: usize,
    },
    /// A one-element array holding the child at `index`
    Singleton {
        /// Child index
        index: usize,
    },
    /// Prepend the child at `head` to the array at `tail`
    Cons {
        /// Index of the new first element
        head: usize,
        /// Index of the array to extend
        tail: usize,
    },
    /// An empty array
    EmptyList,
    /// An empty mapping
    EmptyMap,
    /// Build a mapping from the array of `[key, value]` pairs at `index`
    Entries {
        /// Child index
        index: usize,
    },
    /// A two-element `[key, value]` array
    Pair {
        /// Index of the key
        key: usize,
        /// Index of the value
        value: usize,
    },
}

impl Action {
    /// Apply the action to a production's matched children
    pub fn apply(&self, mut children: Vec<Value>) -> Value {
        let mut take = |i: usize| {
            children
                .get_mut(i)
                .map(std::mem::take)
                .unwrap_or_default()
        };
        match self {
            Action::Pick { index } => take(*index),
            Action::Constant { value } => value.clone(),
            Action::Number { index } => number(&take(*index)),
            Action::Unquote { index } => match take(*index) {
                Value::Token(t) => Value::String(unquote(&t.text)),
                Value::String(s) => Value::String(s),
                _ => Value::Nil,
            },
            Action::Text { index } => match take(*index) {
                Value::Token(t) => Value::String(t.text),
                other => other,
            },
            Action::Singleton { index } => Value::Array(vec![take(*index)]),
            Action::Cons { head, tail } => {
                let first = take(*head);
                let mut items = match take(*tail) {
                    Value::Array(items) => items,
                    Value::Nil => Vec::new(),
                    single => vec![single],
                };
                items.insert(0, first);
                Value::Array(items)
            }
            Action::EmptyList => Value::Array(Vec::new()),
            Action::EmptyMap => Value::Map(Default::default()),
            Action::Entries { index } => {
                let entries = match take(*index) {
                    Value::Array(entries) => entries,
                    _ => Vec::new(),
                };
                Value::Map(
                    entries
                        .into_iter()
                        .filter_map(|entry| match entry {
                            Value::Array(mut kv) if kv.len() == 2 => {
                                let value = kv.pop().unwrap_or_default();
                                match kv.pop() {
                                    Some(Value::String(key)) => Some((key, value)),
                                    Some(Value::Token(t)) => Some((unquote(&t.text), value)),
                                    _ => None,
                                }
                            }
                            _ => None,
                        })
                        .collect(),
                )
            }
            Action::Pair { key, value } => {
                let k = take(*key);
                let v = take(*value);
                Value::Array(vec![k, v])
            }
        }
    }
}

/// How a completed production turns its children into one value
#[derive(Clone)]
pub enum Reducer {
    /// A built-in, serializable action
    Action(Action),
    /// An arbitrary closure
    Custom(Arc<ReduceFn>),
}

impl Reducer {
    /// Wrap a closure
    pub fn custom(f: impl Fn(Vec<Value>) -> Value + Send + Sync + 'static) -> Self {
        Reducer::Custom(Arc::new(f))
    }

    /// Run the reduction
    pub fn reduce(&self, children: Vec<Value>) -> Value {
        match self {
            Reducer::Action(action) => action.apply(children),
            Reducer::Custom(f) => f(children),
        }
    }
}

impl From<Action> for Reducer {
    fn from(action: Action) -> Self {
        Reducer::Action(action)
    }
}

impl fmt::Debug for Reducer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reducer::Action(action) => write!(f, "{:?}", action),
            Reducer::Custom(_) => write!(f, "Custom(<fn>)"),
        }
    }
}

/// Reduction for productions without a reducer: a single child is unwrapped,
/// anything else is kept as an array.
pub fn default_reduce(mut children: Vec<Value>) -> Value {
    if children.len() == 1 {
        children.pop().unwrap_or_default()
    } else {
        Value::Array(children)
    }
}

fn number(value: &Value) -> Value {
    let text = match value {
        Value::Token(t) => t.text.as_str(),
        Value::String(s) => s.as_str(),
        Value::Int(_) | Value::Float(_) => return value.clone(),
        _ => return Value::Nil,
    };
    if let Ok(n) = text.parse::<i64>() {
        return Value::Int(n);
    }
    text.parse::<f64>().map_or(Value::Nil, Value::Float)
}

/// Strip surrounding double quotes and resolve backslash escapes.
///
/// Unknown escapes keep the escaped character; a malformed `\u` escape
/// (fewer than four hex digits) is kept verbatim. A UTF-16 surrogate pair
/// written as two `\u` escapes decodes to one character; a surrogate
/// without its partner becomes U+FFFD.
pub fn unquote(text: &str) -> String {
    let inner = text
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(text);

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('b') => out.push('\u{8}'),
            Some('f') => out.push('\u{c}'),
            Some('u') => match read_hex4(&mut chars) {
                Some(unit) => out.push(decode_unit(unit, &mut chars)),
                None => out.push_str("\\u"),
            },
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// Consume four hex digits, leaving `chars` untouched if they are not there
fn read_hex4(chars: &mut Chars<'_>) -> Option<u32> {
    let ahead = chars.as_str();
    let hex = ahead.get(..4)?;
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let unit = u32::from_str_radix(hex, 16).ok()?;
    *chars = ahead[4..].chars();
    Some(unit)
}

/// Turn a UTF-16 code unit into a char, pairing a high surrogate with an
/// immediately following `\uDC00`-`\uDFFF` escape.
fn decode_unit(unit: u32, chars: &mut Chars<'_>) -> char {
    if (0xD800..0xDC00).contains(&unit) {
        if let Some(rest) = chars.as_str().strip_prefix("\\u") {
            let mut ahead = rest.chars();
            if let Some(low) = read_hex4(&mut ahead).filter(|low| (0xDC00..0xE000).contains(low)) {
                *chars = ahead;
                let code = 0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00);
                return char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER);
            }
        }
    }
    char::from_u32(unit).unwrap_or(char::REPLACEMENT_CHARACTER)
}
