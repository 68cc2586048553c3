//! Grammar registry
//!
//! A [`Grammar`] is an ordered list of productions over interned symbols.
//! Symbol names are resolved to [`SymbolId`]s once, when the grammar is
//! built; after that the engine compares integers only. The one place names
//! are still compared is the lexer boundary, where a token's canonical name
//! is looked up with [`Grammar::terminal`].
//!
//! Grammars are immutable once built and can be shared freely between
//! concurrent parses.
//!
//! # Example
//!
//! ```rust
//! use chartparse::earley::{Action, GrammarBuilder};
//!
//! let grammar = GrammarBuilder::new()
//!     .terminals(["n", "plus"])
//!     .rule("sum", ["sum", "plus", "n"])
//!     .rule_with("sum", ["n"], Action::Number { index: 0 })
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(grammar.name(grammar.start()), "sum");
//! assert!(grammar.terminal("plus").is_some());
//! ```

use ahash::RandomState;
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::action::{Action, Reducer};
use super::error::ParseError;

/// Name of the synthetic start symbol added when the start symbol has
/// several productions
pub const ACCEPT: &str = "$accept";

/// Interned grammar symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(pub u32);

/// Index of a production in declaration order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProductionId(pub u32);

impl ProductionId {
    /// Position in [`Grammar::productions`]
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A production `lhs → rhs` with an optional reduction
#[derive(Debug, Clone)]
pub struct Production {
    /// This production's id
    pub id: ProductionId,
    /// Left-hand side (always a nonterminal)
    pub lhs: SymbolId,
    /// Right-hand side, in order
    pub rhs: Vec<SymbolId>,
    /// Semantic reduction; `None` means the default unwrap rule
    pub reducer: Option<Reducer>,
}

impl Production {
    /// Number of right-hand side symbols
    #[inline]
    pub fn len(&self) -> usize {
        self.rhs.len()
    }

    /// Whether this is an empty (ε) production
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rhs.is_empty()
    }
}

/// An immutable, validated context-free grammar
#[derive(Debug, Clone)]
pub struct Grammar {
    names: Vec<String>,
    is_terminal: Vec<bool>,
    nullable: Vec<bool>,
    productions: Vec<Production>,
    by_lhs: Vec<Vec<ProductionId>>,
    terminals_by_name: HashMap<String, SymbolId, RandomState>,
    start: SymbolId,
    start_production: ProductionId,
}

impl Grammar {
    /// All productions in declaration order
    #[inline]
    pub fn productions(&self) -> &[Production] {
        &self.productions
    }

    /// Look up a production
    #[inline]
    pub fn production(&self, id: ProductionId) -> &Production {
        &self.productions[id.index()]
    }

    /// Productions whose left-hand side is `symbol`
    #[inline]
    pub fn productions_for(&self, symbol: SymbolId) -> &[ProductionId] {
        &self.by_lhs[symbol.0 as usize]
    }

    /// The start symbol
    #[inline]
    pub fn start(&self) -> SymbolId {
        self.start
    }

    /// The production seeded into column 0: the start symbol's production
    /// when it has exactly one, otherwise the synthetic `$accept → start`.
    #[inline]
    pub fn start_production(&self) -> ProductionId {
        self.start_production
    }

    /// Whether `symbol` is a terminal
    #[inline]
    pub fn is_terminal(&self, symbol: SymbolId) -> bool {
        self.is_terminal[symbol.0 as usize]
    }

    /// Whether `symbol` can derive the empty string
    #[inline]
    pub fn is_nullable(&self, symbol: SymbolId) -> bool {
        self.nullable[symbol.0 as usize]
    }

    /// Name of a symbol
    #[inline]
    pub fn name(&self, symbol: SymbolId) -> &str {
        &self.names[symbol.0 as usize]
    }

    /// Resolve a token's canonical name to a terminal
    #[inline]
    pub fn terminal(&self, name: &str) -> Option<SymbolId> {
        self.terminals_by_name.get(name).copied()
    }

    /// Resolve any symbol by name
    pub fn symbol(&self, name: &str) -> Option<SymbolId> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| SymbolId(i as u32))
    }

    /// Number of interned symbols
    #[inline]
    pub fn symbol_count(&self) -> usize {
        self.names.len()
    }

    /// Render a production with a dot before rhs position `dot`,
    /// e.g. `object → left_brace • right_brace`.
    pub fn dotted(&self, id: ProductionId, dot: usize) -> String {
        let production = self.production(id);
        let mut out = String::new();
        out.push_str(self.name(production.lhs));
        out.push_str(" →");
        for (i, &sym) in production.rhs.iter().enumerate() {
            if i == dot {
                out.push_str(" •");
            }
            out.push(' ');
            out.push_str(self.name(sym));
        }
        if dot >= production.rhs.len() {
            out.push_str(" •");
        }
        out
    }

    /// Load a grammar from its JSON description (see [`GrammarSpec`])
    pub fn from_json(json: &str) -> Result<Self, ParseError> {
        let spec: GrammarSpec = serde_json::from_str(json).map_err(|e| ParseError::InvalidGrammar {
            reason: format!("malformed grammar JSON: {}", e),
        })?;
        spec.build()
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for production in &self.productions {
            writeln!(f, "{}", self.dotted(production.id, usize::MAX).trim_end_matches(" •"))?;
        }
        Ok(())
    }
}

/// Serializable grammar description
///
/// ```json
/// {
///   "start": "list",
///   "terminals": ["item", "comma"],
///   "productions": [
///     { "lhs": "list", "rhs": ["item", "comma", "list"],
///       "action": { "kind": "cons", "head": 0, "tail": 2 } },
///     { "lhs": "list", "rhs": ["item"],
///       "action": { "kind": "singleton", "index": 0 } }
///   ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GrammarSpec {
    /// Start symbol; defaults to the lhs of the first production
    #[serde(default)]
    pub start: Option<String>,
    /// Terminal symbol names
    pub terminals: Vec<String>,
    /// Productions in order
    pub productions: Vec<ProductionSpec>,
}

/// Serializable production description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionSpec {
    /// Left-hand side
    pub lhs: String,
    /// Right-hand side
    #[serde(default)]
    pub rhs: Vec<String>,
    /// Built-in reduction
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<Action>,
}

impl GrammarSpec {
    /// Validate and intern into a [`Grammar`]
    pub fn build(self) -> Result<Grammar, ParseError> {
        let mut builder = GrammarBuilder::new().terminals(self.terminals);
        if let Some(start) = self.start {
            builder = builder.start(start);
        }
        for p in self.productions {
            builder = match p.action {
                Some(action) => builder.rule_with(p.lhs, p.rhs, action),
                None => builder.rule(p.lhs, p.rhs),
            };
        }
        builder.build()
    }
}

/// Fluent builder for [`Grammar`]s
#[derive(Debug, Default)]
pub struct GrammarBuilder {
    terminals: Vec<String>,
    start: Option<String>,
    rules: Vec<(String, Vec<String>, Option<Reducer>)>,
}

impl GrammarBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare terminal symbols
    pub fn terminals<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.terminals.extend(names.into_iter().map(Into::into));
        self
    }

    /// Set the start symbol (defaults to the first rule's lhs)
    pub fn start(mut self, name: impl Into<String>) -> Self {
        self.start = Some(name.into());
        self
    }

    /// Add a production using the default reduction
    pub fn rule<I, S>(mut self, lhs: impl Into<String>, rhs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rules
            .push((lhs.into(), rhs.into_iter().map(Into::into).collect(), None));
        self
    }

    /// Add a production with a reducer (an [`Action`] or a [`Reducer`])
    pub fn rule_with<I, S>(mut self, lhs: impl Into<String>, rhs: I, reducer: impl Into<Reducer>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rules.push((
            lhs.into(),
            rhs.into_iter().map(Into::into).collect(),
            Some(reducer.into()),
        ));
        self
    }

    /// Add a production reduced by a closure
    pub fn rule_fn<I, S, F>(self, lhs: impl Into<String>, rhs: I, f: F) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(Vec<super::value::Value>) -> super::value::Value + Send + Sync + 'static,
    {
        self.rule_with(lhs, rhs, Reducer::custom(f))
    }

    /// Intern symbols, validate and build the grammar
    pub fn build(self) -> Result<Grammar, ParseError> {
        let mut names: Vec<String> = Vec::new();
        let mut ids: HashMap<String, SymbolId, RandomState> = HashMap::default();
        let mut intern = |name: &str, names: &mut Vec<String>| -> SymbolId {
            if let Some(&id) = ids.get(name) {
                return id;
            }
            let id = SymbolId(names.len() as u32);
            names.push(name.to_string());
            ids.insert(name.to_string(), id);
            id
        };

        let mut terminals_by_name = HashMap::default();
        for name in &self.terminals {
            let id = intern(name, &mut names);
            terminals_by_name.insert(name.clone(), id);
        }

        let start_name = match self.start.or_else(|| self.rules.first().map(|r| r.0.clone())) {
            Some(name) => name,
            None => {
                return Err(ParseError::InvalidGrammar {
                    reason: "grammar has no productions".to_string(),
                })
            }
        };

        let mut productions = Vec::with_capacity(self.rules.len());
        for (i, (lhs, rhs, reducer)) in self.rules.into_iter().enumerate() {
            if terminals_by_name.contains_key(&lhs) {
                return Err(ParseError::InvalidGrammar {
                    reason: format!("terminal `{}` used as a left-hand side", lhs),
                });
            }
            let lhs = intern(&lhs, &mut names);
            let rhs = rhs.iter().map(|s| intern(s, &mut names)).collect();
            productions.push(Production {
                id: ProductionId(i as u32),
                lhs,
                rhs,
                reducer,
            });
        }
        let start = intern(&start_name, &mut names);
        if names.iter().any(|n| n == ACCEPT) {
            return Err(ParseError::InvalidGrammar {
                reason: format!("symbol name `{}` is reserved", ACCEPT),
            });
        }

        let is_terminal: Vec<bool> = names
            .iter()
            .map(|n| terminals_by_name.contains_key(n))
            .collect();
        if is_terminal[start.0 as usize] {
            return Err(ParseError::InvalidGrammar {
                reason: format!("start symbol `{}` is a terminal", start_name),
            });
        }

        let mut by_lhs = vec![Vec::new(); names.len()];
        for p in &productions {
            by_lhs[p.lhs.0 as usize].push(p.id);
        }

        for p in &productions {
            for &sym in &p.rhs {
                if !is_terminal[sym.0 as usize] && by_lhs[sym.0 as usize].is_empty() {
                    return Err(ParseError::InvalidGrammar {
                        reason: format!(
                            "nonterminal `{}` has no productions (used by `{}`)",
                            names[sym.0 as usize], names[p.lhs.0 as usize]
                        ),
                    });
                }
            }
        }

        let start_production = match by_lhs[start.0 as usize].as_slice() {
            [] => {
                return Err(ParseError::InvalidGrammar {
                    reason: format!("start symbol `{}` has no productions", start_name),
                })
            }
            [only] => *only,
            _ => {
                // Several alternatives: seed a single `$accept → start` item instead.
                let accept = intern(ACCEPT, &mut names);
                let id = ProductionId(productions.len() as u32);
                productions.push(Production {
                    id,
                    lhs: accept,
                    rhs: vec![start],
                    reducer: None,
                });
                by_lhs.push(vec![id]);
                id
            }
        };
        let is_terminal: Vec<bool> = names
            .iter()
            .map(|n| terminals_by_name.contains_key(n))
            .collect();

        let nullable = compute_nullable(names.len(), &productions);

        Ok(Grammar {
            names,
            is_terminal,
            nullable,
            productions,
            by_lhs,
            terminals_by_name,
            start,
            start_production,
        })
    }
}

/// Fixed point: a symbol is nullable when some production for it has an
/// all-nullable right-hand side. Terminals never are.
fn compute_nullable(symbol_count: usize, productions: &[Production]) -> Vec<bool> {
    let mut nullable = vec![false; symbol_count];
    loop {
        let mut changed = false;
        for p in productions {
            if !nullable[p.lhs.0 as usize] && p.rhs.iter().all(|s| nullable[s.0 as usize]) {
                nullable[p.lhs.0 as usize] = true;
                changed = true;
            }
        }
        if !changed {
            return nullable;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sums() -> Grammar {
        GrammarBuilder::new()
            .terminals(["n", "plus"])
            .rule("sum", ["sum", "plus", "n"])
            .rule("sum", ["n"])
            .build()
            .unwrap()
    }

    #[test]
    fn test_interning() {
        let g = sums();
        let sum = g.symbol("sum").unwrap();
        let n = g.terminal("n").unwrap();
        assert!(!g.is_terminal(sum));
        assert!(g.is_terminal(n));
        assert_eq!(g.start(), sum);
        assert_eq!(g.productions_for(sum).len(), 2);
        assert_eq!(g.terminal("sum"), None);
    }

    #[test]
    fn test_dotted() {
        let g = sums();
        assert_eq!(g.dotted(ProductionId(0), 0), "sum → • sum plus n");
        assert_eq!(g.dotted(ProductionId(0), 2), "sum → sum plus • n");
        assert_eq!(g.dotted(ProductionId(1), 1), "sum → n •");
    }

    #[test]
    fn test_display() {
        assert_eq!(
            sums().to_string(),
            "sum → sum plus n\nsum → n\n$accept → sum\n"
        );
    }

    #[test]
    fn test_nullable() {
        let g = GrammarBuilder::new()
            .terminals(["x"])
            .rule("s", ["opt", "x"])
            .rule("opt", Vec::<String>::new())
            .rule("opt", ["x"])
            .build()
            .unwrap();
        assert!(g.is_nullable(g.symbol("opt").unwrap()));
        assert!(!g.is_nullable(g.symbol("s").unwrap()));
        assert!(!g.is_nullable(g.terminal("x").unwrap()));
    }

    #[test]
    fn test_undefined_nonterminal() {
        let err = GrammarBuilder::new()
            .terminals(["x"])
            .rule("s", ["missing"])
            .build()
            .unwrap_err();
        assert!(matches!(err, ParseError::InvalidGrammar { .. }));
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn test_terminal_as_lhs() {
        let err = GrammarBuilder::new()
            .terminals(["x"])
            .rule("x", ["x"])
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("left-hand side"));
    }

    #[test]
    fn test_augmented_start() {
        let g = GrammarBuilder::new()
            .terminals(["x", "y"])
            .rule("s", ["x"])
            .rule("s", ["y"])
            .build()
            .unwrap();
        let seed = g.production(g.start_production());
        assert_eq!(g.name(seed.lhs), ACCEPT);
        assert_eq!(seed.rhs, vec![g.start()]);
        assert_eq!(g.productions().len(), 3);

        let single = sums_single();
        assert_eq!(single.start_production(), ProductionId(0));
    }

    #[test]
    fn test_reserved_accept_name() {
        let err = GrammarBuilder::new()
            .terminals(["x", "y"])
            .rule("s", ["x"])
            .rule("s", ["y"])
            .rule(ACCEPT, ["s"])
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            ParseError::InvalidGrammar {
                reason: "symbol name `$accept` is reserved".to_string()
            }
        );

        let err = GrammarBuilder::new()
            .terminals([ACCEPT])
            .rule("s", [ACCEPT])
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("reserved"));
    }

    fn sums_single() -> Grammar {
        GrammarBuilder::new()
            .terminals(["n"])
            .rule("top", ["sum"])
            .rule("sum", ["n"])
            .build()
            .unwrap()
    }

    #[test]
    fn test_empty_grammar() {
        assert!(GrammarBuilder::new().build().is_err());
    }

    #[test]
    fn test_from_json() {
        let g = Grammar::from_json(
            r#"{
                "terminals": ["item", "comma"],
                "productions": [
                    { "lhs": "list", "rhs": ["item", "comma", "list"],
                      "action": { "kind": "cons", "head": 0, "tail": 2 } },
                    { "lhs": "list", "rhs": ["item"] }
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(g.name(g.start()), "list");
        assert!(g.production(ProductionId(0)).reducer.is_some());
        assert!(g.production(ProductionId(1)).reducer.is_none());
    }

    #[test]
    fn test_from_json_malformed() {
        let err = Grammar::from_json("{").unwrap_err();
        assert!(err.to_string().contains("malformed grammar JSON"));
    }
}
