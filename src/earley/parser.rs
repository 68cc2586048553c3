//! Earley parsing engine
//!
//! Tokens are consumed one at a time. Each column is closed under
//! prediction and completion before the next token is scanned into the
//! following column; a token that no item of the current column expects
//! stops the parse and hands the column to the
//! [diagnosis engine](super::diagnosis).
//!
//! Duplicate items are discarded: the first derivation of an item key wins.
//! Discarded completions are counted as ambiguities in [`ParseStats`].

use super::action::default_reduce;
use super::chart::{Chart, Insertion, Item, ItemKey, ItemRef, Payload, Provenance};
use super::diagnosis::Diagnosis;
use super::error::ParseError;
use super::grammar::{Grammar, Production, SymbolId};
use super::lexer::Lexer;
use super::token::Token;
use super::value::Value;

/// Logging macros - no-op when logging feature is disabled
#[cfg(not(feature = "logging"))]
macro_rules! log_debug {
    ($($arg:tt)*) => {};
}

/// Logging macros - use log crate when logging feature is enabled
#[cfg(feature = "logging")]
macro_rules! log_debug {
    ($($arg:tt)*) => { log::debug!($($arg)*) };
}

/// Default maximum number of tokens per parse
pub const DEFAULT_MAX_TOKENS: usize = 1_000_000;

/// Default maximum number of items per column (0 = no limit)
pub const DEFAULT_MAX_ITEMS_PER_COLUMN: usize = 0;

/// Default number of derivation traces rendered in a diagnosis
pub const DEFAULT_MAX_REPORTED_CHAINS: usize = 8;

/// Configuration for parser resource limits
///
/// # Example
///
/// ```rust
/// use chartparse::earley::ParserConfig;
///
/// let config = ParserConfig::new()
///     .with_max_tokens(10_000)
///     .with_max_items_per_column(50_000)
///     .with_max_reported_chains(3);
/// assert_eq!(config.max_reported_chains, 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserConfig {
    /// Maximum number of tokens (0 = no limit)
    pub max_tokens: usize,

    /// Maximum number of items in one column (0 = no limit)
    pub max_items_per_column: usize,

    /// Maximum number of derivation traces in a diagnosis (0 = all)
    pub max_reported_chains: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_tokens: DEFAULT_MAX_TOKENS,
            max_items_per_column: DEFAULT_MAX_ITEMS_PER_COLUMN,
            max_reported_chains: DEFAULT_MAX_REPORTED_CHAINS,
        }
    }
}

impl ParserConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of tokens
    pub fn with_max_tokens(mut self, tokens: usize) -> Self {
        self.max_tokens = tokens;
        self
    }

    /// Set the maximum number of items per column
    pub fn with_max_items_per_column(mut self, items: usize) -> Self {
        self.max_items_per_column = items;
        self
    }

    /// Set the number of derivation traces kept in a diagnosis
    pub fn with_max_reported_chains(mut self, chains: usize) -> Self {
        self.max_reported_chains = chains;
        self
    }
}

/// Counters describing one parse
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseStats {
    /// Number of columns created
    pub columns: usize,
    /// Total number of items across all columns
    pub items: usize,
    /// Completions discarded because their item key already existed
    pub ambiguities: usize,
}

/// Everything a parse produced: the chart, the outcome and its counters
#[derive(Debug, Clone)]
pub struct ParseRun {
    /// The chart as it stood when the parse ended
    pub chart: Chart,
    /// Parse value or error
    pub result: Result<Value, ParseError>,
    /// Counters
    pub stats: ParseStats,
}

/// Earley chart parser over a shared [`Grammar`]
///
/// The parser itself holds no per-parse state; every call builds a fresh
/// chart, so one parser can serve any number of sequential or concurrent
/// parses.
#[derive(Debug, Clone, Copy)]
pub struct EarleyParser<'g> {
    grammar: &'g Grammar,
    config: ParserConfig,
}

impl<'g> EarleyParser<'g> {
    /// Create a parser with the default configuration
    pub fn new(grammar: &'g Grammar) -> Self {
        Self::with_config(grammar, ParserConfig::default())
    }

    /// Create a parser with custom limits
    pub fn with_config(grammar: &'g Grammar, config: ParserConfig) -> Self {
        Self { grammar, config }
    }

    /// The grammar being parsed
    #[inline]
    pub fn grammar(&self) -> &'g Grammar {
        self.grammar
    }

    /// The active configuration
    #[inline]
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parse a token stream to the value of the start production
    pub fn parse<I>(&self, tokens: I) -> Result<Value, ParseError>
    where
        I: IntoIterator<Item = Token>,
    {
        self.run(tokens).result
    }

    /// Parse a token stream and report chart statistics
    pub fn parse_with_stats<I>(&self, tokens: I) -> Result<(Value, ParseStats), ParseError>
    where
        I: IntoIterator<Item = Token>,
    {
        let run = self.run(tokens);
        run.result.map(|value| (value, run.stats))
    }

    /// Tokenize `input` with `lexer`, then parse
    pub fn parse_source(&self, lexer: &Lexer, input: &str) -> Result<Value, ParseError> {
        let tokens = lexer.tokenize(input)?;
        self.parse(tokens)
    }

    /// Run the recognizer and return the chart for inspection, whatever the
    /// outcome.
    pub fn recognize_chart<I>(&self, tokens: I) -> Chart
    where
        I: IntoIterator<Item = Token>,
    {
        self.run(tokens).chart
    }

    /// Run a full parse, keeping the chart and the counters
    pub fn run<I>(&self, tokens: I) -> ParseRun
    where
        I: IntoIterator<Item = Token>,
    {
        let start = self.grammar.production(self.grammar.start_production());
        let mut chart = Chart::seeded(Item {
            production: start.id,
            dot: 0,
            origin: 0,
            payload: fresh_payload(start),
            provenance: Provenance::Seed,
        });
        let mut stats = ParseStats::default();

        log_debug!(
            "Starting parse: start={}, productions={}",
            self.grammar.name(self.grammar.start()),
            self.grammar.productions().len()
        );

        let result = self.drive(&mut chart, &mut stats, tokens);

        stats.columns = chart.len();
        stats.items = chart.item_count();
        if let Err(_e) = &result {
            log_debug!("Parse failed at column {}: {}", chart.len() - 1, _e);
        } else {
            log_debug!(
                "Parse successful: columns={}, items={}, ambiguities={}",
                stats.columns,
                stats.items,
                stats.ambiguities
            );
        }

        ParseRun {
            chart,
            result,
            stats,
        }
    }

    fn drive<I>(&self, chart: &mut Chart, stats: &mut ParseStats, tokens: I) -> Result<Value, ParseError>
    where
        I: IntoIterator<Item = Token>,
    {
        self.close_column(chart, 0, stats)?;

        for (n, token) in tokens.into_iter().enumerate() {
            if self.config.max_tokens != 0 && n >= self.config.max_tokens {
                return Err(ParseError::InputTooLarge {
                    tokens: n + 1,
                    max_tokens: self.config.max_tokens,
                });
            }

            let column = chart.len() - 1;
            if !self.scan(chart, column, &token, stats)? {
                let diagnosis = self.diagnose(chart, column, token)?;
                return Err(ParseError::UnexpectedToken {
                    token: diagnosis.token.clone(),
                    expected: diagnosis.expected.clone(),
                    diagnosis: Box::new(diagnosis),
                });
            }
            self.close_column(chart, column + 1, stats)?;
        }

        let last = chart.len() - 1;
        let start = self.grammar.production(self.grammar.start_production());
        let accept = ItemKey {
            production: start.id,
            dot: start.len() as u32,
            origin: 0,
        };
        if let Some(value) = chart
            .contains(last, &accept)
            .and_then(|at| chart.item(at))
            .and_then(Item::value)
        {
            return Ok(value.clone());
        }

        let eof = Token::end_of_input(chart.column(last).and_then(|c| c.token()));
        let diagnosis = self.diagnose(chart, last, eof)?;
        Err(ParseError::UnexpectedEndOfInput {
            token: diagnosis.token.clone(),
            expected: diagnosis.expected.clone(),
            diagnosis: Box::new(diagnosis),
        })
    }

    fn diagnose(&self, chart: &Chart, column: usize, token: Token) -> Result<Diagnosis, ParseError> {
        Diagnosis::build(
            self.grammar,
            chart,
            column,
            token,
            self.config.max_reported_chains,
        )
    }

    /// Process the worklist of `column` until no new item appears
    fn close_column(&self, chart: &mut Chart, column: usize, stats: &mut ParseStats) -> Result<(), ParseError> {
        let mut next = 0;
        while let Some(item) = chart.item(ItemRef::new(column, next)) {
            let at = ItemRef::new(column, next);
            next += 1;
            match item.next_symbol(self.grammar) {
                None => {
                    let lhs = self.grammar.production(item.production).lhs;
                    let origin = item.origin;
                    let value = item.value().cloned().ok_or_else(|| ParseError::Internal {
                        message: format!("item {:?} has matched its rhs but holds no value", at),
                    })?;
                    self.complete(chart, at, lhs, origin, value, stats)?;
                }
                Some(symbol) if self.grammar.is_terminal(symbol) => {}
                Some(symbol) => self.predict(chart, at, symbol, stats)?,
            }
        }
        log_debug!("column {}: {} items", column, next);
        Ok(())
    }

    /// Seed every production of `symbol` at the current column, then advance
    /// `at` over any empty derivation of `symbol` already completed here.
    fn predict(&self, chart: &mut Chart, at: ItemRef, symbol: SymbolId, stats: &mut ParseStats) -> Result<(), ParseError> {
        let column = at.column;
        for &id in self.grammar.productions_for(symbol) {
            let key = ItemKey {
                production: id,
                dot: 0,
                origin: column as u32,
            };
            if chart.contains(column, &key).is_some() {
                continue;
            }
            let production = self.grammar.production(id);
            let item = Item {
                production: id,
                dot: 0,
                origin: column,
                payload: fresh_payload(production),
                provenance: Provenance::Predicted { by: at },
            };
            self.insert(chart, column, item, None)?;
        }

        if !self.grammar.is_nullable(symbol) {
            return Ok(());
        }
        // Empty derivations completed before `at` existed never see it as a
        // parent, so advance over them here. Later ones find `at` themselves.
        let empties: Vec<(usize, Value)> = match chart.column(column) {
            Some(col) => col
                .items()
                .iter()
                .take(at.index)
                .enumerate()
                .filter(|(_, done)| {
                    done.origin == column && self.grammar.production(done.production).lhs == symbol
                })
                .filter_map(|(k, done)| done.value().map(|v| (k, v.clone())))
                .collect(),
            None => Vec::new(),
        };
        for (k, value) in empties {
            let provenance = Provenance::Completed {
                parent: at,
                child: ItemRef::new(column, k),
            };
            self.advance(chart, column, at, value, provenance, None, stats)?;
        }
        Ok(())
    }

    /// Advance every item waiting on `lhs` at `origin` over the complete
    /// item `at`.
    fn complete(
        &self,
        chart: &mut Chart,
        at: ItemRef,
        lhs: SymbolId,
        origin: usize,
        value: Value,
        stats: &mut ParseStats,
    ) -> Result<(), ParseError> {
        let column = at.column;
        let parents: Vec<usize> = {
            let col = chart.column(origin).ok_or_else(|| ParseError::Internal {
                message: format!("item {:?} has origin {} beyond the chart", at, origin),
            })?;
            // Within the current column only earlier items can be parents;
            // later ones pick this item up when they predict `lhs`.
            let limit = if origin == column { at.index } else { col.len() };
            col.items()
                .iter()
                .take(limit)
                .enumerate()
                .filter(|(_, parent)| parent.next_symbol(self.grammar) == Some(lhs))
                .map(|(k, _)| k)
                .collect()
        };

        for k in parents {
            let parent = ItemRef::new(origin, k);
            let provenance = Provenance::Completed { parent, child: at };
            self.advance(chart, column, parent, value.clone(), provenance, None, stats)?;
        }
        Ok(())
    }

    /// Advance every item of `column` expecting the token's terminal into
    /// the next column. Returns whether anything was scanned.
    fn scan(&self, chart: &mut Chart, column: usize, token: &Token, stats: &mut ParseStats) -> Result<bool, ParseError> {
        let Some(terminal) = self.grammar.terminal(token.canonical_name()) else {
            return Ok(false);
        };
        let matching: Vec<usize> = match chart.column(column) {
            Some(col) => col
                .items()
                .iter()
                .enumerate()
                .filter(|(_, item)| item.next_symbol(self.grammar) == Some(terminal))
                .map(|(k, _)| k)
                .collect(),
            None => Vec::new(),
        };

        for k in matching {
            let from = ItemRef::new(column, k);
            self.advance(
                chart,
                column + 1,
                from,
                Value::Token(token.clone()),
                Provenance::Scanned { from },
                Some(token),
                stats,
            )?;
        }
        Ok(chart.len() > column + 1)
    }

    /// Insert `from` with its dot moved over `value` into `column`,
    /// reducing when the production is finished.
    #[allow(clippy::too_many_arguments)]
    fn advance(
        &self,
        chart: &mut Chart,
        column: usize,
        from: ItemRef,
        value: Value,
        provenance: Provenance,
        via: Option<&Token>,
        stats: &mut ParseStats,
    ) -> Result<(), ParseError> {
        let item = {
            let parent = chart.item(from).ok_or_else(|| ParseError::Internal {
                message: format!("advancing missing item {:?}", from),
            })?;
            let key = ItemKey {
                production: parent.production,
                dot: parent.dot as u32 + 1,
                origin: parent.origin as u32,
            };
            if chart.contains(column, &key).is_some() {
                stats.ambiguities += 1;
                log_debug!(
                    "discarding duplicate derivation of `{}` in column {}",
                    self.grammar.dotted(parent.production, parent.dot + 1),
                    column
                );
                return Ok(());
            }

            let production = self.grammar.production(parent.production);
            let mut children = Vec::with_capacity(parent.dot + 1);
            children.extend_from_slice(parent.children());
            children.push(value);
            let dot = parent.dot + 1;
            let payload = if dot == production.len() {
                Payload::Reduced(reduce(production, children))
            } else {
                Payload::Partial(children)
            };
            Item {
                production: parent.production,
                dot,
                origin: parent.origin,
                payload,
                provenance,
            }
        };
        self.insert(chart, column, item, via)
    }

    fn insert(&self, chart: &mut Chart, column: usize, item: Item, via: Option<&Token>) -> Result<(), ParseError> {
        match chart.insert(column, item, via)? {
            Insertion::Added(at) => {
                let max_items = self.config.max_items_per_column;
                if max_items != 0 && at.index >= max_items {
                    return Err(ParseError::ColumnLimitExceeded {
                        column,
                        items: at.index + 1,
                        max_items,
                    });
                }
                Ok(())
            }
            Insertion::Duplicate(_) => Ok(()),
        }
    }
}

/// Payload of a `dot == 0` item: empty productions are complete at once.
fn fresh_payload(production: &Production) -> Payload {
    if production.is_empty() {
        Payload::Reduced(reduce(production, Vec::new()))
    } else {
        Payload::Partial(Vec::new())
    }
}

fn reduce(production: &Production, children: Vec<Value>) -> Value {
    match &production.reducer {
        Some(reducer) => reducer.reduce(children),
        None => default_reduce(children),
    }
}
