//! Failure diagnosis
//!
//! When a parse fails, the last column that was reached still describes
//! every partial derivation that was alive at that point. The diagnosis:
//!
//! 1. collects the items of that column whose next symbol is a terminal.
//!    These are the tokens that would have allowed progress, reported most
//!    recently discovered first;
//! 2. for each such item, walks its provenance links back to the seed item,
//!    yielding the chain of partial productions that were waiting on it;
//! 3. anchors every step of the chain to the tokens it has matched, so the
//!    trace can be printed against the source.
//!
//! The chart is only read, never modified.

use std::fmt::Write as _;

use super::chart::{Chart, Column, ItemRef, Provenance};
use super::error::ParseError;
use super::grammar::Grammar;
use super::source_location::{highlight, SourceSpan};
use super::token::Token;

/// One partial production in a derivation trace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceStep {
    /// Dotted production, e.g. `object → left_brace • right_brace`
    pub rule: String,
    /// Column holding the item
    pub column: usize,
    /// Column where the production began
    pub origin: usize,
    /// Source covered by the matched part (zero-width if nothing matched)
    pub span: SourceSpan,
    /// Text of the matched tokens, space separated
    pub matched: String,
}

/// A derivation chain explaining one expectation, innermost step first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivationTrace {
    /// Terminal the innermost step expects
    pub expected: String,
    /// Steps from the expecting item out to the start production
    pub steps: Vec<TraceStep>,
}

/// Explanation of a failed parse
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnosis {
    /// The offending token, or the end-of-input sentinel
    pub token: Token,
    /// Index of the last column reached
    pub column: usize,
    /// Distinct expected terminal names, most recently discovered first
    pub expected: Vec<String>,
    /// Reconstructed derivations, in the same order as their candidates
    pub traces: Vec<DerivationTrace>,
    /// Candidates beyond the reporting limit
    pub omitted: usize,
}

impl Diagnosis {
    /// Diagnose a failure at `column`, where `token` could not be consumed
    /// (or is the end-of-input sentinel). At most `max_traces` derivations
    /// are reconstructed; `0` means all of them.
    pub fn build(
        grammar: &Grammar,
        chart: &Chart,
        column: usize,
        token: Token,
        max_traces: usize,
    ) -> Result<Self, ParseError> {
        let col = chart.column(column).ok_or_else(|| ParseError::Internal {
            message: format!("diagnosis asked for missing column {}", column),
        })?;

        let candidates: Vec<(usize, String)> = col
            .items()
            .iter()
            .enumerate()
            .rev()
            .filter_map(|(index, item)| {
                let next = item.next_symbol(grammar)?;
                grammar
                    .is_terminal(next)
                    .then(|| (index, grammar.name(next).to_string()))
            })
            .collect();

        let mut expected: Vec<String> = Vec::new();
        for (_, name) in &candidates {
            if !expected.contains(name) {
                expected.push(name.clone());
            }
        }

        let limit = if max_traces == 0 {
            candidates.len()
        } else {
            max_traces.min(candidates.len())
        };
        let traces = candidates[..limit]
            .iter()
            .map(|(index, name)| {
                let chain = derivation_chain(chart, ItemRef::new(column, *index))?;
                let steps = chain
                    .into_iter()
                    .map(|at| trace_step(grammar, chart, at, &token))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(DerivationTrace {
                    expected: name.clone(),
                    steps,
                })
            })
            .collect::<Result<Vec<_>, ParseError>>()?;

        Ok(Diagnosis {
            token,
            column,
            expected,
            traces,
            omitted: candidates.len() - limit,
        })
    }

    /// Render the expectation set, the highlighted offending position (when
    /// the source is available) and every derivation trace.
    pub fn render(&self, source: Option<&str>) -> String {
        let mut out = String::new();
        if self.expected.is_empty() {
            let _ = writeln!(out, "no token can continue the input here");
        } else {
            let _ = writeln!(out, "expected one of: {}", self.expected.join(", "));
        }

        if let Some(source) = source {
            out.push('\n');
            out.push_str(&highlight(source, self.token.span()));
        }

        if !self.traces.is_empty() {
            let _ = writeln!(out, "\npartial derivations that could have continued:");
        }
        for trace in &self.traces {
            let _ = writeln!(out, "  expecting {}:", trace.expected);
            let width = trace.steps.iter().map(|s| s.rule.chars().count()).max().unwrap_or(0);
            for step in &trace.steps {
                let matched = match source {
                    Some(src) if !step.span.is_empty() => step.span.text(src).to_string(),
                    _ => step.matched.clone(),
                };
                let pad = width - step.rule.chars().count();
                if matched.is_empty() {
                    let _ = writeln!(out, "    {}{}  at {}", step.rule, " ".repeat(pad), step.span.start);
                } else {
                    let _ = writeln!(
                        out,
                        "    {}{}  matched {:?} at {}",
                        step.rule,
                        " ".repeat(pad),
                        matched,
                        step.span
                    );
                }
            }
        }
        if self.omitted > 0 {
            let _ = writeln!(out, "  ... and {} more", self.omitted);
        }
        out
    }
}

/// Walk from `candidate` out to the seed item.
///
/// Each step is an in-progress item; from it we follow scan/completion links
/// back to its `dot == 0` form, whose prediction link names the item that was
/// waiting on its left-hand side. That item is the next step.
pub fn derivation_chain(chart: &Chart, candidate: ItemRef) -> Result<Vec<ItemRef>, ParseError> {
    let bound = chart.item_count();
    let mut chain = vec![candidate];
    let mut cur = candidate;
    loop {
        let start = chart.start_form(cur).ok_or_else(|| dangling(cur))?;
        let item = chart.item(start).ok_or_else(|| dangling(start))?;
        match item.provenance {
            Provenance::Predicted { by } => {
                chain.push(by);
                cur = by;
            }
            _ => return Ok(chain),
        }
        if chain.len() > bound {
            return Err(ParseError::Internal {
                message: format!("derivation chain from {:?} does not terminate", candidate),
            });
        }
    }
}

fn dangling(at: ItemRef) -> ParseError {
    ParseError::Internal {
        message: format!("provenance points at missing item {:?}", at),
    }
}

fn column_token(chart: &Chart, index: usize) -> Result<&Token, ParseError> {
    chart
        .column(index)
        .and_then(Column::token)
        .ok_or_else(|| ParseError::Internal {
            message: format!("no token recorded for column {}", index),
        })
}

/// Anchor an item to the tokens it covers: those that led into columns
/// `origin + 1 ..= column`.
fn trace_step(
    grammar: &Grammar,
    chart: &Chart,
    at: ItemRef,
    failing: &Token,
) -> Result<TraceStep, ParseError> {
    let item = chart.item(at).ok_or_else(|| dangling(at))?;
    let rule = grammar.dotted(item.production, item.dot);

    if item.origin == at.column {
        // Nothing matched yet: point at whatever comes next.
        let next = if at.column + 1 < chart.len() {
            column_token(chart, at.column + 1)?
        } else {
            failing
        };
        return Ok(TraceStep {
            rule,
            column: at.column,
            origin: item.origin,
            span: SourceSpan::point(next.start_position()),
            matched: String::new(),
        });
    }

    let first = column_token(chart, item.origin + 1)?;
    let last = column_token(chart, at.column)?;
    let mut matched = Vec::with_capacity(at.column - item.origin);
    for c in item.origin + 1..=at.column {
        matched.push(column_token(chart, c)?.text.as_str());
    }
    Ok(TraceStep {
        rule,
        column: at.column,
        origin: item.origin,
        span: first.span().merge(&last.span()),
        matched: matched.join(" "),
    })
}
