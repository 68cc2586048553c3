//! Chart inspection
//!
//! Renders a chart as one block per column:
//!
//! ```text
//! S0:
//!   start → • expr, 0 [predicted]
//!   expr → • array, 0 [predicted]
//! S1: `42`
//!   expr → number •, 0 [complete]
//! ```

use std::fmt::Write;

use super::chart::{Chart, Item};
use super::grammar::Grammar;

/// Chart pretty printer
pub struct ChartPrinter {
    /// Indentation string
    indent: String,
    /// Whether complete items also show their reduced value
    show_values: bool,
    /// Whether incomplete items are printed at all
    complete_only: bool,
}

impl ChartPrinter {
    /// Create a new chart printer
    pub fn new() -> Self {
        Self {
            indent: "  ".to_string(),
            show_values: false,
            complete_only: false,
        }
    }

    /// Set the indentation string
    pub fn indent(mut self, indent: &str) -> Self {
        self.indent = indent.to_string();
        self
    }

    /// Append the reduced value to complete items
    pub fn show_values(mut self, show: bool) -> Self {
        self.show_values = show;
        self
    }

    /// Only print complete items
    pub fn complete_only(mut self, only: bool) -> Self {
        self.complete_only = only;
        self
    }

    /// Print every column of a chart
    pub fn print(&self, chart: &Chart, grammar: &Grammar) -> String {
        let mut output = String::new();
        for index in 0..chart.len() {
            self.print_column(chart, grammar, index, &mut output);
        }
        output
    }

    /// Print a single column
    pub fn print_column(&self, chart: &Chart, grammar: &Grammar, index: usize, output: &mut String) {
        let Some(column) = chart.column(index) else {
            return;
        };
        match column.token() {
            Some(token) => {
                let _ = writeln!(output, "S{}: {}", index, token);
            }
            None => {
                let _ = writeln!(output, "S{}:", index);
            }
        }
        for item in column.items() {
            if self.complete_only && !item.is_complete() {
                continue;
            }
            let _ = write!(
                output,
                "{}{}, {} [{}]",
                self.indent,
                grammar.dotted(item.production, item.dot),
                item.origin,
                tag(item)
            );
            if self.show_values {
                if let Some(value) = item.value() {
                    let _ = write!(output, " = {}", value);
                }
            }
            output.push('\n');
        }
    }
}

impl Default for ChartPrinter {
    fn default() -> Self {
        Self::new()
    }
}

fn tag(item: &Item) -> &'static str {
    if item.is_complete() {
        "complete"
    } else if item.dot == 0 {
        "predicted"
    } else {
        "in progress"
    }
}
