//! Command-line interface for chartparse
//! Parses a file with the built-in JSON grammar, or with a grammar and token
//! definitions loaded from JSON files, and prints the resulting value.
//!
//! Usage:
//!   chartparse `<path>`                                      - Parse a JSON document
//!   chartparse `<path>` --grammar `<g.json>` --lexer `<t.json>` - Parse with a custom grammar
//!   chartparse `<path>` --chart                              - Also print the chart
//!   chartparse `<path>` --format debug                       - Print the value in display form

use clap::{Arg, ArgAction, Command};

use chartparse::earley::{json, ChartPrinter, EarleyParser, Grammar, Lexer, ParseError};

fn main() {
    let matches = Command::new("chartparse")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Parse a file with an Earley chart parser and explain failures")
        .arg(
            Arg::new("path")
                .help("Path to the file to parse")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("grammar")
                .long("grammar")
                .short('g')
                .help("Grammar description (JSON); defaults to the built-in JSON grammar"),
        )
        .arg(
            Arg::new("lexer")
                .long("lexer")
                .short('l')
                .help("Token definitions (JSON array); defaults to the built-in JSON tokens"),
        )
        .arg(
            Arg::new("format")
                .long("format")
                .short('f')
                .help("Output format")
                .value_parser(["json", "debug"])
                .default_value("json"),
        )
        .arg(
            Arg::new("chart")
                .long("chart")
                .help("Print the chart before the result")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let path = matches.get_one::<String>("path").map(String::as_str).unwrap_or_default();
    let format = matches.get_one::<String>("format").map(String::as_str).unwrap_or("json");

    let source = read(path);
    let grammar = match matches.get_one::<String>("grammar") {
        Some(file) => Grammar::from_json(&read(file)),
        None => json::build_grammar(),
    }
    .unwrap_or_else(|e| fail(&format!("Grammar error: {}", e)));
    let lexer = match matches.get_one::<String>("lexer") {
        Some(file) => Lexer::from_json(&read(file)),
        None => Lexer::new(json::token_defs()),
    }
    .unwrap_or_else(|e| fail(&format!("Lexer error: {}", e)));

    let tokens = lexer
        .tokenize(&source)
        .unwrap_or_else(|e| fail(&e.format_with_source(&source)));

    let parser = EarleyParser::new(&grammar);
    let run = parser.run(tokens);
    if matches.get_flag("chart") {
        print!("{}", ChartPrinter::new().print(&run.chart, &grammar));
    }

    match run.result {
        Ok(value) => match format {
            "debug" => println!("{}", value),
            _ => match serde_json::to_string_pretty(&value.to_json()) {
                Ok(text) => println!("{}", text),
                Err(e) => fail(&format!("Serialization error: {}", e)),
            },
        },
        Err(e) => report(&e, &source),
    }
}

fn read(path: &str) -> String {
    std::fs::read_to_string(path).unwrap_or_else(|e| fail(&format!("Error reading {}: {}", path, e)))
}

fn report(error: &ParseError, source: &str) -> ! {
    fail(error.format_with_source(source).trim_end())
}

fn fail(message: &str) -> ! {
    eprintln!("{}", message);
    std::process::exit(1);
}
