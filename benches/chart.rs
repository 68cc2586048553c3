//! Chart parser benchmarks
//!
//! Measures the JSON reference grammar against the recursive-descent parser
//! over the same tokens, a left-recursive arithmetic grammar, and the cost of
//! diagnosing a failure.
//!
//! Run with: cargo bench --bench chart

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use chartparse::earley::{
    json, recursive, Action, EarleyParser, Grammar, GrammarBuilder, Lexer, TokenDef, Value,
};

// ============================================================================
// Test Data
// ============================================================================

mod data {
    pub fn tiny_json() -> &'static str {
        r#"{"a": 1}"#
    }

    pub fn small_json() -> &'static str {
        r#"{"name": "chartparse", "version": 1, "tags": ["earley", "json", "parser"],
            "nested": {"flag": true, "missing": null, "values": [1, 2, 3, 4, 5]}}"#
    }

    pub fn array_json(len: usize) -> String {
        let items: Vec<String> = (0..len).map(|i| format!("{{\"id\": {}, \"ok\": true}}", i)).collect();
        format!("[{}]", items.join(", "))
    }

    pub fn expression(terms: usize) -> String {
        (1..=terms)
            .map(|i| i.to_string())
            .collect::<Vec<_>>()
            .join(if terms % 2 == 0 { " + " } else { " * " })
    }
}

fn arithmetic() -> (Grammar, Lexer) {
    let grammar = GrammarBuilder::new()
        .terminals(["n", "plus", "times"])
        .rule("expr", ["sum"])
        .rule_fn("sum", ["sum", "plus", "product"], |c| {
            Value::Int(c[0].as_int().unwrap_or(0).wrapping_add(c[2].as_int().unwrap_or(0)))
        })
        .rule("sum", ["product"])
        .rule_fn("product", ["product", "times", "factor"], |c| {
            Value::Int(c[0].as_int().unwrap_or(0).wrapping_mul(c[2].as_int().unwrap_or(0)))
        })
        .rule("product", ["factor"])
        .rule_with("factor", ["n"], Action::Number { index: 0 })
        .build()
        .unwrap();
    let lexer = Lexer::new(vec![
        TokenDef::new("n", "[0-9]+"),
        TokenDef::new("plus", r"\+"),
        TokenDef::new("times", r"\*"),
        TokenDef::ignored("ws", r"\s+"),
    ])
    .unwrap();
    (grammar, lexer)
}

// ============================================================================
// Benchmarks
// ============================================================================

fn bench_json(c: &mut Criterion) {
    let mut group = c.benchmark_group("json");

    group.bench_with_input(BenchmarkId::new("chart", "tiny"), data::tiny_json(), |b, input| {
        b.iter(|| json::parse_json(black_box(input)))
    });

    group.bench_with_input(BenchmarkId::new("chart", "small"), data::small_json(), |b, input| {
        b.iter(|| json::parse_json(black_box(input)))
    });

    group.bench_with_input(
        BenchmarkId::new("recursive", "small"),
        data::small_json(),
        |b, input| b.iter(|| recursive::parse_json(black_box(input))),
    );

    group.finish();
}

fn bench_json_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("json_scaling");
    let parser = EarleyParser::new(json::grammar().unwrap());
    let lexer = json::lexer().unwrap();

    for len in [10, 100, 1000] {
        let input = data::array_json(len);
        group.throughput(Throughput::Bytes(input.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(len), input.as_str(), |b, input| {
            b.iter(|| parser.parse_source(lexer, black_box(input)))
        });
    }

    group.finish();
}

fn bench_expression(c: &mut Criterion) {
    let mut group = c.benchmark_group("expression");
    let (grammar, lexer) = arithmetic();
    let parser = EarleyParser::new(&grammar);

    for terms in [8, 64, 256] {
        let input = data::expression(terms);
        group.bench_with_input(BenchmarkId::from_parameter(terms), input.as_str(), |b, input| {
            b.iter(|| parser.parse_source(&lexer, black_box(input)))
        });
    }

    group.finish();
}

fn bench_diagnosis(c: &mut Criterion) {
    let mut group = c.benchmark_group("diagnosis");
    let mut input = data::array_json(100);
    input.pop();
    input.push(',');

    group.bench_function("truncated_array", |b| {
        b.iter(|| json::parse_json(black_box(&input)).unwrap_err())
    });

    group.finish();
}

criterion_group!(benches, bench_json, bench_json_scaling, bench_expression, bench_diagnosis);
criterion_main!(benches);
