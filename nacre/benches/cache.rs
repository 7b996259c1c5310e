// nacre. A grammar-driven parsing engine
// Copyright (c) 2026 The nacre contributors
//
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. All files in the project carrying such notice may not be copied,
// modified, or distributed except according to those terms.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use nacre::{CharacterSet, Config, Grammar, Rule, Source};

// every alternative starts over the same operand, which is what the cache pays off on
fn backtracking() -> Grammar {
    Grammar::builder()
        .rule(
            "operand",
            Rule::choice(vec![
                Rule::set(CharacterSet::DecimalDigits)
                    .one_or_more()
                    .token("number"),
                Rule::sequence(vec![
                    Rule::literal("("),
                    Rule::reference("expression"),
                    Rule::literal(")"),
                ]),
            ]),
        )
        .rule(
            "expression",
            Rule::choice(vec![
                Rule::sequence(vec![
                    Rule::reference("operand"),
                    Rule::literal("-"),
                    Rule::reference("expression"),
                ])
                .token("difference"),
                Rule::sequence(vec![
                    Rule::reference("operand"),
                    Rule::literal("+"),
                    Rule::reference("expression"),
                ])
                .token("sum"),
                Rule::sequence(vec![
                    Rule::reference("operand"),
                    Rule::literal("*"),
                    Rule::reference("expression"),
                ])
                .token("product"),
                Rule::reference("operand"),
            ]),
        )
        .root(Rule::reference("expression"))
        .build()
        .unwrap()
}

fn nested(depth: usize) -> String {
    let mut input = String::new();

    for i in 0..depth {
        input.push_str(&(i % 10).to_string());
        input.push_str(if i % 2 == 0 { "*(" } else { "+(" });
    }
    input.push('0');
    input.push_str(&")".repeat(depth));

    input
}

fn benchmark(c: &mut Criterion) {
    let grammar = backtracking();
    let source = Source::new(nested(8));

    c.bench_function("backtracking without cache", |b| {
        b.iter(|| grammar.parse(black_box(&source)).unwrap())
    });

    for &(depth, breadth) in &[(4, 4), (64, 16), (1024, 64)] {
        let config = Config::new().with_cache(depth, breadth);

        c.bench_function(&format!("backtracking with cache {}x{}", depth, breadth), |b| {
            b.iter(|| grammar.parse_with(black_box(&source), config).unwrap())
        });
    }
}

criterion_group!(benches, benchmark);
criterion_main!(benches);
