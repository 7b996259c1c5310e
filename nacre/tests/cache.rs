// nacre. A grammar-driven parsing engine
// Copyright (c) 2026 The nacre contributors
//
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. All files in the project carrying such notice may not be copied,
// modified, or distributed except according to those terms.

use pretty_assertions::assert_eq;

use nacre::error::{ConstructionError, Diagnostic};
use nacre::ir::IntermediateRepresentation;
use nacre::{
    AbstractSyntaxTreeConstructor, CharacterSet, Config, Grammar, ParserState, Rule, Source,
};

// sums and products over numbers, where every alternative re-matches the same prefix
fn arithmetic() -> Grammar {
    Grammar::builder()
        .rule("space", Rule::literal(" ").one_or_more().skip())
        .rule(
            "number",
            Rule::set(CharacterSet::DecimalDigits).one_or_more().token("number"),
        )
        .rule(
            "term",
            Rule::choice(vec![
                Rule::sequence(vec![
                    Rule::reference("number"),
                    Rule::reference("space").optional(),
                    Rule::literal("*"),
                    Rule::reference("space").optional(),
                    Rule::reference("term"),
                ])
                .token("product"),
                Rule::reference("number"),
            ]),
        )
        .rule(
            "expression",
            Rule::choice(vec![
                Rule::sequence(vec![
                    Rule::reference("term"),
                    Rule::reference("space").optional(),
                    Rule::literal("+").pin().error("expected +"),
                    Rule::reference("space").optional(),
                    Rule::reference("expression"),
                ])
                .token("sum"),
                Rule::reference("term"),
            ]),
        )
        .root(Rule::reference("expression"))
        .build()
        .unwrap()
}

// "bc" is first tried after "a", then retried by the second alternative on the next pass
fn retried() -> Grammar {
    Grammar::builder()
        .rule(
            "bc",
            Rule::sequence(vec![
                Rule::literal("b").token("b"),
                Rule::literal("c").token("c"),
            ]),
        )
        .root(Rule::choice(vec![
            Rule::sequence(vec![
                Rule::literal("a").token("a"),
                Rule::reference("bc").optional(),
            ]),
            Rule::reference("bc"),
        ]))
        .build()
        .unwrap()
}

// "kw" matches in the first alternative and is rejected by a lookahead in the second
fn keyword() -> Grammar {
    Grammar::builder()
        .rule("kw", Rule::literal("if").token("kw"))
        .root(Rule::choice(vec![
            Rule::sequence(vec![Rule::reference("kw"), Rule::literal("!")]),
            Rule::sequence(vec![
                Rule::reference("kw").negate().lookahead(),
                Rule::set(CharacterSet::Letters).one_or_more().token("ident"),
            ]),
        ]))
        .build()
        .unwrap()
}

fn assert_transparent(grammar: &Grammar, inputs: &[&str]) {
    for input in inputs {
        let source = Source::new(*input);

        let mut plain = AbstractSyntaxTreeConstructor::new(grammar);
        let mut cached = AbstractSyntaxTreeConstructor::new(grammar);
        cached.initialize_cache(64, 16);

        assert_eq!(plain.build(&source), cached.build(&source), "{:?}", input);
        assert_eq!(plain.errors(), cached.errors(), "{:?}", input);
    }
}

const INPUTS: &[&str] = &[
    "1",
    "1 + 2",
    "1 * 2 + 3 * 4",
    "12 * 3 4",
    "1 + 2 * ",
    "1 +",
    "",
    "x",
];

#[test]
fn cache_is_transparent() {
    assert_transparent(&arithmetic(), INPUTS);
    assert_transparent(&retried(), &["abx", "abc", "bc", "ab", "bx", "x"]);
    assert_transparent(&keyword(), &["if", "if!", "iffy", "x", ""]);
}

#[test]
fn retried_rule_reports_its_furthest_failure() {
    let grammar = retried();
    let source = Source::new("abx");
    let expected = Err(ConstructionError::ConstructionFailed {
        causes: vec![Diagnostic::new(2..3, "expected c")],
    });

    assert_eq!(grammar.parse(&source), expected);
    assert_eq!(
        grammar.parse_with(&source, Config::new().with_cache(64, 16)),
        expected
    );
}

#[test]
fn cached_match_is_rejected_by_lookahead() {
    let grammar = keyword();
    let source = Source::new("if");
    let expected = Err(ConstructionError::ParsingFailed {
        causes: vec![
            Diagnostic::new(0..1, "unexpected kw"),
            Diagnostic::new(0..0, "No nodes created"),
        ],
    });

    assert_eq!(grammar.parse(&source), expected);
    assert_eq!(
        grammar.parse_with(&source, Config::new().with_cache(64, 16)),
        expected
    );
}

#[test]
fn tiny_cache_is_transparent() {
    let grammar = arithmetic();

    for input in INPUTS {
        let source = Source::new(*input);

        assert_eq!(
            grammar.parse(&source),
            grammar.parse_with(&source, Config::new().with_cache(1, 1)),
            "{:?}",
            input
        );
    }
}

#[test]
fn repeated_builds_agree() {
    let grammar = arithmetic();
    let source = Source::new("1 * 2 + 3");
    let mut constructor = AbstractSyntaxTreeConstructor::new(&grammar);
    constructor.initialize_cache(8, 4);

    let first = constructor.build(&source);
    let second = constructor.build(&source);

    assert_eq!(first, second);
}

#[test]
fn cache_is_hit() {
    let grammar = arithmetic();
    let source = Source::new("1 * 2 + 3");
    let mut constructor = AbstractSyntaxTreeConstructor::new(&grammar);
    let mut state = ParserState::new(&grammar, &source, &Config::new().with_cache(64, 16));

    constructor.will_build_from(&source);
    assert!(state.parse(&mut constructor).is_ok());
    constructor.did_build();

    let cache = state.cache().unwrap();

    assert!(cache.hits() > 0);
    assert!(cache.len() <= cache.capacity());
}

#[test]
fn cache_stays_bounded() {
    let grammar = arithmetic();
    let source = Source::new("1 * 2 * 3 * 4 + 5 * 6 + 7 + 8 * 9");
    let mut constructor = AbstractSyntaxTreeConstructor::new(&grammar);
    let mut state = ParserState::new(&grammar, &source, &Config::new().with_cache(3, 2));

    constructor.will_build_from(&source);
    assert!(state.parse(&mut constructor).is_ok());

    let cache = state.cache().unwrap();

    assert_eq!(cache.capacity(), 6);
    assert!(cache.len() <= 6);
}
