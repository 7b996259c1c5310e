// nacre. A grammar-driven parsing engine
// Copyright (c) 2026 The nacre contributors
//
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. All files in the project carrying such notice may not be copied,
// modified, or distributed except according to those terms.

#[macro_use]
extern crate nacre;

use std::cell::Cell;
use std::rc::Rc;

use pretty_assertions::assert_eq;

use nacre::error::ConstructionError;
use nacre::{CharacterSet, Grammar, Rule, Source};

fn letters() -> Rule {
    Rule::set(CharacterSet::Letters).one_or_more()
}

fn words() -> Grammar {
    Grammar::builder()
        .roots(vec![
            letters().token("word"),
            Rule::set(CharacterSet::Whitespaces).one_or_more().skip(),
        ])
        .build()
        .unwrap()
}

#[test]
fn single_match() {
    let grammar = Grammar::builder()
        .root(letters().token("match"))
        .build()
        .unwrap();
    let source = Source::new("Hello");

    let tree = grammar.parse(&source).unwrap();

    assert_eq!(tree.token().name(), "match");
    assert_eq!(tree.matched_str(&source), "Hello");
    assert!(tree.children().is_empty());
}

#[test]
fn negated_match() {
    let grammar = Grammar::builder()
        .root(
            Rule::set(CharacterSet::DecimalDigits)
                .one_or_more()
                .negate()
                .token("match"),
        )
        .build()
        .unwrap();
    let source = Source::new("Hello");

    let tree = grammar.parse(&source).unwrap();

    assert_eq!(tree.to_string(), "match(0, 5)");
    assert_eq!(tree.matched_str(&source), "Hello");
}

#[test]
fn negation_stops_at_body() {
    let grammar = Grammar::builder()
        .root(
            Rule::sequence(vec![
                Rule::set(CharacterSet::DecimalDigits)
                    .one_or_more()
                    .negate()
                    .token("text"),
                Rule::set(CharacterSet::DecimalDigits)
                    .one_or_more()
                    .token("number"),
            ])
            .token("line"),
        )
        .build()
        .unwrap();

    parses_to! {
        grammar: grammar,
        input: "ab12",
        tokens: [
            line(0, 4, [
                text(0, 2),
                number(2, 4)
            ])
        ]
    };
}

#[test]
fn several_nodes_are_wrapped_in_root() {
    let tree = words().parse(&Source::new("ab cd")).unwrap();

    assert_eq!(tree.to_string(), "root(0, 5, [word(0, 2), word(3, 5)])");

    parses_to! {
        grammar: words(),
        input: "ab cd",
        tokens: [
            word(0, 2),
            word(3, 5)
        ]
    };
}

#[test]
fn skipped_edges_are_trimmed() {
    let grammar = Grammar::builder()
        .rule("quote", Rule::literal("\"").skip())
        .root(
            Rule::sequence(vec![
                Rule::reference("quote"),
                Rule::literal("\"").one_or_more().negate(),
                Rule::reference("quote"),
            ])
            .token("string"),
        )
        .build()
        .unwrap();
    let source = Source::new("\"abc\"");

    let tree = grammar.parse(&source).unwrap();

    assert_eq!(tree.range(), 1..4);
    assert_eq!(tree.matched_str(&source), "abc");
}

#[test]
fn inner_skips_are_kept() {
    let grammar = Grammar::builder()
        .rule("space", Rule::literal(" ").skip())
        .root(
            Rule::sequence(vec![
                Rule::reference("space").zero_or_more(),
                letters().token("word"),
                Rule::reference("space").zero_or_more(),
                letters().token("word"),
                Rule::reference("space").zero_or_more(),
            ])
            .token("pair"),
        )
        .build()
        .unwrap();

    parses_to! {
        grammar: grammar,
        input: "  ab cd ",
        tokens: [
            pair(2, 7, [
                word(2, 4),
                word(5, 7)
            ])
        ]
    };
}

#[test]
fn no_nodes() {
    let grammar = Grammar::builder()
        .root(Rule::literal(" ").one_or_more().skip())
        .build()
        .unwrap();

    match grammar.parse(&Source::new("   ")) {
        Err(ConstructionError::ParsingFailed { causes }) => {
            assert_eq!(causes.last().map(|cause| cause.message()), Some("No nodes created"));
        }
        result => panic!("expected ParsingFailed, found {:?}", result),
    }
}

#[test]
fn empty_source() {
    assert!(matches!(
        words().parse(&Source::new("")),
        Err(ConstructionError::ParsingFailed { .. })
    ));
}

#[test]
fn unconsumed_input() {
    let result = words().parse(&Source::new("ab 12"));

    match result {
        Err(ConstructionError::ConstructionFailed { causes }) => {
            assert_eq!(causes.len(), 1);
            assert_eq!(causes[0].message(), "expected word");
            assert_eq!(causes[0].range(), 3..4);
        }
        result => panic!("expected ConstructionFailed, found {:?}", result),
    }
}

#[test]
fn expected_alternatives() {
    let grammar = Grammar::builder()
        .rule("number", Rule::set(CharacterSet::DecimalDigits).one_or_more().token("number"))
        .rule("word", letters().token("word"))
        .root(Rule::choice(vec![
            Rule::reference("number"),
            Rule::reference("word"),
        ]))
        .build()
        .unwrap();

    fails_with! {
        grammar: grammar,
        input: "-",
        message: "expected number or word",
        pos: 0
    };
}

#[test]
fn ordered_choice() {
    let calls = Rc::new(Cell::new(0));
    let counter = calls.clone();

    let grammar = Grammar::builder()
        .root(Rule::choice(vec![
            Rule::literal("a").token("first"),
            Rule::closure(move |state, _| {
                counter.set(counter.get() + 1);
                state.scan(|scanner| scanner.scan_string("a"))
            })
            .token("second"),
        ]))
        .build()
        .unwrap();

    let tree = grammar.parse(&Source::new("a")).unwrap();

    assert_eq!(tree.to_string(), "first(0, 1)");
    assert_eq!(calls.get(), 0);
}

#[test]
fn sequence_rolls_back() {
    let grammar = Grammar::builder()
        .rule("a", Rule::literal("a").token("a"))
        .rule(
            "ab",
            Rule::sequence(vec![Rule::reference("a"), Rule::literal("b").token("b")]).token("ab"),
        )
        .rule(
            "ac",
            Rule::sequence(vec![Rule::reference("a"), Rule::literal("c").token("c")]).token("ac"),
        )
        .root(
            Rule::closure(|state, ir| {
                let start = state.position();

                assert!(state.match_named("ab", ir).is_err());
                assert_eq!(state.position(), start);

                state.match_named("ac", ir)
            })
            .token("outer"),
        )
        .build()
        .unwrap();

    parses_to! {
        grammar: grammar,
        input: "ac",
        tokens: [
            outer(0, 2, [
                ac(0, 2, [
                    a(0, 1),
                    c(1, 2)
                ])
            ])
        ]
    };
}

#[test]
fn zero_width_repetition_terminates() {
    let grammar = Grammar::builder()
        .root(
            Rule::sequence(vec![
                Rule::literal("").zero_or_more(),
                Rule::end_of_input().lookahead().zero_or_more(),
                Rule::literal("a").lookahead().zero_or_more(),
                letters().token("word"),
            ])
            .token("line"),
        )
        .build()
        .unwrap();

    parses_to! {
        grammar: grammar,
        input: "abc",
        tokens: [
            line(0, 3, [
                word(0, 3)
            ])
        ]
    };
}

#[test]
fn lookahead() {
    let grammar = Grammar::builder()
        .root(
            Rule::sequence(vec![Rule::literal("a").lookahead(), letters()]).token("word"),
        )
        .build()
        .unwrap();

    assert_eq!(grammar.parse(&Source::new("abc")).unwrap().to_string(), "word(0, 3)");
    assert!(grammar.parse(&Source::new("bc")).is_err());
}

#[test]
fn negative_lookahead() {
    let grammar = Grammar::builder()
        .root(
            Rule::sequence(vec![
                Rule::literal("if"),
                Rule::set(CharacterSet::Alphanumerics).negate().lookahead(),
            ])
            .token("keyword"),
        )
        .build()
        .unwrap();

    assert_eq!(grammar.parse(&Source::new("if")).unwrap().to_string(), "keyword(0, 2)");

    fails_with! {
        grammar: grammar,
        input: "iffy",
        message: "expected keyword",
        pos: 0
    };
}

#[test]
fn void_transient_and_rename() {
    let grammar = Grammar::builder()
        .rule("word", letters().token("word"))
        .rule("number", Rule::set(CharacterSet::DecimalDigits).one_or_more().token("number"))
        .root(Rule::choice(vec![
            Rule::sequence(vec![Rule::reference("word"), Rule::reference("number")])
                .token("pair")
                .transient(),
            Rule::literal("-").token("dash").void(),
            Rule::literal("+").token("plus").rename("sign"),
        ]))
        .build()
        .unwrap();

    parses_to! {
        grammar: grammar,
        input: "ab12-+",
        tokens: [
            word(0, 2),
            number(2, 4),
            sign(5, 6)
        ]
    };
}

#[test]
fn leaves_reproduce_source() {
    let grammar = Grammar::builder()
        .rule("word", letters().token("word"))
        .rule("space", Rule::literal(" ").one_or_more().token("space"))
        .root(
            Rule::choice(vec![Rule::reference("word"), Rule::reference("space")])
                .one_or_more()
                .token("text"),
        )
        .build()
        .unwrap();
    let source = Source::new("nacre  grows in layers");

    let tree = grammar.parse(&source).unwrap();
    let text: String = tree.leaves().map(|leaf| leaf.matched_str(&source)).collect();

    assert_eq!(text, source.as_str());
}
