// nacre. A grammar-driven parsing engine
// Copyright (c) 2026 The nacre contributors
//
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. All files in the project carrying such notice may not be copied,
// modified, or distributed except according to those terms.

use pretty_assertions::assert_eq;

use nacre::{AbstractSyntaxTreeConstructor, CharacterSet, Grammar, Rule, Source, Token};

fn call() -> Grammar {
    Grammar::builder()
        .rule("name", Rule::set(CharacterSet::Letters).one_or_more().token("name"))
        .rule(
            "argument",
            Rule::set(CharacterSet::DecimalDigits).one_or_more().token("argument"),
        )
        .root(
            Rule::sequence(vec![
                Rule::reference("name"),
                Rule::literal("(").skip(),
                Rule::reference("argument").optional(),
                Rule::literal(")").skip().pin().error("expected )"),
            ])
            .token("call"),
        )
        .build()
        .unwrap()
}

#[test]
fn complete_call() {
    let grammar = call();
    let mut constructor = AbstractSyntaxTreeConstructor::new(&grammar);

    let tree = constructor.build(&Source::new("f(1)")).unwrap();

    assert_eq!(tree.to_string(), "call(0, 3, [name(0, 1), argument(2, 3)])");
    assert!(constructor.errors().is_empty());
}

#[test]
fn pinned_rule_recovers() {
    let grammar = call();
    let mut constructor = AbstractSyntaxTreeConstructor::new(&grammar);

    let tree = constructor.build(&Source::new("f(1")).unwrap();

    assert_eq!(tree.to_string(), "call(0, 3, [name(0, 1), argument(2, 3), error(3, 3)])");

    let errors = tree.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].token(), &Token::error());
    assert_eq!(errors[0].error_message(), Some("expected )"));
    assert_eq!(errors[0].range(), 3..3);

    assert_eq!(constructor.errors().len(), 1);
    assert_eq!(constructor.errors()[0].message(), "expected )");
    assert_eq!(constructor.errors()[0].range(), 3..3);
}

#[test]
fn default_recovery_message() {
    let grammar = Grammar::builder()
        .rule("semicolon", Rule::literal(";").token("semicolon"))
        .root(
            Rule::sequence(vec![
                Rule::set(CharacterSet::Letters).one_or_more().token("word"),
                Rule::reference_with("semicolon", None, None).pin(),
            ])
            .token("statement"),
        )
        .build()
        .unwrap();
    let mut constructor = AbstractSyntaxTreeConstructor::new(&grammar);

    let tree = constructor.build(&Source::new("ab")).unwrap();

    assert_eq!(tree.errors()[0].error_message(), Some("expected semicolon"));
    assert_eq!(constructor.errors()[0].message(), "expected semicolon");
}

#[test]
fn errors_are_cleared_between_builds() {
    let grammar = call();
    let mut constructor = AbstractSyntaxTreeConstructor::new(&grammar);

    constructor.build(&Source::new("f(")).unwrap();
    assert_eq!(constructor.errors().len(), 1);

    constructor.build(&Source::new("f()")).unwrap();
    assert!(constructor.errors().is_empty());
}

#[test]
fn recovery_survives_backtracking_only_when_matched() {
    let grammar = Grammar::builder()
        .root(Rule::choice(vec![
            Rule::sequence(vec![
                Rule::literal("a").token("a"),
                Rule::literal("b").token("b").pin(),
                Rule::literal("!"),
            ])
            .token("first"),
            Rule::literal("ac").token("second"),
        ]))
        .build()
        .unwrap();
    let mut constructor = AbstractSyntaxTreeConstructor::new(&grammar);

    let tree = constructor.build(&Source::new("ac")).unwrap();

    assert_eq!(tree.to_string(), "second(0, 2)");
    assert!(constructor.errors().is_empty());
}
