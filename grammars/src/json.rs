// nacre. A grammar-driven parsing engine
// Copyright (c) 2026 The nacre contributors
//
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. All files in the project carrying such notice may not be copied,
// modified, or distributed except according to those terms.

//! JSON grammar.
//!
//! Every value produces a `value` node wrapping one of `object`, `array`, `string`, `number`,
//! `bool` or `null`. Objects contain `pair`s of a `string` and a `value`. Whitespace between
//! tokens is skipped. A missing closing bracket or brace is recovered from: the tree gets an
//! error node where it was expected.
//!
//! # Examples
//!
//! ```
//! # use nacre::Source;
//! let grammar = nacre_grammars::json::grammar().unwrap();
//! let tree = grammar.parse(&Source::new("[1, null]")).unwrap();
//!
//! assert_eq!(
//!     tree.to_string(),
//!     "value(0, 9, [array(0, 9, [value(1, 2, [number(1, 2)]), value(4, 8, [null(4, 8)])])])"
//! );
//! ```

use nacre::error::GrammarError;
use nacre::{CharacterSet, Grammar, Rule};

const NUMBER: &str = r"-?(?:0|[1-9][0-9]*)(?:\.[0-9]+)?(?:[eE][+-]?[0-9]+)?";
const STRING: &str = r#""(?:[^"\\\x00-\x1F]|\\(?:["\\/bfnrt]|u[0-9a-fA-F]{4}))*""#;

fn ws() -> Rule {
    Rule::reference("ws").optional()
}

// elements separated by commas, with optional whitespace around each comma
fn separated(element: &str) -> Rule {
    Rule::sequence(vec![
        Rule::reference(element),
        Rule::sequence(vec![
            ws(),
            Rule::literal(","),
            ws(),
            Rule::reference(element),
        ])
        .zero_or_more(),
    ])
    .optional()
}

fn delimited(open: &str, element: &str, close: &str) -> Rule {
    Rule::sequence(vec![
        Rule::literal(open),
        ws(),
        separated(element),
        ws(),
        Rule::literal(close)
            .pin()
            .error(&format!("expected {}", close)),
    ])
}

/// Builds the JSON grammar.
///
/// # Errors
///
/// Never fails in practice; the error is that of [`GrammarBuilder::build`].
///
/// [`GrammarBuilder::build`]: ../../nacre/struct.GrammarBuilder.html#method.build
pub fn grammar() -> Result<Grammar, GrammarError> {
    Grammar::builder()
        .rule(
            "ws",
            Rule::set(CharacterSet::WhitespacesAndNewlines)
                .one_or_more()
                .skip(),
        )
        .rule("null", Rule::literal("null").token("null"))
        .rule(
            "bool",
            Rule::choice(vec![Rule::literal("true"), Rule::literal("false")]).token("bool"),
        )
        .rule("number", Rule::regex(NUMBER)?.token("number"))
        .rule("string", Rule::regex(STRING)?.token("string"))
        .rule(
            "pair",
            Rule::sequence(vec![
                Rule::reference("string"),
                ws(),
                Rule::literal(":"),
                ws(),
                Rule::reference("value"),
            ])
            .token("pair"),
        )
        .rule("object", delimited("{", "pair", "}").token("object"))
        .rule("array", delimited("[", "value", "]").token("array"))
        .rule(
            "value",
            Rule::choice(vec![
                Rule::reference("object"),
                Rule::reference("array"),
                Rule::reference("string"),
                Rule::reference("number"),
                Rule::reference("bool"),
                Rule::reference("null"),
            ])
            .token("value"),
        )
        .rule("EOI", Rule::end_of_input())
        .root(Rule::sequence(vec![
            ws(),
            Rule::reference("value"),
            ws(),
            Rule::reference("EOI"),
        ]))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds() {
        let grammar = grammar().unwrap();

        assert!(grammar.rule_named("value").is_some());
        assert!(grammar.rule_named("ws").is_some());
    }
}
