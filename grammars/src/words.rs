// nacre. A grammar-driven parsing engine
// Copyright (c) 2026 The nacre contributors
//
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. All files in the project carrying such notice may not be copied,
// modified, or distributed except according to those terms.

//! Word tokenizer.
//!
//! Splits text into `word`, `number` and `punctuation` nodes, skipping whitespace and newlines.
//! Meant to be streamed.
//!
//! # Examples
//!
//! ```
//! # use nacre::Source;
//! let grammar = nacre_grammars::words::grammar().unwrap();
//! let source = Source::new("Hello, 2 worlds!");
//!
//! let tokens: Vec<_> = grammar
//!     .stream(&source)
//!     .map(|node| format!("{}:{}", node.token(), node.matched_str(&source)))
//!     .collect();
//!
//! assert_eq!(
//!     tokens,
//!     vec!["word:Hello", "punctuation:,", "number:2", "word:worlds", "punctuation:!"]
//! );
//! ```

use nacre::error::GrammarError;
use nacre::{CharacterSet, Grammar, Rule};

/// Builds the word tokenizer.
///
/// # Errors
///
/// Never fails in practice; the error is that of [`GrammarBuilder::build`].
///
/// [`GrammarBuilder::build`]: ../../nacre/struct.GrammarBuilder.html#method.build
pub fn grammar() -> Result<Grammar, GrammarError> {
    let digits = || Rule::set(CharacterSet::DecimalDigits).one_or_more();

    Grammar::builder()
        .rule(
            "word",
            Rule::sequence(vec![
                Rule::set(CharacterSet::Letters).one_or_more(),
                Rule::sequence(vec![
                    Rule::set(CharacterSet::Custom("'-".to_owned())),
                    Rule::set(CharacterSet::Letters).one_or_more(),
                ])
                .zero_or_more(),
            ])
            .token("word"),
        )
        .rule(
            "number",
            Rule::sequence(vec![
                digits(),
                Rule::sequence(vec![Rule::literal("."), digits()]).optional(),
            ])
            .token("number"),
        )
        .rule(
            "punctuation",
            Rule::set(CharacterSet::Punctuation).token("punctuation"),
        )
        .rule(
            "space",
            Rule::set(CharacterSet::WhitespacesAndNewlines)
                .one_or_more()
                .skip(),
        )
        .roots(vec![
            Rule::reference("word"),
            Rule::reference("number"),
            Rule::reference("punctuation"),
            Rule::reference("space"),
        ])
        .build()
}
