// nacre. A grammar-driven parsing engine
// Copyright (c) 2026 The nacre contributors
//
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. All files in the project carrying such notice may not be copied,
// modified, or distributed except according to those terms.

//! # nacre. A grammar-driven parsing engine
//!
//! nacre matches sources against grammars assembled at runtime from [`Rule`]s. Rules combine
//! terminals, references to named rules, closures, sequences, ordered choices and groups. Each
//! rule carries a [`Behaviour`] that says whether it produces a node, only scans or skips, how
//! often it must match, and whether it is negated or only looks ahead.
//!
//! Matching is PEG-style: choices are ordered, failed alternatives backtrack, and an optional
//! bounded [`MatchCache`] memoizes results by position and rule.
//!
//! Results are handed to an [`IntermediateRepresentation`](ir/trait.IntermediateRepresentation.html).
//! Two are provided:
//!
//! * [`AbstractSyntaxTreeConstructor`] builds a tree of [`Node`]s.
//! * [`TokenStream`] lazily yields the top-level nodes one at a time.
//!
//! ## Example
//!
//! ```
//! # use nacre::{CharacterSet, Grammar, Rule, Source};
//! let grammar = Grammar::builder()
//!     .rule("number", Rule::set(CharacterSet::DecimalDigits).one_or_more().token("number"))
//!     .rule("comma", Rule::literal(",").skip())
//!     .root(
//!         Rule::sequence(vec![
//!             Rule::reference("number"),
//!             Rule::sequence(vec![Rule::reference("comma"), Rule::reference("number")])
//!                 .zero_or_more(),
//!         ])
//!         .token("list"),
//!     )
//!     .build()
//!     .unwrap();
//!
//! let tree = grammar.parse(&Source::new("1,22,333")).unwrap();
//!
//! assert_eq!(
//!     tree.to_string(),
//!     "list(0, 8, [number(0, 1), number(2, 4), number(5, 8)])"
//! );
//! ```
//!
//! ## Errors
//!
//! Building a [`Grammar`] fails with a [`GrammarError`](error/enum.GrammarError.html) on
//! undefined or duplicate names, invalid behaviours and left recursion. Parsing fails with a
//! [`ConstructionError`](error/enum.ConstructionError.html) that lists every
//! [`Diagnostic`](error/struct.Diagnostic.html) raised. Rules annotated with `@pin` recover
//! instead of failing: they leave an error node in the tree and a diagnostic behind.

#![doc(html_root_url = "https://docs.rs/nacre")]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

extern crate alloc;

#[macro_use]
mod macros;

mod annotations;
mod behaviour;
mod cache;
mod config;
mod constructor;
pub mod error;
mod grammar;
pub mod ir;
mod node;
mod parser_state;
mod rule;
mod scanner;
mod source;
mod stream;
mod token;

pub use crate::annotations::{Annotation, AnnotationValue, Annotations};
pub use crate::behaviour::{Behaviour, Cardinality, Kind};
pub use crate::cache::{AttemptLog, CacheConfig, MatchCache, MatchResult};
pub use crate::config::Config;
pub use crate::constructor::AbstractSyntaxTreeConstructor;
pub use crate::grammar::{Grammar, GrammarBuilder, RuleId};
pub use crate::node::{Descendants, Node};
pub use crate::parser_state::{Failure, ParseResult, ParserState};
pub use crate::rule::{CharacterSet, Expression, Rule, Terminal, Test};
pub use crate::scanner::Scanner;
pub use crate::source::Source;
pub use crate::stream::TokenStream;
pub use crate::token::Token;
