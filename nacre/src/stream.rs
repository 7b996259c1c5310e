// nacre. A grammar-driven parsing engine
// Copyright (c) 2026 The nacre contributors
//
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. All files in the project carrying such notice may not be copied,
// modified, or distributed except according to those terms.

use alloc::collections::VecDeque;
use core::fmt;
use core::iter::FusedIterator;

use log::debug;

use crate::config::Config;
use crate::error::Diagnostic;
use crate::grammar::Grammar;
use crate::ir::{IntermediateRepresentation, Production};
use crate::node::Node;
use crate::parser_state::{Failure, ParserState};
use crate::source::Source;
use crate::token::Token;

// Emits childless nodes for structural rules that succeed at the top level of a pass.
#[derive(Debug, Default)]
struct StreamBuilder {
    depth: usize,
    structural: Vec<bool>,
    // tokens of the current pass, each with the number of rules open when it was emitted
    pending: Vec<(usize, Node)>,
}

impl StreamBuilder {
    fn leave(&mut self) -> bool {
        let structural = self.structural.pop().unwrap_or(false);
        if structural {
            self.depth = self.depth.saturating_sub(1);
        }

        structural
    }

    fn emit(&mut self, node: Node) {
        self.pending.push((self.structural.len(), node));
    }

    fn take(&mut self) -> impl Iterator<Item = Node> + '_ {
        self.pending.drain(..).map(|(_, node)| node)
    }
}

impl IntermediateRepresentation for StreamBuilder {
    fn will_build_from(&mut self, _source: &Source) {
        self.depth = 1;
        self.structural.clear();
    }

    fn evaluating(&mut self, token: Option<&Token>) {
        self.structural.push(token.is_some());
        if token.is_some() {
            self.depth += 1;
        }
    }

    fn succeeded(&mut self, production: Production<'_>) {
        self.leave();

        if self.depth == 1 {
            if let Production::Node {
                token,
                annotations,
                range,
            } = production
            {
                self.emit(Node::new(token.clone(), range, annotations.clone()));
            }
        }
    }

    fn failed(&mut self) {
        self.leave();

        // tokens emitted inside the failed rule are void
        let open = self.structural.len();
        self.pending.retain(|&(opened, _)| opened <= open);
    }

    fn restored(&mut self, nodes: &[Node]) {
        self.leave();

        if self.depth == 1 {
            for node in nodes {
                self.emit(Node::new(
                    node.token().clone(),
                    node.range(),
                    node.annotations().clone(),
                ));
            }
        }
    }

    fn frame_len(&self) -> usize {
        self.pending.len()
    }

    fn truncate(&mut self, len: usize) {
        self.pending.truncate(len);
    }

    fn did_build(&mut self) {
        self.depth = 0;
    }

    fn reset_state(&mut self) {
        self.depth = 0;
        self.structural.clear();
        self.pending.clear();
    }
}

/// A lazy iterator over the top-level nodes of a source.
///
/// Each call to `next` runs passes of the root rule until one produces a structural node at the
/// top level or the source is exhausted. Nodes are yielded without children. Passes that fail or
/// consume nothing are recorded in [`errors`](#method.errors) and end the stream, once the nodes
/// they produced have been yielded.
///
/// # Examples
///
/// ```
/// # use nacre::{CharacterSet, Grammar, Rule, Source};
/// let grammar = Grammar::builder()
///     .roots(vec![
///         Rule::set(CharacterSet::Letters).one_or_more().token("word"),
///         Rule::set(CharacterSet::Whitespaces).one_or_more().skip(),
///     ])
///     .build()
///     .unwrap();
/// let source = Source::new("a b c");
///
/// let mut stream = grammar.stream(&source);
/// let words: Vec<_> = stream.by_ref().map(|node| node.matched_str(&source).to_owned()).collect();
///
/// assert_eq!(words, vec!["a", "b", "c"]);
/// assert!(stream.reached_end_of_input());
/// ```
pub struct TokenStream<'g, 's> {
    state: ParserState<'g, 's>,
    source: &'s Source,
    builder: StreamBuilder,
    buffered: VecDeque<Node>,
    stopped: bool,
}

impl<'g, 's> TokenStream<'g, 's> {
    /// Creates a stream over `source` with the default configuration.
    pub fn new(grammar: &'g Grammar, source: &'s Source) -> TokenStream<'g, 's> {
        TokenStream::with_config(grammar, source, Config::default())
    }

    /// Creates a stream over `source` with `config`. Only failed matches are cached while
    /// streaming.
    pub fn with_config(
        grammar: &'g Grammar,
        source: &'s Source,
        config: Config,
    ) -> TokenStream<'g, 's> {
        TokenStream {
            state: ParserState::new(grammar, source, &config),
            source,
            builder: StreamBuilder::default(),
            buffered: VecDeque::new(),
            stopped: false,
        }
    }

    /// Returns the diagnostics collected so far, including failed passes.
    pub fn errors(&self) -> &[Diagnostic] {
        self.state.errors()
    }

    /// Returns `true` if the whole source was consumed without any error.
    pub fn reached_end_of_input(&self) -> bool {
        self.state.scanner().end_of_input() && self.state.errors().is_empty()
    }

    /// Returns the current position.
    pub fn position(&self) -> usize {
        self.state.position()
    }
}

impl<'g, 's> Iterator for TokenStream<'g, 's> {
    type Item = Node;

    fn next(&mut self) -> Option<Node> {
        loop {
            if let Some(node) = self.buffered.pop_front() {
                return Some(node);
            }

            if self.stopped || self.state.scanner().end_of_input() {
                return None;
            }

            let start = self.state.position();

            self.builder.reset_state();
            self.builder.will_build_from(self.source);

            match self.state.pass(&mut self.builder) {
                Ok(()) => self.buffered.extend(self.builder.take()),
                Err(failure) => {
                    let diagnostic = self.state.diagnose(failure);
                    debug!("stream pass starting at {} failed: {}", start, diagnostic);
                    self.state.record(diagnostic);
                    self.stopped = true;
                    return None;
                }
            }

            self.builder.did_build();

            // nodes of a pass that consumed nothing are still yielded, but it would repeat forever
            if self.state.position() == start {
                let diagnostic = self.state.diagnose(Failure::Mismatch);
                debug!("stream pass starting at {} consumed nothing", start);
                self.state.record(diagnostic);
                self.stopped = true;
            }
        }
    }
}

impl<'g, 's> FusedIterator for TokenStream<'g, 's> {}

impl<'g, 's> fmt::Debug for TokenStream<'g, 's> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenStream")
            .field("position", &self.state.position())
            .field("buffered", &self.buffered)
            .field("errors", &self.state.errors())
            .finish()
    }
}
