// nacre. A grammar-driven parsing engine
// Copyright (c) 2026 The nacre contributors
//
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. All files in the project carrying such notice may not be copied,
// modified, or distributed except according to those terms.

use core::mem;

use log::debug;

use crate::annotations::Annotations;
use crate::cache::CacheConfig;
use crate::config::Config;
use crate::error::{ConstructionError, Diagnostic};
use crate::grammar::Grammar;
use crate::ir::{IntermediateRepresentation, NodeStack, Production};
use crate::node::Node;
use crate::parser_state::ParserState;
use crate::source::Source;
use crate::token::Token;

/// Builds a tree of [`Node`](struct.Node.html)s from a source.
///
/// Every successful structural rule becomes a node whose children are the nodes produced while
/// it was matching. When the root rule produces several top-level nodes they are wrapped in a
/// synthetic node with the [`Token::root`](struct.Token.html#method.root) token.
///
/// # Examples
///
/// ```
/// # use nacre::{AbstractSyntaxTreeConstructor, CharacterSet, Grammar, Rule, Source};
/// let grammar = Grammar::builder()
///     .roots(vec![
///         Rule::set(CharacterSet::Letters).one_or_more().token("word"),
///         Rule::literal(" ").skip(),
///     ])
///     .build()
///     .unwrap();
///
/// let mut constructor = AbstractSyntaxTreeConstructor::new(&grammar);
/// constructor.initialize_cache(16, 4);
///
/// let tree = constructor.build(&Source::new("hello world")).unwrap();
///
/// assert_eq!(tree.to_string(), "root(0, 11, [word(0, 5), word(6, 11)])");
/// assert!(constructor.errors().is_empty());
/// ```
#[derive(Debug)]
pub struct AbstractSyntaxTreeConstructor<'g> {
    grammar: &'g Grammar,
    config: Config,
    node_stack: NodeStack,
    errors: Vec<Diagnostic>,
}

impl<'g> AbstractSyntaxTreeConstructor<'g> {
    /// Creates a constructor with the default configuration.
    pub fn new(grammar: &'g Grammar) -> AbstractSyntaxTreeConstructor<'g> {
        AbstractSyntaxTreeConstructor::with_config(grammar, Config::default())
    }

    /// Creates a constructor with `config`.
    pub fn with_config(grammar: &'g Grammar, config: Config) -> AbstractSyntaxTreeConstructor<'g> {
        AbstractSyntaxTreeConstructor {
            grammar,
            config,
            node_stack: NodeStack::new(),
            errors: vec![],
        }
    }

    /// Enables a match cache of `depth` positions by `breadth` rules for subsequent builds.
    pub fn initialize_cache(&mut self, depth: usize, breadth: usize) {
        self.config.cache = Some(CacheConfig { depth, breadth });
    }

    /// Returns the diagnostics of the last build, including those of recovered pinned rules.
    pub fn errors(&self) -> &[Diagnostic] {
        &self.errors
    }

    /// Parses `source` and returns the root of the tree.
    ///
    /// # Errors
    ///
    /// * [`ParsingFailed`] when no node was produced.
    /// * [`ConstructionFailed`] when nodes were produced but the source could not be consumed to
    ///   the end.
    /// * [`UnknownError`] when the node stack was left unbalanced.
    ///
    /// [`ParsingFailed`]: error/enum.ConstructionError.html#variant.ParsingFailed
    /// [`ConstructionFailed`]: error/enum.ConstructionError.html#variant.ConstructionFailed
    /// [`UnknownError`]: error/enum.ConstructionError.html#variant.UnknownError
    pub fn build(&mut self, source: &Source) -> Result<Node, ConstructionError> {
        let grammar = self.grammar;
        let mut state = ParserState::new(grammar, source, &self.config);

        self.reset_state();
        self.will_build_from(source);
        let outcome = state.parse(self);
        self.did_build();

        if let Some(cache) = state.cache() {
            debug!(
                "match cache: {} hits, {} misses, {} entries",
                cache.hits(),
                cache.misses(),
                cache.len()
            );
        }

        self.errors = state.into_errors();
        self.generate(outcome.err())
    }

    fn generate(&mut self, failure: Option<Diagnostic>) -> Result<Node, ConstructionError> {
        if self.node_stack.depth() != 1 {
            return Err(ConstructionError::UnknownError {
                message: format!("node stack left at depth {}", self.node_stack.depth()),
            });
        }

        let failed = failure.is_some();
        self.errors.extend(failure);

        let mut nodes = mem::take(self.node_stack.top_mut()).into_nodes();

        if nodes.is_empty() {
            self.errors.push(Diagnostic::new(0..0, "No nodes created"));
            return Err(ConstructionError::ParsingFailed {
                causes: self.errors.clone(),
            });
        }
        if failed {
            return Err(ConstructionError::ConstructionFailed {
                causes: self.errors.clone(),
            });
        }

        if nodes.len() > 1 {
            let start = nodes.iter().map(Node::start).min().unwrap_or(0);
            let end = nodes.iter().map(Node::end).max().unwrap_or(start);

            return Ok(Node::with_children(
                Token::root(),
                start..end,
                nodes,
                Annotations::new(),
            ));
        }

        nodes.pop().ok_or_else(|| ConstructionError::UnknownError {
            message: "root frame emptied while generating".to_owned(),
        })
    }
}

impl<'g> IntermediateRepresentation for AbstractSyntaxTreeConstructor<'g> {
    fn will_build_from(&mut self, _source: &Source) {
        self.node_stack.reset();
    }

    fn evaluating(&mut self, _token: Option<&Token>) {
        self.node_stack.push();
    }

    fn succeeded(&mut self, production: Production<'_>) {
        let frame = self.node_stack.pop();

        match production {
            Production::Node {
                token,
                annotations,
                range,
            } => self.node_stack.top_mut().append(Node::with_children(
                token.clone(),
                range,
                frame.into_nodes(),
                annotations.clone(),
            )),
            Production::Transparent => self.node_stack.top_mut().extend(frame.into_nodes()),
            Production::Discarded => {}
        }
    }

    fn failed(&mut self) {
        self.node_stack.pop();
    }

    fn restored(&mut self, nodes: &[Node]) {
        self.node_stack.pop();
        self.node_stack.top_mut().extend(nodes.iter().cloned());
    }

    fn frame_len(&self) -> usize {
        self.node_stack.top().len()
    }

    fn truncate(&mut self, len: usize) {
        self.node_stack.top_mut().truncate(len);
    }

    fn contributed(&self, since: usize) -> Option<Vec<Node>> {
        Some(self.node_stack.top().nodes()[since..].to_vec())
    }

    fn reset_state(&mut self) {
        self.node_stack.reset();
        self.errors.clear();
    }
}
