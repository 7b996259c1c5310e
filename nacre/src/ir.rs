// nacre. A grammar-driven parsing engine
// Copyright (c) 2026 The nacre contributors
//
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. All files in the project carrying such notice may not be copied,
// modified, or distributed except according to those terms.

//! The protocol between the rule engine and the structures it builds.
//!
//! The engine reports every rule evaluation to an [`IntermediateRepresentation`]: it calls
//! [`evaluating`] when a rule starts and exactly one of [`succeeded`], [`failed`] or
//! [`restored`] when it ends, so the calls always nest like brackets.
//!
//! [`IntermediateRepresentation`]: trait.IntermediateRepresentation.html
//! [`evaluating`]: trait.IntermediateRepresentation.html#tymethod.evaluating
//! [`succeeded`]: trait.IntermediateRepresentation.html#tymethod.succeeded
//! [`failed`]: trait.IntermediateRepresentation.html#tymethod.failed
//! [`restored`]: trait.IntermediateRepresentation.html#tymethod.restored

use core::fmt;
use core::ops::Range;

use log::warn;

use crate::annotations::Annotations;
use crate::node::Node;
use crate::source::Source;
use crate::token::Token;

/// What a successful rule contributes to the structure being built.
#[derive(Debug)]
pub enum Production<'r> {
    /// A node wrapping whatever the rule's children contributed.
    Node {
        /// Token of the node
        token: &'r Token,
        /// Annotations of the rule occurrence
        annotations: &'r Annotations,
        /// Range of the node, with skipped edges trimmed
        range: Range<usize>,
    },
    /// The children's contributions, handed to the parent unchanged.
    Transparent,
    /// Nothing; the children's contributions are dropped.
    Discarded,
}

/// Receives the engine's notifications and builds something out of them.
pub trait IntermediateRepresentation {
    /// Called once before the first pass over `source`.
    fn will_build_from(&mut self, source: &Source);

    /// Called when a rule starts matching. `token` is the rule's token when it is structural.
    fn evaluating(&mut self, token: Option<&Token>);

    /// Called when the rule most recently started succeeds.
    fn succeeded(&mut self, production: Production<'_>);

    /// Called when the rule most recently started fails.
    fn failed(&mut self);

    /// Called instead of [`succeeded`](#tymethod.succeeded) when the rule's result comes from the
    /// match cache. `nodes` are the contributions recorded by
    /// [`contributed`](#method.contributed) when the result was cached.
    fn restored(&mut self, nodes: &[Node]);

    /// Returns how many contributions the innermost open rule has collected so far.
    fn frame_len(&self) -> usize {
        0
    }

    /// Drops the innermost open rule's contributions past `len`. Used when the engine backtracks
    /// inside a rule.
    fn truncate(&mut self, len: usize) {
        let _ = len;
    }

    /// Returns the contributions the last finished rule made to its parent, starting at frame
    /// length `since`. Returning `None` keeps successful matches out of the match cache.
    fn contributed(&self, since: usize) -> Option<Vec<Node>> {
        let _ = since;
        None
    }

    /// Called once after the last pass.
    fn did_build(&mut self) {}

    /// Clears any state left from a previous build.
    fn reset_state(&mut self) {}
}

/// The nodes collected by one open rule.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MatchFrame {
    nodes: Vec<Node>,
}

impl MatchFrame {
    /// Creates an empty frame.
    pub fn new() -> MatchFrame {
        MatchFrame::default()
    }

    /// Appends a node.
    pub fn append(&mut self, node: Node) {
        self.nodes.push(node);
    }

    /// Appends several nodes.
    pub fn extend<I: IntoIterator<Item = Node>>(&mut self, nodes: I) {
        self.nodes.extend(nodes);
    }

    /// Returns the collected nodes.
    #[inline]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Consumes the frame, returning its nodes.
    pub fn into_nodes(self) -> Vec<Node> {
        self.nodes
    }

    /// Returns the number of nodes.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if no node was collected.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Drops the nodes past `len`.
    pub fn truncate(&mut self, len: usize) {
        self.nodes.truncate(len);
    }

    /// Returns the smallest range covering every node.
    pub fn combined_range(&self) -> Option<Range<usize>> {
        let start = self.nodes.iter().map(Node::start).min()?;
        let end = self.nodes.iter().map(Node::end).max()?;

        Some(start..end)
    }
}

impl fmt::Display for MatchFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} nodes", self.nodes.len())
    }
}

/// A stack of [`MatchFrame`](struct.MatchFrame.html)s, one per open rule, on top of a root frame
/// that is never removed.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeStack {
    frames: Vec<MatchFrame>,
}

impl NodeStack {
    /// Creates a stack holding only the root frame.
    pub fn new() -> NodeStack {
        NodeStack {
            frames: vec![MatchFrame::new()],
        }
    }

    /// Returns the number of frames, root included.
    #[inline]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Opens a frame.
    pub fn push(&mut self) {
        self.frames.push(MatchFrame::new());
    }

    /// Closes the top frame and returns it. The root frame cannot be closed; trying returns an
    /// empty frame.
    pub fn pop(&mut self) -> MatchFrame {
        if self.frames.len() == 1 {
            warn!("attempted to pop the root frame of a NodeStack");
            return MatchFrame::new();
        }

        self.frames.pop().unwrap_or_default()
    }

    /// Returns the top frame.
    pub fn top(&self) -> &MatchFrame {
        &self.frames[self.frames.len() - 1]
    }

    /// Returns the top frame mutably.
    pub fn top_mut(&mut self) -> &mut MatchFrame {
        let last = self.frames.len() - 1;
        &mut self.frames[last]
    }

    /// Returns every frame, root first.
    pub fn all(&self) -> &[MatchFrame] {
        &self.frames
    }

    /// Drops every frame and starts over with an empty root frame.
    pub fn reset(&mut self) {
        self.frames.clear();
        self.frames.push(MatchFrame::new());
    }
}

impl Default for NodeStack {
    fn default() -> NodeStack {
        NodeStack::new()
    }
}

impl fmt::Display for NodeStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "NodeStack: ")?;
        for frame in self.frames.iter().rev() {
            writeln!(f, "{}", frame)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(start: usize, end: usize) -> Node {
        Node::new(Token::named("n"), start..end, Annotations::new())
    }

    #[test]
    fn root_frame_survives_pop() {
        let mut stack = NodeStack::new();
        stack.top_mut().append(node(0, 1));

        assert!(stack.pop().is_empty());
        assert_eq!(stack.depth(), 1);
        assert_eq!(stack.top().len(), 1);
    }

    #[test]
    fn push_and_pop() {
        let mut stack = NodeStack::new();
        stack.push();
        stack.top_mut().append(node(0, 1));
        stack.top_mut().append(node(1, 3));

        assert_eq!(stack.depth(), 2);

        let frame = stack.pop();

        assert_eq!(frame.len(), 2);
        assert_eq!(frame.combined_range(), Some(0..3));
        assert_eq!(stack.depth(), 1);
        assert!(stack.top().is_empty());
    }

    #[test]
    fn description() {
        let mut stack = NodeStack::new();
        stack.top_mut().append(node(0, 1));
        stack.push();

        assert_eq!(stack.to_string(), "NodeStack: \n0 nodes\n1 nodes\n");
    }

    #[test]
    fn reset() {
        let mut stack = NodeStack::new();
        stack.push();
        stack.push();
        stack.top_mut().append(node(0, 1));
        stack.reset();

        assert_eq!(stack.depth(), 1);
        assert!(stack.top().is_empty());
        assert_eq!(MatchFrame::new().combined_range(), None);
    }
}
