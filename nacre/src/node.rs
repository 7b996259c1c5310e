// nacre. A grammar-driven parsing engine
// Copyright (c) 2026 The nacre contributors
//
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. All files in the project carrying such notice may not be copied,
// modified, or distributed except according to those terms.

use core::fmt;
use core::ops::Range;

#[cfg(feature = "pretty-print")]
use serde::ser::SerializeStruct;

use crate::annotations::Annotations;
use crate::source::Source;
use crate::token::Token;

/// A node of the tree built from a source.
///
/// A node's range always contains the ranges of its children, and siblings are ordered by start
/// position.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    token: Token,
    range: Range<usize>,
    children: Vec<Node>,
    annotations: Annotations,
}

impl Node {
    /// Creates a leaf node.
    pub fn new(token: Token, range: Range<usize>, annotations: Annotations) -> Node {
        Node::with_children(token, range, vec![], annotations)
    }

    /// Creates a node with children.
    pub fn with_children(
        token: Token,
        range: Range<usize>,
        children: Vec<Node>,
        annotations: Annotations,
    ) -> Node {
        Node {
            token,
            range,
            children,
            annotations,
        }
    }

    /// Returns the token.
    #[inline]
    pub fn token(&self) -> &Token {
        &self.token
    }

    /// Returns the half-open range of scalars the node covers.
    #[inline]
    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }

    /// Returns the start of the range.
    #[inline]
    pub fn start(&self) -> usize {
        self.range.start
    }

    /// Returns the end of the range.
    #[inline]
    pub fn end(&self) -> usize {
        self.range.end
    }

    /// Returns the children.
    #[inline]
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Consumes the node, returning its children.
    pub fn into_children(self) -> Vec<Node> {
        self.children
    }

    /// Returns the annotations of the rule occurrence that produced the node.
    #[inline]
    pub fn annotations(&self) -> &Annotations {
        &self.annotations
    }

    /// Returns the text the node covers.
    ///
    /// # Examples
    ///
    /// ```
    /// # use nacre::{Annotations, Node, Source, Token};
    /// let source = Source::new("ab嗨c");
    /// let node = Node::new(Token::named("a"), 1..3, Annotations::new());
    ///
    /// assert_eq!(node.matched_str(&source), "b嗨");
    /// ```
    pub fn matched_str<'s>(&self, source: &'s Source) -> &'s str {
        source.slice(self.range())
    }

    /// Returns the first child named `name`.
    pub fn child(&self, name: &str) -> Option<&Node> {
        self.children.iter().find(|child| child.token.name() == name)
    }

    /// Returns every child named `name`.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Node> + 'a {
        self.children
            .iter()
            .filter(move |child| child.token.name() == name)
    }

    /// Returns `true` if the node was produced by a pinned rule recovering from a failure.
    pub fn is_error(&self) -> bool {
        self.token == Token::error() && self.annotations.error().is_some()
    }

    /// Returns the message of an error node.
    pub fn error_message(&self) -> Option<&str> {
        if self.is_error() {
            self.annotations.error()
        } else {
            None
        }
    }

    /// Returns every error node in the tree, depth-first.
    pub fn errors(&self) -> Vec<&Node> {
        self.descendants().filter(|node| node.is_error()).collect()
    }

    /// Iterates over the node and all of its descendants, depth-first.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }

    /// Iterates over the nodes without children, depth-first.
    pub fn leaves(&self) -> impl Iterator<Item = &Node> {
        self.descendants().filter(|node| node.children.is_empty())
    }

    /// Returns the tree as a pretty-printed JSON string.
    #[cfg(feature = "pretty-print")]
    pub fn to_json(&self) -> String {
        ::serde_json::to_string_pretty(self).expect("Failed to pretty-print Node to json.")
    }
}

/// Depth-first iterator over a [`Node`](struct.Node.html) and its descendants.
#[derive(Debug)]
pub struct Descendants<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<&'a Node> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());

        Some(node)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.children.is_empty() {
            write!(f, "{}({}, {})", self.token, self.start(), self.end())
        } else {
            write!(
                f,
                "{}({}, {}, [{}])",
                self.token,
                self.start(),
                self.end(),
                self.children
                    .iter()
                    .map(|child| child.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            )
        }
    }
}

#[cfg(feature = "pretty-print")]
impl ::serde::Serialize for Node {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: ::serde::Serializer,
    {
        let annotations: Vec<_> = self
            .annotations
            .iter()
            .map(|(annotation, value)| format!("{}{}", annotation, value))
            .collect();

        let mut ser = serializer.serialize_struct("Node", 4)?;
        ser.serialize_field("pos", &(self.start(), self.end()))?;
        ser.serialize_field("token", self.token.name())?;
        ser.serialize_field("annotations", &annotations)?;
        ser.serialize_field("inner", &self.children)?;
        ser.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotations::{Annotation, AnnotationValue};

    fn sentence() -> Node {
        let word = |start, end| Node::new(Token::named("word"), start..end, Annotations::new());
        let error = Node::new(
            Token::error(),
            11..11,
            Annotations::new().with(
                Annotation::Error,
                AnnotationValue::String("expected .".to_owned()),
            ),
        );

        Node::with_children(
            Token::named("sentence"),
            0..11,
            vec![word(0, 5), word(6, 11), error],
            Annotations::new(),
        )
    }

    #[test]
    fn display() {
        assert_eq!(
            sentence().to_string(),
            "sentence(0, 11, [word(0, 5), word(6, 11), error(11, 11)])"
        );
    }

    #[test]
    fn lookup() {
        let tree = sentence();

        assert_eq!(tree.child("word").map(Node::range), Some(0..5));
        assert_eq!(tree.children_named("word").count(), 2);
        assert!(tree.child("number").is_none());
    }

    #[test]
    fn matched_str() {
        let source = Source::new("Hello world");
        let tree = sentence();

        assert_eq!(tree.children()[1].matched_str(&source), "world");
        assert_eq!(tree.matched_str(&source), "Hello world");
    }

    #[test]
    fn errors() {
        let tree = sentence();
        let errors = tree.errors();

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].error_message(), Some("expected ."));
        assert!(!tree.is_error());
        assert_eq!(tree.error_message(), None);
    }

    #[test]
    fn traversal_order() {
        let tree = sentence();
        let names: Vec<_> = tree.descendants().map(|node| node.start()).collect();
        let leaves: Vec<_> = tree.leaves().map(|node| node.range()).collect();

        assert_eq!(names, vec![0, 0, 6, 11]);
        assert_eq!(leaves, vec![0..5, 6..11, 11..11]);
    }

    #[test]
    #[cfg(feature = "pretty-print")]
    fn test_pretty_print() {
        let node = Node::with_children(
            Token::named("a"),
            0..1,
            vec![Node::new(Token::named("b"), 0..1, Annotations::new())],
            Annotations::new().with(Annotation::Void, AnnotationValue::Set),
        );

        let expected = r#"{
  "pos": [
    0,
    1
  ],
  "token": "a",
  "annotations": [
    "@void"
  ],
  "inner": [
    {
      "pos": [
        0,
        1
      ],
      "token": "b",
      "annotations": [],
      "inner": []
    }
  ]
}"#;

        assert_eq!(expected, node.to_json());
    }
}
