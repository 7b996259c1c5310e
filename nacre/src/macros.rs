// nacre. A grammar-driven parsing engine
// Copyright (c) 2026 The nacre contributors
//
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. All files in the project carrying such notice may not be copied,
// modified, or distributed except according to those terms.

#[doc(hidden)]
#[macro_export]
macro_rules! consumes_to {
    ( $_nodes:expr, [] ) => ();
    ( $nodes:expr, [ $name:ident ( $start:expr, $end:expr ) ] ) => {
        let expected = format!("expected {}({}, {})", stringify!($name), $start, $end);
        match $nodes.next() {
            Some(node) => {
                let node: &$crate::Node = node;
                assert_eq!(node.token().name(), stringify!($name), "{} but found {}", expected, node);
                assert_eq!(node.start(), $start, "{} but found {}", expected, node);
                assert_eq!(node.end(), $end, "{} but found {}", expected, node);
                assert!(node.children().is_empty(), "{} but found {}", expected, node);
            }
            None => panic!("{} but found nothing", expected)
        };
    };
    ( $nodes:expr, [ $name:ident ( $start:expr, $end:expr ),
                     $( $names:ident $calls:tt ),* $(,)* ] ) => {
        $crate::consumes_to!($nodes, [ $name ( $start, $end ) ]);
        $crate::consumes_to!($nodes, [ $( $names $calls ),* ]);
    };
    ( $nodes:expr, [ $name:ident ( $start:expr, $end:expr,
                                   [ $( $nested_names:ident $nested_calls:tt ),*
                                   $(,)* ] ) ] ) => {
        let expected = format!("expected {}({}, {}, [..])", stringify!($name), $start, $end);
        match $nodes.next() {
            Some(node) => {
                let node: &$crate::Node = node;
                assert_eq!(node.token().name(), stringify!($name), "{} but found {}", expected, node);
                assert_eq!(node.start(), $start, "{} but found {}", expected, node);
                assert_eq!(node.end(), $end, "{} but found {}", expected, node);

                let mut children = node.children().iter();
                $crate::consumes_to!(children, [ $( $nested_names $nested_calls ),* ]);

                if let Some(extra) = children.next() {
                    panic!("{} but found extra child {} in {}", expected, extra, node);
                }
            }
            None => panic!("{} but found nothing", expected)
        };
    };
    ( $nodes:expr, [ $name:ident ( $start:expr, $end:expr,
                                   [ $( $nested_names:ident $nested_calls:tt ),*
                                   $(,)* ] ),
                     $( $names:ident $calls:tt ),* ] ) => {
        $crate::consumes_to!($nodes, [ $name ( $start, $end, [ $( $nested_names $nested_calls ),* ] ) ]);
        $crate::consumes_to!($nodes, [ $( $names $calls ),* ]);
    };
}

/// Testing tool that compares the tree produced by a grammar to an expected shape.
///
/// Every node is written as `name(start, end)` or `name(start, end, [children])`, where `name`
/// is the token name and positions are counted in scalars. When the grammar wraps several
/// top-level nodes in a `root` node, the expected list describes its children.
///
/// # Panics
///
/// Panics if the source fails to parse or the tree does not have the expected shape.
///
/// # Examples
///
/// ```
/// # #[macro_use]
/// # extern crate nacre;
/// # use nacre::{CharacterSet, Grammar, Rule};
/// # fn main() {
/// let grammar = Grammar::builder()
///     .rule("letter", Rule::set(CharacterSet::Letters).token("letter"))
///     .root(Rule::reference("letter").one_or_more().token("word"))
///     .build()
///     .unwrap();
///
/// parses_to! {
///     grammar: grammar,
///     input: "ab",
///     tokens: [
///         word(0, 2, [
///             letter(0, 1),
///             letter(1, 2)
///         ])
///     ]
/// };
/// # }
/// ```
#[macro_export]
macro_rules! parses_to {
    ( grammar: $grammar:expr, input: $string:expr,
      tokens: [ $( $names:ident $calls:tt ),* $(,)* ] ) => {

        #[allow(unused_mut)]
        {
            let source = $crate::Source::new($string);
            let tree = match $grammar.parse(&source) {
                Ok(tree) => tree,
                Err(error) => panic!("{}", error)
            };

            let nodes = if tree.token() == &$crate::Token::root() {
                tree.into_children()
            } else {
                vec![tree]
            };
            let mut iter = nodes.iter();

            $crate::consumes_to!(iter, [ $( $names $calls ),* ]);

            if let Some(rest) = iter.next() {
                panic!("expected end of tree, but found {}", rest);
            }
        }
    };
}

/// Testing tool that compares the failure of a grammar to an expected message and position.
///
/// # Panics
///
/// Panics if the source parses or no diagnostic with `message` starts at `pos`.
///
/// # Examples
///
/// ```
/// # #[macro_use]
/// # extern crate nacre;
/// # use nacre::{Grammar, Rule};
/// # fn main() {
/// let grammar = Grammar::builder()
///     .root(Rule::literal("a").token("a"))
///     .build()
///     .unwrap();
///
/// fails_with! {
///     grammar: grammar,
///     input: "b",
///     message: "expected a",
///     pos: 0
/// };
/// # }
/// ```
#[macro_export]
macro_rules! fails_with {
    ( grammar: $grammar:expr, input: $string:expr, message: $message:expr, pos: $pos:expr ) => {
        #[allow(unused_mut)]
        {
            let source = $crate::Source::new($string);
            let error = match $grammar.parse(&source) {
                Ok(tree) => panic!("expected failure, but parsed {}", tree),
                Err(error) => error
            };

            let found = error
                .causes()
                .iter()
                .any(|cause| cause.message() == $message && cause.range().start == $pos);

            assert!(found, "expected {:?} at {}, but found {}", $message, $pos, error);
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::{CharacterSet, Grammar, Rule};

    fn sentence() -> Grammar {
        Grammar::builder()
            .rule("word", Rule::set(CharacterSet::Letters).one_or_more().token("word"))
            .rule("space", Rule::literal(" ").skip())
            .root(
                Rule::sequence(vec![
                    Rule::reference("word"),
                    Rule::sequence(vec![Rule::reference("space"), Rule::reference("word")])
                        .zero_or_more(),
                ])
                .token("sentence"),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn parses_to() {
        parses_to! {
            grammar: sentence(),
            input: "ab cd",
            tokens: [
                sentence(0, 5, [
                    word(0, 2),
                    word(3, 5)
                ])
            ]
        };
    }

    #[test]
    #[should_panic]
    fn missing_node() {
        parses_to! {
            grammar: sentence(),
            input: "ab cd",
            tokens: [
                sentence(0, 5, [
                    word(0, 2)
                ])
            ]
        };
    }

    #[test]
    #[should_panic]
    fn wrong_end() {
        parses_to! {
            grammar: sentence(),
            input: "ab cd",
            tokens: [
                sentence(0, 5, [
                    word(0, 2),
                    word(3, 4)
                ])
            ]
        };
    }

    #[test]
    fn fails_with() {
        fails_with! {
            grammar: sentence(),
            input: "1",
            message: "expected word",
            pos: 0
        };
    }
}
