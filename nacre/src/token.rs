// nacre. A grammar-driven parsing engine
// Copyright (c) 2026 The nacre contributors
//
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. All files in the project carrying such notice may not be copied,
// modified, or distributed except according to those terms.

use alloc::rc::Rc;
use core::fmt;

/// The label a structural rule attaches to the nodes it produces.
///
/// A token has a name and, optionally, a numeric id. Two tokens compare equal by id when both
/// carry one and by name otherwise.
///
/// # Examples
///
/// ```
/// # use nacre::Token;
/// assert_eq!(Token::new(1, "word"), Token::new(1, "renamed"));
/// assert_eq!(Token::new(1, "word"), Token::named("word"));
/// assert_ne!(Token::named("word"), Token::named("number"));
/// ```
#[derive(Clone, Debug)]
pub struct Token {
    id: Option<usize>,
    name: Rc<str>,
}

impl Token {
    /// Creates a token with both an id and a name.
    pub fn new(id: usize, name: &str) -> Token {
        Token {
            id: Some(id),
            name: name.into(),
        }
    }

    /// Creates a token identified only by its name.
    pub fn named(name: &str) -> Token {
        Token {
            id: None,
            name: name.into(),
        }
    }

    /// The token of the synthetic node wrapping several top-level nodes.
    pub fn root() -> Token {
        Token::named("root")
    }

    /// The token of the nodes produced when a pinned rule recovers from a failure.
    pub fn error() -> Token {
        Token::named("error")
    }

    /// Returns the id, if any.
    #[inline]
    pub fn id(&self) -> Option<usize> {
        self.id
    }

    /// Returns the name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns a token with the same id but a different name.
    pub fn renamed(&self, name: &str) -> Token {
        Token {
            id: self.id,
            name: name.into(),
        }
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Token) -> bool {
        match (self.id, other.id) {
            (Some(id), Some(other)) => id == other,
            _ => self.name == other.name,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl<'a> From<&'a str> for Token {
    fn from(name: &'a str) -> Token {
        Token::named(name)
    }
}

impl From<String> for Token {
    fn from(name: String) -> Token {
        Token::named(&name)
    }
}
