// nacre. A grammar-driven parsing engine
// Copyright (c) 2026 The nacre contributors
//
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. All files in the project carrying such notice may not be copied,
// modified, or distributed except according to those terms.

use core::fmt;

use crate::error::GrammarError;
use crate::token::Token;

/// What a successful match contributes to the tree.
#[derive(Clone, Debug, PartialEq)]
pub enum Kind {
    /// Produces a node labelled with the token.
    Structural(Token),
    /// Consumes input and hands any child nodes to the parent.
    Scanning,
    /// Consumes input, drops child nodes and is trimmed off the parent's range when it sits at
    /// one of its edges.
    Skipping,
}

/// How many times a rule's test must succeed.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Cardinality {
    /// Minimum number of matches
    pub minimum: usize,
    /// Maximum number of matches, unbounded when `None`
    pub maximum: Option<usize>,
}

impl Cardinality {
    /// Exactly once.
    pub const ONE: Cardinality = Cardinality {
        minimum: 1,
        maximum: Some(1),
    };
    /// Zero or one time.
    pub const OPTIONAL: Cardinality = Cardinality {
        minimum: 0,
        maximum: Some(1),
    };
    /// Any number of times.
    pub const ZERO_OR_MORE: Cardinality = Cardinality {
        minimum: 0,
        maximum: None,
    };
    /// At least once.
    pub const ONE_OR_MORE: Cardinality = Cardinality {
        minimum: 1,
        maximum: None,
    };

    /// Creates a bounded or unbounded range, rejecting `maximum < minimum`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use nacre::Cardinality;
    /// assert!(Cardinality::range(2, Some(4)).is_ok());
    /// assert!(Cardinality::range(4, Some(2)).is_err());
    /// ```
    pub fn range(minimum: usize, maximum: Option<usize>) -> Result<Cardinality, GrammarError> {
        let cardinality = Cardinality { minimum, maximum };
        cardinality.validate()?;
        Ok(cardinality)
    }

    /// Returns `true` if `count` matches satisfy this cardinality.
    #[inline]
    pub fn accepts(&self, count: usize) -> bool {
        count >= self.minimum && self.maximum.map_or(true, |maximum| count <= maximum)
    }

    /// Returns `true` if zero matches are accepted.
    #[inline]
    pub fn is_optional(&self) -> bool {
        self.minimum == 0
    }

    pub(crate) fn validate(&self) -> Result<(), GrammarError> {
        match self.maximum {
            Some(maximum) if maximum < self.minimum => Err(GrammarError::InvalidCardinality {
                minimum: self.minimum,
                maximum,
            }),
            _ => Ok(()),
        }
    }
}

impl Default for Cardinality {
    fn default() -> Cardinality {
        Cardinality::ONE
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.minimum, self.maximum) {
            (1, Some(1)) => Ok(()),
            (0, Some(1)) => write!(f, "?"),
            (0, None) => write!(f, "*"),
            (1, None) => write!(f, "+"),
            (minimum, None) => write!(f, "{{{},}}", minimum),
            (minimum, Some(maximum)) if minimum == maximum => write!(f, "{{{}}}", minimum),
            (minimum, Some(maximum)) => write!(f, "{{{}, {}}}", minimum, maximum),
        }
    }
}

/// The matching behaviour of a rule occurrence.
#[derive(Clone, Debug, PartialEq)]
pub struct Behaviour {
    /// What a match contributes to the tree
    pub kind: Kind,
    /// How many times the test must match
    pub cardinality: Cardinality,
    /// Invert every iteration of the test
    pub negate: bool,
    /// Restore the position after a successful match
    pub lookahead: bool,
}

impl Behaviour {
    /// Creates a validated behaviour.
    ///
    /// # Examples
    ///
    /// ```
    /// # use nacre::{Behaviour, Cardinality, Kind, Token};
    /// let lookahead = Behaviour::new(Kind::Scanning, Cardinality::ONE, false, true);
    /// assert!(lookahead.is_ok());
    ///
    /// let structural = Behaviour::new(Kind::Structural(Token::named("a")), Cardinality::ONE, false, true);
    /// assert!(structural.is_err());
    /// ```
    pub fn new(
        kind: Kind,
        cardinality: Cardinality,
        negate: bool,
        lookahead: bool,
    ) -> Result<Behaviour, GrammarError> {
        let behaviour = Behaviour {
            kind,
            cardinality,
            negate,
            lookahead,
        };

        behaviour
            .check()
            .map_err(|reason| GrammarError::InvalidBehaviour {
                rule: behaviour.describe(),
                reason,
            })?;

        Ok(behaviour)
    }

    /// A structural behaviour matching exactly once.
    pub fn structural(token: Token) -> Behaviour {
        Behaviour {
            kind: Kind::Structural(token),
            ..Behaviour::scanning()
        }
    }

    /// A scanning behaviour matching exactly once.
    pub fn scanning() -> Behaviour {
        Behaviour {
            kind: Kind::Scanning,
            cardinality: Cardinality::ONE,
            negate: false,
            lookahead: false,
        }
    }

    /// A skipping behaviour matching exactly once.
    pub fn skipping() -> Behaviour {
        Behaviour {
            kind: Kind::Skipping,
            ..Behaviour::scanning()
        }
    }

    /// Returns the token when the behaviour is structural.
    #[inline]
    pub fn token(&self) -> Option<&Token> {
        match self.kind {
            Kind::Structural(ref token) => Some(token),
            _ => None,
        }
    }

    /// Returns `true` for `Kind::Skipping`.
    #[inline]
    pub fn is_skipping(&self) -> bool {
        self.kind == Kind::Skipping
    }

    pub(crate) fn check(&self) -> Result<(), &'static str> {
        if let Some(maximum) = self.cardinality.maximum {
            if maximum < self.cardinality.minimum {
                return Err("maximum cardinality is lower than its minimum");
            }
        }
        if self.lookahead && self.token().is_some() {
            return Err("lookahead rules cannot be structural");
        }
        if self.negate && self.cardinality.minimum == 0 {
            return Err("negated rules must match at least once");
        }

        Ok(())
    }

    fn describe(&self) -> String {
        let mut description = String::new();

        if self.lookahead {
            description.push_str(">>");
        }
        if self.negate {
            description.push('!');
        }
        description.push('_');
        description.push_str(&self.cardinality.to_string());
        if let Some(token) = self.token() {
            description.push_str(" as ");
            description.push_str(token.name());
        }

        description
    }
}

impl Default for Behaviour {
    fn default() -> Behaviour {
        Behaviour::scanning()
    }
}
