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
use core::ops::RangeInclusive;

use regex::Regex;

use crate::annotations::{Annotation, AnnotationValue, Annotations};
use crate::behaviour::{Behaviour, Cardinality, Kind};
use crate::error::GrammarError;
use crate::ir::IntermediateRepresentation;
use crate::parser_state::{ParseResult, ParserState};
use crate::scanner::Scanner;
use crate::token::Token;

/// A user-supplied test run by [`Expression::Closure`](enum.Expression.html) rules.
///
/// The closure drives the [`ParserState`](struct.ParserState.html) directly. It must leave the
/// scanner where it stopped matching on success; on `Err` the engine rewinds the position.
pub type Test =
    Rc<dyn Fn(&mut ParserState<'_, '_>, &mut dyn IntermediateRepresentation) -> ParseResult>;

/// A predefined class of characters.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CharacterSet {
    /// Alphabetic characters
    Letters,
    /// `0` to `9`
    DecimalDigits,
    /// Alphabetic or numeric characters
    Alphanumerics,
    /// Whitespace other than line terminators
    Whitespaces,
    /// Any whitespace
    WhitespacesAndNewlines,
    /// Line terminators
    Newlines,
    /// ASCII punctuation
    Punctuation,
    /// Every character of the string
    Custom(String),
    /// Any character of any of the sets
    Union(Vec<CharacterSet>),
}

impl CharacterSet {
    /// Returns `true` if `c` belongs to the set.
    ///
    /// # Examples
    ///
    /// ```
    /// # use nacre::CharacterSet;
    /// assert!(CharacterSet::Letters.contains('é'));
    /// assert!(!CharacterSet::Whitespaces.contains('\n'));
    /// assert!(CharacterSet::Custom("+-".to_owned()).contains('-'));
    /// ```
    pub fn contains(&self, c: char) -> bool {
        match *self {
            CharacterSet::Letters => c.is_alphabetic(),
            CharacterSet::DecimalDigits => c.is_ascii_digit(),
            CharacterSet::Alphanumerics => c.is_alphanumeric(),
            CharacterSet::Whitespaces => c.is_whitespace() && !is_newline(c),
            CharacterSet::WhitespacesAndNewlines => c.is_whitespace(),
            CharacterSet::Newlines => is_newline(c),
            CharacterSet::Punctuation => c.is_ascii_punctuation(),
            CharacterSet::Custom(ref chars) => chars.contains(c),
            CharacterSet::Union(ref sets) => sets.iter().any(|set| set.contains(c)),
        }
    }
}

fn is_newline(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\u{000B}' | '\u{000C}' | '\u{0085}' | '\u{2028}' | '\u{2029}'
    )
}

impl fmt::Display for CharacterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            CharacterSet::Letters => write!(f, ".letters"),
            CharacterSet::DecimalDigits => write!(f, ".decimalDigits"),
            CharacterSet::Alphanumerics => write!(f, ".alphanumerics"),
            CharacterSet::Whitespaces => write!(f, ".whitespaces"),
            CharacterSet::WhitespacesAndNewlines => write!(f, ".whitespacesAndNewlines"),
            CharacterSet::Newlines => write!(f, ".newlines"),
            CharacterSet::Punctuation => write!(f, ".punctuation"),
            CharacterSet::Custom(ref chars) => write!(f, "[{:?}]", chars),
            CharacterSet::Union(ref sets) => {
                let sets: Vec<_> = sets.iter().map(|set| set.to_string()).collect();
                write!(f, "({})", sets.join(" | "))
            }
        }
    }
}

/// A primitive test that matches directly against the scanner.
#[derive(Clone, Debug)]
pub enum Terminal {
    /// Exact string
    Literal(String),
    /// String compared without regard to case
    Insensitive(String),
    /// One character from a set
    Set(CharacterSet),
    /// One character from an inclusive range
    Range(RangeInclusive<char>),
    /// A regular expression anchored at the current position
    Regex {
        /// The pattern as written
        pattern: String,
        /// The compiled, anchored pattern
        regex: Regex,
    },
    /// Any one character
    Any,
    /// The end of the source; never consumes
    EndOfInput,
}

impl Terminal {
    /// Compiles `pattern` into an anchored regular expression terminal.
    pub fn regex(pattern: &str) -> Result<Terminal, GrammarError> {
        let regex = Regex::new(&format!("^(?:{})", pattern))?;

        Ok(Terminal::Regex {
            pattern: pattern.to_owned(),
            regex,
        })
    }

    pub(crate) fn scan(&self, scanner: &mut Scanner<'_>) -> bool {
        match *self {
            Terminal::Literal(ref string) => scanner.scan_string(string),
            Terminal::Insensitive(ref string) => scanner.scan_insensitive(string),
            Terminal::Set(ref set) => scanner.scan_char_by(|c| set.contains(c)),
            Terminal::Range(ref range) => scanner.scan_char_by(|c| range.contains(&c)),
            Terminal::Regex { ref regex, .. } => scanner.scan_regex(regex),
            Terminal::Any => scanner.consume().is_some(),
            Terminal::EndOfInput => scanner.end_of_input(),
        }
    }

    pub(crate) fn can_be_empty(&self) -> bool {
        match *self {
            Terminal::Literal(ref string) | Terminal::Insensitive(ref string) => string.is_empty(),
            Terminal::Regex { ref regex, .. } => regex.is_match(""),
            Terminal::EndOfInput => true,
            Terminal::Set(_) | Terminal::Range(_) | Terminal::Any => false,
        }
    }
}

impl fmt::Display for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Terminal::Literal(ref string) => write!(f, "{:?}", string),
            Terminal::Insensitive(ref string) => write!(f, "^{:?}", string),
            Terminal::Set(ref set) => write!(f, "{}", set),
            Terminal::Range(ref range) => write!(f, "{:?}..{:?}", range.start(), range.end()),
            Terminal::Regex { ref pattern, .. } => write!(f, "/{}/", pattern),
            Terminal::Any => write!(f, "ANY"),
            Terminal::EndOfInput => write!(f, "EOI"),
        }
    }
}

/// The test of a rule.
#[derive(Clone)]
pub enum Expression {
    /// Matches a terminal.
    Terminal(Terminal),
    /// Matches the rule defined under `name`.
    ///
    /// The behaviour and annotations, when given, replace the target's own for this occurrence
    /// only.
    Reference {
        /// Name of the target rule
        name: String,
        /// Behaviour replacing the target's
        behaviour: Option<Behaviour>,
        /// Annotations replacing the target's
        annotations: Option<Annotations>,
    },
    /// Runs a user-supplied test.
    Closure(Test),
    /// Matches every rule in order.
    Sequence(Vec<Rule>),
    /// Matches the first rule that succeeds.
    Choice(Vec<Rule>),
    /// Matches the inner rule.
    Group(Box<Rule>),
}

impl fmt::Debug for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Expression::Terminal(ref terminal) => f.debug_tuple("Terminal").field(terminal).finish(),
            Expression::Reference {
                ref name,
                ref behaviour,
                ref annotations,
            } => f
                .debug_struct("Reference")
                .field("name", name)
                .field("behaviour", behaviour)
                .field("annotations", annotations)
                .finish(),
            Expression::Closure(_) => f.write_str("Closure"),
            Expression::Sequence(ref rules) => f.debug_tuple("Sequence").field(rules).finish(),
            Expression::Choice(ref rules) => f.debug_tuple("Choice").field(rules).finish(),
            Expression::Group(ref rule) => f.debug_tuple("Group").field(rule).finish(),
        }
    }
}

/// A rule occurrence: a test plus the behaviour and annotations applied to it.
///
/// Rules are values. Every combinator returns a new rule sharing the same test, so a rule can
/// be reused with different behaviours and annotations at different places in a grammar.
///
/// # Examples
///
/// ```
/// # use nacre::{CharacterSet, Rule};
/// let word = Rule::set(CharacterSet::Letters).one_or_more().token("word");
/// let words = Rule::sequence(vec![
///     word.clone(),
///     Rule::sequence(vec![Rule::literal(" ").skip(), word]).zero_or_more(),
/// ]);
///
/// assert_eq!(words.to_string(), "(.letters+ as word (-\" \" .letters+ as word)*)");
/// ```
#[derive(Clone, Debug)]
pub struct Rule {
    behaviour: Behaviour,
    annotations: Annotations,
    expression: Expression,
}

impl Rule {
    /// Creates a scanning rule matching `expression` exactly once.
    pub fn new(expression: Expression) -> Rule {
        Rule {
            behaviour: Behaviour::scanning(),
            annotations: Annotations::new(),
            expression,
        }
    }

    /// Matches `terminal`.
    pub fn terminal(terminal: Terminal) -> Rule {
        Rule::new(Expression::Terminal(terminal))
    }

    /// Matches `string` exactly.
    pub fn literal(string: &str) -> Rule {
        Rule::terminal(Terminal::Literal(string.to_owned()))
    }

    /// Matches `string` ignoring case.
    pub fn insensitive(string: &str) -> Rule {
        Rule::terminal(Terminal::Insensitive(string.to_owned()))
    }

    /// Matches one character of `set`.
    pub fn set(set: CharacterSet) -> Rule {
        Rule::terminal(Terminal::Set(set))
    }

    /// Matches one character between `start` and `end`, inclusive.
    pub fn range(start: char, end: char) -> Rule {
        Rule::terminal(Terminal::Range(start..=end))
    }

    /// Matches `pattern` at the current position.
    pub fn regex(pattern: &str) -> Result<Rule, GrammarError> {
        Ok(Rule::terminal(Terminal::regex(pattern)?))
    }

    /// Matches any one character.
    pub fn any() -> Rule {
        Rule::terminal(Terminal::Any)
    }

    /// Matches the end of the source.
    pub fn end_of_input() -> Rule {
        Rule::terminal(Terminal::EndOfInput)
    }

    /// Matches the rule defined under `name` with its own behaviour and annotations.
    pub fn reference(name: &str) -> Rule {
        Rule::reference_with(name, None, None)
    }

    /// Matches the test of the rule defined under `name`, replacing its behaviour and
    /// annotations for this occurrence.
    pub fn reference_with(
        name: &str,
        behaviour: Option<Behaviour>,
        annotations: Option<Annotations>,
    ) -> Rule {
        Rule::new(Expression::Reference {
            name: name.to_owned(),
            behaviour,
            annotations,
        })
    }

    /// Runs `test` as the rule's test.
    pub fn closure<F>(test: F) -> Rule
    where
        F: Fn(&mut ParserState<'_, '_>, &mut dyn IntermediateRepresentation) -> ParseResult
            + 'static,
    {
        Rule::new(Expression::Closure(Rc::new(test)))
    }

    /// Matches every rule of `rules` in order.
    pub fn sequence(rules: Vec<Rule>) -> Rule {
        Rule::new(Expression::Sequence(rules))
    }

    /// Matches the first rule of `rules` that succeeds.
    pub fn choice(rules: Vec<Rule>) -> Rule {
        Rule::new(Expression::Choice(rules))
    }

    /// Wraps `rule` so that it can carry a second behaviour.
    pub fn group(rule: Rule) -> Rule {
        Rule::new(Expression::Group(Box::new(rule)))
    }

    /// Returns the behaviour.
    #[inline]
    pub fn behaviour(&self) -> &Behaviour {
        &self.behaviour
    }

    /// Returns the annotations.
    #[inline]
    pub fn annotations(&self) -> &Annotations {
        &self.annotations
    }

    /// Returns the test.
    #[inline]
    pub fn expression(&self) -> &Expression {
        &self.expression
    }

    /// Returns the rule with its behaviour replaced.
    pub fn with_behaviour(mut self, behaviour: Behaviour) -> Rule {
        self.behaviour = behaviour;
        self
    }

    /// Returns the rule with its annotations replaced.
    pub fn with_annotations(mut self, annotations: Annotations) -> Rule {
        self.annotations = annotations;
        self
    }

    /// Makes the rule structural, producing nodes labelled `token`.
    pub fn token<T: Into<Token>>(mut self, token: T) -> Rule {
        self.behaviour.kind = Kind::Structural(token.into());
        self
    }

    /// Makes the rule scanning.
    pub fn scan(mut self) -> Rule {
        self.behaviour.kind = Kind::Scanning;
        self
    }

    /// Makes the rule skipping.
    pub fn skip(mut self) -> Rule {
        self.behaviour.kind = Kind::Skipping;
        self
    }

    /// Sets the cardinality.
    pub fn require(mut self, cardinality: Cardinality) -> Rule {
        self.behaviour.cardinality = cardinality;
        self
    }

    /// Shorthand for `require(Cardinality::ONE_OR_MORE)`.
    pub fn one_or_more(self) -> Rule {
        self.require(Cardinality::ONE_OR_MORE)
    }

    /// Shorthand for `require(Cardinality::ZERO_OR_MORE)`.
    pub fn zero_or_more(self) -> Rule {
        self.require(Cardinality::ZERO_OR_MORE)
    }

    /// Shorthand for `require(Cardinality::OPTIONAL)`.
    pub fn optional(self) -> Rule {
        self.require(Cardinality::OPTIONAL)
    }

    /// Inverts every iteration of the test.
    pub fn negate(mut self) -> Rule {
        self.behaviour.negate = true;
        self
    }

    /// Makes the rule a lookahead.
    pub fn lookahead(mut self) -> Rule {
        self.behaviour.lookahead = true;
        self
    }

    /// Sets an annotation.
    pub fn annotate(mut self, annotation: Annotation, value: AnnotationValue) -> Rule {
        self.annotations.insert(annotation, value);
        self
    }

    /// Pins the rule so that its failures are recovered from.
    pub fn pin(self) -> Rule {
        self.annotate(Annotation::Pinned, AnnotationValue::Set)
    }

    /// Sets the message reported when the rule fails.
    pub fn error(self, message: &str) -> Rule {
        self.annotate(Annotation::Error, AnnotationValue::String(message.to_owned()))
    }

    /// Drops the nodes the rule produces.
    pub fn void(self) -> Rule {
        self.annotate(Annotation::Void, AnnotationValue::Set)
    }

    /// Replaces the rule's node with its children.
    pub fn transient(self) -> Rule {
        self.annotate(Annotation::Transient, AnnotationValue::Set)
    }

    /// Renames the token of the rule's node.
    pub fn rename(self, name: &str) -> Rule {
        self.annotate(Annotation::Token, AnnotationValue::String(name.to_owned()))
    }
}

impl From<Terminal> for Rule {
    fn from(terminal: Terminal) -> Rule {
        Rule::terminal(terminal)
    }
}

impl From<CharacterSet> for Rule {
    fn from(set: CharacterSet) -> Rule {
        Rule::set(set)
    }
}

impl<'a> From<&'a str> for Rule {
    fn from(string: &'a str) -> Rule {
        Rule::literal(string)
    }
}

fn join(rules: &[Rule], separator: &str) -> String {
    rules
        .iter()
        .map(|rule| rule.to_string())
        .collect::<Vec<_>>()
        .join(separator)
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.annotations.is_empty() {
            write!(f, "{} ", self.annotations)?;
        }
        if self.behaviour.is_skipping() {
            write!(f, "-")?;
        }
        if self.behaviour.lookahead {
            write!(f, ">>")?;
        }
        if self.behaviour.negate {
            write!(f, "!")?;
        }

        match self.expression {
            Expression::Terminal(ref terminal) => write!(f, "{}", terminal)?,
            Expression::Reference { ref name, .. } => write!(f, "{}", name)?,
            Expression::Closure(_) => write!(f, "{{closure}}")?,
            Expression::Sequence(ref rules) => write!(f, "({})", join(rules, " "))?,
            Expression::Choice(ref rules) => write!(f, "({})", join(rules, " | "))?,
            Expression::Group(ref rule) => write!(f, "({})", rule)?,
        }

        write!(f, "{}", self.behaviour.cardinality)?;

        match self.behaviour.token() {
            Some(token) => write!(f, " as {}", token),
            None => Ok(()),
        }
    }
}
