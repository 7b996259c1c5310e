// nacre. A grammar-driven parsing engine
// Copyright (c) 2026 The nacre contributors
//
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. All files in the project carrying such notice may not be copied,
// modified, or distributed except according to those terms.

//! Types for the errors produced while building grammars and parsing sources.

use core::ops::Range;

use crate::source::Source;

/// A message about a range of a [`Source`](../struct.Source.html).
#[derive(Clone, Debug, Eq, Hash, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct Diagnostic {
    range: Range<usize>,
    message: String,
}

impl Diagnostic {
    /// Creates a diagnostic covering `range`.
    pub fn new<S: Into<String>>(range: Range<usize>, message: S) -> Diagnostic {
        Diagnostic {
            range,
            message: message.into(),
        }
    }

    /// Returns the range the diagnostic refers to.
    #[inline]
    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }

    /// Returns the message.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Renders the diagnostic against `source`, pointing at the offending line.
    ///
    /// # Examples
    ///
    /// ```
    /// # use nacre::Source;
    /// # use nacre::error::Diagnostic;
    /// let source = Source::new("ab\ncd\nef");
    /// let diagnostic = Diagnostic::new(4..4, "expected letter");
    ///
    /// assert_eq!(diagnostic.render(&source), vec![
    ///     " --> 2:2",
    ///     "  |",
    ///     "2 | cd",
    ///     "  |  ^---",
    ///     "  |",
    ///     "  = expected letter"
    /// ].join("\n"));
    /// ```
    pub fn render(&self, source: &Source) -> String {
        let (line, col) = source.line_col(self.range.start);
        let line_str = source.line_of(self.range.start);
        let spacing = " ".repeat(line.to_string().len());

        let mut result = String::new();

        result.push_str(&format!("{}--> {}:{}\n", spacing, line, col));
        result.push_str(&format!("{} |\n", spacing));
        result.push_str(&format!("{} | {}\n", line, line_str));
        result.push_str(&format!(
            "{} | {}{}\n",
            spacing,
            " ".repeat(col - 1),
            self.underline((line_str.chars().count() + 1).saturating_sub(col))
        ));
        result.push_str(&format!("{} |\n", spacing));
        result.push_str(&format!("{} = {}", spacing, self.message));

        result
    }

    fn underline(&self, room: usize) -> String {
        let len = (self.range.end.saturating_sub(self.range.start)).min(room.max(1));

        match len {
            0 => "^---".to_owned(),
            1 => "^".to_owned(),
            len => format!("^{}^", "-".repeat(len - 2)),
        }
    }
}

/// An error raised while building a [`Grammar`](../struct.Grammar.html).
#[derive(Debug, thiserror::Error)]
pub enum GrammarError {
    /// A reference names a rule that was never defined.
    #[error("undefined rule {0}")]
    UndefinedRule(String),
    /// Two definitions share a name.
    #[error("rule {0} is defined more than once")]
    DuplicateRule(String),
    /// A behaviour combines incompatible settings.
    #[error("invalid behaviour for {rule}: {reason}")]
    InvalidBehaviour {
        /// Description of the offending rule
        rule: String,
        /// What is wrong with it
        reason: &'static str,
    },
    /// A cardinality's maximum is lower than its minimum.
    #[error("invalid cardinality {{{minimum}, {maximum}}}")]
    InvalidCardinality {
        /// Minimum number of matches
        minimum: usize,
        /// Maximum number of matches
        maximum: usize,
    },
    /// A regular expression terminal failed to compile.
    #[error("invalid regular expression: {0}")]
    InvalidRegex(#[from] regex::Error),
    /// A rule can reach itself without consuming input.
    #[error("rule {rule} is left-recursive ({chain})")]
    LeftRecursion {
        /// Name of the rule
        rule: String,
        /// The chain of references leading back to it
        chain: String,
    },
    /// The builder was given no root rule.
    #[error("no root rule was supplied")]
    MissingRoot,
}

/// The reasons a tree could not be constructed.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ConstructionError {
    /// The grammar did not produce any node.
    #[error("parsing failed: {}", messages(.causes))]
    ParsingFailed {
        /// Every diagnostic collected during the build
        causes: Vec<Diagnostic>,
    },
    /// Nodes were produced but the source was not consumed cleanly.
    #[error("construction failed: {}", messages(.causes))]
    ConstructionFailed {
        /// Every diagnostic collected during the build
        causes: Vec<Diagnostic>,
    },
    /// The builder ended up in an inconsistent state.
    #[error("unknown error: {message}")]
    UnknownError {
        /// Description of the inconsistency
        message: String,
    },
}

impl ConstructionError {
    /// Returns the diagnostics behind the error.
    pub fn causes(&self) -> &[Diagnostic] {
        match *self {
            ConstructionError::ParsingFailed { ref causes }
            | ConstructionError::ConstructionFailed { ref causes } => causes,
            ConstructionError::UnknownError { .. } => &[],
        }
    }

    /// Returns the messages of every cause joined with `", "`, or the message of an
    /// [`UnknownError`](#variant.UnknownError).
    pub fn message(&self) -> String {
        match *self {
            ConstructionError::UnknownError { ref message } => message.clone(),
            ref error => messages(error.causes()),
        }
    }

    /// Returns the smallest range covering every cause.
    pub fn range(&self) -> Option<Range<usize>> {
        let causes = self.causes();
        let start = causes.iter().map(|cause| cause.range.start).min()?;
        let end = causes.iter().map(|cause| cause.range.end).max()?;

        Some(start..end)
    }
}

fn messages(causes: &[Diagnostic]) -> String {
    causes
        .iter()
        .map(|cause| cause.message.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

pub(crate) fn parsing_error_message<R, F>(positives: &[R], negatives: &[R], mut f: F) -> String
where
    F: FnMut(&R) -> String,
{
    match (negatives.is_empty(), positives.is_empty()) {
        (false, false) => format!(
            "unexpected {}; expected {}",
            enumerate(negatives, &mut f),
            enumerate(positives, &mut f)
        ),
        (false, true) => format!("unexpected {}", enumerate(negatives, &mut f)),
        (true, false) => format!("expected {}", enumerate(positives, &mut f)),
        (true, true) => "unknown parsing error".to_owned(),
    }
}

fn enumerate<R, F>(rules: &[R], f: &mut F) -> String
where
    F: FnMut(&R) -> String,
{
    match rules.len() {
        1 => f(&rules[0]),
        2 => format!("{} or {}", f(&rules[0]), f(&rules[1])),
        l => {
            let separated = rules
                .iter()
                .take(l - 1)
                .map(|r| f(r))
                .collect::<Vec<_>>()
                .join(", ");
            format!("{}, or {}", separated, f(&rules[l - 1]))
        }
    }
}
