// nacre. A grammar-driven parsing engine
// Copyright (c) 2026 The nacre contributors
//
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. All files in the project carrying such notice may not be copied,
// modified, or distributed except according to those terms.

use alloc::collections::btree_map::{self, BTreeMap};
use core::fmt;
use core::iter::FromIterator;

/// A key in a rule occurrence's annotation map.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Annotation {
    /// Message reported when the rule fails
    Error,
    /// Name replacing the structural token of the produced node
    Token,
    /// Failure is recovered from with an error node
    Pinned,
    /// The produced node and its children are dropped
    Void,
    /// The produced node is replaced by its children
    Transient,
    /// Any other label, carried through to nodes untouched
    Custom(String),
}

impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Annotation::Error => write!(f, "@error"),
            Annotation::Token => write!(f, "@token"),
            Annotation::Pinned => write!(f, "@pin"),
            Annotation::Void => write!(f, "@void"),
            Annotation::Transient => write!(f, "@transient"),
            Annotation::Custom(ref label) => write!(f, "@{}", label),
        }
    }
}

/// The value attached to an [`Annotation`](enum.Annotation.html).
#[derive(Clone, Debug, PartialEq)]
pub enum AnnotationValue {
    /// Flag without a value
    Set,
    /// String value
    String(String),
    /// Integer value
    Int(i64),
    /// Boolean value
    Bool(bool),
}

impl fmt::Display for AnnotationValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            AnnotationValue::Set => Ok(()),
            AnnotationValue::String(ref value) => write!(f, "({:?})", value),
            AnnotationValue::Int(value) => write!(f, "({})", value),
            AnnotationValue::Bool(value) => write!(f, "({})", value),
        }
    }
}

/// The annotations of one rule occurrence.
///
/// # Examples
///
/// ```
/// # use nacre::{Annotation, AnnotationValue, Annotations};
/// let annotations = Annotations::new()
///     .with(Annotation::Pinned, AnnotationValue::Set)
///     .with(Annotation::Error, AnnotationValue::String("expected ]".to_owned()));
///
/// assert!(annotations.pinned());
/// assert_eq!(annotations.error(), Some("expected ]"));
/// assert_eq!(annotations.to_string(), "@error(\"expected ]\") @pin");
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Annotations(BTreeMap<Annotation, AnnotationValue>);

impl Annotations {
    /// Creates an empty annotation map.
    pub fn new() -> Annotations {
        Annotations(BTreeMap::new())
    }

    /// Sets `annotation`, returning the value it replaced.
    pub fn insert(
        &mut self,
        annotation: Annotation,
        value: AnnotationValue,
    ) -> Option<AnnotationValue> {
        self.0.insert(annotation, value)
    }

    /// Returns a copy with `annotation` set.
    pub fn with(mut self, annotation: Annotation, value: AnnotationValue) -> Annotations {
        self.insert(annotation, value);
        self
    }

    /// Returns the value of `annotation`.
    #[inline]
    pub fn get(&self, annotation: &Annotation) -> Option<&AnnotationValue> {
        self.0.get(annotation)
    }

    /// Returns `true` if `annotation` is present.
    #[inline]
    pub fn contains(&self, annotation: &Annotation) -> bool {
        self.0.contains_key(annotation)
    }

    /// Returns `true` if there are no annotations.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of annotations.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates over the annotations in key order.
    pub fn iter(&self) -> btree_map::Iter<'_, Annotation, AnnotationValue> {
        self.0.iter()
    }

    /// Returns the error message, if one is set.
    pub fn error(&self) -> Option<&str> {
        self.string(&Annotation::Error)
    }

    /// Returns the token name override, if one is set.
    pub fn token(&self) -> Option<&str> {
        self.string(&Annotation::Token)
    }

    /// Returns `true` if the occurrence is pinned.
    pub fn pinned(&self) -> bool {
        self.flag(&Annotation::Pinned)
    }

    /// Returns `true` if the occurrence is void.
    pub fn void(&self) -> bool {
        self.flag(&Annotation::Void)
    }

    /// Returns `true` if the occurrence is transient.
    pub fn transient(&self) -> bool {
        self.flag(&Annotation::Transient)
    }

    fn string(&self, annotation: &Annotation) -> Option<&str> {
        match self.get(annotation) {
            Some(AnnotationValue::String(value)) => Some(value),
            _ => None,
        }
    }

    fn flag(&self, annotation: &Annotation) -> bool {
        matches!(
            self.get(annotation),
            Some(AnnotationValue::Set) | Some(AnnotationValue::Bool(true))
        )
    }
}

impl FromIterator<(Annotation, AnnotationValue)> for Annotations {
    fn from_iter<I: IntoIterator<Item = (Annotation, AnnotationValue)>>(iter: I) -> Annotations {
        Annotations(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Annotations {
    type Item = (&'a Annotation, &'a AnnotationValue);
    type IntoIter = btree_map::Iter<'a, Annotation, AnnotationValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Display for Annotations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let annotations: Vec<_> = self
            .iter()
            .map(|(annotation, value)| format!("{}{}", annotation, value))
            .collect();

        write!(f, "{}", annotations.join(" "))
    }
}
