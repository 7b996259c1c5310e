// nacre. A grammar-driven parsing engine
// Copyright (c) 2026 The nacre contributors
//
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. All files in the project carrying such notice may not be copied,
// modified, or distributed except according to those terms.

use regex::Regex;

use crate::source::Source;

/// A cursor over a [`Source`].
///
/// The position is a Unicode scalar offset and can be freely saved and restored, which is how
/// the engine backtracks. Every `scan_*` method either consumes what it matched and returns
/// `true`, or leaves the position untouched and returns `false`.
///
/// [`Source`]: struct.Source.html
#[derive(Clone, Debug)]
pub struct Scanner<'s> {
    source: &'s Source,
    pos: usize,
}

impl<'s> Scanner<'s> {
    /// Creates a `Scanner` at the start of `source`.
    pub fn new(source: &'s Source) -> Scanner<'s> {
        Scanner { source, pos: 0 }
    }

    /// Returns the underlying `Source`.
    #[inline]
    pub fn source(&self) -> &'s Source {
        self.source
    }

    /// Returns the current position.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Moves the scanner to `pos`, clamped to the end of the source.
    #[inline]
    pub fn set_position(&mut self, pos: usize) {
        debug_assert!(pos <= self.source.len(), "position out of bounds");
        self.pos = pos.min(self.source.len());
    }

    /// Returns `true` once every scalar has been consumed.
    #[inline]
    pub fn end_of_input(&self) -> bool {
        self.pos >= self.source.len()
    }

    /// Returns the next scalar without consuming it.
    #[inline]
    pub fn peek(&self) -> Option<char> {
        self.source.char_at(self.pos)
    }

    /// Consumes and returns the next scalar.
    #[inline]
    pub fn consume(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    /// Returns the text that has not been consumed yet.
    #[inline]
    pub fn remaining(&self) -> &'s str {
        &self.source.as_str()[self.source.byte_offset(self.pos)..]
    }

    /// Consumes `string` if the remaining text starts with it.
    ///
    /// # Examples
    ///
    /// ```
    /// # use nacre::{Scanner, Source};
    /// let source = Source::new("ab");
    /// let mut scanner = Scanner::new(&source);
    ///
    /// assert!(scanner.scan_string("a"));
    /// assert!(!scanner.scan_string("a"));
    /// assert_eq!(scanner.position(), 1);
    /// ```
    pub fn scan_string(&mut self, string: &str) -> bool {
        if self.remaining().starts_with(string) {
            self.pos += string.chars().count();
            true
        } else {
            false
        }
    }

    /// Consumes `string` if the remaining text starts with it, ignoring case.
    pub fn scan_insensitive(&mut self, string: &str) -> bool {
        let mut remaining = self.remaining().chars();
        let mut len = 0;

        for expected in string.chars() {
            match remaining.next() {
                Some(c) if c.to_lowercase().eq(expected.to_lowercase()) => len += 1,
                _ => return false,
            }
        }

        self.pos += len;
        true
    }

    /// Consumes one scalar if `f` accepts it.
    #[inline]
    pub fn scan_char_by<F>(&mut self, f: F) -> bool
    where
        F: FnOnce(char) -> bool,
    {
        match self.peek() {
            Some(c) if f(c) => {
                self.pos += 1;
                true
            }
            _ => false,
        }
    }

    /// Consumes the match of `regex` if one starts exactly at the current position. An empty
    /// match succeeds without consuming anything.
    pub fn scan_regex(&mut self, regex: &Regex) -> bool {
        let start = self.source.byte_offset(self.pos);

        match regex.find(self.remaining()) {
            Some(found) if found.start() == 0 => {
                self.pos = self.source.scalar_offset(start + found.end());
                true
            }
            _ => false,
        }
    }
}
