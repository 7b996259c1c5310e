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

use once_cell::unsync::OnceCell;

/// The text being parsed.
///
/// Every position handed out by the engine (scanner positions, node ranges, diagnostic ranges)
/// is an offset counted in Unicode scalar values into a `Source`, never a byte offset.
///
/// # Examples
///
/// ```
/// # use nacre::Source;
/// let source = Source::new("a\nb嗨");
///
/// assert_eq!(source.len(), 4);
/// assert_eq!(source.slice(2..4), "b嗨");
/// assert_eq!(source.line_col(3), (2, 2));
/// ```
pub struct Source {
    text: String,
    // byte offset of every scalar, followed by text.len()
    offsets: Vec<usize>,
    lines: OnceCell<Vec<usize>>,
}

impl Source {
    /// Creates a `Source` owning `text`.
    pub fn new<S: Into<String>>(text: S) -> Source {
        let text = text.into();
        let mut offsets: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
        offsets.push(text.len());

        Source {
            text,
            offsets,
            lines: OnceCell::new(),
        }
    }

    /// Returns the full text.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Returns the number of Unicode scalars in the source.
    #[inline]
    pub fn len(&self) -> usize {
        self.offsets.len() - 1
    }

    /// Returns `true` if the source is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Returns the scalar at `pos`, or `None` at or past the end.
    #[inline]
    pub fn char_at(&self, pos: usize) -> Option<char> {
        let start = *self.offsets.get(pos)?;
        self.text[start..].chars().next()
    }

    /// Converts a scalar offset into a byte offset, clamping to the end of the text.
    #[inline]
    pub fn byte_offset(&self, pos: usize) -> usize {
        self.offsets[pos.min(self.len())]
    }

    /// Converts a byte offset into a scalar offset. Offsets inside a multi-byte scalar round up
    /// to the next scalar boundary.
    pub fn scalar_offset(&self, byte: usize) -> usize {
        match self.offsets.binary_search(&byte) {
            Ok(pos) | Err(pos) => pos.min(self.len()),
        }
    }

    /// Returns the text between two scalar offsets.
    ///
    /// # Examples
    ///
    /// ```
    /// # use nacre::Source;
    /// let source = Source::new("ab嗨c");
    ///
    /// assert_eq!(source.slice(1..3), "b嗨");
    /// assert_eq!(source.slice(3..3), "");
    /// ```
    pub fn slice(&self, range: Range<usize>) -> &str {
        let start = self.byte_offset(range.start);
        let end = self.byte_offset(range.end).max(start);

        &self.text[start..end]
    }

    /// Returns the line and column number of the scalar at `pos`, both starting at 1.
    ///
    /// Only `\n` starts a new line, so a lone `\r` counts as a column.
    pub fn line_col(&self, pos: usize) -> (usize, usize) {
        let pos = pos.min(self.len());
        let lines = self.line_starts();
        let line = match lines.binary_search(&pos) {
            Ok(line) => line,
            Err(line) => line - 1,
        };

        (line + 1, pos - lines[line] + 1)
    }

    /// Returns the whole line containing `pos`, without its line terminator.
    pub fn line_of(&self, pos: usize) -> &str {
        let (line, _) = self.line_col(pos);
        let lines = self.line_starts();
        let start = lines[line - 1];
        let end = match lines.get(line) {
            Some(&next) => next - 1,
            None => self.len(),
        };

        let text = self.slice(start..end);
        text.strip_suffix('\r').unwrap_or(text)
    }

    fn line_starts(&self) -> &[usize] {
        self.lines.get_or_init(|| {
            let mut starts = vec![0];
            starts.extend(
                self.text
                    .chars()
                    .enumerate()
                    .filter(|&(_, c)| c == '\n')
                    .map(|(i, _)| i + 1),
            );
            starts
        })
    }
}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Source")
            .field("text", &self.text)
            .field("len", &self.len())
            .finish()
    }
}

impl<'a> From<&'a str> for Source {
    fn from(text: &'a str) -> Source {
        Source::new(text)
    }
}

impl From<String> for Source {
    fn from(text: String) -> Source {
        Source::new(text)
    }
}
