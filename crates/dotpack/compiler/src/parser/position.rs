// Dotlanth
// Copyright (C) 2025 Synerthink

// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.

// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! Source position tracking for parsing

use std::fmt;

/// Represents a position in source code
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position {
    /// Byte offset into the source
    pub offset: usize,
    /// Line number (1-based)
    pub line: usize,
    /// Column number (1-based, in characters)
    pub column: usize,
}

impl Position {
    /// Create a new position
    pub fn new(offset: usize, line: usize, column: usize) -> Self {
        Self { offset, line, column }
    }

    /// Create a position at the beginning of a file
    pub fn start() -> Self {
        Self::new(0, 1, 1)
    }

    /// Advance by a character (handles newlines)
    pub fn advance(&mut self, ch: char) {
        self.offset += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Represents a span of source code between two positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// Start position (inclusive)
    pub start: Position,
    /// End position (exclusive)
    pub end: Position,
}

impl Span {
    /// Create a new span
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Merge this span with another span
    pub fn merge(&self, other: Span) -> Span {
        let start = if self.start <= other.start { self.start } else { other.start };
        let end = if self.end >= other.end { self.end } else { other.end };
        Span::new(start, end)
    }

    /// Exact source text covered by the span
    pub fn text<'s>(&self, source: &'s str) -> &'s str {
        &source[self.start.offset..self.end.offset]
    }

    /// Source text of the span widened to the start of its first line, so the
    /// leading indentation of the first line is kept.
    pub fn text_from_line_start<'s>(&self, source: &'s str) -> &'s str {
        let line_start = source[..self.start.offset].rfind('\n').map(|i| i + 1).unwrap_or(0);
        &source[line_start..self.end.offset]
    }

    /// Check if this span is on a single line
    pub fn is_single_line(&self) -> bool {
        self.start.line == self.end.line
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_single_line() {
            write!(f, "{}:{}", self.start, self.end.column)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// Utility for tracking position while scanning
#[derive(Debug, Clone)]
pub struct PositionTracker<'s> {
    /// Current position
    position: Position,
    /// Source text being scanned
    source: &'s str,
}

impl<'s> PositionTracker<'s> {
    /// Create a new position tracker
    pub fn new(source: &'s str) -> Self {
        Self {
            position: Position::start(),
            source,
        }
    }

    /// Get the current position
    pub fn position(&self) -> Position {
        self.position
    }

    /// Peek at the current character without advancing
    pub fn peek_char(&self) -> Option<char> {
        self.source[self.position.offset..].chars().next()
    }

    /// Peek at the character after the current one
    pub fn peek_second(&self) -> Option<char> {
        let mut chars = self.source[self.position.offset..].chars();
        chars.next();
        chars.next()
    }

    /// Advance by one character and return it
    pub fn next_char(&mut self) -> Option<char> {
        let ch = self.peek_char()?;
        self.position.advance(ch);
        Some(ch)
    }

    /// Advance while the predicate holds
    pub fn advance_while(&mut self, predicate: impl Fn(char) -> bool) {
        while let Some(ch) = self.peek_char() {
            if !predicate(ch) {
                break;
            }
            self.next_char();
        }
    }

    /// Text scanned since `start`
    pub fn slice_from(&self, start: Position) -> &'s str {
        &self.source[start.offset..self.position.offset]
    }
}
