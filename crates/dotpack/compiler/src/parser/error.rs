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

//! Parser error types and handling

use super::Position;
use std::fmt;
use thiserror::Error;

/// Result type for parsing operations
pub type ParseResult<T> = Result<T, ParseError>;

/// Main error type for parsing operations
#[derive(Error, Debug, Clone, PartialEq)]
pub struct ParseError {
    /// The kind of error
    pub kind: ParseErrorKind,
    /// Position where the error occurred
    pub position: Position,
    /// Human-readable error message
    pub message: String,
}

impl ParseError {
    /// Create a new parse error
    pub fn new(kind: ParseErrorKind, position: Position, message: String) -> Self {
        Self { kind, position, message }
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        format!("{} at line {}, column {}: {}", self.kind.description(), self.position.line, self.position.column, self.message)
    }

    /// Create a syntax error
    pub fn syntax_error(position: Position, message: String) -> Self {
        Self::new(ParseErrorKind::SyntaxError, position, message)
    }

    /// Create an unexpected token error
    pub fn unexpected_token(position: Position, found: &str, expected: Option<&str>) -> Self {
        let message = if let Some(exp) = expected {
            format!("Found '{}', expected '{}'", found, exp)
        } else {
            format!("Unexpected token '{}'", found)
        };
        Self::new(ParseErrorKind::UnexpectedToken, position, message)
    }

    /// Create an unexpected EOF error
    pub fn unexpected_eof(position: Position) -> Self {
        Self::new(ParseErrorKind::UnexpectedEof, position, "Unexpected end of file".to_string())
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.user_message())
    }
}

/// Categories of parse errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// Syntax errors (grammar violations)
    #[error("Syntax error")]
    SyntaxError,

    /// Unexpected token
    #[error("Unexpected token")]
    UnexpectedToken,

    /// Unexpected end of file
    #[error("Unexpected end of file")]
    UnexpectedEof,

    /// Invalid character
    #[error("Invalid character")]
    InvalidCharacter,

    /// Unterminated string literal
    #[error("Unterminated string")]
    UnterminatedString,

    /// Unterminated comment
    #[error("Unterminated comment")]
    UnterminatedComment,

    /// Unterminated regular expression literal
    #[error("Unterminated regular expression")]
    UnterminatedRegex,

    /// Invalid assignment target
    #[error("Invalid assignment")]
    InvalidAssignment,
}

impl ParseErrorKind {
    /// Get a human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            ParseErrorKind::SyntaxError => "Syntax error",
            ParseErrorKind::UnexpectedToken => "Unexpected token",
            ParseErrorKind::UnexpectedEof => "Unexpected end of file",
            ParseErrorKind::InvalidCharacter => "Invalid character",
            ParseErrorKind::UnterminatedString => "Unterminated string literal",
            ParseErrorKind::UnterminatedComment => "Unterminated comment",
            ParseErrorKind::UnterminatedRegex => "Unterminated regular expression",
            ParseErrorKind::InvalidAssignment => "Invalid assignment",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_creation() {
        let pos = Position::new(12, 2, 5);
        let error = ParseError::new(ParseErrorKind::SyntaxError, pos, "Test error".to_string());

        assert_eq!(error.kind, ParseErrorKind::SyntaxError);
        assert_eq!(error.position, pos);
        assert_eq!(error.message, "Test error");
    }

    #[test]
    fn test_error_messages() {
        let error = ParseError::unexpected_token(Position::new(40, 10, 5), "}", Some(";"));

        let user_msg = error.user_message();
        assert!(user_msg.contains("line 10"));
        assert!(user_msg.contains("column 5"));
        assert!(user_msg.contains("Found '}', expected ';'"));
    }
}
