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

//! Script parser
//!
//! Turns library source text into a [`Program`] carrying the statement tree
//! and every comment with its location. Analysis only needs exact spans and
//! comment positions, so the tree keeps no trivia beyond those.

pub mod ast;
pub mod error;
pub mod lexer;
pub mod position;
pub mod syntax;
pub mod token;

pub use ast::*;
pub use error::{ParseError, ParseErrorKind, ParseResult};
pub use lexer::{Lexer, TokenStream};
pub use position::{Position, PositionTracker, Span};
pub use syntax::{SyntaxParser, parse_program};
pub use token::{Keyword, Punct, Token, TokenType};

/// Parse a source unit into a [`Program`]
pub fn parse(source: &str) -> ParseResult<Program> {
    parse_program(source)
}
