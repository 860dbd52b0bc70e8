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

//! Lexical analyzer (tokenizer)
//!
//! Produces the full token stream up front together with every comment
//! encountered. Whether a `/` starts a regular expression is decided from
//! the previous significant token.

use super::ast::Comment;
use super::error::{ParseError, ParseErrorKind, ParseResult};
use super::position::{Position, PositionTracker, Span};
use super::token::{Keyword, Punct, Token, TokenType};

/// Output of a full tokenization run
#[derive(Debug, Clone)]
pub struct TokenStream {
    pub tokens: Vec<Token>,
    pub comments: Vec<Comment>,
}

/// Script lexical analyzer
pub struct Lexer<'s> {
    tracker: PositionTracker<'s>,
    comments: Vec<Comment>,
    /// Whether the previous significant token can end an expression
    prev_ends_expression: bool,
    newline_before: bool,
}

impl<'s> Lexer<'s> {
    /// Create a new lexer over the given source
    pub fn new(source: &'s str) -> Self {
        Self {
            tracker: PositionTracker::new(source),
            comments: Vec::new(),
            prev_ends_expression: false,
            newline_before: false,
        }
    }

    /// Tokenize the entire input
    pub fn tokenize(mut self) -> ParseResult<TokenStream> {
        let mut tokens = Vec::new();

        loop {
            let token = self.next_token()?;
            let is_eof = token.token_type == TokenType::Eof;
            self.prev_ends_expression = token.token_type.ends_expression();
            tokens.push(token);

            if is_eof {
                break;
            }
        }

        Ok(TokenStream {
            tokens,
            comments: self.comments,
        })
    }

    fn next_token(&mut self) -> ParseResult<Token> {
        self.newline_before = false;
        self.skip_trivia()?;

        let start = self.tracker.position();
        let Some(ch) = self.tracker.peek_char() else {
            return Ok(self.make_token(TokenType::Eof, start));
        };

        match ch {
            '"' | '\'' => self.scan_string(ch, start),
            c if c.is_ascii_digit() => self.scan_number(start),
            '.' if self.tracker.peek_second().is_some_and(|c| c.is_ascii_digit()) => self.scan_number(start),
            c if is_identifier_start(c) => Ok(self.scan_identifier_or_keyword(start)),
            '/' if !self.prev_ends_expression => self.scan_regex(start),
            _ => self.scan_punct(start),
        }
    }

    fn make_token(&self, token_type: TokenType, start: Position) -> Token {
        let lexeme = self.tracker.slice_from(start).to_string();
        Token::new(token_type, lexeme, Span::new(start, self.tracker.position()), self.newline_before)
    }

    /// Skip whitespace and comments, recording comments as they pass
    fn skip_trivia(&mut self) -> ParseResult<()> {
        loop {
            match self.tracker.peek_char() {
                Some('\n') | Some('\r') | Some('\u{2028}') | Some('\u{2029}') => {
                    self.newline_before = true;
                    self.tracker.next_char();
                }
                Some(c) if c.is_whitespace() || c == '\u{feff}' => {
                    self.tracker.next_char();
                }
                Some('/') => match self.tracker.peek_second() {
                    Some('/') => self.scan_line_comment(),
                    Some('*') => self.scan_block_comment()?,
                    _ => return Ok(()),
                },
                _ => return Ok(()),
            }
        }
    }

    fn scan_line_comment(&mut self) {
        let start = self.tracker.position();
        self.tracker.next_char();
        self.tracker.next_char();
        let text_start = self.tracker.position();
        self.tracker.advance_while(|c| !matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}'));
        let text = self.tracker.slice_from(text_start).to_string();
        self.comments.push(Comment {
            block: false,
            text,
            span: Span::new(start, self.tracker.position()),
        });
    }

    fn scan_block_comment(&mut self) -> ParseResult<()> {
        let start = self.tracker.position();
        self.tracker.next_char();
        self.tracker.next_char();
        let text_start = self.tracker.position();
        loop {
            match self.tracker.peek_char() {
                None => {
                    return Err(ParseError::new(
                        ParseErrorKind::UnterminatedComment,
                        start,
                        "Block comment is never closed".to_string(),
                    ));
                }
                Some('*') if self.tracker.peek_second() == Some('/') => break,
                Some(c) => {
                    if c == '\n' {
                        self.newline_before = true;
                    }
                    self.tracker.next_char();
                }
            }
        }
        let text = self.tracker.slice_from(text_start).to_string();
        self.tracker.next_char();
        self.tracker.next_char();
        self.comments.push(Comment {
            block: true,
            text,
            span: Span::new(start, self.tracker.position()),
        });
        Ok(())
    }

    fn scan_identifier_or_keyword(&mut self, start: Position) -> Token {
        self.tracker.advance_while(is_identifier_part);
        let text = self.tracker.slice_from(start);
        let token_type = match Keyword::lookup(text) {
            Some(keyword) => TokenType::Keyword(keyword),
            None => TokenType::Identifier(text.to_string()),
        };
        self.make_token(token_type, start)
    }

    fn scan_number(&mut self, start: Position) -> ParseResult<Token> {
        let first = self.tracker.next_char();
        if first == Some('0') && matches!(self.tracker.peek_char(), Some('x') | Some('X')) {
            self.tracker.next_char();
            self.tracker.advance_while(|c| c.is_ascii_hexdigit());
        } else {
            self.tracker.advance_while(|c| c.is_ascii_digit());
            if first != Some('.') && self.tracker.peek_char() == Some('.') {
                self.tracker.next_char();
                self.tracker.advance_while(|c| c.is_ascii_digit());
            }
            if matches!(self.tracker.peek_char(), Some('e') | Some('E')) {
                self.tracker.next_char();
                if matches!(self.tracker.peek_char(), Some('+') | Some('-')) {
                    self.tracker.next_char();
                }
                self.tracker.advance_while(|c| c.is_ascii_digit());
            }
        }
        if self.tracker.peek_char().is_some_and(is_identifier_start) {
            return Err(ParseError::new(
                ParseErrorKind::InvalidCharacter,
                self.tracker.position(),
                "Identifier starts immediately after numeric literal".to_string(),
            ));
        }
        Ok(self.make_token(TokenType::Number, start))
    }

    fn scan_string(&mut self, quote: char, start: Position) -> ParseResult<Token> {
        self.tracker.next_char();
        let mut value = String::new();
        loop {
            let Some(ch) = self.tracker.next_char() else {
                return Err(unterminated_string(start));
            };
            match ch {
                c if c == quote => break,
                '\n' | '\r' => return Err(unterminated_string(start)),
                '\\' => {
                    let Some(escaped) = self.tracker.next_char() else {
                        return Err(unterminated_string(start));
                    };
                    match escaped {
                        'n' => value.push('\n'),
                        't' => value.push('\t'),
                        'r' => value.push('\r'),
                        'b' => value.push('\u{8}'),
                        'f' => value.push('\u{c}'),
                        'v' => value.push('\u{b}'),
                        '0' => value.push('\0'),
                        'x' => value.push(self.scan_hex_escape(2)),
                        'u' => value.push(self.scan_hex_escape(4)),
                        '\r' => {
                            if self.tracker.peek_char() == Some('\n') {
                                self.tracker.next_char();
                            }
                        }
                        '\n' => {}
                        other => value.push(other),
                    }
                }
                c => value.push(c),
            }
        }
        Ok(self.make_token(TokenType::String(value), start))
    }

    fn scan_hex_escape(&mut self, digits: usize) -> char {
        let mut code = 0u32;
        for _ in 0..digits {
            match self.tracker.peek_char().and_then(|c| c.to_digit(16)) {
                Some(d) => {
                    code = code * 16 + d;
                    self.tracker.next_char();
                }
                None => break,
            }
        }
        char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER)
    }

    fn scan_regex(&mut self, start: Position) -> ParseResult<Token> {
        self.tracker.next_char();
        let mut in_class = false;
        loop {
            let Some(ch) = self.tracker.next_char() else {
                return Err(unterminated_regex(start));
            };
            match ch {
                '\n' | '\r' => return Err(unterminated_regex(start)),
                '\\' => {
                    if self.tracker.next_char().is_none() {
                        return Err(unterminated_regex(start));
                    }
                }
                '[' => in_class = true,
                ']' => in_class = false,
                '/' if !in_class => break,
                _ => {}
            }
        }
        self.tracker.advance_while(is_identifier_part);
        Ok(self.make_token(TokenType::Regex, start))
    }

    fn scan_punct(&mut self, start: Position) -> ParseResult<Token> {
        let rest = &self.tracker_rest();
        let Some(punct) = Punct::ALL_BY_LENGTH.iter().find(|p| rest.starts_with(p.as_str())).copied() else {
            let ch = self.tracker.peek_char().unwrap_or('\0');
            return Err(ParseError::new(ParseErrorKind::InvalidCharacter, start, format!("Unexpected character '{}'", ch)));
        };
        for _ in 0..punct.as_str().len() {
            self.tracker.next_char();
        }
        Ok(self.make_token(TokenType::Punct(punct), start))
    }

    fn tracker_rest(&self) -> String {
        let mut lookahead = self.tracker.clone();
        let start = lookahead.position();
        for _ in 0..4 {
            if lookahead.next_char().is_none() {
                break;
            }
        }
        lookahead.slice_from(start).to_string()
    }
}

fn unterminated_string(start: Position) -> ParseError {
    ParseError::new(ParseErrorKind::UnterminatedString, start, "String literal is never closed".to_string())
}

fn unterminated_regex(start: Position) -> ParseError {
    ParseError::new(ParseErrorKind::UnterminatedRegex, start, "Regular expression literal is never closed".to_string())
}

/// Check if a character can start an identifier
pub fn is_identifier_start(c: char) -> bool {
    c == '_' || c == '$' || c.is_alphabetic()
}

/// Check if a character can continue an identifier
pub fn is_identifier_part(c: char) -> bool {
    c == '_' || c == '$' || c.is_alphanumeric()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn types(source: &str) -> Vec<TokenType> {
        Lexer::new(source).tokenize().unwrap().tokens.into_iter().map(|t| t.token_type).collect()
    }

    #[test]
    fn test_tokenize_declaration() {
        let tokens = types("var x = 'a\\'b';");
        assert_eq!(
            tokens,
            vec![
                TokenType::Keyword(Keyword::Var),
                TokenType::Identifier("x".to_string()),
                TokenType::Punct(Punct::Assign),
                TokenType::String("a'b".to_string()),
                TokenType::Punct(Punct::Semicolon),
                TokenType::Eof,
            ]
        );
    }

    #[test]
    fn test_regex_versus_division() {
        let tokens = types("a = b / c; d = /x[/]y/g.test(e);");
        assert!(tokens.contains(&TokenType::Punct(Punct::Slash)));
        assert_eq!(tokens.iter().filter(|t| **t == TokenType::Regex).count(), 1);
    }

    #[test]
    fn test_greedy_punctuators() {
        let tokens = types("a >>>= b !== c");
        assert_eq!(tokens[1], TokenType::Punct(Punct::UnsignedShiftRightAssign));
        assert_eq!(tokens[3], TokenType::Punct(Punct::StrictNotEqual));
    }

    #[test]
    fn test_comments_are_collected() {
        let stream = Lexer::new("// one\n/* two\n three */\nvar a;").tokenize().unwrap();
        assert_eq!(stream.comments.len(), 2);
        assert!(!stream.comments[0].block);
        assert_eq!(stream.comments[0].text, " one");
        assert!(stream.comments[1].block);
        assert_eq!(stream.comments[1].span.end.line, 3);
        assert!(stream.tokens[0].newline_before);
    }

    #[test]
    fn test_numbers() {
        let stream = Lexer::new("0x1F 1.5e-3 .25 10").tokenize().unwrap();
        let lexemes: Vec<&str> = stream.tokens.iter().map(|t| t.lexeme.as_str()).collect();
        assert_eq!(lexemes, vec!["0x1F", "1.5e-3", ".25", "10", ""]);
    }

    #[test]
    fn test_unterminated_string() {
        let err = Lexer::new("var a = 'abc").tokenize().unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnterminatedString);
    }
}
