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

//! Token definitions for the analysed script language

use super::position::Span;
use std::fmt;

/// A token in the source code
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The type of token
    pub token_type: TokenType,
    /// The source text that produced this token
    pub lexeme: String,
    /// Location of the token
    pub span: Span,
    /// Whether a line terminator separates this token from the previous one
    pub newline_before: bool,
}

impl Token {
    /// Create a new token
    pub fn new(token_type: TokenType, lexeme: String, span: Span, newline_before: bool) -> Self {
        Self {
            token_type,
            lexeme,
            span,
            newline_before,
        }
    }

    /// Check if this token is the given punctuator
    pub fn is_punct(&self, punct: Punct) -> bool {
        self.token_type == TokenType::Punct(punct)
    }

    /// Check if this token is the given keyword
    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        self.token_type == TokenType::Keyword(keyword)
    }

    /// Identifier-like name of the token, keywords included. Used where the
    /// grammar accepts reserved words as property names.
    pub fn as_name(&self) -> Option<&str> {
        match &self.token_type {
            TokenType::Identifier(name) => Some(name),
            TokenType::Keyword(_) => Some(&self.lexeme),
            _ => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}'", self.token_type, self.lexeme)
    }
}

/// Types of tokens
#[derive(Debug, Clone, PartialEq)]
pub enum TokenType {
    Identifier(String),
    Keyword(Keyword),
    Punct(Punct),
    /// String literal with its cooked value
    String(String),
    Number,
    Regex,
    Eof,
}

impl TokenType {
    /// Whether a `/` following this token starts a division rather than a
    /// regular expression literal
    pub fn ends_expression(&self) -> bool {
        match self {
            TokenType::Identifier(_) | TokenType::String(_) | TokenType::Number | TokenType::Regex => true,
            TokenType::Keyword(kw) => matches!(kw, Keyword::This | Keyword::True | Keyword::False | Keyword::Null),
            TokenType::Punct(p) => matches!(p, Punct::RightParen | Punct::RightBracket | Punct::RightBrace),
            TokenType::Eof => false,
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenType::Identifier(_) => write!(f, "identifier"),
            TokenType::Keyword(_) => write!(f, "keyword"),
            TokenType::Punct(_) => write!(f, "punctuator"),
            TokenType::String(_) => write!(f, "string"),
            TokenType::Number => write!(f, "number"),
            TokenType::Regex => write!(f, "regex"),
            TokenType::Eof => write!(f, "end of file"),
        }
    }
}

/// Reserved words of the grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Break,
    Case,
    Catch,
    Continue,
    Debugger,
    Default,
    Delete,
    Do,
    Else,
    False,
    Finally,
    For,
    Function,
    If,
    In,
    Instanceof,
    New,
    Null,
    Return,
    Switch,
    This,
    Throw,
    True,
    Try,
    Typeof,
    Var,
    Void,
    While,
    With,
}

impl Keyword {
    /// Look up a keyword by its source text
    pub fn lookup(s: &str) -> Option<Self> {
        let keyword = match s {
            "break" => Keyword::Break,
            "case" => Keyword::Case,
            "catch" => Keyword::Catch,
            "continue" => Keyword::Continue,
            "debugger" => Keyword::Debugger,
            "default" => Keyword::Default,
            "delete" => Keyword::Delete,
            "do" => Keyword::Do,
            "else" => Keyword::Else,
            "false" => Keyword::False,
            "finally" => Keyword::Finally,
            "for" => Keyword::For,
            "function" => Keyword::Function,
            "if" => Keyword::If,
            "in" => Keyword::In,
            "instanceof" => Keyword::Instanceof,
            "new" => Keyword::New,
            "null" => Keyword::Null,
            "return" => Keyword::Return,
            "switch" => Keyword::Switch,
            "this" => Keyword::This,
            "throw" => Keyword::Throw,
            "true" => Keyword::True,
            "try" => Keyword::Try,
            "typeof" => Keyword::Typeof,
            "var" => Keyword::Var,
            "void" => Keyword::Void,
            "while" => Keyword::While,
            "with" => Keyword::With,
            _ => return None,
        };
        Some(keyword)
    }
}

/// Punctuators and operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Punct {
    LeftBrace,
    RightBrace,
    LeftParen,
    RightParen,
    LeftBracket,
    RightBracket,
    Semicolon,
    Comma,
    Dot,
    Question,
    Colon,

    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Increment,
    Decrement,
    ShiftLeft,
    ShiftRight,
    UnsignedShiftRight,
    Less,
    Greater,
    LessEqual,
    GreaterEqual,
    Equal,
    NotEqual,
    StrictEqual,
    StrictNotEqual,
    BitAnd,
    BitOr,
    BitXor,
    Not,
    BitNot,
    And,
    Or,

    Assign,
    PlusAssign,
    MinusAssign,
    StarAssign,
    SlashAssign,
    PercentAssign,
    ShiftLeftAssign,
    ShiftRightAssign,
    UnsignedShiftRightAssign,
    BitAndAssign,
    BitOrAssign,
    BitXorAssign,
}

impl Punct {
    /// Punctuators ordered longest first so the lexer can match greedily
    pub const ALL_BY_LENGTH: &'static [Punct] = &[
        Punct::UnsignedShiftRightAssign,
        Punct::StrictEqual,
        Punct::StrictNotEqual,
        Punct::UnsignedShiftRight,
        Punct::ShiftLeftAssign,
        Punct::ShiftRightAssign,
        Punct::Increment,
        Punct::Decrement,
        Punct::ShiftLeft,
        Punct::ShiftRight,
        Punct::LessEqual,
        Punct::GreaterEqual,
        Punct::Equal,
        Punct::NotEqual,
        Punct::And,
        Punct::Or,
        Punct::PlusAssign,
        Punct::MinusAssign,
        Punct::StarAssign,
        Punct::SlashAssign,
        Punct::PercentAssign,
        Punct::BitAndAssign,
        Punct::BitOrAssign,
        Punct::BitXorAssign,
        Punct::LeftBrace,
        Punct::RightBrace,
        Punct::LeftParen,
        Punct::RightParen,
        Punct::LeftBracket,
        Punct::RightBracket,
        Punct::Semicolon,
        Punct::Comma,
        Punct::Dot,
        Punct::Question,
        Punct::Colon,
        Punct::Plus,
        Punct::Minus,
        Punct::Star,
        Punct::Slash,
        Punct::Percent,
        Punct::Less,
        Punct::Greater,
        Punct::BitAnd,
        Punct::BitOr,
        Punct::BitXor,
        Punct::Not,
        Punct::BitNot,
        Punct::Assign,
    ];

    /// Source text of the punctuator
    pub fn as_str(&self) -> &'static str {
        match self {
            Punct::LeftBrace => "{",
            Punct::RightBrace => "}",
            Punct::LeftParen => "(",
            Punct::RightParen => ")",
            Punct::LeftBracket => "[",
            Punct::RightBracket => "]",
            Punct::Semicolon => ";",
            Punct::Comma => ",",
            Punct::Dot => ".",
            Punct::Question => "?",
            Punct::Colon => ":",
            Punct::Plus => "+",
            Punct::Minus => "-",
            Punct::Star => "*",
            Punct::Slash => "/",
            Punct::Percent => "%",
            Punct::Increment => "++",
            Punct::Decrement => "--",
            Punct::ShiftLeft => "<<",
            Punct::ShiftRight => ">>",
            Punct::UnsignedShiftRight => ">>>",
            Punct::Less => "<",
            Punct::Greater => ">",
            Punct::LessEqual => "<=",
            Punct::GreaterEqual => ">=",
            Punct::Equal => "==",
            Punct::NotEqual => "!=",
            Punct::StrictEqual => "===",
            Punct::StrictNotEqual => "!==",
            Punct::BitAnd => "&",
            Punct::BitOr => "|",
            Punct::BitXor => "^",
            Punct::Not => "!",
            Punct::BitNot => "~",
            Punct::And => "&&",
            Punct::Or => "||",
            Punct::Assign => "=",
            Punct::PlusAssign => "+=",
            Punct::MinusAssign => "-=",
            Punct::StarAssign => "*=",
            Punct::SlashAssign => "/=",
            Punct::PercentAssign => "%=",
            Punct::ShiftLeftAssign => "<<=",
            Punct::ShiftRightAssign => ">>=",
            Punct::UnsignedShiftRightAssign => ">>>=",
            Punct::BitAndAssign => "&=",
            Punct::BitOrAssign => "|=",
            Punct::BitXorAssign => "^=",
        }
    }

    /// Whether this is an assignment operator
    pub fn is_assignment(&self) -> bool {
        matches!(
            self,
            Punct::Assign
                | Punct::PlusAssign
                | Punct::MinusAssign
                | Punct::StarAssign
                | Punct::SlashAssign
                | Punct::PercentAssign
                | Punct::ShiftLeftAssign
                | Punct::ShiftRightAssign
                | Punct::UnsignedShiftRightAssign
                | Punct::BitAndAssign
                | Punct::BitOrAssign
                | Punct::BitXorAssign
        )
    }

    /// Binary precedence, higher binds tighter. `None` for non-binary operators.
    pub fn binary_precedence(&self) -> Option<u8> {
        let precedence = match self {
            Punct::Or => 1,
            Punct::And => 2,
            Punct::BitOr => 3,
            Punct::BitXor => 4,
            Punct::BitAnd => 5,
            Punct::Equal | Punct::NotEqual | Punct::StrictEqual | Punct::StrictNotEqual => 6,
            Punct::Less | Punct::Greater | Punct::LessEqual | Punct::GreaterEqual => 7,
            Punct::ShiftLeft | Punct::ShiftRight | Punct::UnsignedShiftRight => 8,
            Punct::Plus | Punct::Minus => 9,
            Punct::Star | Punct::Slash | Punct::Percent => 10,
            _ => return None,
        };
        Some(precedence)
    }
}

impl fmt::Display for Punct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_punctuators_sorted_longest_first() {
        let lengths: Vec<usize> = Punct::ALL_BY_LENGTH.iter().map(|p| p.as_str().len()).collect();
        assert!(lengths.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_keyword_lookup() {
        assert_eq!(Keyword::lookup("function"), Some(Keyword::Function));
        assert_eq!(Keyword::lookup("instanceof"), Some(Keyword::Instanceof));
        assert_eq!(Keyword::lookup("let"), None);
    }

    #[test]
    fn test_regex_context() {
        assert!(TokenType::Identifier("a".into()).ends_expression());
        assert!(TokenType::Punct(Punct::RightParen).ends_expression());
        assert!(!TokenType::Punct(Punct::LeftParen).ends_expression());
        assert!(!TokenType::Keyword(Keyword::Return).ends_expression());
    }
}
