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

//! Recursive-descent syntax parser
//!
//! Expressions use precedence climbing over [`Punct::binary_precedence`].
//! Automatic semicolon insertion covers line breaks, a closing brace and the
//! end of input, plus the restricted productions after `return`, `throw`,
//! `break`, `continue` and before postfix `++`/`--`.

use super::ast::*;
use super::error::{ParseError, ParseErrorKind, ParseResult};
use super::lexer::{Lexer, TokenStream};
use super::position::{Position, Span};
use super::token::{Keyword, Punct, Token, TokenType};

/// Precedence of the keyword relational operators (`in`, `instanceof`)
const RELATIONAL_PRECEDENCE: u8 = 7;

/// Parse a complete source unit
pub fn parse_program(source: &str) -> ParseResult<Program> {
    let TokenStream { tokens, comments } = Lexer::new(source).tokenize()?;
    let mut parser = SyntaxParser::new(tokens);
    let body = parser.parse_statements_until_eof()?;
    Ok(Program { body, comments })
}

/// Token-driven syntax parser
pub struct SyntaxParser {
    tokens: Vec<Token>,
    current: usize,
    prev_end: Position,
}

impl SyntaxParser {
    /// Create a parser over a token stream ending in `Eof`
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            current: 0,
            prev_end: Position::start(),
        }
    }

    // --- token helpers ---

    fn peek(&self) -> &Token {
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[self.current.min(last)]
    }

    fn peek_next(&self) -> &Token {
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[(self.current + 1).min(last)]
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if token.token_type != TokenType::Eof {
            self.current += 1;
        }
        self.prev_end = token.span.end;
        token
    }

    fn at_punct(&self, punct: Punct) -> bool {
        self.peek().is_punct(punct)
    }

    fn at_keyword(&self, keyword: Keyword) -> bool {
        self.peek().is_keyword(keyword)
    }

    fn eat_punct(&mut self, punct: Punct) -> bool {
        if self.at_punct(punct) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect_punct(&mut self, punct: Punct) -> ParseResult<Token> {
        if self.at_punct(punct) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(Some(punct.as_str())))
        }
    }

    fn expect_keyword(&mut self, keyword: Keyword) -> ParseResult<Token> {
        if self.at_keyword(keyword) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(None))
        }
    }

    fn expect_ident(&mut self) -> ParseResult<Ident> {
        let token = self.peek().clone();
        match token.token_type {
            TokenType::Identifier(name) => {
                self.advance();
                Ok(Ident { name, span: token.span })
            }
            _ => Err(self.unexpected(Some("identifier"))),
        }
    }

    fn unexpected(&self, expected: Option<&str>) -> ParseError {
        let token = self.peek();
        if token.token_type == TokenType::Eof {
            ParseError::unexpected_eof(token.span.start)
        } else {
            ParseError::unexpected_token(token.span.start, &token.lexeme, expected)
        }
    }

    fn start(&self) -> Position {
        self.peek().span.start
    }

    fn finish(&self, start: Position) -> Span {
        Span::new(start, self.prev_end)
    }

    fn consume_semicolon(&mut self) -> ParseResult<()> {
        if self.eat_punct(Punct::Semicolon) {
            return Ok(());
        }
        let token = self.peek();
        if token.is_punct(Punct::RightBrace) || token.token_type == TokenType::Eof || token.newline_before {
            return Ok(());
        }
        Err(self.unexpected(Some(";")))
    }

    /// Whether the current token may not continue a restricted production
    fn at_statement_break(&self) -> bool {
        let token = self.peek();
        token.newline_before
            || token.is_punct(Punct::Semicolon)
            || token.is_punct(Punct::RightBrace)
            || token.token_type == TokenType::Eof
    }

    // --- statements ---

    fn parse_statements_until_eof(&mut self) -> ParseResult<Vec<Stmt>> {
        let mut body = Vec::new();
        while self.peek().token_type != TokenType::Eof {
            body.push(self.parse_statement()?);
        }
        Ok(body)
    }

    fn parse_block_body(&mut self) -> ParseResult<Vec<Stmt>> {
        self.expect_punct(Punct::LeftBrace)?;
        let mut body = Vec::new();
        while !self.at_punct(Punct::RightBrace) {
            if self.peek().token_type == TokenType::Eof {
                return Err(self.unexpected(Some("}")));
            }
            body.push(self.parse_statement()?);
        }
        self.advance();
        Ok(body)
    }

    fn parse_statement(&mut self) -> ParseResult<Stmt> {
        let start = self.start();
        let token = self.peek().clone();

        let kind = match &token.token_type {
            TokenType::Punct(Punct::LeftBrace) => StmtKind::Block(self.parse_block_body()?),
            TokenType::Punct(Punct::Semicolon) => {
                self.advance();
                StmtKind::Empty
            }
            TokenType::Keyword(Keyword::Var) => {
                let decl = self.parse_var_decl(false)?;
                self.consume_semicolon()?;
                StmtKind::Var(decl)
            }
            TokenType::Keyword(Keyword::Function) => StmtKind::Function(self.parse_function(true)?),
            TokenType::Keyword(Keyword::If) => self.parse_if()?,
            TokenType::Keyword(Keyword::For) => self.parse_for()?,
            TokenType::Keyword(Keyword::While) => {
                self.advance();
                let test = self.parse_paren_expression()?;
                let body = Box::new(self.parse_statement()?);
                StmtKind::While { test, body }
            }
            TokenType::Keyword(Keyword::Do) => {
                self.advance();
                let body = Box::new(self.parse_statement()?);
                self.expect_keyword(Keyword::While)?;
                let test = self.parse_paren_expression()?;
                self.eat_punct(Punct::Semicolon);
                StmtKind::DoWhile { body, test }
            }
            TokenType::Keyword(Keyword::Return) => {
                self.advance();
                let argument = if self.at_statement_break() { None } else { Some(self.parse_expression(false)?) };
                self.consume_semicolon()?;
                StmtKind::Return(argument)
            }
            TokenType::Keyword(Keyword::Throw) => {
                self.advance();
                if self.peek().newline_before {
                    return Err(ParseError::syntax_error(self.start(), "Illegal newline after throw".to_string()));
                }
                let argument = self.parse_expression(false)?;
                self.consume_semicolon()?;
                StmtKind::Throw(argument)
            }
            TokenType::Keyword(Keyword::Break) | TokenType::Keyword(Keyword::Continue) => {
                let is_break = token.is_keyword(Keyword::Break);
                self.advance();
                let label = if !self.at_statement_break() && matches!(self.peek().token_type, TokenType::Identifier(_)) {
                    Some(self.expect_ident()?)
                } else {
                    None
                };
                self.consume_semicolon()?;
                if is_break { StmtKind::Break(label) } else { StmtKind::Continue(label) }
            }
            TokenType::Keyword(Keyword::Switch) => self.parse_switch()?,
            TokenType::Keyword(Keyword::Try) => self.parse_try()?,
            TokenType::Keyword(Keyword::With) => {
                self.advance();
                let object = self.parse_paren_expression()?;
                let body = Box::new(self.parse_statement()?);
                StmtKind::With { object, body }
            }
            TokenType::Keyword(Keyword::Debugger) => {
                self.advance();
                self.consume_semicolon()?;
                StmtKind::Debugger
            }
            TokenType::Identifier(_) if self.peek_next().is_punct(Punct::Colon) => {
                let label = self.expect_ident()?;
                self.advance();
                let body = Box::new(self.parse_statement()?);
                StmtKind::Labeled { label, body }
            }
            _ => {
                let expr = self.parse_expression(false)?;
                self.consume_semicolon()?;
                StmtKind::Expression(expr)
            }
        };

        Ok(Stmt {
            kind,
            span: self.finish(start),
        })
    }

    fn parse_paren_expression(&mut self) -> ParseResult<Expr> {
        self.expect_punct(Punct::LeftParen)?;
        let expr = self.parse_expression(false)?;
        self.expect_punct(Punct::RightParen)?;
        Ok(expr)
    }

    fn parse_var_decl(&mut self, no_in: bool) -> ParseResult<VarDecl> {
        let start = self.start();
        self.expect_keyword(Keyword::Var)?;
        let mut declarations = Vec::new();
        loop {
            let decl_start = self.start();
            let id = self.expect_ident()?;
            let init = if self.eat_punct(Punct::Assign) { Some(self.parse_assignment(no_in)?) } else { None };
            declarations.push(Declarator {
                id,
                init,
                span: self.finish(decl_start),
            });
            if !self.eat_punct(Punct::Comma) {
                break;
            }
        }
        Ok(VarDecl {
            declarations,
            span: self.finish(start),
        })
    }

    fn parse_function(&mut self, require_name: bool) -> ParseResult<Function> {
        let start = self.start();
        self.expect_keyword(Keyword::Function)?;
        let id = if matches!(self.peek().token_type, TokenType::Identifier(_)) {
            Some(self.expect_ident()?)
        } else if require_name {
            return Err(self.unexpected(Some("function name")));
        } else {
            None
        };

        self.expect_punct(Punct::LeftParen)?;
        let mut params = Vec::new();
        if !self.at_punct(Punct::RightParen) {
            loop {
                params.push(self.expect_ident()?);
                if !self.eat_punct(Punct::Comma) {
                    break;
                }
            }
        }
        self.expect_punct(Punct::RightParen)?;
        let body = self.parse_block_body()?;

        Ok(Function {
            id,
            params,
            body,
            span: self.finish(start),
        })
    }

    fn parse_if(&mut self) -> ParseResult<StmtKind> {
        self.advance();
        let test = self.parse_paren_expression()?;
        let consequent = Box::new(self.parse_statement()?);
        let alternate = if self.at_keyword(Keyword::Else) {
            self.advance();
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };
        Ok(StmtKind::If { test, consequent, alternate })
    }

    fn parse_for(&mut self) -> ParseResult<StmtKind> {
        self.advance();
        self.expect_punct(Punct::LeftParen)?;

        let init = if self.at_punct(Punct::Semicolon) {
            None
        } else if self.at_keyword(Keyword::Var) {
            Some(ForInit::Var(self.parse_var_decl(true)?))
        } else {
            Some(ForInit::Expr(self.parse_expression(true)?))
        };

        if self.at_keyword(Keyword::In) {
            let left = match init {
                Some(ForInit::Var(decl)) if decl.declarations.len() == 1 => ForInit::Var(decl),
                Some(ForInit::Expr(expr)) if is_assignable(&expr) => ForInit::Expr(expr),
                _ => {
                    return Err(ParseError::new(
                        ParseErrorKind::InvalidAssignment,
                        self.start(),
                        "Invalid left-hand side in for-in".to_string(),
                    ));
                }
            };
            self.advance();
            let right = self.parse_expression(false)?;
            self.expect_punct(Punct::RightParen)?;
            let body = Box::new(self.parse_statement()?);
            return Ok(StmtKind::ForIn { left, right, body });
        }

        self.expect_punct(Punct::Semicolon)?;
        let test = if self.at_punct(Punct::Semicolon) { None } else { Some(self.parse_expression(false)?) };
        self.expect_punct(Punct::Semicolon)?;
        let update = if self.at_punct(Punct::RightParen) { None } else { Some(self.parse_expression(false)?) };
        self.expect_punct(Punct::RightParen)?;
        let body = Box::new(self.parse_statement()?);

        Ok(StmtKind::For { init, test, update, body })
    }

    fn parse_switch(&mut self) -> ParseResult<StmtKind> {
        self.advance();
        let discriminant = self.parse_paren_expression()?;
        self.expect_punct(Punct::LeftBrace)?;

        let mut cases = Vec::new();
        while !self.eat_punct(Punct::RightBrace) {
            let start = self.start();
            let test = if self.at_keyword(Keyword::Case) {
                self.advance();
                Some(self.parse_expression(false)?)
            } else {
                self.expect_keyword(Keyword::Default)?;
                None
            };
            self.expect_punct(Punct::Colon)?;

            let mut consequent = Vec::new();
            while !self.at_keyword(Keyword::Case) && !self.at_keyword(Keyword::Default) && !self.at_punct(Punct::RightBrace) {
                if self.peek().token_type == TokenType::Eof {
                    return Err(self.unexpected(Some("}")));
                }
                consequent.push(self.parse_statement()?);
            }
            cases.push(SwitchCase {
                test,
                consequent,
                span: self.finish(start),
            });
        }

        Ok(StmtKind::Switch { discriminant, cases })
    }

    fn parse_try(&mut self) -> ParseResult<StmtKind> {
        self.advance();
        let block = self.parse_block_body()?;

        let handler = if self.at_keyword(Keyword::Catch) {
            let start = self.start();
            self.advance();
            self.expect_punct(Punct::LeftParen)?;
            let param = self.expect_ident()?;
            self.expect_punct(Punct::RightParen)?;
            let body = self.parse_block_body()?;
            Some(CatchClause {
                param,
                body,
                span: self.finish(start),
            })
        } else {
            None
        };

        let finalizer = if self.at_keyword(Keyword::Finally) {
            self.advance();
            Some(self.parse_block_body()?)
        } else {
            None
        };

        if handler.is_none() && finalizer.is_none() {
            return Err(self.unexpected(Some("catch or finally")));
        }

        Ok(StmtKind::Try { block, handler, finalizer })
    }

    // --- expressions ---

    fn parse_expression(&mut self, no_in: bool) -> ParseResult<Expr> {
        let first = self.parse_assignment(no_in)?;
        if !self.at_punct(Punct::Comma) {
            return Ok(first);
        }
        let start = first.span.start;
        let mut expressions = vec![first];
        while self.eat_punct(Punct::Comma) {
            expressions.push(self.parse_assignment(no_in)?);
        }
        Ok(Expr {
            kind: ExprKind::Sequence(expressions),
            span: self.finish(start),
        })
    }

    fn parse_assignment(&mut self, no_in: bool) -> ParseResult<Expr> {
        let left = self.parse_conditional(no_in)?;

        let op = match &self.peek().token_type {
            TokenType::Punct(p) if p.is_assignment() => *p,
            _ => return Ok(left),
        };
        if !is_assignable(&left) {
            return Err(ParseError::new(
                ParseErrorKind::InvalidAssignment,
                left.span.start,
                "Invalid left-hand side in assignment".to_string(),
            ));
        }
        self.advance();
        let right = self.parse_assignment(no_in)?;
        let span = left.span.merge(right.span);
        Ok(Expr {
            kind: ExprKind::Assign {
                op,
                left: Box::new(left),
                right: Box::new(right),
            },
            span,
        })
    }

    fn parse_conditional(&mut self, no_in: bool) -> ParseResult<Expr> {
        let test = self.parse_binary(0, no_in)?;
        if !self.eat_punct(Punct::Question) {
            return Ok(test);
        }
        let consequent = self.parse_assignment(false)?;
        self.expect_punct(Punct::Colon)?;
        let alternate = self.parse_assignment(no_in)?;
        let span = test.span.merge(alternate.span);
        Ok(Expr {
            kind: ExprKind::Conditional {
                test: Box::new(test),
                consequent: Box::new(consequent),
                alternate: Box::new(alternate),
            },
            span,
        })
    }

    fn current_binary_op(&self, no_in: bool) -> Option<(BinaryOp, u8)> {
        match &self.peek().token_type {
            TokenType::Punct(p) => p.binary_precedence().map(|prec| (BinaryOp::Punct(*p), prec)),
            TokenType::Keyword(Keyword::In) if !no_in => Some((BinaryOp::In, RELATIONAL_PRECEDENCE)),
            TokenType::Keyword(Keyword::Instanceof) => Some((BinaryOp::Instanceof, RELATIONAL_PRECEDENCE)),
            _ => None,
        }
    }

    fn parse_binary(&mut self, min_precedence: u8, no_in: bool) -> ParseResult<Expr> {
        let mut left = self.parse_unary()?;

        while let Some((op, precedence)) = self.current_binary_op(no_in) {
            if precedence <= min_precedence {
                break;
            }
            self.advance();
            let right = self.parse_binary(precedence, no_in)?;
            let span = left.span.merge(right.span);
            let kind = match op {
                BinaryOp::Punct(p @ (Punct::And | Punct::Or)) => ExprKind::Logical {
                    op: p,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                op => ExprKind::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
            };
            left = Expr { kind, span };
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> ParseResult<Expr> {
        let start = self.start();
        let op = match &self.peek().token_type {
            TokenType::Punct(Punct::Not) => Some(UnaryOp::Not),
            TokenType::Punct(Punct::BitNot) => Some(UnaryOp::BitNot),
            TokenType::Punct(Punct::Plus) => Some(UnaryOp::Plus),
            TokenType::Punct(Punct::Minus) => Some(UnaryOp::Minus),
            TokenType::Keyword(Keyword::Typeof) => Some(UnaryOp::Typeof),
            TokenType::Keyword(Keyword::Void) => Some(UnaryOp::Void),
            TokenType::Keyword(Keyword::Delete) => Some(UnaryOp::Delete),
            TokenType::Punct(p @ (Punct::Increment | Punct::Decrement)) => {
                let op = *p;
                self.advance();
                let argument = self.parse_unary()?;
                return Ok(Expr {
                    kind: ExprKind::Update {
                        op,
                        prefix: true,
                        argument: Box::new(argument),
                    },
                    span: self.finish(start),
                });
            }
            _ => None,
        };

        if let Some(op) = op {
            self.advance();
            let argument = self.parse_unary()?;
            return Ok(Expr {
                kind: ExprKind::Unary {
                    op,
                    argument: Box::new(argument),
                },
                span: self.finish(start),
            });
        }

        let expr = self.parse_left_hand_side()?;
        let token = self.peek();
        if !token.newline_before {
            if let TokenType::Punct(op @ (Punct::Increment | Punct::Decrement)) = token.token_type {
                self.advance();
                return Ok(Expr {
                    kind: ExprKind::Update {
                        op,
                        prefix: false,
                        argument: Box::new(expr),
                    },
                    span: self.finish(start),
                });
            }
        }
        Ok(expr)
    }

    fn parse_left_hand_side(&mut self) -> ParseResult<Expr> {
        let start = self.start();
        let mut expr = self.parse_member_expression()?;
        loop {
            if self.at_punct(Punct::LeftParen) {
                let arguments = self.parse_arguments()?;
                expr = Expr {
                    kind: ExprKind::Call {
                        callee: Box::new(expr),
                        arguments,
                    },
                    span: self.finish(start),
                };
            } else if let Some(member) = self.parse_member_suffix(&expr, start)? {
                expr = member;
            } else {
                return Ok(expr);
            }
        }
    }

    fn parse_member_expression(&mut self) -> ParseResult<Expr> {
        let start = self.start();
        let mut expr = if self.at_keyword(Keyword::New) { self.parse_new()? } else { self.parse_primary()? };
        while let Some(member) = self.parse_member_suffix(&expr, start)? {
            expr = member;
        }
        Ok(expr)
    }

    fn parse_member_suffix(&mut self, object: &Expr, start: Position) -> ParseResult<Option<Expr>> {
        if self.eat_punct(Punct::Dot) {
            let token = self.peek().clone();
            let Some(name) = token.as_name() else {
                return Err(self.unexpected(Some("property name")));
            };
            let property = Expr {
                kind: ExprKind::Ident(name.to_string()),
                span: token.span,
            };
            self.advance();
            return Ok(Some(Expr {
                kind: ExprKind::Member {
                    object: Box::new(object.clone()),
                    property: Box::new(property),
                    computed: false,
                },
                span: self.finish(start),
            }));
        }
        if self.eat_punct(Punct::LeftBracket) {
            let property = self.parse_expression(false)?;
            self.expect_punct(Punct::RightBracket)?;
            return Ok(Some(Expr {
                kind: ExprKind::Member {
                    object: Box::new(object.clone()),
                    property: Box::new(property),
                    computed: true,
                },
                span: self.finish(start),
            }));
        }
        Ok(None)
    }

    fn parse_new(&mut self) -> ParseResult<Expr> {
        let start = self.start();
        self.expect_keyword(Keyword::New)?;
        let callee = self.parse_member_expression()?;
        let arguments = if self.at_punct(Punct::LeftParen) { self.parse_arguments()? } else { Vec::new() };
        Ok(Expr {
            kind: ExprKind::New {
                callee: Box::new(callee),
                arguments,
            },
            span: self.finish(start),
        })
    }

    fn parse_arguments(&mut self) -> ParseResult<Vec<Expr>> {
        self.expect_punct(Punct::LeftParen)?;
        let mut arguments = Vec::new();
        if !self.at_punct(Punct::RightParen) {
            loop {
                arguments.push(self.parse_assignment(false)?);
                if !self.eat_punct(Punct::Comma) {
                    break;
                }
            }
        }
        self.expect_punct(Punct::RightParen)?;
        Ok(arguments)
    }

    fn parse_primary(&mut self) -> ParseResult<Expr> {
        let start = self.start();
        let token = self.peek().clone();

        let kind = match token.token_type {
            TokenType::Identifier(name) => {
                self.advance();
                ExprKind::Ident(name)
            }
            TokenType::String(value) => {
                self.advance();
                ExprKind::Literal(Literal::String(value))
            }
            TokenType::Number => {
                self.advance();
                ExprKind::Literal(Literal::Number(token.lexeme))
            }
            TokenType::Regex => {
                self.advance();
                ExprKind::Literal(Literal::Regex(token.lexeme))
            }
            TokenType::Keyword(Keyword::This) => {
                self.advance();
                ExprKind::This
            }
            TokenType::Keyword(Keyword::True) => {
                self.advance();
                ExprKind::Literal(Literal::Boolean(true))
            }
            TokenType::Keyword(Keyword::False) => {
                self.advance();
                ExprKind::Literal(Literal::Boolean(false))
            }
            TokenType::Keyword(Keyword::Null) => {
                self.advance();
                ExprKind::Literal(Literal::Null)
            }
            TokenType::Keyword(Keyword::Function) => ExprKind::Function(Box::new(self.parse_function(false)?)),
            TokenType::Punct(Punct::LeftParen) => {
                // The parenthesised expression keeps its own span.
                return self.parse_paren_expression();
            }
            TokenType::Punct(Punct::LeftBracket) => self.parse_array()?,
            TokenType::Punct(Punct::LeftBrace) => self.parse_object()?,
            _ => return Err(self.unexpected(None)),
        };

        Ok(Expr {
            kind,
            span: self.finish(start),
        })
    }

    fn parse_array(&mut self) -> ParseResult<ExprKind> {
        self.expect_punct(Punct::LeftBracket)?;
        let mut elements = Vec::new();
        loop {
            if self.eat_punct(Punct::RightBracket) {
                break;
            }
            if self.at_punct(Punct::Comma) {
                self.advance();
                elements.push(None);
                continue;
            }
            elements.push(Some(self.parse_assignment(false)?));
            if !self.at_punct(Punct::RightBracket) {
                self.expect_punct(Punct::Comma)?;
            }
        }
        Ok(ExprKind::Array(elements))
    }

    fn parse_object(&mut self) -> ParseResult<ExprKind> {
        self.expect_punct(Punct::LeftBrace)?;
        let mut properties = Vec::new();
        while !self.eat_punct(Punct::RightBrace) {
            properties.push(self.parse_property()?);
            if !self.at_punct(Punct::RightBrace) {
                self.expect_punct(Punct::Comma)?;
            }
        }
        Ok(ExprKind::Object(properties))
    }

    fn parse_property(&mut self) -> ParseResult<Property> {
        let start = self.start();
        let key = self.parse_property_key()?;

        let accessor = match &key {
            PropertyKey::Ident(name) if !self.at_punct(Punct::Colon) => match name.as_str() {
                "get" => Some(PropertyKind::Get),
                "set" => Some(PropertyKind::Set),
                _ => None,
            },
            _ => None,
        };

        if let Some(kind) = accessor {
            let key = self.parse_property_key()?;
            let fn_start = self.start();
            self.expect_punct(Punct::LeftParen)?;
            let mut params = Vec::new();
            if !self.at_punct(Punct::RightParen) {
                params.push(self.expect_ident()?);
            }
            self.expect_punct(Punct::RightParen)?;
            let body = self.parse_block_body()?;
            let span = self.finish(fn_start);
            let value = Expr {
                kind: ExprKind::Function(Box::new(Function {
                    id: None,
                    params,
                    body,
                    span,
                })),
                span,
            };
            return Ok(Property {
                key,
                value,
                kind,
                span: self.finish(start),
            });
        }

        self.expect_punct(Punct::Colon)?;
        let value = self.parse_assignment(false)?;
        Ok(Property {
            key,
            value,
            kind: PropertyKind::Init,
            span: self.finish(start),
        })
    }

    fn parse_property_key(&mut self) -> ParseResult<PropertyKey> {
        let token = self.peek().clone();
        let key = match &token.token_type {
            TokenType::String(value) => PropertyKey::String(value.clone()),
            TokenType::Number => PropertyKey::Number(token.lexeme.clone()),
            _ => match token.as_name() {
                Some(name) => PropertyKey::Ident(name.to_string()),
                None => return Err(self.unexpected(Some("property name"))),
            },
        };
        self.advance();
        Ok(key)
    }
}

fn is_assignable(expr: &Expr) -> bool {
    matches!(expr.kind, ExprKind::Ident(_) | ExprKind::Member { .. })
}
