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

//! Syntax tree for the analysed script language
//!
//! The tree is closed: every construct the parser accepts has a variant here,
//! and consumers match exhaustively. Constructs outside the supported
//! statement grammar (`with`, labels, `debugger`, accessor properties) are
//! still parsed so that analysis can reject them with a precise location.

use super::position::Span;
use super::token::Punct;

/// A comment as reported by the lexer
#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    /// `true` for `/* */` comments
    pub block: bool,
    /// Text between the delimiters
    pub text: String,
    pub span: Span,
}

/// A parsed source unit
#[derive(Debug, Clone)]
pub struct Program {
    pub body: Vec<Stmt>,
    pub comments: Vec<Comment>,
}

/// An identifier occurrence
#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum StmtKind {
    Expression(Expr),
    Var(VarDecl),
    Function(Function),
    Block(Vec<Stmt>),
    Empty,
    If {
        test: Expr,
        consequent: Box<Stmt>,
        alternate: Option<Box<Stmt>>,
    },
    For {
        init: Option<ForInit>,
        test: Option<Expr>,
        update: Option<Expr>,
        body: Box<Stmt>,
    },
    ForIn {
        left: ForInit,
        right: Expr,
        body: Box<Stmt>,
    },
    While {
        test: Expr,
        body: Box<Stmt>,
    },
    DoWhile {
        body: Box<Stmt>,
        test: Expr,
    },
    Return(Option<Expr>),
    Throw(Expr),
    Break(Option<Ident>),
    Continue(Option<Ident>),
    Switch {
        discriminant: Expr,
        cases: Vec<SwitchCase>,
    },
    Try {
        block: Vec<Stmt>,
        handler: Option<CatchClause>,
        finalizer: Option<Vec<Stmt>>,
    },
    Labeled {
        label: Ident,
        body: Box<Stmt>,
    },
    With {
        object: Expr,
        body: Box<Stmt>,
    },
    Debugger,
}

impl StmtKind {
    /// Short description used in diagnostics
    pub fn describe(&self) -> &'static str {
        match self {
            StmtKind::Expression(_) => "expression statement",
            StmtKind::Var(_) => "variable declaration",
            StmtKind::Function(_) => "function declaration",
            StmtKind::Block(_) => "block",
            StmtKind::Empty => "empty statement",
            StmtKind::If { .. } => "if statement",
            StmtKind::For { .. } => "for statement",
            StmtKind::ForIn { .. } => "for-in statement",
            StmtKind::While { .. } => "while statement",
            StmtKind::DoWhile { .. } => "do-while statement",
            StmtKind::Return(_) => "return statement",
            StmtKind::Throw(_) => "throw statement",
            StmtKind::Break(_) => "break statement",
            StmtKind::Continue(_) => "continue statement",
            StmtKind::Switch { .. } => "switch statement",
            StmtKind::Try { .. } => "try statement",
            StmtKind::Labeled { .. } => "labeled statement",
            StmtKind::With { .. } => "with statement",
            StmtKind::Debugger => "debugger statement",
        }
    }
}

/// Left-hand side of a `for`/`for-in` head
#[derive(Debug, Clone)]
pub enum ForInit {
    Var(VarDecl),
    Expr(Expr),
}

#[derive(Debug, Clone)]
pub struct VarDecl {
    pub declarations: Vec<Declarator>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Declarator {
    pub id: Ident,
    pub init: Option<Expr>,
    pub span: Span,
}

/// Function declaration or expression
#[derive(Debug, Clone)]
pub struct Function {
    pub id: Option<Ident>,
    pub params: Vec<Ident>,
    pub body: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct SwitchCase {
    /// `None` for the `default` clause
    pub test: Option<Expr>,
    pub consequent: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct CatchClause {
    pub param: Ident,
    pub body: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum ExprKind {
    Ident(String),
    Literal(Literal),
    This,
    Array(Vec<Option<Expr>>),
    Object(Vec<Property>),
    Function(Box<Function>),
    Unary {
        op: UnaryOp,
        argument: Box<Expr>,
    },
    Update {
        op: Punct,
        prefix: bool,
        argument: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Logical {
        op: Punct,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Assign {
        op: Punct,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Conditional {
        test: Box<Expr>,
        consequent: Box<Expr>,
        alternate: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        arguments: Vec<Expr>,
    },
    New {
        callee: Box<Expr>,
        arguments: Vec<Expr>,
    },
    Member {
        object: Box<Expr>,
        property: Box<Expr>,
        computed: bool,
    },
    Sequence(Vec<Expr>),
}

impl Expr {
    /// Identifier name if this is a bare identifier
    pub fn as_ident(&self) -> Option<&str> {
        match &self.kind {
            ExprKind::Ident(name) => Some(name),
            _ => None,
        }
    }

    /// Cooked value if this is a string literal
    pub fn as_str(&self) -> Option<&str> {
        match &self.kind {
            ExprKind::Literal(Literal::String(value)) => Some(value),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    String(String),
    /// Numeric literal, kept as written
    Number(String),
    Boolean(bool),
    Null,
    /// Regular expression literal, kept as written
    Regex(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Minus,
    Plus,
    Not,
    BitNot,
    Typeof,
    Void,
    Delete,
}

/// Binary operator: either a punctuator or one of the keyword operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Punct(Punct),
    In,
    Instanceof,
}

#[derive(Debug, Clone)]
pub struct Property {
    pub key: PropertyKey,
    pub value: Expr,
    pub kind: PropertyKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PropertyKey {
    Ident(String),
    String(String),
    Number(String),
}

impl PropertyKey {
    /// The key as a property name
    pub fn name(&self) -> &str {
        match self {
            PropertyKey::Ident(name) | PropertyKey::String(name) | PropertyKey::Number(name) => name,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    Init,
    Get,
    Set,
}
