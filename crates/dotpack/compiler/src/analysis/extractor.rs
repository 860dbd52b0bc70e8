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

//! Free-identifier extraction
//!
//! Walks a subtree and collects the identifiers it references that are not
//! bound locally. `var` and function declarations are hoisted: references
//! are filtered against the complete set of names the scope declares, not
//! only those declared before the reference. Function bodies are walked in
//! a fresh scope seeded with their parameters; a catch parameter is bound
//! only inside its clause.

use super::globals::{HOST_GLOBALS, WHITELIST};
use crate::error::{BuildError, BuildResult};
use crate::parser::ast::*;
use crate::parser::Position;
use indexmap::IndexSet;
use std::collections::HashSet;

/// Subtree handed to the extractor
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    Stmt(&'a Stmt),
    Stmts(&'a [Stmt]),
    Expr(&'a Expr),
    Declarator(&'a Declarator),
    Property(&'a Property),
}

/// Computes free identifier references of syntax subtrees
#[derive(Debug, Clone)]
pub struct DependencyExtractor {
    ignored: HashSet<String>,
}

impl Default for DependencyExtractor {
    fn default() -> Self {
        Self::new(std::iter::empty::<String>())
    }
}

impl DependencyExtractor {
    /// Create an extractor ignoring the built-in globals plus `extra_globals`
    pub fn new<I, S>(extra_globals: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut ignored: HashSet<String> = WHITELIST.iter().chain(HOST_GLOBALS).map(|s| s.to_string()).collect();
        ignored.extend(extra_globals.into_iter().map(Into::into));
        Self { ignored }
    }

    pub fn is_ignored(&self, name: &str) -> bool {
        self.ignored.contains(name)
    }

    /// Free identifiers of `node`, in first-reference order. `context` names
    /// the package being analysed and only appears in errors.
    pub fn extract(&self, context: &str, node: Node<'_>, locals: &[&str]) -> BuildResult<IndexSet<String>> {
        let mut scope = Scope::new(self, context, locals.iter().map(|s| s.to_string()));
        match node {
            Node::Stmt(stmt) => scope.walk_stmt(stmt)?,
            Node::Stmts(stmts) => scope.walk_stmts(stmts)?,
            Node::Expr(expr) => scope.walk_expr(expr)?,
            Node::Declarator(decl) => scope.walk_declarator(decl)?,
            Node::Property(prop) => scope.walk_property(prop)?,
        }
        Ok(scope.finish())
    }
}

struct Scope<'x> {
    extractor: &'x DependencyExtractor,
    context: &'x str,
    locals: HashSet<String>,
    refs: IndexSet<String>,
}

impl<'x> Scope<'x> {
    fn new(extractor: &'x DependencyExtractor, context: &'x str, locals: impl IntoIterator<Item = String>) -> Self {
        Self {
            extractor,
            context,
            locals: locals.into_iter().collect(),
            refs: IndexSet::new(),
        }
    }

    fn finish(self) -> IndexSet<String> {
        let Scope { extractor, locals, refs, .. } = self;
        refs.into_iter().filter(|r| !locals.contains(r) && !extractor.is_ignored(r)).collect()
    }

    fn unsupported(&self, construct: &str, position: Position) -> BuildError {
        BuildError::UnsupportedConstruct {
            context: self.context.to_string(),
            construct: construct.to_string(),
            position,
        }
    }

    fn walk_stmts(&mut self, stmts: &[Stmt]) -> BuildResult<()> {
        stmts.iter().try_for_each(|stmt| self.walk_stmt(stmt))
    }

    fn walk_opt_expr(&mut self, expr: Option<&Expr>) -> BuildResult<()> {
        match expr {
            Some(expr) => self.walk_expr(expr),
            None => Ok(()),
        }
    }

    fn walk_stmt(&mut self, stmt: &Stmt) -> BuildResult<()> {
        match &stmt.kind {
            StmtKind::Expression(expr) | StmtKind::Throw(expr) => self.walk_expr(expr),
            StmtKind::Var(decl) => self.walk_var_decl(decl),
            StmtKind::Function(function) => {
                if let Some(id) = &function.id {
                    self.locals.insert(id.name.clone());
                }
                self.walk_function(function)
            }
            StmtKind::Block(body) => self.walk_stmts(body),
            StmtKind::Empty | StmtKind::Break(_) | StmtKind::Continue(_) => Ok(()),
            StmtKind::If { test, consequent, alternate } => {
                self.walk_expr(test)?;
                self.walk_stmt(consequent)?;
                match alternate {
                    Some(alternate) => self.walk_stmt(alternate),
                    None => Ok(()),
                }
            }
            StmtKind::For { init, test, update, body } => {
                if let Some(init) = init {
                    self.walk_for_init(init)?;
                }
                self.walk_opt_expr(test.as_ref())?;
                self.walk_opt_expr(update.as_ref())?;
                self.walk_stmt(body)
            }
            StmtKind::ForIn { left, right, body } => {
                self.walk_for_init(left)?;
                self.walk_expr(right)?;
                self.walk_stmt(body)
            }
            StmtKind::While { test, body } | StmtKind::DoWhile { body, test } => {
                self.walk_expr(test)?;
                self.walk_stmt(body)
            }
            StmtKind::Return(argument) => self.walk_opt_expr(argument.as_ref()),
            StmtKind::Switch { discriminant, cases } => {
                self.walk_expr(discriminant)?;
                for case in cases {
                    self.walk_opt_expr(case.test.as_ref())?;
                    self.walk_stmts(&case.consequent)?;
                }
                Ok(())
            }
            StmtKind::Try { block, handler, finalizer } => {
                self.walk_stmts(block)?;
                if let Some(handler) = handler {
                    self.walk_catch(handler)?;
                }
                match finalizer {
                    Some(finalizer) => self.walk_stmts(finalizer),
                    None => Ok(()),
                }
            }
            StmtKind::Labeled { .. } | StmtKind::With { .. } | StmtKind::Debugger => Err(self.unsupported(stmt.kind.describe(), stmt.span.start)),
        }
    }

    fn walk_for_init(&mut self, init: &ForInit) -> BuildResult<()> {
        match init {
            ForInit::Var(decl) => self.walk_var_decl(decl),
            ForInit::Expr(expr) => self.walk_expr(expr),
        }
    }

    fn walk_var_decl(&mut self, decl: &VarDecl) -> BuildResult<()> {
        decl.declarations.iter().try_for_each(|d| self.walk_declarator(d))
    }

    fn walk_declarator(&mut self, decl: &Declarator) -> BuildResult<()> {
        self.locals.insert(decl.id.name.clone());
        self.walk_opt_expr(decl.init.as_ref())
    }

    /// Walk a function body in a fresh scope and adopt its free references
    fn walk_function(&mut self, function: &Function) -> BuildResult<()> {
        let params = function.params.iter().map(|p| p.name.clone());
        let mut inner = Scope::new(self.extractor, self.context, params);
        inner.walk_stmts(&function.body)?;
        self.refs.extend(inner.finish());
        Ok(())
    }

    /// The catch parameter shadows only inside the clause, while `var`
    /// declarations of the clause belong to the enclosing function.
    fn walk_catch(&mut self, handler: &CatchClause) -> BuildResult<()> {
        let mut inner = Scope::new(self.extractor, self.context, std::iter::empty());
        inner.walk_stmts(&handler.body)?;
        let Scope { locals, refs, .. } = inner;
        self.refs.extend(refs.into_iter().filter(|r| *r != handler.param.name));
        self.locals.extend(locals);
        Ok(())
    }

    fn walk_property(&mut self, prop: &Property) -> BuildResult<()> {
        match prop.kind {
            PropertyKind::Init => self.walk_expr(&prop.value),
            PropertyKind::Get | PropertyKind::Set => Err(self.unsupported("accessor property", prop.span.start)),
        }
    }

    fn walk_expr(&mut self, expr: &Expr) -> BuildResult<()> {
        match &expr.kind {
            ExprKind::Ident(name) => {
                self.refs.insert(name.clone());
                Ok(())
            }
            ExprKind::Literal(_) | ExprKind::This => Ok(()),
            ExprKind::Array(elements) => elements.iter().flatten().try_for_each(|e| self.walk_expr(e)),
            ExprKind::Object(properties) => properties.iter().try_for_each(|p| self.walk_property(p)),
            ExprKind::Function(function) => {
                // A named function expression binds its name in its own body only.
                let mut inner = Scope::new(self.extractor, self.context, function.id.iter().map(|id| id.name.clone()));
                inner.walk_function(function)?;
                self.refs.extend(inner.finish());
                Ok(())
            }
            ExprKind::Unary { argument, .. } | ExprKind::Update { argument, .. } => self.walk_expr(argument),
            ExprKind::Binary { left, right, .. } | ExprKind::Logical { left, right, .. } | ExprKind::Assign { left, right, .. } => {
                self.walk_expr(left)?;
                self.walk_expr(right)
            }
            ExprKind::Conditional { test, consequent, alternate } => {
                self.walk_expr(test)?;
                self.walk_expr(consequent)?;
                self.walk_expr(alternate)
            }
            ExprKind::Call { callee, arguments } | ExprKind::New { callee, arguments } => {
                self.walk_expr(callee)?;
                arguments.iter().try_for_each(|a| self.walk_expr(a))
            }
            ExprKind::Member { object, property, computed } => {
                self.walk_expr(object)?;
                if *computed { self.walk_expr(property) } else { Ok(()) }
            }
            ExprKind::Sequence(expressions) => expressions.iter().try_for_each(|e| self.walk_expr(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use proptest::prelude::*;

    fn free_names(source: &str, locals: &[&str]) -> Vec<String> {
        let program = parse(source).unwrap();
        DependencyExtractor::default()
            .extract("test", Node::Stmts(&program.body), locals)
            .unwrap()
            .into_iter()
            .collect()
    }

    #[test]
    fn test_declarations_are_hoisted() {
        assert_eq!(free_names("f(a); var a = 1; function f() { return b; }", &[]), vec!["b"]);
    }

    #[test]
    fn test_function_scope_is_fresh() {
        let names = free_names("function outer(x) { return function(y) { return x + y + z; }; }", &[]);
        assert_eq!(names, vec!["z"]);
    }

    #[test]
    fn test_static_members_are_not_references() {
        assert_eq!(free_names("a.b.c(d[e], f.g);", &[]), vec!["a", "d", "e", "f"]);
    }

    #[test]
    fn test_globals_and_whitelist_ignored() {
        assert_eq!(free_names("Math.max(arguments.length, NaN, undefined, isString(x));", &["x"]), vec!["isString"]);
    }

    #[test]
    fn test_catch_param_is_clause_local() {
        assert_eq!(free_names("try { f(); } catch (e) { var r = e; } g(e, r);", &["f", "g"]), vec!["e"]);
    }

    #[test]
    fn test_named_function_expression_binds_itself() {
        assert_eq!(free_names("var f = function loop(n) { return n ? loop(n - 1) : done; };", &[]), vec!["done"]);
    }

    #[test]
    fn test_with_statement_is_rejected() {
        let program = parse("with (a) { b(); }").unwrap();
        let err = DependencyExtractor::default()
            .extract("pkg", Node::Stmts(&program.body), &[])
            .unwrap_err();
        assert!(matches!(err, BuildError::UnsupportedConstruct { ref construct, .. } if construct == "with statement"));
    }

    #[test]
    fn test_accessor_property_is_rejected() {
        let program = parse("x = { get y() { return 1; } };").unwrap();
        let err = DependencyExtractor::default()
            .extract("pkg", Node::Stmts(&program.body), &[])
            .unwrap_err();
        assert!(matches!(err, BuildError::UnsupportedConstruct { .. }));
    }

    const FREE: &[&str] = &["a", "b", "c", "d"];
    const BOUND: &[&str] = &["p", "q"];

    fn expr_strategy() -> impl Strategy<Value = String> {
        let leaf = prop::sample::select(FREE).prop_map(str::to_string);
        leaf.prop_recursive(4, 32, 3, |inner| {
            prop_oneof![
                (inner.clone(), inner.clone()).prop_map(|(l, r)| format!("({l} + {r})")),
                (inner.clone(), inner.clone()).prop_map(|(l, r)| format!("{l}({r})")),
                (inner.clone(), inner.clone()).prop_map(|(l, r)| format!("{l}[{r}]")),
                inner.clone().prop_map(|e| format!("{e}.prop")),
                (prop::sample::select(BOUND), inner.clone()).prop_map(|(p, e)| format!("(function({p}) {{ return {p} + {e}; }})")),
                (prop::sample::select(BOUND), inner.clone()).prop_map(|(p, e)| format!("(function() {{ try {{ {e}; }} catch ({p}) {{ {p}; }} }})")),
            ]
        })
    }

    proptest! {
        #[test]
        fn test_scope_soundness(expr in expr_strategy(), locals in prop::sample::subsequence(FREE.to_vec(), 0..FREE.len())) {
            let source = format!("x = {expr};");
            let names = free_names(&source, &locals);
            for name in &names {
                prop_assert!(!locals.contains(&name.as_str()), "local {} reported", name);
                prop_assert!(!BOUND.contains(&name.as_str()), "nested binding {} reported", name);
            }
        }
    }
}
