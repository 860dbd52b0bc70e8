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

//! Top-level statement shapes
//!
//! The analysed source uses a fixed grammar of top-level statements. Each
//! statement is matched against the shapes below in order; the first match
//! wins, so a method block is never mistaken for a build call.

use crate::parser::ast::*;
use regex::Regex;

/// Callee name of the alias call
pub const ALIAS_CALLEE: &str = "alias";

/// A `defineX(namespace, { ... }, [FLAGS])` call
#[derive(Debug, Clone)]
pub struct DefineCall<'a> {
    pub define: &'a str,
    pub methods: &'a [Property],
    /// Identifiers of the optional flag array
    pub flags: Option<Vec<String>>,
}

/// An `alias(namespace, 'name', 'source')` call
#[derive(Debug, Clone, Copy)]
pub struct AliasCall<'a> {
    pub name: &'a str,
    pub source: &'a str,
}

#[derive(Debug, Clone)]
pub enum TopLevelShape<'a> {
    UseStrict,
    MethodBlock(DefineCall<'a>),
    PolyfillBlock(DefineCall<'a>),
    Var(&'a VarDecl),
    Function(&'a Function),
    /// `Target.member = value`, extending a registered package
    MemberAssignment { target: &'a str, right: &'a Expr },
    Alias(AliasCall<'a>),
    BuildCall { callee: &'a str },
}

/// Shapes recognised inside the body of a build function
#[derive(Debug, Clone)]
pub enum BuildBodyShape<'a> {
    MethodBlock(DefineCall<'a>),
    /// `defineXSimilar(namespace, names, fn)`; `names` may be a literal list
    SimilarBlock { names: &'a Expr },
    Alias(AliasCall<'a>),
    /// `var <list> = ['a', 'b']` naming the methods an aggregate builder adds
    MethodList(&'a [Option<Expr>]),
    Other,
}

/// Compiled call-name patterns
#[derive(Debug)]
pub struct ShapePatterns {
    method_block: Regex,
    polyfill_block: Regex,
    similar_block: Regex,
    assign_spacing: Regex,
}

impl ShapePatterns {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            method_block: Regex::new(r"^define(Static|Instance(AndStatic)?)(WithArguments)?$")?,
            polyfill_block: Regex::new(r"^define(Static|Instance)Polyfill$")?,
            similar_block: Regex::new(r"^define(Static|Instance(AndStatic)?)Similar$")?,
            assign_spacing: Regex::new(r"\s+=\s+")?,
        })
    }

    /// Normalise the spacing of the first `=` in a declarator
    pub fn tidy_declarator(&self, text: &str) -> String {
        self.assign_spacing.replace(text, " = ").into_owned()
    }

    /// Classify a top-level statement. The error names the unsupported shape.
    pub fn classify<'a>(&self, stmt: &'a Stmt) -> Result<TopLevelShape<'a>, String> {
        match &stmt.kind {
            StmtKind::Var(decl) => return Ok(TopLevelShape::Var(decl)),
            StmtKind::Function(function) => return Ok(TopLevelShape::Function(function)),
            StmtKind::Expression(_) => {}
            other => return Err(other.describe().to_string()),
        }

        if is_use_strict(stmt) {
            return Ok(TopLevelShape::UseStrict);
        }
        if let Some((callee, args)) = named_call(stmt) {
            if self.method_block.is_match(callee) {
                return define_call(callee, args).map(TopLevelShape::MethodBlock);
            }
            if self.polyfill_block.is_match(callee) {
                return define_call(callee, args).map(TopLevelShape::PolyfillBlock);
            }
        }
        if let Some((target, right)) = member_assignment(stmt) {
            return Ok(TopLevelShape::MemberAssignment { target, right });
        }
        if let Some((callee, args)) = named_call(stmt) {
            if callee == ALIAS_CALLEE {
                return alias_call(args).map(TopLevelShape::Alias);
            }
            return Ok(TopLevelShape::BuildCall { callee });
        }
        Err("expression statement".to_string())
    }

    /// Classify a statement of a build function body
    pub fn classify_build_body<'a>(&self, stmt: &'a Stmt, method_list_var: &str) -> Result<BuildBodyShape<'a>, String> {
        if let StmtKind::Var(decl) = &stmt.kind {
            if let Some(first) = decl.declarations.first() {
                if first.id.name == method_list_var {
                    if let Some(Expr { kind: ExprKind::Array(elements), .. }) = &first.init {
                        return Ok(BuildBodyShape::MethodList(elements));
                    }
                }
            }
            return Ok(BuildBodyShape::Other);
        }

        let Some((callee, args)) = named_call(stmt) else {
            return Ok(BuildBodyShape::Other);
        };
        if self.method_block.is_match(callee) {
            return define_call(callee, args).map(BuildBodyShape::MethodBlock);
        }
        if self.similar_block.is_match(callee) {
            return match args.get(1) {
                Some(names) => Ok(BuildBodyShape::SimilarBlock { names }),
                None => Err(format!("{callee} call without method names")),
            };
        }
        if callee == ALIAS_CALLEE {
            return alias_call(args).map(BuildBodyShape::Alias);
        }
        Ok(BuildBodyShape::Other)
    }
}

fn is_use_strict(stmt: &Stmt) -> bool {
    matches!(&stmt.kind, StmtKind::Expression(expr) if expr.as_str() == Some("use strict"))
}

/// Callee name and arguments of `name(...)` expression statements
fn named_call(stmt: &Stmt) -> Option<(&str, &[Expr])> {
    let StmtKind::Expression(Expr { kind: ExprKind::Call { callee, arguments }, .. }) = &stmt.kind else {
        return None;
    };
    callee.as_ident().map(|name| (name, arguments.as_slice()))
}

/// Leftmost identifier and right-hand side of `a.b... = value`
fn member_assignment(stmt: &Stmt) -> Option<(&str, &Expr)> {
    let StmtKind::Expression(Expr {
        kind: ExprKind::Assign { left, right, .. },
        ..
    }) = &stmt.kind
    else {
        return None;
    };
    let mut object: &Expr = left;
    if !matches!(object.kind, ExprKind::Member { .. }) {
        return None;
    }
    while let ExprKind::Member { object: inner, .. } = &object.kind {
        object = &**inner;
    }
    object.as_ident().map(|target| (target, &**right))
}

fn define_call<'a>(define: &'a str, args: &'a [Expr]) -> Result<DefineCall<'a>, String> {
    let Some(Expr { kind: ExprKind::Object(methods), .. }) = args.get(1) else {
        return Err(format!("{define} call without a method object"));
    };
    let flags = match args.get(2) {
        None => None,
        Some(Expr { kind: ExprKind::Array(elements), .. }) => {
            let names = elements
                .iter()
                .map(|e| e.as_ref().and_then(Expr::as_ident).map(str::to_string))
                .collect::<Option<Vec<_>>>()
                .ok_or_else(|| format!("{define} call with non-identifier flags"))?;
            Some(names)
        }
        Some(_) => return Err(format!("{define} call with a non-array flag argument")),
    };
    Ok(DefineCall { define, methods, flags })
}

fn alias_call(args: &[Expr]) -> Result<AliasCall<'_>, String> {
    match (args.get(1).and_then(Expr::as_str), args.get(2).and_then(Expr::as_str)) {
        (Some(name), Some(source)) => Ok(AliasCall { name, source }),
        _ => Err("alias call without literal method names".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use test_case::test_case;

    fn shape_name(source: &str) -> String {
        let program = parse(source).unwrap();
        let patterns = ShapePatterns::new().unwrap();
        match patterns.classify(&program.body[0]) {
            Ok(TopLevelShape::UseStrict) => "use-strict".into(),
            Ok(TopLevelShape::MethodBlock(_)) => "method".into(),
            Ok(TopLevelShape::PolyfillBlock(_)) => "polyfill".into(),
            Ok(TopLevelShape::Var(_)) => "var".into(),
            Ok(TopLevelShape::Function(_)) => "function".into(),
            Ok(TopLevelShape::MemberAssignment { target, .. }) => format!("member:{target}"),
            Ok(TopLevelShape::Alias(call)) => format!("alias:{}<-{}", call.name, call.source),
            Ok(TopLevelShape::BuildCall { callee }) => format!("build:{callee}"),
            Err(shape) => format!("error:{shape}"),
        }
    }

    #[test_case("'use strict';", "use-strict" ; "use strict directive")]
    #[test_case("defineInstance(sugarString, { 'at': function() {} });", "method" ; "instance method block")]
    #[test_case("defineStaticWithArguments(sugarArray, { 'create': function() {} }, [FLAG]);", "method" ; "static with arguments")]
    #[test_case("defineInstancePolyfill(sugarString, { 'trim': function() {} });", "polyfill" ; "polyfill block")]
    #[test_case("var a = 1;", "var" ; "variable")]
    #[test_case("function f() {}", "function" ; "function declaration")]
    #[test_case("Inflector.acronyms = {};", "member:Inflector" ; "member assignment")]
    #[test_case("a.b.c = d;", "member:a" ; "nested member assignment")]
    #[test_case("alias(sugarArray, 'all', 'every');", "alias:all<-every" ; "alias call")]
    #[test_case("buildDateUnits();", "build:buildDateUnits" ; "build call")]
    #[test_case("a = 1;", "error:expression statement" ; "plain reassignment")]
    #[test_case("if (a) {}", "error:if statement" ; "if statement")]
    #[test_case("defineInstance(sugarString, fn);", "error:defineInstance call without a method object" ; "define without object")]
    fn test_classify(source: &str, expected: &str) {
        assert_eq!(shape_name(source), expected);
    }

    #[test]
    fn test_define_call_flags() {
        let program = parse("defineInstance(sugarArray, { 'a': 1, 'b': 2 }, [INDEX, LENGTH]);").unwrap();
        let patterns = ShapePatterns::new().unwrap();
        let Ok(TopLevelShape::MethodBlock(call)) = patterns.classify(&program.body[0]) else {
            panic!("expected method block");
        };
        assert_eq!(call.define, "defineInstance");
        assert_eq!(call.methods.len(), 2);
        assert_eq!(call.flags, Some(vec!["INDEX".to_string(), "LENGTH".to_string()]));
    }

    #[test]
    fn test_classify_build_body() {
        let program = parse(
            "function f() { var methods = ['keys', 'values']; defineInstanceSimilar(sugarObject, 'a,b', fn); helper(); }",
        )
        .unwrap();
        let StmtKind::Function(function) = &program.body[0].kind else {
            panic!("expected function");
        };
        let patterns = ShapePatterns::new().unwrap();
        assert!(matches!(patterns.classify_build_body(&function.body[0], "methods"), Ok(BuildBodyShape::MethodList(e)) if e.len() == 2));
        assert!(matches!(patterns.classify_build_body(&function.body[1], "methods"), Ok(BuildBodyShape::SimilarBlock { .. })));
        assert!(matches!(patterns.classify_build_body(&function.body[2], "methods"), Ok(BuildBodyShape::Other)));
    }

    #[test]
    fn test_tidy_declarator() {
        let patterns = ShapePatterns::new().unwrap();
        assert_eq!(patterns.tidy_declarator("a    =\n  1"), "a = 1");
        assert_eq!(patterns.tidy_declarator("b"), "b");
    }
}
