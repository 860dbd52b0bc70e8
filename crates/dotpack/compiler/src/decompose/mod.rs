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

//! Source unit decomposition
//!
//! Walks the top-level statements of one module and registers a package for
//! every declaration, method and alias it finds. Build calls are handed to
//! [`build_expr`].

pub mod build_expr;
pub mod classify;

pub use classify::{AliasCall, BuildBodyShape, DefineCall, ShapePatterns, TopLevelShape};

use crate::analysis::{CommentBinder, DependencyExtractor, Node};
use crate::config::BuildConfig;
use crate::error::{BuildError, BuildResult};
use crate::package::{BuildSession, Exports, Package, PackageKind, method_key};
use crate::parser::ast::*;
use crate::parser::{Span, parse};
use std::collections::HashMap;
use tracing::{debug, trace};

/// Decomposes modules into packages
#[derive(Debug)]
pub struct Decomposer<'c> {
    config: &'c BuildConfig,
    extractor: DependencyExtractor,
    patterns: ShapePatterns,
}

impl<'c> Decomposer<'c> {
    pub fn new(config: &'c BuildConfig) -> BuildResult<Self> {
        Ok(Self {
            config,
            extractor: DependencyExtractor::new(config.analysis.host_globals.iter().cloned()),
            patterns: ShapePatterns::new()?,
        })
    }

    /// Parse `source` as `module` and register its packages in `session`
    pub fn decompose(&self, session: &mut BuildSession, module: &str, source: &str) -> BuildResult<()> {
        let program = parse(source).map_err(|source| BuildError::Parse {
            module: module.to_string(),
            source,
        })?;
        let binder = CommentBinder::new(&program.comments)?;

        let mut context = ModuleContext {
            decomposer: self,
            session,
            module,
            source,
            binder,
            functions: HashMap::new(),
        };
        for stmt in &program.body {
            context.process(stmt)?;
        }

        debug!(module, statements = program.body.len(), "decomposed module");
        Ok(())
    }
}

/// State of one module being decomposed
pub(crate) struct ModuleContext<'d, 'c> {
    decomposer: &'d Decomposer<'c>,
    session: &'d mut BuildSession,
    module: &'d str,
    source: &'d str,
    binder: CommentBinder,
    /// Function declarations of this module, for build calls
    functions: HashMap<String, Function>,
}

impl ModuleContext<'_, '_> {
    fn process(&mut self, stmt: &Stmt) -> BuildResult<()> {
        let shape = self.decomposer.patterns.classify(stmt).map_err(|statement| BuildError::UnsupportedStatement {
            module: self.module.to_string(),
            statement,
            position: stmt.span.start,
        })?;

        match shape {
            TopLevelShape::UseStrict => Ok(()),
            TopLevelShape::MethodBlock(call) => {
                for prop in call.methods {
                    self.add_method(prop, call.define, call.flags.as_deref(), false)?;
                }
                Ok(())
            }
            TopLevelShape::PolyfillBlock(call) => {
                for prop in call.methods {
                    self.add_method(prop, call.define, None, true)?;
                }
                Ok(())
            }
            TopLevelShape::Var(decl) => match decl.declarations.as_slice() {
                [single] => self.add_variable(single),
                _ => self.add_bundle(stmt, decl),
            },
            TopLevelShape::Function(function) => self.add_function(stmt, function),
            TopLevelShape::MemberAssignment { target, right } => self.extend_package(stmt, target, right),
            TopLevelShape::Alias(call) => self.add_alias(stmt, call),
            TopLevelShape::BuildCall { callee } => build_expr::resolve(self, stmt, callee),
        }
    }

    /// Source of a node, widened to the start of its first line
    fn node_body(&self, span: Span) -> &str {
        span.text_from_line_start(self.source)
    }

    /// Exact source of a node
    fn inner_body(&self, span: Span) -> &str {
        span.text(self.source)
    }

    fn namespace_at(&self, line: usize) -> BuildResult<String> {
        self.binder.namespace_of(line).map(str::to_string).ok_or_else(|| BuildError::MissingNamespace {
            module: self.module.to_string(),
            line,
        })
    }

    fn method_key_at(&self, line: usize, name: &str) -> BuildResult<String> {
        Ok(method_key(self.module, &self.namespace_at(line)?, name))
    }

    fn extract(&self, context: &str, node: Node<'_>) -> BuildResult<indexmap::IndexSet<String>> {
        self.decomposer.extractor.extract(context, node, &[])
    }

    fn root_handle(&self) -> String {
        self.session.root_handle().to_string()
    }

    fn plain_package(&self, name: &str, kind: PackageKind) -> Package {
        let path = format!("{}/{}/{}", self.module, kind.dir_name(), name);
        Package::new(name, self.module, kind, path)
    }

    /// Method package skeleton: depends on the root handle and exports the
    /// method off its namespace
    fn method_package(&self, name: &str, namespace: &str, kind: PackageKind) -> Package {
        let path = match kind {
            PackageKind::Polyfill => format!("polyfills/{}/{}", namespace.to_lowercase(), name),
            _ => format!("{}/{}", namespace.to_lowercase(), name),
        };
        let root = self.root_handle();
        let mut package = Package::new(name, self.module, kind, path);
        package.exports = Exports::Single(format!("{root}.{namespace}.{name}"));
        package.add_dependency(root);
        package
    }

    fn add_variable(&mut self, decl: &Declarator) -> BuildResult<()> {
        let name = decl.id.name.as_str();
        let mut package = self.plain_package(name, PackageKind::for_var_name(name));
        package.add_dependencies(self.extract(name, Node::Declarator(decl))?);
        package.exports = Exports::Single(name.to_string());

        let body = format!("var {};", self.decomposer.patterns.tidy_declarator(self.inner_body(decl.span)));
        match &decl.init {
            // One-liners are exported directly without a declaration.
            Some(init) if !body.contains('\n') => {
                package.direct_exports.insert(name.to_string(), self.inner_body(init.span).to_string());
            }
            _ => package.push_body(body),
        }

        trace!(module = self.module, name, "registered variable");
        self.session.insert_top_level(package);
        Ok(())
    }

    fn add_bundle(&mut self, stmt: &Stmt, decl: &VarDecl) -> BuildResult<()> {
        let declared: Vec<&str> = decl.declarations.iter().map(|d| d.id.name.as_str()).collect();
        let kind = PackageKind::for_var_name(declared[0]);
        let name = self.binder.bundle_name(stmt.span.start.line, kind, &declared);

        let mut bundle = self.plain_package(&name, kind);
        bundle.add_dependencies(self.extract(&name, Node::Stmt(stmt))?);

        let mut unassigned = Vec::new();
        for declarator in &decl.declarations {
            let member = declarator.id.name.as_str();
            match &declarator.init {
                Some(init) => {
                    bundle.direct_exports.insert(member.to_string(), self.inner_body(init.span).to_string());
                }
                None => unassigned.push(self.inner_body(declarator.span).to_string()),
            }
            bundle.exports.push(member);
            self.session.insert_alias(member, name.as_str());
        }
        if !unassigned.is_empty() {
            bundle.push_body(format!("var {};", unassigned.join(", ")));
        }

        debug!(module = self.module, bundle = %name, members = declared.len(), "registered bundle");
        self.session.insert_top_level(bundle);
        Ok(())
    }

    fn add_function(&mut self, stmt: &Stmt, function: &Function) -> BuildResult<()> {
        let Some(id) = &function.id else {
            return Err(BuildError::UnsupportedStatement {
                module: self.module.to_string(),
                statement: "anonymous function declaration".to_string(),
                position: stmt.span.start,
            });
        };
        let name = id.name.as_str();
        let mut package = self.plain_package(name, PackageKind::Internal);
        package.add_dependencies(self.extract(name, Node::Stmt(stmt))?);
        package.push_body(self.node_body(stmt.span));
        package.exports = Exports::Single(name.to_string());

        self.session.insert_top_level(package);
        self.functions.insert(name.to_string(), function.clone());
        Ok(())
    }

    fn add_method(&mut self, prop: &Property, define: &str, flags: Option<&[String]>, polyfill: bool) -> BuildResult<()> {
        let name = prop.key.name();
        let namespace = self.namespace_at(prop.span.start.line)?;
        let kind = if polyfill { PackageKind::Polyfill } else { PackageKind::Method };

        let mut package = self.method_package(name, &namespace, kind);
        package.add_dependencies(self.extract(name, Node::Property(prop))?);
        if let Some(flags) = flags {
            package.add_dependencies(flags.iter().cloned());
        }
        package.push_body(self.define_block(prop, &namespace, define, flags));

        self.session.insert_method(method_key(self.module, &namespace, name), package);
        Ok(())
    }

    /// Re-render a single entry of a define call as its own call
    fn define_block(&self, prop: &Property, namespace: &str, define: &str, flags: Option<&[String]>) -> String {
        let open = format!("{}.{}.{}({{", self.session.root_handle(), namespace, define);
        let close = match flags {
            Some(flags) => format!("}}, [{}]);", flags.join(", ")),
            None => "});".to_string(),
        };
        [open.as_str(), "", self.node_body(prop.span), "", close.as_str()].join("\n")
    }

    fn add_alias(&mut self, stmt: &Stmt, call: AliasCall<'_>) -> BuildResult<()> {
        let line = stmt.span.start.line;
        let namespace = self.namespace_at(line)?;
        let mut package = self.method_package(call.name, &namespace, PackageKind::Alias);
        package.add_require(method_key(self.module, &namespace, call.source));
        package.add_dependencies(self.extract(call.name, Node::Stmt(stmt))?);
        package.push_body(self.node_body(stmt.span));

        self.session.insert_method(method_key(self.module, &namespace, call.name), package);
        Ok(())
    }

    /// `Target.member = value` appends to the package declaring `Target`
    fn extend_package(&mut self, stmt: &Stmt, target: &str, right: &Expr) -> BuildResult<()> {
        let deps = self.extract(target, Node::Expr(right))?;
        let id = self.session.lookup(target).ok_or_else(|| BuildError::missing(self.module, target))?;
        let body = self.node_body(stmt.span).to_string();

        let Some(package) = self.session.package_mut(&id) else {
            return Err(BuildError::missing(self.module, target));
        };
        // The appended statement needs the binding, not an inlined value.
        if let Some(value) = package.direct_exports.shift_remove(target) {
            package.prepend_body(format!("var {target} = {value};"));
        }
        package.add_dependencies(deps.into_iter().filter(|d| d != target));
        package.push_body(body);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decompose(source: &str) -> BuildSession {
        let config = BuildConfig::default();
        let mut session = BuildSession::new("Sugar", config.project.core_path.clone());
        Decomposer::new(&config).unwrap().decompose(&mut session, "string", source).unwrap();
        session
    }

    #[test]
    fn test_single_variable_direct_export() {
        let session = decompose("var HALF_WIDTH_ZERO = 0x30;\nvar padding;\n");
        let constant = session.resolve("HALF_WIDTH_ZERO").unwrap();
        assert_eq!(constant.kind, PackageKind::Constants);
        assert_eq!(constant.path, "string/constants/HALF_WIDTH_ZERO");
        assert_eq!(constant.direct_exports.get("HALF_WIDTH_ZERO").map(String::as_str), Some("0x30"));
        assert!(constant.body.is_empty());

        let var = session.resolve("padding").unwrap();
        assert_eq!(var.kind, PackageKind::Vars);
        assert_eq!(var.body, vec!["var padding;"]);
    }

    #[test]
    fn test_multiline_initializer_keeps_declaration() {
        let session = decompose("var table = {\n  a: 1\n};\n");
        let table = session.resolve("table").unwrap();
        assert!(table.direct_exports.is_empty());
        assert_eq!(table.body, vec!["var table = {\n  a: 1\n};"]);
    }

    #[test]
    fn test_bundle_registers_aliases() {
        let session = decompose("// Html entities\nvar HTMLToEntityMap, HTMLFromEntityMap = {};\n");
        assert!(session.is_alias("HTMLToEntityMap"));
        let bundle = session.resolve("HTMLFromEntityMap").unwrap();
        assert_eq!(bundle.name, "HtmlEntities");
        assert_eq!(bundle.exports.names(), vec!["HTMLToEntityMap", "HTMLFromEntityMap"]);
        assert_eq!(bundle.body, vec!["var HTMLToEntityMap;"]);
    }

    #[test]
    fn test_method_block() {
        let source = "/*** @namespace String ***/\ndefineInstance(sugarString, {\n\n  'pad': function(str, n) {\n    return padString(str, n);\n  }\n\n}, [FLAG]);\n";
        let session = decompose(source);
        let pad = session.method("string|String|pad").unwrap();
        assert_eq!(pad.path, "string/pad");
        assert_eq!(pad.exports, Exports::Single("Sugar.String.pad".to_string()));
        let deps: Vec<&str> = pad.dependencies.iter().map(String::as_str).collect();
        assert_eq!(deps, vec!["Sugar", "padString", "FLAG"]);
        assert_eq!(
            pad.body_text(),
            "Sugar.String.defineInstance({\n\n  'pad': function(str, n) {\n    return padString(str, n);\n  }\n\n}, [FLAG]);"
        );
    }

    #[test]
    fn test_polyfill_path() {
        let session = decompose("/* @namespace String */\ndefineInstancePolyfill(sugarString, { 'trim': function() { return trim(this); } });\n");
        let trim = session.method("string|String|trim").unwrap();
        assert_eq!(trim.kind, PackageKind::Polyfill);
        assert_eq!(trim.path, "polyfills/string/trim");
    }

    #[test]
    fn test_alias_requires_source_method() {
        let session = decompose("/* @namespace Array */\nalias(sugarArray, 'all', 'every');\n");
        let all = session.method("string|Array|all").unwrap();
        assert!(all.requires.contains("string|Array|every"));
        assert!(all.dependencies.contains("alias"));
        assert_eq!(all.body_text(), "alias(sugarArray, 'all', 'every');");
    }

    #[test]
    fn test_member_assignment_materializes_direct_export() {
        let session = decompose("var Inflector = {};\nInflector.acronyms = createMap();\n");
        let inflector = session.resolve("Inflector").unwrap();
        assert!(inflector.direct_exports.is_empty());
        assert_eq!(inflector.body, vec!["var Inflector = {};", "Inflector.acronyms = createMap();"]);
        assert!(inflector.dependencies.contains("createMap"));
    }

    #[test]
    fn test_method_without_namespace_is_rejected() {
        let config = BuildConfig::default();
        let mut session = BuildSession::new("Sugar", "core");
        let err = Decomposer::new(&config)
            .unwrap()
            .decompose(&mut session, "string", "defineInstance(sugarString, { 'a': 1 });")
            .unwrap_err();
        assert!(matches!(err, BuildError::MissingNamespace { line: 1, .. }));
    }

    #[test]
    fn test_unknown_statement_is_rejected() {
        let config = BuildConfig::default();
        let mut session = BuildSession::new("Sugar", "core");
        let err = Decomposer::new(&config)
            .unwrap()
            .decompose(&mut session, "string", "var a;\nwhile (a) {}\n")
            .unwrap_err();
        assert!(matches!(err, BuildError::UnsupportedStatement { ref statement, .. } if statement == "while statement"));
    }
}
