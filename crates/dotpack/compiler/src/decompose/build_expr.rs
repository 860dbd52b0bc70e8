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

//! Build-expression resolution
//!
//! A top-level call to a function declared earlier in the module is a build
//! expression. Top-level reassignments inside the function of names it
//! depends on are the names it produces:
//!
//! * none: the call initialises the function's own package, which exports
//!   nothing and is required by the methods it defines;
//! * one: the function merges into the package of the produced name;
//! * several: every produced name must belong to the same bundle, which
//!   receives the function.
//!
//! Methods the function defines become packages that require whichever
//! package ended up holding the call.

use super::ModuleContext;
use super::classify::BuildBodyShape;
use crate::error::{BuildError, BuildResult};
use crate::package::{Exports, Package, PackageId, PackageKind, Record, method_key};
use crate::parser::ast::*;
use indexmap::IndexSet;
use tracing::debug;

pub(super) fn resolve(ctx: &mut ModuleContext<'_, '_>, stmt: &Stmt, callee: &str) -> BuildResult<()> {
    let Some(function) = ctx.functions.get(callee).cloned() else {
        return Err(match ctx.session.resolve(callee) {
            Some(_) => inconsistent(callee, "build functions must be declared in the module that calls them"),
            None => BuildError::missing(ctx.module, callee),
        });
    };
    let function_id = PackageId::TopLevel(callee.to_string());
    let Some(function_deps) = ctx.session.package(&function_id).map(|p| p.dependencies.clone()) else {
        return Err(inconsistent(callee, "build function was already merged by an earlier call"));
    };

    let produced = produced_names(&function, &function_deps);
    let remaining: IndexSet<String> = function_deps.into_iter().filter(|d| !produced.contains(d)).collect();
    let call = ctx.node_body(stmt.span).to_string();

    let main_id = match produced.as_slice() {
        [] => {
            let Some(package) = ctx.session.package_mut(&function_id) else {
                return Err(BuildError::missing(ctx.module, callee));
            };
            package.dependencies = remaining;
            package.push_init(call);
            package.exports = Exports::None;
            function_id
        }
        [single] => {
            let target = ctx.session.lookup(single).ok_or_else(|| BuildError::missing(callee, single.as_str()))?;
            merge_function(ctx, callee, &target, remaining, call)?;
            target
        }
        [first, rest @ ..] => {
            let bundle = match ctx.session.record(first) {
                Some(Record::Alias { target, .. }) => target.clone(),
                _ => return Err(inconsistent(callee, &format!("produces {} names but '{first}' is not part of a bundle", produced.len()))),
            };
            for name in rest {
                match ctx.session.record(name) {
                    Some(Record::Alias { target, .. }) if *target == bundle => {}
                    _ => return Err(inconsistent(callee, &format!("'{name}' is not part of bundle '{bundle}'"))),
                }
            }
            let target = PackageId::TopLevel(bundle);
            merge_function(ctx, callee, &target, remaining, call)?;
            target
        }
    };

    debug!(module = ctx.module, function = callee, into = %main_id, produced = produced.len(), "resolved build expression");

    let is_aggregate = callee.starts_with(&ctx.decomposer.config.build_rules.hash_build_prefix);
    define_built_methods(ctx, &function, &main_id, is_aggregate)?;

    if is_aggregate {
        let consumer = ctx.decomposer.config.build_rules.hash_build_consumer.clone();
        ctx.session.defer_require(consumer, main_id.key());
    }
    Ok(())
}

fn inconsistent(function: &str, reason: &str) -> BuildError {
    BuildError::InconsistentBuildExpression {
        function: function.to_string(),
        reason: reason.to_string(),
    }
}

/// Names the function reassigns at its top level that it also depends on
fn produced_names(function: &Function, deps: &IndexSet<String>) -> Vec<String> {
    let mut produced: Vec<String> = Vec::new();
    for stmt in &function.body {
        let StmtKind::Expression(Expr { kind: ExprKind::Assign { left, .. }, .. }) = &stmt.kind else {
            continue;
        };
        if let Some(name) = left.as_ident() {
            if deps.contains(name) && !produced.iter().any(|p| p == name) {
                produced.push(name.to_string());
            }
        }
    }
    produced
}

/// Move the function package into `target` and run the call there
fn merge_function(ctx: &mut ModuleContext<'_, '_>, callee: &str, target: &PackageId, remaining: IndexSet<String>, call: String) -> BuildResult<()> {
    // Dependencies on the receiving package itself would become self-imports.
    let deps: Vec<String> = remaining
        .into_iter()
        .filter(|d| ctx.session.lookup(d).as_ref() != Some(target))
        .collect();

    let function = match ctx.session.remove_top_level(callee) {
        Some(Record::Package(package)) => package,
        _ => return Err(BuildError::missing(ctx.module, callee)),
    };
    let Some(package) = ctx.session.package_mut(target) else {
        return Err(BuildError::missing(callee, target.key()));
    };

    // The function reassigns the produced bindings, so they must be declared.
    package.materialize_direct_exports();
    package.add_dependencies(deps);
    for required in function.requires {
        package.add_require(required);
    }
    for fragment in function.body {
        package.push_body(fragment);
    }
    package.push_init(call);
    Ok(())
}

/// Register methods defined inside the build function
fn define_built_methods(ctx: &mut ModuleContext<'_, '_>, function: &Function, main_id: &PackageId, is_aggregate: bool) -> BuildResult<()> {
    let main_key = main_id.key().to_string();
    let method_list_var = ctx.decomposer.config.build_rules.method_list_var.clone();

    for stmt in &function.body {
        let line = stmt.span.start.line;
        let shape = ctx.decomposer.patterns.classify_build_body(stmt, &method_list_var).map_err(|statement| BuildError::UnsupportedStatement {
            module: ctx.module.to_string(),
            statement,
            position: stmt.span.start,
        })?;

        match shape {
            BuildBodyShape::MethodList(elements) if is_aggregate => {
                for element in elements.iter().flatten() {
                    let Some(name) = element.as_str() else {
                        return Err(inconsistent(&main_key, "method list entries must be string literals"));
                    };
                    let key = ctx.method_key_at(element.span.start.line, name)?;
                    require_from(ctx, main_id, key)?;
                }
            }
            BuildBodyShape::MethodBlock(call) => {
                for prop in call.methods {
                    add_built_method(ctx, prop.key.name(), prop.span.start.line, &main_key)?;
                }
            }
            BuildBodyShape::SimilarBlock { names } => {
                let names: Vec<String> = match names.as_str() {
                    Some(list) if !list.is_empty() => list.split(',').map(str::to_string).collect(),
                    _ => ctx.binder.method_names_from_comment(line),
                };
                if names.is_empty() {
                    return Err(inconsistent(&main_key, &format!("method names of the similar block at line {line} are neither literal nor documented")));
                }
                for name in &names {
                    add_built_method(ctx, name, line, &main_key)?;
                }
            }
            BuildBodyShape::Alias(call) => {
                add_built_method(ctx, call.name, line, &main_key)?;
                let key = ctx.method_key_at(line, call.source)?;
                require_from(ctx, main_id, key)?;
            }
            BuildBodyShape::MethodList(_) | BuildBodyShape::Other => {}
        }
    }
    Ok(())
}

fn require_from(ctx: &mut ModuleContext<'_, '_>, main_id: &PackageId, key: String) -> BuildResult<()> {
    let package = ctx.session.package_mut(main_id).ok_or_else(|| BuildError::missing(key.clone(), main_id.key()))?;
    package.add_require(key);
    Ok(())
}

/// A method whose definition runs inside the build function: the package
/// only requires the function's holder and exports the method
fn add_built_method(ctx: &mut ModuleContext<'_, '_>, name: &str, line: usize, main_key: &str) -> BuildResult<()> {
    let namespace = ctx.namespace_at(line)?;
    let mut package: Package = ctx.method_package(name, &namespace, PackageKind::Method);
    package.add_require(main_key);
    ctx.session.insert_method(method_key(ctx.module, &namespace, name), package);
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::config::BuildConfig;
    use crate::decompose::Decomposer;
    use crate::error::BuildError;
    use crate::package::{BuildSession, Exports, PackageKind};

    fn decompose(source: &str) -> Result<BuildSession, BuildError> {
        let config = BuildConfig::default();
        let mut session = BuildSession::new("Sugar", config.project.core_path.clone());
        Decomposer::new(&config)?.decompose(&mut session, "date", source)?;
        Ok(session)
    }

    #[test]
    fn test_zero_produced_names_keeps_function() {
        let source = "/* @namespace Date */\nfunction buildDateMethods() {\n  defineInstance(sugarDate, { 'isToday': function() {} });\n}\nbuildDateMethods();\n";
        let session = decompose(source).unwrap();

        let build = session.resolve("buildDateMethods").unwrap();
        assert_eq!(build.exports, Exports::None);
        assert_eq!(build.init, vec!["buildDateMethods();"]);

        let method = session.method("date|Date|isToday").unwrap();
        assert!(method.requires.contains("buildDateMethods"));
        assert_eq!(method.exports, Exports::Single("Sugar.Date.isToday".to_string()));
        assert!(method.body.is_empty());
    }

    #[test]
    fn test_single_produced_name_merges() {
        let source = "var DateUnits;\nfunction buildDateUnits() {\n  DateUnits = createUnits(DAY);\n}\nbuildDateUnits();\n";
        let session = decompose(source).unwrap();

        assert!(session.record("buildDateUnits").is_none());
        let units = session.resolve("DateUnits").unwrap();
        assert_eq!(units.kind, PackageKind::Constants);
        assert_eq!(units.init, vec!["buildDateUnits();"]);
        assert_eq!(units.body.len(), 2);
        let deps: Vec<&str> = units.dependencies.iter().map(String::as_str).collect();
        assert_eq!(deps, vec!["createUnits", "DAY"]);
    }

    #[test]
    fn test_single_produced_alias_merges_into_bundle() {
        let source = "var A = 1, B;\nfunction buildB() {\n  B = A + 1;\n}\nbuildB();\n";
        let session = decompose(source).unwrap();

        let bundle = session.resolve("B").unwrap();
        assert_eq!(bundle.name, "AB");
        assert!(bundle.dependencies.is_empty());
        assert_eq!(bundle.body[0], "var A = 1;");
        assert!(bundle.direct_exports.is_empty());
    }

    #[test]
    fn test_multiple_produced_names_need_one_bundle() {
        let source = "var a;\nvar b;\nfunction build() {\n  a = 1;\n  b = 2;\n}\nbuild();\n";
        let err = decompose(source).unwrap_err();
        assert!(matches!(err, BuildError::InconsistentBuildExpression { ref function, .. } if function == "build"));
    }

    #[test]
    fn test_similar_block_names_from_comment() {
        let source = "/* @namespace String */\nfunction buildCase() {\n  /***\n   * @set\n   *   camelize\n   *   dasherize\n   ***/\n  defineInstanceSimilar(sugarString, names, fn);\n}\nbuildCase();\n";
        let session = decompose(source).unwrap();
        assert!(session.method("date|String|camelize").is_some());
        assert!(session.method("date|String|dasherize").is_some());
    }

    #[test]
    fn test_aggregate_builder_requires_listed_methods() {
        let source = "/* @namespace Object */\nvar Hash;\nfunction buildHashMethods() {\n  var methods = ['keys', 'values'];\n  Hash = createHash(methods);\n}\nbuildHashMethods();\n";
        let mut session = decompose(source).unwrap();
        let hash = session.resolve("Hash").unwrap();
        assert!(hash.requires.contains("date|Object|keys"));
        assert!(hash.requires.contains("date|Object|values"));
        assert!(matches!(session.link_pending(), Err(BuildError::MissingDependency { .. })));
    }

    #[test]
    fn test_unknown_build_function() {
        let err = decompose("run();\n").unwrap_err();
        assert!(matches!(err, BuildError::MissingDependency { ref name, .. } if name == "run"));
    }
}
