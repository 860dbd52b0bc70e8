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

//! Bundle optimizer
//!
//! A dependency that only one plain declaration uses is folded into that
//! declaration. Passes repeat until one performs no merge; the graph is then
//! checked for unresolved names and import cycles.

pub mod cycles;

pub use cycles::{EdgeKind, GraphBuilder, PackageGraph, detect_cycles, package_graph};

use crate::error::{BuildError, BuildResult};
use crate::package::{BuildSession, PackageId, PackageKind, Record};
use serde::Serialize;
use tracing::{debug, info};

/// Outcome of a converged optimization
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OptimizationReport {
    /// Passes run, including the final pass without merges
    pub passes: usize,
    pub merges: usize,
}

#[derive(Debug, Clone)]
pub struct BundleOptimizer {
    max_passes: usize,
}

impl BundleOptimizer {
    pub fn new(max_passes: usize) -> Self {
        Self { max_passes }
    }

    /// Merge exclusively used dependencies until a fixed point, then validate
    /// the resulting graph
    pub fn optimize(&self, session: &mut BuildSession) -> BuildResult<OptimizationReport> {
        let mut report = OptimizationReport::default();
        loop {
            if report.passes == self.max_passes {
                return Err(BuildError::OptimizerDidNotConverge { passes: report.passes });
            }
            let merges = self.run_pass(session)?;
            report.passes += 1;
            report.merges += merges;
            debug!(pass = report.passes, merges, "optimizer pass");
            if merges == 0 {
                break;
            }
        }

        validate_references(session)?;
        detect_cycles(session)?;
        info!(passes = report.passes, merges = report.merges, "optimized package graph");
        Ok(report)
    }

    /// One pass over the plain declarations. Returns the number of merges.
    pub fn run_pass(&self, session: &mut BuildSession) -> BuildResult<usize> {
        let mut merges = 0;
        for name in session.top_level_names() {
            let Some(Record::Package(target)) = session.record(&name) else {
                continue;
            };
            if target.dependencies.is_empty() {
                continue;
            }
            let target_id = PackageId::TopLevel(name.clone());

            let mut bundlable = Vec::new();
            for dep in &target.dependencies {
                if let Some(kind) = bundlable_kind(session, &target_id, dep)? {
                    bundlable.push((kind, dep.clone()));
                }
            }
            // Values first; the sort is stable so source order is kept otherwise.
            bundlable.sort_by_key(|(kind, _)| !kind.is_value());

            for (_, dep) in bundlable {
                merge_into(session, &name, &dep)?;
                merges += 1;
            }
        }
        Ok(merges)
    }
}

impl Default for BundleOptimizer {
    fn default() -> Self {
        Self::new(16)
    }
}

/// Kind of `dep` when it may be folded into `target`
fn bundlable_kind(session: &BuildSession, target: &PackageId, dep: &str) -> BuildResult<Option<PackageKind>> {
    let package = match session.record(dep) {
        Some(Record::Package(package)) => package,
        Some(Record::Alias { .. }) => return Ok(None),
        None if session.method(dep).is_some() => return Ok(None),
        None => return Err(BuildError::missing(target.key(), dep)),
    };
    if package.kind == PackageKind::Core || dep == target.key() {
        return Ok(None);
    }

    let mut names = aliases_of(session, dep);
    names.push(dep.to_string());
    if names.iter().any(|name| session.is_used_elsewhere(name, target)) {
        return Ok(None);
    }
    Ok(Some(package.kind))
}

/// Alias names pointing at a bundle
fn aliases_of(session: &BuildSession, bundle: &str) -> Vec<String> {
    session
        .top_level()
        .filter_map(|(name, record)| match record {
            Record::Alias { target, .. } if target == bundle => Some(name.clone()),
            _ => None,
        })
        .collect()
}

/// Fold the package `dep` into `target` and delete it
fn merge_into(session: &mut BuildSession, target: &str, dep: &str) -> BuildResult<()> {
    let mut merged = match session.remove_top_level(dep) {
        Some(Record::Package(package)) => package,
        _ => return Err(BuildError::missing(target, dep)),
    };
    let aliases = aliases_of(session, dep);
    for alias in &aliases {
        session.remove_top_level(alias);
    }

    let target_id = PackageId::TopLevel(target.to_string());
    let dependencies: Vec<String> = merged
        .dependencies
        .iter()
        .filter(|d| d.as_str() != target && session.lookup(d).as_ref() != Some(&target_id))
        .cloned()
        .collect();
    let declarations = merged.take_direct_declarations();

    let Some(package) = session.package_mut(&target_id) else {
        return Err(BuildError::missing(dep, target));
    };
    package.dependencies.shift_remove(dep);
    for alias in &aliases {
        package.dependencies.shift_remove(alias);
    }
    package.add_dependencies(dependencies);
    for required in merged.requires {
        if required != target {
            package.add_require(required);
        }
    }

    package.prepend_body(declarations);
    for fragment in merged.body.into_iter().rev() {
        package.prepend_body(fragment);
    }
    for fragment in merged.init.into_iter().rev() {
        package.prepend_init(fragment);
    }

    debug!(target, merged = dep, "bundled dependency");
    Ok(())
}

/// Every dependency and require must name a live package
fn validate_references(session: &BuildSession) -> BuildResult<()> {
    for (id, package) in session.live_packages() {
        for name in package.dependencies.iter().chain(&package.requires) {
            if session.lookup(name).is_none() {
                return Err(BuildError::missing(id.key(), name.as_str()));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::{Exports, Package};

    fn package(name: &str, kind: PackageKind, deps: &[&str]) -> Package {
        let mut package = Package::new(name, "test", kind, format!("test/{}/{name}", kind.dir_name()));
        package.add_dependencies(deps.iter().copied());
        package.exports = Exports::Single(name.to_string());
        package
    }

    #[test]
    fn test_exclusive_dependency_is_folded() {
        let mut session = BuildSession::new("Sugar", "core");
        let mut q = package("q", PackageKind::Internal, &["Sugar"]);
        q.push_body("function q() {}");
        q.push_init("q();");
        let mut p = package("p", PackageKind::Internal, &["q"]);
        p.push_body("function p() { q(); }");
        session.insert_top_level(q);
        session.insert_top_level(p);

        let report = BundleOptimizer::default().optimize(&mut session).unwrap();
        assert_eq!(report.merges, 1);
        assert!(session.record("q").is_none());

        let p = session.resolve("p").unwrap();
        assert_eq!(p.body, vec!["function q() {}", "function p() { q(); }"]);
        assert_eq!(p.init, vec!["q();"]);
        assert!(!p.dependencies.contains("q"));
        assert!(p.dependencies.contains("Sugar"));
    }

    #[test]
    fn test_shared_dependency_stays() {
        let mut session = BuildSession::new("Sugar", "core");
        session.insert_top_level(package("shared", PackageKind::Internal, &[]));
        session.insert_top_level(package("a", PackageKind::Internal, &["shared"]));
        let mut method = package("each", PackageKind::Method, &[]);
        method.add_require("shared");
        session.insert_method("test|Array|each", method);

        let report = BundleOptimizer::default().optimize(&mut session).unwrap();
        assert_eq!(report.merges, 0);
        assert_eq!(report.passes, 1);
        assert!(session.resolve("shared").is_some());
    }

    #[test]
    fn test_direct_exports_become_declarations() {
        let mut session = BuildSession::new("Sugar", "core");
        let mut limit = package("LIMIT", PackageKind::Constants, &[]);
        limit.direct_exports.insert("LIMIT".to_string(), "10".to_string());
        let mut helper = package("helper", PackageKind::Internal, &[]);
        helper.push_body("function helper() {}");
        session.insert_top_level(limit);
        session.insert_top_level(helper);
        let mut user = package("user", PackageKind::Internal, &["helper", "LIMIT"]);
        user.push_body("function user() {}");
        session.insert_top_level(user);

        BundleOptimizer::default().optimize(&mut session).unwrap();
        let user = session.resolve("user").unwrap();
        // Values merge first, so the function lands above the constant.
        assert_eq!(user.body, vec!["function helper() {}", "var LIMIT = 10;", "function user() {}"]);
        assert!(user.dependencies.is_empty());
    }

    #[test]
    fn test_chains_fold_in_later_passes() {
        let mut session = BuildSession::new("Sugar", "core");
        session.insert_top_level(package("c", PackageKind::Internal, &[]));
        session.insert_top_level(package("b", PackageKind::Internal, &["c"]));
        session.insert_top_level(package("a", PackageKind::Internal, &["b"]));

        let report = BundleOptimizer::default().optimize(&mut session).unwrap();
        assert_eq!(report.merges, 2);
        assert!(session.resolve("a").is_some());
        assert!(session.resolve("b").is_none());
        assert!(session.resolve("c").is_none());

        let again = BundleOptimizer::default().optimize(&mut session).unwrap();
        assert_eq!(again.merges, 0);
    }

    #[test]
    fn test_aliases_and_core_are_never_bundled() {
        let mut session = BuildSession::new("Sugar", "core");
        session.insert_top_level(package("Units", PackageKind::Constants, &[]));
        session.insert_alias("DAY", "Units");
        session.insert_top_level(package("format", PackageKind::Internal, &["DAY", "Sugar"]));

        let report = BundleOptimizer::default().optimize(&mut session).unwrap();
        assert_eq!(report.merges, 0);
        assert!(session.resolve("Units").is_some());
    }

    #[test]
    fn test_unresolved_dependency_fails() {
        let mut session = BuildSession::new("Sugar", "core");
        session.insert_top_level(package("a", PackageKind::Internal, &["nowhere"]));
        let err = BundleOptimizer::default().optimize(&mut session).unwrap_err();
        assert!(matches!(err, BuildError::MissingDependency { ref package, ref name } if package == "a" && name == "nowhere"));
    }

    #[test]
    fn test_pass_cap() {
        let mut session = BuildSession::new("Sugar", "core");
        session.insert_top_level(package("b", PackageKind::Internal, &[]));
        session.insert_top_level(package("a", PackageKind::Internal, &["b"]));
        let err = BundleOptimizer::new(1).optimize(&mut session).unwrap_err();
        assert!(matches!(err, BuildError::OptimizerDidNotConverge { passes: 1 }));
    }
}
