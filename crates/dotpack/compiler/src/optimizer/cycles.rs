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

//! Package graph and cycle detection

use crate::error::{BuildError, BuildResult};
use crate::package::{BuildSession, PackageId};
use petgraph::Directed;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{Graph, NodeIndex};
use std::collections::{HashMap, HashSet};

/// Edge in the package graph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
    Dependency,
    Require,
}

pub type PackageGraph = Graph<PackageId, EdgeKind, Directed>;

/// Utility for building package graphs
pub struct GraphBuilder {
    graph: PackageGraph,
    indices: HashMap<PackageId, NodeIndex>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self {
            graph: PackageGraph::new(),
            indices: HashMap::new(),
        }
    }

    /// Add a node if not exists, returns its index
    pub fn add_node(&mut self, id: PackageId) -> NodeIndex {
        if let Some(&idx) = self.indices.get(&id) {
            return idx;
        }
        let idx = self.graph.add_node(id.clone());
        self.indices.insert(id, idx);
        idx
    }

    /// Add an edge between two packages, ignoring self edges
    pub fn add_edge(&mut self, from: &PackageId, to: &PackageId, kind: EdgeKind) {
        if from == to {
            return;
        }
        let u = self.add_node(from.clone());
        let v = self.add_node(to.clone());
        self.graph.update_edge(u, v, kind);
    }

    pub fn build(self) -> PackageGraph {
        self.graph
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Graph of every live package. Names are resolved through aliases, so a
/// bundle is a single node; unresolved names are left out.
///
/// Two packages requiring each other for side effects only form no edge:
/// a build function's holder and the methods its call defines load in
/// either order.
pub fn package_graph(session: &BuildSession) -> PackageGraph {
    let mut edges: Vec<(PackageId, PackageId, EdgeKind)> = Vec::new();
    for (id, package) in session.live_packages() {
        let named = package
            .dependencies
            .iter()
            .map(|name| (name, EdgeKind::Dependency))
            .chain(package.requires.iter().map(|name| (name, EdgeKind::Require)));
        for (name, kind) in named {
            if let Some(to) = session.lookup(name) {
                edges.push((id.clone(), to, kind));
            }
        }
    }

    let requires: HashSet<(&PackageId, &PackageId)> =
        edges.iter().filter(|(_, _, kind)| *kind == EdgeKind::Require).map(|(from, to, _)| (from, to)).collect();

    let mut builder = GraphBuilder::new();
    for (id, _) in session.live_packages() {
        builder.add_node(id);
    }
    for (from, to, kind) in &edges {
        if *kind == EdgeKind::Require && requires.contains(&(to, from)) {
            continue;
        }
        builder.add_edge(from, to, *kind);
    }
    builder.build()
}

/// Fail on any group of packages that import each other transitively
pub fn detect_cycles(session: &BuildSession) -> BuildResult<()> {
    let graph = package_graph(session);
    let mut cycles: Vec<Vec<String>> = tarjan_scc(&graph)
        .into_iter()
        .filter(|component| component.len() > 1)
        .map(|component| {
            let mut packages: Vec<String> = component.into_iter().map(|idx| graph[idx].key().to_string()).collect();
            packages.sort();
            packages
        })
        .collect();
    cycles.sort();

    match cycles.into_iter().next() {
        Some(packages) => Err(BuildError::CircularDependency { packages }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::{Package, PackageKind};

    fn package(name: &str, deps: &[&str]) -> Package {
        let mut package = Package::new(name, "test", PackageKind::Internal, format!("test/internal/{name}"));
        package.add_dependencies(deps.iter().copied());
        package
    }

    #[test]
    fn test_acyclic_graph_passes() {
        let mut session = BuildSession::new("Sugar", "core");
        session.insert_top_level(package("a", &["b", "Sugar"]));
        session.insert_top_level(package("b", &["Sugar"]));
        assert!(detect_cycles(&session).is_ok());

        let graph = package_graph(&session);
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 3);
    }

    #[test]
    fn test_mutual_requirement_is_reported() {
        let mut session = BuildSession::new("Sugar", "core");
        session.insert_top_level(package("a", &["b"]));
        let mut b = package("b", &[]);
        b.add_require("a");
        session.insert_top_level(b);

        let err = detect_cycles(&session).unwrap_err();
        assert!(matches!(err, BuildError::CircularDependency { ref packages } if packages == &["a", "b"]));
    }

    #[test]
    fn test_mutual_side_effect_requires_are_not_a_cycle() {
        let mut session = BuildSession::new("Sugar", "core");
        let mut holder = package("buildEnumerable", &[]);
        holder.add_require("array|Array|every");
        session.insert_top_level(holder);
        let mut every = Package::new("every", "array", PackageKind::Method, "array/every");
        every.add_require("buildEnumerable");
        session.insert_method("array|Array|every", every);

        assert!(detect_cycles(&session).is_ok());
        assert_eq!(package_graph(&session).edge_count(), 0);

        // A named import on either side is still a cycle.
        session.method_mut("array|Array|every").unwrap().add_dependency("buildEnumerable");
        assert!(matches!(detect_cycles(&session), Err(BuildError::CircularDependency { .. })));
    }

    #[test]
    fn test_bundle_members_collapse_to_one_node() {
        let mut session = BuildSession::new("Sugar", "core");
        let mut bundle = package("Units", &[]);
        bundle.push_body("var DAY, HOUR;");
        session.insert_top_level(bundle);
        session.insert_alias("DAY", "Units");
        session.insert_alias("HOUR", "Units");
        session.insert_top_level(package("format", &["DAY", "HOUR"]));
        // Self references through aliases are not edges.
        session.resolve_mut("Units").unwrap().add_dependency("HOUR");

        assert!(detect_cycles(&session).is_ok());
        assert_eq!(package_graph(&session).edge_count(), 1);
    }
}
