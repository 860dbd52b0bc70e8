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

//! Build session owning both package registries

use super::{Package, PackageKind, Record};
use crate::error::{BuildError, BuildResult};
use indexmap::IndexMap;
use std::fmt;

/// Location of a live package in one of the two registries
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PackageId {
    TopLevel(String),
    Method(String),
}

impl PackageId {
    pub fn key(&self) -> &str {
        match self {
            PackageId::TopLevel(key) | PackageId::Method(key) => key,
        }
    }
}

impl fmt::Display for PackageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Mutable state shared by decomposition, build-expression resolution and
/// bundling. Plain declarations are keyed by name, methods by method key.
#[derive(Debug, Clone)]
pub struct BuildSession {
    top_level: IndexMap<String, Record>,
    methods: IndexMap<String, Package>,
    root_handle: String,
    /// `(consumer, required)` pairs linked once every module is decomposed
    pending_requires: Vec<(String, String)>,
}

impl BuildSession {
    /// Create a session whose only package is the root handle
    pub fn new(root_handle: impl Into<String>, core_path: impl Into<String>) -> Self {
        let root_handle = root_handle.into();
        let mut core = Package::new(root_handle.clone(), "", PackageKind::Core, core_path);
        core.exports = super::Exports::Core;

        let mut top_level = IndexMap::new();
        top_level.insert(root_handle.clone(), Record::Package(core));

        Self {
            top_level,
            methods: IndexMap::new(),
            root_handle,
            pending_requires: Vec::new(),
        }
    }

    pub fn root_handle(&self) -> &str {
        &self.root_handle
    }

    pub fn insert_top_level(&mut self, package: Package) {
        self.top_level.insert(package.name.clone(), Record::Package(package));
    }

    pub fn insert_alias(&mut self, name: impl Into<String>, target: impl Into<String>) {
        let name = name.into();
        self.top_level.insert(name.clone(), Record::Alias { name, target: target.into() });
    }

    pub fn insert_method(&mut self, key: impl Into<String>, package: Package) {
        self.methods.insert(key.into(), package);
    }

    pub fn record(&self, name: &str) -> Option<&Record> {
        self.top_level.get(name)
    }

    pub fn is_alias(&self, name: &str) -> bool {
        self.top_level.get(name).is_some_and(Record::is_alias)
    }

    /// Find the live package a name refers to, following at most one alias
    pub fn lookup(&self, name: &str) -> Option<PackageId> {
        match self.top_level.get(name) {
            Some(Record::Package(_)) => Some(PackageId::TopLevel(name.to_string())),
            Some(Record::Alias { target, .. }) => match self.top_level.get(target) {
                Some(Record::Package(_)) => Some(PackageId::TopLevel(target.clone())),
                _ => None,
            },
            None if self.methods.contains_key(name) => Some(PackageId::Method(name.to_string())),
            None => None,
        }
    }

    pub fn package(&self, id: &PackageId) -> Option<&Package> {
        match id {
            PackageId::TopLevel(key) => self.top_level.get(key).and_then(Record::as_package),
            PackageId::Method(key) => self.methods.get(key),
        }
    }

    pub fn package_mut(&mut self, id: &PackageId) -> Option<&mut Package> {
        match id {
            PackageId::TopLevel(key) => match self.top_level.get_mut(key) {
                Some(Record::Package(package)) => Some(package),
                _ => None,
            },
            PackageId::Method(key) => self.methods.get_mut(key),
        }
    }

    /// Package a name refers to, through one alias hop
    pub fn resolve(&self, name: &str) -> Option<&Package> {
        self.lookup(name).and_then(|id| self.package(&id))
    }

    pub fn resolve_mut(&mut self, name: &str) -> Option<&mut Package> {
        let id = self.lookup(name)?;
        self.package_mut(&id)
    }

    /// Remove a plain declaration, keeping the order of the others
    pub fn remove_top_level(&mut self, name: &str) -> Option<Record> {
        self.top_level.shift_remove(name)
    }

    pub fn top_level(&self) -> impl Iterator<Item = (&String, &Record)> {
        self.top_level.iter()
    }

    pub fn top_level_names(&self) -> Vec<String> {
        self.top_level.keys().cloned().collect()
    }

    pub fn method(&self, key: &str) -> Option<&Package> {
        self.methods.get(key)
    }

    pub fn method_mut(&mut self, key: &str) -> Option<&mut Package> {
        self.methods.get_mut(key)
    }

    pub fn methods(&self) -> impl Iterator<Item = (&String, &Package)> {
        self.methods.iter()
    }

    /// Every live package of both registries, plain declarations first
    pub fn live_packages(&self) -> impl Iterator<Item = (PackageId, &Package)> {
        let top = self
            .top_level
            .iter()
            .filter_map(|(key, record)| record.as_package().map(|p| (PackageId::TopLevel(key.clone()), p)));
        let methods = self.methods.iter().map(|(key, p)| (PackageId::Method(key.clone()), p));
        top.chain(methods)
    }

    /// Make `consumer` require `required` once all modules are decomposed.
    /// The consumer may be declared by a module analysed later.
    pub fn defer_require(&mut self, consumer: impl Into<String>, required: impl Into<String>) {
        self.pending_requires.push((consumer.into(), required.into()));
    }

    /// Apply deferred requires
    pub fn link_pending(&mut self) -> BuildResult<()> {
        for (consumer, required) in std::mem::take(&mut self.pending_requires) {
            let package = self.resolve_mut(&consumer).ok_or_else(|| BuildError::missing(required.clone(), consumer.clone()))?;
            package.add_require(required);
        }
        Ok(())
    }

    /// Whether any live package other than `except` lists `name` as a
    /// dependency or a require
    pub fn is_used_elsewhere(&self, name: &str, except: &PackageId) -> bool {
        self.live_packages()
            .any(|(id, package)| &id != except && (package.dependencies.contains(name) || package.requires.contains(name)))
    }
}
