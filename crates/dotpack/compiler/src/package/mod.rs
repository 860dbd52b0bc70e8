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

//! Package records
//!
//! A [`Package`] becomes one emitted file. `dependencies` are imported under
//! a local name; `requires` are imported for side effects only. The two sets
//! are kept disjoint by the mutators below.

pub mod session;

pub use session::{BuildSession, PackageId};

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;

/// Separator between body or init fragments
pub const BLOCK_DELIMITER: &str = "\n\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PackageKind {
    /// The library's root handle
    Core,
    Constants,
    Vars,
    Internal,
    Method,
    Polyfill,
    /// A method created by an alias call
    Alias,
    EntryPoint,
    Locale,
}

impl PackageKind {
    /// Kind of a top-level variable: capitalised names are constants
    pub fn for_var_name(name: &str) -> Self {
        if name.starts_with(|c: char| c.is_ascii_uppercase()) { PackageKind::Constants } else { PackageKind::Vars }
    }

    /// Directory segment of plain declarations
    pub fn dir_name(&self) -> &'static str {
        match self {
            PackageKind::Constants => "constants",
            PackageKind::Vars => "vars",
            PackageKind::Internal => "internal",
            PackageKind::Core => "core",
            PackageKind::Method | PackageKind::Alias => "methods",
            PackageKind::Polyfill => "polyfills",
            PackageKind::EntryPoint => "index",
            PackageKind::Locale => "locales",
        }
    }

    /// Value declarations bundle before functions
    pub fn is_value(&self) -> bool {
        matches!(self, PackageKind::Constants | PackageKind::Vars)
    }
}

/// What a package exports
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Exports {
    None,
    Single(String),
    Keyed(IndexSet<String>),
    /// Re-export the root handle
    Core,
}

impl Exports {
    /// Exported binding names
    pub fn names(&self) -> Vec<&str> {
        match self {
            Exports::Single(name) => vec![name.as_str()],
            Exports::Keyed(names) => names.iter().map(String::as_str).collect(),
            Exports::None | Exports::Core => Vec::new(),
        }
    }

    /// Add a binding to the export set, widening a single export to keyed
    pub fn push(&mut self, name: impl Into<String>) {
        let name = name.into();
        *self = match std::mem::replace(self, Exports::None) {
            Exports::None | Exports::Core => Exports::Single(name),
            Exports::Single(first) if first == name => Exports::Single(first),
            Exports::Single(first) => Exports::Keyed(IndexSet::from([first, name])),
            Exports::Keyed(mut names) => {
                names.insert(name);
                Exports::Keyed(names)
            }
        };
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Package {
    pub name: String,
    pub module: String,
    pub kind: PackageKind,
    /// Output path without extension, relative to a distribution root
    pub path: String,
    pub dependencies: IndexSet<String>,
    pub requires: IndexSet<String>,
    pub body: Vec<String>,
    pub init: Vec<String>,
    pub exports: Exports,
    /// One-line initialisers exported in place of a declaration
    pub direct_exports: IndexMap<String, String>,
}

impl Package {
    pub fn new(name: impl Into<String>, module: impl Into<String>, kind: PackageKind, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            module: module.into(),
            kind,
            path: path.into(),
            dependencies: IndexSet::new(),
            requires: IndexSet::new(),
            body: Vec::new(),
            init: Vec::new(),
            exports: Exports::None,
            direct_exports: IndexMap::new(),
        }
    }

    pub fn add_dependency(&mut self, name: impl Into<String>) {
        let name = name.into();
        self.requires.shift_remove(&name);
        self.dependencies.insert(name);
    }

    pub fn add_dependencies<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            self.add_dependency(name);
        }
    }

    /// Add a side-effect import unless the name is already a dependency
    pub fn add_require(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !self.dependencies.contains(&name) {
            self.requires.insert(name);
        }
    }

    pub fn push_body(&mut self, fragment: impl Into<String>) {
        push_fragment(&mut self.body, fragment.into(), false);
    }

    pub fn prepend_body(&mut self, fragment: impl Into<String>) {
        push_fragment(&mut self.body, fragment.into(), true);
    }

    pub fn push_init(&mut self, fragment: impl Into<String>) {
        push_fragment(&mut self.init, fragment.into(), false);
    }

    pub fn prepend_init(&mut self, fragment: impl Into<String>) {
        push_fragment(&mut self.init, fragment.into(), true);
    }

    /// Turn direct exports into declarations at the top of the body. Used
    /// whenever later statements need the binding itself.
    pub fn materialize_direct_exports(&mut self) {
        let declarations = self.take_direct_declarations();
        if !declarations.is_empty() {
            self.prepend_body(declarations);
        }
    }

    /// Remove the direct exports, rendered as `var name = value;` lines
    pub fn take_direct_declarations(&mut self) -> String {
        std::mem::take(&mut self.direct_exports)
            .into_iter()
            .map(|(name, value)| format!("var {name} = {value};"))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn body_text(&self) -> String {
        self.body.join(BLOCK_DELIMITER)
    }

    pub fn init_text(&self) -> String {
        self.init.join(BLOCK_DELIMITER)
    }

    /// Whether the package is written to disk
    pub fn is_emitted(&self) -> bool {
        self.kind != PackageKind::Core
    }
}

fn push_fragment(list: &mut Vec<String>, fragment: String, front: bool) {
    if fragment.is_empty() {
        return;
    }
    if front {
        list.insert(0, fragment);
    } else {
        list.push(fragment);
    }
}

/// Entry of the plain-declaration registry
#[derive(Debug, Clone)]
pub enum Record {
    Package(Package),
    /// A name declared inside a bundle, forwarding to the bundle
    Alias { name: String, target: String },
}

impl Record {
    pub fn as_package(&self) -> Option<&Package> {
        match self {
            Record::Package(package) => Some(package),
            Record::Alias { .. } => None,
        }
    }

    pub fn is_alias(&self) -> bool {
        matches!(self, Record::Alias { .. })
    }
}

/// Method registry key: `module|namespace|name`
pub fn method_key(module: &str, namespace: &str, name: &str) -> String {
    format!("{module}|{namespace}|{name}")
}

/// Local binding name of a dependency, with any method-key prefix removed
pub fn binding_name(name: &str) -> &str {
    name.rsplit('|').next().unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dependencies_and_requires_stay_disjoint() {
        let mut package = Package::new("trim", "string", PackageKind::Method, "string/trim");
        package.add_require("a");
        package.add_dependency("a");
        assert!(package.dependencies.contains("a"));
        assert!(!package.requires.contains("a"));

        package.add_require("a");
        assert!(package.requires.is_empty());
    }

    #[test]
    fn test_exports_push_widens() {
        let mut exports = Exports::None;
        exports.push("A");
        assert_eq!(exports, Exports::Single("A".to_string()));
        exports.push("B");
        assert_eq!(exports.names(), vec!["A", "B"]);
    }

    #[test]
    fn test_materialize_direct_exports() {
        let mut package = Package::new("A", "common", PackageKind::Constants, "common/constants/A");
        package.direct_exports.insert("A".to_string(), "1".to_string());
        package.push_body("A.x = 2;");
        package.materialize_direct_exports();
        assert!(package.direct_exports.is_empty());
        assert_eq!(package.body_text(), "var A = 1;\n\nA.x = 2;");
    }

    #[test]
    fn test_binding_name() {
        assert_eq!(binding_name("date|Date|addLocale"), "addLocale");
        assert_eq!(binding_name("isString"), "isString");
        assert_eq!(method_key("string", "String", "pad"), "string|String|pad");
    }
}
