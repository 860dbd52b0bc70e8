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

//! CommonJS rendering of packages

use super::paths::require_path;
use crate::error::{BuildError, BuildResult};
use crate::package::{BLOCK_DELIMITER, BuildSession, Exports, Package, PackageKind, binding_name};
use regex::Regex;
use std::cmp::Reverse;

const USE_STRICT: &str = "\"use strict\";";
const TAB: &str = "  ";

/// Separator between declarators of one `var` statement
fn item_separator() -> String {
    format!(",\n{TAB}{TAB}")
}

/// Separator between groups of declarators
fn chunk_separator() -> String {
    format!(",\n\n{TAB}{TAB}")
}

/// `require('<path>')`, with a trailing semicolon when `stop` is set
pub fn require_statement(from: &str, to: &str, stop: bool) -> String {
    format!("require('{}'){}", require_path(from, to), if stop { ";" } else { "" })
}

/// A dependency resolved for import
struct Import<'s> {
    binding: String,
    package: &'s Package,
}

/// Renders packages against the packages of a session
pub struct PackageCompiler<'s> {
    session: &'s BuildSession,
    literal_constant: Regex,
}

impl<'s> PackageCompiler<'s> {
    pub fn new(session: &'s BuildSession) -> BuildResult<Self> {
        Ok(Self {
            session,
            literal_constant: Regex::new(r"^[A-Z_]+$")?,
        })
    }

    /// Render one package. The package does not need to be registered.
    pub fn compile(&self, package: &Package) -> BuildResult<String> {
        let blocks = [
            USE_STRICT.to_string(),
            self.named_requires(package)?,
            self.unnamed_requires(package)?,
            self.assigns(package)?,
            package.body_text(),
            package.init_text(),
            self.exports(package)?,
        ];
        Ok(blocks.into_iter().filter(|block| !block.is_empty()).collect::<Vec<_>>().join(BLOCK_DELIMITER))
    }

    fn dependency(&self, package: &Package, name: &str) -> BuildResult<&'s Package> {
        self.session.resolve(name).ok_or_else(|| BuildError::missing(package.name.as_str(), name))
    }

    /// Dependencies with bundle members replaced by their bundle, bundles
    /// after plain names
    fn grouped_dependencies(&self, package: &Package) -> BuildResult<Vec<Import<'s>>> {
        let mut plain = Vec::new();
        let mut bundles: Vec<Import<'s>> = Vec::new();
        for name in &package.dependencies {
            let dependency = self.dependency(package, name)?;
            if self.session.is_alias(name) {
                if !bundles.iter().any(|b| b.package.name == dependency.name) {
                    bundles.push(Import {
                        binding: dependency.name.clone(),
                        package: dependency,
                    });
                }
            } else {
                plain.push(Import {
                    binding: binding_name(name).to_string(),
                    package: dependency,
                });
            }
        }
        plain.extend(bundles);
        Ok(plain)
    }

    fn named_requires(&self, package: &Package) -> BuildResult<String> {
        if package.dependencies.is_empty() {
            return Ok(String::new());
        }
        let mut imports = self.grouped_dependencies(package)?;
        let crowded = [PackageKind::Constants, PackageKind::Vars, PackageKind::Internal]
            .into_iter()
            .filter(|kind| imports.iter().filter(|import| import.package.kind == *kind).count() > 1)
            .count();

        let inner = if crowded > 1 {
            self.chunked(package, imports)
        } else {
            imports.sort_by_key(|import| import.binding.len());
            self.declarators(package, &imports)
        };
        Ok(format!("var {inner};"))
    }

    /// Imports grouped by kind, used when more than one kind has several
    /// members
    fn chunked(&self, package: &Package, imports: Vec<Import<'s>>) -> String {
        let mut core = Vec::new();
        let mut constants = Vec::new();
        let mut vars = Vec::new();
        let mut internal = Vec::new();
        let mut others = Vec::new();
        for import in imports {
            match import.package.kind {
                PackageKind::Core => core.push(import),
                PackageKind::Constants => constants.push(import),
                PackageKind::Vars => vars.push(import),
                PackageKind::Internal => internal.push(import),
                _ => others.push(import),
            }
        }

        // Literal constant names first, then shortest first.
        constants.sort_by_key(|import| (Reverse(self.literal_constant.is_match(&import.binding)), import.binding.len()));
        for bucket in [&mut vars, &mut internal, &mut others] {
            bucket.sort_by_key(|import| import.binding.len());
        }

        [core, constants, vars, internal, others]
            .iter()
            .filter(|bucket| !bucket.is_empty())
            .map(|bucket| self.declarators(package, bucket))
            .collect::<Vec<_>>()
            .join(&chunk_separator())
    }

    fn declarators(&self, package: &Package, imports: &[Import<'_>]) -> String {
        imports
            .iter()
            .map(|import| format!("{} = {}", import.binding, require_statement(&package.path, &import.package.path, false)))
            .collect::<Vec<_>>()
            .join(&item_separator())
    }

    fn unnamed_requires(&self, package: &Package) -> BuildResult<String> {
        let mut names: Vec<&String> = package.requires.iter().collect();
        names.sort();
        let lines = names
            .into_iter()
            .map(|name| Ok(require_statement(&package.path, &self.dependency(package, name)?.path, true)))
            .collect::<BuildResult<Vec<_>>>()?;
        Ok(lines.join("\n"))
    }

    /// `var member = bundle.member` for every bundle member used by name
    fn assigns(&self, package: &Package) -> BuildResult<String> {
        let mut names: Vec<&String> = package.dependencies.iter().collect();
        names.sort_by_key(|name| name.len());

        let mut assigns = Vec::new();
        for name in names {
            let dependency = self.dependency(package, name)?;
            if let Exports::Keyed(exported) = &dependency.exports {
                if exported.len() > 1 && exported.contains(name.as_str()) {
                    assigns.push(format!("{} = {}.{}", binding_name(name), dependency.name, name));
                }
            }
        }
        if assigns.is_empty() {
            return Ok(String::new());
        }
        Ok(format!("var {};", assigns.join(&item_separator())))
    }

    fn exports(&self, package: &Package) -> BuildResult<String> {
        let expression = |name: &str| package.direct_exports.get(name).cloned().unwrap_or_else(|| name.to_string());
        let compiled = match &package.exports {
            Exports::None => return Ok(String::new()),
            Exports::Core => {
                let core = self.dependency(package, self.session.root_handle())?;
                require_statement(&package.path, &core.path, false)
            }
            Exports::Single(name) => expression(name),
            Exports::Keyed(names) if names.len() == 1 => expression(&names[0]),
            Exports::Keyed(names) => {
                let mut entries: Vec<String> = names.iter().map(|name| format!("{TAB}'{name}': {}", expression(name))).collect();
                entries.sort_by_key(String::len);
                format!("{{\n{}\n}}", entries.join(",\n"))
            }
        };
        Ok(format!("module.exports = {compiled};"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> BuildSession {
        let mut session = BuildSession::new("Sugar", "../../../lib/core");
        for (name, kind) in [
            ("HALF_WIDTH", PackageKind::Constants),
            ("CommonChars", PackageKind::Constants),
            ("sugarString", PackageKind::Vars),
            ("cache", PackageKind::Vars),
            ("isString", PackageKind::Internal),
            ("padString", PackageKind::Internal),
        ] {
            let mut package = Package::new(name, "common", kind, format!("common/{}/{name}", kind.dir_name()));
            package.exports = Exports::Single(name.to_string());
            session.insert_top_level(package);
        }

        let mut units = Package::new("DateUnits", "date", PackageKind::Constants, "date/constants/DateUnits");
        units.exports = Exports::Keyed(["DAY".to_string(), "HOUR".to_string()].into_iter().collect());
        session.insert_top_level(units);
        session.insert_alias("DAY", "DateUnits");
        session.insert_alias("HOUR", "DateUnits");
        session
    }

    fn method(deps: &[&str]) -> Package {
        let mut package = Package::new("pad", "string", PackageKind::Method, "string/pad");
        package.add_dependencies(deps.iter().copied());
        package.push_body("Sugar.String.defineInstance({\n\n  'pad': function() {}\n\n});");
        package.exports = Exports::Single("Sugar.String.pad".to_string());
        package
    }

    #[test]
    fn test_flat_imports_sorted_by_length() {
        let session = session();
        let compiler = PackageCompiler::new(&session).unwrap();
        let output = compiler.compile(&method(&["padString", "Sugar"])).unwrap();
        assert_eq!(
            output,
            "\"use strict\";\n\n\
             var Sugar = require('../../../../lib/core'),\n    padString = require('../common/internal/padString');\n\n\
             Sugar.String.defineInstance({\n\n  'pad': function() {}\n\n});\n\n\
             module.exports = Sugar.String.pad;"
        );
    }

    #[test]
    fn test_chunked_imports() {
        let session = session();
        let compiler = PackageCompiler::new(&session).unwrap();
        let package = method(&["Sugar", "isString", "CommonChars", "padString", "HALF_WIDTH", "cache"]);
        assert_eq!(
            compiler.named_requires(&package).unwrap(),
            "var Sugar = require('../../../../lib/core'),\n\n    \
             HALF_WIDTH = require('../common/constants/HALF_WIDTH'),\n    \
             CommonChars = require('../common/constants/CommonChars'),\n\n    \
             cache = require('../common/vars/cache'),\n\n    \
             isString = require('../common/internal/isString'),\n    \
             padString = require('../common/internal/padString');"
        );
    }

    #[test]
    fn test_bundle_members_are_assigned() {
        let session = session();
        let compiler = PackageCompiler::new(&session).unwrap();
        let package = method(&["HOUR", "DAY"]);
        assert_eq!(compiler.named_requires(&package).unwrap(), "var DateUnits = require('../date/constants/DateUnits');");
        assert_eq!(compiler.assigns(&package).unwrap(), "var DAY = DateUnits.DAY,\n    HOUR = DateUnits.HOUR;");
    }

    #[test]
    fn test_unnamed_requires_sorted() {
        let mut session = session();
        session.insert_method("string|String|pad", method(&[]));
        let compiler = PackageCompiler::new(&session).unwrap();
        let mut package = Package::new("padLeft", "string", PackageKind::Alias, "string/padLeft");
        package.add_require("string|String|pad");
        package.add_require("cache");
        assert_eq!(
            compiler.unnamed_requires(&package).unwrap(),
            "require('../common/vars/cache');\nrequire('./pad');"
        );
    }

    #[test]
    fn test_keyed_exports_with_direct_values() {
        let session = session();
        let compiler = PackageCompiler::new(&session).unwrap();
        let mut bundle = Package::new("Units", "date", PackageKind::Constants, "date/constants/Units");
        bundle.exports = Exports::Keyed(["MINUTE".to_string(), "DAY".to_string()].into_iter().collect());
        bundle.direct_exports.insert("DAY".to_string(), "86400".to_string());
        bundle.push_body("var MINUTE;");
        assert_eq!(
            compiler.compile(&bundle).unwrap(),
            "\"use strict\";\n\nvar MINUTE;\n\nmodule.exports = {\n  'DAY': 86400,\n  'MINUTE': MINUTE\n};"
        );
    }

    #[test]
    fn test_core_export_and_missing_dependency() {
        let session = session();
        let compiler = PackageCompiler::new(&session).unwrap();
        let mut entry = Package::new("index", "string", PackageKind::EntryPoint, "string/index");
        entry.push_body("require('./pad');");
        entry.exports = Exports::Core;
        assert_eq!(
            compiler.compile(&entry).unwrap(),
            "\"use strict\";\n\nrequire('./pad');\n\nmodule.exports = require('../../../../lib/core');"
        );

        let err = compiler.compile(&method(&["nowhere"])).unwrap_err();
        assert!(matches!(err, BuildError::MissingDependency { ref name, .. } if name == "nowhere"));
    }
}
