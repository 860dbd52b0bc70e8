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

//! Locale packages
//!
//! Each locale source file becomes `locales/<stem>`, registered through the
//! configured method. `locales/index` loads them all and exports the
//! aggregate lookup.

use crate::codegen::require_statement;
use crate::config::BuildConfig;
use crate::error::{BuildError, BuildResult};
use crate::package::{BuildSession, Exports, Package, PackageKind};
use regex::Regex;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, warn};

const LOCALE_MODULE: &str = "locales";
const INDEX_PATH: &str = "locales/index";

/// Locale packages plus their index
#[derive(Debug, Clone)]
pub struct LocaleSet {
    pub packages: Vec<Package>,
    pub index: Package,
}

/// Locale source files, sorted by name
pub fn locale_files(config: &BuildConfig) -> BuildResult<Vec<PathBuf>> {
    let dir = config.resolve_path(&config.locales.dir);
    if !dir.is_dir() {
        warn!(dir = %dir.display(), "locale directory not found");
        return Ok(Vec::new());
    }
    let mut files = Vec::new();
    for entry in fs::read_dir(&dir).map_err(|e| BuildError::io(&dir, e))? {
        let path = entry.map_err(|e| BuildError::io(&dir, e))?.path();
        if path.extension().is_some_and(|ext| ext == "js") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Build the locale packages from the configured directory. `None` when
/// there are no locale files.
pub fn build_locales(config: &BuildConfig, session: &BuildSession) -> BuildResult<Option<LocaleSet>> {
    let files = locale_files(config)?;
    if files.is_empty() {
        return Ok(None);
    }
    let prefix = Regex::new(&format!("(?m)^{}", regex::escape(&config.locales.strip_prefix)))?;

    let mut packages = Vec::with_capacity(files.len());
    for file in &files {
        let Some(stem) = file.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let source = fs::read_to_string(file).map_err(|e| BuildError::io(file, e))?;
        packages.push(locale_package(config, stem, &prefix.replace_all(&source, "")));
    }

    let aggregate = session
        .resolve(&config.locales.aggregate)
        .ok_or_else(|| BuildError::missing(INDEX_PATH, config.locales.aggregate.as_str()))?;
    let index = locale_index(&packages, &aggregate.path);

    debug!(locales = packages.len(), "built locale packages");
    Ok(Some(LocaleSet { packages, index }))
}

fn locale_package(config: &BuildConfig, stem: &str, body: &str) -> Package {
    let mut package = Package::new(stem, LOCALE_MODULE, PackageKind::Locale, format!("{LOCALE_MODULE}/{stem}"));
    package.add_dependency(config.locales.dependency.as_str());
    package.push_body(body.trim_end());
    package
}

fn locale_index(packages: &[Package], aggregate_path: &str) -> Package {
    let mut index = Package::new("index", LOCALE_MODULE, PackageKind::EntryPoint, INDEX_PATH);
    let body: Vec<String> = packages.iter().map(|p| require_statement(INDEX_PATH, &p.path, true)).collect();
    index.push_body(body.join("\n"));
    index.exports = Exports::Single(format!("{}()", require_statement(INDEX_PATH, aggregate_path, false)));
    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup() -> (TempDir, BuildConfig, BuildSession) {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("lib/locales");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("fr.js"), "/* French locale definition */\nSugar.Date.addLocale('fr', {});\n").unwrap();
        fs::write(dir.join("de.js"), "Sugar.Date.addLocale('de', {});\n").unwrap();
        fs::write(dir.join("README.md"), "not a locale").unwrap();

        let mut config = BuildConfig::default();
        config.base_dir = temp.path().to_path_buf();

        let mut session = BuildSession::new("Sugar", config.project.core_path.clone());
        for name in ["addLocale", "getAllLocales"] {
            session.insert_method(format!("date|Date|{name}"), Package::new(name, "date", PackageKind::Method, format!("date/{name}")));
        }
        (temp, config, session)
    }

    #[test]
    fn test_locale_packages() {
        let (_temp, config, session) = setup();
        let set = build_locales(&config, &session).unwrap().unwrap();

        let paths: Vec<&str> = set.packages.iter().map(|p| p.path.as_str()).collect();
        assert_eq!(paths, vec!["locales/de", "locales/fr"]);
        assert_eq!(set.packages[1].body, vec!["/* French locale definition */\naddLocale('fr', {});"]);
        assert!(set.packages[1].dependencies.contains("date|Date|addLocale"));

        assert_eq!(set.index.body, vec!["require('./de');\nrequire('./fr');"]);
        assert_eq!(set.index.exports, Exports::Single("require('../date/getAllLocales')()".to_string()));
    }

    #[test]
    fn test_missing_locale_directory() {
        let (_temp, mut config, session) = setup();
        config.locales.dir = PathBuf::from("nowhere");
        assert!(build_locales(&config, &session).unwrap().is_none());
    }
}
