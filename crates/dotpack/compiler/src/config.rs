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

//! Build configuration
//!
//! Loaded from TOML. Every field has a default, so a file only needs to
//! list its modules and distributions.

use crate::error::{BuildError, BuildResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Environment variable naming the configuration file
pub const CONFIG_ENV_VAR: &str = "DOTPACK_CONFIG";

/// Configuration file used when neither a flag nor the environment names one
pub const DEFAULT_CONFIG_FILE: &str = "dotpack.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    pub project: ProjectConfig,
    pub analysis: AnalysisConfig,
    pub build_rules: BuildRules,
    pub optimizer: OptimizerConfig,
    pub locales: LocaleConfig,
    pub manifest: ManifestConfig,
    pub distributions: Vec<Distribution>,
    /// Directory relative paths are resolved against
    #[serde(skip)]
    pub base_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Name of the library's root handle
    pub root_handle: String,
    /// Package path of the root handle, relative to a distribution root
    pub core_path: String,
    /// Source file copied verbatim into core-only distributions
    pub core_source: PathBuf,
    /// Module name that stands for the core library
    pub core_module: String,
    /// Directory holding `<module>.js` source units
    pub source_dir: PathBuf,
    /// Modules to analyse, in order
    pub modules: Vec<String>,
    /// Modules that never get an entry point
    pub entryless_modules: Vec<String>,
    /// Modules whose entry points are imported first
    pub polyfill_modules: Vec<String>,
    pub version: String,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            root_handle: "Sugar".to_string(),
            core_path: "../../../lib/core".to_string(),
            core_source: PathBuf::from("lib/core.js"),
            core_module: "core".to_string(),
            source_dir: PathBuf::from("lib"),
            modules: Vec::new(),
            entryless_modules: vec!["common".to_string()],
            polyfill_modules: vec!["es5".to_string(), "es6".to_string(), "es7".to_string()],
            version: "0.0.0".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Extra names treated as host globals
    pub host_globals: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildRules {
    /// Build functions whose name starts with this prefix are aggregate builders
    pub hash_build_prefix: String,
    /// Name of the variable listing an aggregate builder's methods
    pub method_list_var: String,
    /// Method key of the package that must pull in every aggregate builder
    pub hash_build_consumer: String,
}

impl Default for BuildRules {
    fn default() -> Self {
        Self {
            hash_build_prefix: "buildHash".to_string(),
            method_list_var: "methods".to_string(),
            hash_build_consumer: "object|Object|extended".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Upper bound on bundling passes
    pub max_passes: usize,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self { max_passes: 16 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocaleConfig {
    /// Directory of locale source files
    pub dir: PathBuf,
    /// Prefix stripped from the start of every locale source line
    pub strip_prefix: String,
    /// Method key every locale package depends on
    pub dependency: String,
    /// Method key whose result the locale index exports
    pub aggregate: String,
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("lib/locales"),
            strip_prefix: "Sugar.Date.".to_string(),
            dependency: "date|Date|addLocale".to_string(),
            aggregate: "date|Date|getAllLocales".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ManifestConfig {
    /// Base `package.json` every distribution manifest derives from
    pub base: Option<PathBuf>,
    /// Distribution every other distribution depends on
    pub core_package: String,
    /// Keywords kept only by distributions that ship locales
    pub locale_keywords: Vec<String>,
}

impl Default for ManifestConfig {
    fn default() -> Self {
        Self {
            base: None,
            core_package: "sugar-core".to_string(),
            locale_keywords: vec!["date".to_string(), "time".to_string()],
        }
    }
}

/// A named, selectable subset of modules
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Distribution {
    pub name: String,
    pub modules: Vec<String>,
    /// Modules whose packages ship without a top-level entry import
    pub extra: Vec<String>,
    pub locales: bool,
    pub description: String,
}

impl Distribution {
    /// Whether the distribution ships packages of `module`
    pub fn includes_module(&self, module: &str) -> bool {
        self.modules.iter().any(|m| m == module) || self.extra.iter().any(|m| m == module)
    }

    /// Whether the top-level entry point imports `module`
    pub fn imports_entry_point(&self, module: &str) -> bool {
        self.modules.iter().any(|m| m == module)
    }
}

impl BuildConfig {
    pub fn load_from_file(path: impl AsRef<Path>) -> BuildResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| BuildError::io(path, e))?;
        let mut config = Self::from_toml(&content)?;
        config.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(config)
    }

    /// Parse and validate a TOML document
    pub fn from_toml(content: &str) -> BuildResult<Self> {
        let config: Self = toml::from_str(content).map_err(|e| BuildError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Pick the configuration file: explicit path, then the environment,
    /// then `dotpack.toml` in the working directory.
    pub fn resolve_config(cli_config: Option<PathBuf>) -> BuildResult<Self> {
        if let Some(config_path) = cli_config {
            Self::load_from_file(config_path)
        } else if let Ok(env_config) = std::env::var(CONFIG_ENV_VAR) {
            Self::load_from_file(env_config)
        } else if Path::new(DEFAULT_CONFIG_FILE).exists() {
            Self::load_from_file(DEFAULT_CONFIG_FILE)
        } else {
            Err(BuildError::Config(format!("no configuration found; pass --config, set {CONFIG_ENV_VAR} or create {DEFAULT_CONFIG_FILE}")))
        }
    }

    pub fn validate(&self) -> BuildResult<()> {
        if self.project.root_handle.is_empty() {
            return Err(BuildError::Config("project.root_handle must not be empty".to_string()));
        }
        if self.optimizer.max_passes == 0 {
            return Err(BuildError::Config("optimizer.max_passes must be at least 1".to_string()));
        }

        let mut seen = HashSet::new();
        for dist in &self.distributions {
            if dist.name.is_empty() {
                return Err(BuildError::Config("distribution without a name".to_string()));
            }
            if !seen.insert(dist.name.as_str()) {
                return Err(BuildError::Config(format!("duplicate distribution '{}'", dist.name)));
            }
            for module in dist.modules.iter().chain(&dist.extra) {
                if !self.knows_module(module) {
                    return Err(BuildError::Config(format!("distribution '{}' lists unknown module '{}'", dist.name, module)));
                }
            }
        }
        Ok(())
    }

    fn knows_module(&self, module: &str) -> bool {
        module == self.project.core_module || self.project.modules.iter().any(|m| m == module)
    }

    /// Resolve a configured path against the configuration directory
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() { path.to_path_buf() } else { self.base_dir.join(path) }
    }

    /// Source file of a module
    pub fn module_source(&self, module: &str) -> PathBuf {
        self.resolve_path(&self.project.source_dir).join(format!("{module}.js"))
    }

    pub fn has_entry_point(&self, module: &str) -> bool {
        !self.project.entryless_modules.iter().any(|m| m == module)
    }

    pub fn is_polyfill_module(&self, module: &str) -> bool {
        self.project.polyfill_modules.iter().any(|m| m == module)
    }

    /// A distribution that consists of the core library alone
    pub fn is_core_only(&self, dist: &Distribution) -> bool {
        dist.extra.is_empty() && dist.modules.len() == 1 && dist.modules[0] == self.project.core_module
    }

    pub fn distribution(&self, name: &str) -> Option<&Distribution> {
        self.distributions.iter().find(|d| d.name == name)
    }

    /// Distributions selected by name, or all of them when `names` is empty
    pub fn select_distributions(&self, names: &[String]) -> BuildResult<Vec<&Distribution>> {
        if names.is_empty() {
            return Ok(self.distributions.iter().collect());
        }
        names
            .iter()
            .map(|name| self.distribution(name).ok_or_else(|| BuildError::Config(format!("unknown distribution '{name}'"))))
            .collect()
    }
}
