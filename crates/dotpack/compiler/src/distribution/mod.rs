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

//! Distribution assembly
//!
//! A distribution is written as one directory holding every package its
//! modules reach, one entry point per module, a top-level entry point and a
//! manifest. Distributions share the compiled graph and are written in
//! parallel into disjoint directories.

pub mod locales;
pub mod manifest;

pub use locales::{LocaleSet, build_locales};
pub use manifest::{load_base_manifest, render_manifest};

use crate::codegen::{CompiledGraph, OutputSink, PackageCompiler, require_statement};
use crate::config::{BuildConfig, Distribution};
use crate::error::{BuildError, BuildResult};
use crate::package::{BuildSession, Exports, Package, PackageId, PackageKind};
use indexmap::IndexSet;
use rayon::prelude::*;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const MANIFEST_FILE: &str = "package.json";
const MAIN_ENTRY_PATH: &str = "index";

/// Packages a module contributes to any distribution including it
#[derive(Debug, Clone)]
pub struct ModulePlan {
    pub module: String,
    pub polyfill: bool,
    /// `<module>/index`, absent for entryless modules
    pub entry_point: Option<Package>,
    /// The module's methods and everything they reach
    pub packages: IndexSet<PackageId>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DistributionReport {
    pub name: String,
    pub directory: PathBuf,
    pub files: usize,
}

/// Entry point of `module`: loads every method the module defines and
/// exports the root handle. Methods under the module's own directory come
/// first.
pub fn module_entry_point(session: &BuildSession, module: &str) -> Package {
    let path = format!("{module}/index");
    let mut methods: Vec<&Package> = session.methods().map(|(_, p)| p).filter(|p| p.module == module).collect();
    methods.sort_by(|a, b| {
        let a_local = a.path.starts_with(module);
        let b_local = b.path.starts_with(module);
        b_local.cmp(&a_local).then_with(|| a.path.cmp(&b.path))
    });

    let mut entry = Package::new("index", module, PackageKind::EntryPoint, path.as_str());
    let body: Vec<String> = methods.iter().map(|m| require_statement(&path, &m.path, true)).collect();
    entry.push_body(body.join("\n"));
    entry.exports = Exports::Core;
    entry
}

/// Packages reachable from the methods of `module`, in discovery order
pub fn module_packages(session: &BuildSession, module: &str) -> BuildResult<IndexSet<PackageId>> {
    let mut reached = IndexSet::new();
    let mut stack: Vec<PackageId> = session
        .methods()
        .filter(|(_, p)| p.module == module)
        .map(|(key, _)| PackageId::Method(key.clone()))
        .collect();
    stack.reverse();

    while let Some(id) = stack.pop() {
        if !reached.insert(id.clone()) {
            continue;
        }
        let Some(package) = session.package(&id) else {
            return Err(BuildError::missing(module, id.key()));
        };
        for name in package.requires.iter().chain(&package.dependencies).rev() {
            let next = session.lookup(name).ok_or_else(|| BuildError::missing(package.name.as_str(), name.as_str()))?;
            if !reached.contains(&next) {
                stack.push(next);
            }
        }
    }
    Ok(reached)
}

/// Plans for every configured module, polyfill modules first
pub fn plan_modules(config: &BuildConfig, session: &BuildSession) -> BuildResult<Vec<ModulePlan>> {
    let mut plans = config
        .project
        .modules
        .iter()
        .map(|module| {
            Ok(ModulePlan {
                module: module.clone(),
                polyfill: config.is_polyfill_module(module),
                entry_point: config.has_entry_point(module).then(|| module_entry_point(session, module)),
                packages: module_packages(session, module)?,
            })
        })
        .collect::<BuildResult<Vec<_>>>()?;
    plans.sort_by(|a, b| b.polyfill.cmp(&a.polyfill).then_with(|| a.module.cmp(&b.module)));
    Ok(plans)
}

/// A rendered file, path relative to the distribution directory
type RenderedFile = (String, String);

/// A fully rendered distribution waiting to be written
#[derive(Debug)]
pub struct StagedDistribution {
    pub name: String,
    pub directory: PathBuf,
    pub files: Vec<(PathBuf, String)>,
}

impl StagedDistribution {
    /// Replace the contents of the distribution directory with the staged files
    pub fn write(self, sink: &dyn OutputSink) -> BuildResult<DistributionReport> {
        sink.clean(&self.directory)?;
        for (path, text) in &self.files {
            sink.write(path, text)?;
        }
        debug!(distribution = %self.name, files = self.files.len(), "wrote distribution");
        Ok(DistributionReport {
            name: self.name,
            directory: self.directory,
            files: self.files.len(),
        })
    }
}

pub struct DistributionAssembler<'g> {
    config: &'g BuildConfig,
    graph: &'g CompiledGraph,
    plans: Vec<ModulePlan>,
    /// Compiled module entry points, by module
    entry_points: Vec<Option<RenderedFile>>,
}

impl<'g> DistributionAssembler<'g> {
    pub fn new(config: &'g BuildConfig, graph: &'g CompiledGraph) -> BuildResult<Self> {
        let plans = plan_modules(config, graph.session())?;
        let compiler = PackageCompiler::new(graph.session())?;
        let entry_points = plans
            .iter()
            .map(|plan| {
                plan.entry_point
                    .as_ref()
                    .map(|entry| Ok((entry.path.clone(), compiler.compile(entry)?)))
                    .transpose()
            })
            .collect::<BuildResult<Vec<_>>>()?;
        Ok(Self {
            config,
            graph,
            plans,
            entry_points,
        })
    }

    pub fn plans(&self) -> &[ModulePlan] {
        &self.plans
    }

    /// Write every distribution in `dists` below `output`.
    ///
    /// Every distribution is rendered before the first directory is cleaned,
    /// so a failed run leaves existing output untouched.
    pub fn assemble_all(&self, dists: &[&Distribution], output: &Path, sink: &dyn OutputSink) -> BuildResult<Vec<DistributionReport>> {
        let base = load_base_manifest(self.config)?;
        let locales = if dists.iter().any(|d| d.locales) { self.render_locales()? } else { Vec::new() };
        let core = if dists.iter().any(|d| self.config.is_core_only(d)) { Some(self.read_core()?) } else { None };

        let staged = dists
            .par_iter()
            .map(|dist| self.render(dist, output, &base, &locales, core.as_deref()))
            .collect::<BuildResult<Vec<_>>>()?;

        let reports = staged
            .into_par_iter()
            .map(|stage| stage.write(sink))
            .collect::<BuildResult<Vec<_>>>()?;
        info!(distributions = reports.len(), output = %output.display(), "assembled distributions");
        Ok(reports)
    }

    /// Render every file of one distribution without touching `output`
    pub fn render(&self, dist: &Distribution, output: &Path, base: &Value, locales: &[RenderedFile], core: Option<&str>) -> BuildResult<StagedDistribution> {
        let dir = output.join(&dist.name);
        let mut files = if self.config.is_core_only(dist) {
            let content = match core {
                Some(content) => content.to_string(),
                None => self.read_core()?,
            };
            vec![(dir.join("index.js"), content)]
        } else {
            self.render_modules(dist, &dir, locales)?
        };
        files.push((dir.join(MANIFEST_FILE), render_manifest(self.config, dist, base)?));

        Ok(StagedDistribution {
            name: dist.name.clone(),
            directory: dir,
            files,
        })
    }

    fn read_core(&self) -> BuildResult<String> {
        let source = self.config.resolve_path(&self.config.project.core_source);
        fs::read_to_string(&source).map_err(|e| BuildError::io(&source, e))
    }

    fn render_modules(&self, dist: &Distribution, dir: &Path, locales: &[RenderedFile]) -> BuildResult<Vec<(PathBuf, String)>> {
        let session = self.graph.session();
        let mut seen: HashSet<&str> = HashSet::new();
        let mut files = Vec::new();
        let file = |path: &str, text: &str| (dir.join(format!("{path}.js")), text.to_string());

        for (plan, entry_point) in self.plans.iter().zip(&self.entry_points) {
            if !dist.includes_module(&plan.module) {
                continue;
            }
            if let Some((path, text)) = entry_point {
                if seen.insert(path.as_str()) {
                    files.push(file(path, text));
                }
            }
            for id in &plan.packages {
                let (Some(package), Some(text)) = (session.package(id), self.graph.compiled(id)) else {
                    continue;
                };
                if seen.insert(package.path.as_str()) {
                    files.push(file(&package.path, text));
                }
            }
        }

        files.push(file(MAIN_ENTRY_PATH, &self.main_entry_point(dist)?));
        if dist.locales {
            files.extend(locales.iter().map(|(path, text)| file(path, text)));
        }
        Ok(files)
    }

    /// Top-level entry point loading the module entry points `dist` imports
    fn main_entry_point(&self, dist: &Distribution) -> BuildResult<String> {
        let body: Vec<String> = self
            .plans
            .iter()
            .filter(|plan| dist.imports_entry_point(&plan.module))
            .filter_map(|plan| plan.entry_point.as_ref())
            .map(|entry| require_statement(MAIN_ENTRY_PATH, &entry.path, true))
            .collect();

        let mut main = Package::new("index", "", PackageKind::EntryPoint, MAIN_ENTRY_PATH);
        main.push_body(body.join("\n"));
        main.exports = Exports::Core;
        PackageCompiler::new(self.graph.session())?.compile(&main)
    }

    fn render_locales(&self) -> BuildResult<Vec<RenderedFile>> {
        let Some(set) = build_locales(self.config, self.graph.session())? else {
            return Ok(Vec::new());
        };
        let compiler = PackageCompiler::new(self.graph.session())?;
        set.packages
            .iter()
            .chain(std::iter::once(&set.index))
            .map(|package| Ok((package.path.clone(), compiler.compile(package)?)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::{MemoryWriter, compile_session};

    fn session() -> BuildSession {
        let mut session = BuildSession::new("Sugar", "../../../lib/core");
        let mut helper = Package::new("helper", "common", PackageKind::Internal, "common/internal/helper");
        helper.exports = Exports::Single("helper".to_string());
        session.insert_top_level(helper);

        for (module, namespace, name, path) in [
            ("string", "String", "pad", "string/pad"),
            ("string", "String", "at", "string/at"),
            ("string", "Array", "collect", "array/collect"),
            ("es6", "String", "includes", "polyfills/string/includes"),
        ] {
            let mut method = Package::new(name, module, PackageKind::Method, path);
            method.add_dependency("Sugar");
            method.exports = Exports::Single(format!("Sugar.{namespace}.{name}"));
            session.insert_method(format!("{module}|{namespace}|{name}"), method);
        }
        session.method_mut("string|String|pad").unwrap().add_dependency("helper");
        session
    }

    fn config() -> BuildConfig {
        BuildConfig::from_toml(
            r#"
[project]
modules = ["common", "string", "es6"]

[[distributions]]
name = "sugar-string"
modules = ["string"]
extra = ["es6"]
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_module_entry_point_order() {
        let entry = module_entry_point(&session(), "string");
        assert_eq!(entry.path, "string/index");
        assert_eq!(entry.body, vec!["require('./at');\nrequire('./pad');\nrequire('../array/collect');"]);
        assert_eq!(entry.exports, Exports::Core);
    }

    #[test]
    fn test_module_packages_follow_dependencies() {
        let session = session();
        let packages = module_packages(&session, "string").unwrap();
        assert!(packages.contains(&PackageId::TopLevel("helper".to_string())));
        assert!(packages.contains(&PackageId::TopLevel("Sugar".to_string())));
        assert!(!packages.contains(&PackageId::Method("es6|String|includes".to_string())));
    }

    #[test]
    fn test_plans_sort_polyfills_first() {
        let plans = plan_modules(&config(), &session()).unwrap();
        let order: Vec<&str> = plans.iter().map(|p| p.module.as_str()).collect();
        assert_eq!(order, vec!["es6", "common", "string"]);
        assert!(plans[1].entry_point.is_none());
    }

    #[test]
    fn test_assemble_distribution() {
        let config = config();
        let graph = compile_session(session()).unwrap();
        let assembler = DistributionAssembler::new(&config, &graph).unwrap();
        let sink = MemoryWriter::new();
        let dists: Vec<&Distribution> = config.distributions.iter().collect();

        let reports = assembler.assemble_all(&dists, Path::new("out"), &sink).unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].files, sink.len());

        let main = sink.get("out/sugar-string/index.js").unwrap();
        assert_eq!(main, "\"use strict\";\n\nrequire('./string');\n\nmodule.exports = require('../../../lib/core');");
        // Extra modules ship their packages but are not loaded by the main entry point.
        assert!(sink.get("out/sugar-string/polyfills/string/includes.js").is_some());
        assert!(sink.get("out/sugar-string/es6/index.js").is_some());
        assert!(sink.get("out/sugar-string/common/internal/helper.js").is_some());
        assert!(sink.get("out/sugar-string/package.json").is_some());
        assert!(sink.get("out/sugar-string/locales/index.js").is_none());
    }

    #[test]
    fn test_render_leaves_output_untouched() {
        let config = config();
        let graph = compile_session(session()).unwrap();
        let assembler = DistributionAssembler::new(&config, &graph).unwrap();
        let sink = MemoryWriter::new();
        sink.write(Path::new("out/sugar-string/stale.js"), "stale").unwrap();

        let base = load_base_manifest(&config).unwrap();
        let staged = assembler.render(&config.distributions[0], Path::new("out"), &base, &[], None).unwrap();
        assert_eq!(sink.len(), 1);
        assert!(staged.files.iter().any(|(path, _)| path == Path::new("out/sugar-string/package.json")));

        let report = staged.write(&sink).unwrap();
        assert!(sink.get("out/sugar-string/stale.js").is_none());
        assert_eq!(report.files, sink.len());
    }
}
