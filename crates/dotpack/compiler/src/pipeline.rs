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

//! End-to-end build
//!
//! Stages run strictly in order: every module is decomposed before
//! optimization, and nothing is written until every package compiled.

use crate::codegen::{CompiledGraph, OutputSink, compile_session};
use crate::config::BuildConfig;
use crate::decompose::Decomposer;
use crate::distribution::{DistributionAssembler, DistributionReport};
use crate::error::{BuildError, BuildResult};
use crate::optimizer::{BundleOptimizer, OptimizationReport};
use crate::package::BuildSession;
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::info;

/// Summary of a pipeline run
#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
    pub modules: usize,
    pub optimization: OptimizationReport,
    pub packages: usize,
    pub distributions: Vec<DistributionReport>,
}

pub struct BuildPipeline<'c> {
    config: &'c BuildConfig,
}

impl<'c> BuildPipeline<'c> {
    pub fn new(config: &'c BuildConfig) -> Self {
        Self { config }
    }

    fn empty_session(&self) -> BuildSession {
        BuildSession::new(self.config.project.root_handle.as_str(), self.config.project.core_path.as_str())
    }

    /// Decompose every configured module from its source file
    pub fn analyze(&self) -> BuildResult<BuildSession> {
        let sources = self
            .config
            .project
            .modules
            .iter()
            .map(|module| {
                let path = self.config.module_source(module);
                let source = fs::read_to_string(&path).map_err(|e| BuildError::io(&path, e))?;
                Ok((module.as_str(), source))
            })
            .collect::<BuildResult<Vec<_>>>()?;
        self.analyze_sources(sources.iter().map(|(module, source)| (*module, source.as_str())))
    }

    /// Decompose in-memory `(module, source)` pairs, in order
    pub fn analyze_sources<'a>(&self, sources: impl IntoIterator<Item = (&'a str, &'a str)>) -> BuildResult<BuildSession> {
        let decomposer = Decomposer::new(self.config)?;
        let mut session = self.empty_session();
        let mut modules = 0;
        for (module, source) in sources {
            decomposer.decompose(&mut session, module, source)?;
            modules += 1;
        }
        session.link_pending()?;
        info!(modules, "analyzed modules");
        Ok(session)
    }

    pub fn optimize(&self, session: &mut BuildSession) -> BuildResult<OptimizationReport> {
        BundleOptimizer::new(self.config.optimizer.max_passes).optimize(session)
    }

    /// Analyze, optimize and compile every configured module
    pub fn build_graph(&self) -> BuildResult<(CompiledGraph, OptimizationReport)> {
        let mut session = self.analyze()?;
        let report = self.optimize(&mut session)?;
        Ok((compile_session(session)?, report))
    }

    /// Build the named distributions (all when `names` is empty) into
    /// `output`
    pub fn run(&self, names: &[String], output: &Path, sink: &dyn OutputSink) -> BuildResult<BuildReport> {
        let dists = self.config.select_distributions(names)?;

        // Core-only distributions copy a file and need no package graph.
        let needs_graph = dists.iter().any(|d| !self.config.is_core_only(d));
        let (graph, optimization) = if needs_graph {
            self.build_graph()?
        } else {
            (compile_session(self.empty_session())?, OptimizationReport::default())
        };

        let assembler = DistributionAssembler::new(self.config, &graph)?;
        let distributions = assembler.assemble_all(&dists, output, sink)?;

        info!(distributions = distributions.len(), packages = graph.len(), "build finished");
        Ok(BuildReport {
            modules: if needs_graph { self.config.project.modules.len() } else { 0 },
            optimization,
            packages: graph.len(),
            distributions,
        })
    }
}
