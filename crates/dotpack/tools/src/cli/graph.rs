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

//! Graph command: prints the optimized package graph as JSON

use anyhow::{Context, Result, bail};
use clap::Args;
use dotpack_compiler::{BuildConfig, BuildPipeline, BuildSession, Exports, OptimizationReport, PackageId, PackageKind};
use serde::Serialize;

/// Arguments for the graph command
#[derive(Args, Debug, Clone, Default)]
pub struct GraphArgs {
    /// Only print packages declared by this module
    #[arg(short, long)]
    pub module: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GraphView<'s> {
    pub optimization: OptimizationReport,
    pub packages: Vec<PackageView<'s>>,
}

#[derive(Debug, Serialize)]
pub struct PackageView<'s> {
    pub id: &'s str,
    pub kind: PackageKind,
    pub path: &'s str,
    pub dependencies: Vec<&'s str>,
    pub requires: Vec<&'s str>,
    pub exports: &'s Exports,
}

/// Live packages of `session`, optionally restricted to one module
pub fn graph_view<'s>(session: &'s BuildSession, optimization: OptimizationReport, module: Option<&str>) -> GraphView<'s> {
    let packages = session
        .live_packages()
        .filter(|(_, package)| package.is_emitted())
        .filter(|(_, package)| module.is_none_or(|m| package.module == m))
        .map(|(id, package)| {
            let id = match id {
                PackageId::TopLevel(_) => package.name.as_str(),
                PackageId::Method(_) => package.path.as_str(),
            };
            PackageView {
                id,
                kind: package.kind,
                path: &package.path,
                dependencies: package.dependencies.iter().map(String::as_str).collect(),
                requires: package.requires.iter().map(String::as_str).collect(),
                exports: &package.exports,
            }
        })
        .collect();
    GraphView { optimization, packages }
}

/// Execute the graph command
pub fn run_graph(config: &BuildConfig, args: &GraphArgs) -> Result<String> {
    if let Some(module) = &args.module {
        if !config.project.modules.contains(module) {
            bail!("module '{module}' is not configured");
        }
    }

    let pipeline = BuildPipeline::new(config);
    let mut session = pipeline.analyze().context("failed to analyze modules")?;
    let optimization = pipeline.optimize(&mut session).context("failed to optimize package graph")?;

    let view = graph_view(&session, optimization, args.module.as_deref());
    let json = serde_json::to_string_pretty(&view)?;
    println!("{json}");
    Ok(json)
}
