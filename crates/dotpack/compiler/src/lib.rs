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

//! Dotpack compiler
//!
//! Static dependency analysis and package compilation for a library written
//! as monolithic source modules. Each module is parsed and decomposed into
//! packages (one per declaration, method, alias or bundle), packages used by
//! a single consumer are folded into it, and every remaining package is
//! rendered as a CommonJS file. Distributions select modules and receive the
//! packages those modules reach.
//!
//! ```no_run
//! use dotpack_compiler::{BuildConfig, BuildPipeline, FsWriter};
//! use std::path::Path;
//!
//! let config = BuildConfig::load_from_file("dotpack.toml")?;
//! let report = BuildPipeline::new(&config).run(&[], Path::new("release/npm"), &FsWriter)?;
//! println!("{} packages", report.packages);
//! # Ok::<(), dotpack_compiler::BuildError>(())
//! ```

pub mod analysis;
pub mod codegen;
pub mod config;
pub mod decompose;
pub mod distribution;
pub mod error;
pub mod optimizer;
pub mod package;
pub mod parser;
pub mod pipeline;

pub use codegen::{CompiledGraph, FsWriter, MemoryWriter, OutputSink, PackageCompiler, compile_session};
pub use config::{BuildConfig, Distribution};
pub use decompose::Decomposer;
pub use distribution::{DistributionAssembler, DistributionReport, StagedDistribution};
pub use error::{BuildError, BuildResult, ErrorClass};
pub use optimizer::{BundleOptimizer, OptimizationReport};
pub use package::{BuildSession, Exports, Package, PackageId, PackageKind, Record};
pub use pipeline::{BuildPipeline, BuildReport};
