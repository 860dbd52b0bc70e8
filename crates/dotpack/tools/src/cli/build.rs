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

//! Build command: runs the full pipeline and writes distributions

use anyhow::{Context, Result};
use clap::Args;
use dotpack_compiler::{BuildConfig, BuildPipeline, BuildReport, FsWriter};
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

/// Arguments for the build command
#[derive(Args, Debug, Clone)]
pub struct BuildArgs {
    /// Distributions to build, comma separated (default: all)
    #[arg(short, long, value_delimiter = ',')]
    pub distributions: Vec<String>,

    /// Directory receiving one subdirectory per distribution
    #[arg(short, long, default_value = "release/npm")]
    pub output: PathBuf,

    /// Print the build report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Execute the build command
pub fn run_build(config: &BuildConfig, args: &BuildArgs) -> Result<BuildReport> {
    let start = Instant::now();
    let output = config.resolve_path(&args.output);
    info!(output = %output.display(), "building distributions");

    let report = BuildPipeline::new(config)
        .run(&args.distributions, &output, &FsWriter)
        .with_context(|| format!("failed to build distributions into {}", output.display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for dist in &report.distributions {
            println!("{:<24} {:>5} files  {}", dist.name, dist.files, dist.directory.display());
        }
        println!(
            "Built {} distributions from {} packages ({} merges in {} passes) in {:?}",
            report.distributions.len(),
            report.packages,
            report.optimization.merges,
            report.optimization.passes,
            start.elapsed()
        );
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::write_library;
    use tempfile::TempDir;

    #[test]
    fn test_build_selected_distribution() {
        let temp = TempDir::new().unwrap();
        let config = write_library(temp.path());
        let args = BuildArgs {
            distributions: vec!["sugar-string".to_string()],
            output: PathBuf::from("out"),
            json: false,
        };

        let report = run_build(&config, &args).unwrap();
        assert_eq!(report.distributions.len(), 1);
        let dir = temp.path().join("out/sugar-string");
        assert!(dir.join("string/repeat.js").exists());
        assert!(dir.join("common/internal/repeat.js").exists());
        assert!(dir.join("string/index.js").exists());
        assert!(!temp.path().join("out/sugar-core").exists());
    }

    #[test]
    fn test_unknown_distribution_fails() {
        let temp = TempDir::new().unwrap();
        let config = write_library(temp.path());
        let args = BuildArgs {
            distributions: vec!["sugar-nope".to_string()],
            output: PathBuf::from("out"),
            json: false,
        };

        let err = run_build(&config, &args).unwrap_err();
        assert!(format!("{err:#}").contains("unknown distribution 'sugar-nope'"));
    }
}
