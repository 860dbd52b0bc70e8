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

//! Dotpack CLI Tool
//!
//! Main entry point for the dotpack command-line interface.

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use dotpack_compiler::BuildConfig;
use dotpack_tools::{BuildArgs, GraphArgs, log_level, run_build, run_graph, run_list};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dotpack")]
#[command(about = "Dotpack - dependency analyzer and package compiler")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to configuration file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log output (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze, optimize and write distributions
    Build(BuildArgs),
    /// Print the optimized package graph as JSON
    Graph(GraphArgs),
    /// List configured distributions
    List,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt().with_max_level(log_level(cli.verbose)).with_target(false).with_writer(std::io::stderr).init();

    let config = BuildConfig::resolve_config(cli.config).context("failed to load configuration")?;

    match cli.command {
        Commands::Build(args) => {
            run_build(&config, &args)?;
        }
        Commands::Graph(args) => {
            run_graph(&config, &args)?;
        }
        Commands::List => {
            run_list(&config);
        }
    }

    Ok(())
}
