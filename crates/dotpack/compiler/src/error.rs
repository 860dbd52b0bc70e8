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

//! Error types for the package build
//!
//! Every failure is fatal. [`BuildError::class`] groups the variants into the
//! categories callers report on: unknown source shapes, unresolved
//! dependencies, inconsistent build expressions and environment failures.

use crate::parser::{ParseError, Position};
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while building packages
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Unsupported construct '{construct}' in '{context}' at {position}")]
    UnsupportedConstruct { context: String, construct: String, position: Position },

    #[error("Unsupported top-level {statement} in module '{module}' at {position}")]
    UnsupportedStatement { module: String, statement: String, position: Position },

    #[error("Missing dependency '{name}' required by '{package}'")]
    MissingDependency { package: String, name: String },

    #[error("Inconsistent build expression '{function}': {reason}")]
    InconsistentBuildExpression { function: String, reason: String },

    #[error("Circular dependency between packages: {}", packages.join(", "))]
    CircularDependency { packages: Vec<String> },

    #[error("No namespace declared before line {line} in module '{module}'")]
    MissingNamespace { module: String, line: usize },

    #[error("Bundle optimizer did not converge after {passes} passes")]
    OptimizerDidNotConverge { passes: usize },

    #[error("Parse error in module '{module}': {source}")]
    Parse {
        module: String,
        #[source]
        source: ParseError,
    },

    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Manifest error: {0}")]
    Manifest(#[from] serde_json::Error),
}

/// Category of a [`BuildError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// A node or statement outside the supported grammar
    UnknownShape,
    /// A dependency name that resolves to no package
    MissingDependency,
    /// A build expression or package graph the bundler cannot express
    InconsistentBuild,
    /// Configuration, filesystem or tooling failures
    Environment,
}

impl BuildError {
    /// Classify this error
    pub fn class(&self) -> ErrorClass {
        match self {
            BuildError::UnsupportedConstruct { .. } | BuildError::UnsupportedStatement { .. } | BuildError::Parse { .. } => ErrorClass::UnknownShape,
            BuildError::MissingDependency { .. } | BuildError::MissingNamespace { .. } => ErrorClass::MissingDependency,
            BuildError::InconsistentBuildExpression { .. } | BuildError::CircularDependency { .. } | BuildError::OptimizerDidNotConverge { .. } => ErrorClass::InconsistentBuild,
            BuildError::Io { .. } | BuildError::Config(_) | BuildError::Pattern(_) | BuildError::Manifest(_) => ErrorClass::Environment,
        }
    }

    /// Build an I/O error for a path
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        BuildError::Io { path: path.into(), source }
    }

    /// Build a missing dependency error
    pub fn missing(package: impl Into<String>, name: impl Into<String>) -> Self {
        BuildError::MissingDependency {
            package: package.into(),
            name: name.into(),
        }
    }
}

/// Result type for build operations
pub type BuildResult<T> = Result<T, BuildError>;
