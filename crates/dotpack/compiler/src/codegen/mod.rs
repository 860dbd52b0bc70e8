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

//! Code generation
//!
//! Every emitted package of an optimized session is rendered once into a
//! [`CompiledGraph`], which distributions then read concurrently.

pub mod compiler;
pub mod paths;
pub mod writer;

pub use compiler::{PackageCompiler, require_statement};
pub use paths::require_path;
pub use writer::{FsWriter, MemoryWriter, OutputSink};

use crate::error::BuildResult;
use crate::package::{BuildSession, PackageId};
use std::collections::HashMap;
use tracing::info;

/// An optimized session with the rendered text of each emitted package
#[derive(Debug)]
pub struct CompiledGraph {
    session: BuildSession,
    compiled: HashMap<PackageId, String>,
}

impl CompiledGraph {
    pub fn session(&self) -> &BuildSession {
        &self.session
    }

    pub fn compiled(&self, id: &PackageId) -> Option<&str> {
        self.compiled.get(id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.compiled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.compiled.is_empty()
    }
}

/// Render every emitted package of `session`
pub fn compile_session(session: BuildSession) -> BuildResult<CompiledGraph> {
    let compiled = {
        let compiler = PackageCompiler::new(&session)?;
        session
            .live_packages()
            .filter(|(_, package)| package.is_emitted())
            .map(|(id, package)| Ok((id, compiler.compile(package)?)))
            .collect::<BuildResult<HashMap<_, _>>>()?
    };
    info!(packages = compiled.len(), "compiled packages");
    Ok(CompiledGraph { session, compiled })
}
