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

//! Output sinks
//!
//! Distributions are written through [`OutputSink`] so that the assembler can
//! target the file system or memory. Sinks are shared between the threads
//! emitting different distributions.

use crate::error::{BuildError, BuildResult};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::trace;

pub trait OutputSink: Send + Sync {
    /// Write `contents` to `path`, creating parent directories
    fn write(&self, path: &Path, contents: &str) -> BuildResult<()>;

    /// Remove everything below `dir`
    fn clean(&self, dir: &Path) -> BuildResult<()>;
}

/// Writes to the file system
#[derive(Debug, Default, Clone, Copy)]
pub struct FsWriter;

impl OutputSink for FsWriter {
    fn write(&self, path: &Path, contents: &str) -> BuildResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| BuildError::io(parent, e))?;
        }
        fs::write(path, contents).map_err(|e| BuildError::io(path, e))?;
        trace!(path = %path.display(), bytes = contents.len(), "wrote file");
        Ok(())
    }

    fn clean(&self, dir: &Path) -> BuildResult<()> {
        match fs::remove_dir_all(dir) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(BuildError::io(dir, e)),
        }
    }
}

/// Collects output in memory
#[derive(Debug, Default)]
pub struct MemoryWriter {
    files: Mutex<BTreeMap<PathBuf, String>>,
}

impl MemoryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Contents written to `path`
    pub fn get(&self, path: impl AsRef<Path>) -> Option<String> {
        self.files.lock().get(path.as_ref()).cloned()
    }

    /// Written paths, sorted
    pub fn paths(&self) -> Vec<PathBuf> {
        self.files.lock().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.files.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.lock().is_empty()
    }
}

impl OutputSink for MemoryWriter {
    fn write(&self, path: &Path, contents: &str) -> BuildResult<()> {
        self.files.lock().insert(path.to_path_buf(), contents.to_string());
        Ok(())
    }

    fn clean(&self, dir: &Path) -> BuildResult<()> {
        self.files.lock().retain(|path, _| !path.starts_with(dir));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_fs_writer_creates_parents_and_cleans() {
        let temp = TempDir::new().unwrap();
        let dist = temp.path().join("sugar-string");
        let file = dist.join("string/internal/pad.js");

        FsWriter.write(&file, "\"use strict\";").unwrap();
        assert_eq!(fs::read_to_string(&file).unwrap(), "\"use strict\";");

        FsWriter.clean(&dist).unwrap();
        assert!(!dist.exists());
        // Cleaning a missing directory is not an error.
        FsWriter.clean(&dist).unwrap();
    }

    #[test]
    fn test_memory_writer_clean_is_scoped() {
        let sink = MemoryWriter::new();
        sink.write(Path::new("out/a/index.js"), "a").unwrap();
        sink.write(Path::new("out/ab/index.js"), "b").unwrap();
        sink.clean(Path::new("out/a")).unwrap();

        assert_eq!(sink.paths(), vec![PathBuf::from("out/ab/index.js")]);
        assert_eq!(sink.get("out/ab/index.js").as_deref(), Some("b"));
    }
}
