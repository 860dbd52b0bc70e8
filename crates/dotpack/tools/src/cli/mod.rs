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

//! Subcommands of the `dotpack` binary

pub mod build;
pub mod graph;
pub mod list;

use tracing::Level;

/// Log level for the number of `-v` flags
pub fn log_level(verbose: u8) -> Level {
    match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// A two-module library with a core distribution and a string distribution
#[cfg(test)]
pub(crate) fn write_library(root: &std::path::Path) -> dotpack_compiler::BuildConfig {
    use std::fs;

    let lib = root.join("lib");
    fs::create_dir_all(&lib).unwrap();
    fs::write(lib.join("core.js"), "module.exports = Sugar;\n").unwrap();
    fs::write(lib.join("common.js"), "var sugarString = Sugar.String;\n\nfunction repeat(str, n) {\n  return new Array(n + 1).join(str);\n}\n").unwrap();
    fs::write(
        lib.join("string.js"),
        "/*** @namespace String ***/\n\ndefineInstance(sugarString, {\n\n  'repeat': function(str, n) {\n    return repeat(str, n);\n  }\n\n});\n",
    )
    .unwrap();

    let path = root.join("dotpack.toml");
    fs::write(
        &path,
        r#"
[project]
modules = ["common", "string"]
version = "1.0.0"

[[distributions]]
name = "sugar-core"
modules = ["core"]
description = "Core."

[[distributions]]
name = "sugar-string"
modules = ["core", "string"]
description = "String methods."
"#,
    )
    .unwrap();
    dotpack_compiler::BuildConfig::load_from_file(&path).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(0, Level::WARN ; "quiet")]
    #[test_case(1, Level::INFO ; "verbose")]
    #[test_case(2, Level::DEBUG ; "debug")]
    #[test_case(7, Level::TRACE ; "saturates at trace")]
    fn test_log_level(verbose: u8, expected: Level) {
        assert_eq!(log_level(verbose), expected);
    }
}
