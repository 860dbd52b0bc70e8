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

//! POSIX path arithmetic on package paths
//!
//! Package paths are relative, `/`-separated and extension-less. Everything
//! here is lexical; nothing touches the file system.

/// Directory part of a path, `.` when there is none
pub fn dirname(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) => "/",
        Some(idx) => &path[..idx],
        None => ".",
    }
}

/// Last segment of a path
pub fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Collapse `.` segments and `name/..` pairs. Leading `..` segments are kept.
pub fn normalize(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(&last) if last != ".." => {
                    segments.pop();
                }
                _ => segments.push(".."),
            },
            other => segments.push(other),
        }
    }
    if segments.is_empty() { ".".to_string() } else { segments.join("/") }
}

/// Join two paths and normalize the result
pub fn join(base: &str, path: &str) -> String {
    normalize(&format!("{base}/{path}"))
}

/// Path leading from directory `from` to directory `to`
pub fn relative(from: &str, to: &str) -> String {
    let from = normalize(from);
    let to = normalize(to);
    let from_segments: Vec<&str> = from.split('/').filter(|s| *s != ".").collect();
    let to_segments: Vec<&str> = to.split('/').filter(|s| *s != ".").collect();

    let common = from_segments.iter().zip(&to_segments).take_while(|(a, b)| a == b).count();
    let mut parts: Vec<&str> = vec![".."; from_segments.len() - common];
    parts.extend(&to_segments[common..]);
    if parts.is_empty() { ".".to_string() } else { parts.join("/") }
}

/// Module specifier importing the package at `to` from the package at
/// `from`. Always starts with `.`; a trailing `/index` is dropped.
pub fn require_path(from: &str, to: &str) -> String {
    let path = join(&relative(dirname(from), dirname(to)), basename(to));
    let path = if path.starts_with('.') { path } else { format!("./{path}") };
    match path.strip_suffix("/index") {
        Some(stripped) => stripped.to_string(),
        None => path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("string/pad", "string" ; "nested")]
    #[test_case("index", "." ; "top level")]
    #[test_case("../../../lib/core", "../../../lib" ; "parent segments")]
    fn test_dirname(path: &str, expected: &str) {
        assert_eq!(dirname(path), expected);
    }

    #[test_case("a/./b/../c", "a/c" ; "dot segments")]
    #[test_case("../../lib", "../../lib" ; "leading parents kept")]
    #[test_case("a/../..", ".." ; "climb above start")]
    #[test_case("./", "." ; "empty result")]
    fn test_normalize(path: &str, expected: &str) {
        assert_eq!(normalize(path), expected);
    }

    #[test_case("string", "string/internal", "internal" ; "child")]
    #[test_case("string/internal", "string", ".." ; "parent")]
    #[test_case("string", "common/vars", "../common/vars" ; "sibling")]
    #[test_case(".", "string", "string" ; "from root")]
    #[test_case("string", "string", "." ; "same directory")]
    #[test_case("string", "../../../lib", "../../../../lib" ; "outside the tree")]
    fn test_relative(from: &str, to: &str, expected: &str) {
        assert_eq!(relative(from, to), expected);
    }

    #[test_case("string/pad", "string/internal/padString", "./internal/padString" ; "method to internal")]
    #[test_case("string/internal/a", "string/pad", "../pad" ; "internal to method")]
    #[test_case("string/pad", "common/vars/sugarString", "../common/vars/sugarString" ; "across modules")]
    #[test_case("string/pad", "../../../lib/core", "../../../../lib/core" ; "core handle")]
    #[test_case("index", "string/index", "./string" ; "entry point index stripped")]
    #[test_case("string/index", "string/pad", "./pad" ; "module entry to method")]
    #[test_case("locales/index", "date/getAllLocales", "../date/getAllLocales" ; "locale index")]
    fn test_require_path(from: &str, to: &str, expected: &str) {
        assert_eq!(require_path(from, to), expected);
    }
}
