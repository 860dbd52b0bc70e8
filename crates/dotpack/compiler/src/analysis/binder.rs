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

//! Comment and namespace binding
//!
//! Comments are indexed by the line they end on. A comment carrying a
//! `@namespace` or `@package` tag opens a namespace range at that line; a
//! declaration belongs to the last range opened strictly above it.

use crate::package::PackageKind;
use crate::parser::Comment;
use regex::Regex;
use std::collections::BTreeMap;

/// Separator between method blocks inside one comment
const BLOCK_SEPARATOR: &str = "***";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceRange {
    pub name: String,
    pub line: usize,
}

#[derive(Debug)]
struct CommentPatterns {
    namespace_tag: Regex,
    method_set: Regex,
    set_trim: Regex,
    set_separator: Regex,
    method: Regex,
    leading_slashes: Regex,
    word_start: Regex,
    non_word: Regex,
}

impl CommentPatterns {
    fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            namespace_tag: Regex::new(r"@(?:namespace|package) (\w+)")?,
            method_set: Regex::new(r"@set([^@/]+)")?,
            set_trim: Regex::new(r"^[\s*]*|[\s*]*$")?,
            set_separator: Regex::new(r"[\s*]+")?,
            method: Regex::new(r"@method (\w+)")?,
            leading_slashes: Regex::new(r"^[\s/]+")?,
            word_start: Regex::new(r"\s(\w)")?,
            non_word: Regex::new(r"\W")?,
        })
    }
}

/// Associates declarations with their preceding comments and namespaces
#[derive(Debug)]
pub struct CommentBinder {
    by_end_line: BTreeMap<usize, Comment>,
    ranges: Vec<NamespaceRange>,
    patterns: CommentPatterns,
}

impl CommentBinder {
    pub fn new(comments: &[Comment]) -> Result<Self, regex::Error> {
        let patterns = CommentPatterns::new()?;
        let mut by_end_line = BTreeMap::new();
        let mut ranges = Vec::new();

        for comment in comments {
            let line = comment.span.end.line;
            // Both tags may appear in one comment; the last one wins.
            if let Some(name) = patterns.namespace_tag.captures_iter(&comment.text).last().map(|c| c[1].to_string()) {
                ranges.push(NamespaceRange { name, line });
            }
            by_end_line.insert(line, comment.clone());
        }

        Ok(Self {
            by_end_line,
            ranges,
            patterns,
        })
    }

    pub fn ranges(&self) -> &[NamespaceRange] {
        &self.ranges
    }

    /// Namespace of a declaration starting on `line`
    pub fn namespace_of(&self, line: usize) -> Option<&str> {
        self.ranges.iter().rev().find(|r| r.line < line).map(|r| r.name.as_str())
    }

    /// Nearest comment above `line`, scanning at most `limit` lines.
    /// Consecutive line comments are merged into `// text` lines; a block
    /// comment is returned with its delimiters.
    pub fn last_comment(&self, line: usize, limit: Option<usize>) -> Option<String> {
        let mut current = line;
        let mut count = 0;
        let mut found = None;
        while found.is_none() && current > 0 {
            current -= 1;
            found = self.by_end_line.get(&current);
            count += 1;
            if limit == Some(count) {
                break;
            }
        }
        let comment = found?;

        if comment.block {
            return Some(format!("/*{}*/", comment.text));
        }

        let mut lines = vec![comment.text.as_str()];
        while current > 1 {
            current -= 1;
            match self.by_end_line.get(&current) {
                Some(above) if !above.block => lines.insert(0, above.text.as_str()),
                Some(_) => {}
                None => break,
            }
        }
        Some(lines.iter().map(|l| format!("// {l}")).collect::<Vec<_>>().join("\n"))
    }

    /// Method names listed by `@set` or `@method` tags in the comment above
    /// `line`
    pub fn method_names_from_comment(&self, line: usize) -> Vec<String> {
        let Some(comment) = self.last_comment(line, None) else {
            return Vec::new();
        };
        let mut names = Vec::new();
        for block in comment.split(BLOCK_SEPARATOR) {
            if let Some(set) = self.patterns.method_set.captures(block) {
                let trimmed = self.patterns.set_trim.replace_all(&set[1], "");
                let joined = self.patterns.set_separator.replace_all(&trimmed, ",");
                names.extend(joined.split(',').map(str::to_string));
            } else if let Some(method) = self.patterns.method.captures(block) {
                names.push(method[1].to_string());
            }
        }
        names
    }

    /// Name of a bundle declared on `line`, derived from the comment above
    /// it. Without a comment the declared names are joined in camel case.
    pub fn bundle_name(&self, line: usize, kind: PackageKind, declared: &[&str]) -> String {
        let derived = self.last_comment(line, None).map(|comment| {
            let stripped = self.patterns.leading_slashes.replace(&comment, "");
            let cased = match kind {
                PackageKind::Constants => upper_first(&stripped),
                _ => stripped.to_lowercase(),
            };
            let camel = self.patterns.word_start.replace_all(&cased, |caps: &regex::Captures| caps[1].to_uppercase());
            self.patterns.non_word.replace_all(&camel, "").into_owned()
        });

        match derived {
            Some(name) if !name.is_empty() => name,
            _ => camel_join(declared),
        }
    }
}

fn upper_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn camel_join(names: &[&str]) -> String {
    names
        .iter()
        .enumerate()
        .map(|(i, name)| if i == 0 { name.to_string() } else { upper_first(name) })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    const SOURCE: &str = r#"
/***
 * @module String
 * @namespace String
 ***/

// Padding helpers
// used by pad methods
var padLeft, padRight;

/***
 * @method trim()
 ***
 * @set
 *   trimLeft
 *   trimRight
 ***/
defineInstanceSimilar(sugarString, 'x', fn);

/* @namespace Number */

var NUMBER_FORMATS, DIGITS;
"#;

    fn binder() -> CommentBinder {
        let program = parse(SOURCE).unwrap();
        CommentBinder::new(&program.comments).unwrap()
    }

    #[test]
    fn test_namespace_ranges() {
        let binder = binder();
        assert_eq!(binder.ranges().len(), 2);
        assert_eq!(binder.namespace_of(9), Some("String"));
        assert_eq!(binder.namespace_of(22), Some("Number"));
        assert_eq!(binder.namespace_of(1), None);
    }

    #[test]
    fn test_last_comment_merges_line_comments() {
        let binder = binder();
        assert_eq!(binder.last_comment(9, None).unwrap(), "//  Padding helpers\n//  used by pad methods");
    }

    #[test]
    fn test_last_comment_respects_limit() {
        let binder = binder();
        assert_eq!(binder.last_comment(22, Some(1)), None);
        assert!(binder.last_comment(22, Some(2)).unwrap().starts_with("/*"));
    }

    #[test]
    fn test_method_names_from_comment() {
        let binder = binder();
        assert_eq!(binder.method_names_from_comment(18), vec!["trim", "trimLeft", "trimRight"]);
    }

    #[test]
    fn test_bundle_names() {
        let binder = binder();
        assert_eq!(binder.bundle_name(9, PackageKind::Vars, &["padLeft", "padRight"]), "paddingHelpersUsedByPadMethods");
        assert_eq!(binder.bundle_name(22, PackageKind::Constants, &["NUMBER_FORMATS", "DIGITS"]), "namespaceNumber");
        assert_eq!(binder.bundle_name(1, PackageKind::Constants, &["A", "B"]), "AB");
        assert_eq!(binder.bundle_name(1, PackageKind::Vars, &["a", "b"]), "aB");
    }
}
