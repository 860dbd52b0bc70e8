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

//! List command: prints the configured distributions

use dotpack_compiler::{BuildConfig, Distribution};

/// One line describing a distribution
pub fn describe(config: &BuildConfig, dist: &Distribution) -> String {
    let mut modules = dist.modules.join(", ");
    if !dist.extra.is_empty() {
        modules = format!("{modules} (+ {})", dist.extra.join(", "));
    }
    let mut line = format!("{:<24} {modules}", dist.name);
    if config.is_core_only(dist) {
        line.push_str(" [core]");
    }
    if dist.locales {
        line.push_str(" [locales]");
    }
    if !dist.description.is_empty() {
        line.push_str(&format!("  {}", dist.description));
    }
    line
}

/// Execute the list command
pub fn run_list(config: &BuildConfig) -> Vec<String> {
    let lines: Vec<String> = config.distributions.iter().map(|dist| describe(config, dist)).collect();
    if lines.is_empty() {
        println!("No distributions configured");
    }
    for line in &lines {
        println!("{line}");
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn dist(modules: &[&str], extra: &[&str], locales: bool) -> Distribution {
        Distribution {
            name: "sugar".to_string(),
            modules: modules.iter().map(|m| m.to_string()).collect(),
            extra: extra.iter().map(|m| m.to_string()).collect(),
            locales,
            description: String::new(),
        }
    }

    #[test_case(&["core"], &[], false, "sugar                    core [core]" ; "core only")]
    #[test_case(&["core", "date"], &[], true, "sugar                    core, date [locales]" ; "with locales")]
    #[test_case(&["core", "string"], &["es6"], false, "sugar                    core, string (+ es6)" ; "with extra modules")]
    fn test_describe(modules: &[&str], extra: &[&str], locales: bool, expected: &str) {
        let config = BuildConfig::default();
        assert_eq!(describe(&config, &dist(modules, extra, locales)), expected);
    }

    #[test]
    fn test_list_configured() {
        let temp = tempfile::TempDir::new().unwrap();
        let config = crate::cli::write_library(temp.path());
        let lines = run_list(&config);
        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with("sugar-string"));
        assert!(lines[1].ends_with("String methods."));
    }
}
