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

//! `package.json` generation

use crate::config::{BuildConfig, Distribution};
use crate::error::{BuildError, BuildResult};
use serde_json::{Map, Value, json};
use std::fs;

/// Fields of the base manifest that only concern the source repository
const BUILD_ONLY_FIELDS: [&str; 4] = ["main", "files", "scripts", "devDependencies"];

/// Load the configured base manifest, or an empty one
pub fn load_base_manifest(config: &BuildConfig) -> BuildResult<Value> {
    let Some(base) = &config.manifest.base else {
        return Ok(Value::Object(Map::new()));
    };
    let path = config.resolve_path(base);
    let content = fs::read_to_string(&path).map_err(|e| BuildError::io(&path, e))?;
    let value: Value = serde_json::from_str(&content)?;
    if !value.is_object() {
        return Err(BuildError::Config(format!("base manifest {} is not a JSON object", path.display())));
    }
    Ok(value)
}

/// Manifest of one distribution, pretty-printed
pub fn render_manifest(config: &BuildConfig, dist: &Distribution, base: &Value) -> BuildResult<String> {
    let mut manifest = match base {
        Value::Object(map) => map.clone(),
        _ => Map::new(),
    };
    let version = config.project.version.clone();

    manifest.insert("name".to_string(), json!(dist.name));
    manifest.insert("version".to_string(), json!(version));

    let description = match manifest.get("description").and_then(Value::as_str) {
        Some(base) if !base.is_empty() => format!("{base} {}", dist.description),
        _ => dist.description.clone(),
    };
    manifest.insert("description".to_string(), json!(description));

    if !dist.locales {
        if let Some(Value::Array(keywords)) = manifest.get_mut("keywords") {
            keywords.retain(|k| !k.as_str().is_some_and(|k| config.manifest.locale_keywords.iter().any(|l| l == k)));
        }
    }
    for field in BUILD_ONLY_FIELDS {
        manifest.remove(field);
    }

    if dist.name != config.manifest.core_package {
        let mut dependencies = Map::new();
        dependencies.insert(config.manifest.core_package.clone(), json!(format!("^{version}")));
        manifest.insert("dependencies".to_string(), Value::Object(dependencies));
    }

    Ok(serde_json::to_string_pretty(&Value::Object(manifest))?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Value {
        json!({
            "name": "sugar",
            "version": "0.0.1",
            "description": "A Javascript utility library.",
            "keywords": ["utility", "date", "time"],
            "main": "index.js",
            "scripts": { "test": "node test" },
            "devDependencies": { "gulp": "^3.0.0" },
            "license": "MIT"
        })
    }

    fn config() -> BuildConfig {
        let mut config = BuildConfig::default();
        config.project.version = "2.0.0".to_string();
        config
    }

    fn dist(name: &str, locales: bool) -> Distribution {
        Distribution {
            name: name.to_string(),
            modules: vec!["string".to_string()],
            description: "String methods.".to_string(),
            locales,
            ..Default::default()
        }
    }

    #[test]
    fn test_manifest_fields() {
        let rendered = render_manifest(&config(), &dist("sugar-string", false), &base()).unwrap();
        let manifest: Value = serde_json::from_str(&rendered).unwrap();

        assert_eq!(manifest["name"], "sugar-string");
        assert_eq!(manifest["version"], "2.0.0");
        assert_eq!(manifest["description"], "A Javascript utility library. String methods.");
        assert_eq!(manifest["keywords"], json!(["utility"]));
        assert_eq!(manifest["dependencies"], json!({ "sugar-core": "^2.0.0" }));
        assert_eq!(manifest["license"], "MIT");
        for field in BUILD_ONLY_FIELDS {
            assert!(manifest.get(field).is_none(), "{field} should be removed");
        }
        assert!(rendered.starts_with("{\n  \"name\""));
    }

    #[test]
    fn test_locale_distribution_keeps_keywords() {
        let rendered = render_manifest(&config(), &dist("sugar-date", true), &base()).unwrap();
        let manifest: Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(manifest["keywords"], json!(["utility", "date", "time"]));
    }

    #[test]
    fn test_core_has_no_dependencies() {
        let rendered = render_manifest(&config(), &dist("sugar-core", false), &Value::Object(Map::new())).unwrap();
        let manifest: Value = serde_json::from_str(&rendered).unwrap();
        assert!(manifest.get("dependencies").is_none());
        assert_eq!(manifest["description"], "String methods.");
    }
}
