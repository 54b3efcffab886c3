//! Feature discovery from a project manifest
//!
//! The feature list normally comes straight from the target project's
//! Cargo.toml: explicit `[features]` entries plus the implicit features
//! of optional dependencies.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::common::{Error, Result};

/// Features whose name starts with this prefix are private by convention
/// and excluded from discovery unless asked for.
const HIDDEN_PREFIX: char = '_';

/// Resolve the manifest path: the explicit flag, or `./Cargo.toml`.
pub fn resolve_manifest_path(manifest_path: Option<PathBuf>) -> PathBuf {
    manifest_path.unwrap_or_else(|| PathBuf::from("Cargo.toml"))
}

/// Discover the feature list of the project at `manifest_path`.
///
/// Returns the `[features]` keys (minus `default`) and the implicit
/// features of optional dependencies, sorted for determinism. Hidden
/// (`_`-prefixed) features are dropped unless `include_hidden` is set.
pub fn discover_features(manifest_path: &Path, include_hidden: bool) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(manifest_path).map_err(|e| Error::ManifestRead {
        path: manifest_path.display().to_string(),
        error: e.to_string(),
    })?;

    let manifest: toml::Table = content.parse().map_err(|e: toml::de::Error| {
        Error::ManifestParse {
            path: manifest_path.display().to_string(),
            error: e.to_string(),
        }
    })?;

    let features = features_from_manifest(&manifest, include_hidden);
    tracing::debug!(path = %manifest_path.display(), count = features.len(), "discovered features");
    Ok(features)
}

fn features_from_manifest(manifest: &toml::Table, include_hidden: bool) -> Vec<String> {
    let mut features = Vec::new();

    // Feature values that name a dependency as "dep:<name>" suppress the
    // dependency's implicit feature.
    let mut dep_prefixed = HashSet::new();

    if let Some(table) = manifest.get("features").and_then(|v| v.as_table()) {
        for (name, value) in table {
            if name != "default" {
                features.push(name.clone());
            }
            if let Some(entries) = value.as_array() {
                for entry in entries.iter().filter_map(|v| v.as_str()) {
                    if let Some(dep) = entry.strip_prefix("dep:") {
                        dep_prefixed.insert(dep.to_string());
                    }
                }
            }
        }
    }

    for section in ["dependencies", "build-dependencies"] {
        let Some(table) = manifest.get(section).and_then(|v| v.as_table()) else {
            continue;
        };
        for (name, value) in table {
            let optional = value
                .as_table()
                .and_then(|t| t.get("optional"))
                .and_then(|v| v.as_bool())
                .unwrap_or(false);
            if optional && !dep_prefixed.contains(name) {
                features.push(name.clone());
            }
        }
    }

    if !include_hidden {
        features.retain(|f| !f.starts_with(HIDDEN_PREFIX));
    }
    features.sort();
    features.dedup();
    features
}
