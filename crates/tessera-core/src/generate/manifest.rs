//! `package.json` generation and merging.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;
use crate::transpile::TranspiledCell;

/// Packages every generated library needs at run time.
pub const RUNTIME_PACKAGES: &[(&str, &str)] = &[
    ("@observablehq/inputs", "^0.12.0"),
    ("@observablehq/inspector", "^5.0.1"),
    ("@observablehq/runtime", "^6.0.0"),
    ("@observablehq/stdlib", "^5.8.8"),
];

/// Specifier linking a dependency to a package of the local workspace.
pub const WORKSPACE_SPECIFIER: &str = "workspace:*";

/// Specifier for dependencies without a pinned version.
pub const DEFAULT_SPECIFIER: &str = "latest";

/// Entry point recorded in generated manifests.
pub const MAIN_ENTRY: &str = "src/index.js";

/// The generated package manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyManifest {
    pub name: String,
    pub version: String,
    #[serde(rename = "type")]
    pub module_type: String,
    pub main: String,
    pub dependencies: BTreeMap<String, String>,
}

impl DependencyManifest {
    /// A fresh manifest for `name` with the given dependency specifiers.
    pub fn new(name: &str, dependencies: BTreeMap<String, String>) -> Self {
        Self {
            name: name.to_string(),
            version: "0.1.0".to_string(),
            module_type: "module".to_string(),
            main: MAIN_ENTRY.to_string(),
            dependencies,
        }
    }

    /// Pretty JSON with a trailing newline.
    pub fn render(&self) -> Result<String> {
        let mut text = serde_json::to_string_pretty(self)?;
        text.push('\n');
        Ok(text)
    }
}

/// Compute the dependency specifiers of a library.
///
/// Explicit versions win (the last cell in document order on conflict);
/// unpinned packages found in `workspace_packages` link to the workspace;
/// everything else gets `default_specifier`.
pub fn collect_dependencies(
    cells: &[TranspiledCell],
    workspace_packages: &BTreeSet<String>,
    default_specifier: &str,
) -> BTreeMap<String, String> {
    let mut ordered: Vec<&TranspiledCell> = cells.iter().collect();
    ordered.sort_by_key(|cell| cell.index);

    let mut names: BTreeSet<&str> = BTreeSet::new();
    let mut pinned: BTreeMap<&str, (&str, usize)> = BTreeMap::new();
    for cell in ordered {
        names.extend(cell.dependencies.iter().map(String::as_str));
        for (package, version) in &cell.dependency_specs {
            if let Some((previous, owner)) = pinned.get(package.as_str())
                && *previous != version.as_str()
            {
                tracing::warn!(
                    "package '{}' is pinned to '{}' by cell {} and '{}' by cell {}; using '{}'",
                    package,
                    previous,
                    owner,
                    version,
                    cell.index,
                    version
                );
            }
            pinned.insert(package.as_str(), (version.as_str(), cell.index));
        }
    }

    let mut dependencies: BTreeMap<String, String> = RUNTIME_PACKAGES
        .iter()
        .map(|(name, spec)| (name.to_string(), spec.to_string()))
        .collect();

    for name in names {
        let specifier = if let Some((version, _)) = pinned.get(name) {
            version.to_string()
        } else if workspace_packages.contains(name) {
            tracing::debug!("linking '{}' to the local workspace", name);
            WORKSPACE_SPECIFIER.to_string()
        } else if let Some(runtime) = dependencies.get(name) {
            runtime.clone()
        } else {
            default_specifier.to_string()
        };
        dependencies.insert(name.to_string(), specifier);
    }
    dependencies
}

/// Merge a generated manifest into an existing one.
///
/// Unknown fields keep their values and position. `type` and `main` are only
/// filled in when absent. Existing dependency specifiers are kept, except that
/// a generated workspace link always replaces them; new dependencies are added.
/// An existing value that is not a JSON object is replaced wholesale.
pub fn merge_manifest(existing: &Value, generated: &DependencyManifest) -> Result<Value> {
    let Value::Object(existing) = existing else {
        tracing::warn!("existing package.json is not an object; replacing it");
        return Ok(serde_json::to_value(generated)?);
    };

    let mut merged: Map<String, Value> = existing.clone();
    merged
        .entry("type")
        .or_insert_with(|| Value::String(generated.module_type.clone()));
    merged
        .entry("main")
        .or_insert_with(|| Value::String(generated.main.clone()));

    let mut dependencies = match existing.get("dependencies") {
        Some(Value::Object(deps)) => deps.clone(),
        _ => Map::new(),
    };
    for (name, specifier) in &generated.dependencies {
        let link = specifier.starts_with("workspace:");
        if link || !dependencies.contains_key(name) {
            dependencies.insert(name.clone(), Value::String(specifier.clone()));
        }
    }
    merged.insert("dependencies".to_string(), Value::Object(dependencies));

    Ok(Value::Object(merged))
}

/// Pretty JSON with a trailing newline.
pub fn render_json(value: &Value) -> Result<String> {
    let mut text = serde_json::to_string_pretty(value)?;
    text.push('\n');
    Ok(text)
}
