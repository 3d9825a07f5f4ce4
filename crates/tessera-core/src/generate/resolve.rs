//! Output uniqueness and input resolution.

use std::collections::BTreeMap;

use rustc_hash::FxHashSet;

use crate::error::{Error, Result};
use crate::transpile::TranspiledCell;

/// Names the runtime's standard library provides to every cell.
pub const ENVIRONMENT_NAMES: &[&str] = &[
    "Arrow",
    "DOM",
    "DuckDBClient",
    "FileAttachment",
    "Files",
    "Generators",
    "Inputs",
    "L",
    "Mutable",
    "Plot",
    "Promises",
    "SQLite",
    "SQLiteDatabaseClient",
    "_",
    "aq",
    "d3",
    "display",
    "dot",
    "duckdb",
    "echarts",
    "htl",
    "html",
    "invalidation",
    "mapboxgl",
    "md",
    "mermaid",
    "now",
    "require",
    "resize",
    "svg",
    "tex",
    "topojson",
    "view",
    "visibility",
    "vl",
    "width",
];

/// Whether `name` is provided by the runtime environment.
pub fn is_environment_name(name: &str) -> bool {
    ENVIRONMENT_NAMES.binary_search(&name).is_ok()
}

/// Fail when two cells define the same output. Reports the first duplicated
/// name in document order with every cell defining it.
pub fn check_duplicate_outputs(cells: &[TranspiledCell]) -> Result<()> {
    let mut owners: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    let mut order: Vec<&str> = Vec::new();
    for cell in cells {
        for output in &cell.outputs {
            let entry = owners.entry(output.as_str()).or_default();
            if entry.is_empty() {
                order.push(output.as_str());
            }
            if !entry.contains(&cell.index) {
                entry.push(cell.index);
            }
        }
    }

    match order.into_iter().find(|name| owners[name].len() > 1) {
        Some(name) => Err(Error::DuplicateOutput {
            name: name.to_string(),
            cells: owners[name].clone(),
        }),
        None => Ok(()),
    }
}

/// Keep only inputs that name a cell output or an environment name.
/// Returns the names dropped per cell index.
pub fn resolve_inputs(cells: &mut [TranspiledCell]) -> BTreeMap<usize, Vec<String>> {
    let outputs: FxHashSet<String> = cells
        .iter()
        .flat_map(|cell| cell.outputs.iter().cloned())
        .collect();

    let mut dropped = BTreeMap::new();
    for cell in cells.iter_mut() {
        let (kept, unknown): (Vec<String>, Vec<String>) = cell
            .inputs
            .drain(..)
            .partition(|name| outputs.contains(name) || is_environment_name(name));
        cell.inputs = kept;
        if !unknown.is_empty() {
            tracing::warn!(
                "cell {}: unresolved names left to the global scope: {}",
                cell.index,
                unknown.join(", ")
            );
            dropped.insert(cell.index, unknown);
        }
    }
    dropped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transpile::CellShape;

    fn cell(index: usize, outputs: &[&str], inputs: &[&str]) -> TranspiledCell {
        TranspiledCell {
            index,
            outputs: outputs.iter().map(|s| s.to_string()).collect(),
            inputs: inputs.iter().map(|s| s.to_string()).collect(),
            body: String::new(),
            dependencies: Default::default(),
            dependency_specs: Default::default(),
            shape: CellShape::Single,
            is_async: false,
            is_generator: false,
        }
    }

    #[test]
    fn test_environment_names_sorted() {
        let mut sorted = ENVIRONMENT_NAMES.to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, ENVIRONMENT_NAMES);
        assert!(is_environment_name("Inputs"));
        assert!(!is_environment_name("counter"));
    }

    #[test]
    fn test_duplicate_outputs() {
        let cells = vec![
            cell(0, &["a"], &[]),
            cell(1, &["x"], &[]),
            cell(2, &["b"], &[]),
            cell(4, &["x"], &[]),
        ];
        match check_duplicate_outputs(&cells) {
            Err(Error::DuplicateOutput { name, cells }) => {
                assert_eq!(name, "x");
                assert_eq!(cells, vec![1, 4]);
            }
            other => panic!("expected duplicate output error, got {other:?}"),
        }
        assert!(check_duplicate_outputs(&cells[..3]).is_ok());
    }

    #[test]
    fn test_resolve_inputs() {
        let mut cells = vec![
            cell(0, &["a"], &["Inputs"]),
            cell(1, &["b"], &["a", "mystery", "width"]),
        ];
        let dropped = resolve_inputs(&mut cells);
        assert_eq!(cells[0].inputs, vec!["Inputs"]);
        assert_eq!(cells[1].inputs, vec!["a", "width"]);
        assert_eq!(dropped.get(&1), Some(&vec!["mystery".to_string()]));
    }
}
