//! Library generation.
//!
//! This module provides:
//! - Duplicate output detection and input resolution
//! - A petgraph dependency graph for cycle diagnostics
//! - `define.js`, `runtime.js`, `index.js`, `package.json` and README text
//! - Merging of a generated manifest into an existing one

mod graph;
mod manifest;
mod module;
mod resolve;
mod templates;

use std::collections::BTreeSet;

pub use graph::DependencyGraph;
pub use manifest::{
    DEFAULT_SPECIFIER, DependencyManifest, MAIN_ENTRY, RUNTIME_PACKAGES, WORKSPACE_SPECIFIER,
    collect_dependencies, merge_manifest, render_json,
};
pub use module::{CellDefinition, CellMeta, ModuleDefinition, hidden_name};
pub use resolve::{ENVIRONMENT_NAMES, check_duplicate_outputs, is_environment_name, resolve_inputs};
pub use templates::{render_entry, render_readme, render_runtime};

use crate::error::Result;
use crate::transpile::TranspiledCell;

/// Every artifact generated for one notebook, as data and as text.
#[derive(Debug, Clone)]
pub struct GeneratedLibrary {
    pub module: ModuleDefinition,
    /// `src/define.js`
    pub module_text: String,
    /// `src/index.js`
    pub entry_text: String,
    /// `src/runtime.js`
    pub runtime_text: String,
    pub manifest: DependencyManifest,
    /// Fresh `package.json` text, before any merge.
    pub manifest_text: String,
    pub readme_text: String,
}

/// Generate a library from transpiled cells, using `latest` for unpinned
/// packages.
pub fn generate(
    cells: Vec<TranspiledCell>,
    library_name: &str,
    workspace_packages: &BTreeSet<String>,
) -> Result<GeneratedLibrary> {
    generate_with_specifier(cells, library_name, workspace_packages, DEFAULT_SPECIFIER)
}

/// Generate a library from transpiled cells.
pub fn generate_with_specifier(
    mut cells: Vec<TranspiledCell>,
    library_name: &str,
    workspace_packages: &BTreeSet<String>,
    default_specifier: &str,
) -> Result<GeneratedLibrary> {
    cells.sort_by_key(|cell| cell.index);
    check_duplicate_outputs(&cells)?;

    let dropped = resolve_inputs(&mut cells);
    tracing::debug!("{} cells with unresolved names", dropped.len());

    let graph = DependencyGraph::build(&cells);
    graph.warn_cycles();
    for cell in &cells {
        tracing::debug!(
            "cell {}: outputs [{}], inputs [{}], dependents {:?}",
            cell.index,
            cell.outputs.join(", "),
            cell.inputs.join(", "),
            graph.dependents(cell.index)
        );
    }

    let dependencies = collect_dependencies(&cells, workspace_packages, default_specifier);
    let manifest = DependencyManifest::new(library_name, dependencies);
    let module = ModuleDefinition::from_cells(library_name, &cells);

    Ok(GeneratedLibrary {
        module_text: module.render(),
        entry_text: render_entry(),
        runtime_text: render_runtime(),
        manifest_text: manifest.render()?,
        readme_text: render_readme(library_name, &module),
        manifest,
        module,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::notebook::{Language, RawCell};
    use crate::transpile::transpile;

    fn script(index: usize, source: &str) -> TranspiledCell {
        let raw = RawCell {
            id: format!("cell-{index}"),
            index,
            language: Language::Script,
            source: source.to_string(),
            declared_names: vec![],
            is_view_cell: source.starts_with("viewof"),
        };
        transpile(&raw).unwrap()
    }

    #[test]
    fn test_generate_is_deterministic() {
        let cells = || {
            vec![
                script(0, "a = 1"),
                script(1, "b = a + 1"),
                script(2, "import * as d3 from \"npm:d3@7\";"),
            ]
        };
        let first = generate(cells(), "demo", &BTreeSet::new()).unwrap();
        let second = generate(cells(), "demo", &BTreeSet::new()).unwrap();
        assert_eq!(first.module_text, second.module_text);
        assert_eq!(first.manifest_text, second.manifest_text);
        assert_eq!(first.manifest.dependencies["d3"], "7");
    }

    #[test]
    fn test_generate_rejects_duplicates() {
        let cells = vec![script(0, "x = 1"), script(1, "x = 2")];
        let err = generate(cells, "demo", &BTreeSet::new()).unwrap_err();
        assert!(matches!(err, Error::DuplicateOutput { .. }));
    }

    #[test]
    fn test_generate_keeps_document_order() {
        let cells = vec![script(1, "b = a"), script(0, "a = 1")];
        let library = generate(cells, "demo", &BTreeSet::new()).unwrap();
        let indices: Vec<usize> = library.module.cells.iter().map(|c| c.index).collect();
        assert_eq!(indices, vec![0, 1]);
        assert_eq!(library.module.cells[1].inputs, vec!["a"]);
    }
}
