//! Build pipeline: notebook file in, library directory out.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::generate::{
    DEFAULT_SPECIFIER, GeneratedLibrary, generate_with_specifier, merge_manifest, render_json,
    render_readme,
};
use crate::notebook::{NotebookParser, RawCell};
use crate::transpile::{TranspiledCell, transpile};
use crate::workspace::{collect_workspace_packages, find_workspace_root};

/// Options for [`build`].
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Output directory. Defaults to the library name under `cwd`.
    pub out_dir: Option<PathBuf>,
    /// Library name, overriding the one inferred from the notebook title.
    pub library_name: Option<String>,
    /// Link dependencies to packages of the local workspace.
    pub link_workspace: bool,
    /// Workspace root, skipping discovery.
    pub workspace_root: Option<PathBuf>,
    /// Directory relative paths and workspace discovery start from.
    /// Defaults to the process working directory.
    pub cwd: Option<PathBuf>,
    /// Specifier for unpinned registry dependencies.
    pub default_specifier: String,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            out_dir: None,
            library_name: None,
            link_workspace: true,
            workspace_root: None,
            cwd: None,
            default_specifier: DEFAULT_SPECIFIER.to_string(),
        }
    }
}

/// Summary of a finished build.
#[derive(Debug)]
pub struct BuildReport {
    pub library_name: String,
    pub out_dir: PathBuf,
    pub cells_total: usize,
    pub cells_transpiled: usize,
    /// Per-cell errors; those cells were skipped.
    pub cell_errors: Vec<Error>,
    /// Final dependency specifiers of the generated manifest.
    pub dependencies: BTreeMap<String, String>,
    /// Whether an existing `package.json` was merged rather than replaced.
    pub manifest_merged: bool,
    /// Whether `README.md` was written (it never overwrites).
    pub readme_written: bool,
}

impl BuildReport {
    /// Whether every cell made it into the library.
    pub fn is_complete(&self) -> bool {
        self.cell_errors.is_empty()
    }
}

/// Transpile every cell, collecting per-cell errors instead of failing.
///
/// Errors that are not recoverable abort the whole run.
pub fn transpile_all(cells: &[RawCell]) -> Result<(Vec<TranspiledCell>, Vec<Error>)> {
    let mut transpiled = Vec::with_capacity(cells.len());
    let mut errors = Vec::new();
    for cell in cells {
        match transpile(cell) {
            Ok(cell) => transpiled.push(cell),
            Err(err) if err.is_recoverable() => {
                tracing::warn!("skipping cell {} ({}): {}", cell.index, cell.id, err);
                errors.push(err);
            }
            Err(err) => return Err(err),
        }
    }
    Ok((transpiled, errors))
}

/// Build the library for the notebook at `input`.
///
/// Nothing is written unless generation succeeds.
pub fn build(input: &Path, options: &BuildOptions) -> Result<BuildReport> {
    let cwd = match &options.cwd {
        Some(cwd) => cwd.clone(),
        None => std::env::current_dir()?,
    };
    let input = cwd.join(input);

    tracing::info!("building {}", input.display());
    let notebook = NotebookParser::new().parse_file(&input)?;
    let library_name = options
        .library_name
        .clone()
        .unwrap_or_else(|| notebook.library_name.clone());

    let (cells, cell_errors) = transpile_all(&notebook.cells)?;
    let cells_transpiled = cells.len();

    let workspace_packages = if options.link_workspace {
        options
            .workspace_root
            .clone()
            .or_else(|| find_workspace_root(&cwd))
            .map(|root| collect_workspace_packages(&root))
            .unwrap_or_default()
    } else {
        BTreeSet::new()
    };

    let library = generate_with_specifier(
        cells,
        &library_name,
        &workspace_packages,
        &options.default_specifier,
    )?;

    let out_dir = match &options.out_dir {
        Some(dir) => cwd.join(dir),
        None => cwd.join(&library_name),
    };
    let (manifest_merged, readme_written) = write_library(&library, &out_dir)?;

    tracing::info!(
        "generated {} ({} of {} cells) in {}",
        library_name,
        cells_transpiled,
        notebook.cells.len(),
        out_dir.display()
    );

    Ok(BuildReport {
        library_name,
        out_dir,
        cells_total: notebook.cells.len(),
        cells_transpiled,
        cell_errors,
        dependencies: library.manifest.dependencies.clone(),
        manifest_merged,
        readme_written,
    })
}

/// Write the artifacts of `library` under `out_dir`.
/// Returns whether the manifest was merged and whether the README was written.
fn write_library(library: &GeneratedLibrary, out_dir: &Path) -> Result<(bool, bool)> {
    let src_dir = out_dir.join("src");
    fs::create_dir_all(&src_dir)?;

    fs::write(src_dir.join("define.js"), &library.module_text)?;
    fs::write(src_dir.join("runtime.js"), &library.runtime_text)?;
    fs::write(src_dir.join("index.js"), &library.entry_text)?;

    let manifest_path = out_dir.join("package.json");
    let existing = read_json_if_exists(&manifest_path);
    let manifest_merged = existing.is_some();
    let package_name = match &existing {
        Some(existing) => {
            let merged = merge_manifest(existing, &library.manifest)?;
            fs::write(&manifest_path, render_json(&merged)?)?;
            merged
                .get("name")
                .and_then(|name| name.as_str())
                .unwrap_or(&library.manifest.name)
                .to_string()
        }
        None => {
            fs::write(&manifest_path, &library.manifest_text)?;
            library.manifest.name.clone()
        }
    };

    let readme_path = out_dir.join("README.md");
    let readme_written = !readme_path.exists();
    if readme_written {
        let readme = if package_name == library.manifest.name {
            library.readme_text.clone()
        } else {
            render_readme(&package_name, &library.module)
        };
        fs::write(&readme_path, readme)?;
    }

    Ok((manifest_merged, readme_written))
}

/// Existing JSON at `path`. Missing or unparsable files count as absent.
fn read_json_if_exists(path: &Path) -> Option<serde_json::Value> {
    let text = fs::read_to_string(path).ok()?;
    match serde_json::from_str(&text) {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::warn!("ignoring unparsable {}: {}", path.display(), err);
            None
        }
    }
}
