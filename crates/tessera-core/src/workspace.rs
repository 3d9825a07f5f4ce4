//! Local workspace discovery.
//!
//! A workspace is a directory holding `pnpm-workspace.yaml`; its packages
//! live under `packages/`. Notebooks importing one of those packages get a
//! `workspace:*` link instead of a registry version.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable overriding workspace root discovery.
pub const WORKSPACE_ROOT_ENV: &str = "TESSERA_WORKSPACE_ROOT";

/// File marking a workspace root.
pub const WORKSPACE_MARKER: &str = "pnpm-workspace.yaml";

/// How many directory levels below `packages/` are searched.
pub const PACKAGE_SEARCH_DEPTH: usize = 3;

const SKIPPED_DIRS: &[&str] = &["node_modules", "dist", "build", ".git"];

/// Find the workspace root.
///
/// Tries in order:
/// 1. `TESSERA_WORKSPACE_ROOT`, when it names an existing directory
/// 2. The closest ancestor of `start` (inclusive) holding `pnpm-workspace.yaml`
pub fn find_workspace_root(start: &Path) -> Option<PathBuf> {
    if let Ok(path) = std::env::var(WORKSPACE_ROOT_ENV) {
        let path = PathBuf::from(path);
        if path.is_dir() {
            return Some(path);
        }
        tracing::warn!(
            "{} is set to '{}', which is not a directory; ignoring it",
            WORKSPACE_ROOT_ENV,
            path.display()
        );
    }
    find_marked_ancestor(start)
}

fn find_marked_ancestor(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(WORKSPACE_MARKER).is_file())
        .map(Path::to_path_buf)
}

/// Names of the packages under `<root>/packages`.
///
/// Unreadable directories and manifests without a string `name` are skipped.
pub fn collect_workspace_packages(root: &Path) -> BTreeSet<String> {
    let mut names = BTreeSet::new();
    let packages_dir = root.join("packages");
    if packages_dir.is_dir() {
        walk(&packages_dir, PACKAGE_SEARCH_DEPTH, &mut names);
    }
    tracing::debug!(
        "found {} workspace packages under {}",
        names.len(),
        packages_dir.display()
    );
    names
}

fn walk(dir: &Path, depth: usize, names: &mut BTreeSet<String>) {
    if let Some(name) = read_package_name(&dir.join("package.json")) {
        names.insert(name);
    }
    if depth == 0 {
        return;
    }

    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    let mut children: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_ok_and(|t| t.is_dir()))
        .filter(|entry| {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            !name.starts_with('.') && !SKIPPED_DIRS.contains(&name.as_ref())
        })
        .map(|entry| entry.path())
        .collect();
    children.sort();

    for child in children {
        walk(&child, depth - 1, names);
    }
}

fn read_package_name(path: &Path) -> Option<String> {
    let text = fs::read_to_string(path).ok()?;
    let value: serde_json::Value = serde_json::from_str(&text).ok()?;
    value.get("name")?.as_str().map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_package(dir: &Path, name: &str) {
        fs::create_dir_all(dir).unwrap();
        fs::write(
            dir.join("package.json"),
            format!("{{\"name\": \"{name}\"}}"),
        )
        .unwrap();
    }

    #[test]
    fn test_find_marked_ancestor() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(WORKSPACE_MARKER), "packages:\n  - packages/*\n").unwrap();
        let nested = temp.path().join("notebooks/demo");
        fs::create_dir_all(&nested).unwrap();

        assert_eq!(find_marked_ancestor(&nested), Some(temp.path().to_path_buf()));
    }

    #[test]
    fn test_collect_workspace_packages() {
        let temp = TempDir::new().unwrap();
        let packages = temp.path().join("packages");
        write_package(&packages.join("my-lib"), "my-lib");
        write_package(&packages.join("notebooks/diff-demo"), "diff-demo");
        write_package(&packages.join("scope/nested/deep"), "@scope/deep");
        write_package(&packages.join("a/b/c/too-deep"), "too-deep");
        write_package(&packages.join("my-lib/node_modules/dep"), "dep");
        write_package(&packages.join(".cache/hidden"), "hidden");
        fs::create_dir_all(packages.join("broken")).unwrap();
        fs::write(packages.join("broken/package.json"), "{ not json").unwrap();

        let names = collect_workspace_packages(temp.path());
        let names: Vec<&str> = names.iter().map(String::as_str).collect();
        assert_eq!(names, vec!["@scope/deep", "diff-demo", "my-lib"]);
    }

    #[test]
    fn test_missing_packages_dir() {
        let temp = TempDir::new().unwrap();
        assert!(collect_workspace_packages(temp.path()).is_empty());
    }
}
