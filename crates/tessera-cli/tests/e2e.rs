//! End-to-end tests for Tessera CLI commands.
//!
//! These tests run the `tessera` binary against notebook files written to
//! temporary directories.

#![allow(deprecated)] // Allow deprecated Command::cargo_bin for tests

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

// =============================================================================
// Test Helpers
// =============================================================================

/// A temporary directory holding notebook files.
struct TestDir {
    temp_dir: TempDir,
}

impl TestDir {
    fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    fn write(&self, filename: &str, contents: &str) -> PathBuf {
        let path = self.path().join(filename);
        fs::write(&path, contents).expect("Failed to write notebook");
        path
    }

    fn tessera(&self) -> Command {
        let mut cmd = Command::cargo_bin("tessera").expect("Failed to find tessera binary");
        cmd.current_dir(self.path());
        cmd
    }
}

fn counter_notebook() -> &'static str {
    r#"<!doctype html>
<notebook>
  <title>Counter Demo</title>
  <script id="1" type="text/markdown">
    # Counter
  </script>
  <script id="2" type="module">
    viewof n = Inputs.range([0, 10], {step: 1})
  </script>
  <script id="3" type="module">
    doubled = n * 2
  </script>
  <script id="4" type="module">
    import * as d3 from "npm:d3@7";
  </script>
</notebook>
"#
}

fn duplicate_notebook() -> &'static str {
    r#"<notebook>
  <title>Dupes</title>
  <script type="module">x = 1</script>
  <script type="module">x = 2</script>
</notebook>
"#
}

fn other_notebook() -> &'static str {
    r#"<notebook>
  <title>Other Book</title>
  <script type="module">a = 1</script>
</notebook>
"#
}

// =============================================================================
// Help Tests
// =============================================================================

#[test]
fn test_help_lists_commands() {
    let dir = TestDir::new();
    dir.tessera()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("build"))
        .stdout(predicate::str::contains("plan"));
}

#[test]
fn test_build_requires_input() {
    let dir = TestDir::new();
    dir.tessera().arg("build").assert().failure();
}

// =============================================================================
// Build Tests
// =============================================================================

#[test]
fn test_build_generates_library() {
    let dir = TestDir::new();
    dir.write("counter.html", counter_notebook());

    dir.tessera()
        .args(["build", "counter.html", "--no-workspace"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Generated notebook library in"))
        .stdout(predicate::str::contains("counter-demo"));

    let out = dir.path().join("counter-demo");
    for file in ["src/define.js", "src/runtime.js", "src/index.js", "package.json", "README.md"] {
        assert!(out.join(file).is_file(), "missing {file}");
    }

    let define = fs::read_to_string(out.join("src/define.js")).unwrap();
    assert!(define.contains("observer(\"viewof n\")"));
    assert!(define.contains("define(\"doubled\", [\"n\"], function(n) {"));

    let manifest: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out.join("package.json")).unwrap()).unwrap();
    assert_eq!(manifest["dependencies"]["d3"], "7");
}

#[test]
fn test_build_with_out_dir() {
    let dir = TestDir::new();
    dir.write("counter.html", counter_notebook());

    dir.tessera()
        .args(["build", "counter.html", "--out", "dist/lib", "--no-workspace"])
        .assert()
        .success();

    assert!(dir.path().join("dist/lib/src/index.js").is_file());
}

#[test]
fn test_build_several_notebooks() {
    let dir = TestDir::new();
    dir.write("counter.html", counter_notebook());
    dir.write("other.html", other_notebook());

    dir.tessera()
        .args(["build", "counter.html", "other.html", "--out", "libs", "--no-workspace"])
        .assert()
        .success();

    assert!(dir.path().join("libs/counter-demo/src/define.js").is_file());
    assert!(dir.path().join("libs/other-book/src/define.js").is_file());
}

#[test]
fn test_build_missing_notebook() {
    let dir = TestDir::new();
    dir.tessera()
        .args(["build", "missing.html"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Notebook not found"));
}

#[test]
fn test_build_duplicate_outputs_fails() {
    let dir = TestDir::new();
    dir.write("dupes.html", duplicate_notebook());

    dir.tessera()
        .args(["build", "dupes.html", "--no-workspace"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("defined by more than one cell"))
        .stderr(predicate::str::contains("hint:"));

    assert!(!dir.path().join("dupes").exists());
}

#[test]
fn test_build_rejects_name_with_several_inputs() {
    let dir = TestDir::new();
    dir.write("counter.html", counter_notebook());
    dir.write("other.html", other_notebook());

    dir.tessera()
        .args(["build", "counter.html", "other.html", "--name", "lib"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--name"));
}

// =============================================================================
// Plan Tests
// =============================================================================

#[test]
fn test_plan_text() {
    let dir = TestDir::new();
    dir.write("counter.html", counter_notebook());

    dir.tessera()
        .args(["plan", "counter.html", "--target", "n", "--append-unmatched"])
        .assert()
        .success()
        .stdout(predicate::str::contains("viewof n"))
        .stdout(predicate::str::contains("[data-cell=\"n\"]"))
        .stdout(predicate::str::contains("suppressed"))
        .stdout(predicate::str::contains("appended #1"));
}

#[test]
fn test_plan_json() {
    let dir = TestDir::new();
    dir.write("counter.html", counter_notebook());

    let output = dir
        .tessera()
        .args(["plan", "counter.html", "--json"])
        .output()
        .expect("Failed to run tessera");
    assert!(output.status.success());

    let plan: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let entries = plan["entries"].as_array().unwrap();
    let outputs: Vec<&str> = entries
        .iter()
        .filter_map(|entry| entry["output"].as_str())
        .collect();
    assert_eq!(outputs, vec!["viewof n", "n", "doubled", "d3"]);
    assert!(
        entries
            .iter()
            .all(|entry| entry["placement"]["kind"] == "suppressed")
    );
}
