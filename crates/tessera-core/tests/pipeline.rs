//! Integration tests for the build pipeline.
//!
//! Tests the full path: notebook HTML on disk → library directory.

use std::fs;
use std::path::Path;

use tempfile::TempDir;
use tessera_core::{BuildOptions, Error, build};

// =============================================================================
// Test Helpers
// =============================================================================

fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp directory")
}

fn notebook(title: &str, cells: &[(&str, &str)]) -> String {
    let mut html = format!("<!doctype html>\n<notebook>\n  <title>{title}</title>\n");
    for (i, (attrs, source)) in cells.iter().enumerate() {
        html.push_str(&format!("  <script id=\"{}\" {attrs}>\n{source}\n  </script>\n", i + 1));
    }
    html.push_str("</notebook>\n");
    html
}

fn write_notebook(dir: &Path, name: &str, html: &str) {
    fs::write(dir.join(name), html).expect("Failed to write notebook");
}

fn options(dir: &Path) -> BuildOptions {
    BuildOptions {
        cwd: Some(dir.to_path_buf()),
        link_workspace: false,
        ..BuildOptions::default()
    }
}

fn read(path: impl AsRef<Path>) -> String {
    fs::read_to_string(path).expect("Failed to read artifact")
}

fn read_json(path: impl AsRef<Path>) -> serde_json::Value {
    serde_json::from_str(&read(path)).expect("Invalid JSON")
}

// =============================================================================
// Build Tests
// =============================================================================

#[test]
fn test_build_writes_all_artifacts() {
    let temp = temp_dir();
    let html = notebook(
        "Hello World",
        &[
            ("type=\"text/markdown\"", "# Hello"),
            ("type=\"module\"", "one = 1"),
            ("type=\"module\"", "two = one + 1"),
        ],
    );
    write_notebook(temp.path(), "hello.html", &html);

    let report = build(Path::new("hello.html"), &options(temp.path())).unwrap();
    assert_eq!(report.library_name, "hello-world");
    assert_eq!(report.out_dir, temp.path().join("hello-world"));
    assert_eq!(report.cells_total, 3);
    assert_eq!(report.cells_transpiled, 3);
    assert!(report.is_complete());
    assert!(report.readme_written);
    assert!(!report.manifest_merged);

    let out = &report.out_dir;
    for file in ["src/define.js", "src/runtime.js", "src/index.js", "package.json", "README.md"] {
        assert!(out.join(file).is_file(), "missing {file}");
    }

    let define = read(out.join("src/define.js"));
    assert!(define.contains("main.variable(observer(\"one\")).define(\"one\", [], function() {\nreturn (\n1\n);\n});"));
    assert!(define.contains("main.variable(observer(\"two\")).define(\"two\", [\"one\"], function(one) {"));
    assert!(define.contains("main.variable(observer()).define([\"md\"], function(md) {"));

    let manifest = read_json(out.join("package.json"));
    assert_eq!(manifest["name"], "hello-world");
    assert_eq!(manifest["type"], "module");
    assert_eq!(manifest["main"], "src/index.js");
    assert_eq!(manifest["dependencies"]["@observablehq/runtime"], "^6.0.0");
}

#[test]
fn test_build_binds_view_references_across_cells() {
    let temp = temp_dir();
    let html = notebook(
        "Views",
        &[
            ("type=\"module\"", "viewof counter = Inputs.range([0, 10])"),
            ("type=\"module\"", "x = Generators.input(viewof counter)"),
        ],
    );
    write_notebook(temp.path(), "views.html", &html);

    let report = build(Path::new("views.html"), &options(temp.path())).unwrap();
    let define = read(report.out_dir.join("src/define.js"));
    assert!(define.contains(
        "main.variable(observer(\"x\")).define(\"x\", [\"Generators\", \"viewof counter\"], \
         function(Generators, $viewof$counter) {\nreturn (\nGenerators.input($viewof$counter)\n);\n});"
    ));
    assert!(!define.contains("(viewof counter)"));
}

#[test]
fn test_build_emits_async_generator_for_await_loop() {
    let temp = temp_dir();
    let html = notebook(
        "Streams",
        &[
            ("type=\"module\"", "stream = [1, 2, 3]"),
            (
                "type=\"module\"",
                "s = {\nfor await (const chunk of stream) yield chunk;\n}",
            ),
        ],
    );
    write_notebook(temp.path(), "streams.html", &html);

    let report = build(Path::new("streams.html"), &options(temp.path())).unwrap();
    let define = read(report.out_dir.join("src/define.js"));
    assert!(define.contains(
        "main.variable(observer(\"s\")).define(\"s\", [\"stream\"], \
         async function*(stream) {\nfor await (const chunk of stream) yield chunk;\n});"
    ));
}

#[test]
fn test_build_is_deterministic() {
    let temp = temp_dir();
    let html = notebook(
        "Deterministic",
        &[
            ("type=\"module\"", "import * as d3 from \"npm:d3@7\";"),
            ("type=\"module\"", "viewof n = Inputs.range([0, 10])"),
            ("type=\"module\"", "const a = n * 2;\nconst b = d3.max([a, 1]);"),
            ("type=\"text/markdown\"", "Value: ${b}"),
        ],
    );
    write_notebook(temp.path(), "nb.html", &html);

    let first = BuildOptions {
        out_dir: Some("first".into()),
        ..options(temp.path())
    };
    let second = BuildOptions {
        out_dir: Some("second".into()),
        ..options(temp.path())
    };
    build(Path::new("nb.html"), &first).unwrap();
    build(Path::new("nb.html"), &second).unwrap();

    for file in ["src/define.js", "src/runtime.js", "src/index.js", "package.json", "README.md"] {
        assert_eq!(
            read(temp.path().join("first").join(file)),
            read(temp.path().join("second").join(file)),
            "{file} differs"
        );
    }
}

#[test]
fn test_duplicate_outputs_write_nothing() {
    let temp = temp_dir();
    let html = notebook(
        "Dupes",
        &[("type=\"module\"", "x = 1"), ("type=\"module\"", "x = 2")],
    );
    write_notebook(temp.path(), "dupes.html", &html);

    let err = build(Path::new("dupes.html"), &options(temp.path())).unwrap_err();
    match err {
        Error::DuplicateOutput { name, cells } => {
            assert_eq!(name, "x");
            assert_eq!(cells, vec![0, 1]);
        }
        other => panic!("expected duplicate output, got {other:?}"),
    }
    assert!(!temp.path().join("dupes").exists());
}

#[test]
fn test_unsupported_cells_are_skipped() {
    let temp = temp_dir();
    let html = notebook(
        "Mixed",
        &[
            ("type=\"module\"", "a = 1"),
            ("type=\"application/sql\"", "select 1"),
        ],
    );
    write_notebook(temp.path(), "mixed.html", &html);

    let report = build(Path::new("mixed.html"), &options(temp.path())).unwrap();
    assert_eq!(report.cells_total, 2);
    assert_eq!(report.cells_transpiled, 1);
    assert_eq!(report.cell_errors.len(), 1);
    assert!(!report.is_complete());
    assert!(report.out_dir.join("src/define.js").is_file());
}

#[test]
fn test_malformed_document() {
    let temp = temp_dir();
    write_notebook(temp.path(), "plain.html", "<html><body>nothing here</body></html>");

    let err = build(Path::new("plain.html"), &options(temp.path())).unwrap_err();
    assert!(matches!(err, Error::MalformedDocument(_)));
}

#[test]
fn test_missing_input_is_io_error() {
    let temp = temp_dir();
    let err = build(Path::new("absent.html"), &options(temp.path())).unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}

// =============================================================================
// Existing Project Tests
// =============================================================================

#[test]
fn test_manifest_merge_with_workspace_link() {
    let temp = temp_dir();

    let workspace = temp.path().join("ws");
    fs::create_dir_all(workspace.join("packages/my-lib")).unwrap();
    fs::write(workspace.join("pnpm-workspace.yaml"), "packages:\n  - packages/*\n").unwrap();
    fs::write(
        workspace.join("packages/my-lib/package.json"),
        r#"{"name": "my-lib", "version": "1.0.0"}"#,
    )
    .unwrap();

    let out = temp.path().join("lib");
    fs::create_dir_all(&out).unwrap();
    fs::write(
        out.join("package.json"),
        r#"{
  "name": "custom-name",
  "scripts": {"dev": "vite"},
  "dependencies": {"my-lib": "^1.0.0", "lodash": "4.17.21"},
  "license": "MIT"
}"#,
    )
    .unwrap();

    let html = notebook(
        "Linked",
        &[
            ("type=\"module\"", "import {helper} from \"my-lib\";"),
            ("type=\"module\"", "import _ from \"npm:lodash\";"),
            ("type=\"module\"", "result = helper(_)"),
        ],
    );
    write_notebook(temp.path(), "linked.html", &html);

    let build_options = BuildOptions {
        out_dir: Some("lib".into()),
        link_workspace: true,
        workspace_root: Some(workspace),
        ..options(temp.path())
    };
    let report = build(Path::new("linked.html"), &build_options).unwrap();
    assert!(report.manifest_merged);
    assert_eq!(report.dependencies["my-lib"], "workspace:*");

    let manifest = read_json(out.join("package.json"));
    assert_eq!(manifest["name"], "custom-name");
    assert_eq!(manifest["scripts"]["dev"], "vite");
    assert_eq!(manifest["license"], "MIT");
    assert_eq!(manifest["dependencies"]["my-lib"], "workspace:*");
    assert_eq!(manifest["dependencies"]["lodash"], "4.17.21");
    assert_eq!(manifest["dependencies"]["@observablehq/inspector"], "^5.0.1");

    let readme = read(out.join("README.md"));
    assert!(readme.starts_with("# custom-name\n"));
}

#[test]
fn test_existing_readme_is_kept() {
    let temp = temp_dir();
    let out = temp.path().join("kept");
    fs::create_dir_all(&out).unwrap();
    fs::write(out.join("README.md"), "my own notes\n").unwrap();

    let html = notebook("Kept", &[("type=\"module\"", "a = 1")]);
    write_notebook(temp.path(), "kept.html", &html);

    let report = build(Path::new("kept.html"), &options(temp.path())).unwrap();
    assert!(!report.readme_written);
    assert_eq!(read(out.join("README.md")), "my own notes\n");
}

#[test]
fn test_unparsable_manifest_is_replaced() {
    let temp = temp_dir();
    let out = temp.path().join("broken");
    fs::create_dir_all(&out).unwrap();
    fs::write(out.join("package.json"), "{ not json").unwrap();

    let html = notebook("Broken", &[("type=\"module\"", "a = 1")]);
    write_notebook(temp.path(), "broken.html", &html);

    let report = build(Path::new("broken.html"), &options(temp.path())).unwrap();
    assert!(!report.manifest_merged);
    assert_eq!(read_json(out.join("package.json"))["name"], "broken");
}
