//! Core engine for turning Observable notebooks into JavaScript libraries.
//!
//! This crate provides:
//! - Notebook-kit HTML parsing into ordered raw cells
//! - Per-cell transpilation into procedures with explicit inputs
//! - Module, manifest and helper generation
//! - The build pipeline writing a library directory
//! - Local workspace package discovery

pub mod error;
pub mod generate;
pub mod notebook;
pub mod pipeline;
pub mod transpile;
pub mod workspace;

pub use error::{Error, Result};
pub use generate::{
    CellDefinition, CellMeta, DependencyGraph, DependencyManifest, GeneratedLibrary,
    ModuleDefinition, generate, generate_with_specifier, merge_manifest,
};
pub use notebook::{Language, NotebookParser, ParsedNotebook, RawCell, parse_notebook};
pub use pipeline::{BuildOptions, BuildReport, build, transpile_all};
pub use transpile::{CellShape, TranspiledCell, VIEW_PREFIX, parameter_name, transpile};
pub use workspace::{collect_workspace_packages, find_workspace_root};
