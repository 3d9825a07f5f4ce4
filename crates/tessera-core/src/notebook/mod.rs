//! Notebook document parsing.
//!
//! This module provides:
//! - Extraction of `<script>` cells from notebook-kit HTML
//! - Library name inference from the document `<title>`

mod parser;
mod types;

pub use parser::{NotebookParser, parse_library_name, parse_notebook, slugify};
pub use types::{DEFAULT_LIBRARY_NAME, Language, ParsedNotebook, RawCell};
