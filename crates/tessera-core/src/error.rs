//! Error types for tessera-core.

use thiserror::Error;

/// Result type for tessera-core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while turning a notebook into a library.
#[derive(Debug, Error)]
pub enum Error {
    /// The document is not a notebook (no `<notebook>` container, broken markup).
    #[error("malformed notebook document: {0}")]
    MalformedDocument(String),

    /// A cell uses a sub-language with no transpiler.
    #[error("cell {index}: unsupported language '{language}'")]
    UnsupportedLanguage { index: usize, language: String },

    /// A cell's source could not be tokenized.
    #[error("cell {index}: syntax error: {message}")]
    Syntax { index: usize, message: String },

    /// Two cells define the same output name.
    #[error("output '{name}' is defined by more than one cell (cells {})", join_indices(.cells))]
    DuplicateOutput { name: String, cells: Vec<usize> },

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn join_indices(cells: &[usize]) -> String {
    cells
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl Error {
    /// Per-cell errors skip that cell; everything else aborts the build.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::UnsupportedLanguage { .. } | Error::Syntax { .. })
    }

    /// Index of the cell the error belongs to, if any.
    pub fn cell_index(&self) -> Option<usize> {
        match self {
            Error::UnsupportedLanguage { index, .. } | Error::Syntax { index, .. } => Some(*index),
            _ => None,
        }
    }

    /// Render the error together with a short recovery hint.
    pub fn with_hint(&self) -> String {
        let hint = match self {
            Error::MalformedDocument(_) => {
                "the input must be a notebook-kit HTML file with a <notebook> element"
            }
            Error::UnsupportedLanguage { .. } => {
                "the cell was skipped; use a JavaScript, Markdown, HTML or TeX cell"
            }
            Error::Syntax { .. } => "the cell was skipped; check for unterminated strings or comments",
            Error::DuplicateOutput { .. } => "rename one of the cells so every output name is unique",
            Error::Json(_) => "check that the existing package.json is valid JSON",
            Error::Io(_) => "check that the paths exist and are writable",
        };
        format!("{self}\n  hint: {hint}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_output_names_cells() {
        let err = Error::DuplicateOutput {
            name: "x".to_string(),
            cells: vec![1, 4],
        };
        assert_eq!(
            err.to_string(),
            "output 'x' is defined by more than one cell (cells 1, 4)"
        );
        assert!(!err.is_recoverable());
    }

    #[test]
    fn per_cell_errors_are_recoverable() {
        let err = Error::UnsupportedLanguage {
            index: 2,
            language: "application/sql".to_string(),
        };
        assert!(err.is_recoverable());
        assert_eq!(err.cell_index(), Some(2));
        assert!(err.with_hint().contains("hint:"));
    }
}
