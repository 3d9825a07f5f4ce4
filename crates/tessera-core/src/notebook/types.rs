//! Types produced by the notebook parser.

use serde::{Deserialize, Serialize};

/// Library name used when the notebook has no usable `<title>`.
pub const DEFAULT_LIBRARY_NAME: &str = "notebook";

/// Sub-language of a notebook cell, taken from the `<script type>` attribute.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    /// JavaScript (plain modules or Observable JavaScript).
    Script,
    /// Markdown rendered through the `md` template tag.
    Markdown,
    /// HTML rendered through the `html` template tag.
    Html,
    /// TeX rendered through the `tex` template tag.
    Tex,
    /// Any other type (SQL, Graphviz, TypeScript...). Not transpiled.
    Other(String),
}

impl Language {
    /// Map a `type` attribute value to a language. A missing attribute means JavaScript.
    pub fn from_type_attr(attr: Option<&str>) -> Self {
        let Some(attr) = attr else {
            return Language::Script;
        };
        match attr.trim().to_ascii_lowercase().as_str() {
            "" | "module" | "text/javascript" | "application/javascript"
            | "application/vnd.observable.javascript" => Language::Script,
            "text/markdown" => Language::Markdown,
            "text/html" => Language::Html,
            "application/x-tex" | "text/x-tex" => Language::Tex,
            other => Language::Other(other.to_string()),
        }
    }

    /// Human-readable tag used in diagnostics.
    pub fn tag(&self) -> &str {
        match self {
            Language::Script => "javascript",
            Language::Markdown => "markdown",
            Language::Html => "html",
            Language::Tex => "tex",
            Language::Other(tag) => tag,
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// A cell as it appears in the document, before transpilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCell {
    /// Value of the `id` attribute (`cell-<index>` when absent).
    pub id: String,
    /// 0-based position in the document; the only ordering key.
    pub index: usize,
    /// Sub-language of the cell.
    pub language: Language,
    /// Dedented source text.
    pub source: String,
    /// Names from the `output` attribute, in order, without duplicates.
    pub declared_names: Vec<String>,
    /// Whether the cell defines a `viewof` control.
    pub is_view_cell: bool,
}

/// Result of parsing a notebook document.
#[derive(Debug, Clone)]
pub struct ParsedNotebook {
    /// Raw `<title>` text, if any.
    pub title: Option<String>,
    /// Library name inferred from the title.
    pub library_name: String,
    /// Cells in document order.
    pub cells: Vec<RawCell>,
}
