//! Parser for notebook-kit HTML documents.
//!
//! A notebook looks like:
//!
//! ```text
//! <!doctype html>
//! <notebook>
//!   <title>Hello World</title>
//!   <script id="1" type="text/markdown"># Hello</script>
//!   <script id="2" type="module" output="one">one = 1</script>
//! </notebook>
//! ```
//!
//! Only the `<notebook>` element, its `<title>` and its `<script>` children
//! matter; everything else is ignored.

use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use super::types::{DEFAULT_LIBRARY_NAME, Language, ParsedNotebook, RawCell};
use crate::error::{Error, Result};

static NOTEBOOK_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<notebook\b[^>]*>").expect("notebook open pattern"));
static NOTEBOOK_CLOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)</notebook\s*>").expect("notebook close pattern"));
static TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<title\b[^>]*>(.*?)</title\s*>").expect("title pattern"));
static SCRIPT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b([^>]*)>(.*?)</script\s*>").expect("script pattern")
});
static SCRIPT_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script\b").expect("script open pattern"));
static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([A-Za-z_:][-A-Za-z0-9_:.]*)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#)
        .expect("attribute pattern")
});

/// Parser for notebook-kit HTML documents.
pub struct NotebookParser {
    // Reserved for future configuration
}

impl NotebookParser {
    /// Create a new parser.
    pub fn new() -> Self {
        Self {}
    }

    /// Read and parse a notebook file.
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<ParsedNotebook> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        self.parse_str(&text)
    }

    /// Parse notebook document text.
    pub fn parse_str(&self, text: &str) -> Result<ParsedNotebook> {
        let body = notebook_body(text)?;

        let mut cells = Vec::new();
        let mut last_end = 0;
        for captures in SCRIPT.captures_iter(body) {
            let (Some(whole), Some(attrs), Some(content)) =
                (captures.get(0), captures.get(1), captures.get(2))
            else {
                continue;
            };
            last_end = whole.end();
            cells.push(self.build_cell(cells.len(), attrs.as_str(), content.as_str()));
        }

        if SCRIPT_OPEN.is_match(&body[last_end..]) {
            return Err(Error::MalformedDocument(
                "unterminated <script> element inside <notebook>".to_string(),
            ));
        }

        let title = parse_title(text);
        let library_name = library_name_from_title(title.as_deref());

        tracing::debug!("parsed notebook '{}' with {} cells", library_name, cells.len());

        Ok(ParsedNotebook {
            title,
            library_name,
            cells,
        })
    }

    fn build_cell(&self, index: usize, attrs: &str, content: &str) -> RawCell {
        let mut id = None;
        let mut type_attr = None;
        let mut declared_names: Vec<String> = Vec::new();

        for (name, value) in parse_attributes(attrs) {
            match name.as_str() {
                "id" => id = value,
                "type" => type_attr = value,
                "output" => {
                    for part in value.unwrap_or_default().split([',', ' ', '\t', '\n']) {
                        let part = part.trim();
                        if !part.is_empty() && !declared_names.iter().any(|n| n == part) {
                            declared_names.push(part.to_string());
                        }
                    }
                }
                _ => {}
            }
        }

        let source = dedent(&content.replace("<\\/script", "</script"));
        let is_view_cell = source
            .strip_prefix("viewof")
            .is_some_and(|rest| rest.starts_with(char::is_whitespace));

        RawCell {
            id: id
                .filter(|id| !id.is_empty())
                .unwrap_or_else(|| format!("cell-{index}")),
            index,
            language: Language::from_type_attr(type_attr.as_deref()),
            source,
            declared_names,
            is_view_cell,
        }
    }
}

impl Default for NotebookParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse notebook text with a default parser.
pub fn parse_notebook(text: &str) -> Result<ParsedNotebook> {
    NotebookParser::new().parse_str(text)
}

/// Infer the library name of a notebook from its `<title>`.
pub fn parse_library_name(text: &str) -> String {
    library_name_from_title(parse_title(text).as_deref())
}

fn library_name_from_title(title: Option<&str>) -> String {
    title
        .map(slugify)
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| DEFAULT_LIBRARY_NAME.to_string())
}

/// Slice of the document between `<notebook ...>` and `</notebook>`.
fn notebook_body(text: &str) -> Result<&str> {
    let open = NOTEBOOK_OPEN.find(text).ok_or_else(|| {
        Error::MalformedDocument("no <notebook> element found".to_string())
    })?;
    let rest = &text[open.end()..];
    let close = NOTEBOOK_CLOSE
        .find(rest)
        .ok_or_else(|| Error::MalformedDocument("<notebook> element is never closed".to_string()))?;
    Ok(&rest[..close.start()])
}

fn parse_title(text: &str) -> Option<String> {
    TITLE
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| decode_entities(m.as_str().trim()))
        .filter(|t| !t.is_empty())
}

/// Split an attribute string into (lowercased name, decoded value) pairs.
fn parse_attributes(attrs: &str) -> Vec<(String, Option<String>)> {
    ATTRIBUTE
        .captures_iter(attrs)
        .filter_map(|c| {
            let name = c.get(1)?.as_str().to_ascii_lowercase();
            let value = c
                .get(2)
                .or_else(|| c.get(3))
                .or_else(|| c.get(4))
                .map(|m| decode_entities(m.as_str()));
            Some((name, value))
        })
        .collect()
}

fn decode_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// Lowercase, collapse non-alphanumeric runs to `-`, trim dashes.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;
    for ch in title.chars() {
        if ch.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(ch.to_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// Remove the common indentation and surrounding blank lines.
fn dedent(text: &str) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let first = lines.iter().position(|l| !l.trim().is_empty());
    let last = lines.iter().rposition(|l| !l.trim().is_empty());
    let (Some(first), Some(last)) = (first, last) else {
        return String::new();
    };
    let lines = &lines[first..=last];

    let indent = lines
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start().len())
        .min()
        .unwrap_or(0);

    lines
        .iter()
        .map(|l| {
            if l.len() >= indent && l.is_char_boundary(indent) {
                &l[indent..]
            } else {
                l.trim_start()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
