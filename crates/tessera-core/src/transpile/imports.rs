//! Import discovery and rewriting.
//!
//! Finds `import ... from "spec"`, `import "spec"`, `import("spec")` and
//! `require("spec")` in a cell, normalizes CDN and `npm:` specifiers to bare
//! package specifiers, and rewrites static imports into `await import(...)`
//! destructuring so the cell stays a plain procedure body.

use super::lexer::{Token, TokenKind, match_brackets};

/// Prefixes that wrap a bare package specifier.
const PACKAGE_PREFIXES: &[&str] = &[
    "npm:",
    "https://cdn.jsdelivr.net/npm/",
    "https://unpkg.com/",
    "https://esm.sh/",
    "https://esm.run/",
];

/// A package reference parsed from a bare specifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageSpecifier {
    /// Package name, possibly scoped (`@scope/name`).
    pub package: String,
    /// Version or range after `@`, if pinned.
    pub version: Option<String>,
    /// Path inside the package, starting with `/`, or empty.
    pub subpath: String,
}

impl PackageSpecifier {
    /// Specifier as written in generated code (version moves to the manifest).
    pub fn bare(&self) -> String {
        format!("{}{}", self.package, self.subpath)
    }

    /// Specifier keeping its version, for loaders that resolve versions themselves.
    pub fn pinned(&self) -> String {
        match &self.version {
            Some(version) => format!("{}@{}{}", self.package, version, self.subpath),
            None => self.bare(),
        }
    }
}

/// What a module specifier refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecifierKind {
    /// An npm package; `prefixed` is true when it came through `npm:` or a CDN URL.
    Package {
        spec: PackageSpecifier,
        prefixed: bool,
    },
    /// Relative or absolute path.
    Local,
    /// Any other URL or scheme (`node:`, `https:` ...).
    External,
}

/// Classify a module specifier.
pub fn classify_specifier(spec: &str) -> SpecifierKind {
    let spec = spec.trim();
    if spec.starts_with("./") || spec.starts_with("../") || spec.starts_with('/') {
        return SpecifierKind::Local;
    }

    let (rest, prefixed) = match PACKAGE_PREFIXES.iter().find(|p| spec.starts_with(**p)) {
        Some(prefix) => {
            let rest = &spec[prefix.len()..];
            let rest = rest.split(['?', '#']).next().unwrap_or(rest);
            let rest = rest.strip_suffix("/+esm").unwrap_or(rest);
            (rest, true)
        }
        None => (spec, false),
    };

    if rest.is_empty() || rest.contains(':') || rest.starts_with('#') {
        return SpecifierKind::External;
    }
    match parse_bare(rest) {
        Some(spec) => SpecifierKind::Package { spec, prefixed },
        None => SpecifierKind::External,
    }
}

fn parse_bare(spec: &str) -> Option<PackageSpecifier> {
    let split = if spec.starts_with('@') {
        let scope_end = spec.find('/')?;
        spec[scope_end + 1..]
            .find('/')
            .map(|p| scope_end + 1 + p)
            .unwrap_or(spec.len())
    } else {
        spec.find('/').unwrap_or(spec.len())
    };
    let (head, subpath) = spec.split_at(split);

    let (package, version) = match head.rfind('@') {
        Some(at) if at > 0 => {
            let version = &head[at + 1..];
            (
                &head[..at],
                (!version.is_empty()).then(|| version.to_string()),
            )
        }
        _ => (head, None),
    };

    let valid = !package.is_empty()
        && !package.ends_with('/')
        && package
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | '~' | '@' | '/'));
    if !valid {
        return None;
    }

    Some(PackageSpecifier {
        package: package.to_string(),
        version,
        subpath: subpath.to_string(),
    })
}

/// A text replacement over a byte range of the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub start: usize,
    pub end: usize,
    pub text: String,
}

/// Imports found in one cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportScan {
    /// Replacements to apply to the source, sorted by position.
    pub edits: Vec<Edit>,
    /// Local names bound by static imports, in order.
    pub bindings: Vec<String>,
    /// Package dependencies, in order of appearance.
    pub packages: Vec<PackageSpecifier>,
}

/// Scan a tokenized cell for imports.
pub fn scan_imports(tokens: &[Token]) -> Result<ImportScan, String> {
    let partners = match_brackets(tokens);
    let mut scan = ImportScan::default();
    let mut i = 0;

    while i < tokens.len() {
        let tok = &tokens[i];
        let after_dot = i > 0 && (tokens[i - 1].is_punct(".") || tokens[i - 1].is_punct("?."));
        if after_dot {
            i += 1;
            continue;
        }

        if tok.is_keyword("import") {
            let next = tokens.get(i + 1);
            if next.is_some_and(|n| n.is_punct("(")) {
                if let Some(arg) = tokens.get(i + 2).filter(|t| t.kind == TokenKind::String) {
                    rewrite_call_argument(arg, false, &mut scan);
                }
                i += 2;
                continue;
            }
            if next.is_some_and(|n| n.is_punct(".")) {
                // import.meta
                i += 2;
                continue;
            }
            i = static_import(tokens, &partners, i, &mut scan)?;
            continue;
        }

        if tok.is_ident("require")
            && tokens.get(i + 1).is_some_and(|n| n.is_punct("("))
            && let Some(arg) = tokens.get(i + 2).filter(|t| t.kind == TokenKind::String)
        {
            rewrite_call_argument(arg, true, &mut scan);
            i += 3;
            continue;
        }

        i += 1;
    }

    scan.edits.sort_by_key(|e| e.start);
    Ok(scan)
}

fn quote(text: &str) -> String {
    serde_json::to_string(text).unwrap_or_else(|_| format!("\"{text}\""))
}

fn rewrite_call_argument(arg: &Token, is_require: bool, scan: &mut ImportScan) {
    let Some(value) = arg.string_value() else {
        return;
    };
    let SpecifierKind::Package { spec, prefixed } = classify_specifier(&value) else {
        return;
    };
    let replacement = if is_require {
        // The loader behind `require` resolves versions itself.
        prefixed.then(|| spec.pinned())
    } else {
        Some(spec.bare()).filter(|bare| *bare != value)
    };
    if let Some(text) = replacement {
        scan.edits.push(Edit {
            start: arg.start,
            end: arg.end,
            text: quote(&text),
        });
    }
    scan.packages.push(spec);
}

/// Parse `import <clause> from "spec"` starting at `start`; returns the index
/// after the statement.
fn static_import(
    tokens: &[Token],
    partners: &[Option<usize>],
    start: usize,
    scan: &mut ImportScan,
) -> Result<usize, String> {
    let malformed = || format!("malformed import statement at offset {}", tokens[start].start);
    let mut j = start + 1;

    let mut default: Option<String> = None;
    let mut namespace: Option<String> = None;
    let mut named: Vec<(String, String)> = Vec::new();
    let mut has_clause = false;

    if !tokens.get(j).is_some_and(|t| t.kind == TokenKind::String) {
        has_clause = true;
        if let Some(t) = tokens.get(j).filter(|t| t.kind == TokenKind::Ident && t.text != "from") {
            default = Some(t.text.clone());
            j += 1;
            if tokens.get(j).is_some_and(|t| t.is_punct(",")) {
                j += 1;
            }
        }
        if tokens.get(j).is_some_and(|t| t.is_punct("*")) {
            let is_as = tokens.get(j + 1).is_some_and(|t| t.is_ident("as"));
            let local = tokens.get(j + 2).filter(|t| t.kind == TokenKind::Ident);
            match (is_as, local) {
                (true, Some(local)) => namespace = Some(local.text.clone()),
                _ => return Err(malformed()),
            }
            j += 3;
        } else if tokens.get(j).is_some_and(|t| t.is_punct("{")) {
            let close = partners[j].ok_or_else(malformed)?;
            named = named_imports(&tokens[j + 1..close]).ok_or_else(malformed)?;
            j = close + 1;
        }
        if !tokens.get(j).is_some_and(|t| t.is_ident("from")) {
            return Err(malformed());
        }
        j += 1;
    }

    let spec_token = tokens
        .get(j)
        .filter(|t| t.kind == TokenKind::String)
        .ok_or_else(malformed)?;
    let value = spec_token.string_value().ok_or_else(malformed)?;
    let mut end = spec_token.end;
    j += 1;

    // Import attributes: `with { type: "json" }`.
    if tokens.get(j).is_some_and(|t| t.is_keyword("with") || t.is_ident("assert"))
        && tokens.get(j + 1).is_some_and(|t| t.is_punct("{"))
        && let Some(close) = partners[j + 1]
    {
        end = tokens[close].end;
        j = close + 1;
    }
    if tokens.get(j).is_some_and(|t| t.is_punct(";")) {
        end = tokens[j].end;
        j += 1;
    }

    let specifier = match classify_specifier(&value) {
        SpecifierKind::Package { spec, .. } => {
            let bare = spec.bare();
            scan.packages.push(spec);
            bare
        }
        SpecifierKind::Local | SpecifierKind::External => value,
    };
    let target = format!("await import({})", quote(&specifier));

    let mut entries: Vec<String> = Vec::new();
    if let Some(local) = &default
        && namespace.is_none()
    {
        entries.push(format!("default: {local}"));
    }
    for (imported, local) in &named {
        if imported == local {
            entries.push(local.clone());
        } else {
            entries.push(format!("{imported}: {local}"));
        }
    }

    let text = match (&namespace, &default) {
        (Some(ns), Some(local)) => format!("const {{default: {local}}} = {target}, {ns} = {target};"),
        (Some(ns), None) => format!("const {ns} = {target};"),
        _ if !has_clause || entries.is_empty() => format!("{target};"),
        _ => format!("const {{{}}} = {target};", entries.join(", ")),
    };

    scan.bindings.extend(default.iter().cloned());
    scan.bindings.extend(namespace.iter().cloned());
    scan.bindings.extend(named.into_iter().map(|(_, local)| local));
    scan.edits.push(Edit {
        start: tokens[start].start,
        end,
        text,
    });
    Ok(j)
}

/// `a, b as c, default as d, "x-y" as e` between import braces.
fn named_imports(tokens: &[Token]) -> Option<Vec<(String, String)>> {
    let mut named = Vec::new();
    for entry in tokens.split(|t| t.is_punct(",")) {
        match entry {
            [] => {}
            [name] if name.kind == TokenKind::Ident => {
                named.push((name.text.clone(), name.text.clone()));
            }
            [imported, as_kw, local] if as_kw.is_ident("as") && local.kind == TokenKind::Ident => {
                let imported = match imported.kind {
                    TokenKind::Ident | TokenKind::Keyword | TokenKind::String => {
                        imported.text.clone()
                    }
                    _ => return None,
                };
                named.push((imported, local.text.clone()));
            }
            _ => return None,
        }
    }
    Some(named)
}

/// Apply the edits falling inside `text`, which starts at byte `base` of the
/// original source.
pub fn apply_edits(text: &str, base: usize, edits: &[Edit]) -> String {
    let end = base + text.len();
    let mut out = String::with_capacity(text.len());
    let mut cursor = base;
    for edit in edits {
        if edit.start < cursor || edit.end > end {
            continue;
        }
        out.push_str(&text[cursor - base..edit.start - base]);
        out.push_str(&edit.text);
        cursor = edit.end;
    }
    out.push_str(&text[cursor - base..]);
    out
}
