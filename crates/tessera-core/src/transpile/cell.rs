//! Per-cell transpilation into a normalized procedure body.

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::globals::is_builtin;
use super::imports::{Edit, apply_edits, scan_imports};
use super::lexer::{LexError, Token, TokenKind, match_brackets, tokenize};
use super::scope::analyze;
use crate::error::{Error, Result};
use crate::notebook::{Language, RawCell};

/// Prefix of the control half of a view/value pair.
pub const VIEW_PREFIX: &str = "viewof ";

/// Identifier standing in for a `viewof NAME` reference inside a procedure.
const VIEW_PARAMETER_PREFIX: &str = "$viewof$";

/// Parameter that binds `input` in a cell procedure.
pub fn parameter_name(input: &str) -> Cow<'_, str> {
    match input.strip_prefix(VIEW_PREFIX) {
        Some(name) => Cow::Owned(format!("{VIEW_PARAMETER_PREFIX}{name}")),
        None => Cow::Borrowed(input),
    }
}

/// Input name for a free reference found in a procedure body.
fn input_name(reference: String) -> String {
    match reference.strip_prefix(VIEW_PARAMETER_PREFIX) {
        Some(name) => format!("{VIEW_PREFIX}{name}"),
        None => reference,
    }
}

/// Replace each `viewof NAME` reference with its parameter identifier.
fn rewrite_view_references(text: &str) -> std::result::Result<String, LexError> {
    let tokens = tokenize(text)?;
    let mut edits = Vec::new();
    for (i, pair) in tokens.windows(2).enumerate() {
        let [view, name] = pair else { continue };
        let member = i > 0 && (tokens[i - 1].is_punct(".") || tokens[i - 1].is_punct("?."));
        if view.is_ident("viewof") && name.kind == TokenKind::Ident && !member {
            edits.push(Edit {
                start: view.start,
                end: name.end,
                text: format!("{VIEW_PARAMETER_PREFIX}{}", name.text),
            });
        }
    }
    Ok(apply_edits(text, 0, &edits))
}

/// How a cell is defined in the generated module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellShape {
    /// No outputs; observed without a name.
    Anonymous,
    /// Exactly one named output.
    Single,
    /// `viewof NAME`: the control plus the derived value `NAME`.
    ViewPair,
    /// Several named outputs returned as one object.
    Multiple,
}

/// A cell normalized into a procedure body with explicit inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranspiledCell {
    pub index: usize,
    /// Names this cell defines, in order.
    pub outputs: Vec<String>,
    /// Free names this cell reads, in first-use order.
    pub inputs: Vec<String>,
    /// Procedure body (statements).
    pub body: String,
    /// Package names imported by the cell.
    pub dependencies: BTreeSet<String>,
    /// Package name to pinned version, for imports that carried one.
    pub dependency_specs: BTreeMap<String, String>,
    pub shape: CellShape,
    pub is_async: bool,
    pub is_generator: bool,
}

impl TranspiledCell {
    /// Value name of a view/value pair.
    pub fn view_value(&self) -> Option<&str> {
        match self.shape {
            CellShape::ViewPair => self.outputs.get(1).map(String::as_str),
            _ => None,
        }
    }
}

/// Transpile one raw cell.
pub fn transpile(cell: &RawCell) -> Result<TranspiledCell> {
    let transpiled = match &cell.language {
        Language::Script => transpile_script(cell)?,
        Language::Markdown => transpile_markup(cell, "md")?,
        Language::Html => transpile_markup(cell, "html")?,
        Language::Tex => transpile_markup(cell, "tex")?,
        Language::Other(tag) => {
            return Err(Error::UnsupportedLanguage {
                index: cell.index,
                language: tag.clone(),
            });
        }
    };

    tracing::debug!(
        "cell {}: outputs={:?} inputs={:?} shape={:?}",
        cell.index,
        transpiled.outputs,
        transpiled.inputs,
        transpiled.shape
    );
    Ok(transpiled)
}

fn syntax(index: usize, message: impl ToString) -> Error {
    Error::Syntax {
        index,
        message: message.to_string(),
    }
}

/// Syntactic form of a script cell.
#[derive(Debug)]
enum Form {
    Empty,
    /// `NAME = expr`
    Named { name: String, expr: usize },
    /// `viewof NAME = expr`
    View { name: String, expr: usize },
    /// `{ ... }`
    Block { open: usize, close: usize },
    /// A single expression.
    Expression,
    /// Statements.
    Program,
}

const STATEMENT_KEYWORDS: &[&str] = &[
    "const", "let", "var", "function", "class", "if", "for", "while", "do", "try", "switch",
    "throw", "return", "export", "break", "continue", "debugger", "with",
];

fn transpile_script(cell: &RawCell) -> Result<TranspiledCell> {
    let source = cell.source.as_str();
    let tokens = tokenize(source).map_err(|e| syntax(cell.index, e))?;
    let partners = match_brackets(&tokens);
    let imports = scan_imports(&tokens).map_err(|e| syntax(cell.index, e))?;
    if !imports.bindings.is_empty() {
        tracing::debug!("cell {}: import bindings {:?}", cell.index, imports.bindings);
    }

    let form = detect_form(&tokens, &partners, cell.is_view_cell);

    let (mut outputs, shape, body) = match &form {
        Form::Empty => (Vec::new(), CellShape::Anonymous, String::new()),
        Form::Named { name, expr } => (
            vec![name.clone()],
            CellShape::Single,
            expression_body(source, &tokens, &partners, *expr, &imports.edits),
        ),
        Form::View { name, expr } => (
            vec![format!("{VIEW_PREFIX}{name}"), name.clone()],
            CellShape::ViewPair,
            expression_body(source, &tokens, &partners, *expr, &imports.edits),
        ),
        Form::Block { open, close } => {
            let (outputs, shape) = declared_single(cell);
            (outputs, shape, block_body(source, &tokens, *open, *close, &imports.edits))
        }
        Form::Expression => {
            let (outputs, shape) = declared_single(cell);
            (
                outputs,
                shape,
                expression_body(source, &tokens, &partners, 0, &imports.edits),
            )
        }
        Form::Program => (Vec::new(), CellShape::Anonymous, apply_edits(source, 0, &imports.edits)),
    };

    let body = rewrite_view_references(&body).map_err(|e| syntax(cell.index, e))?;
    let body_tokens = tokenize(&body).map_err(|e| syntax(cell.index, e))?;
    let analysis = analyze(&body_tokens);

    let mut body = body;
    let mut shape = shape;
    if matches!(form, Form::Program) {
        outputs = program_outputs(cell, &analysis.top_level);
        match outputs.as_slice() {
            [] => {}
            [single] => {
                shape = CellShape::Single;
                body.push_str(&format!("\nreturn {single};"));
            }
            many => {
                shape = CellShape::Multiple;
                body.push_str(&format!("\nreturn {{{}}};", many.join(", ")));
            }
        }
    }

    let inputs = analysis
        .references
        .into_iter()
        .map(input_name)
        .filter(|name| !is_builtin(name) && !outputs.contains(name))
        .collect();

    let mut dependencies = BTreeSet::new();
    let mut dependency_specs = BTreeMap::new();
    for package in imports.packages {
        if let Some(version) = package.version {
            dependency_specs.insert(package.package.clone(), version);
        }
        dependencies.insert(package.package);
    }

    Ok(TranspiledCell {
        index: cell.index,
        outputs,
        inputs,
        body,
        dependencies,
        dependency_specs,
        shape,
        is_async: analysis.top_level_await,
        is_generator: analysis.top_level_yield,
    })
}

fn declared_single(cell: &RawCell) -> (Vec<String>, CellShape) {
    match cell.declared_names.first() {
        Some(name) => (vec![name.clone()], CellShape::Single),
        None => (Vec::new(), CellShape::Anonymous),
    }
}

fn program_outputs(cell: &RawCell, top_level: &[String]) -> Vec<String> {
    if cell.declared_names.is_empty() {
        return top_level.to_vec();
    }
    for name in &cell.declared_names {
        if !top_level.contains(name) {
            tracing::warn!(
                "cell {}: declared output '{}' is not defined at the top level",
                cell.index,
                name
            );
        }
    }
    top_level
        .iter()
        .filter(|name| cell.declared_names.contains(name))
        .cloned()
        .collect()
}

/// `view_cell` comes from the parser's check of the cell's leading text and
/// gates the `viewof NAME = expr` form.
fn detect_form(tokens: &[Token], partners: &[Option<usize>], view_cell: bool) -> Form {
    let Some(first) = tokens.first() else {
        return Form::Empty;
    };

    if view_cell
        && first.is_ident("viewof")
        && tokens.get(1).is_some_and(|t| t.kind == TokenKind::Ident)
        && tokens.get(2).is_some_and(|t| t.is_punct("="))
        && tokens.len() > 3
        && is_single_expression(tokens, partners, 3)
    {
        return Form::View {
            name: tokens[1].text.clone(),
            expr: 3,
        };
    }

    if first.kind == TokenKind::Ident
        && tokens.get(1).is_some_and(|t| t.is_punct("="))
        && tokens.len() > 2
        && is_single_expression(tokens, partners, 2)
    {
        return Form::Named {
            name: first.text.clone(),
            expr: 2,
        };
    }

    if first.is_punct("{")
        && let Some(close) = partners[0]
        && is_last(tokens, close)
    {
        return Form::Block { open: 0, close };
    }

    let statement_start = first.kind == TokenKind::Keyword
        && (STATEMENT_KEYWORDS.contains(&first.text.as_str())
            || (first.text == "import"
                && !tokens
                    .get(1)
                    .is_some_and(|t| t.is_punct("(") || t.is_punct("."))));
    let async_function =
        first.is_ident("async") && tokens.get(1).is_some_and(|t| t.is_keyword("function"));
    let labeled = first.kind == TokenKind::Ident && tokens.get(1).is_some_and(|t| t.is_punct(":"));

    if !statement_start
        && !async_function
        && !labeled
        && is_single_expression(tokens, partners, 0)
    {
        Form::Expression
    } else {
        Form::Program
    }
}

/// Token `i` is the last one, ignoring a trailing `;`.
fn is_last(tokens: &[Token], i: usize) -> bool {
    i + 1 == tokens.len() || (i + 2 == tokens.len() && tokens[i + 1].is_punct(";"))
}

/// Whether `tokens[from..]` holds one expression: no statement separators at
/// the outer level, explicit or by line break.
fn is_single_expression(tokens: &[Token], partners: &[Option<usize>], from: usize) -> bool {
    let mut i = from;
    while i < tokens.len() {
        let tok = &tokens[i];
        if tok.is_punct(";") && !is_last(tokens, i.saturating_sub(1)) {
            return false;
        }
        if i > from && tok.newline_before && starts_statement(tok) && tokens[i - 1].ends_operand() {
            return false;
        }
        i = match partners[i] {
            Some(partner) if partner > i => partner + 1,
            _ => i + 1,
        };
    }
    true
}

fn starts_statement(tok: &Token) -> bool {
    match tok.kind {
        TokenKind::Ident | TokenKind::Number | TokenKind::String | TokenKind::PrivateName => true,
        TokenKind::Keyword => !matches!(tok.text.as_str(), "in" | "instanceof"),
        _ => false,
    }
}

/// Body for an expression starting at token `expr`: the block contents when
/// the expression is a lone `{ ... }`, otherwise `return (expr);`.
fn expression_body(
    source: &str,
    tokens: &[Token],
    partners: &[Option<usize>],
    expr: usize,
    edits: &[Edit],
) -> String {
    if tokens[expr].is_punct("{")
        && let Some(close) = partners[expr]
        && is_last(tokens, close)
    {
        return block_body(source, tokens, expr, close, edits);
    }

    let start = tokens[expr].start;
    let end = match tokens.last() {
        Some(last) if last.is_punct(";") => last.start,
        _ => source.len(),
    };
    let text = apply_edits(&source[start..end], start, edits);
    format!("return (\n{}\n);", text.trim_end())
}

fn block_body(source: &str, tokens: &[Token], open: usize, close: usize, edits: &[Edit]) -> String {
    let start = tokens[open].end;
    let end = tokens[close].start;
    apply_edits(&source[start..end], start, edits)
        .trim_matches('\n')
        .to_string()
}

// ---- markup ----

/// A piece of markup cell text.
#[derive(Debug, PartialEq, Eq)]
enum Segment<'a> {
    Text(&'a str),
    Interpolation(&'a str),
}

fn transpile_markup(cell: &RawCell, tag: &str) -> Result<TranspiledCell> {
    let segments = split_interpolations(&cell.source);

    let mut template = String::with_capacity(cell.source.len() + 16);
    let mut inputs = vec![tag.to_string()];
    let mut is_async = false;
    for segment in &segments {
        match segment {
            Segment::Text(text) => template.push_str(&escape_template_text(text)),
            Segment::Interpolation(expr) => {
                let expr = rewrite_view_references(expr).map_err(|e| syntax(cell.index, e))?;
                let wrapped = format!("return ({expr});");
                let tokens = tokenize(&wrapped).map_err(|e| syntax(cell.index, e))?;
                let analysis = analyze(&tokens);
                is_async |= analysis.top_level_await;
                for name in analysis.references.into_iter().map(input_name) {
                    if !is_builtin(&name) && !inputs.contains(&name) {
                        inputs.push(name);
                    }
                }
                template.push_str("${");
                template.push_str(&expr);
                template.push('}');
            }
        }
    }

    let (outputs, shape) = declared_single(cell);
    inputs.retain(|name| !outputs.contains(name));

    Ok(TranspiledCell {
        index: cell.index,
        outputs,
        inputs,
        body: format!("return {tag}`{template}`;"),
        dependencies: BTreeSet::new(),
        dependency_specs: BTreeMap::new(),
        shape,
        is_async,
        is_generator: false,
    })
}

fn split_interpolations(source: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut text_start = 0;
    let mut search = 0;
    while let Some(offset) = source[search..].find("${") {
        let open = search + offset;
        let Some(close) = interpolation_end(source, open + 2) else {
            break;
        };
        if open > text_start {
            segments.push(Segment::Text(&source[text_start..open]));
        }
        segments.push(Segment::Interpolation(&source[open + 2..close]));
        text_start = close + 1;
        search = text_start;
    }
    if text_start < source.len() {
        segments.push(Segment::Text(&source[text_start..]));
    }
    segments
}

/// Byte offset of the `}` closing an interpolation whose expression starts at `from`.
fn interpolation_end(source: &str, from: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut chars = source[from..].char_indices();
    while let Some((offset, c)) = chars.next() {
        match c {
            '{' => depth += 1,
            '}' if depth == 0 => return Some(from + offset),
            '}' => depth -= 1,
            '"' | '\'' | '`' => loop {
                match chars.next() {
                    Some((_, '\\')) => {
                        chars.next();
                    }
                    Some((_, q)) if q == c => break,
                    Some(_) => {}
                    None => return None,
                }
            },
            _ => {}
        }
    }
    None
}

fn escape_template_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.push_str("\\\\"),
            '`' => out.push_str("\\`"),
            '$' if chars.peek() == Some(&'{') => out.push_str("\\$"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(index: usize, language: Language, source: &str, declared: &[&str]) -> RawCell {
        RawCell {
            id: format!("cell-{index}"),
            index,
            language,
            source: source.to_string(),
            declared_names: declared.iter().map(|s| s.to_string()).collect(),
            is_view_cell: source.starts_with("viewof "),
        }
    }

    fn script(source: &str) -> TranspiledCell {
        transpile(&cell(0, Language::Script, source, &[])).unwrap()
    }

    #[test]
    fn test_named_definition_round_trip() {
        let one = script("one = 1");
        assert_eq!(one.outputs, vec!["one"]);
        assert!(one.inputs.is_empty());
        assert_eq!(one.shape, CellShape::Single);
        assert_eq!(one.body, "return (\n1\n);");

        let two = script("two = one + 1");
        assert_eq!(two.inputs, vec!["one"]);
    }

    #[test]
    fn test_view_definition() {
        let view = script("viewof counter = Inputs.range([0, 10], {step: 1})");
        assert_eq!(view.outputs, vec!["viewof counter", "counter"]);
        assert_eq!(view.shape, CellShape::ViewPair);
        assert_eq!(view.inputs, vec!["Inputs"]);
        assert_eq!(view.view_value(), Some("counter"));
    }

    #[test]
    fn test_named_block_definition() {
        let cell = script("total = {\n  let sum = 0;\n  for (const x of values) sum += x;\n  return sum;\n}");
        assert_eq!(cell.outputs, vec!["total"]);
        assert_eq!(cell.inputs, vec!["values"]);
        assert!(cell.body.starts_with("  let sum = 0;"));
        assert!(!cell.body.contains("total"));
    }

    #[test]
    fn test_anonymous_expression() {
        let cell = script("md`Hello ${name}`");
        assert_eq!(cell.shape, CellShape::Anonymous);
        assert!(cell.outputs.is_empty());
        assert_eq!(cell.inputs, vec!["md", "name"]);
    }

    #[test]
    fn test_expression_with_declared_name() {
        let raw = cell(3, Language::Script, "Plot.plot({marks: [Plot.dot(data)]})", &["chart"]);
        let cell = transpile(&raw).unwrap();
        assert_eq!(cell.outputs, vec!["chart"]);
        assert_eq!(cell.shape, CellShape::Single);
        assert_eq!(cell.inputs, vec!["Plot", "data"]);
    }

    #[test]
    fn test_program_outputs() {
        let cell = script("const a = 1;\nfunction f(x) { return x * a + b; }\nclass K {}");
        assert_eq!(cell.outputs, vec!["a", "f", "K"]);
        assert_eq!(cell.shape, CellShape::Multiple);
        assert_eq!(cell.inputs, vec!["b"]);
        assert!(cell.body.ends_with("\nreturn {a, f, K};"));
    }

    #[test]
    fn test_program_outputs_filtered_by_declared_names() {
        let raw = cell(
            1,
            Language::Script,
            "const data = await FileAttachment(\"a.csv\").csv();\nconst helper = 2;",
            &["data"],
        );
        let cell = transpile(&raw).unwrap();
        assert_eq!(cell.outputs, vec!["data"]);
        assert_eq!(cell.shape, CellShape::Single);
        assert!(cell.is_async);
        assert_eq!(cell.inputs, vec!["FileAttachment"]);
        assert!(cell.body.ends_with("\nreturn data;"));
    }

    #[test]
    fn test_program_without_declarations_is_anonymous() {
        let cell = script("display(1);\ndisplay(x);");
        assert_eq!(cell.shape, CellShape::Anonymous);
        assert_eq!(cell.inputs, vec!["display", "x"]);
    }

    #[test]
    fn test_static_imports() {
        let cell = script("import * as d3 from \"npm:d3@7.9.0\";\nimport {csv} from \"d3-fetch\";");
        assert_eq!(cell.outputs, vec!["d3", "csv"]);
        assert!(cell.is_async);
        assert!(cell.body.contains("const d3 = await import(\"d3\");"));
        assert_eq!(
            cell.dependencies.iter().collect::<Vec<_>>(),
            vec!["d3", "d3-fetch"]
        );
        assert_eq!(cell.dependency_specs.get("d3").map(String::as_str), Some("7.9.0"));
        assert!(!cell.dependency_specs.contains_key("d3-fetch"));
    }

    #[test]
    fn test_local_imports_are_not_dependencies() {
        let cell = script("import {helper} from \"./helper.js\";");
        assert!(cell.dependencies.is_empty());
        assert_eq!(cell.outputs, vec!["helper"]);
    }

    #[test]
    fn test_generator_cell() {
        let cell = script("ticker = {\n  let i = 0;\n  while (true) yield i++;\n}");
        assert!(cell.is_generator);
        assert!(!cell.is_async);
    }

    #[test]
    fn test_async_generator_cell() {
        let cell = script("s = {\n  for await (const chunk of stream) yield chunk;\n}");
        assert!(cell.is_async);
        assert!(cell.is_generator);
        assert_eq!(cell.inputs, vec!["stream"]);
    }

    #[test]
    fn test_view_reference_from_another_cell() {
        let cell = script("x = Generators.input(viewof counter)");
        assert_eq!(cell.outputs, vec!["x"]);
        assert_eq!(cell.inputs, vec!["Generators", "viewof counter"]);
        assert_eq!(cell.body, "return (\nGenerators.input($viewof$counter)\n);");

        let cell = script("reset = () => { viewof counter.value = 0; }");
        assert_eq!(cell.inputs, vec!["viewof counter"]);
        assert!(cell.body.contains("$viewof$counter.value = 0"));

        let cell = script("y = options.viewof + 1");
        assert_eq!(cell.inputs, vec!["options"]);
    }

    #[test]
    fn test_view_reference_in_markup() {
        let raw = cell(1, Language::Markdown, "Value: ${viewof slider.value}", &[]);
        let cell = transpile(&raw).unwrap();
        assert_eq!(cell.inputs, vec!["md", "viewof slider"]);
        assert_eq!(cell.body, "return md`Value: ${$viewof$slider.value}`;");
    }

    #[test]
    fn test_view_form_follows_parsed_flag() {
        let mut raw = cell(0, Language::Script, "viewof n = Inputs.text()", &[]);
        assert_eq!(transpile(&raw).unwrap().shape, CellShape::ViewPair);

        raw.is_view_cell = false;
        let cell = transpile(&raw).unwrap();
        assert_ne!(cell.shape, CellShape::ViewPair);
        assert!(!cell.outputs.contains(&"viewof n".to_string()));
    }

    #[test]
    fn test_default_and_namespace_import_order() {
        let cell = script("import def, * as ns from \"npm:pkg2\";");
        assert_eq!(cell.outputs, vec!["def", "ns"]);
        assert_eq!(cell.shape, CellShape::Multiple);
    }

    #[test]
    fn test_builtins_are_not_inputs() {
        let cell = script("now = Math.floor(Date.now() / 1000) + offset");
        assert_eq!(cell.inputs, vec!["offset"]);
    }

    #[test]
    fn test_bare_block() {
        let cell = script("{\n  const x = 1;\n  return x + y;\n}");
        assert_eq!(cell.shape, CellShape::Anonymous);
        assert_eq!(cell.inputs, vec!["y"]);
        assert_eq!(cell.body, "  const x = 1;\n  return x + y;");
    }

    #[test]
    fn test_multiline_expression_stays_single() {
        let cell = script("chart = Plot.plot({\n  marks: [Plot.line(data)]\n})\n  .outerHTML");
        assert_eq!(cell.shape, CellShape::Single);
        assert_eq!(cell.inputs, vec!["Plot", "data"]);
    }

    #[test]
    fn test_syntax_error() {
        let err = transpile(&cell(4, Language::Script, "x = 'unterminated", &[])).unwrap_err();
        assert!(matches!(err, Error::Syntax { index: 4, .. }));
    }

    #[test]
    fn test_unsupported_language() {
        let raw = cell(2, Language::Other("application/sql".to_string()), "select 1", &[]);
        let err = transpile(&raw).unwrap_err();
        assert!(matches!(err, Error::UnsupportedLanguage { index: 2, .. }));
    }

    #[test]
    fn test_markdown_cell() {
        let raw = cell(0, Language::Markdown, "# Hello ${name}\n\nUse `code` and \\n.", &[]);
        let cell = transpile(&raw).unwrap();
        assert_eq!(cell.inputs, vec!["md", "name"]);
        assert_eq!(cell.shape, CellShape::Anonymous);
        assert_eq!(
            cell.body,
            "return md`# Hello ${name}\n\nUse \\`code\\` and \\\\n.`;"
        );
    }

    #[test]
    fn test_html_cell_with_declared_name() {
        let raw = cell(1, Language::Html, "<b>${format(value)}</b>", &["banner"]);
        let cell = transpile(&raw).unwrap();
        assert_eq!(cell.outputs, vec!["banner"]);
        assert_eq!(cell.inputs, vec!["html", "format", "value"]);
    }

    #[test]
    fn test_split_interpolations() {
        assert_eq!(
            split_interpolations("a ${ {b: 1}.b } c ${'}'} d ${"),
            vec![
                Segment::Text("a "),
                Segment::Interpolation(" {b: 1}.b "),
                Segment::Text(" c "),
                Segment::Interpolation("'}'"),
                Segment::Text(" d ${"),
            ]
        );
        assert_eq!(escape_template_text("cost ${"), "cost \\${");
    }
}
