//! Module definition and `define.js` emission.

use serde::{Deserialize, Serialize};

use crate::transpile::{CellShape, TranspiledCell, parameter_name};

/// One cell as defined in the generated module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellDefinition {
    pub index: usize,
    pub outputs: Vec<String>,
    /// Resolved inputs.
    pub inputs: Vec<String>,
    pub body: String,
    pub shape: CellShape,
    pub is_async: bool,
    pub is_generator: bool,
}

/// Metadata exported next to `define` so hosts can match cells to targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellMeta {
    pub index: usize,
    /// Names a host may use to address the cell.
    pub names: Vec<String>,
    /// Names the cell defines in the runtime.
    pub outputs: Vec<String>,
}

/// The ordered module definition generated from a notebook.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleDefinition {
    pub library_name: String,
    pub cells: Vec<CellDefinition>,
    pub meta: Vec<CellMeta>,
}

impl ModuleDefinition {
    /// Build from transpiled cells with resolved inputs, keeping document order.
    pub fn from_cells(library_name: &str, cells: &[TranspiledCell]) -> Self {
        let mut sorted: Vec<&TranspiledCell> = cells.iter().collect();
        sorted.sort_by_key(|cell| cell.index);

        let definitions = sorted
            .iter()
            .map(|cell| CellDefinition {
                index: cell.index,
                outputs: cell.outputs.clone(),
                inputs: cell.inputs.clone(),
                body: cell.body.clone(),
                shape: cell.shape,
                is_async: cell.is_async,
                is_generator: cell.is_generator,
            })
            .collect();
        let meta = sorted
            .iter()
            .map(|cell| CellMeta {
                index: cell.index,
                names: cell.outputs.clone(),
                outputs: cell.outputs.clone(),
            })
            .collect();

        Self {
            library_name: library_name.to_string(),
            cells: definitions,
            meta,
        }
    }

    /// Every output name defined by the module, in order.
    pub fn output_names(&self) -> impl Iterator<Item = &str> {
        self.cells
            .iter()
            .flat_map(|cell| cell.outputs.iter().map(String::as_str))
    }

    /// Render `define.js`.
    pub fn render(&self) -> String {
        let mut js = String::new();
        js.push_str(&format!(
            "// Generated by tessera from the \"{}\" notebook. Do not edit.\n\n",
            self.library_name
        ));

        js.push_str("export const cells = [\n");
        for meta in &self.meta {
            js.push_str(&format!(
                "  {{index: {}, names: {}, outputs: {}}},\n",
                meta.index,
                json_list(&meta.names),
                json_list(&meta.outputs)
            ));
        }
        js.push_str("];\n\n");

        js.push_str("export default function define(runtime, observer) {\n");
        js.push_str("  const main = runtime.module();\n");
        for cell in &self.cells {
            js.push('\n');
            render_cell(&mut js, cell);
        }
        js.push_str("  return main;\n");
        js.push_str("}\n");
        js
    }
}

fn json(text: &str) -> String {
    serde_json::to_string(text).unwrap_or_else(|_| format!("\"{text}\""))
}

fn json_list(items: &[String]) -> String {
    let quoted: Vec<String> = items.iter().map(|item| json(item)).collect();
    format!("[{}]", quoted.join(", "))
}

/// Name of the hidden variable holding a multi-output cell's result.
pub fn hidden_name(index: usize) -> String {
    format!("cell {index}")
}

fn render_cell(js: &mut String, cell: &CellDefinition) {
    let procedure = render_procedure(cell);
    let inputs = json_list(&cell.inputs);

    match cell.shape {
        CellShape::Anonymous => {
            js.push_str(&format!(
                "  main.variable(observer()).define({inputs}, {procedure});\n"
            ));
        }
        CellShape::Single => {
            let name = json(&cell.outputs[0]);
            js.push_str(&format!(
                "  main.variable(observer({name})).define({name}, {inputs}, {procedure});\n"
            ));
        }
        CellShape::ViewPair => {
            let view = json(&cell.outputs[0]);
            let value = json(&cell.outputs[1]);
            js.push_str(&format!(
                "  main.variable(observer({view})).define({view}, {inputs}, {procedure});\n"
            ));
            js.push_str(&format!(
                "  main.variable(observer({value})).define({value}, [\"Generators\", {view}], (G, _) => G.input(_));\n"
            ));
        }
        CellShape::Multiple => {
            let hidden = json(&hidden_name(cell.index));
            js.push_str(&format!("  main.define({hidden}, {inputs}, {procedure});\n"));
            for output in &cell.outputs {
                let name = json(output);
                js.push_str(&format!(
                    "  main.variable(observer({name})).define({name}, [{hidden}], (_) => _[{name}]);\n"
                ));
            }
        }
    }
}

fn render_procedure(cell: &CellDefinition) -> String {
    let keyword = match (cell.is_async, cell.is_generator) {
        (true, true) => "async function*",
        (true, false) => "async function",
        (false, true) => "function*",
        (false, false) => "function",
    };
    let parameters = cell
        .inputs
        .iter()
        .map(|input| parameter_name(input))
        .collect::<Vec<_>>()
        .join(", ");
    // Not re-indented: template literal text must stay byte-exact.
    if cell.body.trim().is_empty() {
        format!("{keyword}({parameters}) {{}}")
    } else {
        format!("{keyword}({parameters}) {{\n{}\n}}", cell.body)
    }
}
