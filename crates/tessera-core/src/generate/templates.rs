//! Fixed JavaScript helpers and the README scaffold.

use super::module::ModuleDefinition;

const RUNTIME_JS: &str = r#"// Generated by tessera. Do not edit.
import { Runtime } from "@observablehq/runtime";
import { Inspector } from "@observablehq/inspector";
import { Library } from "@observablehq/stdlib";
import * as Inputs from "@observablehq/inputs";

export { Runtime, Inspector, Library };

export function createLibrary() {
  const library = new Library();
  Object.assign(library, { Inputs: () => Inputs });
  return library;
}

export const runtime = new Runtime(createLibrary());
"#;

const ENTRY_JS: &str = r#"// Generated by tessera. Do not edit.
import define, { cells } from "./define.js";
import { Runtime, Inspector, Library, createLibrary, runtime } from "./runtime.js";

export { define, cells, Runtime, Inspector, Library, createLibrary, runtime };

const VIEW_PREFIX = "viewof ";

function cellKey(cell) {
  return `cell-${cell.index}`;
}

function findCellTarget(name) {
  if (typeof document === "undefined") return null;
  for (const element of document.querySelectorAll("[data-cell]")) {
    if (element.getAttribute("data-cell") === name) return element;
  }
  return null;
}

function resolveTarget(cell, targets) {
  const keys = [...cell.names, cellKey(cell)];
  for (const key of keys) {
    if (targets[key]) return { key, target: targets[key] };
  }
  for (const key of keys) {
    const target = findCellTarget(key);
    if (target) return { key, target };
  }
  return { key: null, target: null };
}

function resolvePlacements(targets, fallback) {
  const suppressed = new Set();
  for (const cell of cells) {
    for (const name of cell.outputs) {
      if (name.startsWith(VIEW_PREFIX)) suppressed.add(name.slice(VIEW_PREFIX.length));
    }
  }

  const placements = new Map();
  const anonymous = [];
  for (const cell of cells) {
    const { key, target } = resolveTarget(cell, targets);
    if (cell.outputs.length === 0) {
      anonymous.push({ index: cell.index, key: cellKey(cell), target });
      continue;
    }
    const visible = cell.outputs.filter((name) => !suppressed.has(name));
    const primary = visible.includes(key) ? key : visible[0];
    for (const name of cell.outputs) {
      if (suppressed.has(name)) placements.set(name, { kind: "suppress" });
      else if (name === primary && target) placements.set(name, { kind: "render", target });
      else placements.set(name, fallback);
    }
  }
  return { placements, anonymous };
}

export function mount(container, options = {}) {
  if (!container || typeof container.appendChild !== "function") {
    throw new Error("mount: a container element is required");
  }
  if (container.isConnected === false) {
    throw new Error("mount: the container is not attached to a document");
  }

  const { targets = {}, appendUnmatched = false, evaluateUnmatched = false } = options;
  const fallback = appendUnmatched
    ? { kind: "append" }
    : evaluateUnmatched
      ? { kind: "evaluate" }
      : { kind: "suppress" };
  const { placements, anonymous } = resolvePlacements(targets, fallback);

  let disposed = false;
  const place = (placement) => {
    switch (placement.kind) {
      case "render":
        return new Inspector(placement.target);
      case "append": {
        const element = container.ownerDocument.createElement("div");
        container.appendChild(element);
        return new Inspector(element);
      }
      case "evaluate":
        return true;
      default:
        return false;
    }
  };
  const observer = (name) => {
    if (disposed) return false;
    if (name === undefined) {
      const slot = anonymous.shift();
      return place(slot && slot.target ? { kind: "render", target: slot.target } : fallback);
    }
    return place(placements.get(name) ?? fallback);
  };

  const instance = new Runtime(createLibrary());
  let main;
  try {
    main = instance.module(define, observer);
  } catch (error) {
    instance.dispose();
    throw error;
  }

  return {
    runtime: instance,
    main,
    dispose() {
      if (disposed) return;
      disposed = true;
      instance.dispose();
    },
  };
}
"#;

/// Text of `src/runtime.js`.
pub fn render_runtime() -> String {
    RUNTIME_JS.to_string()
}

/// Text of `src/index.js`.
pub fn render_entry() -> String {
    ENTRY_JS.to_string()
}

/// Text of `README.md`.
pub fn render_readme(package_name: &str, module: &ModuleDefinition) -> String {
    let mut readme = format!(
        "# {package_name}\n\n\
         JavaScript library generated from the `{}` notebook.\n\n\
         ## Install\n\n\
         ```sh\n\
         npm install {package_name}\n\
         ```\n\n\
         ## Usage\n\n\
         ```js\n\
         import {{ mount }} from \"{package_name}\";\n\n\
         const handle = mount(document.querySelector(\"#notebook\"), {{\n\
         \x20 targets: {{}},\n\
         \x20 appendUnmatched: true,\n\
         }});\n\n\
         // later\n\
         handle.dispose();\n\
         ```\n\n\
         Elements with a `data-cell=\"NAME\"` attribute receive the output named `NAME`.\n",
        module.library_name
    );

    readme.push_str("\n## Cells\n\n");
    for meta in &module.meta {
        if meta.outputs.is_empty() {
            readme.push_str(&format!("- `cell-{}` (anonymous)\n", meta.index));
        } else {
            let names: Vec<String> = meta.outputs.iter().map(|n| format!("`{n}`")).collect();
            readme.push_str(&format!("- {}\n", names.join(", ")));
        }
    }
    readme
}
