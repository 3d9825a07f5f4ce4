//! Plan command implementation for Tessera CLI.
//!
//! Dry-runs a mount of a notebook's module and prints where each output lands.

use std::collections::BTreeSet;
use std::path::Path;

use tessera_core::{NotebookParser, generate, transpile_all};

use crate::colors;

/// Execute the plan command.
pub fn execute(
    input: &str,
    targets: &[String],
    append_unmatched: bool,
    json: bool,
) -> anyhow::Result<()> {
    let path = Path::new(input);
    if !path.is_file() {
        anyhow::bail!("Notebook not found: {}", input);
    }

    let notebook = NotebookParser::new().parse_file(path)?;
    let (cells, errors) = transpile_all(&notebook.cells)?;
    let library = generate(cells, &notebook.library_name, &BTreeSet::new())?;
    let plan = tessera_mount::plan(&library.module, targets, append_unmatched)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    println!(
        "\n{}Tessera Plan{} - {}{}{}",
        colors::BOLD,
        colors::RESET,
        colors::CYAN,
        notebook.library_name,
        colors::RESET
    );
    println!("{}", "─".repeat(50));
    print!("{plan}");
    println!("{}", "─".repeat(50));
    println!(
        "{} of {} observed outputs rendered",
        plan.rendered(),
        plan.entries.len()
    );
    for err in &errors {
        println!("{}skipped:{} {}", colors::YELLOW, colors::RESET, err);
    }

    Ok(())
}
