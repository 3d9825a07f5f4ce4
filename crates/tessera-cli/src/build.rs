//! Build command implementation for Tessera CLI.
//!
//! Generates one library per notebook; several notebooks build in parallel.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use rayon::prelude::*;
use tessera_core::notebook::parse_library_name;
use tessera_core::{BuildOptions, BuildReport, build};

use crate::colors;

/// Arguments of the build command.
#[derive(Debug, Clone)]
pub struct BuildRequest {
    pub inputs: Vec<String>,
    pub out: Option<String>,
    pub name: Option<String>,
    pub link_workspace: bool,
}

impl BuildRequest {
    /// Check the request before building anything.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.name.is_some() && self.inputs.len() > 1 {
            anyhow::bail!("--name can only be used with a single notebook");
        }
        for input in &self.inputs {
            if !Path::new(input).is_file() {
                anyhow::bail!("Notebook not found: {}", input);
            }
        }
        Ok(())
    }

    /// Absolute paths of the inputs.
    pub fn input_paths(&self) -> anyhow::Result<Vec<PathBuf>> {
        self.inputs
            .iter()
            .map(|input| Ok(Path::new(input).canonicalize()?))
            .collect()
    }

    fn options_for(&self, input: &Path) -> tessera_core::Result<BuildOptions> {
        let out_dir = match &self.out {
            Some(out) if self.inputs.len() > 1 => {
                let text = fs::read_to_string(input)?;
                Some(PathBuf::from(out).join(parse_library_name(&text)))
            }
            Some(out) => Some(PathBuf::from(out)),
            None => None,
        };
        Ok(BuildOptions {
            out_dir,
            library_name: self.name.clone(),
            link_workspace: self.link_workspace,
            ..BuildOptions::default()
        })
    }

    fn build_one(&self, input: &Path) -> tessera_core::Result<BuildReport> {
        let options = self.options_for(input)?;
        build(input, &options)
    }
}

/// Execute the build command once.
pub fn execute(request: &BuildRequest) -> anyhow::Result<()> {
    request.validate()?;
    let inputs = request.input_paths()?;
    let mut failures = build_all(request, &inputs);

    if failures.is_empty() {
        return Ok(());
    }
    // A lone failure keeps its type so the caller can add a hint.
    if inputs.len() == 1
        && let Some((_, err)) = failures.pop()
    {
        return Err(err.into());
    }
    for (input, err) in &failures {
        print_failure(input, err);
    }
    anyhow::bail!(
        "{} of {} notebooks failed to build",
        failures.len(),
        inputs.len()
    )
}

/// Build every input in parallel and print each generated library.
/// Returns the failures, unprinted.
pub fn build_all(
    request: &BuildRequest,
    inputs: &[PathBuf],
) -> Vec<(PathBuf, tessera_core::Error)> {
    let start = Instant::now();

    let results: Vec<(PathBuf, tessera_core::Result<BuildReport>)> = inputs
        .par_iter()
        .map(|input| (input.clone(), request.build_one(input)))
        .collect();

    let mut failures = Vec::new();
    for (input, result) in results {
        match result {
            Ok(report) => print_report(&input, &report),
            Err(err) => failures.push((input, err)),
        }
    }

    tracing::debug!(
        "built {} notebooks in {:.2}ms",
        inputs.len(),
        start.elapsed().as_secs_f64() * 1000.0
    );
    failures
}

/// Print a failed build with its recovery hint.
pub fn print_failure(input: &Path, err: &tessera_core::Error) {
    eprintln!(
        "{}✗{} {}: {}",
        colors::RED,
        colors::RESET,
        input.display(),
        err.with_hint()
    );
}

fn print_report(input: &Path, report: &BuildReport) {
    println!(
        "{}✓{} Generated notebook library in {}",
        colors::GREEN,
        colors::RESET,
        report.out_dir.display()
    );
    println!(
        "  {}{}: {} of {} cells, {} dependencies{}",
        colors::DIM,
        input.file_name().unwrap_or_default().to_string_lossy(),
        report.cells_transpiled,
        report.cells_total,
        report.dependencies.len(),
        colors::RESET
    );
    for err in &report.cell_errors {
        println!("  {}skipped:{} {}", colors::YELLOW, colors::RESET, err);
    }
    if report.manifest_merged {
        println!("  merged into existing package.json");
    }
}
