//! Tessera CLI - build JavaScript libraries from Observable notebooks.

mod build;
mod colors;
mod plan;
mod watch;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tessera")]
#[command(about = "Build standalone JavaScript libraries from Observable notebooks")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a library from one or more notebooks
    Build {
        /// Paths to notebook HTML files
        #[arg(required = true)]
        inputs: Vec<String>,

        /// Output directory (with several inputs, the parent of each library)
        #[arg(short, long)]
        out: Option<String>,

        /// Library name instead of the one inferred from the title
        #[arg(long)]
        name: Option<String>,

        /// Rebuild whenever an input changes
        #[arg(short, long)]
        watch: bool,

        /// Do not link dependencies to local workspace packages
        #[arg(long)]
        no_workspace: bool,
    },

    /// Show where each output of a notebook would be mounted
    Plan {
        /// Path to the notebook HTML file
        input: String,

        /// Name of a `data-cell` element present on the page
        #[arg(short, long = "target")]
        targets: Vec<String>,

        /// Append outputs without a target to the container
        #[arg(long)]
        append_unmatched: bool,

        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        tracing_subscriber::EnvFilter::from_default_env()
            .add_directive(tracing::Level::DEBUG.into())
    } else {
        tracing_subscriber::EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Helper to format tessera-core errors with recovery hints
    let format_error = |err: anyhow::Error| -> anyhow::Error {
        if let Some(core_err) = err.downcast_ref::<tessera_core::Error>() {
            anyhow::anyhow!("{}", core_err.with_hint())
        } else {
            err
        }
    };

    match cli.command {
        Commands::Build {
            inputs,
            out,
            name,
            watch,
            no_workspace,
        } => {
            let request = build::BuildRequest {
                inputs,
                out,
                name,
                link_workspace: !no_workspace,
            };
            if watch {
                watch::execute(&request).await.map_err(format_error)?;
            } else {
                build::execute(&request).map_err(format_error)?;
            }
        }

        Commands::Plan {
            input,
            targets,
            append_unmatched,
            json,
        } => {
            plan::execute(&input, &targets, append_unmatched, json).map_err(format_error)?;
        }
    }

    Ok(())
}
