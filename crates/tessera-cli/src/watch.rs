//! Watch mode for the build command.
//!
//! Builds once, then rebuilds a notebook whenever its file changes.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use notify_debouncer_mini::{DebounceEventResult, Debouncer, new_debouncer, notify::RecursiveMode};
use tokio::sync::mpsc;

use crate::build::{BuildRequest, build_all, print_failure};
use crate::colors;

/// Debounce window for file events.
const DEBOUNCE: Duration = Duration::from_millis(200);

/// File change event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileEvent {
    /// File was written or recreated.
    Modified(PathBuf),
    /// File was removed.
    Removed(PathBuf),
}

/// Watches a set of notebook files.
pub struct NotebookWatcher {
    /// Debouncer handle (kept alive to maintain watcher).
    _debouncer: Debouncer<notify::RecommendedWatcher>,
    rx: mpsc::UnboundedReceiver<FileEvent>,
}

impl NotebookWatcher {
    /// Watch `files`, which must be absolute paths.
    pub fn new(files: &[PathBuf]) -> anyhow::Result<Self> {
        let targets: Arc<BTreeSet<PathBuf>> = Arc::new(files.iter().cloned().collect());
        let dirs: BTreeSet<PathBuf> = files
            .iter()
            .map(|file| file.parent().unwrap_or(Path::new(".")).to_path_buf())
            .collect();

        let (tx, rx) = mpsc::unbounded_channel();
        let filter = Arc::clone(&targets);
        let mut debouncer = new_debouncer(DEBOUNCE, move |result: DebounceEventResult| {
            match result {
                Ok(events) => {
                    for event in events {
                        if !filter.contains(&event.path) {
                            continue;
                        }
                        let file_event = if event.path.exists() {
                            FileEvent::Modified(event.path.clone())
                        } else {
                            FileEvent::Removed(event.path.clone())
                        };
                        let _ = tx.send(file_event);
                    }
                }
                Err(err) => tracing::warn!("file watch error: {}", err),
            }
        })
        .map_err(|e| anyhow::anyhow!("Failed to create file watcher: {}", e))?;

        for dir in &dirs {
            debouncer
                .watcher()
                .watch(dir, RecursiveMode::NonRecursive)
                .map_err(|e| anyhow::anyhow!("Failed to watch {}: {}", dir.display(), e))?;
        }
        tracing::debug!("watching {} files in {} directories", targets.len(), dirs.len());

        Ok(Self {
            _debouncer: debouncer,
            rx,
        })
    }

    /// Receive the next file event.
    pub async fn recv(&mut self) -> Option<FileEvent> {
        self.rx.recv().await
    }
}

/// Execute the build command in watch mode. Runs until Ctrl+C.
pub async fn execute(request: &BuildRequest) -> anyhow::Result<()> {
    request.validate()?;
    let inputs = request.input_paths()?;

    println!(
        "\n{}Tessera Watch{} - {}{} notebook(s){}",
        colors::BOLD,
        colors::RESET,
        colors::CYAN,
        inputs.len(),
        colors::RESET
    );
    println!("{}", "─".repeat(50));
    println!(
        "{}Watching for changes... (Ctrl+C to stop){}",
        colors::DIM,
        colors::RESET
    );
    println!();

    // Failures are reported and the watch keeps going.
    for (input, err) in build_all(request, &inputs) {
        print_failure(&input, &err);
    }

    let mut watcher = NotebookWatcher::new(&inputs)?;
    loop {
        tokio::select! {
            event = watcher.recv() => match event {
                Some(FileEvent::Modified(path)) => {
                    println!(
                        "\n{}{} changed, rebuilding...{}",
                        colors::YELLOW,
                        path.display(),
                        colors::RESET
                    );
                    for (input, err) in build_all(request, std::slice::from_ref(&path)) {
                        print_failure(&input, &err);
                    }
                }
                Some(FileEvent::Removed(path)) => {
                    eprintln!(
                        "\n{}Warning:{} Notebook file removed: {}",
                        colors::YELLOW,
                        colors::RESET,
                        path.display()
                    );
                }
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                println!("\nStopped watching.");
                break;
            }
        }
    }

    Ok(())
}
