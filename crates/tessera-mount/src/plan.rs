//! Dry-run mounts against the in-memory host.

use std::fmt;

use serde::Serialize;
use tessera_core::ModuleDefinition;

use crate::error::MountResult;
use crate::memory::{ElementId, MemoryDocument, RecordingRuntime};
use crate::mount::{BindingKind, mount};
use crate::resolution::MountOptions;

/// Where one observed output would land.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "element", rename_all = "snake_case")]
pub enum PlannedPlacement {
    /// Rendered into the page element with this label.
    Target(String),
    /// Rendered into a new element appended to the container.
    Appended(String),
    Evaluated,
    Suppressed,
}

impl fmt::Display for PlannedPlacement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlannedPlacement::Target(label) => write!(f, "{label}"),
            PlannedPlacement::Appended(label) => write!(f, "{label}"),
            PlannedPlacement::Evaluated => f.write_str("evaluated, not rendered"),
            PlannedPlacement::Suppressed => f.write_str("suppressed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanEntry {
    pub cell: Option<usize>,
    pub output: Option<String>,
    pub placement: PlannedPlacement,
}

/// The outcome of a dry-run mount, in observer order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MountPlan {
    pub entries: Vec<PlanEntry>,
}

impl MountPlan {
    /// Entries for the output `name`.
    pub fn find(&self, name: &str) -> Option<&PlanEntry> {
        self.entries
            .iter()
            .find(|entry| entry.output.as_deref() == Some(name))
    }

    pub fn rendered(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| {
                matches!(
                    entry.placement,
                    PlannedPlacement::Target(_) | PlannedPlacement::Appended(_)
                )
            })
            .count()
    }
}

impl fmt::Display for MountPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            let cell = match entry.cell {
                Some(index) => format!("cell {index}"),
                None => "cell ?".to_string(),
            };
            let output = entry.output.as_deref().unwrap_or("(anonymous)");
            writeln!(f, "{cell:<8} {output:<24} -> {}", entry.placement)?;
        }
        Ok(())
    }
}

/// Mount `module` on a page holding one `data-cell` element per name in
/// `targets`, and report where each output lands.
pub fn plan(
    module: &ModuleDefinition,
    targets: &[String],
    append_unmatched: bool,
) -> MountResult<MountPlan> {
    let mut document = MemoryDocument::new();
    for name in targets {
        document.create_cell_target(name);
    }
    let container = document.create_element(Some(document.body()), "container");

    let options = MountOptions {
        append_unmatched,
        ..MountOptions::default()
    };
    let mut handle = mount(
        &mut document,
        Some(container),
        RecordingRuntime::<ElementId>::new(),
        module,
        options,
    )?;

    let entries = handle
        .bindings()
        .iter()
        .map(|binding| PlanEntry {
            cell: binding.cell,
            output: binding.output.clone(),
            placement: match &binding.kind {
                BindingKind::Rendered(element) => {
                    PlannedPlacement::Target(document.label(*element).to_string())
                }
                BindingKind::Appended(element) => {
                    PlannedPlacement::Appended(document.label(*element).to_string())
                }
                BindingKind::Evaluated => PlannedPlacement::Evaluated,
                BindingKind::Suppressed => PlannedPlacement::Suppressed,
            },
        })
        .collect();
    handle.dispose();

    Ok(MountPlan { entries })
}
