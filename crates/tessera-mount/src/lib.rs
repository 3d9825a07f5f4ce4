//! Mount engine for Tessera notebook libraries.
//!
//! Decides which reactive output of a generated module is attached to which
//! element of a host page.
//!
//! # Architecture
//!
//! ```text
//! ModuleDefinition ──► ResolutionTable ──► observer selector ──► ReactiveRuntime
//!        ▲                   ▲                    │
//!   MountOptions        HostDocument              ▼
//!   (targets)        (data-cell lookup)     MountHandle (bindings, dispose)
//! ```

mod error;
mod host;
mod memory;
mod mount;
mod plan;
mod resolution;
mod runtime;

pub use error::{MountError, MountResult, RuntimeError};
pub use host::HostDocument;
pub use memory::{ElementId, MemoryDocument, ObserverCall, RecordingRuntime};
pub use mount::{Binding, BindingKind, MountHandle, MountPhase, mount};
pub use plan::{MountPlan, PlanEntry, PlannedPlacement, plan};
pub use resolution::{AnonymousSlot, MountOptions, Placement, ResolutionTable, synthetic_key};
pub use runtime::{Observer, ReactiveRuntime};
