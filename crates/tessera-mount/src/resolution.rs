//! Resolution of cell outputs to page placements.
//!
//! The table is built once, before the runtime starts, from the module
//! metadata, the caller's target mapping and the page's `data-cell` elements.

use std::collections::{BTreeMap, VecDeque};

use rustc_hash::{FxHashMap, FxHashSet};
use tessera_core::{CellMeta, ModuleDefinition, VIEW_PREFIX};

use crate::host::HostDocument;

/// Identity of a cell for target matching, independent of its names.
pub fn synthetic_key(index: usize) -> String {
    format!("cell-{index}")
}

/// Where an observed output goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement<E> {
    /// Not observed.
    Suppress,
    /// Rendered into an existing element.
    RenderAt(E),
    /// Rendered into a new element appended to the container.
    AppendNew,
    /// Observed without rendering.
    Evaluate,
}

/// Options for [`mount`](crate::mount).
#[derive(Debug, Clone)]
pub struct MountOptions<E> {
    /// Caller-chosen targets, keyed by output name or synthetic key.
    pub targets: BTreeMap<String, E>,
    /// Append outputs without a target to the container.
    pub append_unmatched: bool,
    /// Compute outputs without a target even when they are not appended.
    pub evaluate_unmatched: bool,
}

impl<E> Default for MountOptions<E> {
    fn default() -> Self {
        Self {
            targets: BTreeMap::new(),
            append_unmatched: false,
            evaluate_unmatched: false,
        }
    }
}

impl<E> MountOptions<E> {
    /// Placement for outputs that resolved to no target.
    pub fn fallback(&self) -> Placement<E> {
        if self.append_unmatched {
            Placement::AppendNew
        } else if self.evaluate_unmatched {
            Placement::Evaluate
        } else {
            Placement::Suppress
        }
    }
}

/// An anonymous cell waiting for the runtime to observe it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnonymousSlot<E> {
    pub index: usize,
    pub key: String,
    pub target: Option<E>,
}

/// Placements of every named output plus the queue of anonymous slots.
#[derive(Debug)]
pub struct ResolutionTable<E> {
    placements: FxHashMap<String, Placement<E>>,
    owners: FxHashMap<String, usize>,
    suppressed: FxHashSet<String>,
    anonymous: VecDeque<AnonymousSlot<E>>,
    fallback: Placement<E>,
}

impl<E: Clone + PartialEq> ResolutionTable<E> {
    pub fn build<D>(document: &D, module: &ModuleDefinition, options: &MountOptions<E>) -> Self
    where
        D: HostDocument<Element = E>,
    {
        let fallback = options.fallback();

        let suppressed: FxHashSet<String> = module
            .meta
            .iter()
            .flat_map(|meta| meta.outputs.iter())
            .filter_map(|name| name.strip_prefix(VIEW_PREFIX))
            .map(str::to_string)
            .collect();

        let mut placements = FxHashMap::default();
        let mut owners = FxHashMap::default();
        let mut anonymous = VecDeque::new();

        let mut metas: Vec<&CellMeta> = module.meta.iter().collect();
        metas.sort_by_key(|meta| meta.index);

        for meta in metas {
            let (key, target) = resolve_target(document, meta, &options.targets);

            if meta.outputs.is_empty() {
                anonymous.push_back(AnonymousSlot {
                    index: meta.index,
                    key: synthetic_key(meta.index),
                    target,
                });
                continue;
            }

            let visible: Vec<&String> = meta
                .outputs
                .iter()
                .filter(|name| !suppressed.contains(*name))
                .collect();
            let primary = match &key {
                Some(key) if visible.contains(&key) => Some(key),
                _ => visible.first().copied(),
            };

            for name in &meta.outputs {
                owners.insert(name.clone(), meta.index);
                let placement = if suppressed.contains(name) {
                    Placement::Suppress
                } else if primary == Some(name)
                    && let Some(target) = &target
                {
                    Placement::RenderAt(target.clone())
                } else {
                    fallback.clone()
                };
                placements.insert(name.clone(), placement);
            }
        }

        tracing::debug!(
            "resolved {} outputs, {} suppressed, {} anonymous cells",
            placements.len(),
            suppressed.len(),
            anonymous.len()
        );

        Self {
            placements,
            owners,
            suppressed,
            anonymous,
            fallback,
        }
    }

    /// Placement of a named output; unknown names get the fallback.
    pub fn placement(&self, name: &str) -> Placement<E> {
        match self.placements.get(name) {
            Some(placement) => placement.clone(),
            None => {
                tracing::debug!("no placement for '{}'; using the fallback", name);
                self.fallback.clone()
            }
        }
    }

    /// Index of the cell defining `name`.
    pub fn owner(&self, name: &str) -> Option<usize> {
        self.owners.get(name).copied()
    }

    /// Pop the next anonymous slot. Returns its cell index (none once the
    /// queue is exhausted) and placement.
    pub fn next_anonymous(&mut self) -> (Option<usize>, Placement<E>) {
        match self.anonymous.pop_front() {
            Some(AnonymousSlot {
                index,
                target: Some(target),
                ..
            }) => (Some(index), Placement::RenderAt(target)),
            Some(slot) => (Some(slot.index), self.fallback.clone()),
            None => {
                tracing::debug!("anonymous queue exhausted; using the fallback");
                (None, self.fallback.clone())
            }
        }
    }

    pub fn is_suppressed(&self, name: &str) -> bool {
        self.suppressed.contains(name)
    }

    /// Anonymous slots not yet handed out.
    pub fn pending_anonymous(&self) -> impl Iterator<Item = &AnonymousSlot<E>> {
        self.anonymous.iter()
    }

    pub fn fallback(&self) -> &Placement<E> {
        &self.fallback
    }
}

/// First caller mapping among the cell's names then its synthetic key, else
/// the first page element matching one of them.
fn resolve_target<D: HostDocument>(
    document: &D,
    meta: &CellMeta,
    targets: &BTreeMap<String, D::Element>,
) -> (Option<String>, Option<D::Element>) {
    let keys: Vec<String> = meta
        .names
        .iter()
        .cloned()
        .chain(std::iter::once(synthetic_key(meta.index)))
        .collect();

    for key in &keys {
        if let Some(target) = targets.get(key) {
            return (Some(key.clone()), Some(target.clone()));
        }
    }
    for key in &keys {
        if let Some(target) = document.find_cell_target(key) {
            return (Some(key.clone()), Some(target));
        }
    }
    (None, None)
}
