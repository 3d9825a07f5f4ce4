//! Mounting a generated module into a host page.

use std::fmt;

use tessera_core::ModuleDefinition;

use crate::error::{MountError, MountResult};
use crate::host::HostDocument;
use crate::resolution::{MountOptions, Placement, ResolutionTable};
use crate::runtime::{Observer, ReactiveRuntime};

/// Lifecycle of a mount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountPhase {
    Building,
    Running,
    Disposed,
}

/// What happened to one observer request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingKind<E> {
    /// Rendered into a resolved target.
    Rendered(E),
    /// Rendered into an element appended to the container.
    Appended(E),
    Evaluated,
    Suppressed,
}

/// One observer request and its outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding<E> {
    /// Defining cell, when known.
    pub cell: Option<usize>,
    /// Output name; `None` for anonymous cells.
    pub output: Option<String>,
    pub kind: BindingKind<E>,
}

/// Observer selector state shared between instantiation and later requests.
#[derive(Debug)]
struct Selector<E> {
    table: ResolutionTable<E>,
    container: E,
    bindings: Vec<Binding<E>>,
}

impl<E: Clone + PartialEq + fmt::Debug> Selector<E> {
    fn select<D>(&mut self, document: &mut D, name: Option<&str>) -> Observer<E>
    where
        D: HostDocument<Element = E>,
    {
        let (cell, placement) = match name {
            Some(name) => (self.table.owner(name), self.table.placement(name)),
            None => self.table.next_anonymous(),
        };

        let (observer, kind) = match placement {
            Placement::RenderAt(target) => (Observer::Inspect(target.clone()), BindingKind::Rendered(target)),
            Placement::AppendNew => {
                let element = document.append_child(&self.container);
                (Observer::Inspect(element.clone()), BindingKind::Appended(element))
            }
            Placement::Evaluate => (Observer::Evaluate, BindingKind::Evaluated),
            Placement::Suppress => (Observer::Suppress, BindingKind::Suppressed),
        };

        tracing::debug!("observer for {:?} (cell {:?}): {:?}", name, cell, kind);
        self.bindings.push(Binding {
            cell,
            output: name.map(str::to_string),
            kind,
        });
        observer
    }
}

/// A running mount. Dropping it disposes the runtime.
#[derive(Debug)]
pub struct MountHandle<E, R: ReactiveRuntime<E>> {
    runtime: R,
    selector: Selector<E>,
    phase: MountPhase,
}

impl<E: Clone + PartialEq + fmt::Debug, R: ReactiveRuntime<E>> MountHandle<E, R> {
    pub fn phase(&self) -> MountPhase {
        self.phase
    }

    pub fn runtime(&self) -> &R {
        &self.runtime
    }

    /// Every observer request answered so far, in order.
    pub fn bindings(&self) -> &[Binding<E>] {
        &self.selector.bindings
    }

    pub fn table(&self) -> &ResolutionTable<E> {
        &self.selector.table
    }

    /// Answer an observer request made after instantiation, such as a
    /// redefined variable. Always suppresses once disposed.
    pub fn observe<D>(&mut self, document: &mut D, name: Option<&str>) -> Observer<E>
    where
        D: HostDocument<Element = E>,
    {
        if self.phase != MountPhase::Running {
            return Observer::Suppress;
        }
        self.selector.select(document, name)
    }

    /// Release the runtime. Calling it again does nothing.
    pub fn dispose(&mut self) {
        if self.phase == MountPhase::Disposed {
            return;
        }
        self.phase = MountPhase::Disposed;
        self.runtime.dispose();
        tracing::debug!("mount disposed");
    }
}

impl<E, R: ReactiveRuntime<E>> Drop for MountHandle<E, R> {
    fn drop(&mut self) {
        if self.phase != MountPhase::Disposed {
            self.phase = MountPhase::Disposed;
            self.runtime.dispose();
        }
    }
}

/// Instantiate `module` in `runtime`, placing its outputs on the page.
///
/// # Errors
/// Fails when the container is missing or detached, or when the runtime
/// rejects the module. The runtime is disposed in the latter case.
pub fn mount<D, R>(
    document: &mut D,
    container: Option<D::Element>,
    mut runtime: R,
    module: &ModuleDefinition,
    options: MountOptions<D::Element>,
) -> MountResult<MountHandle<D::Element, R>>
where
    D: HostDocument,
    R: ReactiveRuntime<D::Element>,
{
    let container = container.ok_or(MountError::MissingContainer)?;
    if !document.is_connected(&container) {
        return Err(MountError::DetachedContainer);
    }

    let table = ResolutionTable::build(document, module, &options);
    let mut selector = Selector {
        table,
        container,
        bindings: Vec::new(),
    };

    let mut phase = MountPhase::Building;
    tracing::debug!("mounting '{}' ({:?})", module.library_name, phase);
    if let Err(err) = runtime.instantiate(module, &mut |name| selector.select(document, name)) {
        tracing::warn!("mount of '{}' failed: {}", module.library_name, err);
        runtime.dispose();
        return Err(MountError::Runtime(err));
    }
    phase = MountPhase::Running;

    tracing::info!(
        "mounted '{}' with {} observed variables",
        module.library_name,
        selector.bindings.len()
    );
    Ok(MountHandle {
        runtime,
        selector,
        phase,
    })
}
