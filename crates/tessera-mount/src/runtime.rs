//! The reactive runtime side of a mount.

use tessera_core::ModuleDefinition;

use crate::error::RuntimeError;

/// What the runtime should do with a variable, as chosen by the observer
/// selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observer<E> {
    /// Render the value with an inspector bound to the element.
    Inspect(E),
    /// Compute the value without rendering it.
    Evaluate,
    /// Neither observe nor render.
    Suppress,
}

impl<E> Observer<E> {
    pub fn is_suppressed(&self) -> bool {
        matches!(self, Observer::Suppress)
    }
}

/// A reactive dataflow runtime able to instantiate a generated module.
///
/// `instantiate` asks `observer` once per observed variable, with the
/// variable name or `None` for an anonymous cell, in module order.
pub trait ReactiveRuntime<E> {
    fn instantiate(
        &mut self,
        module: &ModuleDefinition,
        observer: &mut dyn FnMut(Option<&str>) -> Observer<E>,
    ) -> Result<(), RuntimeError>;

    /// Release every variable and stop evaluation.
    fn dispose(&mut self);
}

impl<E, R: ReactiveRuntime<E> + ?Sized> ReactiveRuntime<E> for &mut R {
    fn instantiate(
        &mut self,
        module: &ModuleDefinition,
        observer: &mut dyn FnMut(Option<&str>) -> Observer<E>,
    ) -> Result<(), RuntimeError> {
        (**self).instantiate(module, observer)
    }

    fn dispose(&mut self) {
        (**self).dispose()
    }
}
