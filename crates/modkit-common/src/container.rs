//! The service container protocol and service value primitives.
//!
//! Everything a container hands out is a [`ServiceValue`], a reference-counted
//! `dyn Any`, so heterogeneous services live side by side in one registry.
//! The workspace is single-threaded by design, hence `Rc` rather than `Arc`.

use std::any::Any;
use std::rc::Rc;

use crate::error::{ModkitError, Result};
use crate::types::ServiceId;

/// A resolved service value.
pub type ServiceValue = Rc<dyn Any>;

/// A service factory: invoked with the resolving container, produces a value.
///
/// Singleton-kind services invoke their factory at most once; factory-kind
/// services invoke it on every retrieval.
pub type ServiceFactory = Rc<dyn Fn(&dyn Container) -> ServiceValue>;

/// A service extension: receives the current value and the resolving
/// container, produces the next value in the chain.
pub type ServiceExtension = Rc<dyn Fn(ServiceValue, &dyn Container) -> ServiceValue>;

/// Read access to a set of lazily-resolved services.
pub trait Container {
    /// Returns whether `id` can be resolved by this container.
    ///
    /// Never triggers resolution.
    fn has(&self, id: &str) -> bool;

    /// Resolves the service registered under `id`.
    ///
    /// # Errors
    ///
    /// Fails with [`ModkitError::NotFound`] when `id` is unknown.
    fn get(&self, id: &str) -> Result<ServiceValue>;
}

/// Resolves `id` from `container` and downcasts it to `T`.
///
/// # Errors
///
/// Fails with [`ModkitError::NotFound`] when `id` is unknown, or with
/// [`ModkitError::TypeMismatch`] when the resolved value is not a `T`.
pub fn service<T: Any>(container: &dyn Container, id: &str) -> Result<Rc<T>> {
    container
        .get(id)?
        .downcast::<T>()
        .map_err(|_| ModkitError::TypeMismatch {
            id: ServiceId::new(id),
        })
}
