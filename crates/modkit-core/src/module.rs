//! Module capability traits and the bindings modules contribute.
//!
//! A module is a unit of contribution identified by a stable id. Its roles
//! are expressed as default trait methods returning empty bindings plus
//! capability probes returning `None`; a module opts into any combination by
//! overriding the relevant methods.

use std::rc::Rc;

use modkit_common::container::{Container, ServiceExtension, ServiceFactory, ServiceValue};
use modkit_common::error::Result;
use modkit_common::types::{ModuleId, ServiceId};

use crate::event::{ListenerProvider, ServiceEvent};

/// Ordered id-to-factory bindings contributed by one module role.
#[derive(Default)]
pub struct ServiceBindings {
    entries: Vec<(ServiceId, ServiceFactory)>,
}

impl ServiceBindings {
    /// Creates an empty binding collection.
    #[must_use]
    pub const fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Appends a binding whose factory produces a plain `T`.
    ///
    /// The value is wrapped into a shared service value automatically.
    #[must_use]
    pub fn with<T, F>(mut self, id: impl Into<ServiceId>, factory: F) -> Self
    where
        T: 'static,
        F: Fn(&dyn Container) -> T + 'static,
    {
        self.entries.push((
            id.into(),
            Rc::new(move |container: &dyn Container| Rc::new(factory(container)) as ServiceValue),
        ));
        self
    }

    /// Appends a binding with a pre-wrapped service factory.
    #[must_use]
    pub fn with_factory(mut self, id: impl Into<ServiceId>, factory: ServiceFactory) -> Self {
        self.entries.push((id.into(), factory));
        self
    }

    /// Returns whether no binding was contributed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the number of contributed bindings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl IntoIterator for ServiceBindings {
    type Item = (ServiceId, ServiceFactory);
    type IntoIter = std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Ordered id-to-extension bindings contributed by one module role.
#[derive(Default)]
pub struct ExtensionBindings {
    entries: Vec<(ServiceId, ServiceExtension)>,
}

impl ExtensionBindings {
    /// Creates an empty binding collection.
    #[must_use]
    pub const fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Appends an extension for `id`.
    ///
    /// Extensions receive the current value and the resolving container and
    /// produce the next value in the id's chain.
    #[must_use]
    pub fn with<F>(mut self, id: impl Into<ServiceId>, extension: F) -> Self
    where
        F: Fn(ServiceValue, &dyn Container) -> ServiceValue + 'static,
    {
        self.entries.push((id.into(), Rc::new(extension)));
        self
    }

    /// Returns whether no binding was contributed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the number of contributed bindings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl IntoIterator for ExtensionBindings {
    type Item = (ServiceId, ServiceExtension);
    type IntoIter = std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// A unit of contribution to a package.
///
/// All role methods default to "nothing"; a module overrides the ones it
/// implements. A module may hold any combination of roles simultaneously.
pub trait Module {
    /// Returns the stable identifier of this module.
    fn id(&self) -> ModuleId;

    /// Singleton services offered by this module.
    fn services(&self) -> ServiceBindings {
        ServiceBindings::new()
    }

    /// Factory services offered by this module (re-invoked on every `get`).
    fn factories(&self) -> ServiceBindings {
        ServiceBindings::new()
    }

    /// Extensions offered by this module, appended to existing chains.
    fn extensions(&self) -> ExtensionBindings {
        ExtensionBindings::new()
    }

    /// Returns the executable role of this module, if any.
    ///
    /// Executable modules run imperative setup against the finished
    /// container, deferred until the package boots.
    fn as_executable(&self) -> Option<&dyn ExecutableModule> {
        None
    }

    /// Returns the listening role of this module, if any.
    fn as_listening(&self) -> Option<&dyn ListeningModule> {
        None
    }

    /// Returns a listener provider owned by this module, if any.
    ///
    /// The provider is attached to the package dispatcher as-is, ahead of
    /// processing the module's other roles.
    fn listener_provider(&self) -> Option<Rc<dyn ListenerProvider>> {
        None
    }
}

/// Imperative setup run against the finished container at boot.
pub trait ExecutableModule: Module {
    /// Runs the module; `Ok(false)` records a failed execution without
    /// failing the boot, while an error fails the boot itself.
    ///
    /// # Errors
    ///
    /// Any error is recorded against this module and surfaces as the boot
    /// failure once all executables have run.
    fn run(&self, container: &dyn Container) -> Result<bool>;
}

/// A module subscribing to service events.
pub trait ListeningModule: Module {
    /// Receives every service event dispatched by the owning package.
    fn listen(&self, event: &mut ServiceEvent<'_>);
}
