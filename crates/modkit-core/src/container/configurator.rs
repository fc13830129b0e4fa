//! Mutable staging area for services, factories, extensions, and delegated
//! containers.

use std::cell::OnceCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use modkit_common::container::{Container, ServiceExtension, ServiceFactory};
use modkit_common::types::ServiceId;

use super::read_only::ReadOnlyContainer;
use crate::event::Dispatcher;

/// Accumulates registrations before the immutable container is compiled.
///
/// The configurator itself enforces no lifecycle; the owning package locks
/// additions once it leaves its idle state. Compiling is idempotent: the
/// first call to [`create_read_only_container`](Self::create_read_only_container)
/// builds the container, later calls return the same shared instance.
pub struct ContainerConfigurator {
    services: HashMap<ServiceId, ServiceFactory>,
    factory_ids: HashSet<ServiceId>,
    extensions: HashMap<ServiceId, Vec<ServiceExtension>>,
    containers: Vec<Rc<dyn Container>>,
    dispatcher: Rc<Dispatcher>,
    compiled: OnceCell<Rc<ReadOnlyContainer>>,
}

impl ContainerConfigurator {
    /// Creates an empty configurator emitting events through `dispatcher`.
    #[must_use]
    pub fn new(dispatcher: Rc<Dispatcher>) -> Self {
        Self {
            services: HashMap::new(),
            factory_ids: HashSet::new(),
            extensions: HashMap::new(),
            containers: Vec::new(),
            dispatcher,
            compiled: OnceCell::new(),
        }
    }

    /// Registers a singleton service.
    ///
    /// Replaces any existing registration for `id`, including its kind: an
    /// id previously registered as a factory becomes a singleton again.
    pub fn add_service(&mut self, id: ServiceId, factory: ServiceFactory) {
        let _ = self.factory_ids.remove(&id);
        let _ = self.services.insert(id, factory);
    }

    /// Registers a factory service, re-invoked on every retrieval.
    ///
    /// Replaces any existing registration for `id`.
    pub fn add_factory(&mut self, id: ServiceId, factory: ServiceFactory) {
        let _ = self.factory_ids.insert(id.clone());
        let _ = self.services.insert(id, factory);
    }

    /// Appends an extension to the chain for `id`.
    pub fn add_extension(&mut self, id: ServiceId, extension: ServiceExtension) {
        self.extensions.entry(id).or_default().push(extension);
    }

    /// Appends a delegated container, consulted after local lookup fails.
    pub fn add_container(&mut self, container: Rc<dyn Container>) {
        self.containers.push(container);
    }

    /// Returns whether `id` is registered locally (pending services only).
    #[must_use]
    pub fn has_service(&self, id: &str) -> bool {
        self.services.contains_key(id)
    }

    /// Compiles the read-only container, or returns the one compiled before.
    #[must_use]
    pub fn create_read_only_container(&self) -> Rc<ReadOnlyContainer> {
        Rc::clone(self.compiled.get_or_init(|| {
            Rc::new(ReadOnlyContainer::new(
                self.services.clone(),
                self.factory_ids.clone(),
                self.extensions.clone(),
                self.containers.clone(),
                Rc::clone(&self.dispatcher),
            ))
        }))
    }
}
