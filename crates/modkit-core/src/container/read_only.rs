//! The immutable, lazily-resolving service container.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use modkit_common::container::{
    Container, ServiceExtension, ServiceFactory, ServiceValue,
};
use modkit_common::error::{ModkitError, Result};
use modkit_common::types::ServiceId;

use crate::event::{
    AfterServiceResolved, BeforeServiceResolved, Dispatcher, ServiceEvent, ServiceNotResolved,
};

/// The resolution engine compiled from a configurator.
///
/// Resolution is lazy: a service's factory runs the first time the id is
/// retrieved. Singleton-kind services are cached and their factory is
/// discarded after first use; factory-kind services re-invoke their factory
/// on every retrieval and are never cached. Extension chains apply once per
/// resolution event, and delegated containers are consulted only after the
/// local registry and cache miss.
pub struct ReadOnlyContainer {
    services: RefCell<HashMap<ServiceId, ServiceFactory>>,
    factory_ids: HashSet<ServiceId>,
    extensions: HashMap<ServiceId, Vec<ServiceExtension>>,
    resolved: RefCell<HashMap<ServiceId, ServiceValue>>,
    containers: Vec<Rc<dyn Container>>,
    dispatcher: Rc<Dispatcher>,
}

impl ReadOnlyContainer {
    /// Creates a container over the given registrations.
    #[must_use]
    pub fn new(
        services: HashMap<ServiceId, ServiceFactory>,
        factory_ids: HashSet<ServiceId>,
        extensions: HashMap<ServiceId, Vec<ServiceExtension>>,
        containers: Vec<Rc<dyn Container>>,
        dispatcher: Rc<Dispatcher>,
    ) -> Self {
        Self {
            services: RefCell::new(services),
            factory_ids,
            extensions,
            resolved: RefCell::new(HashMap::new()),
            containers,
            dispatcher,
        }
    }

    /// Applies the extension chain registered for `id`, in order.
    fn apply_extensions(&self, id: &str, mut value: ServiceValue) -> ServiceValue {
        if let Some(chain) = self.extensions.get(id) {
            for extension in chain {
                value = extension(value, self);
            }
        }
        value
    }

    /// Resolves a pending local registration.
    fn resolve_local(&self, service_id: &ServiceId, factory: &ServiceFactory) -> ServiceValue {
        let is_factory = self.factory_ids.contains(service_id);

        let mut event = ServiceEvent::BeforeServiceResolved(BeforeServiceResolved::new(
            service_id, self, false, is_factory,
        ));
        self.dispatcher.dispatch(&mut event);

        let value = factory(self);
        let value = self.apply_extensions(service_id.as_str(), value);

        if !is_factory {
            // The factory is dropped with the pending entry; subsequent
            // lookups hit the cache path and emit no events.
            let _ = self
                .resolved
                .borrow_mut()
                .insert(service_id.clone(), Rc::clone(&value));
            let _ = self.services.borrow_mut().remove(service_id.as_str());
        }

        let mut event = ServiceEvent::AfterServiceResolved(AfterServiceResolved::new(
            service_id,
            Rc::clone(&value),
            self,
            false,
            is_factory,
        ));
        self.dispatcher.dispatch(&mut event);

        value
    }

    /// Resolves `id` through a delegated container.
    fn resolve_delegated(
        &self,
        service_id: &ServiceId,
        container: &Rc<dyn Container>,
    ) -> Result<ServiceValue> {
        let mut event = ServiceEvent::BeforeServiceResolved(BeforeServiceResolved::new(
            service_id, self, true, false,
        ));
        self.dispatcher.dispatch(&mut event);

        let value = self.apply_extensions(service_id.as_str(), container.get(service_id.as_str())?);

        let mut event = ServiceEvent::AfterServiceResolved(AfterServiceResolved::new(
            service_id,
            Rc::clone(&value),
            self,
            true,
            false,
        ));
        self.dispatcher.dispatch(&mut event);

        Ok(value)
    }
}

impl Container for ReadOnlyContainer {
    fn has(&self, id: &str) -> bool {
        if self.services.borrow().contains_key(id) {
            return true;
        }
        if self.resolved.borrow().contains_key(id) {
            return true;
        }
        self.containers.iter().any(|container| container.has(id))
    }

    fn get(&self, id: &str) -> Result<ServiceValue> {
        if let Some(value) = self.resolved.borrow().get(id) {
            return Ok(Rc::clone(value));
        }

        let service_id = ServiceId::new(id);

        // Clone the factory handle out so no borrow is held while it runs;
        // factories may reenter `get` for their own dependencies.
        let pending = self.services.borrow().get(id).cloned();
        if let Some(factory) = pending {
            return Ok(self.resolve_local(&service_id, &factory));
        }

        for container in &self.containers {
            if container.has(id) {
                return self.resolve_delegated(&service_id, container);
            }
        }

        tracing::debug!(id, "service not found in any container");
        let error = ModkitError::NotFound {
            id: service_id.clone(),
        };
        let mut event =
            ServiceEvent::ServiceNotResolved(ServiceNotResolved::new(error, &service_id, self));
        self.dispatcher.dispatch(&mut event);

        let ServiceEvent::ServiceNotResolved(outcome) = event else {
            return Err(ModkitError::NotFound { id: service_id });
        };
        let value = outcome.into_result()?;
        let _ = self
            .resolved
            .borrow_mut()
            .insert(service_id, Rc::clone(&value));
        Ok(value)
    }
}
