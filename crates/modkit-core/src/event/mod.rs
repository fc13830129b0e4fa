//! Typed service events describing registration and resolution moments.
//!
//! Events form a closed set of variants; listeners pattern-match on the
//! variant they care about and ignore the rest. Control flow back to the
//! emitter is explicit event state: a one-way stop-propagation flag on every
//! variant, a one-way disable flag on pre-registration events, a recovery
//! slot on the not-resolved event, and a module staging queue on registration
//! events through which listeners grow the current registration pass.

mod dispatcher;
mod provider;

use std::fmt;
use std::rc::Rc;

use modkit_common::container::{Container, ServiceValue};
use modkit_common::error::{ModkitError, Result};
use modkit_common::properties::Properties;
use modkit_common::types::{ModuleId, ServiceId};

use crate::module::Module;

pub use dispatcher::Dispatcher;
pub use provider::{FilteredListeners, Listener, ListenerProvider, ModuleListeners};

/// How a service id is being added to the configurator.
///
/// The kind depends on the contributing role (service, factory, extension)
/// and on whether the id is already registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegistrationKind {
    /// A singleton service with a previously unknown id.
    Register,
    /// A factory service with a previously unknown id.
    RegisterFactory,
    /// A singleton service replacing an existing registration.
    Override,
    /// A factory service replacing an existing registration.
    OverrideWithFactory,
    /// An extension appended to an id's chain.
    Extend,
}

impl RegistrationKind {
    /// Derives the kind from the contributing role and override state.
    #[must_use]
    pub const fn derive(is_factory: bool, is_extension: bool, is_override: bool) -> Self {
        match (is_extension, is_factory, is_override) {
            (true, ..) => Self::Extend,
            (false, true, true) => Self::OverrideWithFactory,
            (false, true, false) => Self::RegisterFactory,
            (false, false, true) => Self::Override,
            (false, false, false) => Self::Register,
        }
    }
}

impl fmt::Display for RegistrationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Register => write!(f, "register"),
            Self::RegisterFactory => write!(f, "register-factory"),
            Self::Override => write!(f, "override"),
            Self::OverrideWithFactory => write!(f, "override-with-factory"),
            Self::Extend => write!(f, "extend"),
        }
    }
}

/// Emitted before a service id is added to the configurator.
///
/// Listeners may veto the registration with
/// [`disable_service`](Self::disable_service) or stage further modules for
/// the current pass with [`queue_module`](Self::queue_module).
pub struct BeforeServiceAdded<'a> {
    kind: RegistrationKind,
    service_id: &'a ServiceId,
    module_id: &'a ModuleId,
    properties: &'a Properties,
    enabled: bool,
    stopped: bool,
    staged: Vec<Rc<dyn Module>>,
}

impl<'a> BeforeServiceAdded<'a> {
    /// Creates the event for one pending registration.
    #[must_use]
    pub const fn new(
        kind: RegistrationKind,
        service_id: &'a ServiceId,
        module_id: &'a ModuleId,
        properties: &'a Properties,
    ) -> Self {
        Self {
            kind,
            service_id,
            module_id,
            properties,
            enabled: true,
            stopped: false,
            staged: Vec::new(),
        }
    }

    /// Returns the registration kind.
    #[must_use]
    pub const fn kind(&self) -> RegistrationKind {
        self.kind
    }

    /// Returns the service id being registered.
    #[must_use]
    pub const fn service_id(&self) -> &ServiceId {
        self.service_id
    }

    /// Returns the id of the contributing module.
    #[must_use]
    pub const fn module_id(&self) -> &ModuleId {
        self.module_id
    }

    /// Returns the properties of the registering package.
    #[must_use]
    pub const fn properties(&self) -> &Properties {
        self.properties
    }

    /// Vetoes this registration; the id will not be added.
    pub const fn disable_service(&mut self) {
        self.enabled = false;
    }

    /// Re-allows a previously vetoed registration.
    pub const fn enable_service(&mut self) {
        self.enabled = true;
    }

    /// Returns whether the registration is still allowed.
    #[must_use]
    pub const fn is_service_enabled(&self) -> bool {
        self.enabled
    }

    /// Stages a module for addition once the current dispatch returns.
    pub fn queue_module(&mut self, module: Rc<dyn Module>) {
        self.staged.push(module);
    }
}

/// Emitted after a service id has been added to the configurator.
///
/// Listeners may stage further modules for the current registration pass
/// with [`queue_module`](Self::queue_module).
pub struct AfterServiceAdded<'a> {
    kind: RegistrationKind,
    service_id: &'a ServiceId,
    module_id: &'a ModuleId,
    properties: &'a Properties,
    stopped: bool,
    staged: Vec<Rc<dyn Module>>,
}

impl<'a> AfterServiceAdded<'a> {
    /// Creates the event for one completed registration.
    #[must_use]
    pub const fn new(
        kind: RegistrationKind,
        service_id: &'a ServiceId,
        module_id: &'a ModuleId,
        properties: &'a Properties,
    ) -> Self {
        Self {
            kind,
            service_id,
            module_id,
            properties,
            stopped: false,
            staged: Vec::new(),
        }
    }

    /// Returns the registration kind.
    #[must_use]
    pub const fn kind(&self) -> RegistrationKind {
        self.kind
    }

    /// Returns the registered service id.
    #[must_use]
    pub const fn service_id(&self) -> &ServiceId {
        self.service_id
    }

    /// Returns the id of the contributing module.
    #[must_use]
    pub const fn module_id(&self) -> &ModuleId {
        self.module_id
    }

    /// Returns the properties of the registering package.
    #[must_use]
    pub const fn properties(&self) -> &Properties {
        self.properties
    }

    /// Stages a module for addition once the current dispatch returns.
    pub fn queue_module(&mut self, module: Rc<dyn Module>) {
        self.staged.push(module);
    }
}

/// Emitted before a service is resolved by a container.
pub struct BeforeServiceResolved<'a> {
    service_id: &'a ServiceId,
    container: &'a dyn Container,
    external: bool,
    factory: bool,
    stopped: bool,
}

impl<'a> BeforeServiceResolved<'a> {
    /// Creates the event for one pending resolution.
    #[must_use]
    pub const fn new(
        service_id: &'a ServiceId,
        container: &'a dyn Container,
        external: bool,
        factory: bool,
    ) -> Self {
        Self {
            service_id,
            container,
            external,
            factory,
            stopped: false,
        }
    }

    /// Returns the service id being resolved.
    #[must_use]
    pub const fn service_id(&self) -> &ServiceId {
        self.service_id
    }

    /// Returns the resolving container.
    #[must_use]
    pub const fn container(&self) -> &'a dyn Container {
        self.container
    }

    /// Returns whether the value comes from a delegated container.
    #[must_use]
    pub const fn is_external(&self) -> bool {
        self.external
    }

    /// Returns whether the service is factory-kind (re-invoked per `get`).
    #[must_use]
    pub const fn is_factory(&self) -> bool {
        self.factory
    }
}

/// Emitted after a service has been resolved, carrying the resolved value.
pub struct AfterServiceResolved<'a> {
    service_id: &'a ServiceId,
    value: ServiceValue,
    container: &'a dyn Container,
    external: bool,
    factory: bool,
    stopped: bool,
}

impl<'a> AfterServiceResolved<'a> {
    /// Creates the event for one completed resolution.
    #[must_use]
    pub fn new(
        service_id: &'a ServiceId,
        value: ServiceValue,
        container: &'a dyn Container,
        external: bool,
        factory: bool,
    ) -> Self {
        Self {
            service_id,
            value,
            container,
            external,
            factory,
            stopped: false,
        }
    }

    /// Returns the resolved service id.
    #[must_use]
    pub const fn service_id(&self) -> &ServiceId {
        self.service_id
    }

    /// Returns the resolved value, after extension chains were applied.
    #[must_use]
    pub const fn value(&self) -> &ServiceValue {
        &self.value
    }

    /// Returns the resolving container.
    #[must_use]
    pub const fn container(&self) -> &'a dyn Container {
        self.container
    }

    /// Returns whether the value came from a delegated container.
    #[must_use]
    pub const fn is_external(&self) -> bool {
        self.external
    }

    /// Returns whether the service is factory-kind (re-invoked per `get`).
    #[must_use]
    pub const fn is_factory(&self) -> bool {
        self.factory
    }
}

/// Emitted when no container could resolve a service id.
///
/// A listener may supply a last-chance value with
/// [`recover_with`](ServiceNotResolved::recover_with); otherwise the carried
/// error propagates to the caller of `get`.
pub struct ServiceNotResolved<'a> {
    service_id: &'a ServiceId,
    container: &'a dyn Container,
    error: ModkitError,
    recovered: Option<ServiceValue>,
    stopped: bool,
}

impl<'a> ServiceNotResolved<'a> {
    /// Creates the event for one failed resolution.
    #[must_use]
    pub const fn new(
        error: ModkitError,
        service_id: &'a ServiceId,
        container: &'a dyn Container,
    ) -> Self {
        Self {
            service_id,
            container,
            error,
            recovered: None,
            stopped: false,
        }
    }

    /// Returns the unresolvable service id.
    #[must_use]
    pub const fn service_id(&self) -> &ServiceId {
        self.service_id
    }

    /// Returns the container the lookup failed in.
    #[must_use]
    pub const fn container(&self) -> &'a dyn Container {
        self.container
    }

    /// Returns the failure that triggered this event.
    #[must_use]
    pub const fn error(&self) -> &ModkitError {
        &self.error
    }

    /// Supplies a recovery value for the failed lookup.
    pub fn recover_with(&mut self, value: ServiceValue) {
        self.recovered = Some(value);
    }

    /// Returns whether a listener supplied a recovery value.
    #[must_use]
    pub const fn has_recovery(&self) -> bool {
        self.recovered.is_some()
    }

    /// Consumes the event, yielding the recovery value or the original error.
    pub fn into_result(self) -> Result<ServiceValue> {
        self.recovered.ok_or(self.error)
    }
}

/// A moment in the registration or resolution of a service.
///
/// The set of variants is closed; foreign event types are unrepresentable.
pub enum ServiceEvent<'a> {
    /// A service id is about to be added to the configurator.
    BeforeServiceAdded(BeforeServiceAdded<'a>),
    /// A service id has been added to the configurator.
    AfterServiceAdded(AfterServiceAdded<'a>),
    /// A service is about to be resolved.
    BeforeServiceResolved(BeforeServiceResolved<'a>),
    /// A service has been resolved.
    AfterServiceResolved(AfterServiceResolved<'a>),
    /// No container could resolve a service id.
    ServiceNotResolved(ServiceNotResolved<'a>),
}

impl ServiceEvent<'_> {
    /// Returns the service id this event is about.
    #[must_use]
    pub const fn service_id(&self) -> &ServiceId {
        match self {
            Self::BeforeServiceAdded(event) => event.service_id(),
            Self::AfterServiceAdded(event) => event.service_id(),
            Self::BeforeServiceResolved(event) => event.service_id(),
            Self::AfterServiceResolved(event) => event.service_id(),
            Self::ServiceNotResolved(event) => event.service_id(),
        }
    }

    /// Stops propagation: no further listener receives this dispatch.
    ///
    /// The flag is one-way; a stopped event cannot be restarted.
    pub const fn stop_propagation(&mut self) {
        match self {
            Self::BeforeServiceAdded(event) => event.stopped = true,
            Self::AfterServiceAdded(event) => event.stopped = true,
            Self::BeforeServiceResolved(event) => event.stopped = true,
            Self::AfterServiceResolved(event) => event.stopped = true,
            Self::ServiceNotResolved(event) => event.stopped = true,
        }
    }

    /// Returns whether propagation has been stopped.
    #[must_use]
    pub const fn is_propagation_stopped(&self) -> bool {
        match self {
            Self::BeforeServiceAdded(event) => event.stopped,
            Self::AfterServiceAdded(event) => event.stopped,
            Self::BeforeServiceResolved(event) => event.stopped,
            Self::AfterServiceResolved(event) => event.stopped,
            Self::ServiceNotResolved(event) => event.stopped,
        }
    }

    /// Drains the modules staged by listeners during this dispatch.
    ///
    /// Only registration events carry a staging queue; other variants yield
    /// an empty list.
    #[must_use]
    pub fn take_staged_modules(&mut self) -> Vec<Rc<dyn Module>> {
        match self {
            Self::BeforeServiceAdded(event) => std::mem::take(&mut event.staged),
            Self::AfterServiceAdded(event) => std::mem::take(&mut event.staged),
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_kind_derivation() {
        assert_eq!(RegistrationKind::derive(false, false, false), RegistrationKind::Register);
        assert_eq!(
            RegistrationKind::derive(true, false, false),
            RegistrationKind::RegisterFactory
        );
        assert_eq!(RegistrationKind::derive(false, false, true), RegistrationKind::Override);
        assert_eq!(
            RegistrationKind::derive(true, false, true),
            RegistrationKind::OverrideWithFactory
        );
        // Extensions win regardless of the other flags.
        assert_eq!(RegistrationKind::derive(false, true, true), RegistrationKind::Extend);
    }

    #[test]
    fn registration_kind_display() {
        assert_eq!(RegistrationKind::OverrideWithFactory.to_string(), "override-with-factory");
        assert_eq!(RegistrationKind::Extend.to_string(), "extend");
    }

    #[test]
    fn before_added_disable_is_reversible_until_dispatch_ends() {
        let service_id = ServiceId::new("cache");
        let module_id = ModuleId::new("caching");
        let properties = Properties::new("app");
        let mut event =
            BeforeServiceAdded::new(RegistrationKind::Register, &service_id, &module_id, &properties);

        assert!(event.is_service_enabled());
        event.disable_service();
        assert!(!event.is_service_enabled());
        event.enable_service();
        assert!(event.is_service_enabled());
    }

    #[test]
    fn stop_propagation_is_one_way() {
        let service_id = ServiceId::new("cache");
        let module_id = ModuleId::new("caching");
        let properties = Properties::new("app");
        let mut event = ServiceEvent::AfterServiceAdded(AfterServiceAdded::new(
            RegistrationKind::Register,
            &service_id,
            &module_id,
            &properties,
        ));

        assert!(!event.is_propagation_stopped());
        event.stop_propagation();
        assert!(event.is_propagation_stopped());
    }

    #[test]
    fn not_resolved_yields_error_without_recovery() {
        struct Empty;
        impl Container for Empty {
            fn has(&self, _id: &str) -> bool {
                false
            }
            fn get(&self, id: &str) -> Result<ServiceValue> {
                Err(ModkitError::NotFound { id: ServiceId::new(id) })
            }
        }

        let container = Empty;
        let service_id = ServiceId::new("ghost");
        let error = ModkitError::NotFound { id: service_id.clone() };
        let event = ServiceNotResolved::new(error, &service_id, &container);

        assert!(!event.has_recovery());
        assert!(matches!(event.into_result(), Err(ModkitError::NotFound { .. })));
    }

    #[test]
    fn not_resolved_yields_the_recovery_value() {
        struct Empty;
        impl Container for Empty {
            fn has(&self, _id: &str) -> bool {
                false
            }
            fn get(&self, id: &str) -> Result<ServiceValue> {
                Err(ModkitError::NotFound { id: ServiceId::new(id) })
            }
        }

        let container = Empty;
        let service_id = ServiceId::new("ghost");
        let error = ModkitError::NotFound { id: service_id.clone() };
        let mut event = ServiceNotResolved::new(error, &service_id, &container);

        event.recover_with(Rc::new("fallback".to_string()));
        let value = event.into_result().expect("should recover");
        assert_eq!(
            value.downcast::<String>().expect("should be a string").as_str(),
            "fallback"
        );
    }
}
