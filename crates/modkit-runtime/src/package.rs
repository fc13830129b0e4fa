//! The package orchestrator and its boot state machine.

use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use modkit_common::constants::{HOOK_PREFIX, PROPERTIES_ID, connected_properties_id};
use modkit_common::container::{Container, ServiceValue};
use modkit_common::error::{ModkitError, Result};
use modkit_common::properties::Properties;
use modkit_common::types::{ModuleId, ModuleStatus, PackageStatus, ServiceId};
use modkit_core::container::{ContainerConfigurator, ReadOnlyContainer};
use modkit_core::event::{
    AfterServiceAdded, BeforeServiceAdded, Dispatcher, FilteredListeners, Listener,
    ListenerProvider, ModuleListeners, RegistrationKind, ServiceEvent,
};
use modkit_core::module::Module;

use crate::handle::BootHandle;
use crate::observer::{PackageAction, PackageObserver};
use crate::proxy::PackageProxyContainer;

/// Binds modules into one finished container with a defined boot lifecycle.
///
/// A package starts idle, accepting modules and connections.
/// [`boot`](Self::boot) locks additions, runs deferred executable modules
/// against the compiled container, and transitions to booted. On failure
/// it enters the absorbing failed state instead, re-raising the error in
/// debug mode and swallowing it in production.
///
/// Module aggregation is a FIFO work queue: listeners reacting to
/// registration events may stage further modules, which are appended and
/// drained within the same pass.
pub struct Package {
    properties: Properties,
    dispatcher: Rc<Dispatcher>,
    configurator: ContainerConfigurator,
    executables: Vec<Rc<dyn Module>>,
    progress: HashMap<ModuleStatus, Vec<ModuleId>>,
    timeline: Vec<String>,
    connected: HashMap<String, bool>,
    observers: Vec<Rc<dyn PackageObserver>>,
    module_listeners: Option<Rc<ModuleListeners>>,
    adhoc_listeners: Option<Rc<FilteredListeners>>,
    queue: VecDeque<Rc<dyn Module>>,
    handle: Rc<BootHandle>,
}

impl Package {
    /// Creates an idle package described by `properties`.
    ///
    /// The properties are immediately registered as a singleton service
    /// under the reserved [`PROPERTIES_ID`] id.
    #[must_use]
    pub fn new(properties: Properties) -> Self {
        Self::with_containers(properties, Vec::new())
    }

    /// Creates an idle package with pre-attached delegated containers.
    #[must_use]
    pub fn with_containers(properties: Properties, containers: Vec<Rc<dyn Container>>) -> Self {
        let dispatcher = Rc::new(Dispatcher::new());
        let mut configurator = ContainerConfigurator::new(Rc::clone(&dispatcher));
        for container in containers {
            configurator.add_container(container);
        }

        let own_properties = properties.clone();
        configurator.add_service(
            ServiceId::new(PROPERTIES_ID),
            Rc::new(move |_container: &dyn Container| {
                Rc::new(own_properties.clone()) as ServiceValue
            }),
        );

        let handle = Rc::new(BootHandle::new(properties.base_name()));

        Self {
            properties,
            dispatcher,
            configurator,
            executables: Vec::new(),
            progress: HashMap::new(),
            timeline: Vec::new(),
            connected: HashMap::new(),
            observers: Vec::new(),
            module_listeners: None,
            adhoc_listeners: None,
            queue: VecDeque::new(),
            handle,
        }
    }

    /// Returns the package properties.
    #[must_use]
    pub const fn properties(&self) -> &Properties {
        &self.properties
    }

    /// Returns the package name (the properties' base name).
    #[must_use]
    pub fn name(&self) -> &str {
        self.properties.base_name()
    }

    /// Returns the current lifecycle status.
    #[must_use]
    pub fn status(&self) -> PackageStatus {
        self.handle.status()
    }

    /// Returns whether the package is in the given status.
    #[must_use]
    pub fn status_is(&self, status: PackageStatus) -> bool {
        self.status() == status
    }

    /// Returns the namespaced name of an action fired by this package.
    #[must_use]
    pub fn hook_name(&self, action: PackageAction) -> String {
        format!("{}.{action}", self.hook_namespace())
    }

    /// Returns the action namespace of this package, e.g. `modkit.shop`.
    #[must_use]
    pub fn hook_namespace(&self) -> String {
        format!("{HOOK_PREFIX}{}", self.name())
    }

    /// Attaches an observer receiving this package's lifecycle
    /// notifications.
    pub fn add_observer(&mut self, observer: Rc<dyn PackageObserver>) -> &mut Self {
        self.observers.push(observer);
        self
    }

    /// Attaches an ad hoc listener receiving every service event.
    ///
    /// # Errors
    ///
    /// Fails with [`ModkitError::InvalidState`] unless the package is idle.
    pub fn listen<F>(&mut self, listener: F) -> Result<&mut Self>
    where
        F: Fn(&mut ServiceEvent<'_>) + 'static,
    {
        self.attach_listener(Rc::new(listener), Vec::new())
    }

    /// Attaches an ad hoc listener restricted to the given service ids.
    ///
    /// # Errors
    ///
    /// Fails with [`ModkitError::InvalidState`] unless the package is idle.
    pub fn listen_for<F, I>(&mut self, targets: I, listener: F) -> Result<&mut Self>
    where
        F: Fn(&mut ServiceEvent<'_>) + 'static,
        I: IntoIterator,
        I::Item: Into<ServiceId>,
    {
        let targets = targets.into_iter().map(Into::into).collect();
        self.attach_listener(Rc::new(listener), targets)
    }

    fn attach_listener(&mut self, listener: Listener, targets: Vec<ServiceId>) -> Result<&mut Self> {
        self.assert_idle("attach a listener")?;
        if self.adhoc_listeners.is_none() {
            let provider = Rc::new(FilteredListeners::new());
            self.dispatcher
                .attach_provider(Rc::clone(&provider) as Rc<dyn ListenerProvider>);
            self.adhoc_listeners = Some(provider);
        }
        if let Some(provider) = &self.adhoc_listeners {
            provider.add(listener, targets);
        }
        Ok(self)
    }

    /// Adds a module, processing all its roles immediately.
    ///
    /// Listener roles attach to the dispatcher before the module's own
    /// registrations are processed, so a listening module observes the rest
    /// of the pass, including its own contributions. Modules staged by
    /// listeners during the pass are drained from the same FIFO queue.
    ///
    /// # Errors
    ///
    /// Fails with [`ModkitError::InvalidState`] unless the package is idle.
    pub fn add_module(&mut self, module: Rc<dyn Module>) -> Result<&mut Self> {
        self.assert_idle("add a module")?;
        self.queue.push_back(module);
        self.drain_queue();
        Ok(self)
    }

    /// Boots the package: adds `modules`, notifies the init phase, locks
    /// additions, runs deferred executables, and notifies readiness.
    ///
    /// Returns `Ok(true)` on success. A failure during boot transitions the
    /// package to failed, notifies observers, and then either re-raises the
    /// original error (debug mode) or returns `Ok(false)` (production).
    ///
    /// # Errors
    ///
    /// Fails with [`ModkitError::InvalidState`] when the package is not
    /// idle, without transitioning to failed, since status transitions are
    /// one-directional. In debug mode the boot failure itself is returned.
    pub fn boot(&mut self, modules: Vec<Rc<dyn Module>>) -> Result<bool> {
        self.assert_idle("boot the package")?;

        match self.try_boot(modules) {
            Ok(()) => {
                self.handle.publish(self.configurator.create_read_only_container());
                self.handle.set_status(PackageStatus::Booted);
                tracing::info!(package = self.name(), "package booted");
                Ok(true)
            }
            Err(error) => {
                self.handle.set_status(PackageStatus::Failed);
                tracing::error!(package = self.name(), %error, "boot failed");
                let observers = self.observers.clone();
                for observer in &observers {
                    observer.failed_boot(self, &error);
                }
                if self.properties.is_debug() {
                    Err(error)
                } else {
                    Ok(false)
                }
            }
        }
    }

    fn try_boot(&mut self, modules: Vec<Rc<dyn Module>>) -> Result<()> {
        for module in modules {
            let _ = self.add_module(module)?;
        }

        // Init phase: observers may still add modules here.
        let observers = self.observers.clone();
        for observer in &observers {
            observer.init(self);
        }

        self.handle.set_status(PackageStatus::Initialized);
        tracing::info!(package = self.name(), "package initialized");

        self.execute_modules()?;

        let observers = self.observers.clone();
        for observer in &observers {
            observer.ready(self);
        }
        Ok(())
    }

    /// Runs all deferred executable modules in registration order.
    ///
    /// An executable error is recorded and retained but does not stop the
    /// remaining executables; the first error becomes the boot failure.
    fn execute_modules(&mut self) -> Result<()> {
        if self.executables.is_empty() {
            return Ok(());
        }

        let container = self.container()?;
        let executables = self.executables.clone();
        let mut first_error: Option<ModkitError> = None;

        for module in &executables {
            let Some(executable) = module.as_executable() else {
                continue;
            };
            match executable.run(container.as_ref()) {
                Ok(true) => self.record_module(module.id(), ModuleStatus::Executed, None),
                Ok(false) => self.record_module(module.id(), ModuleStatus::ExecutionFailed, None),
                Err(error) => {
                    tracing::error!(module = %module.id(), %error, "executable module failed");
                    self.record_module(module.id(), ModuleStatus::ExecutionFailed, None);
                    if first_error.is_none() {
                        first_error = Some(ModkitError::Execution {
                            module: module.id(),
                            source: Box::new(error),
                        });
                    }
                }
            }
        }

        first_error.map_or(Ok(()), Err)
    }

    /// Links another package's services into this package's container.
    ///
    /// If `other` has already booted its real container is linked; otherwise
    /// a proxy is linked that starts answering once `other` boots. The
    /// target's properties become resolvable under `<name>.properties`.
    ///
    /// # Errors
    ///
    /// Fails with [`ModkitError::ConnectionRefused`] for self-connections
    /// and when this package has already booted or failed, and with
    /// [`ModkitError::AlreadyConnected`] when a package of the same name was
    /// connected before. Refusals are also reported to observers.
    pub fn connect(&mut self, other: &Self) -> Result<()> {
        let package_name = other.name().to_string();

        if package_name == self.name() {
            return Err(ModkitError::ConnectionRefused {
                package: package_name,
                reason: "a package cannot connect to itself".into(),
            });
        }

        if self.connected.contains_key(&package_name) {
            let error = ModkitError::AlreadyConnected {
                package: package_name.clone(),
            };
            self.notify_failed_connection(&package_name, &error);
            return Err(error);
        }

        if matches!(self.status(), PackageStatus::Booted | PackageStatus::Failed) {
            let _ = self.connected.insert(package_name.clone(), false);
            let error = ModkitError::ConnectionRefused {
                package: package_name.clone(),
                reason: format!("connecting package is already {}", self.status()),
            };
            self.notify_failed_connection(&package_name, &error);
            return Err(error);
        }

        let _ = self.connected.insert(package_name.clone(), true);

        // Expose the connected package's properties in this container so
        // modules can inspect them from their run method.
        let other_properties = other.properties().clone();
        self.configurator.add_service(
            ServiceId::new(connected_properties_id(&package_name)),
            Rc::new(move |_container: &dyn Container| {
                Rc::new(other_properties.clone()) as ServiceValue
            }),
        );

        let via_proxy = !other.status_is(PackageStatus::Booted);
        let container: Rc<dyn Container> = if via_proxy {
            Rc::new(PackageProxyContainer::new(Rc::clone(&other.handle)))
        } else {
            other.container()?
        };
        self.configurator.add_container(container);

        tracing::info!(
            package = self.name(),
            connected = %package_name,
            via_proxy,
            "package connected"
        );
        let observers = self.observers.clone();
        for observer in &observers {
            observer.package_connected(self, &package_name, via_proxy);
        }
        Ok(())
    }

    /// Returns the compiled read-only container.
    ///
    /// # Errors
    ///
    /// Fails with [`ModkitError::InvalidState`] before the package is
    /// initialized, or after a failed boot.
    pub fn container(&self) -> Result<Rc<ReadOnlyContainer>> {
        match self.status() {
            PackageStatus::Initialized | PackageStatus::Booted => {
                Ok(self.configurator.create_read_only_container())
            }
            status => Err(ModkitError::InvalidState {
                action: "access the container".into(),
                status,
            }),
        }
    }

    /// Returns whether `module_id` was recorded with the given status.
    #[must_use]
    pub fn module_is(&self, module_id: &str, status: ModuleStatus) -> bool {
        self.progress
            .get(&status)
            .is_some_and(|ids| ids.iter().any(|id| id.as_str() == module_id))
    }

    /// Returns the per-status module id lists.
    #[must_use]
    pub const fn modules_status(&self) -> &HashMap<ModuleStatus, Vec<ModuleId>> {
        &self.progress
    }

    /// Returns the human-readable module progress timeline.
    ///
    /// In debug mode, registration entries carry the contributed service
    /// ids.
    #[must_use]
    pub fn modules_timeline(&self) -> &[String] {
        &self.timeline
    }

    /// Returns the connection outcome per offered package name.
    #[must_use]
    pub const fn connected_packages(&self) -> &HashMap<String, bool> {
        &self.connected
    }

    /// Returns whether the named package is successfully connected.
    #[must_use]
    pub fn is_package_connected(&self, package_name: &str) -> bool {
        self.connected.get(package_name).copied().unwrap_or(false)
    }

    fn assert_idle(&self, action: &str) -> Result<()> {
        if self.status() == PackageStatus::Idle {
            Ok(())
        } else {
            Err(ModkitError::InvalidState {
                action: action.into(),
                status: self.status(),
            })
        }
    }

    fn drain_queue(&mut self) {
        while let Some(module) = self.queue.pop_front() {
            self.process_module(&module);
        }
    }

    fn process_module(&mut self, module: &Rc<dyn Module>) {
        self.attach_listener_roles(module);

        let registered = self.register_services(module, false);
        let registered_factories = self.register_services(module, true);
        let extended = self.register_extensions(module);

        // Executable modules are collected and run on boot, once the
        // container is compiled.
        let is_executable = module.as_executable().is_some();
        if is_executable {
            self.executables.push(Rc::clone(module));
        }

        let added = registered || registered_factories || extended || is_executable;
        let status = if added {
            ModuleStatus::Added
        } else {
            ModuleStatus::NotAdded
        };
        self.record_module(module.id(), status, None);
        tracing::debug!(module = %module.id(), added, "module processed");
    }

    fn attach_listener_roles(&mut self, module: &Rc<dyn Module>) {
        if let Some(provider) = module.listener_provider() {
            self.dispatcher.attach_provider(provider);
        }

        if module.as_listening().is_some() {
            if self.module_listeners.is_none() {
                let provider = Rc::new(ModuleListeners::new());
                self.dispatcher
                    .attach_provider(Rc::clone(&provider) as Rc<dyn ListenerProvider>);
                self.module_listeners = Some(provider);
            }
            if let Some(provider) = &self.module_listeners {
                provider.add_module(Rc::clone(module));
            }
        }
    }

    /// Registers one role's service bindings, emitting events per id.
    ///
    /// Returns whether the role contributed bindings at all, vetoed or not.
    fn register_services(&mut self, module: &Rc<dyn Module>, factory_kind: bool) -> bool {
        let bindings = if factory_kind {
            module.factories()
        } else {
            module.services()
        };
        if bindings.is_empty() {
            return false;
        }

        let module_id = module.id();
        let mut added_ids = Vec::new();

        for (service_id, factory) in bindings {
            let is_override = self.configurator.has_service(service_id.as_str());
            let kind = RegistrationKind::derive(factory_kind, false, is_override);

            if !self.dispatch_before_added(kind, &service_id, &module_id) {
                self.notify_service_not_registered(&service_id, &module_id);
                continue;
            }

            if factory_kind {
                self.configurator.add_factory(service_id.clone(), factory);
            } else {
                self.configurator.add_service(service_id.clone(), factory);
            }

            self.dispatch_after_added(kind, &service_id, &module_id);
            added_ids.push(service_id);
        }

        let status = if factory_kind {
            ModuleStatus::RegisteredFactories
        } else {
            ModuleStatus::Registered
        };
        self.record_module(module_id, status, Some(&added_ids));
        true
    }

    /// Registers one module's extension bindings, emitting events per id.
    fn register_extensions(&mut self, module: &Rc<dyn Module>) -> bool {
        let bindings = module.extensions();
        if bindings.is_empty() {
            return false;
        }

        let module_id = module.id();
        let mut added_ids = Vec::new();

        for (service_id, extension) in bindings {
            let kind = RegistrationKind::Extend;

            if !self.dispatch_before_added(kind, &service_id, &module_id) {
                self.notify_service_not_registered(&service_id, &module_id);
                continue;
            }

            self.configurator.add_extension(service_id.clone(), extension);
            self.dispatch_after_added(kind, &service_id, &module_id);
            added_ids.push(service_id);
        }

        self.record_module(module_id, ModuleStatus::Extended, Some(&added_ids));
        true
    }

    /// Dispatches the pre-registration event; returns whether the
    /// registration is still allowed. Staged modules join the work queue.
    fn dispatch_before_added(
        &mut self,
        kind: RegistrationKind,
        service_id: &ServiceId,
        module_id: &ModuleId,
    ) -> bool {
        let (enabled, staged) = {
            let mut event = ServiceEvent::BeforeServiceAdded(BeforeServiceAdded::new(
                kind,
                service_id,
                module_id,
                &self.properties,
            ));
            self.dispatcher.dispatch(&mut event);
            let staged = event.take_staged_modules();
            let enabled = match &event {
                ServiceEvent::BeforeServiceAdded(event) => event.is_service_enabled(),
                _ => true,
            };
            (enabled, staged)
        };
        self.queue.extend(staged);
        enabled
    }

    /// Dispatches the post-registration event. Staged modules join the
    /// work queue.
    fn dispatch_after_added(
        &mut self,
        kind: RegistrationKind,
        service_id: &ServiceId,
        module_id: &ModuleId,
    ) {
        let staged = {
            let mut event = ServiceEvent::AfterServiceAdded(AfterServiceAdded::new(
                kind,
                service_id,
                module_id,
                &self.properties,
            ));
            self.dispatcher.dispatch(&mut event);
            event.take_staged_modules()
        };
        self.queue.extend(staged);
    }

    fn notify_service_not_registered(&mut self, service_id: &ServiceId, module_id: &ModuleId) {
        tracing::debug!(
            service = %service_id,
            module = %module_id,
            "service registration vetoed by a listener"
        );
        let observers = self.observers.clone();
        for observer in &observers {
            observer.service_not_registered(self, service_id, module_id);
        }
    }

    fn notify_failed_connection(&mut self, package_name: &str, error: &ModkitError) {
        tracing::debug!(package = self.name(), target = package_name, %error, "connection refused");
        let observers = self.observers.clone();
        for observer in &observers {
            observer.failed_connection(self, package_name, error);
        }
    }

    fn record_module(
        &mut self,
        module_id: ModuleId,
        status: ModuleStatus,
        service_ids: Option<&[ServiceId]>,
    ) {
        self.progress.entry(status).or_default().push(module_id.clone());

        match service_ids {
            Some(ids) if self.properties.is_debug() && !ids.is_empty() => {
                let list = ids.iter().map(ServiceId::as_str).collect::<Vec<_>>().join(", ");
                self.timeline.push(format!("{module_id} {status} ({list})"));
            }
            _ => self.timeline.push(format!("{module_id} {status}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_package_is_idle() {
        let package = Package::new(Properties::new("shop"));
        assert!(package.status_is(PackageStatus::Idle));
        assert_eq!(package.name(), "shop");
    }

    #[test]
    fn hook_names_are_namespaced() {
        let package = Package::new(Properties::new("shop"));
        assert_eq!(package.hook_namespace(), "modkit.shop");
        assert_eq!(package.hook_name(PackageAction::Ready), "modkit.shop.ready");
        assert_eq!(
            package.hook_name(PackageAction::FailedBoot),
            "modkit.shop.failed-boot"
        );
    }

    #[test]
    fn container_access_requires_initialization() {
        let package = Package::new(Properties::new("shop"));
        assert!(matches!(
            package.container(),
            Err(ModkitError::InvalidState { .. })
        ));
    }

    #[test]
    fn properties_are_a_reserved_service() {
        let mut package = Package::new(Properties::new("shop").with_version("2.0.0"));
        assert!(package.boot(Vec::new()).expect("should boot"));

        let container = package.container().expect("should be available");
        let properties = modkit_common::container::service::<Properties>(
            container.as_ref(),
            PROPERTIES_ID,
        )
        .expect("should resolve");
        assert_eq!(properties.base_name(), "shop");
        assert_eq!(properties.version(), Some("2.0.0"));
    }

    #[test]
    fn booting_twice_is_an_invalid_state() {
        let mut package = Package::new(Properties::new("shop"));
        assert!(package.boot(Vec::new()).expect("should boot"));

        // The status stays booted; no transition is reversed or repeated.
        let result = package.boot(Vec::new());
        assert!(matches!(result, Err(ModkitError::InvalidState { .. })));
        assert!(package.status_is(PackageStatus::Booted));
    }

    #[test]
    fn modules_cannot_be_added_after_boot() {
        struct Empty;
        impl Module for Empty {
            fn id(&self) -> ModuleId {
                ModuleId::new("empty")
            }
        }

        let mut package = Package::new(Properties::new("shop"));
        assert!(package.boot(Vec::new()).expect("should boot"));
        let result = package.add_module(Rc::new(Empty));
        assert!(matches!(result, Err(ModkitError::InvalidState { .. })));
    }
}
