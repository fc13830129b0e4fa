//! Listener providers: sources of ordered listener lists per event.
//!
//! Two providers cover the two ways listeners reach the dispatcher: ad hoc
//! callables with an optional service-id filter, and whole modules exposing
//! a listening role. Filtering beyond the service id is the listener's own
//! pattern-match on the event variant.

use std::cell::RefCell;
use std::rc::Rc;

use modkit_common::types::ServiceId;

use super::ServiceEvent;
use crate::module::Module;

/// A callable invoked with each dispatched service event.
pub type Listener = Rc<dyn Fn(&mut ServiceEvent<'_>)>;

/// Yields the ordered listeners interested in a given event.
pub trait ListenerProvider {
    /// Returns the listeners to invoke for `event`, in invocation order.
    fn listeners_for(&self, event: &ServiceEvent<'_>) -> Vec<Listener>;
}

/// Ad hoc listeners, each optionally restricted to a set of service ids.
///
/// An empty filter set means the listener receives events for all ids.
#[derive(Default)]
pub struct FilteredListeners {
    entries: RefCell<Vec<(Listener, Vec<ServiceId>)>>,
}

impl FilteredListeners {
    /// Creates an empty listener collection.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: RefCell::new(Vec::new()),
        }
    }

    /// Appends a listener, restricted to `targets` (empty = all ids).
    pub fn add(&self, listener: Listener, targets: Vec<ServiceId>) {
        self.entries.borrow_mut().push((listener, targets));
    }
}

impl ListenerProvider for FilteredListeners {
    fn listeners_for(&self, event: &ServiceEvent<'_>) -> Vec<Listener> {
        self.entries
            .borrow()
            .iter()
            .filter(|(_, targets)| {
                targets.is_empty() || targets.iter().any(|target| target == event.service_id())
            })
            .map(|(listener, _)| Rc::clone(listener))
            .collect()
    }
}

/// Modules attached through their listening role.
///
/// Every service event is handed to every attached module's `listen`; the
/// module decides which variants it reacts to.
#[derive(Default)]
pub struct ModuleListeners {
    modules: RefCell<Vec<Rc<dyn Module>>>,
}

impl ModuleListeners {
    /// Creates an empty module listener collection.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            modules: RefCell::new(Vec::new()),
        }
    }

    /// Appends a module; only its listening role is consulted at dispatch.
    pub fn add_module(&self, module: Rc<dyn Module>) {
        self.modules.borrow_mut().push(module);
    }
}

impl ListenerProvider for ModuleListeners {
    fn listeners_for(&self, _event: &ServiceEvent<'_>) -> Vec<Listener> {
        self.modules
            .borrow()
            .iter()
            .filter(|module| module.as_listening().is_some())
            .map(|module| {
                let module = Rc::clone(module);
                Rc::new(move |event: &mut ServiceEvent<'_>| {
                    if let Some(listening) = module.as_listening() {
                        listening.listen(event);
                    }
                }) as Listener
            })
            .collect()
    }
}
