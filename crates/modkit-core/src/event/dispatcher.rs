//! Event dispatch across attached listener providers.

use std::cell::RefCell;
use std::rc::Rc;

use super::provider::ListenerProvider;
use super::ServiceEvent;

/// Routes service events to the listeners of every attached provider.
///
/// Providers are consulted in attachment order; listeners run in the order
/// their provider yields them. Once an event reports itself stopped, the
/// remaining listeners of the current provider and all remaining providers
/// are skipped.
#[derive(Default)]
pub struct Dispatcher {
    providers: RefCell<Vec<Rc<dyn ListenerProvider>>>,
}

impl Dispatcher {
    /// Creates a dispatcher with no providers attached.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            providers: RefCell::new(Vec::new()),
        }
    }

    /// Attaches a listener provider after all previously attached ones.
    pub fn attach_provider(&self, provider: Rc<dyn ListenerProvider>) {
        self.providers.borrow_mut().push(provider);
    }

    /// Dispatches `event` to all interested listeners, in order.
    ///
    /// Listeners receive the event mutably and may flip its control flags;
    /// the event is left in place for the emitter to inspect afterwards.
    pub fn dispatch(&self, event: &mut ServiceEvent<'_>) {
        // Snapshot so no borrow is held while listener code runs.
        let providers: Vec<Rc<dyn ListenerProvider>> = self.providers.borrow().clone();

        for provider in providers {
            for listener in provider.listeners_for(event) {
                if event.is_propagation_stopped() {
                    return;
                }
                listener(event);
            }
            if event.is_propagation_stopped() {
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use modkit_common::properties::Properties;
    use modkit_common::types::{ModuleId, ServiceId};

    use super::super::{AfterServiceAdded, FilteredListeners, Listener, RegistrationKind};
    use super::*;

    fn after_added_event<'a>(
        service_id: &'a ServiceId,
        module_id: &'a ModuleId,
        properties: &'a Properties,
    ) -> ServiceEvent<'a> {
        ServiceEvent::AfterServiceAdded(AfterServiceAdded::new(
            RegistrationKind::Register,
            service_id,
            module_id,
            properties,
        ))
    }

    #[test]
    fn listeners_run_in_attachment_order() {
        let trace = Rc::new(RefCell::new(String::new()));
        let provider = Rc::new(FilteredListeners::new());
        for tag in ["a", "b", "c"] {
            let trace = Rc::clone(&trace);
            provider.add(
                Rc::new(move |_event: &mut ServiceEvent<'_>| trace.borrow_mut().push_str(tag))
                    as Listener,
                Vec::new(),
            );
        }

        let dispatcher = Dispatcher::new();
        dispatcher.attach_provider(provider);

        let service_id = ServiceId::new("svc");
        let module_id = ModuleId::new("mod");
        let properties = Properties::new("app");
        let mut event = after_added_event(&service_id, &module_id, &properties);
        dispatcher.dispatch(&mut event);

        assert_eq!(trace.borrow().as_str(), "abc");
    }

    #[test]
    fn stop_skips_remaining_listeners_and_providers() {
        let trace = Rc::new(RefCell::new(String::new()));

        let first = Rc::new(FilteredListeners::new());
        {
            let trace = Rc::clone(&trace);
            first.add(
                Rc::new(move |_event: &mut ServiceEvent<'_>| trace.borrow_mut().push('a'))
                    as Listener,
                Vec::new(),
            );
        }
        {
            let trace = Rc::clone(&trace);
            first.add(
                Rc::new(move |event: &mut ServiceEvent<'_>| {
                    trace.borrow_mut().push('b');
                    event.stop_propagation();
                }) as Listener,
                Vec::new(),
            );
        }
        {
            let trace = Rc::clone(&trace);
            first.add(
                Rc::new(move |_event: &mut ServiceEvent<'_>| trace.borrow_mut().push('c'))
                    as Listener,
                Vec::new(),
            );
        }

        let second = Rc::new(FilteredListeners::new());
        {
            let trace = Rc::clone(&trace);
            second.add(
                Rc::new(move |_event: &mut ServiceEvent<'_>| trace.borrow_mut().push('d'))
                    as Listener,
                Vec::new(),
            );
        }

        let dispatcher = Dispatcher::new();
        dispatcher.attach_provider(first);
        dispatcher.attach_provider(second);

        let service_id = ServiceId::new("svc");
        let module_id = ModuleId::new("mod");
        let properties = Properties::new("app");
        let mut event = after_added_event(&service_id, &module_id, &properties);
        dispatcher.dispatch(&mut event);

        assert_eq!(trace.borrow().as_str(), "ab");
    }

    #[test]
    fn dispatch_without_providers_is_a_noop() {
        let dispatcher = Dispatcher::new();
        let service_id = ServiceId::new("svc");
        let module_id = ModuleId::new("mod");
        let properties = Properties::new("app");
        let mut event = after_added_event(&service_id, &module_id, &properties);
        dispatcher.dispatch(&mut event);
        assert!(!event.is_propagation_stopped());
    }
}
