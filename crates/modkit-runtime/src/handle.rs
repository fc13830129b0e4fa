//! Shared boot state published by a package to its proxy containers.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use modkit_common::types::PackageStatus;
use modkit_core::container::ReadOnlyContainer;

/// The slot through which a package exposes its status and, once booted,
/// its finished container.
///
/// Proxy containers held by connected packages keep a handle to this slot
/// and start answering lookups the moment the owning package publishes.
pub(crate) struct BootHandle {
    name: String,
    status: Cell<PackageStatus>,
    container: RefCell<Option<Rc<ReadOnlyContainer>>>,
}

impl BootHandle {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: Cell::new(PackageStatus::Idle),
            container: RefCell::new(None),
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn status(&self) -> PackageStatus {
        self.status.get()
    }

    pub(crate) fn set_status(&self, status: PackageStatus) {
        self.status.set(status);
    }

    /// Publishes the finished container; called once, just before the
    /// owning package transitions to booted.
    pub(crate) fn publish(&self, container: Rc<ReadOnlyContainer>) {
        *self.container.borrow_mut() = Some(container);
    }

    /// Returns the published container, if the owning package has booted.
    pub(crate) fn container(&self) -> Option<Rc<ReadOnlyContainer>> {
        self.container.borrow().clone()
    }
}
