//! Stand-in container for a connected package that has not booted yet.

use std::rc::Rc;

use modkit_common::container::{Container, ServiceValue};
use modkit_common::error::{ModkitError, Result};

use crate::handle::BootHandle;

/// Defers `has`/`get` to another package's eventual container.
///
/// Until the target package boots, `has` answers `false` and `get` fails;
/// afterwards both delegate to the published container, so services (and
/// their extension and listener behavior) become visible transparently.
pub struct PackageProxyContainer {
    handle: Rc<BootHandle>,
}

impl PackageProxyContainer {
    pub(crate) const fn new(handle: Rc<BootHandle>) -> Self {
        Self { handle }
    }
}

impl Container for PackageProxyContainer {
    fn has(&self, id: &str) -> bool {
        self.handle
            .container()
            .is_some_and(|container| container.has(id))
    }

    fn get(&self, id: &str) -> Result<ServiceValue> {
        self.handle.container().map_or_else(
            || {
                Err(ModkitError::InvalidState {
                    action: format!(
                        "resolve service '{id}' from package '{}'",
                        self.handle.name()
                    ),
                    status: self.handle.status(),
                })
            },
            |container| container.get(id),
        )
    }
}
