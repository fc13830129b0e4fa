//! Outward notification channel standing in for the host's hook system.

use std::fmt;

use modkit_common::error::ModkitError;
use modkit_common::types::{ModuleId, ServiceId};

use crate::package::Package;

/// Named moments a package reports to its observers.
///
/// [`Package::hook_name`] turns an action into its namespaced string form,
/// e.g. `modkit.shop.failed-boot` for a package named `shop`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PackageAction {
    /// Fired before the package locks module additions.
    Init,
    /// Fired after a successful boot, before the status flips to booted.
    Ready,
    /// Fired when boot fails.
    FailedBoot,
    /// Fired when another package was connected.
    PackageConnected,
    /// Fired when a package connection was refused.
    FailedConnection,
    /// Fired when a listener vetoed a service registration.
    ServiceNotRegistered,
}

impl fmt::Display for PackageAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Init => write!(f, "init"),
            Self::Ready => write!(f, "ready"),
            Self::FailedBoot => write!(f, "failed-boot"),
            Self::PackageConnected => write!(f, "package-connected"),
            Self::FailedConnection => write!(f, "failed-connection"),
            Self::ServiceNotRegistered => write!(f, "service-not-registered"),
        }
    }
}

/// Receives package lifecycle notifications.
///
/// All methods default to no-ops; hosts override the ones they care about.
/// Notifications are purely observational; no return value is consumed.
/// One exception: during [`init`](PackageObserver::init) the package
/// still accepts modules, so hosts use it as their extension point.
pub trait PackageObserver {
    /// The package is about to lock module additions; more modules may
    /// still be added here.
    fn init(&self, package: &mut Package) {
        let _ = package;
    }

    /// The package finished booting successfully.
    fn ready(&self, package: &Package) {
        let _ = package;
    }

    /// The package failed to boot.
    fn failed_boot(&self, package: &Package, error: &ModkitError) {
        let _ = (package, error);
    }

    /// Another package was connected to this one.
    fn package_connected(&self, package: &Package, connected: &str, via_proxy: bool) {
        let _ = (package, connected, via_proxy);
    }

    /// A package connection was refused.
    fn failed_connection(&self, package: &Package, target: &str, error: &ModkitError) {
        let _ = (package, target, error);
    }

    /// A listener vetoed a service registration.
    fn service_not_registered(
        &self,
        package: &Package,
        service_id: &ServiceId,
        module_id: &ModuleId,
    ) {
        let _ = (package, service_id, module_id);
    }
}
