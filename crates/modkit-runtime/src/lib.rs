//! # modkit-runtime
//!
//! The [`Package`] orchestrator: aggregates modules through a strict
//! lifecycle (idle → initialized → booted/failed), drives registration
//! events around every contributed service, defers executable modules to
//! boot, and links packages together so one package's services become
//! resolvable through another's container, via a proxy until the target
//! has booted.

mod handle;
mod observer;
mod package;
mod proxy;

pub use observer::{PackageAction, PackageObserver};
pub use package::Package;
pub use proxy::PackageProxyContainer;
