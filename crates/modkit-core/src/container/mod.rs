//! Container staging and resolution.
//!
//! The [`ContainerConfigurator`] is the mutable staging area a package fills
//! while modules register; the [`ReadOnlyContainer`] is the immutable
//! resolution engine compiled from it exactly once.

mod configurator;
mod read_only;

pub use configurator::ContainerConfigurator;
pub use read_only::ReadOnlyContainer;
