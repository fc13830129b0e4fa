//! # modkit-core
//!
//! The container resolution engine and the event-driven extension pipeline:
//! the mutable [`ContainerConfigurator`](container::ContainerConfigurator)
//! staging area, the immutable [`ReadOnlyContainer`](container::ReadOnlyContainer)
//! with lazy resolution and extension chains, the tagged-variant
//! [`ServiceEvent`](event::ServiceEvent) model with its
//! [`Dispatcher`](event::Dispatcher), and the [`Module`](module::Module)
//! capability traits through which independently-authored code contributes
//! services.

pub mod container;
pub mod event;
pub mod module;
