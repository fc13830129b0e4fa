//! # modkit-common
//!
//! Shared types, error definitions, the service container protocol, and
//! package properties used across the entire modkit workspace.
//!
//! This crate is the leaf of the dependency graph: it depends on no other
//! internal crate and provides the foundational primitives that all other
//! crates build upon.

pub mod constants;
pub mod container;
pub mod error;
pub mod properties;
pub mod types;
