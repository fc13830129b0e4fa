//! Domain primitive types used across the modkit workspace.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Unique identifier for a service within a container.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServiceId(String);

impl ServiceId {
    /// Creates a new service ID from a string value.
    ///
    /// IDs are expected to be non-empty; an empty ID can never be resolved.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the inner string representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Borrow<str> for ServiceId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ServiceId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ServiceId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Unique identifier for a module contributed to a package.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModuleId(String);

impl ModuleId {
    /// Creates a new module ID from a string value.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the inner string representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Borrow<str> for ModuleId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ModuleId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ModuleId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Lifecycle state of a package.
///
/// Transitions are monotonic and one-directional:
/// `Idle → Initialized → Booted`, with `Failed` reachable only from
/// `Initialized` during boot. No transition is ever reversed or repeated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PackageStatus {
    /// Modules and containers may still be added.
    Idle,
    /// The container is compiled; additions are locked.
    Initialized,
    /// Boot completed successfully.
    Booted,
    /// Boot failed; the package is unusable.
    Failed,
}

impl fmt::Display for PackageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Initialized => write!(f, "initialized"),
            Self::Booted => write!(f, "booted"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Outcome tag recorded for a module processed by a package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModuleStatus {
    /// At least one role of the module contributed something.
    Added,
    /// The module implemented no role with content.
    NotAdded,
    /// The module registered one or more singleton services.
    Registered,
    /// The module registered one or more factory services.
    RegisteredFactories,
    /// The module attached one or more extensions.
    Extended,
    /// The module's executable role ran and reported success.
    Executed,
    /// The module's executable role ran and reported failure.
    ExecutionFailed,
}

impl fmt::Display for ModuleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Added => write!(f, "added"),
            Self::NotAdded => write!(f, "not-added"),
            Self::Registered => write!(f, "registered"),
            Self::RegisteredFactories => write!(f, "registered-factories"),
            Self::Extended => write!(f, "extended"),
            Self::Executed => write!(f, "executed"),
            Self::ExecutionFailed => write!(f, "execution-failed"),
        }
    }
}
