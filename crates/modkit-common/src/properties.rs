//! Package metadata and configuration model.
//!
//! `Properties` describes the package that owns a container: its name,
//! version, debug flag, and any host-specific extras. A package exposes its
//! properties through the container under the reserved
//! [`PROPERTIES_ID`](crate::constants::PROPERTIES_ID) service id.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ModkitError, Result};

/// Metadata and configuration of a package.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Properties {
    /// Stable name of the package; also the namespace for its action names.
    base_name: String,
    /// Package version, if declared.
    #[serde(default)]
    version: Option<String>,
    /// Human-readable description, if declared.
    #[serde(default)]
    description: Option<String>,
    /// Author attribution, if declared.
    #[serde(default)]
    author: Option<String>,
    /// Debug mode: boot failures re-raise and progress logs carry detail.
    #[serde(default)]
    debug: bool,
    /// Host-specific extra values not interpreted by the core.
    #[serde(default)]
    extra: HashMap<String, serde_json::Value>,
}

impl Properties {
    /// Creates properties for a package with the given base name.
    #[must_use]
    pub fn new(base_name: impl Into<String>) -> Self {
        Self {
            base_name: base_name.into(),
            version: None,
            description: None,
            author: None,
            debug: false,
            extra: HashMap::new(),
        }
    }

    /// Sets the package version.
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Sets the package description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the package author.
    #[must_use]
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Enables or disables debug mode.
    #[must_use]
    pub const fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Attaches a host-specific extra value.
    #[must_use]
    pub fn with_extra(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        let _ = self.extra.insert(key.into(), value);
        self
    }

    /// Loads properties from a JSON document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be parsed or declares an
    /// empty base name.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let properties: Self = serde_json::from_str(json)?;
        if properties.base_name.is_empty() {
            return Err(ModkitError::Config {
                message: "package base name must not be empty".into(),
            });
        }
        Ok(properties)
    }

    /// Loads properties from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ModkitError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    /// Returns the package base name.
    #[must_use]
    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    /// Returns the package version, if declared.
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Returns the package description, if declared.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the package author, if declared.
    #[must_use]
    pub fn author(&self) -> Option<&str> {
        self.author.as_deref()
    }

    /// Returns whether debug mode is enabled.
    #[must_use]
    pub const fn is_debug(&self) -> bool {
        self.debug
    }

    /// Returns a host-specific extra value, if present.
    #[must_use]
    pub fn extra(&self, key: &str) -> Option<&serde_json::Value> {
        self.extra.get(key)
    }
}
