//! Options applied when a session is opened.

use serde::{Deserialize, Serialize};

use crate::error::{GoreError, Result};

/// Session configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoreConfig {
    /// Compiler version to assume when the engine cannot detect one,
    /// e.g. `go1.12`. Sent right after the binary is opened.
    pub assumed_go_version: Option<String>,
    /// Fail the open when the engine rejects `assumed_go_version`.
    /// Otherwise the rejection is only logged.
    pub require_assumed_version: bool,
}

impl GoreConfig {
    pub fn with_assumed_go_version(mut self, version: impl Into<String>) -> Self {
        self.assumed_go_version = Some(version.into());
        self
    }

    pub fn require_assumed_version(mut self, require: bool) -> Self {
        self.require_assumed_version = require;
        self
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        serde_json::from_str(s).map_err(|e| GoreError::Serialization(e.to_string()))
    }

    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| GoreError::Serialization(e.to_string()))
    }
}
