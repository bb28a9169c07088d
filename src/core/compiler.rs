//! Identity of the Go compiler that produced a binary.

use std::fmt;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::error::{GoreError, Result};

#[cfg(feature = "python-ext")]
use pyo3::prelude::*;

/// Go compiler release detected in the binary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "python-ext", pyclass(get_all))]
pub struct CompilerVersion {
    /// Version string, e.g. `go1.12`
    pub name: String,
    /// Git revision of the release commit
    pub sha: String,
    /// Time the release tag was committed, as reported
    pub timestamp: String,
}

impl CompilerVersion {
    pub fn new(
        name: impl Into<String>,
        sha: impl Into<String>,
        timestamp: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            sha: sha.into(),
            timestamp: timestamp.into(),
        }
    }

    /// Release time, if the timestamp is RFC 3339.
    pub fn released_at(&self) -> Option<DateTime<FixedOffset>> {
        DateTime::parse_from_rfc3339(self.timestamp.trim()).ok()
    }

    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| GoreError::Serialization(e.to_string()))
    }
}

impl fmt::Display for CompilerVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.sha.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{} ({})", self.name, self.sha)
        }
    }
}

#[cfg(feature = "python-ext")]
#[pymethods]
impl CompilerVersion {
    fn __repr__(&self) -> String {
        format!(
            "CompilerVersion(name={:?}, sha={:?}, timestamp={:?})",
            self.name, self.sha, self.timestamp
        )
    }
}
