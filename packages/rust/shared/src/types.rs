//! Core domain types for ReportForge generation runs.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// RunId
// ---------------------------------------------------------------------------

/// A UUID v7 wrapper for generation run identifiers (time-sortable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub Uuid);

impl RunId {
    /// Generate a new time-sortable run identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for RunId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

// ---------------------------------------------------------------------------
// RemoteFile
// ---------------------------------------------------------------------------

/// A document retrieved from the remote repository.
///
/// Immutable once fetched; `content` is the exact raw text body of the
/// resource. A file that fails to download is dropped by the collector, never
/// represented as an empty-string placeholder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteFile {
    /// Repository-relative path (e.g., `docs/ARCHITECTURE.md`).
    pub path: String,
    /// Raw file body as served by the raw-content endpoint.
    pub content: String,
}
