//! Import session and unmatched-item models.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Canonical field name for the required title column.
pub const FIELD_TITLE: &str = "title";

/// Canonical field name for the optional original-title column.
pub const FIELD_ORIGINAL_TITLE: &str = "original_title";

/// Canonical field name for the optional year column.
pub const FIELD_YEAR: &str = "year";

/// Mapping from canonical field name to source CSV column header.
pub type ColumnMapping = HashMap<String, String>;

/// Import session status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Pending,
    Processing,
    Completed,
    PendingResolution,
    Failed,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Pending => "pending",
            SessionStatus::Processing => "processing",
            SessionStatus::Completed => "completed",
            SessionStatus::PendingResolution => "pending_resolution",
            SessionStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SessionStatus {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s {
            "pending" => Ok(SessionStatus::Pending),
            "processing" => Ok(SessionStatus::Processing),
            "completed" => Ok(SessionStatus::Completed),
            "pending_resolution" => Ok(SessionStatus::PendingResolution),
            "failed" => Ok(SessionStatus::Failed),
            other => Err(crate::Error::other(format!(
                "unknown session status: {other}"
            ))),
        }
    }
}

/// One run of the import pipeline over one uploaded file.
///
/// Kept for audit/history; never deleted automatically.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportSession {
    /// Opaque session id.
    pub id: String,
    /// Lifecycle status.
    pub status: SessionStatus,
    /// Total row count.
    pub total: i64,
    /// Rows processed so far.
    pub processed: i64,
    /// Rows resolved without human input.
    pub auto_resolved: i64,
    /// Rows resolved through the resolution service.
    pub manual_resolved: i64,
    /// Creation time.
    pub created_at: chrono::DateTime<chrono::Utc>,
    /// Last update time.
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// A row the pipeline could not confidently resolve.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnmatchedItem {
    /// Opaque item id.
    pub id: String,
    /// Parent session id.
    pub session_id: String,
    /// Display title.
    pub title: String,
    /// Original/native-language title.
    pub original_title: Option<String>,
    /// The full normalized row payload, preserved verbatim so a later
    /// resolution can recreate the intended record.
    pub row_payload: HashMap<String, String>,
    /// Error description, when the row failed rather than merely not matching.
    pub error: Option<String>,
}

/// A normalized input row: canonical fields copied from raw CSV cells.
///
/// Fields without a mapping or with an empty source cell are omitted, not
/// defaulted, so downstream code can distinguish "unspecified" from
/// "explicitly empty".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NormalizedRow {
    /// Canonical field -> value bag.
    pub fields: HashMap<String, String>,
}

impl NormalizedRow {
    /// The required display title.
    pub fn title(&self) -> &str {
        self.fields.get(FIELD_TITLE).map(String::as_str).unwrap_or("")
    }

    /// The optional original-language title.
    pub fn original_title(&self) -> Option<&str> {
        self.fields.get(FIELD_ORIGINAL_TITLE).map(String::as_str)
    }

    /// The optional release year, when it parses as one.
    pub fn year(&self) -> Option<u16> {
        self.fields.get(FIELD_YEAR).and_then(|y| y.trim().parse().ok())
    }
}

/// Point-in-time view of a session, returned to the polling caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub status: SessionStatus,
    pub total: i64,
    pub processed: i64,
    pub auto_resolved: i64,
    pub manual_resolved: i64,
    pub unmatched: Vec<UnmatchedItem>,
}
