use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Kind of asynchronous processing request. Selects the status sub-endpoint
/// `/datasets/{dsid}/{type}/{reqid}` but does not change polling semantics.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RequestType {
    Ingest,
    ScicatUpdate,
    GoogleDriveTransfer,
}

impl RequestType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestType::Ingest => "ingest",
            RequestType::ScicatUpdate => "scicat_update",
            RequestType::GoogleDriveTransfer => "google_drive_transfer",
        }
    }
}

impl Display for RequestType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Simplified state of a processing request, as seen by a waiter.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum JobState {
    /// Any non-terminal status: "requested", "in_progress", "started", or unknown.
    Pending,
    Completed,
    Failed,
}

impl JobState {
    /// Classify a status string. Returns `None` for strings the client does not know,
    /// which callers treat as [JobState::Pending].
    pub fn classify(status: &str) -> Option<Self> {
        match status.trim().to_ascii_lowercase().as_str() {
            "completed" | "complete" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            "requested" | "in_progress" | "started" | "pending" | "queued" => Some(Self::Pending),
            _ => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}
