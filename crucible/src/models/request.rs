use super::Extra;
use crate::types::*;
use serde::{Deserialize, Serialize};

/// One snapshot of a processing request's condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestStatus {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_requested: Option<DateString>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_completed: Option<DateString>,
    /// Present only when `status` is "failed".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl RequestStatus {
    /// Simplified state. Unknown status strings are [JobState::Pending].
    pub fn state(&self) -> JobState {
        JobState::classify(&self.status).unwrap_or(JobState::Pending)
    }

    /// Whether the API sent a status string this client does not recognize.
    pub fn is_unrecognized(&self) -> bool {
        JobState::classify(&self.status).is_none()
    }

    pub fn is_terminal(&self) -> bool {
        self.state().is_terminal()
    }

    pub fn is_completed(&self) -> bool {
        self.state() == JobState::Completed
    }

    pub fn is_failed(&self) -> bool {
        self.state() == JobState::Failed
    }
}

/// Response to submitting a processing request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingRequest {
    #[serde(deserialize_with = "crate::types::request_id_loose")]
    pub id: RequestId,
    #[serde(flatten)]
    pub status: RequestStatus,
}

/// Body of a request status update.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct StatusUpdate<'a> {
    pub id: &'a RequestIdRef,
    pub status: &'a str,
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub time_completed: Option<time::OffsetDateTime>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_keeps_unknown_fields() {
        let data = json!({
            "id": 226,
            "status": "completed",
            "time_completed": "2024-01-01T00:00:00Z",
            "dataset_id": "0t3qaejwn9v8b000efdak8cj9w"
        });
        let status: RequestStatus = serde_json::from_value(data.clone()).unwrap();
        assert!(status.is_completed());
        assert_eq!(
            status.time_completed.as_ref().map(|t| t.as_str()),
            Some("2024-01-01T00:00:00Z")
        );
        assert_eq!(serde_json::to_value(&status).unwrap(), data);
    }

    #[test]
    fn test_failed_status_with_null_fields() {
        let data = json!({
            "status": "failed",
            "time_completed": null,
            "error_message": "disk full"
        });
        let status: RequestStatus = serde_json::from_value(data).unwrap();
        assert!(status.is_failed());
        assert!(status.time_completed.is_none());
        assert_eq!(status.error_message.as_deref(), Some("disk full"));
    }

    #[test]
    fn test_unknown_status_is_pending() {
        let status: RequestStatus =
            serde_json::from_value(json!({"status": "reticulating"})).unwrap();
        assert_eq!(status.state(), JobState::Pending);
        assert!(status.is_unrecognized());
        assert!(!status.is_terminal());
    }

    #[test]
    fn test_processing_request_with_integer_id() {
        let req: ProcessingRequest =
            serde_json::from_value(json!({"id": 208, "status": "requested"})).unwrap();
        assert_eq!(req.id.as_str(), "208");
        assert_eq!(req.status.state(), JobState::Pending);
        assert!(!req.status.extra.contains_key("id"));
    }

    #[test]
    fn test_status_update_body() {
        let id = RequestId::from_static("59");
        let update = StatusUpdate {
            id: &id,
            status: "in_progress",
            time_completed: None,
        };
        assert_eq!(
            serde_json::to_value(update).unwrap(),
            json!({"id": "59", "status": "in_progress"})
        );
    }

    #[test]
    fn test_status_update_completion_time() {
        let id = RequestId::from_static("59");
        let update = StatusUpdate {
            id: &id,
            status: "complete",
            time_completed: Some(time::OffsetDateTime::from_unix_timestamp(1704067200).unwrap()),
        };
        assert_eq!(
            serde_json::to_value(update).unwrap(),
            json!({"id": "59", "status": "complete", "time_completed": "2024-01-01T00:00:00Z"})
        );
    }
}
