//! Asynchronous processing requests: ingestion, SciCat update, and Google Drive transfer.

use super::CrucibleClient;
use crate::errors::{CrucibleError, WaitError};
use crate::models::{ProcessingRequest, RequestStatus, StatusUpdate};
use crate::types::*;
use crate::wait::{RequestHandle, RequestWaiter, StatusProvider, WaitPolicy};
use async_trait::async_trait;
use serde_json::{json, Value};

impl CrucibleClient {
    /// Ask Crucible to ingest a dataset's uploaded file.
    pub async fn request_ingestion(
        &self,
        dsid: &DatasetIdRef,
        file_to_upload: Option<&str>,
        ingestor: Option<&IngestorNameRef>,
    ) -> Result<ProcessingRequest, CrucibleError> {
        let mut params = Vec::with_capacity(2);
        if let Some(file) = file_to_upload {
            params.push(("file_to_upload", file));
        }
        if let Some(ingestor) = ingestor {
            params.push(("ingestion_class", ingestor.as_str()));
        }
        self.send(
            self.post(&format!("datasets/{}/{}", dsid, RequestType::Ingest))
                .query(&params),
        )
        .await
    }

    /// Ask Crucible to publish a dataset to SciCat.
    pub async fn request_scicat_update(
        &self,
        dsid: &DatasetIdRef,
    ) -> Result<ProcessingRequest, CrucibleError> {
        self.send(self.post(&format!("datasets/{}/{}", dsid, RequestType::ScicatUpdate)))
            .await
    }

    /// Ask Crucible to copy a dataset into a Google Drive folder.
    pub async fn request_google_drive_transfer(
        &self,
        dsid: &DatasetIdRef,
        folder_id: &str,
    ) -> Result<ProcessingRequest, CrucibleError> {
        self.send(
            self.post(&format!(
                "datasets/{}/{}",
                dsid,
                RequestType::GoogleDriveTransfer
            ))
            .json(&json!({ "folder_id": folder_id })),
        )
        .await
    }

    /// Query the current status of a processing request, once.
    pub async fn get_request_status(
        &self,
        handle: &RequestHandle,
    ) -> Result<RequestStatus, CrucibleError> {
        self.send(self.get(&status_path(handle))).await
    }

    /// Set the status of a processing request. This is what workers do;
    /// most users never need it.
    ///
    /// When `status` is `"complete"`, the current time is sent as `time_completed`.
    pub async fn update_request_status(
        &self,
        handle: &RequestHandle,
        status: &str,
    ) -> Result<Option<Value>, CrucibleError> {
        let body = StatusUpdate {
            id: &handle.request_id,
            status,
            time_completed: (status == "complete").then(time::OffsetDateTime::now_utc),
        };
        self.send_optional(self.patch(&status_path(handle)).json(&body))
            .await
    }

    /// Poll a processing request until it completes or fails.
    ///
    /// See [RequestWaiter] for details.
    pub async fn wait_for_request(
        &self,
        handle: &RequestHandle,
        policy: WaitPolicy,
    ) -> Result<RequestStatus, WaitError> {
        RequestWaiter::new(self, policy).wait(handle).await
    }
}

fn status_path(handle: &RequestHandle) -> String {
    format!(
        "datasets/{}/{}/{}",
        handle.dataset_id, handle.request_type, handle.request_id
    )
}

#[async_trait]
impl StatusProvider for CrucibleClient {
    type Error = CrucibleError;

    async fn get_status(&self, handle: &RequestHandle) -> Result<RequestStatus, Self::Error> {
        self.get_request_status(handle).await
    }
}
