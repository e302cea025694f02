//! Datasets and their metadata.

use super::CrucibleClient;
use crate::errors::{CrucibleError, GetOrAddError};
use crate::models::*;
use crate::types::*;
use log::debug;
use serde::Serialize;
use serde_json::Value;

impl CrucibleClient {
    /// List datasets, filtered by query parameters such as `project_id`.
    pub async fn list_datasets<Q: Serialize + ?Sized>(
        &self,
        filters: &Q,
    ) -> Result<Vec<Dataset>, CrucibleError> {
        self.send(self.get("datasets").query(filters)).await
    }

    /// Get a dataset. With `include_metadata`, its scientific metadata is also
    /// fetched; metadata which cannot be fetched is replaced with `{}`.
    pub async fn get_dataset(
        &self,
        dsid: &DatasetIdRef,
        include_metadata: bool,
    ) -> Result<Option<Dataset>, CrucibleError> {
        let dataset: Option<Dataset> = self
            .send_optional(self.get(&format!("datasets/{}", dsid)))
            .await?;
        match dataset {
            Some(mut dataset) if include_metadata => {
                let metadata = match self.get_scientific_metadata(dsid).await {
                    Ok(metadata) => metadata.unwrap_or_else(empty_object),
                    Err(e) => {
                        debug!("no scientific metadata for dataset {dsid}: {e}");
                        empty_object()
                    }
                };
                dataset.scientific_metadata = Some(metadata);
                Ok(Some(dataset))
            }
            dataset => Ok(dataset),
        }
    }

    /// Create a dataset record.
    pub async fn create_dataset(&self, dataset: &NewDataset) -> Result<Dataset, CrucibleError> {
        self.send(self.post("datasets").json(dataset)).await
    }

    /// Fill in `owner_user_id` from the user whose ORCID is `owner_orcid`.
    /// Does nothing if there is no ORCID or the user ID is already set.
    pub async fn resolve_owner(&self, dataset: &mut NewDataset) -> Result<(), GetOrAddError> {
        if dataset.owner_user_id.is_some() {
            return Ok(());
        }
        let Some(orcid) = &dataset.owner_orcid else {
            return Ok(());
        };
        let user = self
            .get_user(orcid)
            .await?
            .ok_or_else(|| GetOrAddError::NotFound {
                kind: "User",
                id: orcid.to_string(),
            })?;
        dataset.owner_user_id = user.id;
        Ok(())
    }

    /// Create a dataset record, then attach scientific metadata and keywords to it.
    pub async fn create_dataset_with_metadata(
        &self,
        dataset: &NewDataset,
        scientific_metadata: Option<&Value>,
        keywords: &[String],
    ) -> Result<CreatedDataset, CrucibleError> {
        let created_record = self.create_dataset(dataset).await?;
        let dsid = created_record.unique_id.clone();
        let scientific_metadata_record = if let Some(metadata) = scientific_metadata {
            Some(self.update_scientific_metadata(&dsid, metadata).await?)
        } else {
            None
        };
        for keyword in keywords {
            self.add_dataset_keyword(&dsid, keyword).await?;
        }
        Ok(CreatedDataset {
            dsid,
            created_record,
            scientific_metadata_record,
        })
    }

    /// Delete a dataset. Not every deployment allows this.
    pub async fn delete_dataset(&self, dsid: &DatasetIdRef) -> Result<Option<Value>, CrucibleError> {
        self.send_optional(self.delete(&format!("datasets/{}", dsid)))
            .await
    }

    pub async fn get_scientific_metadata(
        &self,
        dsid: &DatasetIdRef,
    ) -> Result<Option<Value>, CrucibleError> {
        self.send_optional(self.get(&format!("datasets/{}/scientific_metadata", dsid)))
            .await
    }

    pub async fn update_scientific_metadata(
        &self,
        dsid: &DatasetIdRef,
        metadata: &Value,
    ) -> Result<Value, CrucibleError> {
        self.send(
            self.post(&format!("datasets/{}/scientific_metadata", dsid))
                .json(metadata),
        )
        .await
    }

    pub async fn get_dataset_keywords(
        &self,
        dsid: &DatasetIdRef,
    ) -> Result<Vec<Keyword>, CrucibleError> {
        self.send(self.get(&format!("datasets/{}/keywords", dsid)))
            .await
    }

    pub async fn add_dataset_keyword(
        &self,
        dsid: &DatasetIdRef,
        keyword: &str,
    ) -> Result<Keyword, CrucibleError> {
        self.send(
            self.post(&format!("datasets/{}/keywords", dsid))
                .query(&[("keyword", keyword)]),
        )
        .await
    }

    /// Names of the groups which may access a dataset.
    pub async fn get_dataset_access_groups(
        &self,
        dsid: &DatasetIdRef,
    ) -> Result<Vec<String>, CrucibleError> {
        let groups: Vec<AccessGroup> = self
            .send(self.get(&format!("datasets/{}/access_groups", dsid)))
            .await?;
        Ok(groups.into_iter().map(|g| g.group_name).collect())
    }

    pub async fn get_associated_files(
        &self,
        dsid: &DatasetIdRef,
    ) -> Result<Vec<AssociatedFile>, CrucibleError> {
        self.send(self.get(&format!("datasets/{}/associated_files", dsid)))
            .await
    }

    /// Register a file which belongs to a dataset. The file itself must be
    /// uploaded separately, see [CrucibleClient::upload_dataset].
    pub async fn add_associated_file(
        &self,
        dsid: &DatasetIdRef,
        file: &NewAssociatedFile,
    ) -> Result<AssociatedFile, CrucibleError> {
        self.send(
            self.post(&format!("datasets/{}/associated_files", dsid))
                .json(file),
        )
        .await
    }

    pub async fn get_thumbnails(&self, dsid: &DatasetIdRef) -> Result<Vec<Thumbnail>, CrucibleError> {
        self.send(self.get(&format!("datasets/{}/thumbnails", dsid)))
            .await
    }

    /// Get where a dataset was copied to on Google Drive.
    pub async fn get_google_drive_info(
        &self,
        dsid: &DatasetIdRef,
    ) -> Result<Vec<DriveLocation>, CrucibleError> {
        self.send(self.get(&format!("datasets/{}/drive_location", dsid)))
            .await
    }

    /// Like [CrucibleClient::get_google_drive_info], but only the locations
    /// in the "Organized" folder tree.
    pub async fn get_organized_google_drive_info(
        &self,
        dsid: &DatasetIdRef,
    ) -> Result<Vec<DriveLocation>, CrucibleError> {
        let locations = self.get_google_drive_info(dsid).await?;
        Ok(locations.into_iter().filter(|l| l.is_organized()).collect())
    }
}

fn empty_object() -> Value {
    Value::Object(Default::default())
}
