use super::Extra;
use crate::types::*;
use serde::{Deserialize, Serialize};

/// A dataset record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub unique_id: DatasetId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dataset_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_user_id: Option<RecordId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_orcid: Option<Orcid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<ProjectId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instrument_id: Option<RecordId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instrument_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub measurement: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_time: Option<DateString>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_to_upload: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha256_hash_file_to_upload: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_folder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json_link: Option<String>,
    /// Only filled in by [crate::CrucibleClient::get_dataset] when asked for.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scientific_metadata: Option<serde_json::Value>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Fields for creating a dataset. `None` fields are left out of the request.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NewDataset {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique_id: Option<DatasetId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dataset_name: Option<String>,
    pub public: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_user_id: Option<RecordId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_orcid: Option<Orcid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<ProjectId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instrument_id: Option<RecordId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub measurement: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_time: Option<DateString>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_to_upload: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_folder: Option<String>,
}

/// Result of [crate::CrucibleClient::create_dataset_with_metadata].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreatedDataset {
    pub dsid: DatasetId,
    pub created_record: Dataset,
    pub scientific_metadata_record: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyword {
    pub keyword: String,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AccessGroup {
    pub group_name: String,
}

/// A file which belongs to a dataset besides its main file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssociatedFile {
    pub filename: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha256_hash: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewAssociatedFile {
    pub filename: String,
    pub size: u64,
    pub sha256_hash: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thumbnail {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Where a dataset was copied to on Google Drive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriveLocation {
    pub folder_path_in_drive: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl DriveLocation {
    /// Whether this is the location in the curated "Organized" folder tree.
    pub fn is_organized(&self) -> bool {
        self.folder_path_in_drive.contains("Organized")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_dataset_drops_none() {
        let dataset = NewDataset {
            unique_id: Some(DatasetId::from_static("0t3qaejwn9v8b000efdak8cj9w")),
            dataset_name: Some("unittest".to_string()),
            project_id: Some(ProjectId::from_static("MFP08540")),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(dataset).unwrap(),
            json!({
                "unique_id": "0t3qaejwn9v8b000efdak8cj9w",
                "dataset_name": "unittest",
                "public": false,
                "project_id": "MFP08540"
            })
        );
    }

    #[test]
    fn test_dataset_numeric_ids() {
        let dataset: Dataset = serde_json::from_value(json!({
            "unique_id": "0t3qaejwn9v8b000efdak8cj9w",
            "owner_user_id": 12,
            "instrument_id": "0szb5en16nxdk000dcd8a1wt2w",
            "public": false,
            "json_link": null,
            "modified": "2024-01-01"
        }))
        .unwrap();
        assert_eq!(dataset.owner_user_id, Some(RecordId::Int(12)));
        assert_eq!(
            dataset.instrument_id,
            Some(RecordId::Str("0szb5en16nxdk000dcd8a1wt2w".to_string()))
        );
        assert!(dataset.json_link.is_none());
        assert_eq!(dataset.extra.get("modified"), Some(&json!("2024-01-01")));
    }
}
