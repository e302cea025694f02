use super::Extra;
use crate::types::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub unique_id: SampleId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_orcid: Option<Orcid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_user_id: Option<RecordId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_created: Option<DateString>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Reference to another sample in a lineage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleRef {
    pub unique_id: SampleId,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NewSample {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique_id: Option<SampleId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_created: Option<DateString>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_orcid: Option<Orcid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_user_id: Option<RecordId>,
    #[serde(serialize_with = "as_sample_refs")]
    pub parents: Vec<SampleId>,
    #[serde(serialize_with = "as_sample_refs")]
    pub children: Vec<SampleId>,
}

fn as_sample_refs<S: serde::Serializer>(ids: &[SampleId], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(ids.iter().map(|id| SampleRef {
        unique_id: id.clone(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_sample_lineage() {
        let sample = NewSample {
            sample_name: Some("wafer".to_string()),
            parents: vec![SampleId::from_static("p1")],
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(sample).unwrap(),
            json!({
                "sample_name": "wafer",
                "parents": [{"unique_id": "p1"}],
                "children": []
            })
        );
    }
}
