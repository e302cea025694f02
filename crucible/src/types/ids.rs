use aliri_braid::braid;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::{Display, Formatter};

/// Dataset unique ID (mfid), e.g. `0t3qaejwn9v8b000efdak8cj9w`
#[braid(serde)]
pub struct DatasetId;

/// ID of an asynchronous processing request (ingestion, SciCat update, transfer).
#[braid(serde)]
pub struct RequestId;

/// Sample unique ID
#[braid(serde)]
pub struct SampleId;

/// Project ID, e.g. `MFP08540`
#[braid(serde)]
pub struct ProjectId;

/// Instrument unique ID
#[braid(serde)]
pub struct InstrumentId;

/// ORCID identifier, e.g. `0000-0002-1234-5678`
#[braid(serde)]
pub struct Orcid;

/// A database row ID, which the API sends as either a number or a string.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum RecordId {
    Int(i64),
    Str(String),
}

impl Display for RecordId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordId::Int(i) => write!(f, "{i}"),
            RecordId::Str(s) => f.write_str(s),
        }
    }
}

impl From<RecordId> for RequestId {
    fn from(value: RecordId) -> Self {
        match value {
            RecordId::Int(i) => RequestId::new(i.to_string()),
            RecordId::Str(s) => RequestId::new(s),
        }
    }
}

/// Deserialize a [RequestId] from either a JSON string or integer.
pub(crate) fn request_id_loose<'de, D>(deserializer: D) -> Result<RequestId, D::Error>
where
    D: Deserializer<'de>,
{
    RecordId::deserialize(deserializer).map(RequestId::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    #[derive(Deserialize)]
    struct HasId {
        #[serde(deserialize_with = "request_id_loose")]
        id: RequestId,
    }

    #[rstest]
    #[case(r#"{"id": 226}"#, "226")]
    #[case(r#"{"id": "226"}"#, "226")]
    #[case(r#"{"id": "req-7"}"#, "req-7")]
    fn test_request_id_loose(#[case] json: &str, #[case] expected: &str) {
        let actual: HasId = serde_json::from_str(json).unwrap();
        assert_eq!(actual.id.as_str(), expected);
    }

    #[test]
    fn test_record_id_display() {
        assert_eq!(RecordId::Int(42).to_string(), "42");
        assert_eq!(RecordId::Str("0szb5en16".to_string()).to_string(), "0szb5en16");
    }
}
