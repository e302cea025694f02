use super::Extra;
use crate::types::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instrument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_id: Option<InstrumentId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instrument_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewInstrument {
    pub instrument_name: String,
    pub location: String,
    pub owner: String,
}

/// How to look up an instrument. An ID takes precedence over a name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstrumentQuery {
    Id(InstrumentId),
    Name(String),
}

impl InstrumentQuery {
    pub(crate) fn as_param(&self) -> (&'static str, &str) {
        match self {
            InstrumentQuery::Id(id) => ("id", id.as_str()),
            InstrumentQuery::Name(name) => ("instrument_name", name.as_str()),
        }
    }
}
