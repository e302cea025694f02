use aliri_braid::braid;

/// Date in ISO-8601 format, as sent by the API.
///
/// Kept as a string because the API mixes offset-aware and naive timestamps.
#[braid(serde)]
pub struct DateString;

/// Name of a server-side ingestion class, e.g. `ImageIngestor`
#[braid(serde)]
pub struct IngestorName;
