//! Definitions of structs describing request and response data of the Crucible API.
//!
//! Response structs name the fields this client reads. Everything else is kept
//! in an `extra` map so that records pass through unmodified.

mod dataset;
mod instrument;
mod project;
mod request;
mod sample;

pub use dataset::*;
pub use instrument::*;
pub use project::*;
pub use request::*;
pub use sample::*;

/// Fields of a record which this client does not interpret.
pub type Extra = serde_json::Map<String, serde_json::Value>;
