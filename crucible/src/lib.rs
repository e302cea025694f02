//! Client library for the Crucible scientific data API.
//!
//! Most functionality is on [CrucibleClient]. Processing requests (ingestion,
//! SciCat update, Google Drive transfer) run asynchronously on the server;
//! [RequestWaiter] polls them until they finish.

mod client;
pub mod errors;
pub mod models;
pub mod parsers;
pub mod types;
mod wait;

pub use client::{sha256_file, BuildError, CrucibleClient, CrucibleClientBuilder};
pub use wait::*;

pub use reqwest;
pub use tokio_util::sync::CancellationToken;
