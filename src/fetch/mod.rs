// src/fetch/mod.rs

pub mod status;
pub mod transcode;

pub use status::{StatusClient, StatusSource, DATEM_STATUS_URL};

use thiserror::Error;

/// Row-local lookup failures. None of these abort a batch; the runner logs
/// them and emits a placeholder record for the row instead.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport problems, timeouts and non-2xx statuses.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Body arrived but could not be parsed as JSON.
    #[error("invalid response payload: {0}")]
    Payload(#[from] serde_json::Error),

    /// Well-formed response without a usable `data` object.
    #[error("response has no usable `data` object")]
    MissingData,
}
