//! Errors returned by the aggregation provider client.
//!
//! Every variant means the provider could not be reached or answered with
//! something unusable; callers treat them all as transport failures.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("provider returned {status} ({error_code}): {message}")]
    Api {
        status: u16,
        error_code: String,
        message: String,
    },
    #[error("invalid provider response: {0}")]
    Decode(String),
}
