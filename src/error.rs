//! Error taxonomy for the prediction fetch pipeline.

use thiserror::Error;

/// Everything that can go wrong between pressing submit and holding a
/// renderable series. The controller collapses all of these into one
/// user-facing failure message; the variants exist for logs and tests.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("request timed out")]
    Timeout,

    #[error("prediction service returned HTTP {status}")]
    Http { status: u16 },

    #[error("response was not a prediction series: {0}")]
    Decode(reqwest::Error),

    #[error("malformed entry at index {index}: {reason}")]
    MalformedEntry { index: usize, reason: String },

    #[error("{0}")]
    Validation(&'static str),
}
