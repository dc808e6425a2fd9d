//! Core domain types for the selection form, request lifecycle and chart data.

use serde::{Deserialize, Serialize};

/// The user's current form input. Neither field is cleared by a
/// submission; the form keeps showing what was submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub company: String,
    pub date: String,
}

/// Lifecycle of the most recent submission. Exactly one variant is live
/// at a time; a submission that reaches the network always passes
/// through `Pending` before settling.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestOutcome {
    Idle,
    Pending,
    Success(Vec<ChartPoint>),
    Failure(String),
}

impl RequestOutcome {
    pub fn is_pending(&self) -> bool {
        matches!(self, RequestOutcome::Pending)
    }
}

/// One element of the prediction service response, kept loose on purpose:
/// a malformed element must survive deserialization so the normalizer can
/// reject it with a precise index instead of serde failing the whole body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawEntry {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub price: Option<serde_json::Value>,
}

/// Chart-ready point produced by normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartPoint {
    pub date: String, // short label, e.g. "1/2/2019"
    pub price: i64,   // whole dollars
}
