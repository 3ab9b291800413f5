//! Error taxonomy for the sharded search pipeline.
//!
//! Input and quota errors are pre-flight: they are raised before any upstream
//! call is made and fail the whole run. Upstream errors are raised per page
//! and are captured per shard by the run orchestrator.

use thiserror::Error;

/// Result type alias for crawler operations.
pub type Result<T> = std::result::Result<T, SearchError>;

/// Unified error type for planning, fetching and exporting.
#[derive(Error, Debug)]
pub enum SearchError {
    /// Rejected request parameters (empty query, reversed range, missing credentials).
    #[error("invalid input: {0}")]
    Input(String),

    /// The plan would spend more upstream calls than the caller allowed.
    #[error("estimated {estimated} calls exceeds the budget of {budget}; narrow the range, use a coarser granularity or lower the per-shard limit")]
    QuotaExceeded { estimated: usize, budget: usize },

    /// No granularity admits even one call per shard under the budget.
    #[error("no plan fits within a budget of {budget} calls")]
    NoFeasiblePlan { budget: usize },

    /// Non-success HTTP status from the search backend.
    #[error("upstream returned status {status}: {body}")]
    Upstream { status: u16, body: String },

    /// The search backend answered with a body we could not decode.
    #[error("malformed upstream response: {0}")]
    MalformedResponse(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Excel error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),
}

impl SearchError {
    /// Create an input validation error.
    pub fn input(message: impl Into<String>) -> Self {
        Self::Input(message.into())
    }
}
