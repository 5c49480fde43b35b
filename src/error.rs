use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("the 'from' date {from} is after the 'to' date {to}")]
    InvalidRange { from: NaiveDate, to: NaiveDate },

    #[error("both a 'from' and a 'to' date are required for a custom range")]
    MissingDateRange,

    #[error("report '{0}' has not been generated yet")]
    NotGenerated(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("missing dependency: {0}")]
    DependencyMissing(&'static str),

    #[error("render error: {0}")]
    Render(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ReportError {
    /// True for errors caused by what the caller asked for, as opposed to a
    /// failing backend.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            ReportError::InvalidRange { .. }
                | ReportError::MissingDateRange
                | ReportError::NotGenerated(_)
                | ReportError::Validation(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ReportError>;
