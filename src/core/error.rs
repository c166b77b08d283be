use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProjectionError {
    #[error("--{field} {reason}")]
    InvalidParameter { field: &'static str, reason: String },

    #[error("unrecognized health status {0:?}; expected good, fair or poor")]
    UnrecognizedHealthStatus(String),

    #[error("{field} in year {year} is too large to report; lower the rates, value or horizon")]
    OutOfRange { year: u32, field: &'static str },

    #[error("failed to encode projection: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ProjectionError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            field,
            reason: reason.into(),
        }
    }
}
