mod engine;
mod error;
mod types;

pub use engine::{
    MAX_EXACT_CURRENCY, compute_projection, round_currency, try_compute_projection,
    try_round_currency,
};
pub use error::ProjectionError;
pub use types::{FinancialParameters, HealthStatus, ProjectionResult, YearRecord};
