use rust_decimal::Decimal;
use thiserror::Error;

use crate::narrative::NarrativeError;

pub type EngineResult<T> = Result<T, EngineError>;

/// A value rejected at the ingestion boundary, before it can reach the engine.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("`{field}` must not be negative (got {value})")]
    NegativeValue { field: &'static str, value: Decimal },
    #[error("`{field}` exceeds the supported maximum of {max} (got {value})")]
    ValueTooLarge {
        field: &'static str,
        value: Decimal,
        max: Decimal,
    },
    #[error("items start in month 1 or later (got {0})")]
    StartBeforeFirstMonth(u32),
    #[error("end month {end_at} precedes start month {starts_at}")]
    EndBeforeStart { starts_at: u32, end_at: u32 },
    #[error("invalid month window {start}..={end}: months are 1-based and the end must not precede the start")]
    InvalidWindow { start: u32, end: u32 },
    #[error("month window spans {len} months; at most {max} are supported")]
    WindowTooWide { len: u32, max: u32 },
    #[error("funding must not be negative (got {0})")]
    NegativeFunding(Decimal),
    #[error("`{title}` is a {found} item but was placed with the {expected} items")]
    KindMismatch {
        title: String,
        expected: &'static str,
        found: &'static str,
    },
    #[error("unknown frequency `{0}`")]
    UnknownFrequency(String),
    #[error("unknown timeline grouping `{0}` (expected `monthly` or `quarterly`)")]
    UnknownGrouping(String),
    #[error("`{field}` is not a valid number: `{raw}`")]
    InvalidNumber { field: &'static str, raw: String },
    #[error("`{0}` is required")]
    MissingField(&'static str),
}

/// Failures surfaced by engine, storage, and collaborator operations.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error("Computation failed: {0}")]
    Computation(String),
    #[error(transparent)]
    Narrative(#[from] NarrativeError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Not found: {0}")]
    NotFound(String),
}

impl EngineError {
    pub(crate) fn overflow(operation: &str) -> Self {
        EngineError::Computation(format!("decimal overflow while computing {operation}"))
    }
}
