use thiserror::Error;

/// Crate-wide error type returned by every fallible public operation.
///
/// Mirrors spec §7: validation and configuration errors are raised before
/// any external call is made; transient provider errors are retried once
/// upstream and only surface here once retry is exhausted; empty-result
/// conditions are not errors at all and never construct this type.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("transient external error: {0}")]
    TransientExternal(#[from] TransientExternalError),

    #[error("hard external error: {0}")]
    HardExternal(#[from] HardExternalError),

    #[error("internal error: {0}")]
    Internal(String),

    /// Raised internally when a retrieval/fallback stage produces zero
    /// candidates. Never returned from `Core::query` — the assembler
    /// intercepts it and produces a `response_type = no_results`
    /// `StructuredResponse` instead (spec §7: "not an error").
    #[error("no candidates survived retrieval")]
    EmptyResult,
}

#[derive(Error, Debug, Clone)]
pub enum ValidationError {
    #[error("question must not be empty")]
    EmptyQuestion,

    #[error("question exceeds maximum length of {max} characters (got {actual})")]
    QuestionTooLong { max: usize, actual: usize },

    #[error("document id must not be empty")]
    EmptyDocumentId,

    #[error("raw text must not be empty")]
    EmptyDocument,

    #[error("metadata value for key '{key}' is a mapping, which the index does not accept")]
    NestedMetadata { key: String },
}

#[derive(Error, Debug, Clone)]
pub enum ConfigurationError {
    #[error("embedding dimension mismatch: settings declare {declared}, index declares {index}")]
    DimensionMismatch { declared: usize, index: usize },

    #[error("fusion weights must sum to 1.0, got semantic={semantic} + keyword={keyword} = {sum}")]
    FusionWeightsInvalid {
        semantic: f32,
        keyword: f32,
        sum: f32,
    },

    #[error("threshold bounds invalid: min={min} must be <= med={med} <= high={high}")]
    ThresholdBoundsInvalid { min: f32, med: f32, high: f32 },

    #[error("{field} must be > 0, got {value}")]
    MustBePositive { field: &'static str, value: i64 },
}

/// A provider failure that may succeed on retry (rate limit, timeout, transient 5xx).
#[derive(Error, Debug, Clone)]
pub enum TransientExternalError {
    #[error("embedding provider transient failure: {0}")]
    Embedding(String),

    #[error("vector index transient failure: {0}")]
    Index(String),

    #[error("LLM provider transient failure: {0}")]
    Llm(String),
}

/// A provider failure that will not succeed on retry, or a deadline exceeded.
#[derive(Error, Debug, Clone)]
pub enum HardExternalError {
    #[error("embedding provider failed: {0}")]
    Embedding(String),

    #[error("vector index unreachable: {0}")]
    Index(String),

    #[error("LLM provider failed: {0}")]
    Llm(String),

    #[error("query deadline of {deadline_ms}ms exceeded at stage '{stage}'")]
    DeadlineExceeded { deadline_ms: u64, stage: &'static str },
}

impl From<TransientExternalError> for HardExternalError {
    fn from(value: TransientExternalError) -> Self {
        match value {
            TransientExternalError::Embedding(m) => HardExternalError::Embedding(m),
            TransientExternalError::Index(m) => HardExternalError::Index(m),
            TransientExternalError::Llm(m) => HardExternalError::Llm(m),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_converts_to_hard_on_exhausted_retry() {
        let transient = TransientExternalError::Llm("rate limited".into());
        let hard: HardExternalError = transient.into();
        assert!(matches!(hard, HardExternalError::Llm(_)));
    }

    #[test]
    fn core_error_displays_wrapped_message() {
        let err: CoreError = ValidationError::EmptyQuestion.into();
        assert_eq!(err.to_string(), "validation error: question must not be empty");
    }
}
