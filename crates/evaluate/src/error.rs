//! Verification error types.

/// Errors that can occur while building inputs or computing scores.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum VerifyError {
    /// One or more validation checks failed.
    #[error("{count} validation error(s): {details}")]
    Validation { count: usize, details: String },

    /// A score or statistic name has no computation behind it.
    #[error("unsupported score request: '{name}'")]
    UnsupportedScore { name: String },

    /// A threshold operator is not one of ge, gt, le, lt.
    #[error("unsupported operator '{name}': expected ge, gt, le, lt or >=, >, <=, <")]
    UnsupportedOperator { name: String },

    /// The entity is absent from one of the input sources.
    #[error("entity '{entity}' not found in {source_name}")]
    MissingEntityData { entity: String, source_name: String },

    /// No valid (observation, prediction) pair survived alignment.
    #[error("entity '{entity}' has no valid observation/prediction pairs")]
    EmptyPairSeries { entity: String },

    /// A score denominator was zero (no events, constant or zero-mean series).
    #[error("{score} is undefined: {reason}")]
    DivisionByZero { score: String, reason: String },

    /// Observation and prediction sequences differ in length.
    #[error("length mismatch: observations have {obs_len} values, predictions have {pred_len}")]
    LengthMismatch { obs_len: usize, pred_len: usize },

    /// Input contains infinite values.
    #[error("input data contains infinite values")]
    NonFiniteData,

    /// A time index is not strictly increasing.
    #[error("time index is not strictly increasing at position {position}")]
    UnorderedIndex { position: usize },

    /// JSON serialization failed.
    #[error("serialization error: {reason}")]
    Serialization { reason: String },

    /// A result sink could not write its destination.
    #[error("failed to write '{path}': {reason}")]
    Io { path: String, reason: String },
}

impl VerifyError {
    pub(crate) fn division_by_zero(score: &str, reason: &str) -> Self {
        Self::DivisionByZero {
            score: score.to_string(),
            reason: reason.to_string(),
        }
    }
}
