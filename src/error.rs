//! Error taxonomy for the optimizer.
//!
//! Every variant is a deterministic function of the caller's input or
//! configuration. Nothing here is transient, so nothing is retried.

use thiserror::Error;

/// Errors surfaced by construction, `ask` and `tell`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GaError {
    /// Construction parameters violate their documented constraints.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// `tell` received a reward table whose length differs from the population.
    #[error("inconsistent reward table size: expected {expected}, got {actual}")]
    InvalidInput { expected: usize, actual: usize },

    /// Too few finite rewards to define the elite set or the reward CDF.
    #[error("insufficient valid rewards: {valid} valid, {required} required")]
    InsufficientValidRewards { valid: usize, required: usize },

    /// A post-process hook changed the population shape.
    #[error("post-processed population has shape {actual:?}, expected {expected:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    /// `ask`/`tell` called out of order.
    #[error("out of sequence: {0}")]
    OutOfSequence(&'static str),
}

pub type Result<T> = std::result::Result<T, GaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let e = GaError::InvalidInput {
            expected: 8,
            actual: 7,
        };
        assert_eq!(
            e.to_string(),
            "inconsistent reward table size: expected 8, got 7"
        );

        let e = GaError::InsufficientValidRewards {
            valid: 0,
            required: 2,
        };
        assert!(e.to_string().contains("0 valid"));
    }
}
