use thiserror::Error;

use crate::ml::classic::k_nearest::Mode;

/// Errors raised while configuring a predictor or computing predictions.
///
/// Every variant aborts the call that raised it; no partial result is returned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum KnnError {
    #[error("unsupported metric `{name}`, expected one of [{}]", .valid.join(", "))]
    UnsupportedMetric {
        name: String,
        valid: Vec<&'static str>,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(
        "distance cannot be computed from an absent vector (left absent: {left}, right absent: {right})"
    )]
    NullVector { left: bool, right: bool },

    #[error("cannot compare vectors with different lengths ({left}, {right})")]
    DimensionMismatch { left: usize, right: usize },

    #[error("cannot compare vectors with NaN values (left: {left_nan}, right: {right_nan})")]
    InvalidValue { left_nan: bool, right_nan: bool },

    #[error("k = {k} exceeds the number of training points ({n})")]
    KTooLarge { k: usize, n: usize },

    #[error("got {features} training feature vectors but {labels} labels")]
    LabelCountMismatch { features: usize, labels: usize },

    #[error("label at index {index} does not match {mode:?} mode")]
    LabelModeMismatch { index: usize, mode: Mode },
}

pub type Result<T> = std::result::Result<T, KnnError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_metric_lists_valid_set() {
        let err = KnnError::UnsupportedMetric {
            name: "cosine".to_string(),
            valid: vec!["manhattan", "euclidean", "chebyshev"],
        };
        assert_eq!(
            err.to_string(),
            "unsupported metric `cosine`, expected one of [manhattan, euclidean, chebyshev]"
        );
    }

    #[test]
    fn test_k_too_large_names_both_counts() {
        let msg = KnnError::KTooLarge { k: 10, n: 3 }.to_string();
        assert!(msg.contains("10"));
        assert!(msg.contains('3'));
    }
}
