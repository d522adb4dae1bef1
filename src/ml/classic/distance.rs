use std::fmt;
use std::str::FromStr;

use num_traits::Float;

use crate::error::{KnnError, Result};

/// Distance metric used to rank training points against a query.
///
/// The set is closed: a metric name is checked once, when it is parsed, and
/// every later call dispatches through an exhaustive `match`.
///
/// # Example
///
/// ```
/// use knn::Metric;
///
/// let metric: Metric = "chebyshev".parse().unwrap();
/// let d = metric.distance(&[0.0, 0.0], &[3.0, -4.0]).unwrap();
/// assert_eq!(d, 4.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Metric {
    Manhattan,
    #[default]
    Euclidean,
    Chebyshev,
}

impl Metric {
    /// All supported metrics, in the order their names are reported.
    pub const ALL: [Metric; 3] = [Metric::Manhattan, Metric::Euclidean, Metric::Chebyshev];

    /// Canonical lowercase name, as accepted by `FromStr`.
    pub fn name(&self) -> &'static str {
        match self {
            Metric::Manhattan => "manhattan",
            Metric::Euclidean => "euclidean",
            Metric::Chebyshev => "chebyshev",
        }
    }

    /// Computes the distance between `v1` and `v2` under this metric.
    ///
    /// # Errors
    ///
    /// See [`validate_pair`].
    pub fn distance<T: Float>(&self, v1: &[T], v2: &[T]) -> Result<T> {
        match self {
            Metric::Manhattan => manhattan_distance(v1, v2),
            Metric::Euclidean => euclidean_distance(v1, v2),
            Metric::Chebyshev => chebyshev_distance(v1, v2),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Metric {
    type Err = KnnError;

    fn from_str(s: &str) -> Result<Self> {
        Metric::ALL
            .iter()
            .copied()
            .find(|m| m.name() == s)
            .ok_or_else(|| KnnError::UnsupportedMetric {
                name: s.to_string(),
                valid: Metric::ALL.iter().map(Metric::name).collect(),
            })
    }
}

/// Checks the preconditions shared by every metric.
///
/// The checks run in a fixed order and the first one violated is reported:
///
/// 1. an empty vector is treated as absent: [`KnnError::NullVector`]
/// 2. lengths differ: [`KnnError::DimensionMismatch`]
/// 3. a component is NaN: [`KnnError::InvalidValue`]
pub fn validate_pair<T: Float>(v1: &[T], v2: &[T]) -> Result<()> {
    if v1.is_empty() || v2.is_empty() {
        return Err(KnnError::NullVector {
            left: v1.is_empty(),
            right: v2.is_empty(),
        });
    }
    if v1.len() != v2.len() {
        return Err(KnnError::DimensionMismatch {
            left: v1.len(),
            right: v2.len(),
        });
    }
    let left_nan = v1.iter().any(|x| x.is_nan());
    let right_nan = v2.iter().any(|x| x.is_nan());
    if left_nan || right_nan {
        return Err(KnnError::InvalidValue {
            left_nan,
            right_nan,
        });
    }
    Ok(())
}

/// `|a - b|`, with equal components (including equal infinities) at exactly zero.
fn abs_diff<T: Float>(a: T, b: T) -> T {
    if a == b {
        T::zero()
    } else {
        (a - b).abs()
    }
}

/// Manhattan (L1) distance: `Σ |v1ᵢ - v2ᵢ|`.
pub fn manhattan_distance<T: Float>(v1: &[T], v2: &[T]) -> Result<T> {
    validate_pair(v1, v2)?;
    Ok(v1
        .iter()
        .zip(v2)
        .fold(T::zero(), |acc, (&a, &b)| acc + abs_diff(a, b)))
}

/// Euclidean (L2) distance: `sqrt(Σ (v1ᵢ - v2ᵢ)²)`.
///
/// The squares are taken relative to the largest component difference, so
/// the sum cannot overflow for finite inputs.
pub fn euclidean_distance<T: Float>(v1: &[T], v2: &[T]) -> Result<T> {
    let scale = chebyshev_distance(v1, v2)?;
    if scale.is_zero() || scale.is_infinite() {
        return Ok(scale);
    }
    let sum_sq = v1.iter().zip(v2).fold(T::zero(), |acc, (&a, &b)| {
        let ratio = abs_diff(a, b) / scale;
        acc + ratio * ratio
    });
    Ok(scale * sum_sq.sqrt())
}

/// Chebyshev (L∞) distance: `max |v1ᵢ - v2ᵢ|`.
pub fn chebyshev_distance<T: Float>(v1: &[T], v2: &[T]) -> Result<T> {
    validate_pair(v1, v2)?;
    Ok(v1
        .iter()
        .zip(v2)
        .fold(T::zero(), |acc, (&a, &b)| acc.max(abs_diff(a, b))))
}
