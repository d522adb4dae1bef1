pub mod distance;
pub mod k_nearest;

// Re-export public types and functions
pub use distance::{
    chebyshev_distance, euclidean_distance, manhattan_distance, validate_pair, Metric,
};
pub use k_nearest::{KNNConfig, KNNPredictor, Label, Mode, Neighbor};
