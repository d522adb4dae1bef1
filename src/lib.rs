pub mod error;
pub mod ml;

pub use error::{KnnError, Result};
pub use ml::classic::{
    chebyshev_distance, euclidean_distance, manhattan_distance, KNNConfig, KNNPredictor, Label,
    Metric, Mode, Neighbor,
};
