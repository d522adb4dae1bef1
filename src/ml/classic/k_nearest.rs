use std::collections::HashMap;
use std::hash::Hash;

use log::{debug, trace};
use rayon::prelude::*;

use super::distance::{validate_pair, Metric};
use crate::error::{KnnError, Result};

/// Whether labels are categories to vote on or values to average.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Classification,
    Regression,
}

/// A training label or a prediction, for the mode-dispatched [`KNNPredictor::predict`].
#[derive(Debug, Clone, PartialEq)]
pub enum Label {
    Class(String),
    Value(f64),
}

/// One training point as seen from a query: its position in the training set
/// and its distance to the query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub index: usize,
    pub distance: f64,
}

/// Configuration options for a k-NN predictor.
#[derive(Debug, Clone, PartialEq)]
pub struct KNNConfig {
    /// Number of neighbors consulted per query.
    pub k: usize,
    /// Distance metric used to rank training points.
    pub metric: Metric,
    /// Evaluate queries on the rayon thread pool.
    pub parallel: bool,
}

impl KNNConfig {
    /// Create a new config using the Euclidean metric and sequential evaluation.
    pub fn new(k: usize) -> Self {
        Self {
            k,
            metric: Metric::Euclidean,
            parallel: false,
        }
    }

    /// Customize the distance metric.
    pub fn with_metric(mut self, metric: Metric) -> Self {
        self.metric = metric;
        self
    }

    /// Customize whether queries are evaluated in parallel.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

impl Default for KNNConfig {
    fn default() -> Self {
        Self::new(5)
    }
}

/// A brute-force k-nearest-neighbors predictor.
///
/// The predictor only holds its configuration. Training data is borrowed for
/// the duration of each predict call, so one predictor can serve any number of
/// calls (and threads) without being mutated.
///
/// # Example
///
/// ```
/// use knn::{KNNConfig, KNNPredictor, Metric};
///
/// let features = vec![vec![0.0, 0.0], vec![1.0, 1.0], vec![5.0, 5.0], vec![6.0, 6.0]];
/// let labels = vec!["A", "A", "B", "B"];
///
/// let knn = KNNPredictor::new(KNNConfig::new(1).with_metric(Metric::Euclidean)).unwrap();
/// let predicted = knn
///     .classify(&features, &labels, &[vec![0.1, 0.1], vec![5.9, 5.9]])
///     .unwrap();
/// assert_eq!(predicted, vec!["A", "B"]);
/// ```
#[derive(Debug, Clone)]
pub struct KNNPredictor {
    config: KNNConfig,
}

impl KNNPredictor {
    /// Constructs a new `KNNPredictor`.
    ///
    /// # Errors
    ///
    /// - [`KnnError::InvalidConfig`] if `config.k == 0`.
    pub fn new(config: KNNConfig) -> Result<Self> {
        if config.k == 0 {
            return Err(KnnError::InvalidConfig(
                "k must be a positive integer, got 0".to_string(),
            ));
        }
        debug!(
            "configured k-NN predictor: k = {}, metric = {}, parallel = {}",
            config.k, config.metric, config.parallel
        );
        Ok(Self { config })
    }

    /// Constructs a sequential predictor from a metric name.
    ///
    /// # Errors
    ///
    /// - [`KnnError::UnsupportedMetric`] if `metric` is not one of
    ///   `manhattan`, `euclidean`, `chebyshev`.
    /// - [`KnnError::InvalidConfig`] if `k == 0`.
    pub fn with_metric_name(k: usize, metric: &str) -> Result<Self> {
        let metric = metric.parse::<Metric>()?;
        Self::new(KNNConfig::new(k).with_metric(metric))
    }

    pub fn k(&self) -> usize {
        self.config.k
    }

    pub fn metric(&self) -> Metric {
        self.config.metric
    }

    pub fn config(&self) -> &KNNConfig {
        &self.config
    }

    /// Predicts one label per query, aggregating according to `mode`.
    ///
    /// In classification mode every label must be a [`Label::Class`] and the
    /// result is the majority class of the `k` nearest neighbors. In
    /// regression mode every label must be a [`Label::Value`] and the result
    /// is their mean.
    ///
    /// # Errors
    ///
    /// Any error of [`KNNPredictor::classify`] / [`KNNPredictor::regress`], or
    /// [`KnnError::LabelModeMismatch`] for the first label that does not fit `mode`.
    pub fn predict(
        &self,
        features: &[Vec<f64>],
        labels: &[Label],
        queries: &[Vec<f64>],
        mode: Mode,
    ) -> Result<Vec<Label>> {
        self.validate(features, labels.len(), queries)?;
        match mode {
            Mode::Classification => {
                let classes = labels
                    .iter()
                    .enumerate()
                    .map(|(index, label)| match label {
                        Label::Class(class) => Ok(class.as_str()),
                        Label::Value(_) => Err(KnnError::LabelModeMismatch { index, mode }),
                    })
                    .collect::<Result<Vec<&str>>>()?;
                let predicted = self.classify_unchecked(features, &classes, queries)?;
                Ok(predicted
                    .into_iter()
                    .map(|class| Label::Class(class.to_string()))
                    .collect())
            }
            Mode::Regression => {
                let values = labels
                    .iter()
                    .enumerate()
                    .map(|(index, label)| match label {
                        Label::Value(value) => Ok(*value),
                        Label::Class(_) => Err(KnnError::LabelModeMismatch { index, mode }),
                    })
                    .collect::<Result<Vec<f64>>>()?;
                let predicted = self.regress_unchecked(features, &values, queries)?;
                Ok(predicted.into_iter().map(Label::Value).collect())
            }
        }
    }

    /// Classifies each query by majority vote among its `k` nearest neighbors.
    ///
    /// On a frequency tie the label whose nearest neighbor ranks first wins.
    ///
    /// # Errors
    ///
    /// - [`KnnError::LabelCountMismatch`] if `features` and `labels` differ in length.
    /// - [`KnnError::KTooLarge`] if `k` exceeds the number of training points.
    /// - [`KnnError::NullVector`], [`KnnError::DimensionMismatch`] or
    ///   [`KnnError::InvalidValue`] for the first malformed training or query vector.
    pub fn classify<L>(
        &self,
        features: &[Vec<f64>],
        labels: &[L],
        queries: &[Vec<f64>],
    ) -> Result<Vec<L>>
    where
        L: Eq + Hash + Clone + Send + Sync,
    {
        self.validate(features, labels.len(), queries)?;
        self.classify_unchecked(features, labels, queries)
    }

    /// Predicts each query as the unweighted mean of its `k` nearest neighbors' values.
    ///
    /// # Errors
    ///
    /// Same as [`KNNPredictor::classify`].
    pub fn regress(
        &self,
        features: &[Vec<f64>],
        labels: &[f64],
        queries: &[Vec<f64>],
    ) -> Result<Vec<f64>> {
        self.validate(features, labels.len(), queries)?;
        self.regress_unchecked(features, labels, queries)
    }

    /// Returns the `k` nearest training points to `query`, closest first.
    /// Equal distances are ordered by training index.
    ///
    /// # Errors
    ///
    /// Same as [`KNNPredictor::classify`], for a single query.
    pub fn kneighbors(&self, features: &[Vec<f64>], query: &[f64]) -> Result<Vec<Neighbor>> {
        self.validate(features, features.len(), std::slice::from_ref(&query))?;
        self.nearest(features, query)
    }

    fn classify_unchecked<L>(
        &self,
        features: &[Vec<f64>],
        labels: &[L],
        queries: &[Vec<f64>],
    ) -> Result<Vec<L>>
    where
        L: Eq + Hash + Clone + Send + Sync,
    {
        self.map_queries(queries, |query| {
            let neighbors = self.nearest(features, query)?;
            Ok(majority_vote(&neighbors, labels))
        })
    }

    fn regress_unchecked(
        &self,
        features: &[Vec<f64>],
        labels: &[f64],
        queries: &[Vec<f64>],
    ) -> Result<Vec<f64>> {
        self.map_queries(queries, |query| {
            let neighbors = self.nearest(features, query)?;
            let sum: f64 = neighbors.iter().map(|n| labels[n.index]).sum();
            Ok(sum / neighbors.len() as f64)
        })
    }

    /// Runs `predict_one` over every query, keeping query order on both paths.
    fn map_queries<Q, P, F>(&self, queries: &[Q], predict_one: F) -> Result<Vec<P>>
    where
        Q: AsRef<[f64]> + Sync,
        P: Send,
        F: Fn(&[f64]) -> Result<P> + Sync + Send,
    {
        debug!(
            "predicting {} queries (k = {}, metric = {}, parallel = {})",
            queries.len(),
            self.config.k,
            self.config.metric,
            self.config.parallel
        );
        if self.config.parallel {
            queries.par_iter().map(|q| predict_one(q.as_ref())).collect()
        } else {
            queries.iter().map(|q| predict_one(q.as_ref())).collect()
        }
    }

    /// Checks the whole call up front so that the reported error does not
    /// depend on evaluation order.
    fn validate<Q: AsRef<[f64]>>(
        &self,
        features: &[Vec<f64>],
        n_labels: usize,
        queries: &[Q],
    ) -> Result<()> {
        if features.len() != n_labels {
            return Err(KnnError::LabelCountMismatch {
                features: features.len(),
                labels: n_labels,
            });
        }
        let n = features.len();
        if self.config.k > n {
            return Err(KnnError::KTooLarge { k: self.config.k, n });
        }
        // k >= 1, so there is at least one training vector
        let reference = &features[0];
        for train in features {
            validate_pair(reference, train)?;
        }
        for query in queries {
            validate_pair(query.as_ref(), reference)?;
        }
        Ok(())
    }

    /// Distances from `query` to every training vector, sorted and cut to `k`.
    fn nearest(&self, features: &[Vec<f64>], query: &[f64]) -> Result<Vec<Neighbor>> {
        let mut neighbors = features
            .iter()
            .enumerate()
            .map(|(index, train)| {
                Ok(Neighbor {
                    index,
                    distance: self.config.metric.distance(query, train)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        // stable: equal distances keep ascending index order
        neighbors.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        neighbors.truncate(self.config.k);
        trace!("selected neighbors {:?}", neighbors);
        Ok(neighbors)
    }
}

/// Majority vote over the neighbors' labels. `neighbors` must be ordered
/// closest first; among equally frequent labels the one seen first wins.
///
/// # Panics
///
/// If `neighbors` is empty. `validate` guarantees `1 <= k <= N` beforehand.
fn majority_vote<L: Eq + Hash + Clone>(neighbors: &[Neighbor], labels: &[L]) -> L {
    let mut counts: HashMap<&L, usize> = HashMap::new();
    for neighbor in neighbors {
        *counts.entry(&labels[neighbor.index]).or_insert(0) += 1;
    }
    // scan in rank order and only move on a strictly higher count
    let mut best = &labels[neighbors[0].index];
    for neighbor in &neighbors[1..] {
        let label = &labels[neighbor.index];
        if counts[label] > counts[best] {
            best = label;
        }
    }
    best.clone()
}
