use approx::assert_relative_eq;
use knn::{KNNConfig, KNNPredictor, KnnError, Label, Metric, Mode};

fn class(name: &str) -> Label {
    Label::Class(name.to_string())
}

#[test]
fn classifies_two_clusters_with_nearest_neighbor() {
    let features = vec![
        vec![0.0, 0.0],
        vec![1.0, 1.0],
        vec![5.0, 5.0],
        vec![6.0, 6.0],
    ];
    let labels = vec![class("A"), class("A"), class("B"), class("B")];
    let knn = KNNPredictor::with_metric_name(1, "euclidean").unwrap();

    let predicted = knn
        .predict(
            &features,
            &labels,
            &[vec![0.1, 0.1], vec![5.9, 5.9]],
            Mode::Classification,
        )
        .unwrap();
    assert_eq!(predicted, vec![class("A"), class("B")]);
}

#[test]
fn regresses_to_mean_of_two_nearest() {
    let features = vec![vec![0.0], vec![1.0], vec![2.0]];
    let labels = vec![Label::Value(10.0), Label::Value(20.0), Label::Value(30.0)];
    let knn = KNNPredictor::with_metric_name(2, "manhattan").unwrap();

    let predicted = knn
        .predict(&features, &labels, &[vec![0.5]], Mode::Regression)
        .unwrap();
    match predicted.as_slice() {
        [Label::Value(v)] => assert_relative_eq!(*v, 15.0),
        other => panic!("unexpected prediction {other:?}"),
    }
}

#[test]
fn k_larger_than_training_set_fails() {
    let features = vec![vec![0.0], vec![1.0], vec![2.0]];
    let labels = vec![class("a"), class("b"), class("c")];
    let knn = KNNPredictor::new(KNNConfig::new(10)).unwrap();

    assert_eq!(
        knn.predict(&features, &labels, &[vec![1.0]], Mode::Classification),
        Err(KnnError::KTooLarge { k: 10, n: 3 })
    );
}

#[test]
fn predictor_serves_repeated_calls() {
    let features = vec![vec![0.0, 1.0], vec![2.0, 3.0], vec![4.0, 5.0], vec![6.0, 7.0]];
    let labels = vec![1.0, 2.0, 3.0, 4.0];
    let queries = vec![vec![1.0, 1.0], vec![3.0, 5.0], vec![7.0, 7.0]];

    for metric in Metric::ALL {
        let knn = KNNPredictor::new(KNNConfig::new(2).with_metric(metric).with_parallel(true))
            .unwrap();
        let first = knn.regress(&features, &labels, &queries).unwrap();
        let second = knn.regress(&features, &labels, &queries).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), queries.len());
    }
}

#[test]
fn errors_render_readable_messages() {
    let err = KNNPredictor::with_metric_name(3, "hamming").unwrap_err();
    assert_eq!(
        err.to_string(),
        "unsupported metric `hamming`, expected one of [manhattan, euclidean, chebyshev]"
    );
}
