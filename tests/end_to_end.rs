use approx::assert_abs_diff_eq;
use ndarray::array;
use ols_analytic::{
    ExportConfig, InferenceGraph, LinearRegressionModel, Matrix, RegressionError, StandardScaler,
    SyntheticConfig,
};

#[test]
fn fit_export_load_evaluate() {
    let dataset = SyntheticConfig::new(array![[1.5, -0.5, 2.0]], array![3.0])
        .n_samples(60)
        .feature_range(-5.0, 5.0)
        .generate()
        .unwrap();
    let (train, test) = dataset.train_test_split(0.25).unwrap();

    let mut model = LinearRegressionModel::new(3, 1);
    model.fit(&train.features, &train.targets).unwrap();
    assert_abs_diff_eq!(*model.weight(), array![[1.5, -0.5, 2.0]], epsilon = 1e-6);
    assert_abs_diff_eq!(*model.bias(), array![3.0], epsilon = 1e-6);

    let path = std::env::temp_dir().join(format!("ols_analytic_e2e_{}.json", std::process::id()));
    InferenceGraph::from_model(&model, &ExportConfig::new().input_name("x").output_name("y"))
        .save(&path)
        .unwrap();
    let graph = InferenceGraph::load(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    let expected = model.predict(&test.features).unwrap();
    assert_abs_diff_eq!(graph.evaluate(&test.features).unwrap(), expected, epsilon = 1e-12);
    assert_abs_diff_eq!(expected, test.targets, epsilon = 1e-6);
    assert_eq!(graph.to_model().unwrap(), model);
}

#[test]
fn noisy_fit_on_standardized_features() {
    let dataset = SyntheticConfig::new(array![[4.0, -3.0], [0.5, 1.0]], array![1.0, -1.0])
        .n_samples(500)
        .feature_range(0.0, 50.0)
        .noise_std(0.5)
        .generate()
        .unwrap();

    let mut scaler = StandardScaler::new();
    let features = scaler.fit_transform(&dataset.features).unwrap();

    let mut model = LinearRegressionModel::new(2, 2);
    model.fit(&features, &dataset.targets).unwrap();
    assert!(model.score(&features, &dataset.targets).unwrap() > 0.99);
}

#[test]
fn load_missing_file_is_io_error() {
    let path = std::env::temp_dir().join("ols_analytic_does_not_exist.json");
    assert!(matches!(InferenceGraph::load(&path), Err(RegressionError::Io(_))));
}

#[test]
fn singular_design_is_reported() {
    // Second feature duplicates the first.
    let x = Matrix::from_shape_fn((10, 2), |(i, _)| i as f64);
    let y = Matrix::from_shape_fn((10, 1), |(i, _)| 2.0 * i as f64);

    let mut model = LinearRegressionModel::new(2, 1);
    assert!(matches!(
        model.fit(&x, &y),
        Err(RegressionError::SingularMatrix { .. })
    ));
}
