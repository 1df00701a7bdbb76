use ndarray::array;
use ols_analytic::metrics::{
    mean_absolute_error, mean_squared_error, r2_score, root_mean_squared_error,
};
use ols_analytic::{ExportConfig, InferenceGraph, LinearRegressionModel, SyntheticConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Analytical OLS + Graph Export ===\n");

    let output_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "ols_model.json".to_string());

    // Income = 2.5 * Dates + 10 + noise
    let dataset = SyntheticConfig::new(array![[2.5]], array![10.0])
        .n_samples(200)
        .feature_range(0.0, 100.0)
        .noise_std(5.0)
        .seed(SyntheticConfig::DEFAULT_SEED)
        .generate()?;
    let (train, test) = dataset.train_test_split(0.2)?;
    println!(
        "Training samples: {}, Test samples: {}",
        train.n_samples(),
        test.n_samples()
    );

    let mut model = LinearRegressionModel::new(train.n_features(), train.n_targets());
    model.fit(&train.features, &train.targets)?;

    println!("\nFitted parameters:");
    println!("  Weight: {}", model.weight());
    println!("  Bias: {}", model.bias());

    let test_pred = model.predict(&test.features)?;
    println!("\nTest metrics:");
    println!("  MSE:  {:.4}", mean_squared_error(&test.targets, &test_pred)?);
    println!("  RMSE: {:.4}", root_mean_squared_error(&test.targets, &test_pred)?);
    println!("  MAE:  {:.4}", mean_absolute_error(&test.targets, &test_pred)?);
    println!("  R²:   {:.4}", r2_score(&test.targets, &test_pred)?);

    let config = ExportConfig::new()
        .input_name("Dates")
        .output_name("Income")
        .graph_name("ols_analytical");
    let graph = InferenceGraph::from_model(&model, &config);
    graph.save(&output_path)?;
    println!("\nExported graph to {}", output_path);

    let reloaded = InferenceGraph::load(&output_path)?;
    let probe = array![[50.0], [75.0]];
    let from_graph = reloaded.evaluate(&probe)?;
    let from_model = model.predict(&probe)?;
    for i in 0..probe.nrows() {
        println!(
            "  Dates={:.1}: model={:.4}, graph={:.4}",
            probe[(i, 0)],
            from_model[(i, 0)],
            from_graph[(i, 0)]
        );
    }

    Ok(())
}
