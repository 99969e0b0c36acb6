use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use visualizer::analysis::evaluation::evaluate_print;
use visualizer::analysis::report::{write_scores_csv, SplitScores};
use visualizer::config::{Args, DemoConfig};
use visualizer::data_handling::synthetic::generate_data;
use visualizer::detectors::{Lof, OutlierDetector};
use visualizer::models::Split;
use visualizer::{visualize, ComparisonData};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = DemoConfig::from_args(&args).context("failed to load configuration")?;
    info!("Starting the {} demo", config.detector_name);

    let data = generate_data(&config.generator)?;

    let mut detector = Lof::new(config.n_neighbors, config.generator.contamination)?;
    detector.fit(data.x_train.view())?;

    // Training predictions and scores come from the fit itself.
    let y_train_pred = detector.labels()?.to_owned();
    let y_train_scores = detector.decision_scores()?.to_owned();

    let y_test_pred = detector.predict(data.x_test.view())?;
    let y_test_scores = detector.decision_function(data.x_test.view())?;

    println!("\nOn Training Data:");
    evaluate_print(&config.detector_name, data.y_train.view(), y_train_scores.view())?;
    println!("\nOn Test Data:");
    evaluate_print(&config.detector_name, data.y_test.view(), y_test_scores.view())?;

    if let Some(path) = &config.scores_csv {
        write_scores_csv(
            path,
            &[
                SplitScores {
                    split: Split::Train,
                    x: data.x_train.view(),
                    y: data.y_train.view(),
                    y_pred: y_train_pred.view(),
                    scores: y_train_scores.view(),
                },
                SplitScores {
                    split: Split::Test,
                    x: data.x_test.view(),
                    y: data.y_test.view(),
                    y_pred: y_test_pred.view(),
                    scores: y_test_scores.view(),
                },
            ],
        )
        .with_context(|| format!("failed to write scores to {}", path.display()))?;
    }

    let comparison = ComparisonData {
        x_train: data.x_train.view(),
        y_train: data.y_train.view().into_dyn(),
        x_test: data.x_test.view(),
        y_test: data.y_test.view().into_dyn(),
        y_train_pred: y_train_pred.view().into_dyn(),
        y_test_pred: y_test_pred.view().into_dyn(),
    };
    if let Some(path) = visualize(&config.detector_name, &comparison, &config.visualize_options())? {
        info!("Saved figure to {}", path.display());
    }

    Ok(())
}
