use std::{fs, path::PathBuf, time::Instant};

use anyhow::{Context, Result};
use clap::Parser;
use feature_search::{
    fit_best_classifier, mean_accuracy_per_setting, sorted_accuracies, top_coefficients, top_misclassified,
    vectorize_test_corpus, accuracy_score, Classifier, Corpus, FittedModel, LogisticRegression, SearchConfig,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "feature-search")]
#[command(about = "Grid search over tokenization and feature settings for a sentiment classifier", long_about = None)]
struct Cli {
    /// Training directory containing pos/ and neg/
    #[arg(long, value_name = "DIR")]
    train: PathBuf,

    /// Test directory containing pos/ and neg/
    #[arg(long, value_name = "DIR")]
    test: Option<PathBuf>,

    /// Search configuration (JSON)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Save the fitted best model (CBOR)
    #[arg(long, value_name = "PATH")]
    save: Option<PathBuf>,

    /// Write all cross-validation accuracies in ascending order, one per line
    #[arg(long, value_name = "PATH")]
    accuracies: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => SearchConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => SearchConfig::default(),
    };

    let train = Corpus::from_dir(&cli.train)
        .with_context(|| format!("Failed to read training data: {}", cli.train.display()))?;
    let (neg, pos) = train.class_counts();
    info!(documents = train.len(), positive = pos, negative = neg, "training corpus loaded");

    // Evaluate accuracy of every tokenization/featurization combination
    let start = Instant::now();
    let results = config.grid()?.run(train.documents(), train.labels(), LogisticRegression::new)?;
    info!(elapsed = ?start.elapsed(), "grid search done");
    let (Some(best), Some(worst)) = (results.first(), results.last()) else {
        anyhow::bail!("grid search produced no results");
    };
    println!("best cross-validation result:\n{best}");
    println!("worst cross-validation result:\n{worst}");

    if let Some(path) = &cli.accuracies {
        let lines: Vec<String> = sorted_accuracies(&results).iter().map(|a| a.to_string()).collect();
        fs::write(path, lines.join("\n"))
            .with_context(|| format!("Failed to write accuracies: {}", path.display()))?;
    }

    println!("\nMean Accuracies per Setting:");
    for (accuracy, label) in mean_accuracy_per_setting(&results) {
        println!("{label}: {accuracy:.5}");
    }

    // Fit best classifier on all training data
    let (clf, vocab) = fit_best_classifier(train.documents(), train.labels(), &best.setting, LogisticRegression::new())?;
    let coefficients = clf.coefficients().context("best classifier has no coefficients")?;

    println!("\nTOP COEFFICIENTS PER CLASS:");
    println!("negative words:");
    for (name, value) in top_coefficients(coefficients, &vocab, 0, config.top_n) {
        println!("{name}: {value:.5}");
    }
    println!("\npositive words:");
    for (name, value) in top_coefficients(coefficients, &vocab, 1, config.top_n) {
        println!("{name}: {value:.5}");
    }

    if let Some(dir) = &cli.test {
        let test = Corpus::from_dir(dir)
            .with_context(|| format!("Failed to read test data: {}", dir.display()))?;
        let x_test = vectorize_test_corpus(test.documents(), &best.setting, &vocab);
        let predictions = clf.predict(&x_test)?;
        let probabilities = clf.predict_proba(&x_test)?;
        println!("testing accuracy={:.6}", accuracy_score(test.labels(), &predictions));

        println!("\nTOP MISCLASSIFIED TEST DOCUMENTS:");
        for missed in top_misclassified(test.labels(), &predictions, &probabilities, config.top_n) {
            println!(
                "truth={} predicted={} proba={:.6}\n{}\n",
                missed.truth,
                missed.predicted,
                missed.probability,
                test.documents()[missed.index]
            );
        }
    }

    if let Some(path) = &cli.save {
        let model = FittedModel::new(best.setting.clone(), vocab, &clf)?;
        model
            .save(path)
            .with_context(|| format!("Failed to save model: {}", path.display()))?;
        info!(path = %path.display(), "model saved");
    }

    Ok(())
}
