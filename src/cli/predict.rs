//! Predict and evaluate commands - run the classifier over a corpus

use super::report::{write_confusion_report, write_failures, write_pr_curve};
use super::{merged_inference, write_output, InferenceArgs};
use anyhow::{Context, Result};
use console::style;
use std::path::Path;
use std::time::Instant;
use toxeval::config::EvalConfig;
use toxeval::corpus::load_corpus;
use toxeval::inference::run_inference;
use toxeval::metrics::ConfusionReport;
use toxeval::{EvalError, LabeledCorpus, PredictionResults};
use tracing::{info, warn};

const PREDICTIONS_FILE: &str = "predictions.json";
const CONFUSION_FILE: &str = "confusion.svg";
const PR_CURVE_FILE: &str = "pr_curve.svg";
const PR_CURVE_JSON_FILE: &str = "pr_curve.json";
const FAILURES_FILE: &str = "failures.html";

/// Run the predict command
pub fn run(args: &InferenceArgs, config: &EvalConfig, output: &Path) -> Result<()> {
    let (_, results) = predict(args, config)?;
    write_output(output, &serde_json::to_string_pretty(&results)?)?;
    println!(
        "{} Wrote predictions to {}",
        style("✓").green(),
        style(output.display()).cyan()
    );
    Ok(())
}

/// Run the evaluate command: predict, then write every report into `out_dir`
pub fn evaluate(
    args: &InferenceArgs,
    config: &EvalConfig,
    out_dir: &Path,
    top: usize,
) -> Result<()> {
    let (corpus, results) = predict(args, config)?;

    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;
    write_output(
        &out_dir.join(PREDICTIONS_FILE),
        &serde_json::to_string_pretty(&results)?,
    )?;

    if let Some(report) = confusion_or_skip(&results)? {
        write_confusion_report(&report, &out_dir.join(CONFUSION_FILE))?;
    }

    write_pr_curve(
        &results,
        &out_dir.join(PR_CURVE_FILE),
        Some(&out_dir.join(PR_CURVE_JSON_FILE)),
    )?;
    write_failures(&corpus, &results, top, &out_dir.join(FAILURES_FILE))?;

    println!(
        "\n{} Evaluation report in {}",
        style("✓").green().bold(),
        style(out_dir.display()).cyan()
    );
    Ok(())
}

/// Build the confusion grid, or warn and return `None` when the languages do
/// not fit it. Other errors propagate.
fn confusion_or_skip(results: &PredictionResults) -> Result<Option<ConfusionReport>> {
    match ConfusionReport::build(results) {
        Ok(report) => Ok(Some(report)),
        Err(err @ EvalError::LanguageCount { .. }) => {
            warn!("Skipping confusion matrices: {}", err);
            println!("{} Skipped {} ({})", style("!").yellow(), CONFUSION_FILE, err);
            Ok(None)
        }
        Err(err) => Err(err.into()),
    }
}

fn predict(
    args: &InferenceArgs,
    config: &EvalConfig,
) -> Result<(LabeledCorpus, PredictionResults)> {
    let inference = merged_inference(args, config);
    let corpus = load_corpus(&args.corpus)
        .with_context(|| format!("Failed to load corpus from {}", args.corpus.display()))?;

    println!(
        "\n{} Evaluating {} on {} languages ({} rows)\n",
        style("▶").cyan().bold(),
        style(args.model.display()).bold(),
        corpus.len(),
        corpus.values().map(Vec::len).sum::<usize>()
    );

    let start = Instant::now();
    let results = run_inference(&args.model, &corpus, &inference, !args.quiet)
        .with_context(|| format!("Inference with {} failed", args.model.display()))?;
    info!("Inference finished in {:.1}s", start.elapsed().as_secs_f64());

    Ok((corpus, results))
}

#[cfg(test)]
mod tests {
    use super::*;
    use toxeval::{Label, LanguageResults};

    fn one_row() -> LanguageResults {
        LanguageResults::labels_only(vec![Label::Toxic], vec![Label::NonToxic]).unwrap()
    }

    #[test]
    fn test_confusion_skipped_for_pooled_panel_name() {
        let mut results = PredictionResults::new();
        for lang in ["english", "all languages", "spanish"] {
            results.insert(lang.into(), one_row());
        }
        assert!(confusion_or_skip(&results).unwrap().is_none());
    }

    #[test]
    fn test_confusion_skipped_for_two_languages() {
        let mut results = PredictionResults::new();
        for lang in ["english", "spanish"] {
            results.insert(lang.into(), one_row());
        }
        assert!(confusion_or_skip(&results).unwrap().is_none());
    }

    #[test]
    fn test_confusion_built_for_three_languages() {
        let mut results = PredictionResults::new();
        for lang in ["english", "italian", "spanish"] {
            results.insert(lang.into(), one_row());
        }
        let report = confusion_or_skip(&results).unwrap().unwrap();
        assert_eq!(report.panels.len(), 4);
    }
}
