//! Report commands - confusion matrices, PR curve, failures, training curves

use super::{read_results, write_output};
use anyhow::{Context, Result};
use console::style;
use std::path::Path;
use toxeval::corpus::load_corpus;
use toxeval::failures::find_top_failures;
use toxeval::metrics::{ConfusionReport, PrCurve, TrainingHistory};
use toxeval::models::title_case;
use toxeval::render;
use toxeval::{LabeledCorpus, PredictionResults};

/// Run the confusion command
pub fn confusion(results_path: &Path, output: &Path) -> Result<()> {
    let results = read_results(results_path)?;
    write_confusion(&results, output)
}

/// Run the pr-curve command
pub fn pr_curve(results_path: &Path, output: &Path, json: Option<&Path>) -> Result<()> {
    let results = read_results(results_path)?;
    write_pr_curve(&results, output, json)
}

/// Run the failures command
pub fn failures(results_path: &Path, corpus_dir: &Path, top: usize, output: &Path) -> Result<()> {
    let results = read_results(results_path)?;
    let corpus = load_corpus(corpus_dir)
        .with_context(|| format!("Failed to load corpus from {}", corpus_dir.display()))?;
    write_failures(&corpus, &results, top, output)
}

/// Run the curves command
pub fn curves(history_path: &Path, output: &Path) -> Result<()> {
    let history = TrainingHistory::load(history_path)
        .with_context(|| format!("Failed to load history from {}", history_path.display()))?;
    write_output(output, &render::curves::render_svg(&history))?;

    if let Some(best) = history.best_epoch() {
        println!(
            "Lowest validation loss at epoch {}",
            style(best + 1).bold()
        );
    }
    print_written(output);
    Ok(())
}

fn write_confusion(results: &PredictionResults, output: &Path) -> Result<()> {
    let report = ConfusionReport::build(results)?;
    write_confusion_report(&report, output)
}

pub(super) fn write_confusion_report(report: &ConfusionReport, output: &Path) -> Result<()> {
    write_output(output, &render::confusion::render_svg(report))?;

    println!("\n{}", style("Accuracy").bold());
    for panel in &report.panels {
        println!(
            "  {:<20} {:>8}  ({}/{})",
            title_case(&panel.language),
            format!("{:.2}%", panel.rounded_accuracy()),
            panel.matrix.correct(),
            panel.matrix.total()
        );
    }
    print_written(output);
    Ok(())
}

pub(super) fn write_pr_curve(
    results: &PredictionResults,
    output: &Path,
    json: Option<&Path>,
) -> Result<()> {
    let curve = PrCurve::from_results(results)?;
    write_output(output, &render::pr_curve::render_svg(&curve))?;
    if let Some(json_path) = json {
        write_output(json_path, &serde_json::to_string_pretty(&curve)?)?;
        print_written(json_path);
    }

    let (recall, precision) = curve.optimal_point();
    println!(
        "\nPR AUC: {}   optimal threshold: {} (precision {:.2}, recall {:.2})",
        style(format!("{:.4}", curve.auc)).bold(),
        style(format!("{:.4}", curve.optimal_threshold)).bold(),
        precision,
        recall
    );
    print_written(output);
    Ok(())
}

pub(super) fn write_failures(
    corpus: &LabeledCorpus,
    results: &PredictionResults,
    top: usize,
    output: &Path,
) -> Result<()> {
    let report = find_top_failures(corpus, results, top)?;
    write_output(output, &render::failures::render_html(&report))?;

    for (lang, failures) in &report {
        println!(
            "  {:<20} {} false toxic, {} false non-toxic",
            title_case(lang),
            style(failures.false_toxic.len()).red(),
            style(failures.false_non_toxic.len()).yellow()
        );
    }
    print_written(output);
    Ok(())
}

fn print_written(path: &Path) {
    println!(
        "{} Wrote {}",
        style("✓").green(),
        style(path.display()).cyan()
    );
}
