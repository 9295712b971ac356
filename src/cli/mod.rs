//! CLI command definitions and handlers

mod init;
mod predict;
mod report;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use toxeval::config::{load_config, DeviceChoice, EvalConfig, InferenceConfig};
use toxeval::PredictionResults;

/// Parse and validate a batch size (at least 1)
fn parse_batch_size(s: &str) -> Result<usize, String> {
    let n: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if n == 0 {
        Err("batch size must be at least 1".to_string())
    } else {
        Ok(n)
    }
}

/// Parse and validate a confidence threshold in [0, 1]
fn parse_threshold(s: &str) -> Result<f64, String> {
    let t: f64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if (0.0..=1.0).contains(&t) {
        Ok(t)
    } else {
        Err("threshold must be within [0, 1]".to_string())
    }
}

/// toxeval - evaluate multilingual toxicity classifiers
#[derive(Parser, Debug)]
#[command(name = "toxeval")]
#[command(
    version,
    about = "Evaluate a fine-tuned toxic/non-toxic text classifier across languages",
    long_about = "toxeval runs a fine-tuned DistilBERT checkpoint over a labeled corpus with \
one JSON Lines file per language, then renders confusion matrices, a pooled \
precision-recall curve and an HTML report of the most confident failures.",
    after_help = "\
Examples:
  toxeval init                                             Write an example toxeval.toml
  toxeval evaluate --model model.pt --corpus data/ --out-dir report/
  toxeval predict --model model.pt --corpus data/ -o predictions.json
  toxeval confusion predictions.json -o confusion.svg
  toxeval pr-curve predictions.json -o pr.svg --json pr.json
  toxeval failures predictions.json --corpus data/ --top 10 -o failures.html
  toxeval curves history.json -o curves.svg"
)]
pub struct Cli {
    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    /// Configuration file (default: ./toxeval.toml)
    #[arg(long, global = true, env = "TOXEVAL_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Inference flags shared by `predict` and `evaluate`
#[derive(clap::Args, Debug)]
pub struct InferenceArgs {
    /// Fine-tuned checkpoint (.safetensors, .pt, .pth or .bin)
    #[arg(long, short = 'm')]
    pub model: PathBuf,

    /// Corpus directory with one <language>.jsonl file per language
    #[arg(long, short = 'c')]
    pub corpus: PathBuf,

    /// Local directory or Hugging Face id with config.json and tokenizer.json
    #[arg(long)]
    pub base_model: Option<String>,

    /// Texts per forward pass
    #[arg(long, value_parser = parse_batch_size)]
    pub batch_size: Option<usize>,

    /// Predict toxic when p(toxic) is strictly above this value
    #[arg(long, value_parser = parse_threshold)]
    pub threshold: Option<f64>,

    /// Maximum tokens per text
    #[arg(long)]
    pub max_length: Option<usize>,

    /// Compute device: cpu, cuda or auto
    #[arg(long)]
    pub device: Option<DeviceChoice>,

    /// Hide progress bars
    #[arg(long)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write an example toxeval.toml into the current directory
    Init,

    /// Run the classifier over a corpus and save predictions as JSON
    #[command(after_help = "\
Examples:
  toxeval predict --model model.pt --corpus data/ -o predictions.json
  toxeval predict -m model.safetensors -c data/ --device cpu --threshold 0.7 -o p.json")]
    Predict {
        #[command(flatten)]
        inference: InferenceArgs,

        /// Output JSON file
        #[arg(long, short = 'o')]
        output: PathBuf,
    },

    /// Render per-language confusion matrices and print accuracies
    Confusion {
        /// Predictions JSON written by `predict`
        results: PathBuf,

        /// Output SVG file
        #[arg(long, short = 'o', default_value = "confusion.svg")]
        output: PathBuf,
    },

    /// Render the pooled precision-recall curve and print its AUC
    PrCurve {
        /// Predictions JSON written by `predict`
        results: PathBuf,

        /// Output SVG file
        #[arg(long, short = 'o', default_value = "pr_curve.svg")]
        output: PathBuf,

        /// Also write the curve points as JSON
        #[arg(long)]
        json: Option<PathBuf>,
    },

    /// Write an HTML report of the most confident failures
    Failures {
        /// Predictions JSON written by `predict`
        results: PathBuf,

        /// Corpus directory the predictions were made on
        #[arg(long, short = 'c')]
        corpus: PathBuf,

        /// Failures kept per language and error class
        #[arg(long)]
        top: Option<usize>,

        /// Output HTML file
        #[arg(long, short = 'o', default_value = "failures.html")]
        output: PathBuf,
    },

    /// Render training and validation curves from a history JSON file
    #[command(after_help = "\
The history file holds four arrays:
  {\"train_accs\": [..], \"train_losses\": [..], \"val_accs\": [..], \"val_losses\": [..]}")]
    Curves {
        /// Training history JSON
        history: PathBuf,

        /// Output SVG file
        #[arg(long, short = 'o', default_value = "training_curves.svg")]
        output: PathBuf,
    },

    /// Predict, then write every report into one directory
    Evaluate {
        #[command(flatten)]
        inference: InferenceArgs,

        /// Output directory
        #[arg(long, default_value = "toxeval-report")]
        out_dir: PathBuf,

        /// Failures kept per language and error class
        #[arg(long)]
        top: Option<usize>,
    },
}

/// Run the CLI with parsed arguments
pub fn run(cli: Cli) -> Result<()> {
    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    let config = load_config(&cwd, cli.config.as_deref());

    match cli.command {
        Commands::Init => init::run(&cwd),
        Commands::Predict { inference, output } => predict::run(&inference, &config, &output),
        Commands::Confusion { results, output } => report::confusion(&results, &output),
        Commands::PrCurve {
            results,
            output,
            json,
        } => report::pr_curve(&results, &output, json.as_deref()),
        Commands::Failures {
            results,
            corpus,
            top,
            output,
        } => {
            let top = top.unwrap_or(config.report.top_failures);
            report::failures(&results, &corpus, top, &output)
        }
        Commands::Curves { history, output } => report::curves(&history, &output),
        Commands::Evaluate {
            inference,
            out_dir,
            top,
        } => {
            let top = top.unwrap_or(config.report.top_failures);
            predict::evaluate(&inference, &config, &out_dir, top)
        }
    }
}

/// Merge CLI flags over the loaded configuration
fn merged_inference(args: &InferenceArgs, config: &EvalConfig) -> InferenceConfig {
    let mut merged = config.inference.clone();
    if let Some(base) = &args.base_model {
        merged.base_model = base.clone();
    }
    if let Some(n) = args.batch_size {
        merged.batch_size = n;
    }
    if let Some(t) = args.threshold {
        merged.threshold = t;
    }
    if let Some(n) = args.max_length {
        merged.max_length = n;
    }
    if let Some(d) = args.device {
        merged.device = d;
    }
    merged
}

fn read_results(path: &Path) -> Result<PredictionResults> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse predictions in {}", path.display()))
}

fn write_output(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::parse_from([
            "toxeval",
            "predict",
            "--model",
            "m.pt",
            "--corpus",
            "data",
            "--batch-size",
            "4",
            "--device",
            "cpu",
            "-o",
            "out.json",
        ]);
        let Commands::Predict { inference, .. } = cli.command else {
            panic!("expected predict");
        };
        let mut config = EvalConfig::default();
        config.inference.threshold = 0.7;
        let merged = merged_inference(&inference, &config);
        assert_eq!(merged.batch_size, 4);
        assert_eq!(merged.device, DeviceChoice::Cpu);
        assert_eq!(merged.threshold, 0.7);
    }

    #[test]
    fn test_rejects_invalid_batch_size_and_threshold() {
        assert!(parse_batch_size("0").is_err());
        assert!(parse_batch_size("abc").is_err());
        assert_eq!(parse_batch_size("16"), Ok(16));
        assert!(parse_threshold("1.2").is_err());
        assert_eq!(parse_threshold("0.25"), Ok(0.25));
    }
}
