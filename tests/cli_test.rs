//! CLI contract tests
//!
//! Runs the built binary against small prediction, corpus and history files
//! in a temporary directory and checks the written artifacts.

use std::path::Path;
use std::process::{Command, Output};

fn toxeval_bin() -> String {
    env!("CARGO_BIN_EXE_toxeval").to_string()
}

fn run(dir: &Path, args: &[&str]) -> Output {
    Command::new(toxeval_bin())
        .args(args)
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .env_remove("TOXEVAL_DEVICE")
        .env_remove("TOXEVAL_CONFIG")
        .output()
        .expect("failed to run toxeval")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

const THREE_LANGUAGES: &str = r#"{
  "english": {"true_labels": [0, 1], "pred_labels": [0, 1], "pred_probs": [[0.9, 0.1], [0.2, 0.8]]},
  "spanish": {"true_labels": [0, 1], "pred_labels": [0, 0], "pred_probs": [[0.7, 0.3], [0.6, 0.4]]},
  "italian": {"true_labels": [1, 0], "pred_labels": [1, 0], "pred_probs": [[0.1, 0.9], [0.8, 0.2]]}
}"#;

fn setup() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("predictions.json"), THREE_LANGUAGES).unwrap();

    let corpus = dir.path().join("corpus");
    std::fs::create_dir(&corpus).unwrap();
    std::fs::write(
        corpus.join("english.jsonl"),
        "{\"text\": \"you are great\", \"label\": 0}\n{\"text\": \"i hate you\", \"label\": 1}\n",
    )
    .unwrap();
    std::fs::write(
        corpus.join("italian.jsonl"),
        "{\"text\": \"ti odio\", \"label\": 1}\n{\"text\": \"ciao <amico>\", \"label\": 0}\n",
    )
    .unwrap();
    std::fs::write(
        corpus.join("spanish.jsonl"),
        "{\"text\": \"hola\", \"label\": 0}\n\n{\"text\": \"eres <b>tonto</b>\", \"label\": 1}\n",
    )
    .unwrap();
    dir
}

#[test]
fn test_init_writes_config_once() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(dir.path(), &["init"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let config = std::fs::read_to_string(dir.path().join("toxeval.toml")).unwrap();
    assert!(config.contains("[inference]"));
    assert!(config.contains("top_failures = 5"));

    let again = run(dir.path(), &["init"]);
    assert!(again.status.success());
    assert!(stdout(&again).contains("already exists"));
}

#[test]
fn test_confusion_writes_svg_and_prints_accuracy() {
    let dir = setup();
    let output = run(dir.path(), &["confusion", "predictions.json", "-o", "cm.svg"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let out = stdout(&output);
    assert!(out.contains("All Languages"));
    assert!(out.contains("83.33%"));

    let svg = std::fs::read_to_string(dir.path().join("cm.svg")).unwrap();
    assert!(svg.contains("All Languages - Accuracy: 83.33%"));
    assert!(svg.contains("Spanish - Accuracy: 50.00%"));
}

#[test]
fn test_confusion_rejects_two_languages() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("two.json"),
        r#"{"en": {"true_labels": [0], "pred_labels": [0]}, "es": {"true_labels": [1], "pred_labels": [0]}}"#,
    )
    .unwrap();
    let output = run(dir.path(), &["confusion", "two.json", "-o", "cm.svg"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Expected 3 language entries"));
    assert!(!dir.path().join("cm.svg").exists());
}

#[test]
fn test_mismatched_lengths_are_rejected_on_load() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("bad.json"),
        r#"{"en": {"true_labels": [0, 1], "pred_labels": [0], "pred_probs": [[0.5, 0.5]]}}"#,
    )
    .unwrap();
    let output = run(dir.path(), &["pr-curve", "bad.json", "-o", "pr.svg"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("must have the same length"));
}

#[test]
fn test_label_only_predictions_cannot_drive_probability_reports() {
    let dir = setup();
    std::fs::write(
        dir.path().join("labels.json"),
        r#"{
  "english": {"true_labels": [0, 1], "pred_labels": [1, 0]},
  "spanish": {"true_labels": [0, 1], "pred_labels": [0, 1]},
  "italian": {"true_labels": [1, 0], "pred_labels": [1, 0]}
}"#,
    )
    .unwrap();

    let output = run(dir.path(), &["pr-curve", "labels.json", "-o", "pr.svg"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("has no predicted probabilities"));
    assert!(!dir.path().join("pr.svg").exists());

    let output = run(
        dir.path(),
        &["failures", "labels.json", "--corpus", "corpus", "-o", "f.html"],
    );
    assert!(!output.status.success());
    assert!(stderr(&output).contains("has no predicted probabilities"));
    assert!(!dir.path().join("f.html").exists());

    // Confusion matrices only need labels.
    let output = run(dir.path(), &["confusion", "labels.json", "-o", "cm.svg"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
}

#[test]
fn test_pr_curve_writes_svg_and_json() {
    let dir = setup();
    let output = run(
        dir.path(),
        &["pr-curve", "predictions.json", "-o", "pr.svg", "--json", "pr.json"],
    );
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("PR AUC"));

    let svg = std::fs::read_to_string(dir.path().join("pr.svg")).unwrap();
    assert!(svg.contains("Precision-Recall curve"));
    assert!(svg.contains("PR curve (area = "));
    assert!(svg.contains("Optimal threshold: "));

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join("pr.json")).unwrap())
            .unwrap();
    let precision = json["precision"].as_array().unwrap();
    let thresholds = json["thresholds"].as_array().unwrap();
    assert_eq!(precision.len(), thresholds.len() + 1);
    assert!(json["auc"].as_f64().unwrap() > 0.0);
}

#[test]
fn test_failures_report_is_escaped_html() {
    let dir = setup();
    let output = run(
        dir.path(),
        &[
            "failures",
            "predictions.json",
            "--corpus",
            "corpus",
            "-o",
            "failures.html",
        ],
    );
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let html = std::fs::read_to_string(dir.path().join("failures.html")).unwrap();
    assert!(html.contains(">Spanish</h2>"));
    assert!(html.contains("False NON-TOXIC"));
    assert!(html.contains("Failed with conf: 0.60. True: TOXIC. Pred:NON-TOXIC"));
    assert!(html.contains("eres &lt;b&gt;tonto&lt;/b&gt;"));
    assert!(!html.contains("<b>tonto"));
}

#[test]
fn test_failures_requires_aligned_corpus() {
    let dir = setup();
    std::fs::write(
        dir.path().join("corpus").join("english.jsonl"),
        "{\"text\": \"only one row\", \"label\": 0}\n",
    )
    .unwrap();
    let output = run(
        dir.path(),
        &["failures", "predictions.json", "--corpus", "corpus"],
    );
    assert!(!output.status.success());
    assert!(stderr(&output).contains("must have the same length"));
}

#[test]
fn test_curves_from_history() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("history.json"),
        r#"{"train_accs": [0.6, 0.75, 0.82], "train_losses": [0.9, 0.6, 0.4],
            "val_accs": [0.58, 0.7, 0.71], "val_losses": [0.95, 0.65, 0.7]}"#,
    )
    .unwrap();
    let output = run(dir.path(), &["curves", "history.json", "-o", "curves.svg"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("epoch 2"));

    let svg = std::fs::read_to_string(dir.path().join("curves.svg")).unwrap();
    assert!(svg.contains("Training and Validation Accuracy"));
    assert!(svg.contains("Validation Loss"));
}

#[test]
fn test_curves_rejects_uneven_history() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("history.json"),
        r#"{"train_accs": [0.6, 0.7], "train_losses": [0.9, 0.6], "val_accs": [0.5], "val_losses": [0.9, 0.6]}"#,
    )
    .unwrap();
    let output = run(dir.path(), &["curves", "history.json"]);
    assert!(!output.status.success());
}

#[test]
fn test_predict_with_missing_checkpoint_fails_fast() {
    let dir = setup();
    let output = run(
        dir.path(),
        &[
            "predict",
            "--model",
            "missing.pt",
            "--corpus",
            "corpus",
            "--device",
            "cpu",
            "-o",
            "out.json",
        ],
    );
    assert!(!output.status.success());
    assert!(stderr(&output).contains("is not a file"));
    assert!(!dir.path().join("out.json").exists());
}

#[test]
fn test_predict_rejects_zero_batch_size() {
    let dir = setup();
    let output = run(
        dir.path(),
        &[
            "predict",
            "--model",
            "m.pt",
            "--corpus",
            "corpus",
            "--batch-size",
            "0",
            "-o",
            "out.json",
        ],
    );
    assert!(!output.status.success());
    assert!(stderr(&output).contains("batch size must be at least 1"));
}
