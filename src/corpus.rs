//! Labeled corpus loading
//!
//! A corpus directory holds one JSON Lines file per language:
//!
//! ```text
//! corpus/
//!   english.jsonl    {"text": "you are great", "label": 0}
//!   spanish.jsonl    {"text": "te odio", "label": 1}
//! ```
//!
//! Languages are keyed by file stem and ordered by file name.

use crate::error::{EvalError, Result};
use crate::models::{Label, LabeledCorpus, LabeledRow};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Deserialize)]
struct CorpusLine {
    text: String,
    label: i64,
}

/// Load every `<lang>.jsonl` file in `dir`
pub fn load_corpus(dir: &Path) -> Result<LabeledCorpus> {
    if !dir.is_dir() {
        return Err(EvalError::corpus(format!(
            "{} is not a directory",
            dir.display()
        )));
    }

    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "jsonl"))
        .collect();
    files.sort();

    if files.is_empty() {
        return Err(EvalError::corpus(format!(
            "No .jsonl files found in {}",
            dir.display()
        )));
    }

    let mut corpus = LabeledCorpus::new();
    for path in files {
        let Some(lang) = path.file_stem().map(|s| s.to_string_lossy().to_string()) else {
            continue;
        };
        let rows = load_language_file(&path)?;
        debug!("Loaded {} rows for {}", rows.len(), lang);
        corpus.insert(lang, rows);
    }

    info!(
        "Loaded corpus with {} languages ({} rows)",
        corpus.len(),
        corpus.values().map(Vec::len).sum::<usize>()
    );
    Ok(corpus)
}

/// Load a single language table
pub fn load_language_file(path: &Path) -> Result<Vec<LabeledRow>> {
    let content = std::fs::read_to_string(path)?;
    parse_language_lines(&content, &path.display().to_string())
}

fn parse_language_lines(content: &str, source: &str) -> Result<Vec<LabeledRow>> {
    let mut rows = Vec::new();
    for (line_no, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let parsed: CorpusLine = serde_json::from_str(line).map_err(|e| {
            EvalError::corpus(format!("{}:{}: {}", source, line_no + 1, e))
        })?;
        let label = Label::try_from(parsed.label).map_err(|e| {
            EvalError::corpus(format!("{}:{}: {}", source, line_no + 1, e))
        })?;
        rows.push(LabeledRow {
            index: rows.len(),
            text: parsed.text,
            label,
        });
    }
    Ok(rows)
}
