//! Error types for toxeval
//!
//! Precondition violations get their own variants so callers can match on
//! them; errors from candle, tokenizers and I/O are wrapped unmodified.

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by the evaluation library
#[derive(Debug, Error)]
pub enum EvalError {
    #[error("Model path {0} is not a file")]
    ModelNotFound(PathBuf),

    #[error("Expected {expected} language entries, got {actual}: {languages:?}")]
    LanguageCount {
        expected: usize,
        actual: usize,
        languages: Vec<String>,
    },

    #[error("{what} must have the same length, got {left} and {right}")]
    LengthMismatch {
        what: String,
        left: usize,
        right: usize,
    },

    #[error("Language '{0}' has no prediction results")]
    MissingLanguage(String),

    #[error("Language '{0}' has no predicted probabilities; rerun `predict` to record them")]
    MissingProbabilities(String),

    #[error("Invalid label {0}: expected 0 (non-toxic) or 1 (toxic)")]
    InvalidLabel(i64),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Empty input: {0}")]
    EmptyInput(String),

    #[error("Corpus error: {0}")]
    Corpus(String),

    #[error("Model error: {0}")]
    Model(String),

    #[error("Tokenizer error: {0}")]
    Tokenizer(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Tensor error: {0}")]
    Candle(#[from] candle_core::Error),
}

impl EvalError {
    pub fn length_mismatch(what: impl Into<String>, left: usize, right: usize) -> Self {
        Self::LengthMismatch {
            what: what.into(),
            left,
            right,
        }
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn corpus(msg: impl Into<String>) -> Self {
        Self::Corpus(msg.into())
    }

    pub fn model(msg: impl Into<String>) -> Self {
        Self::Model(msg.into())
    }
}

impl From<tokenizers::Error> for EvalError {
    fn from(e: tokenizers::Error) -> Self {
        Self::Tokenizer(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, EvalError>;
