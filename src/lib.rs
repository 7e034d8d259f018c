//! Supervised fine-tuning harness for text classification.
//!
//! Loads a pretrained text encoder, attaches a small classification head
//! (feed-forward or LSTM) and runs a standard train/evaluate loop over a
//! labeled dataset with AdamW and a linear warmup/decay schedule, logging
//! per-epoch metrics and rendering an accuracy-vs-epoch plot.
//!
//! # Example
//!
//! ```ignore
//! use textcls_rs::{RunConfig, SequenceClassifier};
//! use textcls_rs::data::load_data;
//! use textcls_rs::training::{Trainer, TrainerConfig};
//!
//! let config = RunConfig::default();
//! let device = config.device()?;
//! let (model, varmap) = SequenceClassifier::new(&config, &device)?;
//! let (mut train, mut test) = load_data(&config, &tokenizer)?;
//! let trainer_config = TrainerConfig::from_run(&config, train.num_batches());
//! let mut trainer = Trainer::new(model, varmap, trainer_config, device)?;
//! let summary = trainer.run(&mut train, &mut test)?;
//! ```

pub mod config;
pub mod data;
pub mod models;
pub mod training;

// Re-export commonly used items
pub use config::{EncoderKind, HeadKind, RunConfig};
pub use models::SequenceClassifier;

/// Library error types
#[derive(Debug, thiserror::Error)]
pub enum TextClsError {
    #[error("Candle error: {0}")]
    Candle(#[from] candle_core::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Data error: {0}")]
    Data(String),

    #[error("Tokenizer error: {0}")]
    Tokenizer(String),

    #[error("Plot error: {0}")]
    Plot(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TextClsError>;
