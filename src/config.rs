/// Run configuration for the fine-tuning harness
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use candle_core::Device;

/// Pretrained encoder family
///
/// Selection happens once at startup; downstream code never compares
/// strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncoderKind {
    Bert,
    Roberta,
}

impl EncoderKind {
    /// Name of the pretrained subdirectory this kind loads from
    pub fn model_id(&self) -> &'static str {
        match self {
            EncoderKind::Bert => "bert-base-uncased",
            EncoderKind::Roberta => "roberta-base",
        }
    }
}

impl FromStr for EncoderKind {
    type Err = crate::TextClsError;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s {
            "bert" => Ok(EncoderKind::Bert),
            "roberta" => Ok(EncoderKind::Roberta),
            other => Err(crate::TextClsError::Config(format!(
                "unknown model name: {}. Must be 'bert' or 'roberta'",
                other
            ))),
        }
    }
}

impl fmt::Display for EncoderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncoderKind::Bert => write!(f, "bert"),
            EncoderKind::Roberta => write!(f, "roberta"),
        }
    }
}

/// Classifier head variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeadKind {
    Fnn,
    Lstm,
}

impl FromStr for HeadKind {
    type Err = crate::TextClsError;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s {
            "fnn" => Ok(HeadKind::Fnn),
            "lstm" => Ok(HeadKind::Lstm),
            other => Err(crate::TextClsError::Config(format!(
                "unknown method name: {}. Must be 'fnn' or 'lstm'",
                other
            ))),
        }
    }
}

impl fmt::Display for HeadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeadKind::Fnn => write!(f, "fnn"),
            HeadKind::Lstm => write!(f, "lstm"),
        }
    }
}

/// Configuration for one fine-tuning run
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RunConfig {
    /// Pretrained encoder family
    pub model_name: EncoderKind,

    /// Classifier head variant
    pub method_name: HeadKind,

    /// Dataset name (subdirectory of `data_dir`)
    pub dataset: String,

    /// Root directory containing datasets
    pub data_dir: PathBuf,

    /// Root directory containing pretrained encoder exports
    pub pretrained_dir: PathBuf,

    /// Number of target classes
    pub num_classes: usize,

    /// Token sequence cap applied when batching
    pub max_seq_len: usize,

    /// Batch size for the training split
    pub train_batch_size: usize,

    /// Batch size for the held-out split
    pub test_batch_size: usize,

    /// Number of training epochs
    pub num_epoch: usize,

    /// Peak learning rate
    pub lr: f64,

    /// AdamW weight decay
    pub decay: f64,

    /// AdamW epsilon
    pub eps: f64,

    /// Dropout probability in the classifier head
    pub dropout: f32,

    /// Hidden width of the feed-forward head
    pub fc_hidden: usize,

    /// Hidden width of the recurrent head
    pub lstm_hidden: usize,

    /// Compute device: "cpu" or "cuda"
    pub device: String,

    /// Label for the externally configured log destination
    pub log_name: Option<String>,

    /// Save a head checkpoint whenever the best snapshot improves
    pub save_checkpoints: bool,

    /// Checkpoint directory
    pub checkpoint_dir: PathBuf,

    /// Accuracy plot destination; `None` skips rendering
    pub plot_path: Option<PathBuf>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            model_name: EncoderKind::Bert,
            method_name: HeadKind::Fnn,
            dataset: "sst2".to_string(),
            data_dir: PathBuf::from("data"),
            pretrained_dir: PathBuf::from("pretrained"),
            num_classes: 2,
            max_seq_len: 128,
            train_batch_size: 32,
            test_batch_size: 64,
            num_epoch: 10,
            lr: 1e-4,
            decay: 0.01,
            eps: 1e-8,
            dropout: 0.1,
            fc_hidden: 256,
            lstm_hidden: 256,
            device: "cuda".to_string(),
            log_name: None,
            save_checkpoints: false,
            checkpoint_dir: PathBuf::from("checkpoints"),
            plot_path: Some(PathBuf::from("image.png")),
        }
    }
}

impl RunConfig {
    /// Validate configuration
    pub fn validate(&self) -> crate::Result<()> {
        if self.num_classes < 2 {
            return Err(crate::TextClsError::Config(
                "num_classes must be >= 2".to_string(),
            ));
        }

        if self.train_batch_size == 0 || self.test_batch_size == 0 {
            return Err(crate::TextClsError::Config(
                "batch sizes must be > 0".to_string(),
            ));
        }

        if self.max_seq_len == 0 {
            return Err(crate::TextClsError::Config(
                "max_seq_len must be > 0".to_string(),
            ));
        }

        if self.lr <= 0.0 || self.eps <= 0.0 {
            return Err(crate::TextClsError::Config(
                "lr and eps must be > 0".to_string(),
            ));
        }

        if !(0.0..1.0).contains(&self.dropout) {
            return Err(crate::TextClsError::Config(
                "dropout must be in [0, 1)".to_string(),
            ));
        }

        if self.fc_hidden == 0 || self.lstm_hidden == 0 {
            return Err(crate::TextClsError::Config(
                "head hidden sizes must be > 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Resolve the configured compute device, falling back to CPU when
    /// CUDA is unavailable
    pub fn device(&self) -> crate::Result<Device> {
        match self.device.as_str() {
            "cpu" => Ok(Device::Cpu),
            "cuda" => {
                if candle_core::utils::cuda_is_available() {
                    Ok(Device::new_cuda(0)?)
                } else {
                    log::warn!("cuda requested but unavailable, using cpu");
                    Ok(Device::Cpu)
                }
            }
            other => Err(crate::TextClsError::Config(format!(
                "unknown device: {}. Must be 'cpu' or 'cuda'",
                other
            ))),
        }
    }

    /// Directory holding the pretrained export for the configured encoder
    pub fn pretrained_path(&self) -> PathBuf {
        self.pretrained_dir.join(self.model_name.model_id())
    }

    /// Directory holding the configured dataset
    pub fn dataset_dir(&self) -> PathBuf {
        self.data_dir.join(&self.dataset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoder_kind_from_str() {
        assert_eq!("bert".parse::<EncoderKind>().unwrap(), EncoderKind::Bert);
        assert_eq!(
            "roberta".parse::<EncoderKind>().unwrap(),
            EncoderKind::Roberta
        );
    }

    #[test]
    fn test_unknown_model_name_is_config_error() {
        // The closed enum makes the unknown-name failure happen at parse
        // time, before any model construction or data loading.
        let err = "gpt".parse::<EncoderKind>().unwrap_err();
        assert!(matches!(err, crate::TextClsError::Config(_)));
    }

    #[test]
    fn test_unknown_method_name_is_config_error() {
        let err = "cnn".parse::<HeadKind>().unwrap_err();
        assert!(matches!(err, crate::TextClsError::Config(_)));
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = RunConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_batch_size() {
        let config = RunConfig {
            train_batch_size: 0,
            ..RunConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_dropout() {
        let config = RunConfig {
            dropout: 1.0,
            ..RunConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_pretrained_path_follows_model_id() {
        let config = RunConfig {
            model_name: EncoderKind::Roberta,
            ..RunConfig::default()
        };
        assert!(config
            .pretrained_path()
            .ends_with("pretrained/roberta-base"));
    }
}
