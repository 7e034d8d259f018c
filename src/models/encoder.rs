/// Pretrained encoder loading from local safetensors exports
use std::fs;
use std::path::Path;

use candle_core::Device;
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig, DTYPE};

use crate::config::EncoderKind;

/// Dimensions the rest of the harness needs from the encoder config
#[derive(Debug, Clone, serde::Deserialize)]
struct EncoderDims {
    hidden_size: usize,
}

/// A loaded pretrained encoder
///
/// Weights are memory-mapped read-only: the encoder is frozen, and the
/// optimizer only ever sees the classifier head's parameters.
pub struct PretrainedEncoder {
    pub model: BertModel,
    pub hidden_size: usize,
}

impl std::fmt::Debug for PretrainedEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PretrainedEncoder")
            .field("hidden_size", &self.hidden_size)
            .finish_non_exhaustive()
    }
}

/// Load the encoder for `kind` from a pretrained directory
///
/// The directory follows the standard exported layout: `config.json`
/// plus `model.safetensors`. Both encoder kinds share the BERT
/// architecture; the kind selects which export is loaded.
///
/// # Arguments
/// * `kind` - Encoder family being loaded (for diagnostics)
/// * `dir` - Pretrained export directory
/// * `device` - Device to load the encoder on
pub fn load_encoder(
    kind: EncoderKind,
    dir: &Path,
    device: &Device,
) -> crate::Result<PretrainedEncoder> {
    let config_path = dir.join("config.json");
    let weights_path = dir.join("model.safetensors");

    if !config_path.exists() || !weights_path.exists() {
        return Err(crate::TextClsError::Config(format!(
            "pretrained export for {} not found under {}",
            kind,
            dir.display()
        )));
    }

    let raw = fs::read_to_string(&config_path)?;
    let config: BertConfig = serde_json::from_str(&raw)?;
    let dims: EncoderDims = serde_json::from_str(&raw)?;

    let vb = unsafe { VarBuilder::from_mmaped_safetensors(&[&weights_path], DTYPE, device)? };
    let model = BertModel::load(vb, &config)?;

    log::info!(
        "Loaded {} encoder from {} (hidden size {})",
        kind,
        dir.display(),
        dims.hidden_size
    );

    Ok(PretrainedEncoder {
        model,
        hidden_size: dims.hidden_size,
    })
}
