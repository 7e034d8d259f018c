/// Data loading for text-classification fine-tuning
pub mod text_dataset;

pub use text_dataset::{DatasetMetadata, TextDataLoader, TextDataset, TextRecord};

use candle_core::{Device, Tensor};
use tokenizers::Tokenizer;

use crate::config::RunConfig;

/// One batch of tokenized inputs
///
/// All fields are `u32` tensors of shape `[batch, seq]` sharing the same
/// leading dimension.
#[derive(Debug, Clone)]
pub struct Batch {
    pub input_ids: Tensor,
    pub token_type_ids: Tensor,
    pub attention_mask: Tensor,
}

impl Batch {
    /// Leading dimension shared by all fields
    pub fn batch_size(&self) -> usize {
        self.input_ids.dims()[0]
    }

    /// Move every field to `device`
    pub fn to_device(&self, device: &Device) -> crate::Result<Self> {
        Ok(Self {
            input_ids: self.input_ids.to_device(device)?,
            token_type_ids: self.token_type_ids.to_device(device)?,
            attention_mask: self.attention_mask.to_device(device)?,
        })
    }
}

/// Generic stream of (batch, targets) pairs
///
/// Finite, one pass per epoch, restartable via `reset`.
pub trait BatchStream {
    /// Get next (batch, targets) pair on `device`
    fn next_batch(&mut self, device: &Device) -> crate::Result<Option<(Batch, Tensor)>>;

    /// Reset stream for a new epoch
    fn reset(&mut self);

    /// Get total number of batches per pass
    fn num_batches(&self) -> usize;
}

/// Build the (train, test) loader pair for the configured dataset
pub fn load_data(
    config: &RunConfig,
    tokenizer: &Tokenizer,
) -> crate::Result<(TextDataLoader, TextDataLoader)> {
    let dir = config.dataset_dir();
    let metadata = DatasetMetadata::from_directory(&dir)?;

    if metadata.num_classes != config.num_classes {
        return Err(crate::TextClsError::Config(format!(
            "dataset {} has {} classes, config expects {}",
            config.dataset, metadata.num_classes, config.num_classes
        )));
    }

    let train = TextDataset::from_jsonl(dir.join("train.jsonl"), metadata.clone())?;
    let test = TextDataset::from_jsonl(dir.join("test.jsonl"), metadata)?;

    let train_loader = TextDataLoader::new(
        train,
        tokenizer.clone(),
        config.train_batch_size,
        config.max_seq_len,
        true,
    );
    let test_loader = TextDataLoader::new(
        test,
        tokenizer.clone(),
        config.test_batch_size,
        config.max_seq_len,
        false,
    );

    Ok((train_loader, test_loader))
}
