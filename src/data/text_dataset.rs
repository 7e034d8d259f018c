/// JSONL text-classification datasets and the batching loader
use candle_core::{DType, Device, Tensor};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tokenizers::Tokenizer;

use super::{Batch, BatchStream};

/// Metadata from dataset.json
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatasetMetadata {
    pub num_classes: usize,
    #[serde(default)]
    pub num_examples: usize,
    #[serde(default)]
    pub description: String,
}

impl DatasetMetadata {
    /// Load metadata from a dataset directory
    pub fn from_directory<P: AsRef<Path>>(dir: P) -> crate::Result<Self> {
        let path = dir.as_ref().join("dataset.json");
        if !path.exists() {
            return Err(crate::TextClsError::Data(format!(
                "missing dataset metadata: {}",
                path.display()
            )));
        }
        let file = File::open(&path)?;
        let metadata: DatasetMetadata = serde_json::from_reader(BufReader::new(file))?;
        Ok(metadata)
    }
}

/// One labeled example
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TextRecord {
    pub text: String,
    pub label: u32,
}

/// Labeled text dataset loaded from a JSONL split file
#[derive(Debug)]
pub struct TextDataset {
    records: Vec<TextRecord>,
    metadata: DatasetMetadata,
}

impl TextDataset {
    /// Load a split from a JSONL file (one record per line)
    pub fn from_jsonl<P: AsRef<Path>>(path: P, metadata: DatasetMetadata) -> crate::Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            crate::TextClsError::Data(format!("failed to open {}: {}", path.display(), e))
        })?;

        let mut records = Vec::new();
        for (line_no, line) in BufReader::new(file).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let record: TextRecord = serde_json::from_str(&line).map_err(|e| {
                crate::TextClsError::Data(format!(
                    "{}:{}: invalid record: {}",
                    path.display(),
                    line_no + 1,
                    e
                ))
            })?;
            records.push(record);
        }

        log::info!("Loaded {} examples from {}", records.len(), path.display());
        Self::from_records(records, metadata)
    }

    /// Build a dataset from in-memory records, validating label ranges
    pub fn from_records(
        records: Vec<TextRecord>,
        metadata: DatasetMetadata,
    ) -> crate::Result<Self> {
        for (idx, record) in records.iter().enumerate() {
            if record.label as usize >= metadata.num_classes {
                return Err(crate::TextClsError::Data(format!(
                    "record {}: label {} out of range for {} classes",
                    idx, record.label, metadata.num_classes
                )));
            }
        }
        Ok(Self { records, metadata })
    }

    /// Get number of examples
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Get number of target classes
    pub fn num_classes(&self) -> usize {
        self.metadata.num_classes
    }

    /// Get metadata
    pub fn metadata(&self) -> &DatasetMetadata {
        &self.metadata
    }

    /// Get record at index
    pub fn get(&self, idx: usize) -> &TextRecord {
        &self.records[idx]
    }
}

/// Pad per-example (ids, type_ids, mask) rows to the longest row in the
/// batch, capped at `max_len`; returns flattened columns and the padded
/// sequence length
fn pad_batch(
    rows: &[(Vec<u32>, Vec<u32>, Vec<u32>)],
    max_len: usize,
) -> (Vec<u32>, Vec<u32>, Vec<u32>, usize) {
    let seq_len = rows
        .iter()
        .map(|(ids, _, _)| ids.len().min(max_len))
        .max()
        .unwrap_or(0)
        .max(1);

    let mut input_ids = Vec::with_capacity(rows.len() * seq_len);
    let mut token_type_ids = Vec::with_capacity(rows.len() * seq_len);
    let mut attention_mask = Vec::with_capacity(rows.len() * seq_len);

    for (ids, type_ids, mask) in rows {
        let take = ids.len().min(seq_len);
        input_ids.extend(&ids[..take]);
        token_type_ids.extend(&type_ids[..take]);
        attention_mask.extend(&mask[..take]);
        for _ in take..seq_len {
            input_ids.push(0);
            token_type_ids.push(0);
            attention_mask.push(0);
        }
    }

    (input_ids, token_type_ids, attention_mask, seq_len)
}

/// Batching loader over a `TextDataset`
///
/// Tokenizes lazily per batch and reshuffles the index vector on every
/// `reset` when shuffling is enabled.
pub struct TextDataLoader {
    dataset: TextDataset,
    tokenizer: Tokenizer,
    batch_size: usize,
    max_seq_len: usize,
    shuffle: bool,
    indices: Vec<usize>,
    current_idx: usize,
}

impl TextDataLoader {
    /// Create new data loader
    pub fn new(
        dataset: TextDataset,
        tokenizer: Tokenizer,
        batch_size: usize,
        max_seq_len: usize,
        shuffle: bool,
    ) -> Self {
        let mut indices: Vec<usize> = (0..dataset.len()).collect();

        if shuffle {
            use rand::seq::SliceRandom;
            let mut rng = rand::thread_rng();
            indices.shuffle(&mut rng);
        }

        Self {
            dataset,
            tokenizer,
            batch_size,
            max_seq_len,
            shuffle,
            indices,
            current_idx: 0,
        }
    }

    /// Get next (batch, targets) pair
    pub fn next_batch(&mut self, device: &Device) -> crate::Result<Option<(Batch, Tensor)>> {
        if self.current_idx >= self.indices.len() {
            return Ok(None);
        }

        let end_idx = (self.current_idx + self.batch_size).min(self.indices.len());
        let batch_indices = &self.indices[self.current_idx..end_idx];
        let actual_batch_size = batch_indices.len();

        let mut rows = Vec::with_capacity(actual_batch_size);
        let mut labels = Vec::with_capacity(actual_batch_size);

        for &idx in batch_indices {
            let record = self.dataset.get(idx);
            let encoding = self
                .tokenizer
                .encode(record.text.as_str(), true)
                .map_err(|e| crate::TextClsError::Tokenizer(e.to_string()))?;
            rows.push((
                encoding.get_ids().to_vec(),
                encoding.get_type_ids().to_vec(),
                encoding.get_attention_mask().to_vec(),
            ));
            labels.push(record.label);
        }

        self.current_idx = end_idx;

        let (input_ids, token_type_ids, attention_mask, seq_len) =
            pad_batch(&rows, self.max_seq_len);

        let shape = (actual_batch_size, seq_len);
        let batch = Batch {
            input_ids: Tensor::from_vec(input_ids, shape, device)?.to_dtype(DType::U32)?,
            token_type_ids: Tensor::from_vec(token_type_ids, shape, device)?
                .to_dtype(DType::U32)?,
            attention_mask: Tensor::from_vec(attention_mask, shape, device)?
                .to_dtype(DType::U32)?,
        };
        let targets = Tensor::from_vec(labels, actual_batch_size, device)?;

        Ok(Some((batch, targets)))
    }

    /// Reset loader for new epoch
    pub fn reset(&mut self) {
        self.current_idx = 0;

        if self.shuffle {
            use rand::seq::SliceRandom;
            let mut rng = rand::thread_rng();
            self.indices.shuffle(&mut rng);
        }
    }

    /// Get number of batches per pass
    pub fn num_batches(&self) -> usize {
        (self.dataset.len() + self.batch_size - 1) / self.batch_size
    }

    /// Get dataset reference
    pub fn dataset(&self) -> &TextDataset {
        &self.dataset
    }
}

// Implement BatchStream trait
impl BatchStream for TextDataLoader {
    fn next_batch(&mut self, device: &Device) -> crate::Result<Option<(Batch, Tensor)>> {
        TextDataLoader::next_batch(self, device)
    }

    fn reset(&mut self) {
        TextDataLoader::reset(self)
    }

    fn num_batches(&self) -> usize {
        TextDataLoader::num_batches(self)
    }
}
