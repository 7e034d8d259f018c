/// Encoder wrapper: pretrained encoder plus classification head
use candle_core::{DType, Device, Tensor};
use candle_nn::{VarBuilder, VarMap};

use crate::config::{HeadKind, RunConfig};
use crate::data::Batch;

pub mod encoder;
pub mod heads;

pub use encoder::{load_encoder, PretrainedEncoder};
pub use heads::{FnnHead, Head, LstmHead};

/// Forward seam used by the training and evaluation loops
pub trait ClassifierForward {
    /// batch -> logits [batch, num_classes]
    fn forward_t(&self, batch: &Batch, train: bool) -> crate::Result<Tensor>;
}

/// Pretrained encoder composed with a trainable classification head
///
/// One forward pass: token batch -> encoder -> representation selection
/// -> head -> logits. No internal caching.
pub struct SequenceClassifier {
    encoder: PretrainedEncoder,
    head: Head,
}

impl SequenceClassifier {
    /// Build the classifier for `config`
    ///
    /// The encoder weights are memory-mapped read-only; the returned
    /// `VarMap` holds exactly the head's trainable parameters, which is
    /// what the optimizer should step over.
    pub fn new(config: &RunConfig, device: &Device) -> crate::Result<(Self, VarMap)> {
        let encoder = encoder::load_encoder(config.model_name, &config.pretrained_path(), device)?;

        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, device);

        let head = match config.method_name {
            HeadKind::Fnn => Head::Fnn(FnnHead::new(
                encoder.hidden_size,
                config.fc_hidden,
                config.num_classes,
                config.dropout,
                vb.pp("head"),
            )?),
            HeadKind::Lstm => Head::Lstm(LstmHead::new(
                encoder.hidden_size,
                config.lstm_hidden,
                config.num_classes,
                config.dropout,
                vb.pp("head"),
            )?),
        };

        let trainable: usize = varmap
            .all_vars()
            .iter()
            .map(|v| v.as_tensor().elem_count())
            .sum();
        log::info!(
            "Built {} classifier with {} head ({} trainable parameters)",
            config.model_name,
            config.method_name,
            trainable
        );

        Ok((Self { encoder, head }, varmap))
    }
}

impl ClassifierForward for SequenceClassifier {
    fn forward_t(&self, batch: &Batch, train: bool) -> crate::Result<Tensor> {
        let sequence = self.encoder.model.forward(
            &batch.input_ids,
            &batch.token_type_ids,
            Some(&batch.attention_mask),
        )?;
        self.head.forward_t(&sequence, train)
    }
}
