/// Classifier heads mapping encoder output to per-class logits
use candle_core::{Tensor, D};
use candle_nn::{linear, lstm, Dropout, LSTMConfig, Linear, Module, VarBuilder, LSTM, RNN};

/// Reject input whose feature dimension disagrees with the configured
/// encoder hidden size
fn check_features(xs: &Tensor, expected: usize) -> crate::Result<()> {
    let got = xs.dim(D::Minus1)?;
    if got != expected {
        return Err(crate::TextClsError::Config(format!(
            "head expects feature size {}, got {}",
            expected, got
        )));
    }
    Ok(())
}

/// Feed-forward head over the pooled representation
///
/// dropout -> dense -> ReLU -> dropout -> dense
pub struct FnnHead {
    dropout: Dropout,
    fc1: Linear,
    fc2: Linear,
    in_features: usize,
}

impl FnnHead {
    /// Create new feed-forward head
    ///
    /// # Arguments
    /// * `in_features` - Encoder hidden size
    /// * `fc_hidden` - Width of the intermediate dense layer
    /// * `num_classes` - Number of output logits
    /// * `dropout` - Dropout probability (active in training mode only)
    /// * `vb` - VarBuilder for parameter initialization
    pub fn new(
        in_features: usize,
        fc_hidden: usize,
        num_classes: usize,
        dropout: f32,
        vb: VarBuilder,
    ) -> crate::Result<Self> {
        let fc1 = linear(in_features, fc_hidden, vb.pp("fc1"))?;
        let fc2 = linear(fc_hidden, num_classes, vb.pp("fc2"))?;

        Ok(Self {
            dropout: Dropout::new(dropout),
            fc1,
            fc2,
            in_features,
        })
    }

    /// pooled: [batch, hidden] -> [batch, num_classes]
    pub fn forward_t(&self, pooled: &Tensor, train: bool) -> crate::Result<Tensor> {
        check_features(pooled, self.in_features)?;

        let xs = self.dropout.forward(pooled, train)?;
        let xs = self.fc1.forward(&xs)?.relu()?;
        let xs = self.dropout.forward(&xs, train)?;
        Ok(self.fc2.forward(&xs)?)
    }
}

/// Recurrent head aggregating the full token sequence
///
/// An LSTM consumes the per-token representations left to right; the
/// final hidden state is classified with a dense layer.
pub struct LstmHead {
    lstm: LSTM,
    dropout: Dropout,
    fc: Linear,
    in_features: usize,
}

impl LstmHead {
    /// Create new recurrent head
    pub fn new(
        in_features: usize,
        lstm_hidden: usize,
        num_classes: usize,
        dropout: f32,
        vb: VarBuilder,
    ) -> crate::Result<Self> {
        let lstm = lstm(in_features, lstm_hidden, LSTMConfig::default(), vb.pp("lstm"))?;
        let fc = linear(lstm_hidden, num_classes, vb.pp("fc"))?;

        Ok(Self {
            lstm,
            dropout: Dropout::new(dropout),
            fc,
            in_features,
        })
    }

    /// sequence: [batch, seq, hidden] -> [batch, num_classes]
    pub fn forward_t(&self, sequence: &Tensor, train: bool) -> crate::Result<Tensor> {
        check_features(sequence, self.in_features)?;

        let states = self.lstm.seq(sequence)?;
        let last = states.last().ok_or_else(|| {
            crate::TextClsError::Data("cannot classify an empty token sequence".to_string())
        })?;

        let xs = self.dropout.forward(last.h(), train)?;
        Ok(self.fc.forward(&xs)?)
    }
}

/// Closed set of head variants, resolved once at startup
pub enum Head {
    Fnn(FnnHead),
    Lstm(LstmHead),
}

impl Head {
    /// Select the relevant representation for the variant and classify
    ///
    /// `sequence` is the full encoder output [batch, seq, hidden]. The
    /// feed-forward variant pools the leading ([CLS]) token vector; the
    /// recurrent variant consumes the whole sequence.
    pub fn forward_t(&self, sequence: &Tensor, train: bool) -> crate::Result<Tensor> {
        match self {
            Head::Fnn(head) => {
                let pooled = sequence.narrow(1, 0, 1)?.squeeze(1)?;
                head.forward_t(&pooled, train)
            }
            Head::Lstm(head) => head.forward_t(sequence, train),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::{DType, Device};
    use candle_nn::VarMap;

    fn var_builder(device: &Device) -> (VarMap, VarBuilder<'static>) {
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, device);
        (varmap, vb)
    }

    #[test]
    fn test_fnn_head_shape() -> crate::Result<()> {
        let device = Device::Cpu;
        let (_varmap, vb) = var_builder(&device);

        let head = FnnHead::new(32, 16, 4, 0.1, vb)?;

        let pooled = Tensor::randn(0f32, 1.0, (2, 32), &device)?;
        let logits = head.forward_t(&pooled, false)?;

        assert_eq!(logits.dims(), &[2, 4]);
        Ok(())
    }

    #[test]
    fn test_lstm_head_shape() -> crate::Result<()> {
        let device = Device::Cpu;
        let (_varmap, vb) = var_builder(&device);

        let head = LstmHead::new(32, 16, 4, 0.1, vb)?;

        let sequence = Tensor::randn(0f32, 1.0, (2, 5, 32), &device)?;
        let logits = head.forward_t(&sequence, false)?;

        assert_eq!(logits.dims(), &[2, 4]);
        Ok(())
    }

    #[test]
    fn test_head_enum_pools_for_fnn() -> crate::Result<()> {
        let device = Device::Cpu;
        let (_varmap, vb) = var_builder(&device);

        let head = Head::Fnn(FnnHead::new(32, 16, 3, 0.0, vb)?);

        let sequence = Tensor::randn(0f32, 1.0, (2, 7, 32), &device)?;
        let logits = head.forward_t(&sequence, false)?;

        assert_eq!(logits.dims(), &[2, 3]);
        Ok(())
    }

    #[test]
    fn test_hidden_size_mismatch_rejected() -> crate::Result<()> {
        let device = Device::Cpu;
        let (_varmap, vb) = var_builder(&device);

        let head = FnnHead::new(32, 16, 4, 0.0, vb)?;

        let wrong = Tensor::randn(0f32, 1.0, (2, 33), &device)?;
        let err = head.forward_t(&wrong, false).unwrap_err();
        assert!(matches!(err, crate::TextClsError::Config(_)));
        Ok(())
    }

    #[test]
    fn test_dropout_identity_in_eval_mode() -> crate::Result<()> {
        let device = Device::Cpu;
        let (_varmap, vb) = var_builder(&device);

        let head = FnnHead::new(8, 4, 2, 0.5, vb)?;
        let pooled = Tensor::randn(0f32, 1.0, (3, 8), &device)?;

        let a = head.forward_t(&pooled, false)?.to_vec2::<f32>()?;
        let b = head.forward_t(&pooled, false)?.to_vec2::<f32>()?;
        assert_eq!(a, b);
        Ok(())
    }
}
