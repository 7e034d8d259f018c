/// Metric accumulation for training and evaluation passes
use serde::{Deserialize, Serialize};

/// Accumulates loss and accuracy over one pass of a split
///
/// Loss is accumulated weighted by batch size so that the final mean is
/// per-sample even when the last batch is short.
#[derive(Debug, Default)]
pub struct PassMetrics {
    weighted_loss: f64,
    correct: usize,
    samples: usize,
}

impl PassMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one batch
    ///
    /// # Arguments
    /// * `batch_loss` - Mean loss over the batch
    /// * `correct` - Number of correct predictions in the batch
    /// * `batch_size` - Number of samples in the batch
    pub fn record(&mut self, batch_loss: f64, correct: usize, batch_size: usize) {
        self.weighted_loss += batch_loss * batch_size as f64;
        self.correct += correct;
        self.samples += batch_size;
    }

    /// Total samples seen in this pass
    pub fn samples(&self) -> usize {
        self.samples
    }

    /// Per-sample mean loss; 0.0 for an empty pass
    pub fn loss(&self) -> f64 {
        if self.samples == 0 {
            return 0.0;
        }
        self.weighted_loss / self.samples as f64
    }

    /// Fraction of correct predictions; 0.0 for an empty pass
    pub fn accuracy(&self) -> f64 {
        if self.samples == 0 {
            return 0.0;
        }
        self.correct as f64 / self.samples as f64
    }
}

/// Per-epoch metrics record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpochRecord {
    pub epoch: usize,
    pub train_loss: f64,
    pub train_acc: f64,
    pub test_loss: f64,
    pub test_acc: f64,
}

/// Best test result seen so far
///
/// Replaced when a new epoch's accuracy strictly exceeds the stored one,
/// or ties it with strictly lower loss. Starts at (0, 0).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct BestSnapshot {
    pub acc: f64,
    pub loss: f64,
}

impl BestSnapshot {
    /// Apply one epoch's test result; returns whether the snapshot was
    /// replaced
    pub fn update(&mut self, acc: f64, loss: f64) -> bool {
        if acc > self.acc || (acc == self.acc && loss < self.loss) {
            self.acc = acc;
            self.loss = loss;
            true
        } else {
            false
        }
    }
}
