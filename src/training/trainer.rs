/// Training and evaluation loops over the encoder-plus-head classifier
use std::collections::HashMap;
use std::path::PathBuf;

use candle_core::{DType, Device, Tensor, D};
use candle_nn::{loss, AdamW, Optimizer, ParamsAdamW, VarMap};
use indicatif::ProgressBar;

use crate::config::RunConfig;
use crate::data::BatchStream;
use crate::models::ClassifierForward;

use super::checkpoint::{Checkpoint, CheckpointMetadata};
use super::metrics::{BestSnapshot, EpochRecord, PassMetrics};
use super::plot;
use super::scheduler::{LinearScheduleConfig, LinearScheduler};

/// Training configuration
#[derive(Debug, Clone)]
pub struct TrainerConfig {
    /// Number of training epochs
    pub num_epochs: usize,
    /// Peak learning rate
    pub learning_rate: f64,
    /// Weight decay
    pub weight_decay: f64,
    /// AdamW epsilon
    pub eps: f64,
    /// Warmup steps for the linear schedule
    pub warmup_steps: usize,
    /// Total training steps (for the schedule)
    pub total_steps: usize,
    /// Save a head checkpoint when the best snapshot improves
    pub save_checkpoints: bool,
    /// Checkpoint directory
    pub checkpoint_dir: PathBuf,
    /// Accuracy plot destination; `None` skips rendering
    pub plot_path: Option<PathBuf>,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            num_epochs: 10,
            learning_rate: 1e-4,
            weight_decay: 0.01,
            eps: 1e-8,
            warmup_steps: 100,
            total_steps: 1000,
            save_checkpoints: false,
            checkpoint_dir: PathBuf::from("checkpoints"),
            plot_path: Some(PathBuf::from("image.png")),
        }
    }
}

impl TrainerConfig {
    /// Derive the trainer configuration from a run configuration and the
    /// training stream's batch count
    ///
    /// Warmup covers the first tenth of an epoch's steps; the schedule
    /// spans every step of the run.
    pub fn from_run(config: &RunConfig, batches_per_epoch: usize) -> Self {
        Self {
            num_epochs: config.num_epoch,
            learning_rate: config.lr,
            weight_decay: config.decay,
            eps: config.eps,
            warmup_steps: (0.1 * batches_per_epoch as f64).ceil() as usize,
            total_steps: batches_per_epoch * config.num_epoch,
            save_checkpoints: config.save_checkpoints,
            checkpoint_dir: config.checkpoint_dir.clone(),
            plot_path: config.plot_path.clone(),
        }
    }
}

/// Result of a full run
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Per-epoch metrics, in epoch order
    pub history: Vec<EpochRecord>,
    /// Best test result over the run
    pub best: BestSnapshot,
}

/// Count predictions (argmax of logits) matching the targets
fn count_correct(logits: &Tensor, targets: &Tensor) -> crate::Result<usize> {
    let predictions = logits.argmax(D::Minus1)?;
    let matches = predictions
        .eq(targets)?
        .to_dtype(DType::U32)?
        .sum_all()?
        .to_scalar::<u32>()?;
    Ok(matches as usize)
}

/// Drives the epoch loop over a classifier
///
/// Owns the model state for the lifetime of the run; the training pass
/// borrows it mutably, the evaluation pass immutably, never concurrently.
pub struct Trainer<M: ClassifierForward> {
    model: M,
    varmap: VarMap,
    optimizer: AdamW,
    scheduler: LinearScheduler,
    config: TrainerConfig,
    device: Device,
}

impl<M: ClassifierForward> Trainer<M> {
    /// Create new trainer
    ///
    /// `varmap` holds the trainable parameters the optimizer steps over
    /// (the classifier head; the encoder stays frozen).
    pub fn new(
        model: M,
        varmap: VarMap,
        config: TrainerConfig,
        device: Device,
    ) -> crate::Result<Self> {
        let optimizer_params = ParamsAdamW {
            lr: config.learning_rate,
            beta1: 0.9,
            beta2: 0.999,
            eps: config.eps,
            weight_decay: config.weight_decay,
        };
        let optimizer = AdamW::new(varmap.all_vars(), optimizer_params)?;

        let scheduler = LinearScheduler::new(LinearScheduleConfig {
            lr_init: config.learning_rate,
            warmup_steps: config.warmup_steps,
            total_steps: config.total_steps,
        });

        Ok(Self {
            model,
            varmap,
            optimizer,
            scheduler,
            config,
            device,
        })
    }

    /// Get model reference
    pub fn model(&self) -> &M {
        &self.model
    }

    /// One optimization pass over the training split
    ///
    /// Returns (mean loss, accuracy). An empty stream yields (0, 0)
    /// rather than dividing by zero.
    pub fn train_pass(&mut self, stream: &mut dyn BatchStream) -> crate::Result<(f64, f64)> {
        let mut metrics = PassMetrics::new();

        stream.reset();
        let progress = ProgressBar::new(stream.num_batches() as u64);

        while let Some((batch, targets)) = stream.next_batch(&self.device)? {
            let batch_size = batch.batch_size();

            let logits = self.model.forward_t(&batch, true)?;
            let batch_loss = loss::cross_entropy(&logits, &targets)?;

            // Schedule drives the LR for this step; backward_step zeroes
            // prior gradients, back-propagates and applies the update.
            self.optimizer.set_learning_rate(self.scheduler.lr());
            self.optimizer.backward_step(&batch_loss)?;
            self.scheduler.step();

            let correct = count_correct(&logits, &targets)?;
            metrics.record(batch_loss.to_scalar::<f32>()? as f64, correct, batch_size);
            progress.inc(1);
        }

        progress.finish_and_clear();
        Ok((metrics.loss(), metrics.accuracy()))
    }

    /// One read-only pass over the held-out split
    ///
    /// Dropout is disabled and no gradients are applied; the model is
    /// borrowed immutably for the whole pass.
    pub fn eval_pass(&self, stream: &mut dyn BatchStream) -> crate::Result<(f64, f64)> {
        let mut metrics = PassMetrics::new();

        stream.reset();
        let progress = ProgressBar::new(stream.num_batches() as u64);

        while let Some((batch, targets)) = stream.next_batch(&self.device)? {
            let batch_size = batch.batch_size();

            let logits = self.model.forward_t(&batch, false)?;
            let batch_loss = loss::cross_entropy(&logits, &targets)?;

            let correct = count_correct(&logits, &targets)?;
            metrics.record(batch_loss.to_scalar::<f32>()? as f64, correct, batch_size);
            progress.inc(1);
        }

        progress.finish_and_clear();
        Ok((metrics.loss(), metrics.accuracy()))
    }

    /// Run the full epoch loop
    ///
    /// Trains and evaluates once per epoch, tracks the best test result,
    /// logs per-epoch metrics and finally renders the accuracy plot.
    pub fn run(
        &mut self,
        train: &mut dyn BatchStream,
        test: &mut dyn BatchStream,
    ) -> crate::Result<RunSummary> {
        let mut history = Vec::with_capacity(self.config.num_epochs);
        let mut best = BestSnapshot::default();

        for epoch in 0..self.config.num_epochs {
            let (train_loss, train_acc) = self.train_pass(train)?;
            let (test_loss, test_acc) = self.eval_pass(test)?;

            history.push(EpochRecord {
                epoch,
                train_loss,
                train_acc,
                test_loss,
                test_acc,
            });

            if best.update(test_acc, test_loss) && self.config.save_checkpoints {
                self.save_checkpoint(epoch, test_acc, test_loss)?;
            }

            log::info!(
                "{}/{} - {:.2}%",
                epoch + 1,
                self.config.num_epochs,
                100.0 * (epoch + 1) as f64 / self.config.num_epochs as f64
            );
            log::info!("[train] loss: {:.4}, acc: {:.2}", train_loss, train_acc * 100.0);
            log::info!("[test] loss: {:.4}, acc: {:.2}", test_loss, test_acc * 100.0);
        }

        log::info!("best loss: {:.4}, best acc: {:.2}", best.loss, best.acc * 100.0);

        if let Some(path) = &self.config.plot_path {
            plot::render_accuracy_plot(&history, path)?;
            log::info!("accuracy plot saved: {}", path.display());
        }

        Ok(RunSummary { history, best })
    }

    fn save_checkpoint(&self, epoch: usize, test_acc: f64, test_loss: f64) -> crate::Result<()> {
        std::fs::create_dir_all(&self.config.checkpoint_dir)?;

        let mut tensors = HashMap::new();
        for (name, var) in self.varmap.data().lock().unwrap().iter() {
            tensors.insert(name.clone(), var.as_tensor().clone());
        }

        let metadata = CheckpointMetadata {
            epoch,
            lr: self.scheduler.lr(),
            test_acc: Some(test_acc),
            test_loss: Some(test_loss),
        };

        let path = self
            .config
            .checkpoint_dir
            .join(format!("head_epoch_{}.safetensors", epoch));
        Checkpoint::new(tensors, metadata).save(&path)?;
        log::info!("checkpoint saved: {}", path.display());

        Ok(())
    }
}
