/// Training infrastructure: loops, schedule, metrics, checkpoints, plot

pub mod checkpoint;
pub mod metrics;
pub mod plot;
pub mod scheduler;
pub mod trainer;

pub use checkpoint::{Checkpoint, CheckpointMetadata};
pub use metrics::{BestSnapshot, EpochRecord, PassMetrics};
pub use scheduler::{LinearScheduleConfig, LinearScheduler};
pub use trainer::{RunSummary, Trainer, TrainerConfig};
