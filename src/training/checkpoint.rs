/// Head checkpointing with safetensors
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use candle_core::{Device, Tensor};

/// Checkpoint metadata, stored as a JSON sidecar next to the tensor file
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct CheckpointMetadata {
    /// Epoch the checkpoint was taken at
    pub epoch: usize,
    /// Learning rate at checkpoint
    pub lr: f64,
    /// Test accuracy at checkpoint
    pub test_acc: Option<f64>,
    /// Test loss at checkpoint
    pub test_loss: Option<f64>,
}

/// Trainable-parameter checkpoint
pub struct Checkpoint {
    /// Head parameters by name
    pub tensors: HashMap<String, Tensor>,
    /// Metadata
    pub metadata: CheckpointMetadata,
}

fn metadata_path(path: &Path) -> PathBuf {
    path.with_extension("json")
}

impl Checkpoint {
    /// Create new checkpoint
    pub fn new(tensors: HashMap<String, Tensor>, metadata: CheckpointMetadata) -> Self {
        Self { tensors, metadata }
    }

    /// Save tensors as safetensors plus a JSON metadata sidecar
    pub fn save<P: AsRef<Path>>(&self, path: P) -> crate::Result<()> {
        let path = path.as_ref();

        candle_core::safetensors::save(&self.tensors, path)?;

        let metadata_json = serde_json::to_string_pretty(&self.metadata)?;
        std::fs::write(metadata_path(path), metadata_json.as_bytes())?;

        Ok(())
    }

    /// Load checkpoint from file
    ///
    /// A missing or unreadable metadata sidecar falls back to defaults;
    /// the tensors are the part that matters for resuming.
    pub fn load<P: AsRef<Path>>(path: P, device: &Device) -> crate::Result<Self> {
        let path = path.as_ref();

        let tensors = candle_core::safetensors::load(path, device)?;

        let metadata = std::fs::read(metadata_path(path))
            .ok()
            .and_then(|bytes| serde_json::from_slice(&bytes).ok())
            .unwrap_or_default();

        Ok(Self { tensors, metadata })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::DType;
    use std::fs;

    #[test]
    fn test_checkpoint_metadata_roundtrip() {
        let metadata = CheckpointMetadata {
            epoch: 3,
            lr: 5e-5,
            test_acc: Some(0.81),
            test_loss: Some(0.42),
        };

        let json = serde_json::to_string(&metadata).unwrap();
        let back: CheckpointMetadata = serde_json::from_str(&json).unwrap();
        assert_eq!(back.epoch, 3);
        assert_eq!(back.test_acc, Some(0.81));
    }

    #[test]
    fn test_save_load_checkpoint() -> crate::Result<()> {
        let device = Device::Cpu;
        let mut tensors = HashMap::new();
        tensors.insert(
            "head.fc.weight".to_string(),
            Tensor::ones((4, 8), DType::F32, &device)?,
        );

        let metadata = CheckpointMetadata {
            epoch: 1,
            lr: 1e-4,
            test_acc: Some(0.5),
            test_loss: Some(0.9),
        };

        let path = std::env::temp_dir().join("textcls_checkpoint_test.safetensors");

        Checkpoint::new(tensors, metadata).save(&path)?;
        let loaded = Checkpoint::load(&path, &device)?;

        assert_eq!(loaded.tensors.len(), 1);
        assert_eq!(loaded.tensors["head.fc.weight"].dims(), &[4, 8]);
        assert_eq!(loaded.metadata.epoch, 1);

        fs::remove_file(&path).ok();
        fs::remove_file(path.with_extension("json")).ok();
        Ok(())
    }
}
