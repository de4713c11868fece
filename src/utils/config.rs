//! Configuration management
//!
//! Provides the model hyperparameter set and the unified file configuration
//! for the training pipeline.

use serde::{Deserialize, Serialize};
use std::path::Path;

fn default_input_channels() -> i64 {
    1
}
fn default_input_width() -> i64 {
    28
}
fn default_input_height() -> i64 {
    28
}
fn default_latent_dim() -> i64 {
    32
}
fn default_batch_size() -> i64 {
    32
}
fn default_learning_rate() -> f64 {
    2e-4
}
fn default_b1() -> f64 {
    0.5
}
fn default_b2() -> f64 {
    0.999
}
fn default_val_split() -> i64 {
    5000
}

/// Model hyperparameters
///
/// Every field falls back to its documented default when absent from the
/// configuration source; there is no validation beyond [`Config::validate`].
/// The set is read once at construction and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HParams {
    /// Number of image channels (1 for MNIST, 3 for CIFAR-10)
    #[serde(default = "default_input_channels")]
    pub input_channels: i64,
    /// Input image width
    #[serde(default = "default_input_width")]
    pub input_width: i64,
    /// Input image height
    #[serde(default = "default_input_height")]
    pub input_height: i64,
    /// Size of the latent noise vector consumed by the generator
    #[serde(default = "default_latent_dim")]
    pub latent_dim: i64,
    /// Number of images per batch
    #[serde(default = "default_batch_size")]
    pub batch_size: i64,
    /// Adam learning rate, shared by both optimizers
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
    /// Adam decay of first order momentum of gradient
    #[serde(default = "default_b1")]
    pub b1: f64,
    /// Adam decay of second order momentum of gradient
    #[serde(default = "default_b2")]
    pub b2: f64,
    /// Number of training samples held out for validation
    #[serde(default = "default_val_split")]
    pub val_split: i64,
}

impl Default for HParams {
    fn default() -> Self {
        Self {
            input_channels: default_input_channels(),
            input_width: default_input_width(),
            input_height: default_input_height(),
            latent_dim: default_latent_dim(),
            batch_size: default_batch_size(),
            learning_rate: default_learning_rate(),
            b1: default_b1(),
            b2: default_b2(),
            val_split: default_val_split(),
        }
    }
}

impl HParams {
    /// Image dimensions as (channels, width, height)
    pub fn img_dim(&self) -> (i64, i64, i64) {
        (self.input_channels, self.input_width, self.input_height)
    }

    /// Total number of scalars per image
    pub fn img_numel(&self) -> i64 {
        self.input_channels * self.input_width * self.input_height
    }
}

/// Data-related configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Dataset name: "mnist" or "cifar10"
    pub dataset: String,
    /// Directory holding the raw dataset files
    pub data_dir: String,
}

/// Training-related configuration (file form)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingSettings {
    /// Number of epochs
    pub epochs: usize,
    /// Save a checkpoint every N epochs
    pub checkpoint_every: usize,
    /// Checkpoint directory
    pub checkpoint_dir: String,
    /// Directory for metric logs
    pub log_dir: String,
    /// Epochs without validation improvement before stopping
    pub early_stopping_patience: usize,
    /// Device: "cpu" or "cuda"
    pub device: String,
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Data configuration
    pub data: DataConfig,
    /// Model hyperparameters
    #[serde(default)]
    pub hparams: HParams,
    /// Training configuration
    pub training: TrainingSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data: DataConfig {
                dataset: "mnist".to_string(),
                data_dir: "data".to_string(),
            },
            hparams: HParams::default(),
            training: TrainingSettings {
                epochs: 100,
                checkpoint_every: 10,
                checkpoint_dir: "model_weights".to_string(),
                log_dir: "logs".to_string(),
                early_stopping_patience: 10,
                device: "cpu".to_string(),
            },
        }
    }
}

impl Config {
    /// Create a new default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from TOML file
    pub fn from_toml(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_toml(&self, path: &str) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration from JSON file
    pub fn from_json(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to JSON file
    pub fn save_json(&self, path: &str) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load from either format, keyed on the file extension
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        if path.ends_with(".toml") {
            Self::from_toml(path)
        } else {
            Self::from_json(path)
        }
    }

    /// Get device from configuration
    pub fn get_device(&self) -> tch::Device {
        match self.training.device.to_lowercase().as_str() {
            "cuda" | "gpu" => {
                if tch::Cuda::is_available() {
                    tch::Device::Cuda(0)
                } else {
                    tracing::warn!("CUDA requested but not available, falling back to CPU");
                    tch::Device::Cpu
                }
            }
            _ => tch::Device::Cpu,
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.hparams.input_width <= 0 || self.hparams.input_height <= 0 {
            anyhow::bail!("Image dimensions must be > 0");
        }
        if self.hparams.input_channels <= 0 {
            anyhow::bail!("Number of channels must be > 0");
        }
        if self.hparams.batch_size <= 0 {
            anyhow::bail!("Batch size must be > 0");
        }
        if self.hparams.latent_dim <= 0 {
            anyhow::bail!("Latent dimension must be > 0");
        }
        if self.hparams.val_split < 0 {
            anyhow::bail!("Validation split must be >= 0");
        }
        if self.training.epochs == 0 {
            anyhow::bail!("Number of epochs must be > 0");
        }
        match self.data.dataset.as_str() {
            "mnist" | "cifar10" => Ok(()),
            other => anyhow::bail!("Unknown dataset: {}", other),
        }
    }
}

/// Create default configuration file if it doesn't exist
pub fn ensure_config_exists(path: &str) -> anyhow::Result<Config> {
    if Path::new(path).exists() {
        Config::from_file(path)
    } else {
        let config = Config::default();
        if path.ends_with(".toml") {
            config.save_toml(path)?;
        } else {
            config.save_json(path)?;
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hparams_defaults() {
        let hparams = HParams::default();
        assert_eq!(hparams.input_channels, 1);
        assert_eq!(hparams.input_width, 28);
        assert_eq!(hparams.input_height, 28);
        assert_eq!(hparams.latent_dim, 32);
        assert_eq!(hparams.batch_size, 32);
        assert_eq!(hparams.learning_rate, 2e-4);
        assert_eq!(hparams.b1, 0.5);
        assert_eq!(hparams.b2, 0.999);
        assert_eq!(hparams.val_split, 5000);
    }

    #[test]
    fn test_hparams_missing_fields_fall_back() {
        // A partial config must silently substitute defaults for the rest
        let hparams: HParams = serde_json::from_str(r#"{"latent_dim": 100, "batch_size": 64}"#).unwrap();
        assert_eq!(hparams.latent_dim, 100);
        assert_eq!(hparams.batch_size, 64);
        assert_eq!(hparams.input_width, 28);
        assert_eq!(hparams.learning_rate, 2e-4);
        assert_eq!(hparams.b1, 0.5);
    }

    #[test]
    fn test_img_dim() {
        let hparams = HParams::default();
        assert_eq!(hparams.img_dim(), (1, 28, 28));
        assert_eq!(hparams.img_numel(), 784);
    }

    #[test]
    fn test_config_json_roundtrip() {
        let config = Config::default();
        let json = serde_json::to_string(&config).unwrap();
        let loaded: Config = serde_json::from_str(&json).unwrap();

        assert_eq!(config.data.dataset, loaded.data.dataset);
        assert_eq!(config.hparams.latent_dim, loaded.hparams.latent_dim);
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.hparams.batch_size = 0;
        assert!(config.validate().is_err());

        config.hparams.batch_size = 32;
        config.data.dataset = "imagenet".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_rejects_negative_val_split() {
        let mut config = Config::default();
        config.hparams.val_split = -1;
        assert!(config.validate().is_err());
    }
}
