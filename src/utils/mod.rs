//! Utility module
//!
//! Configuration, hyperparameters and checkpoint management.

pub mod checkpoint;
pub mod config;

pub use checkpoint::{
    find_latest_checkpoint, list_checkpoints, load_checkpoint, save_checkpoint, CheckpointMeta,
};
pub use config::{ensure_config_exists, Config, DataConfig, HParams, TrainingSettings};
