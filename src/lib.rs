//! # GAN for Image Datasets
//!
//! This crate provides a modular Generative Adversarial Network training
//! scaffold for standard image datasets (MNIST, CIFAR-10). Tensor math,
//! autodiff and the optimizer step are delegated to `tch` (libtorch).
//!
//! ## Modules
//!
//! - `data`: Dataset loading, train/val/test splits and batching
//! - `model`: GAN networks (Generator and Discriminator) and the
//!   per-batch training-step dispatch
//! - `training`: Training loop, loss functions and metrics
//! - `utils`: Hyperparameters, configuration and checkpoints

pub mod data;
pub mod model;
pub mod training;
pub mod utils;

pub use data::{Cifar10DataModule, DataLoader, MnistDataModule};
pub use model::{Discriminator, GanModel, Generator};
pub use training::{Trainer, TrainingConfig, TrainingMetrics};
pub use utils::{load_checkpoint, save_checkpoint, Config, HParams};
