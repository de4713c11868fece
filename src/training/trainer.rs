//! Training loop for the GAN
//!
//! Drives the alternating generator/discriminator updates through the
//! model's training-step dispatch, runs a validation pass per epoch and
//! handles checkpointing and early stopping.

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use tch::nn;
use tracing::{info, warn};

use super::early_stopping::EarlyStopping;
use super::metrics::TrainingMetrics;
use crate::data::DataLoader;
use crate::model::{GanModel, OPTIMIZER_DISCRIMINATOR, OPTIMIZER_GENERATOR};
use crate::utils::checkpoint::save_checkpoint;
use crate::utils::config::TrainingSettings;

/// Training configuration
#[derive(Debug, Clone)]
pub struct TrainingConfig {
    /// Number of training epochs
    pub epochs: usize,
    /// Save a periodic checkpoint every N epochs (0 disables)
    pub checkpoint_every: usize,
    /// Directory to save checkpoints
    pub checkpoint_dir: String,
    /// Directory for metric logs
    pub log_dir: String,
    /// Early-stopping patience in epochs (0 disables)
    pub early_stopping_patience: usize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            epochs: 100,
            checkpoint_every: 10,
            checkpoint_dir: "model_weights".to_string(),
            log_dir: "logs".to_string(),
            early_stopping_patience: 10,
        }
    }
}

impl From<&TrainingSettings> for TrainingConfig {
    fn from(settings: &TrainingSettings) -> Self {
        Self {
            epochs: settings.epochs,
            checkpoint_every: settings.checkpoint_every,
            checkpoint_dir: settings.checkpoint_dir.clone(),
            log_dir: settings.log_dir.clone(),
            early_stopping_patience: settings.early_stopping_patience,
        }
    }
}

/// GAN Trainer
pub struct Trainer {
    config: TrainingConfig,
    metrics: TrainingMetrics,
}

impl Trainer {
    /// Create a new trainer
    pub fn new(config: TrainingConfig) -> Self {
        Self {
            config,
            metrics: TrainingMetrics::new(),
        }
    }

    /// Train the GAN model
    ///
    /// # Arguments
    ///
    /// * `model` - GAN model to train
    /// * `train_loader` - loader over the train split
    /// * `val_loader` - loader over the validation split
    ///
    /// # Returns
    ///
    /// Training metrics
    pub fn train(
        &mut self,
        model: &mut GanModel,
        train_loader: &mut DataLoader,
        val_loader: &mut DataLoader,
    ) -> Result<&TrainingMetrics> {
        let (mut gen_opt, mut disc_opt) = model.configure_optimizers()?;
        let mut early_stopping = EarlyStopping::new(self.config.early_stopping_patience);

        let num_batches = train_loader.num_batches();
        info!(
            "Starting training for {} epochs, {} batches per epoch",
            self.config.epochs, num_batches
        );

        std::fs::create_dir_all(&self.config.checkpoint_dir)?;
        std::fs::create_dir_all(&self.config.log_dir)?;

        for epoch in 0..self.config.epochs {
            let mut epoch_gen_loss = 0.0;
            let mut epoch_disc_loss = 0.0;
            let mut batch_count = 0;

            let pb = ProgressBar::new(num_batches as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
                    .unwrap()
                    .progress_chars("##-"),
            );

            train_loader.reset();
            while let Some(batch) = train_loader.next_batch() {
                let (g_loss, d_loss) = train_batch(model, &batch, &mut gen_opt, &mut disc_opt)?;

                epoch_gen_loss += g_loss;
                epoch_disc_loss += d_loss;
                batch_count += 1;

                pb.set_message(format!("G: {:.4}, D: {:.4}", g_loss, d_loss));
                pb.inc(1);
            }

            pb.finish_with_message("done");

            let avg_gen_loss = epoch_gen_loss / batch_count.max(1) as f64;
            let avg_disc_loss = epoch_disc_loss / batch_count.max(1) as f64;

            let avg_val_loss = self.validate(model, val_loader);
            self.metrics.record_epoch(avg_gen_loss, avg_disc_loss, avg_val_loss);

            info!(
                "Epoch {}/{}: G_loss={:.4}, D_loss={:.4}, val_loss={:.4}",
                epoch + 1,
                self.config.epochs,
                avg_gen_loss,
                avg_disc_loss,
                avg_val_loss
            );

            if self.metrics.check_mode_collapse(10) {
                warn!("Possible mode collapse detected! Consider adjusting learning rates.");
            }

            let stop = early_stopping.step(avg_val_loss);

            // Checkpoint on validation improvement, named by epoch and val loss
            if early_stopping.improved() {
                match save_checkpoint(model, &self.metrics, epoch + 1, &self.config.checkpoint_dir) {
                    Ok(path) => info!("New best val_loss={:.4}, saved {}", avg_val_loss, path),
                    Err(e) => warn!("Failed to save checkpoint: {}", e),
                }
            } else if self.config.checkpoint_every > 0
                && (epoch + 1) % self.config.checkpoint_every == 0
            {
                if let Err(e) =
                    save_checkpoint(model, &self.metrics, epoch + 1, &self.config.checkpoint_dir)
                {
                    warn!("Failed to save checkpoint: {}", e);
                }
            }

            if stop {
                info!(
                    "Early stopping at epoch {} (best val_loss={:.4})",
                    epoch + 1,
                    early_stopping.best_loss()
                );
                break;
            }
        }

        let metrics_path = format!("{}/training_metrics.csv", self.config.log_dir);
        if let Err(e) = self.metrics.save_csv(&metrics_path) {
            warn!("Failed to save metrics: {}", e);
        }

        Ok(&self.metrics)
    }

    /// Average validation loss over the validation split
    ///
    /// The per-batch validation loss is the mean of the generator and
    /// discriminator losses.
    fn validate(&self, model: &GanModel, val_loader: &mut DataLoader) -> f64 {
        let mut total = 0.0;
        let mut count = 0;

        val_loader.reset();
        while let Some(batch) = val_loader.next_batch() {
            let (g_loss, d_loss) = model.validation_step(&batch);
            total += (g_loss + d_loss) / 2.0;
            count += 1;
        }

        total / count.max(1) as f64
    }

    /// Get training metrics
    pub fn metrics(&self) -> &TrainingMetrics {
        &self.metrics
    }

    /// Get configuration
    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }
}

/// Single training iteration: generator step then discriminator step
///
/// Runs the model's training-step dispatch once per optimizer index and
/// applies the corresponding optimizer update.
pub fn train_batch(
    model: &mut GanModel,
    batch: &(tch::Tensor, tch::Tensor),
    gen_opt: &mut nn::Optimizer,
    disc_opt: &mut nn::Optimizer,
) -> Result<(f64, f64)> {
    // Generator update; this caches the generated batch
    let g_loss = model.training_step(batch, OPTIMIZER_GENERATOR)?;
    gen_opt.zero_grad();
    g_loss.backward();
    gen_opt.step();

    // Discriminator update against the cached (detached) batch
    let d_loss = model.training_step(batch, OPTIMIZER_DISCRIMINATOR)?;
    disc_opt.zero_grad();
    d_loss.backward();
    disc_opt.step();

    Ok((g_loss.double_value(&[]), d_loss.double_value(&[])))
}
