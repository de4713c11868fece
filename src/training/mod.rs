//! Training module
//!
//! Loss functions, the epoch-level training loop and metric tracking.

pub mod early_stopping;
pub mod losses;
pub mod metrics;
pub mod trainer;

pub use early_stopping::EarlyStopping;
pub use losses::{adversarial_loss, discriminator_loss, generator_loss};
pub use metrics::TrainingMetrics;
pub use trainer::{train_batch, Trainer, TrainingConfig};
