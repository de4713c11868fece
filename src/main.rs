//! GAN training scaffold for image datasets
//!
//! Main entry point providing a CLI for:
//! - Training a GAN on MNIST or CIFAR-10
//! - Generating samples from a trained checkpoint
//! - Initializing a default configuration file

use anyhow::Result;
use clap::{Parser, Subcommand};
use tch::{Kind, Tensor};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use rust_vision_gan::{
    data::{Cifar10DataModule, MnistDataModule, Normalize},
    model::GanModel,
    training::{Trainer, TrainingConfig},
    utils::{ensure_config_exists, find_latest_checkpoint, load_checkpoint, Config, HParams},
};

/// GAN for image datasets (MNIST, CIFAR-10)
#[derive(Parser)]
#[command(name = "vision_gan")]
#[command(version = "0.1.0")]
#[command(about = "Train a GAN on standard image datasets")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.json")]
    config: String,

    /// Verbosity level
    #[arg(short, long, default_value = "info")]
    verbosity: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train the GAN model
    Train {
        /// Dataset: mnist or cifar10
        #[arg(short, long)]
        dataset: Option<String>,

        /// Directory holding the raw dataset files
        #[arg(long)]
        data_dir: Option<String>,

        /// Number of epochs
        #[arg(short, long)]
        epochs: Option<usize>,

        /// Input image width - 28 for MNIST (must be even)
        #[arg(long = "input_width")]
        input_width: Option<i64>,

        /// Num channels
        #[arg(long = "input_channels")]
        input_channels: Option<i64>,

        /// Input image height - 28 for MNIST (must be even)
        #[arg(long = "input_height")]
        input_height: Option<i64>,

        /// Adam: learning rate
        #[arg(long = "learning_rate")]
        learning_rate: Option<f64>,

        /// Adam: decay of first order momentum of gradient
        #[arg(long)]
        b1: Option<f64>,

        /// Adam: decay of second order momentum of gradient
        #[arg(long)]
        b2: Option<f64>,

        /// Generator embedding dim
        #[arg(long = "latent_dim")]
        latent_dim: Option<i64>,

        /// Size of the batches
        #[arg(long = "batch_size")]
        batch_size: Option<i64>,

        /// Resume from checkpoint directory (or "latest")
        #[arg(long)]
        resume: Option<String>,
    },

    /// Generate samples from a trained checkpoint
    Generate {
        /// Path to checkpoint directory
        #[arg(short, long)]
        model: String,

        /// Number of samples to generate
        #[arg(short, long, default_value = "16")]
        num_samples: i64,

        /// Output directory for generated images
        #[arg(short, long, default_value = "samples")]
        output: String,
    },

    /// Initialize default configuration file
    Init {
        /// Output configuration file path
        #[arg(short, long, default_value = "config.json")]
        output: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbosity.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Train {
            dataset,
            data_dir,
            epochs,
            input_width,
            input_channels,
            input_height,
            learning_rate,
            b1,
            b2,
            latent_dim,
            batch_size,
            resume,
        } => {
            let mut config = ensure_config_exists(&cli.config)?;

            // CLI flags override the config file; absent flags keep defaults
            if let Some(dataset) = dataset {
                config.data.dataset = dataset;
            }
            if let Some(data_dir) = data_dir {
                config.data.data_dir = data_dir;
            }
            if let Some(epochs) = epochs {
                config.training.epochs = epochs;
            }
            apply_hparam_overrides(
                &mut config.hparams,
                input_width,
                input_channels,
                input_height,
                learning_rate,
                b1,
                b2,
                latent_dim,
                batch_size,
            );

            config.validate()?;
            train(&config, resume)?;
        }
        Commands::Generate {
            model,
            num_samples,
            output,
        } => {
            let config = ensure_config_exists(&cli.config)?;
            generate_samples(&config, &model, num_samples, &output)?;
        }
        Commands::Init { output } => {
            init_config(&output)?;
        }
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn apply_hparam_overrides(
    hparams: &mut HParams,
    input_width: Option<i64>,
    input_channels: Option<i64>,
    input_height: Option<i64>,
    learning_rate: Option<f64>,
    b1: Option<f64>,
    b2: Option<f64>,
    latent_dim: Option<i64>,
    batch_size: Option<i64>,
) {
    if let Some(v) = input_width {
        hparams.input_width = v;
    }
    if let Some(v) = input_channels {
        hparams.input_channels = v;
    }
    if let Some(v) = input_height {
        hparams.input_height = v;
    }
    if let Some(v) = learning_rate {
        hparams.learning_rate = v;
    }
    if let Some(v) = b1 {
        hparams.b1 = v;
    }
    if let Some(v) = b2 {
        hparams.b2 = v;
    }
    if let Some(v) = latent_dim {
        hparams.latent_dim = v;
    }
    if let Some(v) = batch_size {
        hparams.batch_size = v;
    }
}

/// Train the GAN model
fn train(config: &Config, resume: Option<String>) -> Result<()> {
    let device = config.get_device();
    info!("Using device: {:?}", device);

    let batch_size = config.hparams.batch_size;
    let val_split = config.hparams.val_split;

    // Build dataloaders for the configured dataset
    let (mut train_loader, mut val_loader) = match config.data.dataset.as_str() {
        "mnist" => {
            let dm = MnistDataModule::load(&config.data.data_dir, val_split)?;
            info!(
                "Loaded MNIST: {} train / {} val / {} test",
                dm.train_len(),
                dm.val_len(),
                dm.test_len()
            );
            (dm.train_dataloader(batch_size), dm.val_dataloader(batch_size))
        }
        "cifar10" => {
            let dm = Cifar10DataModule::load(&config.data.data_dir, val_split)?;
            info!(
                "Loaded CIFAR-10: {} train / {} val / {} test",
                dm.train_len(),
                dm.val_len(),
                dm.test_len()
            );
            (dm.train_dataloader(batch_size), dm.val_dataloader(batch_size))
        }
        other => anyhow::bail!("Unknown dataset: {}", other),
    };

    let mut model = GanModel::new(config.hparams.clone(), device);

    if let Some(resume) = resume {
        let checkpoint_dir = if resume == "latest" {
            find_latest_checkpoint(&config.training.checkpoint_dir)
                .ok_or_else(|| anyhow::anyhow!("No checkpoint found to resume from"))?
        } else {
            resume
        };
        let (epoch, _) = load_checkpoint(&mut model, &checkpoint_dir)?;
        info!("Resumed from epoch {}", epoch);
    }

    let mut trainer = Trainer::new(TrainingConfig::from(&config.training));
    let metrics = trainer.train(&mut model, &mut train_loader, &mut val_loader)?;

    info!(
        "Training finished after {} epochs (last val_loss={:.4})",
        metrics.num_epochs(),
        metrics.latest_val_loss().unwrap_or(f64::NAN)
    );

    Ok(())
}

/// Generate samples from a trained checkpoint and save them as PNGs
fn generate_samples(config: &Config, checkpoint_dir: &str, num_samples: i64, output: &str) -> Result<()> {
    let device = config.get_device();
    let mut model = GanModel::new(config.hparams.clone(), device);
    load_checkpoint(&mut model, checkpoint_dir)?;

    let transform = match config.data.dataset.as_str() {
        "cifar10" => Normalize::cifar10(),
        _ => Normalize::mnist(),
    };

    info!("Generating {} samples", num_samples);
    let samples = tch::no_grad(|| model.generate(num_samples));

    // Undo normalization and map to byte range for writing
    let samples = transform.invert(&samples);
    let samples = (samples * 255.0).clamp(0.0, 255.0).to_kind(Kind::Uint8);

    std::fs::create_dir_all(output)?;
    for i in 0..num_samples {
        let img: Tensor = samples.get(i);
        let path = format!("{}/sample_{:03}.png", output, i);
        tch::vision::image::save(&img, &path)?;
    }

    info!("Saved {} images to {}", num_samples, output);
    Ok(())
}

/// Write a default configuration file
fn init_config(output: &str) -> Result<()> {
    let config = Config::default();
    if output.ends_with(".toml") {
        config.save_toml(output)?;
    } else {
        config.save_json(output)?;
    }
    info!("Wrote default configuration to {}", output);
    Ok(())
}
