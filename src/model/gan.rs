//! GAN wrapper combining Generator and Discriminator
//!
//! Holds the two networks and exposes the per-batch training-step
//! dispatch together with optimizer configuration. Which of the two
//! steps runs on a given call is selected by the optimizer index handed
//! in by the training loop.

use anyhow::{bail, Result};
use tch::{nn, nn::OptimizerConfig, nn::VarStore, Device, Kind, Tensor};

use super::discriminator::{Discriminator, DiscriminatorConfig};
use super::generator::{Generator, GeneratorConfig};
use crate::training::losses::{adversarial_loss, discriminator_loss, generator_loss};
use crate::utils::HParams;

/// Optimizer index selecting the generator step
pub const OPTIMIZER_GENERATOR: i64 = 0;
/// Optimizer index selecting the discriminator step
pub const OPTIMIZER_DISCRIMINATOR: i64 = 1;

/// Complete GAN model
pub struct GanModel {
    /// Hyperparameters, immutable once constructed
    pub hparams: HParams,
    /// Generator network
    pub generator: Generator,
    /// Discriminator network
    pub discriminator: Discriminator,
    /// Variable store for generator
    pub gen_vs: VarStore,
    /// Variable store for discriminator
    pub disc_vs: VarStore,
    /// Device (CPU/GPU)
    pub device: Device,
    /// Images produced by the latest generator step, consumed by the
    /// following discriminator step. Overwritten every generator step.
    generated_imgs: Option<Tensor>,
}

impl GanModel {
    /// Create a new GAN model
    pub fn new(hparams: HParams, device: Device) -> Self {
        let (channels, width, height) = hparams.img_dim();

        let gen_config = GeneratorConfig {
            latent_dim: hparams.latent_dim,
            channels,
            width,
            height,
        };
        let disc_config = DiscriminatorConfig {
            channels,
            width,
            height,
        };

        let gen_vs = VarStore::new(device);
        let disc_vs = VarStore::new(device);

        let generator = Generator::new(&gen_vs.root(), gen_config);
        let discriminator = Discriminator::new(&disc_vs.root(), disc_config);

        Self {
            hparams,
            generator,
            discriminator,
            gen_vs,
            disc_vs,
            device,
            generated_imgs: None,
        }
    }

    /// Inference: synthesize images from noise
    pub fn forward(&self, noise: &Tensor) -> Tensor {
        self.generator.generate(noise)
    }

    /// Generate `num_samples` images from fresh noise
    pub fn generate(&self, num_samples: i64) -> Tensor {
        self.generator.generate_random(num_samples, self.device)
    }

    /// Generator training step
    ///
    /// Draws noise of shape (batch_size, latent_dim), synthesizes images,
    /// caches them for the next discriminator step and returns the BCE
    /// loss of the discriminator's output against an all-ones target.
    pub fn generator_step(&mut self, real_images: &Tensor) -> Tensor {
        let batch_size = real_images.size()[0];
        let noise = Tensor::randn([batch_size, self.hparams.latent_dim], (Kind::Float, self.device));

        let fake_images = self.generator.forward_t(&noise, true);
        self.generated_imgs = Some(fake_images.shallow_clone());

        let fake_logits = self.discriminator.forward_t(&fake_images, true);
        generator_loss(&fake_logits)
    }

    /// Discriminator training step
    ///
    /// Scores the real batch against ones and the cached generated batch
    /// (detached, so no gradients reach the generator) against zeros, and
    /// returns the mean of the two cross-entropy terms.
    ///
    /// Errors if no generator step has run yet: there is nothing to
    /// discriminate against.
    pub fn discriminator_step(&mut self, real_images: &Tensor) -> Result<Tensor> {
        let fake_images = match &self.generated_imgs {
            Some(imgs) => imgs.detach(),
            None => bail!("discriminator step requires a preceding generator step"),
        };

        let real_logits = self.discriminator.forward_t(real_images, true);
        let fake_logits = self.discriminator.forward_t(&fake_images, true);

        Ok(discriminator_loss(&real_logits, &fake_logits))
    }

    /// Per-batch training-step dispatch
    ///
    /// The optimizer index is supplied by the training loop: 0 runs the
    /// generator step, 1 the discriminator step. Labels travel with the
    /// batch but are discarded.
    pub fn training_step(&mut self, batch: &(Tensor, Tensor), optimizer_idx: i64) -> Result<Tensor> {
        let (images, _labels) = batch;

        match optimizer_idx {
            OPTIMIZER_GENERATOR => Ok(self.generator_step(images)),
            OPTIMIZER_DISCRIMINATOR => self.discriminator_step(images),
            other => bail!("invalid optimizer index: {}", other),
        }
    }

    /// Validation step: both losses on a batch, no gradients
    ///
    /// Returns (generator loss, discriminator loss) as plain floats.
    pub fn validation_step(&self, batch: &(Tensor, Tensor)) -> (f64, f64) {
        let (images, _labels) = batch;

        tch::no_grad(|| {
            let batch_size = images.size()[0];
            let noise =
                Tensor::randn([batch_size, self.hparams.latent_dim], (Kind::Float, self.device));
            let fake_images = self.generator.forward_t(&noise, false);

            let fake_logits = self.discriminator.forward_t(&fake_images, false);
            let real_logits = self.discriminator.forward_t(images, false);

            let g_loss = generator_loss(&fake_logits).double_value(&[]);
            let d_loss = discriminator_loss(&real_logits, &fake_logits).double_value(&[]);
            (g_loss, d_loss)
        })
    }

    /// Configure the two optimizers
    ///
    /// Independent Adam instances, one per sub-model, sharing the
    /// learning-rate and momentum-decay hyperparameters.
    pub fn configure_optimizers(&self) -> Result<(nn::Optimizer, nn::Optimizer)> {
        let adam = nn::Adam {
            beta1: self.hparams.b1,
            beta2: self.hparams.b2,
            ..Default::default()
        };

        let gen_opt = adam.build(&self.gen_vs, self.hparams.learning_rate)?;
        let disc_opt = adam.build(&self.disc_vs, self.hparams.learning_rate)?;
        Ok((gen_opt, disc_opt))
    }

    /// The image batch cached by the latest generator step, if any
    pub fn cached_images(&self) -> Option<&Tensor> {
        self.generated_imgs.as_ref()
    }

    /// Latent dimension
    pub fn latent_dim(&self) -> i64 {
        self.hparams.latent_dim
    }

    /// Image dimensions as (channels, width, height)
    pub fn img_dim(&self) -> (i64, i64, i64) {
        self.hparams.img_dim()
    }

    /// Compute the raw adversarial loss of discriminator output vs target
    pub fn adversarial_loss(&self, logits: &Tensor, targets: &Tensor) -> Tensor {
        adversarial_loss(logits, targets)
    }

    /// Save model weights
    pub fn save(&self, gen_path: &str, disc_path: &str) -> Result<()> {
        self.gen_vs.save(gen_path)?;
        self.disc_vs.save(disc_path)?;
        Ok(())
    }

    /// Load model weights
    pub fn load(&mut self, gen_path: &str, disc_path: &str) -> Result<()> {
        self.gen_vs.load(gen_path)?;
        self.disc_vs.load(disc_path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dummy_batch(n: i64) -> (Tensor, Tensor) {
        let images = Tensor::randn([n, 1, 28, 28], (Kind::Float, Device::Cpu));
        let labels = Tensor::zeros([n], (Kind::Int64, Device::Cpu));
        (images, labels)
    }

    #[test]
    fn test_gan_creation() {
        let gan = GanModel::new(HParams::default(), Device::Cpu);

        assert_eq!(gan.latent_dim(), 32);
        assert_eq!(gan.img_dim(), (1, 28, 28));
        assert!(gan.cached_images().is_none());
    }

    #[test]
    fn test_generator_step_caches_images() {
        let mut gan = GanModel::new(HParams::default(), Device::Cpu);
        let (images, _) = dummy_batch(4);

        let loss = gan.generator_step(&images);

        assert_eq!(loss.size(), vec![]);
        let cached = gan.cached_images().expect("generator step must cache images");
        assert_eq!(cached.size(), vec![4, 1, 28, 28]);
    }

    #[test]
    fn test_discriminator_step_requires_cache() {
        let mut gan = GanModel::new(HParams::default(), Device::Cpu);
        let (images, _) = dummy_batch(4);

        assert!(gan.discriminator_step(&images).is_err());
    }

    #[test]
    fn test_training_step_dispatch() {
        let mut gan = GanModel::new(HParams::default(), Device::Cpu);
        let batch = dummy_batch(4);

        let g_loss = gan.training_step(&batch, OPTIMIZER_GENERATOR).unwrap();
        assert_eq!(g_loss.size(), vec![]);

        let d_loss = gan.training_step(&batch, OPTIMIZER_DISCRIMINATOR).unwrap();
        assert_eq!(d_loss.size(), vec![]);
        assert!(d_loss.double_value(&[]) > 0.0);

        assert!(gan.training_step(&batch, 2).is_err());
    }

    #[test]
    fn test_generate() {
        let gan = GanModel::new(HParams::default(), Device::Cpu);

        let samples = gan.generate(3);
        assert_eq!(samples.size(), vec![3, 1, 28, 28]);
    }

    #[test]
    fn test_configure_optimizers() {
        let gan = GanModel::new(HParams::default(), Device::Cpu);
        assert!(gan.configure_optimizers().is_ok());
    }

    #[test]
    fn test_validation_step() {
        let mut gan = GanModel::new(HParams::default(), Device::Cpu);
        let batch = dummy_batch(4);

        // Run one generator step so batch norm sees data first
        let _ = gan.generator_step(&batch.0);

        let (g_loss, d_loss) = gan.validation_step(&batch);
        assert!(g_loss > 0.0);
        assert!(d_loss > 0.0);
    }
}
