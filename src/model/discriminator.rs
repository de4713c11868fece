//! Discriminator network
//!
//! The Discriminator classifies images as real or generated.
//! Architecture is a narrowing MLP over the flattened image.

use tch::{nn, nn::Module, nn::ModuleT, Tensor};

/// Discriminator network configuration
#[derive(Debug, Clone)]
pub struct DiscriminatorConfig {
    /// Number of input channels
    pub channels: i64,
    /// Input image width
    pub width: i64,
    /// Input image height
    pub height: i64,
}

impl Default for DiscriminatorConfig {
    fn default() -> Self {
        Self {
            channels: 1,
            width: 28,
            height: 28,
        }
    }
}

impl DiscriminatorConfig {
    /// Total number of scalars per input image
    pub fn img_numel(&self) -> i64 {
        self.channels * self.width * self.height
    }
}

/// Discriminator network
///
/// Architecture:
/// 1. Flatten
/// 2. Two narrowing Linear layers with LeakyReLU
/// 3. Final Linear producing one logit per image
#[derive(Debug)]
pub struct Discriminator {
    config: DiscriminatorConfig,
    fc1: nn::Linear,
    fc2: nn::Linear,
    fc3: nn::Linear,
}

impl Discriminator {
    /// Create a new Discriminator network
    pub fn new(vs: &nn::Path, config: DiscriminatorConfig) -> Self {
        let fc1 = nn::linear(vs / "fc1", config.img_numel(), 512, Default::default());
        let fc2 = nn::linear(vs / "fc2", 512, 256, Default::default());
        let fc3 = nn::linear(vs / "fc3", 256, 1, Default::default());

        Self {
            config,
            fc1,
            fc2,
            fc3,
        }
    }

    /// Forward pass
    ///
    /// # Arguments
    ///
    /// * `input` - Tensor of shape (batch_size, channels, width, height)
    /// * `train` - Whether in training mode
    ///
    /// # Returns
    ///
    /// Tensor of shape (batch_size, 1) with logits (not sigmoid)
    pub fn forward_t(&self, input: &Tensor, _train: bool) -> Tensor {
        let batch_size = input.size()[0];
        let x = input.view([batch_size, -1]);

        let x = self.fc1.forward(&x).leaky_relu();
        let x = self.fc2.forward(&x).leaky_relu();

        self.fc3.forward(&x)
    }

    /// Classify samples (inference mode)
    ///
    /// Returns probability of being real (after sigmoid)
    pub fn classify(&self, input: &Tensor) -> Tensor {
        self.forward_t(input, false).sigmoid()
    }

    /// Get configuration
    pub fn config(&self) -> &DiscriminatorConfig {
        &self.config
    }
}

impl ModuleT for Discriminator {
    fn forward_t(&self, xs: &Tensor, train: bool) -> Tensor {
        Discriminator::forward_t(self, xs, train)
    }
}
