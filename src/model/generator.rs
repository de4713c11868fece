//! Generator network
//!
//! The Generator transforms random noise vectors into synthetic images.
//! Architecture is a stack of widening linear blocks with batch norm,
//! finishing in a Tanh and a reshape to image dimensions.

use tch::{nn, nn::Module, nn::ModuleT, Device, Tensor};

/// Generator network configuration
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Size of the latent noise vector
    pub latent_dim: i64,
    /// Number of output channels
    pub channels: i64,
    /// Output image width
    pub width: i64,
    /// Output image height
    pub height: i64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            latent_dim: 32,
            channels: 1,
            width: 28,
            height: 28,
        }
    }
}

impl GeneratorConfig {
    /// Total number of scalars per output image
    pub fn img_numel(&self) -> i64 {
        self.channels * self.width * self.height
    }
}

/// Generator network
///
/// Architecture:
/// 1. Linear from latent space, no normalization
/// 2. Three widening Linear blocks with BatchNorm and LeakyReLU
/// 3. Final Linear to the flattened image size with Tanh activation
#[derive(Debug)]
pub struct Generator {
    config: GeneratorConfig,
    fc1: nn::Linear,
    fc2: nn::Linear,
    bn2: nn::BatchNorm,
    fc3: nn::Linear,
    bn3: nn::BatchNorm,
    fc4: nn::Linear,
    bn4: nn::BatchNorm,
    fc5: nn::Linear,
}

impl Generator {
    /// Create a new Generator network
    pub fn new(vs: &nn::Path, config: GeneratorConfig) -> Self {
        let fc1 = nn::linear(vs / "fc1", config.latent_dim, 128, Default::default());
        let fc2 = nn::linear(vs / "fc2", 128, 256, Default::default());
        let bn2 = nn::batch_norm1d(vs / "bn2", 256, Default::default());
        let fc3 = nn::linear(vs / "fc3", 256, 512, Default::default());
        let bn3 = nn::batch_norm1d(vs / "bn3", 512, Default::default());
        let fc4 = nn::linear(vs / "fc4", 512, 1024, Default::default());
        let bn4 = nn::batch_norm1d(vs / "bn4", 1024, Default::default());
        let fc5 = nn::linear(vs / "fc5", 1024, config.img_numel(), Default::default());

        Self {
            config,
            fc1,
            fc2,
            bn2,
            fc3,
            bn3,
            fc4,
            bn4,
            fc5,
        }
    }

    /// Synthesize images from noise
    ///
    /// # Arguments
    ///
    /// * `noise` - Tensor of shape (batch_size, latent_dim)
    /// * `train` - Whether in training mode (affects batch norm)
    ///
    /// # Returns
    ///
    /// Tensor of shape (batch_size, channels, width, height)
    pub fn forward_t(&self, noise: &Tensor, train: bool) -> Tensor {
        let x = self.fc1.forward(noise).leaky_relu();

        let x = self.fc2.forward(&x);
        let x = self.bn2.forward_t(&x, train).leaky_relu();

        let x = self.fc3.forward(&x);
        let x = self.bn3.forward_t(&x, train).leaky_relu();

        let x = self.fc4.forward(&x);
        let x = self.bn4.forward_t(&x, train).leaky_relu();

        let x = self.fc5.forward(&x).tanh();

        x.view([
            -1,
            self.config.channels,
            self.config.width,
            self.config.height,
        ])
    }

    /// Generate samples (inference mode)
    pub fn generate(&self, noise: &Tensor) -> Tensor {
        self.forward_t(noise, false)
    }

    /// Generate random samples
    pub fn generate_random(&self, num_samples: i64, device: Device) -> Tensor {
        let noise = Tensor::randn(
            [num_samples, self.config.latent_dim],
            (tch::Kind::Float, device),
        );
        self.generate(&noise)
    }

    /// Get configuration
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }
}

impl ModuleT for Generator {
    fn forward_t(&self, xs: &Tensor, train: bool) -> Tensor {
        Generator::forward_t(self, xs, train)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tch::nn::VarStore;

    #[test]
    fn test_generator_output_shape() {
        let vs = VarStore::new(Device::Cpu);
        let config = GeneratorConfig {
            latent_dim: 32,
            channels: 1,
            width: 28,
            height: 28,
        };
        let gen = Generator::new(&vs.root(), config);

        let noise = Tensor::randn([4, 32], (tch::Kind::Float, Device::Cpu));
        let output = gen.generate(&noise);

        assert_eq!(output.size(), vec![4, 1, 28, 28]);
    }

    #[test]
    fn test_generator_output_range() {
        let vs = VarStore::new(Device::Cpu);
        let gen = Generator::new(&vs.root(), GeneratorConfig::default());

        let output = gen.generate_random(2, Device::Cpu);

        // Tanh output stays in [-1, 1]
        let min_val: f64 = output.min().double_value(&[]);
        let max_val: f64 = output.max().double_value(&[]);
        assert!(min_val >= -1.0 && max_val <= 1.0);
    }

    #[test]
    fn test_generator_rgb_shape() {
        let vs = VarStore::new(Device::Cpu);
        let config = GeneratorConfig {
            latent_dim: 100,
            channels: 3,
            width: 32,
            height: 32,
        };
        let gen = Generator::new(&vs.root(), config);

        let output = gen.generate_random(2, Device::Cpu);
        assert_eq!(output.size(), vec![2, 3, 32, 32]);
    }
}
