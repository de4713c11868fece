//! Default transform pipeline: channel-wise normalization
//!
//! The vision readers already deliver float tensors in [0, 1]; the default
//! transform subtracts the dataset's fixed per-channel mean and divides by
//! its fixed per-channel standard deviation.

use tch::Tensor;

/// MNIST channel statistics
pub const MNIST_MEAN: [f64; 1] = [0.1307];
pub const MNIST_STD: [f64; 1] = [0.3081];

/// CIFAR-10 channel statistics
pub const CIFAR10_MEAN: [f64; 3] = [0.4914, 0.4822, 0.4465];
pub const CIFAR10_STD: [f64; 3] = [0.2470, 0.2435, 0.2616];

/// Per-channel normalization with fixed statistics
#[derive(Debug, Clone)]
pub struct Normalize {
    mean: Vec<f64>,
    std: Vec<f64>,
}

impl Normalize {
    /// Create a normalization transform from per-channel statistics
    ///
    /// `mean` and `std` must have one entry per image channel.
    pub fn new(mean: &[f64], std: &[f64]) -> Self {
        assert_eq!(mean.len(), std.len(), "mean and std must match in length");
        Self {
            mean: mean.to_vec(),
            std: std.to_vec(),
        }
    }

    /// MNIST normalization
    pub fn mnist() -> Self {
        Self::new(&MNIST_MEAN, &MNIST_STD)
    }

    /// CIFAR-10 normalization
    pub fn cifar10() -> Self {
        Self::new(&CIFAR10_MEAN, &CIFAR10_STD)
    }

    /// Number of channels this transform expects
    pub fn num_channels(&self) -> i64 {
        self.mean.len() as i64
    }

    /// Apply to a batch of shape (N, C, H, W)
    ///
    /// Statistics broadcast over batch and spatial dimensions.
    pub fn apply(&self, images: &Tensor) -> Tensor {
        let c = self.num_channels();
        let mean = Tensor::from_slice(&self.mean)
            .to_kind(tch::Kind::Float)
            .to_device(images.device())
            .view([1, c, 1, 1]);
        let std = Tensor::from_slice(&self.std)
            .to_kind(tch::Kind::Float)
            .to_device(images.device())
            .view([1, c, 1, 1]);
        (images - mean) / std
    }

    /// Invert the normalization (for visualizing generated samples)
    pub fn invert(&self, images: &Tensor) -> Tensor {
        let c = self.num_channels();
        let mean = Tensor::from_slice(&self.mean)
            .to_kind(tch::Kind::Float)
            .to_device(images.device())
            .view([1, c, 1, 1]);
        let std = Tensor::from_slice(&self.std)
            .to_kind(tch::Kind::Float)
            .to_device(images.device())
            .view([1, c, 1, 1]);
        images * std + mean
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tch::{Device, Kind};

    #[test]
    fn test_normalize_shape_preserved() {
        let norm = Normalize::mnist();
        let images = Tensor::rand([4, 1, 28, 28], (Kind::Float, Device::Cpu));
        let out = norm.apply(&images);
        assert_eq!(out.size(), vec![4, 1, 28, 28]);
    }

    #[test]
    fn test_normalize_values() {
        let norm = Normalize::new(&[0.5], &[0.25]);
        let images = Tensor::full([2, 1, 4, 4], 0.75, (Kind::Float, Device::Cpu));
        let out = norm.apply(&images);

        // (0.75 - 0.5) / 0.25 = 1.0
        let val = out.double_value(&[0, 0, 0, 0]);
        assert!((val - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_normalize_invert_roundtrip() {
        let norm = Normalize::cifar10();
        let images = Tensor::rand([2, 3, 32, 32], (Kind::Float, Device::Cpu));
        let back = norm.invert(&norm.apply(&images));

        let diff = (&back - &images).abs().max().double_value(&[]);
        assert!(diff < 1e-5);
    }
}
