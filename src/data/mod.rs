//! Data loading and preprocessing module
//!
//! Datamodules for MNIST and CIFAR-10 plus the batching primitive that
//! feeds the training loop.

pub mod cifar10;
pub mod loader;
pub mod mnist;
pub mod transforms;

pub use cifar10::Cifar10DataModule;
pub use loader::{DataLoader, DataLoaderIter};
pub use mnist::MnistDataModule;
pub use transforms::Normalize;

use tch::Tensor;

/// Deterministic train/validation split of a training partition
///
/// The first `len - val_split` samples form the train subset, the last
/// `val_split` samples the validation subset. The two sizes always sum to
/// the full partition size.
pub(crate) fn split_train_val(
    images: &Tensor,
    labels: &Tensor,
    val_split: i64,
) -> ((Tensor, Tensor), (Tensor, Tensor)) {
    let total = images.size()[0];
    let train_len = total - val_split;

    let train = (
        images.narrow(0, 0, train_len),
        labels.narrow(0, 0, train_len),
    );
    let val = (
        images.narrow(0, train_len, val_split),
        labels.narrow(0, train_len, val_split),
    );
    (train, val)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tch::{Device, Kind};

    #[test]
    fn test_split_train_val_deterministic() {
        let images = Tensor::arange(10, (Kind::Float, Device::Cpu)).view([10, 1, 1, 1]);
        let labels = Tensor::arange(10, (Kind::Int64, Device::Cpu));

        let ((train_x, _), (val_x, val_y)) = split_train_val(&images, &labels, 3);

        assert_eq!(train_x.size()[0], 7);
        assert_eq!(val_x.size()[0], 3);
        // Validation is the tail of the partition
        assert_eq!(val_y.int64_value(&[0]), 7);
        assert_eq!(val_y.int64_value(&[2]), 9);
    }
}
