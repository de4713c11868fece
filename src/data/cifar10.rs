//! CIFAR-10 datamodule
//!
//! Wraps the `tch::vision::cifar` reader and produces train/val/test
//! dataloaders with the default normalization transform applied.

use anyhow::Result;
use tch::Tensor;

use super::loader::DataLoader;
use super::split_train_val;
use super::transforms::Normalize;

/// Dataloaders for the CIFAR-10 dataset
///
/// Split policy matches [`MnistDataModule`](super::MnistDataModule): a
/// fixed-size validation tail carved off the training partition.
pub struct Cifar10DataModule {
    train_images: Tensor,
    train_labels: Tensor,
    test_images: Tensor,
    test_labels: Tensor,
    val_split: i64,
}

impl Cifar10DataModule {
    /// Load CIFAR-10 from a directory containing the binary batch files
    pub fn load(data_dir: &str, val_split: i64) -> Result<Self> {
        let c = tch::vision::cifar::load_dir(data_dir)?;
        let transform = Normalize::cifar10();

        // The reader yields (N, 3, 32, 32) floats in [0, 1]
        let train_images = transform.apply(&c.train_images);
        let test_images = transform.apply(&c.test_images);

        let total = train_images.size()[0];
        if val_split < 0 || val_split > total {
            anyhow::bail!(
                "val_split ({}) must fit the training partition ({})",
                val_split,
                total
            );
        }

        Ok(Self::from_tensors(
            train_images,
            c.train_labels,
            test_images,
            c.test_labels,
            val_split,
        ))
    }

    /// Build a datamodule from already-transformed tensors
    pub fn from_tensors(
        train_images: Tensor,
        train_labels: Tensor,
        test_images: Tensor,
        test_labels: Tensor,
        val_split: i64,
    ) -> Self {
        Self {
            train_images,
            train_labels,
            test_images,
            test_labels,
            val_split,
        }
    }

    /// Number of label classes
    pub fn num_classes(&self) -> i64 {
        10
    }

    /// Size of the train subset after the validation split
    pub fn train_len(&self) -> i64 {
        self.train_images.size()[0] - self.val_split
    }

    /// Size of the validation subset
    pub fn val_len(&self) -> i64 {
        self.val_split
    }

    /// Size of the held-out test partition
    pub fn test_len(&self) -> i64 {
        self.test_images.size()[0]
    }

    /// Shuffled loader over the train subset, incomplete batches dropped
    pub fn train_dataloader(&self, batch_size: i64) -> DataLoader {
        let ((images, labels), _) =
            split_train_val(&self.train_images, &self.train_labels, self.val_split);
        DataLoader::new(images, labels, batch_size, true, true)
    }

    /// Unshuffled loader over the validation subset
    pub fn val_dataloader(&self, batch_size: i64) -> DataLoader {
        let (_, (images, labels)) =
            split_train_val(&self.train_images, &self.train_labels, self.val_split);
        DataLoader::new(images, labels, batch_size, false, false)
    }

    /// Unshuffled loader over the test partition, incomplete batches dropped
    pub fn test_dataloader(&self, batch_size: i64) -> DataLoader {
        DataLoader::new(
            self.test_images.shallow_clone(),
            self.test_labels.shallow_clone(),
            batch_size,
            false,
            true,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tch::{Device, Kind};

    fn dummy_module(train: i64, val_split: i64) -> Cifar10DataModule {
        Cifar10DataModule::from_tensors(
            Tensor::zeros([train, 3, 32, 32], (Kind::Float, Device::Cpu)),
            Tensor::zeros([train], (Kind::Int64, Device::Cpu)),
            Tensor::zeros([100, 3, 32, 32], (Kind::Float, Device::Cpu)),
            Tensor::zeros([100], (Kind::Int64, Device::Cpu)),
            val_split,
        )
    }

    #[test]
    fn test_split_sizes_sum_to_partition() {
        let dm = dummy_module(5000, 500);

        assert_eq!(dm.train_len(), 4500);
        assert_eq!(dm.val_len(), 500);
        assert_eq!(dm.train_len() + dm.val_len(), 5000);
    }

    #[test]
    fn test_dataloader_shapes() {
        let dm = dummy_module(256, 64);

        let mut train = dm.train_dataloader(32);
        let (images, labels) = train.next_batch().unwrap();
        assert_eq!(images.size(), vec![32, 3, 32, 32]);
        assert_eq!(labels.size(), vec![32]);
    }

    #[test]
    fn test_val_loader_unshuffled_and_exact() {
        let dm = dummy_module(256, 64);

        let val = dm.val_dataloader(32);
        assert_eq!(val.num_samples(), 64);
        assert_eq!(val.num_batches(), 2);

        // Labels of the validation tail come back in partition order
        let dm = Cifar10DataModule::from_tensors(
            Tensor::zeros([40, 3, 32, 32], (Kind::Float, Device::Cpu)),
            Tensor::arange(40, (Kind::Int64, Device::Cpu)),
            Tensor::zeros([8, 3, 32, 32], (Kind::Float, Device::Cpu)),
            Tensor::zeros([8], (Kind::Int64, Device::Cpu)),
            10,
        );
        let mut val = dm.val_dataloader(5);
        let mut seen = Vec::new();
        while let Some((_, labels)) = val.next_batch() {
            for i in 0..labels.size()[0] {
                seen.push(labels.int64_value(&[i]));
            }
        }
        assert_eq!(seen, (30..40).collect::<Vec<i64>>());
    }

    #[test]
    fn test_test_dataloader_unshuffled_with_drop_last() {
        let dm = Cifar10DataModule::from_tensors(
            Tensor::zeros([20, 3, 32, 32], (Kind::Float, Device::Cpu)),
            Tensor::zeros([20], (Kind::Int64, Device::Cpu)),
            Tensor::zeros([10, 3, 32, 32], (Kind::Float, Device::Cpu)),
            Tensor::arange(10, (Kind::Int64, Device::Cpu)),
            5,
        );

        let mut test = dm.test_dataloader(4);
        assert_eq!(test.num_batches(), 2); // incomplete final batch dropped

        let mut seen = Vec::new();
        while let Some((_, labels)) = test.next_batch() {
            for i in 0..labels.size()[0] {
                seen.push(labels.int64_value(&[i]));
            }
        }
        assert_eq!(seen, (0..8).collect::<Vec<i64>>());
    }
}
