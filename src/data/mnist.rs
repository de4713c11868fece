//! MNIST datamodule
//!
//! Wraps the `tch::vision::mnist` reader and produces train/val/test
//! dataloaders with the default normalization transform applied.

use anyhow::Result;
use tch::Tensor;

use super::loader::DataLoader;
use super::split_train_val;
use super::transforms::Normalize;

/// Dataloaders for the MNIST dataset
///
/// The training partition is split deterministically: the first
/// `len - val_split` samples train, the last `val_split` samples validate.
pub struct MnistDataModule {
    train_images: Tensor,
    train_labels: Tensor,
    test_images: Tensor,
    test_labels: Tensor,
    val_split: i64,
}

impl MnistDataModule {
    /// Load MNIST from a directory containing the raw idx files
    ///
    /// Expects `train-images-idx3-ubyte`, `train-labels-idx1-ubyte`,
    /// `t10k-images-idx3-ubyte` and `t10k-labels-idx1-ubyte` under
    /// `data_dir`. Downloading them is out of scope.
    pub fn load(data_dir: &str, val_split: i64) -> Result<Self> {
        let m = tch::vision::mnist::load_dir(data_dir)?;
        let transform = Normalize::mnist();

        // The reader yields flattened (N, 784) floats in [0, 1]
        let train_images = transform.apply(&m.train_images.view([-1, 1, 28, 28]));
        let test_images = transform.apply(&m.test_images.view([-1, 1, 28, 28]));

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
            m.train_labels,
            test_images,
            m.test_labels,
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

    fn dummy_module(train: i64, test: i64, val_split: i64) -> MnistDataModule {
        MnistDataModule::from_tensors(
            Tensor::zeros([train, 1, 28, 28], (Kind::Float, Device::Cpu)),
            Tensor::zeros([train], (Kind::Int64, Device::Cpu)),
            Tensor::zeros([test, 1, 28, 28], (Kind::Float, Device::Cpu)),
            Tensor::zeros([test], (Kind::Int64, Device::Cpu)),
            val_split,
        )
    }

    #[test]
    fn test_split_sizes_sum_to_partition() {
        let dm = dummy_module(6000, 1000, 500);

        assert_eq!(dm.train_len(), 5500);
        assert_eq!(dm.val_len(), 500);
        assert_eq!(dm.train_len() + dm.val_len(), 6000);
        assert_eq!(dm.test_len(), 1000);
    }

    #[test]
    fn test_val_size_fixed_regardless_of_total() {
        let small = dummy_module(1200, 200, 500);
        let large = dummy_module(8000, 200, 500);

        assert_eq!(small.val_len(), 500);
        assert_eq!(large.val_len(), 500);
        assert_eq!(small.train_len(), 700);
        assert_eq!(large.train_len(), 7500);
    }

    #[test]
    fn test_dataloader_shapes() {
        let dm = dummy_module(128, 64, 32);

        let mut train = dm.train_dataloader(16);
        let (images, labels) = train.next_batch().unwrap();
        assert_eq!(images.size(), vec![16, 1, 28, 28]);
        assert_eq!(labels.size(), vec![16]);

        let val = dm.val_dataloader(16);
        assert_eq!(val.num_samples(), 32);
    }

    fn collect_labels(loader: &mut DataLoader) -> Vec<i64> {
        let mut seen = Vec::new();
        while let Some((_, labels)) = loader.next_batch() {
            for i in 0..labels.size()[0] {
                seen.push(labels.int64_value(&[i]));
            }
        }
        seen
    }

    #[test]
    fn test_test_dataloader_unshuffled_with_drop_last() {
        // Labels mark each sample's position in the partition
        let dm = MnistDataModule::from_tensors(
            Tensor::zeros([32, 1, 28, 28], (Kind::Float, Device::Cpu)),
            Tensor::zeros([32], (Kind::Int64, Device::Cpu)),
            Tensor::zeros([10, 1, 28, 28], (Kind::Float, Device::Cpu)),
            Tensor::arange(10, (Kind::Int64, Device::Cpu)),
            8,
        );

        let mut test = dm.test_dataloader(4);
        assert_eq!(test.num_samples(), 10);
        assert_eq!(test.num_batches(), 2); // incomplete final batch dropped

        // Iteration preserves partition order
        assert_eq!(collect_labels(&mut test), (0..8).collect::<Vec<i64>>());
    }

    #[test]
    fn test_only_train_loader_shuffles() {
        let dm = MnistDataModule::from_tensors(
            Tensor::zeros([64, 1, 28, 28], (Kind::Float, Device::Cpu)),
            Tensor::arange(64, (Kind::Int64, Device::Cpu)),
            Tensor::zeros([8, 1, 28, 28], (Kind::Float, Device::Cpu)),
            Tensor::zeros([8], (Kind::Int64, Device::Cpu)),
            16,
        );

        // Validation loader walks the tail of the partition in order
        let mut val = dm.val_dataloader(8);
        assert_eq!(collect_labels(&mut val), (48..64).collect::<Vec<i64>>());

        // Train loader sees every train sample exactly once, permuted
        let mut train = dm.train_dataloader(8);
        let seen = collect_labels(&mut train);
        let identity: Vec<i64> = (0..48).collect();
        assert_ne!(seen, identity);

        let mut sorted = seen;
        sorted.sort_unstable();
        assert_eq!(sorted, identity);
    }
}
