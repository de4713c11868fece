//! DataLoader for batching and iterating over training data
//!
//! Provides batching for GAN training with support for:
//! - Random shuffling
//! - Drop last incomplete batch
//! - Iteration over (images, labels) batches

use rand::seq::SliceRandom;
use tch::Tensor;

/// DataLoader for iterating over batched image data
///
/// Holds the full split as a pair of tensors: images of shape
/// (num_samples, channels, height, width) and labels of shape
/// (num_samples,). The training logic discards labels, but they travel
/// with each batch the way the underlying datasets provide them.
pub struct DataLoader {
    /// Images of shape (num_samples, channels, height, width)
    images: Tensor,
    /// Labels of shape (num_samples,)
    labels: Tensor,
    /// Batch size
    batch_size: i64,
    /// Whether to shuffle data each epoch
    shuffle: bool,
    /// Whether to drop the last incomplete batch
    drop_last: bool,
    /// Current indices for iteration
    indices: Vec<i64>,
    /// Current position in iteration
    current_idx: usize,
}

impl DataLoader {
    /// Create a new DataLoader
    ///
    /// # Arguments
    ///
    /// * `images` - Tensor of shape (num_samples, channels, height, width)
    /// * `labels` - Tensor of shape (num_samples,)
    /// * `batch_size` - Number of images per batch
    /// * `shuffle` - Whether to shuffle data each epoch
    /// * `drop_last` - Whether to drop incomplete final batch
    pub fn new(images: Tensor, labels: Tensor, batch_size: i64, shuffle: bool, drop_last: bool) -> Self {
        let num_samples = images.size()[0];
        let indices: Vec<i64> = (0..num_samples).collect();

        let mut loader = Self {
            images,
            labels,
            batch_size,
            shuffle,
            drop_last,
            indices,
            current_idx: 0,
        };

        if shuffle {
            loader.shuffle_indices();
        }

        loader
    }

    /// Get the number of batches per epoch
    pub fn num_batches(&self) -> usize {
        let num_samples = self.num_samples();
        let batch = self.batch_size as usize;
        if self.drop_last {
            num_samples / batch
        } else {
            (num_samples + batch - 1) / batch
        }
    }

    /// Get total number of samples
    pub fn num_samples(&self) -> usize {
        self.images.size()[0] as usize
    }

    /// Batch size
    pub fn batch_size(&self) -> i64 {
        self.batch_size
    }

    /// Shuffle indices for a new epoch
    fn shuffle_indices(&mut self) {
        let mut rng = rand::thread_rng();
        self.indices.shuffle(&mut rng);
    }

    /// Reset for new epoch
    pub fn reset(&mut self) {
        self.current_idx = 0;
        if self.shuffle {
            self.shuffle_indices();
        }
    }

    /// Get next batch of (images, labels)
    ///
    /// Returns None when the epoch is complete.
    pub fn next_batch(&mut self) -> Option<(Tensor, Tensor)> {
        let num_samples = self.indices.len();
        let start = self.current_idx;

        if start >= num_samples {
            return None;
        }

        let end = (start + self.batch_size as usize).min(num_samples);
        let actual_batch_size = end - start;

        // Skip incomplete batch if drop_last
        if self.drop_last && actual_batch_size < self.batch_size as usize {
            return None;
        }

        let idx = Tensor::from_slice(&self.indices[start..end]).to_device(self.images.device());
        let images = self.images.index_select(0, &idx);
        let labels = self.labels.index_select(0, &idx);

        self.current_idx = end;
        Some((images, labels))
    }

    /// Iterate over all batches (resets first)
    pub fn iter(&mut self) -> DataLoaderIter<'_> {
        self.reset();
        DataLoaderIter { loader: self }
    }
}

/// Iterator adapter for DataLoader
pub struct DataLoaderIter<'a> {
    loader: &'a mut DataLoader,
}

impl Iterator for DataLoaderIter<'_> {
    type Item = (Tensor, Tensor);

    fn next(&mut self) -> Option<Self::Item> {
        self.loader.next_batch()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tch::{Device, Kind};

    fn dummy_split(n: i64) -> (Tensor, Tensor) {
        let images = Tensor::zeros([n, 1, 8, 8], (Kind::Float, Device::Cpu));
        let labels = Tensor::zeros([n], (Kind::Int64, Device::Cpu));
        (images, labels)
    }

    #[test]
    fn test_dataloader_basic() {
        let (images, labels) = dummy_split(10);
        let mut loader = DataLoader::new(images, labels, 3, false, false);

        assert_eq!(loader.num_batches(), 4); // ceil(10/3) = 4
        assert_eq!(loader.num_samples(), 10);

        let mut batch_count = 0;
        while let Some((images, labels)) = loader.next_batch() {
            batch_count += 1;
            if batch_count < 4 {
                assert_eq!(images.size()[0], 3);
            } else {
                assert_eq!(images.size()[0], 1); // Last batch has 1 sample
            }
            assert_eq!(images.size()[0], labels.size()[0]);
        }
        assert_eq!(batch_count, 4);
    }

    #[test]
    fn test_dataloader_drop_last() {
        let (images, labels) = dummy_split(10);
        let mut loader = DataLoader::new(images, labels, 3, false, true);

        assert_eq!(loader.num_batches(), 3); // floor(10/3) = 3

        let mut batch_count = 0;
        while let Some((images, _)) = loader.next_batch() {
            batch_count += 1;
            assert_eq!(images.size()[0], 3);
        }
        assert_eq!(batch_count, 3);
    }

    #[test]
    fn test_dataloader_iter() {
        let (images, labels) = dummy_split(10);
        let mut loader = DataLoader::new(images, labels, 5, false, true);

        let batches: Vec<_> = loader.iter().collect();
        assert_eq!(batches.len(), 2);
    }

    #[test]
    fn test_dataloader_batch_shape() {
        let (images, labels) = dummy_split(6);
        let mut loader = DataLoader::new(images, labels, 2, true, true);

        let (batch, _) = loader.next_batch().unwrap();
        assert_eq!(batch.size(), vec![2, 1, 8, 8]);
    }
}
