//! Loss functions for GAN training
//!
//! Implements the binary cross-entropy adversarial losses for generator
//! and discriminator.

use tch::Tensor;

/// Adversarial loss: binary cross-entropy of logits against a target
pub fn adversarial_loss(logits: &Tensor, targets: &Tensor) -> Tensor {
    logits.binary_cross_entropy_with_logits::<Tensor>(targets, None, None, tch::Reduction::Mean)
}

/// Generator loss: -log(D(G(z)))
///
/// The generator wants the discriminator to output 1 (real) for generated
/// samples, so the targets are all ones.
///
/// # Arguments
///
/// * `fake_logits` - Discriminator output on generated samples (logits)
///
/// # Returns
///
/// Scalar loss tensor
pub fn generator_loss(fake_logits: &Tensor) -> Tensor {
    let targets = Tensor::ones_like(fake_logits);
    adversarial_loss(fake_logits, &targets)
}

/// Discriminator loss: mean of the real-vs-ones and fake-vs-zeros terms
///
/// How well can the discriminator label real samples as real, and
/// generated samples as fake? The two cross-entropy terms are averaged.
///
/// # Arguments
///
/// * `real_logits` - Discriminator output on real samples (logits)
/// * `fake_logits` - Discriminator output on generated samples (logits)
///
/// # Returns
///
/// Scalar loss tensor
pub fn discriminator_loss(real_logits: &Tensor, fake_logits: &Tensor) -> Tensor {
    let real_targets = Tensor::ones_like(real_logits);
    let real_loss = adversarial_loss(real_logits, &real_targets);

    let fake_targets = Tensor::zeros_like(fake_logits);
    let fake_loss = adversarial_loss(fake_logits, &fake_targets);

    (real_loss + fake_loss) / 2.0
}
