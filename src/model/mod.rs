//! GAN model module
//!
//! Contains the Generator and Discriminator networks and the wrapper
//! that exposes the adversarial training-step dispatch.

pub mod discriminator;
pub mod gan;
pub mod generator;

pub use discriminator::{Discriminator, DiscriminatorConfig};
pub use gan::{GanModel, OPTIMIZER_DISCRIMINATOR, OPTIMIZER_GENERATOR};
pub use generator::{Generator, GeneratorConfig};
