//! Additive noise applied after all factors.

pub mod white_noise;

pub use white_noise::{WhiteNoise, WhiteNoiseConfig};
