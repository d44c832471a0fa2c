//! Noise generation module for terrain synthesis.
//!
//! A thin deterministic wrapper over Perlin noise with a seed-derived
//! offset pair shared by every sampling site in a generation run.

mod field;

pub use field::NoiseField;
