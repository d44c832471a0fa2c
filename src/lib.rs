//! Procedural terrain generator.
//!
//! This crate generates landscapes over a 2D vertex grid: biome
//! classification from layered noise, per-biome height synthesis, river
//! carving toward the ocean, transition smoothing, and blue-noise tree
//! placement in forests.

pub mod biomes;
pub mod export;
pub mod grid;
pub mod heightfield;
pub mod noise;
pub mod pipeline;
pub mod rivers;
pub mod sampling;
pub mod smoothing;

pub use biomes::{classify_biomes, BiomeConfig};
pub use grid::{BiomeType, Terrain};
pub use heightfield::{build_heightmap, HeightConfig};
pub use noise::NoiseField;
pub use pipeline::{standard_pipeline, GenerationStage, Pipeline, PipelineError};
pub use rivers::{RiverConfig, RiverEngine};
pub use sampling::generate_forest_points;
pub use smoothing::{smooth_terrain, SmoothingConfig};
