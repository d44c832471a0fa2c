//! Biome classification configuration.

use serde::{Deserialize, Serialize};

/// Scales and thresholds for the initial classification and ring passes.
///
/// The three noise layers are sampled at normalized grid coordinates
/// multiplied by the respective scale; thresholds apply in fixed priority
/// order (deep ocean, plains, forest, mountains, plains fallback).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BiomeConfig {
    /// Coordinate scale for the plains/ocean noise layer.
    pub plains_scale: f64,
    /// Coordinate scale for the forest noise layer.
    pub forest_scale: f64,
    /// Coordinate scale for the mountain noise layer.
    pub mountain_scale: f64,

    /// Plains-layer noise below this is deep ocean.
    pub deep_ocean_threshold: f32,
    /// Plains-layer noise below this (and above the ocean cut) is plains.
    pub plains_threshold: f32,
    /// Forest-layer noise below this is forest.
    pub forest_threshold: f32,
    /// Mountain-layer noise below this is mountains.
    pub mountain_threshold: f32,

    /// Inclusive Euclidean radius for the ring expansion passes.
    pub ring_range: f32,
}

impl Default for BiomeConfig {
    fn default() -> Self {
        Self {
            plains_scale: 2.0,
            forest_scale: 1.0,
            mountain_scale: 15.0,

            deep_ocean_threshold: 0.4,
            plains_threshold: 0.6,
            forest_threshold: 0.4,
            mountain_threshold: 0.5,

            ring_range: 3.0,
        }
    }
}
