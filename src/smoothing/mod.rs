//! Height smoothing over biome transitions.
//!
//! A single in-place pass over the grid averages each cell against its
//! eight neighbors. Beach cells use a tight unweighted regime so the
//! shoreline step stays crisp; every other biome blends neighbors whose
//! height difference falls inside a configurable transition range, scaled
//! by a smoothing strength.

use serde::{Deserialize, Serialize};

use crate::grid::{BiomeType, Terrain};

/// Parameters for the neighbor-averaging pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmoothingConfig {
    /// Maximum height difference a non-beach neighbor may contribute.
    pub transition_range: f32,
    /// Weight applied to contributing non-beach neighbors.
    pub smoothing_strength: f32,
    /// Initial value of the averaging divisor before neighbors are added.
    pub neighbor_count_seed: u32,
    /// Maximum height difference a beach neighbor may contribute.
    pub beach_range: f32,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            transition_range: 5.0,
            smoothing_strength: 1.0,
            neighbor_count_seed: 3,
            beach_range: 1.0,
        }
    }
}

/// Smooths the height map in place, row-major, one pass.
///
/// Cells already processed contribute their smoothed heights to later
/// cells; the pass is sequential by construction.
pub fn smooth_terrain(terrain: &mut Terrain, cfg: &SmoothingConfig) {
    for z in 0..=terrain.z_size() {
        for x in 0..=terrain.x_size() {
            let smoothed = smooth_cell(terrain, cfg, x, z);
            terrain.set_height(x, z, smoothed);
        }
    }
}

fn smooth_cell(terrain: &Terrain, cfg: &SmoothingConfig, x: u32, z: u32) -> f32 {
    let center = terrain.height(x, z);
    let is_beach = terrain.biome(x, z) == BiomeType::Beach;
    let (range, strength) = if is_beach {
        (cfg.beach_range, 1.0)
    } else {
        (cfg.transition_range, cfg.smoothing_strength)
    };

    let mut sum = center * cfg.neighbor_count_seed as f32;
    let mut divisor = cfg.neighbor_count_seed as f32;
    for dz in -1i32..=1 {
        for dx in -1i32..=1 {
            if dx == 0 && dz == 0 {
                continue;
            }
            let nx = x as i32 + dx;
            let nz = z as i32 + dz;
            if nx < 0 || nz < 0 || nx > terrain.x_size() as i32 || nz > terrain.z_size() as i32 {
                continue;
            }
            let neighbor = terrain.height(nx as u32, nz as u32);
            if (neighbor - center).abs() <= range {
                sum += neighbor * strength;
                divisor += strength;
            }
        }
    }
    sum / divisor
}
