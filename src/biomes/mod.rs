//! Biome classification: layered noise thresholds plus ring expansion.
//!
//! The initial pass assigns a label per cell from three independently
//! scaled noise samples. Three ring passes then relabel cells near a
//! target biome to build contiguous transition zones (forest around
//! mountains, beach and shallow water around deep ocean).

mod config;

pub use config::BiomeConfig;

use crate::grid::{BiomeType, Terrain};
use crate::noise::NoiseField;

/// Cell counts relevant to downstream stages, reported after classification.
///
/// A map with no deep ocean cannot grow its water rings and gives rivers no
/// terminus; a map with no mountains gives rivers no sources. Callers treat
/// either as a configuration error rather than producing a degenerate map.
#[derive(Debug, Clone, Copy)]
pub struct ClassificationSummary {
    pub mountain_cells: usize,
    pub deep_ocean_cells: usize,
}

/// Classifies every cell of the terrain: initial thresholds, then rings.
pub fn classify_biomes(
    terrain: &mut Terrain,
    cfg: &BiomeConfig,
    field: &NoiseField,
) -> ClassificationSummary {
    initial_pass(terrain, cfg, field);
    expand_rings(terrain, cfg.ring_range);
    ClassificationSummary {
        mountain_cells: terrain.count_biome(BiomeType::Mountains),
        deep_ocean_cells: terrain.count_biome(BiomeType::DeepOcean),
    }
}

/// Assigns the initial biome label per cell from layered noise thresholds.
///
/// Threshold order matters: the plains-layer value decides ocean/plains
/// first, and only cells at or above the plains cut fall through to the
/// forest and mountain layers.
pub fn initial_pass(terrain: &mut Terrain, cfg: &BiomeConfig, field: &NoiseField) {
    let xs = terrain.x_size() as f64;
    let zs = terrain.z_size() as f64;

    for z in 0..=terrain.z_size() {
        for x in 0..=terrain.x_size() {
            let nx = x as f64 / xs;
            let nz = z as f64 / zs;

            let plains_noise = field.sample(nx * cfg.plains_scale, nz * cfg.plains_scale);
            let forest_noise = field.sample(nx * cfg.forest_scale, nz * cfg.forest_scale);
            let mountain_noise = field.sample(nx * cfg.mountain_scale, nz * cfg.mountain_scale);

            let biome = if plains_noise < cfg.deep_ocean_threshold {
                BiomeType::DeepOcean
            } else if plains_noise < cfg.plains_threshold {
                BiomeType::Plains
            } else if forest_noise < cfg.forest_threshold {
                BiomeType::Forest
            } else if mountain_noise < cfg.mountain_threshold {
                BiomeType::Mountains
            } else {
                BiomeType::Plains
            };
            terrain.set_biome(x, z, biome);
        }
    }
}

/// Runs the three ring expansion passes in their fixed order.
///
/// Each pass evaluates proximity against a snapshot of the map taken at
/// pass start, so results are independent of scan order within a pass,
/// while later passes see everything earlier passes wrote.
pub fn expand_rings(terrain: &mut Terrain, range: f32) {
    // Pass 1: forest ring around mountains.
    let snap = terrain.biomes().to_vec();
    for (x, z) in coords(terrain) {
        if snapshot_biome(terrain, &snap, x, z) != BiomeType::Mountains
            && near_in_snapshot(terrain, &snap, x, z, BiomeType::Mountains, range)
        {
            terrain.set_biome(x, z, BiomeType::Forest);
        }
    }

    // Pass 2: beach ring around deep ocean.
    let snap = terrain.biomes().to_vec();
    for (x, z) in coords(terrain) {
        if snapshot_biome(terrain, &snap, x, z) != BiomeType::DeepOcean
            && near_in_snapshot(terrain, &snap, x, z, BiomeType::DeepOcean, range)
        {
            terrain.set_biome(x, z, BiomeType::Beach);
        }
    }

    // Pass 3: shallow water where beach and deep ocean meet.
    let snap = terrain.biomes().to_vec();
    for (x, z) in coords(terrain) {
        if snapshot_biome(terrain, &snap, x, z) != BiomeType::Beach
            && near_in_snapshot(terrain, &snap, x, z, BiomeType::Beach, range)
            && near_in_snapshot(terrain, &snap, x, z, BiomeType::DeepOcean, range)
        {
            terrain.set_biome(x, z, BiomeType::ShallowOcean);
        }
    }
}

fn coords(terrain: &Terrain) -> Vec<(u32, u32)> {
    terrain.vertex_coords().collect()
}

fn snapshot_biome(terrain: &Terrain, snap: &[BiomeType], x: u32, z: u32) -> BiomeType {
    snap[(z * (terrain.x_size() + 1) + x) as usize]
}

/// Inclusive-radius proximity test against a biome snapshot.
///
/// Scans only the window that can contain qualifying cells; equivalent to
/// a full-grid nearest-of-type scan for the `<= range` comparison.
fn near_in_snapshot(
    terrain: &Terrain,
    snap: &[BiomeType],
    x: u32,
    z: u32,
    target: BiomeType,
    range: f32,
) -> bool {
    let r = range.ceil() as i32;
    let range_sq = range * range;
    for dz in -r..=r {
        for dx in -r..=r {
            let nx = x as i32 + dx;
            let nz = z as i32 + dz;
            if nx < 0 || nz < 0 || nx > terrain.x_size() as i32 || nz > terrain.z_size() as i32 {
                continue;
            }
            if snapshot_biome(terrain, snap, nx as u32, nz as u32) != target {
                continue;
            }
            if (dx * dx + dz * dz) as f32 <= range_sq {
                return true;
            }
        }
    }
    false
}
