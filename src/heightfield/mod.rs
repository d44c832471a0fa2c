//! Per-cell elevation synthesis from biome labels.
//!
//! Heights are a pure function of grid coordinate, biome label, and
//! configuration: plains and forest ride a smooth noise layer, mountains
//! use a ridged accumulation, and water biomes hold fixed depths.

use serde::{Deserialize, Serialize};

use crate::grid::{BiomeType, Terrain};
use crate::noise::NoiseField;

/// Configuration for the biome height formulas.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeightConfig {
    /// Baseline land elevation added to every land formula.
    pub base_height: f32,
    /// Coordinate scale for the plains/forest/lowlands noise layer.
    pub plains_scale: f64,
    /// Octave count for the mountain ridged accumulation.
    pub octaves: u32,
    /// Amplitude decay per octave.
    pub persistence: f32,
    /// Frequency multiplier per octave. The ridged accumulation keeps its
    /// sample coordinate fixed, so this only matters to hosts that layer
    /// extra octave stacks on top of the generated field.
    pub lacunarity: f32,
    /// Elevation drop applied to lowlands relative to plains.
    pub lowlands_drop: f32,
}

impl Default for HeightConfig {
    fn default() -> Self {
        Self {
            base_height: 2.0,
            plains_scale: 2.0,
            octaves: 5,
            persistence: 0.5,
            lacunarity: 2.0,
            lowlands_drop: 0.35,
        }
    }
}

/// Elevation constants for the water and shoreline biomes.
///
/// Deep water sits below shallow water, which sits below the beach, which
/// sits below the land baseline.
pub const DEEP_OCEAN_HEIGHT: f32 = -1.0;
pub const SHALLOW_OCEAN_HEIGHT: f32 = -0.25;
pub const BEACH_HEIGHT: f32 = 0.15;

/// Pure per-cell height evaluator bound to a grid extent.
pub struct HeightField<'a> {
    cfg: &'a HeightConfig,
    noise: &'a NoiseField,
    x_size: u32,
    z_size: u32,
}

impl<'a> HeightField<'a> {
    pub fn new(cfg: &'a HeightConfig, noise: &'a NoiseField, x_size: u32, z_size: u32) -> Self {
        Self {
            cfg,
            noise,
            x_size,
            z_size,
        }
    }

    /// Computes the elevation for a cell given its biome label.
    ///
    /// Pure: identical inputs (and noise offsets) yield identical output.
    pub fn compute(&self, x: u32, z: u32, biome: BiomeType) -> f32 {
        match biome {
            BiomeType::Plains => self.cfg.base_height + self.land_noise(x, z),
            BiomeType::Lowlands => {
                self.cfg.base_height - self.cfg.lowlands_drop + self.land_noise(x, z)
            }
            BiomeType::Forest => self.cfg.base_height + 1.0 + self.land_noise(x, z),
            BiomeType::Mountains => self.ridged(x, z),
            BiomeType::DeepOcean | BiomeType::River => DEEP_OCEAN_HEIGHT,
            BiomeType::ShallowOcean => SHALLOW_OCEAN_HEIGHT,
            BiomeType::Beach => BEACH_HEIGHT,
        }
    }

    fn land_noise(&self, x: u32, z: u32) -> f32 {
        let nx = x as f64 / self.x_size as f64 * self.cfg.plains_scale;
        let nz = z as f64 / self.z_size as f64 * self.cfg.plains_scale;
        self.noise.sample(nx, nz)
    }

    /// Ridged accumulation for mountain cells.
    ///
    /// The sample coordinate stays fixed across octaves; the octave index
    /// modulates amplitude only, so the ridge term accentuates the same
    /// peak line each iteration.
    fn ridged(&self, x: u32, z: u32) -> f32 {
        let nx = x as f64 / self.x_size as f64;
        let nz = z as f64 / self.z_size as f64;
        let n = self.noise.sample(nx, nz);
        let ridge = (2.0 * n - 1.0).abs();

        let mut height = self.cfg.base_height;
        for i in 0..self.cfg.octaves {
            let amplitude = self.cfg.persistence.powi(i as i32);
            height += ridge + n * amplitude;
        }
        height + 2.0
    }
}

/// Computes and stores the elevation of every cell from its biome label.
///
/// Called once after classification; rivers and smoothing mutate the
/// result afterwards.
pub fn build_heightmap(terrain: &mut Terrain, cfg: &HeightConfig, noise: &NoiseField) {
    let field = HeightField::new(cfg, noise, terrain.x_size(), terrain.z_size());
    for z in 0..=terrain.z_size() {
        for x in 0..=terrain.x_size() {
            let h = field.compute(x, z, terrain.biome(x, z));
            terrain.set_height(x, z, h);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn fixed_field() -> NoiseField {
        NoiseField::with_offsets(42, 1234.5, 6789.0)
    }

    #[test]
    fn test_compute_is_pure() {
        let cfg = HeightConfig::default();
        let noise = fixed_field();
        let field = HeightField::new(&cfg, &noise, 50, 50);

        for biome in [
            BiomeType::Plains,
            BiomeType::Forest,
            BiomeType::Mountains,
            BiomeType::Lowlands,
        ] {
            let a = field.compute(17, 23, biome);
            let b = field.compute(17, 23, biome);
            assert_eq!(a, b, "compute must be pure for {:?}", biome);
            assert!(a.is_finite());
        }
    }

    #[test]
    fn test_water_heights_are_constant() {
        let cfg = HeightConfig::default();
        let noise = fixed_field();
        let field = HeightField::new(&cfg, &noise, 50, 50);

        assert_eq!(field.compute(3, 3, BiomeType::DeepOcean), -1.0);
        assert_eq!(field.compute(3, 3, BiomeType::River), -1.0);
        assert_eq!(field.compute(3, 3, BiomeType::ShallowOcean), -0.25);
        assert_eq!(field.compute(3, 3, BiomeType::Beach), 0.15);
    }

    #[test]
    fn test_water_ordering() {
        assert!(DEEP_OCEAN_HEIGHT < SHALLOW_OCEAN_HEIGHT);
        assert!(SHALLOW_OCEAN_HEIGHT < BEACH_HEIGHT);
        assert!(BEACH_HEIGHT < HeightConfig::default().base_height);
    }

    #[test]
    fn test_forest_sits_one_above_plains() {
        let cfg = HeightConfig::default();
        let noise = fixed_field();
        let field = HeightField::new(&cfg, &noise, 80, 80);

        let plains = field.compute(40, 12, BiomeType::Plains);
        let forest = field.compute(40, 12, BiomeType::Forest);
        assert_relative_eq!(forest - plains, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_lowlands_drop_below_plains() {
        let cfg = HeightConfig::default();
        let noise = fixed_field();
        let field = HeightField::new(&cfg, &noise, 80, 80);

        let plains = field.compute(22, 61, BiomeType::Plains);
        let lowlands = field.compute(22, 61, BiomeType::Lowlands);
        assert_relative_eq!(plains - lowlands, cfg.lowlands_drop, epsilon = 1e-6);
    }

    #[test]
    fn test_mountains_clear_the_land_baseline() {
        let cfg = HeightConfig::default();
        let noise = fixed_field();
        let field = HeightField::new(&cfg, &noise, 64, 64);

        // Ridge and noise terms are non-negative, so the accumulation can
        // never dip below base + 2.
        for (x, z) in [(5, 5), (30, 11), (63, 63), (0, 40)] {
            let h = field.compute(x, z, BiomeType::Mountains);
            assert!(h >= cfg.base_height + 2.0, "mountain height {} too low", h);
        }
    }

    #[test]
    fn test_build_heightmap_covers_grid() {
        let mut terrain = Terrain::new(16, 16, 3).unwrap();
        for z in 0..=16 {
            for x in 0..=8 {
                terrain.set_biome(x, z, BiomeType::DeepOcean);
            }
        }
        let cfg = HeightConfig::default();
        let noise = fixed_field();
        build_heightmap(&mut terrain, &cfg, &noise);

        assert_eq!(terrain.height(4, 4), -1.0);
        assert!(terrain.height(12, 4) >= cfg.base_height);
        assert!(terrain.heights().iter().all(|h| h.is_finite()));
    }
}
