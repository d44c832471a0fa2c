//! Terrain grid data structures: biome labels and vertex heights.

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced when constructing a terrain grid.
#[derive(Error, Debug)]
pub enum GridError {
    #[error("Grid dimensions must be positive (got {0}x{1})")]
    InvalidDimensions(u32, u32),
}

/// Categorical terrain classification per grid cell.
///
/// Exactly one label per cell at all times; relabeling overwrites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BiomeType {
    Plains,
    Forest,
    Mountains,
    ShallowOcean,
    DeepOcean,
    River,
    Beach,
    Lowlands,
}

impl BiomeType {
    /// Returns the name of the biome.
    pub fn name(&self) -> &'static str {
        match self {
            BiomeType::Plains => "plains",
            BiomeType::Forest => "forest",
            BiomeType::Mountains => "mountains",
            BiomeType::ShallowOcean => "shallow_ocean",
            BiomeType::DeepOcean => "deep_ocean",
            BiomeType::River => "river",
            BiomeType::Beach => "beach",
            BiomeType::Lowlands => "lowlands",
        }
    }

    /// Traversal cost used during river path growth.
    ///
    /// Water biomes are free (attractive), high ground is expensive
    /// (repulsive), approximating downhill flow without gradient descent.
    pub fn movement_cost(&self) -> f32 {
        match self {
            BiomeType::Beach | BiomeType::ShallowOcean | BiomeType::DeepOcean | BiomeType::River => 0.0,
            BiomeType::Plains | BiomeType::Lowlands => 1.0,
            BiomeType::Forest => 1.5,
            BiomeType::Mountains => 2.0,
        }
    }

    /// RGB preview color for map export.
    pub fn preview_rgb(&self) -> [u8; 3] {
        match self {
            BiomeType::Plains => [130, 180, 90],
            BiomeType::Forest => [40, 120, 60],
            BiomeType::Mountains => [140, 140, 140],
            BiomeType::ShallowOcean => [70, 130, 180],
            BiomeType::DeepOcean => [15, 40, 90],
            BiomeType::River => [60, 110, 200],
            BiomeType::Beach => [220, 205, 140],
            BiomeType::Lowlands => [110, 160, 95],
        }
    }
}

/// A fixed-size rectangular vertex grid holding biome labels and elevations.
///
/// The grid spans `(x_size+1) x (z_size+1)` vertices (inclusive bounds on
/// both axes). Dimensions are immutable after creation; biome labels and
/// heights are mutated by the generation pipeline stages in order and are
/// read-only for downstream consumers once generation completes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Terrain {
    x_size: u32,
    z_size: u32,
    seed: u64,
    biomes: Vec<BiomeType>,
    heights: Vec<f32>,
    /// Accepted river source cells (populated after the river stage).
    #[serde(skip)]
    pub river_sources: Option<Vec<IVec2>>,
}

impl Terrain {
    /// Creates a terrain grid of `(x_size+1) x (z_size+1)` vertices.
    ///
    /// All cells start as `Plains` at height 0.0.
    pub fn new(x_size: u32, z_size: u32, seed: u64) -> Result<Self, GridError> {
        if x_size == 0 || z_size == 0 {
            return Err(GridError::InvalidDimensions(x_size, z_size));
        }
        let count = ((x_size + 1) as usize) * ((z_size + 1) as usize);
        Ok(Self {
            x_size,
            z_size,
            seed,
            biomes: vec![BiomeType::Plains; count],
            heights: vec![0.0; count],
            river_sources: None,
        })
    }

    /// Grid extent along x (vertices run `0..=x_size`).
    pub fn x_size(&self) -> u32 {
        self.x_size
    }

    /// Grid extent along z (vertices run `0..=z_size`).
    pub fn z_size(&self) -> u32 {
        self.z_size
    }

    /// Master random seed for generation.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Total number of vertices in the grid.
    pub fn vertex_count(&self) -> usize {
        self.biomes.len()
    }

    #[inline]
    fn idx(&self, x: u32, z: u32) -> usize {
        debug_assert!(x <= self.x_size && z <= self.z_size);
        (z * (self.x_size + 1) + x) as usize
    }

    /// Returns the biome label at a vertex.
    pub fn biome(&self, x: u32, z: u32) -> BiomeType {
        self.biomes[self.idx(x, z)]
    }

    /// Overwrites the biome label at a vertex.
    pub fn set_biome(&mut self, x: u32, z: u32, biome: BiomeType) {
        let i = self.idx(x, z);
        self.biomes[i] = biome;
    }

    /// Returns the elevation at a vertex.
    pub fn height(&self, x: u32, z: u32) -> f32 {
        self.heights[self.idx(x, z)]
    }

    /// Overwrites the elevation at a vertex.
    pub fn set_height(&mut self, x: u32, z: u32, height: f32) {
        let i = self.idx(x, z);
        self.heights[i] = height;
    }

    /// Row-major biome storage, for snapshotting.
    pub fn biomes(&self) -> &[BiomeType] {
        &self.biomes
    }

    /// Row-major height storage.
    pub fn heights(&self) -> &[f32] {
        &self.heights
    }

    /// True if `p` lies inside `[0, x_size] x [0, z_size]`.
    pub fn in_bounds(&self, p: IVec2) -> bool {
        p.x >= 0 && p.y >= 0 && p.x <= self.x_size as i32 && p.y <= self.z_size as i32
    }

    /// Biome at a signed coordinate. Caller must check `in_bounds` first.
    pub fn biome_at(&self, p: IVec2) -> BiomeType {
        self.biome(p.x as u32, p.y as u32)
    }

    /// Height at a signed coordinate. Caller must check `in_bounds` first.
    pub fn height_at(&self, p: IVec2) -> f32 {
        self.height(p.x as u32, p.y as u32)
    }

    /// Number of cells currently labeled `biome`.
    pub fn count_biome(&self, biome: BiomeType) -> usize {
        self.biomes.iter().filter(|&&b| b == biome).count()
    }

    /// Computes the global min and max height values.
    pub fn height_range(&self) -> (f32, f32) {
        let mut min = f32::MAX;
        let mut max = f32::MIN;
        for &h in &self.heights {
            min = min.min(h);
            max = max.max(h);
        }
        (min, max)
    }

    /// Returns an iterator over all `(x, z)` vertex coordinates.
    pub fn vertex_coords(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        let xs = self.x_size;
        let zs = self.z_size;
        (0..=zs).flat_map(move |z| (0..=xs).map(move |x| (x, z)))
    }

    /// Finds the grid cell labeled `target` closest to `from` (Euclidean).
    ///
    /// Full-grid scan; returns the cell and its distance, or `None` if no
    /// cell carries the label.
    pub fn nearest_biome(&self, from: Vec2, target: BiomeType) -> Option<(IVec2, f32)> {
        let mut best: Option<(IVec2, f32)> = None;
        for z in 0..=self.z_size {
            for x in 0..=self.x_size {
                if self.biome(x, z) != target {
                    continue;
                }
                let p = IVec2::new(x as i32, z as i32);
                let dist = from.distance(p.as_vec2());
                if best.map_or(true, |(_, d)| dist < d) {
                    best = Some((p, dist));
                }
            }
        }
        best
    }

    /// True if some cell labeled `target` lies within `range` (inclusive
    /// Euclidean) of `(x, z)`.
    ///
    /// Equivalent to a full-grid nearest scan for the inclusive-radius test,
    /// but bounded to the window that can contain qualifying cells.
    pub fn is_near_biome(&self, x: u32, z: u32, target: BiomeType, range: f32) -> bool {
        let r = range.ceil() as i32;
        let range_sq = range * range;
        for dz in -r..=r {
            for dx in -r..=r {
                let nx = x as i32 + dx;
                let nz = z as i32 + dz;
                if nx < 0 || nz < 0 || nx > self.x_size as i32 || nz > self.z_size as i32 {
                    continue;
                }
                if self.biome(nx as u32, nz as u32) != target {
                    continue;
                }
                let dist_sq = (dx * dx + dz * dz) as f32;
                if dist_sq <= range_sq {
                    return true;
                }
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terrain_creation() {
        let terrain = Terrain::new(10, 20, 42).unwrap();
        assert_eq!(terrain.x_size(), 10);
        assert_eq!(terrain.z_size(), 20);
        assert_eq!(terrain.seed(), 42);
        assert_eq!(terrain.vertex_count(), 11 * 21);
        assert!(terrain.biomes().iter().all(|&b| b == BiomeType::Plains));
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        assert!(Terrain::new(0, 10, 1).is_err());
        assert!(Terrain::new(10, 0, 1).is_err());
    }

    #[test]
    fn test_get_set() {
        let mut terrain = Terrain::new(8, 8, 1).unwrap();
        terrain.set_biome(3, 5, BiomeType::Mountains);
        terrain.set_height(3, 5, 4.25);
        assert_eq!(terrain.biome(3, 5), BiomeType::Mountains);
        assert_eq!(terrain.height(3, 5), 4.25);
    }

    #[test]
    fn test_in_bounds_inclusive() {
        let terrain = Terrain::new(10, 10, 1).unwrap();
        assert!(terrain.in_bounds(IVec2::new(0, 0)));
        assert!(terrain.in_bounds(IVec2::new(10, 10)));
        assert!(!terrain.in_bounds(IVec2::new(11, 10)));
        assert!(!terrain.in_bounds(IVec2::new(-1, 0)));
    }

    #[test]
    fn test_nearest_biome() {
        let mut terrain = Terrain::new(10, 10, 1).unwrap();
        terrain.set_biome(2, 3, BiomeType::DeepOcean);
        terrain.set_biome(9, 9, BiomeType::DeepOcean);

        let (p, dist) = terrain
            .nearest_biome(Vec2::new(1.0, 3.0), BiomeType::DeepOcean)
            .unwrap();
        assert_eq!(p, IVec2::new(2, 3));
        assert_eq!(dist, 1.0);

        assert!(terrain.nearest_biome(Vec2::ZERO, BiomeType::River).is_none());
    }

    #[test]
    fn test_is_near_biome_inclusive_radius() {
        let mut terrain = Terrain::new(20, 20, 1).unwrap();
        terrain.set_biome(10, 10, BiomeType::Mountains);

        // Exactly at the radius counts.
        assert!(terrain.is_near_biome(7, 10, BiomeType::Mountains, 3.0));
        // Diagonal at distance sqrt(18) > 3 does not.
        assert!(!terrain.is_near_biome(7, 7, BiomeType::Mountains, 3.0));
        // The cell itself counts (distance 0).
        assert!(terrain.is_near_biome(10, 10, BiomeType::Mountains, 3.0));
    }

    #[test]
    fn test_movement_cost_table() {
        assert_eq!(BiomeType::DeepOcean.movement_cost(), 0.0);
        assert_eq!(BiomeType::Beach.movement_cost(), 0.0);
        assert_eq!(BiomeType::ShallowOcean.movement_cost(), 0.0);
        assert_eq!(BiomeType::River.movement_cost(), 0.0);
        assert_eq!(BiomeType::Plains.movement_cost(), 1.0);
        assert_eq!(BiomeType::Lowlands.movement_cost(), 1.0);
        assert_eq!(BiomeType::Forest.movement_cost(), 1.5);
        assert_eq!(BiomeType::Mountains.movement_cost(), 2.0);
    }

    #[test]
    fn test_height_range() {
        let mut terrain = Terrain::new(4, 4, 1).unwrap();
        terrain.set_height(0, 0, -1.0);
        terrain.set_height(4, 4, 3.5);
        let (min, max) = terrain.height_range();
        assert_eq!(min, -1.0);
        assert_eq!(max, 3.5);
    }

    #[test]
    fn test_vertex_coords_iterator() {
        let terrain = Terrain::new(2, 2, 1).unwrap();
        let coords: Vec<_> = terrain.vertex_coords().collect();
        assert_eq!(coords.len(), 9);
        assert_eq!(coords[0], (0, 0));
        assert_eq!(coords[1], (1, 0));
        assert_eq!(coords[3], (0, 1));
        assert_eq!(coords[8], (2, 2));
    }
}
