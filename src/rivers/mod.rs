//! River synthesis: source selection, cost-directed growth, carving.
//!
//! Each river starts in a mountain interior, grows cell by cell toward the
//! nearest deep-water body under a greedy terrain-cost rule with a
//! sinusoidal angular perturbation, and is carved into both the height map
//! and the biome map. Banks around the carved channel are relabeled to
//! lowlands. Rivers are generated strictly sequentially: each river's bank
//! pass depends on the carved state left by its predecessors.

mod config;

pub use config::RiverConfig;

use std::collections::HashSet;
use std::f32::consts::TAU;

use glam::{IVec2, Vec2};
use log::{debug, warn};
use rand::Rng;

use crate::grid::{BiomeType, Terrain};
use crate::heightfield::{HeightConfig, HeightField, DEEP_OCEAN_HEIGHT};
use crate::noise::NoiseField;

/// Outcome of a single river attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiverOutcome {
    /// The path reached deep water and was carved.
    ReachedWater,
    /// The step budget ran out; the partial path was carved as-is.
    Partial,
    /// No qualifying source within the retry budget; nothing was carved.
    SourceExhausted,
}

/// Summary of one river generation run.
#[derive(Debug, Clone, Default)]
pub struct RiverReport {
    /// Accepted source cells, in generation order.
    pub sources: Vec<IVec2>,
    /// Outcome per attempted river.
    pub outcomes: Vec<RiverOutcome>,
    /// Total cells carved to river across all paths (including width).
    pub carved_cells: usize,
}

/// Grows and carves rivers on a terrain.
///
/// Holds the height configuration and noise field so carved banks can be
/// recomputed with the lowlands formula.
pub struct RiverEngine<'a> {
    terrain: &'a mut Terrain,
    cfg: &'a RiverConfig,
    height_cfg: &'a HeightConfig,
    noise: &'a NoiseField,
}

impl<'a> RiverEngine<'a> {
    pub fn new(
        terrain: &'a mut Terrain,
        cfg: &'a RiverConfig,
        height_cfg: &'a HeightConfig,
        noise: &'a NoiseField,
    ) -> Self {
        Self {
            terrain,
            cfg,
            height_cfg,
            noise,
        }
    }

    /// Generates all rivers for the current terrain.
    ///
    /// The river budget is one river per `cells_per_river` mountain cells,
    /// with the counted cells capped at `mountain_count_cap`. Per-river
    /// failures are recovered by skipping that river; the accepted sources
    /// are stored on the terrain for downstream inspection.
    pub fn generate(&mut self, rng: &mut impl Rng) -> RiverReport {
        let mountain_cells = self
            .terrain
            .count_biome(BiomeType::Mountains)
            .min(self.cfg.mountain_count_cap as usize) as u32;
        let river_budget = mountain_cells.div_ceil(self.cfg.cells_per_river);
        debug!(
            "river budget: {} rivers from {} counted mountain cells",
            river_budget, mountain_cells
        );

        let mut report = RiverReport::default();
        for _ in 0..river_budget {
            let outcome = self.generate_river(rng, &mut report);
            report.outcomes.push(outcome);
        }
        self.terrain.river_sources = Some(report.sources.clone());
        report
    }

    fn generate_river(&mut self, rng: &mut impl Rng, report: &mut RiverReport) -> RiverOutcome {
        let source = match self.select_source(rng, &report.sources) {
            Some(s) => s,
            None => {
                warn!(
                    "no qualifying river source within {} attempts, skipping river",
                    self.cfg.source_retry_budget
                );
                return RiverOutcome::SourceExhausted;
            }
        };
        report.sources.push(source);

        let (path, reached_water) = self.grow_path(source, rng);
        report.carved_cells += self.carve(&path);
        self.form_banks();

        if reached_water {
            RiverOutcome::ReachedWater
        } else {
            warn!(
                "river from ({}, {}) did not reach deep water within {} steps, carved partial path",
                source.x, source.y, self.cfg.max_steps
            );
            RiverOutcome::Partial
        }
    }

    /// Uniformly samples cells until one qualifies as a river source.
    ///
    /// A source must be a mountain cell with a mountainous 5x5 interior and
    /// sufficient spacing from previously accepted sources. The retry count
    /// is bounded; exhaustion is a recoverable per-river failure.
    fn select_source(&self, rng: &mut impl Rng, taken: &[IVec2]) -> Option<IVec2> {
        for _ in 0..self.cfg.source_retry_budget {
            let x = rng.random_range(0..=self.terrain.x_size());
            let z = rng.random_range(0..=self.terrain.z_size());
            let p = IVec2::new(x as i32, z as i32);

            if self.terrain.biome(x, z) != BiomeType::Mountains {
                continue;
            }
            if self.mountain_neighbors(p) < self.cfg.required_mountain_neighbors {
                continue;
            }
            let spaced = taken
                .iter()
                .all(|s| s.as_vec2().distance(p.as_vec2()) >= self.cfg.min_source_spacing);
            if spaced {
                return Some(p);
            }
        }
        None
    }

    /// Counts mountain cells in the 5x5 neighborhood of `p` (inclusive).
    fn mountain_neighbors(&self, p: IVec2) -> u32 {
        let mut count = 0;
        for dz in -2..=2 {
            for dx in -2..=2 {
                let n = p + IVec2::new(dx, dz);
                if self.terrain.in_bounds(n) && self.terrain.biome_at(n) == BiomeType::Mountains {
                    count += 1;
                }
            }
        }
        count
    }

    /// Grows a path from `source` toward deep water.
    ///
    /// Greedy and stepwise: each step steers toward the nearest deep-ocean
    /// cell (perturbed sinusoidally), or directly toward a nearer existing
    /// river cell so channels can merge. A local relaxation may swap the
    /// candidate for a cheaper cell adjacent to an already-visited
    /// neighbor. No nodes are re-opened; the walk is bounded only by the
    /// step cap and the visited set.
    fn grow_path(&self, source: IVec2, rng: &mut impl Rng) -> (Vec<IVec2>, bool) {
        let mut path = vec![source];
        let mut visited: HashSet<IVec2> = HashSet::new();
        visited.insert(source);

        let Some((_, source_ocean_dist)) = self
            .terrain
            .nearest_biome(source.as_vec2(), BiomeType::DeepOcean)
        else {
            return (path, false);
        };

        let curve_amount = rng.random_range(self.cfg.min_curve..=self.cfg.max_curve);
        let step_scale = source_ocean_dist / curve_amount * TAU;
        let max_angle = self.cfg.max_angle_deg.to_radians();

        let mut current = source;
        for i in 0..self.cfg.max_steps {
            let pos = current.as_vec2();
            let Some((ocean, ocean_dist)) =
                self.terrain.nearest_biome(pos, BiomeType::DeepOcean)
            else {
                break;
            };

            // Steer toward a nearer river cell (merge) or toward the ocean
            // with the angular perturbation.
            let river = self.terrain.nearest_biome(pos, BiomeType::River);
            let direction = match river {
                Some((river_cell, river_dist)) if river_dist < ocean_dist => {
                    (river_cell.as_vec2() - pos).normalize_or_zero()
                }
                _ => {
                    let toward = (ocean.as_vec2() - pos).normalize_or_zero();
                    let angle = (step_scale * i as f32).sin() * max_angle;
                    Vec2::from_angle(angle).rotate(toward)
                }
            };
            if direction == Vec2::ZERO {
                break;
            }

            let step = IVec2::new(direction.x.round() as i32, direction.y.round() as i32);
            let mut candidate = current + step;

            // Local relaxation: a visited 8-neighbor of the current cell,
            // offset by the same step, may yield a strictly cheaper cell.
            if let Some(mut best_cost) = self.cell_cost(candidate) {
                for dz in -1..=1 {
                    for dx in -1..=1 {
                        if dx == 0 && dz == 0 {
                            continue;
                        }
                        let neighbor = current + IVec2::new(dx, dz);
                        if !visited.contains(&neighbor) {
                            continue;
                        }
                        let alternative = neighbor + step;
                        if let Some(cost) = self.cell_cost(alternative) {
                            if cost < best_cost {
                                best_cost = cost;
                                candidate = alternative;
                            }
                        }
                    }
                }
            }

            if !self.terrain.in_bounds(candidate) {
                continue;
            }
            if self.terrain.biome_at(candidate) == BiomeType::DeepOcean {
                path.push(candidate);
                return (path, true);
            }
            if !visited.insert(candidate) {
                // Already stepped here this river; skip rather than loop.
                continue;
            }
            path.push(candidate);
            current = candidate;
        }
        (path, false)
    }

    /// Traversal cost of entering a cell, or `None` if out of bounds.
    fn cell_cost(&self, p: IVec2) -> Option<f32> {
        if !self.terrain.in_bounds(p) {
            return None;
        }
        Some(self.terrain.biome_at(p).movement_cost() + self.terrain.height_at(p))
    }

    /// Carves the path into the height and biome maps.
    ///
    /// Every path cell and its lateral x-neighbors within `start_width`
    /// are lowered to the riverbed height and relabeled. Carving only ever
    /// lowers elevation: the riverbed matches the deep-ocean floor, the
    /// lowest height the earlier stages produce.
    fn carve(&mut self, path: &[IVec2]) -> usize {
        let width = self.cfg.start_width as i32;
        let mut carved = 0;
        for &p in path {
            for dx in -width..=width {
                let q = p + IVec2::new(dx, 0);
                if !self.terrain.in_bounds(q) {
                    continue;
                }
                self.terrain.set_height(q.x as u32, q.y as u32, DEEP_OCEAN_HEIGHT);
                self.terrain.set_biome(q.x as u32, q.y as u32, BiomeType::River);
                carved += 1;
            }
        }
        carved
    }

    /// Relabels carved-channel banks to lowlands and recomputes their
    /// heights.
    ///
    /// Mountains within radius 3 of a river cell and forest within radius
    /// 1 both become lowlands. Runs after each river so later rivers see
    /// the updated costs.
    fn form_banks(&mut self) {
        let field = HeightField::new(
            self.height_cfg,
            self.noise,
            self.terrain.x_size(),
            self.terrain.z_size(),
        );
        let mut changes = Vec::new();
        for z in 0..=self.terrain.z_size() {
            for x in 0..=self.terrain.x_size() {
                let relabel = match self.terrain.biome(x, z) {
                    BiomeType::Mountains => self.terrain.is_near_biome(x, z, BiomeType::River, 3.0),
                    BiomeType::Forest => self.terrain.is_near_biome(x, z, BiomeType::River, 1.0),
                    _ => false,
                };
                if relabel {
                    changes.push((x, z, field.compute(x, z, BiomeType::Lowlands)));
                }
            }
        }
        for (x, z, height) in changes {
            self.terrain.set_biome(x, z, BiomeType::Lowlands);
            self.terrain.set_height(x, z, height);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heightfield::build_heightmap;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    /// Terrain with a mountain block, an ocean corner, and plains elsewhere.
    fn river_test_terrain(size: u32, mountain_lo: u32, mountain_hi: u32) -> Terrain {
        let mut terrain = Terrain::new(size, size, 11).unwrap();
        for z in mountain_lo..=mountain_hi {
            for x in mountain_lo..=mountain_hi {
                terrain.set_biome(x, z, BiomeType::Mountains);
            }
        }
        for z in 0..=1 {
            for x in 0..=1 {
                terrain.set_biome(x, z, BiomeType::DeepOcean);
            }
        }
        let noise = NoiseField::with_offsets(11, 500.0, 900.0);
        build_heightmap(&mut terrain, &HeightConfig::default(), &noise);
        terrain
    }

    #[test]
    fn test_forced_layout_river_reaches_carving() {
        // 10x10 grid: mountains centered on (5,5), deep ocean at (0,0).
        let mut terrain = river_test_terrain(10, 3, 7);
        let cfg = RiverConfig::default();
        let height_cfg = HeightConfig::default();
        let noise = NoiseField::with_offsets(11, 500.0, 900.0);

        let mut engine = RiverEngine::new(&mut terrain, &cfg, &height_cfg, &noise);
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let report = engine.generate(&mut rng);

        // 25 mountain cells -> exactly one river.
        assert_eq!(report.outcomes.len(), 1);
        assert_ne!(report.outcomes[0], RiverOutcome::SourceExhausted);
        assert_eq!(report.sources.len(), 1);

        // The source or a lateral neighbor within the carve width is river,
        // at the riverbed height.
        let source = report.sources[0];
        let carved_near_source = (-(cfg.start_width as i32)..=(cfg.start_width as i32)).any(|dx| {
            let q = source + IVec2::new(dx, 0);
            terrain.in_bounds(q)
                && terrain.biome_at(q) == BiomeType::River
                && terrain.height_at(q) == -1.0
        });
        assert!(carved_near_source, "source cell was not carved");
        assert!(report.carved_cells > 0);
    }

    #[test]
    fn test_source_qualification() {
        let mut terrain = river_test_terrain(20, 5, 12);
        let cfg = RiverConfig::default();
        let height_cfg = HeightConfig::default();
        let noise = NoiseField::with_offsets(11, 500.0, 900.0);
        let engine = RiverEngine::new(&mut terrain, &cfg, &height_cfg, &noise);

        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let source = engine.select_source(&mut rng, &[]).unwrap();

        // Selected source is mountains with a mountainous 5x5 interior.
        assert_eq!(engine.terrain.biome_at(source), BiomeType::Mountains);
        assert!(engine.mountain_neighbors(source) >= cfg.required_mountain_neighbors);
    }

    #[test]
    fn test_source_exhaustion_is_recoverable() {
        // One lone mountain cell: never 16 mountain neighbors.
        let mut terrain = Terrain::new(15, 15, 3).unwrap();
        terrain.set_biome(7, 7, BiomeType::Mountains);
        for z in 0..=1 {
            terrain.set_biome(0, z, BiomeType::DeepOcean);
        }
        let noise = NoiseField::with_offsets(3, 100.0, 100.0);
        build_heightmap(&mut terrain, &HeightConfig::default(), &noise);

        let cfg = RiverConfig {
            source_retry_budget: 200,
            ..Default::default()
        };
        let height_cfg = HeightConfig::default();
        let mut engine = RiverEngine::new(&mut terrain, &cfg, &height_cfg, &noise);
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let report = engine.generate(&mut rng);

        assert_eq!(report.outcomes, vec![RiverOutcome::SourceExhausted]);
        assert_eq!(report.carved_cells, 0);
        assert_eq!(terrain.count_biome(BiomeType::River), 0);
    }

    #[test]
    fn test_carving_never_raises_heights() {
        let mut terrain = river_test_terrain(30, 8, 24);
        let before = terrain.heights().to_vec();

        let cfg = RiverConfig::default();
        let height_cfg = HeightConfig::default();
        let noise = NoiseField::with_offsets(11, 500.0, 900.0);
        let mut engine = RiverEngine::new(&mut terrain, &cfg, &height_cfg, &noise);
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        engine.generate(&mut rng);

        let xs = terrain.x_size() + 1;
        for z in 0..=terrain.z_size() {
            for x in 0..=terrain.x_size() {
                if terrain.biome(x, z) == BiomeType::River {
                    let i = (z * xs + x) as usize;
                    assert_eq!(terrain.height(x, z), -1.0);
                    assert!(
                        terrain.height(x, z) <= before[i],
                        "carving raised ({}, {})",
                        x,
                        z
                    );
                }
            }
        }
    }

    #[test]
    fn test_sources_keep_minimum_spacing() {
        // A large mountain region produces several rivers.
        let mut terrain = river_test_terrain(40, 5, 35);
        let cfg = RiverConfig::default();
        let height_cfg = HeightConfig::default();
        let noise = NoiseField::with_offsets(11, 500.0, 900.0);
        let mut engine = RiverEngine::new(&mut terrain, &cfg, &height_cfg, &noise);
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let report = engine.generate(&mut rng);

        // 31x31 mountain block = 961 counted cells -> 10 river attempts.
        assert_eq!(report.outcomes.len(), 10);
        for (i, a) in report.sources.iter().enumerate() {
            for b in report.sources.iter().skip(i + 1) {
                let dist = a.as_vec2().distance(b.as_vec2());
                assert!(
                    dist >= cfg.min_source_spacing,
                    "sources {:?} and {:?} only {} apart",
                    a,
                    b,
                    dist
                );
            }
        }
    }

    #[test]
    fn test_path_terminates_in_water_or_at_cap() {
        let mut terrain = river_test_terrain(20, 8, 14);
        let cfg = RiverConfig::default();
        let height_cfg = HeightConfig::default();
        let noise = NoiseField::with_offsets(11, 500.0, 900.0);
        let engine = RiverEngine::new(&mut terrain, &cfg, &height_cfg, &noise);

        let mut rng = ChaCha8Rng::seed_from_u64(13);
        let source = engine.select_source(&mut rng, &[]).unwrap();
        let (path, reached) = engine.grow_path(source, &mut rng);

        assert_eq!(path[0], source);
        assert!(path.len() <= cfg.max_steps as usize + 1);
        if reached {
            let last = *path.last().unwrap();
            assert_eq!(engine.terrain.biome_at(last), BiomeType::DeepOcean);
        }
        // Every path cell lies in bounds.
        assert!(path.iter().all(|&p| engine.terrain.in_bounds(p)));
    }

    #[test]
    fn test_banks_turn_to_lowlands() {
        let mut terrain = river_test_terrain(20, 6, 14);
        let cfg = RiverConfig::default();
        let height_cfg = HeightConfig::default();
        let noise = NoiseField::with_offsets(11, 500.0, 900.0);
        let mut engine = RiverEngine::new(&mut terrain, &cfg, &height_cfg, &noise);
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let report = engine.generate(&mut rng);
        assert!(report.carved_cells > 0);

        // No mountain cell remains within radius 3 of a river cell, and no
        // forest cell within radius 1.
        for z in 0..=terrain.z_size() {
            for x in 0..=terrain.x_size() {
                match terrain.biome(x, z) {
                    BiomeType::Mountains => {
                        assert!(!terrain.is_near_biome(x, z, BiomeType::River, 3.0))
                    }
                    BiomeType::Forest => {
                        assert!(!terrain.is_near_biome(x, z, BiomeType::River, 1.0))
                    }
                    _ => {}
                }
            }
        }
    }
}
