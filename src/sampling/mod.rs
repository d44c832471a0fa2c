//! Blue-noise point scattering over forest cells.
//!
//! Bridson's Poisson-disc algorithm over the grid's continuous extent,
//! with an extra rejection rule: a candidate only survives if the terrain
//! cell under it is forest. The result is a tree placement set with a
//! guaranteed minimum spacing and no clumping.

use glam::Vec2;
use log::debug;
use rand::Rng;

use crate::grid::{BiomeType, Terrain};

/// Scatters points across the terrain's forest cells with minimum spacing
/// `radius`, trying `attempts` candidates around each active point.
///
/// Deterministic for a given terrain and rng state. Returns continuous
/// positions in grid units; an all-water or forest-free map yields an
/// empty set.
pub fn generate_forest_points(
    terrain: &Terrain,
    radius: f32,
    attempts: u32,
    rng: &mut impl Rng,
) -> Vec<Vec2> {
    let region = Vec2::new(terrain.x_size() as f32, terrain.z_size() as f32);
    let cell_size = radius / 2f32.sqrt();
    let cols = (region.x / cell_size).ceil() as usize;
    let rows = (region.y / cell_size).ceil() as usize;

    // One point index per background cell; cell side r/sqrt(2) guarantees
    // at most one accepted point per cell.
    let mut grid: Vec<Option<usize>> = vec![None; cols * rows];
    let mut points: Vec<Vec2> = Vec::new();
    let mut active: Vec<usize> = Vec::new();

    let seed_point = region / 2.0;
    if accept(terrain, radius, seed_point, region, &grid, &points, cols, rows, cell_size) {
        push_point(seed_point, &mut grid, &mut points, &mut active, cols, cell_size);
    } else if let Some(start) = scan_for_seed(terrain, region, rng) {
        push_point(start, &mut grid, &mut points, &mut active, cols, cell_size);
    } else {
        return points;
    }

    while let Some(slot) = pick_active(&active, rng) {
        let center = points[active[slot]];
        let mut placed = false;
        for _ in 0..attempts {
            let angle = rng.random::<f32>() * std::f32::consts::TAU;
            let distance = rng.random_range(radius..2.0 * radius);
            let candidate = center + Vec2::from_angle(angle) * distance;
            if accept(
                terrain, radius, candidate, region, &grid, &points, cols, rows, cell_size,
            ) {
                push_point(candidate, &mut grid, &mut points, &mut active, cols, cell_size);
                placed = true;
                break;
            }
        }
        if !placed {
            active.swap_remove(slot);
        }
    }
    debug!("scattered {} forest points at radius {}", points.len(), radius);
    points
}

fn pick_active(active: &[usize], rng: &mut impl Rng) -> Option<usize> {
    if active.is_empty() {
        None
    } else {
        Some(rng.random_range(0..active.len()))
    }
}

/// Finds any forest cell to seed from when the region center is rejected.
fn scan_for_seed(terrain: &Terrain, region: Vec2, rng: &mut impl Rng) -> Option<Vec2> {
    for _ in 0..256 {
        let p = Vec2::new(
            rng.random::<f32>() * region.x,
            rng.random::<f32>() * region.y,
        );
        if biome_under(terrain, p) == Some(BiomeType::Forest) {
            return Some(p);
        }
    }
    // Random probing missed; fall back to the first forest cell. Clamp
    // inside the open region so the point maps to a background cell, and
    // re-check the cell under the clamped point: a forest vertex on the far
    // column or row clamps into a neighboring cell that may not be forest.
    for (x, z) in terrain.vertex_coords() {
        if terrain.biome(x, z) != BiomeType::Forest {
            continue;
        }
        let p = Vec2::new(x as f32, z as f32).min(region - Vec2::splat(1e-3));
        if biome_under(terrain, p) == Some(BiomeType::Forest) {
            return Some(p);
        }
    }
    None
}

fn biome_under(terrain: &Terrain, p: Vec2) -> Option<BiomeType> {
    let cell = glam::IVec2::new(p.x.floor() as i32, p.y.floor() as i32);
    terrain.in_bounds(cell).then(|| terrain.biome_at(cell))
}

#[allow(clippy::too_many_arguments)]
fn accept(
    terrain: &Terrain,
    radius: f32,
    candidate: Vec2,
    region: Vec2,
    grid: &[Option<usize>],
    points: &[Vec2],
    cols: usize,
    rows: usize,
    cell_size: f32,
) -> bool {
    if candidate.x < 0.0 || candidate.y < 0.0 || candidate.x >= region.x || candidate.y >= region.y
    {
        return false;
    }
    if biome_under(terrain, candidate) != Some(BiomeType::Forest) {
        return false;
    }

    // Any conflicting point lies within two background cells of the
    // candidate's cell.
    let col = (candidate.x / cell_size) as i64;
    let row = (candidate.y / cell_size) as i64;
    let radius_sq = radius * radius;
    for dr in -2i64..=2 {
        for dc in -2i64..=2 {
            let (c, r) = (col + dc, row + dr);
            if c < 0 || r < 0 || c >= cols as i64 || r >= rows as i64 {
                continue;
            }
            if let Some(idx) = grid[r as usize * cols + c as usize] {
                if points[idx].distance_squared(candidate) < radius_sq {
                    return false;
                }
            }
        }
    }
    true
}

fn push_point(
    p: Vec2,
    grid: &mut [Option<usize>],
    points: &mut Vec<Vec2>,
    active: &mut Vec<usize>,
    cols: usize,
    cell_size: f32,
) {
    let col = (p.x / cell_size) as usize;
    let row = (p.y / cell_size) as usize;
    let idx = points.len();
    points.push(p);
    active.push(idx);
    grid[row * cols + col] = Some(idx);
}
