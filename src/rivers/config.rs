//! River generation configuration.

use serde::{Deserialize, Serialize};

/// Parameters for river source selection, path growth, and carving.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiverConfig {
    /// Lateral half-width carved around each path cell, in cells (0-3).
    pub start_width: u32,
    /// Minimum per-river curve amount.
    pub min_curve: f32,
    /// Maximum per-river curve amount.
    pub max_curve: f32,
    /// Maximum angular perturbation applied to the steering direction, in
    /// degrees.
    pub max_angle_deg: f32,

    /// Growth steps per river before the path is carved as-is.
    pub max_steps: u32,
    /// Random source-selection attempts before a river is skipped.
    pub source_retry_budget: u32,
    /// Minimum Euclidean spacing between accepted sources.
    pub min_source_spacing: f32,
    /// Mountains cells required in the 5x5 neighborhood of a source.
    pub required_mountain_neighbors: u32,

    /// Cap on counted mountain cells when budgeting rivers.
    pub mountain_count_cap: u32,
    /// Counted mountain cells per river.
    pub cells_per_river: u32,
}

impl Default for RiverConfig {
    fn default() -> Self {
        Self {
            start_width: 1,
            min_curve: 1.0,
            max_curve: 5.0,
            max_angle_deg: 3.0,

            max_steps: 100,
            source_retry_budget: 1000,
            min_source_spacing: 10.0,
            required_mountain_neighbors: 16,

            mountain_count_cap: 1000,
            cells_per_river: 100,
        }
    }
}
