//! Generation stage trait and pipeline orchestration.

use thiserror::Error;

use log::info;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::biomes::{classify_biomes, BiomeConfig};
use crate::grid::Terrain;
use crate::heightfield::{build_heightmap, HeightConfig};
use crate::noise::NoiseField;
use crate::rivers::{RiverConfig, RiverEngine};
use crate::smoothing::{smooth_terrain, SmoothingConfig};

/// Unique identifier for generation stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageId {
    /// Biome classification from layered noise.
    Biomes,
    /// Per-cell elevation synthesis from biome labels.
    Heightmap,
    /// River source selection, growth, and carving.
    Rivers,
    /// Height smoothing over biome transitions.
    Smoothing,
}

impl StageId {
    /// Returns the name of the stage.
    pub fn name(&self) -> &'static str {
        match self {
            StageId::Biomes => "biomes",
            StageId::Heightmap => "heightmap",
            StageId::Rivers => "rivers",
            StageId::Smoothing => "smoothing",
        }
    }
}

/// Errors that can occur during pipeline execution.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Stage '{0}' failed: {1}")]
    StageFailed(String, String),
    #[error("Missing dependency: stage '{0}' requires '{1}'")]
    MissingDependency(String, String),
}

/// Trait for implementing generation stages.
///
/// Each stage transforms the terrain in some way, building upon previous
/// stages. The trait-based design allows for modular composition and easy
/// extension with new generation phases.
pub trait GenerationStage: Send + Sync {
    /// Returns the unique identifier for this stage.
    fn id(&self) -> StageId;

    /// Returns a human-readable name for the stage.
    fn name(&self) -> &str;

    /// Returns the stage IDs that must be executed before this stage.
    fn dependencies(&self) -> &[StageId] {
        &[]
    }

    /// Executes the generation stage, modifying the terrain in place.
    fn execute(&self, terrain: &mut Terrain) -> Result<(), PipelineError>;
}

/// Orchestrates multiple generation stages into a complete pipeline.
pub struct Pipeline {
    stages: Vec<Box<dyn GenerationStage>>,
}

impl Pipeline {
    /// Creates a new empty pipeline.
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    /// Adds a stage to the pipeline.
    pub fn add_stage<S: GenerationStage + 'static>(&mut self, stage: S) -> &mut Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Returns the number of stages in the pipeline.
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Executes all stages in order on the given terrain.
    pub fn run(&self, terrain: &mut Terrain) -> Result<(), PipelineError> {
        let mut completed: Vec<StageId> = Vec::new();

        for stage in &self.stages {
            for dep in stage.dependencies() {
                if !completed.contains(dep) {
                    return Err(PipelineError::MissingDependency(
                        stage.name().to_string(),
                        dep.name().to_string(),
                    ));
                }
            }

            stage.execute(terrain)?;
            completed.push(stage.id());
        }

        Ok(())
    }

    /// Executes all stages with progress callbacks.
    ///
    /// `on_stage_start` and `on_stage_complete` receive the stage name, its
    /// index, and the total stage count.
    pub fn run_with_callbacks<F1, F2>(
        &self,
        terrain: &mut Terrain,
        mut on_stage_start: F1,
        mut on_stage_complete: F2,
    ) -> Result<(), PipelineError>
    where
        F1: FnMut(&str, usize, usize),
        F2: FnMut(&str, usize, usize),
    {
        let total = self.stages.len();
        let mut completed: Vec<StageId> = Vec::new();

        for (i, stage) in self.stages.iter().enumerate() {
            on_stage_start(stage.name(), i, total);

            for dep in stage.dependencies() {
                if !completed.contains(dep) {
                    return Err(PipelineError::MissingDependency(
                        stage.name().to_string(),
                        dep.name().to_string(),
                    ));
                }
            }

            stage.execute(terrain)?;
            completed.push(stage.id());

            on_stage_complete(stage.name(), i, total);
        }

        Ok(())
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds the standard four-stage pipeline with the given configurations.
pub fn standard_pipeline(
    biomes: BiomeConfig,
    heights: HeightConfig,
    rivers: RiverConfig,
    smoothing: SmoothingConfig,
) -> Pipeline {
    let mut pipeline = Pipeline::new();
    pipeline.add_stage(BiomeStage::new(biomes));
    pipeline.add_stage(HeightmapStage::new(heights.clone()));
    pipeline.add_stage(RiverStage::new(rivers, heights));
    pipeline.add_stage(SmoothingStage::new(smoothing));
    pipeline
}

/// Biome classification stage.
pub struct BiomeStage {
    pub config: BiomeConfig,
}

impl BiomeStage {
    pub fn new(config: BiomeConfig) -> Self {
        Self { config }
    }
}

impl GenerationStage for BiomeStage {
    fn id(&self) -> StageId {
        StageId::Biomes
    }

    fn name(&self) -> &str {
        "Biome Classification"
    }

    fn execute(&self, terrain: &mut Terrain) -> Result<(), PipelineError> {
        let field = NoiseField::new(terrain.seed());
        let summary = classify_biomes(terrain, &self.config, &field);
        info!(
            "classified {} mountain and {} deep ocean cells",
            summary.mountain_cells, summary.deep_ocean_cells
        );

        // Later stages need river sources and a terminus; a map without
        // either is a threshold configuration problem, not a valid world.
        if summary.deep_ocean_cells == 0 {
            return Err(PipelineError::StageFailed(
                self.name().to_string(),
                "classification produced no deep ocean cells".to_string(),
            ));
        }
        if summary.mountain_cells == 0 {
            return Err(PipelineError::StageFailed(
                self.name().to_string(),
                "classification produced no mountain cells".to_string(),
            ));
        }
        Ok(())
    }
}

/// Heightmap synthesis stage.
pub struct HeightmapStage {
    pub config: HeightConfig,
}

impl HeightmapStage {
    pub fn new(config: HeightConfig) -> Self {
        Self { config }
    }
}

impl GenerationStage for HeightmapStage {
    fn id(&self) -> StageId {
        StageId::Heightmap
    }

    fn name(&self) -> &str {
        "Heightmap Synthesis"
    }

    fn dependencies(&self) -> &[StageId] {
        &[StageId::Biomes]
    }

    fn execute(&self, terrain: &mut Terrain) -> Result<(), PipelineError> {
        let noise = NoiseField::new(terrain.seed());
        build_heightmap(terrain, &self.config, &noise);
        Ok(())
    }
}

/// River generation stage.
///
/// Carries the height configuration alongside its own so carved banks can
/// be relabeled with the lowlands height formula.
pub struct RiverStage {
    pub config: RiverConfig,
    pub heights: HeightConfig,
}

impl RiverStage {
    pub fn new(config: RiverConfig, heights: HeightConfig) -> Self {
        Self { config, heights }
    }
}

impl GenerationStage for RiverStage {
    fn id(&self) -> StageId {
        StageId::Rivers
    }

    fn name(&self) -> &str {
        "River Generation"
    }

    fn dependencies(&self) -> &[StageId] {
        &[StageId::Heightmap]
    }

    fn execute(&self, terrain: &mut Terrain) -> Result<(), PipelineError> {
        let noise = NoiseField::new(terrain.seed());
        // Offset stream so river randomness is independent of any draws the
        // noise field consumed from the base seed.
        let mut rng = ChaCha8Rng::seed_from_u64(terrain.seed().wrapping_add(1));
        let mut engine = RiverEngine::new(terrain, &self.config, &self.heights, &noise);
        let report = engine.generate(&mut rng);
        info!(
            "generated {} rivers, carved {} cells",
            report.sources.len(),
            report.carved_cells
        );
        Ok(())
    }
}

/// Height smoothing stage.
pub struct SmoothingStage {
    pub config: SmoothingConfig,
}

impl SmoothingStage {
    pub fn new(config: SmoothingConfig) -> Self {
        Self { config }
    }
}

impl GenerationStage for SmoothingStage {
    fn id(&self) -> StageId {
        StageId::Smoothing
    }

    fn name(&self) -> &str {
        "Height Smoothing"
    }

    fn dependencies(&self) -> &[StageId] {
        &[StageId::Rivers]
    }

    fn execute(&self, terrain: &mut Terrain) -> Result<(), PipelineError> {
        smooth_terrain(terrain, &self.config);
        Ok(())
    }
}
