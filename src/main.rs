//! Landgen CLI - Procedural terrain generator.
//!
//! Generate island-style landscapes with biome classification, river
//! carving, transition smoothing, and forest tree placement.

use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::path::PathBuf;
use std::time::Instant;

use landgen::export::{
    export_biome_map_png, export_height_png, BiomeMapOptions, PngExportOptions,
};
use landgen::pipeline::standard_pipeline;
use landgen::sampling::generate_forest_points;
use landgen::{BiomeConfig, HeightConfig, RiverConfig, SmoothingConfig, Terrain};

/// Procedural terrain generator.
#[derive(Parser)]
#[command(name = "landgen")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a new terrain.
    Generate {
        /// Grid width in cells (vertices are width + 1).
        #[arg(short, long, default_value = "100")]
        x_size: u32,

        /// Grid depth in cells (vertices are depth + 1).
        #[arg(short, long, default_value = "100")]
        z_size: u32,

        /// Random seed for reproducible generation.
        #[arg(short, long)]
        seed: Option<u64>,

        /// Output directory for generated files.
        #[arg(short, long, default_value = "./output")]
        output: PathBuf,

        /// Base name for output files.
        #[arg(short, long, default_value = "terrain")]
        name: String,

        /// Baseline land elevation.
        #[arg(long, default_value = "2.0")]
        base_height: f32,

        /// Octave count for the mountain ridged accumulation (1-16).
        #[arg(long, default_value = "5")]
        octaves: u32,

        /// Amplitude decay per octave (persistence).
        #[arg(long, default_value = "0.5")]
        persistence: f32,

        /// Lateral half-width carved around river path cells (0-3).
        #[arg(long, default_value = "1")]
        river_width: u32,

        /// Maximum river growth steps before a path is carved as-is.
        #[arg(long, default_value = "100")]
        river_steps: u32,

        /// Height difference window for transition smoothing.
        #[arg(long, default_value = "5.0")]
        transition_range: f32,

        /// Neighbor weight for transition smoothing.
        #[arg(long, default_value = "1.0")]
        smoothing_strength: f32,

        /// Export an RGB biome preview map.
        #[arg(long)]
        biome_map: bool,

        /// Scatter tree points in forests and write them as JSON.
        #[arg(long)]
        tree_points: bool,

        /// Minimum spacing between tree points, in cells.
        #[arg(long, default_value = "2.0")]
        tree_radius: f32,

        /// Candidate attempts per active point when scattering trees.
        #[arg(long, default_value = "30")]
        tree_attempts: u32,
    },

    /// Display information about a terrain configuration.
    Info {
        /// Grid width in cells.
        #[arg(short, long, default_value = "100")]
        x_size: u32,

        /// Grid depth in cells.
        #[arg(short, long, default_value = "100")]
        z_size: u32,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            x_size,
            z_size,
            seed,
            output,
            name,
            base_height,
            octaves,
            persistence,
            river_width,
            river_steps,
            transition_range,
            smoothing_strength,
            biome_map,
            tree_points,
            tree_radius,
            tree_attempts,
        } => {
            run_generate(
                x_size,
                z_size,
                seed,
                output,
                name,
                base_height,
                octaves,
                persistence,
                river_width,
                river_steps,
                transition_range,
                smoothing_strength,
                biome_map,
                tree_points,
                tree_radius,
                tree_attempts,
            );
        }
        Commands::Info { x_size, z_size } => {
            run_info(x_size, z_size);
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn run_generate(
    x_size: u32,
    z_size: u32,
    seed: Option<u64>,
    output: PathBuf,
    name: String,
    base_height: f32,
    octaves: u32,
    persistence: f32,
    river_width: u32,
    river_steps: u32,
    transition_range: f32,
    smoothing_strength: f32,
    biome_map: bool,
    tree_points: bool,
    tree_radius: f32,
    tree_attempts: u32,
) {
    // Validate parameters
    if x_size == 0 || z_size == 0 || x_size > 4096 || z_size > 4096 {
        eprintln!("Error: Grid dimensions must be between 1 and 4096");
        std::process::exit(1);
    }

    if octaves < 1 || octaves > 16 {
        eprintln!("Error: Octaves must be between 1 and 16");
        std::process::exit(1);
    }

    if river_width > 3 {
        eprintln!("Error: River width must be between 0 and 3");
        std::process::exit(1);
    }

    if tree_points && tree_radius <= 0.0 {
        eprintln!("Error: Tree radius must be positive");
        std::process::exit(1);
    }

    // Generate seed if not provided
    let seed = seed.unwrap_or_else(|| {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos() as u64
    });

    println!("Landgen - Procedural Terrain Generator");
    println!("======================================");
    println!("Grid: {}x{} cells", x_size, z_size);
    println!("Seed: {}", seed);
    println!("Output: {}", output.display());

    let start = Instant::now();

    let height_config = HeightConfig {
        base_height,
        octaves,
        persistence,
        ..Default::default()
    };
    let river_config = RiverConfig {
        start_width: river_width,
        max_steps: river_steps,
        ..Default::default()
    };
    let smoothing_config = SmoothingConfig {
        transition_range,
        smoothing_strength,
        ..Default::default()
    };

    let mut terrain = Terrain::new(x_size, z_size, seed).unwrap_or_else(|e| {
        eprintln!("Error creating terrain: {}", e);
        std::process::exit(1);
    });

    println!("\nRunning generation pipeline...");
    let pipeline = standard_pipeline(
        BiomeConfig::default(),
        height_config,
        river_config,
        smoothing_config,
    );

    pipeline
        .run_with_callbacks(
            &mut terrain,
            |name, i, total| {
                println!("  [{}/{}] Starting: {}", i + 1, total, name);
            },
            |name, i, total| {
                println!("  [{}/{}] Completed: {}", i + 1, total, name);
            },
        )
        .unwrap_or_else(|e| {
            eprintln!("Error during generation: {}", e);
            std::process::exit(1);
        });

    let gen_time = start.elapsed();
    println!("Generation completed in {:.2?}", gen_time);

    let (min_h, max_h) = terrain.height_range();
    println!("Height range: [{:.4}, {:.4}]", min_h, max_h);

    // Export
    println!("\nExporting...");
    let export_start = Instant::now();

    std::fs::create_dir_all(&output).unwrap_or_else(|e| {
        eprintln!("Error creating output directory: {}", e);
        std::process::exit(1);
    });

    let options = PngExportOptions {
        min_height: min_h,
        max_height: max_h,
        ..Default::default()
    };
    let height_path = output.join(format!("{}_height.png", name));
    export_height_png(&terrain, &height_path, &options).unwrap_or_else(|e| {
        eprintln!("Error exporting PNG: {}", e);
        std::process::exit(1);
    });
    println!("  Exported heightmap: {}_height.png", name);

    if biome_map {
        let biome_path = output.join(format!("{}_biomes.png", name));
        export_biome_map_png(&terrain, &biome_path, &BiomeMapOptions::default()).unwrap_or_else(
            |e| {
                eprintln!("Error exporting biome map: {}", e);
                std::process::exit(1);
            },
        );
        println!("  Exported biome map: {}_biomes.png", name);
    }

    if tree_points {
        // Separate stream from the pipeline rngs.
        let mut rng = ChaCha8Rng::seed_from_u64(seed.wrapping_add(2));
        let points = generate_forest_points(&terrain, tree_radius, tree_attempts, &mut rng);
        let pairs: Vec<[f32; 2]> = points.iter().map(|p| [p.x, p.y]).collect();
        let json = serde_json::to_string_pretty(&pairs).unwrap_or_else(|e| {
            eprintln!("Error serializing tree points: {}", e);
            std::process::exit(1);
        });
        let tree_path = output.join(format!("{}_trees.json", name));
        std::fs::write(&tree_path, json).unwrap_or_else(|e| {
            eprintln!("Error writing tree points: {}", e);
            std::process::exit(1);
        });
        println!("  Exported {} tree points: {}_trees.json", points.len(), name);
    }

    let export_time = export_start.elapsed();
    let total_time = start.elapsed();

    println!("Export completed in {:.2?}", export_time);
    println!("\nTotal time: {:.2?}", total_time);
    println!("Done!");
}

fn run_info(x_size: u32, z_size: u32) {
    let vertices = ((x_size as u64) + 1) * ((z_size as u64) + 1);

    let bytes_heights = vertices * 4; // f32
    let bytes_biomes = vertices; // one byte per label
    let bytes_png = vertices * 2; // 16-bit heightmap
    let bytes_biome_png = vertices * 3; // RGB preview

    println!("Landgen - Terrain Configuration Info");
    println!("=====================================");
    println!();
    println!("Grid: {}x{} cells", x_size, z_size);
    println!("Vertices: {}", vertices);
    println!();
    println!("Memory usage (in-memory):");
    println!(
        "  Heights: {:>12} bytes ({:.2} MB)",
        bytes_heights,
        bytes_heights as f64 / 1024.0 / 1024.0
    );
    println!(
        "  Biomes:  {:>12} bytes ({:.2} MB)",
        bytes_biomes,
        bytes_biomes as f64 / 1024.0 / 1024.0
    );
    let total_memory = bytes_heights + bytes_biomes;
    println!(
        "  Total:   {:>12} bytes ({:.2} MB)",
        total_memory,
        total_memory as f64 / 1024.0 / 1024.0
    );
    println!();
    println!("Export file sizes (uncompressed pixel data):");
    println!(
        "  Heightmap PNG (16-bit): {:>10} bytes ({:.2} MB)",
        bytes_png,
        bytes_png as f64 / 1024.0 / 1024.0
    );
    println!(
        "  Biome map PNG (RGB):    {:>10} bytes ({:.2} MB)",
        bytes_biome_png,
        bytes_biome_png as f64 / 1024.0 / 1024.0
    );
}
