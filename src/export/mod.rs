//! Export module for saving terrain data to image formats.
//!
//! Supports 16-bit grayscale PNG heightmaps for universal compatibility
//! and RGB biome preview maps.

mod biome_map;
mod png;

pub use biome_map::{export_biome_map_png, BiomeMapError, BiomeMapOptions};
pub use png::{export_height_png, PngExportError, PngExportOptions};
