//! Biome preview map export.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ImageBuffer, ImageEncoder, Rgb};
use thiserror::Error;

use crate::grid::Terrain;

/// Errors that can occur during biome map export.
#[derive(Error, Debug)]
pub enum BiomeMapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),
}

/// Options for biome map export.
#[derive(Debug, Clone)]
pub struct BiomeMapOptions {
    pub compression: CompressionType,
    pub filter: FilterType,
}

impl Default for BiomeMapOptions {
    fn default() -> Self {
        Self {
            compression: CompressionType::Default,
            filter: FilterType::Adaptive,
        }
    }
}

/// Exports the terrain biome labels as an RGB preview PNG, one pixel per
/// vertex.
pub fn export_biome_map_png(
    terrain: &Terrain,
    path: &Path,
    options: &BiomeMapOptions,
) -> Result<(), BiomeMapError> {
    let width = terrain.x_size() + 1;
    let height = terrain.z_size() + 1;

    let mut img: ImageBuffer<Rgb<u8>, Vec<u8>> = ImageBuffer::new(width, height);
    for z in 0..height {
        for x in 0..width {
            img.put_pixel(x, z, Rgb(terrain.biome(x, z).preview_rgb()));
        }
    }

    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let encoder = PngEncoder::new_with_quality(writer, options.compression, options.filter);
    encoder.write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::BiomeType;
    use tempfile::tempdir;

    #[test]
    fn export_biome_map_smoke() {
        let mut terrain = Terrain::new(15, 15, 1).unwrap();
        for z in 0..=7 {
            for x in 0..=15 {
                terrain.set_biome(x, z, BiomeType::DeepOcean);
            }
        }

        let dir = tempdir().unwrap();
        let path = dir.path().join("biomes.png");
        export_biome_map_png(&terrain, &path, &BiomeMapOptions::default()).unwrap();
        assert!(path.exists());
    }
}
