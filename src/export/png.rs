//! PNG export functionality for heightmaps.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ImageBuffer, ImageEncoder, Luma};
use thiserror::Error;

use crate::grid::Terrain;

/// Errors that can occur during PNG export.
#[derive(Error, Debug)]
pub enum PngExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Invalid height range: min ({0}) >= max ({1})")]
    InvalidHeightRange(f32, f32),
}

/// Options for PNG export.
#[derive(Debug, Clone)]
pub struct PngExportOptions {
    /// Minimum height value for normalization.
    pub min_height: f32,
    /// Maximum height value for normalization.
    pub max_height: f32,
    /// PNG compression type.
    pub compression: CompressionType,
    /// PNG filter type.
    pub filter: FilterType,
}

impl Default for PngExportOptions {
    fn default() -> Self {
        Self {
            min_height: -1.0,
            max_height: 8.0,
            compression: CompressionType::Default,
            filter: FilterType::Adaptive,
        }
    }
}

impl PngExportOptions {
    /// Creates options with auto-detected height range from the terrain.
    pub fn auto_range(terrain: &Terrain) -> Self {
        let (min, max) = terrain.height_range();
        Self {
            min_height: min,
            max_height: max,
            ..Default::default()
        }
    }
}

/// Exports the terrain height map as a 16-bit grayscale PNG.
///
/// One pixel per vertex; heights are normalized into the configured range
/// and clamped.
pub fn export_height_png(
    terrain: &Terrain,
    path: &Path,
    options: &PngExportOptions,
) -> Result<(), PngExportError> {
    let min = options.min_height;
    let max = options.max_height;

    if min >= max {
        return Err(PngExportError::InvalidHeightRange(min, max));
    }

    let width = terrain.x_size() + 1;
    let height_px = terrain.z_size() + 1;
    let range = max - min;

    let mut img: ImageBuffer<Luma<u16>, Vec<u16>> = ImageBuffer::new(width, height_px);
    for z in 0..height_px {
        for x in 0..width {
            let h = terrain.height(x, z);
            let normalized = ((h - min) / range).clamp(0.0, 1.0);
            let value = (normalized * 65535.0) as u16;
            img.put_pixel(x, z, Luma([value]));
        }
    }

    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let encoder = PngEncoder::new_with_quality(writer, options.compression, options.filter);

    // Convert u16 slice to bytes for the encoder
    let raw_data = img.as_raw();
    let byte_slice: &[u8] = bytemuck::cast_slice(raw_data);

    encoder.write_image(byte_slice, width, height_px, image::ExtendedColorType::L16)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_export_height_png() {
        let mut terrain = Terrain::new(63, 63, 1).unwrap();
        // Gradient for testing
        for z in 0..=63 {
            for x in 0..=63 {
                let h = (x as f32 + z as f32) / 126.0 * 9.0 - 1.0;
                terrain.set_height(x, z, h);
            }
        }

        let dir = tempdir().unwrap();
        let path = dir.path().join("test.png");

        let options = PngExportOptions::default();
        export_height_png(&terrain, &path, &options).unwrap();

        assert!(path.exists());
        let metadata = std::fs::metadata(&path).unwrap();
        assert!(metadata.len() > 0);
    }

    #[test]
    fn test_invalid_height_range() {
        let terrain = Terrain::new(15, 15, 1).unwrap();
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.png");

        let options = PngExportOptions {
            min_height: 1.0,
            max_height: -1.0, // Invalid: min > max
            ..Default::default()
        };

        let result = export_height_png(&terrain, &path, &options);
        assert!(result.is_err());
    }

    #[test]
    fn test_auto_range() {
        let mut terrain = Terrain::new(15, 15, 1).unwrap();
        terrain.set_height(0, 0, -0.5);
        terrain.set_height(15, 15, 6.75);

        let options = PngExportOptions::auto_range(&terrain);
        assert_eq!(options.min_height, -0.5);
        assert_eq!(options.max_height, 6.75);
    }
}
