use image::{GrayImage, ImageFormat};
use tracing::debug;

use crate::container::complete_png;
use crate::error::ConvertError;

pub trait HeightmapData
{
    /// Get the bounds of this heightmap (width, height).
    /// Sampled values must be in the [0, size-1] range.
    fn size(&self) -> (u32, u32);

    /// Sample the raw 8 bit intensity at a pixel.
    fn sample(&self, x: u32, y: u32) -> Result<u8, ConvertError>;
}

/// A plain row-major grid of intensities, origin top left
#[derive(Debug, Clone, PartialEq)]
pub struct SampleGrid {
    width: u32,
    height: u32,
    samples: Vec<u8>,
}

impl SampleGrid {
    /// Wrap a row-major buffer. Returns `None` if the buffer length doesn't match the size.
    pub fn from_raw(width: u32, height: u32, samples: Vec<u8>) -> Option<SampleGrid> {
        let expected = (width as usize).checked_mul(height as usize)?;
        if samples.len() != expected {
            return None;
        }

        Some(SampleGrid { width, height, samples })
    }

    /// Build a grid from rows of equal length
    pub fn from_rows(rows: &[&[u8]]) -> Option<SampleGrid> {
        let width = rows.first().map_or(0, |r| r.len());
        if rows.iter().any(|r| r.len() != width) {
            return None;
        }

        let samples = rows.iter().flat_map(|r| r.iter().copied()).collect();
        SampleGrid::from_raw(width as u32, rows.len() as u32, samples)
    }
}

impl HeightmapData for SampleGrid
{
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn sample(&self, x: u32, y: u32) -> Result<u8, ConvertError>
    {
        if x >= self.width || y >= self.height {
            return Err(ConvertError::SampleOutOfBounds { x, y });
        }

        let i = x as usize                          // Offset by columns
              + y as usize * self.width as usize;   // Offset by rows

        Ok(self.samples[i])
    }
}

/// Wrap a decoded grayscale image as a heightmap
pub struct ImageHeightmap {
    pub texture: GrayImage,
}

impl ImageHeightmap {
    /// Decode PNG bytes and reduce them to a single luminance channel.
    /// Accepts a stream cut off right after the `IEND` tag, as extracted from a container.
    pub fn decode(png: &[u8]) -> Result<ImageHeightmap, ConvertError>
    {
        let png = complete_png(png);
        let texture = image::load_from_memory_with_format(&png, ImageFormat::Png)?.into_luma8();
        debug!("Decoded {}x{} heightmap", texture.width(), texture.height());

        Ok(ImageHeightmap { texture })
    }
}

impl HeightmapData for ImageHeightmap
{
    fn size(&self) -> (u32, u32) {
        self.texture.dimensions()
    }

    fn sample(&self, x: u32, y: u32) -> Result<u8, ConvertError>
    {
        if x >= self.texture.width() || y >= self.texture.height() {
            return Err(ConvertError::SampleOutOfBounds { x, y });
        }

        Ok(self.texture.get_pixel(x, y)[0])
    }
}
