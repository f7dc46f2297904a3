//! Texture loading for materials.
//!
//! Loads images from disk into linear float pixels suitable for diffuse
//! modulation during shading.

use std::path::Path;

use glint_math::Color;
use thiserror::Error;

/// Errors that can occur during texture loading.
#[derive(Error, Debug)]
pub enum TextureError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image decoding error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Texture has zero size: {0}")]
    Empty(String),
}

pub type TextureResult<T> = Result<T, TextureError>;

/// A loaded texture with pixel data.
///
/// Stores pixels in linear RGB float format, row-major order. Lookup wraps
/// around in both directions, so texture coordinates outside [0, 1] tile.
#[derive(Clone, Debug)]
pub struct Texture {
    /// Texture width in pixels
    width: u32,

    /// Texture height in pixels
    height: u32,

    /// Pixel data (linear, 0-1 range), row-major order
    pixels: Vec<Color>,
}

impl Texture {
    /// Create a texture from raw pixel data.
    pub fn new(width: u32, height: u32, pixels: Vec<Color>) -> Self {
        debug_assert_eq!((width * height) as usize, pixels.len());
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Load a texture from an image file.
    pub fn load(path: impl AsRef<Path>) -> TextureResult<Self> {
        let path = path.as_ref();
        let img = image::open(path)?.to_rgb8();
        let (width, height) = img.dimensions();
        if width == 0 || height == 0 {
            return Err(TextureError::Empty(path.display().to_string()));
        }

        let pixels = img
            .pixels()
            .map(|p| {
                Color::new(
                    p.0[0] as f32 / 255.0,
                    p.0[1] as f32 / 255.0,
                    p.0[2] as f32 / 255.0,
                )
            })
            .collect();

        log::debug!("loaded texture {} ({}x{})", path.display(), width, height);

        Ok(Self::new(width, height, pixels))
    }

    /// Get the texture width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Get the texture height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Sample the texel at texture coordinates (u, v), wrapping around.
    pub fn sample(&self, u: f32, v: f32) -> Color {
        let x = wrap(u, self.width);
        let y = wrap(v, self.height);
        self.pixels[(y * self.width + x) as usize]
    }
}

/// Map a texture coordinate to a texel index with tiling.
fn wrap(coord: f32, size: u32) -> u32 {
    let scaled = coord - coord.floor();
    let texel = (scaled * size as f32) as u32;
    texel.min(size - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker() -> Texture {
        // 2x2 checkerboard: white / black alternating
        let w = Color::ONE;
        let b = Color::ZERO;
        Texture::new(2, 2, vec![w, b, b, w])
    }

    #[test]
    fn test_sample_corners() {
        let tex = checker();
        assert_eq!(tex.sample(0.0, 0.0), Color::ONE);
        assert_eq!(tex.sample(0.75, 0.0), Color::ZERO);
        assert_eq!(tex.sample(0.75, 0.75), Color::ONE);
    }

    #[test]
    fn test_sample_wraps() {
        let tex = checker();
        // One full tile to the right and below samples the same texel
        assert_eq!(tex.sample(1.25, 1.25), tex.sample(0.25, 0.25));
        // Negative coordinates tile as well
        assert_eq!(tex.sample(-0.75, 0.0), tex.sample(0.25, 0.0));
    }
}
