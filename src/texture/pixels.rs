//! CPU-side RGBA pixel buffers and conversion to and from Bevy images.

use bevy::asset::RenderAssetUsages;
use bevy::image::Image;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};

use super::SynthesisError;
use super::format::{format_has_alpha, validate_base_image};

/// A width x height grid of linear RGBA texels in [0, 1].
///
/// Texels are stored row-major, X varies fastest: `i = y * width + x`.
#[derive(Clone, Debug, PartialEq)]
pub struct PixelGrid {
    width: u32,
    height: u32,
    pixels: Vec<[f32; 4]>,
    has_alpha: bool,
}

impl PixelGrid {
    /// Creates a grid from raw texels.
    ///
    /// `has_alpha = false` means the alpha column of `pixels` is ignored and
    /// read as 1.0.
    pub fn new(
        width: u32,
        height: u32,
        pixels: Vec<[f32; 4]>,
        has_alpha: bool,
    ) -> Result<Self, SynthesisError> {
        if width == 0 || height == 0 {
            return Err(SynthesisError::EmptyImage { width, height });
        }

        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(SynthesisError::PixelCountMismatch {
                expected,
                found: pixels.len(),
            });
        }

        Ok(Self {
            width,
            height,
            pixels,
            has_alpha,
        })
    }

    /// Creates a grid with every texel set to `rgba`.
    pub fn filled(width: u32, height: u32, rgba: [f32; 4]) -> Result<Self, SynthesisError> {
        Self::new(width, height, vec![rgba; width as usize * height as usize], true)
    }

    /// Reads a Bevy image into linear RGBA texels.
    pub fn from_image(image: &Image) -> Result<Self, SynthesisError> {
        validate_base_image(image)?;

        let width = image.width();
        let height = image.height();
        let has_alpha = format_has_alpha(image.texture_descriptor.format);

        let mut pixels = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                let color = image
                    .get_color_at(x, y)
                    .map_err(|e| SynthesisError::UnreadableTexel {
                        x,
                        y,
                        reason: e.to_string(),
                    })?
                    .to_linear();
                pixels.push([color.red, color.green, color.blue, color.alpha]);
            }
        }

        Self::new(width, height, pixels, has_alpha)
    }

    /// Converts the grid into an `Rgba32Float` image whose pixel data stays
    /// resident in the main world.
    pub fn to_image(&self) -> Image {
        let texels: Vec<[f32; 4]> = (0..self.pixels.len()).map(|i| self.rgba(i)).collect();

        Image::new(
            Extent3d {
                width: self.width,
                height: self.height,
                depth_or_array_layers: 1,
            },
            TextureDimension::D2,
            bytemuck::cast_slice(&texels).to_vec(),
            TextureFormat::Rgba32Float,
            RenderAssetUsages::MAIN_WORLD | RenderAssetUsages::RENDER_WORLD,
        )
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of texels.
    #[inline]
    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    #[inline]
    pub fn has_alpha(&self) -> bool {
        self.has_alpha
    }

    /// Texel at linear index `i`, with alpha forced to 1.0 when the source had
    /// no alpha channel.
    #[inline]
    pub fn rgba(&self, i: usize) -> [f32; 4] {
        let [r, g, b, a] = self.pixels[i];
        [r, g, b, if self.has_alpha { a } else { 1.0 }]
    }

    /// Texel at `(x, y)`.
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> [f32; 4] {
        self.rgba(self.index(x, y))
    }

    /// Alpha at `(x mod width, y mod height)`.
    #[inline]
    pub fn tiled_alpha(&self, x: u32, y: u32) -> f32 {
        self.get(x % self.width, y % self.height)[3]
    }

    /// Number of texels with non-zero alpha.
    pub fn visible_count(&self) -> usize {
        (0..self.pixels.len())
            .filter(|&i| self.rgba(i)[3] > 0.0)
            .count()
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }
}
