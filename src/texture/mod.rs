//! Shell texture synthesis.
//!
//! A shell texture is a copy of a base texture with a subset of texels made
//! fully transparent. Layers of one material share a [`RandomField`], so the
//! transparent set only grows as the deletion ratio rises.
//!
//! - [`PixelGrid`]: linear RGBA texels, convertible to and from Bevy images
//! - [`synthesize`]: the per-texel deletion, noise and strand fade pass
//! - [`generate_noise_mask`]: the binary alpha mask tiled over random shells

mod format;
mod noise;
mod pixels;
mod synthesize;

use bevy::render::render_resource::TextureDimension;
use thiserror::Error;

pub use format::{format_has_alpha, validate_base_image};
pub use noise::{NOISE_MASK_DENSITY, NOISE_MASK_NAME, NOISE_MASK_SIZE, generate_noise_mask};
pub use pixels::PixelGrid;
pub use synthesize::{FADE_LENGTH, RandomField, STRAND_HEIGHT, strand_fade, synthesize};

/// Errors that can occur while reading or synthesizing a texture.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SynthesisError {
    #[error("Image has no texels: {width}x{height}")]
    EmptyImage { width: u32, height: u32 },

    #[error("Image must be a 2D texture, got {found:?}")]
    NotTwoDimensional { found: TextureDimension },

    #[error("Expected {expected} texels, got {found}")]
    PixelCountMismatch { expected: usize, found: usize },

    #[error("Cannot read texel ({x}, {y}): {reason}")]
    UnreadableTexel { x: u32, y: u32, reason: String },

    #[error("Deletion ratio must be in [0, 1], got {0}")]
    DeletionRatioOutOfRange(f32),

    #[error("Random field has {found} values, expected {expected}")]
    RandomFieldMismatch { expected: usize, found: usize },

    #[error("Random value {value} at index {index} is outside [0, 1)")]
    RandomValueOutOfRange { index: usize, value: f32 },
}
