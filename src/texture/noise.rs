//! Binary alpha noise mask shared by every random-pattern shell.

use rand::Rng;

use super::{PixelGrid, SynthesisError};

/// Display name of the cached noise mask image.
pub const NOISE_MASK_NAME: &str = "VRMHairNoise";

/// Edge length of the noise mask, in texels.
pub const NOISE_MASK_SIZE: u32 = 512;

/// Probability that a noise texel is opaque.
pub const NOISE_MASK_DENSITY: f32 = 0.25;

/// Generates a square white mask whose alpha is 1.0 with probability
/// `density` and 0.0 otherwise.
pub fn generate_noise_mask<R: Rng + ?Sized>(
    size: u32,
    density: f32,
    rng: &mut R,
) -> Result<PixelGrid, SynthesisError> {
    let pixels = (0..size as usize * size as usize)
        .map(|_| {
            let alpha = if rng.random::<f32>() < density { 1.0 } else { 0.0 };
            [1.0, 1.0, 1.0, alpha]
        })
        .collect();

    PixelGrid::new(size, size, pixels, true)
}
