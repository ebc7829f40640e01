//! Texture format checks for base and shell images.

use bevy::image::Image;
use bevy::render::render_resource::{TextureDimension, TextureFormat};

use super::SynthesisError;

/// Check if a texture format carries an alpha channel.
///
/// Formats without one are read with alpha 1.0.
pub fn format_has_alpha(format: TextureFormat) -> bool {
    matches!(
        format,
        // Uncompressed 8-bit
        TextureFormat::Rgba8Unorm
            | TextureFormat::Rgba8UnormSrgb
            | TextureFormat::Rgba8Snorm
            | TextureFormat::Bgra8Unorm
            | TextureFormat::Bgra8UnormSrgb
            // Uncompressed 16/32-bit
            | TextureFormat::Rgba16Unorm
            | TextureFormat::Rgba16Snorm
            | TextureFormat::Rgba16Float
            | TextureFormat::Rgba32Float
            | TextureFormat::Rgb10a2Unorm
            // BC compressed with alpha
            | TextureFormat::Bc1RgbaUnorm
            | TextureFormat::Bc1RgbaUnormSrgb
            | TextureFormat::Bc2RgbaUnorm
            | TextureFormat::Bc2RgbaUnormSrgb
            | TextureFormat::Bc3RgbaUnorm
            | TextureFormat::Bc3RgbaUnormSrgb
            | TextureFormat::Bc7RgbaUnorm
            | TextureFormat::Bc7RgbaUnormSrgb
            // ETC2 with alpha
            | TextureFormat::Etc2Rgb8A1Unorm
            | TextureFormat::Etc2Rgb8A1UnormSrgb
            | TextureFormat::Etc2Rgba8Unorm
            | TextureFormat::Etc2Rgba8UnormSrgb
    )
}

/// Validate that an image can serve as a shell base texture.
pub fn validate_base_image(image: &Image) -> Result<(), SynthesisError> {
    if image.texture_descriptor.dimension != TextureDimension::D2 {
        return Err(SynthesisError::NotTwoDimensional {
            found: image.texture_descriptor.dimension,
        });
    }

    let size = image.texture_descriptor.size;
    if size.width == 0 || size.height == 0 {
        return Err(SynthesisError::EmptyImage {
            width: size.width,
            height: size.height,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alpha_formats() {
        assert!(format_has_alpha(TextureFormat::Rgba8UnormSrgb));
        assert!(format_has_alpha(TextureFormat::Rgba32Float));
        assert!(format_has_alpha(TextureFormat::Bc7RgbaUnormSrgb));
    }

    #[test]
    fn test_formats_without_alpha() {
        assert!(!format_has_alpha(TextureFormat::R8Unorm));
        assert!(!format_has_alpha(TextureFormat::Rg8Unorm));
        assert!(!format_has_alpha(TextureFormat::Bc5RgUnorm));
        assert!(!format_has_alpha(TextureFormat::R32Float));
    }
}
