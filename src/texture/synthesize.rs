//! Alpha-masked shell texture synthesis.

use rand::Rng;

use super::{PixelGrid, SynthesisError};
use crate::settings::ShellPattern;

/// Height of one vertical strand period, in texels.
pub const STRAND_HEIGHT: u32 = 10;

/// Number of texels at the tip of each strand that fade out.
pub const FADE_LENGTH: u32 = 4;

/// Per-texel random values in [0, 1) shared across a whole layer stack.
///
/// Reusing one field for every layer of a material makes sparser layers
/// subsets of denser ones: a texel deleted at ratio `a` stays deleted at any
/// ratio `b >= a`.
#[derive(Clone, Debug, PartialEq)]
pub struct RandomField {
    width: u32,
    height: u32,
    values: Vec<f32>,
}

impl RandomField {
    /// One independent value per texel.
    pub fn per_pixel<R: Rng + ?Sized>(width: u32, height: u32, rng: &mut R) -> Self {
        let values = (0..width as usize * height as usize)
            .map(|_| rng.random::<f32>())
            .collect();
        Self {
            width,
            height,
            values,
        }
    }

    /// One value per column, broadcast down every row.
    pub fn per_column<R: Rng + ?Sized>(width: u32, height: u32, rng: &mut R) -> Self {
        let columns: Vec<f32> = (0..width).map(|_| rng.random::<f32>()).collect();
        let values = (0..height)
            .flat_map(|_| columns.iter().copied())
            .collect();
        Self {
            width,
            height,
            values,
        }
    }

    /// The field a layer stack of `pattern` should share.
    pub fn for_pattern<R: Rng + ?Sized>(
        pattern: ShellPattern,
        width: u32,
        height: u32,
        rng: &mut R,
    ) -> Self {
        match pattern {
            ShellPattern::Random => Self::per_pixel(width, height, rng),
            ShellPattern::Vertical => Self::per_column(width, height, rng),
        }
    }

    /// Wraps caller-supplied values, checking length and range.
    pub fn from_values(width: u32, height: u32, values: Vec<f32>) -> Result<Self, SynthesisError> {
        let expected = width as usize * height as usize;
        if values.len() != expected {
            return Err(SynthesisError::RandomFieldMismatch {
                expected,
                found: values.len(),
            });
        }

        if let Some((index, &value)) = values
            .iter()
            .enumerate()
            .find(|(_, v)| !(0.0..1.0).contains(*v))
        {
            return Err(SynthesisError::RandomValueOutOfRange { index, value });
        }

        Ok(Self {
            width,
            height,
            values,
        })
    }

    #[inline]
    pub fn get(&self, i: usize) -> f32 {
        self.values[i]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Alpha multiplier for the strand tip fade of the vertical pattern.
#[inline]
pub fn strand_fade(y: u32, random: f32) -> f32 {
    let offset = (random * STRAND_HEIGHT as f32).floor() as u32;
    let y_mod = (y + offset) % STRAND_HEIGHT;
    let fade_start = STRAND_HEIGHT - FADE_LENGTH;
    if y_mod >= fade_start {
        1.0 - (y_mod - fade_start) as f32 / FADE_LENGTH as f32
    } else {
        1.0
    }
}

/// Builds one shell layer from `base`.
///
/// # Arguments
/// * `base` - Source texels
/// * `deletion_ratio` - Texels whose random value is below this become transparent (0.0-1.0)
/// * `noise` - Optional tiled mask whose alpha multiplies the base alpha (random pattern only)
/// * `random` - Shared random field; drawn fresh from `rng` when `None`
/// * `pattern` - Deletion pattern
/// * `rng` - Used only when `random` is `None`
///
/// Fully transparent output texels always have their color zeroed.
pub fn synthesize<R: Rng + ?Sized>(
    base: &PixelGrid,
    deletion_ratio: f32,
    noise: Option<&PixelGrid>,
    random: Option<&RandomField>,
    pattern: ShellPattern,
    rng: &mut R,
) -> Result<PixelGrid, SynthesisError> {
    if !(0.0..=1.0).contains(&deletion_ratio) {
        return Err(SynthesisError::DeletionRatioOutOfRange(deletion_ratio));
    }

    let width = base.width();
    let height = base.height();

    let drawn;
    let random = match random {
        Some(field) => {
            if field.dimensions() != (width, height) {
                return Err(SynthesisError::RandomFieldMismatch {
                    expected: base.len(),
                    found: field.len(),
                });
            }
            field
        }
        None => {
            drawn = RandomField::for_pattern(pattern, width, height, rng);
            &drawn
        }
    };

    let noise = match pattern {
        ShellPattern::Random => noise,
        ShellPattern::Vertical => None,
    };

    let mut pixels = Vec::with_capacity(base.len());
    for i in 0..base.len() {
        let x = (i % width as usize) as u32;
        let y = (i / width as usize) as u32;

        let [mut r, mut g, mut b, mut alpha] = base.rgba(i);

        if let Some(noise) = noise {
            alpha *= noise.tiled_alpha(x, y);
        }

        let value = random.get(i);
        if value < deletion_ratio {
            alpha = 0.0;
        }

        if pattern == ShellPattern::Vertical && alpha > 0.0 {
            alpha *= strand_fade(y, value);
        }

        if alpha == 0.0 {
            r = 0.0;
            g = 0.0;
            b = 0.0;
        }

        pixels.push([r, g, b, alpha]);
    }

    PixelGrid::new(width, height, pixels, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    fn red_2x2() -> PixelGrid {
        PixelGrid::filled(2, 2, [1.0, 0.0, 0.0, 1.0]).unwrap()
    }

    #[test]
    fn test_shared_values_decide_deletion() {
        let random = RandomField::from_values(2, 2, vec![0.0, 0.9, 0.1, 0.6]).unwrap();
        let out = synthesize(
            &red_2x2(),
            0.5,
            None,
            Some(&random),
            ShellPattern::Random,
            &mut rng(),
        )
        .unwrap();

        assert_eq!(out.get(0, 0), [0.0, 0.0, 0.0, 0.0]);
        assert_eq!(out.get(1, 0), [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(out.get(0, 1), [0.0, 0.0, 0.0, 0.0]);
        assert_eq!(out.get(1, 1), [1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_zero_ratio_is_identity() {
        let base = PixelGrid::new(
            2,
            1,
            vec![[0.2, 0.4, 0.6, 0.5], [1.0, 1.0, 1.0, 1.0]],
            true,
        )
        .unwrap();
        let out = synthesize(&base, 0.0, None, None, ShellPattern::Random, &mut rng()).unwrap();
        assert_eq!(out, base);
    }

    #[test]
    fn test_base_without_alpha_is_opaque() {
        let base = PixelGrid::new(2, 2, vec![[0.3, 0.3, 0.3, 0.0]; 4], false).unwrap();
        let out = synthesize(&base, 0.0, None, None, ShellPattern::Random, &mut rng()).unwrap();
        assert!(out.has_alpha());
        for y in 0..2 {
            for x in 0..2 {
                assert_eq!(out.get(x, y)[3], 1.0);
            }
        }
    }

    #[test]
    fn test_full_ratio_clears_everything() {
        let base = PixelGrid::filled(8, 8, [0.7, 0.1, 0.9, 1.0]).unwrap();
        for pattern in [ShellPattern::Random, ShellPattern::Vertical] {
            let out = synthesize(&base, 1.0, None, None, pattern, &mut rng()).unwrap();
            assert_eq!(out.visible_count(), 0);
            for y in 0..8 {
                for x in 0..8 {
                    assert_eq!(out.get(x, y), [0.0; 4]);
                }
            }
        }
    }

    #[test]
    fn test_visible_texels_never_grow_with_ratio() {
        let base = PixelGrid::filled(16, 16, [1.0; 4]).unwrap();
        let mut rng = rng();
        for pattern in [ShellPattern::Random, ShellPattern::Vertical] {
            let random = RandomField::for_pattern(pattern, 16, 16, &mut rng);
            let mut previous: Option<PixelGrid> = None;
            for step in 0..=10 {
                let ratio = step as f32 / 10.0;
                let out = synthesize(&base, ratio, None, Some(&random), pattern, &mut rng).unwrap();
                if let Some(prev) = &previous {
                    assert!(out.visible_count() <= prev.visible_count());
                    for i in 0..out.len() {
                        assert!(out.rgba(i)[3] <= prev.rgba(i)[3]);
                    }
                }
                previous = Some(out);
            }
        }
    }

    #[test]
    fn test_noise_multiplies_alpha_with_tiling() {
        let base = PixelGrid::filled(4, 1, [1.0; 4]).unwrap();
        let noise = PixelGrid::new(
            2,
            1,
            vec![[1.0, 1.0, 1.0, 1.0], [1.0, 1.0, 1.0, 0.0]],
            true,
        )
        .unwrap();
        let out = synthesize(
            &base,
            0.0,
            Some(&noise),
            None,
            ShellPattern::Random,
            &mut rng(),
        )
        .unwrap();

        assert_eq!(out.get(0, 0)[3], 1.0);
        assert_eq!(out.get(1, 0), [0.0; 4]);
        assert_eq!(out.get(2, 0)[3], 1.0);
        assert_eq!(out.get(3, 0), [0.0; 4]);
    }

    #[test]
    fn test_noise_ignored_for_vertical() {
        let base = PixelGrid::filled(2, 1, [1.0; 4]).unwrap();
        let noise = PixelGrid::filled(1, 1, [1.0, 1.0, 1.0, 0.0]).unwrap();
        // offset 0, rows 0 lie outside the fade band
        let random = RandomField::from_values(2, 1, vec![0.0, 0.0]).unwrap();
        let out = synthesize(
            &base,
            0.0,
            Some(&noise),
            Some(&random),
            ShellPattern::Vertical,
            &mut rng(),
        )
        .unwrap();
        assert_eq!(out.visible_count(), 2);
    }

    #[test]
    fn test_per_column_field_is_constant_down_columns() {
        let field = RandomField::per_column(5, 7, &mut rng());
        for x in 0..5usize {
            let top = field.get(x);
            for y in 0..7usize {
                assert_eq!(field.get(y * 5 + x), top);
            }
        }
    }

    #[test]
    fn test_vertical_fade_band() {
        // offset = floor(0.05 * 10) = 0, so rows 6..9 fade
        assert_eq!(strand_fade(0, 0.05), 1.0);
        assert_eq!(strand_fade(5, 0.05), 1.0);
        assert_eq!(strand_fade(6, 0.05), 1.0);
        assert_eq!(strand_fade(7, 0.05), 0.75);
        assert_eq!(strand_fade(8, 0.05), 0.5);
        assert_eq!(strand_fade(9, 0.05), 0.25);
        assert_eq!(strand_fade(10, 0.05), 1.0);
        // offset = 3 shifts the band up
        assert_eq!(strand_fade(4, 0.35), 0.75);
    }

    #[test]
    fn test_vertical_columns_share_fade() {
        let base = PixelGrid::filled(3, 20, [1.0; 4]).unwrap();
        let random = RandomField::from_values(
            3,
            20,
            (0..20).flat_map(|_| [0.15, 0.55, 0.95]).collect(),
        )
        .unwrap();
        let out = synthesize(
            &base,
            0.0,
            None,
            Some(&random),
            ShellPattern::Vertical,
            &mut rng(),
        )
        .unwrap();

        for x in 0..3 {
            let value = random.get(x as usize);
            for y in 0..20 {
                assert_eq!(out.get(x, y)[3], strand_fade(y, value));
            }
        }
    }

    #[test]
    fn test_rejects_bad_inputs() {
        let base = red_2x2();
        assert!(matches!(
            synthesize(&base, 1.5, None, None, ShellPattern::Random, &mut rng()),
            Err(SynthesisError::DeletionRatioOutOfRange(_))
        ));

        let wrong = RandomField::from_values(1, 1, vec![0.5]).unwrap();
        assert!(matches!(
            synthesize(&base, 0.5, None, Some(&wrong), ShellPattern::Random, &mut rng()),
            Err(SynthesisError::RandomFieldMismatch { .. })
        ));

        assert!(matches!(
            RandomField::from_values(1, 1, vec![1.0]),
            Err(SynthesisError::RandomValueOutOfRange { index: 0, .. })
        ));
        assert!(RandomField::from_values(2, 1, vec![0.1]).is_err());
    }
}
