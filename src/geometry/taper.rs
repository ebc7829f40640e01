//! UV-driven taper of shell offsets.

use crate::settings::{ShellFurSettings, TaperAxis};

/// Shrinks shell offsets along one UV axis so strands thin out toward their
/// tips.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Taper {
    pub axis: TaperAxis,
    /// `false`: full offset at 0, none at 1. `true`: the reverse.
    pub invert: bool,
}

impl Taper {
    pub fn new(axis: TaperAxis, invert: bool) -> Self {
        Self { axis, invert }
    }

    pub fn from_settings(settings: &ShellFurSettings) -> Self {
        Self::new(settings.taper_axis, settings.taper_invert)
    }

    /// Offset multiplier in [0, 1] at texture coordinate `uv`.
    #[inline]
    pub fn factor(&self, uv: [f32; 2]) -> f32 {
        let value = self.axis.component(uv);
        if self.invert {
            value.clamp(0.0, 1.0)
        } else {
            (1.0 - value).clamp(0.0, 1.0)
        }
    }
}

/// Distance along the normal of shell `iteration` (0-based).
///
/// The first shell already sits one `thickness` out so it never overlaps the
/// base surface.
#[inline]
pub fn shell_offset(iteration: u32, thickness: f32, taper: f32) -> f32 {
    (iteration + 1) as f32 * thickness * taper
}
