//! User parameters for shell generation.

use bevy::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::error::ShellFurError;
use crate::modifier::ModifierPolicy;

/// Allowed range for [`ShellFurSettings::layers`].
pub const MIN_LAYERS: u32 = 1;
pub const MAX_LAYERS: u32 = 64;

/// Deletion ratio of the outermost (sparsest) shell layer.
pub const DEFAULT_MAX_DELETION: f32 = 0.85;

/// Default offset between consecutive shells, in mesh units.
pub const DEFAULT_THICKNESS: f32 = 0.005;

/// Which UV component drives the taper.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Reflect)]
pub enum TaperAxis {
    /// Horizontal texture coordinate (X).
    #[default]
    U,
    /// Vertical texture coordinate (Y).
    V,
}

impl TaperAxis {
    #[inline]
    pub fn component(self, uv: [f32; 2]) -> f32 {
        match self {
            Self::U => uv[0],
            Self::V => uv[1],
        }
    }
}

/// How texels are removed from a shell layer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Reflect)]
pub enum ShellPattern {
    /// Random texel deletion, modulated by the shared noise mask.
    #[default]
    Random,
    /// Interspaced vertical strands with a fade at each strand tip.
    Vertical,
}

/// Settings for shell fur generation.
///
/// Passed explicitly into every operation; the plugin keeps one copy as a
/// resource for the request systems.
#[derive(Resource, Clone, Debug, Reflect)]
pub struct ShellFurSettings {
    /// Number of shell layers per material.
    /// Range: 1-64. Default: 10
    pub layers: u32,

    /// Offset between consecutive shells along the vertex normal.
    /// Default: 0.005
    pub thickness: f32,

    /// UV component that drives the taper.
    pub taper_axis: TaperAxis,

    /// When `true` the taper grows with the UV component instead of shrinking.
    pub taper_invert: bool,

    /// Texel deletion pattern.
    pub pattern: ShellPattern,

    /// Deletion ratio of the last layer. The first layer is always solid.
    /// Default: 0.85
    pub max_deletion_ratio: f32,

    /// Seed for the shared random fields and the noise mask.
    /// `None` draws from the operating system.
    pub seed: Option<u64>,

    /// What to do when the target already carries the shell modifier.
    pub modifier_policy: ModifierPolicy,
}

impl Default for ShellFurSettings {
    fn default() -> Self {
        Self {
            layers: 10,
            thickness: DEFAULT_THICKNESS,
            taper_axis: TaperAxis::U,
            taper_invert: false,
            pattern: ShellPattern::Random,
            max_deletion_ratio: DEFAULT_MAX_DELETION,
            seed: None,
            modifier_policy: ModifierPolicy::ReuseExisting,
        }
    }
}

impl ShellFurSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_layers(mut self, layers: u32) -> Self {
        self.layers = layers;
        self
    }

    pub fn with_thickness(mut self, thickness: f32) -> Self {
        self.thickness = thickness;
        self
    }

    pub fn with_taper(mut self, axis: TaperAxis, invert: bool) -> Self {
        self.taper_axis = axis;
        self.taper_invert = invert;
        self
    }

    pub fn with_pattern(mut self, pattern: ShellPattern) -> Self {
        self.pattern = pattern;
        self
    }

    pub fn with_max_deletion_ratio(mut self, ratio: f32) -> Self {
        self.max_deletion_ratio = ratio;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_modifier_policy(mut self, policy: ModifierPolicy) -> Self {
        self.modifier_policy = policy;
        self
    }

    /// Check parameter ranges.
    pub fn validate(&self) -> Result<(), ShellFurError> {
        if !(MIN_LAYERS..=MAX_LAYERS).contains(&self.layers) {
            return Err(ShellFurError::InvalidSettings(format!(
                "layers must be in {MIN_LAYERS}..={MAX_LAYERS}, got {}",
                self.layers
            )));
        }

        if !self.thickness.is_finite() {
            return Err(ShellFurError::InvalidSettings(format!(
                "thickness must be finite, got {}",
                self.thickness
            )));
        }

        if !(0.0..=1.0).contains(&self.max_deletion_ratio) {
            return Err(ShellFurError::InvalidSettings(format!(
                "max deletion ratio must be in [0, 1], got {}",
                self.max_deletion_ratio
            )));
        }

        Ok(())
    }

    /// Random number generator for one generation run.
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }
}
