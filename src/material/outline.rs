//! Toon shading extension data and outline suppression.
//!
//! Bevy's [`StandardMaterial`] has no outline pass. Materials imported from
//! toon pipelines (MToon) carry their outline and transparency settings here,
//! keyed by material id. A material without an entry simply has no extension.

use std::collections::HashMap;

use bevy::prelude::*;

use super::selection::MaterialSelection;
use crate::error::ShellFurError;

/// How the outline width is interpreted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum OutlineWidthMode {
    /// Outline disabled.
    #[default]
    None,
    WorldCoordinates,
    ScreenCoordinates,
}

/// Outline pass settings.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct OutlineSettings {
    pub mode: OutlineWidthMode,
    pub width_factor: f32,
}

impl OutlineSettings {
    /// Outline turned off.
    pub const NONE: Self = Self {
        mode: OutlineWidthMode::None,
        width_factor: 0.0,
    };

    #[inline]
    pub fn is_visible(&self) -> bool {
        self.mode != OutlineWidthMode::None && self.width_factor > 0.0
    }
}

/// Transparency mode of the toon extension.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ToonAlphaMode {
    #[default]
    Opaque,
    Mask,
    Blend,
}

/// Toon shading extension of one material.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MtoonSettings {
    pub enabled: bool,
    pub alpha_mode: ToonAlphaMode,
    pub transparent_with_z_write: bool,
    pub outline: OutlineSettings,
}

impl MtoonSettings {
    /// Settings for a shell layer: blended, no depth writes, no outline.
    pub const SHELL: Self = Self {
        enabled: true,
        alpha_mode: ToonAlphaMode::Blend,
        transparent_with_z_write: false,
        outline: OutlineSettings::NONE,
    };
}

/// Result of asking whether a material exposes outline settings.
#[derive(Debug)]
pub enum OutlineProbe<'a> {
    Available(&'a mut OutlineSettings),
    Missing(ShellFurError),
}

/// Toon extensions of all materials that have one.
#[derive(Resource, Default, Debug)]
pub struct ShadingExtensions {
    materials: HashMap<AssetId<StandardMaterial>, MtoonSettings>,
}

impl ShadingExtensions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, material: impl Into<AssetId<StandardMaterial>>, settings: MtoonSettings) {
        self.materials.insert(material.into(), settings);
    }

    pub fn get(&self, material: impl Into<AssetId<StandardMaterial>>) -> Option<&MtoonSettings> {
        self.materials.get(&material.into())
    }

    pub fn contains(&self, material: impl Into<AssetId<StandardMaterial>>) -> bool {
        self.materials.contains_key(&material.into())
    }

    /// Enables the extension on a shell layer material, outline off.
    pub fn enable_shell_shading(&mut self, material: impl Into<AssetId<StandardMaterial>>) {
        self.materials.insert(material.into(), MtoonSettings::SHELL);
    }

    /// Probes `material` for outline settings.
    pub fn probe_outline(
        &mut self,
        material: impl Into<AssetId<StandardMaterial>>,
        name: &str,
    ) -> OutlineProbe<'_> {
        match self.materials.get_mut(&material.into()) {
            Some(settings) => OutlineProbe::Available(&mut settings.outline),
            None => OutlineProbe::Missing(ShellFurError::ShadingExtensionMissing {
                material: name.to_string(),
            }),
        }
    }
}

/// Turns off outlines on every checked base material.
///
/// Materials without the toon extension are skipped. Returns how many
/// materials were changed.
pub fn suppress_outlines(selection: &MaterialSelection, extensions: &mut ShadingExtensions) -> usize {
    let mut count = 0;
    for (slot, name, material) in selection.checked() {
        match extensions.probe_outline(material, name) {
            OutlineProbe::Available(outline) => {
                *outline = OutlineSettings::NONE;
                count += 1;
            }
            OutlineProbe::Missing(err) => {
                debug!("Skipping slot {slot}: {err}");
            }
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::{MaterialSlots, sync_selection};

    fn visible_outline() -> MtoonSettings {
        MtoonSettings {
            enabled: true,
            outline: OutlineSettings {
                mode: OutlineWidthMode::WorldCoordinates,
                width_factor: 0.02,
            },
            ..default()
        }
    }

    #[test]
    fn test_probe() {
        let mut materials = Assets::<StandardMaterial>::default();
        let with = materials.add(StandardMaterial::default());
        let without = materials.add(StandardMaterial::default());

        let mut extensions = ShadingExtensions::new();
        extensions.insert(&with, visible_outline());

        assert!(matches!(
            extensions.probe_outline(&with, "With"),
            OutlineProbe::Available(_)
        ));
        match extensions.probe_outline(&without, "Without") {
            OutlineProbe::Missing(ShellFurError::ShadingExtensionMissing { material }) => {
                assert_eq!(material, "Without")
            }
            other => panic!("unexpected probe result: {other:?}"),
        }
    }

    #[test]
    fn test_suppress_counts_only_materials_with_extension() {
        let mut materials = Assets::<StandardMaterial>::default();
        let body = materials.add(StandardMaterial::default());
        let hair = materials.add(StandardMaterial::default());
        let eyes = materials.add(StandardMaterial::default());

        let mut extensions = ShadingExtensions::new();
        extensions.insert(&body, visible_outline());
        extensions.insert(&hair, visible_outline());

        let slots = MaterialSlots::new()
            .with_slot("Body", body.clone())
            .with_slot("Hair", hair.clone())
            .with_slot("Eyes", eyes.clone());
        let mut selection = sync_selection(&slots);
        selection.set_enabled(0, false);

        let count = suppress_outlines(&selection, &mut extensions);
        assert_eq!(count, 1);

        assert!(extensions.get(&body).unwrap().outline.is_visible());
        assert_eq!(extensions.get(&hair).unwrap().outline, OutlineSettings::NONE);
        assert!(!extensions.contains(&eyes));
    }

    #[test]
    fn test_shell_shading() {
        let mut materials = Assets::<StandardMaterial>::default();
        let shell = materials.add(StandardMaterial::default());
        let mut extensions = ShadingExtensions::new();
        extensions.enable_shell_shading(&shell);

        let settings = extensions.get(&shell).unwrap();
        assert!(settings.enabled);
        assert_eq!(settings.alpha_mode, ToonAlphaMode::Blend);
        assert!(!settings.transparent_with_z_write);
        assert!(!settings.outline.is_visible());
    }
}
