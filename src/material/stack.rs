//! Per-material shell layer stacks.

use bevy::prelude::*;
use rand::Rng;

use super::cache::{ShellCache, ShellKey, shell_image_name, shell_material_name};
use super::outline::ShadingExtensions;
use crate::error::ShellFurError;
use crate::settings::ShellFurSettings;
use crate::texture::{PixelGrid, RandomField, synthesize};

/// Edge length of the flat color image used for untextured base materials.
pub const FLAT_BASE_SIZE: u32 = 512;

/// Asset stores and caches touched by shell generation.
pub struct ShellAssets<'a> {
    pub images: &'a mut Assets<Image>,
    pub materials: &'a mut Assets<StandardMaterial>,
    pub cache: &'a mut ShellCache,
    pub extensions: &'a mut ShadingExtensions,
}

/// One shell layer of a base material.
#[derive(Clone, Debug)]
pub struct ShellLayer {
    pub layer: u32,
    pub deletion_ratio: f32,
    pub image: Handle<Image>,
    pub material: Handle<StandardMaterial>,
    pub material_name: String,
}

/// All shell layers of one base material, innermost (solid) first.
#[derive(Clone, Debug)]
pub struct ShellLayerStack {
    /// Slot of the base material on the target mesh.
    pub base_slot: usize,
    pub base_name: String,
    pub layers: Vec<ShellLayer>,
}

impl ShellLayerStack {
    #[inline]
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn deletion_ratios(&self) -> Vec<f32> {
        self.layers.iter().map(|l| l.deletion_ratio).collect()
    }
}

#[cfg(test)]
impl ShellLayerStack {
    /// Stack of `layers` entries with default handles, for slot bookkeeping.
    pub(crate) fn placeholder(base_slot: usize, base_name: &str, layers: u32) -> Self {
        Self {
            base_slot,
            base_name: base_name.to_string(),
            layers: (0..layers)
                .map(|layer| ShellLayer {
                    layer,
                    deletion_ratio: 0.0,
                    image: Handle::default(),
                    material: Handle::default(),
                    material_name: shell_material_name(base_name, layer),
                })
                .collect(),
        }
    }
}

/// Deletion ratio of `layer` out of `layers`: 0 for the first layer, rising
/// linearly to `max_deletion` for the last.
pub fn layer_deletion_ratio(layer: u32, layers: u32, max_deletion: f32) -> f32 {
    if layers <= 1 {
        return 0.0;
    }
    max_deletion * (layer as f32 / (layers - 1) as f32)
}

/// Builds (or fetches from the cache) every shell layer of one base material.
///
/// # Arguments
/// * `base` - The base material
/// * `base_slot` - Its slot on the target mesh
/// * `base_name` - Display name used for generated assets
/// * `noise` - Noise mask tiled over random-pattern layers
/// * `settings` - Layer count, pattern and maximum deletion ratio
/// * `assets` - Stores receiving the generated images and materials
/// * `rng` - Source for the stack's shared random field
pub fn build_stack<R: Rng + ?Sized>(
    base: &Handle<StandardMaterial>,
    base_slot: usize,
    base_name: &str,
    noise: Option<&PixelGrid>,
    settings: &ShellFurSettings,
    assets: &mut ShellAssets,
    rng: &mut R,
) -> Result<ShellLayerStack, ShellFurError> {
    let base_material = assets.materials.get(base).cloned().ok_or_else(|| {
        ShellFurError::UnresolvableBaseImage {
            material: base_name.to_string(),
        }
    })?;

    let base_pixels = resolve_base_pixels(base.id(), &base_material, base_name, assets)?;
    let random = RandomField::for_pattern(
        settings.pattern,
        base_pixels.width(),
        base_pixels.height(),
        rng,
    );

    let mut layers = Vec::with_capacity(settings.layers as usize);
    for layer in 0..settings.layers {
        let key = ShellKey::new(base.id(), layer);
        let deletion_ratio =
            layer_deletion_ratio(layer, settings.layers, settings.max_deletion_ratio);

        let image = match assets.cache.shell_image(key, assets.images) {
            Some(image) => {
                debug!("Reusing shell image {}", shell_image_name(base_name, layer));
                image
            }
            None => {
                let grid = synthesize(
                    &base_pixels,
                    deletion_ratio,
                    noise,
                    Some(&random),
                    settings.pattern,
                    rng,
                )?;
                assets.cache.insert_shell_image(
                    key,
                    shell_image_name(base_name, layer),
                    &grid,
                    assets.images,
                )
            }
        };

        let material_name = shell_material_name(base_name, layer);
        let material = match assets.cache.shell_material(key, assets.materials) {
            Some(material) => {
                // the layer image may have been regenerated since the material was cached
                if let Some(shell) = assets.materials.get_mut(&material) {
                    if shell.base_color_texture.as_ref().map(Handle::id) != Some(image.id()) {
                        shell.base_color_texture = Some(image.clone());
                    }
                    shell.alpha_mode = AlphaMode::Blend;
                }
                material
            }
            None => {
                let shell = StandardMaterial {
                    base_color_texture: Some(image.clone()),
                    alpha_mode: AlphaMode::Blend,
                    ..base_material.clone()
                };
                let handle = assets.materials.add(shell);
                assets
                    .cache
                    .insert_shell_material(key, material_name.clone(), handle.clone());
                handle
            }
        };
        assets.extensions.enable_shell_shading(&material);

        layers.push(ShellLayer {
            layer,
            deletion_ratio,
            image,
            material,
            material_name,
        });
    }

    Ok(ShellLayerStack {
        base_slot,
        base_name: base_name.to_string(),
        layers,
    })
}

/// Texels of the base color texture, or of a cached flat color image when the
/// material has no usable texture.
fn resolve_base_pixels(
    base: AssetId<StandardMaterial>,
    material: &StandardMaterial,
    base_name: &str,
    assets: &mut ShellAssets,
) -> Result<PixelGrid, ShellFurError> {
    if let Some(image) = material
        .base_color_texture
        .as_ref()
        .and_then(|handle| assets.images.get(handle))
    {
        return Ok(PixelGrid::from_image(image)?);
    }

    let color = material.base_color.to_linear();
    let rgba = [color.red, color.green, color.blue, color.alpha];
    if !rgba.iter().all(|c| c.is_finite()) {
        return Err(ShellFurError::UnresolvableBaseImage {
            material: base_name.to_string(),
        });
    }

    let handle = assets
        .cache
        .flat_base_image(base, base_name, rgba, FLAT_BASE_SIZE, assets.images)?;
    let image = assets
        .images
        .get(&handle)
        .ok_or_else(|| ShellFurError::UnresolvableBaseImage {
            material: base_name.to_string(),
        })?;
    Ok(PixelGrid::from_image(image)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::ShellPattern;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    struct Stores {
        images: Assets<Image>,
        materials: Assets<StandardMaterial>,
        cache: ShellCache,
        extensions: ShadingExtensions,
    }

    impl Stores {
        fn new() -> Self {
            Self {
                images: Assets::default(),
                materials: Assets::default(),
                cache: ShellCache::new(),
                extensions: ShadingExtensions::new(),
            }
        }

        fn assets(&mut self) -> ShellAssets<'_> {
            ShellAssets {
                images: &mut self.images,
                materials: &mut self.materials,
                cache: &mut self.cache,
                extensions: &mut self.extensions,
            }
        }
    }

    fn textured(stores: &mut Stores, size: u32) -> Handle<StandardMaterial> {
        let texture = stores
            .images
            .add(PixelGrid::filled(size, size, [0.2, 0.6, 0.9, 1.0]).unwrap().to_image());
        stores.materials.add(StandardMaterial {
            base_color_texture: Some(texture),
            ..default()
        })
    }

    #[test]
    fn test_ratios() {
        assert_eq!(layer_deletion_ratio(0, 1, 0.85), 0.0);
        let ratios: Vec<f32> = (0..3).map(|l| layer_deletion_ratio(l, 3, 0.85)).collect();
        assert!((ratios[0] - 0.0).abs() < 1e-6);
        assert!((ratios[1] - 0.425).abs() < 1e-6);
        assert!((ratios[2] - 0.85).abs() < 1e-6);
    }

    #[test]
    fn test_single_layer_is_solid() {
        let mut stores = Stores::new();
        let base = textured(&mut stores, 8);
        let settings = ShellFurSettings::new().with_layers(1).with_seed(1);

        let stack = build_stack(
            &base,
            0,
            "Hair",
            None,
            &settings,
            &mut stores.assets(),
            &mut settings.rng(),
        )
        .unwrap();

        assert_eq!(stack.deletion_ratios(), vec![0.0]);
        let image = stores.images.get(&stack.layers[0].image).unwrap();
        assert_eq!(PixelGrid::from_image(image).unwrap().visible_count(), 64);
    }

    #[test]
    fn test_stack_layers_are_nested() {
        let mut stores = Stores::new();
        let base = textured(&mut stores, 16);
        let settings = ShellFurSettings::new().with_layers(4).with_seed(5);

        let stack = build_stack(
            &base,
            2,
            "Hair",
            None,
            &settings,
            &mut stores.assets(),
            &mut settings.rng(),
        )
        .unwrap();

        assert_eq!(stack.len(), 4);
        assert_eq!(stack.base_slot, 2);

        let grids: Vec<PixelGrid> = stack
            .layers
            .iter()
            .map(|l| PixelGrid::from_image(stores.images.get(&l.image).unwrap()).unwrap())
            .collect();
        for pair in grids.windows(2) {
            for i in 0..pair[0].len() {
                if pair[0].rgba(i)[3] == 0.0 {
                    assert_eq!(pair[1].rgba(i)[3], 0.0);
                }
            }
        }
    }

    #[test]
    fn test_shell_materials_blend_with_shell_texture() {
        let mut stores = Stores::new();
        let base = textured(&mut stores, 4);
        let settings = ShellFurSettings::new().with_layers(2).with_seed(2);

        let stack = build_stack(
            &base,
            0,
            "Hair",
            None,
            &settings,
            &mut stores.assets(),
            &mut settings.rng(),
        )
        .unwrap();

        for layer in &stack.layers {
            let material = stores.materials.get(&layer.material).unwrap();
            assert_eq!(material.alpha_mode, AlphaMode::Blend);
            assert_eq!(
                material.base_color_texture.as_ref().map(|h| h.id()),
                Some(layer.image.id())
            );
            assert!(!stores.extensions.get(&layer.material).unwrap().outline.is_visible());
        }
        assert_eq!(stack.layers[1].material_name, "Shell_Hair_1");
        assert_eq!(
            stores.cache.image_name(stack.layers[1].image.id()),
            Some("ShellTex_Hair_1")
        );
        assert!(stores.cache.is_packed(stack.layers[1].image.id()));
    }

    #[test]
    fn test_rebuild_reuses_cached_layers() {
        let mut stores = Stores::new();
        let base = textured(&mut stores, 4);
        let settings = ShellFurSettings::new().with_layers(3).with_seed(2);

        let first = build_stack(
            &base,
            0,
            "Hair",
            None,
            &settings,
            &mut stores.assets(),
            &mut settings.rng(),
        )
        .unwrap();
        let image_count = stores.images.len();
        let material_count = stores.materials.len();

        let second = build_stack(
            &base,
            0,
            "Hair",
            None,
            &settings,
            &mut stores.assets(),
            &mut settings.rng(),
        )
        .unwrap();

        assert_eq!(stores.images.len(), image_count);
        assert_eq!(stores.materials.len(), material_count);
        for (a, b) in first.layers.iter().zip(&second.layers) {
            assert_eq!(a.image.id(), b.image.id());
            assert_eq!(a.material.id(), b.material.id());
        }
    }

    #[test]
    fn test_cached_material_rebinds_regenerated_image() {
        let mut stores = Stores::new();
        let base = textured(&mut stores, 4);
        let settings = ShellFurSettings::new().with_layers(3).with_seed(8);

        let first = build_stack(
            &base,
            0,
            "Hair",
            None,
            &settings,
            &mut stores.assets(),
            &mut settings.rng(),
        )
        .unwrap();
        stores.images.remove(&first.layers[1].image);

        let second = build_stack(
            &base,
            0,
            "Hair",
            None,
            &settings,
            &mut stores.assets(),
            &mut settings.rng(),
        )
        .unwrap();

        let layer = &second.layers[1];
        assert_ne!(layer.image.id(), first.layers[1].image.id());
        assert_eq!(layer.material.id(), first.layers[1].material.id());
        let material = stores.materials.get(&layer.material).unwrap();
        assert_eq!(
            material.base_color_texture.as_ref().map(|h| h.id()),
            Some(layer.image.id())
        );
        assert_eq!(material.alpha_mode, AlphaMode::Blend);
        assert!(stores.images.contains(&layer.image));
    }

    #[test]
    fn test_untextured_base_uses_flat_color() {
        let mut stores = Stores::new();
        let base = stores.materials.add(StandardMaterial {
            base_color: Color::linear_rgba(0.5, 0.25, 0.0, 1.0),
            ..default()
        });
        let settings = ShellFurSettings::new()
            .with_layers(1)
            .with_pattern(ShellPattern::Vertical)
            .with_seed(4);

        let stack = build_stack(
            &base,
            0,
            "Skin",
            None,
            &settings,
            &mut stores.assets(),
            &mut settings.rng(),
        )
        .unwrap();

        let grid =
            PixelGrid::from_image(stores.images.get(&stack.layers[0].image).unwrap()).unwrap();
        assert_eq!(grid.width(), FLAT_BASE_SIZE);
        // layer 0 keeps every texel; only the strand fade touches alpha
        let [r, g, b, _] = grid.get(0, 0);
        assert_eq!([r, g, b], [0.5, 0.25, 0.0]);
    }

    #[test]
    fn test_missing_base_material_is_unresolvable() {
        let mut stores = Stores::new();
        let base = stores.materials.add(StandardMaterial::default());
        stores.materials.remove(&base);
        let settings = ShellFurSettings::new().with_seed(1);

        let result = build_stack(
            &base,
            0,
            "Gone",
            None,
            &settings,
            &mut stores.assets(),
            &mut settings.rng(),
        );
        assert!(matches!(
            result,
            Err(ShellFurError::UnresolvableBaseImage { material }) if material == "Gone"
        ));
    }

    #[test]
    fn test_non_finite_color_is_unresolvable() {
        let mut stores = Stores::new();
        let base = stores.materials.add(StandardMaterial {
            base_color: Color::linear_rgba(f32::NAN, 0.0, 0.0, 1.0),
            ..default()
        });
        let settings = ShellFurSettings::new().with_seed(1);

        let result = build_stack(
            &base,
            0,
            "Broken",
            None,
            &settings,
            &mut stores.assets(),
            &mut settings.rng(),
        );
        assert!(matches!(
            result,
            Err(ShellFurError::UnresolvableBaseImage { .. })
        ));
    }
}
