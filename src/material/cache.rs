//! Id-keyed caches for generated shell images and materials.

use std::collections::HashMap;

use bevy::prelude::*;
use rand::Rng;

use crate::texture::{
    NOISE_MASK_DENSITY, NOISE_MASK_NAME, NOISE_MASK_SIZE, PixelGrid, SynthesisError,
    generate_noise_mask,
};

/// Identifies one shell layer of one base material.
///
/// Keyed by asset id rather than display name, so unrelated materials that
/// happen to share a name never collide.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ShellKey {
    pub base: AssetId<StandardMaterial>,
    pub layer: u32,
}

impl ShellKey {
    pub fn new(base: AssetId<StandardMaterial>, layer: u32) -> Self {
        Self { base, layer }
    }
}

/// A generated image kept alive by the cache.
#[derive(Clone, Debug)]
pub struct CachedImage {
    pub name: String,
    pub handle: Handle<Image>,
    /// Pixel data stays resident in the main world.
    pub packed: bool,
}

/// A generated material kept alive by the cache.
#[derive(Clone, Debug)]
pub struct CachedMaterial {
    pub name: String,
    pub handle: Handle<StandardMaterial>,
}

#[derive(Clone, Debug)]
struct NoiseMask {
    image: CachedImage,
    grid: PixelGrid,
}

/// Process-wide store of everything shell generation creates.
///
/// Entries whose asset has been removed from its `Assets` store are treated
/// as missing and regenerated.
#[derive(Resource, Default, Debug)]
pub struct ShellCache {
    noise: Option<NoiseMask>,
    base_images: HashMap<AssetId<StandardMaterial>, CachedImage>,
    shell_images: HashMap<ShellKey, CachedImage>,
    shell_materials: HashMap<ShellKey, CachedMaterial>,
}

/// Display name of a shell layer image.
pub fn shell_image_name(base: &str, layer: u32) -> String {
    format!("ShellTex_{base}_{layer}")
}

/// Display name of a shell layer material.
pub fn shell_material_name(base: &str, layer: u32) -> String {
    format!("Shell_{base}_{layer}")
}

/// Display name of the flat color stand-in for an untextured base.
pub fn flat_base_image_name(base: &str) -> String {
    format!("Temp_Base_{base}")
}

fn register(images: &mut Assets<Image>, name: String, grid: &PixelGrid) -> CachedImage {
    CachedImage {
        name,
        handle: images.add(grid.to_image()),
        packed: true,
    }
}

impl ShellCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Texels of the shared noise mask, generating it on first use.
    pub fn noise_mask<R: Rng + ?Sized>(
        &mut self,
        images: &mut Assets<Image>,
        rng: &mut R,
    ) -> Result<PixelGrid, SynthesisError> {
        if let Some(noise) = &self.noise
            && images.contains(&noise.image.handle)
        {
            debug!("Reusing noise mask '{}'", noise.image.name);
            return Ok(noise.grid.clone());
        }

        let grid = generate_noise_mask(NOISE_MASK_SIZE, NOISE_MASK_DENSITY, rng)?;
        let image = register(images, NOISE_MASK_NAME.to_string(), &grid);
        self.noise = Some(NoiseMask {
            image,
            grid: grid.clone(),
        });
        Ok(grid)
    }

    /// Handle of the noise mask, if it has been generated.
    pub fn noise_handle(&self) -> Option<&Handle<Image>> {
        self.noise.as_ref().map(|n| &n.image.handle)
    }

    /// Flat color image standing in for an untextured base material.
    ///
    /// Created once per base material; later calls return the existing image
    /// even if the color has changed since.
    pub fn flat_base_image(
        &mut self,
        base: AssetId<StandardMaterial>,
        base_name: &str,
        rgba: [f32; 4],
        size: u32,
        images: &mut Assets<Image>,
    ) -> Result<Handle<Image>, SynthesisError> {
        if let Some(cached) = self.base_images.get(&base)
            && images.contains(&cached.handle)
        {
            return Ok(cached.handle.clone());
        }

        let grid = PixelGrid::filled(size, size, rgba)?;
        let cached = register(images, flat_base_image_name(base_name), &grid);
        let handle = cached.handle.clone();
        self.base_images.insert(base, cached);
        Ok(handle)
    }

    pub fn shell_image(&self, key: ShellKey, images: &Assets<Image>) -> Option<Handle<Image>> {
        self.shell_images
            .get(&key)
            .filter(|cached| images.contains(&cached.handle))
            .map(|cached| cached.handle.clone())
    }

    /// Adds a synthesized layer to the image store and caches it.
    pub fn insert_shell_image(
        &mut self,
        key: ShellKey,
        name: String,
        grid: &PixelGrid,
        images: &mut Assets<Image>,
    ) -> Handle<Image> {
        let cached = register(images, name, grid);
        let handle = cached.handle.clone();
        self.shell_images.insert(key, cached);
        handle
    }

    pub fn shell_material(
        &self,
        key: ShellKey,
        materials: &Assets<StandardMaterial>,
    ) -> Option<Handle<StandardMaterial>> {
        self.shell_materials
            .get(&key)
            .filter(|cached| materials.contains(&cached.handle))
            .map(|cached| cached.handle.clone())
    }

    pub fn insert_shell_material(
        &mut self,
        key: ShellKey,
        name: String,
        handle: Handle<StandardMaterial>,
    ) {
        self.shell_materials
            .insert(key, CachedMaterial { name, handle });
    }

    /// Display name of any image this cache created.
    pub fn image_name(&self, id: AssetId<Image>) -> Option<&str> {
        self.noise
            .iter()
            .map(|n| &n.image)
            .chain(self.base_images.values())
            .chain(self.shell_images.values())
            .find(|cached| cached.handle.id() == id)
            .map(|cached| cached.name.as_str())
    }

    /// Whether an image this cache created is marked as packed.
    pub fn is_packed(&self, id: AssetId<Image>) -> bool {
        self.noise
            .iter()
            .map(|n| &n.image)
            .chain(self.base_images.values())
            .chain(self.shell_images.values())
            .any(|cached| cached.handle.id() == id && cached.packed)
    }

    /// Display name of a shell material this cache created.
    pub fn material_name(&self, id: AssetId<StandardMaterial>) -> Option<&str> {
        self.shell_materials
            .values()
            .find(|cached| cached.handle.id() == id)
            .map(|cached| cached.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_names() {
        assert_eq!(shell_image_name("Hair", 3), "ShellTex_Hair_3");
        assert_eq!(shell_material_name("Hair", 0), "Shell_Hair_0");
        assert_eq!(flat_base_image_name("Hair"), "Temp_Base_Hair");
    }

    #[test]
    fn test_noise_mask_generated_once() {
        let mut images = Assets::<Image>::default();
        let mut cache = ShellCache::new();
        let mut rng = StdRng::seed_from_u64(3);

        let first = cache.noise_mask(&mut images, &mut rng).unwrap();
        let handle = cache.noise_handle().cloned().unwrap();
        let second = cache.noise_mask(&mut images, &mut rng).unwrap();

        assert_eq!(first, second);
        assert_eq!(cache.noise_handle().map(|h| h.id()), Some(handle.id()));
        assert_eq!(images.len(), 1);
        assert_eq!(cache.image_name(handle.id()), Some(NOISE_MASK_NAME));
        assert!(cache.is_packed(handle.id()));
    }

    #[test]
    fn test_flat_base_image_is_reused() {
        let mut images = Assets::<Image>::default();
        let mut materials = Assets::<StandardMaterial>::default();
        let base = materials.add(StandardMaterial::default());
        let mut cache = ShellCache::new();

        let a = cache
            .flat_base_image(base.id(), "Body", [1.0, 0.0, 0.0, 1.0], 4, &mut images)
            .unwrap();
        let b = cache
            .flat_base_image(base.id(), "Body", [0.0, 1.0, 0.0, 1.0], 4, &mut images)
            .unwrap();

        assert_eq!(a.id(), b.id());
        assert_eq!(images.len(), 1);
        assert_eq!(cache.image_name(a.id()), Some("Temp_Base_Body"));
    }

    #[test]
    fn test_removed_assets_are_cache_misses() {
        let mut images = Assets::<Image>::default();
        let mut materials = Assets::<StandardMaterial>::default();
        let base = materials.add(StandardMaterial::default());
        let key = ShellKey::new(base.id(), 0);
        let mut cache = ShellCache::new();

        let grid = PixelGrid::filled(2, 2, [1.0; 4]).unwrap();
        let handle = cache.insert_shell_image(key, shell_image_name("Body", 0), &grid, &mut images);
        assert!(cache.shell_image(key, &images).is_some());

        images.remove(&handle);
        assert!(cache.shell_image(key, &images).is_none());
    }

    #[test]
    fn test_keys_distinguish_materials_with_equal_names() {
        let mut images = Assets::<Image>::default();
        let mut materials = Assets::<StandardMaterial>::default();
        let first = materials.add(StandardMaterial::default());
        let second = materials.add(StandardMaterial::default());
        let mut cache = ShellCache::new();

        let grid = PixelGrid::filled(1, 1, [1.0; 4]).unwrap();
        cache.insert_shell_image(
            ShellKey::new(first.id(), 0),
            shell_image_name("Hair", 0),
            &grid,
            &mut images,
        );

        assert!(cache.shell_image(ShellKey::new(first.id(), 0), &images).is_some());
        assert!(cache.shell_image(ShellKey::new(second.id(), 0), &images).is_none());
    }
}
