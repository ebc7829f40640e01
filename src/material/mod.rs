//! Shell materials: slot bookkeeping, selection, caches and layer stacks.
//!
//! A shell material is a clone of a base [`StandardMaterial`] whose base color
//! texture is replaced by a synthesized shell texture and whose alpha mode is
//! [`AlphaMode::Blend`](bevy::prelude::AlphaMode::Blend).

mod cache;
mod outline;
mod selection;
mod slots;
mod stack;

pub use cache::{
    CachedImage, CachedMaterial, ShellCache, ShellKey, flat_base_image_name, shell_image_name,
    shell_material_name,
};
pub use outline::{
    MtoonSettings, OutlineProbe, OutlineSettings, OutlineWidthMode, ShadingExtensions,
    ToonAlphaMode, suppress_outlines,
};
pub use selection::{MaterialSelection, SelectionEntry, sync_selection};
pub use slots::{MaterialSlot, MaterialSlots, SlotRanges};
pub use stack::{
    FLAT_BASE_SIZE, ShellAssets, ShellLayer, ShellLayerStack, build_stack, layer_deletion_ratio,
};
