//! Plugin for shell fur generation.
use bevy::prelude::*;

use crate::graph::GraphLibrary;
use crate::material::{ShadingExtensions, ShellCache};
use crate::settings::ShellFurSettings;
use crate::systems::{
    ShellFurSystems, apply_shell_modifiers, generate_shell_fur, suppress_shell_outlines,
    sync_shell_materials,
};

/// Plugin that adds shell fur generation to Bevy.
///
/// This plugin registers:
/// - [`ShellFurSettings`], [`ShellCache`], [`ShadingExtensions`] and
///   [`GraphLibrary`] resources
/// - The request systems in [`ShellFurSystems`]
///
/// # Example
/// ```ignore
/// use bevy::prelude::*;
/// use bevy_shell_fur::prelude::*;
///
/// App::new()
///     .add_plugins(DefaultPlugins)
///     .add_plugins(ShellFurPlugin)
///     .insert_resource(ShellFurSettings::new().with_layers(16))
///     .run();
/// ```
pub struct ShellFurPlugin;

impl Plugin for ShellFurPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<ShellFurSettings>()
            .init_resource::<ShellFurSettings>()
            .init_resource::<ShellCache>()
            .init_resource::<ShadingExtensions>()
            .init_resource::<GraphLibrary>()
            .add_systems(
                Update,
                (
                    sync_shell_materials,
                    generate_shell_fur,
                    suppress_shell_outlines,
                    apply_shell_modifiers,
                )
                    .chain()
                    .in_set(ShellFurSystems),
            );
    }
}
