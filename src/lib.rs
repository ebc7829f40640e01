//! # bevy_shell_fur
//!
//! Shell-texturing fur and hair for Bevy meshes.
//!
//! ## Features
//!
//! - Stacks of alpha-masked shell textures synthesized from a base texture
//!   or flat color
//! - Random and vertical-strand deletion patterns with a tiled noise mask
//! - Per-(material, layer) shell materials cached by asset id
//! - A declarative shell graph with a node-tree view and a CPU evaluator
//! - Outline suppression for toon-shaded base materials
//!
//! ## Quick Start
//!
//! ```ignore
//! use bevy::prelude::*;
//! use bevy_shell_fur::prelude::*;
//!
//! fn main() {
//!     App::new()
//!         .add_plugins(DefaultPlugins)
//!         .add_plugins(ShellFurPlugin)
//!         .insert_resource(ShellFurSettings::new().with_layers(12))
//!         .add_systems(Startup, setup)
//!         .run();
//! }
//!
//! fn setup(
//!     mut commands: Commands,
//!     mut meshes: ResMut<Assets<Mesh>>,
//!     mut materials: ResMut<Assets<StandardMaterial>>,
//!     asset_server: Res<AssetServer>,
//! ) {
//!     let hair = materials.add(StandardMaterial {
//!         base_color_texture: Some(asset_server.load("hair.png")),
//!         ..default()
//!     });
//!
//!     // Sync the checkboxes and generate shells on the next update
//!     commands.spawn((
//!         Mesh3d(meshes.add(Cuboid::default())),
//!         MaterialSlots::new()
//!             .with_slot("Hair", hair)
//!             .with_face_materials(vec![0; 12]),
//!         SyncShellMaterials,
//!         GenerateShellFur,
//!     ));
//! }
//! ```

pub mod error;
pub mod generate;
pub mod geometry;
pub mod graph;
pub mod material;
pub mod modifier;
mod plugin;
pub mod settings;
pub mod systems;
pub mod texture;

pub mod prelude {
    pub use crate::error::ShellFurError;
    pub use crate::generate::{GenerationReport, ShellTarget, generate_shells};
    pub use crate::geometry::{ShellGeometry, ShellMeshBuilder};
    pub use crate::graph::{GraphInputs, GraphLibrary, SHELL_GRAPH_NAME, ShellGraph};
    pub use crate::material::{
        MaterialSelection, MaterialSlots, MtoonSettings, ShadingExtensions, ShellCache,
        suppress_outlines, sync_selection,
    };
    pub use crate::modifier::{ModifierPolicy, SHELL_MODIFIER_NAME, ShellModifiers};
    pub use crate::plugin::ShellFurPlugin;
    pub use crate::settings::{ShellFurSettings, ShellPattern, TaperAxis};
    pub use crate::systems::{
        GenerateShellFur, ShellFurOutput, ShellFurStatus, ShellFurSystems, SuppressShellOutlines,
        SyncShellMaterials,
    };
    pub use crate::texture::{PixelGrid, synthesize};
}
