//! Request systems driving shell generation from the ECS.
//!
//! A host requests work by inserting a marker component on a mesh entity.
//! Each system consumes its marker and leaves a [`ShellFurStatus`] behind.

use bevy::prelude::*;

use crate::error::ShellFurError;
use crate::generate::{ShellTarget, generate_shells};
use crate::geometry::ShellGeometry;
use crate::graph::GraphLibrary;
use crate::material::{
    MaterialSelection, MaterialSlots, ShadingExtensions, ShellAssets, ShellCache, suppress_outlines,
    sync_selection,
};
use crate::modifier::ShellModifiers;
use crate::settings::ShellFurSettings;

/// System set for shell fur systems. Runs in `Update`, chained.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShellFurSystems;

/// Request: rebuild [`MaterialSelection`] from the entity's slots.
#[derive(Component, Debug, Default)]
pub struct SyncShellMaterials;

/// Request: generate shells for the checked materials.
#[derive(Component, Debug, Default)]
pub struct GenerateShellFur;

/// Request: turn off outlines on the checked base materials.
#[derive(Component, Debug, Default)]
pub struct SuppressShellOutlines;

/// Result of the last request handled on an entity.
#[derive(Component, Clone, Debug, PartialEq)]
pub struct ShellFurStatus {
    pub success: bool,
    pub message: String,
}

impl ShellFurStatus {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failed(error: &ShellFurError) -> Self {
        Self {
            success: false,
            message: error.to_string(),
        }
    }
}

/// One render mesh of the evaluated shell modifier stack.
#[derive(Clone, Debug)]
pub struct ShellPart {
    pub material_index: u32,
    pub mesh: Handle<Mesh>,
    /// `None` when the index points at an empty or missing slot.
    pub material: Option<Handle<StandardMaterial>>,
}

/// Output sink: the entity's geometry after its modifiers, one part per
/// material slot in ascending order.
#[derive(Component, Clone, Debug, Default)]
pub struct ShellFurOutput {
    pub parts: Vec<ShellPart>,
}

impl ShellFurOutput {
    pub fn part(&self, material_index: u32) -> Option<&ShellPart> {
        self.parts.iter().find(|p| p.material_index == material_index)
    }
}

fn no_mesh(reason: &str) -> ShellFurError {
    ShellFurError::NoActiveMesh {
        reason: reason.to_string(),
    }
}

/// Handles [`SyncShellMaterials`] requests.
pub fn sync_shell_materials(
    mut commands: Commands,
    mut requests: Query<
        (Entity, Option<(&MaterialSlots, &mut MaterialSelection)>),
        With<SyncShellMaterials>,
    >,
) {
    for (entity, target) in &mut requests {
        let status = match target {
            Some((slots, mut selection)) => {
                *selection = sync_selection(slots);
                debug!("Synced {} material slot(s) on {entity}", selection.len());
                ShellFurStatus::ok(format!("Synced {} material slot(s)", selection.len()))
            }
            None => ShellFurStatus::failed(&no_mesh("entity has no material slots")),
        };

        commands
            .entity(entity)
            .remove::<SyncShellMaterials>()
            .insert(status);
    }
}

/// Handles [`GenerateShellFur`] requests.
#[allow(clippy::too_many_arguments)]
pub fn generate_shell_fur(
    mut commands: Commands,
    mut requests: Query<
        (
            Entity,
            Option<&Mesh3d>,
            Option<(&mut MaterialSlots, &MaterialSelection, &mut ShellModifiers)>,
        ),
        With<GenerateShellFur>,
    >,
    meshes: Res<Assets<Mesh>>,
    settings: Res<ShellFurSettings>,
    mut images: ResMut<Assets<Image>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut cache: ResMut<ShellCache>,
    mut extensions: ResMut<ShadingExtensions>,
    mut graphs: ResMut<GraphLibrary>,
) {
    let mut assets = ShellAssets {
        images: &mut images,
        materials: &mut materials,
        cache: &mut cache,
        extensions: &mut extensions,
    };

    for (entity, mesh, target) in &mut requests {
        let result = match (mesh, target) {
            (None, _) => Err(no_mesh("entity has no mesh")),
            (Some(mesh), _) if !meshes.contains(&mesh.0) => Err(no_mesh("mesh asset is not loaded")),
            (_, None) => Err(no_mesh("entity has no material slots")),
            (Some(_), Some((mut slots, selection, mut modifiers))) => generate_shells(
                Some(ShellTarget {
                    slots: &mut slots,
                    modifiers: &mut modifiers,
                }),
                selection,
                &settings,
                &mut assets,
                &mut graphs,
            ),
        };

        let status = match result {
            Ok(report) => ShellFurStatus::ok(report.summary()),
            Err(error) if error.is_fatal() => {
                warn!("Shell generation on {entity} aborted: {error}");
                ShellFurStatus::failed(&error)
            }
            Err(error) => {
                error!("Shell generation on {entity} failed: {error}");
                ShellFurStatus::failed(&error)
            }
        };

        commands
            .entity(entity)
            .remove::<GenerateShellFur>()
            .insert(status);
    }
}

/// Handles [`SuppressShellOutlines`] requests.
pub fn suppress_shell_outlines(
    mut commands: Commands,
    requests: Query<(Entity, Option<&MaterialSelection>), With<SuppressShellOutlines>>,
    mut extensions: ResMut<ShadingExtensions>,
) {
    for (entity, selection) in &requests {
        let status = match selection {
            None => ShellFurStatus::failed(&no_mesh("entity has no material selection")),
            Some(selection) if selection.checked_count() == 0 => {
                ShellFurStatus::failed(&ShellFurError::NoMaterialsSelected)
            }
            Some(selection) => {
                let count = suppress_outlines(selection, &mut extensions);
                info!("Outlines turned off for {count} material(s)");
                ShellFurStatus::ok(format!("Outlines turned off for {count} material(s)"))
            }
        };

        commands
            .entity(entity)
            .remove::<SuppressShellOutlines>()
            .insert(status);
    }
}

/// Evaluates the modifier stack of every changed entity into its
/// [`ShellFurOutput`].
pub fn apply_shell_modifiers(
    mut commands: Commands,
    targets: Query<
        (Entity, &Mesh3d, &MaterialSlots, &ShellModifiers),
        Or<(Changed<ShellModifiers>, Changed<MaterialSlots>)>,
    >,
    graphs: Res<GraphLibrary>,
    mut meshes: ResMut<Assets<Mesh>>,
) {
    for (entity, mesh, slots, modifiers) in &targets {
        if modifiers.is_empty() {
            continue;
        }

        let Some(source) = meshes.get(&mesh.0) else {
            debug!("Mesh of {entity} not loaded, skipping modifier evaluation");
            continue;
        };

        let mut geometry = match ShellGeometry::from_mesh(source, &slots.face_materials) {
            Ok(geometry) => geometry,
            Err(error) => {
                warn!("Cannot evaluate modifiers on {entity}: {error}");
                continue;
            }
        };

        for modifier in modifiers.iter() {
            match graphs.get(&modifier.graph) {
                Some(graph) => geometry = graph.evaluate(&geometry, modifier.inputs),
                None => warn!(
                    "Modifier '{}' on {entity} references missing graph '{}'",
                    modifier.name, modifier.graph
                ),
            }
        }

        let parts = geometry
            .to_meshes()
            .into_iter()
            .map(|(material_index, part)| ShellPart {
                material_index,
                mesh: meshes.add(part),
                material: slots
                    .get(material_index as usize)
                    .map(|slot| slot.material.clone()),
            })
            .collect::<Vec<_>>();

        debug!("Evaluated {} output part(s) on {entity}", parts.len());
        commands.entity(entity).insert(ShellFurOutput { parts });
    }
}
