//! Minimal example growing shell fur on a single cube.
//!
//! The cube uses a flat color material, so no texture assets are needed.

use bevy::prelude::*;
use bevy_shell_fur::prelude::*;

fn main() {
    App::new()
        .add_plugins(DefaultPlugins)
        .add_plugins(ShellFurPlugin)
        .insert_resource(
            ShellFurSettings::new()
                .with_layers(12)
                .with_thickness(0.02),
        )
        .add_systems(Startup, setup)
        .add_systems(Update, (report_status, show_shells).after(ShellFurSystems))
        .run();
}

fn setup(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let fur = materials.add(StandardMaterial {
        base_color: Color::srgb(0.55, 0.35, 0.2),
        perceptual_roughness: 0.9,
        ..default()
    });

    // Cuboid has 12 triangles, all in slot 0
    commands.spawn((
        Mesh3d(meshes.add(Cuboid::default())),
        MeshMaterial3d(fur.clone()),
        MaterialSlots::new()
            .with_slot("Fur", fur)
            .with_face_materials(vec![0; 12]),
        Transform::from_xyz(0.0, 0.5, 0.0),
        SyncShellMaterials,
        GenerateShellFur,
    ));

    commands.spawn((
        PointLight {
            intensity: 2000.0,
            ..default()
        },
        Transform::from_xyz(4.0, 8.0, 4.0),
    ));

    commands.spawn((
        Camera3d::default(),
        Transform::from_xyz(-2.0, 2.0, 3.0).looking_at(Vec3::new(0.0, 0.5, 0.0), Vec3::Y),
    ));
}

fn report_status(statuses: Query<(Entity, &ShellFurStatus), Changed<ShellFurStatus>>) {
    for (entity, status) in &statuses {
        if status.success {
            info!("{entity}: {}", status.message);
        } else {
            warn!("{entity}: {}", status.message);
        }
    }
}

/// Replaces the source mesh with the evaluated shell parts.
fn show_shells(
    mut commands: Commands,
    outputs: Query<(Entity, &ShellFurOutput), Changed<ShellFurOutput>>,
) {
    for (entity, output) in &outputs {
        commands
            .entity(entity)
            .remove::<MeshMaterial3d<StandardMaterial>>()
            .despawn_related::<Children>()
            .insert(Visibility::Visible)
            .with_children(|parent| {
                for part in &output.parts {
                    let Some(material) = part.material.clone() else {
                        continue;
                    };
                    parent.spawn((Mesh3d(part.mesh.clone()), MeshMaterial3d(material)));
                }
            });
    }
}
