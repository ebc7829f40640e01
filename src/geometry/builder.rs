//! Render mesh assembly for evaluated shell geometry.

use std::collections::HashMap;

use bevy::asset::RenderAssetUsages;
use bevy::mesh::{Indices, Mesh, PrimitiveTopology};

/// Collects the triangles of one material slot and turns them into a Bevy
/// [`Mesh`] with positions, normals, `UV_0` and `u32` indices.
///
/// Vertices are copied from a source buffer on first use, so a slot that only
/// touches part of the source gets a compact vertex buffer.
///
/// # Example
/// ```ignore
/// use bevy_shell_fur::geometry::ShellMeshBuilder;
///
/// let mut builder = ShellMeshBuilder::new();
/// let a = builder.vertex(0, [0.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 0.0]);
/// let b = builder.vertex(1, [1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0]);
/// let c = builder.vertex(2, [0.0, 1.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0]);
/// builder.triangle([a, b, c]);
/// let mesh = builder.build();
/// ```
#[derive(Debug, Default)]
pub struct ShellMeshBuilder {
    positions: Vec<[f32; 3]>,
    normals: Vec<[f32; 3]>,
    uvs: Vec<[f32; 2]>,
    indices: Vec<u32>,
    /// Source vertex index -> local index.
    copied: HashMap<u32, u32>,
}

impl ShellMeshBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Local index of source vertex `source`, copying its attributes the
    /// first time it is seen.
    pub fn vertex(&mut self, source: u32, position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> u32 {
        if let Some(&local) = self.copied.get(&source) {
            return local;
        }

        let local = self.positions.len() as u32;
        self.positions.push(position);
        self.normals.push(normal);
        self.uvs.push(uv);
        self.copied.insert(source, local);
        local
    }

    /// Appends a triangle of local indices.
    pub fn triangle(&mut self, corners: [u32; 3]) {
        self.indices.extend_from_slice(&corners);
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// `None` when no triangle was added.
    pub fn build(self) -> Option<Mesh> {
        if self.indices.is_empty() {
            return None;
        }

        let mesh = Mesh::new(
            PrimitiveTopology::TriangleList,
            RenderAssetUsages::MAIN_WORLD | RenderAssetUsages::RENDER_WORLD,
        )
        .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, self.positions)
        .with_inserted_attribute(Mesh::ATTRIBUTE_NORMAL, self.normals)
        .with_inserted_attribute(Mesh::ATTRIBUTE_UV_0, self.uvs)
        .with_inserted_indices(Indices::U32(self.indices));

        Some(mesh)
    }
}
