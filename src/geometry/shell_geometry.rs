//! Triangle geometry with per-face material indices.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use bevy::math::Vec3;
use bevy::mesh::{Mesh, PrimitiveTopology, VertexAttributeValues};

use super::GeometryError;
use super::builder::ShellMeshBuilder;

/// Indexed triangles with positions, normals, texture coordinates and a
/// material slot index per triangle.
///
/// This is the value flowing through shell graph evaluation: the base mesh is
/// split by material, copies are offset and re-materialized, and everything is
/// joined back together.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ShellGeometry {
    positions: Vec<[f32; 3]>,
    normals: Vec<[f32; 3]>,
    uvs: Vec<[f32; 2]>,
    triangles: Vec<[u32; 3]>,
    face_materials: Vec<u32>,
}

impl ShellGeometry {
    /// Assembles geometry from raw parts, checking that every array agrees.
    pub fn from_parts(
        positions: Vec<[f32; 3]>,
        normals: Vec<[f32; 3]>,
        uvs: Vec<[f32; 2]>,
        triangles: Vec<[u32; 3]>,
        face_materials: Vec<u32>,
    ) -> Result<Self, GeometryError> {
        let vertex_count = positions.len();
        if normals.len() != vertex_count {
            return Err(GeometryError::AttributeLengthMismatch {
                name: "normal",
                expected: vertex_count,
                found: normals.len(),
            });
        }
        if uvs.len() != vertex_count {
            return Err(GeometryError::AttributeLengthMismatch {
                name: "uv",
                expected: vertex_count,
                found: uvs.len(),
            });
        }
        if face_materials.len() != triangles.len() {
            return Err(GeometryError::FaceMaterialMismatch {
                triangles: triangles.len(),
                found: face_materials.len(),
            });
        }
        if let Some(&index) = triangles
            .iter()
            .flatten()
            .find(|&&i| i as usize >= vertex_count)
        {
            return Err(GeometryError::IndexOutOfBounds {
                index,
                vertex_count,
            });
        }

        Ok(Self {
            positions,
            normals,
            uvs,
            triangles,
            face_materials,
        })
    }

    /// Reads a triangle-list mesh.
    ///
    /// Meshes without `UV_0` read every texture coordinate as `[0, 0]`;
    /// non-indexed meshes use consecutive vertex triples.
    pub fn from_mesh(mesh: &Mesh, face_materials: &[u32]) -> Result<Self, GeometryError> {
        let topology = mesh.primitive_topology();
        if topology != PrimitiveTopology::TriangleList {
            return Err(GeometryError::UnsupportedTopology { found: topology });
        }

        let positions = mesh
            .attribute(Mesh::ATTRIBUTE_POSITION)
            .and_then(|a| a.as_float3())
            .ok_or(GeometryError::MissingAttribute("position"))?
            .to_vec();

        let normals = mesh
            .attribute(Mesh::ATTRIBUTE_NORMAL)
            .and_then(|a| a.as_float3())
            .ok_or(GeometryError::MissingAttribute("normal"))?
            .to_vec();

        let uvs = match mesh.attribute(Mesh::ATTRIBUTE_UV_0) {
            Some(VertexAttributeValues::Float32x2(uvs)) => uvs.clone(),
            _ => vec![[0.0, 0.0]; positions.len()],
        };

        let indices: Vec<u32> = match mesh.indices() {
            Some(indices) => indices.iter().map(|i| i as u32).collect(),
            None => (0..positions.len() as u32).collect(),
        };
        if indices.len() % 3 != 0 {
            return Err(GeometryError::IndexCountNotTriangles(indices.len()));
        }
        let triangles = indices
            .chunks_exact(3)
            .map(|t| [t[0], t[1], t[2]])
            .collect();

        Self::from_parts(positions, normals, uvs, triangles, face_materials.to_vec())
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    pub fn positions(&self) -> &[[f32; 3]] {
        &self.positions
    }

    pub fn normals(&self) -> &[[f32; 3]] {
        &self.normals
    }

    pub fn uvs(&self) -> &[[f32; 2]] {
        &self.uvs
    }

    pub fn triangles(&self) -> &[[u32; 3]] {
        &self.triangles
    }

    pub fn face_materials(&self) -> &[u32] {
        &self.face_materials
    }

    /// Distinct material indices in use, ascending.
    pub fn material_indices(&self) -> BTreeSet<u32> {
        self.face_materials.iter().copied().collect()
    }

    /// Number of triangles using `material`.
    pub fn count_material(&self, material: u32) -> usize {
        self.face_materials.iter().filter(|&&m| m == material).count()
    }

    /// Copies the triangles whose material index equals `material`, keeping
    /// only the vertices they reference.
    pub fn separate_material(&self, material: u32) -> Self {
        let mut remap: HashMap<u32, u32> = HashMap::new();
        let mut out = Self::default();

        for (triangle, &face_material) in self.triangles.iter().zip(&self.face_materials) {
            if face_material != material {
                continue;
            }

            let mut mapped = [0u32; 3];
            for (slot, &vertex) in mapped.iter_mut().zip(triangle) {
                *slot = *remap.entry(vertex).or_insert_with(|| {
                    let v = vertex as usize;
                    out.positions.push(self.positions[v]);
                    out.normals.push(self.normals[v]);
                    out.uvs.push(self.uvs[v]);
                    (out.positions.len() - 1) as u32
                });
            }
            out.triangles.push(mapped);
            out.face_materials.push(face_material);
        }

        out
    }

    /// Moves every vertex along its normal by `distance(uv)`.
    pub fn offset_along_normals<F>(&mut self, distance: F)
    where
        F: Fn([f32; 2]) -> f32,
    {
        for ((position, normal), uv) in self
            .positions
            .iter_mut()
            .zip(&self.normals)
            .zip(&self.uvs)
        {
            let moved = Vec3::from(*position) + Vec3::from(*normal) * distance(*uv);
            *position = moved.to_array();
        }
    }

    /// Assigns `material` to every triangle.
    pub fn set_material_index(&mut self, material: u32) {
        self.face_materials.fill(material);
    }

    /// Appends `other`'s vertices and triangles.
    pub fn join(&mut self, other: &Self) {
        let base = self.positions.len() as u32;
        self.positions.extend_from_slice(&other.positions);
        self.normals.extend_from_slice(&other.normals);
        self.uvs.extend_from_slice(&other.uvs);
        self.triangles.extend(
            other
                .triangles
                .iter()
                .map(|t| [t[0] + base, t[1] + base, t[2] + base]),
        );
        self.face_materials.extend_from_slice(&other.face_materials);
    }

    /// Builds one render mesh per material index, ascending.
    pub fn to_meshes(&self) -> Vec<(u32, Mesh)> {
        let mut builders: BTreeMap<u32, ShellMeshBuilder> = BTreeMap::new();

        for (triangle, &material) in self.triangles.iter().zip(&self.face_materials) {
            let builder = builders.entry(material).or_default();
            let corners = triangle.map(|vertex| {
                let v = vertex as usize;
                builder.vertex(vertex, self.positions[v], self.normals[v], self.uvs[v])
            });
            builder.triangle(corners);
        }

        builders
            .into_iter()
            .filter_map(|(material, builder)| builder.build().map(|mesh| (material, mesh)))
            .collect()
    }
}
