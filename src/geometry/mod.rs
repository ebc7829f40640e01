//! Mesh geometry for shell generation.
//!
//! [`ShellGeometry`] is a plain triangle soup with per-face material indices.
//! Shell graphs evaluate over it, and [`ShellMeshBuilder`] turns the result
//! back into render meshes.

mod builder;
mod shell_geometry;
mod taper;

use bevy::mesh::PrimitiveTopology;
use thiserror::Error;

pub use builder::ShellMeshBuilder;
pub use shell_geometry::ShellGeometry;
pub use taper::{Taper, shell_offset};

/// Errors when reading a mesh as shell geometry.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("Unsupported primitive topology {found:?}, expected a triangle list")]
    UnsupportedTopology { found: PrimitiveTopology },

    #[error("Mesh has no {0} attribute")]
    MissingAttribute(&'static str),

    #[error("Attribute {name} has {found} values, expected {expected}")]
    AttributeLengthMismatch {
        name: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("Index count {0} is not a multiple of 3")]
    IndexCountNotTriangles(usize),

    #[error("Index {index} out of bounds for {vertex_count} vertices")]
    IndexOutOfBounds { index: u32, vertex_count: usize },

    #[error("Mesh has {triangles} triangles but {found} face material indices")]
    FaceMaterialMismatch { triangles: usize, found: usize },
}
