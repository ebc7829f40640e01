//! Error types for shell fur generation.

use thiserror::Error;

use crate::geometry::GeometryError;
use crate::texture::SynthesisError;

/// Errors reported by the shell fur operations.
///
/// Only [`NoActiveMesh`](ShellFurError::NoActiveMesh),
/// [`NoMaterialsSelected`](ShellFurError::NoMaterialsSelected) and
/// [`InvalidSettings`](ShellFurError::InvalidSettings) abort a generation run.
/// The remaining variants are collected per material in a
/// [`GenerationReport`](crate::generate::GenerationReport).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ShellFurError {
    #[error("Select a mesh object: {reason}")]
    NoActiveMesh { reason: String },

    #[error("No materials enabled")]
    NoMaterialsSelected,

    #[error("Material '{material}' has neither a base color texture nor a usable base color")]
    UnresolvableBaseImage { material: String },

    #[error("Material '{material}' has no toon shading extension")]
    ShadingExtensionMissing { material: String },

    #[error("Invalid shell fur settings: {0}")]
    InvalidSettings(String),

    #[error(transparent)]
    Synthesis(#[from] SynthesisError),

    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

impl ShellFurError {
    /// Whether this error aborts the whole operation rather than one material.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::NoActiveMesh { .. } | Self::NoMaterialsSelected | Self::InvalidSettings(_)
        )
    }
}
