//! Scene validation errors.

use thiserror::Error;

/// Malformed scene or camera data, rejected before any iteration runs.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    #[error("Camera resolution must be non-zero, got {width}x{height}")]
    ZeroResolution { width: u32, height: u32 },

    #[error("Camera resolution {width}x{height} exceeds the addressable pixel count")]
    ResolutionTooLarge { width: u32, height: u32 },

    #[error("Camera basis is degenerate (position, target and up must span a frame)")]
    DegenerateCamera,

    #[error("Camera contains non-finite values")]
    NonFiniteCamera,

    #[error("Scene has geometry but no materials")]
    NoMaterials,

    #[error("Geom {geom} references material {material}, which does not exist")]
    InvalidMaterial { geom: usize, material: usize },

    #[error("Material {material} is refractive with invalid index of refraction {ior}")]
    InvalidIor { material: usize, ior: f32 },

    #[error("Geom {geom} has a singular transform or degenerate vertices")]
    DegenerateGeom { geom: usize },

    #[error("Invalid BVH: {0}")]
    InvalidBvh(String),

    #[error("BVH depth {depth} exceeds the traversal limit of {max}")]
    BvhTooDeep { depth: usize, max: usize },
}
