//! Lumen Core - scene description consumed by the path tracing pipeline.
//!
//! This crate provides:
//!
//! - **Scene types**: `Scene`, `Geom`, `Material`, `Camera`
//! - **Spatial index**: a flat `Bvh` plus a median-split builder
//!
//! Everything here is read-only once handed to the renderer.
//!
//! # Example
//!
//! ```ignore
//! use lumen_core::{Camera, Geom, Material, Scene};
//! use lumen_math::{Transform, Vec3};
//!
//! let mut camera = Camera::new().with_resolution(64, 64);
//! camera.initialize();
//!
//! let mut scene = Scene::new(camera);
//! let light = scene.add_material(Material::emissive(Vec3::ONE, 5.0));
//! scene.add_geom(Geom::sphere(Transform::default(), light));
//! scene.build_bvh();
//! scene.validate()?;
//! ```

pub mod bvh;
pub mod camera;
pub mod error;
pub mod geometry;
pub mod material;
pub mod scene;

// Re-export commonly used types
pub use bvh::{Bvh, BvhNode, BvhNodeKind, MAX_BVH_DEPTH};
pub use camera::Camera;
pub use error::SceneError;
pub use geometry::{Geom, GeomKind};
pub use material::Material;
pub use scene::Scene;
