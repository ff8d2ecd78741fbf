//! Lumen Renderer - wavefront CPU path tracing.
//!
//! Each iteration runs a fixed sequence of data-parallel stages over a
//! pixel-sized arena of paths:
//!
//! 1. ray generation
//! 2. loop { intersection -> (material sort) -> shading -> compaction }
//! 3. accumulation into the persistent image sum
//!
//! Every stage is a rayon map over the live prefix of the arena; returning
//! from the rayon call is the barrier before the next stage.

mod accel;
mod accumulate;
mod compaction;
mod config;
mod error;
mod intersection;
mod path;
mod primitives;
mod raygen;
mod sampling;
mod scatter;
mod shading;
mod tracer;

pub use accel::{nearest_hit_bvh, nearest_hit_linear, NearestHit};
pub use accumulate::{accumulate, Accumulator};
pub use compaction::{partition_active, sort_by_material, MaterialSortScratch};
pub use config::{DepthOfField, FrameState, RenderConfig, MAX_TRACE_DEPTH};
pub use error::{RenderError, Stage};
pub use intersection::{compute_intersections, resolve_intersections, FirstBounceCache};
pub use path::{Intersection, PathState, TERMINATED};
pub use primitives::{box_intersection, intersect_geom, sphere_intersection, triangle_intersection, SurfaceHit};
pub use raygen::{camera_path, generate_camera_rays};
pub use sampling::{concentric_disk, cosine_sample_hemisphere, seeded_rng, util_hash};
pub use scatter::{scatter, Scatter, ScatterSample, SURFACE_EPSILON};
pub use shading::{shade, shade_path};
pub use tracer::{IterationStats, PathTracer};

/// Color type alias (linear RGB)
pub type Color = lumen_math::Vec3;

/// Re-export the scene types the tracer consumes
pub use lumen_core::{Bvh, Camera, Geom, GeomKind, Material, Scene, SceneError};
pub use lumen_math::{Ray, Vec3};
