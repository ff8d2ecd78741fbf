//! Intersection stage and the first-bounce cache.

use crate::accel::{nearest_hit_bvh, nearest_hit_linear, NearestHit};
use crate::error::alloc_buffer;
use crate::{FrameState, Intersection, PathState, RenderConfig, RenderError};
use lumen_core::{Bvh, Geom};
use rayon::prelude::*;

fn to_record(geoms: &[Geom], nearest: Option<NearestHit>) -> Intersection {
    match nearest {
        Some(NearestHit { geom_index, hit }) => Intersection {
            t: hit.t,
            material_id: geoms[geom_index].material_id,
            normal: hit.normal,
            outside: hit.outside,
        },
        None => Intersection::MISS,
    }
}

/// Nearest-hit records for every path in `paths`, written index-aligned
/// into `intersections`.
pub fn compute_intersections(
    geoms: &[Geom],
    bvh: Option<&Bvh>,
    paths: &[PathState],
    intersections: &mut [Intersection],
) {
    debug_assert_eq!(paths.len(), intersections.len());

    paths
        .par_iter()
        .zip(intersections.par_iter_mut())
        .for_each(|(path, record)| {
            let nearest = match bvh {
                Some(bvh) => nearest_hit_bvh(bvh, geoms, &path.ray),
                None => nearest_hit_linear(geoms, &path.ray),
            };
            *record = to_record(geoms, nearest);
        });
}

/// Depth-0 intersection records, indexed by pixel.
#[derive(Debug, Clone)]
pub struct FirstBounceCache {
    records: Vec<Intersection>,
    valid: bool,
}

impl FirstBounceCache {
    pub fn new(pixel_count: usize) -> Result<Self, RenderError> {
        Ok(Self {
            records: alloc_buffer("first-bounce cache", pixel_count, Intersection::MISS)?,
            valid: false,
        })
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn invalidate(&mut self) {
        self.valid = false;
    }

    /// Copy a full depth-0 record set into the cache.
    pub fn store(&mut self, intersections: &[Intersection]) {
        self.records.copy_from_slice(intersections);
        self.valid = true;
    }

    /// Copy the cached records out; returns false when there is nothing valid.
    pub fn restore(&self, intersections: &mut [Intersection]) -> bool {
        if !self.valid {
            return false;
        }
        intersections.copy_from_slice(&self.records);
        true
    }
}

/// Run the intersection stage for one bounce, honoring the cache policy.
///
/// At depth 0 the active prefix is the whole arena in pixel order, so cache
/// slots line up with arena positions. Returns true if the records came
/// from the cache.
#[allow(clippy::too_many_arguments)]
pub fn resolve_intersections(
    config: &RenderConfig,
    frame: FrameState,
    depth: u32,
    geoms: &[Geom],
    bvh: Option<&Bvh>,
    paths: &[PathState],
    intersections: &mut [Intersection],
    cache: &mut FirstBounceCache,
) -> bool {
    let cacheable = depth == 0 && config.cache_first_bounce && !config.jitters_camera_rays();

    if cacheable && !frame.scene_changed && cache.restore(intersections) {
        return true;
    }

    compute_intersections(geoms, bvh, paths, intersections);
    if cacheable {
        cache.store(intersections);
    }
    false
}
