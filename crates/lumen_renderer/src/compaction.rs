//! Stream compaction and material grouping over the path arena.

use crate::error::alloc_buffer;
use crate::{Intersection, PathState, RenderError};
use rayon::prelude::*;

/// Move live paths to the front of `paths[..num_active]`.
///
/// Two-pointer partition over the parallel arrays; returns the new live
/// count. Terminated paths stay in the arena so accumulation still sees
/// them.
pub fn partition_active(paths: &mut [PathState], intersections: &mut [Intersection], num_active: usize) -> usize {
    let mut head = 0;
    let mut tail = num_active;

    loop {
        while head < tail && paths[head].is_alive() {
            head += 1;
        }
        while head < tail && !paths[tail - 1].is_alive() {
            tail -= 1;
        }
        if head >= tail {
            break;
        }
        paths.swap(head, tail - 1);
        intersections.swap(head, tail - 1);
        head += 1;
        tail -= 1;
    }

    head
}

/// Preallocated buffers for [`sort_by_material`].
#[derive(Debug, Clone)]
pub struct MaterialSortScratch {
    order: Vec<u32>,
    paths: Vec<PathState>,
    intersections: Vec<Intersection>,
}

impl MaterialSortScratch {
    pub fn new(capacity: usize) -> Result<Self, RenderError> {
        Ok(Self {
            order: alloc_buffer("sort order", capacity, 0u32)?,
            paths: alloc_buffer("sort paths", capacity, PathState::default())?,
            intersections: alloc_buffer("sort intersections", capacity, Intersection::MISS)?,
        })
    }
}

/// Stable reorder of the active prefix by material, misses last.
pub fn sort_by_material(
    paths: &mut [PathState],
    intersections: &mut [Intersection],
    num_active: usize,
    scratch: &mut MaterialSortScratch,
) {
    let order = &mut scratch.order[..num_active];
    order.iter_mut().enumerate().for_each(|(i, slot)| *slot = i as u32);

    let keys = &intersections[..num_active];
    order.par_sort_by_key(|&i| keys[i as usize].material_key());

    let (src_paths, src_isects) = (&*paths, &*intersections);
    let sorted_paths = &mut scratch.paths[..num_active];
    let sorted_isects = &mut scratch.intersections[..num_active];
    sorted_paths
        .par_iter_mut()
        .zip(sorted_isects.par_iter_mut())
        .zip(order.par_iter())
        .for_each(|((path, isect), &i)| {
            *path = src_paths[i as usize];
            *isect = src_isects[i as usize];
        });

    paths[..num_active].copy_from_slice(sorted_paths);
    intersections[..num_active].copy_from_slice(sorted_isects);
}
