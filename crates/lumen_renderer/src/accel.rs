//! Nearest-hit queries: linear scan and BVH traversal.
//!
//! Both queries use the same ordering: a strictly smaller `t` wins, and on
//! equal `t` the lower geom index wins. That makes the BVH report exactly
//! what a front-to-back linear scan would, independent of traversal order.

use crate::primitives::{intersect_geom, SurfaceHit};
use lumen_core::{Bvh, BvhNodeKind, Geom};
use lumen_math::{Interval, Ray};

/// Traversal stack capacity; covers any tree accepted by scene validation.
const STACK_CAPACITY: usize = 64;

/// Relative slack on the node-culling distance so that float error in the
/// slab test never prunes a node holding an equal-`t` hit.
const CULL_SLACK: f32 = 1e-4;

/// Closest hit and the index of the geom that produced it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearestHit {
    pub geom_index: usize,
    pub hit: SurfaceHit,
}

#[inline]
fn consider(best: &mut Option<NearestHit>, geom_index: usize, hit: SurfaceHit) {
    let closer = match best {
        None => true,
        Some(b) => hit.t < b.hit.t || (hit.t == b.hit.t && geom_index < b.geom_index),
    };
    if closer {
        *best = Some(NearestHit { geom_index, hit });
    }
}

/// Test every geom in scan order.
pub fn nearest_hit_linear(geoms: &[Geom], ray: &Ray) -> Option<NearestHit> {
    let mut best = None;
    for (index, geom) in geoms.iter().enumerate() {
        if let Some(hit) = intersect_geom(geom, ray) {
            consider(&mut best, index, hit);
        }
    }
    best
}

/// Fixed-capacity worklist of node indices.
struct NodeStack {
    items: [u32; STACK_CAPACITY],
    len: usize,
}

impl NodeStack {
    fn new(root: u32) -> Self {
        let mut items = [0; STACK_CAPACITY];
        items[0] = root;
        Self { items, len: 1 }
    }

    #[inline]
    fn push(&mut self, node: u32) -> bool {
        if self.len == STACK_CAPACITY {
            return false;
        }
        self.items[self.len] = node;
        self.len += 1;
        true
    }

    #[inline]
    fn pop(&mut self) -> Option<u32> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        Some(self.items[self.len])
    }
}

/// Depth-first BVH traversal with an explicit stack.
///
/// Falls back to a linear scan if the tree outgrows the stack, which scene
/// validation rules out for trees it has seen.
pub fn nearest_hit_bvh(bvh: &Bvh, geoms: &[Geom], ray: &Ray) -> Option<NearestHit> {
    let nodes = bvh.nodes();
    let indices = bvh.geom_indices();
    let mut best: Option<NearestHit> = None;
    let mut stack = NodeStack::new(0);

    while let Some(node_index) = stack.pop() {
        let node = &nodes[node_index as usize];

        let cull = best.map_or(f32::INFINITY, |b| b.hit.t * (1.0 + CULL_SLACK) + CULL_SLACK);
        if !node.bounds.hit(ray, Interval::new(0.0, cull)) {
            continue;
        }

        match node.kind {
            BvhNodeKind::Interior { left, right } => {
                if !(stack.push(right) && stack.push(left)) {
                    log::warn!("BVH deeper than traversal stack; falling back to linear scan");
                    return nearest_hit_linear(geoms, ray);
                }
            }
            BvhNodeKind::Leaf { first, count } => {
                let range = first as usize..(first + count) as usize;
                for &geom_index in &indices[range] {
                    let geom_index = geom_index as usize;
                    if let Some(hit) = intersect_geom(&geoms[geom_index], ray) {
                        consider(&mut best, geom_index, hit);
                    }
                }
            }
        }
    }

    best
}
