//! Bounding Volume Hierarchy (BVH) spatial index.
//!
//! Flat array layout: node 0 is the root, interior nodes store child node
//! indices and leaves store a range into `geom_indices`. The renderer only
//! queries this structure; [`Bvh::build`] is a simple median-split builder
//! and [`Bvh::from_parts`] accepts nodes produced elsewhere.

use crate::{Geom, SceneError};
use lumen_math::Aabb;

/// Maximum primitives per leaf node before splitting.
const LEAF_MAX_SIZE: usize = 4;

/// Deepest tree the renderer's fixed traversal stack can handle.
pub const MAX_BVH_DEPTH: usize = 48;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BvhNodeKind {
    /// Internal node with two children.
    Interior { left: u32, right: u32 },
    /// Leaf node referencing `geom_indices[first..first + count]`.
    Leaf { first: u32, count: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BvhNode {
    pub bounds: Aabb,
    pub kind: BvhNodeKind,
}

#[derive(Debug, Clone)]
pub struct Bvh {
    nodes: Vec<BvhNode>,
    geom_indices: Vec<u32>,
    depth: usize,
}

impl Bvh {
    /// Build a BVH over every geom in the slice.
    ///
    /// Objects are split at the median centroid along the longest axis of
    /// the centroid bounds. Uses an explicit task stack rather than recursion.
    pub fn build(geoms: &[Geom]) -> Self {
        let n = geoms.len();
        if n == 0 {
            return Self {
                nodes: vec![BvhNode {
                    bounds: Aabb::EMPTY,
                    kind: BvhNodeKind::Leaf { first: 0, count: 0 },
                }],
                geom_indices: Vec::new(),
                depth: 0,
            };
        }

        let bounds: Vec<Aabb> = geoms.iter().map(Geom::bounds).collect();
        let mut indices: Vec<u32> = (0..n as u32).collect();
        let mut nodes: Vec<BvhNode> = Vec::with_capacity(2 * n);
        let placeholder = BvhNode {
            bounds: Aabb::EMPTY,
            kind: BvhNodeKind::Leaf { first: 0, count: 0 },
        };
        nodes.push(placeholder);

        struct Task {
            node_idx: usize,
            start: usize,
            end: usize, // exclusive
            depth: usize,
        }

        let mut stack = vec![Task {
            node_idx: 0,
            start: 0,
            end: n,
            depth: 0,
        }];
        let mut max_depth = 0;

        while let Some(task) = stack.pop() {
            max_depth = max_depth.max(task.depth);
            let range = &mut indices[task.start..task.end];

            let node_bounds = range
                .iter()
                .fold(Aabb::EMPTY, |acc, &i| Aabb::surrounding(&acc, &bounds[i as usize]));

            if range.len() <= LEAF_MAX_SIZE {
                nodes[task.node_idx] = BvhNode {
                    bounds: node_bounds,
                    kind: BvhNodeKind::Leaf {
                        first: task.start as u32,
                        count: range.len() as u32,
                    },
                };
                continue;
            }

            // Choose split axis based on centroid spread
            let centroid_bounds = range
                .iter()
                .fold(Aabb::EMPTY, |acc, &i| acc.grow_point(bounds[i as usize].centroid()));
            let axis = centroid_bounds.longest_axis();

            let mid = range.len() / 2;
            range.select_nth_unstable_by(mid, |&a, &b| {
                let ca = bounds[a as usize].centroid()[axis];
                let cb = bounds[b as usize].centroid()[axis];
                ca.total_cmp(&cb)
            });

            let left = nodes.len();
            nodes.push(placeholder);
            nodes.push(placeholder);
            nodes[task.node_idx] = BvhNode {
                bounds: node_bounds,
                kind: BvhNodeKind::Interior {
                    left: left as u32,
                    right: left as u32 + 1,
                },
            };

            stack.push(Task {
                node_idx: left,
                start: task.start,
                end: task.start + mid,
                depth: task.depth + 1,
            });
            stack.push(Task {
                node_idx: left + 1,
                start: task.start + mid,
                end: task.end,
                depth: task.depth + 1,
            });
        }

        log::info!(
            "BVH: {} geoms, {} nodes, depth {}",
            n,
            nodes.len(),
            max_depth
        );

        Self {
            nodes,
            geom_indices: indices,
            depth: max_depth,
        }
    }

    /// Wrap nodes built by an external tool.
    ///
    /// The structure must be a tree rooted at node 0 where every child index
    /// is greater than its parent's.
    pub fn from_parts(nodes: Vec<BvhNode>, geom_indices: Vec<u32>) -> Result<Self, SceneError> {
        let depth = Self::measure_depth(&nodes)?;
        Ok(Self {
            nodes,
            geom_indices,
            depth,
        })
    }

    fn measure_depth(nodes: &[BvhNode]) -> Result<usize, SceneError> {
        if nodes.is_empty() {
            return Err(SceneError::InvalidBvh("no root node".into()));
        }
        let mut depths = vec![0usize; nodes.len()];
        let mut max_depth = 0;
        for (i, node) in nodes.iter().enumerate() {
            if let BvhNodeKind::Interior { left, right } = node.kind {
                for child in [left as usize, right as usize] {
                    if child <= i || child >= nodes.len() {
                        return Err(SceneError::InvalidBvh(format!(
                            "node {} has out-of-order child {}",
                            i, child
                        )));
                    }
                    depths[child] = depths[i] + 1;
                    max_depth = max_depth.max(depths[child]);
                }
            }
        }
        Ok(max_depth)
    }

    pub fn nodes(&self) -> &[BvhNode] {
        &self.nodes
    }

    pub fn geom_indices(&self) -> &[u32] {
        &self.geom_indices
    }

    /// Number of edges on the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Check the index is queryable against `geoms`.
    ///
    /// Every geom must be referenced by some leaf, and every node's bounds
    /// must enclose its children (or, for leaves, its geoms' bounds), so that
    /// traversal reports the same nearest hit as a linear scan.
    pub fn validate(&self, geoms: &[Geom]) -> Result<(), SceneError> {
        if self.depth > MAX_BVH_DEPTH {
            return Err(SceneError::BvhTooDeep {
                depth: self.depth,
                max: MAX_BVH_DEPTH,
            });
        }
        Self::measure_depth(&self.nodes)?;

        let mut covered = vec![false; geoms.len()];
        for (i, node) in self.nodes.iter().enumerate() {
            match node.kind {
                BvhNodeKind::Interior { left, right } => {
                    for child in [left, right] {
                        if !node.bounds.encloses(&self.nodes[child as usize].bounds) {
                            return Err(SceneError::InvalidBvh(format!(
                                "node {} bounds do not enclose child {}",
                                i, child
                            )));
                        }
                    }
                }
                BvhNodeKind::Leaf { first, count } => {
                    let (first, count) = (first as usize, count as usize);
                    let Some(range) = self.geom_indices.get(first..first + count) else {
                        return Err(SceneError::InvalidBvh(format!(
                            "leaf {} range {}..{} exceeds index list of {}",
                            i,
                            first,
                            first + count,
                            self.geom_indices.len()
                        )));
                    };
                    for &g in range {
                        let Some(geom) = geoms.get(g as usize) else {
                            return Err(SceneError::InvalidBvh(format!(
                                "leaf {} references geom {} of {}",
                                i,
                                g,
                                geoms.len()
                            )));
                        };
                        if !node.bounds.encloses(&geom.bounds()) {
                            return Err(SceneError::InvalidBvh(format!(
                                "leaf {} bounds do not enclose geom {}",
                                i, g
                            )));
                        }
                        covered[g as usize] = true;
                    }
                }
            }
        }

        if let Some(missing) = covered.iter().position(|c| !c) {
            return Err(SceneError::InvalidBvh(format!(
                "geom {} is not referenced by any leaf",
                missing
            )));
        }
        Ok(())
    }
}
