//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! Binary tree over the scene's shapes. Every node stores the union of its
//! children's boxes, so a ray that misses a node's box skips the whole subtree.

use crate::hittable::closest_hit;
use crate::{HitRecord, Hittable, Ray, Shape};
use lux_math::{Aabb, Interval};

/// Maximum primitives per leaf node before splitting.
const LEAF_MAX_SIZE: usize = 4;

/// BVH node - either a branch with two children or a leaf with primitives.
pub enum BvhNode {
    Branch {
        left: Box<BvhNode>,
        right: Box<BvhNode>,
        bbox: Aabb,
    },
    Leaf { objects: Vec<Shape>, bbox: Aabb },
    /// A scene with no shapes.
    Empty,
}

impl BvhNode {
    /// Build a BVH over `objects`.
    pub fn new(objects: Vec<Shape>) -> Self {
        if objects.is_empty() {
            return BvhNode::Empty;
        }

        let count = objects.len();
        let bvh = Self::build(objects);
        log::info!(
            "Built BVH over {} shapes (depth {}, {} leaves)",
            count,
            bvh.depth(),
            bvh.leaf_count()
        );
        bvh
    }

    /// Median split on the longest axis of the centroid bounds.
    fn build(mut objects: Vec<Shape>) -> Self {
        let bounds = objects.iter().fold(Aabb::EMPTY, |acc, o| {
            Aabb::surrounding(&acc, &o.bounding_box())
        });

        if objects.len() <= LEAF_MAX_SIZE {
            return BvhNode::Leaf {
                objects,
                bbox: bounds,
            };
        }

        let centroid_bounds = objects.iter().fold(Aabb::EMPTY, |acc, o| {
            let c = o.bounding_box().centroid();
            Aabb::surrounding(&acc, &Aabb::from_points(c, c))
        });
        let axis = centroid_bounds.longest_axis();

        objects.sort_unstable_by(|a, b| {
            let a_val = a.bounding_box().centroid()[axis];
            let b_val = b.bounding_box().centroid()[axis];
            a_val.total_cmp(&b_val)
        });

        let mid = objects.len() / 2;
        let right_objects = objects.split_off(mid);

        BvhNode::Branch {
            left: Box::new(Self::build(objects)),
            right: Box::new(Self::build(right_objects)),
            bbox: bounds,
        }
    }

    /// Number of levels, a leaf counting as one.
    pub fn depth(&self) -> usize {
        match self {
            BvhNode::Empty => 0,
            BvhNode::Leaf { .. } => 1,
            BvhNode::Branch { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    pub fn leaf_count(&self) -> usize {
        match self {
            BvhNode::Empty => 0,
            BvhNode::Leaf { .. } => 1,
            BvhNode::Branch { left, right, .. } => left.leaf_count() + right.leaf_count(),
        }
    }

    /// Total number of shapes stored in the leaves.
    pub fn len(&self) -> usize {
        match self {
            BvhNode::Empty => 0,
            BvhNode::Leaf { objects, .. } => objects.len(),
            BvhNode::Branch { left, right, .. } => left.len() + right.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, BvhNode::Empty)
    }
}

impl Hittable for BvhNode {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        match self {
            BvhNode::Empty => None,

            BvhNode::Leaf { objects, bbox } => {
                if !bbox.hit(ray, ray_t) {
                    return None;
                }
                closest_hit(objects, ray, ray_t)
            }

            BvhNode::Branch { left, right, bbox } => {
                if !bbox.hit(ray, ray_t) {
                    return None;
                }

                let hit_left = left.hit(ray, ray_t);

                // Only check right up to closest hit
                let right_max = hit_left.map_or(ray_t.max, |rec| rec.t);
                let hit_right = right.hit(ray, ray_t.with_max(right_max));

                hit_right.or(hit_left)
            }
        }
    }

    fn bounding_box(&self) -> Aabb {
        match self {
            BvhNode::Empty => Aabb::EMPTY,
            BvhNode::Leaf { bbox, .. } => *bbox,
            BvhNode::Branch { bbox, .. } => *bbox,
        }
    }
}
