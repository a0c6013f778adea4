//! Triangle primitive for ray tracing.
//!
//! Plane intersection followed by three same-side edge tests.

use std::sync::Arc;

use crate::{HitRecord, Hittable, Material, Ray};
use lux_math::{Aabb, Interval, Vec2, Vec3};

/// Rays closer to parallel than this are treated as missing the plane.
const PARALLEL_EPSILON: f32 = 1e-8;

/// Fixed texture coordinates of the three (sorted) corners.
const CORNER_UVS: [Vec2; 3] = [Vec2::new(0.0, 0.0), Vec2::new(0.0, 1.0), Vec2::new(1.0, 1.0)];

/// A flat triangle.
#[derive(Clone)]
pub struct Triangle {
    /// Vertices, ordered by angle around the centroid
    v0: Vec3,
    v1: Vec3,
    v2: Vec3,
    /// Unnormalised face normal, `(v1 - v0) × (v2 - v0)`
    normal: Vec3,
    material: Arc<Material>,
    bbox: Aabb,
}

impl Triangle {
    /// Create a triangle. Vertices are reordered counter-clockwise around their
    /// centroid (in the XY projection) so the winding does not depend on input
    /// order.
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3, material: Arc<Material>) -> Self {
        let centroid = (v0 + v1 + v2) / 3.0;
        let angle = |v: &Vec3| (v.y - centroid.y).atan2(v.x - centroid.x);

        let mut vertices = [v0, v1, v2];
        vertices.sort_by(|a, b| angle(a).total_cmp(&angle(b)));
        let [v0, v1, v2] = vertices;

        let normal = (v1 - v0).cross(v2 - v0);

        let min = v0.min(v1).min(v2);
        let max = v0.max(v1).max(v2);
        let delta = Vec3::splat(0.0001);
        let bbox = Aabb::from_points(min - delta, max + delta);

        Self {
            v0,
            v1,
            v2,
            normal,
            material,
            bbox,
        }
    }

    pub fn vertices(&self) -> [Vec3; 3] {
        [self.v0, self.v1, self.v2]
    }

    /// Interpolate the corner UVs with barycentric weights of `p`.
    fn barycentric_uv(&self, p: Vec3, denom: f32) -> (f32, f32) {
        let alpha = self.normal.dot((self.v2 - self.v1).cross(p - self.v1)) / denom;
        let beta = self.normal.dot((self.v0 - self.v2).cross(p - self.v2)) / denom;
        let gamma = 1.0 - alpha - beta;

        let uv = alpha * CORNER_UVS[0] + beta * CORNER_UVS[1] + gamma * CORNER_UVS[2];
        (uv.x, uv.y)
    }
}

impl Hittable for Triangle {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        let denom = self.normal.length_squared();
        if denom == 0.0 {
            return None;
        }
        let unit_normal = self.normal / denom.sqrt();

        let n_dot_dir = unit_normal.dot(ray.direction());
        if n_dot_dir.abs() < PARALLEL_EPSILON {
            return None;
        }

        let t = unit_normal.dot(self.v0 - ray.origin()) / n_dot_dir;
        if !ray_t.surrounds(t) {
            return None;
        }

        let p = ray.at(t);

        // Inside when p lies on the normal's side of every edge
        let edges = [(self.v0, self.v1), (self.v1, self.v2), (self.v2, self.v0)];
        for (start, end) in edges {
            if self.normal.dot((end - start).cross(p - start)) < 0.0 {
                return None;
            }
        }

        let rec = HitRecord::new(ray, t, unit_normal, &self.material);

        if self.material.is_textured() {
            Some(rec.with_uv(self.barycentric_uv(p, denom)))
        } else {
            Some(rec)
        }
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}
