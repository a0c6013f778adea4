//! Sphere primitive for ray tracing.

use std::f32::consts::PI;
use std::sync::Arc;

use crate::{HitRecord, Hittable, Material, Ray};
use lux_math::{Aabb, Interval, Vec3};

#[derive(Clone)]
pub struct Sphere {
    center: Vec3,
    radius: f32,
    material: Arc<Material>,
    bbox: Aabb,
}

impl Sphere {
    pub fn new(center: Vec3, radius: f32, material: Arc<Material>) -> Self {
        let radius = radius.max(0.0);
        let rvec = Vec3::splat(radius);
        let bbox = Aabb::from_points(center - rvec, center + rvec);

        Self {
            center,
            radius,
            material,
            bbox,
        }
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Latitude/longitude mapping of a point on the unit sphere.
    ///
    /// theta: angle down from +Y; phi: angle around Y starting from -X.
    fn sphere_uv(p: Vec3) -> (f32, f32) {
        let theta = (-p.y).clamp(-1.0, 1.0).acos();
        let phi = (-p.z).atan2(p.x) + PI;

        (phi / (2.0 * PI), theta / PI)
    }
}

impl Hittable for Sphere {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        let oc = self.center - ray.origin();
        let a = ray.direction().length_squared();
        let h = ray.direction().dot(oc);
        let c = oc.length_squared() - self.radius * self.radius;

        // A tangent ray (zero discriminant) grazes the surface; count it as a miss
        let discriminant = h * h - a * c;
        if discriminant <= 0.0 || a == 0.0 {
            return None;
        }

        let sqrtd = discriminant.sqrt();

        // Roots in ascending order; take the first one inside the window
        let mut root = (h - sqrtd) / a;
        if !ray_t.surrounds(root) {
            root = (h + sqrtd) / a;
            if !ray_t.surrounds(root) {
                return None;
            }
        }

        let outward_normal = (ray.at(root) - self.center) / self.radius;
        let rec = HitRecord::new(ray, root, outward_normal, &self.material);

        if self.material.is_textured() {
            Some(rec.with_uv(Self::sphere_uv(outward_normal)))
        } else {
            Some(rec)
        }
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}
