//! Capped cylinder primitive.

use std::f32::consts::PI;
use std::sync::Arc;

use crate::{HitRecord, Hittable, Material, Ray};
use lux_math::{Aabb, Interval, Vec3};

const EPSILON: f32 = 1e-8;

/// Solid cylinder with flat caps.
///
/// `height` is the half-extent along `axis`: the caps sit at
/// `center ± height · axis`.
#[derive(Clone)]
pub struct Cylinder {
    center: Vec3,
    axis: Vec3,
    radius: f32,
    height: f32,
    material: Arc<Material>,
    bbox: Aabb,
}

impl Cylinder {
    pub fn new(center: Vec3, axis: Vec3, radius: f32, height: f32, material: Arc<Material>) -> Self {
        let axis = axis.normalize_or(Vec3::Y);
        let radius = radius.max(0.0);
        let height = height.max(0.0);

        // Per-axis half extent of the caps swept along the axis
        let extent = Vec3::from_array(axis.to_array().map(|a| {
            height * a.abs() + radius * (1.0 - a * a).max(0.0).sqrt()
        }));
        let bbox = Aabb::from_points(center - extent, center + extent);

        Self {
            center,
            axis,
            radius,
            height,
            material,
            bbox,
        }
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn axis(&self) -> Vec3 {
        self.axis
    }

    /// Nearest root on the curved body inside `ray_t`.
    fn hit_body(&self, ray: &Ray, ray_t: Interval) -> Option<(f32, Vec3)> {
        let oc = ray.origin() - self.center;
        let d = ray.direction();

        // Components perpendicular to the axis
        let d_perp = d - d.dot(self.axis) * self.axis;
        let oc_perp = oc - oc.dot(self.axis) * self.axis;

        let a = d_perp.length_squared();
        if a < EPSILON {
            return None;
        }
        let h = d_perp.dot(oc_perp);
        let c = oc_perp.length_squared() - self.radius * self.radius;

        let discriminant = h * h - a * c;
        if discriminant <= 0.0 {
            return None;
        }
        let sqrtd = discriminant.sqrt();

        [(-h - sqrtd) / a, (-h + sqrtd) / a]
            .into_iter()
            .filter(|&t| ray_t.surrounds(t))
            .find_map(|t| {
                let local = ray.at(t) - self.center;
                let proj = local.dot(self.axis);
                if proj.abs() > self.height {
                    return None;
                }
                let normal = (local - proj * self.axis) / self.radius;
                Some((t, normal))
            })
    }

    /// Nearest cap hit inside `ray_t`. Skipped when the ray runs parallel to
    /// the caps.
    fn hit_caps(&self, ray: &Ray, ray_t: Interval) -> Option<(f32, Vec3)> {
        let denom = ray.direction().dot(self.axis);
        if denom.abs() < EPSILON {
            return None;
        }

        let r2 = self.radius * self.radius;
        [1.0_f32, -1.0]
            .into_iter()
            .filter_map(|sign| {
                let cap_center = self.center + sign * self.height * self.axis;
                let t = (cap_center - ray.origin()).dot(self.axis) / denom;
                if !ray_t.surrounds(t) {
                    return None;
                }
                if (ray.at(t) - cap_center).length_squared() > r2 {
                    return None;
                }
                Some((t, sign * self.axis))
            })
            .min_by(|a, b| a.0.total_cmp(&b.0))
    }

    /// Azimuth around the axis and normalised position along it.
    fn cylinder_uv(&self, p: Vec3) -> (f32, f32) {
        let local = p - self.center;
        let proj = local.dot(self.axis);
        let radial = local - proj * self.axis;
        let (tangent, bitangent) = self.axis.any_orthonormal_pair();

        let phi = radial.dot(bitangent).atan2(radial.dot(tangent));
        let u = (phi + PI) / (2.0 * PI);
        let v = if self.height > 0.0 {
            ((proj / self.height + 1.0) * 0.5).clamp(0.0, 1.0)
        } else {
            0.5
        };

        (u, v)
    }
}

impl Hittable for Cylinder {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        let body = self.hit_body(ray, ray_t);
        let window = body.map_or(ray_t, |(t, _)| ray_t.with_max(t));
        let cap = self.hit_caps(ray, window);

        let (t, outward_normal) = cap.or(body)?;
        let rec = HitRecord::new(ray, t, outward_normal, &self.material);

        if self.material.is_textured() {
            Some(rec.with_uv(self.cylinder_uv(rec.p)))
        } else {
            Some(rec)
        }
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}
