//! Hittable trait and HitRecord for ray-object intersection.

use crate::{Material, Ray, Shape};
use lux_math::{Aabb, Interval, Vec3};

/// Parameter window for every ray cast from a surface or the camera. The
/// lower bound keeps a ray from re-hitting the surface it starts on.
pub const SCENE_RAY_T: Interval = Interval::new(0.001, f32::INFINITY);

/// Record of a ray-object intersection.
///
/// Produced by value for a single query; the material is borrowed from the
/// primitive that was hit.
#[derive(Clone, Copy)]
pub struct HitRecord<'a> {
    /// Point of intersection
    pub p: Vec3,
    /// Unit surface normal, always facing against the incoming ray
    pub normal: Vec3,
    pub material: &'a Material,
    /// Texture coordinates, only filled in for textured materials
    pub u: f32,
    pub v: f32,
    /// Ray parameter of the intersection
    pub t: f32,
    /// Whether the ray hit the outside of the surface
    pub front_face: bool,
}

impl<'a> HitRecord<'a> {
    /// Build a record from an outward unit normal, orienting it against the
    /// ray. UV starts at zero.
    pub fn new(ray: &Ray, t: f32, outward_normal: Vec3, material: &'a Material) -> Self {
        let front_face = ray.direction().dot(outward_normal) < 0.0;
        Self {
            p: ray.at(t),
            normal: if front_face {
                outward_normal
            } else {
                -outward_normal
            },
            material,
            u: 0.0,
            v: 0.0,
            t,
            front_face,
        }
    }

    pub fn with_uv(mut self, (u, v): (f32, f32)) -> Self {
        self.u = u;
        self.v = v;
        self
    }
}

/// Anything a ray can be intersected with.
pub trait Hittable: Send + Sync {
    /// Nearest intersection with `t` inside `ray_t`, if any.
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>>;

    /// Get the axis-aligned bounding box of this object.
    fn bounding_box(&self) -> Aabb;
}

/// A flat list of shapes tested one after another.
///
/// Linear in the number of shapes; the BVH is the structure used for
/// rendering, the list serves small scenes and as the reference it must agree
/// with.
#[derive(Clone)]
pub struct HittableList {
    objects: Vec<Shape>,
    bbox: Aabb,
}

impl HittableList {
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
            bbox: Aabb::EMPTY,
        }
    }

    pub fn add(&mut self, object: impl Into<Shape>) {
        let object = object.into();
        self.bbox = Aabb::surrounding(&self.bbox, &object.bounding_box());
        self.objects.push(object);
    }

    pub fn objects(&self) -> &[Shape] {
        &self.objects
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl Default for HittableList {
    fn default() -> Self {
        Self::new()
    }
}

impl FromIterator<Shape> for HittableList {
    fn from_iter<I: IntoIterator<Item = Shape>>(iter: I) -> Self {
        let mut list = HittableList::new();
        for shape in iter {
            list.add(shape);
        }
        list
    }
}

/// Closest hit among `objects`, shrinking the window after every hit.
pub(crate) fn closest_hit<'a>(
    objects: &'a [Shape],
    ray: &Ray,
    ray_t: Interval,
) -> Option<HitRecord<'a>> {
    let mut closest: Option<HitRecord<'a>> = None;

    for object in objects {
        let window = ray_t.with_max(closest.map_or(ray_t.max, |rec| rec.t));
        if let Some(rec) = object.hit(ray, window) {
            closest = Some(rec);
        }
    }

    closest
}

impl Hittable for HittableList {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        closest_hit(&self.objects, ray, ray_t)
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Lambertian, Sphere};
    use std::sync::Arc;

    fn gray() -> Arc<Material> {
        Arc::new(Material::Lambertian(Lambertian::new(Vec3::splat(0.5))))
    }

    #[test]
    fn test_face_normal_orientation() {
        let material = gray();
        let outward = Vec3::new(0.0, 0.0, 1.0);

        let incoming = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0));
        let rec = HitRecord::new(&incoming, 5.0, outward, &material);
        assert!(rec.front_face);
        assert_eq!(rec.normal, outward);

        let from_inside = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, 1.0));
        let rec = HitRecord::new(&from_inside, 1.0, outward, &material);
        assert!(!rec.front_face);
        assert_eq!(rec.normal, -outward);
    }

    #[test]
    fn test_list_returns_closest() {
        let mut list = HittableList::new();
        list.add(Sphere::new(Vec3::new(0.0, 0.0, -10.0), 1.0, gray()));
        list.add(Sphere::new(Vec3::new(0.0, 0.0, -4.0), 1.0, gray()));
        list.add(Sphere::new(Vec3::new(0.0, 0.0, -7.0), 1.0, gray()));

        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let rec = list.hit(&ray, SCENE_RAY_T).expect("ray should hit");
        assert!((rec.t - 3.0).abs() < 1e-4);
    }

    #[test]
    fn test_empty_list_misses() {
        let list = HittableList::new();
        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        assert!(list.hit(&ray, SCENE_RAY_T).is_none());
        assert!(list.is_empty());
    }
}
