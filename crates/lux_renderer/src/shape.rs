//! Closed set of geometric primitives.

use crate::{Cylinder, HitRecord, Hittable, Ray, Sphere, Triangle};
use lux_math::{Aabb, Interval};

/// Any primitive the scene can hold.
#[derive(Clone)]
pub enum Shape {
    Sphere(Sphere),
    Cylinder(Cylinder),
    Triangle(Triangle),
}

impl Hittable for Shape {
    #[inline]
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        match self {
            Shape::Sphere(s) => s.hit(ray, ray_t),
            Shape::Cylinder(c) => c.hit(ray, ray_t),
            Shape::Triangle(t) => t.hit(ray, ray_t),
        }
    }

    fn bounding_box(&self) -> Aabb {
        match self {
            Shape::Sphere(s) => s.bounding_box(),
            Shape::Cylinder(c) => c.bounding_box(),
            Shape::Triangle(t) => t.bounding_box(),
        }
    }
}

impl From<Sphere> for Shape {
    fn from(sphere: Sphere) -> Self {
        Shape::Sphere(sphere)
    }
}

impl From<Cylinder> for Shape {
    fn from(cylinder: Cylinder) -> Self {
        Shape::Cylinder(cylinder)
    }
}

impl From<Triangle> for Shape {
    fn from(triangle: Triangle) -> Self {
        Shape::Triangle(triangle)
    }
}
