//! Camera for ray generation.

use lux_core::CameraDesc;
use lux_math::Vec3;
use rand::RngCore;

use crate::sampling::{halton_2d, sample_unit_disk};
use crate::Ray;

/// Pinhole camera with an optional thin lens.
///
/// The image plane sits at unit distance in front of the camera.
#[derive(Debug, Clone)]
pub struct Camera {
    pub image_width: u32,
    pub image_height: u32,

    // Camera positioning
    look_from: Vec3,
    look_at: Vec3,
    vup: Vec3,

    // Lens settings
    vfov: f32,        // Vertical field of view in degrees
    lens_radius: f32, // Zero for a pinhole

    // Cached computed values (set by initialize())
    center: Vec3,
    pixel00_loc: Vec3,
    pixel_delta_u: Vec3,
    pixel_delta_v: Vec3,
    u: Vec3,
    v: Vec3,
    w: Vec3,
    defocus_disk_u: Vec3,
    defocus_disk_v: Vec3,
}

impl Camera {
    /// Create a new camera with default settings.
    pub fn new() -> Self {
        Self {
            image_width: 400,
            image_height: 400,
            look_from: Vec3::ZERO,
            look_at: Vec3::new(0.0, 0.0, -1.0),
            vup: Vec3::Y,
            vfov: 90.0,
            lens_radius: 0.0,
            center: Vec3::ZERO,
            pixel00_loc: Vec3::ZERO,
            pixel_delta_u: Vec3::ZERO,
            pixel_delta_v: Vec3::ZERO,
            u: Vec3::X,
            v: Vec3::Y,
            w: Vec3::Z,
            defocus_disk_u: Vec3::ZERO,
            defocus_disk_v: Vec3::ZERO,
        }
    }

    /// Initialised camera matching a scene file's camera block.
    pub fn from_description(desc: &CameraDesc) -> Self {
        let mut camera = Camera::new()
            .with_resolution(desc.width, desc.image_height())
            .with_position(desc.position, desc.look_at, desc.up_vector)
            .with_lens(desc.fov, desc.lens_radius);
        camera.initialize();
        camera
    }

    /// Set image resolution.
    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.image_width = width.max(1);
        self.image_height = height.max(1);
        self
    }

    /// Set camera position.
    pub fn with_position(mut self, look_from: Vec3, look_at: Vec3, vup: Vec3) -> Self {
        self.look_from = look_from;
        self.look_at = look_at;
        self.vup = vup;
        self
    }

    /// Set vertical field of view (degrees) and lens radius.
    pub fn with_lens(mut self, vfov: f32, lens_radius: f32) -> Self {
        self.vfov = vfov;
        self.lens_radius = lens_radius.max(0.0);
        self
    }

    /// Initialize the camera (must be called before generating rays).
    pub fn initialize(&mut self) {
        self.center = self.look_from;

        // Calculate viewport dimensions
        let theta = self.vfov.to_radians();
        let h = (theta / 2.0).tan();
        let viewport_height = 2.0 * h;
        let viewport_width = viewport_height * (self.image_width as f32 / self.image_height as f32);

        // Calculate camera basis vectors
        self.w = (self.look_from - self.look_at).normalize_or(Vec3::Z);
        self.u = self.vup.cross(self.w).normalize_or(Vec3::X);
        self.v = self.w.cross(self.u);

        // Calculate viewport vectors
        let viewport_u = viewport_width * self.u;
        let viewport_v = -viewport_height * self.v;

        // Calculate pixel delta vectors
        self.pixel_delta_u = viewport_u / self.image_width as f32;
        self.pixel_delta_v = viewport_v / self.image_height as f32;

        // Calculate upper left pixel location
        let viewport_upper_left = self.center - self.w - viewport_u / 2.0 - viewport_v / 2.0;
        self.pixel00_loc = viewport_upper_left + 0.5 * (self.pixel_delta_u + self.pixel_delta_v);

        self.defocus_disk_u = self.lens_radius * self.u;
        self.defocus_disk_v = self.lens_radius * self.v;
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    /// Ray from the camera centre through the middle of pixel (i, j).
    pub fn center_ray(&self, i: u32, j: u32) -> Ray {
        let pixel_center = self.pixel_point(i as f32, j as f32);
        Ray::new(self.center, pixel_center - self.center)
    }

    /// Antialiased, depth-of-field ray for sample `sample` of pixel (i, j).
    ///
    /// The pixel-plane offset comes from the Halton (2, 3) point of the
    /// sample index, so successive samples stratify the pixel. The origin is a
    /// uniform point on the lens disk.
    pub fn sample_ray(&self, i: u32, j: u32, sample: u32, rng: &mut dyn RngCore) -> Ray {
        // Halton index starts at 1 (index 0 is the sequence origin) and the
        // offset is centred on the pixel, not a [0, 1) corner offset
        let jitter = halton_2d(sample.wrapping_add(1)) - 0.5;
        let pixel_sample = self.pixel_point(i as f32 + jitter.x, j as f32 + jitter.y);

        let ray_origin = if self.lens_radius <= 0.0 {
            self.center
        } else {
            self.defocus_disk_sample(rng)
        };

        Ray::new(ray_origin, pixel_sample - ray_origin)
    }

    fn pixel_point(&self, x: f32, y: f32) -> Vec3 {
        self.pixel00_loc + x * self.pixel_delta_u + y * self.pixel_delta_v
    }

    /// Sample a point on the lens disk.
    fn defocus_disk_sample(&self, rng: &mut dyn RngCore) -> Vec3 {
        let p = sample_unit_disk(rng);
        self.center + p.x * self.defocus_disk_u + p.y * self.defocus_disk_v
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn looking_down_z(width: u32, height: u32) -> Camera {
        let mut camera = Camera::new()
            .with_resolution(width, height)
            .with_position(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), Vec3::Y)
            .with_lens(90.0, 0.0);
        camera.initialize();
        camera
    }

    #[test]
    fn test_camera_initialize() {
        let camera = looking_down_z(800, 600);

        assert_eq!(camera.center, Vec3::ZERO);
        assert!((camera.w - Vec3::Z).length() < 0.001);
        assert!((camera.u - Vec3::X).length() < 0.001);
        assert!((camera.v - Vec3::Y).length() < 0.001);
    }

    #[test]
    fn test_center_ray_direction() {
        // Odd size so a pixel sits exactly in the middle
        let camera = looking_down_z(101, 101);

        let ray = camera.center_ray(50, 50);
        let dir = ray.direction().normalize();
        assert!((dir - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-4);
    }

    #[test]
    fn test_corner_rays_span_fov() {
        let camera = looking_down_z(100, 100);

        // 90° fov: the viewport half-height at unit distance is 1
        let top_left = camera.center_ray(0, 0).direction();
        assert!(top_left.x < 0.0 && top_left.y > 0.0);
        assert!((top_left.y - 0.99).abs() < 1e-4);
        let bottom_right = camera.center_ray(99, 99).direction();
        assert!(bottom_right.x > 0.0 && bottom_right.y < 0.0);
    }

    #[test]
    fn test_sample_rays_stay_inside_pixel() {
        let camera = looking_down_z(10, 10);
        let mut rng = StdRng::seed_from_u64(1);
        let half_pixel = 0.1;

        let center = camera.center_ray(4, 6).direction();
        for sample in 0..64 {
            let ray = camera.sample_ray(4, 6, sample, &mut rng);
            assert_eq!(ray.origin(), Vec3::ZERO);
            // Direction ends on the image plane at z = -1
            let offset = ray.direction() - center;
            assert!(offset.x.abs() <= half_pixel + 1e-5);
            assert!(offset.y.abs() <= half_pixel + 1e-5);
        }
    }

    #[test]
    fn test_sample_rays_are_deterministic_without_lens() {
        let camera = looking_down_z(10, 10);
        let mut rng_a = StdRng::seed_from_u64(1);
        let mut rng_b = StdRng::seed_from_u64(99);

        let a = camera.sample_ray(3, 3, 7, &mut rng_a);
        let b = camera.sample_ray(3, 3, 7, &mut rng_b);
        assert_eq!(a.direction(), b.direction());
    }

    #[test]
    fn test_lens_moves_origin_within_radius() {
        let mut camera = Camera::new()
            .with_resolution(10, 10)
            .with_position(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), Vec3::Y)
            .with_lens(60.0, 0.25);
        camera.initialize();
        let mut rng = StdRng::seed_from_u64(5);

        let mut moved = false;
        for sample in 0..32 {
            let origin = camera.sample_ray(5, 5, sample, &mut rng).origin();
            assert!(origin.length() <= 0.25 + 1e-5);
            assert!(origin.z.abs() < 1e-6);
            moved |= origin.length() > 0.0;
        }
        assert!(moved);
    }
}
