//! Bucket-based tile rendering.
//!
//! Divides the image into tiles (buckets) that are rendered independently
//! and in parallel using rayon.

use std::time::Instant;

use lux_math::Color;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use rayon::prelude::*;

use crate::renderer::render_pixel;
use crate::{Camera, ImageBuffer, RenderConfig, Scene};

/// A rectangular region of the image to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bucket {
    /// X coordinate of bucket's top-left corner
    pub x: u32,
    /// Y coordinate of bucket's top-left corner
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// Index of this bucket in the render order
    pub index: usize,
}

impl Bucket {
    pub fn new(x: u32, y: u32, width: u32, height: u32, index: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
            index,
        }
    }

    /// Get the total number of pixels in this bucket.
    pub fn pixel_count(&self) -> u32 {
        self.width * self.height
    }
}

/// Default bucket size in pixels.
pub const DEFAULT_BUCKET_SIZE: u32 = 32;

/// Generate buckets for an image in row-major order.
pub fn generate_buckets(width: u32, height: u32, bucket_size: u32) -> Vec<Bucket> {
    let bucket_size = bucket_size.max(1);
    let mut buckets = Vec::new();

    let mut y = 0;
    while y < height {
        let mut x = 0;
        while x < width {
            let bw = bucket_size.min(width - x);
            let bh = bucket_size.min(height - y);
            buckets.push(Bucket::new(x, y, bw, bh, buckets.len()));
            x += bucket_size;
        }
        y += bucket_size;
    }

    buckets
}

/// Generator for pixel (x, y), seeded from the render seed and the pixel's
/// row-major index. The same pixel always draws the same random stream,
/// whichever thread renders it.
pub fn pixel_rng(seed: u64, x: u32, y: u32, width: u32) -> SmallRng {
    let index = y as u64 * width as u64 + x as u64;
    SmallRng::seed_from_u64(seed ^ index.wrapping_mul(0x9E37_79B9_7F4A_7C15))
}

/// Render a single bucket to a vector of colors.
///
/// Returns pixels in row-major order within the bucket.
pub fn render_bucket(
    bucket: &Bucket,
    camera: &Camera,
    scene: &Scene,
    config: &RenderConfig,
) -> Vec<Color> {
    let mut pixels = Vec::with_capacity(bucket.pixel_count() as usize);

    for local_y in 0..bucket.height {
        for local_x in 0..bucket.width {
            let global_x = bucket.x + local_x;
            let global_y = bucket.y + local_y;
            let mut rng = pixel_rng(config.seed, global_x, global_y, camera.image_width);
            let color = render_pixel(camera, scene, global_x, global_y, config, &mut rng);
            pixels.push(color);
        }
    }

    pixels
}

/// Result of rendering a bucket.
#[derive(Debug, Clone)]
pub struct BucketResult {
    pub bucket: Bucket,
    /// Pixel colors in row-major order
    pub pixels: Vec<Color>,
}

impl BucketResult {
    pub fn new(bucket: Bucket, pixels: Vec<Color>) -> Self {
        Self { bucket, pixels }
    }

    /// Copy the bucket's pixels into their place in `image`.
    pub fn write_into(&self, image: &mut ImageBuffer) {
        let width = self.bucket.width as usize;
        for (i, &color) in self.pixels.iter().enumerate() {
            let x = self.bucket.x + (i % width) as u32;
            let y = self.bucket.y + (i / width) as u32;
            image.set(x, y, color);
        }
    }
}

/// Render the whole image, buckets in parallel on the current rayon pool.
pub fn render(camera: &Camera, scene: &Scene, config: &RenderConfig) -> ImageBuffer {
    let width = camera.image_width;
    let height = camera.image_height;
    let buckets = generate_buckets(width, height, config.bucket_size);

    log::info!(
        "Rendering {}x{} ({:?}, {} spp, {} bounces) in {} buckets on {} threads",
        width,
        height,
        config.mode,
        config.samples_per_pixel,
        config.nbounces,
        buckets.len(),
        rayon::current_num_threads()
    );
    let start = Instant::now();

    let results: Vec<BucketResult> = buckets
        .par_iter()
        .map(|bucket| BucketResult::new(*bucket, render_bucket(bucket, camera, scene, config)))
        .collect();

    let mut image = ImageBuffer::new(width, height);
    for result in &results {
        result.write_into(&mut image);
    }

    log::info!("Render finished in {:.2?}", start.elapsed());
    image
}
