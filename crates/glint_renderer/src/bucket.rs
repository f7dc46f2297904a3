//! Bucket-based tile rendering.
//!
//! Divides the image into tiles (buckets) that are rendered independently
//! and in parallel with rayon. The scene is read-only while tracing, so
//! buckets share it freely.

use rayon::prelude::*;

use glint_math::Color;

use crate::camera::Camera;
use crate::scene::Scene;
use crate::tracer::{render_pixel, resolve_exposure, tone_map, ImageBuffer, RenderSettings};

/// A rectangular region of the image to render.
#[derive(Debug, Clone, Copy)]
pub struct Bucket {
    /// X coordinate of the bucket's top-left corner
    pub x: u32,
    /// Y coordinate of the bucket's top-left corner
    pub y: u32,
    /// Width of the bucket in pixels
    pub width: u32,
    /// Height of the bucket in pixels
    pub height: u32,
}

impl Bucket {
    /// Create a new bucket.
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Get the total number of pixels in this bucket.
    pub fn pixel_count(&self) -> u32 {
        self.width * self.height
    }
}

/// Result of rendering a bucket: pixels in row-major order within it.
#[derive(Debug, Clone)]
pub struct BucketResult {
    pub bucket: Bucket,
    pub pixels: Vec<Color>,
}

/// Generate the grid of buckets covering an image.
pub fn generate_buckets(width: u32, height: u32, bucket_size: u32) -> Vec<Bucket> {
    let mut buckets = Vec::new();

    let mut y = 0;
    while y < height {
        let mut x = 0;
        while x < width {
            let bw = bucket_size.min(width - x);
            let bh = bucket_size.min(height - y);
            buckets.push(Bucket::new(x, y, bw, bh));
            x += bucket_size;
        }
        y += bucket_size;
    }

    buckets
}

/// Render a single bucket, tone-mapped for display.
pub fn render_bucket(
    bucket: &Bucket,
    scene: &Scene,
    camera: &Camera,
    exposure: Option<f32>,
    settings: &RenderSettings,
) -> BucketResult {
    let mut pixels = Vec::with_capacity(bucket.pixel_count() as usize);

    for local_y in 0..bucket.height {
        for local_x in 0..bucket.width {
            let color = render_pixel(scene, camera, bucket.x + local_x, bucket.y + local_y);
            pixels.push(tone_map(color, exposure, settings.srgb_gamma));
        }
    }

    BucketResult {
        bucket: *bucket,
        pixels,
    }
}

/// Render the whole image, fanning buckets out across rayon workers.
pub fn render(scene: &Scene, camera: &Camera, settings: &RenderSettings) -> ImageBuffer {
    let width = camera.image_width();
    let height = camera.image_height();

    let exposure = resolve_exposure(settings, scene, camera);
    let buckets = generate_buckets(width, height, settings.bucket_size.max(1));
    log::info!(
        "rendering {width}x{height} in {} buckets across {} objects",
        buckets.len(),
        scene.len()
    );

    let results: Vec<BucketResult> = buckets
        .par_iter()
        .map(|bucket| render_bucket(bucket, scene, camera, exposure, settings))
        .collect();

    let mut image = ImageBuffer::new(width, height);
    for result in results {
        let bucket = result.bucket;
        for (index, color) in result.pixels.into_iter().enumerate() {
            let x = bucket.x + index as u32 % bucket.width;
            let y = bucket.y + index as u32 / bucket.width;
            image.set(x, y, color);
        }
    }
    image
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Camera, CameraConfig, Material, Scene, Sphere};
    use glint_math::Vec3;

    #[test]
    fn test_generate_buckets_exact_fit() {
        let buckets = generate_buckets(128, 128, 64);
        assert_eq!(buckets.len(), 4); // 2x2 grid

        let total_pixels: u32 = buckets.iter().map(|b| b.pixel_count()).sum();
        assert_eq!(total_pixels, 128 * 128);
    }

    #[test]
    fn test_generate_buckets_partial_fit() {
        let buckets = generate_buckets(100, 100, 64);
        assert_eq!(buckets.len(), 4); // 2x2 grid with partial buckets

        let total_pixels: u32 = buckets.iter().map(|b| b.pixel_count()).sum();
        assert_eq!(total_pixels, 100 * 100);
    }

    #[test]
    fn test_render_covers_every_pixel() {
        let mut scene = Scene::new();
        scene.set_background(Material {
            ambient: Color::new(0.25, 0.25, 0.25),
            ..Material::air()
        });
        scene.add_object(Box::new(Sphere::new(
            Vec3::new(0.0, 0.0, -3.0),
            1.0,
            Material::default(),
        )));

        let camera = Camera::new(CameraConfig {
            image_width: 40,
            image_height: 30,
            ..Default::default()
        });
        let settings = RenderSettings {
            srgb_gamma: false,
            bucket_size: 16,
            ..Default::default()
        };

        let image = render(&scene, &camera, &settings);
        assert_eq!(image.pixels.len(), 40 * 30);
        // Corner pixels miss the sphere and land on the background
        assert_eq!(image.get(0, 0), Color::new(0.25, 0.25, 0.25));
    }
}
