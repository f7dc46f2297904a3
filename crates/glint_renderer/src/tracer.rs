//! The recursive light transport kernel and per-render tone mapping.
//!
//! `compute` walks one ray through the scene: direct Phong illumination at
//! the hit, plus reflected and refracted recursive contributions weighted by
//! Fresnel reflectance and Beer's-law absorption. Every edge case - miss,
//! light marker re-entry, recursion ceiling, total internal reflection -
//! degrades to a deterministic color, never an error.

use glint_core::Material;
use glint_math::{Color, Ray, Vec3, EPSILON};

use crate::camera::Camera;
use crate::scene::Scene;
use crate::shape::Hit;

/// Exposure handling for a render pass.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum ToneExposure {
    /// Clamp colors to [0, 1] without exposure
    #[default]
    Off,
    /// Probe the scene and derive the exposure factor
    Auto,
    /// Use a fixed exposure factor
    Manual(f32),
}

/// Per-render configuration.
///
/// Passed explicitly into rendering; the tracer itself holds no mutable
/// state between pixels.
#[derive(Clone, Copy, Debug)]
pub struct RenderSettings {
    pub exposure: ToneExposure,
    /// Encode output with the sRGB transfer curve
    pub srgb_gamma: bool,
    /// Tile edge length for the bucket renderer
    pub bucket_size: u32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            exposure: ToneExposure::Off,
            srgb_gamma: true,
            bucket_size: 64,
        }
    }
}

/// Evaluate the radiance along `ray`.
///
/// `intensity` is the energy still carried by this path and `source_density`
/// the refractive density of the medium the ray travels in. Returns the
/// accumulated color together with the primary hit, which callers consume
/// for exposure probing.
pub fn compute<'a>(
    scene: &'a Scene,
    ray: &Ray,
    recursion_depth: i32,
    intensity: f32,
    source_density: f32,
) -> (Color, Option<Hit<'a>>) {
    let max_depth = scene.limits().max_recursion_depth;
    if max_depth >= 0 && recursion_depth > max_depth {
        return (Color::ZERO, None);
    }

    let secondary = recursion_depth != 0;

    let Some(hit) = scene.intersect(ray, false) else {
        // Secondary rays fade to black; primary rays see the background
        let color = if secondary {
            Color::ZERO
        } else {
            scene.background().ambient
        };
        return (color, None);
    };

    if hit.shape.is_light() {
        // Lights are unshaded markers: secondary rays gain nothing from
        // them, primary rays see the raw material color
        let color = if secondary {
            Color::ZERO
        } else {
            hit.shape
                .material()
                .map_or(Color::ZERO, |m| m.ambient + m.diffuse + m.specular)
        };
        return (color, Some(hit));
    }

    let point = ray.at(hit.distance);
    let normal = hit.normal;

    let mut color = scene.illuminate(ray, hit.shape, hit.distance, normal);

    let Some(material) = hit.shape.material() else {
        return (color, Some(hit));
    };

    // Orient the normal against the incoming ray; a positive projection
    // means the ray is leaving the medium
    let direction = ray.direction();
    let out_normal = if direction.dot(normal) > 0.0 {
        -normal
    } else {
        normal
    };

    let fresnel = fresnel_reflectance(direction, source_density, material.density, out_normal);

    if material.reflection > 0.0 && intensity > EPSILON {
        let reflected_dir = direction - 2.0 * direction.dot(out_normal) * out_normal;
        let reflected_ray = Ray::new(point + reflected_dir * EPSILON, reflected_dir);
        let (reflected, _) = compute(
            scene,
            &reflected_ray,
            recursion_depth + 1,
            intensity * material.reflection,
            source_density,
        );
        color += reflected * material.diffuse * (intensity * material.reflection * fresnel);
    }

    if material.refraction > 0.0 {
        if let Some(refracted_dir) =
            refract_direction(direction, source_density, material.density, out_normal)
        {
            let refracted_ray = Ray::new(point + refracted_dir * EPSILON, refracted_dir);
            let (refracted, exit) = compute(
                scene,
                &refracted_ray,
                recursion_depth + 1,
                intensity,
                material.density,
            );
            // Without a further surface the transmitted path contributes
            // nothing
            if let Some(exit) = exit {
                let transparency = beer_transparency(material.diffuse, exit.distance);
                color += refracted * transparency * (1.0 - fresnel);
            }
        }
    }

    (color, Some(hit))
}

/// Exact Fresnel reflectance, averaging the s- and p-polarized terms.
///
/// Beyond the critical angle every bit of energy reflects, so the factor
/// saturates at 1.
fn fresnel_reflectance(source_dir: Vec3, source_density: f32, target_density: f32, out_normal: Vec3) -> f32 {
    let nue = source_density / target_density;
    let cos_s = -out_normal.dot(source_dir);
    let cos_t2 = 1.0 - nue * nue * (1.0 - cos_s * cos_s);

    if cos_t2 < 0.0 {
        // Total internal reflection
        return 1.0;
    }
    let cos_t = cos_t2.sqrt();

    let r_s = (source_density * cos_s - target_density * cos_t)
        / (source_density * cos_s + target_density * cos_t);
    let r_p = (source_density * cos_t - target_density * cos_s)
        / (source_density * cos_t + target_density * cos_s);

    let reflectance = 0.5 * (r_s * r_s + r_p * r_p);
    if reflectance.is_finite() {
        reflectance
    } else {
        0.0
    }
}

/// Snell refraction of `source_dir` through the oriented surface normal;
/// `None` under total internal reflection.
fn refract_direction(
    source_dir: Vec3,
    source_density: f32,
    target_density: f32,
    out_normal: Vec3,
) -> Option<Vec3> {
    let nue = source_density / target_density;
    let cos_s = -out_normal.dot(source_dir);
    let cos_t2 = 1.0 - nue * nue * (1.0 - cos_s * cos_s);

    if cos_t2 < 0.0 {
        return None;
    }
    Some((nue * source_dir + (nue * cos_s - cos_t2.sqrt()) * out_normal).normalize())
}

/// Beer's-law transparency after traveling `distance` through a medium
/// tinted by `diffuse`.
fn beer_transparency(diffuse: Color, distance: f32) -> Color {
    let absorbance = diffuse * 0.15 * -distance;
    Color::new(absorbance.x.exp(), absorbance.y.exp(), absorbance.z.exp())
}

/// Raw radiance of a single pixel.
pub fn render_pixel(scene: &Scene, camera: &Camera, x: u32, y: u32) -> Color {
    let ray = camera.look_through(x, y);
    let (color, _) = compute(scene, &ray, 0, 1.0, Material::AIR_DENSITY);
    color
}

/// Probe the scene on a sparse grid and derive an exposure factor from the
/// RMS luminance.
pub fn compute_exposure(scene: &Scene, camera: &Camera) -> f32 {
    const GRID: u32 = 16;
    const MIDPOINT: f32 = 0.7;

    let weight = 1.0 / (GRID * GRID) as f32;
    let step_x = camera.image_width().max(GRID) / GRID;
    let step_y = camera.image_height().max(GRID) / GRID;

    let mut medium_point = 0.0;
    for y in 0..GRID {
        for x in 0..GRID {
            let color = render_pixel(scene, camera, x * step_x, y * step_y);
            let luminance = 0.2126 * color.x + 0.71516 * color.y + 0.072169 * color.z;
            medium_point += weight * luminance * luminance;
        }
    }

    let medium_luminance = medium_point.sqrt();
    if medium_luminance > 0.0 {
        (1.0 - MIDPOINT).ln() / medium_luminance
    } else {
        -1.0
    }
}

/// Resolve the exposure setting to a concrete factor, if any.
pub fn resolve_exposure(settings: &RenderSettings, scene: &Scene, camera: &Camera) -> Option<f32> {
    match settings.exposure {
        ToneExposure::Off => None,
        ToneExposure::Auto => Some(compute_exposure(scene, camera)),
        ToneExposure::Manual(factor) => Some(factor),
    }
}

/// Map a raw radiance value to a display color in [0, 1].
pub fn tone_map(color: Color, exposure: Option<f32>, srgb_gamma: bool) -> Color {
    let mut mapped = match exposure {
        Some(factor) => Color::new(
            1.0 - (color.x * factor).exp(),
            1.0 - (color.y * factor).exp(),
            1.0 - (color.z * factor).exp(),
        ),
        None => color.min(Color::ONE),
    };

    if srgb_gamma {
        mapped = Color::new(
            srgb_encode(mapped.x),
            srgb_encode(mapped.y),
            srgb_encode(mapped.z),
        );
    }
    mapped
}

/// sRGB transfer curve (inverse gamma 2.4 with a linear toe).
fn srgb_encode(value: f32) -> f32 {
    if value < 0.003_130_8 {
        12.92 * value
    } else {
        1.055 * value.powf(1.0 / 2.4) - 0.055
    }
}

/// Convert a display color to 8-bit RGBA.
pub fn color_to_rgba(color: Color) -> [u8; 4] {
    let r = (color.x.clamp(0.0, 1.0) * 255.0) as u8;
    let g = (color.y.clamp(0.0, 1.0) * 255.0) as u8;
    let b = (color.z.clamp(0.0, 1.0) * 255.0) as u8;
    [r, g, b, 255]
}

/// Simple image buffer for storing render output.
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; (width * height) as usize],
        }
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[(y * self.width + x) as usize]
    }

    /// Set the pixel at (x, y).
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        self.pixels[(y * self.width + x) as usize] = color;
    }

    /// Convert to RGBA bytes (for display or saving).
    pub fn to_rgba(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity((self.width * self.height * 4) as usize);
        for color in &self.pixels {
            bytes.extend_from_slice(&color_to_rgba(*color));
        }
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Light, Material, Scene, Sphere, TraceLimits};
    use approx::assert_relative_eq;

    fn scene_with_background(ambient: Color) -> Scene {
        let mut scene = Scene::new();
        scene.set_background(Material {
            ambient,
            ..Material::air()
        });
        scene
    }

    fn forward_ray() -> Ray {
        Ray::new(Vec3::ZERO, Vec3::NEG_Z)
    }

    #[test]
    fn test_primary_miss_returns_background_ambient() {
        let scene = scene_with_background(Color::new(0.1, 0.1, 0.2));
        let (color, hit) = compute(&scene, &forward_ray(), 0, 1.0, Material::AIR_DENSITY);

        assert_eq!(color, Color::new(0.1, 0.1, 0.2));
        assert!(hit.is_none());
    }

    #[test]
    fn test_secondary_miss_is_black() {
        let scene = scene_with_background(Color::new(0.1, 0.1, 0.2));
        let (color, _) = compute(&scene, &forward_ray(), 1, 1.0, Material::AIR_DENSITY);
        assert_eq!(color, Color::ZERO);
    }

    #[test]
    fn test_recursion_ceiling_returns_black() {
        let mut scene = scene_with_background(Color::new(0.5, 0.5, 0.5));
        scene.set_limits(TraceLimits {
            max_recursion_depth: 2,
        });

        let (color, hit) = compute(&scene, &forward_ray(), 3, 1.0, Material::AIR_DENSITY);
        assert_eq!(color, Color::ZERO);
        assert!(hit.is_none());
    }

    #[test]
    fn test_inert_material_gets_direct_illumination_only() {
        // Reflection == 0 and refraction == 0: the result is exactly the
        // scene's illuminate() answer
        let mut scene = Scene::new();
        scene.add_light(Light::point(Vec3::new(0.0, 0.0, 5.0)));
        scene.add_object(Box::new(Sphere::new(
            Vec3::new(0.0, 0.0, -3.0),
            1.0,
            Material {
                ambient: Color::new(0.05, 0.05, 0.05),
                diffuse: Color::new(0.7, 0.7, 0.7),
                ..Default::default()
            },
        )));

        let ray = forward_ray();
        let (color, hit) = compute(&scene, &ray, 0, 1.0, Material::AIR_DENSITY);
        let hit = hit.expect("sphere hit");

        let direct = scene.illuminate(&ray, hit.shape, hit.distance, hit.normal);
        assert_eq!(color, direct);
    }

    #[test]
    fn test_light_marker_primary_vs_secondary() {
        let mut scene = Scene::new();
        let mut marker = Sphere::new(
            Vec3::new(0.0, 0.0, -3.0),
            1.0,
            Material {
                ambient: Color::new(0.2, 0.0, 0.0),
                diffuse: Color::new(0.0, 0.3, 0.0),
                specular: Color::new(0.0, 0.0, 0.4),
                ..Default::default()
            },
        );
        crate::Shape::set_light(&mut marker, true);
        scene.add_object(Box::new(marker));

        let (primary, _) = compute(&scene, &forward_ray(), 0, 1.0, Material::AIR_DENSITY);
        assert_eq!(primary, Color::new(0.2, 0.3, 0.4));

        let (secondary, hit) = compute(&scene, &forward_ray(), 1, 1.0, Material::AIR_DENSITY);
        assert_eq!(secondary, Color::ZERO);
        assert!(hit.is_some());
    }

    #[test]
    fn test_mirror_with_zero_depth_has_no_reflection() {
        // A perfect mirror in front of a bright backdrop; with the ceiling
        // at zero the reflected recursion is cut before it starts
        let mut scene = scene_with_background(Color::new(0.9, 0.9, 0.9));
        scene.set_limits(TraceLimits {
            max_recursion_depth: 0,
        });
        let material = Material {
            reflection: 1.0,
            diffuse: Color::ONE,
            ..Default::default()
        };
        scene.add_object(Box::new(Sphere::new(Vec3::new(0.0, 0.0, -3.0), 1.0, material)));

        let (color, _) = compute(&scene, &forward_ray(), 0, 1.0, Material::AIR_DENSITY);
        // No lights and no reflected energy: pure black
        assert_eq!(color, Color::ZERO);
    }

    #[test]
    fn test_mirror_with_depth_sees_its_surroundings() {
        let mut scene = scene_with_background(Color::new(0.9, 0.9, 0.9));
        scene.set_limits(TraceLimits {
            max_recursion_depth: 2,
        });
        // A light marker behind the camera for the mirror to pick up
        let mut marker = Sphere::new(
            Vec3::new(0.0, 0.0, 10.0),
            1.0,
            Material {
                ambient: Color::new(0.8, 0.8, 0.8),
                ..Default::default()
            },
        );
        crate::Shape::set_light(&mut marker, true);
        scene.add_object(Box::new(marker));

        let material = Material {
            reflection: 1.0,
            diffuse: Color::ONE,
            ..Default::default()
        };
        scene.add_object(Box::new(Sphere::new(Vec3::new(0.0, 0.0, -3.0), 1.0, material)));

        let (color, _) = compute(&scene, &forward_ray(), 0, 1.0, Material::AIR_DENSITY);
        // Reflected rays that land on a light marker stay black by policy
        assert_eq!(color, Color::ZERO);
    }

    #[test]
    fn test_fresnel_tir_saturates() {
        // Dense-to-thin grazing incidence: beyond the critical angle
        let direction = Vec3::new(0.99, -0.141, 0.0).normalize();
        let normal = Vec3::Y;
        let reflectance = fresnel_reflectance(direction, 1.5, 1.0, normal);
        assert_eq!(reflectance, 1.0);
        assert!(refract_direction(direction, 1.5, 1.0, normal).is_none());
    }

    #[test]
    fn test_refraction_straight_through_interface() {
        // Normal incidence never bends
        let direction = Vec3::NEG_Y;
        let refracted = refract_direction(direction, 1.0, 1.5, Vec3::Y).unwrap();
        assert_relative_eq!(refracted.y, -1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_beer_transparency_darkens_with_distance() {
        let tint = Color::new(0.5, 0.5, 0.5);
        let near = beer_transparency(tint, 0.1);
        let far = beer_transparency(tint, 10.0);
        assert!(near.x > far.x);
        assert!(near.x <= 1.0);
    }

    #[test]
    fn test_tone_map_saturation() {
        let over = Color::new(2.0, 0.5, 1.5);
        let mapped = tone_map(over, None, false);
        assert_eq!(mapped, Color::new(1.0, 0.5, 1.0));
    }

    #[test]
    fn test_tone_map_exposure_compresses() {
        let mapped = tone_map(Color::ONE, Some(-1.0), false);
        // 1 - e^-1
        assert_relative_eq!(mapped.x, 0.632, epsilon = 1e-3);
    }

    #[test]
    fn test_srgb_rounds_through_gamma() {
        let mapped = tone_map(Color::splat(0.5), None, true);
        assert!(mapped.x > 0.5 && mapped.x < 1.0);
    }

    #[test]
    fn test_image_buffer_roundtrip() {
        let mut buffer = ImageBuffer::new(2, 2);
        buffer.set(1, 0, Color::ONE);
        assert_eq!(buffer.get(1, 0), Color::ONE);

        let bytes = buffer.to_rgba();
        assert_eq!(bytes.len(), 16);
        assert_eq!(&bytes[4..8], &[255, 255, 255, 255]);
    }

    #[test]
    fn test_refractive_sphere_contributes_transmitted_light() {
        // A glass sphere in front of a bright light marker: the transmitted
        // path reaches it... and light markers return black, so the whole
        // contribution stays at the direct illumination level
        let mut scene = scene_with_background(Color::new(0.2, 0.2, 0.2));
        scene.set_limits(TraceLimits {
            max_recursion_depth: 4,
        });
        let glass = Material {
            refraction: 1.0,
            density: 1.5,
            diffuse: Color::new(0.1, 0.1, 0.1),
            ..Default::default()
        };
        scene.add_object(Box::new(Sphere::new(Vec3::new(0.0, 0.0, -3.0), 1.0, glass)));

        let (color, hit) = compute(&scene, &forward_ray(), 0, 1.0, Material::AIR_DENSITY);
        assert!(hit.is_some());
        // No lights: direct illumination is zero, and the refracted path
        // exits into the background (no further hit), contributing nothing
        assert_eq!(color, Color::ZERO);
    }
}
