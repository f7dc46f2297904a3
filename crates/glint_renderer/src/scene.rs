//! Scene container and the linear-scan intersection query.

use glint_core::Material;
use glint_math::{Color, Ray, Vec3};

use crate::light::Light;
use crate::shape::{Hit, Shape};

/// Recursion limits for the transport kernel.
#[derive(Clone, Copy, Debug)]
pub struct TraceLimits {
    /// Maximum recursion depth; negative means unlimited.
    pub max_recursion_depth: i32,
}

impl Default for TraceLimits {
    fn default() -> Self {
        Self {
            max_recursion_depth: 5,
        }
    }
}

/// A fully assembled scene: objects, lights, background and trace limits.
///
/// Everything is added during construction and read-only while tracing, so
/// rendering can share the scene across threads freely.
pub struct Scene {
    objects: Vec<Box<dyn Shape>>,
    lights: Vec<Light>,
    background: Material,
    limits: TraceLimits,
    /// Optional cutoff distance; hits beyond it are ignored.
    max_trace_distance: Option<f32>,
}

impl Scene {
    /// Create an empty scene with an air background.
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
            lights: Vec::new(),
            background: Material::air(),
            limits: TraceLimits::default(),
            max_trace_distance: None,
        }
    }

    /// Add a shape to the scene.
    pub fn add_object(&mut self, object: Box<dyn Shape>) {
        self.objects.push(object);
    }

    /// Add a light source.
    pub fn add_light(&mut self, light: Light) {
        self.lights.push(light);
    }

    /// Replace the background material.
    pub fn set_background(&mut self, background: Material) {
        self.background = background;
    }

    /// Replace the trace limits.
    pub fn set_limits(&mut self, limits: TraceLimits) {
        self.limits = limits;
    }

    /// Set the optional cutoff distance.
    pub fn set_max_trace_distance(&mut self, distance: Option<f32>) {
        self.max_trace_distance = distance;
    }

    /// Background material; its ambient color is the miss color.
    pub fn background(&self) -> &Material {
        &self.background
    }

    /// Trace limits consumed by the transport kernel.
    pub fn limits(&self) -> TraceLimits {
        self.limits
    }

    /// The scene's shapes.
    pub fn objects(&self) -> &[Box<dyn Shape>] {
        &self.objects
    }

    /// The scene's lights.
    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    /// Number of shapes in the scene.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Check if the scene holds no shapes.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Find the closest intersection with any scene object.
    ///
    /// Linear scan over every object; with `stop_at_first` the first hit
    /// found is returned immediately (shadow mode).
    pub fn intersect(&self, ray: &Ray, stop_at_first: bool) -> Option<Hit<'_>> {
        let mut closest: Option<Hit> = None;

        for object in &self.objects {
            let Some(hit) = object.intersect(ray) else {
                continue;
            };

            if let Some(cutoff) = self.max_trace_distance {
                if hit.distance > cutoff {
                    continue;
                }
            }

            let nearer = closest
                .as_ref()
                .map_or(true, |best| hit.distance < best.distance);
            if nearer {
                closest = Some(hit);
            }

            if stop_at_first {
                return closest;
            }
        }

        closest
    }

    /// Sum the Phong contribution of every light at a surface point.
    pub fn illuminate(&self, view_ray: &Ray, shape: &dyn Shape, distance: f32, normal: Vec3) -> Color {
        let mut result = Color::ZERO;
        for light in &self.lights {
            result += light.compute_color(self, shape, view_ray, distance, normal);
        }
        result
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scene")
            .field("objects", &self.objects.len())
            .field("lights", &self.lights.len())
            .field("background", &self.background)
            .field("limits", &self.limits)
            .field("max_trace_distance", &self.max_trace_distance)
            .finish()
    }
}
