//! Shape trait and Hit record for ray-object intersection.

use glint_core::Material;
use glint_math::{Color, Ray, Span, Vec3};

/// Record of a ray-shape intersection.
///
/// `shape` always refers to the concrete primitive that produced the
/// surface, even when the hit came out of a CSG composite, so shading can
/// recover the right material and texture.
#[derive(Clone)]
pub struct Hit<'a> {
    /// The primitive owning the reported surface
    pub shape: &'a dyn Shape,
    /// Ray parameter of the reported surface
    pub distance: f32,
    /// Surface normal at `distance`
    pub normal: Vec3,
    /// Parametric surface coordinates (barycentric for triangles)
    pub u: f32,
    pub v: f32,
    /// Interpolated texture coordinates
    pub tex_coords: Vec3,
    /// Every parameter where the ray crosses the shape's boundary; the
    /// substrate CSG operations combine
    pub crossings: Vec<f32>,
    /// Parameter spans the ray spends inside the shape
    pub inside: Vec<Span>,
}

impl<'a> Hit<'a> {
    /// Create a hit with empty crossing data.
    pub fn new(shape: &'a dyn Shape, distance: f32, normal: Vec3) -> Self {
        Self {
            shape,
            distance,
            normal,
            u: 0.0,
            v: 0.0,
            tex_coords: Vec3::ZERO,
            crossings: Vec::new(),
            inside: Vec::new(),
        }
    }
}

/// Capability contract answered by primitives, CSG nodes and CSG trees
/// alike.
///
/// The color queries have default implementations driven by `material()`:
/// shapes with a material of their own resolve colors (and the diffuse
/// texture) locally, while composites - which report no material - fall back
/// to the primitive cached in the hit record.
pub trait Shape: Send + Sync {
    /// Find the intersection of the ray with this shape.
    fn intersect(&self, ray: &Ray) -> Option<Hit<'_>>;

    /// Material of the shape; `None` for composites.
    fn material(&self) -> Option<&Material>;

    /// Surface normal at the given ray parameter.
    fn normal(&self, ray: &Ray, distance: f32, hit: Option<&Hit>) -> Vec3;

    /// Mark the shape as an unshaded light marker.
    fn set_light(&mut self, light: bool);

    /// Whether the shape is a light marker.
    fn is_light(&self) -> bool;

    /// Texture coordinates at the given surface point.
    fn texture_coordinates(&self, _point: Vec3, _hit: Option<&Hit>) -> Vec3 {
        Vec3::ZERO
    }

    /// Ambient color at the given surface point.
    fn ambient_color(&self, point: Vec3, hit: Option<&Hit>) -> Color {
        match self.material() {
            Some(material) => material.ambient,
            None => delegate(hit, |shape| shape.ambient_color(point, hit)),
        }
    }

    /// Diffuse color at the given surface point, modulated by the diffuse
    /// texture when the material carries one.
    fn diffuse_color(&self, point: Vec3, hit: Option<&Hit>) -> Color {
        let Some(material) = self.material() else {
            return delegate(hit, |shape| shape.diffuse_color(point, hit));
        };
        match &material.diffuse_texture {
            Some(texture) => {
                let tc = self.texture_coordinates(point, hit);
                texture.sample(tc.x, tc.y) * material.diffuse
            }
            None => material.diffuse,
        }
    }

    /// Specular color at the given surface point.
    fn specular_color(&self, point: Vec3, hit: Option<&Hit>) -> Color {
        match self.material() {
            Some(material) => material.specular,
            None => delegate(hit, |shape| shape.specular_color(point, hit)),
        }
    }
}

/// Fall back to the primitive recorded in the hit, or black without one.
fn delegate<'a>(hit: Option<&Hit<'a>>, query: impl Fn(&'a dyn Shape) -> Color) -> Color {
    hit.map_or(Color::ZERO, |h| query(h.shape))
}

/// Record a boundary crossing and keep the closest/exit pair ordered.
///
/// Shared by the solid primitives that gather their roots incrementally.
pub(crate) fn record_root(crossings: &mut Vec<f32>, closest: &mut f32, exit: &mut f32, root: f32) {
    crossings.push(root);
    if *closest < 0.0 {
        *closest = root;
    } else if root < *closest {
        *exit = *closest;
        *closest = root;
    } else {
        *exit = root;
    }
}
