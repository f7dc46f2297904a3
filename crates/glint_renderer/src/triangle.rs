//! Triangle primitive.
//!
//! Uses the Möller-Trumbore algorithm for ray-triangle intersection.

use glint_core::Material;
use glint_math::{Ray, Vec3, EPSILON};

use crate::shape::{Hit, Shape};

/// A single triangle with barycentric surface coordinates.
pub struct Triangle {
    v0: Vec3,
    v1: Vec3,
    v2: Vec3,
    /// Pre-computed unit face normal
    normal: Vec3,
    material: Material,
    is_light: bool,
}

impl Triangle {
    /// Create a new triangle from three vertices.
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3, material: Material) -> Self {
        let normal = (v1 - v0).cross(v2 - v0).normalize();
        Self {
            v0,
            v1,
            v2,
            normal,
            material,
            is_light: false,
        }
    }
}

impl Shape for Triangle {
    fn intersect(&self, ray: &Ray) -> Option<Hit<'_>> {
        let edge1 = self.v1 - self.v0;
        let edge2 = self.v2 - self.v0;

        let pvec = ray.direction().cross(edge2);
        let det = edge1.dot(pvec);

        // Ray is parallel to the triangle plane
        if det.abs() < EPSILON {
            return None;
        }
        let inv_det = 1.0 / det;

        let tvec = ray.origin() - self.v0;
        let lambda = tvec.dot(pvec) * inv_det;
        if !(0.0..=1.0).contains(&lambda) {
            return None;
        }

        let qvec = tvec.cross(edge1);
        let mue = ray.direction().dot(qvec) * inv_det;
        if mue < 0.0 || mue + lambda > 1.0 {
            return None;
        }

        let t = edge2.dot(qvec) * inv_det - EPSILON;
        if t < EPSILON {
            return None;
        }

        let mut hit = Hit::new(self, t, self.normal);
        hit.u = lambda;
        hit.v = mue;
        // A triangle is a surface: it contributes a single crossing
        hit.crossings.push(t);
        hit.tex_coords = self.texture_coordinates(ray.at(t), Some(&hit));
        Some(hit)
    }

    fn material(&self) -> Option<&Material> {
        Some(&self.material)
    }

    fn normal(&self, _ray: &Ray, _distance: f32, _hit: Option<&Hit>) -> Vec3 {
        self.normal
    }

    fn set_light(&mut self, light: bool) {
        self.is_light = light;
    }

    fn is_light(&self) -> bool {
        self.is_light
    }

    fn texture_coordinates(&self, _point: Vec3, hit: Option<&Hit>) -> Vec3 {
        // Barycentric interpolation of the vertex positions
        match hit {
            Some(h) => h.u * self.v1 + h.v * self.v2 + (1.0 - h.u - h.v) * self.v0,
            None => Vec3::ZERO,
        }
    }
}
