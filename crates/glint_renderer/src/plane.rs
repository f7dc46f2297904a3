//! Infinite plane primitive.

use glint_core::Material;
use glint_math::{Ray, Span, Vec3, EPSILON};

use crate::shape::{Hit, Shape};

/// An infinite plane `dot(normal, p) + offset = 0`.
pub struct Plane {
    normal: Vec3,
    offset: f32,
    material: Material,
    is_light: bool,
    // In-plane axes for texture mapping
    u_axis: Vec3,
    v_axis: Vec3,
}

impl Plane {
    /// Create a new plane from its unit normal and offset.
    pub fn new(normal: Vec3, offset: f32, material: Material) -> Self {
        let u_axis = Vec3::new(normal.y, normal.z, -normal.x);
        Self {
            normal,
            offset,
            material,
            is_light: false,
            u_axis,
            v_axis: u_axis.cross(normal),
        }
    }
}

impl Shape for Plane {
    fn intersect(&self, ray: &Ray) -> Option<Hit<'_>> {
        let angle = self.normal.dot(ray.direction());
        if angle.abs() < EPSILON {
            // Ray runs parallel to the plane
            return None;
        }

        let t = -(ray.origin().dot(self.normal) + self.offset) / angle;
        if t <= 0.0 {
            return None;
        }

        let mut hit = Hit::new(self, t, self.normal(ray, t, None));
        hit.crossings.push(t);
        // A plane has no volume; its span is the degenerate point at t
        hit.inside.push(Span::new(t, t));
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

    fn texture_coordinates(&self, point: Vec3, _hit: Option<&Hit>) -> Vec3 {
        let xu = point.dot(self.u_axis) * self.material.tex_scale_u;
        let yv = point.dot(self.v_axis) * self.material.tex_scale_v;
        Vec3::new(xu, yv, 0.0)
    }
}
