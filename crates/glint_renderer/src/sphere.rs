//! Sphere primitive.

use std::f32::consts::PI;

use glint_core::Material;
use glint_math::{Ray, Span, Vec3};

use crate::shape::{Hit, Shape};

/// A sphere described by center and radius.
pub struct Sphere {
    center: Vec3,
    radius: f32,
    radius2: f32,
    material: Material,
    is_light: bool,
    // Fixed basis for the spherical texture mapping
    vn: Vec3,
    ve: Vec3,
    vc: Vec3,
}

impl Sphere {
    /// Create a new sphere.
    pub fn new(center: Vec3, radius: f32, material: Material) -> Self {
        let vn = Vec3::new(0.0, 1.0, 0.0);
        let ve = Vec3::new(1.0, 0.0, 0.0);
        Self {
            center,
            radius,
            radius2: radius * radius,
            material,
            is_light: false,
            vn,
            ve,
            vc: vn.cross(ve),
        }
    }

    fn normal_at(&self, ray: &Ray, distance: f32) -> Vec3 {
        ((ray.at(distance) - self.center) / self.radius).normalize()
    }
}

impl Shape for Sphere {
    fn intersect(&self, ray: &Ray) -> Option<Hit<'_>> {
        // Solve the quadratic x^2 + 2px + q = 0 for the ray parameter
        let co = ray.origin() - self.center;
        let p = ray.direction().dot(co);
        let q = co.dot(co) - self.radius2;

        let d = p * p - q;
        if d < 0.0 {
            return None;
        }
        let d = d.sqrt();

        let mut crossings = Vec::with_capacity(2);
        let mut closest = -1.0;
        let mut exit = -1.0;

        let root = -p - d;
        if root >= 0.0 {
            crossings.push(root);
            closest = root;
        }

        let root = -p + d;
        if root >= 0.0 {
            crossings.push(root);
            if closest < 0.0 {
                closest = root;
            } else if root < closest {
                exit = closest;
                closest = root;
            } else {
                exit = root;
            }
        }

        if closest <= 0.0 {
            return None;
        }

        let mut hit = Hit::new(self, closest, self.normal_at(ray, closest));
        hit.crossings = crossings;
        if exit < 0.0 {
            // Ray starts inside: the span reaches back to the origin and the
            // crossing list gains a leading zero entry
            hit.inside.push(Span::new(0.0, closest));
            hit.crossings.insert(0, 0.0);
        } else {
            hit.inside.push(Span::new(closest, exit));
        }
        Some(hit)
    }

    fn material(&self) -> Option<&Material> {
        Some(&self.material)
    }

    fn normal(&self, ray: &Ray, distance: f32, _hit: Option<&Hit>) -> Vec3 {
        self.normal_at(ray, distance)
    }

    fn set_light(&mut self, light: bool) {
        self.is_light = light;
    }

    fn is_light(&self) -> bool {
        self.is_light
    }

    fn texture_coordinates(&self, point: Vec3, _hit: Option<&Hit>) -> Vec3 {
        let co = (point - self.center) / self.radius;

        let phi = (-co.dot(self.vn)).acos();
        let theta = (self.ve.dot(co).acos() / phi.sin()) * (2.0 / PI);

        let u = if self.vc.dot(co) >= 0.0 {
            (1.0 - theta) / self.material.tex_scale_u
        } else {
            theta / self.material.tex_scale_u
        };
        let v = phi / self.material.tex_scale_v * (1.0 / PI);

        Vec3::new(u, v, 0.0)
    }
}
