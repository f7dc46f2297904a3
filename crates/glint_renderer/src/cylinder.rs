//! Finite capped cylinder primitive.

use std::f32::consts::PI;

use glint_core::Material;
use glint_math::{Ray, Span, Vec3, EPSILON};

use crate::shape::{record_root, Hit, Shape};

/// A capped cylinder between two points on its axis.
pub struct Cylinder {
    top: Vec3,
    bottom: Vec3,
    axis: Vec3,
    radius2: f32,
    height: f32,
    material: Material,
    is_light: bool,
    // Basis around the axis for texture mapping
    ve: Vec3,
    vn: Vec3,
}

impl Cylinder {
    /// Create a new cylinder.
    pub fn new(top: Vec3, bottom: Vec3, radius: f32, material: Material) -> Self {
        let axis = (top - bottom).normalize();
        let ve = Vec3::new(axis.y, axis.z, -axis.x);
        Self {
            top,
            bottom,
            axis,
            radius2: radius * radius,
            height: (top - bottom).length(),
            material,
            is_light: false,
            ve,
            vn: ve.cross(axis),
        }
    }

    /// True when the point projects between the two caps.
    fn between_caps(&self, point: Vec3) -> bool {
        self.axis.dot(point - self.bottom) > 0.0 && self.axis.dot(point - self.top) < 0.0
    }

    fn normal_at(&self, ray: &Ray, distance: f32) -> Vec3 {
        let at_surface = ray.at(distance);

        let to_bottom = at_surface - self.bottom;
        if self.axis.dot(to_bottom).abs() < EPSILON && to_bottom.length_squared() < self.radius2 {
            return -self.axis;
        }
        let to_top = at_surface - self.top;
        if self.axis.dot(to_top).abs() < EPSILON && to_top.length_squared() < self.radius2 {
            return self.axis;
        }

        (at_surface - self.axis * to_bottom.dot(self.axis) - self.bottom).normalize()
    }

    fn finalize(&self, ray: &Ray, closest: f32, exit: f32, mut crossings: Vec<f32>) -> Option<Hit<'_>> {
        if closest <= 0.0 {
            return None;
        }
        let normal = self.normal_at(ray, closest);
        let mut hit = Hit::new(self, closest, normal);
        if exit < 0.0 {
            hit.inside.push(Span::new(0.0, closest));
            crossings.insert(0, 0.0);
        } else {
            hit.inside.push(Span::new(closest, exit));
        }
        hit.crossings = crossings;
        Some(hit)
    }
}

impl Shape for Cylinder {
    fn intersect(&self, ray: &Ray) -> Option<Hit<'_>> {
        let origin = ray.origin();
        let direction = ray.direction();
        let co = origin - self.bottom;

        // Project out the axis component; the side surface reduces to a
        // circle in the remaining plane
        let u = direction - self.axis * direction.dot(self.axis);
        let v = co - self.axis * co.dot(self.axis);

        let mut crossings = Vec::new();
        let mut closest = -1.0f32;
        let mut exit = -1.0f32;

        let a = u.dot(u);
        if a.abs() > EPSILON {
            let b = 2.0 * u.dot(v);
            let c = v.dot(v) - self.radius2;

            let d = b * b - 4.0 * a * c;
            if d < 0.0 {
                return None;
            }
            let d = d.sqrt();
            let denom = 1.0 / (2.0 * a);

            let root = (-b - d) * denom;
            if root >= 0.0 && self.between_caps(ray.at(root)) {
                record_root(&mut crossings, &mut closest, &mut exit, root);
            }
            let root = (-b + d) * denom;
            if root > 0.0 && self.between_caps(ray.at(root)) {
                record_root(&mut crossings, &mut closest, &mut exit, root);
            }
        }

        let axis_dot_dir = self.axis.dot(direction);
        if axis_dot_dir.abs() < EPSILON {
            // Ray perpendicular to the axis never reaches a cap
            return self.finalize(ray, closest, exit, crossings);
        }

        // Bottom cap
        let root = -co.dot(self.axis) / axis_dot_dir;
        if root > 0.0 && (ray.at(root) - self.bottom).length_squared() < self.radius2 {
            record_root(&mut crossings, &mut closest, &mut exit, root);
        }

        // Top cap
        let root = (origin - self.top).dot(-self.axis) / axis_dot_dir;
        if root > 0.0 && (ray.at(root) - self.top).length_squared() < self.radius2 {
            record_root(&mut crossings, &mut closest, &mut exit, root);
        }

        self.finalize(ray, closest, exit, crossings)
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
        let co = point - self.bottom;
        let co_dot_axis = co.dot(self.axis);

        let at_circle = point - co_dot_axis * self.axis - self.bottom;
        let x = at_circle.dot(self.ve);
        let z = at_circle.dot(self.vn);

        let u = x.atan2(z) / (2.0 * PI);
        let v = co_dot_axis / self.height;
        Vec3::new(u, v, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn y_cylinder() -> Cylinder {
        Cylinder::new(
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(0.0, -1.0, 0.0),
            1.0,
            Material::default(),
        )
    }

    #[test]
    fn test_cylinder_side_hit() {
        let cylinder = y_cylinder();
        let ray = Ray::new(Vec3::new(-3.0, 0.0, 0.0), Vec3::X);

        let hit = cylinder.intersect(&ray).expect("side hit");
        assert_relative_eq!(hit.distance, 2.0, epsilon = 1e-3);
        assert_relative_eq!(hit.normal.x, -1.0, epsilon = 1e-3);
        assert_eq!(hit.crossings.len(), 2);
        assert_relative_eq!(hit.inside[0].end, 4.0, epsilon = 1e-3);
    }

    #[test]
    fn test_cylinder_cap_hit() {
        let cylinder = y_cylinder();
        let ray = Ray::new(Vec3::new(0.0, 3.0, 0.0), Vec3::NEG_Y);

        let hit = cylinder.intersect(&ray).expect("cap hit");
        assert_relative_eq!(hit.distance, 2.0, epsilon = 1e-3);
        assert_eq!(hit.normal, cylinder.axis);
    }

    #[test]
    fn test_cylinder_miss_beyond_caps() {
        let cylinder = y_cylinder();
        let ray = Ray::new(Vec3::new(-3.0, 2.0, 0.0), Vec3::X);
        assert!(cylinder.intersect(&ray).is_none());
    }
}
