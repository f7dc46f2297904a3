//! Finite capped cone primitive.

use glint_core::Material;
use glint_math::{Ray, Span, Vec3, EPSILON};

use crate::shape::{record_root, Hit, Shape};

/// A cone with its apex at `bottom`, widening to `radius` at `top`.
pub struct Cone {
    top: Vec3,
    bottom: Vec3,
    axis: Vec3,
    radius2: f32,
    rad_per_height: f32,
    material: Material,
    is_light: bool,
}

impl Cone {
    /// Create a new cone; the single cap sits at `top`.
    pub fn new(top: Vec3, bottom: Vec3, radius: f32, material: Material) -> Self {
        let axis = (top - bottom).normalize();
        Self {
            top,
            bottom,
            axis,
            radius2: radius * radius,
            rad_per_height: radius / (top - bottom).length(),
            material,
            is_light: false,
        }
    }

    fn between_caps(&self, point: Vec3) -> bool {
        self.axis.dot(point - self.bottom) > 0.0 && (-self.axis).dot(point - self.top) > 0.0
    }

    fn normal_at(&self, ray: &Ray, distance: f32) -> Vec3 {
        let at_surface = ray.at(distance);

        let to_top = at_surface - self.top;
        if self.axis.dot(to_top).abs() < EPSILON && to_top.length_squared() < self.radius2 {
            return self.axis;
        }

        // Radial direction tilted down the slope by the opening rate
        let radial = at_surface - (self.axis * to_top.dot(self.axis) + self.top);
        (radial - self.axis * (self.rad_per_height * radial.length())).normalize()
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

impl Shape for Cone {
    fn intersect(&self, ray: &Ray) -> Option<Hit<'_>> {
        let origin = ray.origin();
        let direction = ray.direction();
        let co = origin - self.bottom;

        let dir_dot_axis = direction.dot(self.axis);
        let co_dot_axis = co.dot(self.axis);

        let u = direction - self.axis * dir_dot_axis;
        let v = co - self.axis * co_dot_axis;
        let w = co_dot_axis * self.rad_per_height;
        let rad_per_dir = dir_dot_axis * self.rad_per_height;

        let mut crossings = Vec::new();
        let mut closest = -1.0f32;
        let mut exit = -1.0f32;

        let a = u.dot(u) - rad_per_dir * rad_per_dir;
        if a.abs() > EPSILON {
            let b = 2.0 * (u.dot(v) - w * rad_per_dir);
            let c = v.dot(v) - w * w;

            let d = b * b - 4.0 * a * c;
            if d < 0.0 {
                return None;
            }
            let d = d.sqrt();
            let denom = 1.0 / (2.0 * a);

            for root in [(-b - d) * denom, (-b + d) * denom] {
                if root > 0.0 && self.between_caps(ray.at(root)) {
                    record_root(&mut crossings, &mut closest, &mut exit, root);
                }
            }
        }

        if dir_dot_axis.abs() < EPSILON {
            // Ray perpendicular to the axis never reaches the cap
            return self.finalize(ray, closest, exit, crossings);
        }

        // Cap disk at the wide end
        let root = (-self.axis).dot(origin - self.top) / dir_dot_axis;
        if root > 0.0 && (ray.at(root) - self.top).length_squared() < self.radius2 {
            crossings.push(root);
            if closest < 0.0 {
                // A cap-only hit is a grazing contact: entry and exit coincide
                closest = root;
                exit = root;
            } else if root < closest {
                exit = closest;
                closest = root;
            } else {
                exit = root;
            }
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
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn y_cone() -> Cone {
        // Apex at the origin, opening upward to radius 1 at y = 2
        Cone::new(
            Vec3::new(0.0, 2.0, 0.0),
            Vec3::ZERO,
            1.0,
            Material::default(),
        )
    }

    #[test]
    fn test_cone_side_hit() {
        let cone = y_cone();
        // At y = 1 the cone radius is 0.5
        let ray = Ray::new(Vec3::new(-3.0, 1.0, 0.0), Vec3::X);

        let hit = cone.intersect(&ray).expect("side hit");
        assert_relative_eq!(hit.distance, 2.5, epsilon = 1e-3);
        assert_eq!(hit.crossings.len(), 2);
        assert!(hit.normal.x < 0.0);
        // The slope tilts the normal downward
        assert!(hit.normal.y < 0.0);
    }

    #[test]
    fn test_cone_cap_hit() {
        let cone = y_cone();
        let ray = Ray::new(Vec3::new(0.0, 4.0, 0.0), Vec3::NEG_Y);

        let hit = cone.intersect(&ray).expect("cap hit");
        assert_relative_eq!(hit.distance, 2.0, epsilon = 1e-3);
        assert_eq!(hit.normal, cone.axis);
    }

    #[test]
    fn test_cone_miss() {
        let cone = y_cone();
        let ray = Ray::new(Vec3::new(-3.0, 3.0, 0.0), Vec3::X);
        assert!(cone.intersect(&ray).is_none());
    }
}
