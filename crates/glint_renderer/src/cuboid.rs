//! Axis-aligned box primitive.

use glint_core::Material;
use glint_math::{Ray, Span, Vec3, EPSILON};

use crate::shape::{Hit, Shape};

/// An axis-aligned box between two corner points.
pub struct Cuboid {
    min: Vec3,
    max: Vec3,
    material: Material,
    is_light: bool,
}

impl Cuboid {
    /// Create a new box; `min` must be component-wise below `max`.
    pub fn new(min: Vec3, max: Vec3, material: Material) -> Self {
        Self {
            min,
            max,
            material,
            is_light: false,
        }
    }

    fn normal_at(&self, point: Vec3) -> Vec3 {
        let to_min = point - self.min;
        let to_max = point - self.max;

        if to_min.x.abs() < EPSILON {
            Vec3::NEG_X
        } else if to_max.x.abs() < EPSILON {
            Vec3::X
        } else if to_min.y.abs() < EPSILON {
            Vec3::NEG_Y
        } else if to_max.y.abs() < EPSILON {
            Vec3::Y
        } else if to_min.z.abs() < EPSILON {
            Vec3::NEG_Z
        } else {
            Vec3::Z
        }
    }
}

/// Narrow the slab interval along one axis; returns false on a miss.
fn clip_axis(origin: f32, direction: f32, min: f32, max: f32, t_min: &mut f32, t_max: &mut f32) -> bool {
    if direction.abs() < EPSILON {
        // Ray is parallel to this slab; the other axes decide
        return true;
    }
    let inv = 1.0 / direction;
    let mut near = (min - origin) * inv;
    let mut far = (max - origin) * inv;
    if near > far {
        std::mem::swap(&mut near, &mut far);
    }
    *t_min = t_min.max(near);
    *t_max = t_max.min(far);
    *t_min <= *t_max
}

impl Shape for Cuboid {
    fn intersect(&self, ray: &Ray) -> Option<Hit<'_>> {
        let origin = ray.origin();
        let direction = ray.direction();

        let mut t_min = f32::NEG_INFINITY;
        let mut t_max = f32::INFINITY;

        if !clip_axis(origin.x, direction.x, self.min.x, self.max.x, &mut t_min, &mut t_max)
            || !clip_axis(origin.y, direction.y, self.min.y, self.max.y, &mut t_min, &mut t_max)
            || !clip_axis(origin.z, direction.z, self.min.z, self.max.z, &mut t_min, &mut t_max)
        {
            return None;
        }

        if t_max < 0.0 || t_min < 0.0 || t_min == f32::NEG_INFINITY {
            return None;
        }

        let mut hit = Hit::new(self, t_min, self.normal_at(ray.at(t_min)));
        hit.crossings = vec![t_min, t_max];
        hit.inside.push(Span::new(t_min, t_max));
        Some(hit)
    }

    fn material(&self) -> Option<&Material> {
        Some(&self.material)
    }

    fn normal(&self, ray: &Ray, distance: f32, _hit: Option<&Hit>) -> Vec3 {
        self.normal_at(ray.at(distance))
    }

    fn set_light(&mut self, light: bool) {
        self.is_light = light;
    }

    fn is_light(&self) -> bool {
        self.is_light
    }
}
