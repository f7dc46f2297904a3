//! Torus primitive.
//!
//! The torus is the one stock primitive that can cross a ray four times,
//! which makes it the stress case for the CSG interval logic. Intersection
//! reduces to a quartic in the ray parameter, solved with Ferrari's method
//! in f64 to keep the root clustering stable.

use glint_core::Material;
use glint_math::{Ray, Vec3};

use crate::shape::{Hit, Shape};

/// A torus around `axis` with ring radius `major_radius` and tube radius
/// `minor_radius`.
pub struct Torus {
    center: Vec3,
    axis: Vec3,
    major_radius: f32,
    major_radius2: f32,
    minor_radius2: f32,
    material: Material,
    is_light: bool,
}

impl Torus {
    /// Create a new torus; `axis` is normalized.
    pub fn new(center: Vec3, axis: Vec3, major_radius: f32, minor_radius: f32, material: Material) -> Self {
        Self {
            center,
            axis: axis.normalize(),
            major_radius,
            major_radius2: major_radius * major_radius,
            minor_radius2: minor_radius * minor_radius,
            material,
            is_light: false,
        }
    }

    fn normal_at(&self, ray: &Ray, distance: f32) -> Vec3 {
        let local = ray.at(distance) - self.center;
        let y = local.dot(self.axis);
        let radial = (local - y * self.axis).normalize();
        // Surface normal points away from the tube center on the ring
        (local - radial * self.major_radius).normalize()
    }
}

impl Shape for Torus {
    fn intersect(&self, ray: &Ray) -> Option<Hit<'_>> {
        let co = ray.origin() - self.center;
        let direction = ray.direction();

        let co_dot_dir = direction.dot(co) as f64;
        let co2 = co.dot(co) as f64;
        let u = self.axis.dot(co) as f64;
        let v = self.axis.dot(direction) as f64;
        let major2 = self.major_radius2 as f64;

        // Quadratic pieces of the quartic; the direction is unit length so
        // the leading coefficient is 1
        let a = 1.0 - v * v;
        let b = 2.0 * (co.dot(direction) as f64 - u * v);
        let c = co2 - u * u;
        let d = co2 + major2 - self.minor_radius2 as f64;

        let qb = 4.0 * co_dot_dir;
        let qc = 2.0 * d + qb * qb * 0.25 - 4.0 * major2 * a;
        let qd = qb * d - 4.0 * major2 * b;
        let qe = d * d - 4.0 * major2 * c;

        let mut roots = solve_quartic(qb, qc, qd, qe);
        roots.sort_by(f64::total_cmp);

        let crossings: Vec<f32> = roots.iter().filter(|&&t| t > 0.0).map(|&t| t as f32).collect();
        let &closest = crossings.first()?;

        let mut hit = Hit::new(self, closest, self.normal_at(ray, closest));
        hit.crossings = crossings;
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
}

/// Real roots of x^4 + b x^3 + c x^2 + d x + e.
fn solve_quartic(b: f64, c: f64, d: f64, e: f64) -> Vec<f64> {
    // Depress: x = y - b/4 turns the quartic into y^4 + p y^2 + q y + r
    let shift = b / 4.0;
    let b2 = b * b;
    let p = c - 3.0 * b2 / 8.0;
    let q = d - b * c / 2.0 + b2 * b / 8.0;
    let r = e - b * d / 4.0 + b2 * c / 16.0 - 3.0 * b2 * b2 / 256.0;

    let mut roots = Vec::with_capacity(4);

    if q.abs() < 1e-12 {
        // Biquadratic: y^2 solves a plain quadratic
        for z in solve_quadratic(p, r) {
            if z >= 0.0 {
                let y = z.sqrt();
                roots.push(y - shift);
                if y > 0.0 {
                    roots.push(-y - shift);
                }
            }
        }
        return roots;
    }

    // Ferrari: find m with 8m^3 + 8pm^2 + (2p^2 - 8r)m - q^2 = 0 so the
    // depressed quartic splits into two quadratics
    let m = cubic_root(p, p * p / 4.0 - r, -q * q / 8.0);
    if m <= 0.0 {
        return roots;
    }

    let sqrt_2m = (2.0 * m).sqrt();
    let half = p / 2.0 + m;
    let offset = q / (2.0 * sqrt_2m);

    for y in solve_quadratic(sqrt_2m, half - offset) {
        roots.push(y - shift);
    }
    for y in solve_quadratic(-sqrt_2m, half + offset) {
        roots.push(y - shift);
    }
    roots
}

/// Real roots of y^2 + b y + c.
fn solve_quadratic(b: f64, c: f64) -> Vec<f64> {
    let disc = b * b - 4.0 * c;
    if disc < 0.0 {
        return Vec::new();
    }
    let s = disc.sqrt();
    vec![(-b - s) / 2.0, (-b + s) / 2.0]
}

/// One real root of m^3 + a m^2 + b m + c, preferring the largest.
fn cubic_root(a: f64, b: f64, c: f64) -> f64 {
    let p = b - a * a / 3.0;
    let q = c - a * b / 3.0 + 2.0 * a * a * a / 27.0;
    let disc = q * q / 4.0 + p * p * p / 27.0;

    if disc >= 0.0 {
        let s = disc.sqrt();
        let u = (-q / 2.0 + s).cbrt();
        let v = (-q / 2.0 - s).cbrt();
        u + v - a / 3.0
    } else {
        // Three real roots; pick the largest cosine branch
        let rho = (-p / 3.0).sqrt();
        let theta = ((-q / 2.0) / (rho * rho * rho)).clamp(-1.0, 1.0).acos();
        2.0 * rho * (theta / 3.0).cos() - a / 3.0
    }
}
