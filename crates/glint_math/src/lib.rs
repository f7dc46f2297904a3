// Re-export glam for convenience
pub use glam::*;

// glint math types
mod ray;
mod span;

pub use ray::Ray;
pub use span::Span;

/// Color type alias (RGB values typically 0-1)
pub type Color = Vec3;

/// Geometric tolerance shared by intersection and shading code.
///
/// Secondary rays are offset by this amount along their direction so they
/// don't immediately re-hit the surface that spawned them.
pub const EPSILON: f32 = 1e-4;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec3_creation() {
        let v = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(v.x, 1.0);
        assert_eq!(v.y, 2.0);
        assert_eq!(v.z, 3.0);
    }

    #[test]
    fn test_color_is_vec3() {
        let c: Color = Color::new(0.1, 0.2, 0.3);
        let v: Vec3 = c;
        assert_eq!(v.y, 0.2);
    }
}
