//! Pinhole camera for ray generation.

use glint_math::{Ray, Vec3};

/// Properties defining camera orientation and projection.
#[derive(Clone, Copy, Debug)]
pub struct CameraConfig {
    pub eye: Vec3,
    pub at: Vec3,
    pub up: Vec3,
    /// Vertical field of view in degrees
    pub fov: f32,
    pub image_width: u32,
    pub image_height: u32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            eye: Vec3::ZERO,
            at: Vec3::NEG_Z,
            up: Vec3::Y,
            fov: 60.0,
            image_width: 800,
            image_height: 600,
        }
    }
}

/// A pinhole camera shooting one ray through each pixel center.
#[derive(Clone)]
pub struct Camera {
    config: CameraConfig,
    // Cached orthonormal basis and projection data
    x_axis: Vec3,
    y_axis: Vec3,
    z_axis: Vec3,
    aspect_ratio: f32,
    focus: f32,
}

impl Camera {
    /// Create a camera from its configuration.
    pub fn new(config: CameraConfig) -> Self {
        let z_axis = (config.at - config.eye).normalize();
        let x_axis = z_axis.cross(config.up).normalize();
        let y_axis = x_axis.cross(z_axis).normalize();

        Self {
            config,
            x_axis,
            y_axis,
            z_axis,
            aspect_ratio: config.image_width as f32 / config.image_height as f32,
            focus: 1.0 / (config.fov.to_radians() / 2.0).tan(),
        }
    }

    /// Image plane width in pixels.
    pub fn image_width(&self) -> u32 {
        self.config.image_width
    }

    /// Image plane height in pixels.
    pub fn image_height(&self) -> u32 {
        self.config.image_height
    }

    /// Update the image plane resolution.
    pub fn set_resolution(&mut self, width: u32, height: u32) {
        self.config.image_width = width;
        self.config.image_height = height;
        self.aspect_ratio = width as f32 / height as f32;
    }

    /// Generate the ray through pixel (x, y).
    pub fn look_through(&self, x: u32, y: u32) -> Ray {
        let projected_x =
            2.0 * (x as f32 / self.config.image_width as f32 - 0.5) * self.aspect_ratio;
        let projected_y = 2.0 * (0.5 - y as f32 / self.config.image_height as f32);

        let direction = self.x_axis * projected_x + self.y_axis * projected_y + self.z_axis * self.focus;
        Ray::new(self.config.eye, direction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn looking_down_z() -> Camera {
        Camera::new(CameraConfig {
            eye: Vec3::ZERO,
            at: Vec3::NEG_Z,
            up: Vec3::Y,
            fov: 90.0,
            image_width: 100,
            image_height: 100,
        })
    }

    #[test]
    fn test_center_ray_points_forward() {
        let camera = looking_down_z();
        let ray = camera.look_through(50, 50);

        assert_eq!(ray.origin(), Vec3::ZERO);
        assert!(ray.direction().z < 0.0);
        assert_relative_eq!(ray.direction().x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(ray.direction().y, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_corner_rays_diverge() {
        let camera = looking_down_z();
        let left = camera.look_through(0, 50);
        let right = camera.look_through(99, 50);

        assert!(left.direction().x < 0.0);
        assert!(right.direction().x > 0.0);
        // Top of the image maps to positive y
        let top = camera.look_through(50, 0);
        assert!(top.direction().y > 0.0);
    }

    #[test]
    fn test_direction_is_normalized() {
        let camera = looking_down_z();
        let ray = camera.look_through(10, 90);
        assert_relative_eq!(ray.direction().length(), 1.0, epsilon = 1e-6);
    }
}
