//! Light sources and the Phong local illumination model.

use glint_math::{Color, Ray, Vec3, EPSILON};

use crate::scene::Scene;
use crate::shape::Shape;

/// The supported light source kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LightKind {
    Point,
    Directional,
    Spot,
}

/// A light source.
///
/// Shared fields cover every kind; `direction` only matters for directional
/// and spot lights, the cone angles only for spot lights. The half-angle
/// cosines are cached at construction.
#[derive(Clone, Debug)]
pub struct Light {
    pub kind: LightKind,
    pub position: Vec3,
    pub direction: Vec3,
    pub ambient: Color,
    pub diffuse: Color,
    pub specular: Color,
    pub constant_attenuation: f32,
    pub linear_attenuation: f32,
    pub quadratic_attenuation: f32,
    /// Reach of a directional light
    pub range: f32,
    /// Falloff exponent between umbra and penumbra
    pub falloff: f32,
    cos_half_umbra: f32,
    cos_half_penumbra: f32,
}

impl Light {
    /// Create a point light at a position.
    pub fn point(position: Vec3) -> Self {
        Self::new(LightKind::Point, position, Vec3::NEG_Y)
    }

    /// Create a directional light shining along `direction`.
    pub fn directional(position: Vec3, direction: Vec3) -> Self {
        Self::new(LightKind::Directional, position, direction)
    }

    /// Create a spot light with its cone angles in degrees.
    pub fn spot(position: Vec3, direction: Vec3, umbra_angle: f32, penumbra_angle: f32) -> Self {
        let mut light = Self::new(LightKind::Spot, position, direction);
        light.set_cone(umbra_angle, penumbra_angle);
        light
    }

    fn new(kind: LightKind, position: Vec3, direction: Vec3) -> Self {
        Self {
            kind,
            position,
            direction: direction.normalize(),
            ambient: Color::ZERO,
            diffuse: Color::ONE,
            specular: Color::ZERO,
            constant_attenuation: 1.0,
            linear_attenuation: 0.0,
            quadratic_attenuation: 0.0,
            range: 1.0e6,
            falloff: 1.0,
            cos_half_umbra: 0.0,
            cos_half_penumbra: 0.0,
        }
    }

    /// Set the color intensities.
    pub fn with_intensities(mut self, ambient: Color, diffuse: Color, specular: Color) -> Self {
        self.ambient = ambient;
        self.diffuse = diffuse;
        self.specular = specular;
        self
    }

    /// Set the attenuation coefficients.
    pub fn with_attenuation(mut self, constant: f32, linear: f32, quadratic: f32) -> Self {
        self.constant_attenuation = constant;
        self.linear_attenuation = linear;
        self.quadratic_attenuation = quadratic;
        self
    }

    /// Set the reach of a directional light.
    pub fn with_range(mut self, range: f32) -> Self {
        self.range = range;
        self
    }

    /// Set the falloff exponent of a spot light.
    pub fn with_falloff(mut self, falloff: f32) -> Self {
        self.falloff = falloff;
        self
    }

    /// Update the spot cone angles (degrees) and refresh the cached cosines.
    pub fn set_cone(&mut self, umbra_angle: f32, penumbra_angle: f32) {
        self.cos_half_umbra = (umbra_angle.to_radians() / 2.0).cos();
        self.cos_half_penumbra = (penumbra_angle.to_radians() / 2.0).cos();
    }

    /// Phong contribution of this light at a surface point.
    ///
    /// `shape` is the object being shaded, `distance` the hit parameter
    /// along `view_ray`. Shadowing queries the scene in first-hit mode; a
    /// blocker that is itself a light, or sits beyond the source, casts no
    /// shadow.
    pub fn compute_color(
        &self,
        scene: &Scene,
        shape: &dyn Shape,
        view_ray: &Ray,
        distance: f32,
        normal: Vec3,
    ) -> Color {
        match self.kind {
            LightKind::Point => self.point_color(scene, shape, view_ray, distance, normal),
            LightKind::Directional => self.directional_color(scene, shape, view_ray, distance, normal),
            LightKind::Spot => self.spot_color(scene, shape, view_ray, distance, normal),
        }
    }

    fn point_color(
        &self,
        scene: &Scene,
        shape: &dyn Shape,
        view_ray: &Ray,
        distance: f32,
        normal: Vec3,
    ) -> Color {
        let surface = view_ray.at(distance);
        let mut result = shape.ambient_color(surface, None) * self.ambient;

        let to_light = self.position - surface;
        let light_distance = to_light.length();
        let attenuation = 1.0
            / (self.constant_attenuation
                + self.linear_attenuation * light_distance
                + self.quadratic_attenuation * light_distance * light_distance);
        let shadow_dir = to_light / light_distance;
        result *= attenuation;

        let cos_light_normal = shadow_dir.dot(normal);
        // The light is behind the surface
        if cos_light_normal <= 0.0 {
            return shape.ambient_color(surface, None);
        }

        if self.occluded(scene, surface, shadow_dir, light_distance) {
            return result;
        }

        let diffuse = shape.diffuse_color(surface, None) * self.diffuse * (cos_light_normal * attenuation);
        let specular = self.specular_term(
            shape,
            surface,
            view_ray,
            shadow_dir,
            normal,
            self.specular * attenuation,
        );
        result + diffuse + specular
    }

    fn directional_color(
        &self,
        scene: &Scene,
        shape: &dyn Shape,
        view_ray: &Ray,
        distance: f32,
        normal: Vec3,
    ) -> Color {
        let surface = view_ray.at(distance);
        let result = shape.ambient_color(surface, None) * self.ambient;

        let light_vector = -self.direction;
        let light_distance = (self.position - surface).dot(light_vector);

        // Out of reach: only the object's own ambient color survives
        if light_distance > self.range {
            return shape.ambient_color(surface, None);
        }

        let cos_light_normal = light_vector.dot(normal);
        if cos_light_normal <= 0.0 {
            return result;
        }

        if self.occluded(scene, surface, light_vector, light_distance) {
            return result;
        }

        let diffuse = shape.diffuse_color(surface, None) * self.diffuse * cos_light_normal;
        let specular = self.specular_term(shape, surface, view_ray, self.direction, normal, self.specular);
        result + diffuse + specular
    }

    fn spot_color(
        &self,
        scene: &Scene,
        shape: &dyn Shape,
        view_ray: &Ray,
        distance: f32,
        normal: Vec3,
    ) -> Color {
        let surface = view_ray.at(distance);
        let mut result = shape.ambient_color(surface, None) * self.ambient;

        let light_vector = -self.direction;
        let cos_light_normal = light_vector.dot(normal);
        if cos_light_normal <= 0.0 {
            return shape.ambient_color(surface, None);
        }

        let to_light = self.position - surface;
        let light_distance = to_light.length();
        let light_dir = to_light / light_distance;
        let distance_attenuation = 1.0
            / (self.constant_attenuation
                + self.linear_attenuation * light_distance
                + self.quadratic_attenuation * light_distance * light_distance);

        // Surface behind the cone apex
        let rho = light_dir.dot(light_vector);
        if rho <= 0.0 {
            return shape.ambient_color(surface, None);
        }

        result *= distance_attenuation;

        let spot_attenuation = if rho > self.cos_half_umbra {
            1.0
        } else if rho < self.cos_half_penumbra {
            0.0
        } else {
            let factor = (rho - self.cos_half_penumbra) / (self.cos_half_umbra - self.cos_half_penumbra);
            factor.powf(self.falloff)
        };
        result *= spot_attenuation;

        if self.occluded(scene, surface, light_vector, light_distance) {
            return result;
        }

        let scale = spot_attenuation * distance_attenuation;
        let diffuse = shape.diffuse_color(surface, None) * self.diffuse * (cos_light_normal * scale);
        let specular =
            self.specular_term(shape, surface, view_ray, self.direction, normal, self.specular * scale);
        result + diffuse + specular
    }

    /// First-hit shadow query toward the light.
    fn occluded(&self, scene: &Scene, surface: Vec3, light_dir: Vec3, light_distance: f32) -> bool {
        let shadow_ray = Ray::new(surface + light_dir * EPSILON, light_dir);
        match scene.intersect(&shadow_ray, true) {
            Some(hit) => !hit.shape.is_light() && hit.distance <= light_distance,
            None => false,
        }
    }

    /// Specular highlight of the reflected light direction.
    fn specular_term(
        &self,
        shape: &dyn Shape,
        surface: Vec3,
        view_ray: &Ray,
        incident: Vec3,
        normal: Vec3,
        intensity: Color,
    ) -> Color {
        let light_reflect = (incident - 2.0 * incident.dot(normal) * normal).normalize();
        let camera_dir = (view_ray.origin() - surface).normalize();

        let cos_light_reflect = camera_dir.dot(light_reflect);
        if cos_light_reflect <= 0.0 {
            return Color::ZERO;
        }

        let power = shape
            .material()
            .map_or(1.0, |material| material.specular_power);
        shape.specular_color(surface, None) * intensity * cos_light_reflect.powf(power)
    }
}
