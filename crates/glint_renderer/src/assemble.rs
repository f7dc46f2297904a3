//! Assembly of a live scene from its declarative description.
//!
//! This is the construction boundary: malformed operation names and broken
//! texture paths surface here as typed errors, so the tracing core never
//! sees an invalid tree.

use glint_core::{
    CameraDescription, CsgDescription, LightDescription, LightKindDescription, Material,
    MaterialDescription, ObjectDescription, PrimitiveDescription, SceneDescription, Texture,
    TextureError,
};
use glint_math::Vec3;
use thiserror::Error;

use crate::camera::{Camera, CameraConfig};
use crate::csg::{BooleanOp, CsgNode, CsgTree, OpParseError};
use crate::light::Light;
use crate::scene::{Scene, TraceLimits};
use crate::shape::Shape;
use crate::{Cone, Cuboid, Cylinder, Plane, Sphere, Torus, Triangle};

/// Errors raised while turning a description into a scene.
#[derive(Error, Debug)]
pub enum AssembleError {
    #[error(transparent)]
    UnknownOperation(#[from] OpParseError),

    #[error("failed to load texture")]
    Texture(#[from] TextureError),
}

fn vec3(v: [f32; 3]) -> Vec3 {
    Vec3::from_array(v)
}

/// Build a live scene from its description.
pub fn assemble(description: &SceneDescription) -> Result<Scene, AssembleError> {
    let mut scene = Scene::new();

    scene.set_limits(TraceLimits {
        max_recursion_depth: description.limits.max_recursion_depth,
    });
    scene.set_background(build_material(&description.background)?);
    scene.set_max_trace_distance(description.max_trace_distance);

    for light in &description.lights {
        scene.add_light(build_light(light));
    }

    for object in &description.objects {
        match object {
            ObjectDescription::Primitive { light, primitive } => {
                let mut shape = build_primitive(primitive)?;
                shape.set_light(*light);
                scene.add_object(shape);
            }
            ObjectDescription::Csg { root } => {
                let tree = CsgTree::new(build_csg(root)?);
                scene.add_object(Box::new(tree));
            }
        }
    }

    log::debug!(
        "assembled scene: {} objects, {} lights",
        scene.len(),
        scene.lights().len()
    );

    Ok(scene)
}

/// Build the camera for a description at the given output resolution.
pub fn build_camera(description: &CameraDescription, width: u32, height: u32) -> Camera {
    Camera::new(CameraConfig {
        eye: vec3(description.eye),
        at: vec3(description.at),
        up: vec3(description.up),
        fov: description.fov,
        image_width: width,
        image_height: height,
    })
}

fn build_material(description: &MaterialDescription) -> Result<Material, AssembleError> {
    let diffuse_texture = match &description.diffuse_texture {
        Some(path) => Some(Texture::load(path)?),
        None => None,
    };

    Ok(Material {
        ambient: vec3(description.ambient),
        diffuse: vec3(description.diffuse),
        specular: vec3(description.specular),
        specular_power: description.specular_power,
        density: description.density,
        reflection: description.reflection,
        refraction: description.refraction,
        illumination: description.illumination,
        diffuse_texture,
        tex_scale_u: description.tex_scale[0],
        tex_scale_v: description.tex_scale[1],
    })
}

fn build_light(description: &LightDescription) -> Light {
    let position = vec3(description.position);
    let direction = vec3(description.direction);

    let light = match description.kind {
        LightKindDescription::Point => Light::point(position),
        LightKindDescription::Directional => {
            Light::directional(position, direction).with_range(description.range)
        }
        LightKindDescription::Spot => Light::spot(
            position,
            direction,
            description.umbra_angle,
            description.penumbra_angle,
        )
        .with_falloff(description.falloff),
    };

    light
        .with_intensities(
            vec3(description.ambient),
            vec3(description.diffuse),
            vec3(description.specular),
        )
        .with_attenuation(
            description.attenuation[0],
            description.attenuation[1],
            description.attenuation[2],
        )
}

fn build_primitive(description: &PrimitiveDescription) -> Result<Box<dyn Shape>, AssembleError> {
    Ok(match description {
        PrimitiveDescription::Sphere {
            center,
            radius,
            material,
        } => Box::new(Sphere::new(vec3(*center), *radius, build_material(material)?)),
        PrimitiveDescription::Plane {
            normal,
            offset,
            material,
        } => Box::new(Plane::new(
            vec3(*normal).normalize(),
            *offset,
            build_material(material)?,
        )),
        PrimitiveDescription::Cuboid { min, max, material } => {
            Box::new(Cuboid::new(vec3(*min), vec3(*max), build_material(material)?))
        }
        PrimitiveDescription::Triangle { vertices, material } => Box::new(Triangle::new(
            vec3(vertices[0]),
            vec3(vertices[1]),
            vec3(vertices[2]),
            build_material(material)?,
        )),
        PrimitiveDescription::Cylinder {
            top,
            bottom,
            radius,
            material,
        } => Box::new(Cylinder::new(
            vec3(*top),
            vec3(*bottom),
            *radius,
            build_material(material)?,
        )),
        PrimitiveDescription::Cone {
            top,
            bottom,
            radius,
            material,
        } => Box::new(Cone::new(
            vec3(*top),
            vec3(*bottom),
            *radius,
            build_material(material)?,
        )),
        PrimitiveDescription::Torus {
            center,
            axis,
            major_radius,
            minor_radius,
            material,
        } => Box::new(Torus::new(
            vec3(*center),
            vec3(*axis),
            *major_radius,
            *minor_radius,
            build_material(material)?,
        )),
    })
}

/// Build a CSG subtree; the construction contract for the loader.
fn build_csg(description: &CsgDescription) -> Result<CsgNode, AssembleError> {
    Ok(match description {
        CsgDescription::Value { primitive } => CsgNode::value(build_primitive(primitive)?),
        CsgDescription::Operation { op, left, right } => {
            let op: BooleanOp = op.parse()?;
            CsgNode::operation(op, build_csg(left)?, build_csg(right)?)
        }
    })
}
