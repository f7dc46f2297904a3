//! Declarative scene description.
//!
//! A scene file is a JSON document deserialized into [`SceneDescription`]:
//! camera, trace limits, background, lights and objects. Objects are either
//! standalone primitives or CSG trees of primitives. The renderer crate
//! assembles a live scene from this model; nothing here owns tracing state.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while reading a scene file.
#[derive(Error, Debug)]
pub enum DescriptionError {
    #[error("failed to read scene file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed scene description: {0}")]
    Json(#[from] serde_json::Error),
}

/// Top-level scene description.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SceneDescription {
    pub camera: CameraDescription,

    #[serde(default)]
    pub limits: TraceLimitsDescription,

    /// Background material; its ambient color is the miss color.
    #[serde(default)]
    pub background: MaterialDescription,

    /// Optional cutoff distance beyond which hits are ignored.
    #[serde(default)]
    pub max_trace_distance: Option<f32>,

    #[serde(default)]
    pub lights: Vec<LightDescription>,

    #[serde(default)]
    pub objects: Vec<ObjectDescription>,
}

impl SceneDescription {
    /// Load a scene description from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DescriptionError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| DescriptionError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Parse a scene description from a JSON string.
    pub fn from_json(text: &str) -> Result<Self, DescriptionError> {
        Ok(serde_json::from_str(text)?)
    }
}

/// Pinhole camera parameters.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CameraDescription {
    pub eye: [f32; 3],
    pub at: [f32; 3],

    #[serde(default = "default_up")]
    pub up: [f32; 3],

    /// Vertical field of view in degrees.
    #[serde(default = "default_fov")]
    pub fov: f32,
}

fn default_up() -> [f32; 3] {
    [0.0, 1.0, 0.0]
}

fn default_fov() -> f32 {
    60.0
}

/// Recursion limits for the tracer.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct TraceLimitsDescription {
    /// Maximum recursion depth; negative means unlimited.
    pub max_recursion_depth: i32,
}

impl Default for TraceLimitsDescription {
    fn default() -> Self {
        Self {
            max_recursion_depth: 5,
        }
    }
}

/// Phong material parameters.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialDescription {
    pub ambient: [f32; 3],
    pub diffuse: [f32; 3],
    pub specular: [f32; 3],
    pub specular_power: f32,
    pub density: f32,
    pub reflection: f32,
    pub refraction: f32,
    pub illumination: f32,
    pub diffuse_texture: Option<PathBuf>,
    pub tex_scale: [f32; 2],
}

impl Default for MaterialDescription {
    fn default() -> Self {
        Self {
            ambient: [0.0; 3],
            diffuse: [0.5, 0.5, 0.5],
            specular: [0.0; 3],
            specular_power: 1.0,
            density: 1.0,
            reflection: 0.0,
            refraction: 0.0,
            illumination: 1.0,
            diffuse_texture: None,
            tex_scale: [1.0, 1.0],
        }
    }
}

/// Kind selector for light sources.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LightKindDescription {
    Point,
    Directional,
    Spot,
}

/// A light source.
///
/// `position` matters for point and spot lights, `direction` for directional
/// and spot lights; the umbra/penumbra pair only for spot lights.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LightDescription {
    pub kind: LightKindDescription,

    #[serde(default)]
    pub position: [f32; 3],

    #[serde(default = "default_light_direction")]
    pub direction: [f32; 3],

    #[serde(default)]
    pub ambient: [f32; 3],

    #[serde(default = "default_intensity")]
    pub diffuse: [f32; 3],

    #[serde(default)]
    pub specular: [f32; 3],

    /// Constant, linear and quadratic attenuation coefficients.
    #[serde(default = "default_attenuation")]
    pub attenuation: [f32; 3],

    /// Reach of a directional light.
    #[serde(default = "default_range")]
    pub range: f32,

    /// Full-intensity cone angle of a spot light, degrees.
    #[serde(default = "default_umbra")]
    pub umbra_angle: f32,

    /// Outer cone angle of a spot light, degrees.
    #[serde(default = "default_penumbra")]
    pub penumbra_angle: f32,

    /// Falloff exponent between umbra and penumbra.
    #[serde(default = "default_falloff")]
    pub falloff: f32,
}

fn default_light_direction() -> [f32; 3] {
    [0.0, -1.0, 0.0]
}

fn default_intensity() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

fn default_attenuation() -> [f32; 3] {
    [1.0, 0.0, 0.0]
}

fn default_range() -> f32 {
    1.0e6
}

fn default_umbra() -> f32 {
    30.0
}

fn default_penumbra() -> f32 {
    45.0
}

fn default_falloff() -> f32 {
    1.0
}

/// A renderable object: a primitive or a CSG composite.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ObjectDescription {
    Primitive {
        /// Marks the object as an unshaded light marker.
        #[serde(default)]
        light: bool,

        #[serde(flatten)]
        primitive: PrimitiveDescription,
    },
    Csg {
        root: CsgDescription,
    },
}

/// Analytic primitive parameters, tagged by shape.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum PrimitiveDescription {
    Sphere {
        center: [f32; 3],
        radius: f32,
        #[serde(default)]
        material: MaterialDescription,
    },
    Plane {
        normal: [f32; 3],
        offset: f32,
        #[serde(default)]
        material: MaterialDescription,
    },
    Cuboid {
        min: [f32; 3],
        max: [f32; 3],
        #[serde(default)]
        material: MaterialDescription,
    },
    Triangle {
        vertices: [[f32; 3]; 3],
        #[serde(default)]
        material: MaterialDescription,
    },
    Cylinder {
        top: [f32; 3],
        bottom: [f32; 3],
        radius: f32,
        #[serde(default)]
        material: MaterialDescription,
    },
    Cone {
        top: [f32; 3],
        bottom: [f32; 3],
        radius: f32,
        #[serde(default)]
        material: MaterialDescription,
    },
    Torus {
        center: [f32; 3],
        axis: [f32; 3],
        major_radius: f32,
        minor_radius: f32,
        #[serde(default)]
        material: MaterialDescription,
    },
}

/// A node of a declarative CSG tree.
///
/// Operations are named; the assembler rejects names other than `union`,
/// `intersection` and `difference`. Both operands are required — a malformed
/// tree fails at description/assembly time, never during tracing.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum CsgDescription {
    Value {
        #[serde(flatten)]
        primitive: PrimitiveDescription,
    },
    Operation {
        op: String,
        left: Box<CsgDescription>,
        right: Box<CsgDescription>,
    },
}
