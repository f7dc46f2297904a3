//! glint core - materials, textures and the declarative scene description.
//!
//! This crate provides:
//!
//! - **Phong materials**: [`Material`] with reflection/refraction weights
//! - **Textures**: image-backed diffuse textures ([`Texture`])
//! - **Scene description**: serde data model for scene files
//!   ([`SceneDescription`]) loaded from JSON
//!
//! The renderer crate turns a [`SceneDescription`] into a live scene; nothing
//! in here traces rays.

pub mod description;
pub mod material;
pub mod texture;

// Re-export commonly used types
pub use description::{
    CameraDescription, CsgDescription, DescriptionError, LightDescription, LightKindDescription,
    MaterialDescription, ObjectDescription, PrimitiveDescription, SceneDescription,
    TraceLimitsDescription,
};
pub use material::Material;
pub use texture::{Texture, TextureError};
