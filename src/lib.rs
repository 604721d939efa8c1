//! Recursive ray tracer for scenes built from textured axis-aligned boxes.

pub mod aabb;
pub mod camera;
pub mod color;
pub mod error;
pub mod geometry;
pub mod material;
pub mod primitive;
pub mod rendering;
pub mod scene;
pub mod skybox;
pub mod texture;
pub mod utils;
