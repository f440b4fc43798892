//! A small OpenGL renderer: a windowed context, shader programs, textures and imported
//! meshes drawn every frame through a free-flying camera.

pub mod abs;
pub mod camera;
pub mod config;
pub mod error;
pub mod input;
pub mod logging;
pub mod render;
pub mod scene;

pub use error::{Error, Result};
