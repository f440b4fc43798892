//! This module contains the core components for the renderer,
//! including application setup, the graphics device seam, shader management, mesh handling and textures.

pub mod app;
pub mod device;
pub mod mesh;
pub mod shader;
pub mod texture;

#[cfg(test)]
pub mod mock;

pub use app::*;
pub use device::*;
pub use mesh::*;
pub use shader::*;
pub use texture::*;
