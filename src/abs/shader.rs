//! OpenGL Shaders
//!
//! This module defines the [`Shader`] and [`ShaderProgram`] structs for managing shader stages
//! and linked programs. It also provides the [`Uniform`] trait for setting uniform variables.
//!
//! Both wrappers release their GPU object on drop, so a failed build never leaves stage or
//! program objects behind.

use std::{path::Path, sync::Arc};

use glam::{Mat4, Vec3};

use super::{GraphicsDevice, ShaderStage};
use crate::error::{Error, Result};

/// Reads shader source text from a file.
pub fn load_source(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    std::fs::read_to_string(path).map_err(|e| Error::file(path, e))
}

/// Represents an individual compiled shader stage.
pub struct Shader<D: GraphicsDevice> {
    device: Arc<D>,
    id: D::Shader,
    stage: ShaderStage,
}

impl<D: GraphicsDevice> Shader<D> {
    /// Compiles a new shader stage from the given source code.
    ///
    /// On failure the stage object is deleted and the compiler log is returned.
    pub fn compile(device: &Arc<D>, stage: ShaderStage, source: &str) -> Result<Self> {
        let shader = device.create_shader(stage).map_err(Error::Device)?;
        device.shader_source(shader, source);
        device.compile_shader(shader);

        if !device.get_shader_compile_status(shader) {
            let log = device.get_shader_info_log(shader);
            device.delete_shader(shader);
            return Err(Error::Compile { stage, log });
        }

        Ok(Self {
            device: Arc::clone(device),
            id: shader,
            stage,
        })
    }

    pub fn stage(&self) -> ShaderStage {
        self.stage
    }
}

impl<D: GraphicsDevice> Drop for Shader<D> {
    fn drop(&mut self) {
        self.device.delete_shader(self.id);
    }
}

/// Represents a uniform variable in a shader program.
pub trait Uniform {
    /// Uploads the value to the given location of the current program.
    fn set_uniform<D: GraphicsDevice>(&self, device: &D, location: &D::UniformLocation);
}

impl Uniform for bool {
    fn set_uniform<D: GraphicsDevice>(&self, device: &D, location: &D::UniformLocation) {
        device.uniform_1_i32(location, *self as i32);
    }
}

impl Uniform for i32 {
    fn set_uniform<D: GraphicsDevice>(&self, device: &D, location: &D::UniformLocation) {
        device.uniform_1_i32(location, *self);
    }
}

impl Uniform for f32 {
    fn set_uniform<D: GraphicsDevice>(&self, device: &D, location: &D::UniformLocation) {
        device.uniform_1_f32(location, *self);
    }
}

impl Uniform for Vec3 {
    fn set_uniform<D: GraphicsDevice>(&self, device: &D, location: &D::UniformLocation) {
        device.uniform_3_f32(location, self.x, self.y, self.z);
    }
}

impl Uniform for Mat4 {
    fn set_uniform<D: GraphicsDevice>(&self, device: &D, location: &D::UniformLocation) {
        device.uniform_matrix_4_f32_slice(location, &self.to_cols_array());
    }
}

impl<T: Uniform> Uniform for &T {
    fn set_uniform<D: GraphicsDevice>(&self, device: &D, location: &D::UniformLocation) {
        (*self).set_uniform(device, location);
    }
}

/// Represents a linked shader program.
pub struct ShaderProgram<D: GraphicsDevice> {
    device: Arc<D>,
    id: D::Program,
}

impl<D: GraphicsDevice> ShaderProgram<D> {
    /// Links a new shader program from the given shaders.
    ///
    /// The shaders are detached again after a successful link; dropping them afterwards
    /// frees the stage objects.
    pub fn link(device: &Arc<D>, shaders: &[&Shader<D>]) -> Result<Self> {
        let program = device.create_program().map_err(Error::Device)?;

        for shader in shaders {
            device.attach_shader(program, shader.id);
        }

        device.link_program(program);

        if !device.get_program_link_status(program) {
            let log = device.get_program_info_log(program);
            device.delete_program(program);
            return Err(Error::Link { log });
        }

        for shader in shaders {
            device.detach_shader(program, shader.id);
        }

        Ok(Self {
            device: Arc::clone(device),
            id: program,
        })
    }

    /// Loads, compiles and links a vertex/fragment pair from disk.
    ///
    /// Both sources are read before anything is created on the device.
    pub fn build(
        device: &Arc<D>,
        vertex_path: impl AsRef<Path>,
        fragment_path: impl AsRef<Path>,
    ) -> Result<Self> {
        let (vertex_path, fragment_path) = (vertex_path.as_ref(), fragment_path.as_ref());
        log::debug!(
            "Building shader program from {} and {}",
            vertex_path.display(),
            fragment_path.display()
        );

        let vertex_source = load_source(vertex_path)?;
        let fragment_source = load_source(fragment_path)?;

        let vertex = Shader::compile(device, ShaderStage::Vertex, &vertex_source)?;
        let fragment = Shader::compile(device, ShaderStage::Fragment, &fragment_source)?;
        let program = Self::link(device, &[&vertex, &fragment])?;

        log::info!(
            "Linked shader program ({}, {})",
            vertex_path.display(),
            fragment_path.display()
        );
        Ok(program)
    }

    /// Binds the shader program for use.
    pub fn use_program(&self) {
        self.device.use_program(Some(self.id));
    }

    /// Sets a uniform variable in the shader program. Unknown names are ignored.
    pub fn set_uniform<T: Uniform>(&self, name: &str, value: T) {
        if let Some(location) = self.device.get_uniform_location(self.id, name) {
            value.set_uniform(&*self.device, &location);
        }
    }

    pub fn id(&self) -> D::Program {
        self.id
    }
}

impl<D: GraphicsDevice> Drop for ShaderProgram<D> {
    fn drop(&mut self) {
        self.device.delete_program(self.id);
    }
}
