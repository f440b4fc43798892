//! The graphics device seam.
//!
//! [`GraphicsDevice`] mirrors the small part of [`glow::HasContext`] the engine needs. The
//! resource wrappers in this module tree are generic over it so they can run against a real
//! OpenGL context or, in tests, against an in-memory device.
//!
//! All methods assume the context is current on the calling thread.

use std::fmt::Debug;

use glow::HasContext;

/// A programmable pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex = glow::VERTEX_SHADER as isize,
    Fragment = glow::FRAGMENT_SHADER as isize,
}

impl ShaderStage {
    /// Returns the OpenGL enum for the stage.
    pub fn gl_enum(self) -> u32 {
        self as u32
    }
}

impl std::fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShaderStage::Vertex => write!(f, "vertex"),
            ShaderStage::Fragment => write!(f, "fragment"),
        }
    }
}

/// The subset of OpenGL used by shaders, textures and meshes.
///
/// Texture calls always target `TEXTURE_2D`. Object creation reports driver failures as
/// `Err(String)`; everything else follows OpenGL's fire-and-forget model.
pub trait GraphicsDevice {
    type Shader: Copy + Debug + PartialEq;
    type Program: Copy + Debug + PartialEq;
    type Texture: Copy + Debug + PartialEq;
    type Buffer: Copy + Debug + PartialEq;
    type VertexArray: Copy + Debug + PartialEq;
    type UniformLocation;

    fn create_shader(&self, stage: ShaderStage) -> Result<Self::Shader, String>;
    fn shader_source(&self, shader: Self::Shader, source: &str);
    fn compile_shader(&self, shader: Self::Shader);
    fn get_shader_compile_status(&self, shader: Self::Shader) -> bool;
    fn get_shader_info_log(&self, shader: Self::Shader) -> String;
    fn delete_shader(&self, shader: Self::Shader);

    fn create_program(&self) -> Result<Self::Program, String>;
    fn attach_shader(&self, program: Self::Program, shader: Self::Shader);
    fn detach_shader(&self, program: Self::Program, shader: Self::Shader);
    fn link_program(&self, program: Self::Program);
    fn get_program_link_status(&self, program: Self::Program) -> bool;
    fn get_program_info_log(&self, program: Self::Program) -> String;
    fn use_program(&self, program: Option<Self::Program>);
    fn delete_program(&self, program: Self::Program);

    fn get_uniform_location(
        &self,
        program: Self::Program,
        name: &str,
    ) -> Option<Self::UniformLocation>;
    fn uniform_1_i32(&self, location: &Self::UniformLocation, x: i32);
    fn uniform_1_f32(&self, location: &Self::UniformLocation, x: f32);
    fn uniform_3_f32(&self, location: &Self::UniformLocation, x: f32, y: f32, z: f32);
    fn uniform_matrix_4_f32_slice(&self, location: &Self::UniformLocation, v: &[f32]);

    fn create_texture(&self) -> Result<Self::Texture, String>;
    fn bind_texture(&self, texture: Option<Self::Texture>);
    fn active_texture(&self, unit: u32);
    fn tex_parameter_i32(&self, parameter: u32, value: i32);
    fn pixel_store_i32(&self, parameter: u32, value: i32);
    /// Uploads level 0 of the bound texture as 8-bit RGBA.
    fn tex_image_2d_rgba8(&self, width: i32, height: i32, pixels: &[u8]);
    fn generate_mipmap(&self);
    fn delete_texture(&self, texture: Self::Texture);

    fn create_vertex_array(&self) -> Result<Self::VertexArray, String>;
    fn bind_vertex_array(&self, vertex_array: Option<Self::VertexArray>);
    fn delete_vertex_array(&self, vertex_array: Self::VertexArray);
    fn create_buffer(&self) -> Result<Self::Buffer, String>;
    fn bind_buffer(&self, target: u32, buffer: Option<Self::Buffer>);
    fn buffer_data_u8_slice(&self, target: u32, data: &[u8], usage: u32);
    fn delete_buffer(&self, buffer: Self::Buffer);
    fn enable_vertex_attrib_array(&self, index: u32);
    fn vertex_attrib_pointer_f32(&self, index: u32, size: i32, stride: i32, offset: i32);
    /// Draws `count` `u32` indices from the bound element buffer.
    fn draw_elements_u32(&self, mode: u32, count: i32);
}

impl GraphicsDevice for glow::Context {
    type Shader = glow::Shader;
    type Program = glow::Program;
    type Texture = glow::Texture;
    type Buffer = glow::Buffer;
    type VertexArray = glow::VertexArray;
    type UniformLocation = glow::UniformLocation;

    fn create_shader(&self, stage: ShaderStage) -> Result<Self::Shader, String> {
        unsafe { HasContext::create_shader(self, stage.gl_enum()) }
    }

    fn shader_source(&self, shader: Self::Shader, source: &str) {
        unsafe { HasContext::shader_source(self, shader, source) }
    }

    fn compile_shader(&self, shader: Self::Shader) {
        unsafe { HasContext::compile_shader(self, shader) }
    }

    fn get_shader_compile_status(&self, shader: Self::Shader) -> bool {
        unsafe { HasContext::get_shader_compile_status(self, shader) }
    }

    fn get_shader_info_log(&self, shader: Self::Shader) -> String {
        unsafe { HasContext::get_shader_info_log(self, shader) }
    }

    fn delete_shader(&self, shader: Self::Shader) {
        unsafe { HasContext::delete_shader(self, shader) }
    }

    fn create_program(&self) -> Result<Self::Program, String> {
        unsafe { HasContext::create_program(self) }
    }

    fn attach_shader(&self, program: Self::Program, shader: Self::Shader) {
        unsafe { HasContext::attach_shader(self, program, shader) }
    }

    fn detach_shader(&self, program: Self::Program, shader: Self::Shader) {
        unsafe { HasContext::detach_shader(self, program, shader) }
    }

    fn link_program(&self, program: Self::Program) {
        unsafe { HasContext::link_program(self, program) }
    }

    fn get_program_link_status(&self, program: Self::Program) -> bool {
        unsafe { HasContext::get_program_link_status(self, program) }
    }

    fn get_program_info_log(&self, program: Self::Program) -> String {
        unsafe { HasContext::get_program_info_log(self, program) }
    }

    fn use_program(&self, program: Option<Self::Program>) {
        unsafe { HasContext::use_program(self, program) }
    }

    fn delete_program(&self, program: Self::Program) {
        unsafe { HasContext::delete_program(self, program) }
    }

    fn get_uniform_location(
        &self,
        program: Self::Program,
        name: &str,
    ) -> Option<Self::UniformLocation> {
        unsafe { HasContext::get_uniform_location(self, program, name) }
    }

    fn uniform_1_i32(&self, location: &Self::UniformLocation, x: i32) {
        unsafe { HasContext::uniform_1_i32(self, Some(location), x) }
    }

    fn uniform_1_f32(&self, location: &Self::UniformLocation, x: f32) {
        unsafe { HasContext::uniform_1_f32(self, Some(location), x) }
    }

    fn uniform_3_f32(&self, location: &Self::UniformLocation, x: f32, y: f32, z: f32) {
        unsafe { HasContext::uniform_3_f32(self, Some(location), x, y, z) }
    }

    fn uniform_matrix_4_f32_slice(&self, location: &Self::UniformLocation, v: &[f32]) {
        unsafe { HasContext::uniform_matrix_4_f32_slice(self, Some(location), false, v) }
    }

    fn create_texture(&self) -> Result<Self::Texture, String> {
        unsafe { HasContext::create_texture(self) }
    }

    fn bind_texture(&self, texture: Option<Self::Texture>) {
        unsafe { HasContext::bind_texture(self, glow::TEXTURE_2D, texture) }
    }

    fn active_texture(&self, unit: u32) {
        unsafe { HasContext::active_texture(self, glow::TEXTURE0 + unit) }
    }

    fn tex_parameter_i32(&self, parameter: u32, value: i32) {
        unsafe { HasContext::tex_parameter_i32(self, glow::TEXTURE_2D, parameter, value) }
    }

    fn pixel_store_i32(&self, parameter: u32, value: i32) {
        unsafe { HasContext::pixel_store_i32(self, parameter, value) }
    }

    fn tex_image_2d_rgba8(&self, width: i32, height: i32, pixels: &[u8]) {
        unsafe {
            HasContext::tex_image_2d(
                self,
                glow::TEXTURE_2D,
                0,
                glow::RGBA as i32,
                width,
                height,
                0,
                glow::RGBA,
                glow::UNSIGNED_BYTE,
                glow::PixelUnpackData::Slice(Some(pixels)),
            )
        }
    }

    fn generate_mipmap(&self) {
        unsafe { HasContext::generate_mipmap(self, glow::TEXTURE_2D) }
    }

    fn delete_texture(&self, texture: Self::Texture) {
        unsafe { HasContext::delete_texture(self, texture) }
    }

    fn create_vertex_array(&self) -> Result<Self::VertexArray, String> {
        unsafe { HasContext::create_vertex_array(self) }
    }

    fn bind_vertex_array(&self, vertex_array: Option<Self::VertexArray>) {
        unsafe { HasContext::bind_vertex_array(self, vertex_array) }
    }

    fn delete_vertex_array(&self, vertex_array: Self::VertexArray) {
        unsafe { HasContext::delete_vertex_array(self, vertex_array) }
    }

    fn create_buffer(&self) -> Result<Self::Buffer, String> {
        unsafe { HasContext::create_buffer(self) }
    }

    fn bind_buffer(&self, target: u32, buffer: Option<Self::Buffer>) {
        unsafe { HasContext::bind_buffer(self, target, buffer) }
    }

    fn buffer_data_u8_slice(&self, target: u32, data: &[u8], usage: u32) {
        unsafe { HasContext::buffer_data_u8_slice(self, target, data, usage) }
    }

    fn delete_buffer(&self, buffer: Self::Buffer) {
        unsafe { HasContext::delete_buffer(self, buffer) }
    }

    fn enable_vertex_attrib_array(&self, index: u32) {
        unsafe { HasContext::enable_vertex_attrib_array(self, index) }
    }

    fn vertex_attrib_pointer_f32(&self, index: u32, size: i32, stride: i32, offset: i32) {
        unsafe {
            HasContext::vertex_attrib_pointer_f32(
                self,
                index,
                size,
                glow::FLOAT,
                false,
                stride,
                offset,
            )
        }
    }

    fn draw_elements_u32(&self, mode: u32, count: i32) {
        unsafe { HasContext::draw_elements(self, mode, count, glow::UNSIGNED_INT, 0) }
    }
}
