//! In-memory [`GraphicsDevice`] for tests (no GPU required).
//!
//! Every object lives in a [`MockState`] table keyed by a plain `u32` id. Deleting an object
//! removes it from its table, so tests can check that wrappers release what they create.

use std::{cell::RefCell, collections::HashMap};

use super::{GraphicsDevice, ShaderStage};

#[derive(Debug, Clone)]
pub struct MockShader {
    pub stage: ShaderStage,
    pub source: String,
    pub compiled: Option<bool>,
    pub log: String,
}

#[derive(Debug, Clone, Default)]
pub struct MockProgram {
    pub attached: Vec<u32>,
    pub linked: bool,
    pub log: String,
}

#[derive(Debug, Clone, Default)]
pub struct MockTexture {
    pub params: HashMap<u32, i32>,
    pub width: i32,
    pub height: i32,
    pub pixels: Vec<u8>,
    pub unpack_alignment: i32,
    pub mipmapped: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MockAttrib {
    pub index: u32,
    pub size: i32,
    pub stride: i32,
    pub offset: i32,
    pub buffer: Option<u32>,
    pub enabled: bool,
}

#[derive(Debug, Clone, Default)]
pub struct MockVertexArray {
    pub element_buffer: Option<u32>,
    pub attribs: Vec<MockAttrib>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MockUniform {
    Int(i32),
    Float(f32),
    Vec3([f32; 3]),
    Mat4(Vec<f32>),
}

#[derive(Debug, Default)]
pub struct MockState {
    next_id: u32,
    pub shaders: HashMap<u32, MockShader>,
    pub programs: HashMap<u32, MockProgram>,
    pub textures: HashMap<u32, MockTexture>,
    pub buffers: HashMap<u32, Vec<u8>>,
    pub vertex_arrays: HashMap<u32, MockVertexArray>,
    pub programs_created: usize,
    pub textures_created: usize,
    pub current_program: Option<u32>,
    pub bound_texture: Option<u32>,
    pub active_unit: u32,
    pub array_buffer: Option<u32>,
    pub bound_vertex_array: Option<u32>,
    pub unpack_alignment: i32,
    pub uniforms: Vec<(u32, String, MockUniform)>,
    pub draws: Vec<(u32, u32, i32)>,
    pub fail_next_link: Option<String>,
    pub fail_next_buffer: bool,
}

impl MockState {
    fn allocate(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }
}

/// A graphics device that records calls instead of talking to a driver.
///
/// Shader sources with unbalanced braces fail to compile with a driver-style log.
#[derive(Debug, Default)]
pub struct MockDevice {
    pub state: RefCell<MockState>,
}

impl MockDevice {
    pub fn new() -> Self {
        Self {
            state: RefCell::new(MockState {
                unpack_alignment: 4,
                ..Default::default()
            }),
        }
    }

    /// Makes the next `link_program` call fail with the given log.
    pub fn fail_next_link(&self, log: &str) {
        self.state.borrow_mut().fail_next_link = Some(log.to_string());
    }

    /// Makes the next `create_buffer` call fail.
    pub fn fail_next_buffer(&self) {
        self.state.borrow_mut().fail_next_buffer = true;
    }

    /// Returns the number of GPU objects that have not been deleted yet.
    pub fn live_objects(&self) -> usize {
        let state = self.state.borrow();
        state.shaders.len()
            + state.programs.len()
            + state.textures.len()
            + state.buffers.len()
            + state.vertex_arrays.len()
    }
}

fn check_braces(source: &str) -> Result<(), String> {
    let mut depth = 0i32;
    for (line_no, line) in source.lines().enumerate() {
        for c in line.chars() {
            match c {
                '{' => depth += 1,
                '}' => depth -= 1,
                _ => {}
            }
            if depth < 0 {
                return Err(format!("0:{}(1): error: syntax error, unexpected '}}'", line_no + 1));
            }
        }
    }
    if depth != 0 {
        return Err(format!(
            "0:{}(1): error: syntax error, unexpected end of file",
            source.lines().count()
        ));
    }
    Ok(())
}

impl GraphicsDevice for MockDevice {
    type Shader = u32;
    type Program = u32;
    type Texture = u32;
    type Buffer = u32;
    type VertexArray = u32;
    type UniformLocation = (u32, String);

    fn create_shader(&self, stage: ShaderStage) -> Result<u32, String> {
        let mut state = self.state.borrow_mut();
        let id = state.allocate();
        state.shaders.insert(
            id,
            MockShader {
                stage,
                source: String::new(),
                compiled: None,
                log: String::new(),
            },
        );
        Ok(id)
    }

    fn shader_source(&self, shader: u32, source: &str) {
        if let Some(s) = self.state.borrow_mut().shaders.get_mut(&shader) {
            s.source = source.to_string();
        }
    }

    fn compile_shader(&self, shader: u32) {
        if let Some(s) = self.state.borrow_mut().shaders.get_mut(&shader) {
            match check_braces(&s.source) {
                Ok(()) => s.compiled = Some(true),
                Err(log) => {
                    s.compiled = Some(false);
                    s.log = log;
                }
            }
        }
    }

    fn get_shader_compile_status(&self, shader: u32) -> bool {
        self.state
            .borrow()
            .shaders
            .get(&shader)
            .and_then(|s| s.compiled)
            .unwrap_or(false)
    }

    fn get_shader_info_log(&self, shader: u32) -> String {
        self.state
            .borrow()
            .shaders
            .get(&shader)
            .map(|s| s.log.clone())
            .unwrap_or_default()
    }

    fn delete_shader(&self, shader: u32) {
        self.state.borrow_mut().shaders.remove(&shader);
    }

    fn create_program(&self) -> Result<u32, String> {
        let mut state = self.state.borrow_mut();
        let id = state.allocate();
        state.programs_created += 1;
        state.programs.insert(id, MockProgram::default());
        Ok(id)
    }

    fn attach_shader(&self, program: u32, shader: u32) {
        if let Some(p) = self.state.borrow_mut().programs.get_mut(&program) {
            p.attached.push(shader);
        }
    }

    fn detach_shader(&self, program: u32, shader: u32) {
        if let Some(p) = self.state.borrow_mut().programs.get_mut(&program) {
            p.attached.retain(|&s| s != shader);
        }
    }

    fn link_program(&self, program: u32) {
        let mut state = self.state.borrow_mut();
        let failure = state.fail_next_link.take();
        let all_compiled = state
            .programs
            .get(&program)
            .map(|p| {
                p.attached
                    .iter()
                    .all(|s| state.shaders.get(s).and_then(|s| s.compiled) == Some(true))
            })
            .unwrap_or(false);
        if let Some(p) = state.programs.get_mut(&program) {
            match failure {
                Some(log) => p.log = log,
                None if !all_compiled => p.log = "error: linking with uncompiled shader".into(),
                None => p.linked = true,
            }
        }
    }

    fn get_program_link_status(&self, program: u32) -> bool {
        self.state
            .borrow()
            .programs
            .get(&program)
            .is_some_and(|p| p.linked)
    }

    fn get_program_info_log(&self, program: u32) -> String {
        self.state
            .borrow()
            .programs
            .get(&program)
            .map(|p| p.log.clone())
            .unwrap_or_default()
    }

    fn use_program(&self, program: Option<u32>) {
        self.state.borrow_mut().current_program = program;
    }

    fn delete_program(&self, program: u32) {
        let mut state = self.state.borrow_mut();
        state.programs.remove(&program);
        if state.current_program == Some(program) {
            state.current_program = None;
        }
    }

    fn get_uniform_location(&self, program: u32, name: &str) -> Option<(u32, String)> {
        // Names starting with "unused" behave like uniforms the compiler optimised away.
        if name.starts_with("unused") {
            None
        } else {
            Some((program, name.to_string()))
        }
    }

    fn uniform_1_i32(&self, location: &(u32, String), x: i32) {
        let (program, name) = location.clone();
        self.state
            .borrow_mut()
            .uniforms
            .push((program, name, MockUniform::Int(x)));
    }

    fn uniform_1_f32(&self, location: &(u32, String), x: f32) {
        let (program, name) = location.clone();
        self.state
            .borrow_mut()
            .uniforms
            .push((program, name, MockUniform::Float(x)));
    }

    fn uniform_3_f32(&self, location: &(u32, String), x: f32, y: f32, z: f32) {
        let (program, name) = location.clone();
        self.state
            .borrow_mut()
            .uniforms
            .push((program, name, MockUniform::Vec3([x, y, z])));
    }

    fn uniform_matrix_4_f32_slice(&self, location: &(u32, String), v: &[f32]) {
        let (program, name) = location.clone();
        self.state
            .borrow_mut()
            .uniforms
            .push((program, name, MockUniform::Mat4(v.to_vec())));
    }

    fn create_texture(&self) -> Result<u32, String> {
        let mut state = self.state.borrow_mut();
        let id = state.allocate();
        state.textures_created += 1;
        state.textures.insert(id, MockTexture::default());
        Ok(id)
    }

    fn bind_texture(&self, texture: Option<u32>) {
        self.state.borrow_mut().bound_texture = texture;
    }

    fn active_texture(&self, unit: u32) {
        self.state.borrow_mut().active_unit = unit;
    }

    fn tex_parameter_i32(&self, parameter: u32, value: i32) {
        let mut state = self.state.borrow_mut();
        if let Some(id) = state.bound_texture
            && let Some(t) = state.textures.get_mut(&id)
        {
            t.params.insert(parameter, value);
        }
    }

    fn pixel_store_i32(&self, parameter: u32, value: i32) {
        if parameter == glow::UNPACK_ALIGNMENT {
            self.state.borrow_mut().unpack_alignment = value;
        }
    }

    fn tex_image_2d_rgba8(&self, width: i32, height: i32, pixels: &[u8]) {
        let mut state = self.state.borrow_mut();
        let alignment = state.unpack_alignment;
        if let Some(id) = state.bound_texture
            && let Some(t) = state.textures.get_mut(&id)
        {
            t.width = width;
            t.height = height;
            t.pixels = pixels.to_vec();
            t.unpack_alignment = alignment;
        }
    }

    fn generate_mipmap(&self) {
        let mut state = self.state.borrow_mut();
        if let Some(id) = state.bound_texture
            && let Some(t) = state.textures.get_mut(&id)
        {
            t.mipmapped = true;
        }
    }

    fn delete_texture(&self, texture: u32) {
        let mut state = self.state.borrow_mut();
        state.textures.remove(&texture);
        if state.bound_texture == Some(texture) {
            state.bound_texture = None;
        }
    }

    fn create_vertex_array(&self) -> Result<u32, String> {
        let mut state = self.state.borrow_mut();
        let id = state.allocate();
        state.vertex_arrays.insert(id, MockVertexArray::default());
        Ok(id)
    }

    fn bind_vertex_array(&self, vertex_array: Option<u32>) {
        self.state.borrow_mut().bound_vertex_array = vertex_array;
    }

    fn delete_vertex_array(&self, vertex_array: u32) {
        let mut state = self.state.borrow_mut();
        state.vertex_arrays.remove(&vertex_array);
        if state.bound_vertex_array == Some(vertex_array) {
            state.bound_vertex_array = None;
        }
    }

    fn create_buffer(&self) -> Result<u32, String> {
        let mut state = self.state.borrow_mut();
        if state.fail_next_buffer {
            state.fail_next_buffer = false;
            return Err("out of memory".to_string());
        }
        let id = state.allocate();
        state.buffers.insert(id, Vec::new());
        Ok(id)
    }

    fn bind_buffer(&self, target: u32, buffer: Option<u32>) {
        let mut state = self.state.borrow_mut();
        match target {
            glow::ARRAY_BUFFER => state.array_buffer = buffer,
            glow::ELEMENT_ARRAY_BUFFER => {
                if let Some(vao) = state.bound_vertex_array
                    && let Some(v) = state.vertex_arrays.get_mut(&vao)
                {
                    v.element_buffer = buffer;
                }
            }
            _ => {}
        }
    }

    fn buffer_data_u8_slice(&self, target: u32, data: &[u8], _usage: u32) {
        let mut state = self.state.borrow_mut();
        let bound = match target {
            glow::ARRAY_BUFFER => state.array_buffer,
            glow::ELEMENT_ARRAY_BUFFER => state
                .bound_vertex_array
                .and_then(|vao| state.vertex_arrays.get(&vao))
                .and_then(|v| v.element_buffer),
            _ => None,
        };
        if let Some(id) = bound
            && let Some(b) = state.buffers.get_mut(&id)
        {
            *b = data.to_vec();
        }
    }

    fn delete_buffer(&self, buffer: u32) {
        let mut state = self.state.borrow_mut();
        state.buffers.remove(&buffer);
        if state.array_buffer == Some(buffer) {
            state.array_buffer = None;
        }
    }

    fn enable_vertex_attrib_array(&self, index: u32) {
        let mut state = self.state.borrow_mut();
        if let Some(vao) = state.bound_vertex_array
            && let Some(v) = state.vertex_arrays.get_mut(&vao)
        {
            for a in v.attribs.iter_mut().filter(|a| a.index == index) {
                a.enabled = true;
            }
        }
    }

    fn vertex_attrib_pointer_f32(&self, index: u32, size: i32, stride: i32, offset: i32) {
        let mut state = self.state.borrow_mut();
        let buffer = state.array_buffer;
        if let Some(vao) = state.bound_vertex_array
            && let Some(v) = state.vertex_arrays.get_mut(&vao)
        {
            v.attribs.retain(|a| a.index != index);
            v.attribs.push(MockAttrib {
                index,
                size,
                stride,
                offset,
                buffer,
                enabled: false,
            });
        }
    }

    fn draw_elements_u32(&self, mode: u32, count: i32) {
        let mut state = self.state.borrow_mut();
        if let Some(vao) = state.bound_vertex_array {
            state.draws.push((vao, mode, count));
        }
    }
}
