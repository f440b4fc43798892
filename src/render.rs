//! The per-frame draw.

use std::sync::Arc;

use glam::Mat4;

use crate::{
    abs::{GraphicsDevice, MeshAsset, ShaderProgram, Texture},
    config::{AssetConfig, CameraConfig},
    error::Result,
    input::FrameContext,
};

/// Everything drawn each frame: one program, one texture and the loaded models.
pub struct Renderer<D: GraphicsDevice> {
    pub program: ShaderProgram<D>,
    pub texture: Texture<D>,
    pub meshes: Vec<MeshAsset<D>>,
    near: f32,
    far: f32,
}

impl<D: GraphicsDevice> Renderer<D> {
    /// Builds the program, uploads the texture and every model. The CPU-side scenes are
    /// released once their buffers are on the device.
    pub fn load(device: &Arc<D>, assets: &AssetConfig, camera: &CameraConfig) -> Result<Self> {
        let program = ShaderProgram::build(device, &assets.vertex_shader, &assets.fragment_shader)?;
        let texture = Texture::load(device, &assets.texture)?;

        let mut meshes = Vec::with_capacity(assets.models.len());
        for path in &assets.models {
            let mut mesh = MeshAsset::load(device, path)?;
            mesh.release();
            meshes.push(mesh);
        }

        Ok(Self {
            program,
            texture,
            meshes,
            near: camera.near,
            far: camera.far,
        })
    }

    /// Sets the frame uniforms and draws every mesh. Clearing is left to the caller.
    pub fn draw(&self, ctx: &FrameContext) {
        self.program.use_program();

        self.texture.bind(0);
        self.program.set_uniform("ourTexture", 0);

        self.program.set_uniform("model", Mat4::IDENTITY);
        self.program.set_uniform("view", ctx.view_matrix());
        self.program
            .set_uniform("projection", ctx.projection_matrix(self.near, self.far));

        for mesh in &self.meshes {
            mesh.render();
        }
    }
}
