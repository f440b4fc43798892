//! Mesh management module.
//!
//! This module defines [`GpuMesh`], one vertex array with its vertex and index buffers, and
//! [`MeshAsset`], the GPU form of an imported [`Scene`] with one [`GpuMesh`] per submesh.
//!
//! Vertices are positions only: attribute slot 0, three floats, tightly packed.

use std::{path::Path, sync::Arc};

use super::GraphicsDevice;
use crate::{
    error::{Error, Result},
    scene::{Scene, SubMesh, check_indices},
};

/// Represents a mesh stored on the GPU side.
pub struct GpuMesh<D: GraphicsDevice> {
    device: Arc<D>,
    vao: D::VertexArray,
    vbo: D::Buffer,
    ebo: D::Buffer,
    index_count: usize,
}

impl<D: GraphicsDevice> GpuMesh<D> {
    /// Uploads packed `xyz` positions and `u32` triangle indices.
    ///
    /// Every index must name a vertex; nothing is created on the device otherwise.
    pub fn new(device: &Arc<D>, positions: &[f32], indices: &[u32]) -> Result<Self> {
        Self::upload(device, "", positions, indices)
    }

    /// Uploads the complete triangles of a submesh.
    pub fn from_submesh(device: &Arc<D>, submesh: &SubMesh) -> Result<Self> {
        Self::upload(
            device,
            &submesh.name,
            &submesh.positions,
            submesh.triangle_indices(),
        )
    }

    fn upload(device: &Arc<D>, name: &str, positions: &[f32], indices: &[u32]) -> Result<Self> {
        check_indices(name, positions.len() / 3, indices)?;

        let vao = device.create_vertex_array().map_err(Error::Device)?;
        let vbo = match device.create_buffer() {
            Ok(vbo) => vbo,
            Err(e) => {
                device.delete_vertex_array(vao);
                return Err(Error::Device(e));
            }
        };
        let ebo = match device.create_buffer() {
            Ok(ebo) => ebo,
            Err(e) => {
                device.delete_buffer(vbo);
                device.delete_vertex_array(vao);
                return Err(Error::Device(e));
            }
        };

        device.bind_vertex_array(Some(vao));

        device.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
        device.buffer_data_u8_slice(
            glow::ARRAY_BUFFER,
            bytemuck::cast_slice(positions),
            glow::STATIC_DRAW,
        );
        device.vertex_attrib_pointer_f32(0, 3, 0, 0);
        device.enable_vertex_attrib_array(0);

        device.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(ebo));
        device.buffer_data_u8_slice(
            glow::ELEMENT_ARRAY_BUFFER,
            bytemuck::cast_slice(indices),
            glow::STATIC_DRAW,
        );

        device.bind_vertex_array(None);
        device.bind_buffer(glow::ARRAY_BUFFER, None);

        Ok(Self {
            device: Arc::clone(device),
            vao,
            vbo,
            ebo,
            index_count: indices.len(),
        })
    }

    /// Draws the mesh as an indexed triangle list.
    pub fn draw(&self) {
        self.device.bind_vertex_array(Some(self.vao));
        self.device
            .draw_elements_u32(glow::TRIANGLES, self.index_count as i32);
        self.device.bind_vertex_array(None);
    }

    pub fn vertex_array(&self) -> D::VertexArray {
        self.vao
    }

    // Returns the amount of indices used in the mesh
    pub fn index_count(&self) -> usize {
        self.index_count
    }
}

impl<D: GraphicsDevice> Drop for GpuMesh<D> {
    fn drop(&mut self) {
        self.device.delete_buffer(self.vbo);
        self.device.delete_buffer(self.ebo);
        self.device.delete_vertex_array(self.vao);
    }
}

/// An imported model: one [`GpuMesh`] per submesh, in import order.
///
/// The CPU-side [`Scene`] is kept until [`MeshAsset::release`] is called. GPU buffers live
/// until the asset is dropped.
pub struct MeshAsset<D: GraphicsDevice> {
    meshes: Vec<GpuMesh<D>>,
    scene: Option<Scene>,
}

impl<D: GraphicsDevice> MeshAsset<D> {
    /// Imports a model file and uploads every submesh.
    pub fn load(device: &Arc<D>, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        log::debug!("Loading mesh {}", path.display());
        let scene = Scene::import(path)?;
        let asset = Self::from_scene(device, scene)?;
        log::info!(
            "Loaded mesh {} ({} submeshes, {} indices)",
            path.display(),
            asset.len(),
            asset.index_counts().sum::<usize>()
        );
        Ok(asset)
    }

    /// Uploads an already imported scene. Meshes uploaded before a failure are released.
    pub fn from_scene(device: &Arc<D>, scene: Scene) -> Result<Self> {
        let meshes = scene
            .submeshes
            .iter()
            .map(|submesh| GpuMesh::from_submesh(device, submesh))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            meshes,
            scene: Some(scene),
        })
    }

    /// Draws every submesh.
    pub fn render(&self) {
        for mesh in &self.meshes {
            mesh.draw();
        }
    }

    /// Frees the CPU-side scene. Calling it again does nothing.
    pub fn release(&mut self) {
        if self.scene.take().is_some() {
            log::trace!("Released CPU scene data ({} submeshes)", self.meshes.len());
        }
    }

    pub fn is_released(&self) -> bool {
        self.scene.is_none()
    }

    /// The imported scene, until it is released.
    pub fn scene(&self) -> Option<&Scene> {
        self.scene.as_ref()
    }

    pub fn meshes(&self) -> &[GpuMesh<D>] {
        &self.meshes
    }

    pub fn vertex_arrays(&self) -> impl Iterator<Item = D::VertexArray> + '_ {
        self.meshes.iter().map(GpuMesh::vertex_array)
    }

    pub fn index_counts(&self) -> impl Iterator<Item = usize> + '_ {
        self.meshes.iter().map(GpuMesh::index_count)
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }
}
