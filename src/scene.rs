//! CPU-side scene import.
//!
//! A [`Scene`] is the flattened, triangulated content of a model file: one [`SubMesh`] per
//! object in the file, each holding packed `xyz` positions and triangle indices. Only
//! positions and connectivity are kept; materials, normals and texture coordinates are
//! ignored.

use std::path::Path;

use fxhash::FxHashMap;

use crate::error::{Error, Result};

/// One independently indexed group of triangles.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SubMesh {
    pub name: String,
    /// Three floats per vertex.
    pub positions: Vec<f32>,
    /// Three indices per triangle.
    pub indices: Vec<u32>,
}

impl SubMesh {
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// The number of indices drawn for this submesh.
    pub fn index_count(&self) -> usize {
        self.triangle_count() * 3
    }

    /// Indices of complete triangles only.
    pub fn triangle_indices(&self) -> &[u32] {
        &self.indices[..self.index_count()]
    }

    /// Fails on the first index that does not name a vertex.
    pub fn validate(&self) -> Result<()> {
        check_indices(&self.name, self.vertex_count(), &self.indices)
    }

    /// Merges vertices with bit-identical positions and rewrites the indices to match.
    ///
    /// The indices must be in range; see [`SubMesh::validate`].
    pub fn weld(&mut self) -> Result<()> {
        self.validate()?;

        let mut seen: FxHashMap<[u32; 3], u32> = FxHashMap::default();
        let mut remap = Vec::with_capacity(self.vertex_count());
        let mut positions = Vec::with_capacity(self.positions.len());

        for xyz in self.positions.chunks_exact(3) {
            let key = [xyz[0].to_bits(), xyz[1].to_bits(), xyz[2].to_bits()];
            let next = (positions.len() / 3) as u32;
            let index = *seen.entry(key).or_insert_with(|| {
                positions.extend_from_slice(xyz);
                next
            });
            remap.push(index);
        }

        for index in &mut self.indices {
            *index = remap[*index as usize];
        }
        self.positions = positions;
        Ok(())
    }
}

/// Checks that every index is below `vertex_count`.
pub fn check_indices(name: &str, vertex_count: usize, indices: &[u32]) -> Result<()> {
    match indices.iter().find(|&&i| i as usize >= vertex_count) {
        Some(&index) => Err(Error::InvalidMesh {
            name: name.to_string(),
            index,
            vertex_count,
        }),
        None => Ok(()),
    }
}

/// A triangulated scene, in file order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Scene {
    pub submeshes: Vec<SubMesh>,
}

impl Scene {
    /// Imports a Wavefront OBJ file.
    ///
    /// Faces are triangulated, points and lines are dropped, and identical vertices are
    /// welded.
    pub fn import(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let options = tobj::LoadOptions {
            single_index: true,
            triangulate: true,
            ignore_points: true,
            ignore_lines: true,
            ..Default::default()
        };

        let (models, _materials) = tobj::load_obj(path, &options).map_err(|source| Error::Import {
            path: path.to_path_buf(),
            source,
        })?;

        let submeshes = models
            .into_iter()
            .map(|model| SubMesh {
                name: model.name,
                positions: model.mesh.positions,
                indices: model.mesh.indices,
            })
            .collect();

        Self::from_submeshes(submeshes)
    }

    /// Builds a scene from in-memory geometry, welding every submesh.
    pub fn from_submeshes(mut submeshes: Vec<SubMesh>) -> Result<Self> {
        for submesh in &mut submeshes {
            submesh.weld()?;
        }
        Ok(Self { submeshes })
    }

    pub fn triangle_count(&self) -> usize {
        self.submeshes.iter().map(SubMesh::triangle_count).sum()
    }
}
