//! Error types shared by the asset loaders and the bootstrap.

use std::path::PathBuf;

use thiserror::Error;

use crate::abs::ShaderStage;

/// Errors produced while loading assets onto the GPU or bootstrapping the window.
#[derive(Error, Debug)]
pub enum Error {
    /// A file could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A shader stage failed to compile. `log` is the driver's info log.
    #[error("failed to compile {stage} shader: {log}")]
    Compile { stage: ShaderStage, log: String },

    /// A shader program failed to link. `log` is the driver's info log.
    #[error("failed to link shader program: {log}")]
    Link { log: String },

    /// An image could not be opened or decoded.
    #[error("failed to load image {}: {source}", .path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// A scene file could not be imported.
    #[error("failed to import scene {}: {source}", .path.display())]
    Import {
        path: PathBuf,
        #[source]
        source: tobj::LoadError,
    },

    /// Geometry whose indices point past its vertices.
    #[error("invalid mesh {name:?}: index {index} out of range for {vertex_count} vertices")]
    InvalidMesh {
        name: String,
        index: u32,
        vertex_count: usize,
    },

    /// The graphics driver refused to create an object.
    #[error("graphics device error: {0}")]
    Device(String),

    /// The configuration file is malformed.
    #[error("invalid configuration in {}: {source}", .path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Window or context creation failed.
    #[error("window error: {0}")]
    Window(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::File {
            path: path.into(),
            source,
        }
    }

    pub fn window(msg: impl ToString) -> Self {
        Self::Window(msg.to_string())
    }

    /// Returns the driver diagnostic carried by shader errors.
    pub fn diagnostic(&self) -> Option<&str> {
        match self {
            Error::Compile { log, .. } | Error::Link { log } => Some(log),
            _ => None,
        }
    }
}
