//! Structs and functions for handling textures.
//!
//! The module provides [`TextureImage`], a decoded RGBA raster ready for upload, and the
//! [`Texture`] struct which is a CPU representation of a GPU texture.

use std::{path::Path, sync::Arc};

use image::{DynamicImage, GenericImageView, ImageReader};

use super::GraphicsDevice;
use crate::error::{Error, Result};

/// A decoded 8-bit RGBA raster with row 0 at the bottom, as OpenGL expects.
///
/// `pixels` always holds exactly `width * height * 4` bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl TextureImage {
    /// Decodes an image file. The format is guessed from the file contents.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let image_error = |source| Error::Image {
            path: path.to_path_buf(),
            source,
        };

        let image = ImageReader::open(path)
            .and_then(|reader| reader.with_guessed_format())
            .map_err(|e| image_error(image::ImageError::IoError(e)))?
            .decode()
            .map_err(image_error)?;

        Ok(Self::from_image(image))
    }

    /// Flips the image vertically and converts it to RGBA8.
    pub fn from_image(image: DynamicImage) -> Self {
        let (width, height) = image.dimensions();
        let pixels = image.flipv().to_rgba8().into_raw();
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Wraps raw RGBA8 rows, bottom row first. Returns `None` if the buffer length does
    /// not match the dimensions.
    pub fn from_raw(width: u32, height: u32, pixels: Vec<u8>) -> Option<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(4)?;
        (pixels.len() == expected).then_some(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Returns the RGBA value at `(x, y)`, where `y = 0` is the bottom row.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        let mut rgba = [0; 4];
        rgba.copy_from_slice(&self.pixels[offset..offset + 4]);
        Some(rgba)
    }
}

/// Represents a texture stored on the GPU side.
pub struct Texture<D: GraphicsDevice> {
    device: Arc<D>,
    id: D::Texture,
    width: u32,
    height: u32,
}

impl<D: GraphicsDevice> Texture<D> {
    /// Creates a new texture from the given [`TextureImage`].
    ///
    /// Wrapping is set to repeat and filtering to linear, and a full mipmap chain is
    /// generated.
    pub fn new(device: &Arc<D>, image: &TextureImage) -> Result<Self> {
        let texture = device.create_texture().map_err(Error::Device)?;
        device.bind_texture(Some(texture));
        device.tex_parameter_i32(glow::TEXTURE_WRAP_S, glow::REPEAT as i32);
        device.tex_parameter_i32(glow::TEXTURE_WRAP_T, glow::REPEAT as i32);
        device.tex_parameter_i32(glow::TEXTURE_MIN_FILTER, glow::LINEAR as i32);
        device.tex_parameter_i32(glow::TEXTURE_MAG_FILTER, glow::LINEAR as i32);
        device.pixel_store_i32(glow::UNPACK_ALIGNMENT, 1);
        device.tex_image_2d_rgba8(image.width as i32, image.height as i32, &image.pixels);
        device.generate_mipmap();
        device.bind_texture(None);

        Ok(Self {
            device: Arc::clone(device),
            id: texture,
            width: image.width,
            height: image.height,
        })
    }

    /// Decodes an image file and uploads it. Nothing is allocated on the device if the
    /// image cannot be read.
    pub fn load(device: &Arc<D>, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        log::debug!("Loading texture {}", path.display());
        let image = TextureImage::load(path)?;
        let texture = Self::new(device, &image)?;
        log::info!(
            "Loaded texture {} ({}x{})",
            path.display(),
            texture.width,
            texture.height
        );
        Ok(texture)
    }

    /// Returns the width of the texture.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the height of the texture.
    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn id(&self) -> D::Texture {
        self.id
    }

    /// Binds the texture to the specified texture unit.
    pub fn bind(&self, unit: u32) {
        self.device.active_texture(unit);
        self.device.bind_texture(Some(self.id));
    }
}

impl<D: GraphicsDevice> Drop for Texture<D> {
    fn drop(&mut self) {
        self.device.delete_texture(self.id);
    }
}
