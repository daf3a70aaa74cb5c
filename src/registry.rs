use std::path::Path;

use glam::Vec3;
use log::{info, warn};

use crate::decode::{DecodedImage, ImageDecoder};
use crate::error::TextureError;

/// Number of texture units that can be sampled from in a single pass.
pub const MAX_TEXTURE_UNITS: usize = 16;

/// Opaque id of a GPU-resident texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u32);

/// GPU side of texture registration.
pub trait TextureDevice {
    /// Uploads a validated RGB or RGBA image and returns its handle. Nothing
    /// is kept on the device when the upload fails.
    fn upload_texture(&mut self, image: &DecodedImage, tag: &str)
        -> Result<TextureHandle, TextureError>;
    /// Makes `handle` the texture sampled through `unit`.
    fn bind_texture(&mut self, unit: usize, handle: TextureHandle);
    fn release_texture(&mut self, handle: TextureHandle);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureEntry {
    pub handle: TextureHandle,
    pub tag: String,
}

/// Lighting response of a surface, addressed by tag.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialDefinition {
    pub tag: String,
    pub ambient_color: Vec3,
    pub ambient_strength: f32,
    pub diffuse_color: Vec3,
    pub specular_color: Vec3,
    pub shininess: f32,
}

impl MaterialDefinition {
    /// A black, non-reflective material; fill in the colours with the builders.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ambient_color: Vec3::ZERO,
            ambient_strength: 0.0,
            diffuse_color: Vec3::ZERO,
            specular_color: Vec3::ZERO,
            shininess: 0.0,
        }
    }

    pub fn ambient(mut self, color: Vec3, strength: f32) -> Self {
        self.ambient_color = color;
        self.ambient_strength = strength.clamp(0.0, 1.0);
        self
    }

    pub fn diffuse(mut self, color: Vec3) -> Self {
        self.diffuse_color = color;
        self
    }

    pub fn specular(mut self, color: Vec3, shininess: f32) -> Self {
        self.specular_color = color;
        self.shininess = shininess.max(0.0);
        self
    }
}

/// Outcome of [`ResourceRegistry::find_material`] on a non-empty registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterialLookup {
    /// The output was overwritten with the first material carrying the tag.
    Found,
    /// No material carries the tag; the output was left as it was.
    Unmatched,
}

/// [`ResourceRegistry::find_material`] was called before any material was registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoMaterials;

/// Append-only tables of textures and materials, looked up by tag.
///
/// Tags are not required to be unique; every lookup scans in registration
/// order and the earliest entry wins.
#[derive(Debug, Default)]
pub struct ResourceRegistry {
    textures: Vec<TextureEntry>,
    materials: Vec<MaterialDefinition>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates `image`, uploads it through `device` and appends a new entry.
    ///
    /// Nothing is appended when validation or the device upload fails.
    pub fn register_texture(
        &mut self,
        device: &mut dyn TextureDevice,
        image: &DecodedImage,
        tag: &str,
    ) -> Result<TextureHandle, TextureError> {
        if !matches!(image.channels, 3 | 4) {
            return Err(TextureError::UnsupportedChannelLayout {
                tag: tag.to_string(),
                channels: image.channels,
            });
        }
        if image.pixels.len() != image.expected_len() {
            return Err(TextureError::PixelBufferSize {
                tag: tag.to_string(),
                expected: image.expected_len(),
                actual: image.pixels.len(),
            });
        }
        if self.textures.len() >= MAX_TEXTURE_UNITS {
            return Err(TextureError::SlotsExhausted {
                tag: tag.to_string(),
                limit: MAX_TEXTURE_UNITS,
            });
        }
        let handle = device.upload_texture(image, tag)?;
        self.textures.push(TextureEntry {
            handle,
            tag: tag.to_string(),
        });
        Ok(handle)
    }

    /// Decodes the image at `path` and registers it under `tag`.
    pub fn load_texture(
        &mut self,
        decoder: &dyn ImageDecoder,
        device: &mut dyn TextureDevice,
        path: &Path,
        tag: &str,
    ) -> Result<TextureHandle, TextureError> {
        let image = decoder.decode(path)?;
        info!(
            "loaded image {}, width: {}, height: {}, channels: {}",
            path.display(),
            image.width,
            image.height,
            image.channels
        );
        self.register_texture(device, &image, tag)
    }

    pub fn find_texture_handle(&self, tag: &str) -> Option<TextureHandle> {
        self.textures
            .iter()
            .find(|entry| entry.tag == tag)
            .map(|entry| entry.handle)
    }

    /// Texture unit the tagged texture is bound to, equal to its registration index.
    pub fn find_texture_slot(&self, tag: &str) -> Option<usize> {
        self.textures.iter().position(|entry| entry.tag == tag)
    }

    pub fn textures(&self) -> &[TextureEntry] {
        &self.textures
    }

    /// Binds every registered texture to the unit matching its registration index.
    pub fn bind_all_textures(&self, device: &mut dyn TextureDevice) {
        for (unit, entry) in self.textures.iter().enumerate() {
            device.bind_texture(unit, entry.handle);
        }
    }

    /// Releases every texture at once; the registry is empty afterwards.
    pub fn release_all(&mut self, device: &mut dyn TextureDevice) {
        for entry in self.textures.drain(..) {
            device.release_texture(entry.handle);
        }
    }

    pub fn register_material(&mut self, material: MaterialDefinition) {
        self.materials.push(material);
    }

    pub fn materials(&self) -> &[MaterialDefinition] {
        &self.materials
    }

    pub fn material(&self, tag: &str) -> Option<&MaterialDefinition> {
        self.materials.iter().find(|material| material.tag == tag)
    }

    /// Copies the first material tagged `tag` into `output`.
    ///
    /// An empty registry is the only failure. A miss on a non-empty registry
    /// still succeeds, reports [`MaterialLookup::Unmatched`] and leaves `output`
    /// unmodified, so callers must check the lookup before trusting `output`.
    pub fn find_material(
        &self,
        tag: &str,
        output: &mut MaterialDefinition,
    ) -> Result<MaterialLookup, NoMaterials> {
        if self.materials.is_empty() {
            return Err(NoMaterials);
        }
        match self.material(tag) {
            Some(material) => {
                output.clone_from(material);
                Ok(MaterialLookup::Found)
            }
            None => {
                warn!("no material is tagged `{tag}`");
                Ok(MaterialLookup::Unmatched)
            }
        }
    }
}
