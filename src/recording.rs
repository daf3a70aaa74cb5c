use crate::decode::DecodedImage;
use crate::error::TextureError;
use crate::mesh::{Faces, MeshLibrary, Shape};
use crate::registry::{TextureDevice, TextureHandle};
use crate::shader::{ShaderUniforms, UniformValue};

/// One call observed at a GPU boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendEvent {
    Uniform { name: String, value: UniformValue },
    UploadTexture {
        handle: TextureHandle,
        tag: String,
        width: u32,
        height: u32,
        channels: u8,
    },
    BindTexture { unit: usize, handle: TextureHandle },
    ReleaseTexture(TextureHandle),
    LoadMesh(Shape),
    DrawMesh { shape: Shape, faces: Faces },
}

/// Headless backend that records every shader, texture and mesh call in order.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    events: Vec<BackendEvent>,
    next_handle: u32,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            next_handle: 1,
        }
    }

    pub fn events(&self) -> &[BackendEvent] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn uniform_pushes(&self) -> Vec<(String, UniformValue)> {
        self.events
            .iter()
            .filter_map(|event| match event {
                BackendEvent::Uniform { name, value } => Some((name.clone(), *value)),
                _ => None,
            })
            .collect()
    }

    /// Most recent value pushed to `name`.
    pub fn last_uniform(&self, name: &str) -> Option<UniformValue> {
        self.events.iter().rev().find_map(|event| match event {
            BackendEvent::Uniform { name: pushed, value } if pushed == name => Some(*value),
            _ => None,
        })
    }

    pub fn draw_count(&self) -> usize {
        self.events
            .iter()
            .filter(|event| matches!(event, BackendEvent::DrawMesh { .. }))
            .count()
    }

    pub fn uniform_count(&self) -> usize {
        self.events
            .iter()
            .filter(|event| matches!(event, BackendEvent::Uniform { .. }))
            .count()
    }
}

impl ShaderUniforms for RecordingBackend {
    fn set_uniform(&mut self, name: &str, value: UniformValue) {
        self.events.push(BackendEvent::Uniform {
            name: name.to_string(),
            value,
        });
    }
}

impl TextureDevice for RecordingBackend {
    fn upload_texture(
        &mut self,
        image: &DecodedImage,
        tag: &str,
    ) -> Result<TextureHandle, TextureError> {
        let handle = TextureHandle(self.next_handle.max(1));
        self.next_handle = handle.0 + 1;
        self.events.push(BackendEvent::UploadTexture {
            handle,
            tag: tag.to_string(),
            width: image.width,
            height: image.height,
            channels: image.channels,
        });
        Ok(handle)
    }

    fn bind_texture(&mut self, unit: usize, handle: TextureHandle) {
        self.events.push(BackendEvent::BindTexture { unit, handle });
    }

    fn release_texture(&mut self, handle: TextureHandle) {
        self.events.push(BackendEvent::ReleaseTexture(handle));
    }
}

impl MeshLibrary for RecordingBackend {
    fn load_mesh(&mut self, shape: Shape) {
        self.events.push(BackendEvent::LoadMesh(shape));
    }

    fn draw_mesh(&mut self, shape: Shape, faces: Faces) {
        self.events.push(BackendEvent::DrawMesh { shape, faces });
    }
}
