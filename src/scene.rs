use std::collections::BTreeSet;
use std::path::PathBuf;

use glam::{Vec2, Vec4};
use log::{debug, info, warn};

use crate::decode::ImageDecoder;
use crate::dispatch::{MaterialPush, ShadingDispatcher, TextureBinding};
use crate::error::{SceneError, TextureError};
use crate::lights::LightRig;
use crate::mesh::{Faces, MeshLibrary, Shape};
use crate::registry::{MaterialDefinition, ResourceRegistry, TextureDevice};
use crate::shader::ShaderUniforms;
use crate::transform::TransformSpec;

/// Lifecycle of a [`SceneGraph`]. Each setup call advances exactly one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScenePhase {
    Uninitialized,
    MaterialsDefined,
    MaterialsAndLightsDefined,
    TexturesLoaded,
    /// Meshes are uploaded; the scene can be rendered.
    Ready,
    Closed,
}

/// Where an object takes its base colour from.
#[derive(Debug, Clone, PartialEq)]
pub enum Surface {
    Color(Vec4),
    Texture(String),
}

/// One drawable unit of the scene.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneObject {
    pub name: String,
    pub shape: Shape,
    pub faces: Faces,
    pub transform: TransformSpec,
    pub surface: Surface,
    pub material: Option<String>,
    pub uv_scale: Option<Vec2>,
}

impl SceneObject {
    /// A white, untextured object without material.
    pub fn new(name: impl Into<String>, shape: Shape, transform: TransformSpec) -> Self {
        Self {
            name: name.into(),
            shape,
            faces: Faces::ALL,
            transform,
            surface: Surface::Color(Vec4::ONE),
            material: None,
            uv_scale: None,
        }
    }

    pub fn textured(mut self, tag: impl Into<String>) -> Self {
        self.surface = Surface::Texture(tag.into());
        self
    }

    pub fn colored(mut self, color: Vec4) -> Self {
        self.surface = Surface::Color(color);
        self
    }

    pub fn with_material(mut self, tag: impl Into<String>) -> Self {
        self.material = Some(tag.into());
        self
    }

    pub fn with_uv_scale(mut self, scale: Vec2) -> Self {
        self.uv_scale = Some(scale);
        self
    }

    pub fn with_faces(mut self, faces: Faces) -> Self {
        self.faces = faces;
        self
    }

    pub fn is_translucent(&self) -> bool {
        matches!(self.surface, Surface::Color(color) if color.w < 1.0)
    }
}

/// A texture file to load and the tag it is registered under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureSource {
    pub path: PathBuf,
    pub tag: String,
}

impl TextureSource {
    pub fn new(path: impl Into<PathBuf>, tag: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            tag: tag.into(),
        }
    }
}

/// Outcome of [`SceneGraph::load_textures`]. Failed textures are skipped, not fatal.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TextureLoadReport {
    pub loaded: Vec<String>,
    pub failed: Vec<(String, TextureError)>,
}

/// Lookup misses met while rendering one frame.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FrameStats {
    pub objects_drawn: usize,
    pub unresolved_textures: usize,
    pub unmatched_materials: usize,
}

/// Ordered scene content plus the resources it is drawn with.
///
/// Objects are drawn in insertion order; there is no depth sort, so
/// translucent objects have to be added after the opaque ones behind them.
#[derive(Debug)]
pub struct SceneGraph {
    phase: ScenePhase,
    registry: ResourceRegistry,
    lights: LightRig,
    objects: Vec<SceneObject>,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    pub fn new() -> Self {
        Self {
            phase: ScenePhase::Uninitialized,
            registry: ResourceRegistry::new(),
            lights: LightRig::default(),
            objects: Vec::new(),
        }
    }

    pub fn phase(&self) -> ScenePhase {
        self.phase
    }

    pub fn registry(&self) -> &ResourceRegistry {
        &self.registry
    }

    pub fn lights(&self) -> &LightRig {
        &self.lights
    }

    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    /// Appends an object to the paint order. Only allowed until meshes are loaded.
    pub fn add_object(&mut self, object: SceneObject) -> Result<(), SceneError> {
        match self.phase {
            ScenePhase::Closed => return Err(SceneError::Closed),
            ScenePhase::Ready => {
                return Err(SceneError::OutOfOrder {
                    operation: "add_object",
                    expected: ScenePhase::TexturesLoaded,
                    actual: self.phase,
                })
            }
            _ => {}
        }
        if !object.is_translucent() {
            if let Some(previous) = self.objects.iter().find(|o| o.is_translucent()) {
                warn!(
                    "opaque object `{}` is painted after translucent object `{}`",
                    object.name, previous.name
                );
            }
        }
        self.objects.push(object);
        Ok(())
    }

    pub fn define_materials(
        &mut self,
        materials: impl IntoIterator<Item = MaterialDefinition>,
    ) -> Result<(), SceneError> {
        self.advance("define_materials", ScenePhase::Uninitialized)?;
        for material in materials {
            self.registry.register_material(material);
        }
        debug!("defined {} material(s)", self.registry.materials().len());
        self.phase = ScenePhase::MaterialsDefined;
        Ok(())
    }

    /// Stores the light rig and pushes it, including the lighting enable flag.
    pub fn setup_lights(
        &mut self,
        lights: LightRig,
        shader: &mut dyn ShaderUniforms,
    ) -> Result<(), SceneError> {
        self.advance("setup_lights", ScenePhase::MaterialsDefined)?;
        lights.apply(shader);
        self.lights = lights;
        self.phase = ScenePhase::MaterialsAndLightsDefined;
        Ok(())
    }

    /// Loads every texture of `manifest` in order, then binds the whole set once.
    pub fn load_textures(
        &mut self,
        manifest: &[TextureSource],
        decoder: &dyn ImageDecoder,
        device: &mut dyn TextureDevice,
    ) -> Result<TextureLoadReport, SceneError> {
        self.advance("load_textures", ScenePhase::MaterialsAndLightsDefined)?;
        let mut report = TextureLoadReport::default();
        for source in manifest {
            match self
                .registry
                .load_texture(decoder, device, &source.path, &source.tag)
            {
                Ok(_) => report.loaded.push(source.tag.clone()),
                Err(err) => {
                    warn!("skipping texture `{}`: {err}", source.tag);
                    report.failed.push((source.tag.clone(), err));
                }
            }
        }
        self.registry.bind_all_textures(device);
        info!(
            "loaded {} texture(s), {} failed",
            report.loaded.len(),
            report.failed.len()
        );
        self.phase = ScenePhase::TexturesLoaded;
        Ok(report)
    }

    /// Uploads each distinct shape the scene uses once. Returns the number of shapes.
    pub fn load_mesh_geometry(&mut self, meshes: &mut dyn MeshLibrary) -> Result<usize, SceneError> {
        self.advance("load_mesh_geometry", ScenePhase::TexturesLoaded)?;
        let shapes: BTreeSet<Shape> = self.objects.iter().map(|object| object.shape).collect();
        for shape in &shapes {
            meshes.load_mesh(*shape);
        }
        self.phase = ScenePhase::Ready;
        Ok(shapes.len())
    }

    /// Issues the shading pushes and the draw for every object, one object at a time.
    pub fn render<B>(&self, backend: &mut B) -> Result<FrameStats, SceneError>
    where
        B: ShaderUniforms + MeshLibrary,
    {
        match self.phase {
            ScenePhase::Ready => {}
            ScenePhase::Closed => return Err(SceneError::Closed),
            phase => return Err(SceneError::NotReady(phase)),
        }

        let mut stats = FrameStats::default();
        for object in &self.objects {
            {
                let mut dispatcher = ShadingDispatcher::new(&mut *backend, &self.registry);
                dispatcher.push_transform(&object.transform);
                match &object.surface {
                    Surface::Color(color) => dispatcher.push_flat_color(*color),
                    Surface::Texture(tag) => {
                        if dispatcher.push_texture(tag) == TextureBinding::Unresolved {
                            stats.unresolved_textures += 1;
                        }
                    }
                }
                if let Some(material) = &object.material {
                    if dispatcher.push_material(material) == MaterialPush::Unmatched {
                        stats.unmatched_materials += 1;
                    }
                }
                if let Some(scale) = object.uv_scale {
                    dispatcher.push_uv_scale(scale);
                }
            }
            backend.draw_mesh(object.shape, object.faces);
            stats.objects_drawn += 1;
        }
        Ok(stats)
    }

    /// Releases every texture. The scene cannot be used afterwards.
    pub fn shutdown(&mut self, device: &mut dyn TextureDevice) -> Result<(), SceneError> {
        if self.phase == ScenePhase::Closed {
            return Err(SceneError::Closed);
        }
        self.registry.release_all(device);
        self.phase = ScenePhase::Closed;
        Ok(())
    }

    fn advance(&self, operation: &'static str, expected: ScenePhase) -> Result<(), SceneError> {
        if self.phase == ScenePhase::Closed {
            return Err(SceneError::Closed);
        }
        if self.phase != expected {
            return Err(SceneError::OutOfOrder {
                operation,
                expected,
                actual: self.phase,
            });
        }
        Ok(())
    }
}
