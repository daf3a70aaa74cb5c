//! Real-time textured desk scene.
//!
//! The scene graph, shading dispatch and camera logic talk to the GPU only
//! through the [`ShaderUniforms`], [`TextureDevice`] and [`MeshLibrary`]
//! traits, so everything except the windowed front end can be driven by the
//! headless [`RecordingBackend`].

pub mod app;
pub mod camera;
pub mod config;
pub mod decode;
pub mod desk;
pub mod dispatch;
pub mod error;
pub mod geometry;
pub mod input;
pub mod lights;
pub mod mesh;
pub mod recording;
pub mod registry;
pub mod render;
pub mod scene;
pub mod session;
pub mod shader;
pub mod transform;

pub use app::{run, WindowInitError};
pub use camera::{Camera, CameraMovement};
pub use config::{KeyBindings, ViewerConfig};
pub use decode::{DecodedImage, FileImageDecoder, ImageDecoder};
pub use dispatch::{MaterialPush, ShadingDispatcher, TextureBinding};
pub use error::{ConfigError, SceneError, TextureError};
pub use input::{InputState, KeyCode, NamedKey};
pub use lights::{Attenuation, DirectionalLight, LightRig, PointLight};
pub use mesh::{Faces, MeshLibrary, Shape};
pub use recording::{BackendEvent, RecordingBackend};
pub use registry::{MaterialDefinition, ResourceRegistry, TextureDevice, TextureHandle};
pub use render::Renderer;
pub use scene::{FrameStats, SceneGraph, SceneObject, ScenePhase, Surface, TextureLoadReport};
pub use session::{FrameMatrices, ProjectionMode, RenderSession};
pub use shader::{ShaderUniforms, UniformValue};
pub use transform::TransformSpec;
