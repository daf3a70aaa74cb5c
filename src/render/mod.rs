mod native;
pub mod uniforms;

pub use native::Renderer;
