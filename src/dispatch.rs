//! Per-draw shading state pushed to the shader boundary.
//!
//! Each draw follows the same protocol: transform, then flat colour or
//! texture, then material, then (optionally) UV scale.

use glam::{Vec2, Vec4};
use log::{trace, warn};

use crate::registry::{MaterialDefinition, MaterialLookup, ResourceRegistry};
use crate::shader::{self, ShaderUniforms};
use crate::transform::TransformSpec;

/// Slot pushed for a texture tag that is not registered.
pub const UNRESOLVED_SLOT: i32 = -1;

/// Result of [`ShadingDispatcher::push_texture`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureBinding {
    Resolved(usize),
    /// The tag is unknown and [`UNRESOLVED_SLOT`] was pushed in its place.
    Unresolved,
}

/// Result of [`ShadingDispatcher::push_material`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterialPush {
    Applied,
    /// No material carries the tag; the previously pushed material stays active.
    Unmatched,
    /// The registry holds no materials, so nothing was pushed.
    NoMaterials,
    /// No shader is attached.
    Detached,
}

/// Translates transform/colour/texture/material choices into uniform pushes.
///
/// A dispatcher without a shader accepts every call and pushes nothing.
pub struct ShadingDispatcher<'a> {
    shader: Option<&'a mut dyn ShaderUniforms>,
    registry: &'a ResourceRegistry,
}

impl<'a> ShadingDispatcher<'a> {
    pub fn new(shader: &'a mut dyn ShaderUniforms, registry: &'a ResourceRegistry) -> Self {
        Self {
            shader: Some(shader),
            registry,
        }
    }

    pub fn detached(registry: &'a ResourceRegistry) -> Self {
        Self {
            shader: None,
            registry,
        }
    }

    pub fn is_attached(&self) -> bool {
        self.shader.is_some()
    }

    pub fn push_transform(&mut self, transform: &TransformSpec) {
        if let Some(shader) = self.shader.as_mut() {
            shader.set_mat4(shader::MODEL, transform.model_matrix());
        }
    }

    /// Pushes a flat colour and turns texture sampling off for the next draw.
    pub fn push_flat_color(&mut self, color: Vec4) {
        if let Some(shader) = self.shader.as_mut() {
            shader.set_bool(shader::USE_TEXTURE, false);
            shader.set_vec4(shader::OBJECT_COLOR, color);
        }
    }

    /// Turns texture sampling on and points the sampler at `tag`'s slot.
    pub fn push_texture(&mut self, tag: &str) -> TextureBinding {
        let binding = match self.registry.find_texture_slot(tag) {
            Some(slot) => TextureBinding::Resolved(slot),
            None => {
                warn!("texture `{tag}` is not registered; sampling slot {UNRESOLVED_SLOT}");
                TextureBinding::Unresolved
            }
        };
        if let Some(shader) = self.shader.as_mut() {
            let slot = match binding {
                TextureBinding::Resolved(slot) => slot as i32,
                TextureBinding::Unresolved => UNRESOLVED_SLOT,
            };
            trace!("texture `{tag}` -> slot {slot}");
            shader.set_bool(shader::USE_TEXTURE, true);
            shader.set_int(shader::OBJECT_TEXTURE, slot);
        }
        binding
    }

    /// Pushes every field of the material tagged `tag`, or nothing at all.
    pub fn push_material(&mut self, tag: &str) -> MaterialPush {
        let Some(shader) = self.shader.as_mut() else {
            return MaterialPush::Detached;
        };
        let mut material = MaterialDefinition::new(tag);
        match self.registry.find_material(tag, &mut material) {
            Err(_) => MaterialPush::NoMaterials,
            Ok(MaterialLookup::Unmatched) => MaterialPush::Unmatched,
            Ok(MaterialLookup::Found) => {
                shader.set_vec3("material.ambientColor", material.ambient_color);
                shader.set_float("material.ambientStrength", material.ambient_strength);
                shader.set_vec3("material.diffuseColor", material.diffuse_color);
                shader.set_vec3("material.specularColor", material.specular_color);
                shader.set_float("material.shininess", material.shininess);
                MaterialPush::Applied
            }
        }
    }

    pub fn push_uv_scale(&mut self, scale: Vec2) {
        if let Some(shader) = self.shader.as_mut() {
            shader.set_vec2(shader::UV_SCALE, scale);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::DecodedImage;
    use crate::recording::RecordingBackend;
    use crate::shader::UniformValue;
    use glam::{Mat4, Vec3};

    fn registry_with(device: &mut RecordingBackend) -> ResourceRegistry {
        let mut registry = ResourceRegistry::new();
        let image = DecodedImage::new(vec![0; 4], 1, 1, 4);
        registry.register_texture(device, &image, "desk").unwrap();
        registry.register_texture(device, &image, "cup").unwrap();
        registry.register_material(
            MaterialDefinition::new("cup")
                .ambient(Vec3::splat(0.1), 0.3)
                .diffuse(Vec3::splat(0.2))
                .specular(Vec3::ONE, 95.0),
        );
        registry
    }

    #[test]
    fn transform_pushes_model_matrix() {
        let mut shader = RecordingBackend::new();
        let registry = ResourceRegistry::new();
        let transform = TransformSpec::at(Vec3::new(1.0, 2.0, 3.0));
        ShadingDispatcher::new(&mut shader, &registry).push_transform(&transform);
        assert_eq!(
            shader.uniform_pushes(),
            vec![(
                "model".to_string(),
                UniformValue::Mat4(Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0)))
            )]
        );
    }

    #[test]
    fn flat_color_disables_texturing() {
        let mut shader = RecordingBackend::new();
        let registry = ResourceRegistry::new();
        ShadingDispatcher::new(&mut shader, &registry).push_flat_color(Vec4::new(0.6, 0.6, 0.6, 1.0));
        assert_eq!(shader.last_uniform("bUseTexture"), Some(UniformValue::Bool(false)));
        assert_eq!(
            shader.last_uniform("objectColor"),
            Some(UniformValue::Vec4(Vec4::new(0.6, 0.6, 0.6, 1.0)))
        );
    }

    #[test]
    fn texture_resolves_slot_by_registration_order() {
        let mut shader = RecordingBackend::new();
        let registry = registry_with(&mut shader);
        shader.clear();
        let binding = ShadingDispatcher::new(&mut shader, &registry).push_texture("cup");
        assert_eq!(binding, TextureBinding::Resolved(1));
        assert_eq!(shader.last_uniform("bUseTexture"), Some(UniformValue::Bool(true)));
        assert_eq!(shader.last_uniform("objectTexture"), Some(UniformValue::Int(1)));
    }

    #[test]
    fn unknown_texture_pushes_sentinel_slot() {
        let mut shader = RecordingBackend::new();
        let registry = registry_with(&mut shader);
        let binding = ShadingDispatcher::new(&mut shader, &registry).push_texture("notebook");
        assert_eq!(binding, TextureBinding::Unresolved);
        assert_eq!(
            shader.last_uniform("objectTexture"),
            Some(UniformValue::Int(UNRESOLVED_SLOT))
        );
    }

    #[test]
    fn material_is_pushed_as_a_group() {
        let mut shader = RecordingBackend::new();
        let registry = registry_with(&mut shader);
        shader.clear();
        let push = ShadingDispatcher::new(&mut shader, &registry).push_material("cup");
        assert_eq!(push, MaterialPush::Applied);
        let names: Vec<String> = shader.uniform_pushes().into_iter().map(|(name, _)| name).collect();
        assert_eq!(
            names,
            [
                "material.ambientColor",
                "material.ambientStrength",
                "material.diffuseColor",
                "material.specularColor",
                "material.shininess",
            ]
        );
        assert_eq!(
            shader.last_uniform("material.shininess"),
            Some(UniformValue::Float(95.0))
        );
    }

    #[test]
    fn unmatched_material_pushes_nothing() {
        let mut shader = RecordingBackend::new();
        let registry = registry_with(&mut shader);
        shader.clear();
        let push = ShadingDispatcher::new(&mut shader, &registry).push_material("glass");
        assert_eq!(push, MaterialPush::Unmatched);
        assert!(shader.uniform_pushes().is_empty());
    }

    #[test]
    fn material_without_registry_entries_is_noop() {
        let mut shader = RecordingBackend::new();
        let registry = ResourceRegistry::new();
        let push = ShadingDispatcher::new(&mut shader, &registry).push_material("cup");
        assert_eq!(push, MaterialPush::NoMaterials);
        assert!(shader.uniform_pushes().is_empty());
    }

    #[test]
    fn detached_dispatcher_accepts_everything() {
        let registry = ResourceRegistry::new();
        let mut dispatcher = ShadingDispatcher::detached(&registry);
        assert!(!dispatcher.is_attached());
        dispatcher.push_transform(&TransformSpec::default());
        dispatcher.push_flat_color(Vec4::ONE);
        dispatcher.push_uv_scale(Vec2::ONE);
        assert_eq!(dispatcher.push_texture("desk"), TextureBinding::Unresolved);
        assert_eq!(dispatcher.push_material("desk"), MaterialPush::Detached);
    }
}
