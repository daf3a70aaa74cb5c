//! CPU staging for the named uniform pushes the scene issues.
//!
//! Pushes persist until overwritten, so a draw sees whatever was set last,
//! including state left behind by earlier draws.

use bytemuck::{Pod, Zeroable};
use glam::{Mat3, Mat4, Vec3};
use log::debug;

use crate::dispatch::UNRESOLVED_SLOT;
use crate::lights::MAX_POINT_LIGHTS;
use crate::shader::{self, UniformValue};

#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct DirectionalLightUniform {
    /// `w` is 1 when the light is active.
    pub direction: [f32; 4],
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct PointLightUniform {
    /// `w` is 1 when the light is active.
    pub position: [f32; 4],
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
    /// Constant, linear and quadratic terms.
    pub attenuation: [f32; 4],
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct GlobalUniform {
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    /// `w` is 1 when lighting is enabled.
    pub view_position: [f32; 4],
    pub directional: DirectionalLightUniform,
    pub points: [PointLightUniform; MAX_POINT_LIGHTS],
}

impl Default for GlobalUniform {
    fn default() -> Self {
        Self {
            view: Mat4::IDENTITY.to_cols_array_2d(),
            projection: Mat4::IDENTITY.to_cols_array_2d(),
            view_position: [0.0; 4],
            directional: DirectionalLightUniform::default(),
            points: [PointLightUniform::default(); MAX_POINT_LIGHTS],
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ObjectUniform {
    pub model: [[f32; 4]; 4],
    pub normal: [[f32; 4]; 3],
    pub color: [f32; 4],
    /// Ambient colour with the ambient strength in `w`.
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    /// Specular colour with the shininess in `w`.
    pub specular: [f32; 4],
    /// `x`: texture sampling on, `yz`: UV scale.
    pub flags: [f32; 4],
}

impl Default for ObjectUniform {
    fn default() -> Self {
        Self {
            model: Mat4::IDENTITY.to_cols_array_2d(),
            normal: mat3_to_3x4(Mat3::IDENTITY),
            color: [1.0; 4],
            ambient: [1.0, 1.0, 1.0, 0.2],
            diffuse: [1.0, 1.0, 1.0, 0.0],
            specular: [0.0, 0.0, 0.0, 1.0],
            flags: [0.0, 1.0, 1.0, 0.0],
        }
    }
}

/// Object state captured at draw time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjectState {
    pub uniform: ObjectUniform,
    pub texture_slot: i32,
}

impl Default for ObjectState {
    fn default() -> Self {
        Self {
            uniform: ObjectUniform::default(),
            texture_slot: UNRESOLVED_SLOT,
        }
    }
}

impl ObjectState {
    pub fn uses_texture(&self) -> bool {
        self.uniform.flags[0] > 0.5
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MaterialField {
    AmbientColor,
    AmbientStrength,
    DiffuseColor,
    SpecularColor,
    Shininess,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LightField {
    Direction,
    Position,
    Ambient,
    Diffuse,
    Specular,
    Constant,
    Linear,
    Quadratic,
    Active,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UniformTarget {
    Model,
    View,
    Projection,
    ViewPosition,
    ObjectColor,
    ObjectTexture,
    UseTexture,
    UseLighting,
    UvScale,
    Material(MaterialField),
    Directional(LightField),
    Point(usize, LightField),
}

fn parse_target(name: &str) -> Option<UniformTarget> {
    let target = match name {
        shader::MODEL => UniformTarget::Model,
        shader::VIEW => UniformTarget::View,
        shader::PROJECTION => UniformTarget::Projection,
        shader::VIEW_POSITION => UniformTarget::ViewPosition,
        shader::OBJECT_COLOR => UniformTarget::ObjectColor,
        shader::OBJECT_TEXTURE => UniformTarget::ObjectTexture,
        shader::USE_TEXTURE => UniformTarget::UseTexture,
        shader::USE_LIGHTING => UniformTarget::UseLighting,
        shader::UV_SCALE => UniformTarget::UvScale,
        _ => {
            let (owner, field) = name.split_once('.')?;
            if owner == "material" {
                return parse_material_field(field).map(UniformTarget::Material);
            }
            let field = parse_light_field(field)?;
            if owner == "directionalLight" {
                return Some(UniformTarget::Directional(field));
            }
            let index = owner.strip_prefix("pointLights[")?.strip_suffix(']')?;
            let index: usize = index.parse().ok()?;
            if index >= MAX_POINT_LIGHTS {
                return None;
            }
            UniformTarget::Point(index, field)
        }
    };
    Some(target)
}

fn parse_material_field(field: &str) -> Option<MaterialField> {
    Some(match field {
        "ambientColor" => MaterialField::AmbientColor,
        "ambientStrength" => MaterialField::AmbientStrength,
        "diffuseColor" => MaterialField::DiffuseColor,
        "specularColor" => MaterialField::SpecularColor,
        "shininess" => MaterialField::Shininess,
        _ => return None,
    })
}

fn parse_light_field(field: &str) -> Option<LightField> {
    Some(match field {
        "direction" => LightField::Direction,
        "position" => LightField::Position,
        "ambient" => LightField::Ambient,
        "diffuse" => LightField::Diffuse,
        "specular" => LightField::Specular,
        "constant" => LightField::Constant,
        "linear" => LightField::Linear,
        "quadratic" => LightField::Quadratic,
        "bActive" => LightField::Active,
        _ => return None,
    })
}

/// Current value of every uniform the lighting shader declares.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UniformStaging {
    pub global: GlobalUniform,
    pub object: ObjectState,
}

impl UniformStaging {
    /// Stores `value` under `name`. Returns `false`, and changes nothing, for
    /// unknown names or values of the wrong shape.
    pub fn set(&mut self, name: &str, value: UniformValue) -> bool {
        let Some(target) = parse_target(name) else {
            debug!("ignoring unknown uniform `{name}`");
            return false;
        };
        let applied = self.apply(target, value);
        if !applied {
            debug!("ignoring uniform `{name}`: unexpected value {value:?}");
        }
        applied
    }

    fn apply(&mut self, target: UniformTarget, value: UniformValue) -> bool {
        use UniformValue as V;
        let global = &mut self.global;
        let object = &mut self.object;
        match (target, value) {
            (UniformTarget::Model, V::Mat4(model)) => {
                object.uniform.model = model.to_cols_array_2d();
                let normal = Mat3::from_mat4(model).inverse().transpose();
                object.uniform.normal = mat3_to_3x4(normal);
            }
            (UniformTarget::View, V::Mat4(view)) => global.view = view.to_cols_array_2d(),
            (UniformTarget::Projection, V::Mat4(projection)) => {
                global.projection = projection.to_cols_array_2d()
            }
            (UniformTarget::ViewPosition, V::Vec3(position)) => {
                set_xyz(&mut global.view_position, position)
            }
            (UniformTarget::UseLighting, V::Bool(on)) => global.view_position[3] = flag(on),
            (UniformTarget::ObjectColor, V::Vec4(color)) => object.uniform.color = color.into(),
            (UniformTarget::ObjectTexture, V::Int(slot)) => object.texture_slot = slot,
            (UniformTarget::UseTexture, V::Bool(on)) => object.uniform.flags[0] = flag(on),
            (UniformTarget::UvScale, V::Vec2(scale)) => {
                object.uniform.flags[1] = scale.x;
                object.uniform.flags[2] = scale.y;
            }
            (UniformTarget::Material(field), value) => {
                return apply_material(&mut object.uniform, field, value)
            }
            (UniformTarget::Directional(field), value) => {
                return apply_directional(&mut global.directional, field, value)
            }
            (UniformTarget::Point(index, field), value) => {
                return apply_point(&mut global.points[index], field, value)
            }
            _ => return false,
        }
        true
    }
}

fn apply_material(uniform: &mut ObjectUniform, field: MaterialField, value: UniformValue) -> bool {
    match (field, value) {
        (MaterialField::AmbientColor, UniformValue::Vec3(color)) => set_xyz(&mut uniform.ambient, color),
        (MaterialField::AmbientStrength, UniformValue::Float(strength)) => uniform.ambient[3] = strength,
        (MaterialField::DiffuseColor, UniformValue::Vec3(color)) => set_xyz(&mut uniform.diffuse, color),
        (MaterialField::SpecularColor, UniformValue::Vec3(color)) => {
            set_xyz(&mut uniform.specular, color)
        }
        (MaterialField::Shininess, UniformValue::Float(shininess)) => uniform.specular[3] = shininess,
        _ => return false,
    }
    true
}

fn apply_directional(
    light: &mut DirectionalLightUniform,
    field: LightField,
    value: UniformValue,
) -> bool {
    match (field, value) {
        (LightField::Direction, UniformValue::Vec3(direction)) => {
            set_xyz(&mut light.direction, direction)
        }
        (LightField::Ambient, UniformValue::Vec3(color)) => set_xyz(&mut light.ambient, color),
        (LightField::Diffuse, UniformValue::Vec3(color)) => set_xyz(&mut light.diffuse, color),
        (LightField::Specular, UniformValue::Vec3(color)) => set_xyz(&mut light.specular, color),
        (LightField::Active, UniformValue::Bool(on)) => light.direction[3] = flag(on),
        _ => return false,
    }
    true
}

fn apply_point(light: &mut PointLightUniform, field: LightField, value: UniformValue) -> bool {
    match (field, value) {
        (LightField::Position, UniformValue::Vec3(position)) => set_xyz(&mut light.position, position),
        (LightField::Ambient, UniformValue::Vec3(color)) => set_xyz(&mut light.ambient, color),
        (LightField::Diffuse, UniformValue::Vec3(color)) => set_xyz(&mut light.diffuse, color),
        (LightField::Specular, UniformValue::Vec3(color)) => set_xyz(&mut light.specular, color),
        (LightField::Constant, UniformValue::Float(value)) => light.attenuation[0] = value,
        (LightField::Linear, UniformValue::Float(value)) => light.attenuation[1] = value,
        (LightField::Quadratic, UniformValue::Float(value)) => light.attenuation[2] = value,
        (LightField::Active, UniformValue::Bool(on)) => light.position[3] = flag(on),
        _ => return false,
    }
    true
}

fn set_xyz(target: &mut [f32; 4], value: Vec3) {
    target[..3].copy_from_slice(&value.to_array());
}

fn flag(on: bool) -> f32 {
    if on {
        1.0
    } else {
        0.0
    }
}

fn mat3_to_3x4(matrix: Mat3) -> [[f32; 4]; 3] {
    let cols = matrix.to_cols_array();
    [
        [cols[0], cols[1], cols[2], 0.0],
        [cols[3], cols[4], cols[5], 0.0],
        [cols[6], cols[7], cols[8], 0.0],
    ]
}

pub const SHADER: &str = r#"
struct DirectionalLight {
    direction: vec4<f32>,
    ambient: vec4<f32>,
    diffuse: vec4<f32>,
    specular: vec4<f32>,
}

struct PointLight {
    position: vec4<f32>,
    ambient: vec4<f32>,
    diffuse: vec4<f32>,
    specular: vec4<f32>,
    attenuation: vec4<f32>,
}

struct GlobalUniform {
    view: mat4x4<f32>,
    projection: mat4x4<f32>,
    view_position: vec4<f32>,
    directional: DirectionalLight,
    points: array<PointLight, 4>,
}

struct ObjectUniform {
    model: mat4x4<f32>,
    normal: mat3x4<f32>,
    color: vec4<f32>,
    ambient: vec4<f32>,
    diffuse: vec4<f32>,
    specular: vec4<f32>,
    flags: vec4<f32>,
}

@group(0) @binding(0)
var<uniform> globals: GlobalUniform;

@group(1) @binding(0)
var<uniform> object: ObjectUniform;
@group(1) @binding(1)
var object_texture: texture_2d<f32>;
@group(1) @binding(2)
var object_sampler: sampler;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
}

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) world_pos: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
}

@vertex
fn vs_main(input: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    let world_position = object.model * vec4<f32>(input.position, 1.0);
    out.position = globals.projection * globals.view * world_position;
    out.world_pos = world_position.xyz;
    let world_normal = mat3x3<f32>(
        object.normal[0].xyz,
        object.normal[1].xyz,
        object.normal[2].xyz
    ) * input.normal;
    out.normal = normalize(world_normal);
    out.uv = input.uv * object.flags.yz;
    return out;
}

fn phong(light_dir: vec3<f32>, ambient: vec3<f32>, diffuse: vec3<f32>, specular: vec3<f32>,
         normal: vec3<f32>, view_dir: vec3<f32>) -> vec3<f32> {
    let ambient_term = ambient * object.ambient.rgb * object.ambient.w;
    let diffuse_term = diffuse * object.diffuse.rgb * max(dot(normal, light_dir), 0.0);
    let reflect_dir = reflect(-light_dir, normal);
    let highlight = pow(max(dot(view_dir, reflect_dir), 0.0), max(object.specular.w, 1.0));
    let specular_term = specular * object.specular.rgb * highlight;
    return ambient_term + diffuse_term + specular_term;
}

@fragment
fn fs_main(input: VertexOutput) -> @location(0) vec4<f32> {
    var base = object.color;
    let sampled = textureSample(object_texture, object_sampler, input.uv);
    if (object.flags.x > 0.5) {
        base = sampled;
    }
    if (globals.view_position.w < 0.5) {
        return base;
    }

    let normal = normalize(input.normal);
    let view_dir = normalize(globals.view_position.xyz - input.world_pos);
    var lighting = vec3<f32>(0.0);

    let sun = globals.directional;
    if (sun.direction.w > 0.5) {
        lighting += phong(normalize(-sun.direction.xyz), sun.ambient.rgb, sun.diffuse.rgb,
                          sun.specular.rgb, normal, view_dir);
    }
    for (var i = 0u; i < 4u; i = i + 1u) {
        let lamp = globals.points[i];
        if (lamp.position.w > 0.5) {
            let offset = lamp.position.xyz - input.world_pos;
            let dist = length(offset);
            let falloff = 1.0 / (lamp.attenuation.x + lamp.attenuation.y * dist
                + lamp.attenuation.z * dist * dist);
            lighting += falloff * phong(normalize(offset), lamp.ambient.rgb, lamp.diffuse.rgb,
                                        lamp.specular.rgb, normal, view_dir);
        }
    }
    return vec4<f32>(lighting * base.rgb, base.a);
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Vec2, Vec4};

    #[test]
    fn light_names_map_to_slots() {
        assert_eq!(
            parse_target("pointLights[3].quadratic"),
            Some(UniformTarget::Point(3, LightField::Quadratic))
        );
        assert_eq!(
            parse_target("directionalLight.bActive"),
            Some(UniformTarget::Directional(LightField::Active))
        );
        assert_eq!(
            parse_target("material.shininess"),
            Some(UniformTarget::Material(MaterialField::Shininess))
        );
        assert_eq!(parse_target("pointLights[4].position"), None);
        assert_eq!(parse_target("pointLights[x].position"), None);
        assert_eq!(parse_target("material.glow"), None);
        assert_eq!(parse_target("fogColor"), None);
    }

    #[test]
    fn pushes_land_in_gpu_layout() {
        let mut staging = UniformStaging::default();
        assert!(staging.set("pointLights[1].position", UniformValue::Vec3(Vec3::new(1.0, 2.0, 3.0))));
        assert!(staging.set("pointLights[1].bActive", UniformValue::Bool(true)));
        assert!(staging.set("pointLights[1].linear", UniformValue::Float(0.09)));
        assert!(staging.set("bUseLighting", UniformValue::Bool(true)));
        assert!(staging.set("UVscale", UniformValue::Vec2(Vec2::new(2.0, 3.0))));
        assert!(staging.set("objectTexture", UniformValue::Int(4)));

        assert_eq!(staging.global.points[1].position, [1.0, 2.0, 3.0, 1.0]);
        assert_eq!(staging.global.points[1].attenuation[1], 0.09);
        assert_eq!(staging.global.view_position[3], 1.0);
        assert_eq!(staging.object.uniform.flags, [0.0, 2.0, 3.0, 0.0]);
        assert_eq!(staging.object.texture_slot, 4);
    }

    #[test]
    fn mismatched_values_are_ignored() {
        let mut staging = UniformStaging::default();
        let before = staging.clone();
        assert!(!staging.set("model", UniformValue::Vec3(Vec3::ONE)));
        assert!(!staging.set("material.shininess", UniformValue::Bool(true)));
        assert!(!staging.set("unknown", UniformValue::Float(1.0)));
        assert_eq!(staging, before);
    }

    #[test]
    fn model_push_updates_normal_matrix() {
        let mut staging = UniformStaging::default();
        let model = Mat4::from_scale(Vec3::new(2.0, 1.0, 1.0));
        staging.set("model", UniformValue::Mat4(model));
        assert_eq!(staging.object.uniform.normal[0][0], 0.5);
        assert_eq!(staging.object.uniform.model, model.to_cols_array_2d());
    }

    #[test]
    fn object_state_persists_between_pushes() {
        let mut staging = UniformStaging::default();
        staging.set("bUseTexture", UniformValue::Bool(true));
        staging.set("objectColor", UniformValue::Vec4(Vec4::new(0.1, 0.2, 0.3, 1.0)));
        assert!(staging.object.uses_texture());
        assert_eq!(staging.object.uniform.color, [0.1, 0.2, 0.3, 1.0]);
    }
}
