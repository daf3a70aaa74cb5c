use glam::Vec3;

use crate::shader::{self, ShaderUniforms};

/// Point-light slots declared by the lighting shader.
pub const MAX_POINT_LIGHTS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub direction: Vec3,
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
}

/// Distance falloff `1 / (constant + linear * d + quadratic * d^2)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attenuation {
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
}

impl Attenuation {
    pub const fn new(constant: f32, linear: f32, quadratic: f32) -> Self {
        Self {
            constant,
            linear,
            quadratic,
        }
    }

    pub fn factor(&self, distance: f32) -> f32 {
        1.0 / (self.constant + self.linear * distance + self.quadratic * distance * distance)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub attenuation: Attenuation,
}

/// The full light configuration of a scene.
///
/// Every slot is pushed on [`LightRig::apply`], empty ones as inactive, so a
/// previous configuration can never stay lit in the shader.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LightRig {
    pub directional: Option<DirectionalLight>,
    pub points: [Option<PointLight>; MAX_POINT_LIGHTS],
}

impl LightRig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_directional(mut self, light: DirectionalLight) -> Self {
        self.directional = Some(light);
        self
    }

    /// Places `light` in the first free slot; extra lights beyond the slot count are dropped.
    pub fn with_point(mut self, light: PointLight) -> Self {
        match self.points.iter_mut().find(|slot| slot.is_none()) {
            Some(slot) => *slot = Some(light),
            None => log::warn!("all {MAX_POINT_LIGHTS} point-light slots are taken; light dropped"),
        }
        self
    }

    pub fn active_point_lights(&self) -> usize {
        self.points.iter().flatten().count()
    }

    pub fn apply(&self, shader: &mut dyn ShaderUniforms) {
        shader.set_bool(shader::USE_LIGHTING, true);

        match &self.directional {
            Some(light) => {
                shader.set_vec3("directionalLight.direction", light.direction);
                shader.set_vec3("directionalLight.ambient", light.ambient);
                shader.set_vec3("directionalLight.diffuse", light.diffuse);
                shader.set_vec3("directionalLight.specular", light.specular);
                shader.set_bool("directionalLight.bActive", true);
            }
            None => shader.set_bool("directionalLight.bActive", false),
        }

        for (index, slot) in self.points.iter().enumerate() {
            let prefix = format!("pointLights[{index}]");
            match slot {
                Some(light) => {
                    shader.set_vec3(&format!("{prefix}.position"), light.position);
                    shader.set_vec3(&format!("{prefix}.ambient"), light.ambient);
                    shader.set_vec3(&format!("{prefix}.diffuse"), light.diffuse);
                    shader.set_vec3(&format!("{prefix}.specular"), light.specular);
                    shader.set_float(&format!("{prefix}.constant"), light.attenuation.constant);
                    shader.set_float(&format!("{prefix}.linear"), light.attenuation.linear);
                    shader.set_float(&format!("{prefix}.quadratic"), light.attenuation.quadratic);
                    shader.set_bool(&format!("{prefix}.bActive"), true);
                }
                None => shader.set_bool(&format!("{prefix}.bActive"), false),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::RecordingBackend;
    use crate::shader::UniformValue;

    fn lamp(position: Vec3) -> PointLight {
        PointLight {
            position,
            ambient: Vec3::splat(0.2),
            diffuse: Vec3::splat(0.9),
            specular: Vec3::ONE,
            attenuation: Attenuation::new(1.0, 0.09, 0.032),
        }
    }

    #[test]
    fn unused_slots_are_pushed_inactive() {
        let rig = LightRig::new().with_point(lamp(Vec3::Y));
        let mut shader = RecordingBackend::new();
        rig.apply(&mut shader);

        assert_eq!(shader.last_uniform("bUseLighting"), Some(UniformValue::Bool(true)));
        assert_eq!(
            shader.last_uniform("pointLights[0].bActive"),
            Some(UniformValue::Bool(true))
        );
        for index in 1..MAX_POINT_LIGHTS {
            let name = format!("pointLights[{index}].bActive");
            assert_eq!(shader.last_uniform(&name), Some(UniformValue::Bool(false)));
            let position = format!("pointLights[{index}].position");
            assert_eq!(shader.last_uniform(&position), None);
        }
        assert_eq!(
            shader.last_uniform("directionalLight.bActive"),
            Some(UniformValue::Bool(false))
        );
    }

    #[test]
    fn reapplying_smaller_rig_deactivates_old_lights() {
        let mut shader = RecordingBackend::new();
        LightRig::new()
            .with_point(lamp(Vec3::X))
            .with_point(lamp(Vec3::Z))
            .apply(&mut shader);
        LightRig::new().with_point(lamp(Vec3::Y)).apply(&mut shader);
        assert_eq!(
            shader.last_uniform("pointLights[1].bActive"),
            Some(UniformValue::Bool(false))
        );
    }

    #[test]
    fn extra_point_lights_are_dropped() {
        let mut rig = LightRig::new();
        for index in 0..MAX_POINT_LIGHTS + 2 {
            rig = rig.with_point(lamp(Vec3::splat(index as f32)));
        }
        assert_eq!(rig.active_point_lights(), MAX_POINT_LIGHTS);
        assert_eq!(rig.points[3].unwrap().position, Vec3::splat(3.0));
    }

    #[test]
    fn attenuation_falls_off_with_distance() {
        let attenuation = Attenuation::new(1.0, 0.045, 0.015);
        assert_eq!(attenuation.factor(0.0), 1.0);
        assert!(attenuation.factor(10.0) < attenuation.factor(1.0));
    }
}
