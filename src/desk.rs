//! The desk still life: a cup, two books, a notebook with binder rings, a
//! mechanical pencil and an eraser on a vinyl desk top.

use std::path::Path;

use glam::Vec3;

use crate::decode::ImageDecoder;
use crate::error::SceneError;
use crate::lights::{Attenuation, DirectionalLight, LightRig, PointLight};
use crate::mesh::{Faces, MeshLibrary, Shape};
use crate::registry::{MaterialDefinition, TextureDevice};
use crate::scene::{SceneGraph, SceneObject, TextureLoadReport, TextureSource};
use crate::shader::ShaderUniforms;
use crate::transform::TransformSpec;

/// Texture files expected in the texture directory, with the tag each is registered under.
pub const TEXTURE_FILES: [(&str, &str); 11] = [
    ("black_top_vinyl.jpg", "desk"),
    ("cup.jpg", "cup"),
    ("rim.jpg", "cup_rim"),
    ("french.jpg", "french"),
    ("paper.jpg", "paper"),
    ("stainless.jpg", "metal"),
    ("mech_body.jpg", "body"),
    ("point.jpg", "point"),
    ("white_eraser.jpg", "eraser"),
    ("clip.jpg", "clip"),
    ("eraser.jpg", "pink_eraser"),
];

const RING_COUNT: usize = 8;
const RING_SPACING: f32 = 0.75;

pub fn texture_manifest(dir: &Path) -> Vec<TextureSource> {
    TEXTURE_FILES
        .iter()
        .map(|(file, tag)| TextureSource::new(dir.join(file), *tag))
        .collect()
}

pub fn materials() -> Vec<MaterialDefinition> {
    vec![
        MaterialDefinition::new("book")
            .ambient(Vec3::new(0.2, 0.1, 0.05), 0.4)
            .diffuse(Vec3::new(0.6, 0.3, 0.1))
            .specular(Vec3::splat(0.3), 10.0),
        MaterialDefinition::new("desk")
            .ambient(Vec3::splat(0.25), 0.7)
            .diffuse(Vec3::ONE)
            .specular(Vec3::splat(0.9), 64.0),
        MaterialDefinition::new("cup")
            .ambient(Vec3::splat(0.1), 0.3)
            .diffuse(Vec3::splat(0.2))
            .specular(Vec3::ONE, 95.0),
        MaterialDefinition::new("notebook")
            .ambient(Vec3::splat(0.2), 0.4)
            .diffuse(Vec3::new(0.4, 0.4, 0.7))
            .specular(Vec3::new(0.3, 0.3, 0.4), 18.0),
        // No ambient term: the rings only catch direct light.
        MaterialDefinition::new("metal")
            .diffuse(Vec3::splat(0.2))
            .specular(Vec3::splat(0.7), 42.0),
        MaterialDefinition::new("mechpencil")
            .ambient(Vec3::new(0.05, 0.05, 0.15), 0.4)
            .diffuse(Vec3::new(0.1, 0.1, 0.8))
            .specular(Vec3::splat(0.4), 32.0),
        MaterialDefinition::new("eraser")
            .ambient(Vec3::new(0.3, 0.15, 0.15), 0.5)
            .diffuse(Vec3::new(1.0, 0.6, 0.6))
            .specular(Vec3::splat(0.1), 5.0),
    ]
}

/// A cool room fill from above plus a white overhead lamp and a warm side lamp.
pub fn lights() -> LightRig {
    LightRig::new()
        .with_directional(DirectionalLight {
            direction: Vec3::new(-0.2, -1.0, -0.3),
            ambient: Vec3::new(0.25, 0.22, 0.30),
            diffuse: Vec3::new(0.55, 0.50, 0.70),
            specular: Vec3::new(0.25, 0.25, 0.35),
        })
        .with_point(PointLight {
            position: Vec3::new(0.0, 7.0, 3.0),
            ambient: Vec3::splat(0.2),
            diffuse: Vec3::new(0.95, 0.95, 0.90),
            specular: Vec3::ONE,
            attenuation: Attenuation::new(1.0, 0.045, 0.015),
        })
        .with_point(PointLight {
            position: Vec3::new(-6.0, 3.5, 2.5),
            ambient: Vec3::new(0.10, 0.07, 0.05),
            diffuse: Vec3::new(0.55, 0.40, 0.25),
            specular: Vec3::new(0.25, 0.20, 0.15),
            attenuation: Attenuation::new(1.0, 0.09, 0.032),
        })
}

/// Every object of the scene in paint order.
pub fn objects() -> Vec<SceneObject> {
    let mut objects = vec![SceneObject::new(
        "desk",
        Shape::Plane,
        TransformSpec::default().scaled(Vec3::new(16.0, 0.75, 9.0)),
    )
    .textured("desk")
    .with_material("desk")];

    objects.extend(cup());
    objects.push(
        SceneObject::new(
            "french book",
            Shape::Box,
            TransformSpec::at(Vec3::new(-6.0, 0.5, 5.0)).scaled(Vec3::new(5.0, 1.0, 5.0)),
        )
        .textured("french")
        .with_material("book"),
    );
    objects.extend(notebook());
    objects.extend(mechanical_pencil());
    objects.extend(eraser());
    objects
}

fn cup() -> Vec<SceneObject> {
    vec![
        // Open at the top so the rim sits on the wall.
        SceneObject::new(
            "cup body",
            Shape::Cylinder,
            TransformSpec::at(Vec3::new(-2.5, 0.0, -1.0)).scaled(Vec3::new(1.0, 2.0, 1.0)),
        )
        .textured("cup")
        .with_material("cup")
        .with_faces(Faces::new(false, true, true)),
        SceneObject::new(
            "cup handle",
            Shape::Torus,
            TransformSpec::at(Vec3::new(-1.4, 1.0, -1.0)).scaled(Vec3::new(0.35, 0.6, 0.5)),
        )
        .textured("cup")
        .with_material("cup"),
        SceneObject::new(
            "cup rim",
            Shape::Torus,
            TransformSpec::at(Vec3::new(-2.5, 1.85, -1.0))
                .scaled(Vec3::splat(0.8))
                .rotated(-90.0, 0.0, 0.0),
        )
        .textured("cup_rim")
        .with_material("cup"),
    ]
}

fn notebook() -> Vec<SceneObject> {
    let mut objects = vec![
        SceneObject::new(
            "notebook left",
            Shape::Box,
            TransformSpec::at(Vec3::new(-0.4, 0.0, 4.0)).scaled(Vec3::new(6.0, 1.0, 6.0)),
        )
        .textured("paper")
        .with_material("notebook"),
        SceneObject::new(
            "notebook right",
            Shape::Box,
            TransformSpec::at(Vec3::new(5.5, 0.0, 4.0)).scaled(Vec3::new(6.0, 1.5, 6.0)),
        )
        .textured("paper")
        .with_material("notebook"),
    ];
    for index in 0..RING_COUNT {
        let z = 1.5 + index as f32 * RING_SPACING;
        objects.push(
            SceneObject::new(
                format!("binder ring {}", index + 1),
                Shape::Torus,
                TransformSpec::at(Vec3::new(2.6, 0.75, z))
                    .scaled(Vec3::splat(0.3))
                    .rotated(0.0, 0.0, 90.0),
            )
            .textured("metal")
            .with_material("metal"),
        );
    }
    objects
}

fn mechanical_pencil() -> Vec<SceneObject> {
    vec![
        SceneObject::new(
            "pencil body",
            Shape::Cylinder,
            TransformSpec::at(Vec3::new(7.0, 0.1, -2.0))
                .scaled(Vec3::new(0.1, 5.0, 0.1))
                .rotated(0.0, 0.0, 90.0),
        )
        .textured("body")
        .with_material("mechpencil"),
        SceneObject::new(
            "pencil tip",
            Shape::TaperedCylinder,
            TransformSpec::at(Vec3::new(2.0, 0.1, -2.0))
                .scaled(Vec3::splat(0.1))
                .rotated(0.0, 0.0, -270.0),
        )
        .textured("point")
        .with_material("mechpencil"),
        SceneObject::new(
            "pencil lead",
            Shape::Cone,
            TransformSpec::at(Vec3::new(1.9, 0.1, -2.0))
                .scaled(Vec3::splat(0.05))
                .rotated(0.0, 0.0, -270.0),
        )
        .textured("body")
        .with_material("mechpencil"),
        SceneObject::new(
            "pencil eraser",
            Shape::Cylinder,
            TransformSpec::at(Vec3::new(7.19, 0.1, -2.0))
                .scaled(Vec3::new(0.1, 0.2, 0.1))
                .rotated(0.0, 0.0, -270.0),
        )
        .textured("eraser")
        .with_material("eraser"),
        SceneObject::new(
            "pencil clip",
            Shape::Box,
            TransformSpec::at(Vec3::new(6.0, 0.2, -1.9)).scaled(Vec3::new(0.6, 0.15, 0.1)),
        )
        .textured("clip")
        .with_material("mechpencil"),
    ]
}

fn eraser() -> Vec<SceneObject> {
    let chamfer = Vec3::new(0.2625, 0.4025, 0.4025);
    vec![
        SceneObject::new(
            "eraser body",
            Shape::Box,
            TransformSpec::at(Vec3::new(11.0, 0.1, 1.0)).scaled(Vec3::new(0.7875, 0.4025, 0.4025)),
        )
        .textured("pink_eraser")
        .with_material("eraser"),
        SceneObject::new(
            "eraser left chamfer",
            Shape::Prism,
            TransformSpec::at(Vec3::new(10.61, 0.1, 1.0)).scaled(chamfer),
        )
        .textured("pink_eraser")
        .with_material("eraser"),
        SceneObject::new(
            "eraser right chamfer",
            Shape::Prism,
            TransformSpec::at(Vec3::new(11.39, 0.1, 1.0))
                .scaled(chamfer)
                .rotated(0.0, 180.0, 0.0),
        )
        .textured("pink_eraser")
        .with_material("eraser"),
    ]
}

/// Builds the desk scene and runs every setup phase against `backend`.
///
/// Textures that fail to load are listed in the report; the scene is still
/// returned ready to render.
pub fn prepare<B>(
    backend: &mut B,
    decoder: &dyn ImageDecoder,
    texture_dir: &Path,
) -> Result<(SceneGraph, TextureLoadReport), SceneError>
where
    B: ShaderUniforms + TextureDevice + MeshLibrary,
{
    let mut scene = SceneGraph::new();
    for object in objects() {
        scene.add_object(object)?;
    }
    scene.define_materials(materials())?;
    scene.setup_lights(lights(), backend)?;
    let report = scene.load_textures(&texture_manifest(texture_dir), decoder, backend)?;
    scene.load_mesh_geometry(backend)?;
    Ok((scene, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::DecodedImage;
    use crate::error::TextureError;
    use crate::recording::{BackendEvent, RecordingBackend};
    use crate::scene::{ScenePhase, Surface};
    use std::collections::HashSet;

    struct SolidDecoder;

    impl ImageDecoder for SolidDecoder {
        fn decode(&self, _path: &Path) -> Result<DecodedImage, TextureError> {
            Ok(DecodedImage::new(vec![128; 4 * 4 * 3], 4, 4, 3))
        }
    }

    #[test]
    fn every_texture_and_material_referenced_is_defined() {
        let tags: HashSet<&str> = TEXTURE_FILES.iter().map(|(_, tag)| *tag).collect();
        let materials: HashSet<String> = materials().into_iter().map(|m| m.tag).collect();
        for object in objects() {
            if let Surface::Texture(tag) = &object.surface {
                assert!(tags.contains(tag.as_str()), "{} uses {tag}", object.name);
            }
            if let Some(material) = &object.material {
                assert!(materials.contains(material), "{} uses {material}", object.name);
            }
        }
    }

    #[test]
    fn binder_rings_are_evenly_spaced() {
        let rings: Vec<SceneObject> = objects()
            .into_iter()
            .filter(|o| o.name.starts_with("binder ring"))
            .collect();
        assert_eq!(rings.len(), RING_COUNT);
        assert_eq!(rings[0].transform.translation, Vec3::new(2.6, 0.75, 1.5));
        let last = rings[RING_COUNT - 1].transform.translation.z;
        assert!((last - (1.5 + 7.0 * RING_SPACING)).abs() < 1e-5);
    }

    #[test]
    fn two_point_lights_are_active() {
        let rig = lights();
        assert!(rig.directional.is_some());
        assert_eq!(rig.active_point_lights(), 2);
    }

    #[test]
    fn prepare_reaches_ready_with_all_textures() {
        let mut backend = RecordingBackend::new();
        let (scene, report) = prepare(&mut backend, &SolidDecoder, Path::new("textures")).unwrap();

        assert_eq!(scene.phase(), ScenePhase::Ready);
        assert_eq!(report.loaded.len(), TEXTURE_FILES.len());
        assert!(report.failed.is_empty());
        assert_eq!(scene.registry().find_texture_slot("pink_eraser"), Some(10));

        let loaded: Vec<Shape> = backend
            .events()
            .iter()
            .filter_map(|event| match event {
                BackendEvent::LoadMesh(shape) => Some(*shape),
                _ => None,
            })
            .collect();
        assert_eq!(
            loaded,
            [
                Shape::Plane,
                Shape::Box,
                Shape::Cylinder,
                Shape::TaperedCylinder,
                Shape::Cone,
                Shape::Torus,
                Shape::Prism,
            ]
        );
    }

    #[test]
    fn one_frame_draws_every_object_without_misses() {
        let mut backend = RecordingBackend::new();
        let (scene, _) = prepare(&mut backend, &SolidDecoder, Path::new("textures")).unwrap();
        backend.clear();
        let stats = scene.render(&mut backend).unwrap();

        assert_eq!(stats.objects_drawn, objects().len());
        assert_eq!(stats.unresolved_textures, 0);
        assert_eq!(stats.unmatched_materials, 0);
        assert_eq!(backend.draw_count(), objects().len());
    }
}
