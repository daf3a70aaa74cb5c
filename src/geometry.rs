use std::f32::consts::TAU;
use std::ops::Range;

use glam::{Vec2, Vec3};

use crate::mesh::{Faces, Shape};

/// Interleaved layout: `position.xyz`, `normal.xyz`, `uv.xy`.
pub const FLOATS_PER_VERTEX: usize = 8;

const SEGMENTS: u32 = 36;
const TORUS_RING_SEGMENTS: u32 = 48;
const TORUS_TUBE_SEGMENTS: u32 = 16;
const TORUS_TUBE_RADIUS: f32 = 0.2;
const SPHERE_STACKS: u32 = 18;
const TAPERED_TOP_RADIUS: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshSection {
    Sides,
    Top,
    Bottom,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionRange {
    pub section: MeshSection,
    pub indices: Range<u32>,
}

/// CPU-side geometry for one primitive shape.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MeshData {
    pub vertices: Vec<f32>,
    pub indices: Vec<u32>,
    /// Index ranges of capped shapes; empty for shapes drawn as one piece.
    pub sections: Vec<SectionRange>,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / FLOATS_PER_VERTEX
    }

    /// Index ranges to draw for the requested faces.
    pub fn draw_ranges(&self, faces: Faces) -> Vec<Range<u32>> {
        if self.sections.is_empty() {
            return vec![0..self.indices.len() as u32];
        }
        self.sections
            .iter()
            .filter(|range| match range.section {
                MeshSection::Sides => faces.sides,
                MeshSection::Top => faces.top,
                MeshSection::Bottom => faces.bottom,
            })
            .map(|range| range.indices.clone())
            .collect()
    }
}

/// Generates the unit-sized geometry for `shape`.
///
/// Plane: 2x2 in XZ at y = 0. Box and prism: unit extents centred on the
/// origin. Cylinder, tapered cylinder and cone: radius 1, base at y = 0,
/// height 1. Torus: ring radius 1 in the XY plane. Sphere: radius 1.
pub fn build(shape: Shape) -> MeshData {
    let mut builder = MeshBuilder::default();
    match shape {
        Shape::Plane => {
            builder.quad_facing(Vec3::ZERO, Vec3::X, Vec3::NEG_Z, 1.0);
        }
        Shape::Box => {
            for (normal, u, v) in [
                (Vec3::X, Vec3::NEG_Z, Vec3::Y),
                (Vec3::NEG_X, Vec3::Z, Vec3::Y),
                (Vec3::Y, Vec3::X, Vec3::NEG_Z),
                (Vec3::NEG_Y, Vec3::X, Vec3::Z),
                (Vec3::Z, Vec3::X, Vec3::Y),
                (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
            ] {
                builder.quad_facing(normal * 0.5, u, v, 0.5);
            }
        }
        Shape::Cylinder => builder.frustum(1.0, 1.0),
        Shape::TaperedCylinder => builder.frustum(1.0, TAPERED_TOP_RADIUS),
        Shape::Cone => builder.frustum(1.0, 0.0),
        Shape::Torus => builder.torus(1.0, TORUS_TUBE_RADIUS),
        Shape::Prism => builder.prism(),
        Shape::Sphere => builder.sphere(),
    }
    builder.finish()
}

#[derive(Default)]
struct MeshBuilder {
    vertices: Vec<f32>,
    indices: Vec<u32>,
    sections: Vec<SectionRange>,
    open_section: Option<(MeshSection, u32)>,
}

impl MeshBuilder {
    fn vertex(&mut self, position: Vec3, normal: Vec3, uv: Vec2) -> u32 {
        let index = (self.vertices.len() / FLOATS_PER_VERTEX) as u32;
        self.vertices.extend_from_slice(&position.to_array());
        self.vertices.extend_from_slice(&normal.to_array());
        self.vertices.extend_from_slice(&uv.to_array());
        index
    }

    fn triangle(&mut self, a: u32, b: u32, c: u32) {
        self.indices.extend_from_slice(&[a, b, c]);
    }

    fn begin_section(&mut self, section: MeshSection) {
        self.close_section();
        self.open_section = Some((section, self.indices.len() as u32));
    }

    fn close_section(&mut self) {
        if let Some((section, start)) = self.open_section.take() {
            self.sections.push(SectionRange {
                section,
                indices: start..self.indices.len() as u32,
            });
        }
    }

    /// Flat quad `a b c d`, counter-clockwise seen from the side its normal faces.
    fn quad(&mut self, corners: [Vec3; 4]) {
        let normal = (corners[1] - corners[0])
            .cross(corners[2] - corners[0])
            .normalize_or_zero();
        let uvs = [Vec2::ZERO, Vec2::X, Vec2::ONE, Vec2::Y];
        let base = self.vertex(corners[0], normal, uvs[0]);
        for (corner, uv) in corners.iter().zip(uvs).skip(1) {
            self.vertex(*corner, normal, uv);
        }
        self.triangle(base, base + 1, base + 2);
        self.triangle(base, base + 2, base + 3);
    }

    /// Square face around `centre`, facing `u x v`.
    fn quad_facing(&mut self, centre: Vec3, u: Vec3, v: Vec3, half: f32) {
        self.quad([
            centre + (-u - v) * half,
            centre + (u - v) * half,
            centre + (u + v) * half,
            centre + (-u + v) * half,
        ]);
    }

    /// Capped frustum from y = 0 to y = 1; a zero top radius makes a cone.
    fn frustum(&mut self, bottom_radius: f32, top_radius: f32) {
        let slope = bottom_radius - top_radius;
        self.begin_section(MeshSection::Sides);
        let mut ring = Vec::with_capacity(SEGMENTS as usize + 1);
        for i in 0..=SEGMENTS {
            let u = i as f32 / SEGMENTS as f32;
            let (sin, cos) = (u * TAU).sin_cos();
            let normal = Vec3::new(cos, slope, sin).normalize();
            let bottom = self.vertex(
                Vec3::new(cos * bottom_radius, 0.0, sin * bottom_radius),
                normal,
                Vec2::new(u, 0.0),
            );
            let top = self.vertex(
                Vec3::new(cos * top_radius, 1.0, sin * top_radius),
                normal,
                Vec2::new(u, 1.0),
            );
            ring.push((bottom, top));
        }
        for pair in ring.windows(2) {
            let ((b0, t0), (b1, t1)) = (pair[0], pair[1]);
            self.triangle(b0, t0, b1);
            if top_radius > 0.0 {
                self.triangle(b1, t0, t1);
            }
        }

        if top_radius > 0.0 {
            self.begin_section(MeshSection::Top);
            self.cap(1.0, top_radius, Vec3::Y);
        }
        self.begin_section(MeshSection::Bottom);
        self.cap(0.0, bottom_radius, Vec3::NEG_Y);
        self.close_section();
    }

    fn cap(&mut self, y: f32, radius: f32, normal: Vec3) {
        let centre = self.vertex(Vec3::new(0.0, y, 0.0), normal, Vec2::splat(0.5));
        let first = centre + 1;
        for i in 0..=SEGMENTS {
            let (sin, cos) = (i as f32 / SEGMENTS as f32 * TAU).sin_cos();
            self.vertex(
                Vec3::new(cos * radius, y, sin * radius),
                normal,
                Vec2::new(0.5 + cos * 0.5, 0.5 + sin * 0.5),
            );
        }
        for i in 0..SEGMENTS {
            let (a, b) = (first + i, first + i + 1);
            if normal.y > 0.0 {
                self.triangle(centre, b, a);
            } else {
                self.triangle(centre, a, b);
            }
        }
    }

    fn torus(&mut self, ring_radius: f32, tube_radius: f32) {
        let columns = TORUS_TUBE_SEGMENTS + 1;
        for i in 0..=TORUS_RING_SEGMENTS {
            let u = i as f32 / TORUS_RING_SEGMENTS as f32;
            let (sin_u, cos_u) = (u * TAU).sin_cos();
            let centre = Vec3::new(cos_u, sin_u, 0.0) * ring_radius;
            for j in 0..=TORUS_TUBE_SEGMENTS {
                let v = j as f32 / TORUS_TUBE_SEGMENTS as f32;
                let (sin_v, cos_v) = (v * TAU).sin_cos();
                let normal = Vec3::new(cos_u * cos_v, sin_u * cos_v, sin_v);
                self.vertex(centre + normal * tube_radius, normal, Vec2::new(u, v));
            }
        }
        self.grid(TORUS_RING_SEGMENTS, TORUS_TUBE_SEGMENTS, columns);
    }

    fn sphere(&mut self) {
        let columns = SEGMENTS + 1;
        for stack in 0..=SPHERE_STACKS {
            let v = stack as f32 / SPHERE_STACKS as f32;
            let (sin_phi, cos_phi) = (v * std::f32::consts::PI).sin_cos();
            for slice in 0..=SEGMENTS {
                let u = slice as f32 / SEGMENTS as f32;
                let (sin_theta, cos_theta) = (u * TAU).sin_cos();
                let normal = Vec3::new(sin_phi * cos_theta, cos_phi, sin_phi * sin_theta);
                self.vertex(normal, normal, Vec2::new(u, 1.0 - v));
            }
        }
        self.grid(SPHERE_STACKS, SEGMENTS, columns);
    }

    fn grid(&mut self, rows: u32, cols: u32, stride: u32) {
        for row in 0..rows {
            for col in 0..cols {
                let a = row * stride + col;
                let b = a + stride;
                self.triangle(a, b, a + 1);
                self.triangle(a + 1, b, b + 1);
            }
        }
    }

    /// Triangular prism: isosceles cross-section in XY, extruded along Z.
    fn prism(&mut self) {
        let profile = [
            Vec2::new(-0.5, -0.5),
            Vec2::new(0.5, -0.5),
            Vec2::new(0.0, 0.5),
        ];
        let front = profile.map(|p| p.extend(0.5));
        let back = profile.map(|p| p.extend(-0.5));

        let caps = [
            ([front[0], front[1], front[2]], Vec3::Z),
            ([back[0], back[2], back[1]], Vec3::NEG_Z),
        ];
        for (corners, normal) in caps {
            let base = self.vertex(corners[0], normal, Vec2::ZERO);
            self.vertex(corners[1], normal, Vec2::X);
            self.vertex(corners[2], normal, Vec2::new(0.5, 1.0));
            self.triangle(base, base + 1, base + 2);
        }
        for edge in 0..3 {
            let next = (edge + 1) % 3;
            self.quad([front[edge], back[edge], back[next], front[next]]);
        }
    }

    fn finish(mut self) -> MeshData {
        self.close_section();
        MeshData {
            vertices: self.vertices,
            indices: self.indices,
            sections: self.sections,
        }
    }
}
