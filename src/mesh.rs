/// Primitive shapes the mesh library can upload and draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Shape {
    Plane,
    Box,
    Cylinder,
    TaperedCylinder,
    Cone,
    Torus,
    Prism,
    Sphere,
}

impl Shape {
    pub const ALL: [Shape; 8] = [
        Shape::Plane,
        Shape::Box,
        Shape::Cylinder,
        Shape::TaperedCylinder,
        Shape::Cone,
        Shape::Torus,
        Shape::Prism,
        Shape::Sphere,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Shape::Plane => "plane",
            Shape::Box => "box",
            Shape::Cylinder => "cylinder",
            Shape::TaperedCylinder => "tapered-cylinder",
            Shape::Cone => "cone",
            Shape::Torus => "torus",
            Shape::Prism => "prism",
            Shape::Sphere => "sphere",
        }
    }
}

/// Which parts of a capped shape a draw covers. Shapes without caps ignore it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Faces {
    pub top: bool,
    pub bottom: bool,
    pub sides: bool,
}

impl Faces {
    pub const ALL: Faces = Faces {
        top: true,
        bottom: true,
        sides: true,
    };

    pub const fn new(top: bool, bottom: bool, sides: bool) -> Self {
        Self { top, bottom, sides }
    }
}

impl Default for Faces {
    fn default() -> Self {
        Self::ALL
    }
}

/// Mesh boundary: one upload per shape kind, then any number of draws using
/// whatever shading state is current.
pub trait MeshLibrary {
    fn load_mesh(&mut self, shape: Shape);
    fn draw_mesh(&mut self, shape: Shape, faces: Faces);
}
