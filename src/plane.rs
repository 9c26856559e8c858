use glam::{Vec2, Vec3, Vec4};
use crate::polygon::Vertex2D;

/// Linear inside/outside test; positive or zero distance is inside.
pub trait HalfSpace<V> {
    fn distance(&self, vertex: &V) -> f32;
}

/// `normal · p + d >= 0`
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Plane {
    pub normal: Vec3,
    pub d: f32,
}

impl Plane {
    /// Plane from packed `(a, b, c, d)` coefficients, normalized so that
    /// distances are euclidean.
    pub fn new(v: Vec4) -> Plane {
        let normal = v.truncate();
        let length = normal.length();
        Plane {
            normal: normal / length,
            d: v.w / length,
        }
    }

    /// View-space near plane: keeps points with `z <= -z_near`.
    pub fn near(z_near: f32) -> Plane {
        Plane {
            normal: Vec3::NEG_Z,
            d: -z_near,
        }
    }
}

impl HalfSpace<Vec3> for Plane {
    fn distance(&self, p: &Vec3) -> f32 {
        self.normal.dot(*p) + self.d
    }
}

/// `a·x + b·y + c >= 0`
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Line {
    pub normal: Vec2,
    pub c: f32,
}

impl Line {
    pub fn new(a: f32, b: f32, c: f32) -> Line {
        Line { normal: Vec2::new(a, b), c }
    }

    /// The four lines bounding the pixel rectangle `[x0, x1] × [y0, y1]`,
    /// ordered left, right, top, bottom.
    pub fn rect_bounds(x0: f32, y0: f32, x1: f32, y1: f32) -> [Line; 4] {
        [
            Line::new(1.0, 0.0, -x0),
            Line::new(-1.0, 0.0, x1),
            Line::new(0.0, 1.0, -y0),
            Line::new(0.0, -1.0, y1),
        ]
    }

    pub fn signed_distance(&self, p: Vec2) -> f32 {
        self.normal.dot(p) + self.c
    }
}

impl HalfSpace<Vec2> for Line {
    fn distance(&self, p: &Vec2) -> f32 {
        self.signed_distance(*p)
    }
}

impl HalfSpace<Vertex2D> for Line {
    fn distance(&self, v: &Vertex2D) -> f32 {
        self.signed_distance(v.pos)
    }
}
