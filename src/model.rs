use glam::{vec3, Mat4, Vec3};
use crate::color::Color;

/// A single renderable surface: a closed, planar, convex loop of world-space
/// points, counter-clockwise when seen from the front.
#[derive(Debug, Clone, PartialEq)]
pub struct Face {
    pub points: Vec<Vec3>,
    pub color: u32,
}

impl Face {
    pub fn new(points: Vec<Vec3>, color: u32) -> Face {
        Face { points, color }
    }
}

#[derive(Debug, Clone)]
pub struct ModelFace {
    pub indices: Vec<u32>,
    pub color: u32,
}

/// Indexed polygon mesh in object space.
#[derive(Debug, Clone, Default)]
pub struct Model {
    pub vertices: Vec<Vec3>,
    pub faces: Vec<ModelFace>,
}

impl Model {
    /// Axis-aligned cube centred on the origin. Faces are ordered
    /// +X, -X, +Y, -Y, +Z, -Z and get one palette color each.
    pub fn cube(size: f32) -> Model {
        let h = size * 0.5;
        let vertices = vec![
            vec3(-h, -h, -h),
            vec3(h, -h, -h),
            vec3(h, h, -h),
            vec3(-h, h, -h),
            vec3(-h, -h, h),
            vec3(h, -h, h),
            vec3(h, h, h),
            vec3(-h, h, h),
        ];

        let quads: [[u32; 4]; 6] = [
            [1, 2, 6, 5],
            [0, 4, 7, 3],
            [3, 7, 6, 2],
            [0, 1, 5, 4],
            [4, 5, 6, 7],
            [0, 3, 2, 1],
        ];

        let faces = quads
            .iter()
            .enumerate()
            .map(|(i, quad)| ModelFace {
                indices: quad.to_vec(),
                color: Color::from_id(i as u32).to_u32(),
            })
            .collect();

        Model { vertices, faces }
    }

    /// Square-based pyramid centred on the origin with its apex up +Y. The
    /// base comes first, then the -Z, +X, +Z and -X sides.
    pub fn pyramid(size: f32) -> Model {
        let h = size * 0.5;
        let vertices = vec![
            vec3(-h, -h, -h),
            vec3(h, -h, -h),
            vec3(h, -h, h),
            vec3(-h, -h, h),
            vec3(0.0, h, 0.0),
        ];

        let faces = [
            vec![0, 1, 2, 3],
            vec![1, 0, 4],
            vec![2, 1, 4],
            vec![3, 2, 4],
            vec![0, 3, 4],
        ]
        .into_iter()
        .enumerate()
        .map(|(i, indices)| ModelFace {
            indices,
            color: Color::from_id(i as u32).to_u32(),
        })
        .collect();

        Model { vertices, faces }
    }

    pub fn with_color(mut self, color: u32) -> Model {
        for face in &mut self.faces {
            face.color = color;
        }
        self
    }

    /// World-space faces under `world`. Indices outside the vertex list are
    /// skipped.
    pub fn faces<'a>(&'a self, world: &'a Mat4) -> impl Iterator<Item = Face> + 'a {
        self.faces.iter().map(move |face| {
            let points = face
                .indices
                .iter()
                .filter_map(|&i| self.vertices.get(i as usize))
                .map(|&p| world.transform_point3(p))
                .collect();
            Face::new(points, face.color)
        })
    }
}
