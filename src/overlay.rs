//! Depth-tested 3D lines drawn over a rendered frame: polygon outlines and
//! the world axes.

use glam::Vec3;
use crate::camera::Camera;
use crate::framebuffer::FrameBuffer;
use crate::plane::{HalfSpace, Plane};
use crate::raster::PixelTarget;
use crate::shapes::{clip_line, walk_line};

/// Lines lying on a surface pass the depth test against it when they are
/// within this fraction of its `1/w`.
const LINE_DEPTH_BIAS: f32 = 1e-3;

/// Positive axes in full color, negative ones darker.
pub const AXES: [(Vec3, u32); 6] = [
    (Vec3::X, 0xFFFF0000),
    (Vec3::Y, 0xFF00FF00),
    (Vec3::Z, 0xFF0000FF),
    (Vec3::NEG_X, 0xFF800000),
    (Vec3::NEG_Y, 0xFF008000),
    (Vec3::NEG_Z, 0xFF000080),
];

/// Draws the world-space segment `start → end` against the frame's depth
/// buffer and returns the number of pixels written.
///
/// The segment is cut at the near plane and at the frame edges; `1/w` is
/// interpolated linearly in screen space like it is for polygons. Accepted
/// pixels keep the nearer of the two depths.
pub fn draw_line_3d(target: &mut FrameBuffer, camera: &Camera, start: Vec3, end: Vec3, color: u32) -> u32 {
    let near = Plane::near(camera.znear());
    let (mut a, mut b) = (camera.world_to_view(start), camera.world_to_view(end));
    let (da, db) = (near.distance(&a), near.distance(&b));
    if da < 0.0 && db < 0.0 {
        return 0;
    }
    if da < 0.0 {
        a = a.lerp(b, da / (da - db));
    } else if db < 0.0 {
        b = b.lerp(a, db / (db - da));
    }

    let (Some(a), Some(b)) = (camera.view_to_screen(a), camera.view_to_screen(b)) else {
        return 0;
    };

    // pixel `i` has its center at `i + 0.5`
    let from = (a.pos - 0.5).as_dvec2();
    let to = (b.pos - 0.5).as_dvec2();
    let Some((p0, p1, (t0, t1))) = clip_line(&target.bounds(), from, to) else {
        return 0;
    };
    let w0 = a.w + (b.w - a.w) * t0 as f32;
    let w1 = a.w + (b.w - a.w) * t1 as f32;

    let width = target.get_width();
    let (colors, depths) = target.buffers_mut();
    let mut written = 0;
    walk_line(p0, p1, |p, t| {
        let index = p.y as usize * width + p.x as usize;
        let w = w0 + (w1 - w0) * t;
        let stored = depths[index];
        if w * (1.0 + LINE_DEPTH_BIAS) > stored {
            depths[index] = stored.max(w);
            colors[index] = color;
            written += 1;
        }
    });
    written
}

/// Draws the closed outline of `points`.
pub fn draw_outline(target: &mut FrameBuffer, camera: &Camera, points: &[Vec3], color: u32) -> u32 {
    let Some(&last) = points.last() else {
        return 0;
    };
    let mut previous = last;
    let mut written = 0;
    for &p in points {
        written += draw_line_3d(target, camera, previous, p, color);
        previous = p;
    }
    written
}

/// World axes of the given length through the origin.
pub fn draw_axes(target: &mut FrameBuffer, camera: &Camera, length: f32) -> u32 {
    AXES.iter()
        .map(|&(axis, color)| draw_line_3d(target, camera, Vec3::ZERO, axis * length, color))
        .sum()
}
