//! Flat 2D line art drawn straight into the color buffer, no depth.

use glam::{ivec2, vec2, DVec2, IVec2, Vec2};
use crate::framebuffer::FrameBuffer;
use crate::math::IRect;
use crate::raster::PixelTarget;

const CURVE_SEGMENTS: usize = 50;

/// Pan/zoom view onto a 2D world where `[-1, 1]` spans the screen height at
/// zoom 1. Screen Y grows downwards, as does world Y.
#[derive(Debug, Clone)]
pub struct Camera2D {
    position: Vec2,
    zoom: f32,
    width: usize,
    height: usize,
}

impl Camera2D {
    pub fn new(width: usize, height: usize) -> Camera2D {
        Camera2D {
            position: Vec2::ZERO,
            zoom: 1.0,
            width,
            height,
        }
    }

    pub fn position(&self) -> Vec2 { self.position }

    pub fn zoom(&self) -> f32 { self.zoom }

    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    /// Non-positive zoom levels are ignored.
    pub fn set_zoom(&mut self, zoom: f32) {
        if zoom > 0.0 {
            self.zoom = zoom;
        }
    }

    pub fn set_viewport(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
    }

    /// Pans by a distance given in screen pixels.
    pub fn move_by(&mut self, dx: f32, dy: f32) {
        let (w, h) = self.size();
        self.position += vec2(dx * 2.0 / w, dy * 2.0 / h) / self.zoom * vec2(self.aspect(), 1.0);
    }

    fn size(&self) -> (f32, f32) {
        (self.width.max(1) as f32, self.height.max(1) as f32)
    }

    fn aspect(&self) -> f32 {
        let (w, h) = self.size();
        w / h
    }

    pub fn world_to_screen(&self, p: Vec2) -> IVec2 {
        let (w, h) = self.size();
        let n = (p - self.position) * self.zoom / vec2(self.aspect(), 1.0);
        ivec2(
            ((n.x + 1.0) * w * 0.5).floor() as i32,
            ((n.y + 1.0) * h * 0.5).floor() as i32,
        )
    }

    /// World position of the center of pixel `p`.
    pub fn screen_to_world(&self, p: IVec2) -> Vec2 {
        let (w, h) = self.size();
        let center = p.as_vec2() + 0.5;
        let n = vec2(center.x * 2.0 / w - 1.0, center.y * 2.0 / h - 1.0);
        n * vec2(self.aspect(), 1.0) / self.zoom + self.position
    }
}

/// Placement of a shape in the world: scale, then rotate (degrees), then
/// translate.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transform2D {
    pub translation: Vec2,
    pub rotation: f32,
    pub scale: Vec2,
}

impl Default for Transform2D {
    fn default() -> Self {
        Self {
            translation: Vec2::ZERO,
            rotation: 0.0,
            scale: Vec2::ONE,
        }
    }
}

impl Transform2D {
    pub fn apply(&self, p: Vec2) -> Vec2 {
        Vec2::from_angle(self.rotation.to_radians()).rotate(p * self.scale) + self.translation
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Shape2D {
    Line { start: Vec2, end: Vec2, color: u32, thickness: f32 },
    /// Quadratic Bezier through `start` and `end`, pulled towards `control`.
    Curve { start: Vec2, control: Vec2, end: Vec2, color: u32 },
}

impl Shape2D {
    pub fn line(start: Vec2, end: Vec2, color: u32) -> Shape2D {
        Shape2D::Line { start, end, color, thickness: 1.0 }
    }

    pub fn draw(&self, target: &mut FrameBuffer, camera: &Camera2D, transform: &Transform2D) {
        match *self {
            Shape2D::Line { start, end, color, thickness } => {
                let a = camera.world_to_screen(transform.apply(start));
                let b = camera.world_to_screen(transform.apply(end));
                draw_thick_line(target, a, b, thickness, color);
            }
            Shape2D::Curve { start, control, end, color } => {
                let (start, control, end) =
                    (transform.apply(start), transform.apply(control), transform.apply(end));
                let mut last = camera.world_to_screen(start);
                for i in 1..=CURVE_SEGMENTS {
                    let t = i as f32 / CURVE_SEGMENTS as f32;
                    let u = 1.0 - t;
                    let p = start * (u * u) + control * (2.0 * u * t) + end * (t * t);
                    let next = camera.world_to_screen(p);
                    draw_line(target, last, next, color);
                    last = next;
                }
            }
        }
    }
}

/// Bresenham line including both end points, clipped to the frame first.
pub fn draw_line(target: &mut FrameBuffer, from: IVec2, to: IVec2, color: u32) {
    let Some((from, to, _)) = clip_line(&target.bounds(), from.as_dvec2(), to.as_dvec2()) else {
        return;
    };
    walk_line(from, to, |p, _| target.set_pixel(p.x, p.y, color));
}

/// Parallel Bresenham lines offset along the normal of the line.
pub fn draw_thick_line(target: &mut FrameBuffer, from: IVec2, to: IVec2, thickness: f32, color: u32) {
    let half = (thickness / 2.0) as i32;
    if half == 0 {
        draw_line(target, from, to, color);
        return;
    }

    let Some(dir) = (to.as_vec2() - from.as_vec2()).try_normalize() else {
        return;
    };
    let normal = dir.perp();

    for i in -half..=half {
        let offset = (normal * i as f32).as_ivec2();
        draw_line(target, from.saturating_add(offset), to.saturating_add(offset), color);
    }
}

/// Cuts the segment to the pixels of `bounds` and snaps the ends to pixels.
/// Also returns the parameter range `t0 ..= t1` of the segment that was kept.
pub(crate) fn clip_line(bounds: &IRect, a: DVec2, b: DVec2) -> Option<(IVec2, IVec2, (f64, f64))> {
    let (t0, t1) = bounds.clip_segment(a, b)?;
    let snap = |t: f64| (a + (b - a) * t).round().as_ivec2().clamp(bounds.min, bounds.max - 1);
    Some((snap(t0), snap(t1), (t0, t1)))
}

/// Visits every pixel of the Bresenham line `from → to`, both ends included,
/// together with how far along the line it is (`0.0` to `1.0`).
pub(crate) fn walk_line<F: FnMut(IVec2, f32)>(from: IVec2, to: IVec2, mut plot: F) {
    let dx = (to.x - from.x).abs();
    let dy = -(to.y - from.y).abs();
    let sx = if from.x < to.x { 1 } else { -1 };
    let sy = if from.y < to.y { 1 } else { -1 };
    let steps = dx.max(-dy).max(1) as f32;
    let mut err = dx + dy;
    let mut p = from;
    let mut step = 0;

    loop {
        plot(p, step as f32 / steps);

        if p == to {
            break;
        }

        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            p.x += sx;
        }
        if e2 <= dx {
            err += dx;
            p.y += sy;
        }
        step += 1;
    }
}
