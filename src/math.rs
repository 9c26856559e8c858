use glam::{vec2, DVec2, IVec2, Vec2};

/// Pixel rectangle, `min` inclusive and `max` exclusive.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct IRect {
    pub min: IVec2,
    pub max: IVec2,
}

impl IRect {
    pub fn new(min_x: i32, min_y: i32, max_x: i32, max_y: i32) -> IRect {
        IRect {
            min: IVec2::new(min_x, min_y),
            max: IVec2::new(max_x, max_y),
        }
    }

    pub fn width(&self) -> i32 { self.max.x - self.min.x }

    pub fn height(&self) -> i32 { self.max.y - self.min.y }

    pub fn is_empty(&self) -> bool {
        self.max.x <= self.min.x || self.max.y <= self.min.y
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.min.x && x < self.max.x && y >= self.min.y && y < self.max.y
    }

    pub fn intersect(&self, other: &IRect) -> IRect {
        IRect {
            min: self.min.max(other.min),
            max: self.max.min(other.max),
        }
    }

    /// Clips the segment `a → b`, given in pixel coordinates, to the pixels
    /// of the rectangle and returns the parameter range `t0 ..= t1` that
    /// survives.
    ///
    /// Runs in `f64` so that saturated `i32` end points stay exact.
    pub fn clip_segment(&self, a: DVec2, b: DVec2) -> Option<(f64, f64)> {
        if self.is_empty() {
            return None;
        }
        let lo = self.min.as_dvec2();
        let hi = (self.max - 1).as_dvec2();
        let d = b - a;

        let mut t0 = 0.0f64;
        let mut t1 = 1.0f64;
        for (p, q) in [(-d.x, a.x - lo.x), (d.x, hi.x - a.x), (-d.y, a.y - lo.y), (d.y, hi.y - a.y)] {
            if p == 0.0 {
                // parallel to this side
                if q < 0.0 {
                    return None;
                }
                continue;
            }
            let r = q / p;
            if p < 0.0 {
                if r > t1 {
                    return None;
                }
                t0 = t0.max(r);
            } else {
                if r < t0 {
                    return None;
                }
                t1 = t1.min(r);
            }
        }
        Some((t0, t1))
    }
}

/// Axis-aligned screen-space bounding box (closed on both ends).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BoundRect {
    pub min: Vec2,
    pub max: Vec2,
}

impl BoundRect {
    pub const EMPTY: BoundRect = BoundRect {
        min: Vec2::splat(f32::MAX),
        max: Vec2::splat(f32::MIN),
    };

    pub fn new(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> BoundRect {
        BoundRect {
            min: vec2(min_x, min_y),
            max: vec2(max_x, max_y),
        }
    }

    pub fn from_points<I: IntoIterator<Item = Vec2>>(points: I) -> BoundRect {
        points.into_iter().fold(Self::EMPTY, |mut rect, p| {
            rect.extend(p);
            rect
        })
    }

    pub fn extend(&mut self, p: Vec2) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }
}

impl Default for BoundRect {
    fn default() -> Self { BoundRect::EMPTY }
}
