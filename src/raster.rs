//! Edge-table scanline conversion of convex screen-space polygons.
//!
//! Pixel centers sit at `+0.5`. An edge covers the rows whose centers lie in
//! `[y_top, y_bottom)`, a span covers `[floor(xl + 0.5), floor(xr + 0.5))`, so
//! polygons sharing an edge never both draw the same pixel. `1/w` is stepped
//! linearly along edges and spans, which keeps depth perspective-correct.

use crate::error::RasterFault;
use crate::math::IRect;
use crate::polygon::{Polygon, Vertex2D};

/// Anything the scanline converter can write into: a tile or a whole frame.
///
/// Coordinates are absolute pixel positions; `bounds` is the writable region.
/// Depth values are `1/w` where larger is nearer and `0.0` means no surface.
pub trait PixelTarget {
    fn bounds(&self) -> IRect;

    /// Stores `w` and returns the buffer index if it is nearer than what the
    /// pixel holds.
    fn test_depth(&mut self, x: i32, y: i32, w: f32) -> Option<usize>;

    /// Stores `w` unconditionally.
    fn set_depth(&mut self, x: i32, y: i32, w: f32) -> usize;

    fn write_color(&mut self, index: usize, color: u32);
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Edge {
    pub start_row: i32,
    /// First row no longer covered.
    pub end_row: i32,
    pub x: f32,
    pub dx: f32,
    pub w: f32,
    pub dw: f32,
}

impl Edge {
    /// Edge between two vertices in either order; `None` when it covers no
    /// pixel center (horizontal or shorter than a row).
    pub fn new(a: &Vertex2D, b: &Vertex2D) -> Option<Edge> {
        let (top, bottom) = if a.pos.y <= b.pos.y { (a, b) } else { (b, a) };

        let start_row = (top.pos.y - 0.5).ceil() as i32;
        let end_row = (bottom.pos.y - 0.5).ceil() as i32;
        if start_row >= end_row {
            return None;
        }

        let height = bottom.pos.y - top.pos.y;
        let dx = (bottom.pos.x - top.pos.x) / height;
        let dw = (bottom.w - top.w) / height;
        let prestep = start_row as f32 + 0.5 - top.pos.y;

        Some(Edge {
            start_row,
            end_row,
            x: top.pos.x + dx * prestep,
            dx,
            w: top.w + dw * prestep,
            dw,
        })
    }

    fn step(&mut self) {
        self.x += self.dx;
        self.w += self.dw;
    }
}

/// One row of a polygon between its left and right edge.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Span {
    pub y: i32,
    pub xl: f32,
    pub wl: f32,
    pub xr: f32,
    pub wr: f32,
}

impl Span {
    /// First covered pixel column.
    pub fn start(&self) -> i32 {
        (self.xl + 0.5).floor() as i32
    }

    /// First pixel column past the span.
    pub fn end(&self) -> i32 {
        (self.xr + 0.5).floor() as i32
    }

    /// `1/w` step per pixel.
    pub fn dw(&self) -> f32 {
        let width = self.xr - self.xl;
        if width > 0.0 {
            (self.wr - self.wl) / width
        } else {
            0.0
        }
    }

    /// `1/w` at the center of pixel column `x`.
    pub fn w_at(&self, x: i32) -> f32 {
        self.wl + self.dw() * (x as f32 + 0.5 - self.xl)
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RasterStats {
    pub pixels_drawn: u32,
    pub pixels_failed_z_test: u32,
}

/// Scanline converter with reusable edge and span tables.
#[derive(Default)]
pub struct ScanlineRasterizer {
    edges: Vec<Edge>,
    spans: Vec<Span>,
}

impl ScanlineRasterizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks that `polygon` can be scan converted, without drawing.
    pub fn validate(&mut self, polygon: &Polygon<Vertex2D>) -> Result<(), RasterFault> {
        self.build_spans(polygon, i32::MIN, i32::MAX)
    }

    /// Fills `polygon` into `target` with its own color.
    ///
    /// Nothing is written when the polygon is rejected. With `depth_test`
    /// off every covered pixel is overwritten (painter's order).
    pub fn rasterize<T: PixelTarget>(
        &mut self,
        polygon: &Polygon<Vertex2D>,
        target: &mut T,
        depth_test: bool,
    ) -> Result<RasterStats, RasterFault> {
        let bounds = target.bounds();
        self.build_spans(polygon, bounds.min.y, bounds.max.y)?;

        let color = polygon.color;
        let mut stats = RasterStats::default();

        for span in &self.spans {
            let x0 = span.start().max(bounds.min.x);
            let x1 = span.end().min(bounds.max.x);
            if x0 >= x1 {
                continue;
            }

            let dw = span.dw();
            let mut w = span.w_at(x0);
            for x in x0..x1 {
                let index = if depth_test {
                    target.test_depth(x, span.y, w)
                } else {
                    Some(target.set_depth(x, span.y, w))
                };

                match index {
                    Some(index) => {
                        target.write_color(index, color);
                        stats.pixels_drawn += 1;
                    }
                    None => stats.pixels_failed_z_test += 1,
                }
                w += dw;
            }
        }

        Ok(stats)
    }

    /// Builds the edge table and sweeps it, recording the spans of rows in
    /// `[row_min, row_max)`. Every row is checked for exactly two active
    /// edges, including the ones that are not recorded.
    fn build_spans(
        &mut self,
        polygon: &Polygon<Vertex2D>,
        row_min: i32,
        row_max: i32,
    ) -> Result<(), RasterFault> {
        self.edges.clear();
        self.spans.clear();

        if !polygon.is_alive() {
            return Err(RasterFault::TooFewVertices { count: polygon.len() });
        }

        self.edges.extend(polygon.edges().filter_map(|(a, b)| Edge::new(a, b)));
        if self.edges.is_empty() {
            return Ok(());
        }
        self.edges.sort_unstable_by_key(|e| e.start_row);

        let first_row = self.edges[0].start_row;
        let last_row = self.edges.iter().map(|e| e.end_row).max().unwrap_or(first_row);

        let mut active: [Option<Edge>; 2] = [None, None];
        let mut next_edge = 0;

        for y in first_row..last_row {
            for slot in active.iter_mut() {
                if slot.is_some_and(|e| e.end_row <= y) {
                    *slot = None;
                }
            }

            while next_edge < self.edges.len() && self.edges[next_edge].start_row == y {
                let edge = self.edges[next_edge];
                next_edge += 1;
                match active.iter_mut().find(|slot| slot.is_none()) {
                    Some(slot) => *slot = Some(edge),
                    None => return Err(RasterFault::TooManyEdges { row: y }),
                }
            }

            let [Some(a), Some(b)] = &mut active else {
                return Err(RasterFault::MissingEdge { row: y });
            };

            if y >= row_min && y < row_max {
                let (left, right) = if a.x <= b.x { (&*a, &*b) } else { (&*b, &*a) };
                self.spans.push(Span {
                    y,
                    xl: left.x,
                    wl: left.w,
                    xr: right.x,
                    wr: right.w,
                });
            }

            a.step();
            b.step();
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    /// Full-size test target with a plain depth buffer.
    struct Canvas {
        width: i32,
        height: i32,
        color: Vec<u32>,
        depth: Vec<f32>,
    }

    impl Canvas {
        fn new(width: i32, height: i32) -> Canvas {
            let n = (width * height) as usize;
            Canvas { width, height, color: vec![0; n], depth: vec![0.0; n] }
        }

        fn at(&self, x: i32, y: i32) -> u32 {
            self.color[(y * self.width + x) as usize]
        }

        fn covered(&self) -> usize {
            self.color.iter().filter(|&&c| c != 0).count()
        }
    }

    impl PixelTarget for Canvas {
        fn bounds(&self) -> IRect {
            IRect::new(0, 0, self.width, self.height)
        }

        fn test_depth(&mut self, x: i32, y: i32, w: f32) -> Option<usize> {
            let index = (y * self.width + x) as usize;
            if w > self.depth[index] {
                self.depth[index] = w;
                Some(index)
            } else {
                None
            }
        }

        fn set_depth(&mut self, x: i32, y: i32, w: f32) -> usize {
            let index = (y * self.width + x) as usize;
            self.depth[index] = w;
            index
        }

        fn write_color(&mut self, index: usize, color: u32) {
            self.color[index] = color;
        }
    }

    fn quad(x0: f32, y0: f32, x1: f32, y1: f32, w: f32, color: u32) -> Polygon<Vertex2D> {
        Polygon::from_vertices(
            [
                Vertex2D::new(x0, y0, w),
                Vertex2D::new(x1, y0, w),
                Vertex2D::new(x1, y1, w),
                Vertex2D::new(x0, y1, w),
            ],
            color,
        )
    }

    #[test]
    fn test_span_interpolates_one_over_w() {
        let span = Span { y: 0, xl: 0.0, wl: 0.5, xr: 4.0, wr: 0.25 };
        assert_eq!((span.start(), span.end()), (0, 4));
        let expected = [0.46875, 0.40625, 0.34375, 0.28125];
        for (x, e) in expected.iter().enumerate() {
            assert_abs_diff_eq!(span.w_at(x as i32), *e, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_span_rounding() {
        let span = Span { y: 0, xl: 2.4, wl: 1.0, xr: 5.6, wr: 1.0 };
        assert_eq!((span.start(), span.end()), (2, 6));
        let span = Span { y: 0, xl: 2.6, wl: 1.0, xr: 5.4, wr: 1.0 };
        assert_eq!((span.start(), span.end()), (3, 5));
    }

    #[test]
    fn test_edge_prestep() {
        let edge = Edge::new(&Vertex2D::new(0.0, 0.2, 1.0), &Vertex2D::new(4.0, 4.2, 2.0)).unwrap();
        assert_eq!((edge.start_row, edge.end_row), (0, 4));
        assert_abs_diff_eq!(edge.x, 0.3, epsilon = 1e-6);
        assert_abs_diff_eq!(edge.dx, 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(edge.w, 1.075, epsilon = 1e-6);

        // between two pixel centers
        assert!(Edge::new(&Vertex2D::new(0.0, 1.6, 1.0), &Vertex2D::new(5.0, 2.4, 1.0)).is_none());
        assert!(Edge::new(&Vertex2D::new(0.0, 3.0, 1.0), &Vertex2D::new(5.0, 3.0, 1.0)).is_none());
    }

    #[test]
    fn test_axis_aligned_square_exact_coverage() {
        let mut canvas = Canvas::new(16, 16);
        let mut raster = ScanlineRasterizer::new();
        let stats = raster.rasterize(&quad(2.0, 3.0, 6.0, 8.0, 1.0, 9), &mut canvas, true).unwrap();

        assert_eq!(stats.pixels_drawn, 20);
        assert_eq!(canvas.covered(), 20);
        assert_eq!(canvas.at(2, 3), 9);
        assert_eq!(canvas.at(5, 7), 9);
        assert_eq!(canvas.at(6, 7), 0);
        assert_eq!(canvas.at(5, 8), 0);
        assert_eq!(canvas.at(1, 3), 0);
    }

    #[test]
    fn test_shared_edge_is_drawn_once() {
        let mut canvas = Canvas::new(16, 16);
        let mut raster = ScanlineRasterizer::new();
        let left = Polygon::from_vertices(
            [Vertex2D::new(1.0, 1.0, 1.0), Vertex2D::new(13.0, 1.0, 1.0), Vertex2D::new(1.0, 11.0, 1.0)],
            1,
        );
        let right = Polygon::from_vertices(
            [Vertex2D::new(13.0, 1.0, 1.0), Vertex2D::new(13.0, 11.0, 1.0), Vertex2D::new(1.0, 11.0, 1.0)],
            2,
        );
        let a = raster.rasterize(&left, &mut canvas, false).unwrap();
        let b = raster.rasterize(&right, &mut canvas, false).unwrap();
        assert_eq!(a.pixels_drawn + b.pixels_drawn, 120);
        assert_eq!(canvas.covered(), 120);
    }

    #[test]
    fn test_depth_test_keeps_nearest_in_any_order() {
        let near = quad(0.0, 0.0, 8.0, 8.0, 0.5, 1);
        let far = quad(4.0, 4.0, 12.0, 12.0, 0.25, 2);

        let mut raster = ScanlineRasterizer::new();
        let mut first = Canvas::new(16, 16);
        raster.rasterize(&near, &mut first, true).unwrap();
        let stats = raster.rasterize(&far, &mut first, true).unwrap();
        assert_eq!(stats.pixels_failed_z_test, 16);

        let mut second = Canvas::new(16, 16);
        raster.rasterize(&far, &mut second, true).unwrap();
        raster.rasterize(&near, &mut second, true).unwrap();

        assert_eq!(first.color, second.color);
        assert_eq!(first.at(5, 5), 1);
        assert_eq!(first.at(10, 10), 2);
    }

    #[test]
    fn test_clamps_to_target_bounds() {
        let mut canvas = Canvas::new(8, 8);
        let mut raster = ScanlineRasterizer::new();
        let stats = raster.rasterize(&quad(-4.0, -4.0, 20.0, 20.0, 1.0, 3), &mut canvas, true).unwrap();
        assert_eq!(stats.pixels_drawn, 64);
    }

    #[test]
    fn test_non_convex_is_rejected_untouched() {
        // arrow head: the notch puts four edges on the top rows
        let arrow = Polygon::from_vertices(
            [
                Vertex2D::new(0.0, 0.0, 1.0),
                Vertex2D::new(8.0, 8.0, 1.0),
                Vertex2D::new(16.0, 0.0, 1.0),
                Vertex2D::new(8.0, 16.0, 1.0),
            ],
            4,
        );
        let mut canvas = Canvas::new(16, 16);
        let mut raster = ScanlineRasterizer::new();
        let fault = raster.rasterize(&arrow, &mut canvas, true).unwrap_err();
        assert!(matches!(fault, RasterFault::TooManyEdges { .. }));
        assert_eq!(canvas.covered(), 0);
    }

    #[test]
    fn test_too_few_vertices() {
        let line = Polygon::from_vertices([Vertex2D::new(0.0, 0.0, 1.0), Vertex2D::new(5.0, 5.0, 1.0)], 0);
        let mut raster = ScanlineRasterizer::new();
        assert_eq!(raster.validate(&line), Err(RasterFault::TooFewVertices { count: 2 }));
    }

    #[test]
    fn test_tiny_polygon_draws_nothing() {
        let speck = quad(3.1, 3.1, 3.2, 3.2, 1.0, 5);
        let mut canvas = Canvas::new(8, 8);
        let mut raster = ScanlineRasterizer::new();
        let stats = raster.rasterize(&speck, &mut canvas, true).unwrap();
        assert_eq!(stats, RasterStats::default());
    }
}
