//! Screen-space binning of projected polygons into fixed-size tiles.

use crate::math::{BoundRect, IRect};

/// Index into the frame's projected polygon list.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PolygonId(pub usize);

/// Per-tile polygon reference lists for a `width × height` raster.
///
/// Lists keep their allocation across `clear`, so a grid that lives as long
/// as the render context stops allocating after the first busy frame.
pub struct TileGrid {
    width: usize,
    height: usize,
    tile_width: usize,
    tile_height: usize,
    tiles_x: usize,
    tiles_y: usize,
    bins: Vec<Vec<PolygonId>>,
}

impl TileGrid {
    /// Tile dimensions must be non-zero.
    pub fn new(width: usize, height: usize, tile_width: usize, tile_height: usize) -> Self {
        debug_assert!(tile_width > 0 && tile_height > 0);
        let tiles_x = width.div_ceil(tile_width);
        let tiles_y = height.div_ceil(tile_height);

        Self {
            width,
            height,
            tile_width,
            tile_height,
            tiles_x,
            tiles_y,
            bins: vec![Vec::new(); tiles_x * tiles_y],
        }
    }

    pub fn clear(&mut self) {
        for bin in &mut self.bins {
            bin.clear();
        }
    }

    pub fn tiles_x(&self) -> usize { self.tiles_x }

    pub fn tiles_y(&self) -> usize { self.tiles_y }

    pub fn tile_width(&self) -> usize { self.tile_width }

    pub fn tile_height(&self) -> usize { self.tile_height }

    /// Adds `id` to every tile the bounding box touches and returns how many
    /// tiles that was. Boxes entirely off-screen are not inserted anywhere.
    pub fn insert(&mut self, id: PolygonId, bounds: &BoundRect) -> usize {
        let Some((tx0, ty0, tx1, ty1)) = self.tile_range(bounds) else {
            return 0;
        };

        for ty in ty0..=ty1 {
            for tx in tx0..=tx1 {
                self.bins[ty * self.tiles_x + tx].push(id);
            }
        }

        (tx1 - tx0 + 1) * (ty1 - ty0 + 1)
    }

    /// Inclusive tile range of the pixels the box can cover, clamped to the
    /// grid.
    ///
    /// A pixel is covered when its center is inside the box, so the first
    /// pixel is `ceil(min - 0.5)` and the last `floor(max + 0.5) - 1`. A box
    /// ending exactly on a tile edge stays out of the next tile.
    fn tile_range(&self, bounds: &BoundRect) -> Option<(usize, usize, usize, usize)> {
        if self.bins.is_empty() || bounds.is_empty() {
            return None;
        }
        let (tx0, tx1) = axis_range(bounds.min.x, bounds.max.x, self.width, self.tile_width)?;
        let (ty0, ty1) = axis_range(bounds.min.y, bounds.max.y, self.height, self.tile_height)?;
        Some((tx0, ty0, tx1, ty1))
    }

    pub fn bin(&self, tx: usize, ty: usize) -> &[PolygonId] {
        &self.bins[ty * self.tiles_x + tx]
    }

    /// Pixel rectangle covered by tile `(tx, ty)`; edge tiles are cut to the
    /// raster size.
    pub fn tile_rect(&self, tx: usize, ty: usize) -> IRect {
        let x0 = tx * self.tile_width;
        let y0 = ty * self.tile_height;
        let x1 = (x0 + self.tile_width).min(self.width);
        let y1 = (y0 + self.tile_height).min(self.height);
        IRect::new(x0 as i32, y0 as i32, x1 as i32, y1 as i32)
    }

    /// Number of occupied tile references.
    pub fn reference_count(&self) -> usize {
        self.bins.iter().map(Vec::len).sum()
    }
}

/// First and last tile along one axis, `None` when no pixel center of
/// `[0, size)` falls inside `[min, max]`.
fn axis_range(min: f32, max: f32, size: usize, tile: usize) -> Option<(usize, usize)> {
    let first = (min - 0.5).ceil();
    let last = (max + 0.5).floor() - 1.0;
    // written so that NaN bounds are rejected as well
    if !(first <= last && last >= 0.0 && first < size as f32) {
        return None;
    }
    let first = first.max(0.0) as usize;
    let last = (last as usize).min(size - 1);
    Some((first / tile, last / tile))
}
