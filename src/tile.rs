use crate::math::IRect;
use crate::raster::PixelTarget;

/// Tile-sized scratch depth and color buffers.
///
/// One `Tile` is reused for every tile a worker visits: `reset` moves it to
/// the next rectangle and `flush` copies the covered pixels out.
pub struct Tile {
    rect: IRect,
    stride: usize,
    depth: Box<[f32]>,
    color: Box<[u32]>,
}

impl Tile {
    pub fn new(tile_width: usize, tile_height: usize) -> Tile {
        let capacity = tile_width * tile_height;
        Tile {
            rect: IRect::new(0, 0, tile_width as i32, tile_height as i32),
            stride: tile_width,
            depth: vec![0.0; capacity].into_boxed_slice(),
            color: vec![0; capacity].into_boxed_slice(),
        }
    }

    /// Moves the tile to `rect` and marks every pixel as empty.
    pub fn reset(&mut self, rect: IRect) {
        debug_assert!(rect.width() as usize <= self.stride);
        debug_assert!(rect.width() as usize * rect.height() as usize <= self.depth.len());
        self.rect = rect;
        self.depth.fill(0.0);
    }

    pub fn rect(&self) -> IRect { self.rect }

    #[inline]
    fn local_index(&self, x: i32, y: i32) -> usize {
        debug_assert!(self.rect.contains(x, y));
        (y - self.rect.min.y) as usize * self.stride + (x - self.rect.min.x) as usize
    }

    /// Depth stored for an absolute pixel, `None` outside the tile.
    pub fn depth_at(&self, x: i32, y: i32) -> Option<f32> {
        self.rect.contains(x, y).then(|| self.depth[self.local_index(x, y)])
    }

    /// Copies every pixel that received a surface into a horizontal band of
    /// the frame. `band_y` is the frame row of the band's first line and
    /// `frame_width` its stride. Returns the number of pixels copied.
    pub fn flush(&self, color: &mut [u32], depth: &mut [f32], frame_width: usize, band_y: i32) -> usize {
        let mut copied = 0;
        let width = self.rect.width() as usize;

        for y in self.rect.min.y..self.rect.max.y {
            let src = (y - self.rect.min.y) as usize * self.stride;
            let dst = (y - band_y) as usize * frame_width + self.rect.min.x as usize;

            let src_depth = &self.depth[src..src + width];
            let src_color = &self.color[src..src + width];
            let dst_depth = &mut depth[dst..dst + width];
            let dst_color = &mut color[dst..dst + width];

            for i in 0..width {
                if src_depth[i] > 0.0 {
                    dst_depth[i] = src_depth[i];
                    dst_color[i] = src_color[i];
                    copied += 1;
                }
            }
        }

        copied
    }
}

impl PixelTarget for Tile {
    fn bounds(&self) -> IRect { self.rect }

    #[inline]
    fn test_depth(&mut self, x: i32, y: i32, w: f32) -> Option<usize> {
        let index = self.local_index(x, y);
        if w > self.depth[index] {
            self.depth[index] = w;
            Some(index)
        } else {
            None
        }
    }

    #[inline]
    fn set_depth(&mut self, x: i32, y: i32, w: f32) -> usize {
        let index = self.local_index(x, y);
        self.depth[index] = w;
        index
    }

    #[inline]
    fn write_color(&mut self, index: usize, color: u32) {
        self.color[index] = color;
    }
}
