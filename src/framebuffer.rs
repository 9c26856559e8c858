use crate::math::IRect;
use crate::raster::PixelTarget;

/// Caller-owned render target: row-major `0xAARRGGBB` colors plus a
/// full-frame depth buffer holding `1/w` (larger is nearer, `0.0` is empty).
pub struct FrameBuffer {
    width: usize,
    height: usize,
    color_buffer: Vec<u32>,
    depth_buffer: Vec<f32>,
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> FrameBuffer {
        FrameBuffer {
            width,
            height,
            color_buffer: vec![0; width * height],
            depth_buffer: vec![0.0; width * height],
        }
    }

    /// Reallocates for a new size; contents are cleared to zero.
    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.color_buffer.clear();
        self.color_buffer.resize(width * height, 0);
        self.depth_buffer.clear();
        self.depth_buffer.resize(width * height, 0.0);
    }

    pub fn clear(&mut self, color: u32) {
        self.color_buffer.fill(color);
        self.depth_buffer.fill(0.0);
    }

    pub fn get_width(&self) -> usize { self.width }

    pub fn get_height(&self) -> usize { self.height }

    pub fn get_color_buffer(&self) -> &[u32] { &self.color_buffer }

    pub fn get_depth_buffer(&self) -> &[f32] { &self.depth_buffer }

    pub fn get_depth_buffer_mut(&mut self) -> &mut [f32] { &mut self.depth_buffer }

    /// Both buffers at once, for writers that test depth and store color.
    pub fn buffers_mut(&mut self) -> (&mut [u32], &mut [f32]) {
        (&mut self.color_buffer, &mut self.depth_buffer)
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.color_buffer[y * self.width + x])
    }

    /// Writes a color without touching depth; off-screen writes are ignored.
    pub fn set_pixel(&mut self, x: i32, y: i32, color: u32) {
        if x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height {
            self.color_buffer[y as usize * self.width + x as usize] = color;
        }
    }

    pub fn depth(&self, x: usize, y: usize) -> Option<f32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.depth_buffer[y * self.width + x])
    }
}

impl PixelTarget for FrameBuffer {
    fn bounds(&self) -> IRect {
        IRect::new(0, 0, self.width as i32, self.height as i32)
    }

    #[inline]
    fn test_depth(&mut self, x: i32, y: i32, w: f32) -> Option<usize> {
        let index = y as usize * self.width + x as usize;
        if w > self.depth_buffer[index] {
            self.depth_buffer[index] = w;
            Some(index)
        } else {
            None
        }
    }

    #[inline]
    fn set_depth(&mut self, x: i32, y: i32, w: f32) -> usize {
        let index = y as usize * self.width + x as usize;
        self.depth_buffer[index] = w;
        index
    }

    #[inline]
    fn write_color(&mut self, index: usize, color: u32) {
        self.color_buffer[index] = color;
    }
}
