use std::ops::AddAssign;

/// Per-frame counters, reset at the start of every `render` call.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FrameStats {
    pub faces_input: u32,
    /// Faces ignored because the frame was already at the polygon cap.
    pub faces_dropped: u32,
    pub faces_culled: u32,
    /// Faces entirely in front of the near plane or projected off-screen.
    pub faces_clipped: u32,
    pub polygons_projected: u32,
    pub tile_references: u32,
    pub tiles_drawn: u32,
    pub polygons_rasterized: u32,
    pub pixels_drawn: u32,
    pub pixels_failed_z_test: u32,
    pub raster_faults: u32,
    pub outline_pixels: u32,
}

impl FrameStats {
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Merges counters gathered by separate tile bands.
impl AddAssign for FrameStats {
    fn add_assign(&mut self, other: FrameStats) {
        self.faces_input += other.faces_input;
        self.faces_dropped += other.faces_dropped;
        self.faces_culled += other.faces_culled;
        self.faces_clipped += other.faces_clipped;
        self.polygons_projected += other.polygons_projected;
        self.tile_references += other.tile_references;
        self.tiles_drawn += other.tiles_drawn;
        self.polygons_rasterized += other.polygons_rasterized;
        self.pixels_drawn += other.pixels_drawn;
        self.pixels_failed_z_test += other.pixels_failed_z_test;
        self.raster_faults += other.raster_faults;
        self.outline_pixels += other.outline_pixels;
    }
}
