use glam::Vec3;
use log::{debug, trace, warn};
use rayon::prelude::*;
use crate::binner::{PolygonId, TileGrid};
use crate::camera::Camera;
use crate::clip::{clip, clip_all};
use crate::error::{PolygonFault, RasterFault, RenderError};
use crate::framebuffer::FrameBuffer;
use crate::math::BoundRect;
use crate::model::Face;
use crate::overlay::draw_outline;
use crate::plane::{Line, Plane};
use crate::polygon::{Polygon, Vertex2D};
use crate::raster::{RasterStats, ScanlineRasterizer};
use crate::stats::FrameStats;
use crate::tile::Tile;
use crate::visibility::{is_visible, sort_by_depth};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RenderMode {
    /// Binned into tiles, each resolved against its own depth buffer.
    Tiled,
    /// Rasterized straight into the frame with the full-frame depth buffer.
    ZBuffer,
    /// Sorted far to near and drawn without a depth test.
    Painter,
}

impl RenderMode {
    pub fn next(self) -> RenderMode {
        match self {
            RenderMode::Tiled => RenderMode::ZBuffer,
            RenderMode::ZBuffer => RenderMode::Painter,
            RenderMode::Painter => RenderMode::Tiled,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            RenderMode::Tiled => "tiled",
            RenderMode::ZBuffer => "z-buffer",
            RenderMode::Painter => "painter",
        }
    }
}

#[derive(Debug, Clone)]
pub struct RendererSettings {
    pub tile_width: usize,
    pub tile_height: usize,
    pub backface_culling: bool,
    /// Sort far to near before drawing. Always on in painter mode.
    pub depth_sort: bool,
    pub mode: RenderMode,
    /// Rasterize tile rows on the rayon pool.
    pub parallel_tiles: bool,
    pub clear_color: u32,
    /// Faces beyond this many per frame are dropped.
    pub max_polygons: usize,
    /// Draw the edges of every visible face in this color, depth-tested
    /// against the finished frame.
    pub outline_color: Option<u32>,
}

impl Default for RendererSettings {
    fn default() -> Self {
        Self {
            tile_width: 32,
            tile_height: 32,
            backface_culling: true,
            depth_sort: false,
            mode: RenderMode::Tiled,
            parallel_tiles: true,
            clear_color: 0xFF000000,
            max_polygons: 1 << 20,
            outline_color: None,
        }
    }
}

/// A face after view transform, near clip, projection and screen clip.
#[derive(Default)]
struct ProjectedPolygon {
    corners: Polygon<Vertex2D>,
    bounds: BoundRect,
    /// Average view-space z, used for sorting.
    depth: f32,
    /// Index of the source face.
    face: usize,
}

/// Per tile-row scratch, so that bands can be rasterized in parallel.
struct BandScratch {
    tile: Tile,
    ring: Polygon<Vertex2D>,
    raster: ScanlineRasterizer,
    stats: FrameStats,
    faults: Vec<(PolygonId, RasterFault)>,
}

impl BandScratch {
    fn new(tile_width: usize, tile_height: usize) -> Self {
        Self {
            tile: Tile::new(tile_width, tile_height),
            ring: Polygon::default(),
            raster: ScanlineRasterizer::new(),
            stats: FrameStats::default(),
            faults: Vec::new(),
        }
    }

    /// Rasterizes every non-empty tile of row `ty` and flushes it into the
    /// band's slice of the frame.
    fn draw_row(
        &mut self,
        ty: usize,
        grid: &TileGrid,
        polygons: &[ProjectedPolygon],
        color: &mut [u32],
        depth: &mut [f32],
        frame_width: usize,
    ) {
        self.stats.clear();
        self.faults.clear();
        let band_y = (ty * grid.tile_height()) as i32;

        for tx in 0..grid.tiles_x() {
            let bin = grid.bin(tx, ty);
            if bin.is_empty() {
                continue;
            }

            let rect = grid.tile_rect(tx, ty);
            self.tile.reset(rect);
            let bounds = Line::rect_bounds(
                rect.min.x as f32,
                rect.min.y as f32,
                rect.max.x as f32,
                rect.max.y as f32,
            );

            for &id in bin {
                self.ring.copy_from(&polygons[id.0].corners);
                if !clip_all(&mut self.ring, &bounds) {
                    continue;
                }
                match self.raster.rasterize(&self.ring, &mut self.tile, true) {
                    Ok(raster_stats) => add_raster_stats(&mut self.stats, raster_stats),
                    Err(fault) => self.faults.push((id, fault)),
                }
            }

            let copied = self.tile.flush(color, depth, frame_width, band_y);
            self.stats.tiles_drawn += 1;
            trace!("tile ({}, {}): {} polygons, {} pixels", tx, ty, bin.len(), copied);
        }
    }
}

fn add_raster_stats(stats: &mut FrameStats, raster_stats: RasterStats) {
    stats.polygons_rasterized += 1;
    stats.pixels_drawn += raster_stats.pixels_drawn;
    stats.pixels_failed_z_test += raster_stats.pixels_failed_z_test;
}

/// Everything a frame needs besides the scene and the target.
///
/// Owned by the caller and reused from frame to frame; none of the scratch
/// storage shrinks, so steady-state frames do not allocate.
pub struct RenderContext {
    settings: RendererSettings,
    width: usize,
    height: usize,
    grid: TileGrid,
    bands: Vec<BandScratch>,
    polygons: Vec<ProjectedPolygon>,
    live: usize,
    world: Polygon<Vec3>,
    view: Polygon<Vec3>,
    raster: ScanlineRasterizer,
    faults: Vec<PolygonFault>,
    stats: FrameStats,
}

impl RenderContext {
    pub fn new(width: usize, height: usize, settings: RendererSettings) -> Result<Self, RenderError> {
        validate_settings(&settings)?;

        let mut context = Self {
            grid: TileGrid::new(width, height, settings.tile_width, settings.tile_height),
            settings,
            width,
            height,
            bands: Vec::new(),
            polygons: Vec::new(),
            live: 0,
            world: Polygon::default(),
            view: Polygon::default(),
            raster: ScanlineRasterizer::new(),
            faults: Vec::new(),
            stats: FrameStats::default(),
        };
        context.rebuild_tiles();
        Ok(context)
    }

    pub fn settings(&self) -> &RendererSettings { &self.settings }

    /// Statistics of the last rendered frame.
    pub fn stats(&self) -> &FrameStats { &self.stats }

    pub fn viewport(&self) -> (usize, usize) { (self.width, self.height) }

    pub fn set_settings(&mut self, settings: RendererSettings) -> Result<(), RenderError> {
        validate_settings(&settings)?;
        let retile = settings.tile_width != self.settings.tile_width
            || settings.tile_height != self.settings.tile_height;
        self.settings = settings;
        if retile {
            self.rebuild_tiles();
        }
        Ok(())
    }

    pub fn set_mode(&mut self, mode: RenderMode) {
        self.settings.mode = mode;
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.rebuild_tiles();
    }

    fn rebuild_tiles(&mut self) {
        let (tile_width, tile_height) = (self.settings.tile_width, self.settings.tile_height);
        self.grid = TileGrid::new(self.width, self.height, tile_width, tile_height);
        self.bands = (0..self.grid.tiles_y())
            .map(|_| BandScratch::new(tile_width, tile_height))
            .collect();
        debug!(
            "render context {}x{}: {}x{} tiles of {}x{}",
            self.width, self.height, self.grid.tiles_x(), self.grid.tiles_y(), tile_width, tile_height
        );
    }

    /// Draws `faces` as seen from `camera` into `target`, which is cleared
    /// first. Both the target and the camera viewport must match the context
    /// viewport.
    ///
    /// Faces the rasterizer cannot handle are skipped; the frame is still
    /// complete apart from them and `RenderError::Partial` lists what was
    /// left out.
    pub fn render(
        &mut self,
        camera: &Camera,
        faces: &[Face],
        target: &mut FrameBuffer,
    ) -> Result<FrameStats, RenderError> {
        let expected = (self.width, self.height);
        for actual in [(target.get_width(), target.get_height()), camera.viewport()] {
            if actual != expected {
                return Err(RenderError::BufferSize { expected, actual });
            }
        }

        self.stats.clear();
        self.faults.clear();
        target.clear(self.settings.clear_color);

        if self.width > 0 && self.height > 0 {
            self.project(camera, faces);

            if self.settings.depth_sort || self.settings.mode == RenderMode::Painter {
                sort_by_depth(&mut self.polygons[..self.live], |p| p.depth);
            }

            match self.settings.mode {
                RenderMode::Tiled => self.draw_tiled(target),
                RenderMode::ZBuffer => self.draw_direct(target, true),
                RenderMode::Painter => self.draw_direct(target, false),
            }

            if let Some(color) = self.settings.outline_color {
                self.draw_outlines(camera, faces, target, color);
            }
        }

        let stats = self.stats;
        debug!(
            "frame ({}): {} faces, {} culled, {} clipped, {} dropped, {} polygons, {} tile refs, {} tiles, {} pixels",
            self.settings.mode.name(),
            stats.faces_input,
            stats.faces_culled,
            stats.faces_clipped,
            stats.faces_dropped,
            stats.polygons_projected,
            stats.tile_references,
            stats.tiles_drawn,
            stats.pixels_drawn,
        );

        if self.faults.is_empty() {
            Ok(stats)
        } else {
            Err(RenderError::Partial { stats, faults: self.faults.clone() })
        }
    }

    /// Culls, clips and projects `faces` into the polygon slots.
    fn project(&mut self, camera: &Camera, faces: &[Face]) {
        let eye = camera.position();
        let near = Plane::near(camera.znear());
        let screen = Line::rect_bounds(0.0, 0.0, self.width as f32, self.height as f32);

        self.live = 0;

        for (index, face) in faces.iter().enumerate() {
            self.stats.faces_input += 1;

            if self.live >= self.settings.max_polygons {
                self.stats.faces_dropped += 1;
                continue;
            }

            if face.points.len() < 3 {
                let fault = RasterFault::TooFewVertices { count: face.points.len() };
                warn!("skipping face {:#010x}: {}", face.color, fault);
                self.stats.raster_faults += 1;
                self.faults.push(PolygonFault { color: face.color, fault });
                continue;
            }

            if self.settings.backface_culling {
                self.world.clear();
                self.world.extend(face.points.iter().copied());
                if !is_visible(&self.world, eye) {
                    self.stats.faces_culled += 1;
                    continue;
                }
            }

            self.view.clear();
            self.view.extend(face.points.iter().map(|&p| camera.world_to_view(p)));
            if !clip(&mut self.view, &near) {
                self.stats.faces_clipped += 1;
                continue;
            }

            if self.live == self.polygons.len() {
                self.polygons.push(ProjectedPolygon::default());
            }
            let slot = &mut self.polygons[self.live];
            slot.corners.clear();
            slot.corners.color = face.color;
            slot.depth = self.view.average_z();
            slot.face = index;

            let mut behind_eye = false;
            for &p in self.view.iter() {
                match camera.view_to_screen(p) {
                    Some(v) => {
                        slot.corners.push(v);
                    }
                    None => {
                        behind_eye = true;
                        break;
                    }
                }
            }

            if behind_eye || !clip_all(&mut slot.corners, &screen) {
                self.stats.faces_clipped += 1;
                continue;
            }

            if let Err(fault) = self.raster.validate(&slot.corners) {
                warn!("skipping face {:#010x}: {}", face.color, fault);
                self.stats.raster_faults += 1;
                self.faults.push(PolygonFault { color: face.color, fault });
                continue;
            }

            slot.bounds = BoundRect::from_points(slot.corners.iter().map(|v| v.pos));
            self.live += 1;
            self.stats.polygons_projected += 1;
        }
    }

    fn draw_tiled(&mut self, target: &mut FrameBuffer) {
        self.grid.clear();
        for (i, polygon) in self.polygons[..self.live].iter().enumerate() {
            let inserted = self.grid.insert(PolygonId(i), &polygon.bounds);
            self.stats.tile_references += inserted as u32;
        }

        let width = self.width;
        let band_len = width * self.grid.tile_height();
        let grid = &self.grid;
        let polygons = &self.polygons[..self.live];
        let (color, depth) = target.buffers_mut();

        if self.settings.parallel_tiles {
            color
                .par_chunks_mut(band_len)
                .zip(depth.par_chunks_mut(band_len))
                .zip(self.bands.par_iter_mut())
                .enumerate()
                .for_each(|(ty, ((color, depth), band))| {
                    band.draw_row(ty, grid, polygons, color, depth, width)
                });
        } else {
            color
                .chunks_mut(band_len)
                .zip(depth.chunks_mut(band_len))
                .zip(self.bands.iter_mut())
                .enumerate()
                .for_each(|(ty, ((color, depth), band))| {
                    band.draw_row(ty, grid, polygons, color, depth, width)
                });
        }

        // a polygon that faulted in several tiles is reported once
        let mut faults: Vec<(PolygonId, RasterFault)> = Vec::new();
        for band in &mut self.bands {
            self.stats += band.stats;
            faults.append(&mut band.faults);
        }
        faults.sort_by_key(|(id, _)| id.0);
        faults.dedup_by_key(|(id, _)| id.0);

        for (id, fault) in faults {
            let color = self.polygons[id.0].corners.color;
            warn!("polygon {:#010x} partially skipped: {}", color, fault);
            self.stats.raster_faults += 1;
            self.faults.push(PolygonFault { color, fault });
        }
    }

    fn draw_direct(&mut self, target: &mut FrameBuffer, depth_test: bool) {
        for polygon in &self.polygons[..self.live] {
            match self.raster.rasterize(&polygon.corners, target, depth_test) {
                Ok(raster_stats) => add_raster_stats(&mut self.stats, raster_stats),
                Err(fault) => {
                    warn!("skipping polygon {:#010x}: {}", polygon.corners.color, fault);
                    self.stats.raster_faults += 1;
                    self.faults.push(PolygonFault { color: polygon.corners.color, fault });
                }
            }
        }
    }

    /// Edges of the faces that reached the screen. Edges shared by two faces
    /// are drawn, and counted, twice.
    fn draw_outlines(&mut self, camera: &Camera, faces: &[Face], target: &mut FrameBuffer, color: u32) {
        for polygon in &self.polygons[..self.live] {
            self.stats.outline_pixels += draw_outline(target, camera, &faces[polygon.face].points, color);
        }
    }
}

fn validate_settings(settings: &RendererSettings) -> Result<(), RenderError> {
    if settings.tile_width == 0 || settings.tile_height == 0 {
        return Err(RenderError::InvalidTileSize {
            width: settings.tile_width,
            height: settings.tile_height,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Model;
    use glam::{vec3, Mat4};

    fn cube_scene() -> Vec<Face> {
        Model::cube(1.0).faces(&Mat4::IDENTITY).collect()
    }

    #[test]
    fn test_zero_tile_size_is_rejected() {
        let settings = RendererSettings { tile_width: 0, ..RendererSettings::default() };
        assert!(matches!(
            RenderContext::new(64, 64, settings),
            Err(RenderError::InvalidTileSize { width: 0, height: 32 })
        ));
    }

    #[test]
    fn test_buffer_size_mismatch() {
        let mut context = RenderContext::new(64, 64, RendererSettings::default()).unwrap();
        let mut target = FrameBuffer::new(32, 64);
        let camera = Camera::new(64, 64);
        let result = context.render(&camera, &cube_scene(), &mut target);
        assert!(matches!(result, Err(RenderError::BufferSize { expected: (64, 64), actual: (32, 64) })));
    }

    #[test]
    fn test_camera_viewport_mismatch() {
        let mut context = RenderContext::new(64, 64, RendererSettings::default()).unwrap();
        let mut target = FrameBuffer::new(64, 64);
        let camera = Camera::new(128, 64);
        let result = context.render(&camera, &cube_scene(), &mut target);
        assert!(matches!(result, Err(RenderError::BufferSize { expected: (64, 64), actual: (128, 64) })));
        assert_eq!(context.stats().faces_input, 0);
    }

    #[test]
    fn test_cube_front_face_culling() {
        let mut context = RenderContext::new(64, 64, RendererSettings::default()).unwrap();
        let mut target = FrameBuffer::new(64, 64);
        let camera = Camera::new(64, 64);

        let stats = context.render(&camera, &cube_scene(), &mut target).unwrap();
        assert_eq!(stats.faces_input, 6);
        assert_eq!(stats.faces_culled, 5);
        assert_eq!(stats.polygons_projected, 1);
        assert!(stats.pixels_drawn > 0);
        assert_eq!(context.stats(), &stats);
    }

    #[test]
    fn test_pyramid_shows_its_front_side() {
        let mut context = RenderContext::new(64, 64, RendererSettings::default()).unwrap();
        let mut target = FrameBuffer::new(64, 64);
        let camera = Camera::new(64, 64);

        let faces: Vec<Face> = Model::pyramid(1.0).faces(&Mat4::IDENTITY).collect();
        let stats = context.render(&camera, &faces, &mut target).unwrap();
        assert_eq!(stats.faces_culled, 4);
        assert_eq!(stats.polygons_projected, 1);
        assert!(stats.pixels_drawn > 0);
    }

    #[test]
    fn test_modes_agree_on_cube() {
        let faces = cube_scene();
        let mut camera = Camera::new(96, 64);
        camera.set_position(vec3(2.0, 1.5, 3.0));
        camera.set_rotation(0.55, -0.3);

        let mut images = Vec::new();
        for mode in [RenderMode::Tiled, RenderMode::ZBuffer, RenderMode::Painter] {
            let settings = RendererSettings { mode, ..RendererSettings::default() };
            let mut context = RenderContext::new(96, 64, settings).unwrap();
            let mut target = FrameBuffer::new(96, 64);
            context.render(&camera, &faces, &mut target).unwrap();
            images.push(target.get_color_buffer().to_vec());
        }

        let background = 0xFF000000;
        assert!(images[0].iter().filter(|&&c| c != background).count() > 500);

        // with culling on the visible faces of a convex body never overlap
        assert_eq!(images[1], images[2]);

        // tiles re-clip every polygon, which may move an edge pixel or two
        let differing = images[0].iter().zip(&images[1]).filter(|(a, b)| a != b).count();
        assert!(differing <= 32, "{differing} pixels differ");
    }

    #[test]
    fn test_polygon_cap_drops_faces() {
        let settings = RendererSettings { max_polygons: 1, backface_culling: false, ..RendererSettings::default() };
        let mut context = RenderContext::new(64, 64, settings).unwrap();
        let mut target = FrameBuffer::new(64, 64);
        let camera = Camera::new(64, 64);

        let stats = context.render(&camera, &cube_scene(), &mut target).unwrap();
        assert_eq!(stats.polygons_projected, 1);
        assert_eq!(stats.faces_dropped, 5);
    }

    #[test]
    fn test_short_face_is_reported() {
        let mut context = RenderContext::new(64, 64, RendererSettings::default()).unwrap();
        let mut target = FrameBuffer::new(64, 64);
        let camera = Camera::new(64, 64);

        let mut faces = cube_scene();
        faces.push(Face::new(vec![Vec3::ZERO, Vec3::X], 0xFF123456));

        match context.render(&camera, &faces, &mut target) {
            Err(RenderError::Partial { stats, faults }) => {
                assert_eq!(stats.polygons_projected, 1);
                assert_eq!(
                    faults,
                    vec![PolygonFault { color: 0xFF123456, fault: RasterFault::TooFewVertices { count: 2 } }]
                );
            }
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn test_face_behind_camera_is_clipped() {
        let mut context = RenderContext::new(64, 64, RendererSettings::default()).unwrap();
        let mut target = FrameBuffer::new(64, 64);
        let camera = Camera::new(64, 64);

        // facing the camera, but behind it
        let face = Face::new(
            vec![vec3(-1.0, 1.0, 8.0), vec3(1.0, 1.0, 8.0), vec3(1.0, -1.0, 8.0), vec3(-1.0, -1.0, 8.0)],
            0xFFFFFFFF,
        );
        let stats = context.render(&camera, &[face], &mut target).unwrap();
        assert_eq!(stats.faces_clipped, 1);
        assert_eq!(stats.pixels_drawn, 0);
        assert!(target.get_color_buffer().iter().all(|&c| c == 0xFF000000));
    }

    #[test]
    fn test_resize_rebuilds_grid() {
        let mut context = RenderContext::new(64, 64, RendererSettings::default()).unwrap();
        context.resize(100, 40);
        assert_eq!(context.viewport(), (100, 40));
        assert_eq!((context.grid.tiles_x(), context.grid.tiles_y()), (4, 2));
        assert_eq!(context.bands.len(), 2);
    }
}
