/// End-to-end tests of the frame pipeline: culling, near clip, projection,
/// binning and tile rasterization into a caller-owned frame buffer.
use approx::assert_abs_diff_eq;
use glam::{vec3, Mat4, Vec3};
use tile_rasterizer::*;

const BACKGROUND: u32 = 0xFF000000;
const RED: u32 = 0xFFFF0000;
const BLUE: u32 = 0xFF0000FF;
const WHITE: u32 = 0xFFFFFFFF;

/// 64x64 viewport, eye at the origin, 90 degree fov: at `z = -1` one world
/// unit is exactly 32 pixels.
fn unit_camera() -> Camera {
    let mut camera = Camera::new(64, 64);
    camera.set_position(Vec3::ZERO);
    camera.set_lens(90.0, 0.1, 100.0);
    camera
}

/// Axis-aligned square facing +Z.
fn square(x0: f32, y0: f32, x1: f32, y1: f32, z: f32, color: u32) -> Face {
    Face::new(
        vec![vec3(x0, y0, z), vec3(x1, y0, z), vec3(x1, y1, z), vec3(x0, y1, z)],
        color,
    )
}

fn render(settings: RendererSettings, camera: &Camera, faces: &[Face]) -> (FrameBuffer, FrameStats) {
    let (width, height) = camera.viewport();
    let mut context = RenderContext::new(width, height, settings).expect("valid settings");
    let mut frame = FrameBuffer::new(width, height);
    let stats = context.render(camera, faces, &mut frame).expect("frame renders");
    (frame, stats)
}

fn all_modes() -> Vec<RendererSettings> {
    vec![
        RendererSettings::default(),
        RendererSettings { parallel_tiles: false, ..RendererSettings::default() },
        RendererSettings { mode: RenderMode::ZBuffer, ..RendererSettings::default() },
        RendererSettings { mode: RenderMode::Painter, ..RendererSettings::default() },
    ]
}

#[test]
fn square_covering_one_tile_fills_exactly_that_tile() {
    let camera = unit_camera();
    // screen [32, 64) x [32, 64): the bottom-right tile
    let face = square(0.0, -1.0, 1.0, 0.0, -1.0, RED);

    for settings in all_modes() {
        let mode = settings.mode;
        let (frame, stats) = render(settings, &camera, &[face.clone()]);

        for y in 0..64 {
            for x in 0..64 {
                let inside = (32..64).contains(&x) && (32..64).contains(&y);
                let expected = if inside { RED } else { BACKGROUND };
                assert_eq!(frame.pixel(x, y), Some(expected), "pixel ({x}, {y}) in {mode:?}");
            }
        }

        assert_abs_diff_eq!(frame.depth(40, 40).unwrap(), 1.0, epsilon = 1e-5);
        assert_eq!(frame.depth(10, 10), Some(0.0));
        assert_eq!(stats.pixels_drawn, 32 * 32);
        if mode == RenderMode::Tiled {
            assert_eq!(stats.tile_references, 1);
            assert_eq!(stats.tiles_drawn, 1);
        }
    }
}

#[test]
fn square_covering_an_inner_tile_stays_in_that_tile() {
    // 96x96 at 90 degrees: at `z = -3` one world unit is 16 pixels
    let mut camera = Camera::new(96, 96);
    camera.set_position(Vec3::ZERO);
    camera.set_lens(90.0, 0.1, 100.0);
    // screen [32, 64) x [32, 64): tile (1, 1), surrounded on all sides
    let face = square(-1.0, -1.0, 1.0, 1.0, -3.0, RED);

    for settings in all_modes() {
        let mode = settings.mode;
        let (frame, stats) = render(settings, &camera, &[face.clone()]);

        for y in 0..96 {
            for x in 0..96 {
                let inside = (32..64).contains(&x) && (32..64).contains(&y);
                let expected = if inside { RED } else { BACKGROUND };
                assert_eq!(frame.pixel(x, y), Some(expected), "pixel ({x}, {y}) in {mode:?}");
            }
        }

        assert_abs_diff_eq!(frame.depth(48, 48).unwrap(), 1.0 / 3.0, epsilon = 1e-5);
        assert_eq!(stats.pixels_drawn, 32 * 32);
        if mode == RenderMode::Tiled {
            assert_eq!(stats.tile_references, 1);
            assert_eq!(stats.tiles_drawn, 1);
        }
    }
}

#[test]
fn square_spanning_tiles_has_no_seams() {
    let camera = unit_camera();
    // screen [16, 48) x [16, 48), straddling all four tiles
    let face = square(-0.5, -0.5, 0.5, 0.5, -1.0, RED);

    let (frame, stats) = render(RendererSettings::default(), &camera, &[face]);
    assert_eq!(stats.tile_references, 4);
    assert_eq!(stats.pixels_drawn, 32 * 32);

    let covered = frame.get_color_buffer().iter().filter(|&&c| c == RED).count();
    assert_eq!(covered, 32 * 32);
    assert_eq!(frame.pixel(16, 16), Some(RED));
    assert_eq!(frame.pixel(47, 47), Some(RED));
    assert_eq!(frame.pixel(48, 47), Some(BACKGROUND));
}

#[test]
fn nearer_surface_wins_regardless_of_order() {
    let camera = unit_camera();
    let near = square(-0.5, -0.5, 0.25, 0.25, -1.0, RED);
    let far = square(-6.0, -6.0, 6.0, 6.0, -3.0, BLUE);

    for settings in [
        RendererSettings::default(),
        RendererSettings { mode: RenderMode::ZBuffer, ..RendererSettings::default() },
    ] {
        let (a, _) = render(settings.clone(), &camera, &[near.clone(), far.clone()]);
        let (b, _) = render(settings, &camera, &[far.clone(), near.clone()]);
        assert_eq!(a.get_color_buffer(), b.get_color_buffer());
        assert_eq!(a.pixel(30, 30), Some(RED));
        assert_eq!(a.pixel(5, 60), Some(BLUE));
    }
}

#[test]
fn painter_mode_needs_the_sort() {
    let camera = unit_camera();
    let near = square(-0.5, -0.5, 0.25, 0.25, -1.0, RED);
    let far = square(-6.0, -6.0, 6.0, 6.0, -3.0, BLUE);

    // submitted near first; painter mode sorts far to near before drawing
    let settings = RendererSettings { mode: RenderMode::Painter, ..RendererSettings::default() };
    let (frame, stats) = render(settings, &camera, &[near, far]);
    assert_eq!(frame.pixel(30, 30), Some(RED));
    assert_eq!(stats.pixels_failed_z_test, 0);
}

#[test]
fn face_crossing_near_plane_is_clipped_not_dropped() {
    let camera = unit_camera();
    // floor running from in front of the camera to behind it
    let floor = Face::new(
        vec![vec3(-1.0, -0.5, 2.0), vec3(1.0, -0.5, 2.0), vec3(1.0, -0.5, -4.0), vec3(-1.0, -0.5, -4.0)],
        RED,
    );
    // the floor faces up, seen from above
    let (frame, stats) = render(RendererSettings::default(), &camera, &[floor]);
    assert_eq!(stats.polygons_projected, 1);
    assert_eq!(stats.faces_clipped, 0);
    assert_eq!(frame.pixel(32, 63), Some(RED));
    assert_eq!(frame.pixel(32, 10), Some(BACKGROUND));
}

#[test]
fn outlines_are_hidden_behind_nearer_faces() {
    let camera = unit_camera();
    // screen [16, 48) in front of [20, 44)
    let near = square(-0.5, -0.5, 0.5, 0.5, -1.0, RED);
    let far = square(-0.75, -0.75, 0.75, 0.75, -2.0, BLUE);

    for settings in all_modes() {
        let mode = settings.mode;
        let (plain, plain_stats) = render(settings.clone(), &camera, &[near.clone(), far.clone()]);
        assert!(!plain.get_color_buffer().contains(&WHITE));
        assert_eq!(plain_stats.outline_pixels, 0);

        let settings = RendererSettings { outline_color: Some(WHITE), ..settings };
        let (frame, stats) = render(settings, &camera, &[near.clone(), far.clone()]);
        assert!(stats.outline_pixels > 4 * 30, "{mode:?}: {} outline pixels", stats.outline_pixels);

        for y in 0..64 {
            for x in 0..64 {
                let interior = (18..46).contains(&x) && (18..46).contains(&y);
                let pixel = frame.pixel(x, y);
                if interior {
                    assert_eq!(pixel, Some(RED), "pixel ({x}, {y}) in {mode:?}");
                } else if pixel == Some(WHITE) {
                    // outline of the near square only
                    assert!((14..=49).contains(&x) && (14..=49).contains(&y), "pixel ({x}, {y}) in {mode:?}");
                }
            }
        }
    }
}

#[test]
fn culling_can_be_disabled() {
    let camera = unit_camera();
    let mut back = square(-0.5, -0.5, 0.5, 0.5, -1.0, RED);
    back.points.reverse();

    let (_, culled) = render(RendererSettings::default(), &camera, &[back.clone()]);
    assert_eq!(culled.faces_culled, 1);
    assert_eq!(culled.pixels_drawn, 0);

    let settings = RendererSettings { backface_culling: false, ..RendererSettings::default() };
    let (frame, stats) = render(settings, &camera, &[back]);
    assert_eq!(stats.faces_culled, 0);
    assert_eq!(frame.pixel(32, 32), Some(RED));
}

#[test]
fn rendering_reuses_context_between_frames() {
    let faces: Vec<Face> = Model::cube(1.0).faces(&Mat4::IDENTITY).collect();
    let mut camera = Camera::new(128, 96);
    let mut context = RenderContext::new(128, 96, RendererSettings::default()).unwrap();
    let mut frame = FrameBuffer::new(128, 96);

    let first = context.render(&camera, &faces, &mut frame).unwrap();
    let image = frame.get_color_buffer().to_vec();

    camera.rotate(0.3, 0.0);
    context.render(&camera, &faces, &mut frame).unwrap();
    assert_ne!(frame.get_color_buffer(), &image[..]);

    camera.rotate(-0.3, 0.0);
    let again = context.render(&camera, &faces, &mut frame).unwrap();
    assert_eq!(first, again);
    assert_eq!(frame.get_color_buffer(), &image[..]);
}

#[test]
fn resize_requires_matching_buffer_and_camera() {
    let mut camera = unit_camera();
    let mut context = RenderContext::new(64, 64, RendererSettings::default()).unwrap();
    context.resize(80, 48);

    let mut frame = FrameBuffer::new(64, 64);
    let result = context.render(&camera, &[], &mut frame);
    assert!(matches!(result, Err(RenderError::BufferSize { expected: (80, 48), actual: (64, 64) })));

    // the camera still projects onto 64x64
    frame.resize(80, 48);
    let result = context.render(&camera, &[], &mut frame);
    assert!(matches!(result, Err(RenderError::BufferSize { expected: (80, 48), actual: (64, 64) })));

    camera.set_viewport(80, 48);
    assert!(context.render(&camera, &[], &mut frame).is_ok());
}

#[test]
fn odd_tile_sizes_cover_the_whole_screen() {
    let camera = unit_camera();
    let face = square(-1.0, -1.0, 1.0, 1.0, -1.0, RED);
    let settings = RendererSettings { tile_width: 24, tile_height: 10, ..RendererSettings::default() };
    let (frame, stats) = render(settings, &camera, &[face]);
    assert_eq!(stats.pixels_drawn, 64 * 64);
    assert!(frame.get_color_buffer().iter().all(|&c| c == RED));
}
