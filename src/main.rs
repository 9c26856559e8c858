use glam::{vec2, vec3, Mat4, Quat, Vec3};
use log::{error, info};
use minifb::{Key, KeyRepeat, Scale, Window, WindowOptions};
use minifb_fonts::font6x8;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Instant;
use tile_rasterizer::overlay::draw_axes;
use tile_rasterizer::{
    Camera, Camera2D, Color, Face, FrameBuffer, Model, RenderContext, RenderError, RendererSettings,
    Shape2D, Transform2D,
};

const SCREEN_WIDTH: usize = 1920 / 2;
const SCREEN_HEIGHT: usize = 1080 / 2;
const OBJECT_COUNT: usize = 200;
const OUTLINE_COLOR: u32 = 0xFFFFFFFF;
const PYRAMID_COLOR: u32 = 0xFFE0B040;

struct DemoSettings {
    pub camera_speed: f32,
    pub camera_rotation_speed: f32,
    pub draw_depth: bool,
    pub show_stats: bool,
    pub show_axes: bool,
    pub animate: bool,
}

struct SceneObject {
    /// Index into the demo's model list.
    model: usize,
    position: Vec3,
    size: f32,
    axis: Vec3,
    spin: f32,
}

fn scatter_objects(rng: &mut StdRng, count: usize, models: usize) -> Vec<SceneObject> {
    (0..count)
        .map(|_| SceneObject {
            model: rng.random_range(0..models),
            position: vec3(
                rng.random_range(-20.0..20.0),
                rng.random_range(-6.0..6.0),
                rng.random_range(-40.0..0.0),
            ),
            size: rng.random_range(0.5..2.5),
            axis: vec3(
                rng.random_range(-1.0..1.0),
                rng.random_range(-1.0..1.0),
                rng.random_range(-1.0..1.0),
            )
            .try_normalize()
            .unwrap_or(Vec3::Y),
            spin: rng.random_range(-2.0..2.0),
        })
        .collect()
}

fn process_input(
    window: &Window,
    elapsed_seconds: f32,
    settings: &mut DemoSettings,
    camera: &mut Camera,
    context: &mut RenderContext,
) {
    let step = settings.camera_speed * elapsed_seconds;
    let turn = settings.camera_rotation_speed * elapsed_seconds;

    let mut forward = 0.0;
    let mut right = 0.0;
    let mut up = 0.0;
    if window.is_key_down(Key::W) { forward += step; }
    if window.is_key_down(Key::S) { forward -= step; }
    if window.is_key_down(Key::D) { right += step; }
    if window.is_key_down(Key::A) { right -= step; }
    if window.is_key_down(Key::E) { up += step; }
    if window.is_key_down(Key::Q) { up -= step; }
    if forward != 0.0 || right != 0.0 || up != 0.0 {
        camera.move_by(forward, right, up);
    }

    let mut yaw = 0.0;
    let mut pitch = 0.0;
    if window.is_key_down(Key::Left) { yaw += turn; }
    if window.is_key_down(Key::Right) { yaw -= turn; }
    if window.is_key_down(Key::Up) { pitch += turn; }
    if window.is_key_down(Key::Down) { pitch -= turn; }
    if yaw != 0.0 || pitch != 0.0 {
        camera.rotate(yaw, pitch);
    }

    if window.is_key_pressed(Key::Tab, KeyRepeat::No) {
        let mode = context.settings().mode.next();
        context.set_mode(mode);
        info!("render mode: {}", mode.name());
    }

    let mut renderer_settings = context.settings().clone();
    let mut changed = false;
    if window.is_key_pressed(Key::C, KeyRepeat::No) {
        renderer_settings.backface_culling = !renderer_settings.backface_culling;
        changed = true;
    }
    if window.is_key_pressed(Key::O, KeyRepeat::No) {
        renderer_settings.depth_sort = !renderer_settings.depth_sort;
        changed = true;
    }
    if window.is_key_pressed(Key::P, KeyRepeat::No) {
        renderer_settings.parallel_tiles = !renderer_settings.parallel_tiles;
        changed = true;
    }
    if window.is_key_pressed(Key::L, KeyRepeat::No) {
        renderer_settings.outline_color = match renderer_settings.outline_color {
            Some(_) => None,
            None => Some(OUTLINE_COLOR),
        };
        changed = true;
    }
    if changed {
        if let Err(e) = context.set_settings(renderer_settings) {
            error!("{}", e);
        }
    }

    if window.is_key_pressed(Key::Z, KeyRepeat::No) {
        settings.draw_depth = !settings.draw_depth;
    }
    if window.is_key_pressed(Key::F1, KeyRepeat::No) {
        settings.show_stats = !settings.show_stats;
    }
    if window.is_key_pressed(Key::X, KeyRepeat::No) {
        settings.show_axes = !settings.show_axes;
    }
    if window.is_key_pressed(Key::Space, KeyRepeat::No) {
        settings.animate = !settings.animate;
    }

    // control camera speed
    if window.is_key_released(Key::NumPadMinus) {
        settings.camera_speed = (settings.camera_speed - 2.0).max(1.0);
    }
    else if window.is_key_released(Key::NumPadPlus) {
        settings.camera_speed += 2.0;
    }
}

fn draw_crosshair(target: &mut FrameBuffer, camera: &Camera2D) {
    let white = Color::WHITE.to_u32();
    let crosshair = [
        Shape2D::line(vec2(-0.03, 0.0), vec2(0.03, 0.0), white),
        Shape2D::line(vec2(0.0, -0.03), vec2(0.0, 0.03), white),
    ];
    for shape in &crosshair {
        shape.draw(target, camera, &Transform2D::default());
    }
}

fn main() {
    env_logger::init();

    // create a text renderer
    let text_color: Color = Color::from_u8(255, 255, 255, 255);
    let text = font6x8::new_renderer(SCREEN_WIDTH, SCREEN_HEIGHT, text_color.to_u32());

    // create a window and buffer
    let mut window = Window::new(
        "tile-rasterizer",
        SCREEN_WIDTH,
        SCREEN_HEIGHT,
        WindowOptions {
            scale: Scale::X2,
            ..WindowOptions::default()
        }
    ).unwrap_or_else(|e| {
        panic!("{}", e);
    });

    let renderer_settings = RendererSettings {
        clear_color: 0xFF101820,
        ..RendererSettings::default()
    };
    let mut context = match RenderContext::new(SCREEN_WIDTH, SCREEN_HEIGHT, renderer_settings) {
        Ok(context) => context,
        Err(e) => {
            error!("{}", e);
            return;
        }
    };
    let mut frame = FrameBuffer::new(SCREEN_WIDTH, SCREEN_HEIGHT);

    let mut settings = DemoSettings {
        camera_speed: 8.0,
        camera_rotation_speed: 1.5,
        draw_depth: false,
        show_stats: true,
        show_axes: true,
        animate: true,
    };

    let mut camera = Camera::new(SCREEN_WIDTH, SCREEN_HEIGHT);
    camera.set_lens(70.0, 0.1, 200.0);
    let overlay_camera = Camera2D::new(SCREEN_WIDTH, SCREEN_HEIGHT);

    let mut rng = StdRng::seed_from_u64(0x5EED);
    let models = [Model::cube(1.0), Model::pyramid(1.0).with_color(PYRAMID_COLOR)];
    let objects = scatter_objects(&mut rng, OBJECT_COUNT, models.len());
    let mut faces: Vec<Face> = Vec::with_capacity(OBJECT_COUNT * 6);

    let start = Instant::now();
    let mut instant = Instant::now();
    let mut scene_time = 0.0;
    let mut buffer: Vec<u32> = vec![0; SCREEN_WIDTH * SCREEN_HEIGHT];

    // run the main-loop
    while window.is_open() && !window.is_key_down(Key::Escape) {
        // fps counter
        let elapsed_seconds = instant.elapsed().as_secs_f32();
        instant = Instant::now();
        if settings.animate {
            scene_time += elapsed_seconds;
        }

        process_input(&window, elapsed_seconds, &mut settings, &mut camera, &mut context);

        faces.clear();
        for object in &objects {
            let world = Mat4::from_scale_rotation_translation(
                Vec3::splat(object.size),
                Quat::from_axis_angle(object.axis, object.spin * scene_time),
                object.position,
            );
            faces.extend(models[object.model].faces(&world));
        }

        // skipped polygons were already logged by the renderer
        match context.render(&camera, &faces, &mut frame) {
            Ok(_) | Err(RenderError::Partial { .. }) => {}
            Err(e) => {
                error!("{}", e);
                break;
            }
        }

        if settings.show_axes {
            draw_axes(&mut frame, &camera, 2.0);
        }
        draw_crosshair(&mut frame, &overlay_camera);

        if settings.draw_depth {
            for (dst, &w) in buffer.iter_mut().zip(frame.get_depth_buffer()) {
                *dst = Color::grey(w * 2.0).to_u32();
            }
        }
        else {
            buffer.copy_from_slice(frame.get_color_buffer());
        }

        // draw some informative text
        let text_frame_time = format!("frame: {}ms  mode: {}", (elapsed_seconds * 1000.0) as u32, context.settings().mode.name());
        text.draw_text(&mut buffer, 10, 20, text_frame_time.as_str());
        let text_camera_position = format!("camera: {}", camera.position());
        text.draw_text(&mut buffer, 10, 40, text_camera_position.as_str());

        if settings.show_stats {
            let str_stats = format!("{:#?}", context.stats()) // Pretty-prints with new lines
                .trim_start_matches("FrameStats {\n") // Remove struct name
                .trim_end_matches("\n}") // Remove closing brace
                .replace("    ", ""); // Remove excess indentation
            text.draw_text(&mut buffer, 10, 80, str_stats.as_str());
        }

        if let Err(e) = window.update_with_buffer(buffer.as_slice(), SCREEN_WIDTH, SCREEN_HEIGHT) {
            error!("{}", e);
            break;
        }
    }

    info!("ran for {:.1}s", start.elapsed().as_secs_f32());
}
