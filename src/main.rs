/// Demo application
/// Opens a window, draws a lit textured cube plus a 2D overlay every frame
use glam::{Mat4, Vec2, Vec3};
use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;
use soft_raster::perf::FrameStats;
use soft_raster::rendering::{FaceCulling, LambertProcessor};
use soft_raster::*;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Instant;
use winit::{
    event::*,
    event_loop::{ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::WindowBuilder,
};

/// Unit cube, four vertices per face so normals and texcoords stay flat.
struct CubeMesh {
    positions: Vec<f32>,
    normals: Vec<f32>,
    texcoords: Vec<f32>,
    colors: Vec<u8>,
    indices: Vec<u16>,
}

impl CubeMesh {
    fn new() -> Self {
        // (normal, u axis, v axis) per face
        let faces = [
            (Vec3::X, Vec3::NEG_Z, Vec3::Y),
            (Vec3::NEG_X, Vec3::Z, Vec3::Y),
            (Vec3::Y, Vec3::X, Vec3::NEG_Z),
            (Vec3::NEG_Y, Vec3::X, Vec3::Z),
            (Vec3::Z, Vec3::X, Vec3::Y),
            (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
        ];
        let tints = [
            [255, 200, 200, 255],
            [200, 255, 200, 255],
            [200, 200, 255, 255],
            [255, 255, 200, 255],
            [255, 200, 255, 255],
            [200, 255, 255, 255],
        ];

        let mut mesh = Self {
            positions: Vec::with_capacity(24 * 3),
            normals: Vec::with_capacity(24 * 3),
            texcoords: Vec::with_capacity(24 * 2),
            colors: Vec::with_capacity(24 * 4),
            indices: Vec::with_capacity(36),
        };
        for (face, ((n, u, v), tint)) in faces.iter().zip(tints).enumerate() {
            let base = (face * 4) as u16;
            for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
                let p = (*n + *u * su + *v * sv) * 0.5;
                mesh.positions.extend_from_slice(&p.to_array());
                mesh.normals.extend_from_slice(&n.to_array());
                mesh.texcoords.extend_from_slice(&[(su + 1.0) * 0.5, (1.0 - sv) * 0.5]);
                mesh.colors.extend_from_slice(&tint);
            }
            mesh.indices
                .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }
        mesh
    }

    fn vertex_buffer(&self) -> VertexBuffer<'_> {
        VertexBuffer::new(self.positions.len() / 3)
            .with_positions(&self.positions, 3)
            .with_normals(&self.normals)
            .with_texcoords(&self.texcoords)
            .with_colors(&self.colors)
            .with_indices(&self.indices)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("soft_raster demo");
    log::info!("  WASD - move, Space/Shift - up/down, drag mouse - look");
    log::info!("  C - cycle culling, B - toggle overlay blending, ESC - exit");

    let event_loop = EventLoop::new()?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title("soft_raster")
            .with_inner_size(winit::dpi::LogicalSize::new(960, 600))
            .build(&event_loop)?,
    );

    let context = softbuffer::Context::new(window.clone())?;
    let mut surface = softbuffer::Surface::new(&context, window.clone())?;

    let size = window.inner_size();
    let (mut width, mut height) = (size.width.max(1) as usize, size.height.max(1) as usize);
    let mut scene = Renderer3D::new(width, height);
    let mut overlay = Renderer2D::new(1, 1);

    let mut camera = Camera3D::new(Vec3::new(0.0, 1.2, 3.5), width as f32 / height as f32);
    camera.look_at(Vec3::ZERO);
    let mut controller = CameraController::new();

    let cube = CubeMesh::new();
    let texture = Texture::checkerboard(64, 8, Color::WHITE, Color::gray(90));
    let lit = LambertProcessor::default().with_texture(&texture);

    let start = Instant::now();
    let mut last_frame = Instant::now();
    let mut frame_count = 0u32;
    let mut fps_timer = Instant::now();
    let mut stats = FrameStats::default();

    let mut mouse_captured = false;
    let mut last_mouse_pos: Option<(f64, f64)> = None;
    let mut overlay_blend = true;

    event_loop.run(move |event, elwt| {
        elwt.set_control_flow(ControlFlow::Poll);

        match event {
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::CloseRequested => elwt.exit(),
                WindowEvent::Resized(new_size) => {
                    width = new_size.width.max(1) as usize;
                    height = new_size.height.max(1) as usize;
                    scene.resize(width, height);
                    camera.set_aspect_ratio(width as f32 / height as f32);
                }
                WindowEvent::KeyboardInput { event, .. } => {
                    let pressed = event.state == ElementState::Pressed;
                    if let PhysicalKey::Code(keycode) = event.physical_key {
                        match keycode {
                            KeyCode::KeyW => controller.forward_pressed = pressed,
                            KeyCode::KeyS => controller.backward_pressed = pressed,
                            KeyCode::KeyA => controller.left_pressed = pressed,
                            KeyCode::KeyD => controller.right_pressed = pressed,
                            KeyCode::Space => controller.up_pressed = pressed,
                            KeyCode::ShiftLeft => controller.down_pressed = pressed,
                            KeyCode::KeyC if pressed => {
                                let next = match scene.state().cull {
                                    FaceCulling::Back => FaceCulling::Front,
                                    FaceCulling::Front => FaceCulling::None,
                                    FaceCulling::None => FaceCulling::Back,
                                };
                                scene.set_cull(next);
                                log::info!("culling: {next:?}");
                            }
                            KeyCode::KeyB if pressed => {
                                overlay_blend = !overlay_blend;
                                log::info!("overlay blending: {overlay_blend}");
                            }
                            KeyCode::Escape if pressed => {
                                if mouse_captured {
                                    mouse_captured = false;
                                    last_mouse_pos = None;
                                    window.set_cursor_visible(true);
                                } else {
                                    elwt.exit();
                                }
                            }
                            _ => {}
                        }
                    }
                }
                WindowEvent::MouseInput { state, button, .. } => {
                    if button == MouseButton::Left && state == ElementState::Pressed {
                        mouse_captured = true;
                        window.set_cursor_visible(false);
                    }
                }
                WindowEvent::CursorMoved { position, .. } => {
                    if mouse_captured {
                        if let Some(last_pos) = last_mouse_pos {
                            let delta_x = position.x - last_pos.0;
                            let delta_y = position.y - last_pos.1;
                            camera.rotate(delta_x as f32, delta_y as f32);
                        }
                        last_mouse_pos = Some((position.x, position.y));
                    }
                }
                WindowEvent::RedrawRequested => {
                    let now = Instant::now();
                    let dt = (now - last_frame).as_secs_f32();
                    last_frame = now;
                    controller.update_camera(&mut camera, dt);

                    let t = start.elapsed().as_secs_f32();
                    render_scene(&mut scene, &camera, &cube, &lit, t, &mut stats);
                    render_overlay(&mut overlay, &mut scene, overlay_blend, t, &mut stats);

                    let present = Instant::now();
                    if let Err(err) = present_frame(&mut surface, scene.framebuffer()) {
                        log::error!("present failed: {err}");
                        elwt.exit();
                        return;
                    }
                    stats.present_us = present.elapsed().as_secs_f64() * 1e6;

                    frame_count += 1;
                    if fps_timer.elapsed().as_secs() >= 1 {
                        log::info!("FPS: {frame_count} | {width}x{height}");
                        stats.log_summary();
                        frame_count = 0;
                        fps_timer = Instant::now();
                    }
                }
                _ => {}
            },
            Event::AboutToWait => window.request_redraw(),
            _ => {}
        }
    })?;
    Ok(())
}

fn render_scene(
    scene: &mut Renderer3D,
    camera: &Camera3D,
    cube: &CubeMesh,
    lit: &LambertProcessor<'_>,
    t: f32,
    stats: &mut FrameStats,
) {
    let clear = Instant::now();
    scene.clear(Color::SKY);
    stats.clear_us = clear.elapsed().as_secs_f64() * 1e6;

    let draw = Instant::now();
    scene.set_camera(camera);
    scene.set_blend(None);
    scene.set_depth_test(Some(DepthTest::Less));

    let vb = cube.vertex_buffer();
    for (i, offset) in [Vec3::ZERO, Vec3::new(-2.2, 0.0, -1.5), Vec3::new(2.2, 0.0, -1.5)]
        .into_iter()
        .enumerate()
    {
        let spin = t * (0.6 + 0.3 * i as f32);
        scene.set_model(
            Mat4::from_translation(offset) * Mat4::from_rotation_y(spin) * Mat4::from_rotation_x(spin * 0.7),
        );
        scene.draw_vertex_buffer(&vb, DrawMode::Triangles, lit);
    }

    // wireframe floor grid
    scene.set_model(Mat4::IDENTITY);
    let grid = rendering::FlatColorProcessor(Color::gray(60));
    for k in -5..=5 {
        let k = k as f32;
        let line = |a: Vec3, b: Vec3| (Vertex::from_position(a), Vertex::from_position(b));
        for (a, b) in [
            line(Vec3::new(k, -1.0, -5.0), Vec3::new(k, -1.0, 5.0)),
            line(Vec3::new(-5.0, -1.0, k), Vec3::new(5.0, -1.0, k)),
        ] {
            scene.draw_line(a, b, 1.0, &grid);
        }
    }
    stats.scene_us = draw.elapsed().as_secs_f64() * 1e6;
}

fn render_overlay(
    overlay: &mut Renderer2D,
    scene: &mut Renderer3D,
    blend: bool,
    t: f32,
    stats: &mut FrameStats,
) {
    perf_scope!("overlay");
    let start = Instant::now();
    overlay.swap_framebuffer(scene.framebuffer_mut());

    overlay.set_blend(blend.then_some(BlendMode::Alpha));
    let mut hud = Camera2D::new(Vec2::new(80.0, 80.0));
    hud.rotation = t;
    hud.zoom = 1.0 + 0.1 * (t * 2.0).sin();
    overlay.set_transform(hud.transform());
    overlay.draw_triangle_colors(
        [Vec2::new(0.0, -50.0), Vec2::new(43.0, 25.0), Vec2::new(-43.0, 25.0)],
        [
            Color::rgba(255, 0, 0, 180),
            Color::rgba(0, 255, 0, 180),
            Color::rgba(0, 0, 255, 180),
        ],
    );

    overlay.set_transform(glam::Mat3::IDENTITY);
    overlay.set_blend(None);
    overlay.draw_line(Vec2::new(10.0, 150.0), Vec2::new(150.0, 150.0), 3.0, Color::WHITE);
    overlay.draw_point(Vec2::new(80.0, 80.0), 5.0, Color::YELLOW);

    overlay.swap_framebuffer(scene.framebuffer_mut());
    stats.overlay_us = start.elapsed().as_secs_f64() * 1e6;
}

fn present_frame(
    surface: &mut softbuffer::Surface<Arc<winit::window::Window>, Arc<winit::window::Window>>,
    framebuffer: &Framebuffer,
) -> Result<(), Box<dyn std::error::Error>> {
    let (Some(w), Some(h)) = (
        NonZeroU32::new(framebuffer.width() as u32),
        NonZeroU32::new(framebuffer.height() as u32),
    ) else {
        return Ok(());
    };
    surface.resize(w, h)?;
    let mut buffer = surface.buffer_mut()?;
    framebuffer.copy_to_argb(&mut buffer);
    buffer.present()?;
    Ok(())
}
