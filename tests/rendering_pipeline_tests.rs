use glam::{Mat4, Vec2, Vec3};
use soft_raster::math;
use soft_raster::rendering::clip::ClipVertex;
use soft_raster::rendering::projection;
use soft_raster::rendering::texture::{Filter, Wrap};
use soft_raster::rendering::{
    BlendMode, Color, DefaultProcessor, DepthTest, DrawMode, FaceCulling, FlatColorProcessor,
    FragmentContext, LambertProcessor, Processor, Renderer2D, Renderer3D, ScreenVertex, Texture,
    Vertex, VertexBuffer, Viewport,
};

/// Writes the interpolated texcoord into red/green.
struct TexcoordProcessor;

impl Processor for TexcoordProcessor {
    fn fragment(&self, _: &FragmentContext<'_>, vertex: &Vertex, color: &mut Color) {
        let uv = vertex.texcoord().clamp(Vec2::ZERO, Vec2::ONE) * 255.0;
        *color = Color::rgb(uv.x.round() as u8, uv.y.round() as u8, 0);
    }
}

/// Same output, but projected without perspective correction.
struct AffineTexcoordProcessor;

impl Processor for AffineTexcoordProcessor {
    fn project(&self, v: &ClipVertex, viewport: &Viewport) -> ScreenVertex {
        projection::project(v, viewport)
    }

    fn fragment(&self, ctx: &FragmentContext<'_>, vertex: &Vertex, color: &mut Color) {
        TexcoordProcessor.fragment(ctx, vertex, color);
    }
}

/// Red for front faces, blue for back faces.
struct FacingProcessor;

impl Processor for FacingProcessor {
    fn fragment(&self, ctx: &FragmentContext<'_>, _: &Vertex, color: &mut Color) {
        *color = if ctx.front_facing { Color::RED } else { Color::BLUE };
    }
}

/// Leaves the fragment color untouched.
struct Passthrough;

impl Processor for Passthrough {
    fn fragment(&self, _: &FragmentContext<'_>, _: &Vertex, _: &mut Color) {}
}

fn vertex(p: Vec3) -> Vertex {
    Vertex::from_position(p)
}

fn textured(p: Vec3, uv: Vec2) -> Vertex {
    let mut v = Vertex::from_position(p);
    v.set_texcoord(uv);
    v
}

/// Floor quad receding from z = -1 to z = -5 under a 90 degree camera at
/// the origin, texcoord u running from 0 (near) to 1 (far).
fn draw_floor<P: Processor>(processor: &P) -> Renderer3D {
    let mut r = Renderer3D::new(64, 64);
    r.set_projection(math::perspective(90f32.to_radians(), 1.0, 0.1, 100.0));
    r.set_cull(FaceCulling::None);
    r.clear(Color::BLACK);
    let q = [
        textured(Vec3::new(-1.0, -1.0, -1.0), Vec2::new(0.0, 0.0)),
        textured(Vec3::new(1.0, -1.0, -1.0), Vec2::new(0.0, 1.0)),
        textured(Vec3::new(1.0, -1.0, -5.0), Vec2::new(1.0, 1.0)),
        textured(Vec3::new(-1.0, -1.0, -5.0), Vec2::new(1.0, 0.0)),
    ];
    r.draw_triangle([q[0], q[1], q[2]], processor);
    r.draw_triangle([q[0], q[2], q[3]], processor);
    r
}

#[test]
fn texcoords_are_perspective_correct() {
    // World midpoint z = -3 projects near row 43; there u must be close to
    // the true value (about 0.46), not the screen-linear 0.81.
    let r = draw_floor(&TexcoordProcessor);
    let u = r.framebuffer().get(32, 43).unwrap().r as f32 / 255.0;
    assert!((u - 0.46).abs() < 0.08, "perspective-correct u = {u}");

    let r = draw_floor(&AffineTexcoordProcessor);
    let u = r.framebuffer().get(32, 43).unwrap().r as f32 / 255.0;
    assert!(u > 0.7, "affine u = {u}");
}

#[test]
fn depth_test_keeps_nearest_regardless_of_draw_order() {
    let tri = |z: f32| {
        [
            vertex(Vec3::new(-1.0, -1.0, z)),
            vertex(Vec3::new(1.0, -1.0, z)),
            vertex(Vec3::new(0.0, 1.0, z)),
        ]
    };
    for near_first in [true, false] {
        let mut r = Renderer3D::new(32, 32);
        r.set_camera(&soft_raster::Camera3D::new(Vec3::new(0.0, 0.0, 4.0), 1.0));
        r.clear(Color::BLACK);
        let near = (tri(1.0), FlatColorProcessor(Color::GREEN));
        let far = (tri(-1.0), FlatColorProcessor(Color::BLUE));
        let order = if near_first { [near, far] } else { [far, near] };
        for (t, p) in order {
            r.draw_triangle(t, &p);
        }
        assert_eq!(
            r.framebuffer().get(16, 18),
            Some(Color::GREEN),
            "near_first = {near_first}"
        );
    }
}

#[test]
fn quad_at_unit_view_depth_stays_behind_nearer_quad() {
    // clip w is exactly 1 at view depth 1
    let quad = |z: f32| {
        [
            vertex(Vec3::new(-0.5, -0.5, z)),
            vertex(Vec3::new(0.5, -0.5, z)),
            vertex(Vec3::new(0.5, 0.5, z)),
            vertex(Vec3::new(-0.5, 0.5, z)),
        ]
    };
    for near_first in [true, false] {
        let mut r = Renderer3D::new(32, 32);
        r.set_projection(math::perspective(90f32.to_radians(), 1.0, 0.1, 100.0));
        r.set_cull(FaceCulling::None);
        r.set_depth_test(Some(DepthTest::Less));
        r.clear(Color::BLACK);
        let near = (quad(-0.9), FlatColorProcessor(Color::GREEN));
        let far = (quad(-1.0), FlatColorProcessor(Color::BLUE));
        let order = if near_first { [near, far] } else { [far, near] };
        for (q, p) in order {
            r.draw_triangle([q[0], q[1], q[2]], &p);
            r.draw_triangle([q[0], q[2], q[3]], &p);
        }
        assert_eq!(
            r.framebuffer().get(16, 16),
            Some(Color::GREEN),
            "near_first = {near_first}"
        );
    }
}

#[test]
fn greater_depth_test_keeps_farthest() {
    let mut r = Renderer3D::new(16, 16);
    r.set_depth_test(Some(DepthTest::Greater));
    // orthographic: ndc z is the depth
    r.set_config(soft_raster::RasterConfig {
        clear_depth: f32::NEG_INFINITY,
        ..soft_raster::RasterConfig::default()
    });
    r.clear(Color::BLACK);
    let quad = |z: f32| {
        [
            vertex(Vec3::new(-1.0, -1.0, z)),
            vertex(Vec3::new(1.0, -1.0, z)),
            vertex(Vec3::new(-1.0, 1.0, z)),
        ]
    };
    r.draw_triangle(quad(0.8), &FlatColorProcessor(Color::YELLOW));
    r.draw_triangle(quad(-0.3), &FlatColorProcessor(Color::RED));
    assert_eq!(r.framebuffer().get(2, 12), Some(Color::YELLOW));
}

#[test]
fn fragment_sees_facing() {
    let mut r = Renderer3D::new(16, 16);
    r.set_cull(FaceCulling::None);
    r.set_depth_test(None);
    let ccw = [
        vertex(Vec3::new(-1.0, -1.0, 0.0)),
        vertex(Vec3::new(1.0, -1.0, 0.0)),
        vertex(Vec3::new(-1.0, 1.0, 0.0)),
    ];
    r.draw_triangle(ccw, &FacingProcessor);
    assert_eq!(r.framebuffer().get(2, 12), Some(Color::RED));
    r.draw_triangle([ccw[0], ccw[2], ccw[1]], &FacingProcessor);
    assert_eq!(r.framebuffer().get(2, 12), Some(Color::BLUE));
}

#[test]
fn fragment_color_starts_white() {
    let mut r = Renderer2D::new(8, 8);
    r.clear(Color::BLACK);
    let tri = [Vec2::new(0.0, 0.0), Vec2::new(8.0, 0.0), Vec2::new(0.0, 8.0)];
    r.draw_triangle_with(tri.map(|p| vertex(p.extend(0.0))), &Passthrough);
    assert_eq!(r.framebuffer().get(1, 1), Some(Color::WHITE));
}

#[test]
fn vertex_colors_interpolate_across_triangle() {
    let mut r = Renderer2D::new(64, 64);
    r.draw_triangle_colors(
        [Vec2::new(0.0, 0.0), Vec2::new(63.0, 0.0), Vec2::new(0.0, 63.0)],
        [Color::RED, Color::GREEN, Color::BLUE],
    );
    assert_eq!(r.framebuffer().get(0, 0), Some(Color::RED));
    let mid = r.framebuffer().get(31, 0).unwrap();
    assert!(mid.r > 100 && mid.g > 100 && mid.b < 10, "{mid:?}");
}

#[test]
fn thick_horizontal_line_covers_five_rows() {
    let mut r = Renderer2D::new(40, 20);
    r.clear(Color::BLACK);
    r.draw_line(Vec2::new(5.0, 10.0), Vec2::new(30.0, 10.0), 5.0, Color::RED);
    for y in 0..20 {
        let lit = r.framebuffer().get(15, y) == Some(Color::RED);
        assert_eq!(lit, (8..=12).contains(&y), "row {y}");
    }
}

#[test]
fn textured_triangle_samples_with_wrap() {
    let mut tex = Texture::checkerboard(4, 1, Color::RED, Color::BLUE);
    assert_eq!(tex.sample(Vec2::new(1.25, 0.1)), tex.sample(Vec2::new(0.25, 0.1)));
    tex.set_wrap(Wrap::Clamp);
    tex.set_filter(Filter::Nearest);

    let mut r = Renderer2D::new(16, 16);
    r.draw_triangle_textured(
        [Vec2::new(0.0, 0.0), Vec2::new(16.0, 0.0), Vec2::new(0.0, 16.0)],
        [Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0)],
        &tex,
    );
    // texel (0, 0) is red, texel (1, 0) blue
    assert_eq!(r.framebuffer().get(1, 1), Some(Color::RED));
    assert_eq!(r.framebuffer().get(5, 1), Some(Color::BLUE));
}

#[test]
fn alpha_blend_overlay_mixes_with_scene() {
    let mut r = Renderer2D::new(8, 8);
    r.clear(Color::rgb(0, 0, 0));
    r.set_blend(Some(BlendMode::Alpha));
    r.draw_triangle(
        [Vec2::new(0.0, 0.0), Vec2::new(8.0, 0.0), Vec2::new(0.0, 8.0)],
        Color::rgba(255, 255, 255, 128),
    );
    let px = r.framebuffer().get(1, 1).unwrap();
    assert!((120..=136).contains(&px.r), "{px:?}");
}

#[test]
fn indexed_cube_draws_through_vertex_buffer() {
    // 8 corners, 12 triangles, counter-clockwise from outside
    let positions: Vec<f32> = (0..8)
        .flat_map(|i| {
            [
                if i & 1 != 0 { 0.5 } else { -0.5 },
                if i & 2 != 0 { 0.5 } else { -0.5 },
                if i & 4 != 0 { 0.5 } else { -0.5 },
            ]
        })
        .collect();
    let colors = [200u8; 32];
    let indices: [u16; 36] = [
        0, 2, 1, 1, 2, 3, // -z
        4, 5, 6, 5, 7, 6, // +z
        0, 1, 4, 1, 5, 4, // -y
        2, 6, 3, 3, 6, 7, // +y
        0, 4, 2, 2, 4, 6, // -x
        1, 3, 5, 3, 7, 5, // +x
    ];
    let vb = VertexBuffer::new(8)
        .with_positions(&positions, 3)
        .with_colors(&colors)
        .with_indices(&indices);

    let mut r = Renderer3D::new(48, 48);
    let mut camera = soft_raster::Camera3D::new(Vec3::new(1.5, 1.5, 2.5), 1.0);
    camera.look_at(Vec3::ZERO);
    r.set_camera(&camera);
    r.set_model(Mat4::IDENTITY);
    r.clear(Color::BLACK);
    let written = r.draw_vertex_buffer(&vb, DrawMode::Triangles, &DefaultProcessor);
    assert!(written > 0);
    assert_eq!(r.framebuffer().get(24, 24), Some(Color::rgba(200, 200, 200, 200)));
    let depth = r.depthbuffer().get(24, 24).unwrap();
    let camera_distance = camera.position.length();
    assert!(depth < camera_distance && depth > camera_distance - 1.0, "{depth}");

    // back faces are culled: front-face culling leaves only the far side
    r.clear(Color::BLACK);
    r.set_cull(FaceCulling::Front);
    r.draw_vertex_buffer(&vb, DrawMode::Triangles, &DefaultProcessor);
    let far_depth = r.depthbuffer().get(24, 24).unwrap();
    assert!(far_depth > depth, "{far_depth} <= {depth}");
}

#[test]
fn lambert_lights_faces_towards_the_light() {
    let lit = LambertProcessor::default().with_light(Vec3::Z);
    let face = |normal: Vec3| {
        let mut tri = [
            vertex(Vec3::new(-1.0, -1.0, 0.0)),
            vertex(Vec3::new(1.0, -1.0, 0.0)),
            vertex(Vec3::new(-1.0, 1.0, 0.0)),
        ];
        for v in &mut tri {
            v.set_color(Color::WHITE);
            v.set_normal(normal);
        }
        tri
    };
    let mut r = Renderer3D::new(8, 8);
    r.draw_triangle(face(Vec3::Z), &lit);
    let bright = r.framebuffer().get(1, 6).unwrap();
    r.clear(Color::BLACK);
    r.draw_triangle(face(Vec3::NEG_Z), &lit);
    let dark = r.framebuffer().get(1, 6).unwrap();
    assert!(bright.r > 250, "{bright:?}");
    assert!(dark.r < 100 && dark.r > 80, "{dark:?}");
}

#[test]
fn invalid_renderers_draw_nothing() {
    let mut r = Renderer3D::new(0, 16);
    assert!(!r.is_valid());
    r.clear(Color::RED);
    let tri = [
        vertex(Vec3::new(-1.0, -1.0, 0.0)),
        vertex(Vec3::new(1.0, -1.0, 0.0)),
        vertex(Vec3::new(-1.0, 1.0, 0.0)),
    ];
    assert_eq!(r.draw_triangle(tri, &DefaultProcessor), 0);

    let mut r = Renderer2D::new(16, 0);
    assert_eq!(r.draw_line(Vec2::ZERO, Vec2::new(5.0, 5.0), 1.0, Color::RED), 0);
}
