/// Benchmark suite for the triangle pipeline
/// Covers the raw row walker, the full clip/project path and textured shading.
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::{Vec2, Vec3};
use soft_raster::rendering::projection::DepthMode;
use soft_raster::rendering::rasterizer::{rasterize_triangle, RasterState, RenderTarget};
use soft_raster::rendering::texture::Filter;
use soft_raster::{
    Camera3D, Color, DepthTest, Depthbuffer, DrawMode, FlatColorProcessor, Framebuffer,
    LambertProcessor, RasterConfig, Renderer2D, Renderer3D, ScreenVertex, Texture,
    TextureProcessor, Vertex, VertexBuffer, Viewport,
};

const WIDTH: usize = 1280;
const HEIGHT: usize = 720;

fn sv(x: i32, y: i32, rcp_w: f32) -> ScreenVertex {
    ScreenVertex {
        x,
        y,
        rcp_w,
        perspective: rcp_w != 1.0,
        ..Default::default()
    }
}

fn bench_fill_triangle_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("fill_triangle");
    let mut fb = Framebuffer::new(WIDTH, HEIGHT);
    let mut depth = Depthbuffer::new(WIDTH, HEIGHT);

    for size in [16, 64, 256, 700] {
        let tri = [sv(10, 10, 0.5), sv(10 + size, 10, 0.5), sv(10, 10 + size, 0.5)];
        for (name, config) in [
            ("serial", RasterConfig::single_threaded()),
            ("parallel", RasterConfig::default()),
        ] {
            let state = RasterState {
                viewport: Viewport::full(WIDTH, HEIGHT),
                depth_test: Some(DepthTest::LessEqual),
                depth_mode: DepthMode::ViewDepth,
                config,
                ..RasterState::default()
            };
            group.bench_with_input(BenchmarkId::new(name, size), &tri, |b, tri| {
                b.iter(|| {
                    depth.clear(f32::INFINITY);
                    let mut target = RenderTarget::new(&mut fb, Some(&mut depth));
                    black_box(rasterize_triangle(
                        &FlatColorProcessor(Color::RED),
                        &mut target,
                        [&tri[0], &tri[1], &tri[2]],
                        &state,
                    ))
                });
            });
        }
    }
    group.finish();
}

/// Grid of small triangles covering the screen, drawn through the full
/// vertex/clip/project path.
fn bench_draw_triangle_grid(c: &mut Criterion) {
    c.bench_function("draw_triangle_grid", |b| {
        let mut renderer = Renderer3D::new(WIDTH, HEIGHT);
        let cells = 40;
        let step = 2.0 / cells as f32;
        let mut tris = Vec::with_capacity(cells * cells * 2);
        for j in 0..cells {
            for i in 0..cells {
                let x = -1.0 + i as f32 * step;
                let y = -1.0 + j as f32 * step;
                let p = |dx: f32, dy: f32| Vertex::from_position(Vec3::new(x + dx, y + dy, 0.0));
                tris.push([p(0.0, 0.0), p(step, 0.0), p(0.0, step)]);
                tris.push([p(step, 0.0), p(step, step), p(0.0, step)]);
            }
        }
        let processor = FlatColorProcessor(Color::GREEN);

        b.iter(|| {
            renderer.clear(Color::BLACK);
            for tri in &tris {
                black_box(renderer.draw_triangle(*tri, &processor));
            }
        });
    });
}

fn bench_lit_cube(c: &mut Criterion) {
    c.bench_function("lit_textured_cube", |b| {
        let positions: Vec<f32> = (0..8)
            .flat_map(|i| {
                [
                    if i & 1 != 0 { 0.5 } else { -0.5 },
                    if i & 2 != 0 { 0.5 } else { -0.5 },
                    if i & 4 != 0 { 0.5 } else { -0.5 },
                ]
            })
            .collect();
        let normals: Vec<f32> = positions.chunks(3).flat_map(|p| Vec3::from_slice(p).normalize().to_array()).collect();
        let texcoords: Vec<f32> = (0..8).flat_map(|i| [(i & 1) as f32, ((i >> 1) & 1) as f32]).collect();
        let indices: [u16; 36] = [
            0, 2, 1, 1, 2, 3, 4, 5, 6, 5, 7, 6, 0, 1, 4, 1, 5, 4, 2, 6, 3, 3, 6, 7, 0, 4, 2, 2, 4,
            6, 1, 3, 5, 3, 7, 5,
        ];
        let vb = VertexBuffer::new(8)
            .with_positions(&positions, 3)
            .with_normals(&normals)
            .with_texcoords(&texcoords)
            .with_indices(&indices);
        let mut texture = Texture::checkerboard(256, 32, Color::WHITE, Color::gray(80));
        texture.set_filter(Filter::Bilinear);
        let lit = LambertProcessor::default().with_texture(&texture);

        let mut renderer = Renderer3D::new(WIDTH, HEIGHT);
        let mut camera = Camera3D::new(Vec3::new(1.0, 1.0, 1.6), WIDTH as f32 / HEIGHT as f32);
        camera.look_at(Vec3::ZERO);
        renderer.set_camera(&camera);

        b.iter(|| {
            renderer.clear(Color::SKY);
            black_box(renderer.draw_vertex_buffer(&vb, DrawMode::Triangles, &lit));
        });
    });
}

fn bench_2d_overlay(c: &mut Criterion) {
    c.bench_function("overlay_2d", |b| {
        let mut renderer = Renderer2D::new(WIDTH, HEIGHT);
        let texture = Texture::checkerboard(64, 8, Color::WHITE, Color::BLACK);
        let quad = [Vec2::new(100.0, 100.0), Vec2::new(612.0, 100.0), Vec2::new(100.0, 612.0)];
        let uvs = [Vec2::ZERO, Vec2::X, Vec2::Y];

        b.iter(|| {
            renderer.clear(Color::BLACK);
            black_box(renderer.draw_triangle_textured(quad, uvs, &texture));
            for k in 0..32 {
                let y = 20.0 + k as f32 * 20.0;
                black_box(renderer.draw_line(Vec2::new(10.0, y), Vec2::new(1200.0, y + 40.0), 3.0, Color::YELLOW));
            }
        });
    });
}

fn bench_texture_processor(c: &mut Criterion) {
    let mut group = c.benchmark_group("texture_sample");
    for filter in [Filter::Nearest, Filter::Bilinear] {
        let mut texture = Texture::checkerboard(128, 16, Color::RED, Color::BLUE);
        texture.set_filter(filter);
        let processor = TextureProcessor::new(&texture);
        group.bench_function(format!("{filter:?}"), |b| {
            let mut uv = Vec2::ZERO;
            b.iter(|| {
                uv = (uv + Vec2::new(0.013, 0.007)).fract();
                black_box(processor.texture.sample(black_box(uv)))
            });
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_fill_triangle_sizes,
    bench_draw_triangle_grid,
    bench_lit_cube,
    bench_2d_overlay,
    bench_texture_processor
);
criterion_main!(benches);
