/// Stateful 3D and 2D front ends over the draw pipeline.
///
/// A renderer owns its buffers and its render state. State changes go
/// through setters between draw calls; each draw call snapshots the state
/// into a [`DrawState`] so hooks see one consistent configuration. Every
/// draw call takes `&mut self`, so a renderer cannot be drawn into from two
/// threads at once.
use super::attribute::Vertex;
use super::blend::{BlendMode, DepthTest, FaceCulling};
use super::color::Color;
use super::framebuffer::{Depthbuffer, Framebuffer};
use super::pipeline::{self, DrawMode, DrawState};
use super::processor::{
    DefaultProcessor, FlatColorProcessor, Matrices, Processor, TextureProcessor,
};
use super::projection::{DepthMode, Viewport};
use super::rasterizer::{RasterState, RenderTarget};
use super::texture::Texture;
use super::vertex_buffer::VertexBuffer;
use crate::camera::Camera3D;
use crate::config::RasterConfig;
use glam::{Mat3, Mat4, Vec2, Vec3, Vec4};

/// Configuration of a [`Renderer3D`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RenderState3D {
    pub model: Mat4,
    pub view: Mat4,
    pub projection: Mat4,
    pub viewport: Viewport,
    pub blend: Option<BlendMode>,
    pub depth_test: Option<DepthTest>,
    pub cull: FaceCulling,
    /// Point size used by [`DrawMode::Points`].
    pub point_size: f32,
    /// Line width used by [`DrawMode::Lines`].
    pub line_width: f32,
}

impl RenderState3D {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            model: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            viewport,
            blend: None,
            depth_test: Some(DepthTest::Less),
            cull: FaceCulling::Back,
            point_size: 1.0,
            line_width: 1.0,
        }
    }
}

pub struct Renderer3D {
    framebuffer: Framebuffer,
    depthbuffer: Depthbuffer,
    state: RenderState3D,
    config: RasterConfig,
}

impl Renderer3D {
    pub fn new(width: usize, height: usize) -> Self {
        Self::with_config(width, height, RasterConfig::default())
    }

    pub fn with_config(width: usize, height: usize, config: RasterConfig) -> Self {
        Self {
            framebuffer: Framebuffer::new(width, height),
            depthbuffer: Depthbuffer::new(width, height),
            state: RenderState3D::new(Viewport::full(width, height)),
            config,
        }
    }

    /// Both buffers were allocated.
    pub fn is_valid(&self) -> bool {
        self.framebuffer.is_valid() && self.depthbuffer.is_valid()
    }

    pub fn width(&self) -> usize {
        self.framebuffer.width()
    }

    pub fn height(&self) -> usize {
        self.framebuffer.height()
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    pub fn framebuffer_mut(&mut self) -> &mut Framebuffer {
        &mut self.framebuffer
    }

    pub fn depthbuffer(&self) -> &Depthbuffer {
        &self.depthbuffer
    }

    pub fn state(&self) -> &RenderState3D {
        &self.state
    }

    pub fn config(&self) -> &RasterConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: RasterConfig) {
        log::debug!("renderer3d: config {config:?}");
        self.config = config;
    }

    /// Replace both buffers; the viewport is reset to cover the new size.
    pub fn resize(&mut self, width: usize, height: usize) {
        if (width, height) == (self.width(), self.height()) {
            return;
        }
        log::debug!("renderer3d: resize to {width}x{height}");
        self.framebuffer = Framebuffer::new(width, height);
        self.depthbuffer = Depthbuffer::new(width, height);
        self.state.viewport = Viewport::full(width, height);
    }

    pub fn set_model(&mut self, model: Mat4) {
        self.state.model = model;
    }

    pub fn set_view(&mut self, view: Mat4) {
        self.state.view = view;
    }

    pub fn set_projection(&mut self, projection: Mat4) {
        self.state.projection = projection;
    }

    /// View and projection from a camera.
    pub fn set_camera(&mut self, camera: &Camera3D) {
        self.state.view = camera.view_matrix();
        self.state.projection = camera.projection_matrix();
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.state.viewport = viewport;
    }

    pub fn set_blend(&mut self, blend: Option<BlendMode>) {
        self.state.blend = blend;
    }

    pub fn set_depth_test(&mut self, depth_test: Option<DepthTest>) {
        self.state.depth_test = depth_test;
    }

    pub fn set_cull(&mut self, cull: FaceCulling) {
        self.state.cull = cull;
    }

    pub fn set_point_size(&mut self, size: f32) {
        self.state.point_size = size.max(1.0);
    }

    pub fn set_line_width(&mut self, width: f32) {
        self.state.line_width = width.max(1.0);
    }

    pub fn matrices(&self) -> Matrices {
        Matrices::new(self.state.model, self.state.view, self.state.projection)
    }

    /// Clear color and depth; depth goes back to `config.clear_depth`.
    pub fn clear(&mut self, color: Color) {
        self.framebuffer.clear_with(color, &self.config);
        self.depthbuffer.clear_with(self.config.clear_depth, &self.config);
    }

    fn draw_state(&self) -> DrawState {
        let s = &self.state;
        DrawState {
            matrices: self.matrices(),
            raster: RasterState {
                viewport: s.viewport,
                blend: s.blend,
                depth_test: s.depth_test,
                cull: s.cull,
                depth_mode: DepthMode::for_projection(&s.projection),
                config: self.config,
            },
            point_size: s.point_size,
            line_width: s.line_width,
        }
    }

    fn target(&mut self) -> RenderTarget<'_> {
        RenderTarget::new(&mut self.framebuffer, Some(&mut self.depthbuffer))
    }

    pub fn draw_triangle<P: Processor>(&mut self, tri: [Vertex; 3], processor: &P) -> usize {
        let state = self.draw_state();
        pipeline::draw_triangle(processor, &mut self.target(), &state, tri)
    }

    pub fn draw_line<P: Processor>(
        &mut self,
        a: Vertex,
        b: Vertex,
        thickness: f32,
        processor: &P,
    ) -> usize {
        let state = DrawState {
            line_width: thickness,
            ..self.draw_state()
        };
        pipeline::draw_line(processor, &mut self.target(), &state, a, b)
    }

    pub fn draw_point<P: Processor>(&mut self, v: Vertex, size: f32, processor: &P) -> usize {
        let state = DrawState {
            point_size: size,
            ..self.draw_state()
        };
        pipeline::draw_point(processor, &mut self.target(), &state, v)
    }

    pub fn draw_vertex_buffer<P: Processor>(
        &mut self,
        vb: &VertexBuffer<'_>,
        mode: DrawMode,
        processor: &P,
    ) -> usize {
        let state = self.draw_state();
        pipeline::draw_vertex_buffer(processor, &mut self.target(), &state, vb, mode)
    }
}

/// Configuration of a [`Renderer2D`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RenderState2D {
    /// Maps drawing coordinates to framebuffer pixels.
    pub transform: Mat3,
    pub blend: Option<BlendMode>,
    pub viewport: Viewport,
    pub point_size: f32,
    pub line_width: f32,
}

impl RenderState2D {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            transform: Mat3::IDENTITY,
            blend: None,
            viewport,
            point_size: 1.0,
            line_width: 1.0,
        }
    }
}

/// Embed a 2D affine transform in a 4x4 matrix acting on `(x, y, z, 1)`.
pub fn embed_affine2d(m: &Mat3) -> Mat4 {
    Mat4::from_cols(
        m.x_axis.extend(0.0) * Vec4::new(1.0, 1.0, 0.0, 0.0),
        m.y_axis.extend(0.0) * Vec4::new(1.0, 1.0, 0.0, 0.0),
        Vec4::Z,
        Vec4::new(m.z_axis.x, m.z_axis.y, 0.0, 1.0),
    )
}

/// Orthographic mapping from framebuffer pixels (y down) to clip space, so
/// that pixel `(x, y)` projects back onto itself through `viewport`.
pub fn pixel_to_clip(viewport: &Viewport) -> Mat4 {
    let w = viewport.width.max(1) as f32;
    let h = viewport.height.max(1) as f32;
    Mat4::from_cols(
        Vec4::new(2.0 / w, 0.0, 0.0, 0.0),
        Vec4::new(0.0, -2.0 / h, 0.0, 0.0),
        Vec4::Z,
        Vec4::new(
            -1.0 - 2.0 * viewport.x as f32 / w,
            1.0 + 2.0 * viewport.y as f32 / h,
            0.0,
            1.0,
        ),
    )
}

/// 2D renderer. Geometry is given in drawing coordinates, mapped to pixels by
/// `transform`, and runs through the same pipeline as 3D with no depth test
/// and no culling.
pub struct Renderer2D {
    framebuffer: Framebuffer,
    state: RenderState2D,
    config: RasterConfig,
}

impl Renderer2D {
    pub fn new(width: usize, height: usize) -> Self {
        Self::with_config(width, height, RasterConfig::default())
    }

    pub fn with_config(width: usize, height: usize, config: RasterConfig) -> Self {
        Self {
            framebuffer: Framebuffer::new(width, height),
            state: RenderState2D::new(Viewport::full(width, height)),
            config,
        }
    }

    /// Draw on top of an existing framebuffer, e.g. one a 3D pass rendered.
    pub fn from_framebuffer(framebuffer: Framebuffer, config: RasterConfig) -> Self {
        let viewport = Viewport::full(framebuffer.width(), framebuffer.height());
        Self {
            framebuffer,
            state: RenderState2D::new(viewport),
            config,
        }
    }

    pub fn into_framebuffer(self) -> Framebuffer {
        self.framebuffer
    }

    /// Exchange framebuffers with another owner, e.g. to draw an overlay
    /// into a 3D renderer's output. The viewport follows the new size.
    pub fn swap_framebuffer(&mut self, other: &mut Framebuffer) {
        std::mem::swap(&mut self.framebuffer, other);
        self.state.viewport = Viewport::full(self.width(), self.height());
    }

    pub fn is_valid(&self) -> bool {
        self.framebuffer.is_valid()
    }

    pub fn width(&self) -> usize {
        self.framebuffer.width()
    }

    pub fn height(&self) -> usize {
        self.framebuffer.height()
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    pub fn framebuffer_mut(&mut self) -> &mut Framebuffer {
        &mut self.framebuffer
    }

    pub fn state(&self) -> &RenderState2D {
        &self.state
    }

    pub fn config(&self) -> &RasterConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: RasterConfig) {
        log::debug!("renderer2d: config {config:?}");
        self.config = config;
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        if (width, height) == (self.width(), self.height()) {
            return;
        }
        log::debug!("renderer2d: resize to {width}x{height}");
        self.framebuffer = Framebuffer::new(width, height);
        self.state.viewport = Viewport::full(width, height);
    }

    pub fn set_transform(&mut self, transform: Mat3) {
        self.state.transform = transform;
    }

    pub fn set_blend(&mut self, blend: Option<BlendMode>) {
        self.state.blend = blend;
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.state.viewport = viewport;
    }

    pub fn set_point_size(&mut self, size: f32) {
        self.state.point_size = size.max(1.0);
    }

    pub fn set_line_width(&mut self, width: f32) {
        self.state.line_width = width.max(1.0);
    }

    pub fn clear(&mut self, color: Color) {
        self.framebuffer.clear_with(color, &self.config);
    }

    /// Pixel-space rectangle fill, bypassing the pipeline and the transform.
    pub fn fill_rect(&mut self, x: i32, y: i32, width: i32, height: i32, color: Color) {
        self.framebuffer.fill_rect(x, y, width, height, color);
    }

    fn draw_state(&self) -> DrawState {
        let s = &self.state;
        DrawState {
            matrices: Matrices::new(
                embed_affine2d(&s.transform),
                Mat4::IDENTITY,
                pixel_to_clip(&s.viewport),
            ),
            raster: RasterState {
                viewport: s.viewport,
                blend: s.blend,
                depth_test: None,
                cull: FaceCulling::None,
                depth_mode: DepthMode::NdcZ,
                config: self.config,
            },
            point_size: s.point_size,
            line_width: s.line_width,
        }
    }

    fn vertex(p: Vec2) -> Vertex {
        Vertex::from_position(Vec3::new(p.x, p.y, 0.0))
    }

    /// Draw a triangle through a custom processor.
    pub fn draw_triangle_with<P: Processor>(&mut self, tri: [Vertex; 3], processor: &P) -> usize {
        let state = self.draw_state();
        let mut target = RenderTarget::new(&mut self.framebuffer, None);
        pipeline::draw_triangle(processor, &mut target, &state, tri)
    }

    /// Solid-color triangle.
    pub fn draw_triangle(&mut self, points: [Vec2; 3], color: Color) -> usize {
        self.draw_triangle_with(points.map(Self::vertex), &FlatColorProcessor(color))
    }

    /// Triangle with per-vertex colors, interpolated.
    pub fn draw_triangle_colors(&mut self, points: [Vec2; 3], colors: [Color; 3]) -> usize {
        let mut tri = points.map(Self::vertex);
        for (v, c) in tri.iter_mut().zip(colors) {
            v.set_color(c);
        }
        self.draw_triangle_with(tri, &DefaultProcessor)
    }

    /// Textured triangle.
    pub fn draw_triangle_textured(
        &mut self,
        points: [Vec2; 3],
        texcoords: [Vec2; 3],
        texture: &Texture<'_>,
    ) -> usize {
        let mut tri = points.map(Self::vertex);
        for (v, uv) in tri.iter_mut().zip(texcoords) {
            v.set_texcoord(uv);
        }
        self.draw_triangle_with(tri, &TextureProcessor::new(texture))
    }

    pub fn draw_line(&mut self, a: Vec2, b: Vec2, thickness: f32, color: Color) -> usize {
        let state = DrawState {
            line_width: thickness,
            ..self.draw_state()
        };
        let mut target = RenderTarget::new(&mut self.framebuffer, None);
        pipeline::draw_line(
            &FlatColorProcessor(color),
            &mut target,
            &state,
            Self::vertex(a),
            Self::vertex(b),
        )
    }

    pub fn draw_point(&mut self, p: Vec2, size: f32, color: Color) -> usize {
        let state = DrawState {
            point_size: size,
            ..self.draw_state()
        };
        let mut target = RenderTarget::new(&mut self.framebuffer, None);
        pipeline::draw_point(&FlatColorProcessor(color), &mut target, &state, Self::vertex(p))
    }

    /// Draw a buffer of 2D (or 3D, z ignored by the mapping) positions.
    pub fn draw_vertex_buffer<P: Processor>(
        &mut self,
        vb: &VertexBuffer<'_>,
        mode: DrawMode,
        processor: &P,
    ) -> usize {
        let state = self.draw_state();
        let mut target = RenderTarget::new(&mut self.framebuffer, None);
        pipeline::draw_vertex_buffer(processor, &mut target, &state, vb, mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math;

    fn red_vertex(p: Vec3) -> Vertex {
        let mut v = Vertex::from_position(p);
        v.set_color(Color::RED);
        v
    }

    #[test]
    fn pixel_mapping_round_trips_through_the_viewport() {
        let vp = Viewport::new(10, 20, 64, 32);
        let m = pixel_to_clip(&vp);
        for (x, y) in [(10.0, 20.0), (41.0, 33.0), (73.0, 51.0)] {
            let h = m * Vec4::new(x, y, 0.0, 1.0);
            assert_eq!(vp.ndc_to_screen(h.x, h.y), (x as i32, y as i32));
        }
    }

    #[test]
    fn embedded_affine_matches_mat3() {
        let m = math::translate2d(Vec2::new(3.0, -2.0)) * math::rotate2d(0.7);
        let p = Vec2::new(1.5, 4.0);
        let expected = math::transform_point2d(&m, p);
        let got = embed_affine2d(&m) * Vec4::new(p.x, p.y, 0.0, 1.0);
        assert!(got.truncate().truncate().abs_diff_eq(expected, 1e-5));
        assert_eq!(got.z, 0.0);
        assert_eq!(got.w, 1.0);
    }

    #[test]
    fn renderer2d_triangle_lands_in_pixel_space() {
        let mut r = Renderer2D::new(20, 20);
        r.clear(Color::BLACK);
        r.draw_triangle(
            [Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0), Vec2::new(0.0, 10.0)],
            Color::RED,
        );
        assert_eq!(r.framebuffer().get(2, 2), Some(Color::RED));
        assert_eq!(r.framebuffer().get(15, 15), Some(Color::BLACK));
        assert_eq!(r.framebuffer().get(0, 0), Some(Color::RED));
    }

    #[test]
    fn renderer2d_transform_moves_geometry() {
        let mut r = Renderer2D::new(32, 32);
        r.clear(Color::BLACK);
        r.set_transform(math::translate2d(Vec2::new(16.0, 16.0)));
        r.draw_point(Vec2::ZERO, 1.0, Color::GREEN);
        assert_eq!(r.framebuffer().get(16, 16), Some(Color::GREEN));
        assert_eq!(r.framebuffer().get(0, 0), Some(Color::BLACK));
    }

    #[test]
    fn renderer2d_blends_when_enabled() {
        let mut r = Renderer2D::new(8, 8);
        r.clear(Color::rgba(0, 0, 200, 255));
        r.set_blend(Some(BlendMode::Lighten));
        r.draw_triangle(
            [Vec2::new(0.0, 0.0), Vec2::new(8.0, 0.0), Vec2::new(0.0, 8.0)],
            Color::rgba(100, 0, 0, 255),
        );
        assert_eq!(r.framebuffer().get(1, 1), Some(Color::rgba(100, 0, 200, 255)));
    }

    #[test]
    fn renderer3d_culls_back_faces_by_default() {
        let mut r = Renderer3D::new(16, 16);
        r.clear(Color::BLACK);
        let ccw = [
            red_vertex(Vec3::new(-1.0, -1.0, 0.0)),
            red_vertex(Vec3::new(1.0, -1.0, 0.0)),
            red_vertex(Vec3::new(-1.0, 1.0, 0.0)),
        ];
        let cw = [ccw[0], ccw[2], ccw[1]];
        assert!(r.draw_triangle(ccw, &DefaultProcessor) > 0);
        r.clear(Color::BLACK);
        assert_eq!(r.draw_triangle(cw, &DefaultProcessor), 0);
        r.set_cull(FaceCulling::None);
        assert!(r.draw_triangle(cw, &DefaultProcessor) > 0);
    }

    #[test]
    fn renderer3d_depth_resolves_overlap() {
        let mut r = Renderer3D::new(32, 32);
        let camera = Camera3D::new(Vec3::new(0.0, 0.0, 3.0), 1.0);
        r.set_camera(&camera);
        r.clear(Color::BLACK);

        let quad = |z: f32, c: Color| {
            [
                Vec3::new(-1.0, -1.0, z),
                Vec3::new(1.0, -1.0, z),
                Vec3::new(1.0, 1.0, z),
                Vec3::new(-1.0, 1.0, z),
            ]
            .map(|p| {
                let mut v = Vertex::from_position(p);
                v.set_color(c);
                v
            })
        };
        let near = quad(0.5, Color::GREEN);
        let far = quad(-0.5, Color::BLUE);
        for q in [near, far] {
            r.draw_triangle([q[0], q[1], q[2]], &DefaultProcessor);
            r.draw_triangle([q[0], q[2], q[3]], &DefaultProcessor);
        }
        assert_eq!(r.framebuffer().get(16, 16), Some(Color::GREEN));
        let d = r.depthbuffer().get(16, 16).unwrap();
        assert!((d - 2.5).abs() < 1e-3, "view depth {d}");
    }

    #[test]
    fn unit_w_quad_is_ranked_by_view_depth() {
        let quad = |z: f32, c: Color| {
            [
                Vec3::new(-0.5, -0.5, z),
                Vec3::new(0.5, -0.5, z),
                Vec3::new(0.5, 0.5, z),
                Vec3::new(-0.5, 0.5, z),
            ]
            .map(|p| {
                let mut v = Vertex::from_position(p);
                v.set_color(c);
                v
            })
        };
        // the far quad sits at view depth 1, where clip w is exactly 1
        let near = quad(-0.9, Color::GREEN);
        let far = quad(-1.0, Color::BLUE);

        for order in [[near, far], [far, near]] {
            let mut r = Renderer3D::new(32, 32);
            r.set_projection(math::perspective(90f32.to_radians(), 1.0, 0.1, 100.0));
            r.set_cull(FaceCulling::None);
            r.clear(Color::BLACK);
            for q in order {
                r.draw_triangle([q[0], q[1], q[2]], &DefaultProcessor);
                r.draw_triangle([q[0], q[2], q[3]], &DefaultProcessor);
            }
            assert_eq!(r.framebuffer().get(16, 16), Some(Color::GREEN));
            let d = r.depthbuffer().get(16, 16).unwrap();
            assert!((d - 0.9).abs() < 1e-3, "view depth {d}");
        }
    }

    #[test]
    fn swap_framebuffer_resets_viewport_to_new_size() {
        let mut r = Renderer2D::new(8, 8);
        r.set_viewport(Viewport::new(2, 2, 4, 4));
        let mut other = Framebuffer::new(20, 10);
        r.swap_framebuffer(&mut other);
        assert_eq!((r.width(), r.height()), (20, 10));
        assert_eq!(r.state().viewport, Viewport::full(20, 10));
        assert_eq!(other.width(), 8);

        r.swap_framebuffer(&mut other);
        assert_eq!(r.state().viewport, Viewport::full(8, 8));
    }

    #[test]
    fn resize_recreates_buffers() {
        let mut r = Renderer3D::new(8, 8);
        r.resize(12, 6);
        assert_eq!((r.width(), r.height()), (12, 6));
        assert_eq!(r.state().viewport, Viewport::full(12, 6));
        assert_eq!(r.depthbuffer().width(), 12);
        assert!(r.is_valid());
    }
}
