/// Programmable stages of a draw call.
///
/// A [`Processor`] bundles the per-vertex and per-fragment hooks the pipeline
/// calls. Every hook has a default, so an implementation overrides only what
/// it customizes. The implementing value doubles as the uniform block: the
/// hooks receive `&self` and may read any state stored in it.
///
/// Processors run on several rasterizer threads at once and must be `Sync`.
/// Hooks are expected to be pure; they get no mutable access to the renderer.
use super::attribute::Vertex;
use super::clip::{self, ClipPolygon, ClipVertex};
use super::color::Color;
use super::projection::{self, ScreenVertex, Viewport};
use super::rasterizer::{self, RasterState, RenderTarget};
use super::texture::Texture;
use crate::math;
use glam::{Mat4, Vec3, Vec4};

/// Transforms handed to the vertex hook.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Matrices {
    pub model: Mat4,
    /// Inverse-transpose of the model's upper 3x3, for normals.
    pub normal: Mat4,
    /// `projection * view * model`
    pub mvp: Mat4,
}

impl Matrices {
    pub fn new(model: Mat4, view: Mat4, projection: Mat4) -> Self {
        Self {
            model,
            normal: math::normal_matrix(&model),
            mvp: projection * view * model,
        }
    }
}

impl Default for Matrices {
    fn default() -> Self {
        Self {
            model: Mat4::IDENTITY,
            normal: Mat4::IDENTITY,
            mvp: Mat4::IDENTITY,
        }
    }
}

/// What the fragment hook may know about the pixel being shaded.
#[derive(Copy, Clone, Debug)]
pub struct FragmentContext<'s> {
    pub x: i32,
    pub y: i32,
    /// Interpolated depth in the primitive's convention (smaller is nearer).
    pub depth: f32,
    /// The framebuffer pixel before this fragment lands.
    pub dst: Color,
    pub front_facing: bool,
    /// Render state cached for the draw call.
    pub state: &'s RasterState,
}

pub trait Processor: Sync {
    /// Return the clip-space position of `vertex`. May rewrite attributes,
    /// e.g. move normals into world space for lighting.
    fn vertex(&self, vertex: &mut Vertex, matrices: &Matrices) -> Vec4 {
        matrices.mvp * vertex.position()
    }

    /// Clip a triangle's polygon in place; fewer than three vertices left
    /// means nothing is drawn.
    fn clip_triangle(&self, polygon: &mut ClipPolygon) {
        clip::clip_polygon(polygon);
    }

    fn clip_line(&self, a: &ClipVertex, b: &ClipVertex) -> Option<[ClipVertex; 2]> {
        clip::clip_line(a, b)
    }

    fn clip_point(&self, v: &ClipVertex) -> bool {
        clip::clip_point(v)
    }

    fn project(&self, v: &ClipVertex, viewport: &Viewport) -> ScreenVertex {
        projection::project_perspective_correct(v, viewport)
    }

    /// Fill one projected triangle, returning the number of pixels written.
    fn rasterize_triangle(
        &self,
        target: &mut RenderTarget<'_>,
        tri: [&ScreenVertex; 3],
        state: &RasterState,
    ) -> usize
    where
        Self: Sized,
    {
        rasterizer::rasterize_triangle(self, target, tri, state)
    }

    /// Shade one fragment. `color` starts out white.
    fn fragment(&self, ctx: &FragmentContext<'_>, vertex: &Vertex, color: &mut Color) {
        let _ = ctx;
        *color = vertex.color();
    }
}

/// All default hooks: MVP transform, vertex color.
#[derive(Copy, Clone, Debug, Default)]
pub struct DefaultProcessor;

impl Processor for DefaultProcessor {}

/// Paints every fragment one color.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FlatColorProcessor(pub Color);

impl Processor for FlatColorProcessor {
    #[inline]
    fn fragment(&self, _: &FragmentContext<'_>, _: &Vertex, color: &mut Color) {
        *color = self.0;
    }
}

/// Samples a texture at the interpolated texcoord, tinted by vertex color.
#[derive(Copy, Clone, Debug)]
pub struct TextureProcessor<'t> {
    pub texture: &'t Texture<'t>,
}

impl<'t> TextureProcessor<'t> {
    pub fn new(texture: &'t Texture<'t>) -> Self {
        Self { texture }
    }
}

impl Processor for TextureProcessor<'_> {
    #[inline]
    fn fragment(&self, _: &FragmentContext<'_>, vertex: &Vertex, color: &mut Color) {
        *color = self
            .texture
            .sample(vertex.texcoord())
            .modulate(vertex.color());
    }
}

/// Ambient plus one directional light, optionally textured.
#[derive(Copy, Clone, Debug)]
pub struct LambertProcessor<'t> {
    /// Direction towards the light, world space, normalized.
    pub light_dir: Vec3,
    pub ambient: f32,
    pub diffuse: f32,
    pub texture: Option<&'t Texture<'t>>,
}

impl Default for LambertProcessor<'_> {
    fn default() -> Self {
        Self {
            light_dir: Vec3::new(0.4, 1.0, 0.3).normalize(),
            ambient: 0.35,
            diffuse: 0.65,
            texture: None,
        }
    }
}

impl<'t> LambertProcessor<'t> {
    pub fn with_texture(mut self, texture: &'t Texture<'t>) -> Self {
        self.texture = Some(texture);
        self
    }

    pub fn with_light(mut self, light_dir: Vec3) -> Self {
        self.light_dir = light_dir.normalize_or_zero();
        self
    }

    /// Light intensity for a world-space normal, in [0, 1].
    #[inline]
    pub fn intensity(&self, normal: Vec3) -> f32 {
        let lambert = normal.normalize_or_zero().dot(self.light_dir).max(0.0);
        (self.ambient + self.diffuse * lambert).clamp(0.0, 1.0)
    }
}

impl Processor for LambertProcessor<'_> {
    fn vertex(&self, vertex: &mut Vertex, matrices: &Matrices) -> Vec4 {
        let local = vertex.position();
        let n = (matrices.normal * vertex.normal().extend(0.0)).truncate();
        vertex.set_normal(n.normalize_or_zero());
        vertex.set_position((matrices.model * local).truncate());
        matrices.mvp * local
    }

    fn fragment(&self, _: &FragmentContext<'_>, vertex: &Vertex, color: &mut Color) {
        let base = match self.texture {
            Some(tex) => tex.sample(vertex.texcoord()).modulate(vertex.color()),
            None => vertex.color(),
        };
        *color = base.shade(self.intensity(vertex.normal()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rendering::attribute::AttributeSlot;
    use glam::Vec2;

    fn ctx(state: &RasterState) -> FragmentContext<'_> {
        FragmentContext {
            x: 0,
            y: 0,
            depth: 1.0,
            dst: Color::BLACK,
            front_facing: true,
            state,
        }
    }

    #[test]
    fn default_vertex_applies_mvp() {
        let m = Matrices::new(
            Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0)),
            Mat4::IDENTITY,
            Mat4::IDENTITY,
        );
        let mut v = Vertex::from_position(Vec3::ZERO);
        let h = DefaultProcessor.vertex(&mut v, &m);
        assert_eq!(h, Vec4::new(1.0, 2.0, 3.0, 1.0));
        assert_eq!(v.position(), Vec4::new(0.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn default_fragment_copies_vertex_color() {
        let state = RasterState::default();
        let mut v = Vertex::EMPTY;
        v.set_color(Color::YELLOW);
        let mut out = Color::WHITE;
        DefaultProcessor.fragment(&ctx(&state), &v, &mut out);
        assert_eq!(out, Color::YELLOW);
    }

    #[test]
    fn flat_color_ignores_attributes() {
        let state = RasterState::default();
        let mut v = Vertex::EMPTY;
        v.set_color(Color::YELLOW);
        let mut out = Color::WHITE;
        FlatColorProcessor(Color::BLUE).fragment(&ctx(&state), &v, &mut out);
        assert_eq!(out, Color::BLUE);
    }

    #[test]
    fn texture_fragment_samples_at_texcoord() {
        let tex = Texture::checkerboard(2, 1, Color::RED, Color::GREEN);
        let proc = TextureProcessor::new(&tex);
        let state = RasterState::default();
        let mut v = Vertex::EMPTY;
        v.set_texcoord(Vec2::new(0.75, 0.25));
        let mut out = Color::WHITE;
        proc.fragment(&ctx(&state), &v, &mut out);
        assert_eq!(out, Color::GREEN);
    }

    #[test]
    fn lambert_moves_normals_to_world_space() {
        let lit = LambertProcessor::default().with_light(Vec3::Y);
        let m = Matrices::new(
            Mat4::from_rotation_z(std::f32::consts::FRAC_PI_2),
            Mat4::IDENTITY,
            Mat4::IDENTITY,
        );
        let mut v = Vertex::from_position(Vec3::X);
        v.set_normal(Vec3::X);
        lit.vertex(&mut v, &m);
        assert!(v.normal().abs_diff_eq(Vec3::Y, 1e-5), "{:?}", v.normal());
        assert!(v.position().truncate().abs_diff_eq(Vec3::Y, 1e-5));
        assert!(v.is_used(AttributeSlot::Normal));
    }

    #[test]
    fn lambert_intensity_is_ambient_in_shadow() {
        let lit = LambertProcessor::default().with_light(Vec3::Y);
        assert!((lit.intensity(Vec3::NEG_Y) - lit.ambient).abs() < 1e-6);
        assert!((lit.intensity(Vec3::Y) - 1.0).abs() < 1e-6);
    }
}
