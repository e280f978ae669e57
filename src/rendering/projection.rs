/// Clip space to integer screen space.
use super::attribute::{AttributeSlot, Vertex};
use super::clip::ClipVertex;
use crate::math;
use glam::Mat4;

/// `|w - 1|` at or below this treats a vertex as orthographic.
pub const PERSPECTIVE_EPSILON: f32 = 1e-5;

/// Rectangle of the framebuffer that normalized device coordinates map onto.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Viewport {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Viewport {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// Viewport covering a whole `width` x `height` target.
    pub fn full(width: usize, height: usize) -> Self {
        Self::new(0, 0, width as i32, height as i32)
    }

    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && y >= self.y && x < self.x + self.width && y < self.y + self.height
    }

    /// Map normalized device x/y to integer pixel coordinates, y pointing down.
    #[inline]
    pub fn ndc_to_screen(&self, ndc_x: f32, ndc_y: f32) -> (i32, i32) {
        let sx = self.x as f32 + (ndc_x + 1.0) * 0.5 * self.width as f32 + 0.5;
        let sy = self.y as f32 + (1.0 - ndc_y) * 0.5 * self.height as f32 + 0.5;
        (sx.floor() as i32, sy.floor() as i32)
    }
}

/// A projected vertex ready for rasterization.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct ScreenVertex {
    pub x: i32,
    pub y: i32,
    /// `1 / w`, the reciprocal of view depth under a perspective projection.
    pub rcp_w: f32,
    /// Normalized device z, stored under [`DepthMode::NdcZ`].
    pub z: f32,
    /// The clip-space `w` was not 1. Selects texcoord pre-division only.
    pub perspective: bool,
    /// Texture coordinates were divided by `w` and must be multiplied back
    /// by the interpolated depth per fragment.
    pub corrected: bool,
    pub vertex: Vertex,
}

/// Project a clipped vertex, pre-dividing texture coordinates by `w` when the
/// vertex is under a perspective projection.
#[inline]
pub fn project_perspective_correct(cv: &ClipVertex, viewport: &Viewport) -> ScreenVertex {
    let mut sv = project(cv, viewport);
    if sv.perspective {
        sv.vertex
            .attribute_mut(AttributeSlot::Texcoord)
            .scale(sv.rcp_w);
        sv.corrected = true;
    }
    sv
}

/// Project a clipped vertex without perspective-correct attribute scaling.
#[inline]
pub fn project(cv: &ClipVertex, viewport: &Viewport) -> ScreenVertex {
    let h = cv.h;
    let rcp_w = 1.0 / h.w;
    let (x, y) = viewport.ndc_to_screen(h.x * rcp_w, h.y * rcp_w);
    ScreenVertex {
        x,
        y,
        rcp_w,
        z: h.z * rcp_w,
        perspective: (h.w - 1.0).abs() > PERSPECTIVE_EPSILON,
        corrected: false,
        vertex: cv.vertex,
    }
}

/// Quantity a draw stores in the depth buffer. Smaller is nearer in both.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum DepthMode {
    /// Linear normalized device z.
    #[default]
    NdcZ,
    /// View depth, the reciprocal of the interpolated `1/w`.
    ViewDepth,
}

impl DepthMode {
    /// `ViewDepth` for perspective projections, `NdcZ` otherwise.
    pub fn for_projection(projection: &Mat4) -> Self {
        if math::is_perspective(projection) {
            Self::ViewDepth
        } else {
            Self::NdcZ
        }
    }
}

/// Interpolated `1/w` with weights `b`.
#[inline(always)]
pub fn interpolate_rcp_w<const N: usize>(v: [&ScreenVertex; N], b: [f32; N]) -> f32 {
    let mut rcp = 0.0;
    for k in 0..N {
        rcp += v[k].rcp_w * b[k];
    }
    rcp
}

/// Depth interpolated from per-vertex values with weights `b`.
#[inline(always)]
pub fn interpolate_depth<const N: usize>(mode: DepthMode, v: [&ScreenVertex; N], b: [f32; N]) -> f32 {
    match mode {
        DepthMode::ViewDepth => 1.0 / interpolate_rcp_w(v, b),
        DepthMode::NdcZ => {
            let mut z = 0.0;
            for k in 0..N {
                z += v[k].z * b[k];
            }
            z
        }
    }
}

/// Undo the texture-coordinate pre-division on an interpolated vertex, given
/// the interpolated `1/w`.
#[inline(always)]
pub fn restore_texcoords(vertex: &mut Vertex, rcp_w: f32) {
    vertex.attribute_mut(AttributeSlot::Texcoord).scale(1.0 / rcp_w);
}
