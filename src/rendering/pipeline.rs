/// Per-primitive draw path shared by the 2D and 3D renderers:
/// vertex hook, clip, project, rasterize.
///
/// Nothing here allocates. Clipped polygons live in a stack array of
/// `MAX_CLIP_VERTICES`, and so do their projected vertices.
use super::attribute::Vertex;
use super::clip::{ClipPolygon, ClipVertex, MAX_CLIP_VERTICES};
use super::processor::{Matrices, Processor};
use super::projection::ScreenVertex;
use super::rasterizer::{self, RasterState, RenderTarget};
use super::vertex_buffer::VertexBuffer;
use crate::count_call;

/// How a vertex buffer's vertices are grouped into primitives.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum DrawMode {
    Points,
    Lines,
    #[default]
    Triangles,
}

impl DrawMode {
    /// Vertices consumed per primitive.
    #[inline]
    pub const fn vertices_per_primitive(self) -> usize {
        match self {
            DrawMode::Points => 1,
            DrawMode::Lines => 2,
            DrawMode::Triangles => 3,
        }
    }
}

/// Everything a draw call reads besides its geometry and processor.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DrawState {
    pub matrices: Matrices,
    pub raster: RasterState,
    /// Side of the square drawn per point, in pixels.
    pub point_size: f32,
    /// Line thickness in pixels.
    pub line_width: f32,
}

impl Default for DrawState {
    fn default() -> Self {
        Self {
            matrices: Matrices::default(),
            raster: RasterState::default(),
            point_size: 1.0,
            line_width: 1.0,
        }
    }
}

#[inline]
fn transform<P: Processor>(processor: &P, matrices: &Matrices, mut vertex: Vertex) -> ClipVertex {
    let h = processor.vertex(&mut vertex, matrices);
    ClipVertex::new(h, vertex)
}

/// Draw one triangle. Returns the number of pixels written.
pub fn draw_triangle<P: Processor>(
    processor: &P,
    target: &mut RenderTarget<'_>,
    state: &DrawState,
    tri: [Vertex; 3],
) -> usize {
    count_call!(crate::perf::RASTER_COUNTERS.triangles_submitted);
    let clip = tri.map(|v| transform(processor, &state.matrices, v));
    let mut polygon = ClipPolygon::from_triangle(clip);
    processor.clip_triangle(&mut polygon);
    if polygon.len() < 3 {
        count_call!(crate::perf::RASTER_COUNTERS.triangles_clipped_away);
        return 0;
    }

    let viewport = state.raster.viewport;
    let mut screen = [ScreenVertex::default(); MAX_CLIP_VERTICES];
    for (sv, cv) in screen.iter_mut().zip(polygon.as_slice()) {
        *sv = processor.project(cv, &viewport);
    }

    polygon
        .fan()
        .map(|[a, b, c]| {
            processor.rasterize_triangle(target, [&screen[a], &screen[b], &screen[c]], &state.raster)
        })
        .sum()
}

/// Draw one line `state.line_width` pixels thick.
pub fn draw_line<P: Processor>(
    processor: &P,
    target: &mut RenderTarget<'_>,
    state: &DrawState,
    a: Vertex,
    b: Vertex,
) -> usize {
    let a = transform(processor, &state.matrices, a);
    let b = transform(processor, &state.matrices, b);
    let Some([a, b]) = processor.clip_line(&a, &b) else {
        return 0;
    };
    let viewport = state.raster.viewport;
    let (a, b) = (processor.project(&a, &viewport), processor.project(&b, &viewport));
    rasterizer::rasterize_thick_line(processor, target, &a, &b, state.line_width, &state.raster)
}

/// Draw one point as a `state.point_size` square.
pub fn draw_point<P: Processor>(
    processor: &P,
    target: &mut RenderTarget<'_>,
    state: &DrawState,
    v: Vertex,
) -> usize {
    let v = transform(processor, &state.matrices, v);
    if !processor.clip_point(&v) {
        return 0;
    }
    let v = processor.project(&v, &state.raster.viewport);
    rasterizer::rasterize_point(processor, target, &v, state.point_size, &state.raster)
}

/// Draw every complete primitive of `vb`. An invalid buffer draws nothing.
pub fn draw_vertex_buffer<P: Processor>(
    processor: &P,
    target: &mut RenderTarget<'_>,
    state: &DrawState,
    vb: &VertexBuffer<'_>,
    mode: DrawMode,
) -> usize {
    if let Err(err) = vb.validate() {
        log::warn!("skipping draw: {err}");
        return 0;
    }

    let per = mode.vertices_per_primitive();
    let primitives = vb.draw_count() / per;
    let mut written = 0;
    for p in 0..primitives {
        let n = p * per;
        written += match mode {
            DrawMode::Points => draw_point(processor, target, state, vb.fetch(n)),
            DrawMode::Lines => draw_line(processor, target, state, vb.fetch(n), vb.fetch(n + 1)),
            DrawMode::Triangles => draw_triangle(
                processor,
                target,
                state,
                [vb.fetch(n), vb.fetch(n + 1), vb.fetch(n + 2)],
            ),
        };
    }
    written
}
