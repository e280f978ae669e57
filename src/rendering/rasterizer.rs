/// Triangle, line and point rasterization.
///
/// Triangles are walked with integer edge functions over their clamped
/// bounding box. Each row is independent: its starting edge values come from
/// the row index alone, so large triangles split their rows across rayon
/// workers with no synchronization. Within a row, `simd::LANES` pixels are
/// tested per step and only covered lanes fall through to per-pixel work.
///
/// The per-pixel path is shared by every primitive: depth test with an early
/// depth write, attribute interpolation, the processor's fragment hook, then
/// blend or overwrite.
use super::attribute::Vertex;
use super::blend::{BlendMode, DepthTest, FaceCulling};
use super::color::Color;
use super::framebuffer::{Depthbuffer, Framebuffer};
use super::processor::{FragmentContext, Processor};
use super::projection::{
    interpolate_depth, interpolate_rcp_w, restore_texcoords, DepthMode, ScreenVertex, Viewport,
};
use super::simd::{self, I32s, LANES, LANE_MASK};
use crate::config::RasterConfig;
use crate::{count_add, count_call};
use rayon::prelude::*;

/// Render state a draw call reads. Copied once per call so hooks observe a
/// consistent configuration for its whole duration.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RasterState {
    pub viewport: Viewport,
    /// `None` overwrites.
    pub blend: Option<BlendMode>,
    /// `None` disables both the comparison and the depth write.
    pub depth_test: Option<DepthTest>,
    pub cull: FaceCulling,
    /// What the depth buffer stores; fixed for the whole draw.
    pub depth_mode: DepthMode,
    pub config: RasterConfig,
}

impl Default for RasterState {
    fn default() -> Self {
        Self {
            viewport: Viewport::default(),
            blend: None,
            depth_test: None,
            cull: FaceCulling::None,
            depth_mode: DepthMode::NdcZ,
            config: RasterConfig::default(),
        }
    }
}

/// Mutable views of the buffers a draw call writes.
pub struct RenderTarget<'a> {
    color: &'a mut [Color],
    depth: Option<&'a mut [f32]>,
    width: usize,
    height: usize,
}

impl<'a> RenderTarget<'a> {
    /// A depth buffer whose size differs from the framebuffer's is ignored.
    pub fn new(framebuffer: &'a mut Framebuffer, depth: Option<&'a mut Depthbuffer>) -> Self {
        let (width, height) = (framebuffer.width(), framebuffer.height());
        let depth = depth
            .filter(|d| d.is_valid() && d.width() == width && d.height() == height)
            .map(Depthbuffer::values_mut);
        Self {
            color: framebuffer.pixels_mut(),
            depth,
            width,
            height,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn has_depth(&self) -> bool {
        self.depth.is_some()
    }

    /// Drawable pixel rectangle: the viewport clamped to the target.
    fn scissor(&self, viewport: &Viewport) -> Option<Scissor> {
        let x0 = viewport.x.max(0);
        let y0 = viewport.y.max(0);
        let x1 = (viewport.x.saturating_add(viewport.width)).min(self.width as i32) - 1;
        let y1 = (viewport.y.saturating_add(viewport.height)).min(self.height as i32) - 1;
        (x0 <= x1 && y0 <= y1 && !self.color.is_empty()).then_some(Scissor { x0, y0, x1, y1 })
    }

    /// Run the pixel pipeline at an in-bounds pixel.
    #[inline]
    fn shade<P: Processor>(
        &mut self,
        processor: &P,
        state: &RasterState,
        sample: Sample,
        vertex: impl FnOnce() -> Vertex,
    ) -> bool {
        let index = sample.y as usize * self.width + sample.x as usize;
        let depth = self.depth.as_deref_mut().map(|d| &mut d[index]);
        shade_fragment(processor, state, sample, &mut self.color[index], depth, vertex)
    }
}

/// Inclusive pixel bounds.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct Scissor {
    x0: i32,
    y0: i32,
    x1: i32,
    y1: i32,
}

impl Scissor {
    #[inline]
    fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x0 && x <= self.x1 && y >= self.y0 && y <= self.y1
    }
}

/// Where a fragment lands and what it knows before its vertex is built.
#[derive(Copy, Clone, Debug)]
struct Sample {
    x: i32,
    y: i32,
    depth: f32,
    front_facing: bool,
}

/// Depth test, early depth write, fragment hook, blend. The interpolated
/// vertex is only built once the depth test passes.
#[inline(always)]
fn shade_fragment<P: Processor>(
    processor: &P,
    state: &RasterState,
    sample: Sample,
    pixel: &mut Color,
    stored_depth: Option<&mut f32>,
    vertex: impl FnOnce() -> Vertex,
) -> bool {
    count_call!(crate::perf::RASTER_COUNTERS.pixels_covered);
    if let (Some(test), Some(stored)) = (state.depth_test, stored_depth) {
        if !test.passes(sample.depth, *stored) {
            count_call!(crate::perf::RASTER_COUNTERS.depth_failed);
            return false;
        }
        // written before shading; fragments cannot discard
        *stored = sample.depth;
        count_call!(crate::perf::RASTER_COUNTERS.depth_passed);
    }

    let vertex = vertex();
    let ctx = FragmentContext {
        x: sample.x,
        y: sample.y,
        depth: sample.depth,
        dst: *pixel,
        front_facing: sample.front_facing,
        state,
    };
    let mut color = Color::WHITE;
    processor.fragment(&ctx, &vertex, &mut color);
    *pixel = match state.blend {
        None => color,
        Some(mode) => mode.apply(ctx.dst, color),
    };
    true
}

/// Signed doubled area in screen space. Positive is back-facing: screen y
/// points down, so a counter-clockwise triangle comes out negative.
#[inline]
pub fn signed_area(a: &ScreenVertex, b: &ScreenVertex, c: &ScreenVertex) -> i64 {
    let (ax, ay) = (a.x as i64, a.y as i64);
    (b.x as i64 - ax) * (c.y as i64 - ay) - (c.x as i64 - ax) * (b.y as i64 - ay)
}

/// Per-triangle constants for the row walker.
struct TriangleSetup<'v> {
    v: [&'v ScreenVertex; 3],
    bounds: Scissor,
    /// Edge values at `(bounds.x0, bounds.y0)`.
    origin: [i32; 3],
    step_x: [i32; 3],
    step_y: [i32; 3],
    inv_area: f32,
    depth_mode: DepthMode,
    corrected: bool,
    front_facing: bool,
}

impl<'v> TriangleSetup<'v> {
    fn new(v: [&'v ScreenVertex; 3], area: i64, bounds: Scissor, depth_mode: DepthMode) -> Option<Self> {
        let [a, b, c] = v;
        let front_facing = area < 0;
        // keep inside positive whatever the winding
        let sign: i64 = if front_facing { 1 } else { -1 };

        // edge k is opposite vertex k, anchored at the next vertex
        let edges = [(b, c), (c, a), (a, b)];
        let mut origin = [0i32; 3];
        let mut step_x = [0i32; 3];
        let mut step_y = [0i32; 3];
        let span_x = (bounds.x1 - bounds.x0) as i64;
        let span_y = (bounds.y1 - bounds.y0) as i64;
        for (k, (p, q)) in edges.into_iter().enumerate() {
            let sx = sign * (q.y as i64 - p.y as i64);
            let sy = sign * (p.x as i64 - q.x as i64);
            let w = sx * (bounds.x0 as i64 - p.x as i64) + sy * (bounds.y0 as i64 - p.y as i64);
            // the edge function is linear, so its range over the box is
            // spanned by the corners
            for corner in [w + sx * span_x, w + sy * span_y, w + sx * span_x + sy * span_y] {
                i32::try_from(corner).ok()?;
            }
            origin[k] = i32::try_from(w).ok()?;
            step_x[k] = i32::try_from(sx).ok()?;
            step_y[k] = i32::try_from(sy).ok()?;
        }

        Some(Self {
            v,
            bounds,
            origin,
            step_x,
            step_y,
            inv_area: 1.0 / area.abs() as f32,
            depth_mode,
            corrected: v.iter().any(|sv| sv.corrected),
            front_facing,
        })
    }

    /// Barycentric weights for raw edge values.
    #[inline(always)]
    fn weights(&self, w: [i32; 3]) -> [f32; 3] {
        w.map(|e| e as f32 * self.inv_area)
    }

    #[allow(clippy::too_many_arguments)]
    #[inline(always)]
    fn shade_pixel<P: Processor>(
        &self,
        processor: &P,
        state: &RasterState,
        x: i32,
        y: i32,
        w: [i32; 3],
        color_row: &mut [Color],
        depth_row: &mut Option<&mut [f32]>,
    ) -> bool {
        let b = self.weights(w);
        let depth = interpolate_depth(self.depth_mode, self.v, b);
        let [va, vb, vc] = self.v;
        let corrected = self.corrected;
        let sample = Sample {
            x,
            y,
            depth,
            front_facing: self.front_facing,
        };
        let i = x as usize;
        let stored = depth_row.as_deref_mut().map(|d| &mut d[i]);
        shade_fragment(processor, state, sample, &mut color_row[i], stored, || {
            let mut vertex = Vertex::barycentric(&va.vertex, &vb.vertex, &vc.vertex, b);
            if corrected {
                restore_texcoords(&mut vertex, interpolate_rcp_w([va, vb, vc], b));
            }
            vertex
        })
    }

    /// Fill row `y`; returns pixels written.
    fn fill_row<P: Processor>(
        &self,
        processor: &P,
        state: &RasterState,
        y: i32,
        color_row: &mut [Color],
        mut depth_row: Option<&mut [f32]>,
    ) -> usize {
        let dy = y - self.bounds.y0;
        let row: [i32; 3] =
            std::array::from_fn(|k| self.origin[k].wrapping_add(dy.wrapping_mul(self.step_y[k])));
        let mut written = 0usize;
        let mut x = self.bounds.x0;

        if LANES > 1 {
            let lanes = LANES as i32;
            let stride: [I32s; 3] =
                std::array::from_fn(|k| I32s::splat(self.step_x[k].wrapping_mul(lanes)));
            let mut e: [I32s; 3] = std::array::from_fn(|k| I32s::ramp(row[k], self.step_x[k]));
            while x + lanes - 1 <= self.bounds.x1 {
                let mut inside = !I32s::outside_mask(e[0], e[1], e[2]) & LANE_MASK;
                if inside != 0 {
                    let vals = e.map(I32s::to_array);
                    while inside != 0 {
                        let lane = inside.trailing_zeros() as usize;
                        inside &= inside - 1;
                        let w = [vals[0][lane], vals[1][lane], vals[2][lane]];
                        let px = x + lane as i32;
                        written += self.shade_pixel(
                            processor,
                            state,
                            px,
                            y,
                            w,
                            color_row,
                            &mut depth_row,
                        ) as usize;
                    }
                }
                for k in 0..3 {
                    e[k] = e[k].add(stride[k]);
                }
                x += lanes;
            }
        }

        let dx = x - self.bounds.x0;
        let mut w: [i32; 3] =
            std::array::from_fn(|k| row[k].wrapping_add(dx.wrapping_mul(self.step_x[k])));
        while x <= self.bounds.x1 {
            if !simd::is_outside(w[0], w[1], w[2]) {
                written +=
                    self.shade_pixel(processor, state, x, y, w, color_row, &mut depth_row) as usize;
            }
            for k in 0..3 {
                w[k] = w[k].wrapping_add(self.step_x[k]);
            }
            x += 1;
        }
        written
    }
}

/// Rasterize a projected triangle. Returns the number of pixels written.
pub fn rasterize_triangle<P: Processor>(
    processor: &P,
    target: &mut RenderTarget<'_>,
    tri: [&ScreenVertex; 3],
    state: &RasterState,
) -> usize {
    let [a, b, c] = tri;
    let area = signed_area(a, b, c);
    if area == 0 {
        return 0;
    }
    if state.cull.rejects(area < 0) {
        count_call!(crate::perf::RASTER_COUNTERS.triangles_culled);
        return 0;
    }
    let Some(clip) = target.scissor(&state.viewport) else {
        return 0;
    };

    let bounds = Scissor {
        x0: a.x.min(b.x).min(c.x).max(clip.x0),
        y0: a.y.min(b.y).min(c.y).max(clip.y0),
        x1: a.x.max(b.x).max(c.x).min(clip.x1),
        y1: a.y.max(b.y).max(c.y).min(clip.y1),
    };
    if bounds.x0 > bounds.x1 || bounds.y0 > bounds.y1 {
        return 0;
    }
    let Some(setup) = TriangleSetup::new(tri, area, bounds, state.depth_mode) else {
        log::trace!("triangle edge values overflow i32, skipped");
        return 0;
    };
    count_call!(crate::perf::RASTER_COUNTERS.triangles_rasterized);

    let width = target.width;
    let box_w = (bounds.x1 - bounds.x0 + 1) as usize;
    let box_h = (bounds.y1 - bounds.y0 + 1) as usize;
    let parallel = state.config.should_parallelize(box_w, box_h);
    let start = bounds.y0 as usize * width;
    let end = (bounds.y1 as usize + 1) * width;
    let y0 = bounds.y0;
    let color_rows = &mut target.color[start..end];

    let written: usize = match target.depth.as_deref_mut() {
        Some(depth) => {
            let depth_rows = &mut depth[start..end];
            if parallel {
                count_call!(crate::perf::RASTER_COUNTERS.parallel_triangles);
                color_rows
                    .par_chunks_mut(width)
                    .zip(depth_rows.par_chunks_mut(width))
                    .enumerate()
                    .map(|(i, (c, d))| setup.fill_row(processor, state, y0 + i as i32, c, Some(d)))
                    .sum()
            } else {
                color_rows
                    .chunks_mut(width)
                    .zip(depth_rows.chunks_mut(width))
                    .enumerate()
                    .map(|(i, (c, d))| setup.fill_row(processor, state, y0 + i as i32, c, Some(d)))
                    .sum()
            }
        }
        None => {
            if parallel {
                count_call!(crate::perf::RASTER_COUNTERS.parallel_triangles);
                color_rows
                    .par_chunks_mut(width)
                    .enumerate()
                    .map(|(i, c)| setup.fill_row(processor, state, y0 + i as i32, c, None))
                    .sum()
            } else {
                color_rows
                    .chunks_mut(width)
                    .enumerate()
                    .map(|(i, c)| setup.fill_row(processor, state, y0 + i as i32, c, None))
                    .sum()
            }
        }
    };
    count_add!(crate::perf::RASTER_COUNTERS.fragments_shaded, written);
    written
}

/// Rasterize a one-pixel line with a 16.16 fixed-point DDA. Depth and
/// attributes are interpolated by `t = i / steps` along the major axis.
pub fn rasterize_line<P: Processor>(
    processor: &P,
    target: &mut RenderTarget<'_>,
    a: &ScreenVertex,
    b: &ScreenVertex,
    state: &RasterState,
) -> usize {
    count_call!(crate::perf::RASTER_COUNTERS.lines_rasterized);
    let Some(clip) = target.scissor(&state.viewport) else {
        return 0;
    };

    let corrected = a.corrected || b.corrected;
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let y_major = dy.abs() > dx.abs();
    let (long, short) = if y_major { (dy, dx) } else { (dx, dy) };
    let steps = long.abs();
    let dir = long.signum();
    let (inc, inv_steps) = if steps == 0 {
        (0i64, 0.0)
    } else {
        (((short as i64) << 16) / steps as i64, 1.0 / steps as f32)
    };

    let mut acc: i64 = 1 << 15;
    let mut written = 0;
    for i in 0..=steps {
        let offset = (acc >> 16) as i32;
        acc += inc;
        let (x, y) = if y_major {
            (a.x + offset, a.y + dir * i)
        } else {
            (a.x + dir * i, a.y + offset)
        };
        if !clip.contains(x, y) {
            continue;
        }
        let t = i as f32 * inv_steps;
        let depth = interpolate_depth(state.depth_mode, [a, b], [1.0 - t, t]);
        let sample = Sample {
            x,
            y,
            depth,
            front_facing: true,
        };
        written += target.shade(processor, state, sample, || {
            let mut vertex = a.vertex.lerp(&b.vertex, t);
            if corrected {
                restore_texcoords(&mut vertex, interpolate_rcp_w([a, b], [1.0 - t, t]));
            }
            vertex
        }) as usize;
    }
    count_add!(crate::perf::RASTER_COUNTERS.fragments_shaded, written);
    written
}

/// Half-width, in pixels, of the copies a thick line is built from.
///
/// The copies are offset along the minor axis, so the spread is scaled by
/// `length / major` to keep the perpendicular thickness close to `thickness`.
/// The result is exact only for axis-aligned lines.
#[inline]
pub fn thick_line_half_width(dx: i32, dy: i32, thickness: f32) -> i32 {
    let (dx, dy) = (dx as f32, dy as f32);
    let major = dx.abs().max(dy.abs());
    let spread = if major > 0.0 {
        (dx * dx + dy * dy).sqrt() / major
    } else {
        1.0
    };
    ((thickness - 1.0).max(0.0) * 0.5 * spread).round() as i32
}

/// Rasterize a line of `thickness` pixels by drawing offset copies of the
/// one-pixel line across the minor axis.
pub fn rasterize_thick_line<P: Processor>(
    processor: &P,
    target: &mut RenderTarget<'_>,
    a: &ScreenVertex,
    b: &ScreenVertex,
    thickness: f32,
    state: &RasterState,
) -> usize {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let half = thick_line_half_width(dx, dy, thickness);
    if half == 0 {
        return rasterize_line(processor, target, a, b, state);
    }

    let x_major = dx.abs() >= dy.abs();
    let mut written = 0;
    for offset in -half..=half {
        let (mut a2, mut b2) = (*a, *b);
        if x_major {
            a2.y += offset;
            b2.y += offset;
        } else {
            a2.x += offset;
            b2.x += offset;
        }
        written += rasterize_line(processor, target, &a2, &b2, state);
    }
    written
}

/// Rasterize a point as a square of side `size` centred on the vertex.
pub fn rasterize_point<P: Processor>(
    processor: &P,
    target: &mut RenderTarget<'_>,
    v: &ScreenVertex,
    size: f32,
    state: &RasterState,
) -> usize {
    count_call!(crate::perf::RASTER_COUNTERS.points_rasterized);
    let Some(clip) = target.scissor(&state.viewport) else {
        return 0;
    };

    let half = ((size.max(1.0) - 1.0) * 0.5).round() as i32;
    let depth = interpolate_depth(state.depth_mode, [v], [1.0]);
    let mut vertex = v.vertex;
    if v.corrected {
        restore_texcoords(&mut vertex, v.rcp_w);
    }

    let mut written = 0;
    for y in (v.y - half)..=(v.y + half) {
        for x in (v.x - half)..=(v.x + half) {
            if clip.contains(x, y) {
                let sample = Sample {
                    x,
                    y,
                    depth,
                    front_facing: true,
                };
                written += target.shade(processor, state, sample, || vertex) as usize;
            }
        }
    }
    count_add!(crate::perf::RASTER_COUNTERS.fragments_shaded, written);
    written
}
