/// Homogeneous clip-space clipping for points, lines and triangles.
///
/// Primitives are clipped against `w >= W_EPSILON` and the six planes of the
/// canonical volume `-w <= x, y, z <= w` before the perspective divide, so
/// nothing behind the eye ever reaches projection. Every attribute of a new
/// vertex is re-interpolated, not just its position.
use super::attribute::Vertex;
use glam::Vec4;

/// Capacity of a clipped polygon. A triangle clipped against seven planes
/// grows by at most one vertex per plane (3 + 7 = 10); the slack absorbs
/// numerically non-convex input. Exceeding it drops the primitive.
pub const MAX_CLIP_VERTICES: usize = 12;

/// Smallest `w` allowed through to the perspective divide.
pub const W_EPSILON: f32 = 1e-5;

/// A vertex in clip space with its attributes.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct ClipVertex {
    /// Homogeneous clip-space position.
    pub h: Vec4,
    pub vertex: Vertex,
}

impl ClipVertex {
    #[inline]
    pub fn new(h: Vec4, vertex: Vertex) -> Self {
        Self { h, vertex }
    }

    #[inline]
    pub fn lerp(&self, other: &ClipVertex, t: f32) -> ClipVertex {
        ClipVertex {
            h: self.h + (other.h - self.h) * t,
            vertex: self.vertex.lerp(&other.vertex, t),
        }
    }
}

/// One clipping plane; `distance >= 0` is inside.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ClipPlane {
    /// `w >= W_EPSILON`
    NearW,
    /// `sign * h[axis] <= w`
    Axis { axis: usize, sign: f32 },
}

impl ClipPlane {
    #[inline]
    pub fn distance(self, h: Vec4) -> f32 {
        match self {
            ClipPlane::NearW => h.w - W_EPSILON,
            ClipPlane::Axis { axis, sign } => h.w - sign * h[axis],
        }
    }
}

/// Clipping order: the w guard first, then x, y, z, each positive side first.
pub const CLIP_PLANES: [ClipPlane; 7] = [
    ClipPlane::NearW,
    ClipPlane::Axis { axis: 0, sign: 1.0 },
    ClipPlane::Axis { axis: 0, sign: -1.0 },
    ClipPlane::Axis { axis: 1, sign: 1.0 },
    ClipPlane::Axis { axis: 1, sign: -1.0 },
    ClipPlane::Axis { axis: 2, sign: 1.0 },
    ClipPlane::Axis { axis: 2, sign: -1.0 },
];

/// Fixed-capacity convex polygon, stored on the stack.
#[derive(Copy, Clone, Debug)]
pub struct ClipPolygon {
    vertices: [ClipVertex; MAX_CLIP_VERTICES],
    len: usize,
}

impl Default for ClipPolygon {
    fn default() -> Self {
        Self::new()
    }
}

impl ClipPolygon {
    pub fn new() -> Self {
        Self {
            vertices: [ClipVertex::default(); MAX_CLIP_VERTICES],
            len: 0,
        }
    }

    pub fn from_triangle(tri: [ClipVertex; 3]) -> Self {
        let mut poly = Self::new();
        poly.vertices[..3].copy_from_slice(&tri);
        poly.len = 3;
        poly
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Append a vertex; `false` when the polygon is already full.
    #[inline]
    pub fn push(&mut self, v: ClipVertex) -> bool {
        if self.len == MAX_CLIP_VERTICES {
            return false;
        }
        self.vertices[self.len] = v;
        self.len += 1;
        true
    }

    #[inline]
    pub fn as_slice(&self) -> &[ClipVertex] {
        &self.vertices[..self.len]
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [ClipVertex] {
        &mut self.vertices[..self.len]
    }

    /// Fan decomposition around vertex 0: `(0, i, i + 1)` for `i in 1..len-1`.
    pub fn fan(&self) -> impl Iterator<Item = [usize; 3]> + '_ {
        (1..self.len.saturating_sub(1)).map(|i| [0, i, i + 1])
    }
}

/// Point clip: accepted only if inside every plane.
#[inline]
pub fn clip_point(v: &ClipVertex) -> bool {
    CLIP_PLANES.iter().all(|p| p.distance(v.h) >= 0.0)
}

/// Parametric line clip (Liang–Barsky in homogeneous space).
/// Returns the surviving sub-segment, or `None` when nothing remains.
pub fn clip_line(a: &ClipVertex, b: &ClipVertex) -> Option<[ClipVertex; 2]> {
    let mut t0 = 0.0f32;
    let mut t1 = 1.0f32;

    for plane in CLIP_PLANES {
        let d0 = plane.distance(a.h);
        let d1 = plane.distance(b.h);

        if d0 < 0.0 && d1 < 0.0 {
            return None;
        }
        if d0 < 0.0 {
            t0 = t0.max(d0 / (d0 - d1));
        } else if d1 < 0.0 {
            t1 = t1.min(d0 / (d0 - d1));
        }
        if t0 > t1 {
            return None;
        }
    }

    let start = if t0 > 0.0 { a.lerp(b, t0) } else { *a };
    let end = if t1 < 1.0 { a.lerp(b, t1) } else { *b };
    Some([start, end])
}

/// Clip a convex polygon against a single plane into `output`.
/// Returns `false` on capacity overflow.
fn clip_against(plane: ClipPlane, input: &ClipPolygon, output: &mut ClipPolygon) -> bool {
    output.clear();
    if input.is_empty() {
        return true;
    }

    let verts = input.as_slice();
    let mut prev = verts[verts.len() - 1];
    let mut prev_d = plane.distance(prev.h);

    for &curr in verts {
        let curr_d = plane.distance(curr.h);
        let prev_inside = prev_d >= 0.0;
        let curr_inside = curr_d >= 0.0;

        let ok = match (prev_inside, curr_inside) {
            (true, true) => output.push(curr),
            (true, false) => output.push(prev.lerp(&curr, prev_d / (prev_d - curr_d))),
            (false, true) => {
                output.push(prev.lerp(&curr, prev_d / (prev_d - curr_d))) && output.push(curr)
            }
            (false, false) => true,
        };
        if !ok {
            return false;
        }

        prev = curr;
        prev_d = curr_d;
    }
    true
}

/// Clip a polygon (normally a triangle) in place against every plane.
/// Afterwards the polygon holds 0 or at least 3 vertices.
pub fn clip_polygon(polygon: &mut ClipPolygon) -> usize {
    if polygon.len() < 3 {
        polygon.clear();
        return 0;
    }

    // Trivial accept keeps the input bit-for-bit; trivial reject skips the
    // per-plane passes.
    let mut all_inside = true;
    for plane in CLIP_PLANES {
        let mut outside = 0;
        for v in polygon.as_slice() {
            if plane.distance(v.h) < 0.0 {
                outside += 1;
            }
        }
        if outside == polygon.len() {
            polygon.clear();
            return 0;
        }
        all_inside &= outside == 0;
    }
    if all_inside {
        return polygon.len();
    }

    let mut scratch = ClipPolygon::new();
    for plane in CLIP_PLANES {
        if !clip_against(plane, polygon, &mut scratch) {
            log::trace!("clipped polygon exceeded {MAX_CLIP_VERTICES} vertices, dropping it");
            polygon.clear();
            return 0;
        }
        core::mem::swap(polygon, &mut scratch);
        if polygon.len() < 3 {
            polygon.clear();
            return 0;
        }
    }
    polygon.len()
}

/// Clip a triangle. The result is a fan of 0 or 3..=MAX_CLIP_VERTICES vertices.
#[inline]
pub fn clip_triangle(tri: [ClipVertex; 3]) -> ClipPolygon {
    let mut poly = ClipPolygon::from_triangle(tri);
    clip_polygon(&mut poly);
    poly
}
