/// Per-vertex attribute storage.
///
/// Attributes keep their native scalar type (bytes for colors, floats for
/// positions) so one interpolation path serves every layout. Each operation
/// matches on the scalar kind once and then runs a tight per-component loop.
use super::color::Color;
use glam::{Vec2, Vec3, Vec4};

/// Number of attribute slots carried by a [`Vertex`].
pub const MAX_ATTRIBUTES: usize = 4;

/// Maximum components per attribute.
pub const MAX_COMPONENTS: usize = 4;

/// Named attribute slots.
#[repr(usize)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum AttributeSlot {
    Position = 0,
    Texcoord = 1,
    Normal = 2,
    Color = 3,
}

impl AttributeSlot {
    pub const ALL: [AttributeSlot; MAX_ATTRIBUTES] = [
        AttributeSlot::Position,
        AttributeSlot::Texcoord,
        AttributeSlot::Normal,
        AttributeSlot::Color,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Scalar type of an attribute's components.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    F32,
}

impl ScalarKind {
    pub const fn size_bytes(self) -> usize {
        match self {
            ScalarKind::U8 | ScalarKind::I8 => 1,
            ScalarKind::U16 | ScalarKind::I16 => 2,
            ScalarKind::U32 | ScalarKind::I32 | ScalarKind::F32 => 4,
        }
    }

    /// Divisor that maps the kind's positive range onto [0, 1].
    const fn norm_scale(self) -> f32 {
        match self {
            ScalarKind::U8 => u8::MAX as f32,
            ScalarKind::I8 => i8::MAX as f32,
            ScalarKind::U16 => u16::MAX as f32,
            ScalarKind::I16 => i16::MAX as f32,
            ScalarKind::U32 => u32::MAX as f32,
            ScalarKind::I32 => i32::MAX as f32,
            ScalarKind::F32 => 1.0,
        }
    }
}

/// Up to four components stored in their native type.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Components {
    U8([u8; MAX_COMPONENTS]),
    I8([i8; MAX_COMPONENTS]),
    U16([u16; MAX_COMPONENTS]),
    I16([i16; MAX_COMPONENTS]),
    U32([u32; MAX_COMPONENTS]),
    I32([i32; MAX_COMPONENTS]),
    F32([f32; MAX_COMPONENTS]),
}

// Runs `$body` with `$v` bound to the component array and `$t` to its scalar
// type, rebuilding the same variant from the result.
macro_rules! map_components {
    ($value:expr, |$v:ident, $t:ident| $body:expr) => {
        match $value {
            Components::U8($v) => {
                type $t = u8;
                Components::U8($body)
            }
            Components::I8($v) => {
                type $t = i8;
                Components::I8($body)
            }
            Components::U16($v) => {
                type $t = u16;
                Components::U16($body)
            }
            Components::I16($v) => {
                type $t = i16;
                Components::I16($body)
            }
            Components::U32($v) => {
                type $t = u32;
                Components::U32($body)
            }
            Components::I32($v) => {
                type $t = i32;
                Components::I32($body)
            }
            Components::F32($v) => {
                type $t = f32;
                Components::F32($body)
            }
        }
    };
}

/// Float to component conversion. Integer kinds round to nearest and
/// saturate (`as` casts from float saturate; NaN becomes 0).
trait FromF32: Copy {
    fn from_f32(v: f32) -> Self;
    fn to_f32(self) -> f32;
}

macro_rules! impl_from_f32_int {
    ($($t:ty),*) => {$(
        impl FromF32 for $t {
            #[inline(always)]
            fn from_f32(v: f32) -> Self {
                v.round() as $t
            }
            #[inline(always)]
            fn to_f32(self) -> f32 {
                self as f32
            }
        }
    )*};
}

impl_from_f32_int!(u8, i8, u16, i16, u32, i32);

impl FromF32 for f32 {
    #[inline(always)]
    fn from_f32(v: f32) -> Self {
        v
    }
    #[inline(always)]
    fn to_f32(self) -> f32 {
        self
    }
}

impl Components {
    pub const fn zeroed(kind: ScalarKind) -> Self {
        match kind {
            ScalarKind::U8 => Components::U8([0; MAX_COMPONENTS]),
            ScalarKind::I8 => Components::I8([0; MAX_COMPONENTS]),
            ScalarKind::U16 => Components::U16([0; MAX_COMPONENTS]),
            ScalarKind::I16 => Components::I16([0; MAX_COMPONENTS]),
            ScalarKind::U32 => Components::U32([0; MAX_COMPONENTS]),
            ScalarKind::I32 => Components::I32([0; MAX_COMPONENTS]),
            ScalarKind::F32 => Components::F32([0.0; MAX_COMPONENTS]),
        }
    }

    pub const fn kind(&self) -> ScalarKind {
        match self {
            Components::U8(_) => ScalarKind::U8,
            Components::I8(_) => ScalarKind::I8,
            Components::U16(_) => ScalarKind::U16,
            Components::I16(_) => ScalarKind::I16,
            Components::U32(_) => ScalarKind::U32,
            Components::I32(_) => ScalarKind::I32,
            Components::F32(_) => ScalarKind::F32,
        }
    }

    /// Component `i` as float (raw numeric value, no normalization).
    #[inline]
    pub fn get(&self, i: usize) -> f32 {
        debug_assert!(i < MAX_COMPONENTS);
        match self {
            Components::U8(v) => v[i] as f32,
            Components::I8(v) => v[i] as f32,
            Components::U16(v) => v[i] as f32,
            Components::I16(v) => v[i] as f32,
            Components::U32(v) => v[i] as f32,
            Components::I32(v) => v[i] as f32,
            Components::F32(v) => v[i],
        }
    }

    /// All components as floats.
    #[inline]
    pub fn to_array(&self) -> [f32; MAX_COMPONENTS] {
        match self {
            Components::U8(v) => v.map(|c| c as f32),
            Components::I8(v) => v.map(|c| c as f32),
            Components::U16(v) => v.map(|c| c as f32),
            Components::I16(v) => v.map(|c| c as f32),
            Components::U32(v) => v.map(|c| c as f32),
            Components::I32(v) => v.map(|c| c as f32),
            Components::F32(v) => *v,
        }
    }

    /// Store float values, converting into this value's kind.
    #[inline]
    pub fn with_array(&self, values: [f32; MAX_COMPONENTS]) -> Self {
        map_components!(self, |v, T| {
            let _ = v;
            values.map(<T as FromF32>::from_f32)
        })
    }

    /// Apply `f(component_index, value)` to the first `size` components.
    #[inline]
    fn map_n(&self, size: usize, mut f: impl FnMut(usize, f32) -> f32) -> Self {
        map_components!(self, |v, T| {
            let mut out = *v;
            for (i, c) in out.iter_mut().enumerate().take(size) {
                *c = <T as FromF32>::from_f32(f(i, <T as FromF32>::to_f32(*c)));
            }
            out
        })
    }
}

impl Default for Components {
    fn default() -> Self {
        Components::zeroed(ScalarKind::F32)
    }
}

/// One attribute slot of a vertex.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Attribute {
    pub value: Components,
    /// Number of meaningful components (1..=4).
    pub size: u8,
    /// Unused attributes are never read by interpolation or shading.
    pub used: bool,
}

impl Default for Attribute {
    fn default() -> Self {
        Self::UNUSED
    }
}

impl Attribute {
    pub const UNUSED: Attribute = Attribute {
        value: Components::F32([0.0; MAX_COMPONENTS]),
        size: 0,
        used: false,
    };

    #[inline]
    pub fn new(value: Components, size: usize) -> Self {
        Self {
            value,
            size: size.min(MAX_COMPONENTS) as u8,
            used: size > 0,
        }
    }

    /// Float attribute from up to four values.
    pub fn from_f32(values: &[f32]) -> Self {
        let mut v = [0.0; MAX_COMPONENTS];
        let n = values.len().min(MAX_COMPONENTS);
        v[..n].copy_from_slice(&values[..n]);
        Self::new(Components::F32(v), n)
    }

    /// Unsigned byte attribute from up to four values.
    pub fn from_u8(values: &[u8]) -> Self {
        let mut v = [0; MAX_COMPONENTS];
        let n = values.len().min(MAX_COMPONENTS);
        v[..n].copy_from_slice(&values[..n]);
        Self::new(Components::U8(v), n)
    }

    #[inline]
    pub fn kind(&self) -> ScalarKind {
        self.value.kind()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.size as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Component `i` as float; zero when unused or out of range.
    #[inline]
    pub fn component(&self, i: usize) -> f32 {
        if !self.used || i >= self.len() {
            return 0.0;
        }
        self.value.get(i)
    }

    /// Component `i` mapped to [0, 1] for integer kinds (floats unchanged).
    #[inline]
    pub fn normalized(&self, i: usize) -> f32 {
        self.component(i) / self.kind().norm_scale()
    }

    /// Linear interpolation towards `other`. The result keeps `self`'s kind.
    #[inline]
    pub fn lerp(&self, other: &Attribute, t: f32) -> Attribute {
        if !self.used {
            return *self;
        }
        let b = other.value.to_array();
        Attribute {
            value: self.value.map_n(self.len(), |i, a| a + (b[i] - a) * t),
            ..*self
        }
    }

    /// Weighted combination `a*w[0] + b*w[1] + c*w[2]`.
    #[inline]
    pub fn barycentric(a: &Attribute, b: &Attribute, c: &Attribute, w: [f32; 3]) -> Attribute {
        if !a.used {
            return *a;
        }
        let bv = b.value.to_array();
        let cv = c.value.to_array();
        Attribute {
            value: a
                .value
                .map_n(a.len(), |i, av| av * w[0] + bv[i] * w[1] + cv[i] * w[2]),
            ..*a
        }
    }

    /// Multiply every meaningful component by `factor`.
    #[inline]
    pub fn scale(&mut self, factor: f32) {
        if self.used {
            self.value = self.value.map_n(self.len(), |_, v| v * factor);
        }
    }
}

/// A vertex: a fixed set of attribute slots.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Vertex {
    pub attributes: [Attribute; MAX_ATTRIBUTES],
}

impl Vertex {
    pub const EMPTY: Vertex = Vertex {
        attributes: [Attribute::UNUSED; MAX_ATTRIBUTES],
    };

    /// Vertex with only a position.
    pub fn from_position(p: Vec3) -> Self {
        let mut v = Self::EMPTY;
        v.set_position(p);
        v
    }

    #[inline]
    pub fn attribute(&self, slot: AttributeSlot) -> &Attribute {
        &self.attributes[slot.index()]
    }

    #[inline]
    pub fn attribute_mut(&mut self, slot: AttributeSlot) -> &mut Attribute {
        &mut self.attributes[slot.index()]
    }

    #[inline]
    pub fn set_attribute(&mut self, slot: AttributeSlot, attribute: Attribute) {
        self.attributes[slot.index()] = attribute;
    }

    #[inline]
    pub fn is_used(&self, slot: AttributeSlot) -> bool {
        self.attributes[slot.index()].used
    }

    /// Position with missing components defaulting to (0, 0, 0, 1).
    #[inline]
    pub fn position(&self) -> Vec4 {
        let a = self.attribute(AttributeSlot::Position);
        let w = if a.len() >= 4 { a.component(3) } else { 1.0 };
        Vec4::new(a.component(0), a.component(1), a.component(2), w)
    }

    #[inline]
    pub fn set_position(&mut self, p: Vec3) {
        self.set_attribute(AttributeSlot::Position, Attribute::from_f32(&p.to_array()));
    }

    #[inline]
    pub fn texcoord(&self) -> Vec2 {
        let a = self.attribute(AttributeSlot::Texcoord);
        Vec2::new(a.component(0), a.component(1))
    }

    #[inline]
    pub fn set_texcoord(&mut self, uv: Vec2) {
        self.set_attribute(AttributeSlot::Texcoord, Attribute::from_f32(&uv.to_array()));
    }

    #[inline]
    pub fn normal(&self) -> Vec3 {
        let a = self.attribute(AttributeSlot::Normal);
        Vec3::new(a.component(0), a.component(1), a.component(2))
    }

    #[inline]
    pub fn set_normal(&mut self, n: Vec3) {
        self.set_attribute(AttributeSlot::Normal, Attribute::from_f32(&n.to_array()));
    }

    /// Vertex color; white when the slot is unused so it modulates neutrally.
    #[inline]
    pub fn color(&self) -> Color {
        let a = self.attribute(AttributeSlot::Color);
        if !a.used {
            return Color::WHITE;
        }
        let alpha = if a.len() >= 4 { a.normalized(3) } else { 1.0 };
        Color::from_vec4(Vec4::new(a.normalized(0), a.normalized(1), a.normalized(2), alpha))
    }

    #[inline]
    pub fn set_color(&mut self, c: Color) {
        self.set_attribute(AttributeSlot::Color, Attribute::from_u8(&[c.r, c.g, c.b, c.a]));
    }

    /// Interpolate every used slot towards `other`.
    #[inline]
    pub fn lerp(&self, other: &Vertex, t: f32) -> Vertex {
        let mut out = *self;
        for (o, b) in out.attributes.iter_mut().zip(other.attributes.iter()) {
            if o.used {
                *o = o.lerp(b, t);
            }
        }
        out
    }

    /// Barycentric combination of three vertices over their used slots.
    #[inline]
    pub fn barycentric(a: &Vertex, b: &Vertex, c: &Vertex, w: [f32; 3]) -> Vertex {
        let mut out = *a;
        for i in 0..MAX_ATTRIBUTES {
            if out.attributes[i].used {
                out.attributes[i] =
                    Attribute::barycentric(&a.attributes[i], &b.attributes[i], &c.attributes[i], w);
            }
        }
        out
    }
}
