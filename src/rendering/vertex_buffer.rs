/// Structure-of-arrays vertex input.
///
/// Each attribute is a separate borrowed array; an absent array means the
/// attribute is unused for the whole draw. Vertices are assembled on demand
/// with [`VertexBuffer::vertex`].
use super::attribute::{Attribute, AttributeSlot, Components, Vertex, MAX_ATTRIBUTES, MAX_COMPONENTS};
use thiserror::Error;

/// Typed, borrowed attribute data.
#[derive(Copy, Clone, Debug)]
pub enum AttributeData<'a> {
    U8(&'a [u8]),
    I8(&'a [i8]),
    U16(&'a [u16]),
    I16(&'a [i16]),
    U32(&'a [u32]),
    I32(&'a [i32]),
    F32(&'a [f32]),
}

impl AttributeData<'_> {
    #[inline]
    pub fn len(&self) -> usize {
        match self {
            AttributeData::U8(d) => d.len(),
            AttributeData::I8(d) => d.len(),
            AttributeData::U16(d) => d.len(),
            AttributeData::I16(d) => d.len(),
            AttributeData::U32(d) => d.len(),
            AttributeData::I32(d) => d.len(),
            AttributeData::F32(d) => d.len(),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One attribute array: `components` scalars per vertex, tightly packed.
#[derive(Copy, Clone, Debug)]
pub struct AttributeArray<'a> {
    pub data: AttributeData<'a>,
    pub components: usize,
}

impl<'a> AttributeArray<'a> {
    pub fn new(data: AttributeData<'a>, components: usize) -> Self {
        Self { data, components }
    }

    /// Number of whole elements the array holds.
    #[inline]
    pub fn element_count(&self) -> usize {
        if self.components == 0 {
            0
        } else {
            self.data.len() / self.components
        }
    }

    /// Element `index` as an attribute value. Out-of-range reads return an
    /// unused, zeroed attribute.
    pub fn element(&self, index: usize) -> Attribute {
        let n = self.components.min(MAX_COMPONENTS);
        if n == 0 || index >= self.element_count() {
            return Attribute::UNUSED;
        }
        let start = index * self.components;

        macro_rules! gather {
            ($d:expr, $variant:ident, $zero:expr) => {{
                let mut v = [$zero; MAX_COMPONENTS];
                v[..n].copy_from_slice(&$d[start..start + n]);
                Components::$variant(v)
            }};
        }

        let value = match self.data {
            AttributeData::U8(d) => gather!(d, U8, 0),
            AttributeData::I8(d) => gather!(d, I8, 0),
            AttributeData::U16(d) => gather!(d, U16, 0),
            AttributeData::I16(d) => gather!(d, I16, 0),
            AttributeData::U32(d) => gather!(d, U32, 0),
            AttributeData::I32(d) => gather!(d, I32, 0),
            AttributeData::F32(d) => gather!(d, F32, 0.0),
        };
        Attribute::new(value, n)
    }
}

/// Reasons a vertex buffer cannot be drawn.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VertexBufferError {
    #[error("vertex buffer has no position array")]
    MissingPositions,
    #[error("{slot:?} array has {components} components per vertex, expected 1..=4")]
    BadComponentCount {
        slot: AttributeSlot,
        components: usize,
    },
    #[error("{slot:?} array holds {available} vertices but {required} are declared")]
    ArrayTooShort {
        slot: AttributeSlot,
        available: usize,
        required: usize,
    },
    #[error("index {value} at position {position} is out of range for {num_vertices} vertices")]
    IndexOutOfRange {
        position: usize,
        value: u16,
        num_vertices: usize,
    },
}

/// Vertex arrays plus an optional 16-bit index list.
#[derive(Copy, Clone, Debug)]
pub struct VertexBuffer<'a> {
    pub num_vertices: usize,
    pub attributes: [Option<AttributeArray<'a>>; MAX_ATTRIBUTES],
    pub indices: Option<&'a [u16]>,
}

impl<'a> VertexBuffer<'a> {
    pub fn new(num_vertices: usize) -> Self {
        Self {
            num_vertices,
            attributes: [None; MAX_ATTRIBUTES],
            indices: None,
        }
    }

    /// Positions with 2 or 3 floats per vertex.
    pub fn with_positions(self, positions: &'a [f32], components: usize) -> Self {
        self.with_attribute(
            AttributeSlot::Position,
            AttributeArray::new(AttributeData::F32(positions), components),
        )
    }

    /// Texture coordinates, 2 floats per vertex.
    pub fn with_texcoords(self, texcoords: &'a [f32]) -> Self {
        self.with_attribute(
            AttributeSlot::Texcoord,
            AttributeArray::new(AttributeData::F32(texcoords), 2),
        )
    }

    /// Normals, 3 floats per vertex.
    pub fn with_normals(self, normals: &'a [f32]) -> Self {
        self.with_attribute(
            AttributeSlot::Normal,
            AttributeArray::new(AttributeData::F32(normals), 3),
        )
    }

    /// Colors, 4 bytes (RGBA) per vertex.
    pub fn with_colors(self, colors: &'a [u8]) -> Self {
        self.with_attribute(
            AttributeSlot::Color,
            AttributeArray::new(AttributeData::U8(colors), 4),
        )
    }

    pub fn with_attribute(mut self, slot: AttributeSlot, array: AttributeArray<'a>) -> Self {
        self.attributes[slot.index()] = Some(array);
        self
    }

    pub fn with_indices(mut self, indices: &'a [u16]) -> Self {
        self.indices = Some(indices);
        self
    }

    /// Number of vertices a draw walks: the index count when indexed.
    #[inline]
    pub fn draw_count(&self) -> usize {
        self.indices.map_or(self.num_vertices, <[u16]>::len)
    }

    /// Check array lengths and index ranges.
    pub fn validate(&self) -> Result<(), VertexBufferError> {
        if self.attributes[AttributeSlot::Position.index()].is_none() {
            return Err(VertexBufferError::MissingPositions);
        }

        for slot in AttributeSlot::ALL {
            let Some(array) = &self.attributes[slot.index()] else {
                continue;
            };
            if array.components == 0 || array.components > MAX_COMPONENTS {
                return Err(VertexBufferError::BadComponentCount {
                    slot,
                    components: array.components,
                });
            }
            let available = array.element_count();
            if available < self.num_vertices {
                return Err(VertexBufferError::ArrayTooShort {
                    slot,
                    available,
                    required: self.num_vertices,
                });
            }
        }

        if let Some(indices) = self.indices {
            if let Some((position, &value)) = indices
                .iter()
                .enumerate()
                .find(|&(_, &i)| i as usize >= self.num_vertices)
            {
                return Err(VertexBufferError::IndexOutOfRange {
                    position,
                    value,
                    num_vertices: self.num_vertices,
                });
            }
        }

        Ok(())
    }

    /// Assemble vertex `index` from the attribute arrays.
    pub fn vertex(&self, index: usize) -> Vertex {
        let mut v = Vertex::EMPTY;
        for (slot, array) in v.attributes.iter_mut().zip(self.attributes.iter()) {
            if let Some(array) = array {
                *slot = array.element(index);
            }
        }
        v
    }

    /// The `n`-th vertex of the draw, resolved through the index list.
    #[inline]
    pub fn fetch(&self, n: usize) -> Vertex {
        let index = match self.indices {
            Some(indices) => indices.get(n).map_or(usize::MAX, |&i| i as usize),
            None => n,
        };
        self.vertex(index)
    }
}
