/// Packed RGBA8 color, the pixel type of every framebuffer and of the
/// fragment hook's output.
use bytemuck::{Pod, Zeroable};
use glam::Vec4;

/// One pixel: 8 bits per channel, laid out R, G, B, A in memory so a slice of
/// colors is directly the row-major RGBA byte stream presenters upload.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const GREEN: Color = Color::rgb(0, 255, 0);
    pub const BLUE: Color = Color::rgb(0, 0, 255);
    pub const YELLOW: Color = Color::rgb(255, 255, 0);
    pub const SKY: Color = Color::rgb(0x87, 0xCE, 0xEB);

    #[inline]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    #[inline]
    pub const fn gray(v: u8) -> Self {
        Self::rgb(v, v, v)
    }

    /// Normalized channels in [0, 1].
    #[inline]
    pub fn to_vec4(self) -> Vec4 {
        Vec4::new(self.r as f32, self.g as f32, self.b as f32, self.a as f32) * (1.0 / 255.0)
    }

    /// Inverse of [`Color::to_vec4`]; channels are clamped and rounded.
    #[inline]
    pub fn from_vec4(v: Vec4) -> Self {
        let c = (v.clamp(Vec4::ZERO, Vec4::ONE) * 255.0).round();
        Self::rgba(c.x as u8, c.y as u8, c.z as u8, c.w as u8)
    }

    /// Channel-wise interpolation, `t` in [0, 1].
    #[inline]
    pub fn lerp(self, other: Color, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Self::rgba(
            mix(self.r, other.r),
            mix(self.g, other.g),
            mix(self.b, other.b),
            mix(self.a, other.a),
        )
    }

    /// Channel-wise product, treating 255 as 1.0.
    #[inline]
    pub fn modulate(self, other: Color) -> Self {
        let mul = |a: u8, b: u8| ((a as u32 * b as u32 + 127) / 255) as u8;
        Self::rgba(
            mul(self.r, other.r),
            mul(self.g, other.g),
            mul(self.b, other.b),
            mul(self.a, other.a),
        )
    }

    /// Scale RGB by a light factor, alpha untouched.
    #[inline]
    pub fn shade(self, light: f32) -> Self {
        // 8.8 fixed point keeps the channel multiply in integer math
        let light_fp = (light.max(0.0) * 256.0) as u32;
        let scale = |c: u8| ((c as u32 * light_fp) >> 8).min(255) as u8;
        Self::rgba(scale(self.r), scale(self.g), scale(self.b), self.a)
    }

    /// Pack as `0xAARRGGBB` (the word order softbuffer-style presenters take).
    #[inline]
    pub const fn to_argb_u32(self) -> u32 {
        ((self.a as u32) << 24) | ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    #[inline]
    pub const fn from_argb_u32(v: u32) -> Self {
        Self::rgba((v >> 16) as u8, (v >> 8) as u8, v as u8, (v >> 24) as u8)
    }
}

impl From<[u8; 4]> for Color {
    #[inline]
    fn from(c: [u8; 4]) -> Self {
        Self::rgba(c[0], c[1], c[2], c[3])
    }
}

impl From<Color> for [u8; 4] {
    #[inline]
    fn from(c: Color) -> Self {
        [c.r, c.g, c.b, c.a]
    }
}
