/// Sampled images in a range of packed pixel formats.
///
/// Each texture resolves its format, wrap mode and filter to plain function
/// pointers once, when created or reconfigured, so sampling never branches
/// on configuration. Multi-byte channels are stored little-endian.
use super::color::Color;
use glam::Vec2;
use std::borrow::Cow;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    Luminance8,
    LuminanceAlpha8,
    Rgb565,
    Rgba5551,
    Rgba4444,
    Rgb8,
    Rgba8,
    Luminance16,
    Rgb16,
    Rgba16,
    LuminanceF16,
    RgbF16,
    RgbaF16,
    LuminanceF32,
    RgbF32,
    RgbaF32,
}

impl PixelFormat {
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Luminance8 => 1,
            PixelFormat::LuminanceAlpha8
            | PixelFormat::Rgb565
            | PixelFormat::Rgba5551
            | PixelFormat::Rgba4444
            | PixelFormat::Luminance16
            | PixelFormat::LuminanceF16 => 2,
            PixelFormat::Rgb8 => 3,
            PixelFormat::Rgba8 | PixelFormat::LuminanceF32 => 4,
            PixelFormat::Rgb16 | PixelFormat::RgbF16 => 6,
            PixelFormat::Rgba16 | PixelFormat::RgbaF16 => 8,
            PixelFormat::RgbF32 => 12,
            PixelFormat::RgbaF32 => 16,
        }
    }

    /// Reader and writer for one pixel at a byte offset.
    fn codec(self) -> (PixelGetter, PixelSetter) {
        match self {
            PixelFormat::Luminance8 => (get_l8, set_l8),
            PixelFormat::LuminanceAlpha8 => (get_la8, set_la8),
            PixelFormat::Rgb565 => (get_rgb565, set_rgb565),
            PixelFormat::Rgba5551 => (get_rgba5551, set_rgba5551),
            PixelFormat::Rgba4444 => (get_rgba4444, set_rgba4444),
            PixelFormat::Rgb8 => (get_rgb8, set_rgb8),
            PixelFormat::Rgba8 => (get_rgba8, set_rgba8),
            PixelFormat::Luminance16 => (get_l16, set_l16),
            PixelFormat::Rgb16 => (get_rgb16, set_rgb16),
            PixelFormat::Rgba16 => (get_rgba16, set_rgba16),
            PixelFormat::LuminanceF16 => (get_lf16, set_lf16),
            PixelFormat::RgbF16 => (get_rgbf16, set_rgbf16),
            PixelFormat::RgbaF16 => (get_rgbaf16, set_rgbaf16),
            PixelFormat::LuminanceF32 => (get_lf32, set_lf32),
            PixelFormat::RgbF32 => (get_rgbf32, set_rgbf32),
            PixelFormat::RgbaF32 => (get_rgbaf32, set_rgbaf32),
        }
    }
}

type PixelGetter = fn(&[u8]) -> Color;
type PixelSetter = fn(&mut [u8], Color);
/// Texel coordinates to a linear texel index.
type TexelMapper = fn(i32, i32, usize, usize) -> usize;
type Sampler = fn(&Texture<'_>, Vec2) -> Color;

// --- channel helpers ---

#[inline(always)]
fn luminance(c: Color) -> u8 {
    ((c.r as u32 * 77 + c.g as u32 * 150 + c.b as u32 * 29 + 128) >> 8) as u8
}

#[inline(always)]
fn u16_at(p: &[u8], i: usize) -> u16 {
    u16::from_le_bytes([p[2 * i], p[2 * i + 1]])
}

#[inline(always)]
fn put_u16(p: &mut [u8], i: usize, v: u16) {
    p[2 * i..2 * i + 2].copy_from_slice(&v.to_le_bytes());
}

#[inline(always)]
fn f32_at(p: &[u8], i: usize) -> f32 {
    f32::from_le_bytes([p[4 * i], p[4 * i + 1], p[4 * i + 2], p[4 * i + 3]])
}

#[inline(always)]
fn put_f32(p: &mut [u8], i: usize, v: f32) {
    p[4 * i..4 * i + 4].copy_from_slice(&v.to_le_bytes());
}

#[inline(always)]
fn unorm8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[inline(always)]
fn to_unorm(c: u8) -> f32 {
    c as f32 * (1.0 / 255.0)
}

/// Expand an n-bit channel to 8 bits by bit replication.
#[inline(always)]
fn expand(v: u16, bits: u32) -> u8 {
    let v = v as u32;
    match bits {
        1 => (v * 255) as u8,
        4 => (v << 4 | v) as u8,
        5 => (v << 3 | v >> 2) as u8,
        6 => (v << 2 | v >> 4) as u8,
        _ => v as u8,
    }
}

/// IEEE 754 binary16 to binary32.
pub fn f16_to_f32(h: u16) -> f32 {
    let sign = ((h >> 15) as u32) << 31;
    let exp = ((h >> 10) & 0x1F) as u32;
    let mant = (h & 0x3FF) as u32;
    let bits = match (exp, mant) {
        (0, 0) => sign,
        (0, _) => {
            // subnormal: renormalize into the f32 range
            let mut e = 127 - 15 + 1;
            let mut m = mant;
            while m & 0x400 == 0 {
                m <<= 1;
                e -= 1;
            }
            sign | (e << 23) | ((m & 0x3FF) << 13)
        }
        (0x1F, _) => sign | 0x7F80_0000 | (mant << 13),
        _ => sign | ((exp + 127 - 15) << 23) | (mant << 13),
    };
    f32::from_bits(bits)
}

/// IEEE 754 binary32 to binary16, rounding to nearest even.
pub fn f32_to_f16(v: f32) -> u16 {
    let x = v.to_bits();
    let sign = ((x >> 16) & 0x8000) as u16;
    let exp = ((x >> 23) & 0xFF) as i32;
    let mant = x & 0x7F_FFFF;

    if exp == 0xFF {
        let nan = if mant != 0 { 0x200 } else { 0 };
        return sign | 0x7C00 | nan;
    }
    let e = exp - 127 + 15;
    if e >= 0x1F {
        return sign | 0x7C00;
    }
    if e <= 0 {
        if e < -10 {
            return sign;
        }
        let m = mant | 0x80_0000;
        let shift = (14 - e) as u32;
        let half = m >> shift;
        let round = (m >> (shift - 1)) & 1;
        return sign | (half + round) as u16;
    }
    let half = sign | ((e as u16) << 10) | (mant >> 13) as u16;
    let rest = mant & 0x1FFF;
    if rest > 0x1000 || (rest == 0x1000 && half & 1 == 1) {
        half + 1
    } else {
        half
    }
}

// --- per-format codecs ---

fn get_l8(p: &[u8]) -> Color {
    Color::gray(p[0])
}
fn set_l8(p: &mut [u8], c: Color) {
    p[0] = luminance(c);
}

fn get_la8(p: &[u8]) -> Color {
    Color::rgba(p[0], p[0], p[0], p[1])
}
fn set_la8(p: &mut [u8], c: Color) {
    p[0] = luminance(c);
    p[1] = c.a;
}

fn get_rgb565(p: &[u8]) -> Color {
    let v = u16_at(p, 0);
    Color::rgb(expand(v >> 11, 5), expand((v >> 5) & 0x3F, 6), expand(v & 0x1F, 5))
}
fn set_rgb565(p: &mut [u8], c: Color) {
    let v = ((c.r as u16 >> 3) << 11) | ((c.g as u16 >> 2) << 5) | (c.b as u16 >> 3);
    put_u16(p, 0, v);
}

fn get_rgba5551(p: &[u8]) -> Color {
    let v = u16_at(p, 0);
    Color::rgba(
        expand(v >> 11, 5),
        expand((v >> 6) & 0x1F, 5),
        expand((v >> 1) & 0x1F, 5),
        expand(v & 1, 1),
    )
}
fn set_rgba5551(p: &mut [u8], c: Color) {
    let v = ((c.r as u16 >> 3) << 11)
        | ((c.g as u16 >> 3) << 6)
        | ((c.b as u16 >> 3) << 1)
        | (c.a >= 128) as u16;
    put_u16(p, 0, v);
}

fn get_rgba4444(p: &[u8]) -> Color {
    let v = u16_at(p, 0);
    Color::rgba(
        expand(v >> 12, 4),
        expand((v >> 8) & 0xF, 4),
        expand((v >> 4) & 0xF, 4),
        expand(v & 0xF, 4),
    )
}
fn set_rgba4444(p: &mut [u8], c: Color) {
    let v = ((c.r as u16 >> 4) << 12)
        | ((c.g as u16 >> 4) << 8)
        | ((c.b as u16 >> 4) << 4)
        | (c.a as u16 >> 4);
    put_u16(p, 0, v);
}

fn get_rgb8(p: &[u8]) -> Color {
    Color::rgb(p[0], p[1], p[2])
}
fn set_rgb8(p: &mut [u8], c: Color) {
    p[..3].copy_from_slice(&[c.r, c.g, c.b]);
}

fn get_rgba8(p: &[u8]) -> Color {
    Color::rgba(p[0], p[1], p[2], p[3])
}
fn set_rgba8(p: &mut [u8], c: Color) {
    p[..4].copy_from_slice(&[c.r, c.g, c.b, c.a]);
}

fn get_l16(p: &[u8]) -> Color {
    Color::gray((u16_at(p, 0) >> 8) as u8)
}
fn set_l16(p: &mut [u8], c: Color) {
    put_u16(p, 0, luminance(c) as u16 * 257);
}

fn get_rgb16(p: &[u8]) -> Color {
    let ch = |i| (u16_at(p, i) >> 8) as u8;
    Color::rgb(ch(0), ch(1), ch(2))
}
fn set_rgb16(p: &mut [u8], c: Color) {
    for (i, v) in [c.r, c.g, c.b].into_iter().enumerate() {
        put_u16(p, i, v as u16 * 257);
    }
}

fn get_rgba16(p: &[u8]) -> Color {
    let ch = |i| (u16_at(p, i) >> 8) as u8;
    Color::rgba(ch(0), ch(1), ch(2), ch(3))
}
fn set_rgba16(p: &mut [u8], c: Color) {
    for (i, v) in [c.r, c.g, c.b, c.a].into_iter().enumerate() {
        put_u16(p, i, v as u16 * 257);
    }
}

fn get_lf16(p: &[u8]) -> Color {
    Color::gray(unorm8(f16_to_f32(u16_at(p, 0))))
}
fn set_lf16(p: &mut [u8], c: Color) {
    put_u16(p, 0, f32_to_f16(to_unorm(luminance(c))));
}

fn get_rgbf16(p: &[u8]) -> Color {
    let ch = |i| unorm8(f16_to_f32(u16_at(p, i)));
    Color::rgb(ch(0), ch(1), ch(2))
}
fn set_rgbf16(p: &mut [u8], c: Color) {
    for (i, v) in [c.r, c.g, c.b].into_iter().enumerate() {
        put_u16(p, i, f32_to_f16(to_unorm(v)));
    }
}

fn get_rgbaf16(p: &[u8]) -> Color {
    let ch = |i| unorm8(f16_to_f32(u16_at(p, i)));
    Color::rgba(ch(0), ch(1), ch(2), ch(3))
}
fn set_rgbaf16(p: &mut [u8], c: Color) {
    for (i, v) in [c.r, c.g, c.b, c.a].into_iter().enumerate() {
        put_u16(p, i, f32_to_f16(to_unorm(v)));
    }
}

fn get_lf32(p: &[u8]) -> Color {
    Color::gray(unorm8(f32_at(p, 0)))
}
fn set_lf32(p: &mut [u8], c: Color) {
    put_f32(p, 0, to_unorm(luminance(c)));
}

fn get_rgbf32(p: &[u8]) -> Color {
    let ch = |i| unorm8(f32_at(p, i));
    Color::rgb(ch(0), ch(1), ch(2))
}
fn set_rgbf32(p: &mut [u8], c: Color) {
    for (i, v) in [c.r, c.g, c.b].into_iter().enumerate() {
        put_f32(p, i, to_unorm(v));
    }
}

fn get_rgbaf32(p: &[u8]) -> Color {
    let ch = |i| unorm8(f32_at(p, i));
    Color::rgba(ch(0), ch(1), ch(2), ch(3))
}
fn set_rgbaf32(p: &mut [u8], c: Color) {
    for (i, v) in [c.r, c.g, c.b, c.a].into_iter().enumerate() {
        put_f32(p, i, to_unorm(v));
    }
}

// --- addressing ---

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Wrap {
    #[default]
    Repeat,
    Clamp,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Filter {
    #[default]
    Nearest,
    Bilinear,
}

fn map_repeat_pot(x: i32, y: i32, w: usize, h: usize) -> usize {
    let x = (x & (w as i32 - 1)) as usize;
    let y = (y & (h as i32 - 1)) as usize;
    y * w + x
}

fn map_repeat(x: i32, y: i32, w: usize, h: usize) -> usize {
    let x = x.rem_euclid(w as i32) as usize;
    let y = y.rem_euclid(h as i32) as usize;
    y * w + x
}

fn map_clamp(x: i32, y: i32, w: usize, h: usize) -> usize {
    let x = x.clamp(0, w as i32 - 1) as usize;
    let y = y.clamp(0, h as i32 - 1) as usize;
    y * w + x
}

fn sample_nearest(tex: &Texture<'_>, uv: Vec2) -> Color {
    let x = (uv.x * tex.width as f32).floor() as i32;
    let y = (uv.y * tex.height as f32).floor() as i32;
    tex.texel((tex.mapper)(x, y, tex.width, tex.height))
}

fn sample_bilinear(tex: &Texture<'_>, uv: Vec2) -> Color {
    let fx = uv.x * tex.width as f32 - 0.5;
    let fy = uv.y * tex.height as f32 - 0.5;
    let x0 = fx.floor();
    let y0 = fy.floor();
    let tx = fx - x0;
    let ty = fy - y0;
    let (x0, y0) = (x0 as i32, y0 as i32);

    let at = |x, y| tex.texel((tex.mapper)(x, y, tex.width, tex.height)).to_vec4();
    let top = at(x0, y0).lerp(at(x0 + 1, y0), tx);
    let bottom = at(x0, y0 + 1).lerp(at(x0 + 1, y0 + 1), tx);
    Color::from_vec4(top.lerp(bottom, ty))
}

fn sample_invalid(_: &Texture<'_>, _: Vec2) -> Color {
    Color::TRANSPARENT
}

/// An image with its sampling state. Pixel data is either borrowed from the
/// caller or owned; writes to a borrowed texture copy it first.
#[derive(Clone)]
pub struct Texture<'a> {
    pixels: Cow<'a, [u8]>,
    width: usize,
    height: usize,
    format: PixelFormat,
    getter: PixelGetter,
    setter: PixelSetter,
    wrap: Wrap,
    filter: Filter,
    mapper: TexelMapper,
    sampler: Sampler,
}

impl std::fmt::Debug for Texture<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Texture")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("format", &self.format)
            .field("wrap", &self.wrap)
            .field("filter", &self.filter)
            .finish()
    }
}

impl<'a> Texture<'a> {
    /// Wrap `pixels` as a `width` x `height` image in `format`. A size
    /// mismatch or a zero dimension yields an invalid texture that samples
    /// as transparent.
    pub fn new(
        pixels: impl Into<Cow<'a, [u8]>>,
        width: usize,
        height: usize,
        format: PixelFormat,
    ) -> Self {
        let pixels = pixels.into();
        let (getter, setter) = format.codec();
        let mut tex = Self {
            pixels,
            width,
            height,
            format,
            getter,
            setter,
            wrap: Wrap::Repeat,
            filter: Filter::Nearest,
            mapper: map_repeat,
            sampler: sample_invalid,
        };

        let expected = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(format.bytes_per_pixel()));
        if width == 0 || height == 0 || expected != Some(tex.pixels.len()) {
            log::warn!(
                "texture {width}x{height} {format:?}: expected {expected:?} bytes, got {}",
                tex.pixels.len()
            );
            tex.pixels = Cow::Owned(Vec::new());
            tex.width = 0;
            tex.height = 0;
            return tex;
        }

        tex.resolve();
        tex
    }

    /// Owned RGBA8 texture from colors.
    pub fn from_colors(colors: &[Color], width: usize, height: usize) -> Texture<'static> {
        let bytes: &[u8] = bytemuck::cast_slice(colors);
        Texture::new(bytes.to_vec(), width, height, PixelFormat::Rgba8)
    }

    /// Owned, zero-filled texture.
    pub fn blank(width: usize, height: usize, format: PixelFormat) -> Texture<'static> {
        let len = width * height * format.bytes_per_pixel();
        Texture::new(vec![0u8; len], width, height, format)
    }

    /// Two-color checkerboard with square cells of `cell` texels.
    pub fn checkerboard(size: usize, cell: usize, a: Color, b: Color) -> Texture<'static> {
        let cell = cell.max(1);
        let colors: Vec<Color> = (0..size * size)
            .map(|i| {
                let (x, y) = (i % size, i / size);
                if (x / cell + y / cell) % 2 == 0 {
                    a
                } else {
                    b
                }
            })
            .collect();
        Texture::from_colors(&colors, size, size)
    }

    fn resolve(&mut self) {
        if !self.is_valid() {
            return;
        }
        let pot = self.width.is_power_of_two() && self.height.is_power_of_two();
        self.mapper = match (self.wrap, pot) {
            (Wrap::Repeat, true) => map_repeat_pot,
            (Wrap::Repeat, false) => map_repeat,
            (Wrap::Clamp, _) => map_clamp,
        };
        self.sampler = match self.filter {
            Filter::Nearest => sample_nearest,
            Filter::Bilinear => sample_bilinear,
        };
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        !self.pixels.is_empty()
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
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    #[inline]
    pub fn bytes(&self) -> &[u8] {
        &self.pixels
    }

    pub fn set_wrap(&mut self, wrap: Wrap) {
        self.wrap = wrap;
        self.resolve();
    }

    pub fn set_filter(&mut self, filter: Filter) {
        self.filter = filter;
        self.resolve();
    }

    #[inline(always)]
    fn texel(&self, index: usize) -> Color {
        let bpp = self.format.bytes_per_pixel();
        (self.getter)(&self.pixels[index * bpp..(index + 1) * bpp])
    }

    /// Texel at integer coordinates, transparent when out of range.
    pub fn get(&self, x: usize, y: usize) -> Color {
        if x >= self.width || y >= self.height {
            return Color::TRANSPARENT;
        }
        self.texel(y * self.width + x)
    }

    /// Overwrite a texel; out-of-range writes are ignored.
    pub fn set(&mut self, x: usize, y: usize, color: Color) {
        if x >= self.width || y >= self.height {
            return;
        }
        let bpp = self.format.bytes_per_pixel();
        let start = (y * self.width + x) * bpp;
        let setter = self.setter;
        setter(&mut self.pixels.to_mut()[start..start + bpp], color);
    }

    /// Sample at normalized coordinates with the configured wrap and filter.
    #[inline]
    pub fn sample(&self, uv: Vec2) -> Color {
        (self.sampler)(self, uv)
    }

    /// Detach from borrowed data.
    pub fn into_owned(self) -> Texture<'static> {
        Texture {
            pixels: Cow::Owned(self.pixels.into_owned()),
            width: self.width,
            height: self.height,
            format: self.format,
            getter: self.getter,
            setter: self.setter,
            wrap: self.wrap,
            filter: self.filter,
            mapper: self.mapper,
            sampler: self.sampler,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_FORMATS: [PixelFormat; 16] = [
        PixelFormat::Luminance8,
        PixelFormat::LuminanceAlpha8,
        PixelFormat::Rgb565,
        PixelFormat::Rgba5551,
        PixelFormat::Rgba4444,
        PixelFormat::Rgb8,
        PixelFormat::Rgba8,
        PixelFormat::Luminance16,
        PixelFormat::Rgb16,
        PixelFormat::Rgba16,
        PixelFormat::LuminanceF16,
        PixelFormat::RgbF16,
        PixelFormat::RgbaF16,
        PixelFormat::LuminanceF32,
        PixelFormat::RgbF32,
        PixelFormat::RgbaF32,
    ];

    fn gradient(size: usize) -> Texture<'static> {
        let colors: Vec<Color> = (0..size * size)
            .map(|i| Color::rgb((i * 10) as u8, (i * 3) as u8, 7))
            .collect();
        Texture::from_colors(&colors, size, size)
    }

    #[test]
    fn repeat_wraps_coordinates() {
        let tex = gradient(4);
        for v in [0.1, 0.6] {
            assert_eq!(
                tex.sample(Vec2::new(1.25, v)),
                tex.sample(Vec2::new(0.25, v))
            );
            assert_eq!(
                tex.sample(Vec2::new(-0.75, v)),
                tex.sample(Vec2::new(0.25, v))
            );
        }
    }

    #[test]
    fn non_power_of_two_repeat_wraps() {
        let colors: Vec<Color> = (0..3 * 5).map(|i| Color::gray(i as u8)).collect();
        let tex = Texture::from_colors(&colors, 3, 5);
        assert_eq!(tex.sample(Vec2::new(1.5, 0.0)), tex.sample(Vec2::new(0.5, 0.0)));
        assert_eq!(tex.sample(Vec2::new(-0.1, 0.0)), tex.get(2, 0));
    }

    #[test]
    fn clamp_sticks_to_edges() {
        let mut tex = gradient(4);
        tex.set_wrap(Wrap::Clamp);
        assert_eq!(tex.sample(Vec2::new(5.0, 0.0)), tex.get(3, 0));
        assert_eq!(tex.sample(Vec2::new(-5.0, -5.0)), tex.get(0, 0));
    }

    #[test]
    fn nearest_picks_texel_containing_uv() {
        let tex = gradient(4);
        assert_eq!(tex.sample(Vec2::new(0.3, 0.55)), tex.get(1, 2));
    }

    #[test]
    fn bilinear_at_texel_center_is_exact() {
        let mut tex = gradient(4);
        tex.set_filter(Filter::Bilinear);
        assert_eq!(tex.sample(Vec2::new(1.5 / 4.0, 2.5 / 4.0)), tex.get(1, 2));
    }

    #[test]
    fn bilinear_blends_neighbours() {
        let mut tex = Texture::from_colors(&[Color::BLACK, Color::WHITE], 2, 1);
        tex.set_filter(Filter::Bilinear);
        tex.set_wrap(Wrap::Clamp);
        let mid = tex.sample(Vec2::new(0.5, 0.5));
        assert!((127..=128).contains(&mid.r), "{mid:?}");
    }

    #[test]
    fn every_format_round_trips_primaries() {
        for format in ALL_FORMATS {
            let mut tex = Texture::blank(2, 2, format);
            assert!(tex.is_valid(), "{format:?}");
            tex.set(1, 1, Color::WHITE);
            tex.set(0, 1, Color::BLACK);
            assert_eq!(tex.get(1, 1), Color::WHITE, "{format:?}");
            let black = tex.get(0, 1);
            assert_eq!((black.r, black.g, black.b), (0, 0, 0), "{format:?}");
        }
    }

    #[test]
    fn rgb565_expands_by_bit_replication() {
        let tex = Texture::new(vec![0x1F, 0xF8], 1, 1, PixelFormat::Rgb565);
        assert_eq!(tex.get(0, 0), Color::rgb(255, 0, 255));
    }

    #[test]
    fn half_floats_convert() {
        assert_eq!(f32_to_f16(1.0), 0x3C00);
        assert_eq!(f32_to_f16(-2.0), 0xC000);
        assert_eq!(f32_to_f16(0.5), 0x3800);
        assert_eq!(f16_to_f32(0x3C00), 1.0);
        assert_eq!(f16_to_f32(0x0001), 2f32.powi(-24));
        assert!(f16_to_f32(0x7C00).is_infinite());
        for v in [0.0f32, 0.25, 0.333, 1.0, 1000.0] {
            assert!((f16_to_f32(f32_to_f16(v)) - v).abs() <= v * 1e-3);
        }
    }

    #[test]
    fn size_mismatch_is_invalid() {
        let tex = Texture::new(&[0u8; 5][..], 2, 2, PixelFormat::Rgb8);
        assert!(!tex.is_valid());
        assert_eq!(tex.sample(Vec2::ZERO), Color::TRANSPARENT);
        assert_eq!(tex.get(0, 0), Color::TRANSPARENT);
    }

    #[test]
    fn writes_to_borrowed_data_copy_on_write() {
        let data = [0u8; 4];
        let mut tex = Texture::new(&data[..], 2, 2, PixelFormat::Luminance8);
        tex.set(1, 0, Color::WHITE);
        assert_eq!(tex.get(1, 0), Color::WHITE);
        assert_eq!(data, [0; 4]);
    }

    #[test]
    fn checkerboard_alternates() {
        let tex = Texture::checkerboard(8, 2, Color::WHITE, Color::BLACK);
        assert_eq!(tex.get(0, 0), Color::WHITE);
        assert_eq!(tex.get(2, 0), Color::BLACK);
        assert_eq!(tex.get(2, 2), Color::WHITE);
    }
}
