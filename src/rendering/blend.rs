/// Per-pixel state: color blending, depth comparison and face culling.
use super::color::Color;

/// How a shaded fragment combines with the pixel already in the framebuffer.
///
/// Absence of a mode (`Option::None` in render state) overwrites the pixel.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BlendMode {
    Average,
    Additive,
    Subtractive,
    Multiply,
    Alpha,
    Screen,
    Lighten,
    Darken,
}

impl BlendMode {
    /// Combine `src` onto `dst`.
    #[inline]
    pub fn apply(self, dst: Color, src: Color) -> Color {
        match self {
            BlendMode::Average => blend_average(dst, src),
            BlendMode::Additive => blend_additive(dst, src),
            BlendMode::Subtractive => blend_subtractive(dst, src),
            BlendMode::Multiply => blend_multiply(dst, src),
            BlendMode::Alpha => blend_alpha(dst, src),
            BlendMode::Screen => blend_screen(dst, src),
            BlendMode::Lighten => blend_lighten(dst, src),
            BlendMode::Darken => blend_darken(dst, src),
        }
    }
}

#[inline(always)]
fn per_channel(dst: Color, src: Color, f: impl Fn(u32, u32) -> u32) -> Color {
    Color::rgba(
        f(dst.r as u32, src.r as u32) as u8,
        f(dst.g as u32, src.g as u32) as u8,
        f(dst.b as u32, src.b as u32) as u8,
        f(dst.a as u32, src.a as u32) as u8,
    )
}

#[inline]
pub fn blend_average(dst: Color, src: Color) -> Color {
    per_channel(dst, src, |d, s| (d + s) >> 1)
}

#[inline]
pub fn blend_additive(dst: Color, src: Color) -> Color {
    per_channel(dst, src, |d, s| (d + s).min(255))
}

/// `dst - src`, saturating at zero.
#[inline]
pub fn blend_subtractive(dst: Color, src: Color) -> Color {
    per_channel(dst, src, |d, s| d.saturating_sub(s))
}

#[inline]
pub fn blend_multiply(dst: Color, src: Color) -> Color {
    dst.modulate(src)
}

/// Source-over compositing by `src.a`. Opaque sources replace the pixel.
#[inline]
pub fn blend_alpha(dst: Color, src: Color) -> Color {
    match src.a {
        255 => src,
        0 => dst,
        a => {
            let a = a as u32;
            let ia = 255 - a;
            let mix = |d: u8, s: u8| ((s as u32 * a + d as u32 * ia + 127) / 255) as u8;
            Color::rgba(
                mix(dst.r, src.r),
                mix(dst.g, src.g),
                mix(dst.b, src.b),
                (a + (dst.a as u32 * ia + 127) / 255).min(255) as u8,
            )
        }
    }
}

#[inline]
pub fn blend_screen(dst: Color, src: Color) -> Color {
    per_channel(dst, src, |d, s| 255 - ((255 - d) * (255 - s) + 127) / 255)
}

#[inline]
pub fn blend_lighten(dst: Color, src: Color) -> Color {
    per_channel(dst, src, u32::max)
}

#[inline]
pub fn blend_darken(dst: Color, src: Color) -> Color {
    per_channel(dst, src, u32::min)
}

/// Comparison between a fragment's depth and the stored depth. A fragment
/// passes when `fragment <op> stored` holds.
///
/// Absence of a test (`Option::None` in render state) disables both the
/// comparison and the depth write.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DepthTest {
    Less,
    Greater,
    Equal,
    NotEqual,
    LessEqual,
    GreaterEqual,
}

impl DepthTest {
    #[inline(always)]
    pub fn passes(self, fragment: f32, stored: f32) -> bool {
        match self {
            DepthTest::Less => fragment < stored,
            DepthTest::Greater => fragment > stored,
            DepthTest::Equal => fragment == stored,
            DepthTest::NotEqual => fragment != stored,
            DepthTest::LessEqual => fragment <= stored,
            DepthTest::GreaterEqual => fragment >= stored,
        }
    }
}

/// Which triangle winding to discard. Winding is judged in screen space,
/// counter-clockwise as seen by the viewer being front-facing.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum FaceCulling {
    #[default]
    None,
    Back,
    Front,
}

impl FaceCulling {
    #[inline]
    pub fn rejects(self, front_facing: bool) -> bool {
        match self {
            FaceCulling::None => false,
            FaceCulling::Back => !front_facing,
            FaceCulling::Front => front_facing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DST: Color = Color::rgba(100, 200, 50, 255);

    #[test]
    fn opaque_alpha_returns_source_exactly() {
        let src = Color::rgba(1, 2, 3, 255);
        assert_eq!(BlendMode::Alpha.apply(DST, src), src);
    }

    #[test]
    fn transparent_alpha_keeps_destination() {
        assert_eq!(BlendMode::Alpha.apply(DST, Color::rgba(9, 9, 9, 0)), DST);
    }

    #[test]
    fn half_alpha_mixes() {
        let out = blend_alpha(Color::BLACK, Color::rgba(255, 255, 255, 128));
        assert_eq!(out.r, 128);
        assert_eq!(out.a, 255);
    }

    #[test]
    fn arithmetic_modes_saturate() {
        let src = Color::rgba(200, 100, 100, 255);
        assert_eq!(BlendMode::Additive.apply(DST, src), Color::rgba(255, 255, 150, 255));
        assert_eq!(BlendMode::Subtractive.apply(DST, src), Color::rgba(0, 100, 0, 0));
        assert_eq!(BlendMode::Average.apply(DST, src), Color::rgba(150, 150, 75, 255));
    }

    #[test]
    fn multiply_and_screen_are_duals() {
        assert_eq!(BlendMode::Multiply.apply(DST, Color::WHITE), DST);
        assert_eq!(BlendMode::Screen.apply(DST, Color::BLACK), DST);
        assert_eq!(BlendMode::Screen.apply(DST, Color::WHITE), Color::WHITE);
    }

    #[test]
    fn lighten_and_darken_pick_per_channel() {
        let src = Color::rgba(150, 150, 150, 255);
        assert_eq!(BlendMode::Lighten.apply(DST, src), Color::rgba(150, 200, 150, 255));
        assert_eq!(BlendMode::Darken.apply(DST, src), Color::rgba(100, 150, 50, 255));
    }

    #[test]
    fn depth_comparisons() {
        assert!(DepthTest::Less.passes(1.0, 2.0));
        assert!(!DepthTest::Less.passes(2.0, 2.0));
        assert!(DepthTest::LessEqual.passes(2.0, 2.0));
        assert!(DepthTest::Greater.passes(3.0, 2.0));
        assert!(DepthTest::GreaterEqual.passes(2.0, 2.0));
        assert!(DepthTest::Equal.passes(2.0, 2.0));
        assert!(DepthTest::NotEqual.passes(1.0, 2.0));
        assert!(DepthTest::Less.passes(5.0, f32::INFINITY));
    }

    #[test]
    fn culling_by_facing() {
        assert!(FaceCulling::Back.rejects(false));
        assert!(!FaceCulling::Back.rejects(true));
        assert!(FaceCulling::Front.rejects(true));
        assert!(!FaceCulling::None.rejects(false));
    }
}
