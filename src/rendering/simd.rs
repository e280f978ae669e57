/// Integer lanes for the edge-function coverage test, plus wide buffer fills.
///
/// The lane width is fixed at compile time: 8 lanes with AVX2, 4 with SSE2
/// (always present on x86_64), 1 elsewhere. All lane math is wrapping i32
/// arithmetic, so every implementation produces exactly the masks the scalar
/// test `(w1 | w2 | w3) < 0` would.
use super::color::Color;

#[cfg(all(target_arch = "x86_64", target_feature = "avx2"))]
mod imp {
    use core::arch::x86_64::*;

    pub const LANES: usize = 8;

    #[derive(Copy, Clone)]
    pub struct I32s(__m256i);

    impl I32s {
        #[inline(always)]
        pub fn splat(v: i32) -> Self {
            unsafe { Self(_mm256_set1_epi32(v)) }
        }

        #[inline(always)]
        pub fn ramp(start: i32, step: i32) -> Self {
            let at = |k: i32| start.wrapping_add(step.wrapping_mul(k));
            unsafe {
                Self(_mm256_setr_epi32(
                    at(0),
                    at(1),
                    at(2),
                    at(3),
                    at(4),
                    at(5),
                    at(6),
                    at(7),
                ))
            }
        }

        #[inline(always)]
        pub fn add(self, other: Self) -> Self {
            unsafe { Self(_mm256_add_epi32(self.0, other.0)) }
        }

        /// Bit `k` set when lane `k` of any input is negative.
        #[inline(always)]
        pub fn outside_mask(a: Self, b: Self, c: Self) -> u32 {
            unsafe {
                let any = _mm256_or_si256(_mm256_or_si256(a.0, b.0), c.0);
                _mm256_movemask_ps(_mm256_castsi256_ps(any)) as u32
            }
        }

        #[inline(always)]
        pub fn to_array(self) -> [i32; LANES] {
            let mut out = [0i32; LANES];
            unsafe { _mm256_storeu_si256(out.as_mut_ptr() as *mut __m256i, self.0) };
            out
        }
    }
}

#[cfg(all(target_arch = "x86_64", not(target_feature = "avx2")))]
mod imp {
    use core::arch::x86_64::*;

    pub const LANES: usize = 4;

    #[derive(Copy, Clone)]
    pub struct I32s(__m128i);

    impl I32s {
        #[inline(always)]
        pub fn splat(v: i32) -> Self {
            unsafe { Self(_mm_set1_epi32(v)) }
        }

        #[inline(always)]
        pub fn ramp(start: i32, step: i32) -> Self {
            let at = |k: i32| start.wrapping_add(step.wrapping_mul(k));
            unsafe { Self(_mm_setr_epi32(at(0), at(1), at(2), at(3))) }
        }

        #[inline(always)]
        pub fn add(self, other: Self) -> Self {
            unsafe { Self(_mm_add_epi32(self.0, other.0)) }
        }

        /// Bit `k` set when lane `k` of any input is negative.
        #[inline(always)]
        pub fn outside_mask(a: Self, b: Self, c: Self) -> u32 {
            unsafe {
                let any = _mm_or_si128(_mm_or_si128(a.0, b.0), c.0);
                _mm_movemask_ps(_mm_castsi128_ps(any)) as u32
            }
        }

        #[inline(always)]
        pub fn to_array(self) -> [i32; LANES] {
            let mut out = [0i32; LANES];
            unsafe { _mm_storeu_si128(out.as_mut_ptr() as *mut __m128i, self.0) };
            out
        }
    }
}

#[cfg(not(target_arch = "x86_64"))]
mod imp {
    pub const LANES: usize = 1;

    #[derive(Copy, Clone)]
    pub struct I32s(i32);

    impl I32s {
        #[inline(always)]
        pub fn splat(v: i32) -> Self {
            Self(v)
        }

        #[inline(always)]
        pub fn ramp(start: i32, _step: i32) -> Self {
            Self(start)
        }

        #[inline(always)]
        pub fn add(self, other: Self) -> Self {
            Self(self.0.wrapping_add(other.0))
        }

        #[inline(always)]
        pub fn outside_mask(a: Self, b: Self, c: Self) -> u32 {
            ((a.0 | b.0 | c.0) < 0) as u32
        }

        #[inline(always)]
        pub fn to_array(self) -> [i32; LANES] {
            [self.0]
        }
    }
}

pub use imp::{I32s, LANES};

/// Mask with one bit per lane.
pub const LANE_MASK: u32 = if LANES >= 32 { u32::MAX } else { (1u32 << LANES) - 1 };

/// Scalar form of the coverage test: a pixel is outside when any edge value
/// has its sign bit set.
#[inline(always)]
pub fn is_outside(w1: i32, w2: i32, w3: i32) -> bool {
    (w1 | w2 | w3) < 0
}

/// Fill `dst` with `color`, using the widest vector store the CPU offers.
pub fn fill_colors(dst: &mut [Color], color: Color) {
    #[cfg(target_arch = "x86_64")]
    unsafe {
        let word = u32::from_ne_bytes(color.into()) as i32;
        if std::arch::is_x86_feature_detected!("avx") {
            fill_colors_avx(dst, word, color)
        } else {
            fill_colors_sse2(dst, word, color)
        }
    }

    #[cfg(not(target_arch = "x86_64"))]
    dst.fill(color);
}

/// Fill `dst` with `value`.
pub fn fill_f32(dst: &mut [f32], value: f32) {
    #[cfg(target_arch = "x86_64")]
    unsafe {
        if std::arch::is_x86_feature_detected!("avx") {
            fill_f32_avx(dst, value)
        } else {
            fill_f32_sse2(dst, value)
        }
    }

    #[cfg(not(target_arch = "x86_64"))]
    dst.fill(value);
}

// Color is four bytes with byte alignment, so every store below is unaligned.

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "sse2")]
unsafe fn fill_colors_sse2(dst: &mut [Color], word: i32, color: Color) {
    use core::arch::x86_64::{__m128i, _mm_set1_epi32, _mm_storeu_si128};
    let len = dst.len();
    let v = _mm_set1_epi32(word);
    let mut i = 0usize;
    while i + 4 <= len {
        _mm_storeu_si128(dst.as_mut_ptr().add(i) as *mut __m128i, v);
        i += 4;
    }
    dst[i..].fill(color);
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx")]
unsafe fn fill_colors_avx(dst: &mut [Color], word: i32, color: Color) {
    use core::arch::x86_64::{__m256i, _mm256_set1_epi32, _mm256_storeu_si256};
    let len = dst.len();
    let v = _mm256_set1_epi32(word);
    let mut i = 0usize;
    while i + 8 <= len {
        _mm256_storeu_si256(dst.as_mut_ptr().add(i) as *mut __m256i, v);
        i += 8;
    }
    dst[i..].fill(color);
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "sse2")]
unsafe fn fill_f32_sse2(dst: &mut [f32], value: f32) {
    use core::arch::x86_64::{_mm_set1_ps, _mm_storeu_ps};
    let len = dst.len();
    let v = _mm_set1_ps(value);
    let mut i = 0usize;
    while i + 4 <= len {
        _mm_storeu_ps(dst.as_mut_ptr().add(i), v);
        i += 4;
    }
    dst[i..].fill(value);
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx")]
unsafe fn fill_f32_avx(dst: &mut [f32], value: f32) {
    use core::arch::x86_64::{_mm256_set1_ps, _mm256_storeu_ps};
    let len = dst.len();
    let v = _mm256_set1_ps(value);
    let mut i = 0usize;
    while i + 8 <= len {
        _mm256_storeu_ps(dst.as_mut_ptr().add(i), v);
        i += 8;
    }
    dst[i..].fill(value);
}
