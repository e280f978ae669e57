/// Color and depth targets for software rendering.
///
/// Both buffers are row-major with no padding. A buffer that could not be
/// allocated, or that was asked for with a zero dimension, comes back empty
/// with `is_valid() == false`; every drawing operation on it is a no-op.
/// Buffers are never resized in place; create new ones instead.
use super::color::Color;
use super::simd;
use crate::config::RasterConfig;
use crate::count_call;
use rayon::prelude::*;

/// Rows per parallel clear job.
const CLEAR_ROWS_PER_JOB: usize = 16;

fn allocate<T: Copy>(width: usize, height: usize, fill: T, what: &str) -> Option<Vec<T>> {
    if width == 0 || height == 0 {
        log::warn!("{what}: zero-sized {width}x{height} target");
        return None;
    }
    let Some(len) = width.checked_mul(height) else {
        log::warn!("{what}: {width}x{height} overflows the address space");
        return None;
    };
    let mut data = Vec::new();
    if let Err(err) = data.try_reserve_exact(len) {
        log::warn!("{what}: cannot allocate {width}x{height}: {err}");
        return None;
    }
    data.resize(len, fill);
    Some(data)
}

/// Fill `data` row-chunk by row-chunk, in parallel above `min_parallel` elements.
fn fill_rows<T: Copy + Send + Sync>(
    data: &mut [T],
    width: usize,
    value: T,
    min_parallel: usize,
    fill: fn(&mut [T], T),
) {
    if data.len() >= min_parallel && width > 0 {
        data.par_chunks_mut(width * CLEAR_ROWS_PER_JOB)
            .for_each(|chunk| fill(chunk, value));
    } else {
        fill(data, value);
    }
}

pub struct Framebuffer {
    width: usize,
    height: usize,
    pixels: Vec<Color>,
}

impl Framebuffer {
    /// New buffer cleared to transparent black.
    pub fn new(width: usize, height: usize) -> Self {
        match allocate(width, height, Color::TRANSPARENT, "framebuffer") {
            Some(pixels) => Self { width, height, pixels },
            None => Self::invalid(),
        }
    }

    /// The empty, unusable buffer.
    pub fn invalid() -> Self {
        Self {
            width: 0,
            height: 0,
            pixels: Vec::new(),
        }
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
    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    #[inline]
    pub fn pixels_mut(&mut self) -> &mut [Color] {
        &mut self.pixels
    }

    /// The pixels as a tightly packed RGBA byte stream.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    /// Row `y` as a slice.
    #[inline]
    pub fn row(&self, y: usize) -> Option<&[Color]> {
        (y < self.height).then(|| &self.pixels[y * self.width..(y + 1) * self.width])
    }

    /// Set every pixel to `color`, in parallel for large buffers.
    pub fn clear(&mut self, color: Color) {
        self.clear_with(color, &RasterConfig::default());
    }

    pub fn clear_with(&mut self, color: Color, config: &RasterConfig) {
        count_call!(crate::perf::RASTER_COUNTERS.buffer_clears);
        fill_rows(
            &mut self.pixels,
            self.width,
            color,
            config.parallel_clear_min_pixels,
            simd::fill_colors,
        );
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return None;
        }
        Some(y as usize * self.width + x as usize)
    }

    /// Pixel at `(x, y)`, `None` outside the buffer.
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> Option<Color> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    /// Write one pixel; out-of-range coordinates are ignored.
    #[inline]
    pub fn put(&mut self, x: i32, y: i32, color: Color) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = color;
        }
    }

    /// # Safety
    /// `x < width` and `y < height` must hold.
    #[inline(always)]
    pub unsafe fn get_unchecked(&self, x: usize, y: usize) -> Color {
        *self.pixels.get_unchecked(y * self.width + x)
    }

    /// # Safety
    /// `x < width` and `y < height` must hold.
    #[inline(always)]
    pub unsafe fn put_unchecked(&mut self, x: usize, y: usize, color: Color) {
        *self.pixels.get_unchecked_mut(y * self.width + x) = color;
    }

    /// Fill the rectangle clipped to the buffer.
    pub fn fill_rect(&mut self, x: i32, y: i32, width: i32, height: i32, color: Color) {
        let x0 = x.max(0) as usize;
        let y0 = y.max(0) as usize;
        let x1 = (x.saturating_add(width)).clamp(0, self.width as i32) as usize;
        let y1 = (y.saturating_add(height)).clamp(0, self.height as i32) as usize;
        if x0 >= x1 || y0 >= y1 {
            return;
        }
        for row in self.pixels[y0 * self.width..y1 * self.width].chunks_exact_mut(self.width) {
            simd::fill_colors(&mut row[x0..x1], color);
        }
    }

    /// Pack into `0xAARRGGBB` words for a presenter. Copies
    /// `min(dst.len(), width * height)` pixels.
    pub fn copy_to_argb(&self, dst: &mut [u32]) {
        dst.par_iter_mut()
            .zip(self.pixels.par_iter())
            .for_each(|(d, &c)| *d = c.to_argb_u32());
    }
}

pub struct Depthbuffer {
    width: usize,
    height: usize,
    values: Vec<f32>,
}

impl Depthbuffer {
    /// New buffer cleared to `+inf` (nothing drawn yet).
    pub fn new(width: usize, height: usize) -> Self {
        match allocate(width, height, f32::INFINITY, "depth buffer") {
            Some(values) => Self { width, height, values },
            None => Self::invalid(),
        }
    }

    pub fn invalid() -> Self {
        Self {
            width: 0,
            height: 0,
            values: Vec::new(),
        }
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        !self.values.is_empty()
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
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    #[inline]
    pub fn values_mut(&mut self) -> &mut [f32] {
        &mut self.values
    }

    pub fn clear(&mut self, depth: f32) {
        self.clear_with(depth, &RasterConfig::default());
    }

    pub fn clear_with(&mut self, depth: f32, config: &RasterConfig) {
        count_call!(crate::perf::RASTER_COUNTERS.buffer_clears);
        fill_rows(
            &mut self.values,
            self.width,
            depth,
            config.parallel_clear_min_pixels,
            simd::fill_f32,
        );
    }

    #[inline]
    pub fn get(&self, x: i32, y: i32) -> Option<f32> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return None;
        }
        Some(self.values[y as usize * self.width + x as usize])
    }

    #[inline]
    pub fn put(&mut self, x: i32, y: i32, depth: f32) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        self.values[y as usize * self.width + x as usize] = depth;
    }
}
