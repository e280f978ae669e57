/// Tuning knobs for the rasterizer.
///
/// These used to be compile-time thresholds; they are plain data here so a
/// host can size them for its own core count and resolution.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RasterConfig {
    /// Bounding-box area (pixels) above which a triangle's rows are filled
    /// in parallel. Small triangles stay on the calling thread.
    pub parallel_min_area: usize,
    /// Minimum bounding-box height (rows) for parallel filling.
    pub parallel_min_rows: usize,
    /// Buffer size (pixels) above which clears run in parallel.
    pub parallel_clear_min_pixels: usize,
    /// Value the depth buffer is reset to by `clear`.
    pub clear_depth: f32,
}

impl Default for RasterConfig {
    fn default() -> Self {
        Self {
            parallel_min_area: 64 * 64,
            parallel_min_rows: 16,
            parallel_clear_min_pixels: 320 * 240,
            clear_depth: f32::INFINITY,
        }
    }
}

impl RasterConfig {
    /// Configuration that never leaves the calling thread.
    pub fn single_threaded() -> Self {
        Self {
            parallel_min_area: usize::MAX,
            parallel_min_rows: usize::MAX,
            parallel_clear_min_pixels: usize::MAX,
            ..Self::default()
        }
    }

    /// Whether a triangle bounding box is large enough to split across threads.
    #[inline]
    pub fn should_parallelize(&self, box_width: usize, box_height: usize) -> bool {
        box_height >= self.parallel_min_rows
            && box_width.saturating_mul(box_height) >= self.parallel_min_area
    }
}
