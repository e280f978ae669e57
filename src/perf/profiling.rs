/// Pipeline instrumentation
/// Counts primitives and pixels per stage when the `profiling` feature is on
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters for each pipeline stage
pub struct RasterCounters {
    // Primitive counters
    pub triangles_submitted: AtomicU64,
    pub triangles_clipped_away: AtomicU64,
    pub triangles_culled: AtomicU64,
    pub triangles_rasterized: AtomicU64,
    pub lines_rasterized: AtomicU64,
    pub points_rasterized: AtomicU64,

    // Pixel counters
    pub pixels_covered: AtomicU64,
    pub depth_passed: AtomicU64,
    pub depth_failed: AtomicU64,
    pub fragments_shaded: AtomicU64,

    // Buffer counters
    pub buffer_clears: AtomicU64,
    pub parallel_triangles: AtomicU64,
}

impl RasterCounters {
    pub const fn new() -> Self {
        Self {
            triangles_submitted: AtomicU64::new(0),
            triangles_clipped_away: AtomicU64::new(0),
            triangles_culled: AtomicU64::new(0),
            triangles_rasterized: AtomicU64::new(0),
            lines_rasterized: AtomicU64::new(0),
            points_rasterized: AtomicU64::new(0),
            pixels_covered: AtomicU64::new(0),
            depth_passed: AtomicU64::new(0),
            depth_failed: AtomicU64::new(0),
            fragments_shaded: AtomicU64::new(0),
            buffer_clears: AtomicU64::new(0),
            parallel_triangles: AtomicU64::new(0),
        }
    }

    fn all(&self) -> [&AtomicU64; 12] {
        [
            &self.triangles_submitted,
            &self.triangles_clipped_away,
            &self.triangles_culled,
            &self.triangles_rasterized,
            &self.lines_rasterized,
            &self.points_rasterized,
            &self.pixels_covered,
            &self.depth_passed,
            &self.depth_failed,
            &self.fragments_shaded,
            &self.buffer_clears,
            &self.parallel_triangles,
        ]
    }

    /// Reset all counters to zero
    pub fn reset(&self) {
        for counter in self.all() {
            counter.store(0, Ordering::Relaxed);
        }
    }

    /// Get snapshot of all counters
    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            triangles_submitted: self.triangles_submitted.load(Ordering::Relaxed),
            triangles_clipped_away: self.triangles_clipped_away.load(Ordering::Relaxed),
            triangles_culled: self.triangles_culled.load(Ordering::Relaxed),
            triangles_rasterized: self.triangles_rasterized.load(Ordering::Relaxed),
            lines_rasterized: self.lines_rasterized.load(Ordering::Relaxed),
            points_rasterized: self.points_rasterized.load(Ordering::Relaxed),
            pixels_covered: self.pixels_covered.load(Ordering::Relaxed),
            depth_passed: self.depth_passed.load(Ordering::Relaxed),
            depth_failed: self.depth_failed.load(Ordering::Relaxed),
            fragments_shaded: self.fragments_shaded.load(Ordering::Relaxed),
            buffer_clears: self.buffer_clears.load(Ordering::Relaxed),
            parallel_triangles: self.parallel_triangles.load(Ordering::Relaxed),
        }
    }
}

impl Default for RasterCounters {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of counter values at a point in time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CounterSnapshot {
    pub triangles_submitted: u64,
    pub triangles_clipped_away: u64,
    pub triangles_culled: u64,
    pub triangles_rasterized: u64,
    pub lines_rasterized: u64,
    pub points_rasterized: u64,
    pub pixels_covered: u64,
    pub depth_passed: u64,
    pub depth_failed: u64,
    pub fragments_shaded: u64,
    pub buffer_clears: u64,
    pub parallel_triangles: u64,
}

impl CounterSnapshot {
    /// Print formatted report
    pub fn print_report(&self) {
        println!("\n=== Raster Counters Report ===");
        println!("\nPrimitives:");
        println!("  triangles submitted:        {:12}", self.triangles_submitted);
        println!("  triangles clipped away:     {:12}", self.triangles_clipped_away);
        println!("  triangles culled:           {:12}", self.triangles_culled);
        println!("  triangles rasterized:       {:12}", self.triangles_rasterized);
        println!("  triangles filled in parallel:{:11}", self.parallel_triangles);
        println!("  lines rasterized:           {:12}", self.lines_rasterized);
        println!("  points rasterized:          {:12}", self.points_rasterized);

        println!("\nPixels:");
        println!("  pixels covered:             {:12}", self.pixels_covered);
        println!("  depth test passed:          {:12}", self.depth_passed);
        println!("  depth test failed:          {:12}", self.depth_failed);
        let tested = self.depth_passed + self.depth_failed;
        if tested > 0 {
            let pass_rate = (self.depth_passed as f64 / tested as f64) * 100.0;
            println!("  depth test pass rate:       {:11.2}%", pass_rate);
        }
        println!("  fragments shaded:           {:12}", self.fragments_shaded);

        println!("\nBuffers:");
        println!("  clears:                     {:12}", self.buffer_clears);

        println!();
    }
}

/// Global raster counters instance
pub static RASTER_COUNTERS: RasterCounters = RasterCounters::new();

/// Macro for incrementing a counter (only when profiling feature is enabled)
#[macro_export]
macro_rules! count_call {
    ($counter:expr) => {
        #[cfg(feature = "profiling")]
        {
            $counter.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        }
    };
}

/// Macro for adding to a counter (only when profiling feature is enabled)
#[macro_export]
macro_rules! count_add {
    ($counter:expr, $value:expr) => {
        #[cfg(feature = "profiling")]
        {
            $counter.fetch_add($value as u64, std::sync::atomic::Ordering::Relaxed);
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_zeroes_every_counter() {
        let counters = RasterCounters::new();
        counters.triangles_submitted.fetch_add(3, Ordering::Relaxed);
        counters.depth_failed.fetch_add(9, Ordering::Relaxed);
        assert_eq!(counters.snapshot().triangles_submitted, 3);

        counters.reset();
        assert_eq!(counters.snapshot(), CounterSnapshot::default());
    }
}
