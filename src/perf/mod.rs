/// Performance measurement utilities
/// Scope timers for the demo and benches, counters for the pipeline stages
pub mod profiling;

pub use profiling::{CounterSnapshot, RasterCounters, RASTER_COUNTERS};

use std::time::{Duration, Instant};

pub struct PerfTimer {
    name: &'static str,
    start: Instant,
}

impl PerfTimer {
    #[inline]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            start: Instant::now(),
        }
    }

    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for PerfTimer {
    fn drop(&mut self) {
        log::debug!("[PERF] {}: {}μs", self.name, self.elapsed().as_micros());
    }
}

/// Per-frame timings accumulated by the demo.
#[derive(Default, Debug, Clone, Copy)]
pub struct FrameStats {
    pub clear_us: f64,
    pub scene_us: f64,
    pub overlay_us: f64,
    pub present_us: f64,
}

impl FrameStats {
    pub fn total_us(&self) -> f64 {
        self.clear_us + self.scene_us + self.overlay_us + self.present_us
    }

    pub fn log_summary(&self) {
        let total = self.total_us().max(f64::EPSILON);
        log::info!(
            "clear {:.0}μs ({:.1}%) | scene {:.0}μs ({:.1}%) | overlay {:.0}μs ({:.1}%) | present {:.0}μs ({:.1}%)",
            self.clear_us,
            self.clear_us / total * 100.0,
            self.scene_us,
            self.scene_us / total * 100.0,
            self.overlay_us,
            self.overlay_us / total * 100.0,
            self.present_us,
            self.present_us / total * 100.0,
        );
    }
}

/// Macro for easy performance measurement
#[macro_export]
macro_rules! perf_scope {
    ($name:expr) => {
        let _timer = $crate::perf::PerfTimer::new($name);
    };
}
