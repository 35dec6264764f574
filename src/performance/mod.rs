//! # Frame statistics
//!
//! Rolling frame-time window plus per-frame draw and light counts. The run
//! loop feeds every rendered frame into [`FrameStats::record`]; once per
//! reporting interval the current numbers are logged at `info`.
//!
//! ```rust
//! use std::time::Duration;
//! use succuland::{performance::FrameStats, world::FrameReport};
//!
//! let mut stats = FrameStats::new();
//! stats.record(Duration::from_millis(16), FrameReport::default(), Duration::from_millis(16));
//! assert!(stats.metrics().fps > 0.0);
//! ```

use std::collections::VecDeque;
use std::time::Duration;

use crate::world::FrameReport;

/// Snapshot of the rolling window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameMetrics {
    pub fps: f32,
    /// Average frame time in milliseconds
    pub frame_time_ms: f32,
    pub min_frame_time_ms: f32,
    pub max_frame_time_ms: f32,
    /// Draw requests in the last frame
    pub draw_calls: usize,
    /// Lights registered in the last frame
    pub lights: usize,
}

impl Default for FrameMetrics {
    fn default() -> Self {
        Self {
            fps: 0.0,
            frame_time_ms: 0.0,
            min_frame_time_ms: 0.0,
            max_frame_time_ms: 0.0,
            draw_calls: 0,
            lights: 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FrameStats {
    /// Ring buffer of recent frame times
    frame_times: VecDeque<Duration>,
    max_samples: usize,
    metrics: FrameMetrics,
    last_report: Duration,
    report_interval: Duration,
}

impl FrameStats {
    pub fn new() -> Self {
        // ~2 seconds at 60 fps
        Self::with_window(120, Duration::from_secs(1))
    }

    pub fn with_window(max_samples: usize, report_interval: Duration) -> Self {
        let max_samples = max_samples.max(1);
        Self {
            frame_times: VecDeque::with_capacity(max_samples),
            max_samples,
            metrics: FrameMetrics::default(),
            last_report: Duration::ZERO,
            report_interval,
        }
    }

    /// Adds one frame. Returns the metrics when a report was due (and logged).
    pub fn record(
        &mut self,
        frame_time: Duration,
        report: FrameReport,
        now: Duration,
    ) -> Option<FrameMetrics> {
        if self.frame_times.len() >= self.max_samples {
            self.frame_times.pop_front();
        }
        self.frame_times.push_back(frame_time);
        self.metrics.draw_calls = report.draw_calls;
        self.metrics.lights = report.lights;
        self.update_metrics();

        if now.saturating_sub(self.last_report) < self.report_interval {
            return None;
        }
        self.last_report = now;
        log::info!(
            "{:.1} fps ({:.2} ms, min {:.2}, max {:.2}), {} draws, {} lights",
            self.metrics.fps,
            self.metrics.frame_time_ms,
            self.metrics.min_frame_time_ms,
            self.metrics.max_frame_time_ms,
            self.metrics.draw_calls,
            self.metrics.lights
        );
        Some(self.metrics)
    }

    fn update_metrics(&mut self) {
        if self.frame_times.is_empty() {
            return;
        }

        let total: Duration = self.frame_times.iter().sum();
        let average_ms = total.as_secs_f32() * 1000.0 / self.frame_times.len() as f32;
        self.metrics.frame_time_ms = average_ms;
        self.metrics.fps = if average_ms > 0.0 {
            1000.0 / average_ms
        } else {
            0.0
        };

        if let (Some(min), Some(max)) = (self.frame_times.iter().min(), self.frame_times.iter().max()) {
            self.metrics.min_frame_time_ms = min.as_secs_f32() * 1000.0;
            self.metrics.max_frame_time_ms = max.as_secs_f32() * 1000.0;
        }
    }

    pub fn metrics(&self) -> &FrameMetrics {
        &self.metrics
    }

    /// Frame times in milliseconds, oldest first
    pub fn frame_time_history(&self) -> Vec<f32> {
        self.frame_times
            .iter()
            .map(|duration| duration.as_secs_f32() * 1000.0)
            .collect()
    }

    pub fn reset(&mut self) {
        self.frame_times.clear();
        self.metrics = FrameMetrics::default();
    }
}

impl Default for FrameStats {
    fn default() -> Self {
        Self::new()
    }
}
