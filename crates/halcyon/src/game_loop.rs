//! # Frame Timing
//!
//! ```text
//! Frame N:
//! ┌──────────────────────────────────────────────────────────────┐
//! │ 1. FIXED UPDATE  x0..max_fixed_steps_per_frame (accumulator) │
//! │ 2. UPDATE        once, with the frame's elapsed time         │
//! │ 3. RENDER        systems queue draws                         │
//! │ 4. FLUSH         batcher -> GraphicsBackend                  │
//! │ 5. DELETIONS     queued entities are destroyed               │
//! │ 6. CREATIONS     queued entities receive on_start            │
//! └──────────────────────────────────────────────────────────────┘
//! ```

use std::time::Duration;

/// Frame budget at 60 FPS.
pub const TARGET_FRAME_TIME: Duration = Duration::from_micros(16_666);

/// Frames slower than this are logged.
pub const MAX_FRAME_TIME: Duration = Duration::from_millis(33);

/// Timing and counters of one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Frame number.
    pub frame: u64,
    /// Total frame time in microseconds.
    pub total_us: u64,
    /// Time spent in fixed-update passes.
    pub fixed_us: u64,
    /// Time spent in the update pass.
    pub update_us: u64,
    /// Time spent in the render pass and flush.
    pub render_us: u64,
    /// Fixed-update passes run.
    pub fixed_steps: u32,
    /// Batches submitted to the backend.
    pub draw_calls: u32,
    /// Entities deleted at the end of the frame.
    pub deleted: u32,
    /// Entities started at the end of the frame.
    pub created: u32,
}

/// Running totals over many frames.
#[derive(Clone, Debug)]
pub struct FrameStatsAccumulator {
    /// Budget a frame is compared against.
    pub budget: Duration,
    /// Total frames recorded.
    pub frames_recorded: u64,
    /// Sum of total frame times.
    pub total_us_sum: u64,
    /// Sum of fixed-update times.
    pub fixed_us_sum: u64,
    /// Sum of update times.
    pub update_us_sum: u64,
    /// Sum of render times.
    pub render_us_sum: u64,
    /// Min frame time.
    pub min_frame_us: u64,
    /// Max frame time.
    pub max_frame_us: u64,
    /// Frames that exceeded budget.
    pub frames_over_budget: u64,
}

impl FrameStatsAccumulator {
    /// Creates an accumulator for the given budget.
    #[must_use]
    pub fn new(budget: Duration) -> Self {
        Self {
            budget,
            frames_recorded: 0,
            total_us_sum: 0,
            fixed_us_sum: 0,
            update_us_sum: 0,
            render_us_sum: 0,
            min_frame_us: u64::MAX,
            max_frame_us: 0,
            frames_over_budget: 0,
        }
    }

    /// Records a frame's statistics.
    ///
    /// Returns `true` if the frame was over budget.
    #[allow(clippy::cast_possible_truncation)]
    pub fn record(&mut self, stats: FrameStats) -> bool {
        self.frames_recorded += 1;
        self.total_us_sum += stats.total_us;
        self.fixed_us_sum += stats.fixed_us;
        self.update_us_sum += stats.update_us;
        self.render_us_sum += stats.render_us;
        self.min_frame_us = self.min_frame_us.min(stats.total_us);
        self.max_frame_us = self.max_frame_us.max(stats.total_us);

        let over = stats.total_us > self.budget.as_micros() as u64;
        if over {
            self.frames_over_budget += 1;
        }
        over
    }

    /// Returns average frame time in milliseconds.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn avg_frame_ms(&self) -> f64 {
        if self.frames_recorded == 0 {
            return 0.0;
        }
        (self.total_us_sum as f64 / self.frames_recorded as f64) / 1000.0
    }

    /// Returns average FPS.
    #[must_use]
    pub fn avg_fps(&self) -> f64 {
        let avg_ms = self.avg_frame_ms();
        if avg_ms <= 0.0 {
            return 0.0;
        }
        1000.0 / avg_ms
    }

    /// Returns the share of frames over budget.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn over_budget_ratio(&self) -> f64 {
        if self.frames_recorded == 0 {
            return 0.0;
        }
        self.frames_over_budget as f64 / self.frames_recorded as f64
    }
}

impl Default for FrameStatsAccumulator {
    fn default() -> Self {
        Self::new(TARGET_FRAME_TIME)
    }
}
