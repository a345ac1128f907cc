//! Rendering statistics.

/// Statistics from one batch flush.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Requests queued for the frame.
    pub requests: u32,
    /// Batches built.
    pub batches: u32,
    /// Submissions accepted by the backend.
    pub draw_calls: u32,
    /// Requests lost to bind failures.
    pub dropped_requests: u32,
}

impl RenderStats {
    /// Average requests per accepted draw call.
    #[must_use]
    pub fn batching_ratio(&self) -> f32 {
        if self.draw_calls == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let ratio = (self.requests - self.dropped_requests) as f32 / self.draw_calls as f32;
        ratio
    }
}
