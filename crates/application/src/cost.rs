//! Delivery cost accounting
//!
//! Pure arithmetic, no I/O: cost is strictly linear in the segment count
//! with a flat surcharge for media attachments.

/// Characters per billing segment on the gateway channel
pub const SEGMENT_CHARS: usize = 160;

/// Linear segment-based cost model
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostModel {
    base_cost_per_segment: f64,
    media_surcharge: f64,
}

impl Default for CostModel {
    fn default() -> Self {
        Self {
            base_cost_per_segment: 0.005,
            media_surcharge: 0.01,
        }
    }
}

impl CostModel {
    /// Create a cost model with explicit rates
    pub const fn new(base_cost_per_segment: f64, media_surcharge: f64) -> Self {
        Self {
            base_cost_per_segment,
            media_surcharge,
        }
    }

    /// Per-segment rate
    pub const fn base_cost_per_segment(&self) -> f64 {
        self.base_cost_per_segment
    }

    /// Flat media surcharge
    pub const fn media_surcharge(&self) -> f64 {
        self.media_surcharge
    }

    /// Cost of a message billed at `segments` segments.
    ///
    /// Deterministic for identical inputs and linear in `segments` for a
    /// fixed `has_media`.
    pub fn cost(&self, segments: u32, has_media: bool) -> f64 {
        let media = if has_media { self.media_surcharge } else { 0.0 };
        self.base_cost_per_segment * f64::from(segments) + media
    }

    /// Number of billing segments for a message body.
    ///
    /// Counts characters, not bytes; an empty body still bills one segment.
    pub fn segments_for(content: &str) -> u32 {
        let chars = content.chars().count();
        let segments = chars.div_ceil(SEGMENT_CHARS).max(1);
        u32::try_from(segments).unwrap_or(u32::MAX)
    }
}
