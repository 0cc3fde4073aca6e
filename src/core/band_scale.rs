use serde::{Deserialize, Serialize};

/// Ordinal scale placing `count` equal-width bands across a pixel range.
///
/// Inner and outer padding share one fraction and leftover space is split
/// evenly on both sides. Gaps in the underlying timestamps are not visible:
/// every slot has the same width.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandScale {
    count: usize,
    range_start: f64,
    range_end: f64,
    padding: f64,
    start: f64,
    step: f64,
    bandwidth: f64,
}

impl BandScale {
    #[must_use]
    pub fn new(count: usize, range_start: f64, range_end: f64, padding: f64) -> Self {
        let padding = if padding.is_finite() {
            padding.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let (range_start, range_end) = if range_start.is_finite() && range_end.is_finite() {
            (range_start, range_end)
        } else {
            (0.0, 0.0)
        };

        let n = count as f64;
        let width = range_end - range_start;
        let step = width / (n - padding + padding * 2.0).max(1.0);
        let start = range_start + (width - step * (n - padding)) * 0.5;
        let bandwidth = step * (1.0 - padding);

        Self {
            count,
            range_start,
            range_end,
            padding,
            start,
            step,
            bandwidth,
        }
    }

    #[must_use]
    pub fn count(self) -> usize {
        self.count
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.count == 0
    }

    #[must_use]
    pub fn range(self) -> (f64, f64) {
        (self.range_start, self.range_end)
    }

    #[must_use]
    pub fn padding(self) -> f64 {
        self.padding
    }

    /// Distance between the starts of two neighbouring bands.
    #[must_use]
    pub fn step(self) -> f64 {
        self.step
    }

    #[must_use]
    pub fn bandwidth(self) -> f64 {
        self.bandwidth
    }

    /// Left edge of band `index`.
    #[must_use]
    pub fn position(self, index: usize) -> Option<f64> {
        (index < self.count).then(|| self.start + self.step * index as f64)
    }

    #[must_use]
    pub fn center(self, index: usize) -> Option<f64> {
        self.position(index)
            .map(|left| left + self.bandwidth * 0.5)
    }

    /// Band whose center is closest to `pixel`, clamped to the first/last band.
    #[must_use]
    pub fn nearest_index(self, pixel: f64) -> Option<usize> {
        if self.count == 0 || !pixel.is_finite() || self.step <= 0.0 {
            return None;
        }
        let slot = ((pixel - self.start - self.bandwidth * 0.5) / self.step).round();
        Some(slot.clamp(0.0, (self.count - 1) as f64) as usize)
    }

    /// Every `interval`-th band index, starting at the first band.
    #[must_use]
    pub fn ticks(self, interval: usize) -> Vec<usize> {
        (0..self.count).step_by(interval.max(1)).collect()
    }
}
