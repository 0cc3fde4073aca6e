use serde::{Deserialize, Serialize};

/// Identifier of one stacked sub-chart (its own y axis).
pub type ScaleId = String;

/// Identifier of one plot inside a scale.
pub type PlotId = String;

/// Identifier of a raw data source referenced by plots.
pub type DataSourceId = String;

/// Row key: UTC epoch milliseconds.
pub type TimestampMs = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn is_valid(self) -> bool {
        self.width > 0 && self.height > 0
    }
}
