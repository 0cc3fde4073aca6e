use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::DataMatrix;
use crate::core::primitives::datetime_to_millis;

/// Lowest zoom level accepted by step and wheel zoom.
pub const DEFAULT_MIN_ZOOM_LEVEL: f64 = 0.001;

/// Smallest window, in rows, reachable at zoom level 1.
pub const DEFAULT_MIN_ZOOM_ROWS: usize = 3;

const WINDOW_LEN_EPSILON: f64 = 1e-9;

/// Linear map from zoom level to visible row count.
///
/// Level 0 shows every row, level 1 shows `min_rows`. Higher levels never
/// produce a longer window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ZoomInterpolator {
    pub total_rows: usize,
    pub min_rows: usize,
}

impl ZoomInterpolator {
    #[must_use]
    pub const fn new(total_rows: usize, min_rows: usize) -> Self {
        Self {
            total_rows,
            min_rows,
        }
    }

    /// Visible row count for `zoom_level`, clamped to `[1, total_rows]`.
    #[must_use]
    pub fn window_len(self, zoom_level: f64) -> usize {
        if self.total_rows == 0 {
            return 0;
        }
        let level = if zoom_level.is_finite() {
            zoom_level.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let total = self.total_rows as f64;
        let min = self.min_rows as f64;
        let raw = total + (min - total) * level;
        let len = (raw - WINDOW_LEN_EPSILON).ceil().max(1.0) as usize;
        len.min(self.total_rows)
    }

    /// Zoom level whose window is exactly `len` rows, when the map is not flat.
    #[must_use]
    pub fn zoom_level_for(self, len: usize) -> Option<f64> {
        if self.total_rows <= self.min_rows {
            return None;
        }
        let total = self.total_rows as f64;
        let span = total - self.min_rows as f64;
        Some(((total - len as f64) / span).clamp(0.0, 1.0))
    }
}

/// Visible slice of the data matrix.
///
/// `pan_offset` counts rows from the newest row; 0 keeps the latest data at
/// the right edge. Always `start_index <= end_index <= total rows`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowState {
    pub zoom_level: f64,
    pub pan_offset: usize,
    pub start_index: usize,
    pub end_index: usize,
}

impl WindowState {
    #[must_use]
    pub fn len(self) -> usize {
        self.end_index - self.start_index
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.start_index == self.end_index
    }
}

/// Owns zoom and pan and keeps the window indices consistent with them.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowController {
    state: WindowState,
    interpolator: ZoomInterpolator,
    min_zoom_level: f64,
    drag_anchor: Option<usize>,
}

impl Default for WindowController {
    fn default() -> Self {
        Self::new(0.8, DEFAULT_MIN_ZOOM_LEVEL)
    }
}

impl WindowController {
    #[must_use]
    pub fn new(zoom_level: f64, min_zoom_level: f64) -> Self {
        let min_zoom_level = if min_zoom_level.is_finite() {
            min_zoom_level.clamp(0.0, 1.0)
        } else {
            DEFAULT_MIN_ZOOM_LEVEL
        };
        let zoom_level = if zoom_level.is_finite() {
            zoom_level.clamp(min_zoom_level, 1.0)
        } else {
            1.0
        };
        Self {
            state: WindowState {
                zoom_level,
                pan_offset: 0,
                start_index: 0,
                end_index: 0,
            },
            interpolator: ZoomInterpolator::default(),
            min_zoom_level,
            drag_anchor: None,
        }
    }

    #[must_use]
    pub fn state(&self) -> WindowState {
        self.state
    }

    #[must_use]
    pub fn interpolator(&self) -> ZoomInterpolator {
        self.interpolator
    }

    #[must_use]
    pub fn zoom_level(&self) -> f64 {
        self.state.zoom_level
    }

    #[must_use]
    pub fn pan_offset(&self) -> usize {
        self.state.pan_offset
    }

    #[must_use]
    pub fn min_zoom_level(&self) -> f64 {
        self.min_zoom_level
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.drag_anchor.is_some()
    }

    /// Rebinds the zoom map to a new row count and recomputes the window.
    pub fn set_interpolator(&mut self, total_rows: usize, min_rows: usize) {
        self.interpolator = ZoomInterpolator::new(total_rows, min_rows);
        self.recompute();
    }

    pub fn set_min_zoom_level(&mut self, min_zoom_level: f64) {
        if !min_zoom_level.is_finite() {
            return;
        }
        self.min_zoom_level = min_zoom_level.clamp(0.0, 1.0);
        self.set_zoom_level(self.state.zoom_level);
    }

    /// Sets an absolute zoom level, clamped to `[min_zoom_level, 1]`.
    pub fn set_zoom_level(&mut self, zoom_level: f64) {
        if !zoom_level.is_finite() {
            return;
        }
        self.state.zoom_level = zoom_level.clamp(self.min_zoom_level, 1.0);
        self.recompute();
    }

    /// Adds `delta` to the zoom level. Non-finite steps are ignored.
    pub fn zoom_by_step(&mut self, delta: f64) {
        if !delta.is_finite() {
            return;
        }
        self.set_zoom_level(self.state.zoom_level + delta);
    }

    /// Shows the rows at or before `start` through the row at or before `end`.
    ///
    /// The zoom level is back-derived from the resulting length so later
    /// relative zoom and pan continue from this window. Returns `false` for
    /// an empty matrix.
    pub fn zoom_to_range(
        &mut self,
        matrix: &DataMatrix,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> bool {
        let (start, end) = if start <= end {
            (start, end)
        } else {
            (end, start)
        };
        let (Some(first), Some(last)) = (
            matrix.index_at_or_before(datetime_to_millis(start)),
            matrix.index_at_or_before(datetime_to_millis(end)),
        ) else {
            return false;
        };

        let total = matrix.len();
        self.interpolator.total_rows = total;
        let len = last + 1 - first;
        if let Some(level) = self.interpolator.zoom_level_for(len) {
            self.state.zoom_level = level.clamp(self.min_zoom_level, 1.0);
        }
        self.state.pan_offset = total - 1 - last;
        self.state.start_index = first;
        self.state.end_index = last + 1;
        trace!(
            start_index = first,
            end_index = last + 1,
            zoom_level = self.state.zoom_level,
            "window set from time range"
        );
        true
    }

    /// Captures the pan anchor for a drag gesture.
    pub fn begin_drag(&mut self) {
        self.drag_anchor = Some(self.state.pan_offset);
    }

    pub fn end_drag(&mut self) {
        self.drag_anchor = None;
    }

    /// Pans relative to the drag anchor by whole slots of `slot_px` pixels.
    ///
    /// A positive `dx_px` moves toward the newest row. Without an active drag
    /// the current offset becomes the anchor until [`Self::end_drag`].
    /// Returns `true` when the offset changed.
    pub fn pan_by_pixels(&mut self, dx_px: f64, slot_px: f64) -> bool {
        if !dx_px.is_finite() || !slot_px.is_finite() || slot_px <= 0.0 {
            return false;
        }
        let anchor = *self.drag_anchor.get_or_insert(self.state.pan_offset);
        let bars = (dx_px / slot_px).floor() as i64;
        let candidate = (anchor as i64).saturating_sub(bars);
        let max_offset = self.max_pan_offset() as i64;
        let pan_offset = candidate.clamp(0, max_offset) as usize;

        if pan_offset == self.state.pan_offset {
            return false;
        }
        self.state.pan_offset = pan_offset;
        self.recompute();
        true
    }

    fn max_pan_offset(&self) -> usize {
        let window_len = self.interpolator.window_len(self.state.zoom_level);
        self.interpolator.total_rows - window_len
    }

    fn recompute(&mut self) {
        let total = self.interpolator.total_rows;
        let window_len = self.interpolator.window_len(self.state.zoom_level);
        self.state.pan_offset = self.state.pan_offset.min(total - window_len);
        self.state.end_index = total - self.state.pan_offset;
        self.state.start_index = self.state.end_index - window_len;
        trace!(
            start_index = self.state.start_index,
            end_index = self.state.end_index,
            pan_offset = self.state.pan_offset,
            zoom_level = self.state.zoom_level,
            "window recomputed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::{WindowController, ZoomInterpolator};

    #[test]
    fn interpolator_maps_zero_to_all_rows_and_one_to_min_rows() {
        let interpolator = ZoomInterpolator::new(100, 3);
        assert_eq!(interpolator.window_len(0.0), 100);
        assert_eq!(interpolator.window_len(1.0), 3);
        assert_eq!(interpolator.window_len(0.5), 52);
        assert_eq!(ZoomInterpolator::new(2, 3).window_len(1.0), 2);
        assert_eq!(ZoomInterpolator::new(0, 3).window_len(0.5), 0);
    }

    #[test]
    fn zoom_level_for_inverts_window_len() {
        let interpolator = ZoomInterpolator::new(50, 3);
        for len in 3..=50 {
            let level = interpolator.zoom_level_for(len).expect("non-flat map");
            assert_eq!(interpolator.window_len(level), len);
        }
        assert_eq!(ZoomInterpolator::new(3, 3).zoom_level_for(3), None);
    }

    #[test]
    fn zoom_step_clamps_to_bounds() {
        let mut window = WindowController::new(0.5, 0.001);
        window.set_interpolator(10, 3);
        window.zoom_by_step(-5.0);
        assert_eq!(window.zoom_level(), 0.001);
        window.zoom_by_step(5.0);
        assert_eq!(window.zoom_level(), 1.0);
        assert_eq!(window.state().len(), 3);
        window.zoom_by_step(f64::NAN);
        assert_eq!(window.zoom_level(), 1.0);
    }

    #[test]
    fn drag_pans_relative_to_anchor_not_cumulatively() {
        let mut window = WindowController::new(1.0, 0.001);
        window.set_interpolator(20, 5);
        window.begin_drag();
        assert!(window.pan_by_pixels(-30.0, 10.0));
        assert_eq!(window.pan_offset(), 3);
        window.pan_by_pixels(-40.0, 10.0);
        assert_eq!(window.pan_offset(), 4);
        window.end_drag();

        window.begin_drag();
        window.pan_by_pixels(-10.0, 10.0);
        assert_eq!(window.pan_offset(), 5);
        window.end_drag();

        let state = window.state();
        assert_eq!((state.start_index, state.end_index), (10, 15));
    }

    #[test]
    fn pan_rejects_non_positive_slot_width() {
        let mut window = WindowController::new(1.0, 0.001);
        window.set_interpolator(20, 5);
        assert!(!window.pan_by_pixels(-30.0, 0.0));
        assert!(!window.pan_by_pixels(f64::INFINITY, 10.0));
        assert_eq!(window.pan_offset(), 0);
    }

    #[test]
    fn empty_matrix_keeps_indices_at_zero() {
        let mut window = WindowController::default();
        window.set_interpolator(0, 3);
        window.pan_by_pixels(-100.0, 10.0);
        let state = window.state();
        assert_eq!((state.start_index, state.end_index, state.pan_offset), (0, 0, 0));
    }
}
