use chrono::{DateTime, Utc};
use tracing::trace;

use crate::interaction::{CrosshairState, InteractionMode};
use crate::render::Renderer;

use super::ChartEngine;

impl<R: Renderer> ChartEngine<R> {
    #[must_use]
    pub fn interaction_mode(&self) -> InteractionMode {
        self.interaction.mode()
    }

    #[must_use]
    pub fn crosshair_state(&self) -> CrosshairState {
        self.interaction.crosshair()
    }

    #[must_use]
    pub fn zoom_level(&self) -> f64 {
        self.state.window().zoom_level()
    }

    /// Adds `step` to the zoom level (clamped) and recomputes the window.
    ///
    /// Higher levels show fewer rows. Non-finite steps are ignored.
    pub fn zoom(&mut self, step: f64) {
        if !step.is_finite() {
            return;
        }
        self.state.window_mut().zoom_by_step(step);
        self.refresh_view();
        self.emit_zoom_event();
    }

    /// One wheel notch: negative `delta_y` lowers the zoom level.
    pub fn zoom_by_wheel(&mut self, delta_y: f64) {
        if !delta_y.is_finite() || delta_y == 0.0 {
            return;
        }
        let sensitivity = self.settings.wheel_zoom_sensitivity;
        let step = if delta_y < 0.0 {
            -sensitivity
        } else {
            sensitivity
        };
        trace!(delta_y, step, "wheel zoom");
        self.zoom(step);
    }

    /// Sets an absolute zoom level, clamped to the configured bounds.
    pub fn set_zoom_level(&mut self, zoom_level: f64) {
        if !zoom_level.is_finite() {
            return;
        }
        self.state.window_mut().set_zoom_level(zoom_level);
        self.refresh_view();
        self.emit_zoom_event();
    }

    /// Shows the rows at or before `start` through the row at or before `end`.
    ///
    /// Returns `false` (and changes nothing) for an empty matrix.
    pub fn zoom_to_range(&mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        if !self.state.zoom_to_range(start, end) {
            return false;
        }
        self.refresh_view();
        self.emit_zoom_event();
        true
    }

    /// Starts a drag; later `pan` calls are relative to the offset now.
    pub fn pan_start(&mut self) {
        self.state.window_mut().begin_drag();
        self.interaction.on_pan_start();
    }

    /// Pans by whole time slots for a pointer travel of `dx_px` since drag start.
    ///
    /// `dx_px > 0` moves toward the latest rows. `dy_px` does not affect the
    /// window. Returns `true` when the offset changed.
    pub fn pan(&mut self, dx_px: f64, dy_px: f64) -> bool {
        if !self.state.window().is_dragging() {
            self.interaction.on_pan_start();
        }
        let slot_px = self.state.mapper().step();
        let changed = self.state.window_mut().pan_by_pixels(dx_px, slot_px);
        trace!(dx_px, dy_px, slot_px, changed, "pan");
        if changed {
            self.refresh_view();
            self.emit_pan_event();
        }
        changed
    }

    /// Ends the drag and forgets its anchor.
    pub fn pan_end(&mut self) {
        self.state.window_mut().end_drag();
        self.interaction.on_pan_end();
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) {
        if !x.is_finite() || !y.is_finite() {
            return;
        }
        self.interaction.on_pointer_move(x, y);
        self.resnap_crosshair();
    }

    pub fn pointer_leave(&mut self) {
        self.interaction.on_pointer_leave();
    }

    pub(super) fn resnap_crosshair(&mut self) {
        let Some((x, y)) = self.interaction.pointer() else {
            return;
        };
        let crosshair = self.snap_crosshair(x, y);
        self.interaction.set_crosshair(crosshair);
    }

    /// Snaps the pointer to the hovered band and reads the value under it.
    fn snap_crosshair(&self, x: f64, y: f64) -> CrosshairState {
        let layout = self.state.layout();
        let mapper = self.state.mapper();
        let mut crosshair = CrosshairState {
            visible: true,
            x,
            y,
            pane_index: layout.pane_at(y),
            ..CrosshairState::default()
        };
        if x < 0.0 || x > layout.plot_width || mapper.band().is_empty() {
            return crosshair;
        }

        if let Some(slot) = mapper.slot_at(x) {
            crosshair.snapped_slot = Some(slot);
            crosshair.snapped_x = mapper.x_of_slot(slot);
            crosshair.snapped_time = mapper.time_domain().get(slot).copied();
        }
        if let Some(pane) = crosshair.pane_index.and_then(|i| layout.panes.get(i)) {
            crosshair.snapped_value = mapper.value_at(&pane.scale_id, y);
        }
        crosshair
    }
}
