use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InteractionMode {
    Idle,
    Panning,
}

/// Crosshair state exposed to host applications.
///
/// `snapped_*` fields are filled when the pointer is over a pane of a
/// non-empty window: the vertical line snaps to the hovered band and the
/// value is read back through the pane's inverse mapping.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CrosshairState {
    pub visible: bool,
    pub x: f64,
    pub y: f64,
    pub pane_index: Option<usize>,
    pub snapped_slot: Option<usize>,
    pub snapped_x: Option<f64>,
    pub snapped_time: Option<DateTime<Utc>>,
    pub snapped_value: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteractionState {
    mode: InteractionMode,
    pointer: Option<(f64, f64)>,
    crosshair: CrosshairState,
}

impl Default for InteractionState {
    fn default() -> Self {
        Self {
            mode: InteractionMode::Idle,
            pointer: None,
            crosshair: CrosshairState::default(),
        }
    }
}

impl InteractionState {
    #[must_use]
    pub fn mode(self) -> InteractionMode {
        self.mode
    }

    #[must_use]
    pub fn pointer(self) -> Option<(f64, f64)> {
        self.pointer
    }

    #[must_use]
    pub fn crosshair(self) -> CrosshairState {
        self.crosshair
    }

    pub fn on_pan_start(&mut self) {
        self.mode = InteractionMode::Panning;
    }

    pub fn on_pan_end(&mut self) {
        self.mode = InteractionMode::Idle;
    }

    pub fn on_pointer_move(&mut self, x: f64, y: f64) {
        self.pointer = Some((x, y));
        self.crosshair.visible = true;
        self.crosshair.x = x;
        self.crosshair.y = y;
    }

    pub fn on_pointer_leave(&mut self) {
        self.pointer = None;
        self.crosshair = CrosshairState::default();
    }

    /// Replaces the snapped part of the crosshair, keeping the raw pointer.
    pub fn set_crosshair(&mut self, crosshair: CrosshairState) {
        self.crosshair = crosshair;
    }
}

#[cfg(test)]
mod tests {
    use super::{InteractionMode, InteractionState};

    #[test]
    fn pointer_leave_hides_crosshair() {
        let mut state = InteractionState::default();
        state.on_pointer_move(10.0, 20.0);
        assert!(state.crosshair().visible);
        assert_eq!(state.pointer(), Some((10.0, 20.0)));

        state.on_pointer_leave();
        assert!(!state.crosshair().visible);
        assert_eq!(state.pointer(), None);
    }

    #[test]
    fn pan_toggles_mode() {
        let mut state = InteractionState::default();
        state.on_pan_start();
        assert_eq!(state.mode(), InteractionMode::Panning);
        state.on_pan_end();
        assert_eq!(state.mode(), InteractionMode::Idle);
    }
}
