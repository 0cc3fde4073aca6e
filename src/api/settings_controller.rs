use tracing::debug;

use crate::error::ChartResult;
use crate::render::Renderer;

use super::{ChartEngine, ChartSettings, SettingsPatch, Theme};

impl<R: Renderer> ChartEngine<R> {
    #[must_use]
    pub fn settings(&self) -> &ChartSettings {
        &self.settings
    }

    #[must_use]
    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Merges `patch` into the user settings and re-resolves everything.
    ///
    /// A patch that does not validate is rejected as a whole and leaves the
    /// current settings untouched. A patch carrying `zoomLevel` resets the
    /// zoom level; other keys keep the current window.
    pub fn update_settings(&mut self, patch: SettingsPatch) -> ChartResult<()> {
        let mut merged = self.user_settings.clone();
        let touches_window = patch.touches_window();
        let reset_zoom = patch.zoom_level.is_some();
        let repaint_cells = patch.color_palette.is_some();
        merged.merge(patch);

        let settings = ChartSettings::resolve(self.theme, &merged)?;
        self.user_settings = merged;
        self.settings = settings;
        debug!(touches_window, repaint_cells, "settings updated");

        self.apply_resolved_settings(touches_window, reset_zoom, repaint_cells);
        Ok(())
    }

    pub fn update_settings_json(&mut self, input: &str) -> ChartResult<()> {
        let patch = SettingsPatch::from_json_str(input)?;
        self.update_settings(patch)
    }

    /// Switches the preset layered under the user settings.
    pub fn set_theme(&mut self, theme: Theme) -> ChartResult<()> {
        let settings = ChartSettings::resolve(theme, &self.user_settings)?;
        self.theme = theme;
        self.settings = settings;
        debug!(?theme, "theme changed");
        self.refresh_view();
        Ok(())
    }

    fn apply_resolved_settings(&mut self, touches_window: bool, reset_zoom: bool, repaint_cells: bool) {
        if repaint_cells {
            self.state.rebuild_matrix(&self.settings);
        }
        if touches_window {
            self.state.apply_window_settings(&self.settings, reset_zoom);
        }
        self.refresh_view();
        if reset_zoom {
            self.emit_zoom_event();
        }
    }
}
