use crate::core::{CoordinateMapper, DataMatrix, PaneLayout, Viewport, WindowDomains, WindowState};
use crate::error::{ChartError, ChartResult};
use crate::render::Renderer;

use super::{ChartEngine, ChartState};

impl<R: Renderer> ChartEngine<R> {
    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Updates viewport dimensions used by pane layout and scale mapping.
    pub fn set_viewport(&mut self, viewport: Viewport) -> ChartResult<()> {
        if !viewport.is_valid() {
            return Err(ChartError::InvalidViewport {
                width: viewport.width,
                height: viewport.height,
            });
        }
        self.viewport = viewport;
        self.refresh_view();
        Ok(())
    }

    #[must_use]
    pub fn state(&self) -> &ChartState {
        &self.state
    }

    #[must_use]
    pub fn data_matrix(&self) -> &DataMatrix {
        self.state.matrix()
    }

    #[must_use]
    pub fn window_state(&self) -> WindowState {
        self.state.window().state()
    }

    #[must_use]
    pub fn domains(&self) -> &WindowDomains {
        self.state.domains()
    }

    #[must_use]
    pub fn pane_layout(&self) -> &PaneLayout {
        self.state.layout()
    }

    #[must_use]
    pub fn mapper(&self) -> &CoordinateMapper {
        self.state.mapper()
    }

    #[must_use]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Recomputes domains and scales, then re-snaps the crosshair.
    pub(super) fn refresh_view(&mut self) {
        self.state.refresh_view(&self.settings, self.viewport);
        self.resnap_crosshair();
    }
}
