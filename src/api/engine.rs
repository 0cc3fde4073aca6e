use crate::core::Viewport;
use crate::error::ChartResult;
use crate::extensions::{AnnotationMark, EventRegistry};
use crate::interaction::InteractionState;
use crate::render::Renderer;

use super::{ChartSettings, ChartState, SettingsPatch, Theme};

/// Main orchestration facade consumed by host applications.
///
/// `ChartEngine` owns the chart state, settings, interaction state,
/// annotations and event listeners, and hands finished frames to the renderer.
/// Every mutating call leaves domains and scales ready for the next
/// [`ChartEngine::render`].
pub struct ChartEngine<R: Renderer> {
    pub(super) renderer: R,
    pub(super) viewport: Viewport,
    pub(super) theme: Theme,
    pub(super) user_settings: SettingsPatch,
    pub(super) settings: ChartSettings,
    pub(super) state: ChartState,
    pub(super) interaction: InteractionState,
    pub(super) annotations: Vec<AnnotationMark>,
    pub(super) events: EventRegistry,
}

impl<R: Renderer> ChartEngine<R> {
    pub fn render(&mut self) -> ChartResult<()> {
        let frame = self.build_render_frame()?;
        self.renderer.render(&frame)
    }

    #[must_use]
    pub fn into_renderer(self) -> R {
        self.renderer
    }
}
