use tracing::debug;

use crate::error::{ChartError, ChartResult};
use crate::extensions::EventRegistry;
use crate::interaction::InteractionState;
use crate::render::Renderer;

use super::{ChartEngine, ChartEngineConfig, ChartSettings, ChartState};

impl<R: Renderer> ChartEngine<R> {
    /// Creates an engine with no data and no plots.
    ///
    /// Fails on a zero-sized viewport or settings that do not validate.
    pub fn new(renderer: R, config: ChartEngineConfig) -> ChartResult<Self> {
        if !config.viewport.is_valid() {
            return Err(ChartError::InvalidViewport {
                width: config.viewport.width,
                height: config.viewport.height,
            });
        }
        let settings = ChartSettings::resolve(config.theme, &config.settings)?;
        let state = ChartState::new(&settings, config.viewport);
        debug!(
            width = config.viewport.width,
            height = config.viewport.height,
            theme = ?config.theme,
            "chart engine created"
        );

        Ok(Self {
            renderer,
            viewport: config.viewport,
            theme: config.theme,
            user_settings: config.settings,
            settings,
            state,
            interaction: InteractionState::default(),
            annotations: Vec::new(),
            events: EventRegistry::default(),
        })
    }
}
