use chrono::{DateTime, Utc};
use tracing::debug;

use crate::core::{
    ChartConfig, CoordinateMapper, DataMatrix, DataRow, GraphData, PaneLayout, PaneSizing,
    ScaleId, Viewport, WindowController, WindowDomains, compute_domains, normalize,
};

use super::ChartSettings;

/// All mutable chart data owned by one engine.
///
/// The derived parts (`matrix`, `domains`, `layout`, `mapper`) are rebuilt
/// wholesale from `data`, `config`, the window and the settings; nothing is
/// patched incrementally.
#[derive(Debug, Clone)]
pub struct ChartState {
    data: GraphData,
    config: ChartConfig,
    matrix: DataMatrix,
    window: WindowController,
    domains: WindowDomains,
    layout: PaneLayout,
    mapper: CoordinateMapper,
}

impl ChartState {
    #[must_use]
    pub fn new(settings: &ChartSettings, viewport: Viewport) -> Self {
        let mut state = Self {
            data: GraphData::new(),
            config: ChartConfig::new(),
            matrix: DataMatrix::default(),
            window: WindowController::new(settings.zoom_level, settings.min_zoom_level),
            domains: WindowDomains::default(),
            layout: PaneLayout::default(),
            mapper: CoordinateMapper::default(),
        };
        state.refresh_view(settings, viewport);
        state
    }

    #[must_use]
    pub fn data(&self) -> &GraphData {
        &self.data
    }

    #[must_use]
    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    #[must_use]
    pub fn matrix(&self) -> &DataMatrix {
        &self.matrix
    }

    #[must_use]
    pub fn window(&self) -> &WindowController {
        &self.window
    }

    #[must_use]
    pub fn domains(&self) -> &WindowDomains {
        &self.domains
    }

    #[must_use]
    pub fn layout(&self) -> &PaneLayout {
        &self.layout
    }

    #[must_use]
    pub fn mapper(&self) -> &CoordinateMapper {
        &self.mapper
    }

    /// Rows of the current window, oldest first.
    #[must_use]
    pub fn windowed_rows(&self) -> &[DataRow] {
        let window = self.window.state();
        self.matrix
            .window_slice(window.start_index, window.end_index)
    }

    pub(crate) fn replace_data(&mut self, data: GraphData) {
        self.data = data;
    }

    pub(crate) fn replace_config(&mut self, config: ChartConfig) {
        self.config = config;
    }

    pub(crate) fn window_mut(&mut self) -> &mut WindowController {
        &mut self.window
    }

    /// Re-runs normalization and rebinds the zoom map to the new row count.
    pub(crate) fn rebuild_matrix(&mut self, settings: &ChartSettings) {
        let rows = normalize(&self.data, &self.config, &settings.color_palette);
        self.matrix = DataMatrix::build(rows);
        self.window
            .set_interpolator(self.matrix.len(), settings.min_zoom_rows);
        debug!(
            rows = self.matrix.len(),
            scales = self.config.scale_count(),
            plots = self.config.plot_count(),
            "data matrix rebuilt"
        );
    }

    /// Pushes zoom bounds from settings into the window controller.
    pub(crate) fn apply_window_settings(&mut self, settings: &ChartSettings, reset_zoom: bool) {
        self.window.set_min_zoom_level(settings.min_zoom_level);
        if reset_zoom {
            self.window.set_zoom_level(settings.zoom_level);
        }
        self.window
            .set_interpolator(self.matrix.len(), settings.min_zoom_rows);
    }

    /// Shows the rows bracketing `[start, end]`. `false` for an empty matrix.
    pub(crate) fn zoom_to_range(&mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.window.zoom_to_range(&self.matrix, start, end)
    }

    /// Recomputes domains, pane layout and scales from the current window.
    pub(crate) fn refresh_view(&mut self, settings: &ChartSettings, viewport: Viewport) {
        let scale_ids: Vec<ScaleId> = self.config.scale_ids();
        let paddings: Vec<(ScaleId, f64)> = scale_ids
            .iter()
            .map(|id| (id.clone(), settings.scale_settings(id).y_scale_padding_pct))
            .collect();
        let sizing: Vec<PaneSizing> = scale_ids
            .iter()
            .map(|id| {
                let scale = settings.scale_settings(id);
                PaneSizing {
                    scale_id: id.clone(),
                    section_ratio: scale.section_ratio,
                    delta_height: scale.delta_height,
                }
            })
            .collect();

        self.domains = compute_domains(self.windowed_rows(), &paddings);
        self.layout = PaneLayout::compute(
            viewport,
            settings.plot_section_ratio,
            settings.x_axis_height,
            &sizing,
        );
        self.mapper = CoordinateMapper::build(&self.domains, &self.layout, settings.x_scale_padding);
    }
}
