use tracing::{debug, warn};

use crate::core::{ChartConfig, DataRow, GraphData, RejectedPlot};
use crate::error::ChartResult;
use crate::render::Renderer;

use super::ChartEngine;

impl<R: Renderer> ChartEngine<R> {
    /// Replaces all raw series and rebuilds the data matrix.
    ///
    /// The zoom map is rebound to the new row count; zoom level and pan
    /// offset are kept and clamped.
    pub fn set_data(&mut self, data: GraphData) {
        debug!(
            sources = data.iter().count(),
            records = data.record_count(),
            "set data"
        );
        self.state.replace_data(data);
        self.state.rebuild_matrix(&self.settings);
        self.refresh_view();
    }

    /// Parses `{sourceId: [records...]}` JSON and replaces all series.
    pub fn set_data_json(&mut self, input: &str) -> ChartResult<()> {
        let data = GraphData::from_json_str(input)?;
        self.set_data(data);
        Ok(())
    }

    /// Replaces the plot configuration.
    ///
    /// Invalid plots are excluded and returned; the call fails, leaving the
    /// previous configuration in place, only when every plot was rejected.
    pub fn set_config(&mut self, config: ChartConfig) -> ChartResult<Vec<RejectedPlot>> {
        let (valid, rejected) = config.partition_valid();
        for plot in &rejected {
            warn!(
                scale = %plot.scale_id,
                plot = %plot.plot_id,
                reason = %plot.reason,
                "excluding invalid plot"
            );
        }
        if valid.is_empty() {
            if let Some(first) = rejected.first() {
                return Err(first.to_error());
            }
        }

        debug!(
            scales = valid.scale_count(),
            plots = valid.plot_count(),
            rejected = rejected.len(),
            "set config"
        );
        self.state.replace_config(valid);
        self.state.rebuild_matrix(&self.settings);
        self.refresh_view();
        Ok(rejected)
    }

    /// Parses the declarative JSON config and applies it.
    pub fn set_config_json(&mut self, input: &str) -> ChartResult<Vec<RejectedPlot>> {
        let config = ChartConfig::from_json_str(input)?;
        self.set_config(config)
    }

    #[must_use]
    pub fn config(&self) -> &ChartConfig {
        self.state.config()
    }

    /// Rows of the visible window, oldest first.
    #[must_use]
    pub fn windowed_data(&self) -> &[DataRow] {
        self.state.windowed_rows()
    }
}
