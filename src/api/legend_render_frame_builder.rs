use crate::render::{RenderFrame, Renderer, TextHAlign};

use super::label_format::format_plot_value;
use super::render_frame_builder::push_label;
use super::{ChartEngine, LegendPosition, TitlePlacement};

const LEGEND_LINE_SPACING: f64 = 1.4;

impl<R: Renderer> ChartEngine<R> {
    /// Pane titles and per-plot legend lines.
    ///
    /// Legends read the row under the crosshair, or the latest windowed row
    /// when the crosshair is not snapped. The global title is shown on the
    /// first pane unless that pane has its own.
    pub(super) fn push_legends(&self, frame: &mut RenderFrame) {
        let settings = &self.settings;
        let layout = self.state.layout();
        let rows = self.state.windowed_rows();
        let crosshair = self.interaction.crosshair();
        let row = crosshair
            .snapped_slot
            .filter(|_| crosshair.visible)
            .and_then(|slot| rows.get(slot))
            .or_else(|| rows.last());
        let Some(row) = row else {
            return;
        };

        let margin = settings.legend_margin;
        let line_height = settings.legend_font_size * LEGEND_LINE_SPACING;
        let left_x = margin;
        let right_x = (layout.plot_width - margin).max(margin);

        for (index, pane) in layout.panes.iter().enumerate() {
            let scale = settings.scale_settings(&pane.scale_id);
            let title = if scale.title.is_empty() && index == 0 {
                settings.title.as_str()
            } else {
                scale.title.as_str()
            };

            let title_y = pane.top + margin + settings.title_font_size / 2.0;
            let (title_x, title_align) = match scale.title_placement {
                TitlePlacement::TopLeft => (left_x, TextHAlign::Left),
                TitlePlacement::TopCenter => (layout.plot_width / 2.0, TextHAlign::Center),
                TitlePlacement::TopRight => (right_x, TextHAlign::Right),
            };
            push_label(
                frame,
                title.to_owned(),
                title_x,
                title_y,
                settings.title_font_size,
                scale.title_font_color,
                title_align,
            );

            let shares_corner = !title.is_empty()
                && matches!(
                    (scale.title_placement, scale.legend_position),
                    (TitlePlacement::TopLeft, LegendPosition::TopLeft)
                        | (TitlePlacement::TopRight, LegendPosition::TopRight)
                );
            let (legend_x, legend_align) = match scale.legend_position {
                LegendPosition::TopLeft => (left_x, TextHAlign::Left),
                LegendPosition::TopRight => (right_x, TextHAlign::Right),
            };
            let mut y = pane.top + margin + settings.legend_font_size / 2.0;
            if shares_corner {
                y += settings.title_font_size * LEGEND_LINE_SPACING;
            }

            let Some(plots) = self.state.config().plots(&pane.scale_id) else {
                continue;
            };
            for plot_id in plots.keys() {
                let Some(cell) = row.cell(&pane.scale_id, plot_id) else {
                    continue;
                };
                let text = format!(
                    "{plot_id}: {}",
                    format_plot_value(cell.value, scale.legend_precision)
                );
                push_label(
                    frame,
                    text,
                    legend_x,
                    y,
                    settings.legend_font_size,
                    cell.color,
                    legend_align,
                );
                y += line_height;
            }
        }
    }
}
