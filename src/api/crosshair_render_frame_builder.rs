use crate::render::{LinePrimitive, RenderFrame, Renderer, TextHAlign};

use super::ChartEngine;
use super::label_format::{format_time, format_value};
use super::render_frame_builder::LabelBox;

const VALUE_LABEL_GAP_PX: f64 = 2.0;

impl<R: Renderer> ChartEngine<R> {
    /// Crosshair lines snapped to the hovered band plus their axis labels.
    pub(super) fn push_crosshair(&self, frame: &mut RenderFrame) {
        let crosshair = self.interaction.crosshair();
        if !crosshair.visible {
            return;
        }
        let settings = &self.settings;
        let layout = self.state.layout();
        let axis_top = layout.x_axis_top();
        let label = LabelBox {
            font_size_px: settings.scale_font_size,
            fill_color: settings.crosshair_color,
            text_color: settings.crosshair_contrast_color,
        };

        if let Some(x) = crosshair.snapped_x {
            frame.lines.push(
                LinePrimitive::new(
                    x,
                    0.0,
                    x,
                    axis_top,
                    settings.crosshair_width,
                    settings.crosshair_color,
                )
                .with_stroke_style(settings.crosshair_type),
            );
            if let Some(time) = crosshair.snapped_time {
                label.push(
                    frame,
                    format_time(time, &settings.x_scale_crosshair_format),
                    x,
                    axis_top + layout.x_axis_height / 2.0,
                    TextHAlign::Center,
                );
            }
        }

        if crosshair.pane_index.is_none() {
            return;
        }
        let y = crosshair.y;
        frame.lines.push(
            LinePrimitive::new(
                0.0,
                y,
                layout.plot_width,
                y,
                settings.crosshair_width,
                settings.crosshair_color,
            )
            .with_stroke_style(settings.crosshair_type),
        );
        if let Some(value) = crosshair.snapped_value {
            label.push(
                frame,
                format_value(value, settings.crosshair_value_precision),
                layout.plot_width + VALUE_LABEL_GAP_PX,
                y,
                TextHAlign::Left,
            );
        }
    }
}
