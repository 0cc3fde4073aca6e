use crate::render::{LinePrimitive, RenderFrame, Renderer, TextHAlign};

use super::ChartEngine;
use super::label_format::{format_time, format_value, precision_for_step};
use super::render_frame_builder::push_label;

const TICK_MARK_PX: f64 = 4.0;
const TICK_LABEL_GAP_PX: f64 = 2.0;
const HAIRLINE_PX: f64 = 1.0;

impl<R: Renderer> ChartEngine<R> {
    /// Grid, pane separators, value axis per pane and the shared time axis.
    pub(super) fn push_axes(&self, frame: &mut RenderFrame) {
        let settings = &self.settings;
        let layout = self.state.layout();
        let mapper = self.state.mapper();
        let plot_width = layout.plot_width;
        let time_ticks = mapper.band().ticks(settings.x_grid_interval);
        let label_x = plot_width + TICK_MARK_PX + TICK_LABEL_GAP_PX;

        for pane in &layout.panes {
            if settings.grid_lines_type.vertical() {
                for x in time_ticks.iter().filter_map(|slot| mapper.x_of_slot(*slot)) {
                    frame.lines.push(LinePrimitive::new(
                        x,
                        pane.top,
                        x,
                        pane.bottom(),
                        HAIRLINE_PX,
                        settings.grid_lines_color.vert,
                    ));
                }
            }

            let separator_y = pane.bottom() + HAIRLINE_PX / 2.0;
            frame.lines.push(LinePrimitive::new(
                0.0,
                separator_y,
                layout.width,
                separator_y,
                HAIRLINE_PX,
                settings.graph_separator_color,
            ));

            let Some(values) = mapper.value_scale(&pane.scale_id) else {
                continue;
            };
            let scale = settings.scale_settings(&pane.scale_id);
            let ticks = values.ticks(scale.y_scale_tick_count);
            let step = match ticks.as_slice() {
                [first, second, ..] => second - first,
                _ => 0.0,
            };
            let precision = precision_for_step(step);

            for tick in ticks {
                let y = values.map(tick);
                if !pane.contains_y(y) {
                    continue;
                }
                if settings.grid_lines_type.horizontal() {
                    frame.lines.push(LinePrimitive::new(
                        0.0,
                        y,
                        plot_width,
                        y,
                        HAIRLINE_PX,
                        settings.grid_lines_color.horiz,
                    ));
                }
                frame.lines.push(LinePrimitive::new(
                    plot_width,
                    y,
                    plot_width + TICK_MARK_PX,
                    y,
                    HAIRLINE_PX,
                    settings.scale_line_color,
                ));
                push_label(
                    frame,
                    format_value(tick, precision),
                    label_x,
                    y,
                    settings.scale_font_size,
                    settings.scale_font_color,
                    TextHAlign::Left,
                );
            }
        }

        let border_x = plot_width + HAIRLINE_PX / 2.0;
        frame.lines.push(LinePrimitive::new(
            border_x,
            0.0,
            border_x,
            layout.height,
            HAIRLINE_PX,
            settings.graph_separator_color,
        ));

        self.push_time_axis(frame, &time_ticks);
    }

    fn push_time_axis(&self, frame: &mut RenderFrame, time_ticks: &[usize]) {
        let settings = &self.settings;
        let layout = self.state.layout();
        let mapper = self.state.mapper();
        let axis_top = layout.x_axis_top();
        let label_y = axis_top + (TICK_MARK_PX + layout.x_axis_height) / 2.0;

        frame.lines.push(LinePrimitive::new(
            0.0,
            axis_top,
            layout.plot_width,
            axis_top,
            HAIRLINE_PX,
            settings.scale_line_color,
        ));

        for slot in time_ticks {
            let (Some(x), Some(time)) = (mapper.x_of_slot(*slot), mapper.time_domain().get(*slot))
            else {
                continue;
            };
            frame.lines.push(LinePrimitive::new(
                x,
                axis_top,
                x,
                axis_top + TICK_MARK_PX,
                HAIRLINE_PX,
                settings.scale_line_color,
            ));
            push_label(
                frame,
                format_time(*time, &settings.x_scale_format),
                x,
                label_y,
                settings.scale_font_size,
                settings.scale_font_color,
                TextHAlign::Center,
            );
        }
    }
}
