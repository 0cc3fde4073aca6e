use tracing::{debug, trace};

use crate::core::Cell;
use crate::error::ChartResult;
use crate::extensions::{AnnotationContext, AnnotationStyle, project_annotations};
use crate::render::{Color, RectPrimitive, RenderFrame, Renderer, TextHAlign, TextPrimitive};

use super::ChartEngine;
use super::label_format::estimate_text_width_px;
use super::series_projection::{SeriesContext, project_plot};

const WATERMARK_OPACITY: f64 = 0.12;
const WATERMARK_FONT_SCALE: f64 = 3.0;
const LABEL_BOX_PADDING_X_PX: f64 = 4.0;
const LABEL_BOX_PADDING_Y_PX: f64 = 3.0;

impl<R: Renderer> ChartEngine<R> {
    /// Materializes backend-agnostic primitives for one draw pass.
    ///
    /// Layers are pushed back to front: background, watermark, grid and
    /// axes, series, annotations, legends, crosshair. An empty data matrix
    /// yields the background alone.
    pub fn build_render_frame(&self) -> ChartResult<RenderFrame> {
        let mut frame = RenderFrame::new(self.viewport);
        frame.rects.push(RectPrimitive::from_corners(
            0.0,
            0.0,
            f64::from(self.viewport.width),
            f64::from(self.viewport.height),
            self.settings.background,
        ));

        if self.state.windowed_rows().is_empty() {
            trace!("empty window, background only");
            frame.validate()?;
            return Ok(frame);
        }

        self.push_watermark(&mut frame);
        self.push_axes(&mut frame);
        self.push_series(&mut frame);
        self.push_annotations(&mut frame);
        self.push_legends(&mut frame);
        self.push_crosshair(&mut frame);

        trace!(
            lines = frame.lines.len(),
            rects = frame.rects.len(),
            polygons = frame.polygons.len(),
            texts = frame.texts.len(),
            "render frame built"
        );
        frame.validate()?;
        Ok(frame)
    }

    fn push_series(&self, frame: &mut RenderFrame) {
        let rows = self.state.windowed_rows();
        let mapper = self.state.mapper();
        let layout = self.state.layout();

        for (scale_id, plots) in self.state.config().scales() {
            let (Some(pane), Some(values)) = (layout.pane(scale_id), mapper.value_scale(scale_id))
            else {
                continue;
            };
            let ctx = SeriesContext {
                band: mapper.band(),
                values,
                pane,
                line_width: self.settings.scale_settings(scale_id).line_width,
            };
            for (plot_id, plot) in plots {
                let points: Vec<(usize, Cell)> = rows
                    .iter()
                    .enumerate()
                    .filter_map(|(slot, row)| row.cell(scale_id, plot_id).map(|cell| (slot, *cell)))
                    .collect();
                project_plot(frame, plot.kind, &points, &ctx);
            }
        }
    }

    fn push_annotations(&self, frame: &mut RenderFrame) {
        if self.annotations.is_empty() {
            return;
        }
        let ctx = AnnotationContext {
            viewport: self.viewport,
            mapper: self.state.mapper(),
            layout: self.state.layout(),
            style: AnnotationStyle {
                line_width: self.settings.line_width,
                font_size_px: self.settings.scale_font_size,
                text_color: self.settings.scale_font_color,
            },
        };
        let drawn = project_annotations(&self.annotations, &ctx, frame);
        debug!(total = self.annotations.len(), drawn, "annotations projected");
    }

    fn push_watermark(&self, frame: &mut RenderFrame) {
        let text = self.settings.watermark_text.trim();
        let layout = self.state.layout();
        if text.is_empty() || layout.panes.is_empty() {
            return;
        }
        let font_size = self.settings.title_font_size * WATERMARK_FONT_SCALE;
        push_label(
            frame,
            text.to_owned(),
            layout.plot_width / 2.0,
            layout.x_axis_top() / 2.0,
            font_size,
            self.settings.scale_font_color.with_alpha(WATERMARK_OPACITY),
            TextHAlign::Center,
        );
    }
}

/// Pushes a text primitive unless the text is empty.
pub(super) fn push_label(
    frame: &mut RenderFrame,
    text: String,
    x: f64,
    y: f64,
    font_size_px: f64,
    color: Color,
    h_align: TextHAlign,
) {
    if text.is_empty() {
        return;
    }
    frame
        .texts
        .push(TextPrimitive::new(text, x, y, font_size_px, color, h_align));
}

/// Text on a filled box; `x` is interpreted according to `h_align`.
pub(super) struct LabelBox {
    pub(super) font_size_px: f64,
    pub(super) fill_color: Color,
    pub(super) text_color: Color,
}

impl LabelBox {
    pub(super) fn push(
        &self,
        frame: &mut RenderFrame,
        text: String,
        x: f64,
        center_y: f64,
        h_align: TextHAlign,
    ) {
        if text.is_empty() {
            return;
        }
        let width = estimate_text_width_px(&text, self.font_size_px) + 2.0 * LABEL_BOX_PADDING_X_PX;
        let height = self.font_size_px + 2.0 * LABEL_BOX_PADDING_Y_PX;
        let (left, text_x) = match h_align {
            TextHAlign::Left => (x, x + LABEL_BOX_PADDING_X_PX),
            TextHAlign::Center => (x - width / 2.0, x),
            TextHAlign::Right => (x - width, x - LABEL_BOX_PADDING_X_PX),
        };
        frame.rects.push(RectPrimitive {
            x: left,
            y: center_y - height / 2.0,
            width,
            height,
            fill_color: self.fill_color,
        });
        push_label(
            frame,
            text,
            text_x,
            center_y,
            self.font_size_px,
            self.text_color,
            h_align,
        );
    }
}
