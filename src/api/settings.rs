use chrono::format::{Item, StrftimeItems};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::{DEFAULT_MIN_ZOOM_LEVEL, DEFAULT_MIN_ZOOM_ROWS, PAIRED_PALETTE, ScaleId};
use crate::error::{ChartError, ChartResult};
use crate::render::{Color, LineStrokeStyle};

/// Copies every `Some` field of `$from` over `$into`.
macro_rules! overlay {
    ($into:expr, $from:expr, $($field:ident),+ $(,)?) => {
        $(
            if $from.$field.is_some() {
                $into.$field = $from.$field;
            }
        )+
    };
}

/// Writes every `Some` field of `$patch` into the resolved `$settings`.
macro_rules! apply_fields {
    ($settings:expr, $patch:expr, $($field:ident),+ $(,)?) => {
        $(
            if let Some(value) = &$patch.$field {
                $settings.$field = value.clone();
            }
        )+
    };
}

/// Height of the shared time axis strip.
pub const X_AXIS_HEIGHT_PX: f64 = 25.0;

/// Upper bound for `yScaleTickCount`, globally and per sub graph.
pub const MAX_Y_SCALE_TICK_COUNT: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// Partial settings layered between the global defaults and user settings.
    #[must_use]
    pub fn preset(self) -> SettingsPatch {
        let (separator, crosshair, contrast, background, grid, scale_line, scale_font) = match self
        {
            Self::Light => (
                Color::from_rgba8(0x00, 0x00, 0x00, 0x54),
                Color::from_rgb8(0x3d, 0x3d, 0x3d),
                Color::from_rgb8(0xff, 0xff, 0xff),
                Color::from_rgb8(0xff, 0xff, 0xff),
                Color::from_rgba8(0x00, 0x00, 0x00, 0x10),
                Color::from_rgba8(0x00, 0x00, 0x00, 0x30),
                Color::from_rgb8(0x00, 0x00, 0x00),
            ),
            Self::Dark => (
                Color::from_rgba8(0xff, 0xff, 0xff, 0x54),
                Color::from_rgb8(0xe8, 0xe8, 0xe8),
                Color::from_rgb8(0x00, 0x00, 0x00),
                Color::from_rgb8(0x00, 0x00, 0x00),
                Color::from_rgba8(0xff, 0xff, 0xff, 0x10),
                Color::from_rgba8(0xff, 0xff, 0xff, 0x30),
                Color::from_rgb8(0xff, 0xff, 0xff),
            ),
        };
        SettingsPatch {
            graph_separator_color: Some(separator),
            crosshair_color: Some(crosshair),
            crosshair_contrast_color: Some(contrast),
            background: Some(background),
            grid_lines_type: Some(GridLinesType::Both),
            grid_lines_color: Some(GridLinesColorPatch::Single(grid)),
            scale_line_color: Some(scale_line),
            scale_font_color: Some(scale_font),
            ..SettingsPatch::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GridLinesType {
    None,
    Vert,
    Horiz,
    #[default]
    Both,
}

impl GridLinesType {
    #[must_use]
    pub fn vertical(self) -> bool {
        matches!(self, Self::Vert | Self::Both)
    }

    #[must_use]
    pub fn horizontal(self) -> bool {
        matches!(self, Self::Horiz | Self::Both)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TitlePlacement {
    TopLeft,
    TopCenter,
    #[default]
    TopRight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LegendPosition {
    #[default]
    TopLeft,
    TopRight,
}

/// Resolved grid colors, `vert` for time gridlines and `horiz` for value ones.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridLineColors {
    pub vert: Color,
    pub horiz: Color,
}

/// Either one color for both grid directions or a `[vert, horiz]` pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GridLinesColorPatch {
    Single(Color),
    Pair([Color; 2]),
}

impl GridLinesColorPatch {
    #[must_use]
    pub fn resolve(self) -> GridLineColors {
        match self {
            Self::Single(color) => GridLineColors {
                vert: color,
                horiz: color,
            },
            Self::Pair([vert, horiz]) => GridLineColors { vert, horiz },
        }
    }
}

/// Per-scale overrides. Unset keys inherit the chart-wide value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubGraphPatch {
    pub title: Option<String>,
    pub title_placement: Option<TitlePlacement>,
    pub title_font_color: Option<Color>,
    pub y_scale_tick_count: Option<usize>,
    pub y_scale_padding_pct: Option<f64>,
    pub legend_position: Option<LegendPosition>,
    pub legend_precision: Option<usize>,
    pub line_width: Option<f64>,
    pub scale_section_ratio: Option<f64>,
    pub delta_height: Option<f64>,
}

impl SubGraphPatch {
    /// Overlays every key set in `other`.
    pub fn merge(&mut self, other: SubGraphPatch) {
        overlay!(
            self,
            other,
            title,
            title_placement,
            title_font_color,
            y_scale_tick_count,
            y_scale_padding_pct,
            legend_position,
            legend_precision,
            line_width,
            scale_section_ratio,
            delta_height,
        );
    }
}

/// Partial chart settings as supplied by hosts and theme presets.
///
/// Keys use the camelCase names of the JSON settings object; anything left
/// unset falls back to the theme preset and then to [`ChartSettings::default`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsPatch {
    pub zoom_level: Option<f64>,
    pub wheel_zoom_sensitivity: Option<f64>,
    pub min_zoom_level: Option<f64>,
    pub min_zoom_rows: Option<usize>,
    pub x_scale_padding: Option<f64>,
    pub y_scale_padding_pct: Option<f64>,
    pub y_scale_tick_count: Option<usize>,
    pub x_grid_interval: Option<usize>,
    pub x_scale_format: Option<String>,
    #[serde(alias = "xScaleCrossHairFormat")]
    pub x_scale_crosshair_format: Option<String>,
    pub plot_section_ratio: Option<f64>,
    pub x_axis_height: Option<f64>,
    pub line_width: Option<f64>,
    pub legend_margin: Option<f64>,
    pub legend_precision: Option<usize>,
    #[serde(alias = "crossHairValuePrecision")]
    pub crosshair_value_precision: Option<usize>,
    pub title: Option<String>,
    pub title_placement: Option<TitlePlacement>,
    pub legend_position: Option<LegendPosition>,
    pub title_font_size: Option<f64>,
    pub legend_font_size: Option<f64>,
    pub scale_font_size: Option<f64>,
    pub graph_separator_color: Option<Color>,
    #[serde(alias = "crossHairWidth")]
    pub crosshair_width: Option<f64>,
    #[serde(alias = "crossHairColor")]
    pub crosshair_color: Option<Color>,
    #[serde(alias = "crossHairContrastColor")]
    pub crosshair_contrast_color: Option<Color>,
    #[serde(alias = "crossHairType")]
    pub crosshair_type: Option<LineStrokeStyle>,
    pub background: Option<Color>,
    pub grid_lines_type: Option<GridLinesType>,
    pub grid_lines_color: Option<GridLinesColorPatch>,
    pub scale_line_color: Option<Color>,
    pub scale_font_color: Option<Color>,
    #[serde(alias = "colorPallet")]
    pub color_palette: Option<Vec<Color>>,
    pub watermark_text: Option<String>,
    pub sub_graph: IndexMap<ScaleId, SubGraphPatch>,
}

impl SettingsPatch {
    pub fn from_json_str(input: &str) -> ChartResult<Self> {
        serde_json::from_str(input)
            .map_err(|err| ChartError::InvalidSettings(format!("failed to parse settings: {err}")))
    }

    /// Overlays `other` on this patch; per-scale entries merge key by key.
    pub fn merge(&mut self, other: SettingsPatch) {
        overlay!(
            self,
            other,
            zoom_level,
            wheel_zoom_sensitivity,
            min_zoom_level,
            min_zoom_rows,
            x_scale_padding,
            y_scale_padding_pct,
            y_scale_tick_count,
            x_grid_interval,
            x_scale_format,
            x_scale_crosshair_format,
            plot_section_ratio,
            x_axis_height,
            line_width,
            legend_margin,
            legend_precision,
            crosshair_value_precision,
            title,
            title_placement,
            legend_position,
            title_font_size,
            legend_font_size,
            scale_font_size,
            graph_separator_color,
            crosshair_width,
            crosshair_color,
            crosshair_contrast_color,
            crosshair_type,
            background,
            grid_lines_type,
            grid_lines_color,
            scale_line_color,
            scale_font_color,
            color_palette,
            watermark_text,
        );
        for (scale_id, patch) in other.sub_graph {
            self.sub_graph.entry(scale_id).or_default().merge(patch);
        }
    }

    /// Whether applying this patch can change the visible window.
    #[must_use]
    pub fn touches_window(&self) -> bool {
        self.zoom_level.is_some() || self.min_zoom_level.is_some() || self.min_zoom_rows.is_some()
    }
}

/// Fully resolved settings for one chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSettings {
    pub zoom_level: f64,
    pub wheel_zoom_sensitivity: f64,
    pub min_zoom_level: f64,
    pub min_zoom_rows: usize,
    pub x_scale_padding: f64,
    pub y_scale_padding_pct: f64,
    pub y_scale_tick_count: usize,
    pub x_grid_interval: usize,
    pub x_scale_format: String,
    pub x_scale_crosshair_format: String,
    pub plot_section_ratio: f64,
    pub x_axis_height: f64,
    pub line_width: f64,
    pub legend_margin: f64,
    pub legend_precision: usize,
    pub crosshair_value_precision: usize,
    pub title: String,
    pub title_placement: TitlePlacement,
    pub legend_position: LegendPosition,
    pub title_font_size: f64,
    pub legend_font_size: f64,
    pub scale_font_size: f64,
    pub graph_separator_color: Color,
    pub crosshair_width: f64,
    pub crosshair_color: Color,
    pub crosshair_contrast_color: Color,
    pub crosshair_type: LineStrokeStyle,
    pub background: Color,
    pub grid_lines_type: GridLinesType,
    pub grid_lines_color: GridLineColors,
    pub scale_line_color: Color,
    pub scale_font_color: Color,
    pub color_palette: Vec<Color>,
    pub watermark_text: String,
    pub sub_graph: IndexMap<ScaleId, SubGraphPatch>,
}

impl Default for ChartSettings {
    fn default() -> Self {
        let grid = Color::from_rgba8(0x00, 0x00, 0x00, 0x10);
        Self {
            zoom_level: 0.8,
            wheel_zoom_sensitivity: 0.01,
            min_zoom_level: DEFAULT_MIN_ZOOM_LEVEL,
            min_zoom_rows: DEFAULT_MIN_ZOOM_ROWS,
            x_scale_padding: 0.2,
            y_scale_padding_pct: 0.1,
            y_scale_tick_count: 5,
            x_grid_interval: 7,
            x_scale_format: "%d/%m, %H:%M".to_owned(),
            x_scale_crosshair_format: "%d/%m, %H:%M".to_owned(),
            plot_section_ratio: 0.94,
            x_axis_height: X_AXIS_HEIGHT_PX,
            line_width: 2.0,
            legend_margin: 10.0,
            legend_precision: 3,
            crosshair_value_precision: 2,
            title: String::new(),
            title_placement: TitlePlacement::TopRight,
            legend_position: LegendPosition::TopLeft,
            title_font_size: 12.0,
            legend_font_size: 12.0,
            scale_font_size: 12.0,
            graph_separator_color: Color::from_rgba8(0x00, 0x00, 0x00, 0x54),
            crosshair_width: 1.0,
            crosshair_color: Color::from_rgb8(0x3d, 0x3d, 0x3d),
            crosshair_contrast_color: Color::from_rgb8(0xff, 0xff, 0xff),
            crosshair_type: LineStrokeStyle::Dashed,
            background: Color::from_rgb8(0xff, 0xff, 0xff),
            grid_lines_type: GridLinesType::Both,
            grid_lines_color: GridLineColors {
                vert: grid,
                horiz: grid,
            },
            scale_line_color: Color::from_rgba8(0x00, 0x00, 0x00, 0x30),
            scale_font_color: Color::from_rgb8(0x00, 0x00, 0x00),
            color_palette: PAIRED_PALETTE.to_vec(),
            watermark_text: String::new(),
            sub_graph: IndexMap::new(),
        }
    }
}

/// Settings of one scale after per-scale overrides.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleSettings {
    pub title: String,
    pub title_placement: TitlePlacement,
    pub title_font_color: Color,
    pub y_scale_tick_count: usize,
    pub y_scale_padding_pct: f64,
    pub legend_position: LegendPosition,
    pub legend_precision: usize,
    pub line_width: f64,
    pub section_ratio: Option<f64>,
    pub delta_height: f64,
}

impl ChartSettings {
    /// Layers `theme` and then `patch` over the global defaults and validates.
    pub fn resolve(theme: Theme, patch: &SettingsPatch) -> ChartResult<Self> {
        let mut settings = Self::default();
        settings.apply(&theme.preset());
        settings.apply(patch);
        settings.validate()?;
        Ok(settings)
    }

    pub fn apply(&mut self, patch: &SettingsPatch) {
        apply_fields!(
            self,
            patch,
            zoom_level,
            wheel_zoom_sensitivity,
            min_zoom_level,
            min_zoom_rows,
            x_scale_padding,
            y_scale_padding_pct,
            y_scale_tick_count,
            x_grid_interval,
            x_scale_format,
            x_scale_crosshair_format,
            plot_section_ratio,
            x_axis_height,
            line_width,
            legend_margin,
            legend_precision,
            crosshair_value_precision,
            title,
            title_placement,
            legend_position,
            title_font_size,
            legend_font_size,
            scale_font_size,
            graph_separator_color,
            crosshair_width,
            crosshair_color,
            crosshair_contrast_color,
            crosshair_type,
            background,
            grid_lines_type,
            scale_line_color,
            scale_font_color,
            color_palette,
            watermark_text,
        );
        if let Some(grid) = patch.grid_lines_color {
            self.grid_lines_color = grid.resolve();
        }
        for (scale_id, sub) in &patch.sub_graph {
            self.sub_graph
                .entry(scale_id.clone())
                .or_default()
                .merge(sub.clone());
        }
    }

    /// Per-scale view with chart-wide fallbacks.
    #[must_use]
    pub fn scale_settings(&self, scale_id: &str) -> ScaleSettings {
        let sub = self.sub_graph.get(scale_id);
        ScaleSettings {
            title: sub.and_then(|s| s.title.clone()).unwrap_or_default(),
            title_placement: sub
                .and_then(|s| s.title_placement)
                .unwrap_or(self.title_placement),
            title_font_color: sub
                .and_then(|s| s.title_font_color)
                .unwrap_or(self.scale_font_color),
            y_scale_tick_count: sub
                .and_then(|s| s.y_scale_tick_count)
                .unwrap_or(self.y_scale_tick_count),
            y_scale_padding_pct: sub
                .and_then(|s| s.y_scale_padding_pct)
                .unwrap_or(self.y_scale_padding_pct),
            legend_position: sub
                .and_then(|s| s.legend_position)
                .unwrap_or(self.legend_position),
            legend_precision: sub
                .and_then(|s| s.legend_precision)
                .unwrap_or(self.legend_precision),
            line_width: sub.and_then(|s| s.line_width).unwrap_or(self.line_width),
            section_ratio: sub.and_then(|s| s.scale_section_ratio),
            delta_height: sub.and_then(|s| s.delta_height).unwrap_or(0.0),
        }
    }

    pub fn validate(&self) -> ChartResult<()> {
        unit_interval("zoomLevel", self.zoom_level)?;
        unit_interval("minZoomLevel", self.min_zoom_level)?;
        non_negative("wheelZoomSensitivity", self.wheel_zoom_sensitivity)?;
        if self.min_zoom_rows == 0 {
            return Err(invalid("minZoomRows must be >= 1"));
        }
        if !self.x_scale_padding.is_finite() || !(0.0..1.0).contains(&self.x_scale_padding) {
            return Err(invalid("xScalePadding must be finite and in [0, 1)"));
        }
        non_negative("yScalePaddingPct", self.y_scale_padding_pct)?;
        if !(1..=MAX_Y_SCALE_TICK_COUNT).contains(&self.y_scale_tick_count) {
            return Err(ChartError::InvalidSettings(format!(
                "yScaleTickCount must be in [1, {MAX_Y_SCALE_TICK_COUNT}]"
            )));
        }
        if self.x_grid_interval == 0 {
            return Err(invalid("xGridInterval must be >= 1"));
        }
        if !self.plot_section_ratio.is_finite()
            || self.plot_section_ratio <= 0.0
            || self.plot_section_ratio > 1.0
        {
            return Err(invalid("plotSectionRatio must be finite and in (0, 1]"));
        }
        non_negative("xAxisHeight", self.x_axis_height)?;
        non_negative("legendMargin", self.legend_margin)?;
        for (name, value) in [
            ("lineWidth", self.line_width),
            ("titleFontSize", self.title_font_size),
            ("legendFontSize", self.legend_font_size),
            ("scaleFontSize", self.scale_font_size),
            ("crossHairWidth", self.crosshair_width),
        ] {
            positive(name, value)?;
        }
        for color in [
            self.graph_separator_color,
            self.crosshair_color,
            self.crosshair_contrast_color,
            self.background,
            self.grid_lines_color.vert,
            self.grid_lines_color.horiz,
            self.scale_line_color,
            self.scale_font_color,
        ] {
            color
                .validate()
                .map_err(|err| ChartError::InvalidSettings(err.to_string()))?;
        }
        if self.color_palette.is_empty() {
            return Err(invalid("colorPalette must not be empty"));
        }
        time_format("xScaleFormat", &self.x_scale_format)?;
        time_format("xScaleCrosshairFormat", &self.x_scale_crosshair_format)?;

        for (scale_id, sub) in &self.sub_graph {
            validate_sub_graph(scale_id, sub)?;
        }
        Ok(())
    }
}

fn validate_sub_graph(scale_id: &str, sub: &SubGraphPatch) -> ChartResult<()> {
    let scoped = |reason: &str| {
        ChartError::InvalidSettings(format!("subGraph `{scale_id}`: {reason}"))
    };
    if let Some(count) = sub.y_scale_tick_count {
        if !(1..=MAX_Y_SCALE_TICK_COUNT).contains(&count) {
            return Err(scoped(&format!(
                "yScaleTickCount must be in [1, {MAX_Y_SCALE_TICK_COUNT}]"
            )));
        }
    }
    if let Some(pct) = sub.y_scale_padding_pct {
        if !pct.is_finite() || pct < 0.0 {
            return Err(scoped("yScalePaddingPct must be finite and >= 0"));
        }
    }
    if let Some(width) = sub.line_width {
        if !width.is_finite() || width <= 0.0 {
            return Err(scoped("lineWidth must be finite and > 0"));
        }
    }
    if let Some(ratio) = sub.scale_section_ratio {
        if !ratio.is_finite() || !(0.0..=1.0).contains(&ratio) {
            return Err(scoped("scaleSectionRatio must be finite and in [0, 1]"));
        }
    }
    if sub.delta_height.is_some_and(|delta| !delta.is_finite()) {
        return Err(scoped("deltaHeight must be finite"));
    }
    if let Some(color) = sub.title_font_color {
        color.validate().map_err(|err| scoped(&err.to_string()))?;
    }
    Ok(())
}

fn invalid(reason: &str) -> ChartError {
    ChartError::InvalidSettings(reason.to_owned())
}

fn unit_interval(name: &str, value: f64) -> ChartResult<()> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ChartError::InvalidSettings(format!(
            "{name} must be finite and in [0, 1]"
        )))
    }
}

fn non_negative(name: &str, value: f64) -> ChartResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ChartError::InvalidSettings(format!(
            "{name} must be finite and >= 0"
        )))
    }
}

fn positive(name: &str, value: f64) -> ChartResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ChartError::InvalidSettings(format!(
            "{name} must be finite and > 0"
        )))
    }
}

fn time_format(name: &str, pattern: &str) -> ChartResult<()> {
    if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
        return Err(ChartError::InvalidSettings(format!(
            "{name} `{pattern}` is not a valid strftime pattern"
        )));
    }
    Ok(())
}
