use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::{DataSourceId, PlotId, RawRecord, ScaleId};
use crate::error::{ChartError, ChartResult};
use crate::render::Color;

/// Declared plot type. Only `Candle` changes core semantics (structured value).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlotKind {
    SolidLine,
    DashedLine,
    DottedLine,
    Area,
    Candle,
    Bar,
    VarBar,
}

impl PlotKind {
    #[must_use]
    pub fn expects_candle(self) -> bool {
        matches!(self, Self::Candle)
    }

    #[must_use]
    pub fn is_line(self) -> bool {
        matches!(self, Self::SolidLine | Self::DashedLine | Self::DottedLine)
    }
}

/// Structured OHLC value of a candle plot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CandleValue {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl CandleValue {
    #[must_use]
    pub const fn new(open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            open,
            high,
            low,
            close,
        }
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.open.is_finite()
            && self.high.is_finite()
            && self.low.is_finite()
            && self.close.is_finite()
    }

    #[must_use]
    pub fn is_bullish(self) -> bool {
        self.close >= self.open
    }
}

/// Value extracted for one plot at one timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PlotValue {
    Scalar(f64),
    Candle(CandleValue),
}

impl PlotValue {
    /// Low/high extremes used for auto-ranging.
    #[must_use]
    pub fn extent(self) -> (f64, f64) {
        match self {
            Self::Scalar(value) => (value, value),
            Self::Candle(candle) => (candle.low.min(candle.high), candle.low.max(candle.high)),
        }
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        match self {
            Self::Scalar(value) => value.is_finite(),
            Self::Candle(candle) => candle.is_finite(),
        }
    }

    #[must_use]
    pub fn is_candle(self) -> bool {
        matches!(self, Self::Candle(_))
    }

    /// Representative scalar: the value itself, or the close of a candle.
    #[must_use]
    pub fn primary(self) -> f64 {
        match self {
            Self::Scalar(value) => value,
            Self::Candle(candle) => candle.close,
        }
    }
}

impl From<f64> for PlotValue {
    fn from(value: f64) -> Self {
        Self::Scalar(value)
    }
}

impl From<CandleValue> for PlotValue {
    fn from(value: CandleValue) -> Self {
        Self::Candle(value)
    }
}

pub type TimestampExtractor = Arc<dyn Fn(&RawRecord) -> Option<DateTime<Utc>> + Send + Sync>;
pub type ValueExtractor = Arc<dyn Fn(&RawRecord) -> Option<PlotValue> + Send + Sync>;
pub type ColorExtractor = Arc<dyn Fn(&RawRecord) -> Color + Send + Sync>;
pub type BaselineExtractor = Arc<dyn Fn(&RawRecord) -> Option<f64> + Send + Sync>;

/// Plot color: one color for the whole plot or one per point.
#[derive(Clone)]
pub enum ColorSpec {
    Static(Color),
    PerPoint(ColorExtractor),
}

impl ColorSpec {
    #[must_use]
    pub fn resolve(&self, record: &RawRecord) -> Color {
        match self {
            Self::Static(color) => *color,
            Self::PerPoint(extract) => extract(record),
        }
    }
}

impl fmt::Debug for ColorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(color) => f.debug_tuple("Static").field(color).finish(),
            Self::PerPoint(_) => f.write_str("PerPoint(..)"),
        }
    }
}

/// Baseline of filled/bar plots.
///
/// A per-point extractor returning `None` carries the previous baseline of the
/// same plot forward.
#[derive(Clone)]
pub enum BaselineSpec {
    Static(f64),
    PerPoint(BaselineExtractor),
}

impl fmt::Debug for BaselineSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(value) => f.debug_tuple("Static").field(value).finish(),
            Self::PerPoint(_) => f.write_str("PerPoint(..)"),
        }
    }
}

/// Data binding of one plot: where its records live and how to read them.
///
/// Extractors run once per record on every full recompute and must be pure.
#[derive(Clone)]
pub struct PlotConfig {
    pub kind: PlotKind,
    pub data_source_id: DataSourceId,
    pub timestamp: Option<TimestampExtractor>,
    pub value: Option<ValueExtractor>,
    pub color: Option<ColorSpec>,
    pub baseline: Option<BaselineSpec>,
}

impl PlotConfig {
    /// Creates a plot with no extractors; both must be supplied before use.
    #[must_use]
    pub fn new(kind: PlotKind, data_source_id: impl Into<DataSourceId>) -> Self {
        Self {
            kind,
            data_source_id: data_source_id.into(),
            timestamp: None,
            value: None,
            color: None,
            baseline: None,
        }
    }

    /// Candle plot reading `[iso, o, h, l, c, v]` records.
    #[must_use]
    pub fn candle(data_source_id: impl Into<DataSourceId>) -> Self {
        Self::new(PlotKind::Candle, data_source_id)
            .with_timestamp_extractor(RawRecord::builtin_timestamp)
            .with_value_extractor(|record| record.builtin_candle().map(PlotValue::Candle))
    }

    /// Scalar plot reading `{timestamp, value}` records (or candle closes).
    #[must_use]
    pub fn scalar(kind: PlotKind, data_source_id: impl Into<DataSourceId>) -> Self {
        Self::new(kind, data_source_id)
            .with_timestamp_extractor(RawRecord::builtin_timestamp)
            .with_scalar_extractor(RawRecord::builtin_scalar)
    }

    #[must_use]
    pub fn with_timestamp_extractor<F>(mut self, extract: F) -> Self
    where
        F: Fn(&RawRecord) -> Option<DateTime<Utc>> + Send + Sync + 'static,
    {
        self.timestamp = Some(Arc::new(extract));
        self
    }

    #[must_use]
    pub fn with_value_extractor<F>(mut self, extract: F) -> Self
    where
        F: Fn(&RawRecord) -> Option<PlotValue> + Send + Sync + 'static,
    {
        self.value = Some(Arc::new(extract));
        self
    }

    #[must_use]
    pub fn with_scalar_extractor<F>(self, extract: F) -> Self
    where
        F: Fn(&RawRecord) -> Option<f64> + Send + Sync + 'static,
    {
        self.with_value_extractor(move |record| extract(record).map(PlotValue::Scalar))
    }

    #[must_use]
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(ColorSpec::Static(color));
        self
    }

    #[must_use]
    pub fn with_color_fn<F>(mut self, color: F) -> Self
    where
        F: Fn(&RawRecord) -> Color + Send + Sync + 'static,
    {
        self.color = Some(ColorSpec::PerPoint(Arc::new(color)));
        self
    }

    #[must_use]
    pub fn with_baseline(mut self, baseline: f64) -> Self {
        self.baseline = Some(BaselineSpec::Static(baseline));
        self
    }

    #[must_use]
    pub fn with_baseline_fn<F>(mut self, baseline: F) -> Self
    where
        F: Fn(&RawRecord) -> Option<f64> + Send + Sync + 'static,
    {
        self.baseline = Some(BaselineSpec::PerPoint(Arc::new(baseline)));
        self
    }

    /// Checks that the plot can be evaluated; reasons are human readable.
    pub fn validate(&self) -> Result<(), String> {
        if self.data_source_id.trim().is_empty() {
            return Err("data source id must not be empty".to_owned());
        }
        if self.timestamp.is_none() {
            return Err("missing timestamp extractor".to_owned());
        }
        if self.value.is_none() {
            return Err("missing value extractor".to_owned());
        }
        if let Some(BaselineSpec::Static(baseline)) = &self.baseline {
            if !baseline.is_finite() {
                return Err("static baseline must be finite".to_owned());
            }
        }
        if let Some(ColorSpec::Static(color)) = &self.color {
            color.validate().map_err(|e| e.to_string())?;
        }
        Ok(())
    }

    fn from_descriptor(descriptor: PlotDescriptor) -> Self {
        let mut plot = if descriptor.kind.expects_candle() {
            Self::candle(descriptor.data_id)
        } else {
            Self::scalar(descriptor.kind, descriptor.data_id)
        };
        if let Some(color) = descriptor.color {
            plot = plot.with_color(color);
        }
        if let Some(base_y) = descriptor.base_y {
            plot = plot.with_baseline(base_y);
        }
        plot
    }
}

impl fmt::Debug for PlotConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlotConfig")
            .field("kind", &self.kind)
            .field("data_source_id", &self.data_source_id)
            .field("has_timestamp_extractor", &self.timestamp.is_some())
            .field("has_value_extractor", &self.value.is_some())
            .field("color", &self.color)
            .field("baseline", &self.baseline)
            .finish()
    }
}

/// Plot that failed validation and was excluded from the chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedPlot {
    pub scale_id: ScaleId,
    pub plot_id: PlotId,
    pub reason: String,
}

impl RejectedPlot {
    #[must_use]
    pub fn to_error(&self) -> ChartError {
        ChartError::InvalidConfig {
            scale: self.scale_id.clone(),
            plot: self.plot_id.clone(),
            reason: self.reason.clone(),
        }
    }
}

/// Ordered scale-id → plot-id → plot mapping.
///
/// Scale order is the stacking order of sub-charts, plot order is draw order.
#[derive(Debug, Clone, Default)]
pub struct ChartConfig {
    scales: IndexMap<ScaleId, IndexMap<PlotId, PlotConfig>>,
}

impl ChartConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_plot(
        mut self,
        scale_id: impl Into<ScaleId>,
        plot_id: impl Into<PlotId>,
        plot: PlotConfig,
    ) -> Self {
        self.insert_plot(scale_id, plot_id, plot);
        self
    }

    pub fn insert_plot(
        &mut self,
        scale_id: impl Into<ScaleId>,
        plot_id: impl Into<PlotId>,
        plot: PlotConfig,
    ) {
        self.scales
            .entry(scale_id.into())
            .or_default()
            .insert(plot_id.into(), plot);
    }

    pub fn scales(&self) -> impl Iterator<Item = (&ScaleId, &IndexMap<PlotId, PlotConfig>)> {
        self.scales.iter()
    }

    #[must_use]
    pub fn scale_ids(&self) -> Vec<ScaleId> {
        self.scales.keys().cloned().collect()
    }

    #[must_use]
    pub fn plots(&self, scale_id: &str) -> Option<&IndexMap<PlotId, PlotConfig>> {
        self.scales.get(scale_id)
    }

    #[must_use]
    pub fn plot(&self, scale_id: &str, plot_id: &str) -> Option<&PlotConfig> {
        self.scales.get(scale_id)?.get(plot_id)
    }

    #[must_use]
    pub fn scale_count(&self) -> usize {
        self.scales.len()
    }

    #[must_use]
    pub fn plot_count(&self) -> usize {
        self.scales.values().map(IndexMap::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.plot_count() == 0
    }

    /// Splits the config into its valid part and the plots that were excluded.
    ///
    /// Scales keep their position even when all of their plots are rejected.
    #[must_use]
    pub fn partition_valid(self) -> (Self, Vec<RejectedPlot>) {
        let mut rejected = Vec::new();
        let mut scales = IndexMap::with_capacity(self.scales.len());
        for (scale_id, plots) in self.scales {
            let mut kept = IndexMap::with_capacity(plots.len());
            for (plot_id, plot) in plots {
                let outcome = if scale_id.trim().is_empty() {
                    Err("scale id must not be empty".to_owned())
                } else {
                    plot.validate()
                };
                match outcome {
                    Ok(()) => {
                        kept.insert(plot_id, plot);
                    }
                    Err(reason) => rejected.push(RejectedPlot {
                        scale_id: scale_id.clone(),
                        plot_id,
                        reason,
                    }),
                }
            }
            if !scale_id.trim().is_empty() {
                scales.insert(scale_id, kept);
            }
        }
        (Self { scales }, rejected)
    }

    /// Parses the declarative form `{scale: {plot: {type, dataId, color?, baseY?}}}`.
    ///
    /// Plots built this way use the built-in record extractors.
    pub fn from_json_str(input: &str) -> ChartResult<Self> {
        let raw: IndexMap<ScaleId, IndexMap<PlotId, PlotDescriptor>> = serde_json::from_str(input)
            .map_err(|e| ChartError::InvalidData(format!("failed to parse chart config json: {e}")))?;
        let scales = raw
            .into_iter()
            .map(|(scale_id, plots)| {
                let plots = plots
                    .into_iter()
                    .map(|(plot_id, descriptor)| (plot_id, PlotConfig::from_descriptor(descriptor)))
                    .collect();
                (scale_id, plots)
            })
            .collect();
        Ok(Self { scales })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlotDescriptor {
    #[serde(rename = "type")]
    kind: PlotKind,
    data_id: DataSourceId,
    #[serde(default)]
    color: Option<Color>,
    #[serde(default)]
    base_y: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::{ChartConfig, PlotConfig, PlotKind, PlotValue};
    use crate::render::Color;

    #[test]
    fn partition_excludes_plots_missing_extractors() {
        let config = ChartConfig::new()
            .with_plot("price", "ohlc", PlotConfig::candle("nifty"))
            .with_plot("price", "broken", PlotConfig::new(PlotKind::SolidLine, "sma"))
            .with_plot("volume", "vol", PlotConfig::new(PlotKind::Bar, "").with_scalar_extractor(|_| None));

        let (valid, rejected) = config.partition_valid();

        assert_eq!(valid.plot_count(), 1);
        assert_eq!(valid.scale_count(), 2);
        assert_eq!(rejected.len(), 2);
        assert_eq!(rejected[0].plot_id, "broken");
        assert!(rejected[0].reason.contains("timestamp extractor"));
        assert!(rejected[1].reason.contains("data source id"));
    }

    #[test]
    fn json_descriptor_selects_builtin_extractors_by_type() {
        let config = ChartConfig::from_json_str(
            r##"{
                "price": {
                    "candles": {"type": "candle", "dataId": "nifty"},
                    "sma": {"type": "dashed-line", "dataId": "sma20", "color": "#ff7f00"}
                },
                "volume": {"vol": {"type": "var-bar", "dataId": "vol", "baseY": 0}}
            }"##,
        )
        .expect("valid config");

        assert_eq!(config.scale_ids(), vec!["price".to_owned(), "volume".to_owned()]);
        let sma = config.plot("price", "sma").expect("sma");
        assert_eq!(sma.kind, PlotKind::DashedLine);
        assert!(sma.timestamp.is_some() && sma.value.is_some());
        assert!(matches!(
            sma.color,
            Some(super::ColorSpec::Static(c)) if c == Color::rgb(1.0, 127.0 / 255.0, 0.0)
        ));
        let vol = config.plot("volume", "vol").expect("vol");
        assert!(matches!(vol.baseline, Some(super::BaselineSpec::Static(b)) if b == 0.0));
    }

    #[test]
    fn candle_extent_uses_low_and_high() {
        let value = PlotValue::Candle(super::CandleValue::new(10.0, 15.0, 8.0, 12.0));
        assert_eq!(value.extent(), (8.0, 15.0));
        assert_eq!(PlotValue::Scalar(3.0).extent(), (3.0, 3.0));
    }
}
