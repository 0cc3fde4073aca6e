use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::core::primitives::{datetime_to_millis, truncate_to_millis};
use crate::core::{BaselineSpec, Cell, ChartConfig, DataRow, GraphData, PlotConfig, RawRecord};
use crate::render::Color;

/// Twelve-color "paired" palette assigned to plots without an explicit color.
pub const PAIRED_PALETTE: [Color; 12] = [
    Color::from_rgb8(0xa6, 0xce, 0xe3),
    Color::from_rgb8(0x1f, 0x78, 0xb4),
    Color::from_rgb8(0xb2, 0xdf, 0x8a),
    Color::from_rgb8(0x33, 0xa0, 0x2c),
    Color::from_rgb8(0xfb, 0x9a, 0x99),
    Color::from_rgb8(0xe3, 0x1a, 0x1c),
    Color::from_rgb8(0xfd, 0xbf, 0x6f),
    Color::from_rgb8(0xff, 0x7f, 0x00),
    Color::from_rgb8(0xca, 0xb2, 0xd6),
    Color::from_rgb8(0x6a, 0x3d, 0x9a),
    Color::from_rgb8(0xff, 0xff, 0x99),
    Color::from_rgb8(0xb1, 0x59, 0x28),
];

const FALLBACK_PLOT_COLOR: Color = Color::rgb(0.0, 0.0, 0.0);

/// Why a record produced no cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SkipCounts {
    pub missing_timestamp: usize,
    pub missing_value: usize,
    pub shape_mismatch: usize,
    pub non_finite: usize,
}

impl SkipCounts {
    #[must_use]
    pub fn total(self) -> usize {
        self.missing_timestamp + self.missing_value + self.shape_mismatch + self.non_finite
    }
}

/// Left-to-right accumulator over one plot's records.
///
/// `previous_baseline` is the carry-forward state: a per-point baseline that
/// yields nothing reuses the last baseline seen for the same plot.
#[derive(Debug, Default)]
struct PlotFold {
    points: Vec<(DateTime<Utc>, Cell)>,
    previous_baseline: Option<f64>,
    skipped: SkipCounts,
}

impl PlotFold {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            points: Vec::with_capacity(capacity),
            ..Self::default()
        }
    }

    fn step(mut self, record: &RawRecord, plot: &PlotConfig, default_color: Color) -> Self {
        let Some(timestamp) = plot.timestamp.as_ref().and_then(|extract| extract(record)) else {
            self.skipped.missing_timestamp += 1;
            return self;
        };
        let Some(value) = plot.value.as_ref().and_then(|extract| extract(record)) else {
            self.skipped.missing_value += 1;
            return self;
        };
        if value.is_candle() != plot.kind.expects_candle() {
            self.skipped.shape_mismatch += 1;
            return self;
        }
        if !value.is_finite() {
            self.skipped.non_finite += 1;
            return self;
        }

        let baseline = match &plot.baseline {
            None => None,
            Some(BaselineSpec::Static(base)) => Some(*base),
            Some(BaselineSpec::PerPoint(extract)) => extract(record)
                .filter(|base| base.is_finite())
                .or(self.previous_baseline),
        };
        self.previous_baseline = baseline;

        let color = plot
            .color
            .as_ref()
            .map_or(default_color, |spec| spec.resolve(record));
        self.points
            .push((truncate_to_millis(timestamp), Cell::new(value, color, baseline)));
        self
    }
}

struct PlotJob<'a> {
    scale_id: &'a str,
    plot_id: &'a str,
    plot: &'a PlotConfig,
    records: &'a [RawRecord],
    default_color: Color,
}

impl PlotJob<'_> {
    fn extract(&self) -> PlotFold {
        self.records
            .iter()
            .fold(PlotFold::with_capacity(self.records.len()), |fold, record| {
                fold.step(record, self.plot, self.default_color)
            })
    }
}

#[cfg(feature = "parallel-normalize")]
fn extract_all(jobs: &[PlotJob<'_>]) -> Vec<PlotFold> {
    use rayon::prelude::*;

    jobs.par_iter().map(PlotJob::extract).collect()
}

#[cfg(not(feature = "parallel-normalize"))]
fn extract_all(jobs: &[PlotJob<'_>]) -> Vec<PlotFold> {
    jobs.iter().map(PlotJob::extract).collect()
}

fn palette_color(palette: &[Color], index: usize) -> Color {
    if palette.is_empty() {
        return FALLBACK_PLOT_COLOR;
    }
    palette[index % palette.len()]
}

/// Turns raw series into rows grouped by exact millisecond timestamp.
///
/// Rows come back sorted ascending. A scale/plot/timestamp written twice
/// keeps its first cell; plots are merged in config order.
#[must_use]
pub fn normalize(data: &GraphData, config: &ChartConfig, palette: &[Color]) -> Vec<DataRow> {
    let mut jobs = Vec::with_capacity(config.plot_count());
    for (scale_id, plots) in config.scales() {
        for (plot_index, (plot_id, plot)) in plots.iter().enumerate() {
            let Some(records) = data.series(&plot.data_source_id) else {
                debug!(
                    scale = %scale_id,
                    plot = %plot_id,
                    source = %plot.data_source_id,
                    "data source missing, plot contributes no cells"
                );
                continue;
            };
            jobs.push(PlotJob {
                scale_id,
                plot_id,
                plot,
                records,
                default_color: palette_color(palette, plot_index),
            });
        }
    }

    let folds = extract_all(&jobs);

    let mut rows: BTreeMap<i64, DataRow> = BTreeMap::new();
    let mut duplicates = 0_usize;
    for (job, fold) in jobs.iter().zip(folds) {
        let skipped = fold.skipped.total();
        if skipped > 0 {
            warn!(
                scale = %job.scale_id,
                plot = %job.plot_id,
                skipped,
                missing_timestamp = fold.skipped.missing_timestamp,
                missing_value = fold.skipped.missing_value,
                shape_mismatch = fold.skipped.shape_mismatch,
                non_finite = fold.skipped.non_finite,
                "skipped records that could not be extracted"
            );
        }
        for (timestamp, cell) in fold.points {
            let row = rows
                .entry(datetime_to_millis(timestamp))
                .or_insert_with(|| DataRow::new(timestamp));
            if !row.insert_first(job.scale_id, job.plot_id, cell) {
                duplicates += 1;
            }
        }
    }
    if duplicates > 0 {
        debug!(duplicates, "ignored repeated scale/plot/timestamp writes");
    }

    rows.into_values().collect()
}
