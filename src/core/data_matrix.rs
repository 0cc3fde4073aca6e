use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use indexmap::map::Entry;

use crate::core::primitives::{datetime_to_millis, truncate_to_millis};
use crate::core::{PlotId, PlotValue, ScaleId, TimestampMs};
use crate::render::Color;

/// One plot's contribution at one timestamp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    pub value: PlotValue,
    pub color: Color,
    pub baseline: Option<f64>,
}

impl Cell {
    #[must_use]
    pub fn new(value: PlotValue, color: Color, baseline: Option<f64>) -> Self {
        Self {
            value,
            color,
            baseline,
        }
    }
}

/// All cells sharing one timestamp, grouped per scale and plot.
#[derive(Debug, Clone, PartialEq)]
pub struct DataRow {
    pub timestamp: DateTime<Utc>,
    pub cells: IndexMap<ScaleId, IndexMap<PlotId, Cell>>,
}

impl DataRow {
    /// Creates an empty row; the timestamp is truncated to milliseconds.
    #[must_use]
    pub fn new(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp: truncate_to_millis(timestamp),
            cells: IndexMap::new(),
        }
    }

    #[must_use]
    pub fn timestamp_ms(&self) -> TimestampMs {
        datetime_to_millis(self.timestamp)
    }

    #[must_use]
    pub fn cell(&self, scale_id: &str, plot_id: &str) -> Option<&Cell> {
        self.cells.get(scale_id)?.get(plot_id)
    }

    #[must_use]
    pub fn scale_cells(&self, scale_id: &str) -> Option<&IndexMap<PlotId, Cell>> {
        self.cells.get(scale_id)
    }

    /// Inserts a cell unless one already exists. Returns `false` when dropped.
    pub fn insert_first(&mut self, scale_id: &str, plot_id: &str, cell: Cell) -> bool {
        let plots = self.cells.entry(scale_id.to_owned()).or_default();
        match plots.entry(plot_id.to_owned()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(cell);
                true
            }
        }
    }

    /// Merges another row with the same timestamp; existing cells win.
    fn absorb(&mut self, other: DataRow) -> usize {
        let mut dropped = 0;
        for (scale_id, plots) in other.cells {
            for (plot_id, cell) in plots {
                if !self.insert_first(&scale_id, &plot_id, cell) {
                    dropped += 1;
                }
            }
        }
        dropped
    }
}

/// Time-ordered, duplicate-free sequence of rows.
///
/// Rebuilt wholesale on every data or config change, never patched in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataMatrix {
    rows: Vec<DataRow>,
}

impl DataMatrix {
    /// Sorts rows by epoch time and folds equal timestamps into one row.
    #[must_use]
    pub fn build(mut rows: Vec<DataRow>) -> Self {
        rows.sort_by_key(DataRow::timestamp_ms);

        let mut merged: Vec<DataRow> = Vec::with_capacity(rows.len());
        let mut dropped = 0;
        for row in rows {
            match merged.last_mut() {
                Some(last) if last.timestamp_ms() == row.timestamp_ms() => {
                    dropped += last.absorb(row);
                }
                _ => merged.push(row),
            }
        }
        if dropped > 0 {
            tracing::debug!(dropped, "dropped duplicate cells while building data matrix");
        }

        Self { rows: merged }
    }

    #[must_use]
    pub fn rows(&self) -> &[DataRow] {
        &self.rows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn row(&self, index: usize) -> Option<&DataRow> {
        self.rows.get(index)
    }

    /// Borrowed contiguous view of `[start, end)`, clamped to the matrix.
    #[must_use]
    pub fn window_slice(&self, start: usize, end: usize) -> &[DataRow] {
        let end = end.min(self.rows.len());
        let start = start.min(end);
        &self.rows[start..end]
    }

    /// Index of the last row at or before `timestamp_ms`, clamped to the extents.
    ///
    /// A bound before the first row resolves to row 0. `None` only for an
    /// empty matrix.
    #[must_use]
    pub fn index_at_or_before(&self, timestamp_ms: TimestampMs) -> Option<usize> {
        if self.rows.is_empty() {
            return None;
        }
        let after = self
            .rows
            .partition_point(|row| row.timestamp_ms() <= timestamp_ms);
        Some(after.saturating_sub(1))
    }

    /// Index of the row with exactly this timestamp.
    #[must_use]
    pub fn index_of(&self, timestamp_ms: TimestampMs) -> Option<usize> {
        self.rows
            .binary_search_by_key(&timestamp_ms, DataRow::timestamp_ms)
            .ok()
    }
}
