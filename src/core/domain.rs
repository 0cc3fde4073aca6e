use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::core::{DataRow, ScaleId};

/// Padding applied around a zero-span domain when the relative pad vanishes.
pub const MIN_ABSOLUTE_PADDING: f64 = 1e-6;

/// Closed numeric interval `[min, max]` of one scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueDomain {
    pub min: f64,
    pub max: f64,
}

impl ValueDomain {
    /// Builds an interval from two bounds in any order.
    #[must_use]
    pub fn new(a: f64, b: f64) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    #[must_use]
    pub fn span(self) -> f64 {
        self.max - self.min
    }

    #[must_use]
    pub fn contains(self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Widens both ends by `span * padding_pct`.
    ///
    /// A zero span is widened by `|v| * padding_pct`, or by
    /// [`MIN_ABSOLUTE_PADDING`] when that is zero too, so the result never
    /// collapses to a point. At large magnitudes the absolute pad can fall
    /// under the float resolution; the pad then grows to a few ulps of `v`.
    #[must_use]
    pub fn padded(self, padding_pct: f64) -> Self {
        let pct = if padding_pct.is_finite() && padding_pct > 0.0 {
            padding_pct
        } else {
            0.0
        };
        let span = self.span();
        let pad = if span > 0.0 {
            span * pct
        } else {
            (self.max.abs() * pct).max(MIN_ABSOLUTE_PADDING)
        };
        let (min, max) = (self.min - pad, self.max + pad);
        if min < max {
            return Self { min, max };
        }
        let nudge = self.max.abs().max(1.0) * f64::EPSILON * 16.0;
        Self {
            min: self.min - nudge,
            max: self.max + nudge,
        }
    }
}

/// Domains of one scale over the visible window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaleDomain {
    /// Window timestamps at which this scale has at least one cell.
    pub time_domain: Vec<DateTime<Utc>>,
    pub raw: Option<ValueDomain>,
    pub value_domain: Option<ValueDomain>,
}

/// Everything the coordinate mapper needs from one window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WindowDomains {
    /// Distinct window timestamps in ascending order; the band-scale domain.
    pub time_domain: Vec<DateTime<Utc>>,
    pub scales: IndexMap<ScaleId, ScaleDomain>,
}

impl WindowDomains {
    #[must_use]
    pub fn scale(&self, scale_id: &str) -> Option<&ScaleDomain> {
        self.scales.get(scale_id)
    }

    #[must_use]
    pub fn value_domain(&self, scale_id: &str) -> Option<ValueDomain> {
        self.scales.get(scale_id)?.value_domain
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.time_domain.is_empty()
    }
}

/// Derives the shared time domain and per-scale padded value domains.
///
/// `scales` lists every scale id in stacking order together with its padding
/// fraction. Candles contribute low and high, scalars themselves, and every
/// baseline participates as well. Scales without cells get `None` domains.
#[must_use]
pub fn compute_domains(rows: &[DataRow], scales: &[(ScaleId, f64)]) -> WindowDomains {
    let time_domain: Vec<DateTime<Utc>> = rows.iter().map(|row| row.timestamp).collect();

    let scales = scales
        .iter()
        .map(|(scale_id, padding_pct)| {
            let mut extent: Option<(OrderedFloat<f64>, OrderedFloat<f64>)> = None;
            let mut scale_times = Vec::new();
            for row in rows {
                let Some(cells) = row.scale_cells(scale_id).filter(|cells| !cells.is_empty())
                else {
                    continue;
                };
                scale_times.push(row.timestamp);
                for cell in cells.values() {
                    let (low, high) = cell.value.extent();
                    let bounds = [low, high].into_iter().chain(cell.baseline);
                    for bound in bounds.filter(|v| v.is_finite()) {
                        let bound = OrderedFloat(bound);
                        extent = Some(match extent {
                            None => (bound, bound),
                            Some((min, max)) => (min.min(bound), max.max(bound)),
                        });
                    }
                }
            }

            let raw = extent.map(|(min, max)| ValueDomain::new(min.into_inner(), max.into_inner()));
            let domain = ScaleDomain {
                time_domain: scale_times,
                raw,
                value_domain: raw.map(|raw| raw.padded(*padding_pct)),
            };
            (scale_id.clone(), domain)
        })
        .collect();

    WindowDomains {
        time_domain,
        scales,
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use chrono::DateTime;

    use super::{ValueDomain, compute_domains};
    use crate::core::{CandleValue, Cell, DataRow, PlotValue};
    use crate::render::Color;

    fn row(millis: i64, cells: &[(&str, &str, PlotValue, Option<f64>)]) -> DataRow {
        let mut row = DataRow::new(DateTime::from_timestamp_millis(millis).expect("millis"));
        for (scale, plot, value, baseline) in cells {
            row.insert_first(
                scale,
                plot,
                Cell::new(*value, Color::rgb(0.0, 0.0, 0.0), *baseline),
            );
        }
        row
    }

    #[test]
    fn candles_contribute_low_and_high() {
        let rows = vec![
            row(1, &[("p", "c", CandleValue::new(10.0, 15.0, 8.0, 12.0).into(), None)]),
            row(2, &[("p", "c", CandleValue::new(12.0, 14.0, 9.0, 13.0).into(), None)]),
        ];
        let domains = compute_domains(&rows, &[("p".to_owned(), 0.0)]);
        assert_eq!(domains.value_domain("p"), Some(ValueDomain::new(8.0, 15.0)));
        assert_eq!(domains.time_domain.len(), 2);
    }

    #[test]
    fn baselines_widen_the_domain_and_missing_scales_stay_empty() {
        let rows = vec![row(1, &[("vol", "v", PlotValue::Scalar(5.0), Some(0.0))])];
        let domains = compute_domains(
            &rows,
            &[("vol".to_owned(), 0.1), ("rsi".to_owned(), 0.1)],
        );
        let vol = domains.value_domain("vol").expect("vol domain");
        assert_relative_eq!(vol.min, -0.5);
        assert_relative_eq!(vol.max, 5.5);
        let rsi = domains.scale("rsi").expect("rsi listed");
        assert!(rsi.value_domain.is_none());
        assert!(rsi.time_domain.is_empty());
    }

    #[test]
    fn zero_span_padding_stays_finite_and_open() {
        let flat = ValueDomain::new(0.0, 0.0).padded(0.1);
        assert!(flat.min.is_finite() && flat.max.is_finite());
        assert!(flat.min < flat.max);

        let level = ValueDomain::new(50.0, 50.0).padded(0.1);
        assert_relative_eq!(level.min, 45.0);
        assert_relative_eq!(level.max, 55.0);
    }

    #[test]
    fn flat_domain_at_large_magnitude_keeps_a_nonzero_span() {
        let flat = ValueDomain::new(5.0e10, 5.0e10).padded(0.0);
        assert!(flat.min < 5.0e10 && flat.max > 5.0e10);
        assert!(flat.span() > 0.0);

        let huge = ValueDomain::new(-1.0e15, -1.0e15).padded(0.0);
        assert!(huge.min < huge.max);
    }
}
