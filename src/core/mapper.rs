use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use tracing::warn;

use crate::core::{BandScale, LinearScale, PaneLayout, ScaleId, WindowDomains};

/// Shared time band scale plus one value scale per pane.
///
/// Rebuilt from scratch whenever domains or layout change.
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateMapper {
    time_domain: Vec<DateTime<Utc>>,
    band: BandScale,
    values: IndexMap<ScaleId, LinearScale>,
}

impl Default for CoordinateMapper {
    fn default() -> Self {
        Self {
            time_domain: Vec::new(),
            band: BandScale::new(0, 0.0, 0.0, 0.0),
            values: IndexMap::new(),
        }
    }
}

impl CoordinateMapper {
    /// Builds the band scale over `[0, plot_width]` and a value scale
    /// `[pane bottom, pane top]` for every pane whose scale has a domain.
    #[must_use]
    pub fn build(domains: &WindowDomains, layout: &PaneLayout, x_padding: f64) -> Self {
        let band = BandScale::new(domains.time_domain.len(), 0.0, layout.plot_width, x_padding);

        let mut values = IndexMap::with_capacity(layout.panes.len());
        for pane in &layout.panes {
            let Some(domain) = domains.value_domain(&pane.scale_id) else {
                continue;
            };
            match LinearScale::new(domain.min, domain.max, pane.bottom(), pane.top) {
                Ok(scale) => {
                    values.insert(pane.scale_id.clone(), scale);
                }
                Err(err) => warn!(scale = %pane.scale_id, error = %err, "skipping value scale"),
            }
        }

        Self {
            time_domain: domains.time_domain.clone(),
            band,
            values,
        }
    }

    #[must_use]
    pub fn band(&self) -> BandScale {
        self.band
    }

    #[must_use]
    pub fn bandwidth(&self) -> f64 {
        self.band.bandwidth()
    }

    #[must_use]
    pub fn step(&self) -> f64 {
        self.band.step()
    }

    #[must_use]
    pub fn time_domain(&self) -> &[DateTime<Utc>] {
        &self.time_domain
    }

    #[must_use]
    pub fn value_scale(&self, scale_id: &str) -> Option<LinearScale> {
        self.values.get(scale_id).copied()
    }

    /// Slot of the last window timestamp at or before `timestamp`.
    #[must_use]
    pub fn slot_at_or_before(&self, timestamp: DateTime<Utc>) -> Option<usize> {
        self.time_domain
            .partition_point(|t| *t <= timestamp)
            .checked_sub(1)
    }

    /// Center x of the band holding exactly `timestamp`.
    #[must_use]
    pub fn x_of(&self, timestamp: DateTime<Utc>) -> Option<f64> {
        let slot = self.time_domain.binary_search(&timestamp).ok()?;
        self.band.center(slot)
    }

    #[must_use]
    pub fn x_of_slot(&self, slot: usize) -> Option<f64> {
        self.band.center(slot)
    }

    #[must_use]
    pub fn y_of(&self, scale_id: &str, value: f64) -> Option<f64> {
        let scale = self.values.get(scale_id)?;
        value.is_finite().then(|| scale.map(value))
    }

    /// Window slot nearest to the pixel column `x`.
    #[must_use]
    pub fn slot_at(&self, x: f64) -> Option<usize> {
        self.band.nearest_index(x)
    }

    #[must_use]
    pub fn timestamp_at(&self, x: f64) -> Option<DateTime<Utc>> {
        self.slot_at(x).and_then(|slot| self.time_domain.get(slot).copied())
    }

    /// Value under the pixel row `y`, clamped to the scale's domain.
    #[must_use]
    pub fn value_at(&self, scale_id: &str, y: f64) -> Option<f64> {
        self.values.get(scale_id).map(|scale| scale.invert(y))
    }
}
