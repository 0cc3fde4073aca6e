use serde::{Deserialize, Serialize};

use crate::core::{ScaleId, Viewport};

/// Vertical sizing inputs of one stacked sub-chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaneSizing {
    pub scale_id: ScaleId,
    /// Share of the stackable height; `None` splits it evenly.
    pub section_ratio: Option<f64>,
    /// Extra pixels added after the ratio is applied (drag-resize residue).
    pub delta_height: f64,
}

impl PaneSizing {
    #[must_use]
    pub fn even(scale_id: impl Into<ScaleId>) -> Self {
        Self {
            scale_id: scale_id.into(),
            section_ratio: None,
            delta_height: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaneRegion {
    pub scale_id: ScaleId,
    pub top: f64,
    pub height: f64,
}

impl PaneRegion {
    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    #[must_use]
    pub fn contains_y(&self, y: f64) -> bool {
        y >= self.top && y <= self.bottom()
    }
}

/// Pixel geometry of the whole chart.
///
/// Panes stack top to bottom with 1 px separators; the plot area spans
/// `plot_width` from the left edge and the y axes take the rest. The time
/// axis sits in the bottom `x_axis_height` pixels.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PaneLayout {
    pub panes: Vec<PaneRegion>,
    pub plot_width: f64,
    pub width: f64,
    pub height: f64,
    pub x_axis_height: f64,
}

impl PaneLayout {
    /// Sizes each pane as `(height - panes - x_axis_height) * ratio + delta`.
    #[must_use]
    pub fn compute(
        viewport: Viewport,
        plot_section_ratio: f64,
        x_axis_height: f64,
        sizing: &[PaneSizing],
    ) -> Self {
        let width = f64::from(viewport.width);
        let height = f64::from(viewport.height);
        let ratio = if plot_section_ratio.is_finite() {
            plot_section_ratio.clamp(0.0, 1.0)
        } else {
            1.0
        };
        let x_axis_height = if x_axis_height.is_finite() {
            x_axis_height.max(0.0)
        } else {
            0.0
        };

        let count = sizing.len();
        let stackable = (height - count as f64 - x_axis_height).max(0.0);
        let even_share = 1.0 / count.max(1) as f64;

        let mut top = 0.0;
        let panes = sizing
            .iter()
            .map(|pane| {
                let share = pane
                    .section_ratio
                    .filter(|r| r.is_finite() && *r >= 0.0)
                    .unwrap_or(even_share);
                let delta = if pane.delta_height.is_finite() {
                    pane.delta_height
                } else {
                    0.0
                };
                let region = PaneRegion {
                    scale_id: pane.scale_id.clone(),
                    top,
                    height: (stackable * share + delta).max(0.0),
                };
                top = region.bottom() + 1.0;
                region
            })
            .collect();

        Self {
            panes,
            plot_width: width * ratio,
            width,
            height,
            x_axis_height,
        }
    }

    #[must_use]
    pub fn pane(&self, scale_id: &str) -> Option<&PaneRegion> {
        self.panes.iter().find(|pane| pane.scale_id == scale_id)
    }

    /// Index of the pane under `y`, if any.
    #[must_use]
    pub fn pane_at(&self, y: f64) -> Option<usize> {
        self.panes.iter().position(|pane| pane.contains_y(y))
    }

    #[must_use]
    pub fn x_axis_top(&self) -> f64 {
        self.height - self.x_axis_height
    }
}
