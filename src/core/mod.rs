pub mod band_scale;
pub mod data_matrix;
pub mod domain;
pub mod mapper;
pub mod normalizer;
pub mod pane;
pub mod plot;
pub mod primitives;
pub mod record;
pub mod scale;
pub mod types;
pub mod window;

pub use band_scale::BandScale;
pub use data_matrix::{Cell, DataMatrix, DataRow};
pub use domain::{MIN_ABSOLUTE_PADDING, ScaleDomain, ValueDomain, WindowDomains, compute_domains};
pub use mapper::CoordinateMapper;
pub use normalizer::{PAIRED_PALETTE, SkipCounts, normalize};
pub use pane::{PaneLayout, PaneRegion, PaneSizing};
pub use plot::{
    BaselineExtractor, BaselineSpec, CandleValue, ChartConfig, ColorExtractor, ColorSpec,
    PlotConfig, PlotKind, PlotValue, RejectedPlot, TimestampExtractor, ValueExtractor,
};
pub use primitives::{datetime_to_millis, millis_to_datetime, parse_iso_timestamp};
pub use record::{GraphData, OhlcvRecord, RawRecord, ValueRecord};
pub use scale::{LinearScale, nice_ticks};
pub use types::{DataSourceId, PlotId, ScaleId, TimestampMs, Viewport};
pub use window::{
    DEFAULT_MIN_ZOOM_LEVEL, DEFAULT_MIN_ZOOM_ROWS, WindowController, WindowState,
    ZoomInterpolator,
};
