//! trading-charts: embeddable multi-pane financial charting engine.
//!
//! Raw series are normalized into a time-aligned data matrix, a zoom/pan
//! window selects the visible rows, and per-pane domains and scales map them
//! to pixels. Drawing is delegated to a [`render::Renderer`] that receives
//! backend-agnostic primitives.

pub mod api;
pub mod core;
pub mod error;
pub mod extensions;
pub mod interaction;
pub mod render;
pub mod telemetry;

pub use api::{ChartEngine, ChartEngineConfig, ChartSettings, SettingsPatch, Theme};
pub use error::{ChartError, ChartResult};
