mod annotation_controller;
mod axis_render_frame_builder;
mod chart_state;
mod crosshair_render_frame_builder;
mod data_controller;
mod engine;
mod engine_accessors;
mod engine_config;
mod engine_init;
mod event_dispatch;
mod interaction_controller;
mod label_format;
mod legend_render_frame_builder;
mod render_frame_builder;
mod series_projection;
mod settings;
mod settings_controller;

pub use chart_state::ChartState;
pub use engine::ChartEngine;
pub use engine_config::ChartEngineConfig;
pub use settings::{
    ChartSettings, GridLineColors, GridLinesColorPatch, GridLinesType, LegendPosition,
    MAX_Y_SCALE_TICK_COUNT, ScaleSettings, SettingsPatch, SubGraphPatch, Theme, TitlePlacement,
    X_AXIS_HEIGHT_PX,
};
