//! Overlays and notifications layered on top of the core engine.

pub mod annotations;
pub mod events;

pub use annotations::{
    AnnotationContext, AnnotationKind, AnnotationMark, AnnotationStyle, FlagDirection,
    project_annotations,
};
pub use events::{ChartEvent, ChartEventKind, ChartListener, EventRegistry, ListenerId};
