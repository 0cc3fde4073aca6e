use tracing::trace;

use crate::extensions::{ChartEvent, ChartEventKind, ListenerId};
use crate::render::Renderer;

use super::ChartEngine;

impl<R: Renderer> ChartEngine<R> {
    /// Registers a listener called after every `kind` change.
    pub fn on<F>(&mut self, kind: ChartEventKind, listener: F) -> ListenerId
    where
        F: FnMut(&ChartEvent) + 'static,
    {
        self.events.on(kind, listener)
    }

    /// Registers a listener removed after its first delivery.
    pub fn once<F>(&mut self, kind: ChartEventKind, listener: F) -> ListenerId
    where
        F: FnMut(&ChartEvent) + 'static,
    {
        self.events.once(kind, listener)
    }

    pub fn off(&mut self, id: ListenerId) -> bool {
        self.events.off(id)
    }

    /// Removes listeners of `kind`, or every listener for `None`.
    pub fn off_all(&mut self, kind: Option<ChartEventKind>) -> usize {
        self.events.off_all(kind)
    }

    #[must_use]
    pub fn listener_count(&self, kind: ChartEventKind) -> usize {
        self.events.listener_count(kind)
    }

    pub(super) fn emit_zoom_event(&mut self) {
        let window = self.state.window().state();
        self.emit_event(ChartEvent::Zoom {
            zoom_level: window.zoom_level,
            start_index: window.start_index,
            end_index: window.end_index,
        });
    }

    pub(super) fn emit_pan_event(&mut self) {
        let window = self.state.window().state();
        self.emit_event(ChartEvent::Pan {
            pan_offset: window.pan_offset,
            start_index: window.start_index,
            end_index: window.end_index,
        });
    }

    fn emit_event(&mut self, event: ChartEvent) {
        let delivered = self.events.emit(&event);
        trace!(kind = ?event.kind(), delivered, "chart event emitted");
    }
}
