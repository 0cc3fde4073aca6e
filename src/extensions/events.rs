use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChartEventKind {
    Zoom,
    Pan,
}

/// Notification emitted after the visible window changed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ChartEvent {
    Zoom {
        zoom_level: f64,
        start_index: usize,
        end_index: usize,
    },
    Pan {
        pan_offset: usize,
        start_index: usize,
        end_index: usize,
    },
}

impl ChartEvent {
    #[must_use]
    pub fn kind(self) -> ChartEventKind {
        match self {
            Self::Zoom { .. } => ChartEventKind::Zoom,
            Self::Pan { .. } => ChartEventKind::Pan,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ListenerId(u64);

impl ListenerId {
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

pub type ChartListener = Box<dyn FnMut(&ChartEvent)>;

struct ListenerEntry {
    id: ListenerId,
    kind: ChartEventKind,
    once: bool,
    callback: ChartListener,
}

/// Observer registry for zoom and pan notifications.
///
/// Listeners run synchronously, in registration order, on the thread that
/// mutated the chart.
#[derive(Default)]
pub struct EventRegistry {
    listeners: Vec<ListenerEntry>,
    next_id: u64,
}

impl fmt::Debug for EventRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventRegistry")
            .field("listeners", &self.listeners.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}

impl EventRegistry {
    pub fn on<F>(&mut self, kind: ChartEventKind, listener: F) -> ListenerId
    where
        F: FnMut(&ChartEvent) + 'static,
    {
        self.register(kind, false, Box::new(listener))
    }

    /// Registers a listener that is dropped after its first delivery.
    pub fn once<F>(&mut self, kind: ChartEventKind, listener: F) -> ListenerId
    where
        F: FnMut(&ChartEvent) + 'static,
    {
        self.register(kind, true, Box::new(listener))
    }

    /// Removes one listener. Returns `true` when it was registered.
    pub fn off(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|entry| entry.id != id);
        self.listeners.len() != before
    }

    /// Removes every listener of `kind`, or all listeners for `None`.
    pub fn off_all(&mut self, kind: Option<ChartEventKind>) -> usize {
        let before = self.listeners.len();
        match kind {
            Some(kind) => self.listeners.retain(|entry| entry.kind != kind),
            None => self.listeners.clear(),
        }
        before - self.listeners.len()
    }

    /// Delivers `event` to matching listeners. Returns how many ran.
    pub fn emit(&mut self, event: &ChartEvent) -> usize {
        let kind = event.kind();
        let mut delivered = 0;
        self.listeners.retain_mut(|entry| {
            if entry.kind != kind {
                return true;
            }
            (entry.callback)(event);
            delivered += 1;
            !entry.once
        });
        delivered
    }

    #[must_use]
    pub fn listener_count(&self, kind: ChartEventKind) -> usize {
        self.listeners
            .iter()
            .filter(|entry| entry.kind == kind)
            .count()
    }

    fn register(&mut self, kind: ChartEventKind, once: bool, callback: ChartListener) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        self.listeners.push(ListenerEntry {
            id,
            kind,
            once,
            callback,
        });
        id
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::{ChartEvent, ChartEventKind, EventRegistry};

    fn zoom() -> ChartEvent {
        ChartEvent::Zoom {
            zoom_level: 0.5,
            start_index: 0,
            end_index: 3,
        }
    }

    #[test]
    fn once_listener_fires_a_single_time() {
        let hits = Rc::new(RefCell::new(0));
        let mut registry = EventRegistry::default();
        let counter = Rc::clone(&hits);
        registry.once(ChartEventKind::Zoom, move |_| *counter.borrow_mut() += 1);

        assert_eq!(registry.emit(&zoom()), 1);
        assert_eq!(registry.emit(&zoom()), 0);
        assert_eq!(*hits.borrow(), 1);
    }

    #[test]
    fn off_and_off_all_remove_listeners() {
        let mut registry = EventRegistry::default();
        let first = registry.on(ChartEventKind::Zoom, |_| {});
        registry.on(ChartEventKind::Zoom, |_| {});
        registry.on(ChartEventKind::Pan, |_| {});

        assert!(registry.off(first));
        assert!(!registry.off(first));
        assert_eq!(registry.off_all(Some(ChartEventKind::Zoom)), 1);
        assert_eq!(registry.listener_count(ChartEventKind::Pan), 1);
        assert_eq!(registry.off_all(None), 1);
    }

    #[test]
    fn listeners_only_receive_their_kind() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut registry = EventRegistry::default();
        let sink = Rc::clone(&seen);
        registry.on(ChartEventKind::Pan, move |event| sink.borrow_mut().push(*event));

        registry.emit(&zoom());
        let pan = ChartEvent::Pan {
            pan_offset: 2,
            start_index: 1,
            end_index: 4,
        };
        registry.emit(&pan);

        assert_eq!(*seen.borrow(), vec![pan]);
    }
}
