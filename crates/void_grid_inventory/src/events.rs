//! Container and drop events

use crate::grid::GridPos;
use crate::item::Item;
use crate::slot::SlotRef;
use serde::{Deserialize, Serialize};

/// Container mutation events, drained with `Container::drain_events`
#[derive(Debug, Clone, PartialEq)]
pub enum ContainerEvent {
    /// Item placed with its anchor at `position`
    ItemAdded { position: GridPos, item: Item },
    /// Item removed from the anchor at `position`
    ItemRemoved { position: GridPos, item: Item },
}

impl ContainerEvent {
    /// Item carried by the event
    pub fn item(&self) -> &Item {
        match self {
            Self::ItemAdded { item, .. } | Self::ItemRemoved { item, .. } => item,
        }
    }

    /// Anchor position
    pub fn position(&self) -> GridPos {
        match self {
            Self::ItemAdded { position, .. } | Self::ItemRemoved { position, .. } => *position,
        }
    }
}

/// Terminal outcome of a drop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DropSignal {
    /// Item placed, merged or swapped
    Valid,
    /// Placement failed, pre-drag state restored
    Failed,
    /// Item discarded outside any slot
    Void,
    /// Dropped back onto the source, nothing changed
    SelfDrop,
}

/// A resolved drop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropEvent {
    pub signal: DropSignal,
    /// Slot the drop resolved on: the target, or the source when there is none
    pub slot: SlotRef,
    /// Where the drag started
    pub source: SlotRef,
}

/// Which drops a listener receives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DropFilter {
    /// A single outcome
    Only(DropSignal),
    /// Every outcome
    Any,
}

impl DropFilter {
    fn matches(&self, signal: DropSignal) -> bool {
        match self {
            Self::Only(expected) => *expected == signal,
            Self::Any => true,
        }
    }
}

/// Drop event handler
pub type DropHandler = Box<dyn Fn(&DropEvent) + Send + Sync>;

/// Listener ID
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Drop listener registry
pub struct DropListeners {
    handlers: Vec<(ListenerId, DropFilter, DropHandler)>,
    next_id: u64,
}

impl DropListeners {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
            next_id: 1,
        }
    }

    /// Subscribe to drops matching `filter`
    pub fn subscribe<F>(&mut self, filter: DropFilter, handler: F) -> ListenerId
    where
        F: Fn(&DropEvent) + Send + Sync + 'static,
    {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.handlers.push((id, filter, Box::new(handler)));
        id
    }

    /// Subscribe to every outcome
    pub fn on_any_drop<F>(&mut self, handler: F) -> ListenerId
    where
        F: Fn(&DropEvent) + Send + Sync + 'static,
    {
        self.subscribe(DropFilter::Any, handler)
    }

    /// Unsubscribe
    pub fn unsubscribe(&mut self, id: ListenerId) {
        self.handlers.retain(|(listener, _, _)| *listener != id);
    }

    /// Deliver an event to every matching listener, in subscription order
    pub fn emit(&self, event: &DropEvent) {
        for (_, filter, handler) in &self.handlers {
            if filter.matches(event.signal) {
                handler(event);
            }
        }
    }

    /// Number of listeners
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl Default for DropListeners {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DropListeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DropListeners")
            .field("listeners", &self.handlers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slot::StandaloneId;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn event(signal: DropSignal) -> DropEvent {
        let slot = SlotRef::Standalone(StandaloneId(1));
        DropEvent {
            signal,
            slot,
            source: slot,
        }
    }

    #[test]
    fn test_filtered_and_any_listeners() {
        let mut listeners = DropListeners::new();
        let valid = Arc::new(AtomicUsize::new(0));
        let any = Arc::new(AtomicUsize::new(0));

        let counter = valid.clone();
        listeners.subscribe(DropFilter::Only(DropSignal::Valid), move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let counter = any.clone();
        listeners.on_any_drop(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        listeners.emit(&event(DropSignal::Valid));
        listeners.emit(&event(DropSignal::Void));
        listeners.emit(&event(DropSignal::SelfDrop));

        assert_eq!(valid.load(Ordering::SeqCst), 1);
        assert_eq!(any.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_unsubscribe() {
        let mut listeners = DropListeners::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let id = listeners.on_any_drop(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        listeners.unsubscribe(id);
        listeners.emit(&event(DropSignal::Failed));
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert!(listeners.is_empty());
    }
}
