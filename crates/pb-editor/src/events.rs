//! Preview event bus.
//!
//! The store publishes one [`SchemaEvent`] per applied mutation. Anything
//! that mirrors the schema (the canvas preview iframe, the render-link
//! panel, tests) subscribes a [`PreviewObserver`] instead of reaching for a
//! global refresh hook.

use pb_core::NodeId;
use smallvec::SmallVec;

/// Node ids touched by one mutation. Almost always one or two.
pub type Touched = SmallVec<[NodeId; 2]>;

/// What happened to the schema.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaEvent {
    /// A mutation was applied and the revision moved.
    Changed {
        revision: u64,
        /// Nodes or edges were added or removed, so the child index and
        /// roots are stale.
        structural: bool,
        touched: Touched,
    },
    /// Someone asked every preview to re-render without a schema change.
    RefreshRequested { revision: u64 },
}

impl SchemaEvent {
    pub fn revision(&self) -> u64 {
        match self {
            SchemaEvent::Changed { revision, .. } | SchemaEvent::RefreshRequested { revision } => {
                *revision
            }
        }
    }
}

/// Receives schema events. Implemented for any `FnMut(&SchemaEvent)`.
pub trait PreviewObserver {
    fn on_event(&mut self, event: &SchemaEvent);
}

impl<F: FnMut(&SchemaEvent)> PreviewObserver for F {
    fn on_event(&mut self, event: &SchemaEvent) {
        self(event)
    }
}

/// Handle returned by [`PreviewBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Fan-out of schema events to subscribed observers, in subscription order.
#[derive(Default)]
pub struct PreviewBus {
    observers: Vec<(SubscriptionId, Box<dyn PreviewObserver>)>,
    next: u64,
}

impl PreviewBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, observer: Box<dyn PreviewObserver>) -> SubscriptionId {
        let id = SubscriptionId(self.next);
        self.next += 1;
        self.observers.push((id, observer));
        id
    }

    /// Returns `false` if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sub, _)| *sub != id);
        self.observers.len() != before
    }

    pub fn publish(&mut self, event: &SchemaEvent) {
        log::trace!("publish {event:?} to {} observer(s)", self.observers.len());
        for (_, observer) in &mut self.observers {
            observer.on_event(event);
        }
    }

    /// Ask every observer to re-render at `revision`.
    pub fn request_refresh(&mut self, revision: u64) {
        self.publish(&SchemaEvent::RefreshRequested { revision });
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl std::fmt::Debug for PreviewBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreviewBus")
            .field("observers", &self.observers.len())
            .finish()
    }
}
