//! Event dispatcher for plugin lifecycle events.
//!
//! Pipeline stages are intercepted through [`Plugin`](crate::plugin::Plugin)
//! hooks. Plugins that have a lifecycle of their own (the load balancer,
//! the buffered add and delete helpers) publish [`Event`]s here, and
//! applications subscribe to them per [`EventKind`].
//!
//! ```
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! use solrium::event::{Event, EventDispatcher, EventKind};
//!
//! let dispatcher = EventDispatcher::new();
//! let failures = Arc::new(AtomicUsize::new(0));
//! let counter = Arc::clone(&failures);
//! dispatcher.subscribe(EventKind::EndpointFailure, move |_event: &Event<'_>| {
//!     counter.fetch_add(1, Ordering::SeqCst);
//! });
//! assert_eq!(dispatcher.listener_count(EventKind::EndpointFailure), 1);
//! ```

use std::fmt;
use std::sync::Arc;

use ahash::AHashMap;
use parking_lot::RwLock;
use tracing::trace;

use crate::document::Document;
use crate::error::SolriumError;
use crate::query::UpdateResult;

/// Kinds of events, used as subscription keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    EndpointFailure,
    BufferedAddAdd,
    BufferedAddPreFlush,
    BufferedAddPostFlush,
    BufferedAddPreCommit,
    BufferedAddPostCommit,
    BufferedDeleteAdd,
    BufferedDeletePreFlush,
    BufferedDeletePostFlush,
    BufferedDeletePreCommit,
    BufferedDeletePostCommit,
}

/// A buffered delete directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteDirective {
    Id(String),
    Query(String),
}

/// An event and its payload.
#[derive(Debug)]
pub enum Event<'a> {
    /// A request against an endpoint failed and the load balancer moves on.
    EndpointFailure {
        endpoint: &'a str,
        error: &'a SolriumError,
    },
    BufferedAddAdd {
        document: &'a Document,
    },
    BufferedAddPreFlush {
        buffer: &'a [Document],
    },
    BufferedAddPostFlush {
        result: &'a UpdateResult,
    },
    BufferedAddPreCommit {
        buffer: &'a [Document],
    },
    BufferedAddPostCommit {
        result: &'a UpdateResult,
    },
    BufferedDeleteAdd {
        directive: &'a DeleteDirective,
    },
    BufferedDeletePreFlush {
        buffer: &'a [DeleteDirective],
    },
    BufferedDeletePostFlush {
        result: &'a UpdateResult,
    },
    BufferedDeletePreCommit {
        buffer: &'a [DeleteDirective],
    },
    BufferedDeletePostCommit {
        result: &'a UpdateResult,
    },
}

impl Event<'_> {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::EndpointFailure { .. } => EventKind::EndpointFailure,
            Event::BufferedAddAdd { .. } => EventKind::BufferedAddAdd,
            Event::BufferedAddPreFlush { .. } => EventKind::BufferedAddPreFlush,
            Event::BufferedAddPostFlush { .. } => EventKind::BufferedAddPostFlush,
            Event::BufferedAddPreCommit { .. } => EventKind::BufferedAddPreCommit,
            Event::BufferedAddPostCommit { .. } => EventKind::BufferedAddPostCommit,
            Event::BufferedDeleteAdd { .. } => EventKind::BufferedDeleteAdd,
            Event::BufferedDeletePreFlush { .. } => EventKind::BufferedDeletePreFlush,
            Event::BufferedDeletePostFlush { .. } => EventKind::BufferedDeletePostFlush,
            Event::BufferedDeletePreCommit { .. } => EventKind::BufferedDeletePreCommit,
            Event::BufferedDeletePostCommit { .. } => EventKind::BufferedDeletePostCommit,
        }
    }
}

/// Event listener.
pub type Listener = Arc<dyn Fn(&Event<'_>) + Send + Sync>;

/// Publishes events to the listeners subscribed to their kind.
#[derive(Default)]
pub struct EventDispatcher {
    listeners: RwLock<AHashMap<EventKind, Vec<Listener>>>,
}

impl fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let listeners = self.listeners.read();
        f.debug_struct("EventDispatcher")
            .field("kinds", &listeners.len())
            .finish()
    }
}

impl EventDispatcher {
    pub fn new() -> Self {
        EventDispatcher::default()
    }

    /// Subscribe a listener; listeners run in subscription order.
    pub fn subscribe<F>(&self, kind: EventKind, listener: F)
    where
        F: Fn(&Event<'_>) + Send + Sync + 'static,
    {
        self.listeners
            .write()
            .entry(kind)
            .or_default()
            .push(Arc::new(listener));
    }

    /// Remove every listener of a kind.
    pub fn clear(&self, kind: EventKind) {
        self.listeners.write().remove(&kind);
    }

    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.listeners.read().get(&kind).map_or(0, Vec::len)
    }

    pub fn has_listeners(&self, kind: EventKind) -> bool {
        self.listener_count(kind) > 0
    }

    /// Publish an event.
    pub fn dispatch(&self, event: &Event<'_>) {
        let kind = event.kind();
        // Listeners may subscribe from inside a callback.
        let listeners: Vec<Listener> = match self.listeners.read().get(&kind) {
            Some(listeners) => listeners.clone(),
            None => return,
        };
        trace!(?kind, listeners = listeners.len(), "Dispatching event");
        for listener in listeners {
            listener(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[test]
    fn test_dispatch_to_matching_kind() {
        let dispatcher = EventDispatcher::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        dispatcher.subscribe(EventKind::EndpointFailure, move |event| {
            if let Event::EndpointFailure { endpoint, .. } = event {
                sink.lock().push(endpoint.to_string());
            }
        });

        let error = SolriumError::transport("connection refused");
        dispatcher.dispatch(&Event::EndpointFailure {
            endpoint: "replica-1",
            error: &error,
        });
        let doc = Document::new();
        dispatcher.dispatch(&Event::BufferedAddAdd { document: &doc });

        assert_eq!(*seen.lock(), vec!["replica-1".to_string()]);
    }

    #[test]
    fn test_clear() {
        let dispatcher = EventDispatcher::new();
        dispatcher.subscribe(EventKind::BufferedAddAdd, |_| {});
        dispatcher.subscribe(EventKind::BufferedAddAdd, |_| {});
        assert_eq!(dispatcher.listener_count(EventKind::BufferedAddAdd), 2);
        dispatcher.clear(EventKind::BufferedAddAdd);
        assert!(!dispatcher.has_listeners(EventKind::BufferedAddAdd));
    }
}
