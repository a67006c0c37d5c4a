//! Fan-out dispatch of platform events.
//!
//! A handler subscribes to one [`EventKind`] or to a whole [`EventFamily`].
//! Families are expanded into their member kinds when the handler is
//! registered, so dispatching an event is a single map lookup that returns
//! every subscriber, whether it asked for the concrete kind or a family
//! containing it.

use std::collections::HashMap;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use futures::future::join_all;
use tracing::{Instrument, Level, debug, error, info, span};

use cobalt_core::{BoxedClient, EventKind, EventTag, PlatformEvent};

use crate::context::EventContext;
use crate::executor::panic_message;
use crate::handler::{BoxedHandler, Handler, into_handler};

pub type EventHandler = BoxedHandler<(EventContext,)>;

/// Subscriptions keyed by concrete event kind.
#[derive(Clone, Default)]
pub struct EventDispatcher {
    subscribers: HashMap<EventKind, Vec<EventHandler>>,
    subscriptions: usize,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes `handler` to `tag`.
    ///
    /// ```rust,ignore
    /// events.on(EventKind::MessageDelete, audit_delete);
    /// events.on(EventFamily::Message, count_message_traffic);
    /// ```
    pub fn on<F>(&mut self, tag: impl Into<EventTag>, handler: F) -> &mut Self
    where
        F: Handler<(EventContext,)>,
    {
        let tag = tag.into();
        let handler: EventHandler = into_handler(handler);
        for kind in tag.kinds() {
            self.subscribers
                .entry(kind)
                .or_default()
                .push(handler.clone());
        }
        self.subscriptions += 1;
        info!(?tag, "Registered event handler");
        self
    }

    /// Number of handlers that would run for `kind`.
    pub fn subscribers(&self, kind: EventKind) -> usize {
        self.subscribers.get(&kind).map_or(0, Vec::len)
    }

    /// Number of `on` calls.
    pub fn len(&self) -> usize {
        self.subscriptions
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions == 0
    }

    /// Runs every handler subscribed to the event's kind and returns how
    /// many ran.
    ///
    /// Handlers run concurrently. A handler that panics is logged and does
    /// not affect the others.
    pub async fn dispatch(&self, event: PlatformEvent, client: BoxedClient) -> usize {
        let kind = event.kind;
        let Some(handlers) = self.subscribers.get(&kind) else {
            debug!(event = %kind, "No event subscribers");
            return 0;
        };

        let span = span!(Level::DEBUG, "event", event = %kind, handlers = handlers.len());
        let runs = handlers.iter().enumerate().map(|(index, handler)| {
            let ctx = EventContext::new(event.clone(), client.clone());
            let run = AssertUnwindSafe(handler.call((ctx,))).catch_unwind();
            async move {
                if let Err(panic) = run.await {
                    error!(
                        event = %kind,
                        handler = index,
                        "Event handler panicked: {}",
                        panic_message(&*panic)
                    );
                }
            }
        });

        join_all(runs).instrument(span).await.len()
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("subscriptions", &self.subscriptions)
            .field("kinds", &self.subscribers.len())
            .finish()
    }
}
