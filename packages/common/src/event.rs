//! # Event Channel
//!
//! A push-based notification channel: producers [`emit`](EventSource::emit)
//! values, consumers [`subscribe`](EventSource::subscribe) handlers.
//!
//! ## Design
//!
//! - Dispatch is synchronous, on the caller's thread, in registration order
//! - Handlers may re-entrantly emit, subscribe or unsubscribe
//! - A handler removed while an emission is in flight is not called again
//! - Dropping a [`Subscription`] detaches its handler
//!
//! ## Example
//!
//! ```rust
//! use undograph_common::EventSource;
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let source = EventSource::<u32>::new();
//! let seen = Rc::new(Cell::new(0));
//!
//! let sink = Rc::clone(&seen);
//! let subscription = source.subscribe(move |value| sink.set(*value));
//!
//! source.emit(&7);
//! assert_eq!(seen.get(), 7);
//!
//! subscription.unsubscribe();
//! source.emit(&9);
//! assert_eq!(seen.get(), 7);
//! ```

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use tracing::trace;

type Handler<T> = Rc<dyn Fn(&T)>;

struct Registry<T> {
    next_id: Cell<u64>,
    handlers: RefCell<Vec<(u64, Handler<T>)>>,
}

impl<T> Registry<T> {
    fn is_registered(&self, id: u64) -> bool {
        self.handlers
            .borrow()
            .iter()
            .any(|(handler_id, _)| *handler_id == id)
    }

    fn remove(&self, id: u64) {
        self.handlers
            .borrow_mut()
            .retain(|(handler_id, _)| *handler_id != id);
    }
}

/// Shared handle to a notification channel
///
/// Cloning the handle yields another producer for the same set of handlers.
pub struct EventSource<T> {
    registry: Rc<Registry<T>>,
}

impl<T: 'static> EventSource<T> {
    /// Create a channel with no subscribers
    pub fn new() -> Self {
        Self {
            registry: Rc::new(Registry {
                next_id: Cell::new(0),
                handlers: RefCell::new(Vec::new()),
            }),
        }
    }

    /// Register a handler, returning the handle that detaches it
    pub fn subscribe(&self, handler: impl Fn(&T) + 'static) -> Subscription {
        let id = self.registry.next_id.get();
        self.registry.next_id.set(id + 1);
        self.registry
            .handlers
            .borrow_mut()
            .push((id, Rc::new(handler)));

        let registry: Weak<Registry<T>> = Rc::downgrade(&self.registry);
        Subscription::new(move || {
            if let Some(registry) = registry.upgrade() {
                trace!(handler = id, "handler detached");
                registry.remove(id);
            }
        })
    }

    /// Deliver `event` to every handler registered at the time of the call
    pub fn emit(&self, event: &T) {
        // Snapshot so handlers can touch the registry while we dispatch
        let handlers: Vec<(u64, Handler<T>)> = self
            .registry
            .handlers
            .borrow()
            .iter()
            .map(|(id, handler)| (*id, Rc::clone(handler)))
            .collect();

        for (id, handler) in handlers {
            if self.registry.is_registered(id) {
                handler(event);
            }
        }
    }

    /// Number of attached handlers
    pub fn subscriber_count(&self) -> usize {
        self.registry.handlers.borrow().len()
    }
}

impl<T: 'static> Default for EventSource<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for EventSource<T> {
    fn clone(&self) -> Self {
        Self {
            registry: Rc::clone(&self.registry),
        }
    }
}

impl<T> fmt::Debug for EventSource<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventSource")
            .field("subscribers", &self.registry.handlers.borrow().len())
            .finish()
    }
}

/// Cancellation handle for a registered handler
///
/// Cancelling twice, or after the channel itself is gone, does nothing.
#[must_use = "dropping a Subscription detaches its handler"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Wrap an arbitrary cancellation action
    pub fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Detach the handler now
    pub fn unsubscribe(mut self) {
        self.cancel_now();
    }

    /// `false` once the handler has been detached
    pub fn is_active(&self) -> bool {
        self.cancel.is_some()
    }

    fn cancel_now(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel_now();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}
