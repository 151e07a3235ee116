//! # Observable Booleans
//!
//! Plain boolean state with change notification.
//!
//! Updating and notifying are two separate steps: [`ObservableBool::set`]
//! only stores the value, [`ObservableBool::publish`] tells subscribers about
//! it. Owners that mutate under a `RefCell` borrow set values while borrowed
//! and publish after the borrow is released, so a subscriber that calls back
//! into the owner never hits a borrow conflict.

use crate::event::{EventSource, Subscription};
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

struct BoolCell {
    value: Cell<bool>,
    published: Cell<bool>,
    changes: EventSource<bool>,
}

/// Shared boolean with transition notification
#[derive(Clone)]
pub struct ObservableBool {
    cell: Rc<BoolCell>,
}

impl ObservableBool {
    pub fn new(initial: bool) -> Self {
        Self {
            cell: Rc::new(BoolCell {
                value: Cell::new(initial),
                published: Cell::new(initial),
                changes: EventSource::new(),
            }),
        }
    }

    /// Current value (including changes not yet published)
    pub fn get(&self) -> bool {
        self.cell.value.get()
    }

    /// Store a new value without notifying anyone
    pub fn set(&self, value: bool) {
        self.cell.value.set(value);
    }

    /// Notify subscribers if the value moved since the last publish
    ///
    /// Returns `true` if a notification went out.
    pub fn publish(&self) -> bool {
        let value = self.cell.value.get();
        if value == self.cell.published.get() {
            return false;
        }
        self.cell.published.set(value);
        self.cell.changes.emit(&value);
        true
    }

    /// `set` followed by `publish`
    pub fn update(&self, value: bool) -> bool {
        self.set(value);
        self.publish()
    }

    /// Get called with the new value on every published transition
    pub fn subscribe(&self, handler: impl Fn(bool) + 'static) -> Subscription {
        self.cell.changes.subscribe(move |value| handler(*value))
    }

    /// Hold the flag `true` until the returned guard is dropped
    pub fn raise(&self) -> FlagGuard {
        self.update(true);
        FlagGuard { flag: self.clone() }
    }

    /// A handle that can watch this value but not change it
    pub fn read_only(&self) -> ReadOnlyBool {
        ReadOnlyBool { cell: self.clone() }
    }
}

impl Default for ObservableBool {
    fn default() -> Self {
        Self::new(false)
    }
}

impl fmt::Debug for ObservableBool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservableBool")
            .field("value", &self.get())
            .field("published", &self.cell.published.get())
            .finish()
    }
}

/// Observe-only view of an [`ObservableBool`]
///
/// Sees the owner's value, published or not; only the owner can change it.
///
/// ```compile_fail
/// use undograph_common::ObservableBool;
///
/// let view = ObservableBool::new(false).read_only();
/// view.update(true);
/// ```
#[derive(Clone)]
pub struct ReadOnlyBool {
    cell: ObservableBool,
}

impl ReadOnlyBool {
    pub fn get(&self) -> bool {
        self.cell.get()
    }

    /// Get called with the new value on every published transition
    pub fn subscribe(&self, handler: impl Fn(bool) + 'static) -> Subscription {
        self.cell.subscribe(handler)
    }
}

impl fmt::Debug for ReadOnlyBool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ReadOnlyBool").field(&self.get()).finish()
    }
}

/// Scope guard returned by [`ObservableBool::raise`]
///
/// Resets the flag to `false` and publishes on every exit path, unwinding
/// included.
#[must_use = "the flag drops back to false as soon as the guard is dropped"]
pub struct FlagGuard {
    flag: ObservableBool,
}

impl Drop for FlagGuard {
    fn drop(&mut self) {
        self.flag.update(false);
    }
}

impl fmt::Debug for FlagGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlagGuard").field("flag", &self.flag).finish()
    }
}
