//! # Change Queue Contract
//!
//! A change queue stores reversible changes and a current position among
//! them. Changes behind the position along the active path are undoable;
//! the change directly ahead of it on the active branch is redoable.
//!
//! The queue never inverts or applies anything itself. The coordinator asks
//! it for the neighbouring change, applies the (inverted) change to the
//! document, then tells the queue to move with
//! [`update_graph_with_undo`](ChangeQueue::update_graph_with_undo) /
//! [`update_graph_with_redo`](ChangeQueue::update_graph_with_redo).

use crate::errors::HistoryResult;
use undograph_common::ObservableBool;

/// Opaque handle to one position in a queue
///
/// Only the queue that produced it can tell whether it is still valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QueuePosition {
    pub(crate) slot: usize,
    pub(crate) generation: u64,
}

impl QueuePosition {
    pub(crate) fn new(slot: usize, generation: u64) -> Self {
        Self { slot, generation }
    }
}

/// Derived boolean state of a queue
///
/// Queues keep these values current after every mutation but never publish
/// them; whoever drives the queue calls [`publish`](Self::publish) once no
/// borrow of the queue is held.
#[derive(Debug, Clone)]
pub struct QueueSignals {
    pub undo_available: ObservableBool,
    pub redo_available: ObservableBool,
    pub at_marked_position: ObservableBool,
    pub performing_action: ObservableBool,
}

impl QueueSignals {
    /// Signals of an empty queue sitting on its (marked) initial position
    pub fn new() -> Self {
        Self {
            undo_available: ObservableBool::new(false),
            redo_available: ObservableBool::new(false),
            at_marked_position: ObservableBool::new(true),
            performing_action: ObservableBool::new(false),
        }
    }

    pub(crate) fn refresh(&self, undo_available: bool, redo_available: bool, at_mark: bool) {
        self.undo_available.set(undo_available);
        self.redo_available.set(redo_available);
        self.at_marked_position.set(at_mark);
    }

    /// Notify subscribers of every signal that changed since the last call
    pub fn publish(&self) {
        self.undo_available.publish();
        self.redo_available.publish();
        self.at_marked_position.publish();
        self.performing_action.publish();
    }
}

impl Default for QueueSignals {
    fn default() -> Self {
        Self::new()
    }
}

/// Storage backend for undo history
pub trait ChangeQueue<C> {
    /// Is there a change behind the current position?
    fn has_prev(&self) -> bool;

    /// Is there a change ahead of the current position on the active branch?
    fn has_next(&self) -> bool;

    /// The change directly behind the current position
    fn prev(&self) -> HistoryResult<&C>;

    /// The change directly ahead of the current position
    fn next(&self) -> HistoryResult<&C>;

    /// Append `change` after the current position and move onto it
    ///
    /// If changes lie ahead of the current position, they stop being the
    /// redo path.
    fn push(&mut self, change: C) -> HistoryResult<()>;

    /// Append `change` after the node holding `merge_base`
    ///
    /// Used when merging was attempted and declined; `merge_base` is the
    /// unchanged change behind the current position.
    fn push_after(&mut self, merge_base: &C, change: C) -> HistoryResult<()> {
        let _ = merge_base;
        self.push(change)
    }

    /// Replace the change behind the current position with `combined`
    ///
    /// The undo depth does not grow. With nothing behind the current
    /// position this is a plain [`push`](Self::push).
    fn push_merged(&mut self, combined: C) -> HistoryResult<()>;

    /// Step one change backward; `inverted` is the change that was applied
    fn update_graph_with_undo(&mut self, inverted: &C) -> HistoryResult<()>;

    /// Step one change forward; `change` must equal [`next`](Self::next)
    fn update_graph_with_redo(&mut self, change: &C) -> HistoryResult<()>;

    /// Number of undoable steps
    fn undo_depth(&self) -> usize;

    /// Number of redoable steps along the active branch
    fn redo_depth(&self) -> usize;

    /// Number of futures branching off the current position
    fn branch_count(&self) -> usize {
        usize::from(self.has_next())
    }

    /// Make future `index` the one redo follows
    fn select_branch(&mut self, index: usize) -> bool {
        index == 0 && self.has_next()
    }

    fn current_position(&self) -> QueuePosition;

    /// `true` while the position is still reachable in this queue
    fn is_valid(&self, position: &QueuePosition) -> bool;

    /// Remember `position` as the saved state; invalid positions are ignored
    fn mark(&mut self, position: &QueuePosition);

    fn is_at_marked_position(&self) -> bool;

    /// Drop history behind the current position, which becomes the start
    fn forget_history(&mut self);

    fn signals(&self) -> &QueueSignals;

    /// Release all stored changes; further mutations fail with `Closed`
    fn close(&mut self);

    fn is_closed(&self) -> bool;

    fn is_undo_available(&self) -> bool {
        self.has_prev()
    }

    fn is_redo_available(&self) -> bool {
        self.has_next()
    }

    fn is_performing_action(&self) -> bool {
        self.signals().performing_action.get()
    }
}
