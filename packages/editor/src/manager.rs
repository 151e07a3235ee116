//! # Undo Coordinator
//!
//! Decides what an observed change means and keeps the change queue in step
//! with the document.
//!
//! ## Design
//!
//! - Every change the document reports arrives through an [`EventSource`]
//! - Undo/redo compute the change to apply, record it as *expected*, then
//!   call the external apply function; the echo that apply produces on the
//!   change source is matched against the expectation and swallowed
//! - Any other observed change is a new edit: it is merged into the
//!   previous history entry when allowed and possible, pushed otherwise
//! - An echo that differs from the expectation poisons the manager; the
//!   invert or apply function is broken and history can no longer be
//!   trusted
//!
//! ## Re-entrancy
//!
//! Apply calls back into the manager synchronously. No `RefCell` borrow is
//! held while apply runs or while signals are published, so both the
//! change-source callback and signal subscribers may use the manager.
//! Invert and merge are likewise called with no borrow held.

use crate::errors::{UndoError, UndoResult};
use crate::undo_manager::{UndoManager, UndoPosition};
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use tracing::{debug, error, trace, warn};
use undograph_common::{EventSource, Subscription};
use undograph_history::{
    ChangeQueue, GraphChangeQueue, HistoryResult, QueuePosition, QueueSignals, ReadOnlyBool,
};

type InvertFn<C> = Box<dyn Fn(&C) -> C>;
type ApplyFn<C> = Box<dyn Fn(&C)>;
type MergeFn<C> = Box<dyn Fn(&C, &C) -> Option<C>>;

/// Reconciliation state shared with the change-source callback
struct Reconciler<C> {
    can_merge: bool,
    /// Change the in-flight undo/redo is about to cause
    expected: Option<C>,
    /// First protocol violation; sticky
    fault: Option<UndoError<C>>,
    closed: bool,
}

struct Inner<C, Q> {
    queue: RefCell<Q>,
    state: RefCell<Reconciler<C>>,
    signals: QueueSignals,
    invert: InvertFn<C>,
    apply: ApplyFn<C>,
    merge: MergeFn<C>,
}

impl<C, Q> Inner<C, Q>
where
    C: Clone + PartialEq + fmt::Debug + 'static,
    Q: ChangeQueue<C>,
{
    fn ensure_usable(&self) -> UndoResult<(), C> {
        let state = self.state.borrow();
        if state.closed {
            return Err(UndoError::Closed);
        }
        match &state.fault {
            Some(fault) => Err(fault.clone()),
            None => Ok(()),
        }
    }

    fn fault(&self) -> Option<UndoError<C>> {
        self.state.borrow().fault.clone()
    }

    fn change_observed(&self, change: &C) {
        if let Err(err) = self.reconcile(change) {
            error!(error = %err, "change reconciliation failed");
            self.state.borrow_mut().fault.get_or_insert(err);
        }
        self.signals.publish();
    }

    fn reconcile(&self, change: &C) -> UndoResult<(), C> {
        let expected = {
            let mut state = self.state.borrow_mut();
            if state.closed {
                trace!("ignoring change observed after close");
                return Ok(());
            }
            if state.fault.is_some() {
                warn!(?change, "ignoring change observed by a faulted undo manager");
                return Ok(());
            }
            state.expected.take()
        };

        match expected {
            None => self.add_change(change.clone()),
            Some(expected) if expected == *change => {
                trace!("self-caused change confirmed");
                Ok(())
            }
            Some(expected) => Err(UndoError::UnexpectedChange {
                expected,
                received: change.clone(),
            }),
        }
    }

    fn add_change(&self, change: C) -> UndoResult<(), C> {
        let can_merge = self.state.borrow().can_merge;
        let prev = {
            let queue = self.queue.borrow();
            if can_merge && queue.has_prev() {
                Some(queue.prev()?.clone())
            } else {
                None
            }
        };

        // merge runs with no borrow held
        match prev {
            Some(prev) => match (self.merge)(&prev, &change) {
                Some(merged) => {
                    trace!(?merged, "change merged into previous step");
                    self.queue.borrow_mut().push_merged(merged)?;
                }
                None => self.queue.borrow_mut().push_after(&prev, change)?,
            },
            None => self.queue.borrow_mut().push(change)?,
        }
        self.state.borrow_mut().can_merge = true;
        Ok(())
    }

    fn undo(&self) -> UndoResult<bool, C> {
        self.ensure_usable()?;
        let prev = {
            let queue = self.queue.borrow();
            if !queue.is_undo_available() {
                return Ok(false);
            }
            queue.prev()?.clone()
        };
        let inverted = (self.invert)(&prev);
        self.state.borrow_mut().can_merge = false;

        debug!(change = ?inverted, "undo");
        self.perform_change(inverted, |queue, change| queue.update_graph_with_undo(change))?;
        Ok(true)
    }

    fn redo(&self) -> UndoResult<bool, C> {
        self.ensure_usable()?;
        let change = {
            let queue = self.queue.borrow();
            if !queue.is_redo_available() {
                return Ok(false);
            }
            queue.next()?.clone()
        };
        self.state.borrow_mut().can_merge = false;

        debug!(?change, "redo");
        self.perform_change(change, |queue, change| queue.update_graph_with_redo(change))?;
        Ok(true)
    }

    /// Apply `change` as a self-caused edit, then move the queue with `update`
    fn perform_change(
        &self,
        change: C,
        update: impl FnOnce(&mut Q, &C) -> HistoryResult<()>,
    ) -> UndoResult<(), C> {
        self.state.borrow_mut().expected = Some(change.clone());
        {
            let _performing = self.signals.performing_action.raise();
            (self.apply)(&change);
            if let Some(fault) = self.fault() {
                return Err(fault);
            }
            update(&mut self.queue.borrow_mut(), &change)?;
        }
        self.signals.publish();
        Ok(())
    }

    fn prevent_merge(&self) {
        self.state.borrow_mut().can_merge = false;
    }

    fn mark(&self, position: &QueuePosition) {
        self.state.borrow_mut().can_merge = false;
        self.queue.borrow_mut().mark(position);
        self.signals.publish();
    }

    fn forget_history(&self) {
        if self.state.borrow().closed {
            warn!("forget_history called on a closed undo manager");
            return;
        }
        self.queue.borrow_mut().forget_history();
        self.signals.publish();
    }

    fn select_branch(&self, index: usize) -> bool {
        let selected = self.queue.borrow_mut().select_branch(index);
        self.signals.publish();
        selected
    }
}

/// Undo manager over a (by default branching) change queue
///
/// # Example
///
/// ```rust
/// use std::cell::RefCell;
/// use std::rc::Rc;
/// use undograph_common::EventSource;
/// use undograph_editor::{GraphUndoManager, UndoManager};
/// use undograph_history::GraphChangeQueue;
///
/// // A counter whose edits are signed deltas
/// let value = Rc::new(RefCell::new(0));
/// let changes = EventSource::<i32>::new();
///
/// let (doc, source) = (Rc::clone(&value), changes.clone());
/// let manager = GraphUndoManager::new(
///     GraphChangeQueue::new(),
///     &changes,
///     |delta: &i32| -delta,
///     move |delta: &i32| {
///         *doc.borrow_mut() += delta;
///         source.emit(delta);
///     },
///     |_: &i32, _: &i32| None,
/// );
///
/// *value.borrow_mut() += 5;
/// changes.emit(&5);
///
/// assert!(manager.undo().unwrap());
/// assert_eq!(*value.borrow(), 0);
/// assert!(manager.redo().unwrap());
/// assert_eq!(*value.borrow(), 5);
/// ```
pub struct GraphUndoManager<C, Q = GraphChangeQueue<C>> {
    inner: Rc<Inner<C, Q>>,
    subscription: RefCell<Option<Subscription>>,
}

impl<C, Q> GraphUndoManager<C, Q>
where
    C: Clone + PartialEq + fmt::Debug + 'static,
    Q: ChangeQueue<C> + 'static,
{
    /// Create a manager over `queue`, observing `changes`
    ///
    /// - `invert` computes the reverse of a change (used by undo)
    /// - `apply` performs a change on the document and is expected to
    ///   report it on `changes` before returning
    /// - `merge` combines two adjacent changes, `None` meaning "keep apart"
    ///
    /// None of the three is called while manager state is borrowed, so each
    /// may query the manager. Only `apply` is expected to cause changes.
    pub fn new(
        queue: Q,
        changes: &EventSource<C>,
        invert: impl Fn(&C) -> C + 'static,
        apply: impl Fn(&C) + 'static,
        merge: impl Fn(&C, &C) -> Option<C> + 'static,
    ) -> Self {
        let signals = queue.signals().clone();
        let inner = Rc::new(Inner {
            queue: RefCell::new(queue),
            state: RefCell::new(Reconciler {
                can_merge: false,
                expected: None,
                fault: None,
                closed: false,
            }),
            signals,
            invert: Box::new(invert),
            apply: Box::new(apply),
            merge: Box::new(merge),
        });

        let weak: Weak<Inner<C, Q>> = Rc::downgrade(&inner);
        let subscription = changes.subscribe(move |change: &C| {
            if let Some(inner) = weak.upgrade() {
                inner.change_observed(change);
            }
        });

        Self {
            inner,
            subscription: RefCell::new(Some(subscription)),
        }
    }

    /// The protocol violation that poisoned this manager, if any
    pub fn fault(&self) -> Option<UndoError<C>> {
        self.inner.fault()
    }

    pub fn is_closed(&self) -> bool {
        self.inner.state.borrow().closed
    }

    /// Number of undoable steps
    pub fn undo_depth(&self) -> usize {
        self.inner.queue.borrow().undo_depth()
    }

    /// Number of redoable steps along the branch redo follows
    pub fn redo_depth(&self) -> usize {
        self.inner.queue.borrow().redo_depth()
    }

    /// Number of alternate futures at the current position
    pub fn redo_branch_count(&self) -> usize {
        self.inner.queue.borrow().branch_count()
    }

    /// Choose which future the next redo follows
    pub fn select_redo_branch(&self, index: usize) -> bool {
        self.inner.select_branch(index)
    }

    /// Read-only access to the underlying queue
    pub fn with_queue<R>(&self, f: impl FnOnce(&Q) -> R) -> R {
        f(&self.inner.queue.borrow())
    }
}

impl<C, Q> UndoManager for GraphUndoManager<C, Q>
where
    C: Clone + PartialEq + fmt::Debug + 'static,
    Q: ChangeQueue<C> + 'static,
{
    type Change = C;
    type Position = HistoryPosition<C, Q>;

    fn undo(&self) -> UndoResult<bool, C> {
        self.inner.undo()
    }

    fn redo(&self) -> UndoResult<bool, C> {
        self.inner.redo()
    }

    fn prevent_merge(&self) {
        self.inner.prevent_merge();
    }

    fn forget_history(&self) {
        self.inner.forget_history();
    }

    fn close(&self) {
        {
            let mut state = self.inner.state.borrow_mut();
            if state.closed {
                return;
            }
            state.closed = true;
            state.expected = None;
        }
        if let Some(subscription) = self.subscription.borrow_mut().take() {
            subscription.unsubscribe();
        }
        self.inner.queue.borrow_mut().close();
        self.inner.signals.publish();
        debug!("undo manager closed");
    }

    fn current_position(&self) -> HistoryPosition<C, Q> {
        HistoryPosition {
            manager: Rc::downgrade(&self.inner),
            position: self.inner.queue.borrow().current_position(),
        }
    }

    fn undo_available(&self) -> ReadOnlyBool {
        self.inner.signals.undo_available.read_only()
    }

    fn redo_available(&self) -> ReadOnlyBool {
        self.inner.signals.redo_available.read_only()
    }

    fn performing_action(&self) -> ReadOnlyBool {
        self.inner.signals.performing_action.read_only()
    }

    fn at_marked_position(&self) -> ReadOnlyBool {
        self.inner.signals.at_marked_position.read_only()
    }

    fn is_undo_available(&self) -> bool {
        self.inner.queue.borrow().is_undo_available()
    }

    fn is_redo_available(&self) -> bool {
        self.inner.queue.borrow().is_redo_available()
    }

    fn is_at_marked_position(&self) -> bool {
        self.inner.queue.borrow().is_at_marked_position()
    }
}

impl<C, Q> fmt::Debug for GraphUndoManager<C, Q>
where
    C: fmt::Debug,
    Q: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("GraphUndoManager")
            .field("queue", &self.inner.queue)
            .field("can_merge", &state.can_merge)
            .field("expected", &state.expected)
            .field("faulted", &state.fault.is_some())
            .field("closed", &state.closed)
            .finish()
    }
}

/// Position handed out by [`GraphUndoManager::current_position`]
///
/// Holds the manager weakly; once the manager is gone the position is
/// invalid and marking it does nothing.
pub struct HistoryPosition<C, Q> {
    manager: Weak<Inner<C, Q>>,
    position: QueuePosition,
}

impl<C, Q> UndoPosition for HistoryPosition<C, Q>
where
    C: Clone + PartialEq + fmt::Debug + 'static,
    Q: ChangeQueue<C>,
{
    fn mark(&self) {
        if let Some(inner) = self.manager.upgrade() {
            inner.mark(&self.position);
        }
    }

    fn is_valid(&self) -> bool {
        let Some(inner) = self.manager.upgrade() else {
            return false;
        };
        let queue = inner.queue.borrow();
        queue.is_valid(&self.position)
    }
}

impl<C, Q> Clone for HistoryPosition<C, Q> {
    fn clone(&self) -> Self {
        Self {
            manager: Weak::clone(&self.manager),
            position: self.position,
        }
    }
}

impl<C, Q> fmt::Debug for HistoryPosition<C, Q> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HistoryPosition")
            .field("position", &self.position)
            .finish()
    }
}
