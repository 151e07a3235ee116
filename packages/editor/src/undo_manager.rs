use crate::errors::UndoResult;
use std::fmt;
use undograph_history::ReadOnlyBool;

/// A saved-state capability handed out by an [`UndoManager`]
pub trait UndoPosition {
    /// Record this position as the saved state
    ///
    /// Also stops the next observed change from merging into the previous
    /// one, so the saved state cannot be merged away.
    fn mark(&self);

    /// `true` while the position is still reachable in history
    fn is_valid(&self) -> bool;
}

/// Public surface of an undo coordinator
///
/// Each implementation provides:
/// - Undo/redo driven by the external apply function
/// - Merge control and history forgetting
/// - Availability state, queryable and observable but never writable
///   from outside
pub trait UndoManager {
    type Change: fmt::Debug;
    type Position: UndoPosition;

    /// Undo one step; `Ok(false)` when there is nothing to undo
    fn undo(&self) -> UndoResult<bool, Self::Change>;

    /// Redo one step; `Ok(false)` when there is nothing to redo
    fn redo(&self) -> UndoResult<bool, Self::Change>;

    /// The next observed change becomes a separate undo step
    fn prevent_merge(&self);

    fn forget_history(&self);

    /// Detach from the change source and release history
    fn close(&self);

    fn current_position(&self) -> Self::Position;

    fn undo_available(&self) -> ReadOnlyBool;

    fn redo_available(&self) -> ReadOnlyBool;

    fn performing_action(&self) -> ReadOnlyBool;

    fn at_marked_position(&self) -> ReadOnlyBool;

    fn is_undo_available(&self) -> bool {
        self.undo_available().get()
    }

    fn is_redo_available(&self) -> bool {
        self.redo_available().get()
    }

    fn is_performing_action(&self) -> bool {
        self.performing_action().get()
    }

    fn is_at_marked_position(&self) -> bool {
        self.at_marked_position().get()
    }
}
