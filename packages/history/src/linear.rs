//! # Linear Change Queue
//!
//! The classic undo list: changes in application order plus a cursor.
//!
//! ## Design
//!
//! - Changes behind the cursor are undoable, changes ahead of it redoable
//! - A new change after undoing truncates everything ahead of the cursor
//! - Optional capacity: the oldest change is dropped once exceeded
//! - Every entry gets a fresh id; a position is the id of the entry behind
//!   the cursor (or of the forgotten prefix), so truncated or merged entries
//!   invalidate their positions

use crate::errors::{Direction, HistoryError, HistoryResult};
use crate::queue::{ChangeQueue, QueuePosition, QueueSignals};
use std::collections::VecDeque;
use std::fmt;
use tracing::{debug, trace};

#[derive(Debug)]
struct Entry<C> {
    id: u64,
    change: C,
}

/// List-plus-cursor undo history
pub struct LinearChangeQueue<C> {
    /// Changes in application order (oldest first)
    entries: VecDeque<Entry<C>>,

    /// Number of entries currently applied
    cursor: usize,

    /// Id standing for the state before `entries[0]`
    base_id: u64,

    next_id: u64,

    /// Maximum number of undo levels (`None` = unlimited)
    capacity: Option<usize>,

    marked: Option<u64>,
    signals: QueueSignals,
    closed: bool,
}

impl<C: PartialEq> LinearChangeQueue<C> {
    /// Create a queue with unlimited undo levels
    pub fn new() -> Self {
        Self::with_capacity(None)
    }

    /// Create a queue with custom max levels
    pub fn with_capacity(capacity: Option<usize>) -> Self {
        Self {
            entries: VecDeque::new(),
            cursor: 0,
            base_id: 0,
            next_id: 1,
            capacity,
            marked: Some(0),
            signals: QueueSignals::new(),
            closed: false,
        }
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    /// Number of stored changes, both sides of the cursor
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn ensure_open(&self) -> HistoryResult<()> {
        if self.closed {
            Err(HistoryError::Closed)
        } else {
            Ok(())
        }
    }

    fn current_id(&self) -> u64 {
        match self.cursor {
            0 => self.base_id,
            n => self.entries.get(n - 1).map_or(self.base_id, |entry| entry.id),
        }
    }

    fn fresh_entry(&mut self, change: C) -> Entry<C> {
        let id = self.next_id;
        self.next_id += 1;
        Entry { id, change }
    }

    fn truncate_redo(&mut self) {
        let dropped = self.entries.len() - self.cursor;
        if dropped > 0 {
            trace!(dropped, "redo entries discarded");
            self.entries.truncate(self.cursor);
        }
    }

    fn enforce_capacity(&mut self) {
        let Some(capacity) = self.capacity else {
            return;
        };
        while self.cursor > capacity {
            match self.entries.pop_front() {
                Some(entry) => {
                    self.base_id = entry.id;
                    self.cursor -= 1;
                }
                None => break,
            }
        }
    }

    fn refresh(&self) {
        self.signals.refresh(
            self.has_prev(),
            self.has_next(),
            self.is_at_marked_position(),
        );
    }
}

impl<C: PartialEq> ChangeQueue<C> for LinearChangeQueue<C> {
    fn has_prev(&self) -> bool {
        !self.closed && self.cursor > 0
    }

    fn has_next(&self) -> bool {
        !self.closed && self.cursor < self.entries.len()
    }

    fn prev(&self) -> HistoryResult<&C> {
        self.ensure_open()?;
        self.cursor
            .checked_sub(1)
            .and_then(|index| self.entries.get(index))
            .map(|entry| &entry.change)
            .ok_or(HistoryError::EmptyHistory(Direction::Backward))
    }

    fn next(&self) -> HistoryResult<&C> {
        self.ensure_open()?;
        self.entries
            .get(self.cursor)
            .map(|entry| &entry.change)
            .ok_or(HistoryError::EmptyHistory(Direction::Forward))
    }

    fn push(&mut self, change: C) -> HistoryResult<()> {
        self.ensure_open()?;
        // New change invalidates the future
        self.truncate_redo();

        let entry = self.fresh_entry(change);
        self.entries.push_back(entry);
        self.cursor += 1;
        debug!(depth = self.cursor, "change pushed");

        self.enforce_capacity();
        self.refresh();
        Ok(())
    }

    fn push_merged(&mut self, combined: C) -> HistoryResult<()> {
        self.ensure_open()?;
        if self.cursor == 0 {
            return self.push(combined);
        }
        self.truncate_redo();

        let entry = self.fresh_entry(combined);
        let top = self.cursor - 1;
        self.entries[top] = entry;
        trace!(depth = self.cursor, "top change replaced by merge");

        self.refresh();
        Ok(())
    }

    fn update_graph_with_undo(&mut self, _inverted: &C) -> HistoryResult<()> {
        self.ensure_open()?;
        if self.cursor == 0 {
            return Err(HistoryError::EmptyHistory(Direction::Backward));
        }
        self.cursor -= 1;

        self.refresh();
        Ok(())
    }

    fn update_graph_with_redo(&mut self, change: &C) -> HistoryResult<()> {
        self.ensure_open()?;
        let recorded = self
            .entries
            .get(self.cursor)
            .ok_or(HistoryError::EmptyHistory(Direction::Forward))?;
        if recorded.change != *change {
            return Err(HistoryError::InconsistentStep);
        }
        self.cursor += 1;

        self.refresh();
        Ok(())
    }

    fn undo_depth(&self) -> usize {
        if self.closed {
            0
        } else {
            self.cursor
        }
    }

    fn redo_depth(&self) -> usize {
        if self.closed {
            0
        } else {
            self.entries.len() - self.cursor
        }
    }

    fn current_position(&self) -> QueuePosition {
        QueuePosition::new(0, self.current_id())
    }

    fn is_valid(&self, position: &QueuePosition) -> bool {
        !self.closed
            && (position.generation == self.base_id
                || self.entries.iter().any(|entry| entry.id == position.generation))
    }

    fn mark(&mut self, position: &QueuePosition) {
        if !self.is_valid(position) {
            trace!(?position, "ignoring mark on invalid position");
            return;
        }
        self.marked = Some(position.generation);
        self.refresh();
    }

    fn is_at_marked_position(&self) -> bool {
        !self.closed && self.marked == Some(self.current_id())
    }

    fn forget_history(&mut self) {
        if self.closed {
            return;
        }
        let forgotten = self.cursor;
        self.base_id = self.current_id();
        self.entries.drain(..self.cursor);
        self.cursor = 0;
        debug!(forgotten, "history forgotten");

        self.refresh();
    }

    fn signals(&self) -> &QueueSignals {
        &self.signals
    }

    fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.entries.clear();
        self.cursor = 0;
        self.marked = None;
        self.signals.refresh(false, false, false);
        debug!("change queue closed");
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

impl<C: PartialEq> Default for LinearChangeQueue<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> fmt::Debug for LinearChangeQueue<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinearChangeQueue")
            .field("len", &self.entries.len())
            .field("cursor", &self.cursor)
            .field("capacity", &self.capacity)
            .field("closed", &self.closed)
            .finish()
    }
}
