//! # Branching Change Queue
//!
//! History kept as a tree rooted at the oldest remembered state.
//!
//! ```text
//!            root
//!             │ A
//!             ○
//!        B ╱     ╲ C      push C after undoing B:
//!         ○       ●       B stays as a dormant branch,
//!                         C becomes the active one
//! ```
//!
//! ## Design
//!
//! - Nodes live in an arena; a freed slot bumps its generation so stale
//!   [`QueuePosition`]s stop validating
//! - Each node carries the change that leads *into* it, so the change behind
//!   the current position is the current node's own change
//! - Every node remembers which child was taken last; redo follows it
//! - Dormant branches are only reachable by undoing back to their fork point
//!   and selecting them with [`select_branch`](ChangeQueue::select_branch)
//! - An optional capacity bounds the undo depth by advancing the root

use crate::errors::{Direction, HistoryError, HistoryResult};
use crate::queue::{ChangeQueue, QueuePosition, QueueSignals};
use std::fmt;
use tracing::{debug, trace};

#[derive(Debug)]
struct Node<C> {
    /// `None` only on the root
    change: Option<C>,
    parent: Option<usize>,
    children: Vec<usize>,
    /// Index into `children` of the branch redo follows
    active: usize,
}

impl<C> Node<C> {
    fn root() -> Self {
        Self {
            change: None,
            parent: None,
            children: Vec::new(),
            active: 0,
        }
    }

    fn active_child(&self) -> Option<usize> {
        self.children.get(self.active).copied()
    }
}

#[derive(Debug)]
struct Slot<C> {
    generation: u64,
    node: Option<Node<C>>,
}

/// Tree-shaped undo history that never discards an abandoned redo path
pub struct GraphChangeQueue<C> {
    slots: Vec<Slot<C>>,
    free: Vec<usize>,
    root: usize,
    current: usize,
    /// Distance from `root` to `current`
    depth: usize,
    capacity: Option<usize>,
    marked: Option<QueuePosition>,
    signals: QueueSignals,
    closed: bool,
}

impl<C: PartialEq> GraphChangeQueue<C> {
    /// Create a queue with unlimited undo depth
    pub fn new() -> Self {
        Self::with_capacity(None)
    }

    /// Create a queue that keeps at most `capacity` undoable steps
    ///
    /// `Some(0)` keeps no history at all.
    pub fn with_capacity(capacity: Option<usize>) -> Self {
        let mut queue = Self {
            slots: vec![Slot {
                generation: 0,
                node: Some(Node::root()),
            }],
            free: Vec::new(),
            root: 0,
            current: 0,
            depth: 0,
            capacity,
            marked: None,
            signals: QueueSignals::new(),
            closed: false,
        };
        queue.marked = Some(queue.current_position());
        queue
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    /// Number of live nodes, root and dormant branches included
    pub fn node_count(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    fn node(&self, id: usize) -> Option<&Node<C>> {
        self.slots.get(id).and_then(|slot| slot.node.as_ref())
    }

    fn node_mut(&mut self, id: usize) -> Option<&mut Node<C>> {
        self.slots.get_mut(id).and_then(|slot| slot.node.as_mut())
    }

    fn position_of(&self, id: usize) -> QueuePosition {
        let generation = self.slots.get(id).map_or(0, |slot| slot.generation);
        QueuePosition::new(id, generation)
    }

    fn ensure_open(&self) -> HistoryResult<()> {
        if self.closed {
            Err(HistoryError::Closed)
        } else {
            Ok(())
        }
    }

    fn alloc(&mut self, node: Node<C>) -> usize {
        match self.free.pop() {
            Some(id) => {
                self.slots[id].node = Some(node);
                id
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    node: Some(node),
                });
                self.slots.len() - 1
            }
        }
    }

    fn release(&mut self, id: usize) {
        if let Some(slot) = self.slots.get_mut(id) {
            if slot.node.take().is_some() {
                slot.generation += 1;
                self.free.push(id);
            }
        }
    }

    fn prune_subtree(&mut self, id: usize) -> usize {
        let mut stack = vec![id];
        let mut pruned = 0;
        while let Some(next) = stack.pop() {
            if let Some(node) = self.node(next) {
                stack.extend(node.children.iter().copied());
            }
            self.release(next);
            pruned += 1;
        }
        pruned
    }

    /// Hang `change` under `parent` as its active child
    fn attach(&mut self, parent: usize, change: C) -> usize {
        let id = self.alloc(Node {
            change: Some(change),
            parent: Some(parent),
            children: Vec::new(),
            active: 0,
        });
        if let Some(node) = self.node_mut(parent) {
            node.children.push(id);
            node.active = node.children.len() - 1;
        }
        id
    }

    /// Nodes from the root down to the current node, both included
    fn path_from_root(&self) -> Vec<usize> {
        let mut path = vec![self.current];
        let mut cursor = self.current;
        while let Some(parent) = self.node(cursor).and_then(|node| node.parent) {
            path.push(parent);
            cursor = parent;
        }
        path.reverse();
        path
    }

    /// Make `new_root` (a child of the root) the root, pruning its siblings
    fn reroot(&mut self, new_root: usize) {
        let old_root = self.root;
        let siblings: Vec<usize> = self
            .node(old_root)
            .map(|node| {
                node.children
                    .iter()
                    .copied()
                    .filter(|&child| child != new_root)
                    .collect()
            })
            .unwrap_or_default();
        for sibling in siblings {
            self.prune_subtree(sibling);
        }
        self.release(old_root);

        if let Some(node) = self.node_mut(new_root) {
            node.parent = None;
            node.change = None;
        }
        self.root = new_root;
    }

    /// Forget the `count` oldest steps of the active path
    fn drop_oldest(&mut self, count: usize) {
        let path = self.path_from_root();
        for &next in path.iter().skip(1).take(count) {
            self.reroot(next);
            self.depth -= 1;
        }
    }

    fn enforce_capacity(&mut self) {
        if let Some(capacity) = self.capacity {
            if self.depth > capacity {
                let excess = self.depth - capacity;
                trace!(excess, capacity, "trimming history to capacity");
                self.drop_oldest(excess);
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

impl<C: PartialEq> ChangeQueue<C> for GraphChangeQueue<C> {
    fn has_prev(&self) -> bool {
        !self.closed && self.node(self.current).is_some_and(|node| node.parent.is_some())
    }

    fn has_next(&self) -> bool {
        !self.closed && self.node(self.current).is_some_and(|node| !node.children.is_empty())
    }

    fn prev(&self) -> HistoryResult<&C> {
        self.ensure_open()?;
        self.node(self.current)
            .and_then(|node| node.change.as_ref())
            .ok_or(HistoryError::EmptyHistory(Direction::Backward))
    }

    fn next(&self) -> HistoryResult<&C> {
        self.ensure_open()?;
        self.node(self.current)
            .and_then(Node::active_child)
            .and_then(|child| self.node(child))
            .and_then(|node| node.change.as_ref())
            .ok_or(HistoryError::EmptyHistory(Direction::Forward))
    }

    fn push(&mut self, change: C) -> HistoryResult<()> {
        self.ensure_open()?;
        let dormant = self.node(self.current).map_or(0, |node| node.children.len());
        self.current = self.attach(self.current, change);
        self.depth += 1;
        debug!(depth = self.depth, dormant, "change pushed");

        self.enforce_capacity();
        self.refresh();
        Ok(())
    }

    fn push_merged(&mut self, combined: C) -> HistoryResult<()> {
        self.ensure_open()?;
        let replaced = self.current;
        let Some(parent) = self.node(replaced).and_then(|node| node.parent) else {
            return self.push(combined);
        };

        // A replaced node with futures of its own stays behind as a branch
        if self.node(replaced).is_some_and(|node| node.children.is_empty()) {
            if let Some(node) = self.node_mut(parent) {
                node.children.retain(|&child| child != replaced);
            }
            self.release(replaced);
        }
        self.current = self.attach(parent, combined);
        trace!(depth = self.depth, "top change replaced by merge");

        self.refresh();
        Ok(())
    }

    fn update_graph_with_undo(&mut self, _inverted: &C) -> HistoryResult<()> {
        self.ensure_open()?;
        let from = self.current;
        let parent = self
            .node(from)
            .and_then(|node| node.parent)
            .ok_or(HistoryError::EmptyHistory(Direction::Backward))?;

        if let Some(node) = self.node_mut(parent) {
            if let Some(index) = node.children.iter().position(|&child| child == from) {
                node.active = index;
            }
        }
        self.current = parent;
        self.depth -= 1;

        self.refresh();
        Ok(())
    }

    fn update_graph_with_redo(&mut self, change: &C) -> HistoryResult<()> {
        self.ensure_open()?;
        let target = self
            .node(self.current)
            .and_then(Node::active_child)
            .ok_or(HistoryError::EmptyHistory(Direction::Forward))?;
        if self.node(target).and_then(|node| node.change.as_ref()) != Some(change) {
            return Err(HistoryError::InconsistentStep);
        }
        self.current = target;
        self.depth += 1;

        self.enforce_capacity();
        self.refresh();
        Ok(())
    }

    fn undo_depth(&self) -> usize {
        if self.closed {
            0
        } else {
            self.depth
        }
    }

    fn redo_depth(&self) -> usize {
        if self.closed {
            return 0;
        }
        let mut depth = 0;
        let mut cursor = self.current;
        while let Some(child) = self.node(cursor).and_then(Node::active_child) {
            depth += 1;
            cursor = child;
        }
        depth
    }

    fn branch_count(&self) -> usize {
        if self.closed {
            return 0;
        }
        self.node(self.current).map_or(0, |node| node.children.len())
    }

    fn select_branch(&mut self, index: usize) -> bool {
        if self.closed {
            return false;
        }
        let current = self.current;
        let Some(node) = self.node_mut(current) else {
            return false;
        };
        if index >= node.children.len() {
            return false;
        }
        node.active = index;
        trace!(index, "redo branch selected");

        self.refresh();
        true
    }

    fn current_position(&self) -> QueuePosition {
        self.position_of(self.current)
    }

    fn is_valid(&self, position: &QueuePosition) -> bool {
        !self.closed
            && self.slots.get(position.slot).is_some_and(|slot| {
                slot.node.is_some() && slot.generation == position.generation
            })
    }

    fn mark(&mut self, position: &QueuePosition) {
        if !self.is_valid(position) {
            trace!(?position, "ignoring mark on invalid position");
            return;
        }
        self.marked = Some(*position);
        self.refresh();
    }

    fn is_at_marked_position(&self) -> bool {
        !self.closed && self.marked == Some(self.current_position())
    }

    fn forget_history(&mut self) {
        if self.closed {
            return;
        }
        let forgotten = self.depth;
        self.drop_oldest(forgotten);
        debug!(forgotten, nodes = self.node_count(), "history forgotten");

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
        self.slots.clear();
        self.free.clear();
        self.marked = None;
        self.depth = 0;
        self.signals.refresh(false, false, false);
        debug!("change queue closed");
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

impl<C: PartialEq> Default for GraphChangeQueue<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> fmt::Debug for GraphChangeQueue<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphChangeQueue")
            .field("nodes", &(self.slots.len() - self.free.len()))
            .field("depth", &self.depth)
            .field("capacity", &self.capacity)
            .field("closed", &self.closed)
            .finish()
    }
}
