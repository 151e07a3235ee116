//! Runtime choice between the queue backends

use crate::errors::HistoryResult;
use crate::graph::GraphChangeQueue;
use crate::linear::LinearChangeQueue;
use crate::queue::{ChangeQueue, QueuePosition, QueueSignals};

/// Either backend behind one concrete type
#[derive(Debug)]
pub enum AnyChangeQueue<C> {
    Graph(GraphChangeQueue<C>),
    Linear(LinearChangeQueue<C>),
}

macro_rules! dispatch {
    ($self:ident, $queue:ident => $body:expr) => {
        match $self {
            AnyChangeQueue::Graph($queue) => $body,
            AnyChangeQueue::Linear($queue) => $body,
        }
    };
}

impl<C: PartialEq> ChangeQueue<C> for AnyChangeQueue<C> {
    fn has_prev(&self) -> bool {
        dispatch!(self, queue => queue.has_prev())
    }

    fn has_next(&self) -> bool {
        dispatch!(self, queue => queue.has_next())
    }

    fn prev(&self) -> HistoryResult<&C> {
        dispatch!(self, queue => queue.prev())
    }

    fn next(&self) -> HistoryResult<&C> {
        dispatch!(self, queue => queue.next())
    }

    fn push(&mut self, change: C) -> HistoryResult<()> {
        dispatch!(self, queue => queue.push(change))
    }

    fn push_after(&mut self, merge_base: &C, change: C) -> HistoryResult<()> {
        dispatch!(self, queue => queue.push_after(merge_base, change))
    }

    fn push_merged(&mut self, combined: C) -> HistoryResult<()> {
        dispatch!(self, queue => queue.push_merged(combined))
    }

    fn update_graph_with_undo(&mut self, inverted: &C) -> HistoryResult<()> {
        dispatch!(self, queue => queue.update_graph_with_undo(inverted))
    }

    fn update_graph_with_redo(&mut self, change: &C) -> HistoryResult<()> {
        dispatch!(self, queue => queue.update_graph_with_redo(change))
    }

    fn undo_depth(&self) -> usize {
        dispatch!(self, queue => queue.undo_depth())
    }

    fn redo_depth(&self) -> usize {
        dispatch!(self, queue => queue.redo_depth())
    }

    fn branch_count(&self) -> usize {
        dispatch!(self, queue => queue.branch_count())
    }

    fn select_branch(&mut self, index: usize) -> bool {
        dispatch!(self, queue => queue.select_branch(index))
    }

    fn current_position(&self) -> QueuePosition {
        dispatch!(self, queue => queue.current_position())
    }

    fn is_valid(&self, position: &QueuePosition) -> bool {
        dispatch!(self, queue => queue.is_valid(position))
    }

    fn mark(&mut self, position: &QueuePosition) {
        dispatch!(self, queue => queue.mark(position))
    }

    fn is_at_marked_position(&self) -> bool {
        dispatch!(self, queue => queue.is_at_marked_position())
    }

    fn forget_history(&mut self) {
        dispatch!(self, queue => queue.forget_history())
    }

    fn signals(&self) -> &QueueSignals {
        dispatch!(self, queue => queue.signals())
    }

    fn close(&mut self) {
        dispatch!(self, queue => queue.close())
    }

    fn is_closed(&self) -> bool {
        dispatch!(self, queue => queue.is_closed())
    }
}

impl<C> From<GraphChangeQueue<C>> for AnyChangeQueue<C> {
    fn from(queue: GraphChangeQueue<C>) -> Self {
        AnyChangeQueue::Graph(queue)
    }
}

impl<C> From<LinearChangeQueue<C>> for AnyChangeQueue<C> {
    fn from(queue: LinearChangeQueue<C>) -> Self {
        AnyChangeQueue::Linear(queue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_backend_truncates_where_graph_branches() {
        let mut graph: AnyChangeQueue<i32> = GraphChangeQueue::new().into();
        let mut linear: AnyChangeQueue<i32> = LinearChangeQueue::new().into();

        for queue in [&mut graph, &mut linear] {
            queue.push(1).unwrap();
            queue.update_graph_with_undo(&-1).unwrap();
            queue.push(2).unwrap();
            queue.update_graph_with_undo(&-2).unwrap();
        }

        assert_eq!(graph.branch_count(), 2);
        assert_eq!(linear.branch_count(), 1);
        assert_eq!(graph.next(), Ok(&2));
        assert_eq!(linear.next(), Ok(&2));
    }
}
