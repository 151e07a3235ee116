//! # Undograph History
//!
//! Storage for reversible changes with a movable current position.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ editor: coordinator                         │
//! │  - applies undo/redo to the document        │
//! │  - tells the queue to move                  │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ history: ChangeQueue                        │
//! │  - GraphChangeQueue: branching history      │
//! │  - LinearChangeQueue: list plus cursor      │
//! │  - positions, save mark, derived signals    │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use undograph_history::{ChangeQueue, GraphChangeQueue};
//!
//! let mut queue = GraphChangeQueue::new();
//! queue.push("type a").unwrap();
//! queue.push("type b").unwrap();
//!
//! let behind = *queue.prev().unwrap();
//! queue.update_graph_with_undo(&behind).unwrap();
//!
//! // A new edit after undo starts a branch; "type b" stays dormant
//! queue.push("type c").unwrap();
//! assert!(!queue.is_redo_available());
//! assert_eq!(queue.node_count(), 4);
//! ```

mod any;
mod errors;
mod graph;
mod linear;
mod queue;

pub use any::AnyChangeQueue;
pub use errors::{Direction, HistoryError, HistoryResult};
pub use graph::GraphChangeQueue;
pub use linear::LinearChangeQueue;
pub use queue::{ChangeQueue, QueuePosition, QueueSignals};

// Signal types shared with the editor layer
pub use undograph_common::{FlagGuard, ObservableBool, ReadOnlyBool, Subscription};
