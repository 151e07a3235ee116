//! # Undograph Editor
//!
//! Undo/redo coordination for editors whose history branches.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ document: emits every change it undergoes   │
//! └─────────────────────────────────────────────┘
//!                     ↓ EventSource<C>
//! ┌─────────────────────────────────────────────┐
//! │ editor: GraphUndoManager                    │
//! │  - tells self-caused changes from new edits │
//! │  - merges adjacent compatible edits         │
//! │  - drives undo/redo through invert + apply  │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ history: ChangeQueue (graph or linear)      │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Changes are opaque**: the manager only compares, stores, inverts,
//!    applies and merges them through caller-supplied functions
//! 2. **Nothing is lost**: an edit after undo starts a new branch; the old
//!    redo path stays in the graph
//! 3. **Merging is pairwise**: a new edit may merge into the most recent
//!    step only, never after undo, redo, a mark or `prevent_merge`
//! 4. **Inconsistency is fatal**: if apply reports a different change than
//!    the one undo/redo computed, the manager refuses further work
//!
//! ## Usage
//!
//! ```rust,ignore
//! use undograph_editor::{UndoManager, UndoManagerFactory, UndoPosition};
//!
//! let manager = UndoManagerFactory::unlimited_history(
//!     &document.changes(),
//!     |change| change.invert(),
//!     move |change| document.apply(change),
//!     |a, b| a.merge(b),
//! );
//!
//! // After saving
//! manager.current_position().mark();
//!
//! // Edit menu
//! if manager.is_undo_available() {
//!     manager.undo()?;
//! }
//! ```

mod errors;
mod factory;
mod manager;
mod undo_manager;

pub use errors::{ConfigError, UndoError, UndoResult};
pub use factory::{Backend, Capacity, ConfiguredUndoManager, HistoryConfig, UndoManagerFactory};
pub use manager::{GraphUndoManager, HistoryPosition};
pub use undo_manager::{UndoManager, UndoPosition};

// Re-export common types for convenience
pub use undograph_common::{EventSource, ReadOnlyBool, Subscription};
pub use undograph_history::{AnyChangeQueue, ChangeQueue, GraphChangeQueue, LinearChangeQueue};
