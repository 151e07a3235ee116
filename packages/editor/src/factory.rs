//! # Undo Manager Construction
//!
//! Shortcuts for the common history shapes, and a [`HistoryConfig`] that
//! editor shells can keep in their settings file.
//!
//! ## Example
//!
//! ```rust
//! use undograph_common::EventSource;
//! use undograph_editor::{Capacity, HistoryConfig, UndoManagerFactory};
//!
//! let config = HistoryConfig::from_json(r#"{ "capacity": { "fixed": 50 } }"#).unwrap();
//! assert_eq!(config.capacity, Capacity::Fixed(50));
//!
//! let changes = EventSource::<i32>::new();
//! let manager = UndoManagerFactory::from_config(
//!     &config,
//!     &changes,
//!     |delta: &i32| -delta,
//!     |_: &i32| {},
//!     |_: &i32, _: &i32| None,
//! );
//! assert_eq!(manager.undo_depth(), 0);
//! ```

use crate::errors::ConfigError;
use crate::manager::GraphUndoManager;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tracing::debug;
use undograph_common::EventSource;
use undograph_history::{AnyChangeQueue, GraphChangeQueue, LinearChangeQueue};

/// Shape of the stored history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    /// Abandoned redo paths are kept as dormant branches
    #[default]
    Graph,
    /// Abandoned redo paths are discarded
    Linear,
}

/// How many undo steps to keep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capacity {
    #[default]
    Unlimited,
    /// `Fixed(0)` tracks nothing; undo is never available
    Fixed(usize),
}

impl Capacity {
    /// Maximum undo depth, `None` for unlimited
    pub fn limit(self) -> Option<usize> {
        match self {
            Capacity::Unlimited => None,
            Capacity::Fixed(n) => Some(n),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub backend: Backend,
    pub capacity: Capacity,
}

impl HistoryConfig {
    pub fn from_json(source: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(source)?)
    }

    /// Read a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_json(&source)?;
        debug!(path = %path.as_ref().display(), ?config, "history config loaded");
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Build an empty queue of the configured shape
    pub fn build_queue<C: PartialEq>(&self) -> AnyChangeQueue<C> {
        let limit = self.capacity.limit();
        match self.backend {
            Backend::Graph => GraphChangeQueue::with_capacity(limit).into(),
            Backend::Linear => LinearChangeQueue::with_capacity(limit).into(),
        }
    }
}

/// Manager built by [`UndoManagerFactory::from_config`], over either backend
pub type ConfiguredUndoManager<C> = GraphUndoManager<C, AnyChangeQueue<C>>;

/// Constructors for [`GraphUndoManager`]
///
/// Every constructor takes the change source and the three functions; none
/// of them has a default.
pub struct UndoManagerFactory;

impl UndoManagerFactory {
    /// Branching history without a depth limit
    pub fn unlimited_history<C>(
        changes: &EventSource<C>,
        invert: impl Fn(&C) -> C + 'static,
        apply: impl Fn(&C) + 'static,
        merge: impl Fn(&C, &C) -> Option<C> + 'static,
    ) -> GraphUndoManager<C>
    where
        C: Clone + PartialEq + fmt::Debug + 'static,
    {
        GraphUndoManager::new(GraphChangeQueue::new(), changes, invert, apply, merge)
    }

    /// Branching history keeping at most `capacity` undo steps
    pub fn fixed_size_history<C>(
        capacity: usize,
        changes: &EventSource<C>,
        invert: impl Fn(&C) -> C + 'static,
        apply: impl Fn(&C) + 'static,
        merge: impl Fn(&C, &C) -> Option<C> + 'static,
    ) -> GraphUndoManager<C>
    where
        C: Clone + PartialEq + fmt::Debug + 'static,
    {
        GraphUndoManager::new(
            GraphChangeQueue::with_capacity(Some(capacity)),
            changes,
            invert,
            apply,
            merge,
        )
    }

    /// A manager that observes changes but never offers undo
    pub fn zero_history<C>(
        changes: &EventSource<C>,
        invert: impl Fn(&C) -> C + 'static,
        apply: impl Fn(&C) + 'static,
        merge: impl Fn(&C, &C) -> Option<C> + 'static,
    ) -> GraphUndoManager<C>
    where
        C: Clone + PartialEq + fmt::Debug + 'static,
    {
        Self::fixed_size_history(0, changes, invert, apply, merge)
    }

    /// Manager over the queue described by `config`
    pub fn from_config<C>(
        config: &HistoryConfig,
        changes: &EventSource<C>,
        invert: impl Fn(&C) -> C + 'static,
        apply: impl Fn(&C) + 'static,
        merge: impl Fn(&C, &C) -> Option<C> + 'static,
    ) -> ConfiguredUndoManager<C>
    where
        C: Clone + PartialEq + fmt::Debug + 'static,
    {
        debug!(?config, "building undo manager");
        GraphUndoManager::new(config.build_queue(), changes, invert, apply, merge)
    }
}
