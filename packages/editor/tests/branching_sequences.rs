//! Sequences of edits, undos and redos that fork the history

mod common;

use anyhow::Result;
use common::{configured_manager, unlimited_manager, TextDocument};
use undograph_editor::{Backend, Capacity, HistoryConfig, UndoManager, UndoPosition};

/// Insert `text` at the end as its own undo step
fn step(doc: &TextDocument, manager: &impl UndoManager, text: &str) {
    manager.prevent_merge();
    doc.insert(doc.text().len(), text);
}

#[test]
fn test_edit_after_undo_forks_history() -> Result<()> {
    let doc = TextDocument::new();
    let manager = unlimited_manager(&doc);

    step(&doc, &manager, "A");
    step(&doc, &manager, "B");
    assert!(manager.undo()?);
    assert_eq!(doc.text(), "A");

    doc.insert(1, "C");

    assert_eq!(doc.text(), "AC");
    assert!(!manager.is_redo_available());
    assert_eq!(manager.undo_depth(), 2);
    // root, A, dormant B, C
    assert_eq!(manager.with_queue(|queue| queue.node_count()), 4);
    Ok(())
}

#[test]
fn test_dormant_branch_can_be_redone() -> Result<()> {
    let doc = TextDocument::new();
    let manager = unlimited_manager(&doc);

    step(&doc, &manager, "A");
    step(&doc, &manager, "B");
    manager.undo()?;
    step(&doc, &manager, "C");

    manager.undo()?;
    assert_eq!(manager.redo_branch_count(), 2);

    // most recent branch is the default
    manager.redo()?;
    assert_eq!(doc.text(), "AC");
    manager.undo()?;

    assert!(manager.select_redo_branch(0));
    manager.redo()?;
    assert_eq!(doc.text(), "AB");
    assert!(!manager.select_redo_branch(2));
    Ok(())
}

#[test]
fn test_undo_returns_through_the_branch_taken() -> Result<()> {
    let doc = TextDocument::new();
    let manager = unlimited_manager(&doc);

    //        A
    //      ╱   ╲
    //     B     C
    //    ╱ ╲
    //   D   E
    step(&doc, &manager, "A");
    step(&doc, &manager, "B");
    step(&doc, &manager, "D");
    manager.undo()?;
    step(&doc, &manager, "E");
    manager.undo()?;
    manager.undo()?;
    step(&doc, &manager, "C");
    assert_eq!(doc.text(), "AC");

    manager.undo()?;
    manager.select_redo_branch(0);
    manager.redo()?;
    assert_eq!(doc.text(), "AB");

    // B remembers E as the branch last taken
    assert_eq!(manager.redo_branch_count(), 2);
    assert_eq!(manager.redo_depth(), 1);
    manager.redo()?;
    assert_eq!(doc.text(), "ABE");

    while manager.undo()? {}
    assert_eq!(doc.text(), "");
    assert_eq!(manager.redo_depth(), 3);
    Ok(())
}

#[test]
fn test_mark_on_dormant_branch_survives() -> Result<()> {
    let doc = TextDocument::new();
    let manager = unlimited_manager(&doc);

    step(&doc, &manager, "A");
    step(&doc, &manager, "B");
    let saved = manager.current_position();
    saved.mark();

    manager.undo()?;
    step(&doc, &manager, "C");
    assert!(!manager.is_at_marked_position());
    assert!(saved.is_valid());

    manager.undo()?;
    manager.select_redo_branch(0);
    manager.redo()?;
    assert!(manager.is_at_marked_position());
    Ok(())
}

#[test]
fn test_linear_backend_discards_abandoned_redo() -> Result<()> {
    let config = HistoryConfig {
        backend: Backend::Linear,
        capacity: Capacity::Unlimited,
    };
    let doc = TextDocument::new();
    let manager = configured_manager(&doc, &config);

    step(&doc, &manager, "A");
    step(&doc, &manager, "B");
    let saved = manager.current_position();
    saved.mark();
    manager.undo()?;
    step(&doc, &manager, "C");

    assert!(!saved.is_valid());
    manager.undo()?;
    assert_eq!(manager.redo_branch_count(), 1);
    assert!(!manager.select_redo_branch(1));

    manager.redo()?;
    assert_eq!(doc.text(), "AC");
    assert!(!manager.is_at_marked_position());
    Ok(())
}

#[test]
fn test_capacity_applies_to_branching_history() -> Result<()> {
    let config = HistoryConfig {
        backend: Backend::Graph,
        capacity: Capacity::Fixed(2),
    };
    let doc = TextDocument::new();
    let manager = configured_manager(&doc, &config);

    step(&doc, &manager, "A");
    step(&doc, &manager, "B");
    manager.undo()?;
    step(&doc, &manager, "C");
    step(&doc, &manager, "D");
    assert_eq!(manager.undo_depth(), 2);

    assert!(manager.undo()?);
    assert!(manager.undo()?);
    assert!(!manager.undo()?);
    assert_eq!(doc.text(), "A");

    // A is now the oldest state; its dormant branch is kept
    assert_eq!(manager.redo_branch_count(), 2);
    Ok(())
}

#[test]
fn test_forget_history_keeps_redo_branch() -> Result<()> {
    let doc = TextDocument::new();
    let manager = unlimited_manager(&doc);

    step(&doc, &manager, "A");
    step(&doc, &manager, "B");
    manager.undo()?;
    manager.forget_history();

    assert!(!manager.is_undo_available());
    assert!(manager.is_redo_available());
    manager.redo()?;
    assert_eq!(doc.text(), "AB");
    Ok(())
}
