//! Shared fixture: a plain-text document whose edits are insert/delete ops

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;
use tracing_subscriber::EnvFilter;
use undograph_editor::{
    ConfiguredUndoManager, EventSource, GraphUndoManager, HistoryConfig, UndoManagerFactory,
};

#[derive(Debug, Clone, PartialEq)]
pub enum TextEdit {
    Insert { at: usize, text: String },
    Delete { at: usize, text: String },
}

impl TextEdit {
    pub fn invert(&self) -> TextEdit {
        match self {
            TextEdit::Insert { at, text } => TextEdit::Delete {
                at: *at,
                text: text.clone(),
            },
            TextEdit::Delete { at, text } => TextEdit::Insert {
                at: *at,
                text: text.clone(),
            },
        }
    }

    /// Typing merges forward, backspacing merges backward
    pub fn merge(&self, next: &TextEdit) -> Option<TextEdit> {
        match (self, next) {
            (TextEdit::Insert { at, text }, TextEdit::Insert { at: next_at, text: next_text })
                if *next_at == at + text.len() =>
            {
                Some(TextEdit::Insert {
                    at: *at,
                    text: format!("{text}{next_text}"),
                })
            }
            (TextEdit::Delete { at, text }, TextEdit::Delete { at: next_at, text: next_text })
                if next_at + next_text.len() == *at =>
            {
                Some(TextEdit::Delete {
                    at: *next_at,
                    text: format!("{next_text}{text}"),
                })
            }
            _ => None,
        }
    }
}

/// Text buffer that reports every edit it undergoes
pub struct TextDocument {
    text: RefCell<String>,
    changes: EventSource<TextEdit>,
}

impl TextDocument {
    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            text: RefCell::new(String::new()),
            changes: EventSource::new(),
        })
    }

    pub fn apply(&self, edit: &TextEdit) {
        {
            let mut text = self.text.borrow_mut();
            match edit {
                TextEdit::Insert { at, text: inserted } => text.insert_str(*at, inserted),
                TextEdit::Delete { at, text: removed } => {
                    text.replace_range(*at..at + removed.len(), "")
                }
            }
        }
        self.changes.emit(edit);
    }

    pub fn insert(&self, at: usize, text: &str) {
        self.apply(&TextEdit::Insert {
            at,
            text: text.to_string(),
        });
    }

    pub fn delete(&self, at: usize, len: usize) {
        let removed = self.text.borrow()[at..at + len].to_string();
        self.apply(&TextEdit::Delete { at, text: removed });
    }

    /// Append one character at a time, like a user typing
    pub fn type_text(&self, text: &str) {
        for ch in text.chars() {
            let at = self.text.borrow().len();
            self.insert(at, &ch.to_string());
        }
    }

    pub fn text(&self) -> String {
        self.text.borrow().clone()
    }

    pub fn changes(&self) -> &EventSource<TextEdit> {
        &self.changes
    }
}

/// Route library logs to the test output; `RUST_LOG=trace` shows every step
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

pub fn unlimited_manager(doc: &Rc<TextDocument>) -> GraphUndoManager<TextEdit> {
    init_tracing();
    let target = Rc::clone(doc);
    UndoManagerFactory::unlimited_history(
        doc.changes(),
        TextEdit::invert,
        move |edit: &TextEdit| target.apply(edit),
        TextEdit::merge,
    )
}

pub fn configured_manager(
    doc: &Rc<TextDocument>,
    config: &HistoryConfig,
) -> ConfiguredUndoManager<TextEdit> {
    init_tracing();
    let target = Rc::clone(doc);
    UndoManagerFactory::from_config(
        config,
        doc.changes(),
        TextEdit::invert,
        move |edit: &TextEdit| target.apply(edit),
        TextEdit::merge,
    )
}
