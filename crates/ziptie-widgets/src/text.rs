#![forbid(unsafe_code)]

//! Text entry controls.
//!
//! [`TextInput`] covers both the single-line input and the multi-line text
//! area; they differ only in their [`WidgetKind`] and in whether newlines are
//! kept. Every user edit fires `input` after the value has changed.
//! Programmatic writes through [`Widget::set`] are silent.
//!
//! # Example
//! ```
//! use ziptie_widgets::TextInput;
//!
//! let input = TextInput::new();
//! input.type_text("Ada\n");
//! assert_eq!(input.value(), "Ada");
//!
//! let area = TextInput::multiline();
//! area.type_text("two\nlines");
//! assert_eq!(area.value().lines().count(), 2);
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use ziptie_core::{INPUT_EVENT, Listener, VALUE, Value, Widget, WidgetKind};

use crate::listeners::ListenerTable;

/// Placeholder property.
pub const PLACEHOLDER: &str = "placeholder";

/// Single-line input or multi-line text area.
#[derive(Debug)]
pub struct TextInput {
    kind: WidgetKind,
    value: RefCell<String>,
    placeholder: RefCell<String>,
    listeners: ListenerTable,
}

impl TextInput {
    /// Empty single-line input.
    #[must_use]
    pub fn new() -> Rc<Self> {
        Self::build(WidgetKind::TextInput)
    }

    /// Empty multi-line text area.
    #[must_use]
    pub fn multiline() -> Rc<Self> {
        Self::build(WidgetKind::TextArea)
    }

    fn build(kind: WidgetKind) -> Rc<Self> {
        Rc::new(Self {
            kind,
            value: RefCell::new(String::new()),
            placeholder: RefCell::new(String::new()),
            listeners: ListenerTable::new(),
        })
    }

    /// Whether newlines are kept.
    #[must_use]
    pub fn is_multiline(&self) -> bool {
        self.kind == WidgetKind::TextArea
    }

    /// Current text.
    #[must_use]
    pub fn value(&self) -> String {
        self.value.borrow().clone()
    }

    /// Hint shown while empty.
    #[must_use]
    pub fn placeholder(&self) -> String {
        self.placeholder.borrow().clone()
    }

    /// User typing: append `text`, then fire `input`.
    pub fn type_text(&self, text: &str) {
        let text = self.normalize(text);
        if text.is_empty() {
            return;
        }
        self.value.borrow_mut().push_str(&text);
        self.listeners.emit(INPUT_EVENT);
    }

    /// User deleting one character. No event when already empty.
    pub fn backspace(&self) {
        if self.value.borrow_mut().pop().is_none() {
            return;
        }
        self.listeners.emit(INPUT_EVENT);
    }

    /// User replacing the whole text (paste over a selection, clear button).
    pub fn replace(&self, text: &str) {
        let text = self.normalize(text);
        *self.value.borrow_mut() = text;
        self.listeners.emit(INPUT_EVENT);
    }

    /// Listeners attached to `event`.
    #[must_use]
    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners.count(event)
    }

    fn normalize(&self, text: &str) -> String {
        if self.is_multiline() {
            text.to_owned()
        } else {
            text.chars().filter(|c| !matches!(c, '\n' | '\r')).collect()
        }
    }
}

impl Widget for TextInput {
    fn kind(&self) -> WidgetKind {
        self.kind
    }

    fn get(&self, property: &str) -> Option<Value> {
        match property {
            VALUE => Some(Value::Text(self.value())),
            PLACEHOLDER => Some(Value::Text(self.placeholder())),
            _ => None,
        }
    }

    fn set(&self, property: &str, value: Value) {
        match property {
            VALUE => *self.value.borrow_mut() = self.normalize(&value.to_text()),
            PLACEHOLDER => *self.placeholder.borrow_mut() = value.to_text(),
            other => tracing::debug!(property = other, "text input ignores unknown property"),
        }
    }

    fn add_listener(&self, event: &str, listener: Listener) {
        self.listeners.add(event, listener);
    }

    fn remove_listener(&self, event: &str, listener: &Listener) -> bool {
        self.listeners.remove(event, listener)
    }
}
