#![forbid(unsafe_code)]

//! Checkable controls.
//!
//! A [`Checkbox`] toggles on every click; a radio-style checkbox only ever
//! turns on. Both fire `click` after their state has changed, so a listener
//! reading `checked` sees the new state.
//!
//! # Example
//! ```
//! use ziptie_widgets::Checkbox;
//!
//! let cb = Checkbox::new("Done");
//! cb.click();
//! assert!(cb.is_checked());
//! ```

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use ziptie_core::{CHECKED, CLICK_EVENT, Listener, Value, Widget, WidgetKind};

use crate::listeners::ListenerTable;

/// Label property.
pub const LABEL: &str = "label";

/// Checkbox or radio button.
#[derive(Debug)]
pub struct Checkbox {
    kind: WidgetKind,
    label: RefCell<String>,
    checked: Cell<bool>,
    listeners: ListenerTable,
}

impl Checkbox {
    /// Unchecked checkbox.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Rc<Self> {
        Self::build(WidgetKind::Checkbox, label.into())
    }

    /// Unchecked radio button.
    #[must_use]
    pub fn radio(label: impl Into<String>) -> Rc<Self> {
        Self::build(WidgetKind::Radio, label.into())
    }

    fn build(kind: WidgetKind, label: String) -> Rc<Self> {
        Rc::new(Self {
            kind,
            label: RefCell::new(label),
            checked: Cell::new(false),
            listeners: ListenerTable::new(),
        })
    }

    /// Current state.
    #[must_use]
    pub fn is_checked(&self) -> bool {
        self.checked.get()
    }

    /// Caption next to the box.
    #[must_use]
    pub fn label(&self) -> String {
        self.label.borrow().clone()
    }

    /// User activation: update state, then fire `click`.
    pub fn click(&self) {
        let next = match self.kind {
            WidgetKind::Radio => true,
            _ => !self.checked.get(),
        };
        self.checked.set(next);
        self.listeners.emit(CLICK_EVENT);
    }

    /// Listeners attached to `event`.
    #[must_use]
    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners.count(event)
    }
}

impl Widget for Checkbox {
    fn kind(&self) -> WidgetKind {
        self.kind
    }

    fn get(&self, property: &str) -> Option<Value> {
        match property {
            CHECKED => Some(Value::Bool(self.checked.get())),
            LABEL => Some(Value::Text(self.label.borrow().clone())),
            _ => None,
        }
    }

    fn set(&self, property: &str, value: Value) {
        match property {
            CHECKED => self.checked.set(value.truthy()),
            LABEL => *self.label.borrow_mut() = value.to_text(),
            other => tracing::debug!(property = other, "checkbox ignores unknown property"),
        }
    }

    fn add_listener(&self, event: &str, listener: Listener) {
        self.listeners.add(event, listener);
    }

    fn remove_listener(&self, event: &str, listener: &Listener) -> bool {
        self.listeners.remove(event, listener)
    }
}
