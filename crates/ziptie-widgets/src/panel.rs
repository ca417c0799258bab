#![forbid(unsafe_code)]

//! Content-only widget.
//!
//! A [`Panel`] has no interaction event of its own; it is observed through
//! `mutation`, which fires every time its content actually changes, whether
//! the change came from [`Panel::render`] or from a programmatic write.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use ziptie_core::{CONTENT, Listener, MUTATION_EVENT, Value, Widget, WidgetKind};

use crate::listeners::ListenerTable;

/// Rendered-content container.
#[derive(Debug)]
pub struct Panel {
    content: RefCell<String>,
    mutations: Cell<u64>,
    listeners: ListenerTable,
}

impl Panel {
    /// Empty panel.
    #[must_use]
    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            content: RefCell::new(String::new()),
            mutations: Cell::new(0),
            listeners: ListenerTable::new(),
        })
    }

    /// Rendered content.
    #[must_use]
    pub fn content(&self) -> String {
        self.content.borrow().clone()
    }

    /// Replace the rendered content.
    pub fn render(&self, content: impl Into<String>) {
        self.replace_content(content.into());
    }

    /// Number of content changes so far.
    #[must_use]
    pub fn mutation_count(&self) -> u64 {
        self.mutations.get()
    }

    /// Listeners attached to `event`.
    #[must_use]
    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners.count(event)
    }

    fn replace_content(&self, next: String) {
        if *self.content.borrow() == next {
            return;
        }
        *self.content.borrow_mut() = next;
        self.mutations.set(self.mutations.get() + 1);
        self.listeners.emit(MUTATION_EVENT);
    }
}

impl Widget for Panel {
    fn kind(&self) -> WidgetKind {
        WidgetKind::Other
    }

    fn get(&self, property: &str) -> Option<Value> {
        (property == CONTENT).then(|| Value::Text(self.content()))
    }

    fn set(&self, property: &str, value: Value) {
        if property == CONTENT {
            self.replace_content(value.to_text());
        } else {
            tracing::debug!(property, "panel ignores unknown property");
        }
    }

    fn add_listener(&self, event: &str, listener: Listener) {
        self.listeners.add(event, listener);
    }

    fn remove_listener(&self, event: &str, listener: &Listener) -> bool {
        self.listeners.remove(event, listener)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ziptie_core::NativeEvent;

    #[test]
    fn render_and_set_both_mutate() {
        let panel = Panel::new();
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        panel.add_listener(
            MUTATION_EVENT,
            Rc::new(move |_: &NativeEvent| counter.set(counter.get() + 1)),
        );
        panel.render("<p>a</p>");
        panel.set(CONTENT, Value::from("<p>b</p>"));
        assert_eq!(hits.get(), 2);
        assert_eq!(panel.mutation_count(), 2);
    }

    #[test]
    fn unchanged_content_does_not_mutate() {
        let panel = Panel::new();
        panel.render("same");
        panel.render("same");
        panel.set(CONTENT, Value::from("same"));
        assert_eq!(panel.mutation_count(), 1);
        assert_eq!(panel.get(CONTENT), Some(Value::from("same")));
        assert_eq!(panel.get("value"), None);
    }
}
