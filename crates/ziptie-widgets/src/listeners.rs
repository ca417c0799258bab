#![forbid(unsafe_code)]

//! Per-widget listener table.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use ziptie_core::{Listener, NativeEvent, same_listener};

/// Listeners keyed by event name, in attachment order.
#[derive(Default)]
pub struct ListenerTable {
    entries: RefCell<Vec<(String, Listener)>>,
}

impl fmt::Debug for ListenerTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerTable")
            .field("listeners", &self.entries.borrow().len())
            .finish()
    }
}

impl ListenerTable {
    /// Empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach `listener` to `event`. The same listener may be attached twice.
    pub fn add(&self, event: &str, listener: Listener) {
        self.entries.borrow_mut().push((event.to_owned(), listener));
    }

    /// Detach every registration of `listener` on `event`.
    pub fn remove(&self, event: &str, listener: &Listener) -> bool {
        let mut entries = self.entries.borrow_mut();
        let before = entries.len();
        entries.retain(|(name, existing)| !(name == event && same_listener(existing, listener)));
        entries.len() != before
    }

    /// Number of listeners attached to `event`.
    #[must_use]
    pub fn count(&self, event: &str) -> usize {
        self.entries
            .borrow()
            .iter()
            .filter(|(name, _)| name == event)
            .count()
    }

    /// Deliver `event` to its listeners.
    ///
    /// Listeners are snapshotted first; ones added or removed during delivery
    /// take effect from the next emit.
    pub fn emit(&self, event: &str) -> usize {
        let targets: Vec<Listener> = self
            .entries
            .borrow()
            .iter()
            .filter(|(name, _)| name == event)
            .map(|(_, listener)| Rc::clone(listener))
            .collect();
        tracing::trace!(event, listeners = targets.len(), "emitting native event");
        let native = NativeEvent::new(event);
        for listener in &targets {
            listener(&native);
        }
        targets.len()
    }
}
