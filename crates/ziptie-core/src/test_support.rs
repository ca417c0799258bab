#![forbid(unsafe_code)]

//! Minimal in-crate widget used by unit tests.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::value::Value;
use crate::widget::{Listener, NativeEvent, Widget, WidgetKind, same_listener};

pub(crate) struct MockWidget {
    kind: WidgetKind,
    props: RefCell<FxHashMap<String, Value>>,
    listeners: RefCell<Vec<(String, Listener)>>,
    emitted: Cell<usize>,
}

impl MockWidget {
    pub(crate) fn new(kind: WidgetKind) -> Rc<Self> {
        Rc::new(Self {
            kind,
            props: RefCell::new(FxHashMap::default()),
            listeners: RefCell::new(Vec::new()),
            emitted: Cell::new(0),
        })
    }

    /// Fire a native event as if the user interacted.
    pub(crate) fn emit(&self, event: &str) {
        self.emitted.set(self.emitted.get() + 1);
        let targets: Vec<Listener> = self
            .listeners
            .borrow()
            .iter()
            .filter(|(name, _)| name == event)
            .map(|(_, l)| Rc::clone(l))
            .collect();
        let ev = NativeEvent::new(event);
        for l in targets {
            l(&ev);
        }
    }

    pub(crate) fn emitted(&self) -> usize {
        self.emitted.get()
    }

    pub(crate) fn listener_count(&self, event: &str) -> usize {
        self.listeners
            .borrow()
            .iter()
            .filter(|(name, _)| name == event)
            .count()
    }
}

impl Widget for MockWidget {
    fn kind(&self) -> WidgetKind {
        self.kind
    }

    fn get(&self, property: &str) -> Option<Value> {
        self.props.borrow().get(property).cloned()
    }

    fn set(&self, property: &str, value: Value) {
        self.props.borrow_mut().insert(property.to_owned(), value);
    }

    fn add_listener(&self, event: &str, listener: Listener) {
        self.listeners.borrow_mut().push((event.to_owned(), listener));
    }

    fn remove_listener(&self, event: &str, listener: &Listener) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(name, l)| !(name == event && same_listener(l, listener)));
        listeners.len() != before
    }
}
