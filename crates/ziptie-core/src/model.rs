#![forbid(unsafe_code)]

//! Plain data-holder endpoints.
//!
//! # Design
//!
//! [`Model`] stores named properties in shared, reference-counted storage
//! (`Rc<RefCell<..>>`). Cloning a `Model` creates a new handle to the **same**
//! properties. Each property slot is either plain data or *hooked*: a hooked
//! slot keeps its value in a private backing cell next to a write hook, so a
//! write stores the value first and then invokes the hook.
//!
//! Hook installation and removal are driven by the property interceptor
//! (`crate::interceptor`); callers only ever see `get`/`set`.
//!
//! # Invariants
//!
//! 1. Reads of a hooked property return its backing value.
//! 2. A write to a hooked property stores the value before the hook runs, so
//!    the hook (and anything it triggers) observes the new value.
//! 3. The hook runs outside the internal borrow: hooks may read and write any
//!    model, including this one, without panicking.
//! 4. Hooked properties stay enumerable through [`Model::keys`].

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::value::Value;

/// Callback invoked after a hooked property has been written.
///
/// Receives the new value and the property name.
pub type WriteHook = Rc<dyn Fn(&Value, &str)>;

enum Slot {
    Plain(Value),
    Hooked(Accessor),
}

impl Slot {
    fn value(&self) -> &Value {
        match self {
            Self::Plain(v) => v,
            Self::Hooked(accessor) => &accessor.backing,
        }
    }
}

struct Accessor {
    backing: Value,
    on_write: WriteHook,
}

/// Shared interior for [`Model`].
pub(crate) struct ModelInner {
    /// Properties in insertion order.
    slots: Vec<(String, Slot)>,
}

impl ModelInner {
    fn position(&self, property: &str) -> Option<usize> {
        self.slots.iter().position(|(name, _)| name == property)
    }
}

/// A plain endpoint holding named properties.
pub struct Model {
    inner: Rc<RefCell<ModelInner>>,
}

impl Clone for Model {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl Default for Model {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        let mut map = f.debug_map();
        for (name, slot) in &inner.slots {
            map.entry(name, slot.value());
        }
        map.finish()
    }
}

impl Model {
    /// Create an empty model.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(ModelInner { slots: Vec::new() })),
        }
    }

    /// Builder-style property initialiser.
    #[must_use]
    pub fn with(self, property: impl Into<String>, value: impl Into<Value>) -> Self {
        self.inner
            .borrow_mut()
            .slots
            .push((property.into(), Slot::Plain(value.into())));
        self
    }

    /// Current value of an own property.
    #[must_use]
    pub fn get(&self, property: &str) -> Option<Value> {
        let inner = self.inner.borrow();
        inner
            .position(property)
            .map(|i| inner.slots[i].1.value().clone())
    }

    /// Write a property, creating it if absent.
    ///
    /// If the property is hooked, the backing value is stored and the hook is
    /// invoked afterwards, even when the value is unchanged.
    pub fn set(&self, property: &str, value: impl Into<Value>) {
        let value = value.into();
        let fire = {
            let mut inner = self.inner.borrow_mut();
            match inner.position(property) {
                Some(i) => match &mut inner.slots[i].1 {
                    Slot::Plain(current) => {
                        *current = value;
                        None
                    }
                    Slot::Hooked(accessor) => {
                        accessor.backing = value.clone();
                        Some((Rc::clone(&accessor.on_write), value))
                    }
                },
                None => {
                    inner
                        .slots
                        .push((property.to_owned(), Slot::Plain(value)));
                    None
                }
            }
        };
        if let Some((hook, value)) = fire {
            hook(&value, property);
        }
    }

    /// Whether the model owns a property with this name.
    #[must_use]
    pub fn has_own(&self, property: &str) -> bool {
        self.inner.borrow().position(property).is_some()
    }

    /// Whether the property currently carries a write hook.
    #[must_use]
    pub fn is_hooked(&self, property: &str) -> bool {
        let inner = self.inner.borrow();
        inner
            .position(property)
            .is_some_and(|i| matches!(inner.slots[i].1, Slot::Hooked(_)))
    }

    /// Property names in insertion order, hooked or not.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.inner
            .borrow()
            .slots
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Number of own properties.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.borrow().slots.len()
    }

    /// Whether the model has no properties.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().slots.is_empty()
    }

    /// Move an own property's value into a backing cell guarded by `on_write`.
    ///
    /// Re-hooking an already hooked property replaces its hook and keeps the
    /// backing value. Returns `false` if the property is not owned.
    pub(crate) fn install_accessor(&self, property: &str, on_write: WriteHook) -> bool {
        let mut inner = self.inner.borrow_mut();
        let Some(i) = inner.position(property) else {
            return false;
        };
        let slot = &mut inner.slots[i].1;
        let backing = slot.value().clone();
        *slot = Slot::Hooked(Accessor { backing, on_write });
        true
    }

    /// The write hook currently installed on `property`, if any.
    pub(crate) fn hook(&self, property: &str) -> Option<WriteHook> {
        let inner = self.inner.borrow();
        let i = inner.position(property)?;
        match &inner.slots[i].1 {
            Slot::Hooked(accessor) => Some(Rc::clone(&accessor.on_write)),
            Slot::Plain(_) => None,
        }
    }

        /// Restore a hooked property to a plain slot holding its last value.
    ///
    /// Returns the restored value, or `None` if the property was not hooked.
    pub(crate) fn remove_accessor(&self, property: &str) -> Option<Value> {
        let mut inner = self.inner.borrow_mut();
        let i = inner.position(property)?;
        let slot = &mut inner.slots[i].1;
        if !matches!(slot, Slot::Hooked(_)) {
            return None;
        }
        let value = slot.value().clone();
        *slot = Slot::Plain(value.clone());
        Some(value)
    }

    pub(crate) fn downgrade(&self) -> Weak<RefCell<ModelInner>> {
        Rc::downgrade(&self.inner)
    }

    pub(crate) fn addr(&self) -> usize {
        Rc::as_ptr(&self.inner).cast::<()>() as usize
    }

    pub(crate) fn from_inner(inner: Rc<RefCell<ModelInner>>) -> Self {
        Self { inner }
    }
}
