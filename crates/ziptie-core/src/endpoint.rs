#![forbid(unsafe_code)]

//! Endpoints: either side of a fastening.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::model::{Model, ModelInner};
use crate::value::Value;
use crate::widget::Widget;

/// A bindable value container.
///
/// Plain [`Model`]s are observed through accessor hooks; [`Widget`]s expose
/// native event subscription and are observed through listeners.
#[derive(Clone)]
pub enum Endpoint {
    /// Plain data holder.
    Model(Model),
    /// Interactive widget with native events.
    Widget(Rc<dyn Widget>),
}

impl Endpoint {
    /// Wrap a concrete widget.
    #[must_use]
    pub fn widget<W: Widget + 'static>(widget: Rc<W>) -> Self {
        Self::Widget(widget)
    }

    /// Whether the endpoint provides native event subscription.
    #[must_use]
    pub fn has_native_events(&self) -> bool {
        matches!(self, Self::Widget(_))
    }

    /// `"model"` or `"widget"`, for logs and diagnostics.
    #[must_use]
    pub const fn flavor(&self) -> &'static str {
        match self {
            Self::Model(_) => "model",
            Self::Widget(_) => "widget",
        }
    }

    /// Read a property.
    #[must_use]
    pub fn read(&self, property: &str) -> Option<Value> {
        match self {
            Self::Model(model) => model.get(property),
            Self::Widget(widget) => widget.get(property),
        }
    }

    /// Write a property.
    ///
    /// On a model this goes through any installed hook; on a widget it is a
    /// programmatic write and does not fire native events.
    pub fn write(&self, property: &str, value: impl Into<Value>) {
        match self {
            Self::Model(model) => model.set(property, value),
            Self::Widget(widget) => widget.set(property, value.into()),
        }
    }

    /// The model, if this is one.
    #[must_use]
    pub fn as_model(&self) -> Option<&Model> {
        match self {
            Self::Model(model) => Some(model),
            Self::Widget(_) => None,
        }
    }

    /// The widget, if this is one.
    #[must_use]
    pub fn as_widget(&self) -> Option<&Rc<dyn Widget>> {
        match self {
            Self::Model(_) => None,
            Self::Widget(widget) => Some(widget),
        }
    }

    /// Whether both handles refer to the same endpoint.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.addr() == other.addr()
    }

    pub(crate) fn addr(&self) -> usize {
        match self {
            Self::Model(model) => model.addr(),
            Self::Widget(widget) => Rc::as_ptr(widget).cast::<()>() as usize,
        }
    }

    pub(crate) fn downgrade(&self) -> WeakEndpoint {
        match self {
            Self::Model(model) => WeakEndpoint::Model(model.downgrade()),
            Self::Widget(widget) => WeakEndpoint::Widget(Rc::downgrade(widget)),
        }
    }
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Model(model) => f.debug_tuple("Model").field(model).finish(),
            Self::Widget(widget) => f
                .debug_struct("Widget")
                .field("kind", &widget.kind())
                .finish_non_exhaustive(),
        }
    }
}

impl From<Model> for Endpoint {
    fn from(model: Model) -> Self {
        Self::Model(model)
    }
}

impl From<Rc<dyn Widget>> for Endpoint {
    fn from(widget: Rc<dyn Widget>) -> Self {
        Self::Widget(widget)
    }
}

/// Non-owning handle to an endpoint.
#[derive(Clone)]
pub(crate) enum WeakEndpoint {
    Model(Weak<RefCell<ModelInner>>),
    Widget(Weak<dyn Widget>),
}

impl WeakEndpoint {
    pub(crate) fn is_alive(&self) -> bool {
        match self {
            Self::Model(weak) => weak.strong_count() > 0,
            Self::Widget(weak) => weak.strong_count() > 0,
        }
    }

    pub(crate) fn upgrade(&self) -> Option<Endpoint> {
        match self {
            Self::Model(weak) => weak.upgrade().map(|inner| Endpoint::Model(Model::from_inner(inner))),
            Self::Widget(weak) => weak.upgrade().map(Endpoint::Widget),
        }
    }
}
