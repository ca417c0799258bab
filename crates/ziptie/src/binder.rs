#![forbid(unsafe_code)]

//! Single-pair model/view binder.
//!
//! [`Ziptie`] ties one model property to one widget property through an
//! explicitly named native event. Unlike [`ziptie_core::Binder`] it does not
//! resolve the event from the widget kind, needs no channel bus, and treats
//! the model as the source of truth when it is created.
//!
//! ```
//! use std::rc::Rc;
//! use ziptie::{Model, ModelSide, ViewSide, Ziptie, ZiptieOptions};
//! use ziptie::widgets::TextInput;
//!
//! let person = Model::new().with("name", "Ada");
//! let input = TextInput::new();
//! let tie = Ziptie::new(ZiptieOptions {
//!     model: Some(ModelSide::new(person.clone(), "name")),
//!     view: Some(ViewSide::new(input.clone(), "input", "value")),
//! })
//! .unwrap();
//!
//! assert_eq!(input.value(), "Ada");
//! input.type_text(" Lovelace");
//! assert_eq!(person.get("name").unwrap().to_text(), "Ada Lovelace");
//! assert!(tie.snip());
//! ```

use std::cell::Cell;
use std::fmt;
use std::rc::{Rc, Weak};

use ziptie_core::{
    Endpoint, Listener, Model, NativeEvent, Value, Widget, WriteHook, remove_hook,
    try_install_hook,
};

/// Failure to construct a [`Ziptie`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZiptieError {
    /// No model side was given.
    MissingModel,
    /// No view side was given.
    MissingView,
}

impl fmt::Display for ZiptieError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingModel => write!(f, "invalid options: missing model"),
            Self::MissingView => write!(f, "invalid options: missing view"),
        }
    }
}

impl std::error::Error for ZiptieError {}

/// The model half: a property of a [`Model`].
#[derive(Debug, Clone)]
pub struct ModelSide {
    pub target: Model,
    pub property: String,
}

impl ModelSide {
    /// Bind `property` of `target`.
    #[must_use]
    pub fn new(target: Model, property: impl Into<String>) -> Self {
        Self {
            target,
            property: property.into(),
        }
    }
}

/// The view half: a widget property refreshed on a native event.
#[derive(Clone)]
pub struct ViewSide {
    pub target: Rc<dyn Widget>,
    pub event: String,
    pub property: String,
}

impl ViewSide {
    /// Bind `property` of `target`, reading it back whenever `event` fires.
    #[must_use]
    pub fn new<W: Widget + 'static>(
        target: Rc<W>,
        event: impl Into<String>,
        property: impl Into<String>,
    ) -> Self {
        Self {
            target,
            event: event.into(),
            property: property.into(),
        }
    }
}

impl fmt::Debug for ViewSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewSide")
            .field("kind", &self.target.kind())
            .field("event", &self.event)
            .field("property", &self.property)
            .finish()
    }
}

/// Constructor arguments. Both sides are required.
#[derive(Debug, Clone, Default)]
pub struct ZiptieOptions {
    pub model: Option<ModelSide>,
    pub view: Option<ViewSide>,
}

/// A live model/view binding.
pub struct Ziptie {
    model: ModelSide,
    view: ViewSide,
    model_hooked: bool,
    view_listener: Option<Listener>,
    snipped: Cell<bool>,
}

impl fmt::Debug for Ziptie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ziptie")
            .field("model", &self.model)
            .field("view", &self.view)
            .field("model_wired", &self.is_model_wired())
            .field("view_wired", &self.is_view_wired())
            .field("snipped", &self.snipped.get())
            .finish()
    }
}

impl Ziptie {
    /// Wire both sides and copy the model value into the view.
    ///
    /// A model property the model does not own yet is created as
    /// [`Value::Null`] before it is hooked. A side that cannot be wired (an
    /// empty property name, or a view with an empty event) is skipped; see
    /// [`is_model_wired`](Self::is_model_wired) and
    /// [`is_view_wired`](Self::is_view_wired).
    pub fn new(options: ZiptieOptions) -> Result<Self, ZiptieError> {
        let model = options.model.ok_or(ZiptieError::MissingModel)?;
        let view = options.view.ok_or(ZiptieError::MissingView)?;

        let model_hooked = wire_model(&model, &view);
        let view_listener = wire_view(&model, &view);
        tracing::debug!(
            model_property = %model.property,
            view_event = %view.event,
            view_property = %view.property,
            model_hooked,
            view_wired = view_listener.is_some(),
            "ziptie created"
        );

        let tie = Self {
            model,
            view,
            model_hooked,
            view_listener,
            snipped: Cell::new(false),
        };
        tie.sync_view_from_model();
        Ok(tie)
    }

    /// Whether model writes are pushed into the view.
    #[must_use]
    pub fn is_model_wired(&self) -> bool {
        self.model_hooked && !self.snipped.get()
    }

    /// Whether view events are pushed into the model.
    #[must_use]
    pub fn is_view_wired(&self) -> bool {
        self.view_listener.is_some() && !self.snipped.get()
    }

    /// The model side as given.
    #[must_use]
    pub fn model(&self) -> &ModelSide {
        &self.model
    }

    /// The view side as given.
    #[must_use]
    pub fn view(&self) -> &ViewSide {
        &self.view
    }

    /// Detach the view listener and restore the model property.
    ///
    /// Returns `false` if already snipped.
    pub fn snip(&self) -> bool {
        if self.snipped.replace(true) {
            return false;
        }
        if let Some(listener) = &self.view_listener {
            self.view
                .target
                .remove_listener(&self.view.event, listener);
        }
        if self.model_hooked {
            let endpoint = Endpoint::from(self.model.target.clone());
            if !remove_hook(Some(&endpoint), &self.model.property) {
                tracing::warn!(
                    model_property = %self.model.property,
                    "model hook was already removed by someone else"
                );
            }
        }
        tracing::debug!(model_property = %self.model.property, "ziptie snipped");
        true
    }

    fn sync_view_from_model(&self) {
        if self.view.property.is_empty() {
            return;
        }
        let Some(value) = self.model.target.get(&self.model.property) else {
            return;
        };
        push(&*self.view.target, &self.view.property, &value);
    }
}

fn wire_model(model: &ModelSide, view: &ViewSide) -> bool {
    if model.property.is_empty() || view.property.is_empty() {
        return false;
    }
    if !model.target.has_own(&model.property) {
        model.target.set(&model.property, Value::Null);
    }
    let widget: Weak<dyn Widget> = Rc::downgrade(&view.target);
    let property = view.property.clone();
    let hook: WriteHook = Rc::new(move |value: &Value, _: &str| {
        if let Some(widget) = widget.upgrade() {
            push(&*widget, &property, value);
        }
    });
    let endpoint = Endpoint::from(model.target.clone());
    try_install_hook(Some(&endpoint), &model.property, hook).is_ok()
}

fn wire_view(model: &ModelSide, view: &ViewSide) -> Option<Listener> {
    if view.event.is_empty() || view.property.is_empty() || model.property.is_empty() {
        return None;
    }
    let widget: Weak<dyn Widget> = Rc::downgrade(&view.target);
    let view_property = view.property.clone();
    let target = model.target.clone();
    let model_property = model.property.clone();
    let listener: Listener = Rc::new(move |_: &NativeEvent| {
        let Some(widget) = widget.upgrade() else {
            return;
        };
        let value = widget.get(&view_property).unwrap_or_default();
        if target
            .get(&model_property)
            .is_some_and(|current| current.same_as(&value))
        {
            return;
        }
        target.set(&model_property, value);
    });
    view.target.add_listener(&view.event, Rc::clone(&listener));
    Some(listener)
}

fn push(widget: &dyn Widget, property: &str, value: &Value) {
    if widget
        .get(property)
        .is_some_and(|current| current.same_as(value))
    {
        tracing::trace!(property, "view already holds value; write suppressed");
        return;
    }
    widget.set(property, value.clone());
}
