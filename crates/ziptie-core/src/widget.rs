#![forbid(unsafe_code)]

//! Native-event widgets and the listener adapter that observes them.
//!
//! Widgets already announce user interaction through native events, so they
//! are observed by attaching a listener instead of installing an accessor
//! hook. Which event to listen to, and which property carries the value, is
//! decided by the widget's declared [`WidgetKind`]:
//!
//! | Kind | Event | Property |
//! |------|-------|----------|
//! | `Checkbox`, `Radio` | `click` | `checked` (bool) |
//! | `TextInput`, `TextArea` | `input` | `value` (text) |
//! | anything else | `mutation`, or none when untracked | `content` |
//!
//! Programmatic [`Widget::set`] calls do not fire `click`/`input`; only user
//! interaction does. Content widgets fire `mutation` whenever their rendered
//! content changes.

use std::fmt;
use std::rc::Rc;

use crate::config::ContentFallback;
use crate::endpoint::Endpoint;
use crate::error::FastenError;
use crate::half::HalfFastener;
use crate::value::Value;

/// Activation event of checkbox-like controls.
pub const CLICK_EVENT: &str = "click";
/// Edit event of text inputs.
pub const INPUT_EVENT: &str = "input";
/// Content-change event of content-only widgets.
pub const MUTATION_EVENT: &str = "mutation";

/// Boolean state of checkbox-like controls.
pub const CHECKED: &str = "checked";
/// Text of inputs.
pub const VALUE: &str = "value";
/// Rendered content of everything else.
pub const CONTENT: &str = "content";

/// Native event delivered to widget listeners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeEvent {
    /// Event name, e.g. `"click"`.
    pub name: String,
}

impl NativeEvent {
    /// Create an event with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Native listener. Identity is the identity of the `Rc` allocation.
pub type Listener = Rc<dyn Fn(&NativeEvent)>;

/// Change callback fed by a widget listener: new value, property, event.
pub type ChangeHook = Rc<dyn Fn(&Value, &str, &NativeEvent)>;

/// Whether two listeners are the same allocation.
#[must_use]
pub fn same_listener(a: &Listener, b: &Listener) -> bool {
    std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
}

/// Declared kind of a widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WidgetKind {
    Checkbox,
    Radio,
    TextInput,
    TextArea,
    /// Any widget observed through its rendered content.
    Other,
}

impl WidgetKind {
    /// Whether this kind toggles a boolean on activation.
    #[must_use]
    pub const fn is_checkable(self) -> bool {
        matches!(self, Self::Checkbox | Self::Radio)
    }

    /// Whether this kind edits text.
    #[must_use]
    pub const fn is_text_entry(self) -> bool {
        matches!(self, Self::TextInput | Self::TextArea)
    }
}

/// An endpoint with native event subscription.
pub trait Widget {
    /// Declared kind, used to pick the observed event and property.
    fn kind(&self) -> WidgetKind;

    /// Read a property.
    fn get(&self, property: &str) -> Option<Value>;

    /// Programmatic write. Must not fire `click` or `input`.
    fn set(&self, property: &str, value: Value);

    /// Attach `listener` to `event`.
    fn add_listener(&self, event: &str, listener: Listener);

    /// Detach `listener` from `event`. Returns whether it was attached.
    fn remove_listener(&self, event: &str, listener: &Listener) -> bool;
}

/// The (event, property) pair a widget is observed through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Observation {
    /// Native event to listen to; `None` when the widget cannot be listened to.
    pub event: Option<&'static str>,
    /// Property carrying the value.
    pub property: &'static str,
}

/// Resolve how a widget of `kind` is observed.
#[must_use]
pub fn resolve(kind: WidgetKind, fallback: ContentFallback) -> Observation {
    if kind.is_checkable() {
        Observation {
            event: Some(CLICK_EVENT),
            property: CHECKED,
        }
    } else if kind.is_text_entry() {
        Observation {
            event: Some(INPUT_EVENT),
            property: VALUE,
        }
    } else {
        let event = match fallback {
            ContentFallback::MutationObserver => Some(MUTATION_EVENT),
            ContentFallback::Untracked => None,
        };
        Observation {
            event,
            property: CONTENT,
        }
    }
}

/// Attach a change listener to a widget endpoint.
///
/// Returns `None` for absent or non-widget endpoints.
pub fn install_listener(
    endpoint: Option<&Endpoint>,
    on_change: ChangeHook,
    fallback: ContentFallback,
) -> Option<HalfFastener> {
    try_install_listener(endpoint, on_change, fallback).ok()
}

/// [`install_listener`] with the failure reason.
pub fn try_install_listener(
    endpoint: Option<&Endpoint>,
    on_change: ChangeHook,
    fallback: ContentFallback,
) -> Result<HalfFastener, FastenError> {
    let Some(endpoint) = endpoint else {
        return Err(FastenError::InvalidEndpoint);
    };
    let Endpoint::Widget(widget) = endpoint else {
        return Err(FastenError::InvalidEndpoint);
    };
    let observation = resolve(widget.kind(), fallback);
    let property = observation.property;
    let source = Rc::downgrade(widget);
    let listener: Listener = Rc::new(move |event: &NativeEvent| {
        let Some(widget) = source.upgrade() else {
            return;
        };
        let value = widget.get(property).unwrap_or_default();
        on_change(&value, property, event);
    });

    match observation.event {
        Some(event) => widget.add_listener(event, Rc::clone(&listener)),
        None => tracing::warn!(
            property,
            "content widget has no native event; its changes will not be observed"
        ),
    }

    Ok(HalfFastener::listening(
        endpoint.clone(),
        property,
        observation.event,
        listener,
    ))
}

/// Detach `listener` from `event` on a widget endpoint.
///
/// Reports whether removal was attempted, not whether the listener was
/// attached: native removal is idempotent. Returns `false` for non-widgets
/// and for listener-less halves (`event == None`).
pub fn remove_listener(endpoint: Option<&Endpoint>, event: Option<&str>, listener: &Listener) -> bool {
    let (Some(Endpoint::Widget(widget)), Some(event)) = (endpoint, event) else {
        return false;
    };
    let attached = widget.remove_listener(event, listener);
    tracing::trace!(event, attached, "listener removed");
    true
}

impl fmt::Display for WidgetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Checkbox => "checkbox",
            Self::Radio => "radio",
            Self::TextInput => "text-input",
            Self::TextArea => "text-area",
            Self::Other => "other",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Model;
    use crate::test_support::MockWidget;
    use std::cell::RefCell;

    #[test]
    fn checkbox_resolves_to_click_checked() {
        let obs = resolve(WidgetKind::Checkbox, ContentFallback::default());
        assert_eq!(obs.event, Some(CLICK_EVENT));
        assert_eq!(obs.property, CHECKED);
        assert_eq!(resolve(WidgetKind::Radio, ContentFallback::Untracked), obs);
    }

    #[test]
    fn text_kinds_resolve_to_input_value() {
        for kind in [WidgetKind::TextInput, WidgetKind::TextArea] {
            let obs = resolve(kind, ContentFallback::default());
            assert_eq!(obs.event, Some(INPUT_EVENT));
            assert_eq!(obs.property, VALUE);
        }
    }

    #[test]
    fn content_kind_depends_on_fallback() {
        let observed = resolve(WidgetKind::Other, ContentFallback::MutationObserver);
        assert_eq!(observed.event, Some(MUTATION_EVENT));
        assert_eq!(observed.property, CONTENT);
        let untracked = resolve(WidgetKind::Other, ContentFallback::Untracked);
        assert_eq!(untracked.event, None);
        assert_eq!(untracked.property, CONTENT);
    }

    #[test]
    fn listener_reports_current_value() {
        let w = MockWidget::new(WidgetKind::Checkbox);
        let e = Endpoint::widget(Rc::clone(&w));
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = Rc::clone(&seen);
        let hook: ChangeHook = Rc::new(move |v: &Value, prop: &str, ev: &NativeEvent| {
            seen_clone
                .borrow_mut()
                .push((v.clone(), prop.to_owned(), ev.name.clone()));
        });
        let half = install_listener(Some(&e), hook, ContentFallback::default()).unwrap();
        assert_eq!(half.property(), CHECKED);
        assert_eq!(half.event(), Some(CLICK_EVENT));

        w.set(CHECKED, Value::Bool(true));
        w.emit(CLICK_EVENT);
        assert_eq!(
            *seen.borrow(),
            vec![(Value::Bool(true), CHECKED.to_string(), CLICK_EVENT.to_string())]
        );
    }

    #[test]
    fn models_are_rejected() {
        let e = Endpoint::from(Model::new().with("x", 1));
        let hook: ChangeHook = Rc::new(|_: &Value, _: &str, _: &NativeEvent| {});
        let err = try_install_listener(Some(&e), hook, ContentFallback::default()).unwrap_err();
        assert_eq!(err, FastenError::InvalidEndpoint);
    }

    #[test]
    fn absent_endpoint_is_rejected() {
        let hook: ChangeHook = Rc::new(|_: &Value, _: &str, _: &NativeEvent| {});
        assert!(install_listener(None, hook, ContentFallback::default()).is_none());
    }

    #[test]
    fn remove_listener_is_idempotent() {
        let w = MockWidget::new(WidgetKind::TextInput);
        let e = Endpoint::widget(Rc::clone(&w));
        let hook: ChangeHook = Rc::new(|_: &Value, _: &str, _: &NativeEvent| {});
        let half = install_listener(Some(&e), hook, ContentFallback::default()).unwrap();
        let listener = half.listener().unwrap();
        assert_eq!(w.listener_count(INPUT_EVENT), 1);
        assert!(remove_listener(Some(&e), Some(INPUT_EVENT), &listener));
        assert_eq!(w.listener_count(INPUT_EVENT), 0);
        assert!(remove_listener(Some(&e), Some(INPUT_EVENT), &listener));
        assert!(!remove_listener(Some(&e), None, &listener));
    }

    #[test]
    fn untracked_content_attaches_nothing() {
        let w = MockWidget::new(WidgetKind::Other);
        let e = Endpoint::widget(Rc::clone(&w));
        let hook: ChangeHook = Rc::new(|_: &Value, _: &str, _: &NativeEvent| {});
        let half = install_listener(Some(&e), hook, ContentFallback::Untracked).unwrap();
        assert_eq!(half.event(), None);
        assert_eq!(w.listener_count(MUTATION_EVENT), 0);
    }
}
