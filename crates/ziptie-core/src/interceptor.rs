#![forbid(unsafe_code)]

//! Property interceptor for plain model endpoints.
//!
//! Installing a hook moves the property's current value into a private
//! backing slot and routes every later write through a callback. Removing the
//! hook puts a plain slot holding the last observed value back in place.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Invalid endpoint | absent endpoint, or a widget | hook refused |
//! | Missing property | model does not own the property | hook refused |
//! | Double teardown | property not hooked | `remove_hook` returns `false` |
//!
//! Hooking a property twice replaces the previous hook and keeps the backing
//! value; one `remove_hook` then clears it for every holder.

use std::rc::Rc;

use crate::endpoint::Endpoint;
use crate::error::FastenError;
use crate::half::HalfFastener;
use crate::identity::identify;
use crate::model::WriteHook;
use crate::value::Value;

/// Hook writes to `endpoint.property`.
///
/// Returns `None` when a precondition is violated; callers must not register
/// a fastener half in that case.
pub fn install_hook(
    endpoint: Option<&Endpoint>,
    property: &str,
    on_write: WriteHook,
) -> Option<HalfFastener> {
    try_install_hook(endpoint, property, on_write).ok()
}

/// [`install_hook`] with the failure reason.
pub fn try_install_hook(
    endpoint: Option<&Endpoint>,
    property: &str,
    on_write: WriteHook,
) -> Result<HalfFastener, FastenError> {
    let Some(endpoint) = endpoint else {
        return Err(FastenError::InvalidEndpoint);
    };
    let Endpoint::Model(model) = endpoint else {
        // Widgets are observed through their native events.
        return Err(FastenError::InvalidEndpoint);
    };
    if !model.install_accessor(property, Rc::clone(&on_write)) {
        let id = identify(Some(endpoint));
        tracing::warn!(
            endpoint = id.get(),
            property,
            "cannot hook a property the model does not own"
        );
        return Err(FastenError::MissingProperty {
            endpoint: id,
            property: property.to_owned(),
        });
    }
    tracing::trace!(property, "accessor hook installed");
    Ok(HalfFastener::hooked(endpoint.clone(), property, on_write))
}

/// Restore `endpoint.property` to a plain slot.
///
/// Returns `false` when nothing is hooked there.
pub fn remove_hook(endpoint: Option<&Endpoint>, property: &str) -> bool {
    try_remove_hook(endpoint, property).is_ok()
}

/// [`remove_hook`] returning the restored value.
pub fn try_remove_hook(endpoint: Option<&Endpoint>, property: &str) -> Result<Value, FastenError> {
    let Some(endpoint) = endpoint else {
        return Err(FastenError::InvalidEndpoint);
    };
    let Endpoint::Model(model) = endpoint else {
        return Err(FastenError::InvalidEndpoint);
    };
    match model.remove_accessor(property) {
        Some(value) => {
            tracing::trace!(property, "accessor hook removed");
            Ok(value)
        }
        None => {
            let id = identify(Some(endpoint));
            tracing::warn!(endpoint = id.get(), property, "hook already torn down");
            Err(FastenError::DoubleTeardown {
                endpoint: id,
                property: property.to_owned(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Model;
    use crate::test_support::MockWidget;
    use crate::widget::WidgetKind;
    use std::cell::RefCell;

    fn recording_hook() -> (WriteHook, Rc<RefCell<Vec<(Value, String)>>>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let log_clone = Rc::clone(&log);
        let hook: WriteHook = Rc::new(move |v: &Value, prop: &str| {
            log_clone.borrow_mut().push((v.clone(), prop.to_owned()));
        });
        (hook, log)
    }

    #[test]
    fn hook_observes_writes() {
        let model = Model::new().with("name", "Ada");
        let e = Endpoint::from(model.clone());
        let (hook, log) = recording_hook();
        let half = install_hook(Some(&e), "name", hook).unwrap();
        assert_eq!(half.property(), "name");
        assert!(half.endpoint().ptr_eq(&e));

        model.set("name", "Lovelace");
        assert_eq!(model.get("name"), Some(Value::from("Lovelace")));
        assert_eq!(
            *log.borrow(),
            vec![(Value::from("Lovelace"), "name".to_string())]
        );
    }

    #[test]
    fn missing_property_is_refused() {
        let e = Endpoint::from(Model::new().with("name", "Ada"));
        let (hook, _) = recording_hook();
        let err = try_install_hook(Some(&e), "age", hook).unwrap_err();
        assert!(matches!(err, FastenError::MissingProperty { ref property, .. } if property == "age"));
        assert!(!e.as_model().unwrap().has_own("age"));
    }

    #[test]
    fn absent_endpoint_is_refused() {
        let (hook, _) = recording_hook();
        assert!(install_hook(None, "x", hook).is_none());
    }

    #[test]
    fn widgets_defer_to_listener_adapter() {
        let w = MockWidget::new(WidgetKind::TextInput);
        let e = Endpoint::widget(w);
        let (hook, _) = recording_hook();
        assert_eq!(
            try_install_hook(Some(&e), "value", hook).unwrap_err(),
            FastenError::InvalidEndpoint
        );
    }

    #[test]
    fn removal_round_trips_to_plain_slot() {
        let model = Model::new().with("x", 1).with("y", 2);
        let e = Endpoint::from(model.clone());
        let (hook, log) = recording_hook();
        install_hook(Some(&e), "x", hook).unwrap();
        model.set("x", 10);

        assert_eq!(try_remove_hook(Some(&e), "x").unwrap(), Value::Int(10));
        assert!(!model.is_hooked("x"));
        assert_eq!(model.get("x"), Some(Value::Int(10)));
        assert_eq!(model.keys(), vec!["x".to_string(), "y".to_string()]);

        model.set("x", 11);
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn double_teardown_is_reported() {
        let e = Endpoint::from(Model::new().with("x", 1));
        let (hook, _) = recording_hook();
        install_hook(Some(&e), "x", hook).unwrap();
        assert!(remove_hook(Some(&e), "x"));
        assert!(!remove_hook(Some(&e), "x"));
        assert!(matches!(
            try_remove_hook(Some(&e), "x"),
            Err(FastenError::DoubleTeardown { .. })
        ));
        assert_eq!(e.read("x"), Some(Value::Int(1)));
    }

    #[test]
    fn rehook_keeps_backing_value() {
        let model = Model::new().with("x", 1);
        let e = Endpoint::from(model.clone());
        let (first, first_log) = recording_hook();
        let (second, second_log) = recording_hook();
        install_hook(Some(&e), "x", first).unwrap();
        model.set("x", 2);
        install_hook(Some(&e), "x", second).unwrap();
        assert_eq!(model.get("x"), Some(Value::Int(2)));
        model.set("x", 3);
        assert_eq!(first_log.borrow().len(), 1);
        assert_eq!(second_log.borrow().len(), 1);
    }
}
