#![forbid(unsafe_code)]

//! Half-fasteners: one direction of a binding.
//!
//! A *publisher* half observes an endpoint property (accessor hook on models,
//! native listener on widgets) and relays every change onto the endpoint's
//! channel, `"{identity}/{property}:change"`. A *subscriber* callback is then
//! attached to that channel; it writes relayed values into the mirror
//! endpoint.
//!
//! # Invariants
//!
//! 1. The subscriber writes only when the mirror's current value is not
//!    [`same_as`](crate::Value::same_as) the relayed one. This guard is the
//!    only thing that stops two fastened endpoints from publishing into each
//!    other forever.
//! 2. Writing a widget property does not fire its native event, so after a
//!    subscriber writes into a widget it re-publishes on the widget's own
//!    channel; bindings chained off that widget stay consistent.
//! 3. Callbacks hold the bus and the mirror endpoint weakly; once either is
//!    dropped, relays through them become no-ops.

use std::rc::{Rc, Weak};

use serde::Serialize;

use crate::bus::{ChannelBus, ChannelCallback};
use crate::config::ContentFallback;
use crate::endpoint::Endpoint;
use crate::error::FastenError;
use crate::identity::{EndpointId, identify};
use crate::interceptor::{remove_hook, try_install_hook};
use crate::model::WriteHook;
use crate::value::Value;
use crate::widget::{ChangeHook, Listener, NativeEvent, remove_listener, resolve, try_install_listener};

/// Build the relay channel name for an endpoint property.
#[must_use]
pub fn channel_name(endpoint: EndpointId, property: &str) -> String {
    format!("{endpoint}/{property}:change")
}

/// How a half observes its endpoint.
#[derive(Clone)]
pub(crate) enum Interception {
    Accessor(WriteHook),
    Listener {
        event: Option<&'static str>,
        listener: Listener,
    },
}

/// Observation and relay state for one side of one binding.
#[derive(Clone)]
pub struct HalfFastener {
    endpoint: Endpoint,
    property: String,
    channel: String,
    interception: Interception,
    subscription: Option<ChannelCallback>,
}

impl std::fmt::Debug for HalfFastener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HalfFastener")
            .field("endpoint", &self.endpoint.flavor())
            .field("property", &self.property)
            .field("channel", &self.channel)
            .field("event", &self.event())
            .field("subscribed", &self.is_subscribed())
            .finish()
    }
}

impl HalfFastener {
    pub(crate) fn hooked(endpoint: Endpoint, property: &str, on_write: WriteHook) -> Self {
        Self {
            endpoint,
            property: property.to_owned(),
            channel: String::new(),
            interception: Interception::Accessor(on_write),
            subscription: None,
        }
    }

    pub(crate) fn listening(
        endpoint: Endpoint,
        property: &str,
        event: Option<&'static str>,
        listener: Listener,
    ) -> Self {
        Self {
            endpoint,
            property: property.to_owned(),
            channel: String::new(),
            interception: Interception::Listener { event, listener },
            subscription: None,
        }
    }

    /// The observed endpoint.
    #[must_use]
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Effective (possibly widget-resolved) property name.
    #[must_use]
    pub fn property(&self) -> &str {
        &self.property
    }

    /// Relay channel; empty until the half is turned into a publisher.
    #[must_use]
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Native event listened to, for widget halves.
    #[must_use]
    pub fn event(&self) -> Option<&'static str> {
        match &self.interception {
            Interception::Accessor(_) => None,
            Interception::Listener { event, .. } => *event,
        }
    }

    /// Installed write hook, for model halves.
    #[must_use]
    pub fn write_hook(&self) -> Option<&WriteHook> {
        match &self.interception {
            Interception::Accessor(hook) => Some(hook),
            Interception::Listener { .. } => None,
        }
    }

    /// Native listener, for widget halves.
    #[must_use]
    pub fn listener(&self) -> Option<Listener> {
        match &self.interception {
            Interception::Accessor(_) => None,
            Interception::Listener { listener, .. } => Some(Rc::clone(listener)),
        }
    }

    /// Whether a subscriber callback is attached to this half's channel.
    #[must_use]
    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    /// Whether the half observes nothing (untracked content widget).
    #[must_use]
    pub fn is_listenerless(&self) -> bool {
        matches!(self.interception, Interception::Listener { event: None, .. })
    }

    /// Serializable summary.
    #[must_use]
    pub fn info(&self) -> HalfInfo {
        HalfInfo {
            endpoint: identify(Some(&self.endpoint)),
            flavor: self.endpoint.flavor(),
            property: self.property.clone(),
            channel: self.channel.clone(),
            event: self.event(),
            subscribed: self.is_subscribed(),
        }
    }
}

/// Diagnostic view of a [`HalfFastener`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HalfInfo {
    pub endpoint: EndpointId,
    pub flavor: &'static str,
    pub property: String,
    pub channel: String,
    pub event: Option<&'static str>,
    pub subscribed: bool,
}

/// Outcome of releasing one half during `snip`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HalfRelease {
    pub endpoint: EndpointId,
    pub property: String,
    /// Hook or listener removal succeeded (was attempted, for listeners).
    pub interception_removed: bool,
    /// The subscriber callback was found on the channel and removed.
    pub unsubscribed: bool,
    /// The half never had a listener to remove.
    pub listenerless: bool,
}

fn relay(bus: &Weak<dyn ChannelBus>, channel: &str, value: &Value) {
    if let Some(bus) = bus.upgrade() {
        bus.publish(channel, value);
    }
}

/// Observe `endpoint` and relay its changes onto its channel.
///
/// Widgets ignore `property`: the property resolved from their kind wins.
/// Models require `property` to name an own property.
pub fn create_publisher(
    bus: &Rc<dyn ChannelBus>,
    endpoint: &Endpoint,
    property: Option<&str>,
    fallback: ContentFallback,
) -> Result<HalfFastener, FastenError> {
    let id = identify(Some(endpoint));
    let weak_bus = Rc::downgrade(bus);
    let half = match endpoint {
        Endpoint::Model(_) => {
            let property = property.unwrap_or_default();
            let channel = channel_name(id, property);
            let relay_channel = channel.clone();
            let on_write: WriteHook =
                Rc::new(move |value: &Value, _: &str| relay(&weak_bus, &relay_channel, value));
            let mut half = try_install_hook(Some(endpoint), property, on_write)?;
            half.channel = channel;
            half
        }
        Endpoint::Widget(widget) => {
            let observation = resolve(widget.kind(), fallback);
            if let Some(requested) = property.filter(|p| *p != observation.property) {
                tracing::debug!(
                    endpoint = id.get(),
                    requested,
                    resolved = observation.property,
                    "widget kind overrides requested property"
                );
            }
            let channel = channel_name(id, observation.property);
            let relay_channel = channel.clone();
            let on_change: ChangeHook =
                Rc::new(move |value: &Value, _: &str, _: &NativeEvent| {
                    relay(&weak_bus, &relay_channel, value);
                });
            let mut half = try_install_listener(Some(endpoint), on_change, fallback)?;
            half.channel = channel;
            half
        }
    };
    tracing::debug!(
        endpoint = id.get(),
        flavor = endpoint.flavor(),
        channel = %half.channel,
        "publisher half created"
    );
    Ok(half)
}

/// Subscribe `target.property` to `source`'s channel and record the
/// subscription on `source`.
pub fn create_subscriber(
    bus: &Rc<dyn ChannelBus>,
    target: &Endpoint,
    property: &str,
    mut source: HalfFastener,
) -> HalfFastener {
    let republish = target
        .has_native_events()
        .then(|| channel_name(identify(Some(target)), property));
    let weak_bus = Rc::downgrade(bus);
    let weak_mirror = target.downgrade();
    let mirror_property = property.to_owned();
    let callback: ChannelCallback = Rc::new(move |incoming: &Value| {
        let Some(mirror) = weak_mirror.upgrade() else {
            return;
        };
        if mirror
            .read(&mirror_property)
            .is_some_and(|current| current.same_as(incoming))
        {
            tracing::trace!(
                property = %mirror_property,
                "mirror already holds value; write suppressed"
            );
            return;
        }
        mirror.write(&mirror_property, incoming.clone());
        if let Some(channel) = &republish {
            relay(&weak_bus, channel, incoming);
        }
    });
    bus.subscribe(&source.channel, Rc::clone(&callback));
    tracing::debug!(
        channel = %source.channel,
        target = identify(Some(target)).get(),
        property,
        "subscriber attached"
    );
    source.subscription = Some(callback);
    source
}

/// Undo a publisher half: remove its hook or listener, then its subscription.
///
/// Best effort; nothing is rolled back when a step fails.
pub(crate) fn release(bus: &dyn ChannelBus, half: &HalfFastener) -> HalfRelease {
    let endpoint = identify(Some(&half.endpoint));
    let (interception_removed, listenerless) = match &half.interception {
        Interception::Accessor(_) => (remove_hook(Some(&half.endpoint), &half.property), false),
        Interception::Listener {
            event: Some(event),
            listener,
        } => (remove_listener(Some(&half.endpoint), Some(event), listener), false),
        Interception::Listener { event: None, .. } => {
            tracing::warn!(
                endpoint = endpoint.get(),
                property = %half.property,
                "listener-less half; nothing to detach"
            );
            (false, true)
        }
    };
    let unsubscribed = half
        .subscription
        .as_ref()
        .is_some_and(|cb| bus.unsubscribe(&half.channel, cb));
    HalfRelease {
        endpoint,
        property: half.property.clone(),
        interception_removed,
        unsubscribed,
        listenerless,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::LocalBus;
    use crate::model::Model;
    use crate::test_support::MockWidget;
    use crate::widget::{CHECKED, CLICK_EVENT, Widget, WidgetKind};

    fn local_bus() -> (Rc<LocalBus>, Rc<dyn ChannelBus>) {
        let bus = Rc::new(LocalBus::new());
        let dyn_bus: Rc<dyn ChannelBus> = bus.clone();
        (bus, dyn_bus)
    }

    #[test]
    fn channel_name_format() {
        assert_eq!(channel_name(EndpointId::new(7), "name"), "7/name:change");
    }

    #[test]
    fn model_publisher_relays_writes() {
        let (local, bus) = local_bus();
        let model = Model::new().with("name", "Ada");
        let e = Endpoint::from(model.clone());
        let half = create_publisher(&bus, &e, Some("name"), ContentFallback::default()).unwrap();
        let id = identify(Some(&e));
        assert_eq!(half.channel(), format!("{id}/name:change"));

        let seen = Rc::new(std::cell::RefCell::new(Vec::new()));
        let seen_clone = Rc::clone(&seen);
        local.subscribe(
            half.channel(),
            Rc::new(move |v: &Value| seen_clone.borrow_mut().push(v.clone())),
        );
        model.set("name", "Lovelace");
        assert_eq!(*seen.borrow(), vec![Value::from("Lovelace")]);
    }

    #[test]
    fn model_publisher_requires_property() {
        let (_, bus) = local_bus();
        let e = Endpoint::from(Model::new().with("name", "Ada"));
        assert!(matches!(
            create_publisher(&bus, &e, None, ContentFallback::default()),
            Err(FastenError::MissingProperty { .. })
        ));
        assert!(matches!(
            create_publisher(&bus, &e, Some("nope"), ContentFallback::default()),
            Err(FastenError::MissingProperty { .. })
        ));
    }

    #[test]
    fn widget_publisher_resolves_kind() {
        let (_, bus) = local_bus();
        let w = MockWidget::new(WidgetKind::Checkbox);
        let e = Endpoint::widget(Rc::clone(&w));
        let half = create_publisher(&bus, &e, Some("done"), ContentFallback::default()).unwrap();
        assert_eq!(half.property(), CHECKED);
        assert_eq!(half.event(), Some(CLICK_EVENT));
        assert!(half.channel().ends_with("/checked:change"));
        assert_eq!(w.listener_count(CLICK_EVENT), 1);
    }

    #[test]
    fn subscriber_guard_suppresses_equal_writes() {
        let (local, bus) = local_bus();
        let source = Endpoint::from(Model::new().with("x", 0));
        let target_model = Model::new().with("y", 5);
        let target = Endpoint::from(target_model.clone());
        let half = create_publisher(&bus, &source, Some("x"), ContentFallback::default()).unwrap();
        let half = create_subscriber(&bus, &target, "y", half);
        assert!(half.is_subscribed());

        let calls = Rc::new(std::cell::Cell::new(0u32));
        let calls_clone = Rc::clone(&calls);
        crate::interceptor::install_hook(
            Some(&target),
            "y",
            Rc::new(move |_: &Value, _: &str| calls_clone.set(calls_clone.get() + 1)),
        )
        .unwrap();

        local.publish(half.channel(), &Value::Int(5));
        assert_eq!(calls.get(), 0);
        local.publish(half.channel(), &Value::Int(6));
        assert_eq!(calls.get(), 1);
        assert_eq!(target_model.get("y"), Some(Value::Int(6)));
    }

    #[test]
    fn widget_subscriber_republishes() {
        let (local, bus) = local_bus();
        let source = Endpoint::from(Model::new().with("done", false));
        let w = MockWidget::new(WidgetKind::Checkbox);
        let target = Endpoint::widget(Rc::clone(&w));
        let half = create_publisher(&bus, &source, Some("done"), ContentFallback::default()).unwrap();
        let half = create_subscriber(&bus, &target, CHECKED, half);

        let widget_channel = channel_name(identify(Some(&target)), CHECKED);
        let relayed = Rc::new(std::cell::RefCell::new(Vec::new()));
        let relayed_clone = Rc::clone(&relayed);
        local.subscribe(
            &widget_channel,
            Rc::new(move |v: &Value| relayed_clone.borrow_mut().push(v.clone())),
        );

        source.write("done", true);
        assert_eq!(w.get(CHECKED), Some(Value::Bool(true)));
        assert_eq!(*relayed.borrow(), vec![Value::Bool(true)]);
        assert_eq!(w.emitted(), 0);
        drop(half);
    }

    #[test]
    fn release_undoes_everything() {
        let (local, bus) = local_bus();
        let model = Model::new().with("x", 1);
        let source = Endpoint::from(model.clone());
        let target = Endpoint::from(Model::new().with("y", 1));
        let half = create_publisher(&bus, &source, Some("x"), ContentFallback::default()).unwrap();
        let half = create_subscriber(&bus, &target, "y", half);
        assert_eq!(local.subscriber_count(half.channel()), 1);

        let report = release(&*local, &half);
        assert!(report.interception_removed);
        assert!(report.unsubscribed);
        assert!(!report.listenerless);
        assert!(!model.is_hooked("x"));
        assert_eq!(local.subscriber_count(half.channel()), 0);

        let again = release(&*local, &half);
        assert!(!again.interception_removed);
        assert!(!again.unsubscribed);
    }

    #[test]
    fn release_flags_listenerless_content() {
        let (local, bus) = local_bus();
        let w = MockWidget::new(WidgetKind::Other);
        let e = Endpoint::widget(w);
        let half = create_publisher(&bus, &e, None, ContentFallback::Untracked).unwrap();
        assert!(half.is_listenerless());
        let report = release(&*local, &half);
        assert!(report.listenerless);
        assert!(!report.interception_removed);
    }
}
