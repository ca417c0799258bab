#![forbid(unsafe_code)]

//! Publish/subscribe channel bus that relays changes between half-fasteners.
//!
//! The fastening engine only needs three operations, captured by
//! [`ChannelBus`]. Hosts may supply their own bus; [`LocalBus`] is the
//! in-process implementation used by default.
//!
//! # Delivery model
//!
//! Delivery is synchronous: `publish` calls every current subscriber of the
//! channel, in subscription order, before returning. There is no queue and no
//! message persistence. Subscribers may publish, subscribe, or unsubscribe
//! from inside a delivery; the subscriber list is snapshotted before the
//! callbacks run, so such changes take effect from the next `publish`.
//!
//! Channel names are arbitrary strings and need no registration.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::value::Value;

/// Subscriber callback. Identity is the identity of the `Rc` allocation.
pub type ChannelCallback = Rc<dyn Fn(&Value)>;

/// The three operations the engine consumes from a channel bus.
pub trait ChannelBus {
    /// Deliver `value` to the channel's current subscribers.
    fn publish(&self, channel: &str, value: &Value);

    /// Register `callback` on `channel`.
    fn subscribe(&self, channel: &str, callback: ChannelCallback);

    /// Remove `callback` from `channel`. Returns whether it was registered.
    fn unsubscribe(&self, channel: &str, callback: &ChannelCallback) -> bool;
}

/// Whether two callbacks are the same allocation.
#[must_use]
pub fn same_callback(a: &ChannelCallback, b: &ChannelCallback) -> bool {
    std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
}

/// Synchronous in-process [`ChannelBus`].
#[derive(Default)]
pub struct LocalBus {
    channels: RefCell<FxHashMap<String, Vec<ChannelCallback>>>,
    published: Cell<u64>,
    delivered: Cell<u64>,
    depth: Cell<usize>,
    max_depth: Cell<usize>,
}

impl fmt::Debug for LocalBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalBus")
            .field("channels", &self.channels.borrow().len())
            .field("published", &self.published.get())
            .field("delivered", &self.delivered.get())
            .field("max_depth", &self.max_depth.get())
            .finish()
    }
}

impl LocalBus {
    /// Create an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of `publish` calls.
    #[must_use]
    pub fn published_count(&self) -> u64 {
        self.published.get()
    }

    /// Total number of callback invocations.
    #[must_use]
    pub fn delivered_count(&self) -> u64 {
        self.delivered.get()
    }

    /// Deepest nesting of `publish` calls observed so far.
    ///
    /// A publish made from inside a subscriber counts one level deeper.
    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.max_depth.get()
    }

    /// Reset the publish/deliver counters and depth watermark.
    pub fn reset_counters(&self) {
        self.published.set(0);
        self.delivered.set(0);
        self.max_depth.set(0);
    }

    /// Number of callbacks registered on `channel`.
    #[must_use]
    pub fn subscriber_count(&self, channel: &str) -> usize {
        self.channels.borrow().get(channel).map_or(0, Vec::len)
    }

    /// Names of channels that currently have subscribers, sorted.
    #[must_use]
    pub fn channels(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .channels
            .borrow()
            .iter()
            .filter(|(_, subs)| !subs.is_empty())
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        names
    }
}

impl ChannelBus for LocalBus {
    fn publish(&self, channel: &str, value: &Value) {
        self.published.set(self.published.get() + 1);
        let callbacks: Vec<ChannelCallback> = match self.channels.borrow().get(channel) {
            Some(subs) => subs.clone(),
            None => return,
        };

        let depth = self.depth.get() + 1;
        self.depth.set(depth);
        self.max_depth.set(self.max_depth.get().max(depth));
        for cb in &callbacks {
            self.delivered.set(self.delivered.get() + 1);
            cb(value);
        }
        self.depth.set(depth - 1);
    }

    fn subscribe(&self, channel: &str, callback: ChannelCallback) {
        self.channels
            .borrow_mut()
            .entry(channel.to_owned())
            .or_default()
            .push(callback);
    }

    fn unsubscribe(&self, channel: &str, callback: &ChannelCallback) -> bool {
        let mut channels = self.channels.borrow_mut();
        let Some(subs) = channels.get_mut(channel) else {
            return false;
        };
        let before = subs.len();
        subs.retain(|existing| !same_callback(existing, callback));
        let removed = subs.len() != before;
        if subs.is_empty() {
            channels.remove(channel);
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder() -> (ChannelCallback, Rc<RefCell<Vec<Value>>>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let log_clone = Rc::clone(&log);
        let cb: ChannelCallback = Rc::new(move |v: &Value| log_clone.borrow_mut().push(v.clone()));
        (cb, log)
    }

    #[test]
    fn publish_reaches_subscribers() {
        let bus = LocalBus::new();
        let (cb, log) = recorder();
        bus.subscribe("1/x:change", cb);
        bus.publish("1/x:change", &Value::from(3));
        assert_eq!(*log.borrow(), vec![Value::Int(3)]);
        assert_eq!(bus.published_count(), 1);
        assert_eq!(bus.delivered_count(), 1);
    }

    #[test]
    fn publish_to_unknown_channel_is_noop() {
        let bus = LocalBus::new();
        bus.publish("nobody", &Value::Null);
        assert_eq!(bus.delivered_count(), 0);
        assert_eq!(bus.max_depth(), 0);
    }

    #[test]
    fn unsubscribe_by_identity() {
        let bus = LocalBus::new();
        let (a, log_a) = recorder();
        let (b, log_b) = recorder();
        bus.subscribe("c", Rc::clone(&a));
        bus.subscribe("c", Rc::clone(&b));
        assert!(bus.unsubscribe("c", &a));
        assert!(!bus.unsubscribe("c", &a));
        bus.publish("c", &Value::from(true));
        assert!(log_a.borrow().is_empty());
        assert_eq!(log_b.borrow().len(), 1);
    }

    #[test]
    fn empty_channels_are_dropped() {
        let bus = LocalBus::new();
        let (a, _) = recorder();
        bus.subscribe("c", Rc::clone(&a));
        assert_eq!(bus.channels(), vec!["c".to_string()]);
        bus.unsubscribe("c", &a);
        assert!(bus.channels().is_empty());
        assert_eq!(bus.subscriber_count("c"), 0);
    }

    #[test]
    fn delivery_order_is_subscription_order() {
        let bus = LocalBus::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        for tag in ['A', 'B', 'C'] {
            let log = Rc::clone(&log);
            bus.subscribe("c", Rc::new(move |_: &Value| log.borrow_mut().push(tag)));
        }
        bus.publish("c", &Value::Null);
        assert_eq!(*log.borrow(), vec!['A', 'B', 'C']);
    }

    #[test]
    fn reentrant_publish_is_allowed() {
        let bus = Rc::new(LocalBus::new());
        let (sink, log) = recorder();
        bus.subscribe("second", sink);
        let relay_bus = Rc::downgrade(&bus);
        bus.subscribe(
            "first",
            Rc::new(move |v: &Value| {
                if let Some(bus) = relay_bus.upgrade() {
                    bus.publish("second", v);
                }
            }),
        );
        bus.publish("first", &Value::from("hop"));
        assert_eq!(*log.borrow(), vec![Value::from("hop")]);
        assert_eq!(bus.max_depth(), 2);
    }

    #[test]
    fn unsubscribe_during_delivery_takes_effect_next_publish() {
        let bus = Rc::new(LocalBus::new());
        let (cb, log) = recorder();
        bus.subscribe("c", Rc::clone(&cb));
        let weak_bus = Rc::downgrade(&bus);
        let victim = Rc::clone(&cb);
        bus.subscribe(
            "c",
            Rc::new(move |_: &Value| {
                if let Some(bus) = weak_bus.upgrade() {
                    bus.unsubscribe("c", &victim);
                }
            }),
        );
        bus.publish("c", &Value::Int(1));
        bus.publish("c", &Value::Int(2));
        assert_eq!(*log.borrow(), vec![Value::Int(1)]);
    }
}
