#![forbid(unsafe_code)]

//! Core: endpoint identity, interception, relay, and the fasten/snip protocol.
//!
//! # Role in Ziptie
//! `ziptie-core` owns everything needed to keep one property of one endpoint
//! mirrored onto one property of another, in both directions, until the pair
//! is snipped. Concrete widgets live in `ziptie-widgets`; the `ziptie` crate
//! re-exports both and adds the single-pair model/view binder.
//!
//! # Primary responsibilities
//! - **Identity**: stable integer ids for endpoints, kept off the objects.
//! - **Interception**: write hooks on model properties, event listeners on
//!   widgets.
//! - **Relay**: a synchronous [`ChannelBus`] carrying changes between halves,
//!   with an equality guard that ends the feedback loop after one echo.
//! - **Registry**: at most one [`Fastener`] per unordered endpoint pair.
//!
//! # How it fits in the system
//! A host builds a [`Binder`] (optionally over its own bus), wraps its data
//! holders as [`Model`]s and its controls as [`Widget`]s, and calls
//! [`Binder::fasten`] / [`Binder::snip`]. Everything runs on one thread;
//! endpoints are `Rc`-shared and no operation blocks.

pub mod binder;
pub mod bus;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod evidence;
pub mod half;
pub mod identity;
pub mod interceptor;
pub mod model;
pub mod registry;
pub mod value;
pub mod widget;

#[cfg(test)]
mod test_support;

pub use binder::{Binder, Side};
pub use bus::{ChannelBus, ChannelCallback, LocalBus, same_callback};
pub use config::{BinderConfig, ContentFallback, Reconcile};
pub use endpoint::Endpoint;
pub use error::FastenError;
pub use evidence::{BindingEvent, EvidenceConfig, EvidenceDestination, EvidenceSink};
pub use half::{
    HalfFastener, HalfInfo, HalfRelease, channel_name, create_publisher, create_subscriber,
};
pub use identity::{EndpointId, identify, peek, tracked_count};
pub use interceptor::{install_hook, remove_hook, try_install_hook, try_remove_hook};
pub use model::{Model, WriteHook};
pub use registry::{Fastener, FastenerInfo, FastenerKey, FastenerRegistry, SnipReport};
pub use value::Value;
pub use widget::{
    CHECKED, CLICK_EVENT, CONTENT, ChangeHook, INPUT_EVENT, Listener, MUTATION_EVENT,
    NativeEvent, Observation, VALUE, Widget, WidgetKind, install_listener, remove_listener,
    resolve, same_listener, try_install_listener,
};
