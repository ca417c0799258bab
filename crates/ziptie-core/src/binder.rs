#![forbid(unsafe_code)]

//! The fasten/snip protocol.
//!
//! [`Binder`] owns the channel bus handle and the fastener registry. `fasten`
//! builds two publisher halves, cross-wires their subscribers, and registers
//! the pair; `snip` looks the pair up again and releases both halves.
//!
//! # Argument normalization
//!
//! Each side is a [`Side`]: an endpoint with an optional property. Passing a
//! bare `&Endpoint` omits the property, which binds a widget's natural
//! property; a model side always needs one.
//!
//! ```
//! use ziptie_core::{Binder, Endpoint, Model, Value};
//!
//! let model = Endpoint::from(Model::new().with("name", "Ada"));
//! let view = Endpoint::from(Model::new().with("text", ""));
//! let binder = Binder::new();
//!
//! assert!(binder.fasten((&model, "name"), (&view, "text")));
//! model.write("name", "Lovelace");
//! assert_eq!(view.read("text"), Some(Value::from("Lovelace")));
//!
//! assert!(binder.snip(&model, &view));
//! assert!(!binder.snip(&model, &view));
//! ```
//!
//! # Failure Modes
//!
//! - A side whose publisher cannot be built fails the whole `fasten`; a half
//!   already built for the other side is released first, so no partial
//!   fastener is ever left behind. A hook that an existing fastener had on
//!   that property is put back.
//! - Fastening a pair twice without `snip` overwrites the registry entry; the
//!   earlier halves stay wired (logged at `warn`).
//! - `snip` is best effort: a half that fails to release does not stop the
//!   other one, and nothing is rolled back.

use std::cell::RefCell;
use std::io;
use std::rc::Rc;

use crate::bus::{ChannelBus, LocalBus};
use crate::config::{BinderConfig, Reconcile};
use crate::endpoint::Endpoint;
use crate::error::FastenError;
use crate::evidence::{BindingEvent, EvidenceSink};
use crate::half::{HalfFastener, create_publisher, create_subscriber, release};
use crate::identity::{EndpointId, identify, peek};
use crate::model::WriteHook;
use crate::registry::{Fastener, FastenerInfo, FastenerKey, FastenerRegistry, SnipReport};

/// One side of a `fasten` call: an endpoint and an optional property.
#[derive(Debug, Clone, Copy)]
pub struct Side<'a> {
    pub endpoint: &'a Endpoint,
    pub property: Option<&'a str>,
}

impl<'a> From<&'a Endpoint> for Side<'a> {
    fn from(endpoint: &'a Endpoint) -> Self {
        Self {
            endpoint,
            property: None,
        }
    }
}

impl<'a> From<(&'a Endpoint, &'a str)> for Side<'a> {
    fn from((endpoint, property): (&'a Endpoint, &'a str)) -> Self {
        Self {
            endpoint,
            property: Some(property),
        }
    }
}

impl<'a> From<(&'a Endpoint, Option<&'a str>)> for Side<'a> {
    fn from((endpoint, property): (&'a Endpoint, Option<&'a str>)) -> Self {
        Self { endpoint, property }
    }
}

/// Creates and removes bidirectional property bindings.
pub struct Binder {
    bus: Rc<dyn ChannelBus>,
    registry: RefCell<FastenerRegistry>,
    config: BinderConfig,
    evidence: Option<EvidenceSink>,
}

impl std::fmt::Debug for Binder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Binder")
            .field("fasteners", &self.registry.borrow().len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Default for Binder {
    fn default() -> Self {
        Self::new()
    }
}

impl Binder {
    /// Binder over a private [`LocalBus`] with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_bus(Rc::new(LocalBus::new()))
    }

    /// Binder over a caller-supplied bus with default configuration.
    #[must_use]
    pub fn with_bus<B: ChannelBus + 'static>(bus: Rc<B>) -> Self {
        Self {
            bus,
            registry: RefCell::new(FastenerRegistry::new()),
            config: BinderConfig::default(),
            evidence: None,
        }
    }

    /// Binder over a private [`LocalBus`] with `config`.
    ///
    /// Fails only if the evidence sink cannot be opened.
    pub fn with_config(config: BinderConfig) -> io::Result<Self> {
        Self::with_bus_and_config(Rc::new(LocalBus::new()), config)
    }

    /// Binder over a caller-supplied bus with `config`.
    pub fn with_bus_and_config<B: ChannelBus + 'static>(
        bus: Rc<B>,
        config: BinderConfig,
    ) -> io::Result<Self> {
        let evidence = EvidenceSink::from_config(&config.evidence)?;
        Ok(Self {
            bus,
            registry: RefCell::new(FastenerRegistry::new()),
            config,
            evidence,
        })
    }

    /// Attach an already-open evidence sink.
    #[must_use]
    pub fn with_evidence_sink(mut self, sink: EvidenceSink) -> Self {
        self.evidence = Some(sink);
        self
    }

    /// The bus used to relay changes.
    #[must_use]
    pub fn bus(&self) -> &Rc<dyn ChannelBus> {
        &self.bus
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &BinderConfig {
        &self.config
    }

    /// Mirror two endpoint properties. Returns `false` if either side cannot
    /// be observed.
    pub fn fasten<'a>(&self, first: impl Into<Side<'a>>, second: impl Into<Side<'a>>) -> bool {
        match self.try_fasten(first, second) {
            Ok(_) => true,
            Err(err) => {
                self.reject("fasten", &err);
                false
            }
        }
    }

    /// [`fasten`](Self::fasten) returning the registry key or the failure.
    pub fn try_fasten<'a>(
        &self,
        first: impl Into<Side<'a>>,
        second: impl Into<Side<'a>>,
    ) -> Result<FastenerKey, FastenError> {
        let first = first.into();
        let second = second.into();
        let fallback = self.config.content_fallback;

        // A live fastener may already hook the first property; rollback must
        // hand it back rather than strip it.
        let prior_hook = first
            .endpoint
            .as_model()
            .zip(first.property)
            .and_then(|(model, property)| model.hook(property));
        let first_half = create_publisher(&self.bus, first.endpoint, first.property, fallback)?;
        let second_half =
            match create_publisher(&self.bus, second.endpoint, second.property, fallback) {
                Ok(half) => half,
                Err(err) => {
                    self.roll_back(&first_half, prior_hook);
                    return Err(err);
                }
            };

        // Each endpoint subscribes to the other's channel.
        let first_property = first_half.property().to_owned();
        let second_property = second_half.property().to_owned();
        let first_half =
            create_subscriber(&self.bus, second.endpoint, &second_property, first_half);
        let second_half =
            create_subscriber(&self.bus, first.endpoint, &first_property, second_half);

        let key = FastenerKey::new(
            identify(Some(first.endpoint)),
            identify(Some(second.endpoint)),
        );
        let fastener = Fastener {
            first: first_half,
            second: second_half,
        };
        let info = fastener.info(key);
        let winner = match self.config.reconcile {
            Reconcile::None => None,
            Reconcile::FirstWins => Some(fastener.first.clone()),
            Reconcile::SecondWins => Some(fastener.second.clone()),
        };
        let replaced = self.registry.borrow_mut().insert(key, fastener).is_some();
        if replaced {
            tracing::warn!(%key, "pair fastened again without snip; previous halves remain wired");
        }

        let reconciled = winner.is_some_and(|half| self.reconcile(&half));
        tracing::debug!(
            %key,
            first = %info.first.channel,
            second = %info.second.channel,
            reconciled,
            "fastened"
        );
        self.record(&BindingEvent::Fasten {
            fastener: info,
            replaced,
            reconciled,
        });
        Ok(key)
    }

    /// Undo a publisher half built by a `fasten` that then failed.
    fn roll_back(&self, half: &HalfFastener, prior_hook: Option<WriteHook>) {
        match (prior_hook, half.endpoint().as_model()) {
            (Some(hook), Some(model)) => {
                model.install_accessor(half.property(), hook);
                tracing::debug!(
                    property = half.property(),
                    "failed fasten restored the existing hook"
                );
            }
            _ => {
                release(&*self.bus, half);
            }
        }
    }

    /// Relay the winning side's current value to its mirror.
    fn reconcile(&self, winner: &HalfFastener) -> bool {
        let Some(value) = winner.endpoint().read(winner.property()) else {
            return false;
        };
        tracing::debug!(channel = winner.channel(), "reconciling initial values");
        self.bus.publish(winner.channel(), &value);
        true
    }

    /// Remove the binding between two endpoints. Returns `false` if the pair
    /// was not fastened.
    pub fn snip(&self, first: &Endpoint, second: &Endpoint) -> bool {
        match self.try_snip(first, second) {
            Ok(_) => true,
            Err(err) => {
                self.reject("snip", &err);
                false
            }
        }
    }

    /// [`snip`](Self::snip) returning what was released.
    pub fn try_snip(&self, first: &Endpoint, second: &Endpoint) -> Result<SnipReport, FastenError> {
        let key = FastenerKey::new(
            peek(first).unwrap_or(EndpointId::NONE),
            peek(second).unwrap_or(EndpointId::NONE),
        );
        let fastener = self
            .registry
            .borrow_mut()
            .remove(&key)
            .ok_or(FastenError::UnknownFastener { key })?;

        let report = SnipReport {
            key,
            first: release(&*self.bus, &fastener.first),
            second: release(&*self.bus, &fastener.second),
        };
        if !report.is_clean() {
            tracing::warn!(
                %key,
                listenerless = report.listenerless(),
                "snip released the pair only partially"
            );
        }
        tracing::debug!(%key, "snipped");
        self.record(&BindingEvent::Snip {
            report: report.clone(),
        });
        Ok(report)
    }

    /// Whether the two endpoints are currently fastened.
    #[must_use]
    pub fn contains(&self, first: &Endpoint, second: &Endpoint) -> bool {
        match (peek(first), peek(second)) {
            (Some(a), Some(b)) => self.registry.borrow().contains(&FastenerKey::new(a, b)),
            _ => false,
        }
    }

    /// Snapshot of the live registry, in key order.
    #[must_use]
    pub fn fasteners(&self) -> Vec<FastenerInfo> {
        self.registry.borrow().snapshot()
    }

    /// Run `f` over a snapshot of the registry.
    ///
    /// The snapshot is taken before `f` runs, so `f` may fasten or snip
    /// through this binder; those changes are not visible to it.
    pub fn with_registry<R>(&self, f: impl FnOnce(&FastenerRegistry) -> R) -> R {
        let snapshot = self.registry.borrow().clone();
        f(&snapshot)
    }

    /// Number of live fasteners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.registry.borrow().len()
    }

    /// Whether no fasteners are live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registry.borrow().is_empty()
    }

    fn reject(&self, op: &'static str, err: &FastenError) {
        tracing::debug!(op, kind = err.kind(), %err, "operation rejected");
        self.record(&BindingEvent::Rejected {
            op,
            kind: err.kind(),
            reason: err.to_string(),
        });
    }

    fn record(&self, event: &BindingEvent) {
        let Some(sink) = &self.evidence else {
            return;
        };
        if let Err(err) = sink.record(event) {
            tracing::warn!(%err, "failed to write evidence line");
        }
    }
}
