#![forbid(unsafe_code)]

//! Fastener registry keyed by the unordered pair of endpoint identities.
//!
//! # Invariants
//!
//! 1. A key is canonical: the smaller identity comes first, so `(a, b)` and
//!    `(b, a)` name the same entry.
//! 2. At most one fastener per key. Registering a pair again overwrites the
//!    entry and hands the previous fastener back to the caller; its hooks,
//!    listeners and subscriptions stay live unless the caller releases them.
//! 3. Iteration order is key order, so snapshots are deterministic.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::half::{HalfFastener, HalfInfo, HalfRelease};
use crate::identity::EndpointId;

/// Canonical pairing key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FastenerKey {
    low: EndpointId,
    high: EndpointId,
}

impl FastenerKey {
    /// Build the key for a pair, in either order.
    #[must_use]
    pub fn new(a: EndpointId, b: EndpointId) -> Self {
        if a <= b {
            Self { low: a, high: b }
        } else {
            Self { low: b, high: a }
        }
    }

    /// Smaller identity.
    #[must_use]
    pub const fn low(self) -> EndpointId {
        self.low
    }

    /// Larger identity.
    #[must_use]
    pub const fn high(self) -> EndpointId {
        self.high
    }
}

impl fmt::Display for FastenerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.low, self.high)
    }
}

impl Serialize for FastenerKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One complete bidirectional binding.
#[derive(Debug, Clone)]
pub struct Fastener {
    /// Half observing the first endpoint; its subscriber writes the second.
    pub first: HalfFastener,
    /// Half observing the second endpoint; its subscriber writes the first.
    pub second: HalfFastener,
}

impl Fastener {
    /// Serializable summary.
    #[must_use]
    pub fn info(&self, key: FastenerKey) -> FastenerInfo {
        FastenerInfo {
            key,
            first: self.first.info(),
            second: self.second.info(),
        }
    }
}

/// Diagnostic view of a registered fastener.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FastenerInfo {
    pub key: FastenerKey,
    pub first: HalfInfo,
    pub second: HalfInfo,
}

/// Outcome of a successful `snip`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnipReport {
    pub key: FastenerKey,
    pub first: HalfRelease,
    pub second: HalfRelease,
}

impl SnipReport {
    /// Whether both halves released their hook/listener and subscription.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        [&self.first, &self.second]
            .iter()
            .all(|half| half.interception_removed && half.unsubscribed)
    }

    /// Number of halves that had no listener to detach.
    #[must_use]
    pub fn listenerless(&self) -> usize {
        [&self.first, &self.second]
            .iter()
            .filter(|half| half.listenerless)
            .count()
    }
}

/// Live fasteners by pairing key.
#[derive(Debug, Clone, Default)]
pub struct FastenerRegistry {
    entries: BTreeMap<FastenerKey, Fastener>,
}

impl FastenerRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a fastener, returning the one it replaced.
    pub fn insert(&mut self, key: FastenerKey, fastener: Fastener) -> Option<Fastener> {
        self.entries.insert(key, fastener)
    }

    /// Remove and return a fastener.
    pub fn remove(&mut self, key: &FastenerKey) -> Option<Fastener> {
        self.entries.remove(key)
    }

    /// Look up a fastener.
    #[must_use]
    pub fn get(&self, key: &FastenerKey) -> Option<&Fastener> {
        self.entries.get(key)
    }

    /// Whether a fastener is registered under `key`.
    #[must_use]
    pub fn contains(&self, key: &FastenerKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of fasteners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&FastenerKey, &Fastener)> {
        self.entries.iter()
    }

    /// Serializable snapshot in key order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<FastenerInfo> {
        self.entries
            .iter()
            .map(|(key, fastener)| fastener.info(*key))
            .collect()
    }
}
