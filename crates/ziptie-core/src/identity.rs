#![forbid(unsafe_code)]

//! Endpoint identity registry.
//!
//! Every endpoint receives a stable numeric identity the first time it is
//! identified. Identities come from a process-wide counter starting at 1 and
//! are never recycled; [`EndpointId::NONE`] (`-1`) stands for "no endpoint".
//!
//! # Design
//!
//! Identities live in a side-table keyed by the endpoint's allocation, not on
//! the endpoint itself. Each record holds a weak reference to the allocation,
//! so when an endpoint is dropped and its address is later reused, the stale
//! record is detected and a fresh identity is issued. Dead records are pruned
//! whenever a new identity is allocated.
//!
//! The side-table is thread-local (endpoints are `Rc`-based and never cross
//! threads); the counter is a global atomic so identities stay collision-free
//! across threads.

use std::cell::RefCell;
use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};

use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::endpoint::{Endpoint, WeakEndpoint};

static NEXT_ID: AtomicI64 = AtomicI64::new(1);

thread_local! {
    static IDENTITIES: RefCell<FxHashMap<usize, IdentityRecord>> =
        RefCell::new(FxHashMap::default());
}

struct IdentityRecord {
    id: EndpointId,
    alive: WeakEndpoint,
}

/// Stable identity of an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct EndpointId(i64);

impl EndpointId {
    /// Sentinel for "no endpoint".
    pub const NONE: Self = Self(-1);

    /// Wrap a raw identity.
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Raw identity value.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }

    /// Whether this identity names a real endpoint (`> 0`).
    #[must_use]
    pub const fn is_some(self) -> bool {
        self.0 > 0
    }
}

impl fmt::Display for EndpointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Return the endpoint's identity, allocating one on first use.
///
/// `None` yields [`EndpointId::NONE`] so pairing keys degrade gracefully.
pub fn identify(endpoint: Option<&Endpoint>) -> EndpointId {
    let Some(endpoint) = endpoint else {
        return EndpointId::NONE;
    };
    let addr = endpoint.addr();
    IDENTITIES.with(|table| {
        let mut table = table.borrow_mut();
        if let Some(record) = table.get(&addr).filter(|r| r.alive.is_alive()) {
            return record.id;
        }
        table.retain(|_, record| record.alive.is_alive());
        let id = EndpointId(NEXT_ID.fetch_add(1, Ordering::Relaxed));
        table.insert(
            addr,
            IdentityRecord {
                id,
                alive: endpoint.downgrade(),
            },
        );
        tracing::trace!(endpoint = id.get(), "identity assigned");
        id
    })
}

/// Return the endpoint's identity without allocating one.
#[must_use]
pub fn peek(endpoint: &Endpoint) -> Option<EndpointId> {
    let addr = endpoint.addr();
    IDENTITIES.with(|table| {
        table
            .borrow()
            .get(&addr)
            .filter(|record| record.alive.is_alive())
            .map(|record| record.id)
    })
}

/// Number of live endpoints known to this thread's side-table.
#[must_use]
pub fn tracked_count() -> usize {
    IDENTITIES.with(|table| {
        table
            .borrow()
            .values()
            .filter(|record| record.alive.is_alive())
            .count()
    })
}
