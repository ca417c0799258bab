#![forbid(unsafe_code)]

//! Failure taxonomy for fastening operations.
//!
//! The public protocol is fail-soft: `fasten`, `snip` and the hook/listener
//! removals return `bool`. Their `try_` twins return [`FastenError`] so the
//! reason is available to callers and to the evidence log.
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | `InvalidEndpoint` | absent endpoint, or wrong endpoint flavor | no side effects |
//! | `MissingProperty` | hook requested on a property the model does not own | hook refused |
//! | `UnknownFastener` | `snip` for a pair with no registry entry | no side effects |
//! | `DoubleTeardown` | hook removed from a property that is not hooked | storage untouched |

use std::fmt;

use crate::identity::EndpointId;
use crate::registry::FastenerKey;

/// Errors from fastening operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FastenError {
    /// The endpoint was absent or of the wrong flavor for the operation.
    InvalidEndpoint,
    /// Accessor-hook installation on a property the model does not own.
    MissingProperty { endpoint: EndpointId, property: String },
    /// No fastener is registered for the pair.
    UnknownFastener { key: FastenerKey },
    /// The property's hook was already removed.
    DoubleTeardown { endpoint: EndpointId, property: String },
}

impl FastenError {
    /// Stable, machine-friendly name for logs and evidence lines.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::InvalidEndpoint => "invalid_endpoint",
            Self::MissingProperty { .. } => "missing_property",
            Self::UnknownFastener { .. } => "unknown_fastener",
            Self::DoubleTeardown { .. } => "double_teardown",
        }
    }
}

impl fmt::Display for FastenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEndpoint => f.write_str("invalid endpoint"),
            Self::MissingProperty { endpoint, property } => {
                write!(f, "endpoint {endpoint} has no own property '{property}'")
            }
            Self::UnknownFastener { key } => write!(f, "no fastener registered for {key}"),
            Self::DoubleTeardown { endpoint, property } => {
                write!(f, "property '{property}' of endpoint {endpoint} is not hooked")
            }
        }
    }
}

impl std::error::Error for FastenError {}
