#![forbid(unsafe_code)]

//! Two-way property binding between plain data models and native-event
//! widgets.
//!
//! # Role in Ziptie
//! This is the facade crate. It re-exports the engine from `ziptie-core`,
//! the reference widgets from `ziptie-widgets` (as [`widgets`]), and adds the
//! single-pair [`Ziptie`] model/view binder.
//!
//! # Which binder
//! - [`Binder`]: any number of symmetric endpoint pairs, relayed over a
//!   channel bus, with the observed event resolved from the widget kind.
//! - [`Ziptie`]: one model property and one widget property with an explicit
//!   event, synchronised from the model when created.
//!
//! # Logging
//! All crates log through `tracing`. With the `tracing-json` feature,
//! `logging::init()` installs a JSON subscriber filtered by `ZIPTIE_LOG`.

pub mod binder;
#[cfg(feature = "tracing-json")]
pub mod logging;

pub use binder::{ModelSide, ViewSide, Ziptie, ZiptieError, ZiptieOptions};
pub use ziptie_core::*;
pub use ziptie_widgets as widgets;

/// The types most hosts need.
pub mod prelude {
    pub use crate::binder::{ModelSide, ViewSide, Ziptie, ZiptieError, ZiptieOptions};
    pub use ziptie_core::{
        Binder, BinderConfig, ContentFallback, Endpoint, FastenError, Model, Reconcile, Value,
        Widget, WidgetKind,
    };
    pub use ziptie_widgets::{Checkbox, Panel, TextInput};
}
