#![forbid(unsafe_code)]

//! Reference widgets that observe user interaction through native events.
//!
//! Each widget implements [`ziptie_core::Widget`] with interior mutability,
//! so it can be shared as an `Rc` between the host and a fastener:
//!
//! - [`Checkbox`]: checkbox or radio, fires `click`, exposes `checked`.
//! - [`TextInput`]: single-line input or text area, fires `input`, exposes
//!   `value`.
//! - [`Panel`]: content-only, fires `mutation`, exposes `content`.

pub mod checkbox;
pub mod listeners;
pub mod panel;
pub mod text;

pub use checkbox::{Checkbox, LABEL};
pub use listeners::ListenerTable;
pub use panel::Panel;
pub use text::{PLACEHOLDER, TextInput};
