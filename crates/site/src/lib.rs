//! Page-enhancement logic for the LINE business site: reveal-on-scroll,
//! count-up statistics, smooth in-page navigation, the mobile menu, the
//! contact form, the chat widget and a few decorative effects.
//!
//! Everything here is host independent. The `linebiz-wasm` crate binds it to
//! the DOM through the view traits and the [`runtime`] seams.

#![deny(unsafe_code)]

pub mod chat;
pub mod config;
pub mod counter;
pub mod easing;
pub mod effects;
pub mod form;
pub mod menu;
pub mod nav;
pub mod report;
pub mod reveal;
pub mod runtime;
pub mod timing;

pub use config::{ConfigError, ConfigResult, ConfigStore, SiteConfig};
pub use easing::Easing;
pub use report::{
    ErrorKind, ErrorMonitor, ErrorReport, ErrorReporter, PageContext, SourceLocation,
    TracingReporter,
};
pub use runtime::{Clock, Dice, OsDice, Sleeper};
