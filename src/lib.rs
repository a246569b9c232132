//! card-carousel: auto-advancing card strip controller.
//!
//! The controller owns per-carousel state (controls, auto-advance ticker,
//! quiet-period resume, visibility gating) and talks to the document only
//! through the [`host::CarouselHost`] trait. [`host::HeadlessHost`] runs it
//! in memory with a virtual clock; the `web-adapter` feature provides a
//! `web-sys` host for the browser.

pub mod api;
pub mod core;
pub mod error;
pub mod host;
pub mod interaction;
pub mod telemetry;

#[cfg(feature = "web-adapter")]
pub mod platform_web;

pub use api::{AttachOptions, CarouselConfig, CarouselController, CarouselEvent};
pub use error::{CarouselError, CarouselResult};
