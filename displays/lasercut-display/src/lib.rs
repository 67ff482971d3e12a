//! Status display for the laser-cut kiosk
//!
//! This crate provides:
//! - [`StatusScreen`], the model of what the panel shows
//! - [`Canvas`], an `embedded-graphics` draw target the screen renders into
//! - [`StatusCommand`], the display update queued by producers
//! - [`StatusDisplay`], the consumer-owned target tying screen, canvas and
//!   panel together
//!
//! # Layout (128x32)
//!
//! ```text
//! ┌────────────────────────────────┐ y=0
//! │ Ready / Working: 3             │   text, baseline y=16
//! │                                │
//! ├────────────────────────────────┤ y=24
//! │ [██████████░░░░░░░░░░░░░░░░░░] │   progress bar
//! └────────────────────────────────┘ y=31
//! ```

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod canvas;
pub mod command;
pub mod render;
pub mod screen;

pub use canvas::Canvas;
pub use command::{StatusCommand, StatusDisplay};
pub use screen::{Bar, StatusScreen, MAX_TEXT_LEN};
