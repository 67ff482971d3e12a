//! Board-agnostic core logic for the laser-cut kiosk
//!
//! This crate contains the application logic that does not depend on
//! specific hardware:
//!
//! - Latest-wins display command queue
//! - Job server client (reconnect, port handshake, command sequences)
//! - Queue-depth progress tracking
//! - Configuration types and the `kiosk.toml` parser

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

extern crate alloc;

pub mod client;
pub mod config;
pub mod queue;

pub use client::{ClientEvents, EmitError, JobClient, JobError, ProgressReport};
pub use queue::{DisplayCommand, DisplayQueue};
