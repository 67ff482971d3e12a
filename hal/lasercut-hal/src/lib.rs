//! Laser-cut kiosk Hardware Abstraction Layer
//!
//! This crate defines the hardware-facing traits the kiosk core is written
//! against. Chip-specific crates implement them; host tests mock them.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  lasercut-core / drivers / display      │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  lasercut-hal (this crate - traits)     │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!            ┌─────────────────┐
//!            │ lasercut-hal-   │
//!            │    rp2040       │
//!            └─────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`bus::RegisterBus`] - Command/data register writes to a display controller
//! - [`link::Connector`] - Opens a framed byte link to the job server
//! - [`storage::JobSource`] - Reads the job file to submit

#![no_std]
#![deny(unsafe_code)]

pub mod bus;
pub mod link;
pub mod storage;

pub use bus::RegisterBus;
pub use link::Connector;
pub use storage::{JobSource, JobSourceError};
