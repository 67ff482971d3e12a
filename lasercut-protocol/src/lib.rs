//! Kiosk ↔ job server link protocol
//!
//! This crate defines the serial protocol between the laser-cut kiosk and the
//! bridge host running the job-queue server. The bridge forwards these
//! messages to the server's event socket.
//!
//! # Protocol Overview
//!
//! All messages use a simple binary frame format:
//! ```text
//! ┌───────┬────────┬──────┬─────────────┬──────────┐
//! │ START │ LENGTH │ TYPE │ PAYLOAD     │ CHECKSUM │
//! │ 1B    │ 1B     │ 1B   │ 0–250B      │ 1B       │
//! └───────┴────────┴──────┴─────────────┴──────────┘
//! ```
//!
//! A session starts with HELLO → WELCOME. The server then pushes port status
//! and queue depth; the kiosk sends machine commands.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod frame;
pub mod messages;
pub mod status;

pub use frame::{Frame, FrameError, FrameParser, FRAME_START, MAX_FRAME_SIZE, MAX_PAYLOAD_SIZE};
pub use messages::{ClientCommand, CommandFrames, ServerMessage};
pub use status::PortStatus;
