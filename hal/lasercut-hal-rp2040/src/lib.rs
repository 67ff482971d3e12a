//! RP2040-specific HAL for the laser-cut kiosk firmware
//!
//! This crate provides RP2040 implementations of the shared
//! `lasercut-hal` traits:
//!
//! - UART link to the bridge host (implements `lasercut_hal::Connector`)
//! - Flash job partition (implements `lasercut_hal::JobSource`)

#![no_std]

pub mod flash;
pub mod uart;

pub use flash::{FlashJobSource, Rp2040Flash};
pub use uart::{SharedRx, SharedTx, UartConnector, UartLinkRx, UartLinkTx};
