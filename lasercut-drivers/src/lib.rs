//! Hardware driver implementations
//!
//! This crate provides the concrete drivers the kiosk runs on:
//!
//! - SSD1306 monochrome OLED (page framebuffer + register bus)
//! - I2C adapter for the register bus
//! - Debounced push buttons

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod display;
pub mod input;
