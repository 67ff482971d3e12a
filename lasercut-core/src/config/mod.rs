//! Configuration types and loading
//!
//! Board-agnostic configuration structures, filled in at boot from the
//! embedded `kiosk.toml` by a small no_std parser.

pub mod toml;
pub mod types;

pub use toml::{parse_config, ParseError};
pub use types::*;
