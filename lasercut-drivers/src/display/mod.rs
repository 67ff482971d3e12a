//! Monochrome OLED display support

mod framebuffer;
mod i2c;
mod ssd1306;

pub use framebuffer::{Framebuffer, Raster, MAX_BUFFER_SIZE};
pub use i2c::I2cRegisterBus;
pub use ssd1306::{Ssd1306, VccMode};

/// Errors from display operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError<E> {
    /// The register bus failed
    Bus(E),
    /// The requested geometry does not fit the framebuffer
    Geometry,
}
