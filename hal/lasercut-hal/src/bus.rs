//! Register-style display bus
//!
//! Monochrome OLED controllers take a stream of bytes, each tagged as either
//! a command or display data. Over I2C the tag is a control byte in front of
//! the payload; over SPI it is a D/C pin.

use core::future::Future;

/// Command/data write interface to a display controller
pub trait RegisterBus {
    /// Error type for bus operations
    type Error;

    /// Write a single command byte
    fn command(&mut self, command: u8) -> impl Future<Output = Result<(), Self::Error>>;

    /// Write a single display data byte
    fn data(&mut self, data: u8) -> impl Future<Output = Result<(), Self::Error>>;

    /// Write a run of display data bytes
    ///
    /// Implementations may split `data` into several bus transactions.
    fn data_stream(&mut self, data: &[u8]) -> impl Future<Output = Result<(), Self::Error>>;

    /// Write a sequence of command bytes
    fn commands(&mut self, commands: &[u8]) -> impl Future<Output = Result<(), Self::Error>> {
        async move {
            for &c in commands {
                self.command(c).await?;
            }
            Ok(())
        }
    }
}
