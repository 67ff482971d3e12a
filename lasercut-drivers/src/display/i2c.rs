//! Register bus over I2C
//!
//! SSD1306 I2C framing: every transaction starts with a control byte,
//! `0x00` for commands and `0x40` for display data.

use embedded_hal_async::i2c::I2c;
use lasercut_hal::RegisterBus;

const CONTROL_COMMAND: u8 = 0x00;
const CONTROL_DATA: u8 = 0x40;

/// Display data bytes per I2C transaction
const DATA_CHUNK: usize = 128;

/// [`RegisterBus`] on an async I2C bus
pub struct I2cRegisterBus<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C: I2c> I2cRegisterBus<I2C> {
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C: I2c> RegisterBus for I2cRegisterBus<I2C> {
    type Error = I2C::Error;

    async fn command(&mut self, command: u8) -> Result<(), Self::Error> {
        self.i2c.write(self.address, &[CONTROL_COMMAND, command]).await
    }

    async fn data(&mut self, data: u8) -> Result<(), Self::Error> {
        self.i2c.write(self.address, &[CONTROL_DATA, data]).await
    }

    async fn data_stream(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        let mut buf = [0u8; DATA_CHUNK + 1];
        buf[0] = CONTROL_DATA;
        for chunk in data.chunks(DATA_CHUNK) {
            buf[1..=chunk.len()].copy_from_slice(chunk);
            self.i2c.write(self.address, &buf[..=chunk.len()]).await?;
        }
        Ok(())
    }
}
