//! Flash job partition for RP2040
//!
//! The job file is copied into a dedicated partition at the end of flash:
//!
//! ```text
//! ┌──────────────┬──────────────────────────┐
//! │ LENGTH u32LE │ G-code content ...       │
//! └──────────────┴──────────────────────────┘
//! ```
//!
//! An erased header (`0xFFFF_FFFF`) means no job is stored.

use embassy_rp::dma::Channel;
use embassy_rp::flash::{Async, Flash};
use embassy_rp::peripherals::FLASH;
use embassy_rp::Peri;
use embedded_storage_async::nor_flash::ReadNorFlash;
use lasercut_hal::{JobSource, JobSourceError};

/// Flash layout
pub const FLASH_SIZE: usize = 2 * 1024 * 1024;
pub const JOB_PARTITION_SIZE: usize = 256 * 1024;
pub const JOB_PARTITION_START: usize = FLASH_SIZE - JOB_PARTITION_SIZE;

const HEADER_LEN: usize = 4;
const ERASED: u32 = 0xFFFF_FFFF;

/// Bounce buffer size for flash reads
const CHUNK_LEN: usize = 256;

/// DMA reads want word-aligned buffers and lengths
#[repr(align(4))]
struct Chunk([u8; CHUNK_LEN]);

/// RP2040 on-board flash
pub type Rp2040Flash<'d> = Flash<'d, FLASH, Async, FLASH_SIZE>;

/// Job stored as a length-prefixed blob in a flash region
pub struct FlashJobSource<F> {
    flash: F,
    start: u32,
    capacity: usize,
}

impl<F: ReadNorFlash> FlashJobSource<F> {
    /// Read the job from the `size`-byte region at `start`
    pub fn new(flash: F, start: u32, size: usize) -> Self {
        Self {
            flash,
            start,
            capacity: size.saturating_sub(HEADER_LEN),
        }
    }
}

impl<'d> FlashJobSource<Rp2040Flash<'d>> {
    /// The on-board job partition
    pub fn partition(flash: Peri<'d, FLASH>, dma: Peri<'d, impl Channel>) -> Self {
        Self::new(
            Flash::new(flash, dma),
            JOB_PARTITION_START as u32,
            JOB_PARTITION_SIZE,
        )
    }
}

impl<F: ReadNorFlash> JobSource for FlashJobSource<F> {
    async fn size(&mut self) -> Result<usize, JobSourceError> {
        let mut chunk = Chunk([0; CHUNK_LEN]);
        let header = &mut chunk.0[..HEADER_LEN];
        self.flash
            .read(self.start, header)
            .await
            .map_err(|_| JobSourceError::Storage)?;

        match u32::from_le_bytes([header[0], header[1], header[2], header[3]]) {
            ERASED => Err(JobSourceError::NotFound),
            len if len as usize > self.capacity => Err(JobSourceError::Corrupted),
            len => Ok(len as usize),
        }
    }

    async fn read(&mut self, buffer: &mut [u8]) -> Result<usize, JobSourceError> {
        let len = self.size().await?;
        let target = buffer.get_mut(..len).ok_or(JobSourceError::TooLarge)?;

        let mut chunk = Chunk([0; CHUNK_LEN]);
        let mut offset = self.start + HEADER_LEN as u32;
        for part in target.chunks_mut(CHUNK_LEN) {
            let padded = part.len().next_multiple_of(F::READ_SIZE.max(1));
            self.flash
                .read(offset, &mut chunk.0[..padded])
                .await
                .map_err(|_| JobSourceError::Storage)?;
            part.copy_from_slice(&chunk.0[..part.len()]);
            offset += part.len() as u32;
        }

        #[cfg(feature = "defmt")]
        defmt::debug!("Read {} byte job from flash", len);
        Ok(len)
    }
}
