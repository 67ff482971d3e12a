//! Job file storage
//!
//! The job to submit is supplied externally (copied onto the device by the
//! operator) and read in full right before submission.

use core::future::Future;

/// Errors from reading the job file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum JobSourceError {
    /// No job has been stored
    NotFound,
    /// The stored job is larger than the caller's limit
    TooLarge,
    /// The underlying storage failed
    Storage,
    /// Stored data is malformed
    Corrupted,
}

/// Source of the job file content
pub trait JobSource {
    /// Length of the stored job in bytes
    fn size(&mut self) -> impl Future<Output = Result<usize, JobSourceError>>;

    /// Read the whole job into `buffer`
    ///
    /// `buffer` must be at least `size()` bytes. Returns the number of bytes
    /// read.
    fn read(&mut self, buffer: &mut [u8]) -> impl Future<Output = Result<usize, JobSourceError>>;
}
