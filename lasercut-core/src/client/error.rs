//! Job client errors

use embedded_io_async::ErrorKind;
use lasercut_hal::JobSourceError;
use lasercut_protocol::FrameError;

use super::link::{ReadError, WriteError};

/// Why a command was not delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EmitError {
    /// No connection to the server; the command was dropped
    NotConnected,
    /// The server did not open the machine port in time
    HandshakeTimeout,
    /// Too many tasks are already waiting on the port handshake
    TooManyWaiters,
    /// The command could not be framed
    Frame(FrameError),
    /// Writing to the link failed
    Link(ErrorKind),
}

impl From<FrameError> for EmitError {
    fn from(e: FrameError) -> Self {
        EmitError::Frame(e)
    }
}

/// Why a job submission stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum JobError {
    /// The job content could not be read
    Source(JobSourceError),
    /// No heap left to hold the job content
    OutOfMemory,
    /// A command in the sequence failed
    Emit(EmitError),
}

impl From<JobSourceError> for JobError {
    fn from(e: JobSourceError) -> Self {
        JobError::Source(e)
    }
}

impl From<EmitError> for JobError {
    fn from(e: EmitError) -> Self {
        JobError::Emit(e)
    }
}

/// Why a connection attempt failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConnectError {
    /// The transport could not be opened
    Transport,
    /// The server did not answer HELLO in time
    Timeout,
    /// The link closed during the handshake
    Closed,
    /// Reading or writing the link failed
    Link(ErrorKind),
    /// The session request could not be framed
    Frame(FrameError),
}

impl From<FrameError> for ConnectError {
    fn from(e: FrameError) -> Self {
        ConnectError::Frame(e)
    }
}

impl From<WriteError> for EmitError {
    fn from(e: WriteError) -> Self {
        match e {
            WriteError::Frame(e) => EmitError::Frame(e),
            WriteError::Link(kind) => EmitError::Link(kind),
        }
    }
}

impl From<WriteError> for ConnectError {
    fn from(e: WriteError) -> Self {
        match e {
            WriteError::Frame(e) => ConnectError::Frame(e),
            WriteError::Link(kind) => ConnectError::Link(kind),
        }
    }
}

impl From<ReadError> for ConnectError {
    fn from(e: ReadError) -> Self {
        match e {
            ReadError::Closed => ConnectError::Closed,
            ReadError::Link(kind) => ConnectError::Link(kind),
        }
    }
}
