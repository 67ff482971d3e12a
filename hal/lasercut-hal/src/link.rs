//! Link to the job server
//!
//! A link is a bidirectional byte stream carrying protocol frames. Opening it
//! yields independent receive and transmit halves so that one task can read
//! server pushes while others emit commands.

use core::future::Future;

use embedded_io_async::{Read, Write};

/// Opens connections to the job server
///
/// Each successful `connect` returns a fresh pair of halves; the previous
/// pair is dropped by the caller before reconnecting.
pub trait Connector {
    /// Error returned when the connection cannot be established
    type Error: core::fmt::Debug;

    /// Receive half
    type Rx: Read;

    /// Transmit half
    type Tx: Write;

    /// Open the transport and return its halves
    fn connect(&mut self) -> impl Future<Output = Result<(Self::Rx, Self::Tx), Self::Error>>;
}
