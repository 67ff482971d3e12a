//! Remote job queue client
//!
//! - [`job_client`] - Connection lifecycle, handshake-gated command emission
//! - [`progress`] - Batch progress from queue-depth pushes
//! - [`link`] - Frame reading and writing on the link halves
//! - [`error`] - Error types

pub mod error;
pub mod job_client;
pub mod link;
pub mod progress;

pub use error::{ConnectError, EmitError, JobError};
pub use job_client::{ClientEvents, JobClient, SessionEnd, PORT_WAITERS};
pub use link::{FrameReader, ReadError};
pub use progress::{ProgressReport, QueueProgress};
