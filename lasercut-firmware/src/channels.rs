//! Inter-task communication
//!
//! Defines the statics shared between Embassy tasks. Uses embassy-sync
//! primitives for safe async communication.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::watch::Watch;

use lasercut_core::DisplayQueue;
use lasercut_display::StatusCommand;

/// Receivers of the link state (connecting animation)
pub const LINK_STATE_RECEIVERS: usize = 2;

/// Every display update goes through this queue; only the newest pending
/// update is drawn
pub static DISPLAY_QUEUE: DisplayQueue<CriticalSectionRawMutex, StatusCommand> =
    DisplayQueue::new();

/// Whether a session with the job server is up
pub static LINK_STATE: Watch<CriticalSectionRawMutex, bool, LINK_STATE_RECEIVERS> = Watch::new();
