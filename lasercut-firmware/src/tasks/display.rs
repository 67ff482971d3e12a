//! Display task
//!
//! The only task that touches the panel. Executes the newest queued
//! update; failures are logged by the queue and the loop carries on.

use defmt::*;

use crate::channels::DISPLAY_QUEUE;
use crate::KioskDisplay;

#[embassy_executor::task]
pub async fn display_task(mut display: KioskDisplay) {
    info!("Display task started");
    DISPLAY_QUEUE.run(&mut display).await
}
