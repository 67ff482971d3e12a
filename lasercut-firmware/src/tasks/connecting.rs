//! Connecting animation
//!
//! While no session is up the progress bar shows an indeterminate
//! animation. Frames are only queued while disconnected, so the "Ready"
//! screen queued on connect is never overwritten.

use defmt::*;
use embassy_time::Timer;

use lasercut_display::StatusCommand;

use crate::channels::{DISPLAY_QUEUE, LINK_STATE};

/// Delay before the first frame, so the startup message stays readable
const START_DELAY_MS: u64 = 500;

/// Animation tick
const TICK_MS: u64 = 10;

/// Phase wraps at this value
const PHASE_PERIOD: u8 = 100;

#[embassy_executor::task]
pub async fn connecting_task() {
    let Some(mut state) = LINK_STATE.receiver() else {
        error!("No link state receiver left, animation disabled");
        return;
    };

    Timer::after_millis(START_DELAY_MS).await;

    loop {
        // Wait until disconnected
        state.get_and(|connected| !*connected).await;
        debug!("Link down, animating");

        let mut phase: u8 = 0;
        while state.try_get() != Some(true) {
            // Every other tick keeps the queue from saturating the panel
            if phase % 2 == 0 {
                DISPLAY_QUEUE.submit(StatusCommand::Connecting { phase });
            }
            phase = (phase + 1) % PHASE_PERIOD;
            Timer::after_millis(TICK_MS).await;
        }
    }
}
