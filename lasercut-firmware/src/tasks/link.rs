//! Job server link task
//!
//! Keeps the session to the bridge host up and turns server pushes into
//! display updates.

use defmt::*;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::watch::Sender;

use lasercut_core::{ClientEvents, ProgressReport};
use lasercut_display::StatusCommand;
use lasercut_hal_rp2040::UartConnector;
use lasercut_protocol::PortStatus;

use crate::channels::{DISPLAY_QUEUE, LINK_STATE, LINK_STATE_RECEIVERS};
use crate::KioskClient;

/// Forwards client events to the display queue and link state
struct KioskEvents {
    link_state: Sender<'static, CriticalSectionRawMutex, bool, LINK_STATE_RECEIVERS>,
}

impl ClientEvents for KioskEvents {
    fn on_connected(&mut self, batch: Option<ProgressReport>) {
        self.link_state.send(true);
        DISPLAY_QUEUE.submit(StatusCommand::connected(batch));
    }

    fn on_disconnected(&mut self) {
        info!("Job server session ended");
        self.link_state.send(false);
    }

    fn on_port_status(&mut self, status: PortStatus) {
        info!("Machine port: {}", status);
    }

    fn on_progress(&mut self, report: ProgressReport) {
        debug!("Progress: {}", report);
        DISPLAY_QUEUE.submit(StatusCommand::Progress(report));
    }
}

#[embassy_executor::task]
pub async fn link_task(client: &'static KioskClient, mut connector: UartConnector) {
    info!("Link task started");

    let mut events = KioskEvents {
        link_state: LINK_STATE.sender(),
    };
    client.run(&mut connector, &mut events).await
}
