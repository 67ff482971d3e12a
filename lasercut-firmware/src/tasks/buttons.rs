//! Button tasks
//!
//! Button 1 submits the stored job, button 2 runs the laser test. A press
//! is handled to completion (including any port handshake wait) before the
//! next one is accepted.

use defmt::*;

use crate::{KioskButton, KioskClient, KioskJob};

#[embassy_executor::task]
pub async fn run_button_task(
    mut button: KioskButton,
    client: &'static KioskClient,
    mut job: KioskJob,
) {
    info!("Run button task started");

    loop {
        if let Err(e) = button.wait_for_press().await {
            warn!("Run button error: {:?}", Debug2Format(&e));
            continue;
        }

        info!("Submitting job");
        match client.submit_job(&mut job).await {
            Ok(()) => info!("Job submitted"),
            Err(e) => warn!("Job submission failed: {}", e),
        }

        let _ = button.wait_for_release().await;
    }
}

#[embassy_executor::task]
pub async fn test_button_task(mut button: KioskButton, client: &'static KioskClient) {
    info!("Test button task started");

    loop {
        if let Err(e) = button.wait_for_press().await {
            warn!("Test button error: {:?}", Debug2Format(&e));
            continue;
        }

        info!("Running laser test");
        match client.run_diagnostic_test().await {
            Ok(()) => info!("Laser test sent"),
            Err(e) => warn!("Laser test failed: {}", e),
        }

        let _ = button.wait_for_release().await;
    }
}
