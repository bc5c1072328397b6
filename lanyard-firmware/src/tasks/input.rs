//! Button input task
//!
//! Scans the button bank on a fixed period and forwards debounced edges.

use defmt::*;
use embassy_time::{Duration, Ticker};

use crate::buttons::Buttons;
use crate::channels::INPUT_CHANNEL;

/// Scan interval in milliseconds
pub const SCAN_INTERVAL_MS: u64 = 10;

/// Input task - scans buttons and sends edges to the home task
#[embassy_executor::task]
pub async fn input_task(mut buttons: Buttons<'static>) {
    info!("Input task started");

    let mut ticker = Ticker::every(Duration::from_millis(SCAN_INTERVAL_MS));

    loop {
        ticker.next().await;

        for event in buttons.scan() {
            debug!("Button {} {}", event.button, event.pressed);
            // Drop rather than block the scan if the home task lags
            if INPUT_CHANNEL.try_send(event).is_err() {
                warn!("Input channel full, dropping event");
            }
        }
    }
}
