//! Wireless and network stack runners

use embassy_net::Runner;

use crate::board::WifiRunner;

/// Drives the CYW43 control bus
#[embassy_executor::task]
pub async fn cyw43_task(runner: WifiRunner) -> ! {
    runner.run().await
}

/// Drives the embassy-net stack
#[embassy_executor::task]
pub async fn net_task(mut runner: Runner<'static, cyw43::NetDriver<'static>>) -> ! {
    runner.run().await
}
