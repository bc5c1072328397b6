//! Launch targets handed across a reset
//!
//! Only the home screen lives in this image. A pending launch request is
//! honoured with a placeholder screen; the first-boot setup flow also
//! records that setup ran so the next boot moves on to onboarding.

use defmt::*;
use lanyard_core::home::BootPhase;
use lanyard_core::settings::{keys, StoreExt};
use lanyard_hal::{App, Canvas, ConfigStore, Font, Refresh};

use crate::channels::INPUT_CHANNEL;

fn title(app: App) -> &'static str {
    match app {
        App::Setup => "Setup",
        App::Onboarding => "Welcome!",
        App::Launcher => "Launcher",
        App::EasterEgg => "Magic",
        App::Update => "Firmware update",
    }
}

/// Show `app` until a button is pressed
pub async fn run<St: ConfigStore, C: Canvas>(app: App, store: &mut St, canvas: &mut C) {
    info!("Running {}", app);

    if app == App::Setup {
        let counter = BootPhase::SecondBoot.counter();
        if let Err(e) = store.set_u8(keys::BADGE, keys::SETUP_STATE, counter).await {
            error!("Could not record setup: {}", e);
        }
    }

    canvas.clear();
    canvas.text(0, 0, title(app), Font::Title);
    canvas.text(0, 30, "Not installed on this badge.", Font::Small);
    canvas.text(0, 45, "Press any button to return.", Font::Small);
    if let Err(e) = canvas.flush(Refresh::Full) {
        warn!("Flush failed: {}", e);
    }

    loop {
        if INPUT_CHANNEL.receive().await.pressed {
            break;
        }
    }
}
