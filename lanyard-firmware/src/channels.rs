//! Inter-task communication channels
//!
//! Defines the static channels used for communication between Embassy tasks.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

use lanyard_hal::ButtonEvent;

/// Channel capacity for button events
const INPUT_CHANNEL_SIZE: usize = 8;

/// Button edges from the input task to the home task
pub static INPUT_CHANNEL: Channel<CriticalSectionRawMutex, ButtonEvent, INPUT_CHANNEL_SIZE> =
    Channel::new();
