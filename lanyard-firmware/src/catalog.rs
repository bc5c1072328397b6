//! Built-in service catalog
//!
//! The services compiled into this image, each with its manifest. The
//! catalog is the [`ServiceSource`] discovery walks at boot.

use core::fmt::Write;

use defmt::warn;
use embassy_time::Instant;
use heapless::{String, Vec};
use lanyard_core::services::registry::MAX_ENTRIES;
use lanyard_core::services::{EntryPoints, Fault, LoadError, Service, ServiceName, ServiceSource};
use lanyard_hal::{Canvas, Font};

use crate::net;

/// Line height of one service row
const ROW_HEIGHT: i32 = 12;

struct Entry {
    name: &'static str,
    manifest: &'static str,
}

const ENTRIES: &[Entry] = &[
    Entry {
        name: "clock",
        manifest: r#"{"apiVersion":1,"wifi":{"setup":false,"loop":false},"rtc":true,"loop":false,"draw":true}"#,
    },
    Entry {
        name: "uptime",
        manifest: r#"{"apiVersion":1,"wifi":{"setup":false,"loop":false},"rtc":false,"loop":true,"draw":true}"#,
    },
];

/// Services shipped with the firmware
pub enum BuiltinService {
    /// Wall clock, UTC
    Clock,
    /// Time awake and ticks left before sleep
    Uptime { sleep_in: i16 },
}

impl Service for BuiltinService {
    fn setup(&mut self) -> Result<(), Fault> {
        Ok(())
    }

    fn entry_points(&self) -> EntryPoints {
        match self {
            BuiltinService::Clock => EntryPoints {
                run_loop: false,
                draw: true,
            },
            BuiltinService::Uptime { .. } => EntryPoints::ALL,
        }
    }

    fn run_loop(&mut self, sleep_countdown: i16) -> Result<bool, Fault> {
        if let BuiltinService::Uptime { sleep_in } = self {
            *sleep_in = sleep_countdown;
        }
        Ok(false)
    }

    fn draw<C: Canvas>(&mut self, canvas: &mut C, x: i32, y: i32) -> Result<i32, Fault> {
        let mut line: String<32> = String::new();
        match self {
            BuiltinService::Clock => {
                let now = net::unix_time();
                if now == 0 {
                    return Ok(0);
                }
                let minutes = now / 60 % 60;
                let hours = now / 3600 % 24;
                write!(line, "{:02}:{:02} UTC", hours, minutes)
            }
            BuiltinService::Uptime { sleep_in } => {
                let up = Instant::now().as_secs();
                write!(line, "Up {}m{:02}s, sleep in {}", up / 60, up % 60, sleep_in)
            }
        }
        .map_err(|_| Fault::Display)?;

        canvas.text(x, y, &line, Font::Small);
        Ok(ROW_HEIGHT)
    }
}

/// Names of `entries`, up to what discovery can take
fn listing(entries: &[Entry]) -> Vec<ServiceName, MAX_ENTRIES> {
    let mut names = Vec::new();
    for entry in entries {
        let Ok(name) = ServiceName::try_from(entry.name) else {
            warn!("Service name too long: {}", entry.name);
            continue;
        };
        if names.push(name).is_err() {
            warn!("More than {} services, ignoring the rest", MAX_ENTRIES);
            break;
        }
    }
    names
}

/// [`ServiceSource`] over [`ENTRIES`]
#[derive(Default)]
pub struct Catalog;

impl Catalog {
    fn find(name: &str) -> Result<&'static Entry, LoadError> {
        ENTRIES
            .iter()
            .find(|entry| entry.name == name)
            .ok_or(LoadError::NotFound)
    }
}

impl ServiceSource for Catalog {
    type Service = BuiltinService;

    fn list(&mut self) -> Result<Vec<ServiceName, MAX_ENTRIES>, LoadError> {
        Ok(listing(ENTRIES))
    }

    fn manifest(&mut self, name: &str, buffer: &mut [u8]) -> Result<usize, LoadError> {
        let manifest = Self::find(name)?.manifest.as_bytes();
        let target = buffer
            .get_mut(..manifest.len())
            .ok_or(LoadError::TooLarge)?;
        target.copy_from_slice(manifest);
        Ok(manifest.len())
    }

    fn load(&mut self, name: &str) -> Result<BuiltinService, LoadError> {
        match Self::find(name)?.name {
            "clock" => Ok(BuiltinService::Clock),
            "uptime" => Ok(BuiltinService::Uptime { sleep_in: 0 }),
            _ => Err(LoadError::Invalid),
        }
    }
}
