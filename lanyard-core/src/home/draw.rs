//! Home screen rendering
//!
//! Header layout on a 296 pixel wide panel:
//!
//! ```text
//! [####   ]> 3.87v              [ START: LAUNCHER ]
//!
//! Nickname
//!
//! services from y = 64 ...
//! ```

use lanyard_hal::{Canvas, CanvasError, Font, Refresh};

use crate::battery::{BatteryReading, GAUGE_WIDTH};

/// Where services start drawing
pub const SERVICES_ORIGIN: (i32, i32) = (0, 64);

/// Battery status text replacement when an update is ready
pub const UPDATE_BANNER: &str = "Update available!";

/// Hint while the badge is about to sleep
pub const HINT_WAKE: &str = "[ ANY: Wake up ]";
/// Hint with an update ready
pub const HINT_UPDATE: &str = "[ SELECT: UPDATE ] [ START: LAUNCHER ]";
/// Default hint
pub const HINT_LAUNCHER: &str = "[ START: LAUNCHER ]";

/// Pick the action hint
pub fn action_hint(sleep_imminent: bool, update_available: bool) -> &'static str {
    if sleep_imminent {
        HINT_WAKE
    } else if update_available {
        HINT_UPDATE
    } else {
        HINT_LAUNCHER
    }
}

/// Battery gauge and its status text
pub fn draw_battery<C: Canvas>(canvas: &mut C, reading: &BatteryReading, update_available: bool) {
    canvas.outline(2, 2, 40, 18);
    canvas.outline(42, 7, 2, 8);
    canvas.fill(3, 3, reading.gauge.min(GAUGE_WIDTH), 16);

    if update_available {
        canvas.text(47, 2, UPDATE_BANNER, Font::Regular);
    } else {
        canvas.text(47, 2, &reading.status.text(), Font::Regular);
    }
}

/// Owner nickname
pub fn draw_nickname<C: Canvas>(canvas: &mut C, nickname: &str) {
    canvas.text(0, 40, nickname, Font::Large);
}

/// Action hint, right-aligned
pub fn draw_hint<C: Canvas>(canvas: &mut C, hint: &str) {
    let x = canvas.width() as i32 - canvas.text_width(hint, Font::Small) as i32;
    canvas.text(x, 0, hint, Font::Small);
}

/// Progress messages shown during startup
///
/// A title clears the screen; each following line goes 15 pixels below
/// the previous one. Every message is flushed with a fast refresh.
#[derive(Debug, Default)]
pub struct StatusLog {
    line: u8,
}

impl StatusLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear the screen and show a title
    pub fn title<C: Canvas>(&mut self, canvas: &mut C, text: &str) {
        info!("{}", text);
        canvas.clear();
        canvas.text(0, 0, text, Font::Title);
        self.line = 0;
        Self::flush(canvas);
    }

    /// Add a detail line below the title
    pub fn line<C: Canvas>(&mut self, canvas: &mut C, text: &str) {
        info!("{}", text);
        canvas.text(0, 30 + i32::from(self.line) * 15, text, Font::Small);
        self.line = self.line.saturating_add(1);
        Self::flush(canvas);
    }

    fn flush<C: Canvas>(canvas: &mut C) {
        if let Err(e) = canvas.flush(Refresh::Fast) {
            report_flush_error(e);
        }
    }
}

pub(crate) fn report_flush_error(error: CanvasError) {
    warn!("Display flush failed: {}", error);
}
