//! Panel trait
//!
//! A panel takes a finished frame and puts it on the glass. E-paper
//! refreshes are slow and blocking by nature; implementations wait for the
//! controller to go idle before returning.

use lanyard_hal::Refresh;

use crate::framebuffer::FrameBuffer;

/// Physical display that can show a [`FrameBuffer`]
pub trait Panel {
    /// Bus or controller error
    type Error: core::fmt::Debug;

    /// Transfer `frame` and run a refresh with the given waveform
    fn refresh(&mut self, frame: &FrameBuffer, refresh: Refresh) -> Result<(), Self::Error>;
}
