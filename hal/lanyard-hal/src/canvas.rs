//! Monochrome drawing surface
//!
//! The home screen and every service draw through this trait. It mirrors
//! the handful of primitives an e-paper badge needs: text, boxes and a
//! flush with a selectable refresh mode.

/// Canvas errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CanvasError {
    /// Communication error with the panel
    Communication,
    /// Panel stayed busy for too long
    Timeout,
    /// Panel not initialized
    NotInitialized,
}

/// Font faces available on the badge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Font {
    /// Small UI text (hints, message lines)
    Small,
    /// Regular status text
    Regular,
    /// Message titles
    Title,
    /// Owner nickname
    Large,
}

/// Panel refresh mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Refresh {
    /// Full waveform, no ghosting, slow
    Full,
    /// Partial waveform for quick status updates
    Fast,
}

/// Drawing surface trait
///
/// Coordinates are in pixels with the origin at the top-left corner.
/// Drawing outside the surface is clipped, never an error.
pub trait Canvas {
    /// Clear the frame to the background colour
    fn clear(&mut self);

    /// Draw text with its top-left corner at `(x, y)`
    fn text(&mut self, x: i32, y: i32, text: &str, font: Font);

    /// Width in pixels `text` would occupy in `font`
    fn text_width(&self, text: &str, font: Font) -> u32;

    /// Draw a one pixel rectangle outline
    fn outline(&mut self, x: i32, y: i32, width: u32, height: u32);

    /// Fill a rectangle with the foreground colour
    fn fill(&mut self, x: i32, y: i32, width: u32, height: u32);

    /// Push the frame to the panel
    fn flush(&mut self, refresh: Refresh) -> Result<(), CanvasError>;

    /// Surface width in pixels
    fn width(&self) -> u32;
}
