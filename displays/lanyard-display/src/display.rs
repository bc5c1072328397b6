//! Drawing surface over a framebuffer and a panel

use embedded_graphics::{
    mono_font::{MonoFont, MonoTextStyle},
    pixelcolor::BinaryColor,
    prelude::*,
    primitives::{PrimitiveStyle, Rectangle},
    text::{renderer::TextRenderer, Baseline, Text},
};
use lanyard_hal::{Canvas, CanvasError, Font, Refresh};
use profont::{PROFONT_10_POINT, PROFONT_12_POINT, PROFONT_18_POINT, PROFONT_24_POINT};

use crate::framebuffer::{FrameBuffer, WIDTH};
use crate::panel::Panel;

/// Map a badge font face to a concrete font
pub fn mono_font(font: Font) -> &'static MonoFont<'static> {
    match font {
        Font::Small => &PROFONT_10_POINT,
        Font::Regular => &PROFONT_12_POINT,
        Font::Title => &PROFONT_18_POINT,
        Font::Large => &PROFONT_24_POINT,
    }
}

fn style(font: Font) -> MonoTextStyle<'static, BinaryColor> {
    MonoTextStyle::new(mono_font(font), BinaryColor::On)
}

/// Canvas drawing into a framebuffer, flushed to a panel
pub struct Display<P> {
    frame: FrameBuffer,
    panel: P,
}

impl<P: Panel> Display<P> {
    /// Create a display with a blank frame
    pub fn new(panel: P) -> Self {
        Self {
            frame: FrameBuffer::new(),
            panel,
        }
    }

    /// Current frame
    pub fn frame(&self) -> &FrameBuffer {
        &self.frame
    }

    /// Access the panel
    pub fn panel_mut(&mut self) -> &mut P {
        &mut self.panel
    }
}

impl<P: Panel> Canvas for Display<P> {
    fn clear(&mut self) {
        self.frame.clear();
    }

    fn text(&mut self, x: i32, y: i32, text: &str, font: Font) {
        let _ = Text::with_baseline(text, Point::new(x, y), style(font), Baseline::Top)
            .draw(&mut self.frame);
    }

    fn text_width(&self, text: &str, font: Font) -> u32 {
        style(font)
            .measure_string(text, Point::zero(), Baseline::Top)
            .bounding_box
            .size
            .width
    }

    fn outline(&mut self, x: i32, y: i32, width: u32, height: u32) {
        let _ = Rectangle::new(Point::new(x, y), Size::new(width, height))
            .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 1))
            .draw(&mut self.frame);
    }

    fn fill(&mut self, x: i32, y: i32, width: u32, height: u32) {
        let _ = self.frame.fill_solid(
            &Rectangle::new(Point::new(x, y), Size::new(width, height)),
            BinaryColor::On,
        );
    }

    fn flush(&mut self, refresh: Refresh) -> Result<(), CanvasError> {
        self.panel
            .refresh(&self.frame, refresh)
            .map_err(|_| CanvasError::Communication)
    }

    fn width(&self) -> u32 {
        WIDTH
    }
}
