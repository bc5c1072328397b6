//! 1-bpp framebuffer
//!
//! Landscape 296x128, row-major, MSB first. A set bit is a foreground
//! (black) pixel. The panel itself is mounted portrait, so drivers read the
//! frame column by column with [`FrameBuffer::column`].

use core::convert::Infallible;

use embedded_graphics::{
    draw_target::DrawTarget,
    geometry::{Dimensions, OriginDimensions, Size},
    pixelcolor::BinaryColor,
    primitives::Rectangle,
    Pixel,
};

/// Logical width (landscape)
pub const WIDTH: u32 = 296;

/// Logical height (landscape)
pub const HEIGHT: u32 = 128;

/// Bytes per logical row
const STRIDE: usize = (WIDTH as usize + 7) / 8;

/// Bytes per logical column
pub const COLUMN_BYTES: usize = HEIGHT as usize / 8;

/// Total frame size in bytes
pub const BUFFER_LEN: usize = STRIDE * HEIGHT as usize;

/// Monochrome frame
pub struct FrameBuffer {
    bits: [u8; BUFFER_LEN],
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameBuffer {
    /// Create a blank frame
    pub const fn new() -> Self {
        Self {
            bits: [0; BUFFER_LEN],
        }
    }

    /// Blank the whole frame
    pub fn clear(&mut self) {
        self.bits.fill(0);
    }

    /// Set or clear one pixel; out-of-range coordinates are ignored
    pub fn set_pixel(&mut self, x: i32, y: i32, on: bool) {
        if let Some((index, mask)) = Self::locate(x, y) {
            if on {
                self.bits[index] |= mask;
            } else {
                self.bits[index] &= !mask;
            }
        }
    }

    /// Read one pixel; out-of-range coordinates read as background
    pub fn pixel(&self, x: i32, y: i32) -> bool {
        Self::locate(x, y).is_some_and(|(index, mask)| self.bits[index] & mask != 0)
    }

    /// Raw row-major frame
    pub fn as_bytes(&self) -> &[u8] {
        &self.bits
    }

    /// One logical column packed top to bottom, MSB first
    pub fn column(&self, x: i32) -> [u8; COLUMN_BYTES] {
        let mut out = [0u8; COLUMN_BYTES];
        for y in 0..HEIGHT as i32 {
            if self.pixel(x, y) {
                out[y as usize / 8] |= 0x80 >> (y % 8);
            }
        }
        out
    }

    fn locate(x: i32, y: i32) -> Option<(usize, u8)> {
        if x < 0 || y < 0 || x as u32 >= WIDTH || y as u32 >= HEIGHT {
            return None;
        }
        let index = y as usize * STRIDE + x as usize / 8;
        Some((index, 0x80 >> (x % 8)))
    }
}

impl OriginDimensions for FrameBuffer {
    fn size(&self) -> Size {
        Size::new(WIDTH, HEIGHT)
    }
}

impl DrawTarget for FrameBuffer {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            self.set_pixel(point.x, point.y, color.is_on());
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        let area = area.intersection(&self.bounding_box());
        for y in area.rows() {
            for x in area.columns() {
                self.set_pixel(x, y, color.is_on());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::prelude::*;

    #[test]
    fn test_pixel_roundtrip_and_clipping() {
        let mut frame = FrameBuffer::new();
        frame.set_pixel(0, 0, true);
        frame.set_pixel(295, 127, true);
        frame.set_pixel(-1, 5, true);
        frame.set_pixel(296, 5, true);

        assert!(frame.pixel(0, 0));
        assert!(frame.pixel(295, 127));
        assert!(!frame.pixel(1, 0));
        assert!(!frame.pixel(-1, 5));
        assert_eq!(frame.as_bytes()[0], 0x80);
        assert_eq!(frame.as_bytes().iter().filter(|b| **b != 0).count(), 2);
    }

    #[test]
    fn test_fill_solid_clips_to_frame() {
        let mut frame = FrameBuffer::new();
        frame
            .fill_solid(
                &Rectangle::new(Point::new(290, 120), Size::new(20, 20)),
                BinaryColor::On,
            )
            .unwrap();

        assert!(frame.pixel(290, 120));
        assert!(frame.pixel(295, 127));
        assert!(!frame.pixel(289, 120));

        frame.clear();
        assert!(frame.as_bytes().iter().all(|b| *b == 0));
    }

    #[test]
    fn test_column_packs_top_to_bottom() {
        let mut frame = FrameBuffer::new();
        frame.set_pixel(10, 0, true);
        frame.set_pixel(10, 9, true);
        frame.set_pixel(10, 127, true);

        let column = frame.column(10);
        assert_eq!(column[0], 0x80);
        assert_eq!(column[1], 0x40);
        assert_eq!(column[15], 0x01);
        assert_eq!(frame.column(11), [0; COLUMN_BYTES]);
    }
}
