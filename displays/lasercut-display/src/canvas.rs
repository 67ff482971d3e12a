//! Off-screen raster the status screen is drawn into
//!
//! Rendering happens here with `embedded-graphics`; the finished frame is
//! then sampled into the panel driver's framebuffer.

use core::convert::Infallible;

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::{DrawTarget, OriginDimensions, Pixel, Size};
use lasercut_drivers::display::{Framebuffer, Raster};

/// Monochrome drawing surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    plane: Framebuffer,
}

impl Canvas {
    /// Create a blank canvas; `None` if the size is unsupported
    pub fn new(width: u16, height: u16) -> Option<Self> {
        Framebuffer::new(width, height).map(|plane| Self { plane })
    }

    pub fn width(&self) -> u16 {
        self.plane.width()
    }

    pub fn height(&self) -> u16 {
        self.plane.height()
    }

    /// Turn every pixel off
    pub fn blank(&mut self) {
        self.plane.clear();
    }

    /// Whether the pixel at (`x`, `y`) is lit
    pub fn is_on(&self, x: i32, y: i32) -> bool {
        self.plane.pixel(x, y)
    }
}

impl DrawTarget for Canvas {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            // Off-canvas pixels are dropped by the plane
            self.plane.set_pixel(point.x, point.y, color.is_on());
        }
        Ok(())
    }
}

impl OriginDimensions for Canvas {
    fn size(&self) -> Size {
        Size::new(u32::from(self.width()), u32::from(self.height()))
    }
}

impl Raster for Canvas {
    fn sample(&self, x: i32, y: i32) -> bool {
        self.plane.pixel(x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::prelude::*;
    use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};

    #[test]
    fn test_draws_and_clips() {
        let mut canvas = Canvas::new(16, 8).unwrap();
        Rectangle::new(Point::new(12, 4), Size::new(10, 10))
            .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
            .draw(&mut canvas)
            .unwrap();

        assert!(canvas.is_on(12, 4));
        assert!(canvas.is_on(15, 7));
        assert!(!canvas.is_on(11, 4));
        assert_eq!(canvas.size(), Size::new(16, 8));
    }

    #[test]
    fn test_raster_samples_canvas() {
        let mut canvas = Canvas::new(8, 8).unwrap();
        Pixel(Point::new(3, 5), BinaryColor::On).draw(&mut canvas).unwrap();
        assert!(canvas.sample(3, 5));
        canvas.blank();
        assert!(!canvas.sample(3, 5));
    }
}
