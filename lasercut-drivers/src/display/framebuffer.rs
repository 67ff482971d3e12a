//! Page-organized monochrome framebuffer
//!
//! One bit per pixel. Rows are grouped into 8-pixel pages; within a page,
//! each byte is one column with bit `y % 8` holding row `y`. This is the
//! layout SSD1306-class controllers take in horizontal addressing mode.

use heapless::Vec;

/// Widest supported panel
pub const MAX_WIDTH: u16 = 128;

/// Tallest supported panel
pub const MAX_HEIGHT: u16 = 64;

/// Largest supported buffer (128x64)
pub const MAX_BUFFER_SIZE: usize = MAX_WIDTH as usize * MAX_HEIGHT as usize / 8;

/// A source of pixels that can be copied into the framebuffer
pub trait Raster {
    /// Whether the pixel at (`x`, `y`) is lit
    fn sample(&self, x: i32, y: i32) -> bool;
}

/// Monochrome bitmap in controller page order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Framebuffer {
    width: u16,
    height: u16,
    pages: u16,
    buffer: Vec<u8, MAX_BUFFER_SIZE>,
}

impl Framebuffer {
    /// Create a cleared framebuffer of the given size
    ///
    /// Returns `None` for an empty geometry or one wider than [`MAX_WIDTH`]
    /// or taller than [`MAX_HEIGHT`].
    pub fn new(width: u16, height: u16) -> Option<Self> {
        if !(1..=MAX_WIDTH).contains(&width) || !(1..=MAX_HEIGHT).contains(&height) {
            return None;
        }
        let pages = height.div_ceil(8);
        let size = usize::from(width) * usize::from(pages);
        let mut buffer = Vec::new();
        buffer.resize(size, 0).ok()?;
        Some(Self {
            width,
            height,
            pages,
            buffer,
        })
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    /// Number of 8-row pages
    pub fn pages(&self) -> u16 {
        self.pages
    }

    /// Raw buffer, `width * pages` bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Turn every pixel off
    pub fn clear(&mut self) {
        self.buffer.fill(0);
    }

    /// Set or clear one pixel
    ///
    /// Returns `false` and leaves the buffer untouched when (`x`, `y`) is
    /// outside the display.
    pub fn set_pixel(&mut self, x: i32, y: i32, on: bool) -> bool {
        let Some((index, mask)) = self.locate(x, y) else {
            return false;
        };
        if on {
            self.buffer[index] |= mask;
        } else {
            self.buffer[index] &= !mask;
        }
        true
    }

    /// Read one pixel; out-of-bounds pixels read as off
    pub fn pixel(&self, x: i32, y: i32) -> bool {
        self.locate(x, y)
            .is_some_and(|(index, mask)| self.buffer[index] & mask != 0)
    }

    /// Copy every pixel of `source` into the buffer
    pub fn copy_from<R: Raster + ?Sized>(&mut self, source: &R) {
        for y in 0..i32::from(self.height) {
            for x in 0..i32::from(self.width) {
                self.set_pixel(x, y, source.sample(x, y));
            }
        }
    }

    fn locate(&self, x: i32, y: i32) -> Option<(usize, u8)> {
        if x < 0 || y < 0 || x >= i32::from(self.width) || y >= i32::from(self.height) {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        Some((x + (y / 8) * usize::from(self.width), 1 << (y % 8)))
    }
}
