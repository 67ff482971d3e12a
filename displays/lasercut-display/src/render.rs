//! Screen rendering
//!
//! Draws a [`StatusScreen`] into a [`Canvas`]. Every render is a full
//! redraw; positions are laid out for a 32-pixel-high panel.

use core::fmt::Write;

use embedded_graphics::mono_font::ascii::{FONT_10X20, FONT_7X14};
use embedded_graphics::mono_font::{MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};
use embedded_graphics::text::Text;
use heapless::String;

use crate::canvas::Canvas;
use crate::screen::{Bar, StatusScreen};

/// Baseline of the status line
const TEXT_BASELINE: i32 = 16;

/// Left edge of the job count on the working line
const COUNT_X: i32 = 70;

/// Top of the progress bar outline
const BAR_TOP: i32 = 24;
const BAR_HEIGHT: u32 = 8;

/// Origin of the bar fill inside the outline
const FILL_X: i32 = 2;
const FILL_Y: i32 = 26;
const FILL_HEIGHT: u32 = 4;

/// Draw `screen` onto `canvas`
pub fn render(screen: &StatusScreen, canvas: &mut Canvas) {
    canvas.blank();

    if let Some(text) = screen.error() {
        draw_text(canvas, text, 0, &FONT_10X20);
        return;
    }

    if let Some(count) = screen.working() {
        draw_text(canvas, "Working: ", 0, &FONT_7X14);
        let mut digits: String<10> = String::new();
        let _ = write!(digits, "{}", count);
        draw_text(canvas, &digits, COUNT_X, &FONT_7X14);
    } else if let Some(text) = screen.message() {
        draw_text(canvas, text, 0, &FONT_7X14);
    }

    draw_bar(canvas, screen.bar());
}

/// Fill length for `percent` of a `track`-pixel bar, halves rounded up
fn span(percent: u8, track: u32) -> u32 {
    (2 * u32::from(percent) * track + 100) / 200
}

fn draw_text(canvas: &mut Canvas, text: &str, x: i32, font: &MonoFont<'_>) {
    let style = MonoTextStyle::new(font, BinaryColor::On);
    let _ = Text::new(text, Point::new(x, TEXT_BASELINE), style).draw(canvas);
}

fn fill(canvas: &mut Canvas, x: i32, y: i32, width: u32, height: u32, color: BinaryColor) {
    let _ = Rectangle::new(Point::new(x, y), Size::new(width, height))
        .into_styled(PrimitiveStyle::with_fill(color))
        .draw(canvas);
}

fn draw_bar(canvas: &mut Canvas, bar: Bar) {
    let width = u32::from(canvas.width());
    let track = width.saturating_sub(2);

    let _ = Rectangle::new(Point::new(0, BAR_TOP), Size::new(width, BAR_HEIGHT))
        .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 1))
        .draw(canvas);

    match bar {
        Bar::Empty => {}
        Bar::Progress(p) => {
            fill(canvas, FILL_X, FILL_Y, span(p.min(100), track), FILL_HEIGHT, BinaryColor::On);
        }
        Bar::Indeterminate(p) if p > 100 => {}
        Bar::Indeterminate(p) => {
            // Two half-height segments sliding towards each other
            let len = span(p, track);
            let mirror = span(100 - p, track) as i32;
            let half = FILL_HEIGHT / 2;
            let lower = FILL_Y + half as i32;
            fill(canvas, FILL_X, FILL_Y, len, half, BinaryColor::On);
            fill(canvas, mirror, lower, len, half, BinaryColor::On);
            fill(canvas, mirror, FILL_Y, len, half, BinaryColor::Off);
            fill(canvas, FILL_X, lower, len, half, BinaryColor::Off);
        }
    }
}
