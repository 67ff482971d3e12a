//! Debounced push button
//!
//! Buttons are wired active-low with a pull-up. A press is a falling edge
//! that is still low once the debounce interval has passed.

use embedded_hal::digital::InputPin;
use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::digital::Wait;

/// Active-low push button
pub struct Button<P, D> {
    pin: P,
    delay: D,
    debounce_us: u32,
}

impl<P, D> Button<P, D>
where
    P: Wait + InputPin,
    D: DelayNs,
{
    pub fn new(pin: P, delay: D, debounce_us: u32) -> Self {
        Self {
            pin,
            delay,
            debounce_us,
        }
    }

    /// Wait until the button is pressed
    ///
    /// Edges that do not stay low for the debounce interval are ignored.
    pub async fn wait_for_press(&mut self) -> Result<(), P::Error> {
        loop {
            self.pin.wait_for_falling_edge().await?;
            self.delay.delay_us(self.debounce_us).await;
            if self.pin.is_low()? {
                return Ok(());
            }
        }
    }

    /// Wait until the button is released
    pub async fn wait_for_release(&mut self) -> Result<(), P::Error> {
        loop {
            self.pin.wait_for_high().await?;
            self.delay.delay_us(self.debounce_us).await;
            if self.pin.is_high()? {
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_futures::block_on;
    use embedded_hal::digital::{ErrorKind, ErrorType};
    use std::collections::VecDeque;

    /// Pin whose edges fire immediately; levels come from a script
    struct ScriptedPin {
        levels: VecDeque<bool>,
        edges: usize,
    }

    impl ErrorType for ScriptedPin {
        type Error = ErrorKind;
    }

    impl InputPin for ScriptedPin {
        fn is_high(&mut self) -> Result<bool, ErrorKind> {
            self.levels.pop_front().ok_or(ErrorKind::Other)
        }

        fn is_low(&mut self) -> Result<bool, ErrorKind> {
            self.is_high().map(|high| !high)
        }
    }

    impl Wait for ScriptedPin {
        async fn wait_for_high(&mut self) -> Result<(), ErrorKind> {
            self.edges += 1;
            Ok(())
        }

        async fn wait_for_low(&mut self) -> Result<(), ErrorKind> {
            self.edges += 1;
            Ok(())
        }

        async fn wait_for_rising_edge(&mut self) -> Result<(), ErrorKind> {
            self.edges += 1;
            Ok(())
        }

        async fn wait_for_falling_edge(&mut self) -> Result<(), ErrorKind> {
            self.edges += 1;
            Ok(())
        }

        async fn wait_for_any_edge(&mut self) -> Result<(), ErrorKind> {
            self.edges += 1;
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingDelay {
        us: std::vec::Vec<u32>,
    }

    impl DelayNs for RecordingDelay {
        async fn delay_ns(&mut self, ns: u32) {
            self.us.push(ns / 1000);
        }

        async fn delay_us(&mut self, us: u32) {
            self.us.push(us);
        }
    }

    fn button(levels: &[bool]) -> Button<ScriptedPin, RecordingDelay> {
        let pin = ScriptedPin {
            levels: levels.iter().copied().collect(),
            edges: 0,
        };
        Button::new(pin, RecordingDelay::default(), 3000)
    }

    #[test]
    fn test_press_after_debounce() {
        let mut button = button(&[false]);
        block_on(button.wait_for_press()).unwrap();
        assert_eq!(button.pin.edges, 1);
        assert_eq!(button.delay.us, [3000]);
    }

    #[test]
    fn test_glitch_is_ignored() {
        // First edge bounces back high before the debounce ends
        let mut button = button(&[true, false]);
        block_on(button.wait_for_press()).unwrap();
        assert_eq!(button.pin.edges, 2);
        assert_eq!(button.delay.us, [3000, 3000]);
    }

    #[test]
    fn test_release() {
        let mut button = button(&[false, true]);
        block_on(button.wait_for_release()).unwrap();
        assert_eq!(button.pin.edges, 2);
    }

    #[test]
    fn test_pin_error_propagates() {
        let mut button = button(&[]);
        assert_eq!(block_on(button.wait_for_press()), Err(ErrorKind::Other));
    }
}
