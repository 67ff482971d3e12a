//! Display updates and their target
//!
//! Producers build a [`StatusCommand`] and submit it to the display queue.
//! The display task owns the [`StatusDisplay`] and executes whatever command
//! is newest.

use heapless::String;
use lasercut_core::{DisplayCommand, ProgressReport};
use lasercut_drivers::display::{DisplayError, Ssd1306};
use lasercut_hal::RegisterBus;

use crate::canvas::Canvas;
use crate::render::render;
use crate::screen::{truncated, Bar, StatusScreen, MAX_TEXT_LEN};

/// A status display update
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StatusCommand {
    /// Replace the status line, keep the bar
    Message(String<MAX_TEXT_LEN>),
    /// Queue progress pushed by the job server
    Progress(ProgressReport),
    /// One frame of the connecting animation (0..=100)
    Connecting { phase: u8 },
    /// "Ready" with an empty bar
    Ready,
    /// Full-screen error
    Error(String<MAX_TEXT_LEN>),
}

impl StatusCommand {
    /// Status line update; text beyond the line capacity is dropped
    pub fn message(text: &str) -> Self {
        StatusCommand::Message(truncated(text))
    }

    /// Error screen update
    pub fn error(text: &str) -> Self {
        StatusCommand::Error(truncated(text))
    }

    /// Screen to show once the job server is reached
    ///
    /// "Ready", unless a batch is still running from before the link dropped.
    pub fn connected(batch: Option<ProgressReport>) -> Self {
        batch.map_or(StatusCommand::Ready, StatusCommand::Progress)
    }
}

/// The display as seen by the display task
pub struct StatusDisplay<B> {
    driver: Ssd1306<B>,
    canvas: Canvas,
    screen: StatusScreen,
}

impl<B: RegisterBus> StatusDisplay<B> {
    /// Wrap an (uninitialized) panel driver
    pub fn new(driver: Ssd1306<B>) -> Result<Self, DisplayError<B::Error>> {
        let canvas = Canvas::new(driver.width(), driver.height()).ok_or(DisplayError::Geometry)?;
        Ok(Self {
            driver,
            canvas,
            screen: StatusScreen::new(),
        })
    }

    /// Initialize the panel
    pub async fn begin(&mut self) -> Result<(), DisplayError<B::Error>> {
        self.driver.begin().await
    }

    pub fn screen(&self) -> &StatusScreen {
        &self.screen
    }

    /// Update the screen model without drawing
    pub fn apply(&mut self, command: StatusCommand) {
        match command {
            StatusCommand::Message(text) => self.screen.set_message(&text),
            StatusCommand::Progress(report) => self.screen.apply_progress(report),
            StatusCommand::Connecting { phase } => self.screen.set_bar(Bar::Indeterminate(phase)),
            StatusCommand::Ready => {
                self.screen.set_message("Ready");
                self.screen.set_bar(Bar::Empty);
            }
            StatusCommand::Error(text) => self.screen.set_error(&text),
        }
    }

    /// Redraw and flush if the screen changed
    pub async fn refresh(&mut self) -> Result<(), DisplayError<B::Error>> {
        if !self.screen.is_dirty() {
            return Ok(());
        }
        render(&self.screen, &mut self.canvas);
        self.driver.apply_raster(&self.canvas).await?;
        self.screen.mark_clean();
        Ok(())
    }

    /// Give back the panel driver
    pub fn release(self) -> Ssd1306<B> {
        self.driver
    }
}

impl<B: RegisterBus> DisplayCommand<StatusDisplay<B>> for StatusCommand {
    type Error = DisplayError<B::Error>;

    async fn execute(self, display: &mut StatusDisplay<B>) -> Result<(), DisplayError<B::Error>> {
        display.apply(self);
        display.refresh().await
    }
}
