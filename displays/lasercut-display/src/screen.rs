//! Status screen model
//!
//! What the panel should show, independent of how it is drawn. Display
//! commands mutate the model; the renderer turns it into pixels.

use heapless::String;
use lasercut_core::ProgressReport;

/// Maximum characters kept for the status line
pub const MAX_TEXT_LEN: usize = 32;

/// Bottom progress bar state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Bar {
    /// Outline only
    Empty,
    /// Filled to the given percentage (0..=100)
    Progress(u8),
    /// Animation frame of the "connecting" bar (0..=100)
    Indeterminate(u8),
}

impl Bar {
    /// Bar for a raw progress value; anything outside 0..=100 empties it
    pub fn from_percent(progress: i32) -> Self {
        match u8::try_from(progress) {
            Ok(p) if p <= 100 => Bar::Progress(p),
            _ => Bar::Empty,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Content {
    Message(String<MAX_TEXT_LEN>),
    Working(u32),
    Error(String<MAX_TEXT_LEN>),
}

/// Model of the status display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusScreen {
    content: Content,
    bar: Bar,
    dirty: bool,
}

impl Default for StatusScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusScreen {
    /// Blank screen with an empty bar
    pub fn new() -> Self {
        Self {
            content: Content::Message(String::new()),
            bar: Bar::Empty,
            dirty: true,
        }
    }

    /// Replace the status line
    pub fn set_message(&mut self, text: &str) {
        self.content = Content::Message(truncated(text));
        self.dirty = true;
    }

    /// Show "Working: <count>"
    pub fn set_working(&mut self, count: u32) {
        self.content = Content::Working(count);
        self.dirty = true;
    }

    pub fn set_bar(&mut self, bar: Bar) {
        self.bar = bar;
        self.dirty = true;
    }

    /// Full-screen error; hides the bar
    pub fn set_error(&mut self, text: &str) {
        self.content = Content::Error(truncated(text));
        self.dirty = true;
    }

    /// Apply a queue progress update
    ///
    /// A count switches to the working line. Without a count, `clear_text`
    /// resets the line to "Ready". The bar always follows the progress.
    pub fn apply_progress(&mut self, report: ProgressReport) {
        match report.count {
            Some(count) => self.set_working(count),
            None if report.clear_text => self.set_message("Ready"),
            None => {}
        }
        self.set_bar(Bar::from_percent(report.progress));
    }

    /// Status line text, if a message is shown
    pub fn message(&self) -> Option<&str> {
        match &self.content {
            Content::Message(text) => Some(text.as_str()),
            _ => None,
        }
    }

    /// Pending job count, if the working line is shown
    pub fn working(&self) -> Option<u32> {
        match self.content {
            Content::Working(count) => Some(count),
            _ => None,
        }
    }

    /// Error text, if the error screen is shown
    pub fn error(&self) -> Option<&str> {
        match &self.content {
            Content::Error(text) => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn bar(&self) -> Bar {
        self.bar
    }

    /// Check if screen needs redrawing
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Mark screen as clean (after rendering)
    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }
}

/// Copy of `text` cut to the line capacity on a char boundary
pub(crate) fn truncated(text: &str) -> String<MAX_TEXT_LEN> {
    let mut s = String::new();
    for c in text.chars() {
        if s.push(c).is_err() {
            break;
        }
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(progress: i32, count: Option<u32>, clear_text: bool) -> ProgressReport {
        ProgressReport {
            progress,
            count,
            clear_text,
        }
    }

    #[test]
    fn test_batch_start_shows_working() {
        let mut screen = StatusScreen::new();
        screen.set_message("Ready");
        screen.apply_progress(report(0, Some(5), true));
        assert_eq!(screen.working(), Some(5));
        assert_eq!(screen.bar(), Bar::Progress(0));
    }

    #[test]
    fn test_batch_end_shows_ready() {
        let mut screen = StatusScreen::new();
        screen.set_working(1);
        screen.apply_progress(report(-1, None, true));
        assert_eq!(screen.message(), Some("Ready"));
        assert_eq!(screen.bar(), Bar::Empty);
    }

    #[test]
    fn test_no_count_no_clear_keeps_text() {
        let mut screen = StatusScreen::new();
        screen.set_message("Starting ...");
        screen.apply_progress(report(-1, None, false));
        assert_eq!(screen.message(), Some("Starting ..."));
    }

    #[test]
    fn test_bar_from_percent() {
        assert_eq!(Bar::from_percent(40), Bar::Progress(40));
        assert_eq!(Bar::from_percent(100), Bar::Progress(100));
        assert_eq!(Bar::from_percent(101), Bar::Empty);
        assert_eq!(Bar::from_percent(-50), Bar::Empty);
    }

    #[test]
    fn test_long_message_truncated_on_char_boundary() {
        let mut screen = StatusScreen::new();
        let long = "é".repeat(40);
        screen.set_message(&long);
        assert_eq!(screen.message().map(|m| m.chars().count()), Some(16));
    }

    #[test]
    fn test_dirty_tracking() {
        let mut screen = StatusScreen::new();
        assert!(screen.is_dirty());
        screen.mark_clean();
        screen.set_bar(Bar::Indeterminate(10));
        assert!(screen.is_dirty());
    }
}
