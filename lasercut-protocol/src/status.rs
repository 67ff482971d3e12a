//! Port status reported by the job server
//!
//! The server describes its serial connection to the machine controller as
//! free text ("port /dev/ttyUSB0 opened", "connection closed: ..."). Only the
//! words "opened" and "closed" carry meaning; everything else is ignored.

/// State of the server's serial port to the machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PortStatus {
    /// The port is open and commands will reach the machine
    Opened,
    /// The port is closed
    Closed,
}

impl PortStatus {
    /// Match a free-text status payload
    ///
    /// "closed" is checked before "opened", so a payload mentioning both
    /// (e.g. "opened then closed") ends up `Opened`, matching the order in
    /// which the server's messages are applied.
    pub fn from_text(text: &str) -> Option<Self> {
        let mut status = None;
        if text.contains("closed") {
            status = Some(PortStatus::Closed);
        }
        if text.contains("opened") {
            status = Some(PortStatus::Opened);
        }
        status
    }

    /// Returns true if the port is open
    pub fn is_open(self) -> bool {
        self == PortStatus::Opened
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opened() {
        assert_eq!(
            PortStatus::from_text("USB,/dev/ttyUSB0 opened"),
            Some(PortStatus::Opened)
        );
    }

    #[test]
    fn test_closed() {
        assert_eq!(
            PortStatus::from_text("port closed by machine"),
            Some(PortStatus::Closed)
        );
    }

    #[test]
    fn test_unrelated_text() {
        assert_eq!(PortStatus::from_text("Connecting to USB"), None);
        assert_eq!(PortStatus::from_text(""), None);
    }

    #[test]
    fn test_both_words_prefers_opened() {
        assert_eq!(
            PortStatus::from_text("closed, then opened again"),
            Some(PortStatus::Opened)
        );
    }

    #[test]
    fn test_is_open() {
        assert!(PortStatus::Opened.is_open());
        assert!(!PortStatus::Closed.is_open());
    }
}
