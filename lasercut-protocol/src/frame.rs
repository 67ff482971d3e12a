//! Byte framing for the kiosk link
//!
//! ```text
//! 0xAA | LEN | TYPE | PAYLOAD (LEN bytes, max 250) | CHECKSUM
//! ```
//!
//! `CHECKSUM` is the XOR of `LEN`, `TYPE` and every payload byte. The start
//! byte is not covered, so a receiver that lost sync simply skips ahead to
//! the next `0xAA`.

use heapless::Vec;

pub const FRAME_START: u8 = 0xAA;

/// Largest payload a single frame carries
pub const MAX_PAYLOAD_SIZE: usize = 250;

/// Bytes a frame adds around its payload (START, LENGTH, TYPE, CHECKSUM)
pub const FRAME_OVERHEAD: usize = 4;

pub const MAX_FRAME_SIZE: usize = MAX_PAYLOAD_SIZE + FRAME_OVERHEAD;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// More than [`MAX_PAYLOAD_SIZE`] bytes
    PayloadTooLarge,
    InvalidChecksum,
    /// Bad length byte, or a payload of the wrong shape for its type
    InvalidFrame,
    /// Payload is not valid UTF-8 where text was expected
    InvalidText,
    /// Output buffer shorter than [`Frame::encoded_len`]
    BufferTooSmall,
}

/// One message on the wire
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub msg_type: u8,
    pub payload: Vec<u8, MAX_PAYLOAD_SIZE>,
}

fn checksum(length: u8, msg_type: u8, payload: &[u8]) -> u8 {
    payload.iter().fold(length ^ msg_type, |acc, &b| acc ^ b)
}

impl Frame {
    pub fn new(msg_type: u8, payload: &[u8]) -> Result<Self, FrameError> {
        let payload = Vec::from_slice(payload).map_err(|_| FrameError::PayloadTooLarge)?;
        Ok(Self { msg_type, payload })
    }

    /// Frame with no payload
    pub fn empty(msg_type: u8) -> Self {
        Self {
            msg_type,
            payload: Vec::new(),
        }
    }

    /// Payload interpreted as UTF-8 text
    pub fn text(&self) -> Result<&str, FrameError> {
        core::str::from_utf8(&self.payload).map_err(|_| FrameError::InvalidText)
    }

    /// Payload interpreted as a little-endian u32
    pub fn u32_le(&self) -> Result<u32, FrameError> {
        let bytes: [u8; 4] = self
            .payload
            .as_slice()
            .try_into()
            .map_err(|_| FrameError::InvalidFrame)?;
        Ok(u32::from_le_bytes(bytes))
    }

    pub fn encoded_len(&self) -> usize {
        self.payload.len() + FRAME_OVERHEAD
    }

    /// Write the frame to the front of `buffer`, returning its length
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, FrameError> {
        let out = buffer
            .get_mut(..self.encoded_len())
            .ok_or(FrameError::BufferTooSmall)?;
        let (header, rest) = out.split_at_mut(3);
        let (body, tail) = rest.split_at_mut(self.payload.len());

        // Payload capacity keeps the length within a byte
        let length = self.payload.len() as u8;
        header.copy_from_slice(&[FRAME_START, length, self.msg_type]);
        body.copy_from_slice(&self.payload);
        tail[0] = checksum(length, self.msg_type, &self.payload);
        Ok(self.encoded_len())
    }

    pub fn encode_to_vec(&self) -> Result<Vec<u8, MAX_FRAME_SIZE>, FrameError> {
        let mut out = Vec::new();
        out.resize(self.encoded_len(), 0)
            .map_err(|_| FrameError::BufferTooSmall)?;
        self.encode(&mut out)?;
        Ok(out)
    }
}

/// Where the parser is within the current frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Sync,
    Length,
    Type { length: u8 },
    Payload { length: u8, msg_type: u8 },
    Checksum { length: u8, msg_type: u8 },
}

/// Incremental frame decoder
///
/// Fed one byte at a time from the link. After any error it drops the
/// partial frame and waits for the next start byte.
#[derive(Debug, Clone)]
pub struct FrameParser {
    stage: Stage,
    payload: Vec<u8, MAX_PAYLOAD_SIZE>,
}

impl Default for FrameParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameParser {
    pub fn new() -> Self {
        Self {
            stage: Stage::Sync,
            payload: Vec::new(),
        }
    }

    /// Drop any partially received frame
    pub fn reset(&mut self) {
        self.stage = Stage::Sync;
        self.payload.clear();
    }

    /// Consume one byte
    ///
    /// `Ok(Some(frame))` completes a frame, `Ok(None)` needs more input.
    pub fn feed(&mut self, byte: u8) -> Result<Option<Frame>, FrameError> {
        self.stage = match self.stage {
            Stage::Sync if byte == FRAME_START => Stage::Length,
            Stage::Sync => Stage::Sync,
            Stage::Length if usize::from(byte) > MAX_PAYLOAD_SIZE => {
                self.reset();
                return Err(FrameError::InvalidFrame);
            }
            Stage::Length => Stage::Type { length: byte },
            Stage::Type { length: 0 } => Stage::Checksum {
                length: 0,
                msg_type: byte,
            },
            Stage::Type { length } => Stage::Payload {
                length,
                msg_type: byte,
            },
            Stage::Payload { length, msg_type } => {
                // The length check above bounds the payload
                let _ = self.payload.push(byte);
                if self.payload.len() < usize::from(length) {
                    return Ok(None);
                }
                Stage::Checksum { length, msg_type }
            }
            Stage::Checksum { length, msg_type } => {
                let valid = byte == checksum(length, msg_type, &self.payload);
                let payload = core::mem::take(&mut self.payload);
                self.stage = Stage::Sync;
                return if valid {
                    Ok(Some(Frame { msg_type, payload }))
                } else {
                    Err(FrameError::InvalidChecksum)
                };
            }
        };
        Ok(None)
    }

    /// Feed bytes until the first complete frame
    ///
    /// Bytes after that frame are left unread.
    pub fn feed_bytes(&mut self, bytes: &[u8]) -> Result<Option<Frame>, FrameError> {
        for &byte in bytes {
            if let Some(frame) = self.feed(byte)? {
                return Ok(Some(frame));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_encode_empty_payload() {
        let frame = Frame::empty(0x43);
        let mut buffer = [0u8; 8];
        let len = frame.encode(&mut buffer).unwrap();

        assert_eq!(len, 4);
        assert_eq!(&buffer[..4], &[FRAME_START, 0, 0x43, 0x43]);
    }

    #[test]
    fn test_encode_u32_payload() {
        let frame = Frame::new(0x42, &7u32.to_le_bytes()).unwrap();
        let bytes = frame.encode_to_vec().unwrap();

        assert_eq!(bytes.len(), 8);
        assert_eq!(bytes[1], 4);
        assert_eq!(bytes[2], 0x42);
        assert_eq!(bytes[7], 4 ^ 0x42 ^ 7);
    }

    #[test]
    fn test_buffer_too_small() {
        let frame = Frame::new(0x41, b"port opened").unwrap();
        let mut buffer = [0u8; 8];
        assert_eq!(frame.encode(&mut buffer), Err(FrameError::BufferTooSmall));
    }

    #[test]
    fn test_payload_too_large() {
        let payload = [0u8; MAX_PAYLOAD_SIZE + 1];
        assert_eq!(Frame::new(0x15, &payload), Err(FrameError::PayloadTooLarge));
    }

    #[test]
    fn test_text_and_u32_accessors() {
        let frame = Frame::new(0x41, b"closed").unwrap();
        assert_eq!(frame.text(), Ok("closed"));
        assert_eq!(frame.u32_le(), Err(FrameError::InvalidFrame));

        let frame = Frame::new(0x41, &[0xFF, 0xFE]).unwrap();
        assert_eq!(frame.text(), Err(FrameError::InvalidText));
    }

    #[test]
    fn test_parser_rejects_corrupt_checksum() {
        let mut encoded = Frame::new(0x42, &3u32.to_le_bytes())
            .unwrap()
            .encode_to_vec()
            .unwrap();
        let last = encoded.len() - 1;
        encoded[last] ^= 0x5A;

        let mut parser = FrameParser::new();
        assert_eq!(parser.feed_bytes(&encoded), Err(FrameError::InvalidChecksum));
    }

    #[test]
    fn test_parser_rejects_oversized_length() {
        let mut parser = FrameParser::new();
        assert_eq!(parser.feed(FRAME_START), Ok(None));
        assert_eq!(parser.feed(0xFF), Err(FrameError::InvalidFrame));
    }

    #[test]
    fn test_parser_resync_after_garbage() {
        let encoded = Frame::empty(0x40).encode_to_vec().unwrap();
        let mut data = Vec::<u8, 16>::new();
        data.extend_from_slice(&[0x00, 0x13, 0x37]).unwrap();
        data.extend_from_slice(&encoded).unwrap();

        let mut parser = FrameParser::new();
        let parsed = parser.feed_bytes(&data).unwrap().unwrap();
        assert_eq!(parsed.msg_type, 0x40);
    }

    #[test]
    fn test_parser_handles_back_to_back_frames() {
        let first = Frame::new(0x41, b"opened").unwrap().encode_to_vec().unwrap();
        let second = Frame::empty(0x43).encode_to_vec().unwrap();

        let mut parser = FrameParser::new();
        let mut frames = Vec::<Frame, 2>::new();
        for &byte in first.iter().chain(second.iter()) {
            if let Some(frame) = parser.feed(byte).unwrap() {
                frames.push(frame).unwrap();
            }
        }

        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].text(), Ok("opened"));
        assert_eq!(frames[1].msg_type, 0x43);
    }

    proptest! {
        #[test]
        fn test_parser_recovers_any_payload(
            msg_type in any::<u8>(),
            payload in proptest::collection::vec(any::<u8>(), 0..=MAX_PAYLOAD_SIZE),
        ) {
            let frame = Frame::new(msg_type, &payload).unwrap();
            let encoded = frame.encode_to_vec().unwrap();

            let mut parser = FrameParser::new();
            let parsed = parser.feed_bytes(&encoded).unwrap();
            prop_assert_eq!(parsed, Some(frame));
        }
    }
}
