//! Frame-level reading and writing on the link halves

use embedded_io_async::{Error as _, ErrorKind, Read, Write};
use lasercut_protocol::{ClientCommand, Frame, FrameParser, MAX_FRAME_SIZE};

/// Why reading the next frame stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReadError {
    /// The peer closed the link
    Closed,
    /// The transport reported an error
    Link(ErrorKind),
}

/// Pulls whole frames out of a byte stream
///
/// Malformed frames are skipped; the parser resynchronizes on the next
/// start byte.
pub struct FrameReader<R> {
    rx: R,
    parser: FrameParser,
    buf: [u8; MAX_FRAME_SIZE],
    pos: usize,
    len: usize,
}

impl<R: Read> FrameReader<R> {
    pub fn new(rx: R) -> Self {
        Self {
            rx,
            parser: FrameParser::new(),
            buf: [0; MAX_FRAME_SIZE],
            pos: 0,
            len: 0,
        }
    }

    /// Wait for the next valid frame
    pub async fn next_frame(&mut self) -> Result<Frame, ReadError> {
        loop {
            while self.pos < self.len {
                let byte = self.buf[self.pos];
                self.pos += 1;
                match self.parser.feed(byte) {
                    Ok(Some(frame)) => return Ok(frame),
                    Ok(None) => {}
                    Err(_e) => {
                        #[cfg(feature = "defmt")]
                        defmt::debug!("Dropped malformed frame: {}", _e);
                    }
                }
            }

            let n = self.rx.read(&mut self.buf).await.map_err(|e| ReadError::Link(e.kind()))?;
            if n == 0 {
                return Err(ReadError::Closed);
            }
            self.pos = 0;
            self.len = n;
        }
    }
}

/// Why writing a command failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WriteError {
    Frame(lasercut_protocol::FrameError),
    Link(ErrorKind),
}

/// Write every frame of `command` and flush
pub async fn write_command<W: Write>(tx: &mut W, command: ClientCommand<'_>) -> Result<(), WriteError> {
    for frame in command.frames() {
        let bytes = frame.and_then(|f| f.encode_to_vec()).map_err(WriteError::Frame)?;
        tx.write_all(&bytes).await.map_err(|e| WriteError::Link(e.kind()))?;
    }
    tx.flush().await.map_err(|e| WriteError::Link(e.kind()))
}
