//! Message types for the kiosk link
//!
//! Message types are divided into two categories:
//! - Server → Kiosk: session acceptance, port status, queue depth, heartbeats
//! - Kiosk → Server: session request, machine commands, heartbeat responses

use crate::frame::{Frame, FrameError, MAX_PAYLOAD_SIZE};
use crate::status::PortStatus;

// Message type IDs: Kiosk → Server
pub const MSG_HELLO: u8 = 0x01;
pub const MSG_PONG: u8 = 0x02;
pub const MSG_CONNECT_TO: u8 = 0x10;
pub const MSG_STOP: u8 = 0x11;
pub const MSG_CLEAR_ALARM: u8 = 0x12;
pub const MSG_SET_ZERO: u8 = 0x13;
pub const MSG_RUN_JOB_BEGIN: u8 = 0x14;
pub const MSG_RUN_JOB_DATA: u8 = 0x15;
pub const MSG_RUN_JOB_END: u8 = 0x16;
pub const MSG_LASER_TEST: u8 = 0x17;

// Message type IDs: Server → Kiosk
pub const MSG_WELCOME: u8 = 0x40;
pub const MSG_CONNECT_STATUS: u8 = 0x41;
pub const MSG_QUEUE_COUNT: u8 = 0x42;
pub const MSG_PING: u8 = 0x43;

/// Messages pushed by the job server
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ServerMessage<'a> {
    /// Session accepted (reply to HELLO)
    Welcome,
    /// Free-text status of the server's serial port to the machine
    ConnectStatus(&'a str),
    /// Number of jobs pending in the server queue
    QueueCount(u32),
    /// Heartbeat request
    Ping,
}

impl<'a> ServerMessage<'a> {
    /// Parse a message from a frame
    pub fn from_frame(frame: &'a Frame) -> Result<Self, FrameError> {
        match frame.msg_type {
            MSG_WELCOME => Ok(ServerMessage::Welcome),
            MSG_CONNECT_STATUS => Ok(ServerMessage::ConnectStatus(frame.text()?)),
            MSG_QUEUE_COUNT => Ok(ServerMessage::QueueCount(frame.u32_le()?)),
            MSG_PING => Ok(ServerMessage::Ping),
            _ => Err(FrameError::InvalidFrame),
        }
    }

    /// Encode this message into a frame (for testing or simulation)
    pub fn to_frame(&self) -> Result<Frame, FrameError> {
        match self {
            ServerMessage::Welcome => Ok(Frame::empty(MSG_WELCOME)),
            ServerMessage::ConnectStatus(text) => Frame::new(MSG_CONNECT_STATUS, text.as_bytes()),
            ServerMessage::QueueCount(count) => Frame::new(MSG_QUEUE_COUNT, &count.to_le_bytes()),
            ServerMessage::Ping => Ok(Frame::empty(MSG_PING)),
        }
    }

    /// Port status carried by a `ConnectStatus` message, if recognizable
    pub fn port_status(&self) -> Option<PortStatus> {
        match self {
            ServerMessage::ConnectStatus(text) => PortStatus::from_text(text),
            _ => None,
        }
    }
}

/// Commands sent from the kiosk to the job server
///
/// A `RunJob` is larger than a single frame; it is encoded as one
/// `RUN_JOB_BEGIN`, any number of `RUN_JOB_DATA` and one `RUN_JOB_END`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClientCommand<'a> {
    /// Session request
    Hello,
    /// Heartbeat response
    Pong,
    /// Ask the server to open its serial port ("transport,port,baud")
    ConnectTo(&'a str),
    /// Stop the running job
    Stop,
    /// Clear the machine alarm
    ClearAlarm(&'a str),
    /// Zero the given axes
    SetZero(&'a str),
    /// Queue a job with the given G-code content
    RunJob(&'a [u8]),
    /// Fire the diagnostic laser test with the given parameters
    LaserTest(&'a str),
}

impl<'a> ClientCommand<'a> {
    /// Event name as used by the job server
    pub fn event_name(&self) -> &'static str {
        match self {
            ClientCommand::Hello => "hello",
            ClientCommand::Pong => "pong",
            ClientCommand::ConnectTo(_) => "connectTo",
            ClientCommand::Stop => "stop",
            ClientCommand::ClearAlarm(_) => "clearAlarm",
            ClientCommand::SetZero(_) => "setZero",
            ClientCommand::RunJob(_) => "runJob",
            ClientCommand::LaserTest(_) => "laserTest",
        }
    }

    /// Iterate over the frames that make up this command
    pub fn frames(&self) -> CommandFrames<'a> {
        CommandFrames {
            command: *self,
            stage: Stage::Head,
            offset: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Head,
    Data,
    End,
    Done,
}

/// Iterator that encodes a command into frames
#[derive(Debug, Clone)]
pub struct CommandFrames<'a> {
    command: ClientCommand<'a>,
    stage: Stage,
    offset: usize,
}

impl<'a> Iterator for CommandFrames<'a> {
    type Item = Result<Frame, FrameError>;

    fn next(&mut self) -> Option<Self::Item> {
        match (self.stage, self.command) {
            (Stage::Done, _) => None,
            (Stage::Head, ClientCommand::RunJob(content)) => {
                self.stage = Stage::Data;
                let total = match u32::try_from(content.len()) {
                    Ok(total) => total,
                    Err(_) => {
                        self.stage = Stage::Done;
                        return Some(Err(FrameError::PayloadTooLarge));
                    }
                };
                Some(Frame::new(MSG_RUN_JOB_BEGIN, &total.to_le_bytes()))
            }
            (Stage::Data, ClientCommand::RunJob(content)) => {
                if self.offset >= content.len() {
                    self.stage = Stage::End;
                    return self.next();
                }
                let end = (self.offset + MAX_PAYLOAD_SIZE).min(content.len());
                let chunk = &content[self.offset..end];
                self.offset = end;
                Some(Frame::new(MSG_RUN_JOB_DATA, chunk))
            }
            (Stage::End, _) => {
                self.stage = Stage::Done;
                Some(Ok(Frame::empty(MSG_RUN_JOB_END)))
            }
            (_, command) => {
                self.stage = Stage::Done;
                Some(single_frame(command))
            }
        }
    }
}

fn single_frame(command: ClientCommand<'_>) -> Result<Frame, FrameError> {
    match command {
        ClientCommand::Hello => Ok(Frame::empty(MSG_HELLO)),
        ClientCommand::Pong => Ok(Frame::empty(MSG_PONG)),
        ClientCommand::ConnectTo(target) => Frame::new(MSG_CONNECT_TO, target.as_bytes()),
        ClientCommand::Stop => Ok(Frame::empty(MSG_STOP)),
        ClientCommand::ClearAlarm(arg) => Frame::new(MSG_CLEAR_ALARM, arg.as_bytes()),
        ClientCommand::SetZero(axes) => Frame::new(MSG_SET_ZERO, axes.as_bytes()),
        ClientCommand::LaserTest(params) => Frame::new(MSG_LASER_TEST, params.as_bytes()),
        ClientCommand::RunJob(_) => Err(FrameError::InvalidFrame),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(command: ClientCommand<'_>) -> std::vec::Vec<Frame> {
        command.frames().map(|f| f.unwrap()).collect()
    }

    #[test]
    fn test_server_queue_count() {
        let frame = Frame::new(MSG_QUEUE_COUNT, &12u32.to_le_bytes()).unwrap();
        assert_eq!(
            ServerMessage::from_frame(&frame),
            Ok(ServerMessage::QueueCount(12))
        );
    }

    #[test]
    fn test_server_queue_count_bad_length() {
        let frame = Frame::new(MSG_QUEUE_COUNT, &[1, 2]).unwrap();
        assert_eq!(
            ServerMessage::from_frame(&frame),
            Err(FrameError::InvalidFrame)
        );
    }

    #[test]
    fn test_server_connect_status() {
        let frame = ServerMessage::ConnectStatus("port /dev/ttyUSB0 opened")
            .to_frame()
            .unwrap();
        let msg = ServerMessage::from_frame(&frame).unwrap();
        assert_eq!(msg, ServerMessage::ConnectStatus("port /dev/ttyUSB0 opened"));
        assert_eq!(msg.port_status(), Some(PortStatus::Opened));
    }

    #[test]
    fn test_server_unknown_type() {
        let frame = Frame::empty(0x7F);
        assert_eq!(
            ServerMessage::from_frame(&frame),
            Err(FrameError::InvalidFrame)
        );
    }

    #[test]
    fn test_simple_commands_are_single_frames() {
        let frames = collect(ClientCommand::ClearAlarm("2"));
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].msg_type, MSG_CLEAR_ALARM);
        assert_eq!(frames[0].text(), Ok("2"));

        let frames = collect(ClientCommand::Stop);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].msg_type, MSG_STOP);
        assert!(frames[0].payload.is_empty());
    }

    #[test]
    fn test_run_job_is_chunked() {
        let content = [b'G'; MAX_PAYLOAD_SIZE * 2 + 10];
        let frames = collect(ClientCommand::RunJob(&content));

        assert_eq!(frames.len(), 5);
        assert_eq!(frames[0].msg_type, MSG_RUN_JOB_BEGIN);
        assert_eq!(frames[0].u32_le(), Ok(content.len() as u32));
        assert_eq!(frames[1].payload.len(), MAX_PAYLOAD_SIZE);
        assert_eq!(frames[2].payload.len(), MAX_PAYLOAD_SIZE);
        assert_eq!(frames[3].payload.len(), 10);
        assert!(frames[1..4].iter().all(|f| f.msg_type == MSG_RUN_JOB_DATA));
        assert_eq!(frames[4].msg_type, MSG_RUN_JOB_END);
    }

    #[test]
    fn test_empty_run_job() {
        let frames = collect(ClientCommand::RunJob(&[]));
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].u32_le(), Ok(0));
        assert_eq!(frames[1].msg_type, MSG_RUN_JOB_END);
    }

    #[test]
    fn test_oversized_text_argument() {
        let long = "x".repeat(MAX_PAYLOAD_SIZE + 1);
        let mut frames = ClientCommand::LaserTest(&long).frames();
        assert_eq!(frames.next(), Some(Err(FrameError::PayloadTooLarge)));
        assert_eq!(frames.next(), None);
    }

    #[test]
    fn test_event_names() {
        assert_eq!(ClientCommand::ConnectTo("USB,/dev/ttyUSB0,115200").event_name(), "connectTo");
        assert_eq!(ClientCommand::RunJob(b"G0").event_name(), "runJob");
        assert_eq!(ClientCommand::LaserTest("0.5").event_name(), "laserTest");
    }
}
