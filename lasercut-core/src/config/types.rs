//! Kiosk configuration sections

use core::fmt::Write;

use heapless::String;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum length of short command arguments ("2", "all")
pub const MAX_ARG_LEN: usize = 16;

/// Maximum length of the laser test parameter string
pub const MAX_PARAMS_LEN: usize = 32;

/// Maximum length of the port transport name
pub const MAX_TRANSPORT_LEN: usize = 8;

/// Maximum length of the machine port path
pub const MAX_PATH_LEN: usize = 32;

/// Maximum length of the assembled connect string
pub const MAX_CONNECT_LEN: usize = 64;

/// Link to the bridge host and reconnect timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LinkConfig {
    /// Fixed backoff before reopening a lost connection (ms)
    pub reconnect_delay_ms: u32,
    /// Pause after every emitted command (ms)
    pub settle_delay_ms: u32,
    /// Upper bound on the port handshake wait; `None` waits forever
    pub handshake_timeout_ms: Option<u32>,
    /// Bound on the HELLO/WELCOME exchange (ms)
    pub connect_timeout_ms: u32,
    /// Silence after which the link counts as lost; `None` disables
    pub link_timeout_ms: Option<u32>,
    /// UART baud rate to the bridge host
    pub baudrate: u32,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            reconnect_delay_ms: 2000,
            settle_delay_ms: 100,
            handshake_timeout_ms: Some(30_000),
            connect_timeout_ms: 3000,
            link_timeout_ms: Some(5000),
            baudrate: 115_200,
        }
    }
}

/// The server-side serial port to the laser controller
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PortConfig {
    /// Transport name understood by the server ("USB")
    pub transport: String<MAX_TRANSPORT_LEN>,
    /// Device path on the server host
    pub path: String<MAX_PATH_LEN>,
    /// Controller baud rate
    pub baudrate: u32,
}

impl PortConfig {
    /// The `connectTo` argument: "transport,path,baud"
    pub fn connect_string(&self) -> String<MAX_CONNECT_LEN> {
        let mut s = String::new();
        // Capacity covers the longest transport and path plus a u32
        let _ = write!(s, "{},{},{}", self.transport, self.path, self.baudrate);
        s
    }
}

impl Default for PortConfig {
    fn default() -> Self {
        Self {
            transport: str_or_empty("USB"),
            path: str_or_empty("/dev/ttyUSB0"),
            baudrate: 115_200,
        }
    }
}

/// Arguments of the machine commands
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CommandConfig {
    /// Argument of `clearAlarm`
    pub clear_alarm: String<MAX_ARG_LEN>,
    /// Axes argument of `setZero`
    pub set_zero_axes: String<MAX_ARG_LEN>,
    /// Parameters of `laserTest` (power, duration, period)
    pub laser_test: String<MAX_PARAMS_LEN>,
}

impl Default for CommandConfig {
    fn default() -> Self {
        Self {
            clear_alarm: str_or_empty("2"),
            set_zero_axes: str_or_empty("all"),
            laser_test: str_or_empty("0.5, 15000, 1000"),
        }
    }
}

/// Panel mounting orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Rotation {
    /// Column 0 on the left, page 0 on top
    Normal,
    /// Rotated by 180 degrees
    #[default]
    UpsideDown,
}

/// Display panel geometry and wiring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DisplayConfig {
    /// Width in pixels
    pub width: u8,
    /// Height in pixels
    pub height: u8,
    /// 7-bit I2C address
    pub i2c_address: u8,
    /// Mounting orientation
    pub rotation: Rotation,
    /// Panel powered from an external VCC rail instead of its charge pump
    pub external_vcc: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: 128,
            height: 32,
            i2c_address: 0x3C,
            rotation: Rotation::UpsideDown,
            external_vcc: false,
        }
    }
}

/// Button inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct InputConfig {
    /// Debounce interval (µs)
    pub debounce_us: u32,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self { debounce_us: 3000 }
    }
}

/// Job file limits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct JobConfig {
    /// Largest job content accepted for submission (bytes)
    pub max_size: u32,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            max_size: 64 * 1024,
        }
    }
}

/// Complete kiosk configuration
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct KioskConfig {
    pub link: LinkConfig,
    pub port: PortConfig,
    pub commands: CommandConfig,
    pub display: DisplayConfig,
    pub input: InputConfig,
    pub job: JobConfig,
}

fn str_or_empty<const N: usize>(s: &str) -> String<N> {
    String::try_from(s).unwrap_or_default()
}
