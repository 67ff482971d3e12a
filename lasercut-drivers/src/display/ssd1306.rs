//! SSD1306 OLED Display Driver
//!
//! Page framebuffer driver for SSD1306 panels (128x64, 128x32, 96x16) on any
//! [`RegisterBus`]. Drawing only touches the local buffer; [`Ssd1306::flush`]
//! is the only bulk transfer.

use lasercut_core::config::Rotation;
use lasercut_hal::RegisterBus;

use super::framebuffer::{Framebuffer, Raster};
use super::DisplayError;

/// SSD1306 commands
mod cmd {
    pub const SET_CONTRAST: u8 = 0x81;
    pub const DISPLAY_ALL_ON_RESUME: u8 = 0xA4;
    pub const NORMAL_DISPLAY: u8 = 0xA6;
    pub const INVERT_DISPLAY: u8 = 0xA7;
    pub const DISPLAY_OFF: u8 = 0xAE;
    pub const DISPLAY_ON: u8 = 0xAF;
    pub const SET_DISPLAY_OFFSET: u8 = 0xD3;
    pub const SET_COM_PINS: u8 = 0xDA;
    pub const SET_VCOM_DETECT: u8 = 0xDB;
    pub const SET_CLOCK_DIV: u8 = 0xD5;
    pub const SET_PRECHARGE: u8 = 0xD9;
    pub const SET_MULTIPLEX: u8 = 0xA8;
    pub const SET_START_LINE: u8 = 0x40;
    pub const MEMORY_MODE: u8 = 0x20;
    pub const COLUMN_ADDR: u8 = 0x21;
    pub const PAGE_ADDR: u8 = 0x22;
    pub const COM_SCAN_INC: u8 = 0xC0;
    pub const COM_SCAN_DEC: u8 = 0xC8;
    pub const SEG_REMAP: u8 = 0xA0;
    pub const CHARGE_PUMP: u8 = 0x8D;
}

/// Panel power supply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum VccMode {
    /// Internal charge pump
    #[default]
    SwitchCap,
    /// External VCC supply
    External,
}

impl VccMode {
    fn charge_pump(self) -> u8 {
        match self {
            VccMode::SwitchCap => 0x14,
            VccMode::External => 0x10,
        }
    }

    fn contrast(self) -> u8 {
        match self {
            VccMode::SwitchCap => 0xCF,
            VccMode::External => 0x9F,
        }
    }

    fn precharge(self) -> u8 {
        match self {
            VccMode::SwitchCap => 0xF1,
            VccMode::External => 0x22,
        }
    }
}

/// Multiplex ratio, COM pins and clock divider for known panels
fn panel_timing(width: u16, height: u16) -> Option<(u8, u8, u8)> {
    match (width, height) {
        (128, 64) => Some((0x3F, 0x12, 0x80)),
        (128, 32) => Some((0x1F, 0x02, 0x80)),
        (96, 16) => Some((0x0F, 0x02, 0x60)),
        _ => None,
    }
}

/// Segment remap and COM scan commands for an orientation
fn scan_direction(rotation: Rotation) -> [u8; 2] {
    match rotation {
        Rotation::Normal => [cmd::SEG_REMAP | 0x01, cmd::COM_SCAN_DEC],
        Rotation::UpsideDown => [cmd::SEG_REMAP, cmd::COM_SCAN_INC],
    }
}

/// SSD1306 OLED driver
pub struct Ssd1306<B> {
    bus: B,
    framebuffer: Framebuffer,
    vcc: VccMode,
    rotation: Rotation,
}

impl<B: RegisterBus> Ssd1306<B> {
    /// Create a driver for a `width` x `height` panel
    pub fn new(bus: B, width: u16, height: u16) -> Result<Self, DisplayError<B::Error>> {
        let framebuffer = Framebuffer::new(width, height).ok_or(DisplayError::Geometry)?;
        Ok(Self {
            bus,
            framebuffer,
            vcc: VccMode::default(),
            rotation: Rotation::Normal,
        })
    }

    /// Use the given power supply mode at the next `begin`
    pub fn with_vcc(mut self, vcc: VccMode) -> Self {
        self.vcc = vcc;
        self
    }

    /// Use the given orientation at the next `begin`
    pub fn with_rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn width(&self) -> u16 {
        self.framebuffer.width()
    }

    pub fn height(&self) -> u16 {
        self.framebuffer.height()
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    /// Initialize the panel, turn it on and push a blank frame
    ///
    /// Panels of unknown geometry skip the timing setup and rely on the
    /// controller's reset defaults.
    pub async fn begin(&mut self) -> Result<(), DisplayError<B::Error>> {
        let (width, height) = (self.width(), self.height());
        match panel_timing(width, height) {
            Some((multiplex, com_pins, clock)) => {
                let [seg, com] = scan_direction(self.rotation);
                let init: [u8; 25] = [
                    cmd::DISPLAY_OFF,
                    cmd::SET_CLOCK_DIV,
                    clock,
                    cmd::SET_MULTIPLEX,
                    multiplex,
                    cmd::SET_DISPLAY_OFFSET,
                    0x00,
                    cmd::SET_START_LINE,
                    cmd::CHARGE_PUMP,
                    self.vcc.charge_pump(),
                    cmd::MEMORY_MODE,
                    0x00, // Horizontal addressing
                    seg,
                    com,
                    cmd::SET_COM_PINS,
                    com_pins,
                    cmd::SET_CONTRAST,
                    self.vcc.contrast(),
                    cmd::SET_PRECHARGE,
                    self.vcc.precharge(),
                    cmd::SET_VCOM_DETECT,
                    0x40,
                    cmd::DISPLAY_ALL_ON_RESUME,
                    cmd::NORMAL_DISPLAY,
                    cmd::DISPLAY_ON,
                ];
                self.commands(&init).await?;
            }
            None => {
                #[cfg(feature = "defmt")]
                defmt::warn!("No SSD1306 timing for {}x{}, using defaults", width, height);
                self.command(cmd::DISPLAY_ON).await?;
            }
        }

        self.clear();
        self.flush().await
    }

    /// Set or clear one pixel in the buffer
    ///
    /// Returns `false` when the coordinate is off-panel.
    pub fn set_pixel(&mut self, x: i32, y: i32, on: bool) -> bool {
        self.framebuffer.set_pixel(x, y, on)
    }

    /// Clear the buffer (does not flush)
    pub fn clear(&mut self) {
        self.framebuffer.clear();
    }

    /// Send the whole buffer to the panel
    pub async fn flush(&mut self) -> Result<(), DisplayError<B::Error>> {
        let last_column = (self.width() - 1) as u8;
        let last_page = (self.framebuffer.pages() - 1) as u8;
        self.commands(&[cmd::COLUMN_ADDR, 0, last_column, cmd::PAGE_ADDR, 0, last_page])
            .await?;
        self.bus
            .data_stream(self.framebuffer.as_bytes())
            .await
            .map_err(DisplayError::Bus)
    }

    /// Copy a raster into the buffer and flush
    pub async fn apply_raster<R: Raster + ?Sized>(&mut self, source: &R) -> Result<(), DisplayError<B::Error>> {
        self.framebuffer.copy_from(source);
        self.flush().await
    }

    /// Set display contrast (0-255)
    pub async fn set_contrast(&mut self, contrast: u8) -> Result<(), DisplayError<B::Error>> {
        self.commands(&[cmd::SET_CONTRAST, contrast]).await
    }

    /// Dim the panel, or restore the supply's default contrast
    pub async fn dim(&mut self, dim: bool) -> Result<(), DisplayError<B::Error>> {
        let contrast = if dim { 0 } else { self.vcc.contrast() };
        self.set_contrast(contrast).await
    }

    /// Invert display colors
    pub async fn set_inverted(&mut self, inverted: bool) -> Result<(), DisplayError<B::Error>> {
        if inverted {
            self.command(cmd::INVERT_DISPLAY).await
        } else {
            self.command(cmd::NORMAL_DISPLAY).await
        }
    }

    /// Turn display on/off
    pub async fn set_display_on(&mut self, on: bool) -> Result<(), DisplayError<B::Error>> {
        if on {
            self.command(cmd::DISPLAY_ON).await
        } else {
            self.command(cmd::DISPLAY_OFF).await
        }
    }

    /// Change the scan direction; takes effect on the next flush
    pub async fn set_rotation(&mut self, rotation: Rotation) -> Result<(), DisplayError<B::Error>> {
        self.rotation = rotation;
        self.commands(&scan_direction(rotation)).await
    }

    /// Give back the bus
    pub fn release(self) -> B {
        self.bus
    }

    async fn command(&mut self, command: u8) -> Result<(), DisplayError<B::Error>> {
        self.bus.command(command).await.map_err(DisplayError::Bus)
    }

    async fn commands(&mut self, commands: &[u8]) -> Result<(), DisplayError<B::Error>> {
        self.bus.commands(commands).await.map_err(DisplayError::Bus)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_futures::block_on;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Op {
        Command(u8),
        Data(std::vec::Vec<u8>),
    }

    #[derive(Default)]
    struct MockBus {
        ops: std::vec::Vec<Op>,
    }

    impl MockBus {
        fn sent_commands(&self) -> std::vec::Vec<u8> {
            self.ops
                .iter()
                .filter_map(|op| match op {
                    Op::Command(c) => Some(*c),
                    Op::Data(_) => None,
                })
                .collect()
        }
    }

    impl RegisterBus for MockBus {
        type Error = ();

        async fn command(&mut self, command: u8) -> Result<(), ()> {
            self.ops.push(Op::Command(command));
            Ok(())
        }

        async fn data(&mut self, data: u8) -> Result<(), ()> {
            self.ops.push(Op::Data(vec![data]));
            Ok(())
        }

        async fn data_stream(&mut self, data: &[u8]) -> Result<(), ()> {
            self.ops.push(Op::Data(data.to_vec()));
            Ok(())
        }
    }

    fn driver(width: u16, height: u16) -> Ssd1306<MockBus> {
        Ssd1306::new(MockBus::default(), width, height).unwrap()
    }

    #[test]
    fn test_flush_addressing_sequence() {
        let mut display = driver(128, 32);
        display.set_pixel(0, 0, true);
        block_on(display.flush()).unwrap();

        let bus = display.release();
        assert_eq!(bus.sent_commands(), [0x21, 0, 127, 0x22, 0, 3]);
        match bus.ops.last() {
            Some(Op::Data(bytes)) => {
                assert_eq!(bytes.len(), 512);
                assert_eq!(bytes[0], 0x01);
            }
            other => panic!("expected data, got {other:?}"),
        }
    }

    #[test]
    fn test_begin_128x32() {
        let mut display = driver(128, 32);
        block_on(display.begin()).unwrap();
        let commands = display.release().sent_commands();

        assert_eq!(&commands[..5], &[0xAE, 0xD5, 0x80, 0xA8, 0x1F]);
        let pins = commands.iter().position(|&c| c == 0xDA).unwrap();
        assert_eq!(commands[pins + 1], 0x02);
        let pump = commands.iter().position(|&c| c == 0x8D).unwrap();
        assert_eq!(commands[pump + 1], 0x14);
        // Display on, then the blank flush
        assert_eq!(&commands[24..], &[0xAF, 0x21, 0, 127, 0x22, 0, 3]);
    }

    #[test]
    fn test_begin_96x16_external_vcc() {
        let mut display = driver(96, 16).with_vcc(VccMode::External);
        block_on(display.begin()).unwrap();
        let commands = display.release().sent_commands();

        assert_eq!(&commands[..5], &[0xAE, 0xD5, 0x60, 0xA8, 0x0F]);
        let contrast = commands.iter().position(|&c| c == 0x81).unwrap();
        assert_eq!(commands[contrast + 1], 0x9F);
        let pump = commands.iter().position(|&c| c == 0x8D).unwrap();
        assert_eq!(commands[pump + 1], 0x10);
    }

    #[test]
    fn test_begin_upside_down() {
        let mut display = driver(128, 64).with_rotation(Rotation::UpsideDown);
        block_on(display.begin()).unwrap();
        let commands = display.release().sent_commands();
        assert_eq!(&commands[12..14], &[0xA0, 0xC0]);
        assert_eq!(commands[4], 0x3F);
    }

    #[test]
    fn test_begin_unknown_geometry_skips_timing() {
        let mut display = driver(64, 48);
        block_on(display.begin()).unwrap();
        let commands = display.release().sent_commands();
        assert_eq!(commands, [0xAF, 0x21, 0, 63, 0x22, 0, 5]);
    }

    #[test]
    fn test_oversized_geometry_is_an_error() {
        assert!(matches!(
            Ssd1306::new(MockBus::default(), 256, 64),
            Err(DisplayError::Geometry)
        ));
        assert!(matches!(
            Ssd1306::new(MockBus::default(), 300, 8),
            Err(DisplayError::Geometry)
        ));
        assert!(matches!(
            Ssd1306::new(MockBus::default(), 256, 32),
            Err(DisplayError::Geometry)
        ));
    }

    #[test]
    fn test_panel_controls() {
        let mut display = driver(128, 32);
        block_on(async {
            display.dim(true).await.unwrap();
            display.dim(false).await.unwrap();
            display.set_inverted(true).await.unwrap();
            display.set_display_on(false).await.unwrap();
            display.set_rotation(Rotation::Normal).await.unwrap();
        });
        assert_eq!(
            display.release().sent_commands(),
            [0x81, 0x00, 0x81, 0xCF, 0xA7, 0xAE, 0xA1, 0xC8]
        );
    }

    struct Bar;

    impl Raster for Bar {
        fn sample(&self, _x: i32, y: i32) -> bool {
            y == 0
        }
    }

    #[test]
    fn test_apply_raster_flushes() {
        let mut display = driver(96, 16);
        display.set_pixel(5, 9, true);
        block_on(display.apply_raster(&Bar)).unwrap();

        // Pixels the raster leaves dark are cleared
        assert!(!display.framebuffer().pixel(5, 9));
        let bus = display.release();
        match bus.ops.last() {
            Some(Op::Data(bytes)) => {
                assert!(bytes[..96].iter().all(|&b| b == 0x01));
                assert!(bytes[96..].iter().all(|&b| b == 0));
            }
            other => panic!("expected data, got {other:?}"),
        }
    }
}
