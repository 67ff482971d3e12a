//! Laser-cut kiosk firmware
//!
//! Main firmware binary for the RP2040 board next to the laser cutter.
//! Shows job status on a small OLED, submits the stored job on button 1,
//! runs the laser test on button 2, and keeps a session to the job server
//! over the UART link to the bridge host.

#![no_std]
#![no_main]

extern crate alloc;

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Pull};
use embassy_rp::i2c::{self, I2c};
use embassy_rp::peripherals::{I2C0, UART0};
use embassy_rp::uart::{BufferedInterruptHandler, Config as UartConfig, Uart};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;
use embassy_time::{Delay, Timer};
use embedded_alloc::LlffHeap as Heap;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use lasercut_core::config::{parse_config, DisplayConfig, KioskConfig};
use lasercut_core::JobClient;
use lasercut_display::{StatusCommand, StatusDisplay};
use lasercut_drivers::display::{I2cRegisterBus, Ssd1306, VccMode};
use lasercut_drivers::input::Button;
use lasercut_hal_rp2040::{
    FlashJobSource, Rp2040Flash, SharedRx, SharedTx, UartConnector, UartLinkTx,
};

use crate::channels::{DISPLAY_QUEUE, LINK_STATE};

mod channels;
mod tasks;

// Heap allocator for job content
#[global_allocator]
static HEAP: Heap = Heap::empty();

// Heap size: 96KB, room for the largest accepted job
const HEAP_SIZE: usize = 96 * 1024;

/// Embedded configuration (compiled into firmware)
/// Edit kiosk.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../kiosk.toml");

/// How long a configuration error stays on screen before booting on defaults
const CONFIG_ERROR_HOLD_MS: u64 = 3000;

/// I2C clock for the OLED
const I2C_FREQUENCY_HZ: u32 = 400_000;

/// Job client shared by the link and button tasks
pub type KioskClient = JobClient<CriticalSectionRawMutex, UartLinkTx, Delay>;

/// Status display owned by the display task
pub type KioskDisplay = StatusDisplay<I2cRegisterBus<I2c<'static, I2C0, i2c::Async>>>;

/// Debounced active-low button
pub type KioskButton = Button<Input<'static>, Delay>;

/// Job stored in the flash partition
pub type KioskJob = FlashJobSource<Rp2040Flash<'static>>;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
    I2C0_IRQ => i2c::InterruptHandler<I2C0>;
});

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 512]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 256]> = StaticCell::new();

// UART halves, locked by one session at a time
static UART_RX: StaticCell<SharedRx> = StaticCell::new();
static UART_TX: StaticCell<SharedTx> = StaticCell::new();

static CLIENT: StaticCell<KioskClient> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Laser-cut kiosk firmware starting...");

    init_heap();

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let (config, config_ok) = load_config();

    // Display on I2C0 (Pico: SDA=GPIO4, SCL=GPIO5)
    let mut i2c_config = i2c::Config::default();
    i2c_config.frequency = I2C_FREQUENCY_HZ;
    let i2c = I2c::new_async(p.I2C0, p.PIN_5, p.PIN_4, Irqs, i2c_config);
    let mut display = init_display(i2c, &config.display);
    if let Err(e) = display.begin().await {
        error!("Display init failed: {:?}", Debug2Format(&e));
    }
    info!("Display initialized");

    LINK_STATE.sender().send(false);
    spawner.spawn(tasks::display_task(display)).unwrap();

    DISPLAY_QUEUE.submit(StatusCommand::message("Starting ..."));
    if !config_ok {
        DISPLAY_QUEUE.submit(StatusCommand::error("! ERROR !"));
        Timer::after_millis(CONFIG_ERROR_HOLD_MS).await;
        DISPLAY_QUEUE.submit(StatusCommand::message("Starting ..."));
    }

    // UART link to the bridge host
    let mut uart_config = UartConfig::default();
    uart_config.baudrate = config.link.baudrate;

    let tx_buf = TX_BUF.init([0u8; 512]);
    let rx_buf = RX_BUF.init([0u8; 256]);

    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, uart_config);
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);
    let (tx, rx) = uart.split();

    let rx: &'static SharedRx = UART_RX.init(Mutex::new(rx));
    let tx: &'static SharedTx = UART_TX.init(Mutex::new(tx));
    let connector = UartConnector::new(rx, tx);
    info!("UART initialized at {} baud", config.link.baudrate);

    let client: &'static KioskClient = CLIENT.init(JobClient::new(&config, Delay));

    // Buttons are active-low with pull-ups
    let debounce_us = config.input.debounce_us;
    let run_button = Button::new(Input::new(p.PIN_27, Pull::Up), Delay, debounce_us);
    let test_button = Button::new(Input::new(p.PIN_22, Pull::Up), Delay, debounce_us);

    let job = FlashJobSource::partition(p.FLASH, p.DMA_CH0);

    spawner.spawn(tasks::connecting_task()).unwrap();
    spawner.spawn(tasks::link_task(client, connector)).unwrap();
    spawner
        .spawn(tasks::run_button_task(run_button, client, job))
        .unwrap();
    spawner
        .spawn(tasks::test_button_task(test_button, client))
        .unwrap();

    info!("All tasks spawned, firmware running");
}

/// Initialize the heap allocator
fn init_heap() {
    use core::mem::MaybeUninit;
    static mut HEAP_MEM: [MaybeUninit<u8>; HEAP_SIZE] = [MaybeUninit::uninit(); HEAP_SIZE];
    #[allow(static_mut_refs)]
    unsafe {
        HEAP.init(HEAP_MEM.as_ptr() as usize, HEAP_SIZE)
    }
}

/// Parse the embedded configuration
///
/// An invalid file falls back to the defaults; the flag tells the caller to
/// show the error screen.
fn load_config() -> (KioskConfig, bool) {
    match parse_config(EMBEDDED_CONFIG) {
        Ok(config) => {
            info!("Configuration loaded");
            (config, true)
        }
        Err(e) => {
            error!("Invalid kiosk.toml ({}), using defaults", e);
            (KioskConfig::default(), false)
        }
    }
}

/// Build the status display for the configured panel
fn init_display(i2c: I2c<'static, I2C0, i2c::Async>, config: &DisplayConfig) -> KioskDisplay {
    let bus = I2cRegisterBus::new(i2c, config.i2c_address);
    let vcc = if config.external_vcc {
        VccMode::External
    } else {
        VccMode::SwitchCap
    };

    // Geometry was validated when the configuration was parsed
    let driver = unwrap!(Ssd1306::new(bus, config.width.into(), config.height.into()).ok())
        .with_vcc(vcc)
        .with_rotation(config.rotation);
    unwrap!(StatusDisplay::new(driver).ok())
}
