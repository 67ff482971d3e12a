//! UART link to the bridge host
//!
//! The UART itself never disconnects; a "connection" is one session over
//! it. The halves live in `'static` mutexes and each session locks them
//! for its lifetime, so the previous session's halves are always released
//! before the next one starts.

use core::convert::Infallible;

use embassy_rp::uart::{BufferedUartRx, BufferedUartTx};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::{Mutex, MutexGuard};
use embedded_io_async::{ErrorType, Read, Write};
use lasercut_hal::Connector;

/// Receive half shared between sessions
pub type SharedRx = Mutex<CriticalSectionRawMutex, BufferedUartRx>;

/// Transmit half shared between sessions
pub type SharedTx = Mutex<CriticalSectionRawMutex, BufferedUartTx>;

/// Hands out the UART halves for one session at a time
pub struct UartConnector {
    rx: &'static SharedRx,
    tx: &'static SharedTx,
}

impl UartConnector {
    pub fn new(rx: &'static SharedRx, tx: &'static SharedTx) -> Self {
        Self { rx, tx }
    }
}

impl Connector for UartConnector {
    type Error = Infallible;
    type Rx = UartLinkRx;
    type Tx = UartLinkTx;

    async fn connect(&mut self) -> Result<(UartLinkRx, UartLinkTx), Infallible> {
        let rx = self.rx.lock().await;
        let tx = self.tx.lock().await;
        Ok((UartLinkRx(rx), UartLinkTx(tx)))
    }
}

/// Receive half held by a session
pub struct UartLinkRx(MutexGuard<'static, CriticalSectionRawMutex, BufferedUartRx>);

impl ErrorType for UartLinkRx {
    type Error = <BufferedUartRx as ErrorType>::Error;
}

impl Read for UartLinkRx {
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        self.0.read(buf).await
    }
}

/// Transmit half held by a session
pub struct UartLinkTx(MutexGuard<'static, CriticalSectionRawMutex, BufferedUartTx>);

impl ErrorType for UartLinkTx {
    type Error = <BufferedUartTx as ErrorType>::Error;
}

impl Write for UartLinkTx {
    async fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.0.write(buf).await
    }

    async fn flush(&mut self) -> Result<(), Self::Error> {
        self.0.flush().await
    }
}
