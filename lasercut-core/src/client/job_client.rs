//! Persistent job server connection
//!
//! The client owns one link to the server at a time. [`JobClient::run`]
//! keeps it up: connect, serve the session, back off, reconnect. Other
//! tasks emit commands through the shared client while the session task
//! dispatches server pushes to a [`ClientEvents`] handler.
//!
//! Commands other than the port request are only delivered once the server
//! reports its machine port open. An emitter that finds the port closed
//! asks the server to open it and waits for the status push.

use core::cell::Cell;
use core::sync::atomic::{AtomicBool, Ordering};

use alloc::vec::Vec;
use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex as BlockingMutex;
use embassy_sync::mutex::Mutex;
use embassy_sync::signal::Signal;
use embassy_sync::watch::Watch;
use embedded_hal_async::delay::DelayNs;
use embedded_io_async::{Read, Write};
use heapless::String;
use lasercut_hal::{Connector, JobSource, JobSourceError};
use lasercut_protocol::{ClientCommand, Frame, PortStatus, ServerMessage};

use super::error::{ConnectError, EmitError, JobError};
use super::link::{write_command, FrameReader, ReadError};
use super::progress::{ProgressReport, QueueProgress};
use crate::config::{CommandConfig, KioskConfig, LinkConfig, MAX_CONNECT_LEN};

/// Tasks that may wait on the port handshake at the same time
pub const PORT_WAITERS: usize = 4;

/// Callbacks for server-driven events
///
/// Called from the session task; implementations should only enqueue work
/// (for example a display update) and return.
pub trait ClientEvents {
    /// A session was established
    ///
    /// `batch` is the progress of a batch that was already running before
    /// this session, so its display can be restored.
    fn on_connected(&mut self, batch: Option<ProgressReport>);

    /// An established session ended
    fn on_disconnected(&mut self) {}

    /// The server reported its machine port state
    fn on_port_status(&mut self, _status: PortStatus) {}

    /// Queue depth changed
    fn on_progress(&mut self, report: ProgressReport);
}

/// How a connection cycle ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SessionEnd {
    /// No session was established
    ConnectFailed(ConnectError),
    /// The link closed or failed
    Lost(ReadError),
    /// Nothing was heard from the server within the link timeout
    TimedOut,
    /// [`JobClient::close`] was called
    Closed,
}

impl From<ReadError> for SessionEnd {
    fn from(e: ReadError) -> Self {
        SessionEnd::Lost(e)
    }
}

/// Client for the remote job queue
pub struct JobClient<M: RawMutex, Tx, D> {
    link: LinkConfig,
    connect_to: String<MAX_CONNECT_LEN>,
    commands: CommandConfig,
    max_job_size: usize,
    writer: Mutex<M, Option<Tx>>,
    socket_connected: AtomicBool,
    port_connected: AtomicBool,
    port: Watch<M, bool, PORT_WAITERS>,
    progress: BlockingMutex<M, Cell<QueueProgress>>,
    close_request: Signal<M, ()>,
    delay: D,
}

impl<M, Tx, D> JobClient<M, Tx, D>
where
    M: RawMutex,
    Tx: Write,
    D: DelayNs + Clone,
{
    /// Create a disconnected client
    pub fn new(config: &KioskConfig, delay: D) -> Self {
        Self {
            link: config.link,
            connect_to: config.port.connect_string(),
            commands: config.commands.clone(),
            max_job_size: config.job.max_size as usize,
            writer: Mutex::new(None),
            socket_connected: AtomicBool::new(false),
            port_connected: AtomicBool::new(false),
            port: Watch::new(),
            progress: BlockingMutex::new(Cell::new(QueueProgress::new())),
            close_request: Signal::new(),
            delay,
        }
    }

    /// Whether a session with the server is up
    pub fn is_socket_connected(&self) -> bool {
        self.socket_connected.load(Ordering::Acquire)
    }

    /// Whether the server reported its machine port open
    pub fn is_port_connected(&self) -> bool {
        self.port_connected.load(Ordering::Acquire)
    }

    /// Current batch progress
    pub fn progress(&self) -> QueueProgress {
        self.progress.lock(Cell::get)
    }

    /// Send one command
    ///
    /// Fails with [`EmitError::NotConnected`] without sending anything when
    /// there is no session. If the machine port is not open yet, requests
    /// it and waits for the server to report it open first. Each delivered
    /// command is followed by the settle delay.
    pub async fn emit(&self, command: ClientCommand<'_>) -> Result<(), EmitError> {
        if !self.is_socket_connected() {
            #[cfg(feature = "defmt")]
            defmt::warn!("Not connected, dropping {=str}", command.event_name());
            return Err(EmitError::NotConnected);
        }

        if !self.is_port_connected() {
            #[cfg(feature = "defmt")]
            defmt::info!("Machine port closed, requesting {=str}", self.connect_to.as_str());
            self.send(ClientCommand::ConnectTo(&self.connect_to)).await?;
            self.wait_for_port().await?;
        }

        self.send(command).await?;
        self.sleep(self.link.settle_delay_ms).await;
        Ok(())
    }

    /// Read the job and queue it on the machine
    ///
    /// Sends clear-alarm twice, zeroes the axes, stops any running job and
    /// queues the content. Stops at the first step that fails.
    pub async fn submit_job<S: JobSource>(&self, source: &mut S) -> Result<(), JobError> {
        let size = source.size().await?;
        if size > self.max_job_size {
            return Err(JobSourceError::TooLarge.into());
        }
        let mut content = Vec::new();
        content.try_reserve_exact(size).map_err(|_| JobError::OutOfMemory)?;
        content.resize(size, 0);
        if source.read(&mut content).await? != size {
            return Err(JobSourceError::Corrupted.into());
        }

        #[cfg(feature = "defmt")]
        defmt::info!("Submitting job ({} bytes)", content.len());

        self.emit(ClientCommand::ClearAlarm(&self.commands.clear_alarm)).await?;
        self.emit(ClientCommand::ClearAlarm(&self.commands.clear_alarm)).await?;
        self.emit(ClientCommand::SetZero(&self.commands.set_zero_axes)).await?;
        self.emit(ClientCommand::Stop).await?;
        self.emit(ClientCommand::RunJob(&content)).await?;
        Ok(())
    }

    /// Fire the diagnostic laser test
    ///
    /// Stops any running job and clears the alarm twice first. Stops at the
    /// first step that fails.
    pub async fn run_diagnostic_test(&self) -> Result<(), EmitError> {
        self.emit(ClientCommand::Stop).await?;
        self.emit(ClientCommand::ClearAlarm(&self.commands.clear_alarm)).await?;
        self.emit(ClientCommand::ClearAlarm(&self.commands.clear_alarm)).await?;
        self.emit(ClientCommand::LaserTest(&self.commands.laser_test)).await?;
        Ok(())
    }

    /// Tear down the current session
    ///
    /// The session task notices, backs off and reconnects as usual.
    pub async fn close(&self) {
        self.close_request.signal(());
        self.detach().await;
    }

    /// Keep a session up forever
    pub async fn run<C, E>(&self, connector: &mut C, events: &mut E) -> !
    where
        C: Connector<Tx = Tx>,
        E: ClientEvents,
    {
        loop {
            self.run_once(connector, events).await;
        }
    }

    /// One connect, serve, back off cycle
    pub async fn run_once<C, E>(&self, connector: &mut C, events: &mut E) -> SessionEnd
    where
        C: Connector<Tx = Tx>,
        E: ClientEvents,
    {
        let end = match self.open(connector).await {
            Ok(mut reader) => {
                #[cfg(feature = "defmt")]
                defmt::info!("Connected to job server");
                events.on_connected(self.progress().batch());
                let end = self.session(&mut reader, events).await;
                self.detach().await;
                events.on_disconnected();
                end
            }
            Err(e) => {
                self.detach().await;
                SessionEnd::ConnectFailed(e)
            }
        };

        #[cfg(feature = "defmt")]
        defmt::warn!(
            "Link down ({}), reconnecting in {} ms",
            end,
            self.link.reconnect_delay_ms
        );
        self.sleep(self.link.reconnect_delay_ms).await;
        end
    }

    async fn open<C>(&self, connector: &mut C) -> Result<FrameReader<C::Rx>, ConnectError>
    where
        C: Connector<Tx = Tx>,
    {
        let (rx, mut tx) = connector.connect().await.map_err(|_e| {
            #[cfg(feature = "defmt")]
            defmt::warn!("Connect failed: {}", defmt::Debug2Format(&_e));
            ConnectError::Transport
        })?;

        let mut reader = FrameReader::new(rx);
        write_command(&mut tx, ClientCommand::Hello).await?;

        let mut delay = self.delay.clone();
        match select(wait_for_welcome(&mut reader), delay.delay_ms(self.link.connect_timeout_ms)).await {
            Either::First(result) => result?,
            Either::Second(()) => return Err(ConnectError::Timeout),
        }

        self.attach(tx).await;
        Ok(reader)
    }

    async fn session<R: Read, E: ClientEvents>(&self, reader: &mut FrameReader<R>, events: &mut E) -> SessionEnd {
        loop {
            let frame = match select(self.next_frame(reader), self.close_request.wait()).await {
                Either::First(Ok(frame)) => frame,
                Either::First(Err(end)) => return end,
                Either::Second(()) => return SessionEnd::Closed,
            };
            match ServerMessage::from_frame(&frame) {
                Ok(message) => self.handle_message(message, events).await,
                Err(_e) => {
                    #[cfg(feature = "defmt")]
                    defmt::debug!("Ignoring frame type {=u8}: {}", frame.msg_type, _e);
                }
            }
        }
    }

    async fn next_frame<R: Read>(&self, reader: &mut FrameReader<R>) -> Result<Frame, SessionEnd> {
        let Some(timeout_ms) = self.link.link_timeout_ms else {
            return Ok(reader.next_frame().await?);
        };
        let mut delay = self.delay.clone();
        match select(reader.next_frame(), delay.delay_ms(timeout_ms)).await {
            Either::First(result) => Ok(result?),
            Either::Second(()) => Err(SessionEnd::TimedOut),
        }
    }

    async fn handle_message<E: ClientEvents>(&self, message: ServerMessage<'_>, events: &mut E) {
        match message {
            ServerMessage::Welcome => {}
            ServerMessage::Ping => {
                if let Err(_e) = self.send(ClientCommand::Pong).await {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("PONG failed: {}", _e);
                }
            }
            ServerMessage::ConnectStatus(text) => {
                #[cfg(feature = "defmt")]
                defmt::info!("Port status: {=str}", text);
                if let Some(status) = PortStatus::from_text(text) {
                    self.set_port(status.is_open());
                    events.on_port_status(status);
                }
            }
            ServerMessage::QueueCount(count) => {
                let report = self.progress.lock(|cell| {
                    let mut progress = cell.get();
                    let report = progress.update(count);
                    cell.set(progress);
                    report
                });
                if let Some(report) = report {
                    events.on_progress(report);
                }
            }
        }
    }

    async fn send(&self, command: ClientCommand<'_>) -> Result<(), EmitError> {
        let mut writer = self.writer.lock().await;
        let tx = writer.as_mut().ok_or(EmitError::NotConnected)?;
        write_command(tx, command).await?;
        Ok(())
    }

    async fn wait_for_port(&self) -> Result<(), EmitError> {
        let mut receiver = self.port.receiver().ok_or(EmitError::TooManyWaiters)?;
        let opened = receiver.get_and(|open| *open);
        let Some(timeout_ms) = self.link.handshake_timeout_ms else {
            opened.await;
            return Ok(());
        };
        let mut delay = self.delay.clone();
        match select(opened, delay.delay_ms(timeout_ms)).await {
            Either::First(_) => Ok(()),
            Either::Second(()) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("Machine port did not open within {} ms", timeout_ms);
                Err(EmitError::HandshakeTimeout)
            }
        }
    }

    async fn attach(&self, tx: Tx) {
        *self.writer.lock().await = Some(tx);
        self.close_request.reset();
        self.socket_connected.store(true, Ordering::Release);
    }

    async fn detach(&self) {
        self.socket_connected.store(false, Ordering::Release);
        self.set_port(false);
        self.writer.lock().await.take();
    }

    fn set_port(&self, open: bool) {
        self.port_connected.store(open, Ordering::Release);
        self.port.sender().send(open);
    }

    async fn sleep(&self, ms: u32) {
        let mut delay = self.delay.clone();
        delay.delay_ms(ms).await;
    }
}

async fn wait_for_welcome<R: Read>(reader: &mut FrameReader<R>) -> Result<(), ConnectError> {
    loop {
        let frame = reader.next_frame().await?;
        if let Ok(ServerMessage::Welcome) = ServerMessage::from_frame(&frame) {
            return Ok(());
        }
    }
}
