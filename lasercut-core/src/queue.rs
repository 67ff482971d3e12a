//! Latest-wins display command queue
//!
//! Every producer (buttons, the job client, the connecting animation) hands
//! its display update to one [`DisplayQueue`]. A single consumer task owns
//! the display and executes commands one at a time, so the driver never
//! sees concurrent flushes.
//!
//! The queue holds at most one pending command. Submitting while a command
//! is pending replaces it; a command that is already executing runs to
//! completion and the newest pending one is picked up next.

use core::cell::Cell;
use core::fmt::Debug;
use core::future::Future;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::signal::Signal;

/// A deferred unit of display work
///
/// Carries everything needed to mutate the target and flush it. Consumed
/// exactly once by the queue consumer.
pub trait DisplayCommand<T> {
    /// Error returned when execution fails
    type Error;

    /// Apply this command to the display target
    fn execute(self, target: &mut T) -> impl Future<Output = Result<(), Self::Error>>;
}

/// Queue activity counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct QueueStats {
    /// Commands handed to `submit`
    pub submitted: u32,
    /// Pending commands overwritten before they started
    pub replaced: u32,
    /// Commands that completed successfully
    pub executed: u32,
    /// Commands that returned an error
    pub failed: u32,
}

impl QueueStats {
    const fn new() -> Self {
        Self {
            submitted: 0,
            replaced: 0,
            executed: 0,
            failed: 0,
        }
    }
}

/// Single-slot, single-consumer display command queue
pub struct DisplayQueue<M: RawMutex, C> {
    pending: Signal<M, C>,
    stats: Mutex<M, Cell<QueueStats>>,
}

impl<M: RawMutex, C> DisplayQueue<M, C> {
    /// Create an empty queue
    pub const fn new() -> Self {
        Self {
            pending: Signal::new(),
            stats: Mutex::new(Cell::new(QueueStats::new())),
        }
    }

    /// Publish `command` as the next one to run
    ///
    /// Never blocks. A not-yet-started pending command is discarded.
    pub fn submit(&self, command: C) {
        let replaced = self.pending.signaled();
        self.update_stats(|s| {
            s.submitted = s.submitted.wrapping_add(1);
            if replaced {
                s.replaced = s.replaced.wrapping_add(1);
            }
        });
        self.pending.signal(command);
    }

    /// Whether a command is waiting for the consumer
    pub fn has_pending(&self) -> bool {
        self.pending.signaled()
    }

    /// Snapshot of the activity counters
    pub fn stats(&self) -> QueueStats {
        self.stats.lock(Cell::get)
    }

    /// Wait for the next command and execute it against `target`
    pub async fn process_next<T>(&self, target: &mut T) -> Result<(), C::Error>
    where
        C: DisplayCommand<T>,
        C::Error: Debug,
    {
        let command = self.pending.wait().await;
        let result = command.execute(target).await;
        match &result {
            Ok(()) => self.update_stats(|s| s.executed = s.executed.wrapping_add(1)),
            Err(_e) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("Display command failed: {}", defmt::Debug2Format(_e));
                self.update_stats(|s| s.failed = s.failed.wrapping_add(1));
            }
        }
        result
    }

    /// Consumer loop: execute commands forever
    ///
    /// A failing command is logged and dropped; the loop keeps going.
    pub async fn run<T>(&self, target: &mut T) -> !
    where
        C: DisplayCommand<T>,
        C::Error: Debug,
    {
        loop {
            let _ = self.process_next(target).await;
        }
    }

    fn update_stats(&self, f: impl FnOnce(&mut QueueStats)) {
        self.stats.lock(|cell| {
            let mut stats = cell.get();
            f(&mut stats);
            cell.set(stats);
        });
    }
}

impl<M: RawMutex, C> Default for DisplayQueue<M, C> {
    fn default() -> Self {
        Self::new()
    }
}
