//! Queue-depth driven progress tracking
//!
//! The server reports how many jobs are pending. The first nonzero count
//! after the queue was empty starts a batch and becomes its total; progress
//! is the share of that total already drained.

/// Display-ready progress update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ProgressReport {
    /// Percentage 0..=100, or -1 for "no progress to show"
    pub progress: i32,
    /// Pending job count to display, if any
    pub count: Option<u32>,
    /// Whether the status text should be replaced
    pub clear_text: bool,
}

/// Batch progress derived from queue-depth pushes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct QueueProgress {
    current: u32,
    total: Option<u32>,
}

impl QueueProgress {
    pub const fn new() -> Self {
        Self {
            current: 0,
            total: None,
        }
    }

    /// Last reported queue depth
    pub fn current(&self) -> u32 {
        self.current
    }

    /// Depth at the start of the running batch
    pub fn total(&self) -> Option<u32> {
        self.total
    }

    /// Progress of the running batch, for redrawing it from scratch
    ///
    /// `None` when no batch is running.
    pub fn batch(&self) -> Option<ProgressReport> {
        self.total.map(|total| ProgressReport {
            progress: percent_done(total, self.current),
            count: Some(self.current),
            clear_text: false,
        })
    }

    /// Apply a queue-depth push
    ///
    /// Returns `None` when the count is unchanged and nothing needs
    /// redrawing.
    pub fn update(&mut self, count: u32) -> Option<ProgressReport> {
        if count == 0 {
            let had_batch = self.total.take().is_some();
            self.current = 0;
            return Some(ProgressReport {
                progress: -1,
                count: None,
                clear_text: had_batch,
            });
        }

        if count == self.current {
            return None;
        }
        self.current = count;

        match self.total {
            None => {
                self.total = Some(count);
                Some(ProgressReport {
                    progress: 0,
                    count: Some(count),
                    clear_text: true,
                })
            }
            Some(total) => Some(ProgressReport {
                progress: percent_done(total, count),
                count: Some(count),
                clear_text: false,
            }),
        }
    }
}

/// `round((total - remaining) / total * 100)`, halves rounded up
///
/// A count above the batch total reports negative progress.
fn percent_done(total: u32, remaining: u32) -> i32 {
    let total = i64::from(total);
    let done = total - i64::from(remaining);
    // floor((200 * done + total) / (2 * total)) == round half up
    let pct = (200 * done + total).div_euclid(2 * total);
    pct as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(progress: i32, count: Option<u32>, clear_text: bool) -> Option<ProgressReport> {
        Some(ProgressReport {
            progress,
            count,
            clear_text,
        })
    }

    #[test]
    fn test_batch_sequence() {
        let mut p = QueueProgress::new();
        assert_eq!(p.update(5), report(0, Some(5), true));
        assert_eq!(p.update(5), None);
        assert_eq!(p.update(3), report(40, Some(3), false));
        assert_eq!(p.update(0), report(-1, None, true));
        assert_eq!(p.total(), None);
        assert_eq!(p.current(), 0);
    }

    #[test]
    fn test_zero_without_batch_keeps_text() {
        let mut p = QueueProgress::new();
        assert_eq!(p.update(0), report(-1, None, false));
        assert_eq!(p.update(0), report(-1, None, false));
    }

    #[test]
    fn test_total_fixed_for_batch() {
        let mut p = QueueProgress::new();
        p.update(4);
        // Growing queue mid-batch does not reset the total
        assert_eq!(p.update(6), report(-50, Some(6), false));
        assert_eq!(p.update(1), report(75, Some(1), false));
        assert_eq!(p.total(), Some(4));
    }

    #[test]
    fn test_rounding_half_up() {
        // 1/8 = 12.5%
        assert_eq!(percent_done(8, 7), 13);
        // 2/3 = 66.67%
        assert_eq!(percent_done(3, 1), 67);
        // 1/3 = 33.33%
        assert_eq!(percent_done(3, 2), 33);
        assert_eq!(percent_done(5, 5), 0);
    }

    #[test]
    fn test_batch_snapshot() {
        let mut p = QueueProgress::new();
        assert_eq!(p.batch(), None);
        p.update(4);
        p.update(1);
        assert_eq!(p.batch(), report(75, Some(1), false));
        p.update(0);
        assert_eq!(p.batch(), None);
    }

    #[test]
    fn test_new_batch_after_drain() {
        let mut p = QueueProgress::new();
        p.update(2);
        p.update(0);
        assert_eq!(p.update(3), report(0, Some(3), true));
        assert_eq!(p.total(), Some(3));
    }
}
