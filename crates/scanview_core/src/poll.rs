//! Continuation policy for the incremental match poller.
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::JobStatus;

pub const DEFAULT_PAGE_SIZE: usize = 50;
pub const DEFAULT_SHORT_DELAY_MS: u64 = 50;
pub const DEFAULT_LONG_DELAY_MS: u64 = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollSettings {
    /// Matches requested per page.
    pub page_size: usize,
    /// Delay after a full page, to drain a backlog quickly.
    pub short_delay_ms: u64,
    /// Delay after a partial page.
    pub long_delay_ms: u64,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            short_delay_ms: DEFAULT_SHORT_DELAY_MS,
            long_delay_ms: DEFAULT_LONG_DELAY_MS,
        }
    }
}

impl PollSettings {
    pub fn short_delay(&self) -> Duration {
        Duration::from_millis(self.short_delay_ms)
    }

    pub fn long_delay(&self) -> Duration {
        Duration::from_millis(self.long_delay_ms)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollStep {
    Continue { delay: Duration },
    Stop,
}

/// Decides what follows a successfully applied page of `page_len` matches.
///
/// Polling stops only when the job is terminal and the page came back empty;
/// a terminal job with a non-empty page still has a backlog to drain.
pub fn next_step(status: &JobStatus, page_len: usize, settings: &PollSettings) -> PollStep {
    if status.is_terminal() && page_len == 0 {
        return PollStep::Stop;
    }
    let delay = if page_len >= settings.page_size {
        settings.short_delay()
    } else {
        settings.long_delay()
    };
    PollStep::Continue { delay }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_page_uses_short_delay() {
        let settings = PollSettings::default();
        assert_eq!(
            next_step(&JobStatus::Processing, 50, &settings),
            PollStep::Continue {
                delay: Duration::from_millis(50)
            }
        );
    }

    #[test]
    fn partial_page_uses_long_delay() {
        let settings = PollSettings::default();
        assert_eq!(
            next_step(&JobStatus::Processing, 49, &settings),
            PollStep::Continue {
                delay: Duration::from_millis(1000)
            }
        );
        assert_eq!(
            next_step(&JobStatus::Queued, 0, &settings),
            PollStep::Continue {
                delay: Duration::from_millis(1000)
            }
        );
    }

    #[test]
    fn terminal_with_empty_page_stops() {
        let settings = PollSettings::default();
        for status in [
            JobStatus::Done,
            JobStatus::Cancelled,
            JobStatus::Failed,
            JobStatus::Expired,
        ] {
            assert_eq!(next_step(&status, 0, &settings), PollStep::Stop);
        }
    }

    #[test]
    fn terminal_with_matches_keeps_draining() {
        let settings = PollSettings::default();
        assert_eq!(
            next_step(&JobStatus::Done, 10, &settings),
            PollStep::Continue {
                delay: Duration::from_millis(1000)
            }
        );
        assert_eq!(
            next_step(&JobStatus::Done, 50, &settings),
            PollStep::Continue {
                delay: Duration::from_millis(50)
            }
        );
    }

    #[test]
    fn unknown_status_never_stops() {
        let settings = PollSettings::default();
        let status = JobStatus::Other("paused".to_string());
        assert!(matches!(
            next_step(&status, 0, &settings),
            PollStep::Continue { .. }
        ));
    }
}
