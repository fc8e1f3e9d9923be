use std::sync::{Arc, Mutex};
use std::time::Duration;

use engine_logging::engine_trace;
use scanview_core::PollTicket;
use tokio_util::sync::CancellationToken;

use crate::{EngineEvent, EventSink};

/// Holds at most one pending poll timer.
///
/// Scheduling a new timer cancels the previous one, so a superseded loop can
/// never wake up again.
#[derive(Debug, Default)]
pub struct PollScheduler {
    pending: Mutex<Option<CancellationToken>>,
}

impl PollScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits `EngineEvent::PollDue` for `ticket` after `delay` unless cancelled first.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule(&self, ticket: PollTicket, delay: Duration, sink: Arc<dyn EventSink>) {
        let token = CancellationToken::new();
        self.replace(Some(token.clone()));

        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {
                    engine_trace!("Poll timer for {} cancelled", ticket.hash);
                }
                _ = tokio::time::sleep(delay) => {
                    sink.emit(EngineEvent::PollDue { ticket });
                }
            }
        });
    }

    pub fn cancel(&self) {
        self.replace(None);
    }

    fn replace(&self, next: Option<CancellationToken>) {
        let previous = match self.pending.lock() {
            Ok(mut guard) => std::mem::replace(&mut *guard, next),
            Err(poisoned) => std::mem::replace(&mut *poisoned.into_inner(), next),
        };
        if let Some(previous) = previous {
            previous.cancel();
        }
    }
}

impl Drop for PollScheduler {
    fn drop(&mut self) {
        self.cancel();
    }
}
