use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::Notify;

use crate::config::OverflowPolicy;
use crate::relay::types::{PreparedFrame, PushOutcome};

/// Bounded per-recipient send queue.
///
/// Producers (other connections' workers) never wait: `push` applies the
/// overflow policy instead. The owning connection's worker is the single
/// consumer and drains it with `recv`.
pub struct Outbox {
    state: Mutex<OutboxState>,
    ready: Notify,
    capacity: usize,
    policy: OverflowPolicy,
}

#[derive(Default)]
struct OutboxState {
    queue: VecDeque<PreparedFrame>,
    closed: bool,
}

impl Outbox {
    pub fn new(capacity: usize, policy: OverflowPolicy) -> Self {
        Self {
            state: Mutex::new(OutboxState::default()),
            ready: Notify::new(),
            capacity: capacity.max(1),
            policy,
        }
    }

    // Critical sections never panic, so a poisoned lock still holds a valid queue.
    fn state(&self) -> MutexGuard<'_, OutboxState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn push(&self, frame: PreparedFrame) -> PushOutcome {
        let outcome = {
            let mut s = self.state();
            if s.closed {
                return PushOutcome::Closed;
            }
            if s.queue.len() < self.capacity {
                s.queue.push_back(frame);
                PushOutcome::Queued
            } else {
                match self.policy {
                    OverflowPolicy::DropNewest => return PushOutcome::DroppedNewest,
                    OverflowPolicy::DropOldest => {
                        s.queue.pop_front();
                        s.queue.push_back(frame);
                        PushOutcome::DisplacedOldest
                    }
                }
            }
        };
        self.ready.notify_one();
        outcome
    }

    /// Next queued frame. Returns `None` once closed and drained.
    ///
    /// Cancel-safe: a frame is only taken out of the queue right before it
    /// is returned.
    pub async fn recv(&self) -> Option<PreparedFrame> {
        loop {
            {
                let mut s = self.state();
                if let Some(frame) = s.queue.pop_front() {
                    return Some(frame);
                }
                if s.closed {
                    return None;
                }
            }
            self.ready.notified().await;
        }
    }

    /// Refuse further pushes. Already queued frames stay readable.
    pub fn close(&self) {
        self.state().closed = true;
        self.ready.notify_one();
    }

    pub fn is_closed(&self) -> bool {
        self.state().closed
    }

    pub fn len(&self) -> usize {
        self.state().queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Take everything currently queued without waiting.
    pub fn drain(&self) -> Vec<PreparedFrame> {
        self.state().queue.drain(..).collect()
    }
}
