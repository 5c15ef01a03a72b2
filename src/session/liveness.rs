//! Ping/pong liveness bookkeeping.
//!
//! Pure timing state — the connection I/O task feeds it instants and acts on
//! the answers. A ping goes out every `interval`; once a ping is outstanding
//! no further ping is sent until a pong arrives or the `timeout` expires.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct LivenessProbe {
    interval: Duration,
    timeout: Duration,
    next_ping: Instant,
    awaiting_since: Option<Instant>,
    last_pong: Option<Instant>,
}

impl LivenessProbe {
    /// First ping is due one `interval` after `now`.
    pub fn new(interval: Duration, timeout: Duration, now: Instant) -> Self {
        Self {
            interval,
            timeout,
            next_ping: now + interval,
            awaiting_since: None,
            last_pong: None,
        }
    }

    pub fn ping_due(&self, now: Instant) -> bool {
        self.awaiting_since.is_none() && now >= self.next_ping
    }

    pub fn on_ping_sent(&mut self, now: Instant) {
        self.awaiting_since = Some(now);
        self.next_ping = now + self.interval;
    }

    pub fn on_pong(&mut self, now: Instant) {
        self.awaiting_since = None;
        self.last_pong = Some(now);
    }

    /// An outstanding ping has gone unanswered for `timeout` or longer.
    pub fn is_expired(&self, now: Instant) -> bool {
        self.awaiting_since
            .is_some_and(|sent| now.saturating_duration_since(sent) >= self.timeout)
    }

    pub fn awaiting_pong(&self) -> bool {
        self.awaiting_since.is_some()
    }

    pub fn last_pong(&self) -> Option<Instant> {
        self.last_pong
    }
}
