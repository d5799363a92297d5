use crate::color::LedPayload;
use std::time::{Duration, Instant};

/// Emission gate for the derived LED output.
///
/// Suppresses redundant re-publishes while guaranteeing a heartbeat: an
/// unchanged payload is still re-sent once per interval so the LED station
/// can tell the hub is alive. Changed payloads always pass, even inside the
/// interval window. Timestamps are monotonic (`Instant`), never wall-clock.
#[derive(Debug)]
pub struct PublishGate {
    interval: Duration,
    last_payload: Option<LedPayload>,
    last_emit: Option<Instant>,
}

impl PublishGate {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_payload: None,
            last_emit: None,
        }
    }

    /// True when the payload should go out: first ever emission, a changed
    /// payload, or the heartbeat interval has elapsed.
    pub fn should_emit(&self, payload: &LedPayload, now: Instant) -> bool {
        match (&self.last_payload, self.last_emit) {
            (Some(last), Some(at)) => last != payload || now.duration_since(at) >= self.interval,
            _ => true,
        }
    }

    /// Records a completed emission. Must be called after a positive
    /// `should_emit` once the publish has been handed off.
    pub fn record_emit(&mut self, payload: LedPayload, now: Instant) {
        self.last_payload = Some(payload);
        // last_emit never moves backwards even if callers race on `now`.
        self.last_emit = Some(self.last_emit.map_or(now, |at| at.max(now)));
    }

    pub fn last_payload(&self) -> Option<&LedPayload> {
        self.last_payload.as_ref()
    }
}
