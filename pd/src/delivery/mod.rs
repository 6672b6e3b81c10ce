//! Realtime delivery channel
//!
//! Fans session deltas out to subscribed clients. A channel tracks
//! its client's connection state: while disconnected it buffers
//! deltas up to a bound, dropping the oldest beyond it. Once the
//! buffer has dropped anything, replay would leave a gap, so on
//! reconnect the channel sends exactly one Resync and the client
//! refetches the full snapshot instead.

use std::collections::VecDeque;
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::error::OrchestratorError;
use crate::session::Delta;

/// Client connection lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    Connecting,
    Connected,
    Disconnected,
    Error,
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connecting => write!(f, "connecting"),
            Self::Connected => write!(f, "connected"),
            Self::Disconnected => write!(f, "disconnected"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// What a subscribed client receives
#[derive(Debug, Clone)]
pub enum ClientSignal {
    /// Incremental session change
    Delta(Delta),
    /// Buffered history was lost; refetch the full snapshot
    Resync,
    /// Connection state changed
    Status(ConnectionState),
}

/// One client's delta feed
pub struct DeliveryChannel {
    state: ConnectionState,
    buffer: VecDeque<Delta>,
    capacity: usize,
    needs_resync: bool,
    tx: mpsc::Sender<ClientSignal>,
}

impl DeliveryChannel {
    /// New channel in Connecting state; `capacity` bounds the
    /// disconnected-side buffer
    pub fn new(capacity: usize, tx: mpsc::Sender<ClientSignal>) -> Self {
        Self {
            state: ConnectionState::Connecting,
            buffer: VecDeque::with_capacity(capacity),
            capacity,
            needs_resync: false,
            tx,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Number of buffered deltas awaiting replay
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Deliver one delta: straight through when connected, buffered
    /// otherwise. Buffer overflow drops the oldest delta and flags
    /// the channel for resync on reconnect.
    pub fn push(&mut self, delta: Delta) -> Result<(), OrchestratorError> {
        if self.state == ConnectionState::Connected {
            return self.send(ClientSignal::Delta(delta));
        }

        if self.buffer.len() >= self.capacity {
            self.buffer.pop_front();
            if !self.needs_resync {
                warn!(capacity = self.capacity, "delta buffer overflowed, resync scheduled");
            }
            self.needs_resync = true;
        }
        self.buffer.push_back(delta);
        Ok(())
    }

    /// Record a connection state change. Every transition emits a
    /// Status signal; entering Connected either replays the buffer in
    /// order or, after an overflow, clears it and emits one Resync.
    pub fn set_state(&mut self, state: ConnectionState) -> Result<(), OrchestratorError> {
        if state == self.state {
            return Ok(());
        }
        debug!(from = %self.state, to = %state, "delivery state change");
        self.state = state;
        self.send(ClientSignal::Status(state))?;

        if state == ConnectionState::Connected {
            if self.needs_resync {
                self.buffer.clear();
                self.needs_resync = false;
                self.send(ClientSignal::Resync)?;
            } else {
                while let Some(delta) = self.buffer.pop_front() {
                    self.send(ClientSignal::Delta(delta))?;
                }
            }
        }
        Ok(())
    }

    fn send(&self, signal: ClientSignal) -> Result<(), OrchestratorError> {
        self.tx.try_send(signal).map_err(|_| OrchestratorError::ChannelOverflow)
    }
}

/// Exponential reconnect backoff with jitter
pub struct ReconnectBackoff {
    initial: Duration,
    max: Duration,
    attempt: u32,
}

impl ReconnectBackoff {
    pub fn new(initial: Duration, max: Duration) -> Self {
        Self { initial, max, attempt: 0 }
    }

    /// Delay before the next attempt: initial * 2^attempt, capped at
    /// max, with +/-20% jitter to avoid thundering reconnects
    pub fn next_delay(&mut self) -> Duration {
        let exp = self.initial.saturating_mul(1u32 << self.attempt.min(16));
        let capped = exp.min(self.max);
        self.attempt = self.attempt.saturating_add(1);

        let jitter = rand::rng().random_range(0.8..1.2);
        capped.mul_f64(jitter)
    }

    /// Call after a successful connection
    pub fn reset(&mut self) {
        self.attempt = 0;
    }
}
