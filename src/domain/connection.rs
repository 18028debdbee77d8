// Simulated data link and connection quality
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_DISCONNECT_PROBABILITY: f64 = 0.02;
pub const DEFAULT_RECONNECT_AFTER_ATTEMPTS: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionQuality {
    Excellent,
    Good,
    Poor,
    Disconnected,
}

impl ConnectionQuality {
    /// Grades freshness of the last update relative to the tick interval.
    pub fn derive(
        is_connected: bool,
        last_update: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
        interval: Duration,
    ) -> Self {
        if !is_connected {
            return ConnectionQuality::Disconnected;
        }
        let Some(last_update) = last_update else {
            return ConnectionQuality::Excellent;
        };

        let since_ms = (now - last_update).num_milliseconds().max(0) as f64;
        let interval_ms = interval.as_millis() as f64;

        if since_ms < interval_ms * 1.5 {
            ConnectionQuality::Excellent
        } else if since_ms < interval_ms * 3.0 {
            ConnectionQuality::Good
        } else if since_ms < interval_ms * 6.0 {
            ConnectionQuality::Poor
        } else {
            ConnectionQuality::Disconnected
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionState {
    pub is_connected: bool,
    pub consecutive_failed_attempts: u32,
    pub last_update: Option<DateTime<Utc>>,
}

impl Default for ConnectionState {
    fn default() -> Self {
        Self {
            is_connected: true,
            consecutive_failed_attempts: 0,
            last_update: None,
        }
    }
}

/// Result of polling the link for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStatus {
    Up,
    /// The link dropped on this tick.
    Dropped,
    /// Still down; carries the number of failed attempts so far.
    Down(u32),
    /// The link came back on this tick.
    Restored,
}

impl LinkStatus {
    pub fn is_success(self) -> bool {
        matches!(self, LinkStatus::Up | LinkStatus::Restored)
    }
}

#[derive(Debug, Clone)]
pub struct ConnectionSimulator {
    state: ConnectionState,
    disconnect_probability: f64,
    reconnect_after_attempts: u32,
}

impl ConnectionSimulator {
    pub fn new(disconnect_probability: f64, reconnect_after_attempts: u32) -> Self {
        Self {
            state: ConnectionState::default(),
            disconnect_probability: disconnect_probability.clamp(0.0, 1.0),
            reconnect_after_attempts,
        }
    }

    /// Advances the link by one tick. Only `Up` and `Restored` let the tick proceed.
    pub fn poll<R: Rng + ?Sized>(&mut self, rng: &mut R) -> LinkStatus {
        if self.state.is_connected {
            if rng.gen_bool(self.disconnect_probability) {
                self.state.is_connected = false;
                self.state.consecutive_failed_attempts = 0;
                return LinkStatus::Dropped;
            }
            return LinkStatus::Up;
        }

        self.state.consecutive_failed_attempts += 1;
        if self.state.consecutive_failed_attempts > self.reconnect_after_attempts {
            self.state.is_connected = true;
            self.state.consecutive_failed_attempts = 0;
            LinkStatus::Restored
        } else {
            LinkStatus::Down(self.state.consecutive_failed_attempts)
        }
    }

    pub fn force_disconnect(&mut self) {
        self.state.is_connected = false;
        self.state.consecutive_failed_attempts = 0;
    }

    pub fn record_update(&mut self, at: DateTime<Utc>) {
        self.state.last_update = Some(at);
    }

    #[cfg(test)]
    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state.is_connected
    }

    pub fn last_update(&self) -> Option<DateTime<Utc>> {
        self.state.last_update
    }
}

impl Default for ConnectionSimulator {
    fn default() -> Self {
        Self::new(DEFAULT_DISCONNECT_PROBABILITY, DEFAULT_RECONNECT_AFTER_ATTEMPTS)
    }
}
