// Telemetry session - Per-machine orchestration of link, generator, OEE and history
use crate::application::machine_catalog::MachineCatalog;
use crate::application::metric_generator::{next_metrics, SimulationTrendState};
use crate::domain::connection::{ConnectionQuality, ConnectionSimulator, LinkStatus};
use crate::domain::history::{HistoryBuffer, HistorySample};
use crate::domain::machine::MachineSnapshot;
use crate::domain::oee::OeeScore;
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::Rng;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub update_interval: Duration,
    pub max_history_size: usize,
    pub disconnect_probability: f64,
    pub reconnect_after_attempts: u32,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            update_interval: Duration::from_millis(3000),
            max_history_size: crate::domain::history::DEFAULT_HISTORY_CAPACITY,
            disconnect_probability: crate::domain::connection::DEFAULT_DISCONNECT_PROBABILITY,
            reconnect_after_attempts: crate::domain::connection::DEFAULT_RECONNECT_AFTER_ATTEMPTS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    Active,
    Paused,
    /// A different machine was loaded and its first tick has not run yet.
    Switching,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Updated,
    /// The link was down; nothing changed.
    Skipped(LinkStatus),
    Paused,
}

/// What consumers see of a session.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub machine: MachineSnapshot,
    pub phase: SessionPhase,
    pub is_connected: bool,
    pub connection_quality: ConnectionQuality,
    pub last_update: Option<DateTime<Utc>>,
    pub history_size: usize,
    pub history: Vec<HistorySample>,
    pub update_interval_ms: u64,
}

impl SessionView {
    /// Re-grades connection quality against a later clock reading.
    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.connection_quality = ConnectionQuality::derive(
            self.is_connected,
            self.last_update,
            now,
            Duration::from_millis(self.update_interval_ms),
        );
        self
    }
}

pub struct TelemetrySession<R = StdRng> {
    catalog: Arc<dyn MachineCatalog>,
    settings: SessionSettings,
    rng: R,
    phase: SessionPhase,
    snapshot: MachineSnapshot,
    trends: HashMap<String, SimulationTrendState>,
    history: HistoryBuffer,
    link: ConnectionSimulator,
    /// Reference point for elapsed time; shifted forward by paused spans.
    last_tick_at: DateTime<Utc>,
    paused_at: Option<DateTime<Utc>>,
}

impl<R: Rng> TelemetrySession<R> {
    pub fn new(
        catalog: Arc<dyn MachineCatalog>,
        settings: SessionSettings,
        machine_id: &str,
        rng: R,
        now: DateTime<Utc>,
    ) -> Self {
        let snapshot = catalog.machine_or_default(machine_id);
        let mut trends = HashMap::new();
        trends.insert(snapshot.id.clone(), SimulationTrendState::default());

        Self {
            history: HistoryBuffer::new(settings.max_history_size),
            link: ConnectionSimulator::new(
                settings.disconnect_probability,
                settings.reconnect_after_attempts,
            ),
            catalog,
            settings,
            rng,
            phase: SessionPhase::Active,
            snapshot,
            trends,
            last_tick_at: now,
            paused_at: None,
        }
    }

    /// Seeds the history buffer with previously saved samples.
    pub fn restore_history(&mut self, samples: Vec<HistorySample>) {
        self.history = HistoryBuffer::restore(self.settings.max_history_size, samples);
    }

    /// Runs the tick pipeline once: link check, metrics, OEE, history.
    pub fn tick(&mut self, now: DateTime<Utc>) -> TickOutcome {
        if self.phase == SessionPhase::Paused {
            return TickOutcome::Paused;
        }
        self.phase = SessionPhase::Active;

        let status = self.link.poll(&mut self.rng);
        match status {
            LinkStatus::Dropped => {
                tracing::info!("Connection lost while polling {}", self.snapshot.id)
            }
            LinkStatus::Restored => {
                tracing::info!("Connection restored for {}", self.snapshot.id)
            }
            LinkStatus::Down(attempts) => tracing::debug!(
                "Connection still down for {} ({} attempts)",
                self.snapshot.id,
                attempts
            ),
            LinkStatus::Up => {}
        }
        if !status.is_success() {
            return TickOutcome::Skipped(status);
        }

        let elapsed_seconds = (now - self.last_tick_at).num_milliseconds().max(0) as f64 / 1000.0;
        let profile = self.snapshot.category.profile();
        let trend = self.trends.entry(self.snapshot.id.clone()).or_default();
        let metrics = next_metrics(
            &mut self.rng,
            &self.snapshot.metrics,
            self.snapshot.state,
            profile,
            elapsed_seconds,
            trend,
        );

        self.snapshot.oee = OeeScore::compute(&metrics, profile.rated_rpm);
        self.snapshot.metrics = metrics;
        self.snapshot.timestamp = now;

        self.history.append(HistorySample {
            timestamp: now,
            temperature: self.snapshot.metrics.temperature,
            rpm: self.snapshot.metrics.rpm,
            efficiency: self.snapshot.metrics.efficiency,
        });
        self.link.record_update(now);
        self.last_tick_at = now;

        tracing::debug!(
            "Tick for {}: temp={:.1} rpm={:.0} oee={:.1}",
            self.snapshot.id,
            self.snapshot.metrics.temperature,
            self.snapshot.metrics.rpm,
            self.snapshot.oee.overall
        );
        TickOutcome::Updated
    }

    /// Loads a different machine without ticking: baseline snapshot, fresh
    /// trend state, empty history. Returns false when `machine_id` resolves
    /// to the machine already loaded.
    pub fn begin_switch(&mut self, machine_id: &str, now: DateTime<Utc>) -> bool {
        if machine_id == self.snapshot.id {
            return false;
        }
        let next = self.catalog.machine_or_default(machine_id);
        if next.id == self.snapshot.id {
            return false;
        }

        tracing::info!("Switching session from {} to {}", self.snapshot.id, next.id);
        self.trends.remove(&self.snapshot.id);
        self.trends.insert(next.id.clone(), SimulationTrendState::default());
        self.snapshot = next;
        self.history.clear();
        self.last_tick_at = now;

        if self.phase == SessionPhase::Paused {
            self.paused_at = Some(now);
        } else {
            self.phase = SessionPhase::Switching;
        }
        true
    }

    /// Switches machines and, unless paused, ticks once right away. The
    /// deferred tick of a paused session happens on resume.
    pub fn select_machine(&mut self, machine_id: &str, now: DateTime<Utc>) -> Option<TickOutcome> {
        if !self.begin_switch(machine_id, now) || self.phase == SessionPhase::Paused {
            return None;
        }
        Some(self.tick(now))
    }

    /// Suspends ticking. Returns false if already paused.
    pub fn pause(&mut self, now: DateTime<Utc>) -> bool {
        if self.phase == SessionPhase::Paused {
            return false;
        }
        self.phase = SessionPhase::Paused;
        self.paused_at = Some(now);
        true
    }

    /// Leaves the paused phase and ticks once immediately. Time spent paused
    /// does not count towards uptime.
    pub fn resume(&mut self, now: DateTime<Utc>) -> Option<TickOutcome> {
        if self.phase != SessionPhase::Paused {
            return None;
        }
        if let Some(paused_at) = self.paused_at.take() {
            if now > paused_at {
                self.last_tick_at += now - paused_at;
            }
        }
        self.phase = SessionPhase::Active;
        Some(self.tick(now))
    }

    pub fn force_disconnect(&mut self) {
        self.link.force_disconnect();
    }

    pub fn connection_quality(&self, now: DateTime<Utc>) -> ConnectionQuality {
        ConnectionQuality::derive(
            self.link.is_connected(),
            self.link.last_update(),
            now,
            self.settings.update_interval,
        )
    }

    pub fn view(&self, now: DateTime<Utc>) -> SessionView {
        SessionView {
            machine: self.snapshot.clone(),
            phase: self.phase,
            is_connected: self.link.is_connected(),
            connection_quality: self.connection_quality(now),
            last_update: self.link.last_update(),
            history_size: self.history.len(),
            history: self.history.snapshot(),
            update_interval_ms: self.settings.update_interval.as_millis() as u64,
        }
    }

    pub fn snapshot(&self) -> &MachineSnapshot {
        &self.snapshot
    }

    pub fn history(&self) -> &HistoryBuffer {
        &self.history
    }

    #[cfg(test)]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    #[cfg(test)]
    pub fn last_update(&self) -> Option<DateTime<Utc>> {
        self.link.last_update()
    }

    pub fn update_interval(&self) -> Duration {
        self.settings.update_interval
    }

    #[cfg(test)]
    pub fn trend_state(&self, machine_id: &str) -> Option<&SimulationTrendState> {
        self.trends.get(machine_id)
    }
}
