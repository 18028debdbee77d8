// Session runner - Drives a telemetry session on its schedule and publishes views
use crate::application::debounce::Debouncer;
use crate::application::history_store::{HistoryStore, PersistedHistory};
use crate::application::telemetry_session::{SessionView, TelemetrySession, TickOutcome};
use chrono::Utc;
use rand::Rng;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Duration, Instant, Interval, MissedTickBehavior};

const COMMAND_BUFFER: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Visible,
    Hidden,
}

#[derive(Debug)]
pub enum SessionCommand {
    SelectMachine(String),
    SetVisibility(Visibility),
    ForceDisconnect,
    Shutdown,
}

#[derive(Debug, thiserror::Error)]
#[error("telemetry session has stopped")]
pub struct SessionClosed;

/// Cheap, cloneable access to a running session.
#[derive(Clone)]
pub struct SessionHandle {
    commands: mpsc::Sender<SessionCommand>,
    views: watch::Receiver<Option<SessionView>>,
}

impl SessionHandle {
    pub async fn select_machine(&self, machine_id: impl Into<String>) -> Result<(), SessionClosed> {
        self.send(SessionCommand::SelectMachine(machine_id.into())).await
    }

    pub async fn set_visibility(&self, visibility: Visibility) -> Result<(), SessionClosed> {
        self.send(SessionCommand::SetVisibility(visibility)).await
    }

    /// Drops the simulated link; it comes back through the normal reconnect
    /// path on later ticks.
    pub async fn force_disconnect(&self) -> Result<(), SessionClosed> {
        self.send(SessionCommand::ForceDisconnect).await
    }

    pub async fn shutdown(&self) -> Result<(), SessionClosed> {
        self.send(SessionCommand::Shutdown).await
    }

    /// Latest debounced view, `None` before the first publication.
    pub fn latest(&self) -> Option<SessionView> {
        self.views.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<SessionView>> {
        self.views.clone()
    }

    async fn send(&self, command: SessionCommand) -> Result<(), SessionClosed> {
        self.commands.send(command).await.map_err(|_| SessionClosed)
    }
}

pub struct SessionRunner<R> {
    session: TelemetrySession<R>,
    store: Option<Arc<dyn HistoryStore>>,
    debouncer: Debouncer<SessionView>,
    views: watch::Sender<Option<SessionView>>,
}

impl<R: Rng + Send + Sync + 'static> SessionRunner<R> {
    /// Starts the runner task. The first tick happens immediately; the task
    /// ends on `shutdown` or once every handle is dropped.
    pub fn spawn(
        session: TelemetrySession<R>,
        store: Option<Arc<dyn HistoryStore>>,
        debounce_window: Duration,
    ) -> (SessionHandle, JoinHandle<()>) {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
        let (view_tx, view_rx) = watch::channel(None);

        let runner = Self {
            session,
            store,
            debouncer: Debouncer::new(debounce_window),
            views: view_tx,
        };
        let task = tokio::spawn(runner.run(command_rx));

        let handle = SessionHandle {
            commands: command_tx,
            views: view_rx,
        };
        (handle, task)
    }

    async fn run(mut self, mut commands: mpsc::Receiver<SessionCommand>) {
        self.restore_history().await;

        let period = self.session.update_interval();
        let mut ticker = Some(schedule(Instant::now(), period));
        tracing::info!(
            "Telemetry session started for {} (every {:?})",
            self.session.snapshot().id,
            period
        );

        loop {
            tokio::select! {
                _ = next_tick(&mut ticker) => {
                    let outcome = self.session.tick(Utc::now());
                    self.after_tick(outcome).await;
                }
                command = commands.recv() => {
                    let Some(command) = command else { break };
                    match command {
                        SessionCommand::Shutdown => break,
                        SessionCommand::SelectMachine(machine_id) => {
                            match self.session.select_machine(&machine_id, Utc::now()) {
                                Some(outcome) => {
                                    ticker = Some(schedule(Instant::now() + period, period));
                                    self.after_tick(outcome).await;
                                }
                                None => self.publish(),
                            }
                        }
                        SessionCommand::SetVisibility(Visibility::Hidden) => {
                            if self.session.pause(Utc::now()) {
                                ticker = None;
                                tracing::debug!("Session paused");
                                self.publish();
                            }
                        }
                        SessionCommand::SetVisibility(Visibility::Visible) => {
                            if let Some(outcome) = self.session.resume(Utc::now()) {
                                ticker = Some(schedule(Instant::now() + period, period));
                                tracing::debug!("Session resumed");
                                self.after_tick(outcome).await;
                            }
                        }
                        SessionCommand::ForceDisconnect => {
                            self.session.force_disconnect();
                            tracing::info!("Link to {} forced down", self.session.snapshot().id);
                            self.publish();
                        }
                    }
                }
                _ = flush_at(self.debouncer.deadline()) => {
                    if let Some(view) = self.debouncer.flush(Instant::now()) {
                        self.views.send_replace(Some(view));
                    }
                }
            }
        }

        tracing::info!("Telemetry session for {} stopped", self.session.snapshot().id);
    }

    async fn restore_history(&mut self) {
        let Some(store) = &self.store else { return };
        match store.load().await {
            Ok(Some(saved)) if saved.machine_id == self.session.snapshot().id => {
                tracing::info!(
                    "Restored {} history samples for {}",
                    saved.samples.len(),
                    saved.machine_id
                );
                self.session.restore_history(saved.samples);
            }
            Ok(_) => {}
            Err(e) => tracing::warn!("Could not read history cache, starting empty: {}", e),
        }
    }

    async fn after_tick(&mut self, outcome: TickOutcome) {
        if outcome == TickOutcome::Updated {
            self.persist_history().await;
        }
        self.publish();
    }

    async fn persist_history(&self) {
        let Some(store) = &self.store else { return };
        let history = PersistedHistory {
            machine_id: self.session.snapshot().id.clone(),
            samples: self.session.history().snapshot(),
        };
        if let Err(e) = store.save(&history).await {
            tracing::warn!("Could not write history cache: {}", e);
        }
    }

    fn publish(&mut self) {
        let view = self.session.view(Utc::now());
        if let Some(view) = self.debouncer.offer(view, Instant::now()) {
            self.views.send_replace(Some(view));
        }
    }
}

fn schedule(start: Instant, period: Duration) -> Interval {
    let mut interval = time::interval_at(start, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

async fn flush_at(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => time::sleep_until(deadline).await,
        None => std::future::pending::<()>().await,
    }
}
