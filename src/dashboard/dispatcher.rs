//! Timer- and event-driven dashboard cycles
//!
//! The dispatcher is `Idle` until armed. With a nonzero interval it waits on a
//! timer whose period is the interval plus a jitter drawn once when the timer
//! is armed; either the timer or a [`Trigger`] moves it to `Running`, and it
//! returns to waiting when the cycle ends, whatever the transport said.
//!
//! Triggers are coalesced: while a cycle runs at most one more is held, and
//! anything beyond that is dropped and reported as [`Queued::Coalesced`].

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::time::{self, Instant, Interval, MissedTickBehavior};
use tracing::{Instrument, error, info, info_span, warn};
use uuid::Uuid;

use super::collector::Collector;
use super::state::Snapshot;
use crate::observability::Metrics;
use crate::store::{DASHBOARD_KEY, DataStore};
use crate::transport::Transport;

/// Route the snapshot is delivered on.
pub const ROUTE: &str = "dashboard";

/// Upper bound (exclusive) of the timer jitter.
pub const JITTER_MILLIS: u64 = 2500;

/// What started a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    /// The recurring timer.
    #[serde(rename = "cron")]
    Timer,
    /// The HTTP trigger endpoint.
    Api,
    /// A person asked for it, e.g. the `once` command.
    User,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Timer => "cron",
            EventKind::Api => "api",
            EventKind::User => "user",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Idle,
    Waiting,
    Running,
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("dispatcher is not running")]
    Stopped,
}

/// Outcome of [`Trigger::fire`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Queued {
    Accepted,
    Coalesced,
}

/// Cloneable handle that asks the dispatcher for a cycle.
#[derive(Debug, Clone)]
pub struct Trigger {
    tx: mpsc::Sender<EventKind>,
    metrics: Arc<Metrics>,
}

impl Trigger {
    pub fn fire(&self, event: EventKind) -> Result<Queued, DispatchError> {
        match self.tx.try_send(event) {
            Ok(()) => Ok(Queued::Accepted),
            Err(mpsc::error::TrySendError::Full(_)) => {
                self.metrics.trigger_coalesced();
                info!(event = %event, "dashboard cycle already pending, trigger coalesced");
                Ok(Queued::Coalesced)
            }
            Err(mpsc::error::TrySendError::Closed(_)) => Err(DispatchError::Stopped),
        }
    }
}

pub struct Dispatcher {
    collector: Collector,
    transport: Arc<dyn Transport>,
    store: DataStore,
    metrics: Arc<Metrics>,
    interval: Duration,
    rx: mpsc::Receiver<EventKind>,
    phase: watch::Sender<Phase>,
}

impl Dispatcher {
    /// `interval` of zero disables the timer; only triggers start cycles.
    pub fn new(
        collector: Collector,
        transport: Arc<dyn Transport>,
        store: DataStore,
        metrics: Arc<Metrics>,
        interval: Duration,
    ) -> (Self, Trigger) {
        let (tx, rx) = mpsc::channel(1);
        let (phase, _) = watch::channel(Phase::Idle);

        let trigger = Trigger {
            tx,
            metrics: Arc::clone(&metrics),
        };

        let dispatcher = Self {
            collector,
            transport,
            store,
            metrics,
            interval,
            rx,
            phase,
        };

        (dispatcher, trigger)
    }

    pub fn phase(&self) -> watch::Receiver<Phase> {
        self.phase.subscribe()
    }

    /// Run cycles until `shutdown` resolves.
    pub async fn run<S>(mut self, shutdown: S)
    where
        S: Future<Output = ()> + Send,
    {
        let mut ticker = self.arm();
        let resting = if ticker.is_some() { Phase::Waiting } else { Phase::Idle };
        self.phase.send_replace(resting);

        tokio::pin!(shutdown);

        loop {
            let event = tokio::select! {
                _ = &mut shutdown => break,
                Some(event) = self.rx.recv() => event,
                _ = tick(&mut ticker) => EventKind::Timer,
            };

            self.phase.send_replace(Phase::Running);
            self.cycle(event).await;
            self.phase.send_replace(resting);
        }

        self.phase.send_replace(Phase::Idle);
        info!("dashboard dispatcher stopped");
    }

    fn arm(&self) -> Option<Interval> {
        if self.interval.is_zero() {
            info!("dashboard timer disabled, waiting for triggers only");
            return None;
        }

        let period = with_jitter(self.interval);
        info!(period = ?period, "dashboard timer armed");

        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Some(ticker)
    }

    /// Collect, save and send one snapshot.
    ///
    /// Transport failures are logged and counted; the snapshot is returned
    /// either way.
    pub async fn cycle(&self, event: EventKind) -> Snapshot {
        let cycle_id = Uuid::now_v7();
        let span = info_span!("dashboard", %cycle_id, event = %event);

        async {
            let started = std::time::Instant::now();
            let snapshot = self.collector.collect().await;
            let apps = started.elapsed();

            let errors = snapshot.error_count();
            self.metrics.instance_errors(errors as u64);

            match serde_json::to_value(&snapshot) {
                Ok(value) => self.store.save(DASHBOARD_KEY, value).await,
                Err(e) => warn!(error = %e, "could not save dashboard snapshot"),
            }

            match self.transport.send(ROUTE, event, &snapshot).await {
                Ok(_) => info!(
                    apps = ?apps,
                    total = ?started.elapsed(),
                    errors,
                    "sent dashboard state"
                ),
                Err(e) => {
                    self.metrics.transport_failed();
                    error!(apps = ?apps, errors, error = %e, "sending dashboard state failed");
                }
            }

            self.metrics.cycle_run();
            snapshot
        }
        .instrument(span)
        .await
    }
}

/// `interval` plus a uniform jitter in `[0, JITTER_MILLIS)` ms.
pub fn with_jitter(interval: Duration) -> Duration {
    interval + Duration::from_millis(rand::rng().random_range(0..JITTER_MILLIS))
}

async fn tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::collector::Sources;
    use crate::transport::MemoryTransport;

    fn dispatcher(interval: Duration) -> (Dispatcher, Trigger, Arc<MemoryTransport>) {
        let store = DataStore::new();
        let transport = Arc::new(MemoryTransport::new());
        let (dispatcher, trigger) = Dispatcher::new(
            Collector::new(Sources::default(), store.clone()),
            transport.clone(),
            store,
            Arc::new(Metrics::new()),
            interval,
        );
        (dispatcher, trigger, transport)
    }

    #[test]
    fn test_jitter_range() {
        let interval = Duration::from_secs(300);
        for _ in 0..100 {
            let period = with_jitter(interval);
            assert!(period >= interval);
            assert!(period < interval + Duration::from_millis(JITTER_MILLIS));
        }
    }

    #[test]
    fn test_event_kind_wire_names() {
        assert_eq!(serde_json::to_value(EventKind::Timer).unwrap(), "cron");
        assert_eq!(serde_json::to_value(EventKind::Api).unwrap(), "api");
        assert_eq!(EventKind::User.to_string(), "user");
    }

    #[tokio::test]
    async fn test_trigger_coalesces_while_pending() {
        let (dispatcher, trigger, _) = dispatcher(Duration::ZERO);

        assert_eq!(trigger.fire(EventKind::Api).unwrap(), Queued::Accepted);
        assert_eq!(trigger.fire(EventKind::Api).unwrap(), Queued::Coalesced);
        assert_eq!(dispatcher.metrics.snapshot().triggers_coalesced, 1);

        drop(dispatcher);
        assert!(matches!(trigger.fire(EventKind::Api), Err(DispatchError::Stopped)));
    }

    #[tokio::test]
    async fn test_cycle_saves_and_sends() {
        let (dispatcher, _trigger, transport) = dispatcher(Duration::ZERO);

        dispatcher.cycle(EventKind::User).await;

        let sent = transport.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].route, ROUTE);
        assert!(sent[0].payload["radarr"].is_array());
        assert!(dispatcher.store.get(DASHBOARD_KEY).await.is_some());
        assert_eq!(dispatcher.metrics.snapshot().cycles_run, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_fires_after_interval() {
        let (dispatcher, _trigger, transport) = dispatcher(Duration::from_secs(60));
        let phase = dispatcher.phase();
        let (stop, stopped) = tokio::sync::oneshot::channel::<()>();

        let handle = tokio::spawn(dispatcher.run(async move {
            let _ = stopped.await;
        }));

        time::sleep(Duration::from_secs(30)).await;
        assert!(transport.sent().is_empty());
        assert_eq!(*phase.borrow(), Phase::Waiting);

        time::sleep(Duration::from_secs(33)).await;
        assert_eq!(transport.sent().len(), 1);
        assert_eq!(transport.sent()[0].event, EventKind::Timer);

        let _ = stop.send(());
        handle.await.unwrap();
        assert_eq!(*phase.borrow(), Phase::Idle);
    }
}
