use std::sync::Arc;

use tokio::sync::watch;

use crate::dashboard::{Phase, Trigger};
use crate::observability::Metrics;
use crate::store::DataStore;

#[derive(Clone)]
pub struct AppState {
    pub store: DataStore,
    pub trigger: Trigger,
    pub metrics: Arc<Metrics>,
    pub phase: watch::Receiver<Phase>,
    /// Instances with a URL configured.
    pub instances: usize,
}

impl AppState {
    pub fn new(
        store: DataStore,
        trigger: Trigger,
        metrics: Arc<Metrics>,
        phase: watch::Receiver<Phase>,
        instances: usize,
    ) -> Self {
        Self {
            store,
            trigger,
            metrics,
            phase,
            instances,
        }
    }
}
