//! Parallel collector: one task per family, one state per instance

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, error};

use super::extract;
use super::state::{Family, Snapshot, State};
use crate::apps::{
    DelugeApi, DelugeClient, FetchError, HttpClient, HttpConfig, LidarrApi, QbitApi, QbitClient,
    RadarrApi, ReadarrApi, SabnzbdApi, SabnzbdClient, SonarrApi, StarrClient,
};
use crate::config::{AppInstance, AppsConfig};
use crate::store::{DataStore, PLEX_SESSIONS_KEY};

/// One configured deployment of a family.
pub struct Instance<A: ?Sized> {
    pub name: String,
    /// Instances with an empty URL are configured but disabled.
    pub url: String,
    pub api: Arc<A>,
}

impl<A: ?Sized> Instance<A> {
    pub fn new(name: impl Into<String>, url: impl Into<String>, api: Arc<A>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            api,
        }
    }
}

impl<A: ?Sized> Clone for Instance<A> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            url: self.url.clone(),
            api: Arc::clone(&self.api),
        }
    }
}

impl<A: ?Sized> fmt::Debug for Instance<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("name", &self.name)
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

/// Every configured instance, by family, in configured order.
#[derive(Clone, Default, Debug)]
pub struct Sources {
    pub lidarr: Vec<Instance<dyn LidarrApi>>,
    pub radarr: Vec<Instance<dyn RadarrApi>>,
    pub readarr: Vec<Instance<dyn ReadarrApi>>,
    pub sonarr: Vec<Instance<dyn SonarrApi>>,
    pub qbit: Vec<Instance<dyn QbitApi>>,
    pub deluge: Vec<Instance<dyn DelugeApi>>,
    pub sabnzbd: Vec<Instance<dyn SabnzbdApi>>,
}

impl Sources {
    /// Build an HTTP client per configured instance. Instances without their
    /// own timeout use `fallback`.
    pub fn from_config(apps: &AppsConfig, fallback: Duration) -> Result<Self, FetchError> {
        let http = |app: &dyn AppInstance| HttpClient::new(HttpConfig::with_timeout(app.timeout(fallback)));
        let mut sources = Sources::default();

        for app in &apps.radarr {
            let api: Arc<dyn RadarrApi> = Arc::new(StarrClient::v3(http(app)?, &app.url, &app.api_key));
            sources.radarr.push(Instance::new(&app.name, &app.url, api));
        }

        for app in &apps.sonarr {
            let api: Arc<dyn SonarrApi> = Arc::new(StarrClient::v3(http(app)?, &app.url, &app.api_key));
            sources.sonarr.push(Instance::new(&app.name, &app.url, api));
        }

        for app in &apps.readarr {
            let api: Arc<dyn ReadarrApi> = Arc::new(StarrClient::v1(http(app)?, &app.url, &app.api_key));
            sources.readarr.push(Instance::new(&app.name, &app.url, api));
        }

        for app in &apps.lidarr {
            let api: Arc<dyn LidarrApi> = Arc::new(StarrClient::v1(http(app)?, &app.url, &app.api_key));
            sources.lidarr.push(Instance::new(&app.name, &app.url, api));
        }

        for app in &apps.qbit {
            let api: Arc<dyn QbitApi> = Arc::new(QbitClient::new(
                http(app)?,
                &app.url,
                &app.username,
                &app.password,
            ));
            sources.qbit.push(Instance::new(&app.name, &app.url, api));
        }

        for app in &apps.deluge {
            let api: Arc<dyn DelugeApi> = Arc::new(DelugeClient::new(http(app)?, &app.url, &app.password));
            sources.deluge.push(Instance::new(&app.name, &app.url, api));
        }

        for app in &apps.sabnzbd {
            let api: Arc<dyn SabnzbdApi> = Arc::new(SabnzbdClient::new(http(app)?, &app.url, &app.api_key));
            sources.sabnzbd.push(Instance::new(&app.name, &app.url, api));
        }

        Ok(sources)
    }

    /// Instances with a non-empty URL, across all families.
    pub fn enabled(&self) -> usize {
        fn count<A: ?Sized>(instances: &[Instance<A>]) -> usize {
            instances.iter().filter(|i| !i.url.is_empty()).count()
        }

        count(&self.lidarr)
            + count(&self.radarr)
            + count(&self.readarr)
            + count(&self.sonarr)
            + count(&self.qbit)
            + count(&self.deluge)
            + count(&self.sabnzbd)
    }
}

/// Builds one [`Snapshot`] per call from the configured sources.
#[derive(Clone, Debug)]
pub struct Collector {
    sources: Arc<Sources>,
    store: DataStore,
}

impl Collector {
    pub fn new(sources: Sources, store: DataStore) -> Self {
        Self {
            sources: Arc::new(sources),
            store,
        }
    }

    pub fn sources(&self) -> &Sources {
        &self.sources
    }

    /// Run every family concurrently and wait for all of them.
    ///
    /// An instance whose extraction panics is reported with an error; the
    /// other instances and families are unaffected.
    pub async fn collect(&self) -> Snapshot {
        let s = &self.sources;

        let tasks = [
            spawn_family(Family::Lidarr, s.lidarr.clone(), |i, name, api| async move {
                extract::lidarr::state(i, &name, api.as_ref()).await
            }),
            spawn_family(Family::Radarr, s.radarr.clone(), |i, name, api| async move {
                extract::radarr::state(i, &name, api.as_ref()).await
            }),
            spawn_family(Family::Readarr, s.readarr.clone(), |i, name, api| async move {
                extract::readarr::state(i, &name, api.as_ref()).await
            }),
            spawn_family(Family::Sonarr, s.sonarr.clone(), |i, name, api| async move {
                extract::sonarr::state(i, &name, api.as_ref()).await
            }),
            spawn_family(Family::Qbit, s.qbit.clone(), |i, name, api| async move {
                extract::qbit::state(i, &name, api.as_ref()).await
            }),
            spawn_family(Family::Deluge, s.deluge.clone(), |i, name, api| async move {
                extract::deluge::state(i, &name, api.as_ref()).await
            }),
            spawn_family(Family::Sabnzbd, s.sabnzbd.clone(), |i, name, api| async move {
                extract::sabnzbd::state(i, &name, api.as_ref()).await
            }),
        ];

        let mut snapshot = Snapshot::default();
        for (family, task) in tasks {
            let states = match task.await {
                Ok(states) => states,
                Err(e) if e.is_panic() => {
                    error!(family = %family, "state collection panicked");
                    Vec::new()
                }
                Err(e) => {
                    error!(family = %family, error = %e, "state collection cancelled");
                    Vec::new()
                }
            };
            snapshot.families.insert(family, states);
        }

        snapshot.sessions = self.store.get(PLEX_SESSIONS_KEY).await.map(|item| item.data);
        snapshot
    }
}

/// Spawn the task that walks one family's instances in order.
fn spawn_family<A, F, Fut>(
    family: Family,
    instances: Vec<Instance<A>>,
    extract: F,
) -> (Family, JoinHandle<Vec<State>>)
where
    A: ?Sized + Send + Sync + 'static,
    F: Fn(usize, String, Arc<A>) -> Fut + Send + 'static,
    Fut: Future<Output = State> + Send + 'static,
{
    let handle = tokio::spawn(async move {
        let mut states = Vec::with_capacity(instances.len());

        for (i, instance) in instances.into_iter().enumerate() {
            if instance.url.is_empty() {
                continue;
            }

            let index = i + 1;
            debug!(family = %family, instance = index, name = %instance.name, "getting state");

            // A panic fails this instance only.
            let state = match tokio::spawn(extract(index, instance.name.clone(), instance.api)).await {
                Ok(state) => state,
                Err(e) => {
                    let mut state = State::new(index, instance.name);
                    state.error = if e.is_panic() {
                        "state collection panicked".to_string()
                    } else {
                        "state collection cancelled".to_string()
                    };
                    state
                }
            };
            if !state.is_ok() {
                error!(family = %family, instance = index, error = %state.error, "getting state failed");
            }

            states.push(state);
        }

        states
    });

    (family, handle)
}
