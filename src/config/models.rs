use serde::{Deserialize, Serialize};
use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
    #[serde(default)]
    pub transport: TransportConfig,
    #[serde(default)]
    pub apps: AppsConfig,
}

/// HTTP surface
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from((Ipv4Addr::UNSPECIFIED, 5454))
}

/// Dashboard timer and fetch limits
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DashboardConfig {
    /// Seconds between timer cycles; 0 disables the timer.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// Request timeout for instances that do not set their own.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl DashboardConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_interval_secs() -> u64 {
    300
}

fn default_timeout_secs() -> u64 {
    60
}

/// Where snapshots are delivered
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TransportConfig {
    /// Empty keeps snapshots local.
    #[serde(default)]
    pub base_url: String,
    /// Usually supplied through `DASHSTATE_API_KEY` instead.
    #[serde(default, skip_serializing)]
    pub api_key: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl TransportConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Fields every configured instance shares.
pub trait AppInstance {
    fn name(&self) -> &str;
    fn url(&self) -> &str;
    fn url_mut(&mut self) -> &mut String;
    fn timeout_secs(&self) -> Option<u64>;

    /// API key, for the apps that authenticate with one.
    fn api_key(&self) -> Option<&str> {
        None
    }

    /// The instance timeout, else `fallback`.
    fn timeout(&self, fallback: Duration) -> Duration {
        self.timeout_secs().map(Duration::from_secs).unwrap_or(fallback)
    }
}

/// Radarr, Sonarr, Readarr or Lidarr
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StarrInstance {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing)]
    pub api_key: String,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct QbitInstance {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub username: String,
    #[serde(default, skip_serializing)]
    pub password: String,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DelugeInstance {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing)]
    pub password: String,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SabnzbdInstance {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing)]
    pub api_key: String,
    pub timeout_secs: Option<u64>,
}

impl AppInstance for StarrInstance {
    fn name(&self) -> &str {
        &self.name
    }

    fn url(&self) -> &str {
        &self.url
    }

    fn url_mut(&mut self) -> &mut String {
        &mut self.url
    }

    fn timeout_secs(&self) -> Option<u64> {
        self.timeout_secs
    }

    fn api_key(&self) -> Option<&str> {
        Some(&self.api_key)
    }
}

impl AppInstance for QbitInstance {
    fn name(&self) -> &str {
        &self.name
    }

    fn url(&self) -> &str {
        &self.url
    }

    fn url_mut(&mut self) -> &mut String {
        &mut self.url
    }

    fn timeout_secs(&self) -> Option<u64> {
        self.timeout_secs
    }
}

impl AppInstance for DelugeInstance {
    fn name(&self) -> &str {
        &self.name
    }

    fn url(&self) -> &str {
        &self.url
    }

    fn url_mut(&mut self) -> &mut String {
        &mut self.url
    }

    fn timeout_secs(&self) -> Option<u64> {
        self.timeout_secs
    }
}

impl AppInstance for SabnzbdInstance {
    fn name(&self) -> &str {
        &self.name
    }

    fn url(&self) -> &str {
        &self.url
    }

    fn url_mut(&mut self) -> &mut String {
        &mut self.url
    }

    fn timeout_secs(&self) -> Option<u64> {
        self.timeout_secs
    }

    fn api_key(&self) -> Option<&str> {
        Some(&self.api_key)
    }
}

/// Configured instances per family, in order
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppsConfig {
    #[serde(default)]
    pub radarr: Vec<StarrInstance>,
    #[serde(default)]
    pub sonarr: Vec<StarrInstance>,
    #[serde(default)]
    pub readarr: Vec<StarrInstance>,
    #[serde(default)]
    pub lidarr: Vec<StarrInstance>,
    #[serde(default)]
    pub qbit: Vec<QbitInstance>,
    #[serde(default)]
    pub deluge: Vec<DelugeInstance>,
    #[serde(default)]
    pub sabnzbd: Vec<SabnzbdInstance>,
}

impl AppsConfig {
    /// Strip whitespace and trailing slashes from every URL.
    pub fn trim_urls(&mut self) {
        fn trim<T: AppInstance>(apps: &mut [T]) {
            for app in apps {
                let url = app.url().trim().trim_end_matches('/').to_string();
                *app.url_mut() = url;
            }
        }

        trim(&mut self.radarr);
        trim(&mut self.sonarr);
        trim(&mut self.readarr);
        trim(&mut self.lidarr);
        trim(&mut self.qbit);
        trim(&mut self.deluge);
        trim(&mut self.sabnzbd);
    }

    /// `(family, position, instance)` for every configured instance.
    pub fn instances(&self) -> Vec<(&'static str, usize, &dyn AppInstance)> {
        fn tag<'a, T: AppInstance>(
            family: &'static str,
            apps: &'a [T],
        ) -> impl Iterator<Item = (&'static str, usize, &'a dyn AppInstance)> + 'a {
            apps.iter()
                .enumerate()
                .map(move |(i, app)| (family, i + 1, app as &dyn AppInstance))
        }

        tag("radarr", &self.radarr)
            .chain(tag("sonarr", &self.sonarr))
            .chain(tag("readarr", &self.readarr))
            .chain(tag("lidarr", &self.lidarr))
            .chain(tag("qbit", &self.qbit))
            .chain(tag("deluge", &self.deluge))
            .chain(tag("sabnzbd", &self.sabnzbd))
            .collect()
    }
}
