//! Upstream service clients
//!
//! Each family exposes an async `*Api` trait returning already-decoded wire
//! records. The dashboard extractors only see these traits, so tests can
//! stand in fakes for the HTTP clients defined here.
//!
//! ## Families
//!
//! - Radarr, Sonarr, Readarr, Lidarr: [`StarrClient`] (API key header)
//! - qBittorrent: [`QbitClient`] (cookie login)
//! - Deluge: [`DelugeClient`] (JSON-RPC with cookie login)
//! - SABnzbd: [`SabnzbdClient`] (API key query parameter)

pub mod deluge;
pub mod http;
pub mod lidarr;
pub mod qbit;
pub mod radarr;
pub mod readarr;
pub mod sabnzbd;
pub mod sonarr;
pub mod starr;

pub use deluge::{DelugeApi, DelugeClient, DelugeTransfer};
pub use http::{HttpClient, HttpConfig};
pub use lidarr::{Album, AlbumStatistics, LidarrApi};
pub use qbit::{QbitApi, QbitClient, QbitTransfer};
pub use radarr::{Movie, MovieFile, RadarrApi};
pub use readarr::{Book, BookStatistics, ReadarrApi};
pub use sabnzbd::{SabHistory, SabHistorySlot, SabQueue, SabQueueSlot, SabnzbdApi, SabnzbdClient};
pub use sonarr::{Episode, Series, SeriesStatistics, SonarrApi};
pub use starr::{HistoryRecord, StarrClient};

use thiserror::Error;

/// Failure reaching an upstream instance or reading its reply.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("making request: {0}")]
    Request(String),

    #[error("connection timeout")]
    Timeout,

    #[error("HTTP {status}: {reason}")]
    Status { status: u16, reason: String },

    #[error("decoding response: {0}")]
    Decode(String),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("upstream error: {0}")]
    Upstream(String),
}

pub type Result<T> = std::result::Result<T, FetchError>;
