pub mod api;
pub mod apps;
pub mod config;
pub mod dashboard;
pub mod decode;
pub mod observability;
pub mod store;
pub mod transport;
