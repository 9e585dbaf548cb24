//! HTTP surface: health, status, the latest snapshot and a manual trigger

mod error;
pub mod models;
mod server;
pub mod services;
pub mod state;

pub use error::ApiError;
pub use server::{router, run};
pub use state::AppState;
