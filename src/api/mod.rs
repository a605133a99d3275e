//! HTTP API for feedback submission and the admin view
//!
//! Provides:
//! - Public feedback submission
//! - Admin login/logout with bearer-token sessions
//! - Filtered admin report and CSV export

pub mod error;
pub mod server;
pub mod state;

pub use error::ApiError;
pub use server::{ApiServer, ApiServerConfig};
pub use state::AppState;
