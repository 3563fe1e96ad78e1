//! Glossa API Library
//!
//! Server administration endpoints and the outgoing e-mail sender.

pub mod auth;
pub mod config;
pub mod directory;
pub mod email;
pub mod error;
pub mod routes;
pub mod security;
pub mod state;

pub use config::Config;
pub use error::{ApiError, ApiResult};
pub use state::AppState;
