// Disbursement Gateway Library
// Exposes the router, handlers and config for the binary and for tests

pub mod app;
pub mod config;
pub mod error;
pub mod handlers;

pub use app::{router, AppState};
pub use config::Config;
pub use error::ApiError;
