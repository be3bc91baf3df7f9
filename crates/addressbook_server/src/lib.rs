//! HTTP surface of the address book: routes, error middleware, shared state
//! and process lifecycle.

pub mod api;
pub mod config;
pub mod error;
pub mod middleware;
pub mod server;
pub mod state;

pub use api::build_app;
pub use config::ServerConfig;
pub use error::{ApiError, ApiResult, ServerError};
pub use server::run;
pub use state::AppState;
