//! HTTP layer for the Takip verification backend
//!
//! Exposed as a library so integration tests can build the same `App` the
//! binary serves.

pub mod app;
pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;

pub use app::create_app;
pub use routes::auth::AppState;
