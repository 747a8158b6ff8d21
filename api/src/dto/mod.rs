//! Request and response bodies

pub mod auth;

pub use takip_shared::errors::ErrorResponse;
