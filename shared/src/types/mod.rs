//! Type definitions shared by the API layer
//!
//! - `response` - Success bodies and health checks

pub mod response;

pub use response::{HealthResponse, OkResponse};
