//! Token service module for the pre-auth ("email verified") token
//!
//! The token bridges a successful pre-registration code check to the later
//! registration call without re-sending the code.

mod pre_auth;

#[cfg(test)]
mod tests;

pub use pre_auth::{IssuedPreAuthToken, PreAuthTokenIssuer};
