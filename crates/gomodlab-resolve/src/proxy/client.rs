//! HTTP client construction for proxy interactions

use gomodlab_core::config::consts;
use reqwest::blocking::Client;
use std::time::Duration;

/// Builds HTTP client with the gomodlab user agent
///
/// `timeout` applies to every request unless a request sets its own.
/// `None` leaves requests unbounded; callers supply deadlines per call.
///
/// # Errors
///
/// Returns error if client construction fails
pub fn build_client(timeout: Option<Duration>) -> Result<Client, reqwest::Error> {
    // Blocking clients default to a 30s timeout; `None` must really mean none
    Client::builder()
        .user_agent(consts::proxy::USER_AGENT)
        .timeout(timeout)
        .build()
}

/// Builds HTTP client without a client-wide timeout
pub fn build_default_client() -> Result<Client, reqwest::Error> {
    build_client(None)
}
