//! Adrelay HTTP API
//!
//! Serves `POST /api/extendAd`, relaying each request to the backend's
//! `ads:extendAdDuration` mutation, plus health and metrics endpoints.

pub mod handlers;
pub mod metrics;
pub mod routes;
pub mod server;

pub use routes::AppState;
pub use server::run_server;

#[cfg(test)]
pub(crate) mod test_support;
