//! HTTP API layer for gather.
//!
//! This crate provides the REST API:
//!
//! - **Endpoints**: roles, users, events, engagement toggles, shares
//! - **State**: one [`state::AppState`] holding every service
//!
//! Built on Axum 0.8.

pub mod endpoints;
pub mod response;
pub mod state;

pub use endpoints::router;
pub use state::AppState;
