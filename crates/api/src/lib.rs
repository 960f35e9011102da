//! HTTP API layer for wayfarer.
//!
//! This crate provides the REST API:
//!
//! - **Endpoints**: places, addresses, reviews, transits, trips and their
//!   itineraries, members, geography, tags and likes
//! - **Extractors**: the acting user, with staff checks
//! - **Middleware**: bearer token authentication
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
