//! Common utilities and shared types for wayfarer.
//!
//! This crate provides foundational components used across all wayfarer crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`],
//!   with per-field validation messages carried by [`FieldErrors`]
//! - **ID Generation**: random trip identifiers via [`IdGenerator`]
//!
//! # Example
//!
//! ```no_run
//! use wayfarer_common::{AppResult, Config, IdGenerator};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     let trip_id = IdGenerator::new().trip_id();
//!     println!("{}:{} -> {trip_id}", config.server.host, config.server.port);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod id;

pub use config::Config;
pub use error::{AppError, AppResult, FieldErrors};
pub use id::IdGenerator;
