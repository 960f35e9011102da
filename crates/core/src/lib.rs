//! Core business logic for wayfarer.

pub mod services;
pub mod validation;

pub use services::*;
