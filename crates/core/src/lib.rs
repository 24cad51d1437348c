//! Core business logic for gather.

pub mod services;

pub use services::*;
