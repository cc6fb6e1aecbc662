//! Core business logic for askboard.

pub mod services;

pub use services::*;
