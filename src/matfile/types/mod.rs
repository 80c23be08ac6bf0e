//! Foundational data structures, error types, and decoded values.

pub mod error;
pub mod models;
pub mod value;
