//! Core domain types and logic.

pub mod config_validation;
pub mod engine;
pub mod error;
pub mod indicator;
pub mod params;
pub mod price;
pub mod ranking;
pub mod screen;
pub mod snapshot;
pub mod universe;
