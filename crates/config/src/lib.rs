//! Configuration loading for breakwater
//!
//! This crate reads the resilience settings file, applies environment
//! overrides, and turns the result into policy configurations.

pub mod loader;
pub mod settings;

pub use loader::*;
pub use settings::*;
