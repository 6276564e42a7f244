//! Configuration handling for ts-minbar
//!
//! This module contains data structures for:
//! - `Scenario` - the test scenario (toolchain pin, dependencies, packages, scaffold),
//!   built in or overlaid from a YAML file

pub mod scenario;

// Re-export commonly used types
pub use scenario::Scenario;
