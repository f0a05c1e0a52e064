//! Test utilities
//!
//! Manual mock implementations and test fixtures for unit testing.
//!
//! Manual mocks instead of mockall: the ports take `&str` and slice
//! arguments, and hand-written stores let tests inspect what was written.

pub mod fixtures;
pub mod mocks;

pub use fixtures::*;
pub use mocks::*;
