//! Shared harness for the Pixel analytics integration tests.

pub mod containers;
pub mod mocks;
pub mod setup;
