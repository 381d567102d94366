//! Shared utilities for the equirank workspace

pub mod logging;

pub use logging::init_tracing;
