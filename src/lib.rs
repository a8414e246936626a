//! dtsforge - DTS to E-AC-3 audio track conversion for media libraries
//!
//! This library crate exposes the core functionality for integration testing.

pub mod config;
pub mod conversion;
pub mod probe;
pub mod processor;
pub mod report;
pub mod reverify;
pub mod rules;
pub mod scanner;
pub mod state;

#[cfg(test)]
mod test_fixtures;
