//! Command implementations for the CLI
//!
//! - test: Test configuration validity
//! - config: Configuration display

pub mod config;
