//! MATCHBOARD — live and upcoming sports match board
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod config;
pub mod types;
pub mod time;
pub mod pipeline;
pub mod feed;
pub mod engine;
pub mod dashboard;
