//! Integration tests for MATCHBOARD.
//!
//! - `pipeline`: normalize → classify → group over a recorded feed document
//! - `http_feed`: feed sources, aggregator, refresher and dashboard against
//!   a local HTTP server

mod http_feed;
mod mock_feed;
mod pipeline;
