//! Core engine — the fetch → classify → publish cycle.

pub mod aggregator;
pub mod refresher;
