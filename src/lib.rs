//! slidecast - turns slide decks into narrated talking-head videos.
//!
//! The binary's configuration loader is exposed here for integration tests;
//! everything else lives in the `sc-*` crates.

pub mod config;
