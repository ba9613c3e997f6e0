//! Route handlers for the HTTP API.

pub mod admin;
pub mod cleanup;
pub mod download;
pub mod events;
pub mod health;
pub mod preview;
pub mod process;
pub mod status;
pub mod voices;
