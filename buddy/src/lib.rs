//! Research Buddy: a client for searching papers and reading them chunk by
//! chunk, with a chat scoped to the selected chunk.

pub mod api;
pub mod app;
pub mod commands;
pub mod config;
pub mod error;
pub mod markdown;
pub mod models;
pub mod routes;
pub mod search;
pub mod telemetry;
pub mod viewer;

pub use error::{BuddyError, Result};
