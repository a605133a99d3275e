//! CLI command handlers
//!
//! Each subcommand is implemented in its own module.

pub mod export;
pub mod helpers;
pub mod list;
pub mod serve;
pub mod stats;
pub mod submit;
