//! CLI command implementations.

pub mod config;
pub mod entry;
pub mod export;
pub mod generate;
pub mod import;
pub mod report;
pub mod token;
pub mod vault;
