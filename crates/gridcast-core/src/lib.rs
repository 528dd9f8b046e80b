// Library root: re-exports all modules so the CLI and integration tests can
// reach the crate's public API.

pub mod config;
pub mod player;
pub mod pool;
pub mod report;
pub mod valuation;
