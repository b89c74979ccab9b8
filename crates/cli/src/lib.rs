//! Command-line front end for `sfpilot`.
//!
//! Binds the engine-agnostic core to Playwright and the `sf` CLI and exposes
//! every operation through `exec` (one shot) and `serve` (NDJSON stream).

pub mod app;
pub mod cli;
pub mod config;
pub mod logging;
pub mod ops;
pub mod playwright;
pub mod serve;
pub mod sf_cli;
