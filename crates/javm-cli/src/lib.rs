//! javm driver programs
//!
//! Library half of the `javm` binary: configuration loading, logging setup
//! and the driver programs that exercise the runtime core.

#![warn(rust_2018_idioms)]

pub mod commands;
pub mod config;
pub mod logging;
