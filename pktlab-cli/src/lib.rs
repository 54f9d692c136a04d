//! CLI interface for pktlab
//!
//! This crate provides the `pktlab` command-line interface: argument parsing
//! and the `build` / `scenarios` subcommands.

pub mod args;
pub mod commands;

pub use args::{Cli, Commands};
pub use commands::{build, list_scenarios, BuildOptions};
