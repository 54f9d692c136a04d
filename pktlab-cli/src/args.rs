//! CLI argument parsing

use clap::{Parser, Subcommand};
use pktlab_core::MacAddr;
use pktlab_fixture::{Scenario, PAYLOAD_SIZE};
use std::net::Ipv4Addr;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "pktlab")]
#[command(version, about = "Deterministic protocol test packet builder", long_about = None)]
pub struct Cli {
    /// Verbose output (-v, -vv, -vvv for increasing verbosity)
    #[arg(short = 'v', long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build a scenario packet and dump it to a capture file
    Build {
        /// Scenario name (see `pktlab scenarios`)
        #[arg(short, long, value_name = "SCENARIO")]
        scenario: Scenario,

        /// Payload bytes after the transport header
        #[arg(short, long, value_name = "BYTES", default_value_t = PAYLOAD_SIZE)]
        payload_size: usize,

        /// Fill IPv4 and transport checksums
        #[arg(short, long)]
        checksums: bool,

        /// Directory the capture file is written to
        #[arg(short, long, value_name = "DIR", default_value = ".")]
        output: PathBuf,

        /// Capture file name without extension (defaults to the scenario name)
        #[arg(short, long)]
        name: Option<String>,

        /// Write the capture file even though development mode is off
        #[arg(short, long)]
        force: bool,

        /// ARP sender hardware address
        #[arg(long, value_name = "MAC")]
        sha: Option<MacAddr>,

        /// ARP sender protocol address
        #[arg(long, value_name = "IPV4")]
        spa: Option<Ipv4Addr>,

        /// ARP target protocol address
        #[arg(long, value_name = "IPV4")]
        tpa: Option<Ipv4Addr>,
    },

    /// List available scenarios
    Scenarios,
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Log filter directive for the `-v` count
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
