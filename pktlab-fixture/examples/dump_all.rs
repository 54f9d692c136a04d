//! Example: Dumping every fixture scenario
//!
//! Builds each scenario packet with checksums filled and writes it to
//! `<scenario>.pcap` in the given directory (default: current directory),
//! ready to open in a packet analyzer.
//!
//! Usage:
//!   cargo run -p pktlab-fixture --example dump_all -- /tmp/pktlab

use pktlab_capture::CaptureWriter;
use pktlab_fixture::{InitContext, PacketFactory, Scenario};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let dir = std::env::args().nth(1).unwrap_or_else(|| ".".to_string());

    let mut ctx = InitContext::new();
    let pool = ctx.ensure_initialized()?;
    let factory = PacketFactory::new(pool).with_checksums(true);
    let writer = CaptureWriter::new(true).with_output_dir(&dir);

    for scenario in Scenario::all() {
        let pkt = factory.build(scenario)?;
        let report = writer.dump_packet(scenario.name(), &pkt);

        match report.path() {
            Some(path) if report.is_clean() => {
                println!("{:<12} {:>4} bytes -> {}", scenario, pkt.len(), path.display())
            }
            _ => println!("{:<12} dump failed ({} steps)", scenario, report.failures().len()),
        }
    }

    Ok(())
}
