//! Subcommand execution

use crate::args::{Cli, Commands};
use pktlab_capture::CaptureWriter;
use pktlab_core::{Error, MacAddr, Result};
use pktlab_fixture::{ArpAddrs, InitContext, PacketFactory, Scenario};
use pktlab_packet::Packet;
use std::fmt::Write as _;
use std::net::Ipv4Addr;
use std::path::PathBuf;
use tracing::{info, warn};

/// Options of the `build` subcommand
#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub scenario: Scenario,
    pub payload_size: usize,
    pub checksums: bool,
    pub output: PathBuf,
    pub name: Option<String>,
    pub force: bool,
}

/// Run the parsed command, writing user-facing output to stdout
pub fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        Commands::Build {
            scenario,
            payload_size,
            checksums,
            output,
            name,
            force,
            sha,
            spa,
            tpa,
        } => {
            let options = BuildOptions {
                scenario: with_arp_overrides(*scenario, *sha, *spa, *tpa)?,
                payload_size: *payload_size,
                checksums: *checksums,
                output: output.clone(),
                name: name.clone(),
                force: *force,
            };
            let summary = build(&options)?;
            print!("{}", summary);
            Ok(())
        }
        Commands::Scenarios => {
            print!("{}", list_scenarios());
            Ok(())
        }
    }
}

/// Apply `--sha/--spa/--tpa` to an ARP scenario
pub fn with_arp_overrides(
    scenario: Scenario,
    sha: Option<MacAddr>,
    spa: Option<Ipv4Addr>,
    tpa: Option<Ipv4Addr>,
) -> Result<Scenario> {
    match scenario {
        Scenario::ArpRequest(defaults) => Ok(Scenario::ArpRequest(ArpAddrs {
            sha: sha.unwrap_or(defaults.sha),
            spa: spa.unwrap_or(defaults.spa),
            tpa: tpa.unwrap_or(defaults.tpa),
        })),
        _ if sha.is_some() || spa.is_some() || tpa.is_some() => Err(Error::invalid_parameter(
            scenario.name(),
            "ARP addresses only apply to arp-request",
        )),
        _ => Ok(scenario),
    }
}

/// Build the packet and dump it, returning the text to show the user
pub fn build(options: &BuildOptions) -> Result<String> {
    let mut ctx = InitContext::new();
    let pool = ctx.ensure_initialized()?;

    let pkt = PacketFactory::new(pool)
        .with_payload_size(options.payload_size)
        .with_checksums(options.checksums)
        .build(options.scenario)?;

    let mut out = describe_packet(options.scenario, &pkt);

    let name = options
        .name
        .as_deref()
        .unwrap_or_else(|| options.scenario.name());
    let writer = CaptureWriter::new(options.force).with_output_dir(&options.output);
    let report = writer.dump_packet(name, &pkt);

    if report.was_skipped() {
        let _ = writeln!(
            out,
            "Development mode is off, not writing {} (use --force)",
            writer.capture_path(name).display()
        );
        return Ok(out);
    }

    if !report.is_clean() {
        for failure in report.failures() {
            warn!(step = %failure.step, "Capture dump incomplete: {}", failure.error);
        }
        return Err(Error::Capture(format!(
            "{} of the dump steps for {} failed",
            report.failures().len(),
            writer.capture_path(name).display()
        )));
    }

    info!(records = report.records_written(), "Capture written");
    if let Some(path) = report.path() {
        let _ = writeln!(out, "Wrote {}", path.display());
    }
    Ok(out)
}

/// One line per scenario: name and layer stack
pub fn list_scenarios() -> String {
    let mut out = String::from("Available scenarios:\n");
    for scenario in Scenario::all() {
        let _ = writeln!(out, "  {:<12} {}", scenario.name(), scenario.description());
    }
    out
}

/// Human-readable summary of a built packet
pub fn describe_packet(scenario: Scenario, pkt: &Packet) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} ({} bytes)", scenario, pkt.len());

    if let Some(ether) = pkt.ether() {
        let _ = writeln!(
            out,
            "  Ethernet  {} -> {} type {:#06x}",
            ether.source,
            ether.destination,
            ether.ethertype.to_u16()
        );
    }
    if let Some(ip) = pkt.ipv4() {
        let _ = writeln!(
            out,
            "  IPv4      {} -> {} len {}",
            ip.source, ip.destination, ip.total_length
        );
    }
    if let Some(ip) = pkt.ipv6() {
        let _ = writeln!(
            out,
            "  IPv6      {} -> {} len {}",
            ip.source, ip.destination, ip.payload_length
        );
    }
    if let Some(arp) = pkt.arp() {
        let _ = writeln!(
            out,
            "  ARP       {:?} {} ({}) -> {}",
            arp.operation, arp.sender_proto_addr, arp.sender_hw_addr, arp.target_proto_addr
        );
    }
    if let Some((src, dst)) = pkt.ports() {
        let _ = writeln!(out, "  Ports     {} -> {}", src, dst);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(scenario: Scenario, output: PathBuf, force: bool) -> BuildOptions {
        BuildOptions {
            scenario,
            payload_size: 100,
            checksums: false,
            output,
            name: None,
            force,
        }
    }

    #[test]
    fn test_build_without_force_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let out = build(&options(Scenario::Ipv4Udp, dir.path().to_path_buf(), false)).unwrap();

        assert!(out.contains("ipv4-udp (142 bytes)"));
        assert!(out.contains("Development mode is off"));
        assert!(!dir.path().join("ipv4-udp.pcap").exists());
    }

    #[test]
    fn test_build_with_force_writes_capture() {
        let dir = tempfile::tempdir().unwrap();
        let mut opts = options(Scenario::Ipv6Tcp, dir.path().to_path_buf(), true);
        opts.name = Some("custom".into());

        let out = build(&opts).unwrap();
        let path = dir.path().join("custom.pcap");
        assert!(out.contains("Wrote"));
        assert_eq!(
            std::fs::metadata(path).unwrap().len() as usize,
            24 + 16 + 14 + 40 + 20 + 100
        );
    }

    #[test]
    fn test_build_into_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let opts = options(Scenario::Ipv4Icmp, dir.path().join("absent"), true);
        assert!(matches!(build(&opts), Err(Error::Capture(_))));
    }

    #[test]
    fn test_arp_overrides() {
        let tpa = Ipv4Addr::new(10, 1, 1, 1);
        let scenario = with_arp_overrides(
            Scenario::ArpRequest(ArpAddrs::default()),
            None,
            None,
            Some(tpa),
        )
        .unwrap();
        assert_eq!(
            scenario,
            Scenario::ArpRequest(ArpAddrs {
                tpa,
                ..ArpAddrs::default()
            })
        );

        assert!(with_arp_overrides(Scenario::Ipv4Tcp, None, Some(tpa), None).is_err());
        assert_eq!(
            with_arp_overrides(Scenario::Ipv4Tcp, None, None, None).unwrap(),
            Scenario::Ipv4Tcp
        );
    }

    #[test]
    fn test_describe_packet() {
        let mut ctx = InitContext::new();
        let pool = ctx.ensure_initialized().unwrap();
        let pkt = PacketFactory::new(pool).ipv4_tcp().unwrap();

        let text = describe_packet(Scenario::Ipv4Tcp, &pkt);
        assert!(text.contains("01:11:21:31:41:51 -> 00:11:22:33:44:55"));
        assert!(text.contains("127.0.0.1 -> 128.9.9.5"));
        assert!(text.contains("1234 -> 5678"));
    }

    #[test]
    fn test_list_scenarios() {
        let text = list_scenarios();
        assert_eq!(text.lines().count(), 8);
        assert!(text.contains("arp-request"));
    }
}
