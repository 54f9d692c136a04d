//! Capture output for pktlab
//!
//! - [`pcap`] - Classic pcap file serialization (global header, records, [`PcapWriter`])
//! - [`dump`] - [`CaptureWriter`], which dumps fixture packets to `<name>.pcap`
//!   when development mode is enabled
//!
//! ## Example
//!
//! ```no_run
//! use pktlab_capture::CaptureWriter;
//! use pktlab_packet::{init::init_empty_ipv4_udp_packet, Packet};
//!
//! let mut pkt = Packet::new();
//! init_empty_ipv4_udp_packet(&mut pkt, 100).unwrap();
//!
//! let report = CaptureWriter::new(true)
//!     .with_output_dir("/tmp")
//!     .dump_packet("ipv4_udp", &pkt);
//! for err in report.errors() {
//!     eprintln!("dump step failed: {}", err);
//! }
//! ```

pub mod dump;
pub mod pcap;

// Re-export main types
pub use dump::{CaptureWriter, DumpFailure, DumpReport, DumpStep, DEVELOPMENT_MODE};
pub use pcap::{
    write_pcap_global_hdr, write_pcap_record, PcapGlobalHeader, PcapRecordHeader, PcapWriter,
    WritePcap,
};
