//! Packet buffers, header layouts and allocation for pktlab
//!
//! This crate provides the packet model the pktlab fixtures are built on:
//!
//! - [`mempool`] - Environment bootstrap and named buffer pools
//! - [`packet`] - The [`Packet`] frame buffer with layered header access
//! - [`init`] - Initializers laying out empty IPv4/IPv6 TCP/UDP/ICMP and ARP frames
//! - [`ethernet`], [`ipv4`], [`ipv6`], [`tcp`], [`udp`], [`icmp`], [`arp`] - Header layouts
//! - [`ports`] - The port accessor shared by TCP and UDP
//! - [`checksum`] - Internet checksum calculation utilities
//!
//! # Quick Start
//!
//! ```rust
//! use pktlab_packet::init::init_empty_ipv4_udp_packet;
//! use pktlab_packet::mempool::{EnvConfig, Environment};
//!
//! let env = Environment::init::<&str>(&[], EnvConfig::default()).unwrap();
//! let pool = env.create_mempool("docs").unwrap();
//!
//! let mut pkt = pool.alloc().unwrap();
//! init_empty_ipv4_udp_packet(&mut pkt, 100).unwrap();
//! pkt.l4_ports_mut().unwrap().set_source_port(1234);
//!
//! assert_eq!(pkt.ports(), Some((1234, 0)));
//! assert_eq!(pkt.len(), 142);
//! ```
//!
//! All header access is bounds-checked; the crate contains no unsafe code.

pub mod arp;
pub mod checksum;
pub mod ethernet;
pub mod icmp;
pub mod init;
pub mod ipv4;
pub mod ipv6;
pub mod mempool;
pub mod packet;
pub mod ports;
pub mod tcp;
pub mod udp;

// Re-export commonly used types for convenience
pub use checksum::{internet_checksum, transport_checksum, transport_checksum_v6};
pub use ethernet::{EtherType, EthernetHeader};
pub use ipv4::{IpProtocol, Ipv4Header};
pub use ipv6::Ipv6Header;
pub use mempool::{EnvConfig, Environment, Mempool};
pub use packet::{L3Proto, L4Proto, Packet};
pub use ports::swap_bytes_u16;
