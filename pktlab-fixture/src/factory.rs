//! Test packet construction
//!
//! [`PacketFactory`] allocates from a pool, lays out the frame with the
//! matching initializer and then overwrites addresses and ports with the
//! fixed test values from [`crate::assign`].

use crate::assign::{
    assign_ether_addresses, assign_ipv4_addresses, assign_ipv6_addresses, assign_ports,
};
use crate::scenario::{ArpAddrs, Scenario};
use pktlab_core::{MacAddr, Result};
use pktlab_packet::init::{
    init_arp_reply_packet, init_arp_request_packet, init_empty_ipv4_icmp_packet,
    init_empty_ipv4_tcp_packet, init_empty_ipv4_udp_packet, init_empty_ipv6_icmp_packet,
    init_empty_ipv6_tcp_packet, init_empty_ipv6_udp_packet,
};
use pktlab_packet::{Mempool, Packet};
use std::net::Ipv4Addr;
use tracing::debug;

/// Default payload size of fixture packets
pub const PAYLOAD_SIZE: usize = 100;

type InitFn = fn(&mut Packet, usize) -> Result<()>;

#[derive(Debug, Clone, Copy)]
enum Network {
    V4,
    V6,
}

/// Builds fixture packets from a pool
#[derive(Debug, Clone)]
pub struct PacketFactory<'a> {
    pool: &'a Mempool,
    payload_size: usize,
    checksums: bool,
}

impl<'a> PacketFactory<'a> {
    pub fn new(pool: &'a Mempool) -> Self {
        Self {
            pool,
            payload_size: PAYLOAD_SIZE,
            checksums: false,
        }
    }

    pub fn with_payload_size(mut self, payload_size: usize) -> Self {
        self.payload_size = payload_size;
        self
    }

    /// Fill IPv4 and transport checksums after addresses are assigned
    pub fn with_checksums(mut self, enabled: bool) -> Self {
        self.checksums = enabled;
        self
    }

    pub fn payload_size(&self) -> usize {
        self.payload_size
    }

    pub fn build(&self, scenario: Scenario) -> Result<Packet> {
        match scenario {
            Scenario::Ipv4Tcp => self.ipv4_tcp(),
            Scenario::Ipv4Udp => self.ipv4_udp(),
            Scenario::Ipv4Icmp => self.ipv4_icmp(),
            Scenario::Ipv6Tcp => self.ipv6_tcp(),
            Scenario::Ipv6Udp => self.ipv6_udp(),
            Scenario::Ipv6Icmp => self.ipv6_icmp(),
            Scenario::ArpRequest(ArpAddrs { sha, spa, tpa }) => self.arp_request(sha, spa, tpa),
        }
    }

    pub fn ipv4_tcp(&self) -> Result<Packet> {
        self.ip_packet(Scenario::Ipv4Tcp, init_empty_ipv4_tcp_packet, Network::V4)
    }

    pub fn ipv4_udp(&self) -> Result<Packet> {
        self.ip_packet(Scenario::Ipv4Udp, init_empty_ipv4_udp_packet, Network::V4)
    }

    pub fn ipv4_icmp(&self) -> Result<Packet> {
        self.ip_packet(Scenario::Ipv4Icmp, init_empty_ipv4_icmp_packet, Network::V4)
    }

    pub fn ipv6_tcp(&self) -> Result<Packet> {
        self.ip_packet(Scenario::Ipv6Tcp, init_empty_ipv6_tcp_packet, Network::V6)
    }

    pub fn ipv6_udp(&self) -> Result<Packet> {
        self.ip_packet(Scenario::Ipv6Udp, init_empty_ipv6_udp_packet, Network::V6)
    }

    pub fn ipv6_icmp(&self) -> Result<Packet> {
        self.ip_packet(Scenario::Ipv6Icmp, init_empty_ipv6_icmp_packet, Network::V6)
    }

    /// ARP request carrying the given addresses unchanged
    pub fn arp_request(&self, sha: MacAddr, spa: Ipv4Addr, tpa: Ipv4Addr) -> Result<Packet> {
        let mut pkt = self.pool.alloc()?;
        init_arp_request_packet(&mut pkt, sha, spa, tpa)?;
        self.finish(pkt, "arp-request")
    }

    /// ARP reply addressed to `tha`
    pub fn arp_reply(
        &self,
        sha: MacAddr,
        tha: MacAddr,
        spa: Ipv4Addr,
        tpa: Ipv4Addr,
    ) -> Result<Packet> {
        let mut pkt = self.pool.alloc()?;
        init_arp_reply_packet(&mut pkt, sha, tha, spa, tpa)?;
        self.finish(pkt, "arp-reply")
    }

    fn ip_packet(&self, scenario: Scenario, init: InitFn, network: Network) -> Result<Packet> {
        let mut pkt = self.pool.alloc()?;
        init(&mut pkt, self.payload_size)?;

        assign_ether_addresses(&mut pkt)?;
        match network {
            Network::V4 => assign_ipv4_addresses(&mut pkt)?,
            Network::V6 => assign_ipv6_addresses(&mut pkt)?,
        }
        if scenario.has_ports() {
            assign_ports(&mut pkt)?;
        }

        self.finish(pkt, scenario.name())
    }

    fn finish(&self, mut pkt: Packet, kind: &str) -> Result<Packet> {
        if self.checksums {
            pkt.fill_checksums();
        }

        debug!(
            kind,
            len = pkt.len(),
            checksums = self.checksums,
            "Built test packet"
        );
        Ok(pkt)
    }
}
