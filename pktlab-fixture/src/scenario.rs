//! Named protocol combinations the factory can build

use crate::assign::{TEST_DST_IPV4, TEST_SRC_IPV4, TEST_SRC_MAC};
use pktlab_core::{Error, MacAddr};
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

/// Sender and target addresses of an ARP request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArpAddrs {
    pub sha: MacAddr,
    pub spa: Ipv4Addr,
    pub tpa: Ipv4Addr,
}

impl Default for ArpAddrs {
    fn default() -> Self {
        Self {
            sha: TEST_SRC_MAC,
            spa: TEST_SRC_IPV4,
            tpa: TEST_DST_IPV4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    Ipv4Tcp,
    Ipv4Udp,
    Ipv4Icmp,
    Ipv6Tcp,
    Ipv6Udp,
    Ipv6Icmp,
    ArpRequest(ArpAddrs),
}

impl Scenario {
    /// Scenarios whose addresses are all fixed test values
    pub const ALL_FIXED: [Scenario; 6] = [
        Scenario::Ipv4Tcp,
        Scenario::Ipv4Udp,
        Scenario::Ipv4Icmp,
        Scenario::Ipv6Tcp,
        Scenario::Ipv6Udp,
        Scenario::Ipv6Icmp,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Scenario::Ipv4Tcp => "ipv4-tcp",
            Scenario::Ipv4Udp => "ipv4-udp",
            Scenario::Ipv4Icmp => "ipv4-icmp",
            Scenario::Ipv6Tcp => "ipv6-tcp",
            Scenario::Ipv6Udp => "ipv6-udp",
            Scenario::Ipv6Icmp => "ipv6-icmp",
            Scenario::ArpRequest(_) => "arp-request",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Scenario::Ipv4Tcp => "Ethernet / IPv4 / TCP",
            Scenario::Ipv4Udp => "Ethernet / IPv4 / UDP",
            Scenario::Ipv4Icmp => "Ethernet / IPv4 / ICMP echo request",
            Scenario::Ipv6Tcp => "Ethernet / IPv6 / TCP",
            Scenario::Ipv6Udp => "Ethernet / IPv6 / UDP",
            Scenario::Ipv6Icmp => "Ethernet / IPv6 / ICMPv6 echo request",
            Scenario::ArpRequest(_) => "Ethernet / ARP request",
        }
    }

    /// True for the TCP and UDP scenarios
    pub fn has_ports(&self) -> bool {
        matches!(
            self,
            Scenario::Ipv4Tcp | Scenario::Ipv4Udp | Scenario::Ipv6Tcp | Scenario::Ipv6Udp
        )
    }

    /// Every scenario, with default ARP addresses
    pub fn all() -> impl Iterator<Item = Scenario> {
        Self::ALL_FIXED
            .into_iter()
            .chain(std::iter::once(Scenario::ArpRequest(ArpAddrs::default())))
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Scenario {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        Scenario::all()
            .find(|scenario| scenario.name() == normalized)
            .ok_or_else(|| Error::InvalidParameter {
                name: "scenario".into(),
                reason: format!("unknown scenario '{}'", s),
            })
    }
}
